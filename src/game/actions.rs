//! # Action Intents
//!
//! Flat action intents consumed by the game state machine.
//!
//! The mapping from raw keys to intents belongs entirely to the input
//! collaborator; the core only ever sees these values. Only movement,
//! taking the stairs, and waiting consume a turn; menu navigation and
//! other interactions never advance the simulation.

use crate::game::{Ability, Direction, EquipSlot};
use serde::{Deserialize, Serialize};

/// A player intention, decoupled from any key binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionIntent {
    /// Step one tile (or attack what stands there)
    Move(Direction),
    /// Pass the turn
    Wait,
    /// Descend the stairs underfoot
    TakeStairs,
    /// Pick up the item underfoot
    PickUp,
    /// Equip a named item out of the inventory
    Equip(String),
    /// Empty an equipment slot
    Unequip(EquipSlot),
    /// Learn a spell by name
    LearnSpell(String),
    /// Memorize a learned spell
    MemorizeSpell(String),
    /// Begin character creation from the title state
    StartGame,
    /// Pick a race during character creation
    ChooseRace(String),
    /// Finish character creation with the chosen class
    ChooseClass(String),
    /// Spend a pending level-up, optionally raising an ability
    SpendLevelUp(Option<Ability>),
    /// Open the inventory screen
    OpenInventory,
    /// Open the character sheet
    OpenCharacter,
    /// Close the current menu screen
    CloseMenu,
    /// Suspend the simulation
    Pause,
    /// Resume from pause
    Resume,
    /// Leave for the title state, discarding progress
    Exit,
    /// Quit the process
    Quit,
}

impl ActionIntent {
    /// Whether this intent advances the simulation by one tick when it
    /// succeeds.
    pub fn is_turn_consuming(&self) -> bool {
        matches!(
            self,
            ActionIntent::Move(_) | ActionIntent::Wait | ActionIntent::TakeStairs
        )
    }
}

/// What handling an intent did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// Succeeded and consumed a turn
    Turn,
    /// Succeeded without consuming a turn
    Free,
    /// Failed; consumed no turn
    Failed,
    /// Not applicable in the current mode; nothing happened
    Ignored,
}

impl ActionOutcome {
    /// Whether the simulation ticked.
    pub fn consumed_turn(self) -> bool {
        self == ActionOutcome::Turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_consuming_set() {
        assert!(ActionIntent::Move(Direction::North).is_turn_consuming());
        assert!(ActionIntent::Wait.is_turn_consuming());
        assert!(ActionIntent::TakeStairs.is_turn_consuming());

        assert!(!ActionIntent::PickUp.is_turn_consuming());
        assert!(!ActionIntent::OpenInventory.is_turn_consuming());
        assert!(!ActionIntent::Pause.is_turn_consuming());
        assert!(!ActionIntent::Equip("sword".to_string()).is_turn_consuming());
    }

    #[test]
    fn test_outcome_turn_flag() {
        assert!(ActionOutcome::Turn.consumed_turn());
        assert!(!ActionOutcome::Free.consumed_turn());
        assert!(!ActionOutcome::Failed.consumed_turn());
        assert!(!ActionOutcome::Ignored.consumed_turn());
    }
}
