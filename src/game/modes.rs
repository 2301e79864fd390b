//! # Mode State Machine
//!
//! Top-level UI/game states and the transition table between them.
//!
//! The table is total: every (mode, trigger) pair either names a new mode
//! or is a no-op. Re-entering the current mode is a no-op as well, guarded
//! in [`GameState::set_mode`](crate::GameState::set_mode). Every mode
//! other than `Playing` pauses simulation ticking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level game/UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Title state
    Start,
    /// Choosing class and race
    CharacterCreation,
    /// The dungeon turn loop
    Playing,
    /// Inventory screen
    Inventory,
    /// Character sheet
    Character,
    /// Trading with a shopkeeper
    Shop,
    /// Simulation suspended
    Paused,
    /// The run has ended
    GameOver,
}

impl Mode {
    /// Whether simulation ticking is suspended in this mode. Only
    /// `Playing` runs the simulation.
    pub fn pauses_simulation(self) -> bool {
        self != Mode::Playing
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Start => "start",
            Mode::CharacterCreation => "character-creation",
            Mode::Playing => "playing",
            Mode::Inventory => "inventory",
            Mode::Character => "character",
            Mode::Shop => "shop",
            Mode::Paused => "paused",
            Mode::GameOver => "game-over",
        };
        write!(f, "{}", name)
    }
}

/// Mode-transition triggers. Player-originated triggers come from the
/// input collaborator; `GameEnded` and `ShopEntered` originate in the
/// simulation and force a transition regardless of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Leave the title state and begin creating a character
    StartGame,
    /// Character creation finished
    ClassChosen,
    /// Open the inventory screen
    OpenInventory,
    /// Open the character sheet
    OpenCharacter,
    /// Close the current menu screen and resume play
    CloseMenu,
    /// Suspend the simulation
    Pause,
    /// Resume from pause
    Resume,
    /// Leave the current screen for the title state, discarding progress
    Exit,
    /// Simulation-originated: the run has ended
    GameEnded,
    /// Simulation-originated: the player stepped into a shop
    ShopEntered,
}

/// The transition table: `(mode, trigger)` to the next mode, or `None`
/// for a no-op. Exhaustive over both enums by construction.
pub fn transition(mode: Mode, trigger: Trigger) -> Option<Mode> {
    use Mode::*;
    use Trigger::*;

    // The ended-run transition is forced from every mode.
    if trigger == GameEnded {
        return Some(GameOver);
    }

    match (mode, trigger) {
        (Start, StartGame) => Some(CharacterCreation),

        (CharacterCreation, ClassChosen) => Some(Playing),
        (CharacterCreation, Exit) => Some(Start),

        (Playing, OpenInventory) => Some(Inventory),
        (Playing, OpenCharacter) => Some(Character),
        (Playing, Pause) => Some(Paused),
        (Playing, ShopEntered) => Some(Shop),

        (Inventory, CloseMenu) => Some(Playing),
        (Character, CloseMenu) => Some(Playing),
        (Shop, CloseMenu) => Some(Playing),

        (Paused, Resume) => Some(Playing),
        // Quitting from pause discards progress back to the title state,
        // it does not resume.
        (Paused, Exit) => Some(Start),

        (GameOver, Exit) => Some(Start),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MODES: [Mode; 8] = [
        Mode::Start,
        Mode::CharacterCreation,
        Mode::Playing,
        Mode::Inventory,
        Mode::Character,
        Mode::Shop,
        Mode::Paused,
        Mode::GameOver,
    ];

    const ALL_TRIGGERS: [Trigger; 10] = [
        Trigger::StartGame,
        Trigger::ClassChosen,
        Trigger::OpenInventory,
        Trigger::OpenCharacter,
        Trigger::CloseMenu,
        Trigger::Pause,
        Trigger::Resume,
        Trigger::Exit,
        Trigger::GameEnded,
        Trigger::ShopEntered,
    ];

    #[test]
    fn test_happy_path() {
        assert_eq!(
            transition(Mode::Start, Trigger::StartGame),
            Some(Mode::CharacterCreation)
        );
        assert_eq!(
            transition(Mode::CharacterCreation, Trigger::ClassChosen),
            Some(Mode::Playing)
        );
        assert_eq!(
            transition(Mode::Playing, Trigger::OpenInventory),
            Some(Mode::Inventory)
        );
        assert_eq!(
            transition(Mode::Inventory, Trigger::CloseMenu),
            Some(Mode::Playing)
        );
    }

    #[test]
    fn test_pause_exit_discards_to_title() {
        assert_eq!(transition(Mode::Playing, Trigger::Pause), Some(Mode::Paused));
        assert_eq!(transition(Mode::Paused, Trigger::Exit), Some(Mode::Start));
        assert_eq!(transition(Mode::Paused, Trigger::Resume), Some(Mode::Playing));
    }

    #[test]
    fn test_game_ended_forces_from_every_mode() {
        for mode in ALL_MODES {
            assert_eq!(transition(mode, Trigger::GameEnded), Some(Mode::GameOver));
        }
    }

    #[test]
    fn test_shop_entered_only_from_playing() {
        assert_eq!(
            transition(Mode::Playing, Trigger::ShopEntered),
            Some(Mode::Shop)
        );
        assert_eq!(transition(Mode::Start, Trigger::ShopEntered), None);
        assert_eq!(transition(Mode::Paused, Trigger::ShopEntered), None);
    }

    #[test]
    fn test_table_is_total() {
        // Every pair resolves to a transition or an explicit no-op without
        // panicking.
        for mode in ALL_MODES {
            for trigger in ALL_TRIGGERS {
                let _ = transition(mode, trigger);
            }
        }
    }

    #[test]
    fn test_only_playing_runs_simulation() {
        for mode in ALL_MODES {
            assert_eq!(mode.pauses_simulation(), mode != Mode::Playing);
        }
    }
}
