//! # Player Module
//!
//! The player aggregate: its entity body, its inventory, the fighter it
//! gains once a class is chosen, and its spell book.

use crate::config;
use crate::content::ContentRegistry;
use crate::game::{Ability, Entity, Fighter, Inventory, Lifecycle, Position};
use crate::{DelverError, DelverResult, RuleViolation};
use log::info;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Spells known and memorized by a character, together with the class
/// rules that constrain them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellBook {
    /// Spells available to the chosen class
    allowed: Vec<String>,
    /// How many spells may be memorized at once
    max_memorized: usize,
    known: Vec<String>,
    memorized: Vec<String>,
}

impl SpellBook {
    /// Spells the character has learned.
    pub fn known(&self) -> &[String] {
        &self.known
    }

    /// Spells currently memorized.
    pub fn memorized(&self) -> &[String] {
        &self.memorized
    }
}

/// The player: an entity body plus exactly one inventory and, once a
/// class has been chosen, exactly one fighter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub entity: Entity,
    pub inventory: Inventory,
    pub fighter: Option<Fighter>,
    pub spell_book: SpellBook,
    /// Chosen race; its ability bonuses land when the class is chosen
    pub race: Option<String>,
}

impl Player {
    /// Creates a player with an empty default-capacity inventory and no
    /// class yet.
    pub fn new(name: impl Into<String>) -> Self {
        let mut entity = Entity::new(name, '@');
        entity.lifecycle = Lifecycle::Alive;
        Self {
            entity,
            inventory: Inventory::new(config::DEFAULT_MAX_ITEMS),
            fighter: None,
            spell_book: SpellBook::default(),
            race: None,
        }
    }

    /// Current position on the floor.
    pub fn position(&self) -> Position {
        self.entity.position
    }

    /// Moves the player to a position. The caller is responsible for
    /// checking walkability first.
    pub fn set_position(&mut self, pos: Position) {
        self.entity.position = pos;
    }

    /// Chooses a race ahead of the class. Its ability bonuses are folded
    /// into the fighter when the class is chosen. Unknown race names
    /// degrade to `false`.
    pub fn choose_race(&mut self, race_name: &str, registry: &ContentRegistry) -> bool {
        if registry.race(race_name).is_none() {
            return false;
        }
        self.race = Some(race_name.to_string());
        true
    }

    /// Chooses a combat class, constructing the fighter, folding in any
    /// chosen race's ability bonuses, and binding the class's spell
    /// rules. Unknown class names degrade to `false`.
    pub fn choose_class(&mut self, class_name: &str, registry: &ContentRegistry) -> bool {
        let Some(def) = registry.class(class_name) else {
            return false;
        };
        let Some(mut fighter) = Fighter::from_registry(class_name, registry) else {
            return false;
        };
        if let Some(race) = self.race.as_ref().and_then(|name| registry.race(name)) {
            for (&ability, &bonus) in &race.ability_bonuses {
                fighter.combat_class.raise_ability(ability, bonus);
            }
        }
        self.spell_book = SpellBook {
            allowed: def.spells.clone(),
            max_memorized: def.max_memorized,
            known: Vec::new(),
            memorized: Vec::new(),
        };
        self.fighter = Some(fighter);
        info!("{} becomes a {}", self.entity.name, class_name);
        true
    }

    /// Applies one level-up: the fighter's level (and optionally one
    /// ability score) rises, then the fixed heal bonus lands. Two
    /// cooperating operations; the fighter itself never heals on
    /// level-up.
    pub fn level_up(&mut self, stat: Option<Ability>, rng: &mut StdRng) -> DelverResult<()> {
        let fighter = self
            .fighter
            .as_mut()
            .ok_or_else(|| DelverError::InvalidState("no class chosen".to_string()))?;
        fighter.level_up(stat);
        fighter.heal(config::LEVEL_UP_HEAL, rng);
        Ok(())
    }

    /// Learns a spell. Unknown spell names degrade to `Ok(false)` (the
    /// registry logs the miss); a spell outside the class's list is a
    /// rule violation.
    pub fn learn_spell(&mut self, name: &str, registry: &ContentRegistry) -> DelverResult<bool> {
        let fighter = self
            .fighter
            .as_ref()
            .ok_or_else(|| DelverError::InvalidState("no class chosen".to_string()))?;
        if registry.spell(name).is_none() {
            return Ok(false);
        }
        if !self.spell_book.allowed.iter().any(|spell| spell == name) {
            return Err(RuleViolation::OutsideClass {
                spell: name.to_string(),
                class: fighter.combat_class.name.clone(),
            }
            .into());
        }
        if !self.spell_book.known.iter().any(|spell| spell == name) {
            self.spell_book.known.push(name.to_string());
        }
        Ok(true)
    }

    /// Memorizes a known spell, bounded by the class's limit.
    pub fn memorize_spell(&mut self, name: &str) -> DelverResult<()> {
        if !self.spell_book.known.iter().any(|spell| spell == name) {
            return Err(DelverError::InvalidAction(format!(
                "spell '{}' has not been learned",
                name
            )));
        }
        if self.spell_book.memorized.iter().any(|spell| spell == name) {
            return Ok(());
        }
        if self.spell_book.memorized.len() >= self.spell_book.max_memorized {
            return Err(RuleViolation::MemorizedLimit {
                limit: self.spell_book.max_memorized,
            }
            .into());
        }
        self.spell_book.memorized.push(name.to_string());
        Ok(())
    }
}
