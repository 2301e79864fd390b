//! # Entity Module
//!
//! Game objects: monsters, items, props, and the player's own body.
//!
//! Entities carry a strongly-typed core (identity, glyph, position,
//! lifecycle, behavior flags) plus an explicit extension map for
//! data-driven attributes that have no fixed field. Equippable items
//! additionally carry an [`EquipProfile`] describing their slot, damage
//! dice, and named stat contributions.

use crate::dice::DiceExpr;
use crate::game::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Not participating in the simulation (e.g. an item on the floor)
    Inert,
    /// Actively simulated
    Alive,
    /// Defeated; kept only until removed from its container
    Dead,
}

/// Behavior flags shared by every entity.
///
/// These replace an open-ended string-keyed property bag for the flags the
/// simulation actually branches on; anything truly dynamic goes in
/// [`Entity::props`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFlags {
    /// Hostile to the player
    pub enemy: bool,
    /// Tracked by name-count in inventories rather than by identity
    pub stackable: bool,
    /// Can be placed in an equipment slot
    pub equippable: bool,
    /// Can be picked up off the floor
    pub collectable: bool,
    /// Responds to interaction (use, read, drink)
    pub interactable: bool,
    /// Draw-order hint for the rendering collaborator
    pub zorder: i32,
}

/// Equipment slots. At most one item occupies a slot at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    OffHand,
    Armour,
    Helmet,
    Amulet,
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::OffHand => "off-hand",
            EquipSlot::Armour => "armour",
            EquipSlot::Helmet => "helmet",
            EquipSlot::Amulet => "amulet",
        };
        write!(f, "{}", name)
    }
}

/// Equipment-specific data attached to equippable entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipProfile {
    /// Which slot this item occupies when equipped
    pub slot: EquipSlot,
    /// Damage dice, for weapons
    pub damage_dice: Option<DiceExpr>,
    /// Named numeric stats this item contributes while equipped
    /// (e.g. `ArmourClass`)
    pub stats: HashMap<String, i64>,
}

impl EquipProfile {
    /// Creates a profile for the given slot with no stats.
    pub fn new(slot: EquipSlot) -> Self {
        Self {
            slot,
            damage_dice: None,
            stats: HashMap::new(),
        }
    }

    /// Looks up a named stat, defaulting to 0.
    pub fn stat(&self, name: &str) -> i64 {
        self.stats.get(name).copied().unwrap_or(0)
    }
}

/// A game object: monster, item, prop, or the player's body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier
    pub id: EntityId,
    /// Display name; also the stacking key for stackable items
    pub name: String,
    /// Flavor description
    pub description: String,
    /// Single display glyph for the rendering collaborator
    pub glyph: char,
    /// Position on the current floor
    pub position: Position,
    /// Lifecycle state
    pub lifecycle: Lifecycle,
    /// Behavior flags
    pub flags: EntityFlags,
    /// Equipment data, present on equippable items
    pub equip: Option<EquipProfile>,
    /// Extension map for data-driven numeric attributes
    pub props: HashMap<String, i64>,
}

impl Entity {
    /// Creates a bare inert entity at the origin.
    pub fn new(name: impl Into<String>, glyph: char) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            description: String::new(),
            glyph,
            position: Position::origin(),
            lifecycle: Lifecycle::Inert,
            flags: EntityFlags::default(),
            equip: None,
            props: HashMap::new(),
        }
    }

    /// Whether the entity is currently alive.
    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    /// Marks the entity as dead.
    pub fn kill(&mut self) {
        self.lifecycle = Lifecycle::Dead;
    }

    /// Looks up an extension property, defaulting to 0.
    pub fn prop(&self, name: &str) -> i64 {
        self.props.get(name).copied().unwrap_or(0)
    }

    /// Sets an extension property.
    pub fn set_prop(&mut self, name: impl Into<String>, value: i64) {
        self.props.insert(name.into(), value);
    }

    /// Whether the entity may be placed in an equipment slot.
    ///
    /// Either explicitly equippable, or both collectable and interactable
    /// (an item usable in the hand even without an equipment table entry).
    pub fn is_equip_target(&self) -> bool {
        self.flags.equippable || (self.flags.collectable && self.flags.interactable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_defaults() {
        let entity = Entity::new("torch", '!');
        assert_eq!(entity.name, "torch");
        assert_eq!(entity.lifecycle, Lifecycle::Inert);
        assert!(!entity.is_alive());
        assert_eq!(entity.prop("Weight"), 0);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut entity = Entity::new("rat", 'r');
        entity.lifecycle = Lifecycle::Alive;
        assert!(entity.is_alive());
        entity.kill();
        assert_eq!(entity.lifecycle, Lifecycle::Dead);
        assert!(!entity.is_alive());
    }

    #[test]
    fn test_equip_target_rules() {
        let mut sword = Entity::new("sword", '/');
        assert!(!sword.is_equip_target());

        sword.flags.equippable = true;
        assert!(sword.is_equip_target());

        // Collectable + interactable counts even without the flag.
        let mut stick = Entity::new("stick", '|');
        stick.flags.collectable = true;
        assert!(!stick.is_equip_target());
        stick.flags.interactable = true;
        assert!(stick.is_equip_target());
    }

    #[test]
    fn test_extension_props() {
        let mut entity = Entity::new("idol", '$');
        entity.set_prop("Value", 250);
        assert_eq!(entity.prop("Value"), 250);
        assert_eq!(entity.prop("Cursed"), 0);
    }

    #[test]
    fn test_equip_profile_stat_default() {
        let mut profile = EquipProfile::new(EquipSlot::Armour);
        profile.stats.insert("ArmourClass".to_string(), 4);
        assert_eq!(profile.stat("ArmourClass"), 4);
        assert_eq!(profile.stat("Sharpness"), 0);
    }
}
