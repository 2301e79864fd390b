//! # Content Registry
//!
//! Name-keyed definition tables for entities, combat classes, equipment,
//! races, and spells, plus the data-driven entity factory.
//!
//! The registry is constructed explicitly at startup and passed by
//! reference into the subsystems that need it; there is no global lookup
//! table. The tabular data provider that fills these tables from files is
//! an external collaborator; [`ContentRegistry::builtin`] supplies a small
//! self-contained data set so the engine, demo driver, and tests run
//! without one.

use crate::dice::DiceExpr;
use crate::game::{Ability, Entity, EntityFlags, EquipProfile, EquipSlot, Lifecycle, Position};
use crate::DelverResult;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Definition row for a spawnable entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    pub description: String,
    pub glyph: char,
    pub flags: EntityFlags,
    /// Combat class granted to this entity when it fights (monsters)
    pub combat_class: Option<String>,
    /// Extension properties copied onto spawned entities
    pub props: HashMap<String, i64>,
}

/// Definition row for a combat class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    /// Fixed first-level hit points; a value of 0 or below means the dice
    /// are rolled instead, the first time hit points are needed
    pub level1_hp: i32,
    /// Dice rolled when `level1_hp` is not fixed
    pub level1_hp_dice: DiceExpr,
    /// Starting ability scores
    pub abilities: HashMap<Ability, i32>,
    /// Spells available to this class
    pub spells: Vec<String>,
    /// How many spells may be memorized at once
    pub max_memorized: usize,
}

/// Definition row for an equippable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentDef {
    pub name: String,
    pub slot: EquipSlot,
    pub damage_dice: Option<DiceExpr>,
    /// Named stat contributions while equipped (e.g. `ArmourClass`)
    pub stats: HashMap<String, i64>,
}

/// Definition row for a playable race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceDef {
    pub name: String,
    pub description: String,
    pub ability_bonuses: HashMap<Ability, i32>,
}

/// Definition row for a spell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellDef {
    pub name: String,
    pub level: u32,
    pub description: String,
}

/// Name of the synthesized fallback weapon used when the weapon slot is
/// empty.
pub const UNARMED_NAME: &str = "bare hands";

/// Explicitly constructed content tables, injected by reference into the
/// generator and combat subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentRegistry {
    entities: HashMap<String, EntityDef>,
    classes: HashMap<String, ClassDef>,
    equipment: HashMap<String, EquipmentDef>,
    races: HashMap<String, RaceDef>,
    spells: HashMap<String, SpellDef>,
}

impl ContentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the built-in data set used by the demo driver and tests.
    pub fn builtin() -> DelverResult<Self> {
        let mut registry = Self::new();

        registry.add_class(ClassDef {
            name: "fighter".to_string(),
            level1_hp: 0,
            level1_hp_dice: DiceExpr::parse("1d10+5")?,
            abilities: HashMap::from([
                (Ability::Str, 15),
                (Ability::Dex, 12),
                (Ability::Con, 14),
                (Ability::Int, 8),
                (Ability::Wis, 10),
                (Ability::Cha, 10),
            ]),
            spells: Vec::new(),
            max_memorized: 0,
        });
        registry.add_class(ClassDef {
            name: "mage".to_string(),
            level1_hp: 0,
            level1_hp_dice: DiceExpr::parse("1d4+3")?,
            abilities: HashMap::from([
                (Ability::Str, 8),
                (Ability::Dex, 12),
                (Ability::Con, 10),
                (Ability::Int, 16),
                (Ability::Wis, 13),
                (Ability::Cha, 11),
            ]),
            spells: vec![
                "magic missile".to_string(),
                "shield".to_string(),
                "fireball".to_string(),
            ],
            max_memorized: 2,
        });
        registry.add_class(ClassDef {
            name: "vermin".to_string(),
            level1_hp: 4,
            level1_hp_dice: DiceExpr::parse("1d4")?,
            abilities: HashMap::from([
                (Ability::Str, 6),
                (Ability::Dex, 14),
                (Ability::Con, 8),
                (Ability::Int, 2),
                (Ability::Wis, 8),
                (Ability::Cha, 3),
            ]),
            spells: Vec::new(),
            max_memorized: 0,
        });

        registry.add_equipment(EquipmentDef {
            name: UNARMED_NAME.to_string(),
            slot: EquipSlot::Weapon,
            damage_dice: Some(DiceExpr::parse("1d2")?),
            stats: HashMap::new(),
        });
        registry.add_equipment(EquipmentDef {
            name: "short sword".to_string(),
            slot: EquipSlot::Weapon,
            damage_dice: Some(DiceExpr::parse("1d6")?),
            stats: HashMap::new(),
        });
        registry.add_equipment(EquipmentDef {
            name: "rusty fangs".to_string(),
            slot: EquipSlot::Weapon,
            damage_dice: Some(DiceExpr::parse("1d3")?),
            stats: HashMap::new(),
        });
        registry.add_equipment(EquipmentDef {
            name: "leather armour".to_string(),
            slot: EquipSlot::Armour,
            damage_dice: None,
            stats: HashMap::from([("ArmourClass".to_string(), 2)]),
        });
        registry.add_equipment(EquipmentDef {
            name: "wooden shield".to_string(),
            slot: EquipSlot::OffHand,
            damage_dice: None,
            stats: HashMap::from([("ArmourClass".to_string(), 1)]),
        });

        registry.add_entity(EntityDef {
            name: UNARMED_NAME.to_string(),
            description: "Knuckles and desperation.".to_string(),
            glyph: '-',
            flags: EntityFlags {
                equippable: true,
                ..EntityFlags::default()
            },
            combat_class: None,
            props: HashMap::new(),
        });
        registry.add_entity(EntityDef {
            name: "short sword".to_string(),
            description: "A plain, serviceable blade.".to_string(),
            glyph: '/',
            flags: EntityFlags {
                equippable: true,
                collectable: true,
                zorder: 1,
                ..EntityFlags::default()
            },
            combat_class: None,
            props: HashMap::new(),
        });
        registry.add_entity(EntityDef {
            name: "leather armour".to_string(),
            description: "Stiff boiled leather.".to_string(),
            glyph: '[',
            flags: EntityFlags {
                equippable: true,
                collectable: true,
                zorder: 1,
                ..EntityFlags::default()
            },
            combat_class: None,
            props: HashMap::new(),
        });
        registry.add_entity(EntityDef {
            name: "wooden shield".to_string(),
            description: "Better than nothing.".to_string(),
            glyph: ')',
            flags: EntityFlags {
                equippable: true,
                collectable: true,
                zorder: 1,
                ..EntityFlags::default()
            },
            combat_class: None,
            props: HashMap::new(),
        });
        registry.add_entity(EntityDef {
            name: "healing potion".to_string(),
            description: "A stoppered vial of red liquid.".to_string(),
            glyph: '!',
            flags: EntityFlags {
                stackable: true,
                collectable: true,
                interactable: true,
                zorder: 1,
                ..EntityFlags::default()
            },
            combat_class: None,
            props: HashMap::new(),
        });
        registry.add_entity(EntityDef {
            name: "giant rat".to_string(),
            description: "A rat the size of a dog.".to_string(),
            glyph: 'r',
            flags: EntityFlags {
                enemy: true,
                zorder: 2,
                ..EntityFlags::default()
            },
            combat_class: Some("vermin".to_string()),
            props: HashMap::new(),
        });
        registry.add_entity(EntityDef {
            name: "shopkeeper".to_string(),
            description: "A wary merchant with a heavy strongbox.".to_string(),
            glyph: '@',
            flags: EntityFlags {
                interactable: true,
                zorder: 2,
                ..EntityFlags::default()
            },
            combat_class: None,
            props: HashMap::from([("Shop".to_string(), 1)]),
        });

        registry.add_race(RaceDef {
            name: "human".to_string(),
            description: "Adaptable and unremarkable.".to_string(),
            ability_bonuses: HashMap::new(),
        });
        registry.add_race(RaceDef {
            name: "dwarf".to_string(),
            description: "Stout folk of the deep halls.".to_string(),
            ability_bonuses: HashMap::from([(Ability::Con, 2), (Ability::Cha, -1)]),
        });

        registry.add_spell(SpellDef {
            name: "magic missile".to_string(),
            level: 1,
            description: "An unerring dart of force.".to_string(),
        });
        registry.add_spell(SpellDef {
            name: "shield".to_string(),
            level: 1,
            description: "A shimmering barrier of force.".to_string(),
        });
        registry.add_spell(SpellDef {
            name: "fireball".to_string(),
            level: 3,
            description: "A bead that blossoms into flame.".to_string(),
        });
        registry.add_spell(SpellDef {
            name: "raise dead".to_string(),
            level: 5,
            description: "Calls a soul back to its body.".to_string(),
        });

        Ok(registry)
    }

    /// Inserts or replaces an entity definition.
    pub fn add_entity(&mut self, def: EntityDef) {
        self.entities.insert(def.name.clone(), def);
    }

    /// Inserts or replaces a class definition.
    pub fn add_class(&mut self, def: ClassDef) {
        self.classes.insert(def.name.clone(), def);
    }

    /// Inserts or replaces an equipment definition.
    pub fn add_equipment(&mut self, def: EquipmentDef) {
        self.equipment.insert(def.name.clone(), def);
    }

    /// Inserts or replaces a race definition.
    pub fn add_race(&mut self, def: RaceDef) {
        self.races.insert(def.name.clone(), def);
    }

    /// Inserts or replaces a spell definition.
    pub fn add_spell(&mut self, def: SpellDef) {
        self.spells.insert(def.name.clone(), def);
    }

    /// Looks up an entity definition. Unknown names are logged and degrade
    /// to `None`; callers must handle the miss.
    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        let def = self.entities.get(name);
        if def.is_none() {
            warn!("unknown entity definition '{}'", name);
        }
        def
    }

    /// Looks up a class definition.
    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        let def = self.classes.get(name);
        if def.is_none() {
            warn!("unknown class definition '{}'", name);
        }
        def
    }

    /// Looks up an equipment definition.
    pub fn equipment(&self, name: &str) -> Option<&EquipmentDef> {
        let def = self.equipment.get(name);
        if def.is_none() {
            warn!("unknown equipment definition '{}'", name);
        }
        def
    }

    /// Looks up a race definition.
    pub fn race(&self, name: &str) -> Option<&RaceDef> {
        let def = self.races.get(name);
        if def.is_none() {
            warn!("unknown race definition '{}'", name);
        }
        def
    }

    /// Looks up a spell definition.
    pub fn spell(&self, name: &str) -> Option<&SpellDef> {
        let def = self.spells.get(name);
        if def.is_none() {
            warn!("unknown spell definition '{}'", name);
        }
        def
    }

    /// Names of all defined enemies, in table order (unspecified).
    pub fn enemy_names(&self) -> Vec<&str> {
        self.entities
            .values()
            .filter(|def| def.flags.enemy)
            .map(|def| def.name.as_str())
            .collect()
    }

    /// Names of all collectable item definitions.
    pub fn item_names(&self) -> Vec<&str> {
        self.entities
            .values()
            .filter(|def| def.flags.collectable)
            .map(|def| def.name.as_str())
            .collect()
    }

    /// Spawns an entity from its definition at the given position.
    ///
    /// Equipment data is merged in from the equipment table when present.
    /// Returns `None` (after logging) for unknown names.
    pub fn spawn(&self, name: &str, position: Position) -> Option<Entity> {
        let def = self.entity(name)?;
        let mut entity = Entity::new(def.name.clone(), def.glyph);
        entity.description = def.description.clone();
        entity.position = position;
        entity.flags = def.flags.clone();
        entity.props = def.props.clone();
        entity.lifecycle = if def.flags.enemy {
            Lifecycle::Alive
        } else {
            Lifecycle::Inert
        };
        if let Some(equip_def) = self.equipment.get(name) {
            entity.equip = Some(EquipProfile {
                slot: equip_def.slot,
                damage_dice: equip_def.damage_dice,
                stats: equip_def.stats.clone(),
            });
        }
        Some(entity)
    }

    /// Resolves the synthesized fallback weapon handed to every fighter at
    /// construction time.
    pub fn default_weapon(&self) -> Option<Entity> {
        self.spawn(UNARMED_NAME, Position::origin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_consistent() {
        let registry = ContentRegistry::builtin().unwrap();

        // Every class spell must exist in the spell table.
        for class_name in ["fighter", "mage", "vermin"] {
            let class = registry.class(class_name).unwrap();
            for spell in &class.spells {
                assert!(
                    registry.spell(spell).is_some(),
                    "class {} references unknown spell {}",
                    class_name,
                    spell
                );
            }
        }

        // Every monster class must exist in the class table.
        for name in registry.enemy_names() {
            let def = registry.entity(name).unwrap();
            let class = def.combat_class.as_ref().unwrap();
            assert!(registry.class(class).is_some());
        }
    }

    #[test]
    fn test_lookup_miss_degrades_to_none() {
        let registry = ContentRegistry::builtin().unwrap();
        assert!(registry.entity("beholder").is_none());
        assert!(registry.class("bard").is_none());
        assert!(registry.spawn("beholder", Position::origin()).is_none());
    }

    #[test]
    fn test_spawn_merges_equipment_profile() {
        let registry = ContentRegistry::builtin().unwrap();
        let sword = registry
            .spawn("short sword", Position::new(3, 4))
            .unwrap();
        assert_eq!(sword.position, Position::new(3, 4));
        assert!(sword.flags.equippable);
        let profile = sword.equip.as_ref().unwrap();
        assert_eq!(profile.slot, EquipSlot::Weapon);
        assert_eq!(profile.damage_dice.unwrap().to_string(), "1d6");

        let potion = registry
            .spawn("healing potion", Position::origin())
            .unwrap();
        assert!(potion.equip.is_none());
        assert!(potion.flags.stackable);
    }

    #[test]
    fn test_spawned_enemies_are_alive() {
        let registry = ContentRegistry::builtin().unwrap();
        let rat = registry.spawn("giant rat", Position::origin()).unwrap();
        assert_eq!(rat.lifecycle, Lifecycle::Alive);
        let sword = registry.spawn("short sword", Position::origin()).unwrap();
        assert_eq!(sword.lifecycle, Lifecycle::Inert);
    }

    #[test]
    fn test_default_weapon_is_unarmed() {
        let registry = ContentRegistry::builtin().unwrap();
        let fists = registry.default_weapon().unwrap();
        assert_eq!(fists.name, UNARMED_NAME);
        assert!(fists.equip.as_ref().unwrap().damage_dice.is_some());
    }
}
