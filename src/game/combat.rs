//! # Combat Module
//!
//! The stat ledger backing every combatant, the [`Fighter`] composition of
//! ledger plus equipment, and d20 attack resolution.
//!
//! Hit points follow the classic convention: healing clamps to the
//! maximum, damage does not clamp below zero, and death triggers only once
//! hit points drop *below* zero. A fighter at exactly 0 HP is still on its
//! feet.

use crate::config;
use crate::content::{ClassDef, ContentRegistry};
use crate::dice::DiceExpr;
use crate::game::{Entity, EquipSlot};
use crate::{DelverError, DelverResult};
use log::warn;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

/// Standard tabletop ability modifier: floor((score - 10) / 2).
///
/// # Examples
///
/// ```
/// use delver::ability_modifier;
///
/// assert_eq!(ability_modifier(10), 0);
/// assert_eq!(ability_modifier(15), 2);
/// assert_eq!(ability_modifier(7), -2);
/// ```
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Named stat ledger for a combatant: level, experience, kills, ability
/// scores, and lazily resolved hit points.
///
/// Hit points are not fixed at creation. A class definition with
/// `level1_hp <= 0` defers to its hit dice, rolled the first time hit
/// points are read; the rolled value also becomes the maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatClass {
    /// Class name, matching the registry row it was built from
    pub name: String,
    /// Character level, starting at 1
    pub level: i32,
    /// Accumulated experience points
    pub xp: i64,
    /// Enemies defeated
    pub kills: u32,
    hp: Option<i32>,
    max_hp: Option<i32>,
    level1_hp: i32,
    level1_hp_dice: DiceExpr,
    abilities: HashMap<Ability, i32>,
    /// Extension map for data-driven stats with no fixed field
    pub extra: HashMap<String, i64>,
}

impl CombatClass {
    /// Builds a level-1 ledger from a class definition.
    pub fn from_def(def: &ClassDef) -> Self {
        Self {
            name: def.name.clone(),
            level: 1,
            xp: 0,
            kills: 0,
            hp: None,
            max_hp: None,
            level1_hp: def.level1_hp,
            level1_hp_dice: def.level1_hp_dice,
            abilities: def.abilities.clone(),
            extra: HashMap::new(),
        }
    }

    /// Current hit points, resolving them on first access.
    ///
    /// A fixed positive `level1_hp` is used as-is; otherwise the class hit
    /// dice are rolled once and the result fixes both current and maximum
    /// hit points.
    pub fn hp(&mut self, rng: &mut StdRng) -> i32 {
        self.ensure_hp(rng);
        self.hp.unwrap_or(0)
    }

    /// Maximum hit points, resolving on first access like [`hp`](Self::hp).
    pub fn max_hp(&mut self, rng: &mut StdRng) -> i32 {
        self.ensure_hp(rng);
        self.max_hp.unwrap_or(0)
    }

    /// Current hit points without forcing resolution.
    pub fn current_hp(&self) -> Option<i32> {
        self.hp
    }

    fn ensure_hp(&mut self, rng: &mut StdRng) {
        if self.hp.is_none() {
            let rolled = if self.level1_hp > 0 {
                self.level1_hp
            } else {
                self.level1_hp_dice.roll(rng)
            };
            self.hp = Some(rolled);
            self.max_hp = Some(rolled);
        }
    }

    /// Subtracts damage. No lower clamp: hit points go negative, which is
    /// what death detection keys on.
    pub fn take_damage(&mut self, amount: i32, rng: &mut StdRng) {
        self.ensure_hp(rng);
        if let Some(hp) = self.hp.as_mut() {
            *hp -= amount;
        }
    }

    /// Restores hit points, clamped to the maximum.
    pub fn heal(&mut self, amount: i32, rng: &mut StdRng) {
        self.ensure_hp(rng);
        if let (Some(hp), Some(max_hp)) = (self.hp.as_mut(), self.max_hp) {
            *hp = (*hp + amount).min(max_hp);
        }
    }

    /// An ability score, defaulting to 10 when the class never defined it.
    pub fn ability(&self, ability: Ability) -> i32 {
        self.abilities.get(&ability).copied().unwrap_or(10)
    }

    /// Raises an ability score by the given amount.
    pub fn raise_ability(&mut self, ability: Ability, by: i32) {
        *self.abilities.entry(ability).or_insert(10) += by;
    }

    /// Adds experience and reports how many level-ups are now pending.
    /// The caller applies them via `level_up`; nothing levels implicitly.
    pub fn gain_xp(&mut self, amount: i64) -> u32 {
        self.xp += amount;
        self.pending_level_ups()
    }

    /// Level-ups earned but not yet applied.
    pub fn pending_level_ups(&self) -> u32 {
        let mut level = self.level;
        let mut pending = 0;
        while self.xp >= level as i64 * config::XP_PER_LEVEL {
            level += 1;
            pending += 1;
        }
        pending
    }
}

/// Outcome of an equip attempt. Equipping an ineligible item is an
/// expected, recoverable result, reported here rather than as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EquipOutcome {
    /// The slot changed; carries whatever was equipped there before
    Applied { previous: Option<Entity> },
    /// The item was not an equip target, or no slot could be determined
    Rejected,
}

impl EquipOutcome {
    /// Whether the equip attempt took effect.
    pub fn succeeded(&self) -> bool {
        matches!(self, EquipOutcome::Applied { .. })
    }

    /// The item previously occupying the slot, if the attempt succeeded.
    pub fn previous(self) -> Option<Entity> {
        match self {
            EquipOutcome::Applied { previous } => previous,
            EquipOutcome::Rejected => None,
        }
    }
}

/// Result of one attack resolution, for event emission and statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackSummary {
    /// Raw d20 roll plus attack bonus
    pub attack_roll: i32,
    /// Defence value the roll was compared against
    pub defence: i32,
    /// Whether the attack connected
    pub hit: bool,
    /// Damage dealt (0 on a miss)
    pub damage: i32,
    /// Whether the defender died from this attack
    pub killed: bool,
}

/// A combat-capable character: stat ledger plus slot-based equipment.
///
/// The "bare hands" fallback weapon is injected from the content registry
/// at construction time, so an empty weapon slot still rolls damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    /// The stat ledger
    pub combat_class: CombatClass,
    equipment: HashMap<EquipSlot, Entity>,
    default_weapon: Entity,
}

impl Fighter {
    /// Creates a fighter from a ledger and the injected fallback weapon.
    pub fn new(combat_class: CombatClass, default_weapon: Entity) -> Self {
        Self {
            combat_class,
            equipment: HashMap::new(),
            default_weapon,
        }
    }

    /// Builds a fighter for a named class, resolving the class row and the
    /// fallback weapon from the registry. Unknown class names degrade to
    /// `None` (logged by the registry).
    pub fn from_registry(class_name: &str, registry: &ContentRegistry) -> Option<Self> {
        let class = CombatClass::from_def(registry.class(class_name)?);
        let default_weapon = registry.default_weapon()?;
        Some(Self::new(class, default_weapon))
    }

    /// Attack bonus: Strength modifier plus half the level, rounded down.
    pub fn attack_bonus(&self) -> i32 {
        ability_modifier(self.combat_class.ability(Ability::Str))
            + self.combat_class.level.div_euclid(2)
    }

    /// Defence: 10 plus total equipped armour class plus half the level.
    pub fn defence(&self) -> i32 {
        config::BASE_DEFENCE
            + self.equipment_stat_totals(&["ArmourClass"]) as i32
            + self.combat_class.level.div_euclid(2)
    }

    /// Rolls damage for the equipped weapon, falling back to the injected
    /// default when the weapon slot is empty.
    pub fn roll_damage(&self, rng: &mut StdRng) -> DelverResult<i32> {
        let dice = self
            .equipped(EquipSlot::Weapon)
            .and_then(|weapon| weapon.equip.as_ref())
            .and_then(|profile| profile.damage_dice)
            .or_else(|| {
                self.default_weapon
                    .equip
                    .as_ref()
                    .and_then(|profile| profile.damage_dice)
            })
            .ok_or_else(|| {
                DelverError::InvalidState("no damage dice on weapon or fallback".to_string())
            })?;
        Ok(dice.roll(rng))
    }

    /// The item currently equipped in a slot.
    pub fn equipped(&self, slot: EquipSlot) -> Option<&Entity> {
        self.equipment.get(&slot)
    }

    /// The full equipment map.
    pub fn equipment(&self) -> &HashMap<EquipSlot, Entity> {
        &self.equipment
    }

    /// Equips an item, inferring the slot from its equip profile when none
    /// is given. Passing `None` as the item unequips the slot. Returns the
    /// previously equipped item inside [`EquipOutcome::Applied`].
    ///
    /// Items that are neither equippable nor (collectable and
    /// interactable) are rejected; the caller must check the outcome.
    pub fn equip_item(&mut self, item: Option<Entity>, slot: Option<EquipSlot>) -> EquipOutcome {
        match item {
            Some(item) => {
                if !item.is_equip_target() {
                    warn!("'{}' cannot be equipped", item.name);
                    return EquipOutcome::Rejected;
                }
                let slot = match slot.or_else(|| item.equip.as_ref().map(|profile| profile.slot)) {
                    Some(slot) => slot,
                    None => {
                        warn!("no slot known for '{}'", item.name);
                        return EquipOutcome::Rejected;
                    }
                };
                EquipOutcome::Applied {
                    previous: self.equipment.insert(slot, item),
                }
            }
            None => match slot {
                Some(slot) => EquipOutcome::Applied {
                    previous: self.equipment.remove(&slot),
                },
                None => EquipOutcome::Rejected,
            },
        }
    }

    /// Sums a set of named stats across every equipped item, with missing
    /// stats counting as zero.
    pub fn equipment_stat_totals(&self, stat_names: &[&str]) -> i64 {
        self.equipment
            .values()
            .filter_map(|item| item.equip.as_ref())
            .map(|profile| {
                stat_names
                    .iter()
                    .map(|name| profile.stat(name))
                    .sum::<i64>()
            })
            .sum()
    }

    /// Applies damage to the ledger.
    pub fn take_damage(&mut self, amount: i32, rng: &mut StdRng) {
        self.combat_class.take_damage(amount, rng);
    }

    /// Heals the ledger, clamped to maximum hit points.
    pub fn heal(&mut self, amount: i32, rng: &mut StdRng) {
        self.combat_class.heal(amount, rng);
    }

    /// Whether this fighter has died: hit points strictly below zero.
    pub fn is_dead(&self) -> bool {
        self.combat_class.current_hp().is_some_and(|hp| hp < 0)
    }

    /// Raises the level by one and optionally a single ability score.
    ///
    /// The level-up heal bonus is applied by the player aggregate as a
    /// separate cooperating operation, not here.
    pub fn level_up(&mut self, stat: Option<Ability>) {
        self.combat_class.level += 1;
        if let Some(ability) = stat {
            self.combat_class.raise_ability(ability, 1);
        }
    }
}

/// Resolves one melee attack: 1d20 + attack bonus against defence; on a
/// hit the defender takes a weapon damage roll. Kill credit lands on the
/// attacker's ledger.
pub fn resolve_attack(
    attacker: &mut Fighter,
    defender: &mut Fighter,
    rng: &mut StdRng,
) -> DelverResult<AttackSummary> {
    let d20 = DiceExpr {
        count: 1,
        sides: 20,
        bonus: 0,
    };
    let attack_roll = d20.roll(rng) + attacker.attack_bonus();
    let defence = defender.defence();
    let hit = attack_roll >= defence;

    let mut damage = 0;
    let mut killed = false;
    if hit {
        damage = attacker.roll_damage(rng)?;
        let was_dead = defender.is_dead();
        defender.take_damage(damage, rng);
        killed = !was_dead && defender.is_dead();
        if killed {
            attacker.combat_class.kills += 1;
        }
    }

    Ok(AttackSummary {
        attack_roll,
        defence,
        hit,
        damage,
        killed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::EquipProfile;
    use crate::game::Position;
    use rand::SeedableRng;

    fn test_rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    fn fixed_hp_class(hp: i32) -> CombatClass {
        CombatClass::from_def(&ClassDef {
            name: "test".to_string(),
            level1_hp: hp,
            level1_hp_dice: DiceExpr::parse("1d8").unwrap(),
            abilities: HashMap::from([(Ability::Str, 14)]),
            spells: Vec::new(),
            max_memorized: 0,
        })
    }

    fn test_fighter(hp: i32) -> Fighter {
        let registry = ContentRegistry::builtin().unwrap();
        Fighter::new(fixed_hp_class(hp), registry.default_weapon().unwrap())
    }

    #[test]
    fn test_ability_modifier_table() {
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(14), 2);
        assert_eq!(ability_modifier(18), 4);
    }

    #[test]
    fn test_hp_resolves_lazily_from_dice() {
        let mut rng = test_rng();
        let mut class = CombatClass::from_def(&ClassDef {
            name: "rolled".to_string(),
            level1_hp: 0,
            level1_hp_dice: DiceExpr::parse("1d10+5").unwrap(),
            abilities: HashMap::new(),
            spells: Vec::new(),
            max_memorized: 0,
        });
        assert_eq!(class.current_hp(), None);
        let hp = class.hp(&mut rng);
        assert!((6..=15).contains(&hp));
        assert_eq!(class.max_hp(&mut rng), hp);
        // Resolution happens exactly once.
        assert_eq!(class.hp(&mut rng), hp);
    }

    #[test]
    fn test_hp_uses_fixed_value_when_positive() {
        let mut rng = test_rng();
        let mut class = fixed_hp_class(10);
        assert_eq!(class.hp(&mut rng), 10);
        assert_eq!(class.max_hp(&mut rng), 10);
    }

    #[test]
    fn test_damage_goes_negative_and_death_threshold() {
        let mut rng = test_rng();
        let mut fighter = test_fighter(10);
        fighter.take_damage(15, &mut rng);
        assert_eq!(fighter.combat_class.hp(&mut rng), -5);
        assert!(fighter.is_dead());

        // Exactly zero is alive.
        let mut standing = test_fighter(10);
        standing.take_damage(10, &mut rng);
        assert_eq!(standing.combat_class.hp(&mut rng), 0);
        assert!(!standing.is_dead());
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut rng = test_rng();
        let mut fighter = test_fighter(10);
        fighter.take_damage(4, &mut rng);
        fighter.heal(100, &mut rng);
        assert_eq!(fighter.combat_class.hp(&mut rng), 10);
    }

    #[test]
    fn test_attack_and_defence_formulas() {
        let registry = ContentRegistry::builtin().unwrap();
        let mut fighter = test_fighter(10);
        // Str 14 => +2 modifier; level 1 => +0.
        assert_eq!(fighter.attack_bonus(), 2);
        assert_eq!(fighter.defence(), 10);

        let armour = registry
            .spawn("leather armour", Position::origin())
            .unwrap();
        let shield = registry
            .spawn("wooden shield", Position::origin())
            .unwrap();
        assert!(fighter.equip_item(Some(armour), None).succeeded());
        assert!(fighter.equip_item(Some(shield), None).succeeded());
        assert_eq!(fighter.defence(), 13);

        fighter.level_up(None);
        fighter.level_up(None);
        // Level 3 => +1 to both.
        assert_eq!(fighter.attack_bonus(), 3);
        assert_eq!(fighter.defence(), 14);
    }

    #[test]
    fn test_equip_slot_inference_and_swap() {
        let registry = ContentRegistry::builtin().unwrap();
        let mut fighter = test_fighter(10);
        let sword = registry.spawn("short sword", Position::origin()).unwrap();

        let outcome = fighter.equip_item(Some(sword.clone()), None);
        assert_eq!(outcome, EquipOutcome::Applied { previous: None });
        assert_eq!(fighter.equipped(EquipSlot::Weapon).unwrap().name, sword.name);

        // Swapping returns the old weapon.
        let second = registry.spawn("short sword", Position::origin()).unwrap();
        let previous = fighter.equip_item(Some(second), None).previous();
        assert_eq!(previous.unwrap().id, sword.id);
    }

    #[test]
    fn test_equip_none_unequips_and_reports_previous() {
        let registry = ContentRegistry::builtin().unwrap();
        let mut fighter = test_fighter(10);

        // Unequipping an empty slot succeeds with no previous item, and
        // leaves the equipment map untouched.
        let outcome = fighter.equip_item(None, Some(EquipSlot::Weapon));
        assert_eq!(outcome, EquipOutcome::Applied { previous: None });
        assert!(fighter.equipment().is_empty());

        let sword = registry.spawn("short sword", Position::origin()).unwrap();
        fighter.equip_item(Some(sword.clone()), None);
        let removed = fighter.equip_item(None, Some(EquipSlot::Weapon)).previous();
        assert_eq!(removed.unwrap().id, sword.id);
        assert!(fighter.equipped(EquipSlot::Weapon).is_none());
    }

    #[test]
    fn test_equip_rejects_ineligible_items() {
        let mut fighter = test_fighter(10);
        let rock = Entity::new("rock", '*');
        assert_eq!(fighter.equip_item(Some(rock), None), EquipOutcome::Rejected);
        assert!(fighter.equipment().is_empty());

        // Equippable but with no profile and no explicit slot.
        let mut oddity = Entity::new("oddity", '?');
        oddity.flags.equippable = true;
        assert_eq!(
            fighter.equip_item(Some(oddity.clone()), None),
            EquipOutcome::Rejected
        );
        // An explicit slot makes it work.
        assert!(fighter
            .equip_item(Some(oddity), Some(EquipSlot::Amulet))
            .succeeded());
    }

    #[test]
    fn test_equipment_stat_totals_defaults_missing_to_zero() {
        let registry = ContentRegistry::builtin().unwrap();
        let mut fighter = test_fighter(10);
        assert_eq!(fighter.equipment_stat_totals(&["ArmourClass"]), 0);

        let armour = registry
            .spawn("leather armour", Position::origin())
            .unwrap();
        let sword = registry.spawn("short sword", Position::origin()).unwrap();
        fighter.equip_item(Some(armour), None);
        fighter.equip_item(Some(sword), None);
        // The sword has no ArmourClass stat and contributes zero.
        assert_eq!(fighter.equipment_stat_totals(&["ArmourClass"]), 2);
        assert_eq!(fighter.equipment_stat_totals(&["Sharpness"]), 0);
    }

    #[test]
    fn test_roll_damage_falls_back_to_bare_hands() {
        let mut rng = test_rng();
        let fighter = test_fighter(10);
        for _ in 0..50 {
            let damage = fighter.roll_damage(&mut rng).unwrap();
            assert!((1..=2).contains(&damage), "bare hands rolled {}", damage);
        }
    }

    #[test]
    fn test_roll_damage_uses_equipped_weapon() {
        let registry = ContentRegistry::builtin().unwrap();
        let mut rng = test_rng();
        let mut fighter = test_fighter(10);
        let sword = registry.spawn("short sword", Position::origin()).unwrap();
        fighter.equip_item(Some(sword), None);
        let mut saw_above_two = false;
        for _ in 0..100 {
            let damage = fighter.roll_damage(&mut rng).unwrap();
            assert!((1..=6).contains(&damage));
            saw_above_two |= damage > 2;
        }
        assert!(saw_above_two, "1d6 never rolled above 2 in 100 tries");
    }

    #[test]
    fn test_level_up_raises_ability_through_single_path() {
        let mut fighter = test_fighter(10);
        assert_eq!(fighter.combat_class.ability(Ability::Str), 14);
        fighter.level_up(Some(Ability::Str));
        assert_eq!(fighter.combat_class.level, 2);
        assert_eq!(fighter.combat_class.ability(Ability::Str), 15);
        fighter.level_up(None);
        assert_eq!(fighter.combat_class.level, 3);
        assert_eq!(fighter.combat_class.ability(Ability::Str), 15);
    }

    #[test]
    fn test_xp_thresholds_report_pending_level_ups() {
        let mut class = fixed_hp_class(10);
        assert_eq!(class.gain_xp(500), 0);
        assert_eq!(class.gain_xp(500), 1);
        // Two more thresholds at once.
        assert_eq!(class.gain_xp(2000), 2);
    }

    #[test]
    fn test_resolve_attack_eventually_kills() {
        let mut rng = test_rng();
        let mut attacker = test_fighter(10);
        let mut defender = test_fighter(3);

        let mut killed = false;
        for _ in 0..200 {
            let summary = resolve_attack(&mut attacker, &mut defender, &mut rng).unwrap();
            if summary.hit {
                assert!(summary.damage >= 1);
            } else {
                assert_eq!(summary.damage, 0);
            }
            if summary.killed {
                killed = true;
                break;
            }
        }
        assert!(killed, "defender survived 200 attacks");
        assert!(defender.is_dead());
        assert_eq!(attacker.combat_class.kills, 1);
    }

    #[test]
    fn test_equip_profile_slot_used_for_offhand() {
        let mut fighter = test_fighter(10);
        let mut buckler = Entity::new("buckler", ')');
        buckler.flags.equippable = true;
        buckler.equip = Some(EquipProfile::new(EquipSlot::OffHand));
        assert!(fighter.equip_item(Some(buckler), None).succeeded());
        assert!(fighter.equipped(EquipSlot::OffHand).is_some());
        assert!(fighter.equipped(EquipSlot::Weapon).is_none());
    }
}
