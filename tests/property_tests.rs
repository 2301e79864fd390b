//! Randomized property tests over the dice resolver, inventory bounds,
//! fighter death threshold, and the exploration mask.

use delver::{
    compute_fov, ContentRegistry, DiceExpr, Entity, Fighter, Floor, FovConfig, Inventory, Position,
    TileKind,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    /// Every `NdM+B` roll lands in `[N + B, N * M + B]`.
    #[test]
    fn dice_rolls_stay_in_range(
        count in 1u32..10,
        sides in 1u32..20,
        bonus in 0u32..15,
        seed in any::<u64>(),
    ) {
        let expr = DiceExpr::new(count, sides, bonus).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..20 {
            let result = expr.roll(&mut rng);
            prop_assert!(result >= expr.min());
            prop_assert!(result <= expr.max());
        }
    }

    /// Round-tripping a well-formed notation preserves the components.
    #[test]
    fn dice_notation_round_trips(
        count in 1u32..100,
        sides in 1u32..100,
        bonus in 0u32..100,
    ) {
        let notation = if bonus > 0 {
            format!("{}d{}+{}", count, sides, bonus)
        } else {
            format!("{}d{}", count, sides)
        };
        let expr = DiceExpr::parse(&notation).unwrap();
        prop_assert_eq!(expr.count, count);
        prop_assert_eq!(expr.sides, sides);
        prop_assert_eq!(expr.bonus, bonus);
    }

    /// No sequence of adds pushes occupancy past capacity.
    #[test]
    fn inventory_occupancy_never_exceeds_capacity(
        capacity in 1usize..8,
        ops in prop::collection::vec((any::<bool>(), any::<bool>(), 0u8..6), 0..60),
    ) {
        let mut inventory = Inventory::new(capacity);
        for (add, stackable, name_index) in ops {
            let mut item = Entity::new(format!("item {}", name_index), '?');
            item.flags.stackable = stackable;
            if add {
                inventory.add_item(item);
            } else {
                inventory.remove_item(&item);
            }
            prop_assert!(inventory.items() <= capacity);
        }
    }

    /// `is_dead` is true exactly when hit points are below zero, under any
    /// interleaving of damage and healing.
    #[test]
    fn fighter_death_tracks_negative_hp(
        ops in prop::collection::vec((any::<bool>(), 1i32..30), 1..40),
        seed in any::<u64>(),
    ) {
        let registry = ContentRegistry::builtin().unwrap();
        let mut fighter = Fighter::from_registry("fighter", &registry).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        for (damage, amount) in ops {
            if damage {
                fighter.take_damage(amount, &mut rng);
            } else {
                fighter.heal(amount, &mut rng);
            }
            let hp = fighter.combat_class.hp(&mut rng);
            prop_assert_eq!(fighter.is_dead(), hp < 0);
        }
    }

    /// The explored mask only ever grows, wherever the origin wanders.
    #[test]
    fn explored_mask_is_monotonic(
        origins in prop::collection::vec((1i32..29, 1i32..19), 1..25),
        light_walls in any::<bool>(),
    ) {
        let mut floor = Floor::new("arena", 30, 20);
        for y in 1..19 {
            for x in 1..29 {
                floor.tile_mut(Position::new(x, y)).unwrap().kind = TileKind::Floor;
            }
        }
        let fov = FovConfig { radius: 5, light_walls };

        let mut explored = 0;
        for (x, y) in origins {
            compute_fov(&mut floor, Position::new(x, y), &fov);
            let now = floor.explored_count();
            prop_assert!(now >= explored);
            explored = now;
        }
    }
}
