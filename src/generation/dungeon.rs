//! # Floor Generation
//!
//! Room-and-corridor floor assembly: randomized room placement with
//! collision avoidance, L-shaped tunnel routing between consecutive
//! rooms, and rasterization into the walkable grid.

use crate::config;
use crate::content::ContentRegistry;
use crate::game::{Floor, Position};
use crate::generation::{GenerationConfig, Generator, Room, RouteMode, Tunnel};
use crate::{DelverError, DelverResult};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Room-and-corridor floor generator.
///
/// Placement is best-effort: each requested room gets a bounded number of
/// attempts at a uniformly random center, and is dropped silently when no
/// non-touching position is found. The generator guarantees "`room_count`
/// attempts, each retried up to the limit", not an exact room count.
#[derive(Debug, Clone)]
pub struct FloorGenerator {
    /// Placement attempts per requested room before it is dropped
    pub max_placement_attempts: u32,
}

impl FloorGenerator {
    /// Creates a generator with the default retry budget.
    pub fn new() -> Self {
        Self {
            max_placement_attempts: config::ROOM_PLACEMENT_ATTEMPTS,
        }
    }

    /// Attempts to place one room, retrying up to the attempt budget.
    fn try_place_room(
        &self,
        conf: &GenerationConfig,
        rng: &mut StdRng,
        room_index: u32,
        placed: &[Room],
    ) -> Option<Room> {
        for _ in 0..self.max_placement_attempts {
            let width = rng.gen_range(conf.min_room_size..=conf.max_room_size);
            let height = rng.gen_range(conf.min_room_size..=conf.max_room_size);

            // Uniformly random center inside the floor bounds minus a
            // one-tile border.
            let center = Position::new(
                rng.gen_range(1..conf.floor_width as i32 - 1),
                rng.gen_range(1..conf.floor_height as i32 - 1),
            );
            let room = Room::from_center(format!("room {}", room_index), center, width, height);

            if !self.room_fits(conf, &room) {
                continue;
            }
            if placed.iter().any(|existing| room.touches(existing)) {
                continue;
            }
            return Some(room);
        }
        None
    }

    /// Whether the room lies fully within the floor bounds, keeping a
    /// one-tile border.
    fn room_fits(&self, conf: &GenerationConfig, room: &Room) -> bool {
        let bottom_right = room.bottom_right();
        room.top_left.x >= 1
            && room.top_left.y >= 1
            && bottom_right.x < conf.floor_width as i32 - 1
            && bottom_right.y < conf.floor_height as i32 - 1
    }

    /// Walkable positions in deterministic scan order, excluding the
    /// spawn room's interior.
    fn open_positions(floor: &Floor, spawn_room: &str) -> Vec<Position> {
        let protected: Vec<Position> = floor
            .room(spawn_room)
            .map(|room| room.floor_positions())
            .unwrap_or_default();
        let mut open = Vec::new();
        for y in 0..floor.height as i32 {
            for x in 0..floor.width as i32 {
                let pos = Position::new(x, y);
                if floor.is_walkable(pos) && !protected.contains(&pos) {
                    open.push(pos);
                }
            }
        }
        open
    }

    /// Populates a generated floor with monsters and items from the
    /// registry, density-driven and never inside the spawn room.
    pub fn populate(
        &self,
        floor: &mut Floor,
        registry: &ContentRegistry,
        conf: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        // Sorted name lists keep population deterministic per seed.
        let mut enemy_names = registry.enemy_names();
        enemy_names.sort_unstable();
        let mut item_names = registry.item_names();
        item_names.sort_unstable();

        let mut open = Self::open_positions(floor, "room 0");
        if open.is_empty() {
            return;
        }
        let walkable = open.len() + floor.room("room 0").map_or(0, |r| r.floor_positions().len());
        let monster_count = (walkable as f64 / 100.0 * conf.monster_density).round() as usize;
        let item_count = (walkable as f64 / 100.0 * conf.item_density).round() as usize;

        for _ in 0..monster_count {
            if open.is_empty() || enemy_names.is_empty() {
                break;
            }
            let pos = open.swap_remove(rng.gen_range(0..open.len()));
            let name = enemy_names[rng.gen_range(0..enemy_names.len())];
            if let Some(monster) = registry.spawn(name, pos) {
                floor.add_entity(monster);
            }
        }

        for _ in 0..item_count {
            if open.is_empty() || item_names.is_empty() {
                break;
            }
            let pos = open.swap_remove(rng.gen_range(0..open.len()));
            let name = item_names[rng.gen_range(0..item_names.len())];
            if let Some(item) = registry.spawn(name, pos) {
                floor.add_entity(item);
            }
        }

        // Occasionally a merchant sets up near the stairs.
        if !open.is_empty() && rng.gen_bool(0.25) {
            let pos = open.swap_remove(rng.gen_range(0..open.len()));
            if let Some(keeper) = registry.spawn("shopkeeper", pos) {
                floor.add_entity(keeper);
            }
        }
    }
}

impl Default for FloorGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator<Floor> for FloorGenerator {
    fn generate(&self, conf: &GenerationConfig, rng: &mut StdRng) -> DelverResult<Floor> {
        let mut floor = Floor::new("floor", conf.floor_width, conf.floor_height);
        let mut placed: Vec<Room> = Vec::new();

        for room_index in 0..conf.room_count {
            match self.try_place_room(conf, rng, room_index, &placed) {
                Some(room) => {
                    // Each accepted room after the first is tunnelled to
                    // the immediately previous one, routing chosen at
                    // random.
                    if let Some(previous) = placed.last() {
                        let route = if rng.gen_bool(0.5) {
                            RouteMode::HorizontalFirst
                        } else {
                            RouteMode::VerticalFirst
                        };
                        floor.add_tunnel(Tunnel::new(previous.center(), room.center(), route));
                    }
                    floor.add_room(room.clone());
                    placed.push(room);
                    // The walkable grid is rebuilt from scratch after
                    // every accepted room.
                    floor.rebuild_grid();
                }
                None => {
                    debug!(
                        "dropped room {} after {} placement attempts",
                        room_index, self.max_placement_attempts
                    );
                }
            }
        }

        if placed.is_empty() {
            return Err(DelverError::GenerationFailed(
                "failed to place any rooms".to_string(),
            ));
        }

        floor.player_spawn = placed[0].center();
        let last = &placed[placed.len() - 1];
        floor.stairs_down = Some(last.center());

        self.validate(&floor, conf)?;
        Ok(floor)
    }

    fn validate(&self, floor: &Floor, conf: &GenerationConfig) -> DelverResult<()> {
        let walkable = floor
            .tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| tile.kind.is_walkable())
            .count();
        if walkable == 0 {
            return Err(DelverError::GenerationFailed(
                "floor has no walkable tiles".to_string(),
            ));
        }

        for tunnel in floor.tunnels() {
            for pos in tunnel.segments() {
                if pos.x < 0
                    || pos.y < 0
                    || pos.x >= conf.floor_width as i32
                    || pos.y >= conf.floor_height as i32
                {
                    return Err(DelverError::GenerationFailed(format!(
                        "tunnel segment ({}, {}) out of bounds",
                        pos.x, pos.y
                    )));
                }
            }
        }

        if !floor.is_walkable(floor.player_spawn) {
            return Err(DelverError::GenerationFailed(
                "player spawn is not walkable".to_string(),
            ));
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "FloorGenerator"
    }
}
