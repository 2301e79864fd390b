//! # Generation Module
//!
//! Procedural floor generation: rectangular rooms, L-shaped tunnels, and
//! the room-and-corridor generator that assembles them.

pub mod dungeon;

pub use dungeon::*;

use crate::game::Position;
use crate::DelverResult;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Floor width in tiles
    pub floor_width: u32,
    /// Floor height in tiles
    pub floor_height: u32,
    /// Rooms attempted per floor; each gets a bounded number of placement
    /// tries and is dropped afterwards, so this is a target, not a
    /// guarantee
    pub room_count: u32,
    /// Minimum room dimension (including the wall ring)
    pub min_room_size: u32,
    /// Maximum room dimension (including the wall ring)
    pub max_room_size: u32,
    /// Monsters per 100 walkable tiles
    pub monster_density: f64,
    /// Items per 100 walkable tiles
    pub item_density: f64,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delver::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert!(config.min_room_size >= 4);
    /// assert!(config.max_room_size >= config.min_room_size);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            floor_width: crate::config::DEFAULT_FLOOR_WIDTH,
            floor_height: crate::config::DEFAULT_FLOOR_HEIGHT,
            room_count: 15,
            min_room_size: 5,
            max_room_size: 12,
            monster_density: 1.0,
            item_density: 0.5,
        }
    }

    /// Creates a configuration for testing with smaller, simpler floors.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            floor_width: 40,
            floor_height: 30,
            room_count: 6,
            min_room_size: 4,
            max_room_size: 7,
            monster_density: 0.0,
            item_density: 0.0,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// A rectangular room, including its one-tile wall ring.
///
/// Rooms are the primary structural element of generated floors and are
/// identified by unique name within a floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique name within the floor
    pub name: String,
    /// Top-left corner
    pub top_left: Position,
    /// Width including walls
    pub width: u32,
    /// Height including walls
    pub height: u32,
}

impl Room {
    /// Creates a room from its top-left corner.
    pub fn new(name: impl Into<String>, top_left: Position, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            top_left,
            width,
            height,
        }
    }

    /// Creates a room positioned around a center point.
    pub fn from_center(name: impl Into<String>, center: Position, width: u32, height: u32) -> Self {
        let top_left = Position::new(
            center.x - width as i32 / 2,
            center.y - height as i32 / 2,
        );
        Self::new(name, top_left, width, height)
    }

    /// Bottom-right corner.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 - 1,
            self.top_left.y + self.height as i32 - 1,
        )
    }

    /// Center position.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 / 2,
            self.top_left.y + self.height as i32 / 2,
        )
    }

    /// Whether a position lies inside the room rectangle (walls included).
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.top_left.x
            && pos.y >= self.top_left.y
            && pos.x < self.top_left.x + self.width as i32
            && pos.y < self.top_left.y + self.height as i32
    }

    /// Whether two room rectangles intersect.
    pub fn intersects(&self, other: &Room) -> bool {
        !(self.top_left.x >= other.top_left.x + other.width as i32
            || other.top_left.x >= self.top_left.x + self.width as i32
            || self.top_left.y >= other.top_left.y + other.height as i32
            || other.top_left.y >= self.top_left.y + self.height as i32)
    }

    /// Whether two rooms touch: their rectangles, inflated by a one-tile
    /// border, intersect. Touching rooms may not both be placed.
    pub fn touches(&self, other: &Room) -> bool {
        let inflated = Room::new(
            self.name.clone(),
            Position::new(self.top_left.x - 1, self.top_left.y - 1),
            self.width + 2,
            self.height + 2,
        );
        inflated.intersects(other)
    }

    /// Interior positions (the walkable part, excluding the wall ring).
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for y in (self.top_left.y + 1)..(self.top_left.y + self.height as i32 - 1) {
            for x in (self.top_left.x + 1)..(self.top_left.x + self.width as i32 - 1) {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }
}

/// Which leg an L-shaped tunnel walks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteMode {
    HorizontalFirst,
    VerticalFirst,
}

/// An L-shaped corridor between two points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tunnel {
    pub start: Position,
    pub end: Position,
    pub route: RouteMode,
}

impl Tunnel {
    /// Creates a tunnel with an explicit routing mode.
    pub fn new(start: Position, end: Position, route: RouteMode) -> Self {
        Self { start, end, route }
    }

    /// The explicit tile sequence of the tunnel: one straight leg, the
    /// corner, then the other leg.
    pub fn segments(&self) -> Vec<Position> {
        let mut tiles = Vec::new();
        match self.route {
            RouteMode::HorizontalFirst => {
                for x in span(self.start.x, self.end.x) {
                    tiles.push(Position::new(x, self.start.y));
                }
                for y in span(self.start.y, self.end.y) {
                    tiles.push(Position::new(self.end.x, y));
                }
            }
            RouteMode::VerticalFirst => {
                for y in span(self.start.y, self.end.y) {
                    tiles.push(Position::new(self.start.x, y));
                }
                for x in span(self.start.x, self.end.x) {
                    tiles.push(Position::new(x, self.end.y));
                }
            }
        }
        tiles
    }
}

fn span(a: i32, b: i32) -> std::ops::RangeInclusive<i32> {
    a.min(b)..=a.max(b)
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random
    /// number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelverResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelverResult<()>;

    /// Generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }
}
