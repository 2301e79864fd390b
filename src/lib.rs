//! # Delver Roguelike Core
//!
//! A turn-based dungeon-crawler simulation: procedural floor generation,
//! field-of-view, dice-driven combat and character progression, and a
//! mode-driven turn state machine.
//!
//! ## Architecture Overview
//!
//! The crate is organized around a handful of cooperating subsystems:
//!
//! - **Content Registry**: name-keyed definition tables and the entity factory
//! - **Dice Resolver**: `NdM+B` notation backed by an explicit random source
//! - **Combat System**: stat ledgers, fighters, equipment slots
//! - **Generation System**: randomized room placement and corridor routing
//! - **Field of View**: recursive shadowcasting over the walkable grid
//! - **Game State**: turn sequencing, mode transitions, and the event queue
//!
//! Rendering, raw key handling, and on-disk persistence are external
//! collaborators. The core exposes read-only queries over the floor and
//! actors, consumes flat [`ActionIntent`] values, and produces [`Event`]s
//! on a drainable FIFO queue. The entire state graph is reachable from
//! [`GameState`] and serializable with serde.

pub mod content;
pub mod dice;
pub mod game;
pub mod generation;

pub use content::{ClassDef, ContentRegistry, EntityDef, EquipmentDef, RaceDef, SpellDef};
pub use dice::DiceExpr;
pub use game::{
    ability_modifier,
    // From fov
    compute_fov,
    // From combat
    resolve_attack,
    // From modes
    transition,
    Ability,
    // From actions
    ActionIntent,
    ActionOutcome,
    AttackSummary,
    CombatClass,
    Direction,
    // From entities
    Entity,
    EntityFlags,
    EntityId,
    EquipOutcome,
    EquipProfile,
    EquipSlot,
    // From events
    Event,
    EventKind,
    EventQueue,
    Fighter,
    Floor,
    // From fov
    FovConfig,
    // From state
    GameState,
    GameStatistics,
    Inventory,
    Lifecycle,
    // From modes
    Mode,
    Player,
    Position,
    SpellBook,
    Tile,
    TileKind,
    Trigger,
};
pub use generation::{FloorGenerator, GenerationConfig, Generator, Room, RouteMode, Tunnel};

/// Core error type for the Delver engine.
#[derive(thiserror::Error, Debug)]
pub enum DelverError {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Malformed dice expression
    #[error("Dice parse error: {0}")]
    Parse(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A domain rule was violated; the mode layer converts these into
    /// user-visible "action failed" events rather than crashing the turn.
    #[error("Rule violation: {0}")]
    Rule(#[from] RuleViolation),
}

/// Domain-rule violations raised by character-progression operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    /// The spell is not on the character class's spell list
    #[error("spell '{spell}' is not available to the {class} class")]
    OutsideClass { spell: String, class: String },

    /// The class's memorized-spell limit is already reached
    #[error("cannot memorize more than {limit} spells")]
    MemorizedLimit { limit: usize },
}

/// Result type used throughout the Delver codebase.
pub type DelverResult<T> = Result<T, DelverError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default floor width in tiles
    pub const DEFAULT_FLOOR_WIDTH: u32 = 80;

    /// Default floor height in tiles
    pub const DEFAULT_FLOOR_HEIGHT: u32 = 50;

    /// Default field-of-view radius in tiles
    pub const DEFAULT_FOV_RADIUS: i32 = 5;

    /// Placement attempts per requested room before it is dropped
    pub const ROOM_PLACEMENT_ATTEMPTS: u32 = 10;

    /// Base defence before armour and level bonuses
    pub const BASE_DEFENCE: i32 = 10;

    /// Hit points restored when a character levels up
    pub const LEVEL_UP_HEAL: i32 = 20;

    /// Experience points per level threshold
    pub const XP_PER_LEVEL: i64 = 1000;

    /// Default inventory capacity
    pub const DEFAULT_MAX_ITEMS: usize = 20;
}
