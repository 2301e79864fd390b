//! # Game State Module
//!
//! Central coordination of the simulation: the current floor, the player,
//! the content registry, the mode state machine, turn sequencing, and the
//! event queue feeding the presentation collaborator.
//!
//! One logical frame for the embedding loop is: drain the event queue,
//! render, block for one input intent, hand it to
//! [`GameState::handle_intent`]. All mutation happens synchronously inside
//! that call; a tick advances only when a turn-consuming action succeeds.

use crate::config;
use crate::content::ContentRegistry;
use crate::game::{
    compute_fov, resolve_attack, transition, ActionIntent, ActionOutcome, Direction, EntityId,
    Event, EventKind, EventQueue, Fighter, Floor, FovConfig, Mode, Player, Trigger,
};
use crate::generation::{FloorGenerator, GenerationConfig, Generator};
use crate::{DelverError, DelverResult};
use log::{debug, info};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Experience awarded per kill.
const KILL_XP: i64 = 250;

/// Running statistics for the current game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Steps actually taken
    pub steps_taken: u64,
    /// Enemies defeated
    pub enemies_defeated: u32,
    /// Items picked up
    pub items_collected: u32,
    /// Deepest floor reached (1-based)
    pub deepest_floor: u32,
}

/// Central game state: everything reachable from here, and therefore
/// everything the persistence collaborator serializes, lives in one graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Injected content tables
    pub registry: ContentRegistry,
    /// The player; outlives floors
    pub player: Player,
    /// The current floor
    pub floor: Floor,
    /// Current depth, 1-based
    pub depth: u32,
    /// Current top-level mode
    mode: Mode,
    /// Whether simulation ticking is active; paired with the mode
    running: bool,
    /// Turn counter
    pub turn: u64,
    /// Outbound events for the presentation collaborator
    pub events: EventQueue,
    /// Field-of-view parameters
    pub fov: FovConfig,
    /// Generation parameters for subsequent floors
    pub generation: GenerationConfig,
    /// World seed
    pub seed: u64,
    /// Game statistics
    pub statistics: GameStatistics,
    monster_fighters: HashMap<EntityId, Fighter>,
}

impl GameState {
    /// Creates a new game on a freshly generated first floor.
    ///
    /// The game starts in [`Mode::Start`] with the simulation paused; the
    /// player is bound to the floor once character creation finishes.
    pub fn new(seed: u64, registry: ContentRegistry) -> DelverResult<Self> {
        Self::with_generation(seed, registry, GenerationConfig::new(seed))
    }

    /// Creates a new game with explicit generation parameters.
    pub fn with_generation(
        seed: u64,
        registry: ContentRegistry,
        generation: GenerationConfig,
    ) -> DelverResult<Self> {
        let generator = FloorGenerator::new();
        let mut rng = crate::generation::utils::create_rng(&generation);
        let mut floor = generator.generate(&generation, &mut rng)?;
        generator.populate(&mut floor, &registry, &generation, &mut rng);
        floor.name = "floor 1".to_string();

        let mut state = Self {
            registry,
            player: Player::new("Adventurer"),
            floor,
            depth: 1,
            mode: Mode::Start,
            running: false,
            turn: 0,
            events: EventQueue::new(),
            fov: FovConfig::default(),
            generation,
            seed,
            statistics: GameStatistics {
                deepest_floor: 1,
                ..GameStatistics::default()
            },
            monster_fighters: HashMap::new(),
        };
        state.bind_monsters();
        Ok(state)
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether simulation ticking is active.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the run has ended.
    pub fn is_game_over(&self) -> bool {
        self.mode == Mode::GameOver
    }

    /// Switches mode, pairing the run/pause flag with it. Re-entering the
    /// current mode is a no-op.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        debug!("mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.running = !mode.pauses_simulation();
        self.events.push(Event::new(
            EventKind::State,
            "mode_changed",
            format!("mode is now {}", mode),
        ));
    }

    /// Applies a trigger through the transition table. Returns whether a
    /// transition happened (no-op pairs return `false`).
    pub fn apply_trigger(&mut self, trigger: Trigger) -> bool {
        match transition(self.mode, trigger) {
            Some(next) => {
                self.set_mode(next);
                true
            }
            None => false,
        }
    }

    /// Pushes an event, applying the forced mode transitions the machine
    /// listens for: a `game_over` state event and an `enter_shop` game
    /// event override player input.
    pub fn emit(&mut self, event: Event) {
        let forced = match (event.kind, event.name.as_str()) {
            (EventKind::State, "game_over") => Some(Trigger::GameEnded),
            (EventKind::Game, "enter_shop") => Some(Trigger::ShopEntered),
            _ => None,
        };
        self.events.push(event);
        if let Some(trigger) = forced {
            self.apply_trigger(trigger);
        }
    }

    /// Drains all pending events, oldest first. Called once per frame by
    /// the presentation collaborator.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Handles one flat action intent against the current mode.
    ///
    /// Failed actions consume no turn and emit an `action_failed` control
    /// event; domain-rule violations are caught here and reported the same
    /// way. Dice parse errors and state corruption propagate.
    pub fn handle_intent(
        &mut self,
        intent: ActionIntent,
        rng: &mut StdRng,
    ) -> DelverResult<ActionOutcome> {
        if let ActionIntent::Quit = intent {
            self.emit(Event::new(EventKind::Quit, "quit", "the player quits"));
            return Ok(ActionOutcome::Free);
        }

        match (self.mode, intent) {
            (Mode::Start, ActionIntent::StartGame) => {
                self.apply_trigger(Trigger::StartGame);
                Ok(ActionOutcome::Free)
            }

            (Mode::CharacterCreation, ActionIntent::ChooseRace(race_name)) => {
                if self.player.choose_race(&race_name, &self.registry) {
                    Ok(ActionOutcome::Free)
                } else {
                    self.fail(format!("no such race: {}", race_name));
                    Ok(ActionOutcome::Failed)
                }
            }
            (Mode::CharacterCreation, ActionIntent::ChooseClass(class_name)) => {
                if self.player.choose_class(&class_name, &self.registry) {
                    self.apply_trigger(Trigger::ClassChosen);
                    self.enter_floor();
                    Ok(ActionOutcome::Free)
                } else {
                    self.fail(format!("no such class: {}", class_name));
                    Ok(ActionOutcome::Failed)
                }
            }
            (Mode::CharacterCreation, ActionIntent::Exit) => {
                self.apply_trigger(Trigger::Exit);
                Ok(ActionOutcome::Free)
            }

            (Mode::Playing, ActionIntent::Move(direction)) => self.handle_move(direction, rng),
            (Mode::Playing, ActionIntent::Wait) => {
                self.tick(rng)?;
                Ok(ActionOutcome::Turn)
            }
            (Mode::Playing, ActionIntent::TakeStairs) => self.handle_stairs(rng),
            (Mode::Playing, ActionIntent::PickUp) => self.handle_pickup(),
            (Mode::Playing, ActionIntent::OpenInventory) => {
                self.apply_trigger(Trigger::OpenInventory);
                Ok(ActionOutcome::Free)
            }
            (Mode::Playing, ActionIntent::OpenCharacter) => {
                self.apply_trigger(Trigger::OpenCharacter);
                Ok(ActionOutcome::Free)
            }
            (Mode::Playing, ActionIntent::Pause) => {
                self.apply_trigger(Trigger::Pause);
                Ok(ActionOutcome::Free)
            }

            (Mode::Inventory, ActionIntent::Equip(name)) => self.handle_equip(&name),
            (Mode::Inventory, ActionIntent::Unequip(slot)) => self.handle_unequip(slot),
            (Mode::Inventory, ActionIntent::CloseMenu) => {
                self.apply_trigger(Trigger::CloseMenu);
                Ok(ActionOutcome::Free)
            }

            (Mode::Character, ActionIntent::LearnSpell(name)) => {
                match self.player.learn_spell(&name, &self.registry) {
                    Ok(true) => Ok(ActionOutcome::Free),
                    Ok(false) => {
                        self.fail(format!("no such spell: {}", name));
                        Ok(ActionOutcome::Failed)
                    }
                    Err(DelverError::Rule(violation)) => {
                        self.fail(violation.to_string());
                        Ok(ActionOutcome::Failed)
                    }
                    Err(other) => Err(other),
                }
            }
            (Mode::Character, ActionIntent::MemorizeSpell(name)) => {
                match self.player.memorize_spell(&name) {
                    Ok(()) => Ok(ActionOutcome::Free),
                    Err(DelverError::Rule(violation)) => {
                        self.fail(violation.to_string());
                        Ok(ActionOutcome::Failed)
                    }
                    Err(DelverError::InvalidAction(reason)) => {
                        self.fail(reason);
                        Ok(ActionOutcome::Failed)
                    }
                    Err(other) => Err(other),
                }
            }
            (Mode::Character, ActionIntent::SpendLevelUp(stat)) => self.handle_level_up(stat, rng),
            (Mode::Character, ActionIntent::CloseMenu) => {
                self.apply_trigger(Trigger::CloseMenu);
                Ok(ActionOutcome::Free)
            }

            (Mode::Shop, ActionIntent::CloseMenu) => {
                self.apply_trigger(Trigger::CloseMenu);
                Ok(ActionOutcome::Free)
            }

            (Mode::Paused, ActionIntent::Resume) => {
                self.apply_trigger(Trigger::Resume);
                Ok(ActionOutcome::Free)
            }
            (Mode::Paused, ActionIntent::Exit) => {
                // Quit-from-pause discards progress back to the title
                // state.
                self.apply_trigger(Trigger::Exit);
                Ok(ActionOutcome::Free)
            }

            (Mode::GameOver, ActionIntent::Exit) => {
                self.apply_trigger(Trigger::Exit);
                Ok(ActionOutcome::Free)
            }

            _ => Ok(ActionOutcome::Ignored),
        }
    }

    /// Binds the player to the current floor: spawn position, visibility,
    /// and an entry event.
    fn enter_floor(&mut self) {
        self.player.set_position(self.floor.player_spawn);
        compute_fov(&mut self.floor, self.player.position(), &self.fov);
        self.emit(Event::new(
            EventKind::Game,
            "new_floor",
            format!("entering {} (depth {})", self.floor.name, self.depth),
        ));
    }

    /// Builds fighters for every enemy on the current floor.
    fn bind_monsters(&mut self) {
        self.monster_fighters.clear();
        let classes: Vec<(EntityId, String)> = self
            .floor
            .entities()
            .iter()
            .filter(|entity| entity.flags.enemy)
            .filter_map(|entity| {
                self.registry
                    .entity(&entity.name)
                    .and_then(|def| def.combat_class.clone())
                    .map(|class| (entity.id, class))
            })
            .collect();
        for (id, class) in classes {
            if let Some(fighter) = Fighter::from_registry(&class, &self.registry) {
                self.monster_fighters.insert(id, fighter);
            }
        }
    }

    /// Emits the standard failed-action control event.
    fn fail(&mut self, reason: impl Into<String>) {
        self.emit(Event::new(EventKind::Control, "action_failed", reason));
    }

    fn handle_move(
        &mut self,
        direction: Direction,
        rng: &mut StdRng,
    ) -> DelverResult<ActionOutcome> {
        let (dx, dy) = direction.delta();
        let target = self.player.position().offset(dx, dy);

        // Bump-attack anything hostile standing there.
        if let Some(enemy) = self.floor.enemy_at(target) {
            let enemy_id = enemy.id;
            return self.handle_attack(enemy_id, rng);
        }

        // Stepping into a shop hands control to the shop mode.
        let enters_shop = self
            .floor
            .entities_at(target)
            .any(|entity| entity.prop("Shop") != 0);
        if enters_shop {
            self.emit(Event::new(
                EventKind::Game,
                "enter_shop",
                "a merchant beckons",
            ));
            return Ok(ActionOutcome::Free);
        }

        if !self.floor.is_walkable(target) {
            self.fail("the way is blocked");
            return Ok(ActionOutcome::Failed);
        }

        self.player.set_position(target);
        self.statistics.steps_taken += 1;
        compute_fov(&mut self.floor, target, &self.fov);
        self.tick(rng)?;
        Ok(ActionOutcome::Turn)
    }

    fn handle_attack(&mut self, enemy_id: EntityId, rng: &mut StdRng) -> DelverResult<ActionOutcome> {
        let summary = match (
            self.player.fighter.as_mut(),
            self.monster_fighters.get_mut(&enemy_id),
        ) {
            (Some(player_fighter), Some(monster_fighter)) => {
                resolve_attack(player_fighter, monster_fighter, rng)?
            }
            _ => {
                self.fail("nothing there to fight");
                return Ok(ActionOutcome::Failed);
            }
        };

        let enemy_name = self
            .floor
            .entity(enemy_id)
            .map(|entity| entity.name.clone())
            .unwrap_or_else(|| "something".to_string());

        if summary.hit {
            self.emit(Event::new(
                EventKind::Game,
                "attack_hit",
                format!("you hit the {} for {}", enemy_name, summary.damage),
            ));
        } else {
            self.emit(Event::new(
                EventKind::Game,
                "attack_miss",
                format!("you miss the {}", enemy_name),
            ));
        }

        if summary.killed {
            if let Some(entity) = self
                .floor
                .entities_mut()
                .iter_mut()
                .find(|entity| entity.id == enemy_id)
            {
                entity.kill();
            }
            self.statistics.enemies_defeated += 1;
            self.emit(Event::new(
                EventKind::Game,
                "enemy_died",
                format!("the {} dies", enemy_name),
            ));
            if let Some(fighter) = self.player.fighter.as_mut() {
                if fighter.combat_class.gain_xp(KILL_XP) > 0 {
                    self.emit(Event::new(
                        EventKind::Game,
                        "level_up_ready",
                        "you feel more experienced",
                    ));
                }
            }
        }

        self.tick(rng)?;
        Ok(ActionOutcome::Turn)
    }

    fn handle_stairs(&mut self, rng: &mut StdRng) -> DelverResult<ActionOutcome> {
        if self.floor.stairs_down != Some(self.player.position()) {
            self.fail("there are no stairs here");
            return Ok(ActionOutcome::Failed);
        }
        self.descend()?;
        self.tick(rng)?;
        Ok(ActionOutcome::Turn)
    }

    /// Generates the next floor and carries the player across. The player
    /// outlives the floor it came from.
    pub fn descend(&mut self) -> DelverResult<()> {
        self.depth += 1;
        let floor_seed = self
            .seed
            .wrapping_add((self.depth as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let generation = GenerationConfig {
            seed: floor_seed,
            ..self.generation.clone()
        };
        let generator = FloorGenerator::new();
        let mut gen_rng = crate::generation::utils::create_rng(&generation);
        let mut floor = generator.generate(&generation, &mut gen_rng)?;
        generator.populate(&mut floor, &self.registry, &generation, &mut gen_rng);
        floor.name = format!("floor {}", self.depth);

        self.floor = floor;
        self.bind_monsters();
        self.statistics.deepest_floor = self.statistics.deepest_floor.max(self.depth);
        info!("descended to depth {}", self.depth);
        self.enter_floor();
        Ok(())
    }

    fn handle_pickup(&mut self) -> DelverResult<ActionOutcome> {
        let item_id = match self.floor.item_at(self.player.position()) {
            Some(item) => item.id,
            None => {
                self.fail("there is nothing here to pick up");
                return Ok(ActionOutcome::Failed);
            }
        };
        let item = match self.floor.remove_entity(item_id) {
            Some(item) => item,
            None => {
                self.fail("the item slips away");
                return Ok(ActionOutcome::Failed);
            }
        };
        let name = item.name.clone();
        if self.player.inventory.add_item(item.clone()) {
            self.statistics.items_collected += 1;
            self.emit(Event::new(
                EventKind::Game,
                "item_pickup",
                format!("picked up {}", name),
            ));
            Ok(ActionOutcome::Free)
        } else {
            // Capacity refusal: the item stays on the floor.
            self.floor.add_entity(item);
            self.fail("your pack is full");
            Ok(ActionOutcome::Failed)
        }
    }

    fn handle_equip(&mut self, name: &str) -> DelverResult<ActionOutcome> {
        let item_id = match self
            .player
            .inventory
            .uniques()
            .iter()
            .find(|item| item.name == name)
        {
            Some(item) => item.id,
            None => {
                self.fail(format!("you are not carrying {}", name));
                return Ok(ActionOutcome::Failed);
            }
        };
        let Some(item) = self.player.inventory.take_unique(item_id) else {
            self.fail(format!("you are not carrying {}", name));
            return Ok(ActionOutcome::Failed);
        };
        let Some(fighter) = self.player.fighter.as_mut() else {
            self.player.inventory.add_item(item);
            self.fail("you have no training to use that");
            return Ok(ActionOutcome::Failed);
        };

        match fighter.equip_item(Some(item.clone()), None) {
            crate::game::EquipOutcome::Applied { previous } => {
                if let Some(previous) = previous {
                    self.player.inventory.add_item(previous);
                }
                self.emit(Event::new(
                    EventKind::Game,
                    "item_equipped",
                    format!("equipped {}", name),
                ));
                Ok(ActionOutcome::Free)
            }
            crate::game::EquipOutcome::Rejected => {
                self.player.inventory.add_item(item);
                self.fail(format!("{} cannot be equipped", name));
                Ok(ActionOutcome::Failed)
            }
        }
    }

    fn handle_unequip(&mut self, slot: crate::game::EquipSlot) -> DelverResult<ActionOutcome> {
        let Some(fighter) = self.player.fighter.as_mut() else {
            self.fail("nothing is equipped");
            return Ok(ActionOutcome::Failed);
        };
        let previous = fighter.equip_item(None, Some(slot)).previous();
        match previous {
            Some(item) => {
                let name = item.name.clone();
                if self.player.inventory.add_item(item.clone()) {
                    self.emit(Event::new(
                        EventKind::Game,
                        "item_unequipped",
                        format!("unequipped {}", name),
                    ));
                    Ok(ActionOutcome::Free)
                } else {
                    // No room to stow it; put it back on.
                    if let Some(fighter) = self.player.fighter.as_mut() {
                        fighter.equip_item(Some(item), Some(slot));
                    }
                    self.fail("your pack is full");
                    Ok(ActionOutcome::Failed)
                }
            }
            None => {
                self.fail(format!("nothing is equipped as {}", slot));
                Ok(ActionOutcome::Failed)
            }
        }
    }

    fn handle_level_up(
        &mut self,
        stat: Option<crate::game::Ability>,
        rng: &mut StdRng,
    ) -> DelverResult<ActionOutcome> {
        let pending = self
            .player
            .fighter
            .as_ref()
            .map(|fighter| fighter.combat_class.pending_level_ups())
            .unwrap_or(0);
        if pending == 0 {
            self.fail("you have no level-ups to spend");
            return Ok(ActionOutcome::Failed);
        }
        self.player.level_up(stat, rng)?;
        let level = self
            .player
            .fighter
            .as_ref()
            .map(|fighter| fighter.combat_class.level)
            .unwrap_or(0);
        self.emit(Event::new(
            EventKind::Game,
            "level_up",
            format!("welcome to level {}", level),
        ));
        Ok(ActionOutcome::Free)
    }

    /// Advances one simulation tick: live enemies adjacent to the player
    /// strike back, corpses are swept, and the turn counter rises.
    fn tick(&mut self, rng: &mut StdRng) -> DelverResult<()> {
        let adjacent = self.floor.enemies_adjacent_to(self.player.position());
        for enemy_id in adjacent {
            let summary = match (
                self.monster_fighters.get_mut(&enemy_id),
                self.player.fighter.as_mut(),
            ) {
                (Some(monster_fighter), Some(player_fighter)) => {
                    resolve_attack(monster_fighter, player_fighter, rng)?
                }
                _ => continue,
            };
            let enemy_name = self
                .floor
                .entity(enemy_id)
                .map(|entity| entity.name.clone())
                .unwrap_or_else(|| "something".to_string());
            if summary.hit {
                self.emit(Event::new(
                    EventKind::Game,
                    "enemy_attack",
                    format!("the {} hits you for {}", enemy_name, summary.damage),
                ));
            } else {
                self.emit(Event::new(
                    EventKind::Game,
                    "enemy_attack_miss",
                    format!("the {} misses you", enemy_name),
                ));
            }
            if self
                .player
                .fighter
                .as_ref()
                .is_some_and(|fighter| fighter.is_dead())
            {
                self.player.entity.kill();
                self.emit(Event::new(
                    EventKind::State,
                    "game_over",
                    "you have died",
                ));
                break;
            }
        }

        // Sweep corpses and their combat state.
        let dead: Vec<EntityId> = self
            .floor
            .entities()
            .iter()
            .filter(|entity| entity.lifecycle == crate::game::Lifecycle::Dead)
            .map(|entity| entity.id)
            .collect();
        for id in &dead {
            self.monster_fighters.remove(id);
        }
        self.floor.sweep_dead();

        self.turn += 1;
        Ok(())
    }

    /// Saves the complete state graph to JSON.
    pub fn save_to_json(&self) -> DelverResult<String> {
        serde_json::to_string_pretty(self).map_err(DelverError::from)
    }

    /// Loads a state graph from JSON.
    pub fn load_from_json(json: &str) -> DelverResult<Self> {
        serde_json::from_str(json).map_err(DelverError::from)
    }
}
