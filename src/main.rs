//! # Delver Demo Driver
//!
//! Headless scripted playthrough over the public API: generates a dungeon,
//! runs a character through the mode machine for a bounded number of
//! frames, and logs the drained event queue each frame. The real rendering
//! and input layers are external collaborators; this driver stands in for
//! both.

use clap::Parser;
use delver::{
    ActionIntent, ActionOutcome, ContentRegistry, DelverResult, Direction, GameState, Mode,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Command line arguments for the demo driver.
#[derive(Parser, Debug)]
#[command(name = "delver")]
#[command(about = "A turn-based roguelike core with a scripted demo driver")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Combat class for the demo character
    #[arg(long, default_value = "fighter")]
    class: String,

    /// Maximum frames to simulate
    #[arg(long, default_value_t = 200)]
    frames: u32,
}

fn main() -> DelverResult<()> {
    env_logger::init();
    let args = Args::parse();

    info!("starting delver v{}", delver::VERSION);
    info!("generating dungeon with seed {}", args.seed);

    let registry = ContentRegistry::builtin()?;
    let mut state = GameState::new(args.seed, registry)?;
    let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(1));

    run_demo(&mut state, &mut rng, &args)?;

    info!(
        "demo finished: {} turns, {} steps, {} kills, depth {}",
        state.turn,
        state.statistics.steps_taken,
        state.statistics.enemies_defeated,
        state.statistics.deepest_floor
    );
    Ok(())
}

/// One frame: drain and log events, pick a scripted intent for the
/// current mode, hand it to the simulation.
fn run_demo(state: &mut GameState, rng: &mut StdRng, args: &Args) -> DelverResult<()> {
    for frame in 0..args.frames {
        for event in state.drain_events() {
            info!("[{:?}] {}: {}", event.kind, event.name, event.description);
        }

        let intent = match state.mode() {
            Mode::Start => ActionIntent::StartGame,
            Mode::CharacterCreation => ActionIntent::ChooseClass(args.class.clone()),
            Mode::Playing => playing_intent(state, rng),
            Mode::Shop => ActionIntent::CloseMenu,
            Mode::Inventory | Mode::Character => ActionIntent::CloseMenu,
            Mode::Paused => ActionIntent::Resume,
            Mode::GameOver => {
                info!("the run ended on frame {}", frame);
                return Ok(());
            }
        };

        match state.handle_intent(intent.clone(), rng)? {
            ActionOutcome::Ignored => warn!("intent {:?} ignored in {}", intent, state.mode()),
            ActionOutcome::Failed | ActionOutcome::Turn | ActionOutcome::Free => {}
        }
    }
    Ok(())
}

/// Scripted play policy: head for the stairs when standing on them,
/// otherwise wander through open tiles, preferring unexplored ground.
fn playing_intent(state: &GameState, rng: &mut StdRng) -> ActionIntent {
    let position = state.player.position();
    if state.floor.stairs_down == Some(position) {
        return ActionIntent::TakeStairs;
    }
    if state.floor.item_at(position).is_some() {
        return ActionIntent::PickUp;
    }

    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|direction| {
            let (dx, dy) = direction.delta();
            state.floor.is_walkable(position.offset(dx, dy))
        })
        .collect();
    match open.is_empty() {
        true => ActionIntent::Wait,
        false => ActionIntent::Move(open[rng.gen_range(0..open.len())]),
    }
}
