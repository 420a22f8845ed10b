//! Cat Quest headless runner
//!
//! Plays the built-in levels with a seeded autopilot and logs how the run
//! went. Useful for soak-testing the simulation without a renderer.
//!
//! Usage: `cat-quest [character] [seed] [tuning.json]`

use std::error::Error;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use cat_quest::consts::TICK_MS;
use cat_quest::sim::{GameEvent, GamePhase, Intent};
use cat_quest::{CharacterKind, Game, LevelCatalog, Tuning};

const DEFAULT_SEED: u64 = 0xCA7_0E57;
/// Frame budget for the whole run (10 minutes at 60 fps)
const MAX_FRAMES: u32 = 60 * 60 * 10;
const MAX_RESTARTS: u32 = 5;

/// Random but forward-biased input source
struct Autopilot {
    rng: Pcg32,
    /// Ticks left to hold jump
    jump_hold: u32,
    /// Jump was held last tick
    jumping: bool,
    /// Ticks left walking backwards
    retreat: u32,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            jump_hold: 0,
            jumping: false,
            retreat: 0,
        }
    }

    fn next_intent(&mut self) -> Intent {
        // A new press needs at least one released tick in between
        if self.jump_hold == 0 && !self.jumping && self.rng.random_bool(0.04) {
            self.jump_hold = self.rng.random_range(4..20);
        }
        if self.retreat == 0 && self.rng.random_bool(0.005) {
            self.retreat = self.rng.random_range(10..40);
        }

        let jump = self.jump_hold > 0;
        self.jumping = jump;
        self.jump_hold = self.jump_hold.saturating_sub(1);
        let back = self.retreat > 0;
        self.retreat = self.retreat.saturating_sub(1);

        Intent {
            move_left: back,
            move_right: !back,
            jump,
            dash: self.rng.random_bool(0.01),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    log::info!("Cat Quest (headless) starting...");

    let mut args = std::env::args().skip(1);
    let character = match args.next() {
        Some(name) => CharacterKind::from_str(&name).ok_or(format!("unknown character {name}"))?,
        None => CharacterKind::default(),
    };
    let seed = match args.next() {
        Some(seed) => seed.parse()?,
        None => DEFAULT_SEED,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };

    let catalog = LevelCatalog::builtin()?;
    let mut game = Game::new(catalog, tuning);
    let mut pilot = Autopilot::new(seed);
    let mut restarts = 0;
    let mut hits = 0;

    game.start_game(character);

    for _ in 0..MAX_FRAMES {
        let intent = pilot.next_intent();
        game.frame(TICK_MS, &intent);
        hits += game
            .snapshot()
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Hurt { .. } | GameEvent::Died))
            .count();

        match game.phase() {
            GamePhase::LevelComplete => game.next_level()?,
            GamePhase::GameOver if restarts < MAX_RESTARTS => {
                restarts += 1;
                game.restart_level()?;
            }
            GamePhase::GameOver | GamePhase::Victory => break,
            _ => {}
        }
    }

    let state = game.state();
    match game.summary() {
        Some(summary) => log::info!(
            "Run cleared {} levels: score {}, coins {}, stars {}",
            summary.levels_completed,
            summary.score,
            summary.coins,
            summary.stars
        ),
        None => log::info!(
            "Run ended in {:?} on level {}: score {}, health {}",
            state.phase,
            state.level_id,
            state.score,
            state.player.health
        ),
    }
    log::info!(
        "{} ticks simulated, {} hits taken, {} restarts",
        state.time_ticks,
        hits,
        restarts
    );

    Ok(())
}
