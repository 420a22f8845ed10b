//! Game controller: state machine, commands and frame pacing
//!
//! `Game` owns the level catalog, the tuning and the one mutable
//! `GameState`. Hosts feed it frame times and held input; presentation reads
//! a `Snapshot` between frames.

use serde::{Deserialize, Serialize};

use crate::character::CharacterKind;
use crate::consts::MAX_SUBSTEPS;
use crate::level::{LevelCatalog, LevelError};
use crate::settings::Tuning;
use crate::sim::{
    Collectible, Enemy, GameEvent, GamePhase, GameState, Intent, PlayerState, Portal, tick,
};

/// Cumulative totals shown when the last level is cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub coins: u32,
    pub stars: u32,
    pub levels_completed: u32,
}

/// Read-only view of the simulation for the presentation layer
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub level_id: u32,
    pub character: CharacterKind,
    pub score: u64,
    pub lives: u8,
    pub player: &'a PlayerState,
    pub enemies: &'a [Enemy],
    pub collectibles: &'a [Collectible],
    pub portal: &'a Portal,
    pub camera_x: f32,
    pub events: &'a [GameEvent],
}

/// Top-level controller
#[derive(Debug, Clone)]
pub struct Game {
    catalog: LevelCatalog,
    tuning: Tuning,
    state: GameState,
    /// Unsimulated frame time carried to the next frame (ms)
    accumulator: f32,
    /// Levels cleared in the current run
    levels_completed: u32,
    summary: Option<RunSummary>,
}

impl Game {
    pub fn new(catalog: LevelCatalog, tuning: Tuning) -> Self {
        Self {
            catalog,
            tuning,
            state: GameState::default(),
            accumulator: 0.0,
            levels_completed: 0,
            summary: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Totals of the finished run (set on Victory)
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let state = &self.state;
        Snapshot {
            phase: state.phase,
            level_id: state.level_id,
            character: state.character,
            score: state.score,
            lives: state.lives,
            player: &state.player,
            enemies: &state.enemies,
            collectibles: &state.collectibles,
            portal: &state.portal,
            camera_x: state.camera_x,
            events: &state.events,
        }
    }

    // === Simulation ===

    /// Run exactly one simulation step
    pub fn tick(&mut self, intent: &Intent) -> Snapshot<'_> {
        self.step(intent);
        self.snapshot()
    }

    /// Advance by a host frame of `elapsed_ms`, running as many fixed ticks
    /// as fit. Returns the number of ticks run.
    ///
    /// Frames longer than `max_frame_delta_ms` are dropped whole rather than
    /// scaled, so a backgrounded tab doesn't come back to a physics explosion.
    pub fn frame(&mut self, elapsed_ms: f32, intent: &Intent) -> u32 {
        self.state.events.clear();

        if !(elapsed_ms >= 0.0) || elapsed_ms > self.tuning.max_frame_delta_ms {
            log::warn!("Dropping frame of {elapsed_ms} ms");
            self.accumulator = 0.0;
            return 0;
        }
        if self.state.phase != GamePhase::Playing {
            self.accumulator = 0.0;
            return 0;
        }

        self.accumulator += elapsed_ms;
        let mut substeps = 0;
        let mut events = Vec::new();
        while self.accumulator >= self.tuning.tick_ms && substeps < MAX_SUBSTEPS {
            self.step(intent);
            events.append(&mut self.state.events);
            self.accumulator -= self.tuning.tick_ms;
            substeps += 1;

            if self.state.phase != GamePhase::Playing {
                self.accumulator = 0.0;
                break;
            }
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(self.tuning.tick_ms);
        }
        // Presentation sees everything that happened this frame
        self.state.events = events;
        substeps
    }

    fn step(&mut self, intent: &Intent) {
        if self.state.phase != GamePhase::Playing {
            self.state.events.clear();
            return;
        }
        // Only catalog ids are ever loaded and the catalog is immutable
        let Ok(level) = self.catalog.get(self.state.level_id) else {
            debug_assert!(false, "level {} missing from catalog", self.state.level_id);
            log::error!("Level {} vanished from the catalog", self.state.level_id);
            return;
        };
        tick(&mut self.state, level, intent, &self.tuning);
    }

    // === Commands ===

    /// Start a new run from level one with the chosen character
    pub fn start_game(&mut self, character: CharacterKind) {
        self.state.reset_run();
        self.state.character = character;
        self.levels_completed = 0;
        self.summary = None;

        let first = self.catalog.first_id();
        // The first id always exists
        if let Ok(level) = self.catalog.get(first) {
            self.state.load_level(level);
        }
        self.enter(GamePhase::Playing);
        log::info!("New run as {} on level {}", character.name(), first);
    }

    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.enter(GamePhase::Paused);
        } else {
            log::debug!("Ignoring pause in {:?}", self.state.phase);
        }
    }

    pub fn resume(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.enter(GamePhase::Playing);
        } else {
            log::debug!("Ignoring resume in {:?}", self.state.phase);
        }
    }

    /// Cancel-key handler
    pub fn toggle_pause(&mut self) {
        match self.state.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            phase => log::debug!("Ignoring pause toggle in {:?}", phase),
        }
    }

    /// Replay the current level from scratch with fresh counters
    pub fn restart_level(&mut self) -> Result<(), LevelError> {
        if !self.state.is_playing() {
            log::debug!("Ignoring restart in {:?}", self.state.phase);
            return Ok(());
        }
        let level = self.catalog.get(self.state.level_id)?;
        self.state.reset_run();
        self.state.load_level(level);
        log::info!("Restarted level {}", level.id);
        self.enter(GamePhase::Playing);
        Ok(())
    }

    /// Jump straight to a level
    ///
    /// From the menu, a finished run or a game over this starts a fresh run;
    /// mid-run the player's health, coins and stars carry over.
    pub fn select_level(&mut self, id: u32) -> Result<(), LevelError> {
        let level = self.catalog.get(id)?;
        if matches!(
            self.state.phase,
            GamePhase::MainMenu | GamePhase::Victory | GamePhase::GameOver
        ) {
            self.state.reset_run();
            self.levels_completed = 0;
            self.summary = None;
        }
        self.state.load_level(level);
        log::info!("Selected level {} ({})", level.id, level.name);
        self.enter(GamePhase::Playing);
        Ok(())
    }

    /// Advance past a completed level, or finish the run after the last one
    pub fn next_level(&mut self) -> Result<(), LevelError> {
        if self.state.phase != GamePhase::LevelComplete {
            log::debug!("Ignoring next level in {:?}", self.state.phase);
            return Ok(());
        }

        self.levels_completed += 1;
        match self.catalog.next_id(self.state.level_id)? {
            Some(next) => {
                let level = self.catalog.get(next)?;
                self.state.load_level(level);
                log::info!("Entering level {} ({})", level.id, level.name);
                self.enter(GamePhase::Playing);
            }
            None => {
                let summary = RunSummary {
                    score: self.state.score,
                    coins: self.state.player.coins,
                    stars: self.state.player.stars,
                    levels_completed: self.levels_completed,
                };
                self.summary = Some(summary);
                self.enter(GamePhase::Victory);
                log::info!(
                    "Victory! score {}, coins {}, stars {}",
                    summary.score,
                    summary.coins,
                    summary.stars
                );
            }
        }
        Ok(())
    }

    /// Leave whatever is happening and go back to the title screen
    pub fn return_to_menu(&mut self) {
        let character = self.state.character;
        self.state = GameState::new(character);
        self.accumulator = 0.0;
        self.levels_completed = 0;
        self.summary = None;
        log::info!("Returned to main menu");
    }

    fn enter(&mut self, phase: GamePhase) {
        if self.state.phase != phase {
            log::debug!("Phase {:?} -> {:?}", self.state.phase, phase);
        }
        self.state.phase = phase;
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use glam::Vec2;

    fn game() -> Game {
        Game::new(LevelCatalog::builtin().unwrap(), Tuning::default())
    }

    /// Put the player in the level-1 portal
    fn reach_portal(game: &mut Game) {
        let portal = game.state.portal.pos;
        game.state.player.pos = portal + Vec2::new(10.0, 20.0);
        game.state.player.vel = Vec2::ZERO;
        game.tick(&Intent::default());
        assert_eq!(game.phase(), GamePhase::LevelComplete);
    }

    #[test]
    fn test_start_game() {
        let mut game = game();
        assert_eq!(game.phase(), GamePhase::MainMenu);

        game.start_game(CharacterKind::Christo);
        let snap = game.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.level_id, 1);
        assert_eq!(snap.character, CharacterKind::Christo);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.player.health, START_HEALTH);
        assert_eq!(snap.camera_x, 0.0);

        let level = game.catalog.get(1).unwrap();
        assert_eq!(snap.player.pos, level.spawn);
        assert_eq!(snap.enemies.len(), level.enemies.len());
        assert_eq!(snap.collectibles.len(), level.collectibles.len());
    }

    #[test]
    fn test_pause_freezes_state() {
        let mut game = game();
        game.start_game(CharacterKind::Derrik);
        let right = Intent {
            move_right: true,
            ..Default::default()
        };
        game.tick(&right);

        game.toggle_pause();
        assert!(game.state.is_paused());
        let before = game.state.clone();
        for _ in 0..10 {
            game.tick(&right);
            game.frame(TICK_MS, &right);
        }
        assert_eq!(game.state.player, before.player);
        assert_eq!(game.state.enemies, before.enemies);
        assert_eq!(game.state.time_ticks, before.time_ticks);

        game.toggle_pause();
        assert_eq!(game.phase(), GamePhase::Playing);
        game.tick(&right);
        assert!(game.state.player.pos.x > before.player.pos.x);
    }

    #[test]
    fn test_pause_ignored_outside_play() {
        let mut game = game();
        game.pause();
        assert_eq!(game.phase(), GamePhase::MainMenu);

        game.start_game(CharacterKind::Derrik);
        reach_portal(&mut game);
        game.toggle_pause();
        assert_eq!(game.phase(), GamePhase::LevelComplete);
    }

    #[test]
    fn test_frame_pacing() {
        let mut game = game();
        game.start_game(CharacterKind::Derrik);
        let idle = Intent::default();

        assert_eq!(game.frame(TICK_MS * 2.0 + 1.0, &idle), 2);
        assert_eq!(game.state.time_ticks, 2);
        // Leftover time is carried into the next frame
        assert_eq!(game.frame(TICK_MS - 0.5, &idle), 1);

        // A long stall is dropped entirely
        let ticks = game.state.time_ticks;
        assert_eq!(game.frame(MAX_FRAME_DELTA_MS + 1.0, &idle), 0);
        assert_eq!(game.state.time_ticks, ticks);
        assert_eq!(game.frame(f32::NAN, &idle), 0);

        // Substeps are capped
        assert_eq!(game.frame(MAX_FRAME_DELTA_MS, &idle), MAX_SUBSTEPS);
    }

    #[test]
    fn test_level_complete_carries_counters() {
        let mut game = game();
        game.start_game(CharacterKind::Derrik);
        game.state.score = 250;
        game.state.player.coins = 12;
        game.state.player.stars = 2;
        game.state.player.health = 2;
        reach_portal(&mut game);

        game.next_level().unwrap();
        let snap = game.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.level_id, 2);
        assert_eq!(snap.score, 250);
        assert_eq!(snap.player.coins, 12);
        assert_eq!(snap.player.stars, 2);
        assert_eq!(snap.player.health, 2);
        assert_eq!(snap.player.pos, game.catalog.get(2).unwrap().spawn);
        assert!(snap.collectibles.iter().all(|c| !c.collected));
        assert!(snap.player.double_jump_armed);
    }

    #[test]
    fn test_next_level_only_after_completion() {
        let mut game = game();
        game.start_game(CharacterKind::Derrik);
        game.next_level().unwrap();
        assert_eq!(game.state.level_id, 1);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_victory_after_last_level() {
        let mut game = game();
        game.start_game(CharacterKind::Teri);
        for _ in 0..3 {
            game.state.score += 100;
            game.state.player.coins += 5;
            reach_portal(&mut game);
            game.next_level().unwrap();
        }

        assert_eq!(game.phase(), GamePhase::Victory);
        assert_eq!(
            game.summary(),
            Some(&RunSummary {
                score: 300,
                coins: 15,
                stars: 0,
                levels_completed: 3,
            })
        );

        game.return_to_menu();
        assert_eq!(game.phase(), GamePhase::MainMenu);
        assert!(game.summary().is_none());
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut game = game();
        game.start_game(CharacterKind::Derrik);
        game.state.score = 500;
        game.state.player.coins = 9;
        game.state.player.health = 1;
        // Drop the player below the kill line
        game.state.player.pos.y = 10_000.0;
        game.tick(&Intent::default());
        assert!(game.state.is_game_over());
        assert!(game.state.is_playing());
        assert_eq!(game.state.player.health, 0);

        game.restart_level().unwrap();
        let snap = game.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.level_id, 1);
        assert_eq!(snap.player.health, START_HEALTH);
        assert_eq!(snap.player.coins, 0);
        assert_eq!(snap.score, 0);
        assert!(!snap.player.invulnerable);
    }

    #[test]
    fn test_select_level() {
        let mut game = game();
        game.select_level(3).unwrap();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.state.level_id, 3);

        game.state.player.coins = 4;
        game.select_level(2).unwrap();
        assert_eq!(game.state.player.coins, 4);

        // Unknown ids fail loudly and leave the state alone
        let err = game.select_level(42).unwrap_err();
        assert!(matches!(err, LevelError::UnknownLevel(42)));
        assert_eq!(game.state.level_id, 2);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_restart_rebuilds_entities() {
        let mut game = game();
        game.start_game(CharacterKind::Derrik);
        for c in &mut game.state.collectibles {
            c.collected = true;
        }
        game.state.enemies.clear();
        game.state.camera_x = 300.0;

        game.restart_level().unwrap();
        let level = game.catalog.get(1).unwrap();
        assert_eq!(game.state.enemies, level.enemies);
        assert!(game.state.collectibles.iter().all(|c| !c.collected));
        assert_eq!(game.state.camera_x, 0.0);
    }

    #[test]
    fn test_restart_ignored_in_menu() {
        let mut game = game();
        game.restart_level().unwrap();
        assert_eq!(game.phase(), GamePhase::MainMenu);
    }

    /// Drop the player below the kill line with one health left
    fn lose(game: &mut Game) {
        game.state.player.health = 1;
        game.state.player.invulnerable = false;
        game.state.player.invulnerable_until = None;
        game.state.player.pos.y = 10_000.0;
        game.tick(&Intent::default());
        assert_eq!(game.phase(), GamePhase::GameOver);
    }

    fn game_in(phase: GamePhase) -> Game {
        let mut game = game();
        match phase {
            GamePhase::MainMenu => {}
            GamePhase::Playing => game.start_game(CharacterKind::Derrik),
            GamePhase::Paused => {
                game.start_game(CharacterKind::Derrik);
                game.pause();
            }
            GamePhase::GameOver => {
                game.start_game(CharacterKind::Derrik);
                lose(&mut game);
            }
            GamePhase::LevelComplete => {
                game.start_game(CharacterKind::Derrik);
                reach_portal(&mut game);
            }
            GamePhase::Victory => {
                game.start_game(CharacterKind::Derrik);
                for _ in 0..3 {
                    reach_portal(&mut game);
                    game.next_level().unwrap();
                }
            }
        }
        assert_eq!(game.phase(), phase);
        game
    }

    #[test]
    fn test_select_level_after_game_over_starts_fresh() {
        let mut game = game_in(GamePhase::GameOver);
        game.state.score = 400;
        game.state.player.coins = 7;

        game.select_level(2).unwrap();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.state.level_id, 2);
        assert_eq!(game.state.player.health, START_HEALTH);
        assert_eq!(game.state.player.coins, 0);
        assert_eq!(game.state.score, 0);

        // The new run is mortal again
        lose(&mut game);
        assert_eq!(game.state.player.health, 0);
    }

    #[test]
    fn test_game_over_is_terminal() {
        let mut game = game_in(GamePhase::GameOver);
        let right = Intent {
            move_right: true,
            ..Default::default()
        };

        game.toggle_pause();
        game.pause();
        game.resume();
        game.next_level().unwrap();
        game.tick(&right);
        game.frame(TICK_MS * 3.0, &right);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.state.player.health, 0);
        assert_eq!(game.state.level_id, 1);
    }

    #[test]
    fn test_every_command_in_every_phase() {
        const PHASES: [GamePhase; 6] = [
            GamePhase::MainMenu,
            GamePhase::Playing,
            GamePhase::Paused,
            GamePhase::GameOver,
            GamePhase::LevelComplete,
            GamePhase::Victory,
        ];
        let commands: [(&str, fn(&mut Game)); 10] = [
            ("start_game", |g: &mut Game| g.start_game(CharacterKind::Lou)),
            ("pause", |g: &mut Game| g.pause()),
            ("resume", |g: &mut Game| g.resume()),
            ("toggle_pause", |g: &mut Game| g.toggle_pause()),
            ("restart_level", |g: &mut Game| g.restart_level().unwrap()),
            ("select_level", |g: &mut Game| g.select_level(2).unwrap()),
            ("next_level", |g: &mut Game| g.next_level().unwrap()),
            ("return_to_menu", |g: &mut Game| g.return_to_menu()),
            ("tick", |g: &mut Game| {
                g.tick(&Intent::default());
            }),
            ("frame", |g: &mut Game| {
                g.frame(TICK_MS * 2.0, &Intent::default());
            }),
        ];

        for phase in PHASES {
            for (name, command) in commands {
                let mut game = game_in(phase);
                command(&mut game);
                let health = game.state.player.health;
                assert_eq!(
                    health == 0,
                    game.phase() == GamePhase::GameOver,
                    "{name} from {phase:?} left {:?} with health {health}",
                    game.phase()
                );
                assert_eq!(
                    game.summary().is_some(),
                    game.phase() == GamePhase::Victory,
                    "{name} from {phase:?}"
                );

                // Whatever run is live must still be able to end
                if game.phase() == GamePhase::Playing {
                    lose(&mut game);
                }
            }
        }
    }
}
