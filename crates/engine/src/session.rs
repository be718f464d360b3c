//! A running game plus its gravity schedule.

use tracing::{info, trace};

use tui_blockfall_core::types::{
    ConfigError, GameAction, GamePhase, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH,
    GRAVITY_INTERVAL_MS,
};
use tui_blockfall_core::{
    GameEvent, GameSnapshot, GameState, PieceSource, StepOutcome, UniformPieces,
};

use crate::timer::GravityTimer;

const MAX_PENDING_EVENTS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub width: u16,
    pub height: u16,
    pub gravity_ms: u32,
    pub seed: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            gravity_ms: GRAVITY_INTERVAL_MS,
            seed: 1,
        }
    }
}

/// Shown to the player after a game ends; the board itself is already wiped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverNotice {
    pub final_score: u32,
    pub episode_id: u32,
}

#[derive(Debug, Clone)]
pub struct Session<S = UniformPieces> {
    game: GameState<S>,
    timer: GravityTimer,
    events: Vec<GameEvent>,
    last_game_over: Option<GameOverNotice>,
}

impl Session<UniformPieces> {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::with_source(config, UniformPieces::new(config.seed))
    }
}

impl<S: PieceSource> Session<S> {
    pub fn with_source(config: SessionConfig, source: S) -> Result<Self, ConfigError> {
        let game = GameState::with_source(config.width, config.height, source)?;
        let timer = GravityTimer::new(config.gravity_ms)?;
        Ok(Self::from_parts(game, timer))
    }

    /// Wrap an existing game. The schedule follows the game's current phase.
    pub fn from_parts(game: GameState<S>, timer: GravityTimer) -> Self {
        let mut session = Self {
            game,
            timer,
            events: Vec::new(),
            last_game_over: None,
        };
        if session.game.phase() == GamePhase::Running {
            session.timer.start();
        } else {
            session.timer.stop();
        }
        session
    }

    pub fn game(&self) -> &GameState<S> {
        &self.game
    }

    /// Direct game access; call [`Session::sync`] after changing the phase.
    pub fn game_mut(&mut self) -> &mut GameState<S> {
        &mut self.game
    }

    pub fn timer(&self) -> &GravityTimer {
        &self.timer
    }

    pub fn phase(&self) -> GamePhase {
        self.game.phase()
    }

    pub fn score(&self) -> u32 {
        self.game.score()
    }

    /// Apply an action and bring the gravity schedule in line with the new phase.
    pub fn apply(&mut self, action: GameAction) -> bool {
        let before = self.game.phase();
        let changed = self.game.apply_action(action);

        let restarts_schedule = matches!(
            action,
            GameAction::Start | GameAction::Restart | GameAction::Resume | GameAction::TogglePause
        );
        if changed && restarts_schedule && self.game.phase() == GamePhase::Running {
            self.timer.start();
        }
        if !changed && action.is_player_input() {
            trace!(action = action.as_str(), phase = before.as_str(), "input ignored");
        }
        if changed && before != self.game.phase() {
            info!(
                action = action.as_str(),
                from = before.as_str(),
                to = self.game.phase().as_str(),
                "phase change"
            );
        }
        self.sync();
        changed
    }

    /// Let `ms` milliseconds pass, running every gravity step that fell due.
    ///
    /// Stops early at game over. Returns the number of steps run.
    pub fn advance(&mut self, ms: u32) -> u32 {
        let due = self.timer.advance(ms);
        let mut ran = 0;
        for _ in 0..due {
            ran += 1;
            if let StepOutcome::GameOver { .. } | StepOutcome::Ignored = self.game.step() {
                break;
            }
        }
        self.sync();
        ran
    }

    /// Collect game events and stop the schedule unless running.
    pub fn sync(&mut self) {
        for event in self.game.take_events() {
            if let GameEvent::GameOver { final_score } = event {
                info!(final_score, episode = self.game.episode_id(), "game over");
                self.last_game_over = Some(GameOverNotice {
                    final_score,
                    episode_id: self.game.episode_id(),
                });
            }
            if self.events.len() >= MAX_PENDING_EVENTS {
                self.events.remove(0);
            }
            self.events.push(event);
        }

        match self.game.phase() {
            GamePhase::Running => {
                if !self.timer.is_active() {
                    self.timer.start();
                }
            }
            _ => self.timer.stop(),
        }
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn last_game_over(&self) -> Option<GameOverNotice> {
        self.last_game_over
    }

    pub fn take_game_over(&mut self) -> Option<GameOverNotice> {
        self.last_game_over.take()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.game.snapshot_into(out);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot()
    }
}
