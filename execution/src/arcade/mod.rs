//! Mini-game simulations.
//!
//! This module contains the round logic for every game in the arcade:
//! - Snake
//! - Flappy Bird
//! - Memory Match
//! - Plinko
//!
//! Each game implements [Simulation]; [GameState] wraps them in a single
//! tagged value the cabinet drives without knowing which game it holds.

pub mod flappy;
pub mod memory;
pub mod plinko;
pub mod settlement;
pub mod snake;

use rand::{seq::SliceRandom, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use thiserror::Error;
use winfinity_types::arcade::{
    GameType, Intent, PLINKO_DEFAULT_LINES, TARGET_SCORE_MAX, TARGET_SCORE_MIN,
};

pub use settlement::settle;

/// Deterministic random number generator.
///
/// Every random choice made by a cabinet (target scores, food placement, pipe
/// gaps, card order, ball bounces) comes from one of these, so a seed fully
/// determines a session.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha20Rng,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Derive an independent generator from this one.
    pub fn fork(&mut self) -> Self {
        Self::new(self.inner.next_u64())
    }

    /// Get a random value in range [0, max).
    pub fn next_bounded(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        self.inner.gen_range(0..max)
    }

    /// Get a random f64 value in range [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen()
    }

    pub fn coin(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }

    /// Get a random value in range [low, high].
    pub fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// Draw a target score.
    pub fn draw_target(&mut self) -> u32 {
        self.range_inclusive(TARGET_SCORE_MIN, TARGET_SCORE_MAX)
    }

    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}

/// Error during a simulation step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Input not allowed in the current game state
    #[error("invalid move")]
    InvalidMove,
    /// Round already reached a terminal state
    #[error("game has already completed")]
    GameAlreadyComplete,
    /// Internal state is inconsistent
    #[error("invalid game state: {0}")]
    InvalidState(String),
    /// Round could not be created with the given options
    #[error("invalid game options: {0}")]
    InvalidOptions(String),
}

/// Capability shared by every game.
///
/// `now` is a monotonically increasing timestamp in milliseconds supplied by
/// the scheduler; games that do not care about wall-clock time ignore it.
pub trait Simulation {
    /// Apply a player intent. Intents a game has no use for are ignored.
    fn apply(&mut self, intent: Intent, now: u64, rng: &mut GameRng) -> Result<(), GameError>;

    /// Advance the simulation by one step.
    fn tick(&mut self, now: u64, rng: &mut GameRng) -> Result<(), GameError>;

    fn is_terminal(&self) -> bool;

    fn score(&self) -> u32;
}

/// Per-cabinet knobs for creating rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GameOptions {
    /// Rows of pegs on the Plinko board
    pub plinko_lines: u8,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            plinko_lines: PLINKO_DEFAULT_LINES,
        }
    }
}

/// State of a running round, tagged by game.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameState {
    Snake(snake::Snake),
    FlappyBird(flappy::FlappyBird),
    Memory(memory::MemoryMatch),
    Plinko(plinko::Plinko),
}

impl GameState {
    /// Create the initial state for a new round.
    pub fn new(
        game: GameType,
        options: &GameOptions,
        rng: &mut GameRng,
    ) -> Result<Self, GameError> {
        Ok(match game {
            GameType::Snake => GameState::Snake(snake::Snake::new()),
            GameType::FlappyBird => GameState::FlappyBird(flappy::FlappyBird::new(rng)),
            GameType::Memory => GameState::Memory(memory::MemoryMatch::new(rng)),
            GameType::Plinko => GameState::Plinko(plinko::Plinko::new(options.plinko_lines)?),
        })
    }

    pub fn game_type(&self) -> GameType {
        match self {
            GameState::Snake(_) => GameType::Snake,
            GameState::FlappyBird(_) => GameType::FlappyBird,
            GameState::Memory(_) => GameType::Memory,
            GameState::Plinko(_) => GameType::Plinko,
        }
    }

    /// Whether play is suspended by the player.
    pub fn is_paused(&self) -> bool {
        match self {
            GameState::Snake(snake) => snake.is_paused(),
            _ => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn force_over(&mut self, score: u32) {
        match self {
            GameState::Snake(game) => game.force_over(score),
            GameState::FlappyBird(game) => game.force_over(score),
            GameState::Memory(game) => game.force_over(score),
            GameState::Plinko(game) => game.force_over(score),
        }
    }
}

impl Simulation for GameState {
    fn apply(&mut self, intent: Intent, now: u64, rng: &mut GameRng) -> Result<(), GameError> {
        match self {
            GameState::Snake(game) => game.apply(intent, now, rng),
            GameState::FlappyBird(game) => game.apply(intent, now, rng),
            GameState::Memory(game) => game.apply(intent, now, rng),
            GameState::Plinko(game) => game.apply(intent, now, rng),
        }
    }

    fn tick(&mut self, now: u64, rng: &mut GameRng) -> Result<(), GameError> {
        match self {
            GameState::Snake(game) => game.tick(now, rng),
            GameState::FlappyBird(game) => game.tick(now, rng),
            GameState::Memory(game) => game.tick(now, rng),
            GameState::Plinko(game) => game.tick(now, rng),
        }
    }

    fn is_terminal(&self) -> bool {
        match self {
            GameState::Snake(game) => game.is_terminal(),
            GameState::FlappyBird(game) => game.is_terminal(),
            GameState::Memory(game) => game.is_terminal(),
            GameState::Plinko(game) => game.is_terminal(),
        }
    }

    fn score(&self) -> u32 {
        match self {
            GameState::Snake(game) => game.score(),
            GameState::FlappyBird(game) => game.score(),
            GameState::Memory(game) => game.score(),
            GameState::Plinko(game) => game.score(),
        }
    }
}
