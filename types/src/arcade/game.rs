use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::{
    Amount, FLAPPY_COST, FLAPPY_REWARD_RATE, MEMORY_COST, MEMORY_REWARD_RATE, PLINKO_COST,
    PLINKO_REWARD_RATE, SNAKE_COST, SNAKE_REWARD_BONUS, SNAKE_REWARD_RATE,
};

/// Mini-games offered by the arcade
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Snake,
    FlappyBird,
    Memory,
    Plinko,
}

impl GameType {
    pub const ALL: [GameType; 4] = [
        GameType::Snake,
        GameType::FlappyBird,
        GameType::Memory,
        GameType::Plinko,
    ];

    /// Amount deducted from the deposit to start a round.
    pub const fn cost(self) -> Amount {
        match self {
            GameType::Snake => SNAKE_COST,
            GameType::FlappyBird => FLAPPY_COST,
            GameType::Memory => MEMORY_COST,
            GameType::Plinko => PLINKO_COST,
        }
    }

    pub const fn policy(self) -> SettlementPolicy {
        match self {
            GameType::Snake => SettlementPolicy {
                rate: SNAKE_REWARD_RATE,
                bonus: SNAKE_REWARD_BONUS,
            },
            GameType::FlappyBird => SettlementPolicy::linear(FLAPPY_REWARD_RATE),
            GameType::Memory => SettlementPolicy::linear(MEMORY_REWARD_RATE),
            GameType::Plinko => SettlementPolicy::linear(PLINKO_REWARD_RATE),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            GameType::Snake => "snake",
            GameType::FlappyBird => "flappy-bird",
            GameType::Memory => "memory",
            GameType::Plinko => "plinko",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameTypeError {
    #[error("unknown game: {0}")]
    Unknown(String),
}

impl FromStr for GameType {
    type Err = GameTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "snake" => Ok(GameType::Snake),
            "flappy-bird" | "flappy_bird" | "flappy" => Ok(GameType::FlappyBird),
            "memory" => Ok(GameType::Memory),
            "plinko" => Ok(GameType::Plinko),
            _ => Err(GameTypeError::Unknown(s.to_string())),
        }
    }
}

/// Reward terms applied when a round ends above its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPolicy {
    /// Credit per point scored above the target
    pub rate: Amount,
    /// Added once whenever the per-point reward is non-zero
    pub bonus: Amount,
}

impl SettlementPolicy {
    pub const fn linear(rate: Amount) -> Self {
        Self {
            rate,
            bonus: Amount::ZERO,
        }
    }
}

/// Lifecycle phase of a cabinet, as seen by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Deposit is below the cost to play
    NoFunds,
    ReadyToPlay,
    /// Play was requested, waiting for the player to confirm paying
    AwaitingConfirmation,
    Active,
    Over,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::NoFunds => "no funds",
            Phase::ReadyToPlay => "ready to play",
            Phase::AwaitingConfirmation => "awaiting confirmation",
            Phase::Active => "active",
            Phase::Over => "over",
        };
        f.write_str(s)
    }
}
