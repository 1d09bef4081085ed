use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};
use thiserror::Error;
use tracing::Level;
use winfinity_execution::arcade::{plinko, GameOptions};
use winfinity_types::arcade::{Amount, AmountError, GameType, GameTypeError};

/// Configuration for a simulator run, as read from YAML.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub game: String,
    pub rounds: u32,
    pub seed: u64,
    /// Amount staked before the first round, in units
    pub deposit: f64,
    /// File holding the persisted wallet
    pub data: String,
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,

    /// Tick on wall-clock time instead of a virtual clock
    #[serde(default)]
    pub realtime: bool,
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    #[serde(default)]
    pub redraw_target: bool,
    #[serde(default = "default_plinko_lines")]
    pub plinko_lines: u8,

    #[serde(default)]
    pub staking: StakingConfig,
}

/// Behaviour of the simulated staking contract.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StakingConfig {
    /// Yield per round, in basis points of the stake
    #[serde(default = "default_reward_bps")]
    pub reward_bps: u64,
    /// Probability that a stake, unstake or claim call is rejected
    #[serde(default)]
    pub fail_rate: f64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            reward_bps: default_reward_bps(),
            fail_rate: 0.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: GameType::Snake.name().to_string(),
            rounds: 10,
            seed: 0,
            deposit: 100.0,
            data: "arcade.json".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            realtime: false,
            max_ticks: default_max_ticks(),
            redraw_target: false,
            plinko_lines: default_plinko_lines(),
            staking: StakingConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid game: {value}")]
    InvalidGame {
        value: String,
        #[source]
        source: GameTypeError,
    },
    #[error("{field} is not a valid amount: {value}")]
    InvalidAmount {
        field: &'static str,
        value: f64,
        #[source]
        source: AmountError,
    },
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: String },
}

pub struct ValidatedConfig {
    pub game: GameType,
    pub rounds: u32,
    pub seed: u64,
    pub deposit: Amount,
    pub data: PathBuf,
    pub log_level: Level,
    pub log_json: bool,

    pub realtime: bool,
    pub max_ticks: u64,
    pub redraw_target: bool,
    pub options: GameOptions,

    pub reward_bps: u64,
    pub fail_rate: f64,
}

fn default_max_ticks() -> u64 {
    100_000
}

fn default_plinko_lines() -> u8 {
    16
}

fn default_reward_bps() -> u64 {
    100
}

impl Config {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let game = GameType::from_str(&self.game).map_err(|source| ConfigError::InvalidGame {
            value: self.game.clone(),
            source,
        })?;
        if self.rounds == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "rounds",
                value: 0,
            });
        }
        if self.max_ticks == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "max_ticks",
                value: 0,
            });
        }
        let deposit = Amount::from_f64(self.deposit).map_err(|source| ConfigError::InvalidAmount {
            field: "deposit",
            value: self.deposit,
            source,
        })?;
        if plinko::multipliers(self.plinko_lines).is_none() {
            return Err(ConfigError::OutOfRange {
                field: "plinko_lines",
                value: self.plinko_lines.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.staking.fail_rate) {
            return Err(ConfigError::OutOfRange {
                field: "staking.fail_rate",
                value: self.staking.fail_rate.to_string(),
            });
        }
        if self.staking.reward_bps > 10_000 {
            return Err(ConfigError::OutOfRange {
                field: "staking.reward_bps",
                value: self.staking.reward_bps.to_string(),
            });
        }
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        Ok(ValidatedConfig {
            game,
            rounds: self.rounds,
            seed: self.seed,
            deposit,
            data: PathBuf::from(self.data),
            log_level,
            log_json: self.log_json,
            realtime: self.realtime,
            max_ticks: self.max_ticks,
            redraw_target: self.redraw_target,
            options: GameOptions {
                plinko_lines: self.plinko_lines,
            },
            reward_bps: self.staking.reward_bps,
            fail_rate: self.staking.fail_rate,
        })
    }
}
