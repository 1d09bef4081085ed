//! Headless runner that plays arcade rounds with an autopilot, backed by a
//! file store and a simulated staking contract.

pub mod config;
pub mod pilot;
pub mod runner;
pub mod staking;
pub mod store;

pub use config::{Config, ConfigError, ValidatedConfig};
pub use pilot::Pilot;
pub use runner::{Runner, Summary};
pub use staking::LocalStaking;
pub use store::FileStore;
