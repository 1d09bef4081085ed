use crate::{arcade::GameError, StakingError};
use thiserror::Error;
use winfinity_types::arcade::{Amount, NoticeKind, Phase};

/// Everything that can go wrong while operating the economy or a cabinet.
///
/// None of these are fatal: each maps to a [NoticeKind] shown to the player
/// and leaves the economy in a consistent state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("not enough deposit to play: have {have}, need {need}")]
    InsufficientFunds { have: Amount, need: Amount },
    #[error("not enough stake: have {have}, requested {requested}")]
    InsufficientStake { have: Amount, requested: Amount },
    #[error(transparent)]
    Staking(#[from] StakingError),
    /// The round was forced over without settlement
    #[error("simulation fault: {0}")]
    Simulation(GameError),
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
    #[error("move not allowed")]
    InvalidMove,
    #[error("amount must be greater than zero")]
    InvalidAmount,
}

impl Error {
    pub fn kind(&self) -> NoticeKind {
        match self {
            Error::InsufficientFunds { .. } | Error::InsufficientStake { .. } => {
                NoticeKind::InsufficientFunds
            }
            Error::Staking(_) => NoticeKind::ExternalCall,
            Error::Simulation(_) => NoticeKind::SimulationFault,
            Error::InvalidTransition { .. } | Error::InvalidMove | Error::InvalidAmount => {
                NoticeKind::InvalidAction
            }
        }
    }
}
