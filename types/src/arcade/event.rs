use serde::{Deserialize, Serialize};

use super::{Amount, GameType};

/// Observable outcome of an economy or cabinet operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Deposited {
        amount: Amount,
        deposit: Amount,
        stake: Amount,
    },
    Unstaked {
        amount: Amount,
        stake: Amount,
    },
    Claimed {
        yield_amount: Amount,
    },
    PlayRequested {
        game: GameType,
        cost: Amount,
    },
    PlayCancelled {
        game: GameType,
    },
    RoundStarted {
        game: GameType,
        cost: Amount,
        deposit: Amount,
        target: u32,
    },
    RoundEnded {
        game: GameType,
        score: u32,
        target: u32,
        reward: Amount,
        deposit: Amount,
    },
    RoundDeclined {
        game: GameType,
    },
}

/// Category of a user-facing notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    InsufficientFunds,
    ExternalCall,
    SimulationFault,
    InvalidAction,
}
