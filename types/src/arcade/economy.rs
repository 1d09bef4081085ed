use serde::{Deserialize, Serialize};

use super::{Amount, DEPOSIT_KEY, STAKE_KEY};

/// Balances shared by every cabinet in a browser session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Spendable balance gating play and receiving rewards
    pub deposit: Amount,
    /// Amount committed to the staking contract, mirrored for display
    pub stake: Amount,
}

/// Persisted wallet fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Deposit,
    Stake,
}

impl Key {
    pub const ALL: [Key; 2] = [Key::Deposit, Key::Stake];

    pub const fn as_str(self) -> &'static str {
        match self {
            Key::Deposit => DEPOSIT_KEY,
            Key::Stake => STAKE_KEY,
        }
    }
}

/// Last values read back from the staking contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingSnapshot {
    pub stake: Amount,
    pub yield_amount: Amount,
    pub reward_per_token: Amount,
}
