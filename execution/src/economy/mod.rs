//! Deposit and stake balances shared by every cabinet.
//!
//! The economy owns the [Wallet] and writes it through the storage port after
//! every mutation. Balance changes that depend on the staking contract live in
//! [staking]; they only touch the wallet once the external call succeeded.
//!
//! Each staking operation is also available in three steps (check, contract
//! call, `record_*`) for callers that cannot hold the economy across an await.

mod staking;

pub use staking::{check_deposit, staking_failed, Readings};

use crate::{load_wallet, store_wallet, Error, State};
use tracing::{debug, info};
use winfinity_types::arcade::{Amount, Event, StakingSnapshot, Wallet};

pub struct Economy<S: State> {
    state: S,
    wallet: Wallet,
    snapshot: StakingSnapshot,
}

impl<S: State> Economy<S> {
    /// Create an economy backed by `state`, reloading any persisted wallet.
    pub fn new(state: S) -> Self {
        let wallet = load_wallet(&state);
        debug!(deposit = %wallet.deposit, stake = %wallet.stake, "loaded wallet");
        Self {
            state,
            wallet,
            snapshot: StakingSnapshot {
                stake: wallet.stake,
                ..Default::default()
            },
        }
    }

    pub fn wallet(&self) -> Wallet {
        self.wallet
    }

    /// Last values read from the staking contract.
    pub fn snapshot(&self) -> StakingSnapshot {
        self.snapshot
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }

    pub fn can_afford(&self, cost: Amount) -> bool {
        self.wallet.deposit >= cost
    }

    /// Deduct `cost` from the deposit, returning the remaining deposit.
    pub(crate) fn debit(&mut self, cost: Amount) -> Result<Amount, Error> {
        let remaining = self
            .wallet
            .deposit
            .checked_sub(cost)
            .ok_or(Error::InsufficientFunds {
                have: self.wallet.deposit,
                need: cost,
            })?;
        self.wallet.deposit = remaining;
        self.persist();
        Ok(remaining)
    }

    /// Add `amount` to the deposit, returning the new deposit.
    pub(crate) fn credit(&mut self, amount: Amount) -> Amount {
        if !amount.is_zero() {
            self.wallet.deposit = self.wallet.deposit.saturating_add(amount);
            self.persist();
        }
        self.wallet.deposit
    }

    /// Apply a deposit whose stake call already succeeded.
    pub fn record_deposit(&mut self, amount: Amount) -> Event {
        self.wallet.deposit = self.wallet.deposit.saturating_add(amount);
        self.wallet.stake = self.wallet.stake.saturating_add(amount);
        self.snapshot.stake = self.wallet.stake;
        self.persist();
        info!(%amount, deposit = %self.wallet.deposit, stake = %self.wallet.stake, "deposited");
        Event::Deposited {
            amount,
            deposit: self.wallet.deposit,
            stake: self.wallet.stake,
        }
    }

    /// Check that `amount` can be withdrawn from the stake.
    pub fn check_unstake(&self, amount: Amount) -> Result<(), Error> {
        if amount.is_zero() {
            return Err(Error::InvalidAmount);
        }
        if amount > self.wallet.stake {
            return Err(Error::InsufficientStake {
                have: self.wallet.stake,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Apply an unstake whose contract call already succeeded.
    pub fn record_unstake(&mut self, amount: Amount) -> Event {
        self.wallet.stake = self.wallet.stake.saturating_sub(amount);
        self.snapshot.stake = self.wallet.stake;
        self.persist();
        info!(%amount, stake = %self.wallet.stake, "unstaked");
        Event::Unstaked {
            amount,
            stake: self.wallet.stake,
        }
    }

    /// Apply a claim whose contract call already succeeded.
    pub fn record_claim(&mut self) -> Event {
        let yield_amount = std::mem::take(&mut self.snapshot.yield_amount);
        info!(%yield_amount, "claimed");
        Event::Claimed { yield_amount }
    }

    /// Merge read-outs from the staking contract. Failed reads keep the
    /// previous value.
    pub fn record_refresh(&mut self, readings: Readings) -> StakingSnapshot {
        let Readings {
            stake,
            yield_amount,
            reward_per_token,
        } = readings;
        if let Some(stake) = stake {
            self.snapshot.stake = stake;
            if self.wallet.stake != stake {
                self.wallet.stake = stake;
                self.persist();
            }
        }
        if let Some(yield_amount) = yield_amount {
            self.snapshot.yield_amount = yield_amount;
        }
        if let Some(reward_per_token) = reward_per_token {
            self.snapshot.reward_per_token = reward_per_token;
        }
        self.snapshot
    }

    fn persist(&mut self) {
        store_wallet(&mut self.state, &self.wallet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::economy_with_deposit;
    use crate::Memory;
    use proptest::prelude::*;
    use winfinity_types::arcade::Key;

    #[test]
    fn test_new_reloads_wallet() {
        let economy = economy_with_deposit(Amount::from_units(20));
        let state = economy.into_state();
        let reloaded = Economy::new(state);
        assert_eq!(reloaded.wallet().deposit, Amount::from_units(20));
    }

    #[test]
    fn test_debit_insufficient() {
        let mut economy = economy_with_deposit(Amount::from_units(5));
        let err = economy.debit(Amount::from_units(10)).unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientFunds {
                have: Amount::from_units(5),
                need: Amount::from_units(10),
            }
        );
        assert_eq!(economy.wallet().deposit, Amount::from_units(5));
    }

    #[test]
    fn test_debit_and_credit_persist() {
        let mut economy = economy_with_deposit(Amount::from_units(20));
        assert_eq!(economy.debit(Amount::from_units(20)).unwrap(), Amount::ZERO);
        assert_eq!(economy.state().get(Key::Deposit).as_deref(), Some("0.0"));
        assert_eq!(economy.credit(Amount::from_cents(150)), Amount::from_cents(150));
        assert_eq!(economy.state().get(Key::Deposit).as_deref(), Some("1.5"));
    }

    #[test]
    fn test_record_refresh_keeps_missing_values() {
        let mut economy = Economy::new(Memory::default());
        economy.record_refresh(Readings {
            stake: Some(Amount::from_units(7)),
            yield_amount: Some(Amount::from_cents(3)),
            reward_per_token: None,
        });
        let snapshot = economy.record_refresh(Readings {
            reward_per_token: Some(Amount::from_cents(1)),
            ..Default::default()
        });
        assert_eq!(snapshot.stake, Amount::from_units(7));
        assert_eq!(snapshot.yield_amount, Amount::from_cents(3));
        assert_eq!(snapshot.reward_per_token, Amount::from_cents(1));
        assert_eq!(economy.wallet().stake, Amount::from_units(7));
    }

    #[test]
    fn test_check_unstake() {
        let mut economy = Economy::new(Memory::default());
        economy.record_deposit(Amount::from_units(100));
        assert!(economy.check_unstake(Amount::from_units(100)).is_ok());
        assert_eq!(
            economy.check_unstake(Amount::ZERO),
            Err(Error::InvalidAmount)
        );
        assert!(matches!(
            economy.check_unstake(Amount::from_units(101)),
            Err(Error::InsufficientStake { .. })
        ));
    }

    proptest! {
        #[test]
        fn debits_never_overdraw(
            start in 0u64..10_000,
            costs in prop::collection::vec(0u64..5_000, 0..20),
        ) {
            let mut economy = economy_with_deposit(Amount::from_cents(start));
            for cost in costs {
                let cost = Amount::from_cents(cost);
                let before = economy.wallet().deposit;
                match economy.debit(cost) {
                    Ok(after) => prop_assert_eq!(after.checked_add(cost), Some(before)),
                    Err(_) => {
                        prop_assert!(before < cost);
                        prop_assert_eq!(economy.wallet().deposit, before);
                    }
                }
            }
        }
    }
}
