use super::Economy;
use crate::{Error, Staking, StakingError, State};
use tracing::warn;
use winfinity_types::arcade::{Amount, Event, StakingSnapshot};

/// Reject amounts that cannot be staked before calling out.
pub fn check_deposit(amount: Amount) -> Result<(), Error> {
    if amount.is_zero() {
        return Err(Error::InvalidAmount);
    }
    Ok(())
}

/// Log a failed contract call and convert it.
pub fn staking_failed(call: &'static str, error: StakingError) -> Error {
    warn!(call, %error, "staking call failed");
    error.into()
}

/// Values read back from the staking contract. A failed read is `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Readings {
    pub stake: Option<Amount>,
    pub yield_amount: Option<Amount>,
    pub reward_per_token: Option<Amount>,
}

impl Readings {
    /// Query all three values. Each read is independent and failures are
    /// logged.
    pub async fn read<T: Staking>(staking: &T) -> Self {
        Self {
            stake: logged("current stake", staking.current_stake().await),
            yield_amount: logged("current yield", staking.current_yield().await),
            reward_per_token: logged(
                "current reward per token",
                staking.current_reward_per_token().await,
            ),
        }
    }
}

fn logged(what: &'static str, result: Result<Amount, StakingError>) -> Option<Amount> {
    match result {
        Ok(amount) => Some(amount),
        Err(e) => {
            warn!(error = %e, "failed to read {what}");
            None
        }
    }
}

impl<S: State> Economy<S> {
    /// Stake `amount` with the contract, then credit it to both deposit and
    /// stake. A rejected call leaves the wallet untouched.
    pub async fn deposit<T: Staking>(
        &mut self,
        staking: &mut T,
        amount: Amount,
    ) -> Result<Event, Error> {
        check_deposit(amount)?;
        staking
            .stake(amount)
            .await
            .map_err(|e| staking_failed("stake", e))?;
        Ok(self.record_deposit(amount))
    }

    /// Withdraw `amount` from the stake. The deposit is not affected.
    pub async fn unstake<T: Staking>(
        &mut self,
        staking: &mut T,
        amount: Amount,
    ) -> Result<Event, Error> {
        self.check_unstake(amount)?;
        staking
            .unstake(amount)
            .await
            .map_err(|e| staking_failed("unstake", e))?;
        Ok(self.record_unstake(amount))
    }

    /// Claim accumulated staking rewards.
    pub async fn claim<T: Staking>(&mut self, staking: &mut T) -> Result<Event, Error> {
        staking
            .claim()
            .await
            .map_err(|e| staking_failed("claim", e))?;
        Ok(self.record_claim())
    }

    /// Read stake, yield and reward rate back from the contract, keeping the
    /// previous value wherever a read fails.
    pub async fn refresh<T: Staking>(&mut self, staking: &T) -> StakingSnapshot {
        let readings = Readings::read(staking).await;
        self.record_refresh(readings)
    }
}
