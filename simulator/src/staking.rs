use tracing::{debug, info};
use winfinity_execution::{arcade::GameRng, Staking, StakingError};
use winfinity_types::arcade::{Amount, CENTS_PER_UNIT};

const BPS: u64 = 10_000;

/// Staking contract simulated in process.
///
/// Stakes earn `reward_bps` basis points every time [LocalStaking::accrue] is
/// called (once per round). Mutating calls are rejected with probability
/// `fail_rate`, mimicking a player dismissing the wallet prompt.
pub struct LocalStaking {
    staked: Amount,
    earned: Amount,
    reward_per_token: Amount,
    reward_bps: u64,
    fail_rate: f64,
    rng: GameRng,
}

impl LocalStaking {
    pub fn new(reward_bps: u64, fail_rate: f64, rng: GameRng) -> Self {
        Self {
            staked: Amount::ZERO,
            earned: Amount::ZERO,
            reward_per_token: Amount::ZERO,
            reward_bps,
            fail_rate,
            rng,
        }
    }

    /// Credit one period of rewards to the current stake.
    pub fn accrue(&mut self) {
        let cents = u128::from(self.staked.cents()) * u128::from(self.reward_bps) / u128::from(BPS);
        let reward = Amount::from_cents(u64::try_from(cents).unwrap_or(u64::MAX));
        self.earned = self.earned.saturating_add(reward);
        self.reward_per_token = self
            .reward_per_token
            .saturating_add(Amount::from_cents(CENTS_PER_UNIT * self.reward_bps / BPS));
        debug!(%reward, earned = %self.earned, "accrued staking rewards");
    }

    fn maybe_reject(&mut self, call: &str) -> Result<(), StakingError> {
        if self.fail_rate > 0.0 && self.rng.next_f64() < self.fail_rate {
            return Err(StakingError::Rejected(format!("{call} rejected by wallet")));
        }
        Ok(())
    }
}

impl Staking for LocalStaking {
    async fn stake(&mut self, amount: Amount) -> Result<(), StakingError> {
        self.maybe_reject("stake")?;
        self.staked = self.staked.saturating_add(amount);
        Ok(())
    }

    async fn unstake(&mut self, amount: Amount) -> Result<(), StakingError> {
        self.maybe_reject("unstake")?;
        self.staked = self
            .staked
            .checked_sub(amount)
            .ok_or_else(|| StakingError::Rejected("amount exceeds stake".to_string()))?;
        Ok(())
    }

    async fn claim(&mut self) -> Result<(), StakingError> {
        self.maybe_reject("claim")?;
        let claimed = std::mem::take(&mut self.earned);
        info!(%claimed, "paid out staking rewards");
        Ok(())
    }

    async fn current_stake(&self) -> Result<Amount, StakingError> {
        Ok(self.staked)
    }

    async fn current_yield(&self) -> Result<Amount, StakingError> {
        Ok(self.earned)
    }

    async fn current_reward_per_token(&self) -> Result<Amount, StakingError> {
        Ok(self.reward_per_token)
    }
}
