use crate::{arcade::GameRng, store_wallet, Economy, Memory, Staking, StakingError};
use winfinity_types::arcade::{Amount, Wallet};

/// Call recorded by [MockStaking].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Stake(Amount),
    Unstake(Amount),
    Claim,
}

/// In-memory staking contract with failure injection.
#[derive(Clone, Debug, Default)]
pub struct MockStaking {
    pub staked: Amount,
    pub yield_amount: Amount,
    pub reward_per_token: Amount,
    /// When set, every mutating call fails with this error
    pub reject: Option<StakingError>,
    /// When set, every read fails
    pub fail_reads: bool,
    pub calls: Vec<Call>,
}

impl MockStaking {
    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject: Some(StakingError::Rejected(reason.to_string())),
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), StakingError> {
        match &self.reject {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn read(&self, value: Amount) -> Result<Amount, StakingError> {
        if self.fail_reads {
            return Err(StakingError::Unavailable("reads disabled".to_string()));
        }
        Ok(value)
    }
}

impl Staking for MockStaking {
    async fn stake(&mut self, amount: Amount) -> Result<(), StakingError> {
        self.calls.push(Call::Stake(amount));
        self.check()?;
        self.staked = self.staked.saturating_add(amount);
        Ok(())
    }

    async fn unstake(&mut self, amount: Amount) -> Result<(), StakingError> {
        self.calls.push(Call::Unstake(amount));
        self.check()?;
        self.staked = self
            .staked
            .checked_sub(amount)
            .ok_or_else(|| StakingError::Rejected("amount exceeds stake".to_string()))?;
        Ok(())
    }

    async fn claim(&mut self) -> Result<(), StakingError> {
        self.calls.push(Call::Claim);
        self.check()?;
        self.yield_amount = Amount::ZERO;
        Ok(())
    }

    async fn current_stake(&self) -> Result<Amount, StakingError> {
        self.read(self.staked)
    }

    async fn current_yield(&self) -> Result<Amount, StakingError> {
        self.read(self.yield_amount)
    }

    async fn current_reward_per_token(&self) -> Result<Amount, StakingError> {
        self.read(self.reward_per_token)
    }
}

/// Creates an economy whose persisted deposit is `deposit`
pub fn economy_with_deposit(deposit: Amount) -> Economy<Memory> {
    let mut state = Memory::default();
    store_wallet(
        &mut state,
        &Wallet {
            deposit,
            stake: Amount::ZERO,
        },
    );
    Economy::new(state)
}

/// Creates a deterministic rng for tests
pub fn create_rng(seed: u64) -> GameRng {
    GameRng::new(seed)
}
