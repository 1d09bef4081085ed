use std::future::Future;
use thiserror::Error;
use winfinity_types::arcade::Amount;

/// Failure reported by the staking service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StakingError {
    /// The contract (or the wallet signing for it) refused the call
    #[error("staking call rejected: {0}")]
    Rejected(String),
    /// The service could not be reached or returned something unusable
    #[error("staking service unavailable: {0}")]
    Unavailable(String),
}

/// Port to the external staking contract.
///
/// Calls are awaited one at a time, without timeouts or retries. Dropping a
/// returned future abandons the call.
pub trait Staking {
    fn stake(&mut self, amount: Amount) -> impl Future<Output = Result<(), StakingError>>;
    fn unstake(&mut self, amount: Amount) -> impl Future<Output = Result<(), StakingError>>;
    fn claim(&mut self) -> impl Future<Output = Result<(), StakingError>>;

    fn current_stake(&self) -> impl Future<Output = Result<Amount, StakingError>>;
    fn current_yield(&self) -> impl Future<Output = Result<Amount, StakingError>>;
    fn current_reward_per_token(&self) -> impl Future<Output = Result<Amount, StakingError>>;
}
