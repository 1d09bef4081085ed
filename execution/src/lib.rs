pub mod arcade;
pub mod cabinet;
pub mod economy;
pub mod scheduler;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod error;
mod staking;
mod state;

pub use cabinet::Cabinet;
pub use economy::Economy;
pub use error::Error;
pub use staking::{Staking, StakingError};
pub use state::{load_wallet, store_wallet, Memory, State, Status};
