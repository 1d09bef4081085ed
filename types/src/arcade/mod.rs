mod amount;
mod constants;
mod economy;
mod event;
mod game;
mod input;

pub use amount::*;
pub use constants::*;
pub use economy::*;
pub use event::*;
pub use game::*;
pub use input::*;

#[cfg(test)]
mod tests;
