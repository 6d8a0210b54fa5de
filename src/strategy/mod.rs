pub mod book;
pub mod contract;
pub mod templates;

pub use book::StrategyBook;
pub use contract::{Contract, Position, CONTRACT_MULTIPLIER};
