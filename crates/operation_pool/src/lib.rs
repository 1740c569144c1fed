pub mod errors;
pub mod slashing_pool;

pub use slashing_pool::{SlashingPool, SlashingPoolInserter};
