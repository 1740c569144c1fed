pub mod config;
pub mod error;
pub mod events;
pub mod locator;
pub mod processor;
pub mod verification;

#[cfg(test)]
mod test_utils;

pub use config::SlasherConfig;
pub use error::SlasherError;
pub use processor::SlashingProcessor;
