use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlasherConfig {
    /// Upper bound on claims of one batch being resolved and verified at the same time
    pub max_concurrency: usize,
}

impl Default for SlasherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl SlasherConfig {
    pub fn with_max_concurrency(max_concurrency: usize) -> Self {
        Self { max_concurrency }
    }

    /// Effective concurrency, never below one.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}
