use alloy_primitives::aliases::B32;
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Fork {
    pub previous_version: B32,
    pub current_version: B32,

    /// Epoch of latest fork
    pub epoch: u64,
}

impl Fork {
    /// Fork version in force at ``epoch``.
    pub fn version_at(&self, epoch: u64) -> B32 {
        if epoch < self.epoch {
            self.previous_version
        } else {
            self.current_version
        }
    }
}
