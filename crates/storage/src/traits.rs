//! Read access to beacon states, split by the way callers address them.

use std::sync::Arc;

use alloy_primitives::B256;
use async_trait::async_trait;
use ream_consensus::{beacon_state::BeaconState, checkpoint::Checkpoint};

use crate::errors::StoreError;

/// The state at the head of the canonical chain.
#[async_trait]
pub trait HeadStateFetcher: Send + Sync {
    async fn head_state(&self) -> Result<Arc<BeaconState>, StoreError>;
}

/// Post-states keyed by the root of the block that produced them.
#[async_trait]
pub trait StateByRootFetcher: Send + Sync {
    async fn state_by_root(&self, block_root: B256) -> Result<Arc<BeaconState>, StoreError>;
}

/// The state an attestation's target checkpoint refers to, replayed to the start of the
/// target epoch when it is not cached.
#[async_trait]
pub trait AttestationStateFetcher: Send + Sync {
    async fn attestation_target_state(
        &self,
        target: Checkpoint,
    ) -> Result<Arc<BeaconState>, StoreError>;
}
