use alloy_primitives::B256;
use ream_consensus::checkpoint::Checkpoint;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no state stored for block root {0}")]
    StateNotFound(B256),

    #[error("no state can be produced for checkpoint (epoch {}, root {})", .0.epoch, .0.root)]
    CheckpointStateNotFound(Checkpoint),

    #[error("head state has not been set")]
    NoHeadState,

    #[error("state backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// The requested ancestry does not exist, as opposed to the backend being unusable.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::StateNotFound(_) | Self::CheckpointStateNotFound(_)
        )
    }
}
