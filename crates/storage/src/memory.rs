//! In-memory state storage for tests and single-process tooling.

use std::{collections::HashMap, sync::Arc};

use alloy_primitives::B256;
use async_trait::async_trait;
use parking_lot::RwLock;
use ream_consensus::{
    beacon_state::BeaconState, checkpoint::Checkpoint, misc::compute_start_slot_at_epoch,
};
use tracing::debug;

use crate::{
    errors::StoreError,
    traits::{AttestationStateFetcher, HeadStateFetcher, StateByRootFetcher},
};

#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    head_root: RwLock<Option<B256>>,
    block_states: RwLock<HashMap<B256, Arc<BeaconState>>>,
    checkpoint_states: RwLock<HashMap<Checkpoint, Arc<BeaconState>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store ``state`` as the post-state of the block with ``block_root`` and make it the head.
    pub fn with_head(block_root: B256, state: BeaconState) -> Self {
        let store = Self::new();
        store.save_state(block_root, state);
        *store.head_root.write() = Some(block_root);
        store
    }

    pub fn save_state(&self, block_root: B256, state: BeaconState) {
        self.block_states.write().insert(block_root, Arc::new(state));
    }

    pub fn save_checkpoint_state(&self, checkpoint: Checkpoint, state: BeaconState) {
        self.checkpoint_states
            .write()
            .insert(checkpoint, Arc::new(state));
    }

    pub fn set_head(&self, block_root: B256) -> Result<(), StoreError> {
        if !self.block_states.read().contains_key(&block_root) {
            return Err(StoreError::StateNotFound(block_root));
        }
        *self.head_root.write() = Some(block_root);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.block_states.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.block_states.read().is_empty()
    }

    fn replay_checkpoint_state(&self, target: Checkpoint) -> Result<Arc<BeaconState>, StoreError> {
        let base_state = self
            .block_states
            .read()
            .get(&target.root)
            .cloned()
            .ok_or(StoreError::CheckpointStateNotFound(target))?;

        let target_slot = compute_start_slot_at_epoch(target.epoch);
        let state = if base_state.slot < target_slot {
            debug!(
                from_slot = base_state.slot,
                to_slot = target_slot,
                "Advancing state to checkpoint epoch"
            );
            let mut state = BeaconState::clone(&base_state);
            state.slot = target_slot;
            Arc::new(state)
        } else {
            base_state
        };

        self.checkpoint_states
            .write()
            .entry(target)
            .or_insert_with(|| state.clone());
        Ok(state)
    }
}

#[async_trait]
impl HeadStateFetcher for InMemoryStateStore {
    async fn head_state(&self) -> Result<Arc<BeaconState>, StoreError> {
        let head_root = (*self.head_root.read()).ok_or(StoreError::NoHeadState)?;
        self.block_states
            .read()
            .get(&head_root)
            .cloned()
            .ok_or_else(|| {
                StoreError::Backend(format!("head root {head_root} has no stored state"))
            })
    }
}

#[async_trait]
impl StateByRootFetcher for InMemoryStateStore {
    async fn state_by_root(&self, block_root: B256) -> Result<Arc<BeaconState>, StoreError> {
        self.block_states
            .read()
            .get(&block_root)
            .cloned()
            .ok_or(StoreError::StateNotFound(block_root))
    }
}

#[async_trait]
impl AttestationStateFetcher for InMemoryStateStore {
    async fn attestation_target_state(
        &self,
        target: Checkpoint,
    ) -> Result<Arc<BeaconState>, StoreError> {
        if let Some(state) = self.checkpoint_states.read().get(&target) {
            return Ok(state.clone());
        }
        self.replay_checkpoint_state(target)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::aliases::B32;
    use ream_consensus::{
        beacon_block_header::BeaconBlockHeader, fork::Fork, validator::Validator,
    };

    use super::*;

    fn state(slot: u64) -> BeaconState {
        BeaconState {
            genesis_time: 0,
            genesis_validators_root: B256::repeat_byte(0x11),
            slot,
            fork: Fork {
                previous_version: B32::ZERO,
                current_version: B32::ZERO,
                epoch: 0,
            },
            latest_block_header: BeaconBlockHeader {
                slot,
                proposer_index: 0,
                parent_root: B256::ZERO,
                state_root: B256::ZERO,
                body_root: B256::ZERO,
            },
            validators: Vec::<Validator>::new().into(),
            balances: Vec::<u64>::new().into(),
        }
    }

    #[tokio::test]
    async fn test_head_state() {
        let store = InMemoryStateStore::new();
        assert_eq!(store.head_state().await.unwrap_err(), StoreError::NoHeadState);

        let head_root = B256::repeat_byte(1);
        store.save_state(head_root, state(40));
        store.set_head(head_root).unwrap();
        assert_eq!(store.head_state().await.unwrap().slot, 40);

        assert_eq!(
            store.set_head(B256::repeat_byte(2)).unwrap_err(),
            StoreError::StateNotFound(B256::repeat_byte(2))
        );
    }

    #[tokio::test]
    async fn test_state_by_root() {
        let parent_root = B256::repeat_byte(9);
        let store = InMemoryStateStore::with_head(parent_root, state(3));

        assert_eq!(store.state_by_root(parent_root).await.unwrap().slot, 3);
        let err = store.state_by_root(B256::ZERO).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_attestation_target_state_replays_to_epoch_start() {
        let block_root = B256::repeat_byte(5);
        let store = InMemoryStateStore::with_head(block_root, state(33));
        let target = Checkpoint {
            epoch: 3,
            root: block_root,
        };

        let replayed = store.attestation_target_state(target).await.unwrap();
        assert_eq!(replayed.slot, 96);
        // The stored block state is untouched
        assert_eq!(store.state_by_root(block_root).await.unwrap().slot, 33);
        // Second lookup is served from the checkpoint cache
        assert!(Arc::ptr_eq(
            &replayed,
            &store.attestation_target_state(target).await.unwrap()
        ));
    }

    #[tokio::test]
    async fn test_seeded_checkpoint_state_wins_over_replay() {
        let block_root = B256::repeat_byte(5);
        let store = InMemoryStateStore::with_head(block_root, state(33));
        let target = Checkpoint {
            epoch: 3,
            root: block_root,
        };
        let mut checkpoint_state = state(100);
        checkpoint_state.genesis_validators_root = B256::repeat_byte(0x22);
        store.save_checkpoint_state(target, checkpoint_state.clone());

        let resolved = store.attestation_target_state(target).await.unwrap();
        assert_eq!(*resolved, checkpoint_state);

        // Other epochs of the same root still replay from the block state
        let replayed = store
            .attestation_target_state(Checkpoint {
                epoch: 2,
                root: block_root,
            })
            .await
            .unwrap();
        assert_eq!(replayed.slot, 64);
        assert_eq!(replayed.genesis_validators_root, B256::repeat_byte(0x11));
    }

    #[tokio::test]
    async fn test_attestation_target_state_unknown_root() {
        let store = InMemoryStateStore::new();
        let target = Checkpoint {
            epoch: 1,
            root: B256::repeat_byte(0xee),
        };

        let err = store.attestation_target_state(target).await.unwrap_err();
        assert_eq!(err, StoreError::CheckpointStateNotFound(target));
        assert!(err.is_not_found());
        assert!(!StoreError::NoHeadState.is_not_found());
    }
}
