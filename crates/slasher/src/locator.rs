use std::{future::Future, sync::Arc};

use ream_consensus::{
    attestation_data::AttestationData, beacon_block_header::BeaconBlockHeader,
    beacon_state::BeaconState,
};
use ream_storage::{
    errors::StoreError,
    traits::{AttestationStateFetcher, HeadStateFetcher, StateByRootFetcher},
};
use tokio_util::sync::CancellationToken;

use crate::error::SlasherError;

/// Finds the state a slashing claim must be authenticated against.
///
/// Claims at or beyond the head are checked against the head state. Older attestations use the
/// state of their target checkpoint and older block headers use the post-state of their parent.
#[derive(Clone)]
pub struct HistoricalStateLocator {
    head_state_fetcher: Arc<dyn HeadStateFetcher>,
    state_by_root_fetcher: Arc<dyn StateByRootFetcher>,
    attestation_state_fetcher: Arc<dyn AttestationStateFetcher>,
}

impl HistoricalStateLocator {
    pub fn new(
        head_state_fetcher: Arc<dyn HeadStateFetcher>,
        state_by_root_fetcher: Arc<dyn StateByRootFetcher>,
        attestation_state_fetcher: Arc<dyn AttestationStateFetcher>,
    ) -> Self {
        Self {
            head_state_fetcher,
            state_by_root_fetcher,
            attestation_state_fetcher,
        }
    }

    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: HeadStateFetcher + StateByRootFetcher + AttestationStateFetcher + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    pub async fn head_state(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<BeaconState>, SlasherError> {
        // A missing head is a broken backend, never a property of one claim
        cancellable(cancel, self.head_state_fetcher.head_state())
            .await
            .map_err(|err| match err {
                SlasherError::StateUnavailable(err) => SlasherError::StateBackend(err),
                err => err,
            })
    }

    pub async fn attestation_state(
        &self,
        cancel: &CancellationToken,
        head_state: &Arc<BeaconState>,
        data: &AttestationData,
    ) -> Result<Arc<BeaconState>, SlasherError> {
        if data.target.epoch >= head_state.get_current_epoch() {
            return Ok(head_state.clone());
        }
        cancellable(
            cancel,
            self.attestation_state_fetcher
                .attestation_target_state(data.target),
        )
        .await
    }

    pub async fn header_state(
        &self,
        cancel: &CancellationToken,
        head_state: &Arc<BeaconState>,
        header: &BeaconBlockHeader,
    ) -> Result<Arc<BeaconState>, SlasherError> {
        if header.slot >= head_state.slot {
            return Ok(head_state.clone());
        }
        cancellable(
            cancel,
            self.state_by_root_fetcher.state_by_root(header.parent_root),
        )
        .await
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    lookup: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, SlasherError> {
    if cancel.is_cancelled() {
        return Err(SlasherError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SlasherError::Cancelled),
        result = lookup => result.map_err(SlasherError::from),
    }
}
