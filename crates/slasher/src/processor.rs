use std::{future::Future, sync::Arc};

use alloy_primitives::B256;
use futures::{stream, StreamExt};
use ream_consensus::{
    attester_slashing::AttesterSlashing, beacon_state::BeaconState,
    proposer_slashing::ProposerSlashing,
};
use ream_operation_pool::{errors::PoolError, SlashingPoolInserter};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tree_hash::TreeHash;

use crate::{
    config::SlasherConfig,
    error::SlasherError,
    events::{Side, SlashingEvent, SlashingEventSink, SlashingKind, TracingEventSink},
    locator::HistoricalStateLocator,
    verification::{
        attester_slashing_domain, verify_block_header_signature,
        verify_indexed_attestation_signature, SignatureCheck,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClaimOutcome {
    Admitted,
    Dropped,
}

/// Authenticates slashing claims against the state they were made in and forwards the
/// authentic ones to the slashing pool.
///
/// A batch only fails on infrastructure faults: a broken state backend or cancellation. Claims
/// with bad signatures, unreachable ancestry or rejected by the pool are dropped and reported
/// through the event sink.
pub struct SlashingProcessor {
    config: SlasherConfig,
    locator: HistoricalStateLocator,
    pool: Arc<dyn SlashingPoolInserter>,
    events: Arc<dyn SlashingEventSink>,
}

impl SlashingProcessor {
    pub fn new(
        config: SlasherConfig,
        locator: HistoricalStateLocator,
        pool: Arc<dyn SlashingPoolInserter>,
    ) -> Self {
        Self {
            config,
            locator,
            pool,
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn SlashingEventSink>) -> Self {
        self.events = events;
        self
    }

    pub async fn process_attester_slashings(
        &self,
        cancel: &CancellationToken,
        slashings: Vec<AttesterSlashing>,
    ) -> Result<(), SlasherError> {
        if slashings.is_empty() {
            return Ok(());
        }
        let head_state = self.locator.head_state(cancel).await?;
        self.process_batch(SlashingKind::Attester, slashings, |slashing| {
            self.process_attester_slashing(cancel, &head_state, slashing)
        })
        .await
    }

    pub async fn process_proposer_slashings(
        &self,
        cancel: &CancellationToken,
        slashings: Vec<ProposerSlashing>,
    ) -> Result<(), SlasherError> {
        if slashings.is_empty() {
            return Ok(());
        }
        let head_state = self.locator.head_state(cancel).await?;
        self.process_batch(SlashingKind::Proposer, slashings, |slashing| {
            self.process_proposer_slashing(cancel, &head_state, slashing)
        })
        .await
    }

    async fn process_batch<T, F, Fut>(
        &self,
        kind: SlashingKind,
        claims: Vec<T>,
        process_claim: F,
    ) -> Result<(), SlasherError>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<ClaimOutcome, SlasherError>>,
    {
        let total = claims.len();
        let mut outcomes = stream::iter(claims)
            .map(process_claim)
            .buffer_unordered(self.config.max_concurrency());

        let mut admitted = 0;
        while let Some(outcome) = outcomes.next().await {
            // Dropping the stream stops any claim still in flight
            if outcome? == ClaimOutcome::Admitted {
                admitted += 1;
            }
        }

        info!(
            %kind,
            total,
            admitted,
            dropped = total - admitted,
            "Processed slashing batch"
        );
        Ok(())
    }

    async fn process_attester_slashing(
        &self,
        cancel: &CancellationToken,
        head_state: &Arc<BeaconState>,
        slashing: AttesterSlashing,
    ) -> Result<ClaimOutcome, SlasherError> {
        let kind = SlashingKind::Attester;
        if cancel.is_cancelled() {
            return Err(SlasherError::Cancelled);
        }

        let state = self
            .locator
            .attestation_state(cancel, head_state, &slashing.attestation_1.data)
            .await;
        let Some(state) = self.claim_state(kind, state)? else {
            return Ok(ClaimOutcome::Dropped);
        };

        let domain = attester_slashing_domain(&state, &slashing);
        let check_1 = verify_indexed_attestation_signature(&state, &slashing.attestation_1, domain);
        let check_2 = verify_indexed_attestation_signature(&state, &slashing.attestation_2, domain);
        if !self.report_signature_checks(kind, check_1, check_2) {
            return Ok(ClaimOutcome::Dropped);
        }

        let root = slashing.tree_hash_root();
        let inserted = self.pool.insert_attester_slashing(head_state, slashing);
        Ok(self.admit(kind, root, inserted))
    }

    async fn process_proposer_slashing(
        &self,
        cancel: &CancellationToken,
        head_state: &Arc<BeaconState>,
        slashing: ProposerSlashing,
    ) -> Result<ClaimOutcome, SlasherError> {
        let kind = SlashingKind::Proposer;
        if cancel.is_cancelled() {
            return Err(SlasherError::Cancelled);
        }

        let header_1 = &slashing.signed_header_1;
        let header_2 = &slashing.signed_header_2;

        let state_1 = self
            .locator
            .header_state(cancel, head_state, &header_1.message)
            .await;
        let Some(state_1) = self.claim_state(kind, state_1)? else {
            return Ok(ClaimOutcome::Dropped);
        };
        let state_2 = if header_2.message.slot == header_1.message.slot
            && header_2.message.parent_root == header_1.message.parent_root
        {
            state_1.clone()
        } else {
            let state_2 = self
                .locator
                .header_state(cancel, head_state, &header_2.message)
                .await;
            let Some(state_2) = self.claim_state(kind, state_2)? else {
                return Ok(ClaimOutcome::Dropped);
            };
            state_2
        };

        let check_1 = verify_block_header_signature(&state_1, header_1);
        let check_2 = verify_block_header_signature(&state_2, header_2);
        if !self.report_signature_checks(kind, check_1, check_2) {
            return Ok(ClaimOutcome::Dropped);
        }

        let root = slashing.tree_hash_root();
        let inserted = self.pool.insert_proposer_slashing(head_state, slashing);
        Ok(self.admit(kind, root, inserted))
    }

    /// Absorbs claim-level lookup failures, passes batch-level ones through.
    fn claim_state(
        &self,
        kind: SlashingKind,
        state: Result<Arc<BeaconState>, SlasherError>,
    ) -> Result<Option<Arc<BeaconState>>, SlasherError> {
        match state {
            Ok(state) => Ok(Some(state)),
            Err(err) if !err.is_fatal() => {
                self.events.emit(SlashingEvent::StateUnavailable {
                    kind,
                    reason: err.to_string(),
                });
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Reports every failing side and returns whether both sides verified.
    fn report_signature_checks(
        &self,
        kind: SlashingKind,
        check_1: SignatureCheck,
        check_2: SignatureCheck,
    ) -> bool {
        for (side, check) in [(Side::First, check_1), (Side::Second, check_2)] {
            match check {
                SignatureCheck::Valid => {}
                SignatureCheck::InvalidSignature => {
                    self.events
                        .emit(SlashingEvent::InvalidSignature { kind, side });
                }
                SignatureCheck::UnknownValidator(validator_index) => {
                    self.events.emit(SlashingEvent::UnknownValidator {
                        kind,
                        side,
                        validator_index,
                    });
                }
            }
        }
        check_1.is_valid() && check_2.is_valid()
    }

    fn admit(
        &self,
        kind: SlashingKind,
        root: B256,
        inserted: Result<(), PoolError>,
    ) -> ClaimOutcome {
        match inserted {
            Ok(()) => {
                self.events.emit(SlashingEvent::Admitted { kind, root });
                ClaimOutcome::Admitted
            }
            Err(err) => {
                self.events.emit(SlashingEvent::PoolRejected {
                    kind,
                    reason: err.to_string(),
                });
                ClaimOutcome::Dropped
            }
        }
    }
}
