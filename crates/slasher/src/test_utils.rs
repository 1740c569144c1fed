use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use alloy_primitives::{aliases::B32, fixed_bytes, B256};
use async_trait::async_trait;
use blst::min_pk::SecretKey;
use parking_lot::Mutex;
use ream_consensus::{
    attestation_data::AttestationData,
    attester_slashing::AttesterSlashing,
    beacon_block_header::{BeaconBlockHeader, SignedBeaconBlockHeader},
    beacon_state::BeaconState,
    checkpoint::Checkpoint,
    constants::{DOMAIN_BEACON_ATTESTER, FAR_FUTURE_EPOCH},
    fork::Fork,
    indexed_attestation::IndexedAttestation,
    misc::compute_signing_root,
    proposer_slashing::ProposerSlashing,
    pubkey::PubKey,
    signature::{BlsSignature, DST},
    validator::Validator,
};
use ream_operation_pool::{errors::PoolError, SlashingPool, SlashingPoolInserter};
use ream_storage::{
    errors::StoreError,
    memory::InMemoryStateStore,
    traits::{AttestationStateFetcher, HeadStateFetcher, StateByRootFetcher},
};

use tokio_util::sync::CancellationToken;

use crate::{
    config::SlasherConfig, events::RecordingEventSink, locator::HistoricalStateLocator,
    processor::SlashingProcessor, verification::block_header_domain,
};

pub const HEAD_ROOT: B256 = B256::new([0x77; 32]);

pub const PHASE0_VERSION: B32 = fixed_bytes!("00000000");
pub const ALTAIR_VERSION: B32 = fixed_bytes!("01000000");
pub const BELLATRIX_VERSION: B32 = fixed_bytes!("02000000");

pub fn secret_key(seed: u8) -> SecretKey {
    SecretKey::key_gen(&[seed; 32], &[]).unwrap()
}

pub fn validator(secret_key: &SecretKey) -> Validator {
    Validator {
        pubkey: PubKey::from(secret_key.sk_to_pk().to_bytes()),
        withdrawal_credentials: B256::ZERO,
        effective_balance: 32_000_000_000,
        slashed: false,
        activation_eligibility_epoch: 0,
        activation_epoch: 0,
        exit_epoch: FAR_FUTURE_EPOCH,
        withdrawable_epoch: FAR_FUTURE_EPOCH,
    }
}

pub fn phase0_fork() -> Fork {
    Fork {
        previous_version: PHASE0_VERSION,
        current_version: PHASE0_VERSION,
        epoch: 0,
    }
}

/// Fork schedule of a chain that left phase0 long ago.
pub fn bellatrix_fork() -> Fork {
    Fork {
        previous_version: ALTAIR_VERSION,
        current_version: BELLATRIX_VERSION,
        epoch: 20,
    }
}

pub fn beacon_state(slot: u64, fork: Fork, secret_keys: &[SecretKey]) -> BeaconState {
    let validators = secret_keys.iter().map(validator).collect::<Vec<_>>();
    BeaconState {
        genesis_time: 1_606_824_023,
        genesis_validators_root: B256::repeat_byte(0x4b),
        slot,
        fork,
        latest_block_header: BeaconBlockHeader {
            slot,
            proposer_index: 0,
            parent_root: B256::ZERO,
            state_root: B256::ZERO,
            body_root: B256::ZERO,
        },
        balances: vec![32_000_000_000_u64; validators.len()].into(),
        validators: validators.into(),
    }
}

pub fn attestation_data(
    source_epoch: u64,
    target_epoch: u64,
    target_root: B256,
    beacon_block_root: u8,
) -> AttestationData {
    AttestationData {
        slot: target_epoch * 32,
        index: 0,
        beacon_block_root: B256::repeat_byte(beacon_block_root),
        source: Checkpoint {
            epoch: source_epoch,
            root: B256::ZERO,
        },
        target: Checkpoint {
            epoch: target_epoch,
            root: target_root,
        },
    }
}

/// Attestation signed by ``secret_key`` under the attester domain ``state`` yields for
/// ``domain_epoch``.
pub fn signed_attestation(
    state: &BeaconState,
    secret_key: &SecretKey,
    attesting_indices: Vec<u64>,
    data: AttestationData,
    domain_epoch: u64,
) -> IndexedAttestation {
    let domain = state.get_domain(DOMAIN_BEACON_ATTESTER, Some(domain_epoch));
    let signing_root = compute_signing_root(&data, domain);
    IndexedAttestation {
        attesting_indices: attesting_indices.into(),
        data,
        signature: BlsSignature::from(secret_key.sign(signing_root.as_slice(), DST, &[])),
    }
}

/// Double vote by one validator, both sides signed at ``source_epoch`` under ``state``.
pub fn double_vote(
    state: &BeaconState,
    secret_key: &SecretKey,
    validator_index: u64,
    source_epoch: u64,
    target_epoch: u64,
    target_root: B256,
) -> AttesterSlashing {
    let attestation = |beacon_block_root| {
        signed_attestation(
            state,
            secret_key,
            vec![validator_index],
            attestation_data(source_epoch, target_epoch, target_root, beacon_block_root),
            source_epoch,
        )
    };
    AttesterSlashing {
        attestation_1: attestation(0xaa),
        attestation_2: attestation(0xbb),
    }
}

pub fn header(
    slot: u64,
    proposer_index: u64,
    parent_root: B256,
    body_root: u8,
) -> BeaconBlockHeader {
    BeaconBlockHeader {
        slot,
        proposer_index,
        parent_root,
        state_root: B256::ZERO,
        body_root: B256::repeat_byte(body_root),
    }
}

/// Header signed by ``secret_key`` under the proposer domain of ``state``.
pub fn signed_header(
    state: &BeaconState,
    secret_key: &SecretKey,
    message: BeaconBlockHeader,
) -> SignedBeaconBlockHeader {
    let mut signed_header = SignedBeaconBlockHeader {
        message,
        signature: BlsSignature::empty(),
    };
    let signing_root = compute_signing_root(&message, block_header_domain(state, &signed_header));
    signed_header.signature =
        BlsSignature::from(secret_key.sign(signing_root.as_slice(), DST, &[]));
    signed_header
}

/// In-memory store that counts lookups and can be switched into a failing backend.
#[derive(Debug, Default)]
pub struct CountingStore {
    pub inner: InMemoryStateStore,
    lookups: AtomicUsize,
    failure: Mutex<Option<StoreError>>,
    cancel_at: Mutex<Option<(usize, CancellationToken)>>,
}

impl CountingStore {
    pub fn with_head(head_state: BeaconState) -> Self {
        Self {
            inner: InMemoryStateStore::with_head(HEAD_ROOT, head_state),
            ..Default::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock() = Some(err);
    }

    /// Cancel ``cancel`` while serving the ``lookup``-th lookup, counting from one.
    pub fn cancel_on_lookup(&self, lookup: usize, cancel: CancellationToken) {
        *self.cancel_at.lock() = Some((lookup, cancel));
    }

    fn record(&self) -> Result<(), StoreError> {
        let lookup = self.lookups.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((_, cancel)) = self
            .cancel_at
            .lock()
            .as_ref()
            .filter(|(cancel_at, _)| *cancel_at == lookup)
        {
            cancel.cancel();
        }
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HeadStateFetcher for CountingStore {
    async fn head_state(&self) -> Result<Arc<BeaconState>, StoreError> {
        self.record()?;
        self.inner.head_state().await
    }
}

#[async_trait]
impl StateByRootFetcher for CountingStore {
    async fn state_by_root(&self, block_root: B256) -> Result<Arc<BeaconState>, StoreError> {
        self.record()?;
        self.inner.state_by_root(block_root).await
    }
}

#[async_trait]
impl AttestationStateFetcher for CountingStore {
    async fn attestation_target_state(
        &self,
        target: Checkpoint,
    ) -> Result<Arc<BeaconState>, StoreError> {
        self.record()?;
        self.inner.attestation_target_state(target).await
    }
}

/// Pool that accepts anything and keeps claims exactly as received.
#[derive(Debug, Default)]
pub struct RecordingPool {
    pub attester_slashings: Mutex<Vec<AttesterSlashing>>,
    pub proposer_slashings: Mutex<Vec<ProposerSlashing>>,
}

impl SlashingPoolInserter for RecordingPool {
    fn insert_attester_slashing(
        &self,
        _state: &BeaconState,
        slashing: AttesterSlashing,
    ) -> Result<(), PoolError> {
        self.attester_slashings.lock().push(slashing);
        Ok(())
    }

    fn insert_proposer_slashing(
        &self,
        _state: &BeaconState,
        slashing: ProposerSlashing,
    ) -> Result<(), PoolError> {
        self.proposer_slashings.lock().push(slashing);
        Ok(())
    }
}

pub struct Harness {
    pub store: Arc<CountingStore>,
    pub pool: Arc<SlashingPool>,
    pub events: Arc<RecordingEventSink>,
    pub processor: SlashingProcessor,
}

impl Harness {
    pub fn new(head_state: BeaconState) -> Self {
        Self::with_config(head_state, SlasherConfig::default())
    }

    pub fn with_config(head_state: BeaconState, config: SlasherConfig) -> Self {
        let store = Arc::new(CountingStore::with_head(head_state));
        let pool = Arc::new(SlashingPool::new());
        let events = Arc::new(RecordingEventSink::new());
        let processor = SlashingProcessor::new(
            config,
            HistoricalStateLocator::from_store(store.clone()),
            pool.clone(),
        )
        .with_event_sink(events.clone());
        Self {
            store,
            pool,
            events,
            processor,
        }
    }
}
