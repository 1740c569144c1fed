use std::collections::HashSet;

use alloy_primitives::B256;
use itertools::Itertools;
use parking_lot::RwLock;
use ream_consensus::{
    attester_slashing::AttesterSlashing,
    beacon_state::BeaconState,
    constants::{MAX_ATTESTER_SLASHINGS, MAX_PROPOSER_SLASHINGS},
    proposer_slashing::ProposerSlashing,
};
use tracing::debug;
use tree_hash::TreeHash;

use crate::errors::PoolError;

/// Sink for authenticated slashing evidence. Implementations must tolerate concurrent inserts,
/// and inserting the same evidence twice must leave a single pending entry.
pub trait SlashingPoolInserter: Send + Sync {
    fn insert_attester_slashing(
        &self,
        state: &BeaconState,
        slashing: AttesterSlashing,
    ) -> Result<(), PoolError>;

    fn insert_proposer_slashing(
        &self,
        state: &BeaconState,
        slashing: ProposerSlashing,
    ) -> Result<(), PoolError>;
}

/// Identity of an attester slashing: the unordered pair of the two attestation roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct AttesterSlashingKey(B256, B256);

impl AttesterSlashingKey {
    fn new(slashing: &AttesterSlashing) -> Self {
        let root_1 = slashing.attestation_1.tree_hash_root();
        let root_2 = slashing.attestation_2.tree_hash_root();
        if root_1 <= root_2 {
            Self(root_1, root_2)
        } else {
            Self(root_2, root_1)
        }
    }
}

/// Pending slashings waiting for inclusion in a block, kept in insertion order.
#[derive(Debug, Default)]
pub struct SlashingPool {
    attester_slashings: RwLock<Vec<(AttesterSlashingKey, AttesterSlashing)>>,
    proposer_slashings: RwLock<Vec<ProposerSlashing>>,
}

impl SlashingPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attester_slashings_len(&self) -> usize {
        self.attester_slashings.read().len()
    }

    pub fn proposer_slashings_len(&self) -> usize {
        self.proposer_slashings.read().len()
    }

    pub fn len(&self) -> usize {
        self.attester_slashings_len() + self.proposer_slashings_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attester slashings for a block built on ``state``. Each selected slashing covers at least
    /// one slashable validator not already covered by an earlier selection.
    pub fn pending_attester_slashings(&self, state: &BeaconState) -> Vec<AttesterSlashing> {
        let epoch = state.get_current_epoch();
        let mut covered = HashSet::new();
        self.attester_slashings
            .read()
            .iter()
            .filter_map(|(_, slashing)| {
                let fresh = slashable_indices(state, slashing, epoch)
                    .into_iter()
                    .filter(|index| !covered.contains(index))
                    .collect_vec();
                if fresh.is_empty() {
                    return None;
                }
                covered.extend(fresh);
                Some(slashing.clone())
            })
            .take(MAX_ATTESTER_SLASHINGS)
            .collect()
    }

    /// Proposer slashings for a block built on ``state``.
    pub fn pending_proposer_slashings(&self, state: &BeaconState) -> Vec<ProposerSlashing> {
        let epoch = state.get_current_epoch();
        self.proposer_slashings
            .read()
            .iter()
            .filter(|slashing| {
                state
                    .get_validator(slashing.proposer_index())
                    .is_some_and(|validator| validator.is_slashable(epoch))
            })
            .take(MAX_PROPOSER_SLASHINGS)
            .cloned()
            .collect()
    }

    /// Drop every pending slashing that no longer slashes anyone in ``state``.
    pub fn prune(&self, state: &BeaconState) {
        let epoch = state.get_current_epoch();
        self.attester_slashings
            .write()
            .retain(|(_, slashing)| !slashable_indices(state, slashing, epoch).is_empty());
        self.proposer_slashings.write().retain(|slashing| {
            state
                .get_validator(slashing.proposer_index())
                .is_some_and(|validator| validator.is_slashable(epoch))
        });
    }
}

impl SlashingPoolInserter for SlashingPool {
    fn insert_attester_slashing(
        &self,
        state: &BeaconState,
        slashing: AttesterSlashing,
    ) -> Result<(), PoolError> {
        validate_attester_slashing(state, &slashing)?;

        let key = AttesterSlashingKey::new(&slashing);
        let mut attester_slashings = self.attester_slashings.write();
        if attester_slashings.iter().any(|(existing, _)| *existing == key) {
            debug!(root_1 = %key.0, root_2 = %key.1, "Attester slashing already pending");
            return Ok(());
        }
        attester_slashings.push((key, slashing));
        Ok(())
    }

    /// Proposer slashings are keyed by proposer index rather than by header roots: one proof
    /// per proposer is enough to slash it, so a second pair for the same proposer is a no-op.
    fn insert_proposer_slashing(
        &self,
        state: &BeaconState,
        slashing: ProposerSlashing,
    ) -> Result<(), PoolError> {
        validate_proposer_slashing(state, &slashing)?;

        let proposer_index = slashing.proposer_index();
        let mut proposer_slashings = self.proposer_slashings.write();
        if proposer_slashings
            .iter()
            .any(|existing| existing.proposer_index() == proposer_index)
        {
            debug!(proposer_index, "Proposer slashing already pending");
            return Ok(());
        }
        proposer_slashings.push(slashing);
        Ok(())
    }
}

fn slashable_indices(state: &BeaconState, slashing: &AttesterSlashing, epoch: u64) -> Vec<u64> {
    slashing
        .slashable_indices()
        .into_iter()
        .filter(|&index| {
            state
                .get_validator(index)
                .is_some_and(|validator| validator.is_slashable(epoch))
        })
        .collect()
}

fn validate_attester_slashing(
    state: &BeaconState,
    slashing: &AttesterSlashing,
) -> Result<(), PoolError> {
    let attestation_1 = &slashing.attestation_1;
    let attestation_2 = &slashing.attestation_2;

    if !attestation_1.data.is_slashable_with(&attestation_2.data) {
        return Err(PoolError::NotSlashable);
    }
    if !attestation_1.has_sorted_unique_indices() || !attestation_2.has_sorted_unique_indices() {
        return Err(PoolError::UnsortedIndices);
    }
    if let Some(&index) = attestation_1
        .attesting_indices
        .iter()
        .chain(attestation_2.attesting_indices.iter())
        .find(|&&index| state.get_validator(index).is_none())
    {
        return Err(PoolError::UnknownValidator(index));
    }
    if slashing.slashable_indices().is_empty() {
        return Err(PoolError::NoCommonIndices);
    }
    if slashable_indices(state, slashing, state.get_current_epoch()).is_empty() {
        return Err(PoolError::NothingToSlash);
    }
    Ok(())
}

fn validate_proposer_slashing(
    state: &BeaconState,
    slashing: &ProposerSlashing,
) -> Result<(), PoolError> {
    if !slashing.is_conflicting() {
        return Err(PoolError::NotSlashable);
    }
    let proposer_index = slashing.proposer_index();
    let validator = state
        .get_validator(proposer_index)
        .ok_or(PoolError::UnknownValidator(proposer_index))?;
    if !validator.is_slashable(state.get_current_epoch()) {
        return Err(PoolError::NothingToSlash);
    }
    Ok(())
}
