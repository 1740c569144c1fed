use alloy_primitives::{aliases::B32, B256};
use tree_hash::TreeHash;

use crate::{
    constants::{GENESIS_FORK_VERSION, SLOTS_PER_EPOCH},
    fork_data::ForkData,
    signing_data::SigningData,
};

/// Return the epoch number at ``slot``.
pub fn compute_epoch_at_slot(slot: u64) -> u64 {
    slot / SLOTS_PER_EPOCH
}

/// Return the start slot of ``epoch``.
pub fn compute_start_slot_at_epoch(epoch: u64) -> u64 {
    epoch.saturating_mul(SLOTS_PER_EPOCH)
}

/// Return the 32-byte fork data root for the ``current_version`` and
/// ``genesis_validators_root``. This is used primarily in signature domains to avoid collisions
/// across forks/chains.
pub fn compute_fork_data_root(current_version: B32, genesis_validators_root: B256) -> B256 {
    ForkData {
        current_version,
        genesis_validators_root,
    }
    .tree_hash_root()
}

/// Return the domain for the ``domain_type`` and ``fork_version``.
pub fn compute_domain(
    domain_type: B32,
    fork_version: Option<B32>,
    genesis_validators_root: Option<B256>,
) -> B256 {
    let fork_data_root = compute_fork_data_root(
        fork_version.unwrap_or(GENESIS_FORK_VERSION),
        genesis_validators_root.unwrap_or_default(),
    );
    let mut domain = B256::ZERO;
    domain[..4].copy_from_slice(domain_type.as_slice());
    domain[4..].copy_from_slice(&fork_data_root[..28]);
    domain
}

/// Return the signing root for the corresponding signing data.
pub fn compute_signing_root<SSZObject: TreeHash>(ssz_object: &SSZObject, domain: B256) -> B256 {
    SigningData {
        object_root: ssz_object.tree_hash_root(),
        domain,
    }
    .tree_hash_root()
}
