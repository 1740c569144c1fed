use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

use crate::indexed_attestation::IndexedAttestation;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct AttesterSlashing {
    pub attestation_1: IndexedAttestation,
    pub attestation_2: IndexedAttestation,
}

impl AttesterSlashing {
    /// Validator indices that attested on both sides, in ascending order.
    pub fn slashable_indices(&self) -> Vec<u64> {
        let mut indices = self
            .attestation_1
            .attesting_indices
            .iter()
            .filter(|index| self.attestation_2.attesting_indices.contains(*index))
            .copied()
            .collect::<Vec<_>>();
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
