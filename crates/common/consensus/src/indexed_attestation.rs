use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum, VariableList};
use tree_hash_derive::TreeHash;

use crate::{attestation_data::AttestationData, signature::BlsSignature};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct IndexedAttestation {
    pub attesting_indices: VariableList<u64, typenum::U2048>,
    pub data: AttestationData,
    pub signature: BlsSignature,
}

impl IndexedAttestation {
    /// Attesting indices must be non-empty and strictly increasing.
    pub fn has_sorted_unique_indices(&self) -> bool {
        !self.attesting_indices.is_empty()
            && self
                .attesting_indices
                .windows(2)
                .all(|pair| pair[0] < pair[1])
    }
}
