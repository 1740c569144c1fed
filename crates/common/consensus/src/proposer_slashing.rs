use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

use crate::beacon_block_header::SignedBeaconBlockHeader;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct ProposerSlashing {
    pub signed_header_1: SignedBeaconBlockHeader,
    pub signed_header_2: SignedBeaconBlockHeader,
}

impl ProposerSlashing {
    pub fn proposer_index(&self) -> u64 {
        self.signed_header_1.message.proposer_index
    }

    /// Two distinct headers for the same slot from the same proposer.
    pub fn is_conflicting(&self) -> bool {
        let header_1 = &self.signed_header_1.message;
        let header_2 = &self.signed_header_2.message;
        header_1.slot == header_2.slot
            && header_1.proposer_index == header_2.proposer_index
            && header_1 != header_2
    }
}
