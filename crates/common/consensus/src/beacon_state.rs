use alloy_primitives::{aliases::B32, B256};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum::U1099511627776, VariableList};
use tree_hash_derive::TreeHash;

use crate::{
    beacon_block_header::BeaconBlockHeader,
    fork::Fork,
    misc::{compute_domain, compute_epoch_at_slot},
    pubkey::PubKey,
    validator::Validator,
};

/// The slice of the beacon state that signature domains and validator lookups read from.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct BeaconState {
    // Versioning
    pub genesis_time: u64,
    pub genesis_validators_root: B256,
    pub slot: u64,
    pub fork: Fork,

    // History
    pub latest_block_header: BeaconBlockHeader,

    // Registry
    pub validators: VariableList<Validator, U1099511627776>,
    pub balances: VariableList<u64, U1099511627776>,
}

impl BeaconState {
    /// Return the current epoch.
    pub fn get_current_epoch(&self) -> u64 {
        compute_epoch_at_slot(self.slot)
    }

    /// Return the signature domain (fork version concatenated with domain type) of a message.
    pub fn get_domain(&self, domain_type: B32, epoch: Option<u64>) -> B256 {
        let epoch = epoch.unwrap_or_else(|| self.get_current_epoch());
        compute_domain(
            domain_type,
            Some(self.fork.version_at(epoch)),
            Some(self.genesis_validators_root),
        )
    }

    pub fn get_validator(&self, index: u64) -> Option<&Validator> {
        self.validators.get(usize::try_from(index).ok()?)
    }

    pub fn get_validator_pubkey(&self, index: u64) -> Option<&PubKey> {
        self.get_validator(index).map(|validator| &validator.pubkey)
    }
}
