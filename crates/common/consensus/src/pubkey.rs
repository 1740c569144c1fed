use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum, FixedVector};
use tree_hash_derive::TreeHash;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(transparent)]
pub struct PubKey {
    #[serde(with = "ssz_types::serde_utils::hex_fixed_vec")]
    pub inner: FixedVector<u8, typenum::U48>,
}

impl PubKey {
    /// Decode into a blst key, rejecting the point at infinity and points outside the subgroup.
    pub fn to_blst(&self) -> Option<blst::min_pk::PublicKey> {
        blst::min_pk::PublicKey::key_validate(&self.inner).ok()
    }
}

impl From<[u8; 48]> for PubKey {
    fn from(bytes: [u8; 48]) -> Self {
        Self {
            inner: FixedVector::from(bytes.to_vec()),
        }
    }
}
