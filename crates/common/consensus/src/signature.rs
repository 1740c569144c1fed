use blst::{
    min_pk::{PublicKey, Signature},
    BLST_ERROR,
};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum, FixedVector};
use tree_hash_derive::TreeHash;

use crate::pubkey::PubKey;

pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_ROPOP";

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(transparent)]
pub struct BlsSignature {
    #[serde(with = "ssz_types::serde_utils::hex_fixed_vec")]
    pub signature: FixedVector<u8, typenum::U96>,
}

impl BlsSignature {
    /// The all-zero signature. It never verifies.
    pub fn empty() -> Self {
        Self {
            signature: FixedVector::from(vec![0; 96]),
        }
    }

    /// Verify a single signer over ``signing_root``.
    pub fn verify(&self, pubkey: &PubKey, signing_root: &[u8]) -> bool {
        self.fast_aggregate_verify([pubkey], signing_root)
    }

    /// Verify an aggregate signature of ``pubkeys`` over the same ``signing_root``.
    ///
    /// Undecodable signatures or keys and an empty key set are reported as a failed
    /// verification rather than an error.
    pub fn fast_aggregate_verify<'a>(
        &self,
        pubkeys: impl IntoIterator<Item = &'a PubKey>,
        signing_root: &[u8],
    ) -> bool {
        let Ok(signature) = Signature::from_bytes(&self.signature) else {
            return false;
        };
        let Some(public_keys) = pubkeys
            .into_iter()
            .map(PubKey::to_blst)
            .collect::<Option<Vec<PublicKey>>>()
        else {
            return false;
        };
        if public_keys.is_empty() {
            return false;
        }

        let public_keys = public_keys.iter().collect::<Vec<_>>();
        signature.fast_aggregate_verify(true, signing_root, DST, &public_keys)
            == BLST_ERROR::BLST_SUCCESS
    }
}

impl From<Signature> for BlsSignature {
    fn from(signature: Signature) -> Self {
        Self {
            signature: FixedVector::from(signature.to_bytes().to_vec()),
        }
    }
}
