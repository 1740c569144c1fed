//! Per-side signature checks for slashing claims.
//!
//! Attester slashings sign with `DOMAIN_BEACON_ATTESTER` at the source epoch of the first
//! attestation, shared by both sides. Proposer slashings sign each header with
//! `DOMAIN_BEACON_PROPOSER` at the epoch of that header's own slot.

use alloy_primitives::B256;
use ream_consensus::{
    attester_slashing::AttesterSlashing,
    beacon_block_header::SignedBeaconBlockHeader,
    beacon_state::BeaconState,
    constants::{DOMAIN_BEACON_ATTESTER, DOMAIN_BEACON_PROPOSER},
    indexed_attestation::IndexedAttestation,
    misc::{compute_epoch_at_slot, compute_signing_root},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    InvalidSignature,
    /// The claimed signer is not in the state's validator registry.
    UnknownValidator(u64),
}

impl SignatureCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

pub fn attester_slashing_domain(state: &BeaconState, slashing: &AttesterSlashing) -> B256 {
    state.get_domain(
        DOMAIN_BEACON_ATTESTER,
        Some(slashing.attestation_1.data.source.epoch),
    )
}

pub fn verify_indexed_attestation_signature(
    state: &BeaconState,
    attestation: &IndexedAttestation,
    domain: B256,
) -> SignatureCheck {
    let mut pubkeys = Vec::with_capacity(attestation.attesting_indices.len());
    for &index in attestation.attesting_indices.iter() {
        match state.get_validator_pubkey(index) {
            Some(pubkey) => pubkeys.push(pubkey),
            None => return SignatureCheck::UnknownValidator(index),
        }
    }

    let signing_root = compute_signing_root(&attestation.data, domain);
    if attestation
        .signature
        .fast_aggregate_verify(pubkeys, signing_root.as_slice())
    {
        SignatureCheck::Valid
    } else {
        SignatureCheck::InvalidSignature
    }
}

pub fn block_header_domain(state: &BeaconState, signed_header: &SignedBeaconBlockHeader) -> B256 {
    state.get_domain(
        DOMAIN_BEACON_PROPOSER,
        Some(compute_epoch_at_slot(signed_header.message.slot)),
    )
}

pub fn verify_block_header_signature(
    state: &BeaconState,
    signed_header: &SignedBeaconBlockHeader,
) -> SignatureCheck {
    let proposer_index = signed_header.message.proposer_index;
    let Some(pubkey) = state.get_validator_pubkey(proposer_index) else {
        return SignatureCheck::UnknownValidator(proposer_index);
    };

    let signing_root = compute_signing_root(
        &signed_header.message,
        block_header_domain(state, signed_header),
    );
    if signed_header
        .signature
        .verify(pubkey, signing_root.as_slice())
    {
        SignatureCheck::Valid
    } else {
        SignatureCheck::InvalidSignature
    }
}
