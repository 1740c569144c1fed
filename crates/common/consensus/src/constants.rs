use alloy_primitives::{aliases::B32, fixed_bytes};

pub const FAR_FUTURE_EPOCH: u64 = u64::MAX;

pub const SLOTS_PER_EPOCH: u64 = 32;

pub const GENESIS_FORK_VERSION: B32 = fixed_bytes!("00000000");

pub const DOMAIN_BEACON_PROPOSER: B32 = fixed_bytes!("00000000");
pub const DOMAIN_BEACON_ATTESTER: B32 = fixed_bytes!("01000000");

/// Per-block operation limits
pub const MAX_PROPOSER_SLASHINGS: usize = 16;
pub const MAX_ATTESTER_SLASHINGS: usize = 2;
