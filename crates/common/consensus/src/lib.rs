pub mod attestation_data;
pub mod attester_slashing;
pub mod beacon_block_header;
pub mod beacon_state;
pub mod checkpoint;
pub mod constants;
pub mod fork;
pub mod fork_data;
pub mod indexed_attestation;
pub mod misc;
pub mod proposer_slashing;
pub mod pubkey;
pub mod signature;
pub mod signing_data;
pub mod validator;
