use std::{fs, path::Path};

use alloy_primitives::B256;
use anyhow::Context;
use ream_consensus::{
    attester_slashing::AttesterSlashing, beacon_state::BeaconState, checkpoint::Checkpoint,
    proposer_slashing::ProposerSlashing,
};
use serde::{de::DeserializeOwned, Deserialize};

/// A stored post-state together with the block root it belongs to.
#[derive(Debug, Deserialize)]
pub struct HistoricalState {
    pub root: B256,
    pub state: BeaconState,
    /// Also serve ``state`` for attestations targeting this checkpoint, skipping replay.
    #[serde(default)]
    pub checkpoint: Option<Checkpoint>,
}

pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn read_state(path: &Path) -> anyhow::Result<BeaconState> {
    read_yaml(path)
}

pub fn read_historical_states(path: Option<&Path>) -> anyhow::Result<Vec<HistoricalState>> {
    path.map_or_else(|| Ok(vec![]), read_yaml)
}

pub fn read_attester_slashings(path: Option<&Path>) -> anyhow::Result<Vec<AttesterSlashing>> {
    path.map_or_else(|| Ok(vec![]), read_yaml)
}

pub fn read_proposer_slashings(path: Option<&Path>) -> anyhow::Result<Vec<ProposerSlashing>> {
    path.map_or_else(|| Ok(vec![]), read_yaml)
}
