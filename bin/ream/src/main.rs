use std::sync::Arc;

use alloy_primitives::B256;
use anyhow::Context;
use clap::Parser;
use ream::{
    cli::{Cli, Commands, VerifySlashingsCommand},
    input::{read_attester_slashings, read_historical_states, read_proposer_slashings, read_state},
};
use ream_consensus::beacon_state::BeaconState;
use ream_operation_pool::SlashingPool;
use ream_slasher::{locator::HistoricalStateLocator, SlasherConfig, SlashingProcessor};
use ream_storage::memory::InMemoryStateStore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tree_hash::TreeHash;

fn main() -> anyhow::Result<()> {
    // Set the default log level to `info` if not set
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::VerifySlashings(cmd) => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(verify_slashings(cmd))
        }
    }
}

async fn verify_slashings(cmd: VerifySlashingsCommand) -> anyhow::Result<()> {
    let head_state = read_state(&cmd.state)?;
    let historical_states = read_historical_states(cmd.historical_states.as_deref())?;
    let attester_slashings = read_attester_slashings(cmd.attester_slashings.as_deref())?;
    let proposer_slashings = read_proposer_slashings(cmd.proposer_slashings.as_deref())?;

    let head_root = block_root(&head_state);
    let store = Arc::new(InMemoryStateStore::with_head(head_root, head_state.clone()));
    for historical in historical_states {
        if let Some(checkpoint) = historical.checkpoint {
            store.save_checkpoint_state(checkpoint, historical.state.clone());
        }
        store.save_state(historical.root, historical.state);
    }
    info!(
        head_slot = head_state.slot,
        stored_states = store.len(),
        "Loaded beacon states"
    );

    let pool = Arc::new(SlashingPool::new());
    let processor = SlashingProcessor::new(
        SlasherConfig::with_max_concurrency(cmd.max_concurrency),
        HistoricalStateLocator::from_store(store),
        pool.clone(),
    );

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling slashing batch");
                cancel.cancel();
            }
        })
    };

    let result = async {
        processor
            .process_attester_slashings(&cancel, attester_slashings)
            .await?;
        processor
            .process_proposer_slashings(&cancel, proposer_slashings)
            .await
    }
    .await;
    ctrl_c.abort();
    result.context("slashing batch aborted")?;

    info!(
        attester_slashings = pool.pending_attester_slashings(&head_state).len(),
        proposer_slashings = pool.pending_proposer_slashings(&head_state).len(),
        "Slashings ready for block inclusion"
    );
    Ok(())
}

/// Root of the block the state was produced by, filling in the state root the header leaves
/// empty until the next slot.
fn block_root(state: &BeaconState) -> B256 {
    let mut header = state.latest_block_header;
    if header.state_root == B256::ZERO {
        header.state_root = state.tree_hash_root();
    }
    header.tree_hash_root()
}
