use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ream_slasher::config::DEFAULT_MAX_CONCURRENCY;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Verify slashing claims and report which ones reach the pool
    #[command(name = "verify-slashings")]
    VerifySlashings(VerifySlashingsCommand),
}

#[derive(Debug, Parser)]
pub struct VerifySlashingsCommand {
    /// YAML file holding the head beacon state
    #[arg(long, env = "REAM_STATE")]
    pub state: PathBuf,

    /// YAML file holding historical states keyed by block root
    #[arg(long)]
    pub historical_states: Option<PathBuf>,

    /// YAML file holding a list of attester slashings
    #[arg(long)]
    pub attester_slashings: Option<PathBuf>,

    /// YAML file holding a list of proposer slashings
    #[arg(long)]
    pub proposer_slashings: Option<PathBuf>,

    /// Claims resolved and verified at the same time
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,
}
