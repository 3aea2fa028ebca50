//! QBFT CLI - inspect consensus parameters and proposer rotation
//!
//! ```bash
//! # Effective parameters at a height
//! qbft resolve --config qbft.toml --height 1200
//!
//! # Next proposers after a given block author
//! qbft proposer --validators 0x..01,0x..02,0x..03 --last 0x..02 --rounds 6
//!
//! # Quorum for 5 validators at a height
//! qbft quorum --config qbft.toml --height 1500 --size 5
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use qbft_consensus::ProposerPolicyId;
use qbft_types::{Address, ValidatorSortBy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qbft")]
#[command(version, about = "QBFT validator and parameter inspection", long_about = None)]
struct Cli {
    /// Consensus config file (TOML). Defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON file with a transition array, replacing the config's transitions
    #[arg(long, global = true)]
    transitions: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the parameters in effect at a block height
    Resolve {
        #[arg(long)]
        height: u64,

        /// Print JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Print the proposer for consecutive rounds
    Proposer {
        /// Comma-separated validator addresses (defaults to the config's genesis list)
        #[arg(long, value_delimiter = ',')]
        validators: Vec<Address>,

        /// Author of the previous block (zero address at genesis)
        #[arg(long, default_value_t = Address::ZERO)]
        last: Address,

        /// Number of rounds to show
        #[arg(long, default_value = "4")]
        rounds: u64,

        /// Override the configured selection policy
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        #[arg(long, value_enum, default_value = "string")]
        sort_by: SortByArg,
    },

    /// Print the quorum model and size at a block height
    Quorum {
        #[arg(long)]
        height: u64,

        /// Validator count (defaults to the validators configured at the height)
        #[arg(long)]
        size: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    RoundRobin,
    Sticky,
}

impl From<PolicyArg> for ProposerPolicyId {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::RoundRobin => ProposerPolicyId::RoundRobin,
            PolicyArg::Sticky => ProposerPolicyId::Sticky,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortByArg {
    String,
    Bytes,
}

impl From<SortByArg> for ValidatorSortBy {
    fn from(arg: SortByArg) -> Self {
        match arg {
            SortByArg::String => ValidatorSortBy::String,
            SortByArg::Bytes => ValidatorSortBy::Bytes,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref(), cli.transitions.as_deref())?;

    match cli.command {
        Commands::Resolve { height, json } => commands::resolve::handle(&config, height, json),
        Commands::Proposer {
            validators,
            last,
            rounds,
            policy,
            sort_by,
        } => commands::proposer::handle(
            &config,
            validators,
            last,
            rounds,
            policy.map(Into::into),
            sort_by.into(),
        ),
        Commands::Quorum { height, size } => commands::quorum::handle(&config, height, size),
    }
}
