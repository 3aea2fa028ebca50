//! Command handlers

pub mod proposer;
pub mod quorum;
pub mod resolve;

use anyhow::{Context, Result};
use qbft_consensus::{load_transitions_json, Config};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the config file (or defaults) and optionally swap in a JSON
/// transition list.
pub fn load_config(config: Option<&Path>, transitions: Option<&Path>) -> Result<Config> {
    let mut loaded = match config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            debug!("No config file given, using defaults");
            Config::default()
        }
    };

    if let Some(path) = transitions {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        loaded.transitions = load_transitions_json(&json)
            .with_context(|| format!("invalid transitions in {}", path.display()))?;
    }

    Ok(loaded)
}
