// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;
use tracing::info;

use super::transition::Transition;
use super::Config;
use crate::error::{ConfigError, ConfigResult};

/// Check that transitions are sorted by block. Equal heights are allowed and
/// apply in list order.
pub fn validate_transitions(transitions: &[Transition]) -> ConfigResult<()> {
    for (index, pair) in transitions.windows(2).enumerate() {
        if pair[1].block < pair[0].block {
            return Err(ConfigError::UnorderedTransitions {
                index: index + 1,
                block: pair[1].block,
                previous: pair[0].block,
            });
        }
    }
    Ok(())
}

/// Parse a JSON array of transitions, as found in chain configs.
pub fn load_transitions_json(json: &str) -> ConfigResult<Vec<Transition>> {
    let transitions: Vec<Transition> = serde_json::from_str(json)?;
    validate_transitions(&transitions)?;
    Ok(transitions)
}

impl Config {
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(content)?;
        validate_transitions(&config.transitions)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            transitions = config.transitions.len(),
            policy = ?config.proposer_policy.id(),
            "Loaded consensus config"
        );
        Ok(config)
    }
}
