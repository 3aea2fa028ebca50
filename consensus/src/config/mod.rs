// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! Consensus Configuration
//!
//! The base [`Config`] plus a list of block-height [`Transition`]s. Every
//! resolver method is a pure function of `(&Config, height)`; nothing here
//! mutates the base.
//!
//! Transitions are applied in list order and resolution stops at the first
//! entry above the queried height, so lists must be ascending by block.
//! [`Config::load`] and [`Config::from_toml_str`] reject lists that are not.

mod genesis;
mod loader;
mod transition;

pub use genesis::{IstanbulConfig, QbftConfig};
pub use loader::{load_transitions_json, validate_transitions};
pub use transition::{BeneficiaryMode, BlockReward, Transition, ValidatorSelectionMode};

use qbft_types::Address;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::liveness::ProposerPolicy;
use crate::quorum::QuorumModel;
use crate::validator_set::ValidatorSet;

/// Effective consensus parameters.
///
/// Field order matters for TOML output: plain values first, then tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Round timeout in milliseconds.
    pub request_timeout: u64,

    /// Minimum seconds between two consecutive block timestamps.
    pub block_period: u64,

    /// Minimum seconds between a block and a following empty block.
    pub empty_block_period: u64,

    /// Blocks after which pending votes are reset.
    pub epoch: u64,

    /// Height from which quorum moves from `2F + 1` to `ceil(2N / 3)`.
    /// `None` keeps `2F + 1` forever and is written as `"never"`; an absent
    /// key takes the default of 0.
    #[serde(with = "switch_height")]
    pub ceil2nby3_block: Option<u64>,

    /// Seconds a block timestamp may run ahead of local time.
    pub allowed_future_block_time: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_mode: Option<BeneficiaryMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reward: Option<BlockReward>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mining_beneficiary: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_selection_mode: Option<ValidatorSelectionMode>,

    /// Upper bound on the round timeout after back-off, in seconds.
    pub max_request_timeout_seconds: u64,

    /// Genesis validators, used at height 0.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Address>,

    pub proposer_policy: ProposerPolicy,

    /// Ascending by `block`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout: 10_000,
            block_period: 5,
            empty_block_period: 0,
            epoch: 30_000,
            ceil2nby3_block: Some(0),
            allowed_future_block_time: 0,
            beneficiary_mode: None,
            block_reward: None,
            mining_beneficiary: None,
            validator_selection_mode: None,
            max_request_timeout_seconds: 0,
            validators: Vec::new(),
            proposer_policy: ProposerPolicy::default(),
            transitions: Vec::new(),
        }
    }
}

impl Config {
    /// Transitions in effect at `height`: the leading entries with
    /// `block <= height`.
    pub fn transitions_at(&self, height: u64) -> &[Transition] {
        let end = self
            .transitions
            .iter()
            .position(|t| t.block > height)
            .unwrap_or(self.transitions.len());
        &self.transitions[..end]
    }

    /// Parameters in effect at `height`.
    pub fn get_config(&self, height: u64) -> Config {
        let mut config = self.clone();
        let applied = self.transitions_at(height);
        for transition in applied {
            transition.apply(&mut config);
        }
        trace!(height, applied = applied.len(), "Resolved config");
        config
    }

    /// Validator source at `height`, [`ValidatorSelectionMode::BlockHeader`]
    /// unless configured otherwise.
    pub fn get_validator_selection_mode(&self, height: u64) -> ValidatorSelectionMode {
        self.transitions_at(height)
            .iter()
            .filter_map(|t| t.validator_selection_mode)
            .last()
            .or(self.validator_selection_mode)
            .unwrap_or_default()
    }

    /// Validators pinned by configuration at exactly `height`.
    ///
    /// At height 0 this is the genesis list when one is configured. Otherwise
    /// only the first transition is consulted, and only when its block equals
    /// `height`. An empty result means the set comes from the previous block
    /// header.
    pub fn get_validators_at(&self, height: u64) -> Vec<Address> {
        if height == 0 && !self.validators.is_empty() {
            return self.validators.clone();
        }
        match self.transitions.first() {
            Some(first) if first.block == height => first.validators.clone(),
            _ => Vec::new(),
        }
    }

    /// Whether `2F + 1` is forced at `height` by a transition.
    pub fn get_2f_plus_1_enabled(&self, height: u64) -> bool {
        self.transitions_at(height)
            .iter()
            .filter_map(|t| t.two_f_plus_one_enabled)
            .last()
            .unwrap_or(false)
    }

    /// Quorum model in effect at `height`.
    pub fn quorum_model(&self, height: u64) -> QuorumModel {
        let before_switch = match self.ceil2nby3_block {
            Some(switch) => height < switch,
            None => true,
        };
        if before_switch || self.get_2f_plus_1_enabled(height) {
            QuorumModel::TwoFPlusOne
        } else {
            QuorumModel::Ceil2NBy3
        }
    }

    /// Votes needed from `validators` at `height`.
    pub fn quorum_size(&self, height: u64, validators: &ValidatorSet) -> usize {
        let model = self.quorum_model(height);
        let size = model.size(validators.size());
        trace!(height, ?model, validators = validators.size(), size, "Resolved quorum size");
        size
    }
}

/// `Option<u64>` that survives formats without a null: a number, or the
/// string `"never"` for `None`.
mod switch_height {
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NEVER: &str = "never";

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(height) => serializer.serialize_u64(*height),
            None => serializer.serialize_str(NEVER),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Height(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Height(height) => Ok(Some(height)),
            Raw::Text(text) if text == NEVER => Ok(None),
            Raw::Text(text) => Err(de::Error::invalid_value(
                de::Unexpected::Str(&text),
                &"a block height or \"never\"",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbft_types::test_utils::{address, addresses};

    fn with_transitions(transitions: Vec<Transition>) -> Config {
        Config {
            transitions,
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.request_timeout, 10_000);
        assert_eq!(config.block_period, 5);
        assert_eq!(config.empty_block_period, 0);
        assert_eq!(config.epoch, 30_000);
        assert_eq!(config.ceil2nby3_block, Some(0));
        assert_eq!(config.allowed_future_block_time, 0);
        assert_eq!(config.proposer_policy, ProposerPolicy::round_robin());
    }

    #[test]
    fn test_transitions_at_takes_prefix() {
        let config = with_transitions(vec![
            Transition::at(10),
            Transition::at(20),
            Transition::at(30),
        ]);
        assert!(config.transitions_at(9).is_empty());
        assert_eq!(config.transitions_at(10).len(), 1);
        assert_eq!(config.transitions_at(29).len(), 2);
        assert_eq!(config.transitions_at(u64::MAX).len(), 3);
    }

    #[test]
    fn test_request_timeout_scenario() {
        let config = with_transitions(vec![Transition {
            request_timeout_seconds: 5,
            ..Transition::at(100)
        }]);
        assert_eq!(config.get_config(50).request_timeout, 10_000);
        assert_eq!(config.get_config(100).request_timeout, 5_000);
        assert_eq!(config.get_config(1000).request_timeout, 5_000);
        assert_eq!(config.request_timeout, 10_000);
    }

    #[test]
    fn test_get_config_is_idempotent() {
        let config = with_transitions(vec![
            Transition {
                epoch_length: 100,
                block_period_seconds: 2,
                ..Transition::at(5)
            },
            Transition {
                block_period_seconds: 1,
                validators: addresses(3),
                ..Transition::at(8)
            },
        ]);
        let once = config.get_config(10);
        assert_eq!(once.epoch, 100);
        assert_eq!(once.block_period, 1);
        assert_eq!(once.validators, addresses(3));
        assert_eq!(config.get_config(10), once);
        assert_eq!(once.get_config(10), once);
    }

    #[test]
    fn test_later_transition_overrides_earlier() {
        let config = with_transitions(vec![
            Transition {
                request_timeout_seconds: 4,
                ..Transition::at(1)
            },
            Transition {
                request_timeout_seconds: 2,
                ..Transition::at(2)
            },
            Transition::at(3),
        ]);
        assert_eq!(config.get_config(1).request_timeout, 4_000);
        assert_eq!(config.get_config(3).request_timeout, 2_000);
    }

    #[test]
    fn test_ceil2nby3_scenario() {
        let config = Config {
            ceil2nby3_block: Some(1000),
            ..Config::default()
        };
        let set = ValidatorSet::new(addresses(5), ProposerPolicy::round_robin());
        assert_eq!(config.quorum_size(500, &set), 3);
        assert_eq!(config.quorum_size(1000, &set), 4);
        assert_eq!(config.quorum_size(1500, &set), 4);
    }

    #[test]
    fn test_quorum_model_without_switch() {
        let config = Config {
            ceil2nby3_block: None,
            ..Config::default()
        };
        assert_eq!(config.quorum_model(u64::MAX), QuorumModel::TwoFPlusOne);
        assert_eq!(Config::default().quorum_model(0), QuorumModel::Ceil2NBy3);
    }

    #[test]
    fn test_two_f_plus_one_flag_overrides_switch() {
        let config = with_transitions(vec![
            Transition {
                two_f_plus_one_enabled: Some(true),
                ..Transition::at(100)
            },
            Transition {
                two_f_plus_one_enabled: Some(false),
                ..Transition::at(200)
            },
        ]);
        assert!(!config.get_2f_plus_1_enabled(99));
        assert!(config.get_2f_plus_1_enabled(150));
        assert!(!config.get_2f_plus_1_enabled(250));

        assert_eq!(config.quorum_model(50), QuorumModel::Ceil2NBy3);
        assert_eq!(config.quorum_model(150), QuorumModel::TwoFPlusOne);
        assert_eq!(config.quorum_model(250), QuorumModel::Ceil2NBy3);
    }

    #[test]
    fn test_validator_selection_mode() {
        let mut config = Config::default();
        assert_eq!(config.get_validator_selection_mode(0), ValidatorSelectionMode::BlockHeader);

        config.transitions = vec![Transition {
            validator_selection_mode: Some(ValidatorSelectionMode::Contract),
            ..Transition::at(10)
        }];
        assert_eq!(config.get_validator_selection_mode(9), ValidatorSelectionMode::BlockHeader);
        assert_eq!(config.get_validator_selection_mode(10), ValidatorSelectionMode::Contract);

        config.validator_selection_mode = Some(ValidatorSelectionMode::Contract);
        assert_eq!(config.get_validator_selection_mode(0), ValidatorSelectionMode::Contract);
    }

    #[test]
    fn test_get_validators_at_consults_first_transition_only() {
        let (a, b) = (address(1), address(2));
        let mut config = with_transitions(vec![
            Transition {
                validators: vec![a],
                ..Transition::at(10)
            },
            Transition {
                validators: vec![b],
                ..Transition::at(20)
            },
        ]);
        assert_eq!(config.get_validators_at(10), vec![a]);
        assert!(config.get_validators_at(20).is_empty());
        assert!(config.get_validators_at(15).is_empty());
        assert!(config.get_validators_at(0).is_empty());

        config.validators = vec![b];
        assert_eq!(config.get_validators_at(0), vec![b]);
    }
}
