// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! Consensus sections of a genesis chain config.
//!
//! Both shapes overlay onto a base [`Config`] with the same rule as
//! transitions: zero or absent fields inherit.

use qbft_types::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::transition::{BeneficiaryMode, BlockReward, ValidatorSelectionMode};
use super::Config;
use crate::error::ConfigResult;
use crate::liveness::{ProposerPolicy, ProposerPolicyId};

/// `qbft` section of a chain config.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QbftConfig {
    #[serde(rename = "epochlength", default)]
    pub epoch_length: u64,

    #[serde(rename = "blockperiodseconds", default)]
    pub block_period_seconds: u64,

    #[serde(rename = "emptyblockperiodseconds", default, skip_serializing_if = "Option::is_none")]
    pub empty_block_period_seconds: Option<u64>,

    #[serde(rename = "requesttimeoutseconds", default)]
    pub request_timeout_seconds: u64,

    #[serde(rename = "policy", default)]
    pub proposer_policy: u64,

    #[serde(rename = "ceil2Nby3Block", default, skip_serializing_if = "Option::is_none")]
    pub ceil2nby3_block: Option<u64>,

    #[serde(rename = "blockReward", default, skip_serializing_if = "Option::is_none")]
    pub block_reward: Option<BlockReward>,

    #[serde(rename = "beneficiaryMode", default, skip_serializing_if = "Option::is_none")]
    pub beneficiary_mode: Option<BeneficiaryMode>,

    #[serde(rename = "miningBeneficiary", default, skip_serializing_if = "Option::is_none")]
    pub mining_beneficiary: Option<Address>,

    #[serde(rename = "validatorselectionmode", default, skip_serializing_if = "Option::is_none")]
    pub validator_selection_mode: Option<ValidatorSelectionMode>,

    #[serde(default)]
    pub validators: Vec<Address>,

    #[serde(rename = "maxRequestTimeoutSeconds", default)]
    pub max_request_timeout_seconds: Option<u64>,
}

/// Legacy `istanbul` section of a chain config.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IstanbulConfig {
    #[serde(default)]
    pub epoch: u64,

    #[serde(rename = "policy", default)]
    pub proposer_policy: u64,

    #[serde(rename = "ceil2Nby3Block", default, skip_serializing_if = "Option::is_none")]
    pub ceil2nby3_block: Option<u64>,
}

impl Config {
    /// Overlay a `qbft` genesis section.
    ///
    /// Fails without modifying `self` when the policy id is unknown.
    pub fn apply_qbft(&mut self, genesis: &QbftConfig) -> ConfigResult<()> {
        let policy = ProposerPolicyId::try_from(genesis.proposer_policy)?;
        self.set_policy(policy);

        if genesis.epoch_length != 0 {
            self.epoch = genesis.epoch_length;
        }
        if genesis.block_period_seconds != 0 {
            self.block_period = genesis.block_period_seconds;
        }
        if let Some(seconds) = genesis.empty_block_period_seconds {
            self.empty_block_period = seconds;
        }
        if genesis.request_timeout_seconds != 0 {
            self.request_timeout = genesis.request_timeout_seconds.saturating_mul(1000);
        }
        if genesis.ceil2nby3_block.is_some() {
            self.ceil2nby3_block = genesis.ceil2nby3_block;
        }
        if genesis.block_reward.is_some() {
            self.block_reward = genesis.block_reward;
        }
        if genesis.beneficiary_mode.is_some() {
            self.beneficiary_mode = genesis.beneficiary_mode;
        }
        if genesis.mining_beneficiary.is_some() {
            self.mining_beneficiary = genesis.mining_beneficiary;
        }
        if genesis.validator_selection_mode.is_some() {
            self.validator_selection_mode = genesis.validator_selection_mode;
        }
        if !genesis.validators.is_empty() {
            self.validators = genesis.validators.clone();
        }
        if let Some(seconds) = genesis.max_request_timeout_seconds {
            self.max_request_timeout_seconds = seconds;
        }

        debug!(?policy, epoch = self.epoch, "Applied qbft genesis config");
        Ok(())
    }

    /// Overlay a legacy `istanbul` genesis section.
    pub fn apply_istanbul(&mut self, genesis: &IstanbulConfig) -> ConfigResult<()> {
        let policy = ProposerPolicyId::try_from(genesis.proposer_policy)?;
        self.set_policy(policy);

        if genesis.epoch != 0 {
            self.epoch = genesis.epoch;
        }
        if genesis.ceil2nby3_block.is_some() {
            self.ceil2nby3_block = genesis.ceil2nby3_block;
        }

        debug!(?policy, epoch = self.epoch, "Applied istanbul genesis config");
        Ok(())
    }

    // Keep the handle (and its registry) when the strategy is unchanged.
    fn set_policy(&mut self, id: ProposerPolicyId) {
        if self.proposer_policy.id() != id {
            self.proposer_policy = ProposerPolicy::with_sort_by(id, self.proposer_policy.sort_by());
        }
    }
}
