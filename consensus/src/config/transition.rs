// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! Block-height keyed parameter overrides.
//!
//! JSON field names match existing chain configurations and are part of the
//! compatibility surface.

use qbft_types::{Address, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::Config;
use crate::error::ConfigError;

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Where the validator list for a block comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorSelectionMode {
    /// Votes and validators carried in the previous block header.
    #[default]
    BlockHeader,
    /// An on-chain validator contract.
    Contract,
}

/// Who receives the block reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeneficiaryMode {
    /// An explicit beneficiary list.
    List,
    /// A single fixed address (`mining_beneficiary`).
    Besu,
    /// The validators themselves.
    Validators,
}

/// Block reward amount, a 256-bit integer. Reads decimal or `0x` hex
/// strings and plain numbers; writes `0x` hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockReward(pub U256);

impl From<u64> for BlockReward {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl fmt::Display for BlockReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl std::str::FromStr for BlockReward {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ConfigError::InvalidBlockReward(s.to_string());
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some("") => return Err(invalid()),
            Some(hex) => U256::from_str_radix(hex, 16).map_err(|_| invalid())?,
            None if s.is_empty() => return Err(invalid()),
            None => U256::from_dec_str(s).map_err(|_| invalid())?,
        };
        Ok(BlockReward(parsed))
    }
}

impl Serialize for BlockReward {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BlockReward {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(BlockReward::from(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Sparse override of consensus parameters, effective from `block` onwards.
///
/// A zero, empty or absent field means "inherit", never "reset".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transition {
    pub block: u64,

    #[serde(rename = "epochlength", default, skip_serializing_if = "is_zero")]
    pub epoch_length: u64,

    #[serde(rename = "blockperiodseconds", default, skip_serializing_if = "is_zero")]
    pub block_period_seconds: u64,

    #[serde(rename = "emptyblockperiodseconds", default, skip_serializing_if = "Option::is_none")]
    pub empty_block_period_seconds: Option<u64>,

    #[serde(rename = "requesttimeoutseconds", default, skip_serializing_if = "is_zero")]
    pub request_timeout_seconds: u64,

    /// Carried for chain-config round trips; not a consensus parameter.
    #[serde(rename = "contractsizelimit", default, skip_serializing_if = "is_zero")]
    pub contract_size_limit: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Address>,

    #[serde(rename = "validatorselectionmode", default, skip_serializing_if = "Option::is_none")]
    pub validator_selection_mode: Option<ValidatorSelectionMode>,

    // Chain feature switches. Carried for chain-config round trips; the
    // consensus layer does not read them.
    #[serde(rename = "enhancedPermissioningEnabled", default, skip_serializing_if = "Option::is_none")]
    pub enhanced_permissioning_enabled: Option<bool>,

    #[serde(rename = "privacyEnhancementsEnabled", default, skip_serializing_if = "Option::is_none")]
    pub privacy_enhancements_enabled: Option<bool>,

    #[serde(rename = "privacyPrecompileEnabled", default, skip_serializing_if = "Option::is_none")]
    pub privacy_precompile_enabled: Option<bool>,

    #[serde(rename = "gasPriceEnabled", default, skip_serializing_if = "Option::is_none")]
    pub gas_price_enabled: Option<bool>,

    #[serde(rename = "miner.gaslimit", default, skip_serializing_if = "is_zero")]
    pub miner_gas_limit: u64,

    /// Force the `2F + 1` quorum regardless of `ceil2nby3_block`.
    #[serde(rename = "2FPlus1Enabled", default, skip_serializing_if = "Option::is_none")]
    pub two_f_plus_one_enabled: Option<bool>,

    /// Carried for chain-config round trips; not a consensus parameter.
    #[serde(rename = "transactionSizeLimit", default, skip_serializing_if = "is_zero")]
    pub transaction_size_limit: u64,

    #[serde(rename = "blockReward", default, skip_serializing_if = "Option::is_none")]
    pub block_reward: Option<BlockReward>,

    #[serde(rename = "beneficiaryMode", default, skip_serializing_if = "Option::is_none")]
    pub beneficiary_mode: Option<BeneficiaryMode>,

    #[serde(rename = "miningBeneficiary", default, skip_serializing_if = "Option::is_none")]
    pub mining_beneficiary: Option<Address>,

    #[serde(rename = "maxRequestTimeoutSeconds", default, skip_serializing_if = "Option::is_none")]
    pub max_request_timeout_seconds: Option<u64>,
}

impl Transition {
    /// An empty override at `block`.
    pub fn at(block: u64) -> Self {
        Self {
            block,
            ..Default::default()
        }
    }

    /// Overwrite the fields of `config` this transition sets.
    ///
    /// The request timeout is given in seconds here and stored in
    /// milliseconds on `Config`.
    pub fn apply(&self, config: &mut Config) {
        if self.request_timeout_seconds != 0 {
            config.request_timeout = self.request_timeout_seconds.saturating_mul(1000);
        }
        if self.epoch_length != 0 {
            config.epoch = self.epoch_length;
        }
        if self.block_period_seconds != 0 {
            config.block_period = self.block_period_seconds;
        }
        if let Some(seconds) = self.empty_block_period_seconds {
            config.empty_block_period = seconds;
        }
        if let Some(mode) = self.beneficiary_mode {
            config.beneficiary_mode = Some(mode);
        }
        if let Some(reward) = self.block_reward {
            config.block_reward = Some(reward);
        }
        if let Some(beneficiary) = self.mining_beneficiary {
            config.mining_beneficiary = Some(beneficiary);
        }
        if let Some(mode) = self.validator_selection_mode {
            config.validator_selection_mode = Some(mode);
        }
        if !self.validators.is_empty() {
            config.validators = self.validators.clone();
        }
        if let Some(seconds) = self.max_request_timeout_seconds {
            config.max_request_timeout_seconds = seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbft_types::test_utils::address;

    #[test]
    fn test_json_field_names() {
        let json = r#"{
            "block": 100,
            "epochlength": 500,
            "blockperiodseconds": 2,
            "emptyblockperiodseconds": 0,
            "requesttimeoutseconds": 5,
            "validatorselectionmode": "contract",
            "2FPlus1Enabled": true,
            "blockReward": "0x10",
            "beneficiaryMode": "besu",
            "miningBeneficiary": "0x0000000000000000000000000000000000000009",
            "maxRequestTimeoutSeconds": 60,
            "validators": []
        }"#;
        let t: Transition = serde_json::from_str(json).unwrap();
        assert_eq!(t.block, 100);
        assert_eq!(t.epoch_length, 500);
        assert_eq!(t.block_period_seconds, 2);
        assert_eq!(t.empty_block_period_seconds, Some(0));
        assert_eq!(t.request_timeout_seconds, 5);
        assert_eq!(t.validator_selection_mode, Some(ValidatorSelectionMode::Contract));
        assert_eq!(t.two_f_plus_one_enabled, Some(true));
        assert_eq!(t.block_reward, Some(BlockReward::from(16)));
        assert_eq!(t.beneficiary_mode, Some(BeneficiaryMode::Besu));
        assert_eq!(t.mining_beneficiary, Some(address(9)));
        assert_eq!(t.max_request_timeout_seconds, Some(60));

        let back: Transition = serde_json::from_str(&serde_json::to_string(&t).unwrap()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_chain_feature_switches_round_trip() {
        let json = serde_json::json!({
            "block": 300,
            "enhancedPermissioningEnabled": true,
            "privacyEnhancementsEnabled": false,
            "privacyPrecompileEnabled": true,
            "gasPriceEnabled": true,
            "miner.gaslimit": 700_000_000u64,
            "contractsizelimit": 64,
            "transactionSizeLimit": 128
        });
        let t: Transition = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(t.enhanced_permissioning_enabled, Some(true));
        assert_eq!(t.privacy_enhancements_enabled, Some(false));
        assert_eq!(t.privacy_precompile_enabled, Some(true));
        assert_eq!(t.gas_price_enabled, Some(true));
        assert_eq!(t.miner_gas_limit, 700_000_000);
        assert_eq!(serde_json::to_value(&t).unwrap(), json);

        // None of them touch consensus parameters.
        let mut config = Config::default();
        t.apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_sparse_transition_skips_unset_fields() {
        let json = serde_json::to_value(Transition::at(7)).unwrap();
        assert_eq!(json, serde_json::json!({ "block": 7 }));
    }

    #[test]
    fn test_block_reward_formats() {
        let parse = |s: &str| serde_json::from_str::<BlockReward>(s).unwrap();
        assert_eq!(parse("\"1000\""), BlockReward::from(1000));
        assert_eq!(parse("\"0x3e8\""), BlockReward::from(1000));
        assert_eq!(parse("1000"), BlockReward::from(1000));
        assert!(serde_json::from_str::<BlockReward>("\"0xzz\"").is_err());
        assert!(serde_json::from_str::<BlockReward>("\"0x\"").is_err());
        assert!(serde_json::from_str::<BlockReward>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&BlockReward::from(255)).unwrap(), "\"0xff\"");
        assert_eq!(BlockReward::default().to_string(), "0x0");
    }

    #[test]
    fn test_block_reward_beyond_128_bits() {
        let just_over = U256::from(u128::MAX) + U256::one();
        let reward: BlockReward = "0x100000000000000000000000000000000".parse().unwrap();
        assert_eq!(reward, BlockReward(just_over));
        assert_eq!(
            "340282366920938463463374607431768211456".parse::<BlockReward>().unwrap(),
            reward
        );

        let max: BlockReward =
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
                .parse()
                .unwrap();
        assert_eq!(max, BlockReward(U256::MAX));
        assert_eq!(max.to_string(), format!("0x{}", "f".repeat(64)));
        let back: BlockReward = serde_json::from_str(&serde_json::to_string(&max).unwrap()).unwrap();
        assert_eq!(back, max);

        // One past 2^256 - 1 does not fit.
        assert!(matches!(
            "115792089237316195423570985008687907853269984665640564039457584007913129639936"
                .parse::<BlockReward>(),
            Err(ConfigError::InvalidBlockReward(_))
        ));
    }

    #[test]
    fn test_apply_only_set_fields() {
        let mut config = Config::default();
        let before = config.clone();
        Transition::at(10).apply(&mut config);
        assert_eq!(config, before);

        let t = Transition {
            request_timeout_seconds: 3,
            empty_block_period_seconds: Some(0),
            validators: vec![address(1)],
            ..Transition::at(10)
        };
        t.apply(&mut config);
        assert_eq!(config.request_timeout, 3000);
        assert_eq!(config.empty_block_period, 0);
        assert_eq!(config.validators, vec![address(1)]);
        assert_eq!(config.epoch, before.epoch);
        assert_eq!(config.block_period, before.block_period);
    }
}
