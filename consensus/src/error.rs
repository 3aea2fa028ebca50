// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! Error types for configuration loading and engine boundary contracts.
//!
//! Resolution itself never fails; these errors only arise while loading or
//! validating configuration, or from implementations of the boundary traits.

use qbft_types::WireError;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to write TOML config: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid block reward: {0:?}")]
    InvalidBlockReward(String),

    #[error("unknown proposer policy id: {0}")]
    UnknownPolicy(u64),

    #[error("transition {index} at block {block} is below the previous transition at block {previous}")]
    UnorderedTransitions { index: usize, block: u64, previous: u64 },
}

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unauthorized proposer: {0}")]
    Unauthorized(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid extra-data: {0}")]
    InvalidExtraData(String),

    #[error("future block: {0}")]
    FutureBlock(String),

    #[error("unknown ancestor")]
    UnknownAncestor,

    #[error("engine stopped")]
    Stopped,

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("Other error: {0}")]
    Other(String),
}
