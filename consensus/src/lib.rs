// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! QBFT Consensus Parameter Layer
//!
//! Everything the round engine needs to know about *who* votes and *how many*
//! votes are enough, at any block height:
//! - Validator sets with policy-driven ordering
//! - Round-robin and sticky proposer selection
//! - Block-height transitions and the `2F + 1` / `ceil(2N / 3)` quorum switch
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Config                               │
//! │   base parameters + [Transition] ──► get_config(h)           │
//! │                                      quorum_model(h)         │
//! │                                      get_validators_at(h)    │
//! └───────────────────────────────┬──────────────────────────────┘
//!                                 │ proposer_policy
//!                       ┌─────────▼─────────┐
//!                       │  ProposerPolicy   │──── weak registry of
//!                       │  (id, sort order) │     SharedValidatorSet
//!                       └─────────┬─────────┘
//!                                 │
//!                       ┌─────────▼─────────┐
//!                       │   ValidatorSet    │──► calc_proposer
//!                       └───────────────────┘    (round-robin / sticky)
//! ```
//!
//! The round state machine, chain and network are outside this crate and
//! plug in through the traits in [`backend`].

pub mod backend;
pub mod config;
pub mod error;
pub mod liveness;
pub mod quorum;
pub mod validator_set;

// Re-export main types
pub use backend::{
    broadcast_preprepare, gossip_targets, Backend, Core, Engine, FinalCommittedEvent,
    MessageEvent, RequestEvent,
};
pub use config::{
    load_transitions_json, validate_transitions, BeneficiaryMode, BlockReward, Config,
    IstanbulConfig, QbftConfig, Transition, ValidatorSelectionMode,
};
pub use error::{ConfigError, ConfigResult, EngineError, EngineResult};
pub use liveness::{round_robin_proposer, sticky_proposer, ProposerPolicy, ProposerPolicyId};
pub use quorum::QuorumModel;
pub use validator_set::{max_faulty, SharedValidatorSet, ValidatorSet};
