// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! Liveness Module
//!
//! Leader selection for QBFT: who may propose at a given (height, round).
//!
//! ## Components
//!
//! - **ProposerPolicy**: strategy id, member ordering and validator set registry
//! - **Proposer selection**: round-robin and sticky rotation over a sorted set
//!
//! ## Usage
//!
//! ```ignore
//! use qbft_consensus::liveness::ProposerPolicy;
//!
//! let policy = ProposerPolicy::round_robin();
//! let set = policy.new_validator_set(addresses);
//!
//! // Proposer for round 0 after `last` sealed the previous block
//! set.write().calc_proposer(last, 0);
//! let proposer = set.read().get_proposer();
//! ```

mod proposer_policy;
mod proposer_selection;

pub use proposer_policy::{ProposerPolicy, ProposerPolicyId};
pub use proposer_selection::{round_robin_proposer, sticky_proposer};
