//! # qbft-types
//!
//! Shared types for the QBFT validator and parameter layer:
//!
//! - [`Address`] / [`Hash`]: fixed-size primitives (EIP-55 display for addresses)
//! - [`Validator`] and [`ValidatorSortBy`]: member identity and ordering
//! - [`View`], [`Preprepare`], [`Subject`]: protocol envelopes with RLP wire encoding
//! - [`Proposal`] and [`Block`]: the agreed-upon payload (an Ethereum block)

// ========== Core Modules ==========
mod codec;
pub mod error;
pub mod message;
pub mod primitives;
pub mod proposal;
pub mod validator;
pub mod view;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{WireError, WireResult};
pub use message::{code, Preprepare, Subject};
pub use primitives::{keccak256, Address, Hash, ADDRESS_LENGTH, HASH_LENGTH};
pub use proposal::{Block, Bloom, Header, Proposal, BLOOM_LENGTH};
pub use validator::{Validator, ValidatorSortBy};
pub use view::{Round, Sequence, View};

pub use primitive_types::U256;
