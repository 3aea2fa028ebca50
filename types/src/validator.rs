//! Validator identity and member ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::primitives::Address;

/// A consensus participant, identified by its account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Validator {
    address: Address,
}

impl Validator {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.address, f)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.address)
    }
}

impl From<Address> for Validator {
    fn from(address: Address) -> Self {
        Self::new(address)
    }
}

/// How the members of a validator set are ordered before proposer rotation.
///
/// Every node must use the same ordering for a given height, otherwise the
/// round-robin offsets diverge and nodes disagree on the proposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorSortBy {
    /// Compare the checksummed address strings.
    #[default]
    String,
    /// Compare the raw address bytes.
    Bytes,
}

impl ValidatorSortBy {
    pub fn compare(&self, a: &Validator, b: &Validator) -> Ordering {
        match self {
            ValidatorSortBy::String => a.to_string().cmp(&b.to_string()),
            ValidatorSortBy::Bytes => a.address.as_bytes().cmp(b.address.as_bytes()),
        }
    }

    /// Stable sort of `validators` under this ordering.
    pub fn sort(&self, validators: &mut [Validator]) {
        match self {
            // Render each checksum once instead of on every comparison.
            ValidatorSortBy::String => validators.sort_by_cached_key(|v| v.to_string()),
            ValidatorSortBy::Bytes => validators.sort_by(|a, b| self.compare(a, b)),
        }
    }
}
