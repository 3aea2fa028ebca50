//! Deterministic fixtures shared by unit and integration tests.

use crate::primitives::{Address, ADDRESS_LENGTH};

/// Address whose last eight bytes hold `n` big-endian.
pub fn address(n: u64) -> Address {
    let mut bytes = [0u8; ADDRESS_LENGTH];
    bytes[ADDRESS_LENGTH - 8..].copy_from_slice(&n.to_be_bytes());
    Address::new(bytes)
}

/// `count` distinct addresses, `address(1)..=address(count)`.
pub fn addresses(count: u64) -> Vec<Address> {
    (1..=count).map(address).collect()
}
