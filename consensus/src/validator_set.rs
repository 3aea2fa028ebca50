// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! Validator Set Management
//!
//! The ordered membership of one block height together with the proposer
//! chosen for the current round. Ordering and proposer selection come from the
//! attached [`ProposerPolicy`].
//!
//! A `ValidatorSet` is not internally synchronised. Sets that are shared
//! between threads, including every set a policy registry tracks, live behind
//! a [`SharedValidatorSet`]; others are owned by one thread and handed out as
//! [`ValidatorSet::copy`] snapshots.

use parking_lot::RwLock;
use qbft_types::{Address, Round, Validator, ValidatorSortBy};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::liveness::ProposerPolicy;

/// A validator set reachable from several threads. Policy registries hold
/// only weak references to it.
pub type SharedValidatorSet = Arc<RwLock<ValidatorSet>>;

/// Members of one block height and the cached proposer.
#[derive(Debug, Clone)]
pub struct ValidatorSet {
    /// Members, sorted by the policy ordering. Addresses are unique.
    validators: Vec<Validator>,

    /// Proposer selected by the last `calc_proposer` call.
    proposer: Option<Validator>,

    policy: ProposerPolicy,
}

impl ValidatorSet {
    /// Build a set from `addresses`, sorted with the policy's active ordering.
    ///
    /// Duplicate addresses are dropped (first occurrence kept). The proposer
    /// starts as the first sorted member. The set is not registered with the
    /// policy; use [`ProposerPolicy::new_validator_set`] for that.
    pub fn new(addresses: impl IntoIterator<Item = Address>, policy: ProposerPolicy) -> Self {
        let mut seen = HashSet::new();
        let mut validators = Vec::new();
        for address in addresses {
            if seen.insert(address) {
                validators.push(Validator::new(address));
            } else {
                warn!(%address, "Dropping duplicate validator address");
            }
        }

        let mut set = Self {
            validators,
            proposer: None,
            policy,
        };
        set.sort_validators();
        set.proposer = set.validators.first().copied();
        set
    }

    /// Number of members.
    pub fn size(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Members in policy order.
    pub fn list(&self) -> &[Validator] {
        &self.validators
    }

    /// Member addresses in policy order.
    pub fn addresses(&self) -> Vec<Address> {
        self.validators.iter().map(Validator::address).collect()
    }

    /// Member at sorted position `index`, if any.
    pub fn get_by_index(&self, index: u64) -> Option<Validator> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.validators.get(i))
            .copied()
    }

    /// Sorted position and member for `address`.
    ///
    /// `None` is an expected outcome while membership changes, not an error.
    pub fn get_by_address(&self, address: &Address) -> Option<(usize, Validator)> {
        self.validators
            .iter()
            .position(|v| v.address() == *address)
            .map(|i| (i, self.validators[i]))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.get_by_address(address).is_some()
    }

    /// Select and cache the proposer for `round`, given who proposed last.
    ///
    /// Pass [`Address::ZERO`] when there is no previous proposer.
    pub fn calc_proposer(&mut self, last_proposer: Address, round: Round) {
        self.proposer = self.policy.id().select(self, &last_proposer, round);
        debug!(
            %last_proposer,
            round,
            policy = ?self.policy.id(),
            proposer = ?self.proposer,
            "Calculated proposer"
        );
    }

    /// Proposer cached by the last `calc_proposer` call.
    pub fn get_proposer(&self) -> Option<Validator> {
        self.proposer
    }

    /// True when `address` is a member and is the cached proposer.
    pub fn is_proposer(&self, address: &Address) -> bool {
        match (self.get_by_address(address), self.proposer) {
            (Some((_, member)), Some(proposer)) => member == proposer,
            _ => false,
        }
    }

    /// Proposers for rounds `0..rounds` after `last_proposer`, without touching
    /// the cached proposer.
    pub fn proposer_schedule(&self, last_proposer: Address, rounds: u64) -> Vec<Validator> {
        (0..rounds)
            .filter_map(|round| self.policy.id().select(self, &last_proposer, round))
            .collect()
    }

    /// Add `address` and re-sort. Returns false when it is already a member.
    pub fn add_validator(&mut self, address: Address) -> bool {
        if self.contains(&address) {
            return false;
        }
        self.validators.push(Validator::new(address));
        self.sort_validators();
        true
    }

    /// Remove `address`. Returns false when it is not a member.
    pub fn remove_validator(&mut self, address: &Address) -> bool {
        match self.get_by_address(address) {
            Some((index, _)) => {
                self.validators.remove(index);
                true
            }
            None => false,
        }
    }

    /// Independent structural copy sharing only the policy handle.
    ///
    /// The copy is not registered with the policy.
    pub fn copy(&self) -> ValidatorSet {
        self.clone()
    }

    /// Maximum number of faulty members tolerated: `floor((N - 1) / 3)`.
    pub fn f(&self) -> usize {
        max_faulty(self.size())
    }

    pub fn policy(&self) -> &ProposerPolicy {
        &self.policy
    }

    /// Re-apply the policy's active ordering.
    pub fn sort_validators(&mut self) {
        self.sort_with(self.policy.sort_by());
    }

    /// Sort with an explicit ordering. The registry calls this while holding
    /// its lock, so it must not touch the policy's locks.
    pub(crate) fn sort_with(&mut self, sort_by: ValidatorSortBy) {
        sort_by.sort(&mut self.validators);
    }
}

/// Faults tolerated by `n` members: `floor((n - 1) / 3)`, 0 when empty.
pub fn max_faulty(n: usize) -> usize {
    n.saturating_sub(1) / 3
}
