// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! Proposer Policy
//!
//! A policy pairs a selection strategy ([`ProposerPolicyId`]) with the member
//! ordering ([`ValidatorSortBy`]) the strategy rotates over, and tracks every
//! validator set built under it so the ordering can be swapped at runtime.
//!
//! ## Registry
//!
//! The registry is owned by the policy handle; clones of a [`ProposerPolicy`]
//! share it. Registration and [`ProposerPolicy::use_sort_by`] take the same
//! lock, and lock order is always registry before set:
//!
//! - a set registered before a swap is re-sorted by the swap's pass;
//! - a set registered after a swap is sorted on registration with the new
//!   ordering.
//!
//! No registered set is ever observed half-sorted. A set may be sorted twice,
//! which is harmless because sorting is idempotent.
//!
//! Every set holds a policy handle, so the registry only keeps weak
//! references. A set is freed as soon as its last owner drops it, and its
//! dead entry is pruned on the next registration, swap or count.

use parking_lot::{Mutex, RwLock};
use qbft_types::{Address, Round, Validator, ValidatorSortBy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

use super::proposer_selection::{round_robin_proposer, sticky_proposer};
use crate::error::{ConfigError, ConfigResult};
use crate::validator_set::{SharedValidatorSet, ValidatorSet};

/// Leader selection strategy. Persisted as its numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum ProposerPolicyId {
    /// Move to the next member every round.
    #[default]
    RoundRobin,
    /// Keep the previous proposer until a round change.
    Sticky,
}

impl ProposerPolicyId {
    /// Run this strategy over `set`.
    pub fn select(
        &self,
        set: &ValidatorSet,
        last_proposer: &Address,
        round: Round,
    ) -> Option<Validator> {
        match self {
            ProposerPolicyId::RoundRobin => round_robin_proposer(set, last_proposer, round),
            ProposerPolicyId::Sticky => sticky_proposer(set, last_proposer, round),
        }
    }
}

impl TryFrom<u64> for ProposerPolicyId {
    type Error = ConfigError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(ProposerPolicyId::RoundRobin),
            1 => Ok(ProposerPolicyId::Sticky),
            other => Err(ConfigError::UnknownPolicy(other)),
        }
    }
}

impl From<ProposerPolicyId> for u64 {
    fn from(id: ProposerPolicyId) -> Self {
        match id {
            ProposerPolicyId::RoundRobin => 0,
            ProposerPolicyId::Sticky => 1,
        }
    }
}

struct PolicyShared {
    sort_by: RwLock<ValidatorSortBy>,
    registry: Mutex<Vec<Weak<RwLock<ValidatorSet>>>>,
}

/// Proposer selection policy with its validator set registry.
///
/// Cloning yields another handle onto the same ordering and registry.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "PolicyRepr", into = "PersistedPolicy")]
pub struct ProposerPolicy {
    id: ProposerPolicyId,
    shared: Arc<PolicyShared>,
}

impl ProposerPolicy {
    /// A policy ordering members by their checksummed address string.
    pub fn new(id: ProposerPolicyId) -> Self {
        Self::with_sort_by(id, ValidatorSortBy::String)
    }

    pub fn round_robin() -> Self {
        Self::new(ProposerPolicyId::RoundRobin)
    }

    pub fn sticky() -> Self {
        Self::new(ProposerPolicyId::Sticky)
    }

    pub fn with_sort_by(id: ProposerPolicyId, sort_by: ValidatorSortBy) -> Self {
        Self {
            id,
            shared: Arc::new(PolicyShared {
                sort_by: RwLock::new(sort_by),
                registry: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> ProposerPolicyId {
        self.id
    }

    /// The ordering currently applied to member lists.
    pub fn sort_by(&self) -> ValidatorSortBy {
        *self.shared.sort_by.read()
    }

    /// Swap the member ordering and re-sort every registered set.
    ///
    /// The registry lock is held for the whole pass, so concurrent
    /// registrations wait and then sort with `sort_by`.
    pub fn use_sort_by(&self, sort_by: ValidatorSortBy) {
        let mut registry = self.shared.registry.lock();
        *self.shared.sort_by.write() = sort_by;
        registry.retain(|entry| match entry.upgrade() {
            Some(set) => {
                set.write().sort_with(sort_by);
                true
            }
            None => false,
        });
        info!(
            policy = ?self.id,
            ?sort_by,
            registered = registry.len(),
            "Re-sorted registered validator sets"
        );
    }

    /// Track `set` so later ordering swaps re-sort it.
    ///
    /// The set is sorted with the active ordering before it is added. The
    /// caller must not hold a lock on `set` while calling this.
    pub fn register_validator_set(&self, set: &SharedValidatorSet) {
        let mut registry = self.shared.registry.lock();
        set.write().sort_with(self.sort_by());
        registry.retain(|entry| entry.strong_count() > 0);
        registry.push(Arc::downgrade(set));
        debug!(registered = registry.len(), "Registered validator set");
    }

    /// Build a validator set under this policy and register it.
    pub fn new_validator_set(&self, addresses: impl IntoIterator<Item = Address>) -> SharedValidatorSet {
        let set = Arc::new(RwLock::new(ValidatorSet::new(addresses, self.clone())));
        self.register_validator_set(&set);
        set
    }

    /// Drop every tracked set (reset or reorg).
    pub fn clear_registry(&self) {
        let mut registry = self.shared.registry.lock();
        let dropped = registry.len();
        registry.clear();
        debug!(dropped, "Cleared validator set registry");
    }

    /// Number of tracked sets that are still alive.
    pub fn registered_len(&self) -> usize {
        let mut registry = self.shared.registry.lock();
        registry.retain(|entry| entry.strong_count() > 0);
        registry.len()
    }

    /// Whether `other` is a handle onto the same registry.
    pub fn shares_registry_with(&self, other: &ProposerPolicy) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Default for ProposerPolicy {
    fn default() -> Self {
        Self::round_robin()
    }
}

impl PartialEq for ProposerPolicy {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.sort_by() == other.sort_by()
    }
}

impl fmt::Debug for ProposerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProposerPolicy")
            .field("id", &self.id)
            .field("sort_by", &self.sort_by())
            .finish_non_exhaustive()
    }
}

/// On-disk form of a policy: only the strategy id survives a round trip.
/// The ordering comes back as [`ValidatorSortBy::String`]; byte ordering has
/// to be re-applied with [`ProposerPolicy::use_sort_by`] after loading.
///
/// Written as a table (`{ id = 1 }`). Configs written by older nodes hold
/// the same table serialized into a string (`"Id = 1"`), which is accepted
/// on read.
#[derive(Serialize, Deserialize)]
struct PersistedPolicy {
    #[serde(alias = "Id")]
    id: ProposerPolicyId,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyRepr {
    Table(PersistedPolicy),
    Embedded(String),
}

impl TryFrom<PolicyRepr> for ProposerPolicy {
    type Error = ConfigError;

    fn try_from(repr: PolicyRepr) -> ConfigResult<Self> {
        let persisted = match repr {
            PolicyRepr::Table(persisted) => persisted,
            PolicyRepr::Embedded(document) => toml::from_str(&document)?,
        };
        Ok(ProposerPolicy::new(persisted.id))
    }
}

impl From<ProposerPolicy> for PersistedPolicy {
    fn from(policy: ProposerPolicy) -> Self {
        PersistedPolicy { id: policy.id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbft_types::test_utils::address;
    use std::thread;

    // 0xF0.. renders with an uppercase 'F' and 0xa0.. stays lowercase, so
    // string order is [f, a] while byte order is [a, f].
    fn divergent_pair() -> (Address, Address) {
        let f: Address = "0xf000000000000000000000000000000000000001".parse().unwrap();
        let a: Address = "0xa000000000000000000000000000000000000002".parse().unwrap();
        (f, a)
    }

    #[test]
    fn test_policy_id_conversions() {
        assert_eq!(ProposerPolicyId::try_from(0).unwrap(), ProposerPolicyId::RoundRobin);
        assert_eq!(ProposerPolicyId::try_from(1).unwrap(), ProposerPolicyId::Sticky);
        assert!(matches!(
            ProposerPolicyId::try_from(7),
            Err(ConfigError::UnknownPolicy(7))
        ));
        assert_eq!(u64::from(ProposerPolicyId::Sticky), 1);
    }

    #[test]
    fn test_register_and_clear() {
        let policy = ProposerPolicy::round_robin();
        let _a = policy.new_validator_set([address(1), address(2)]);
        let _b = policy.new_validator_set([address(3)]);
        assert_eq!(policy.registered_len(), 2);

        let clone = policy.clone();
        assert!(clone.shares_registry_with(&policy));
        clone.clear_registry();
        assert_eq!(policy.registered_len(), 0);
    }

    #[test]
    fn test_registry_does_not_keep_sets_alive() {
        let policy = ProposerPolicy::round_robin();
        let kept = policy.new_validator_set([address(1)]);
        let dropped = policy.new_validator_set([address(2), address(3)]);
        let watch = Arc::downgrade(&dropped);
        assert_eq!(policy.registered_len(), 2);

        drop(dropped);
        assert!(watch.upgrade().is_none());
        assert_eq!(policy.registered_len(), 1);

        // A swap after the drop only touches the live set.
        policy.use_sort_by(ValidatorSortBy::Bytes);
        assert_eq!(kept.read().addresses(), vec![address(1)]);
        assert_eq!(policy.registered_len(), 1);

        let watch = Arc::downgrade(&kept);
        drop(kept);
        assert!(watch.upgrade().is_none());
        assert_eq!(policy.registered_len(), 0);
    }

    #[test]
    fn test_no_cycle_between_policy_and_sets() {
        let watch = {
            let policy = ProposerPolicy::sticky();
            let set = policy.new_validator_set([address(1), address(2)]);
            Arc::downgrade(&set)
        };
        assert!(watch.upgrade().is_none());
    }

    #[test]
    fn test_use_sort_by_resorts_registered_sets() {
        let (f, a) = divergent_pair();
        let policy = ProposerPolicy::round_robin();
        let set = policy.new_validator_set([a, f]);
        assert_eq!(set.read().addresses(), vec![f, a]);

        policy.use_sort_by(ValidatorSortBy::Bytes);
        assert_eq!(policy.sort_by(), ValidatorSortBy::Bytes);
        assert_eq!(set.read().addresses(), vec![a, f]);

        policy.use_sort_by(ValidatorSortBy::String);
        assert_eq!(set.read().addresses(), vec![f, a]);
    }

    #[test]
    fn test_registration_after_swap_uses_new_order() {
        let (f, a) = divergent_pair();
        let policy = ProposerPolicy::round_robin();
        // Built under String order but registered only after the swap.
        let set = Arc::new(RwLock::new(ValidatorSet::new([f, a], policy.clone())));
        policy.use_sort_by(ValidatorSortBy::Bytes);
        assert_eq!(set.read().addresses(), vec![f, a]);

        policy.register_validator_set(&set);
        assert_eq!(set.read().addresses(), vec![a, f]);
    }

    #[test]
    fn test_concurrent_registration_and_swap() {
        let (f, a) = divergent_pair();
        let policy = ProposerPolicy::round_robin();

        let registrars: Vec<_> = (0..8)
            .map(|_| {
                let policy = policy.clone();
                thread::spawn(move || {
                    (0..25)
                        .map(|_| policy.new_validator_set([a, f]))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let swapper = {
            let policy = policy.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let sort_by = if i % 2 == 0 {
                        ValidatorSortBy::Bytes
                    } else {
                        ValidatorSortBy::String
                    };
                    policy.use_sort_by(sort_by);
                }
            })
        };

        swapper.join().unwrap();
        let sets: Vec<SharedValidatorSet> = registrars
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(policy.registered_len(), 200);
        // Last swap was to String order; every set must agree with it.
        assert_eq!(policy.sort_by(), ValidatorSortBy::String);
        for set in &sets {
            assert_eq!(set.read().addresses(), vec![f, a]);
        }
    }

    #[test]
    fn test_persisted_form_drops_sort_order() {
        let policy = ProposerPolicy::with_sort_by(ProposerPolicyId::Sticky, ValidatorSortBy::Bytes);
        let _set = policy.new_validator_set([address(1)]);

        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, r#"{"id":1}"#);

        let restored: ProposerPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id(), ProposerPolicyId::Sticky);
        assert_eq!(restored.sort_by(), ValidatorSortBy::String);
        assert_eq!(restored.registered_len(), 0);

        let toml = toml::to_string(&policy).unwrap();
        let restored: ProposerPolicy = toml::from_str(&toml).unwrap();
        assert_eq!(restored.id(), ProposerPolicyId::Sticky);
        assert!(serde_json::from_str::<ProposerPolicy>(r#"{"id":5}"#).is_err());
    }

    #[test]
    fn test_reads_policy_embedded_in_string() {
        #[derive(Deserialize)]
        struct Holder {
            proposer_policy: ProposerPolicy,
        }

        let holder: Holder = toml::from_str("proposer_policy = \"Id = 1\\n\"\n").unwrap();
        assert_eq!(holder.proposer_policy.id(), ProposerPolicyId::Sticky);
        assert_eq!(holder.proposer_policy.sort_by(), ValidatorSortBy::String);

        let holder: Holder = toml::from_str("proposer_policy = \"Id = 0\"\n").unwrap();
        assert_eq!(holder.proposer_policy.id(), ProposerPolicyId::RoundRobin);

        let holder: Holder = toml::from_str("[proposer_policy]\nId = 1\n").unwrap();
        assert_eq!(holder.proposer_policy.id(), ProposerPolicyId::Sticky);

        let policy: ProposerPolicy = serde_json::from_str(r#""id = 1""#).unwrap();
        assert_eq!(policy.id(), ProposerPolicyId::Sticky);

        assert!(toml::from_str::<Holder>("proposer_policy = \"Id = 9\"\n").is_err());
        assert!(toml::from_str::<Holder>("proposer_policy = \"not toml\"\n").is_err());

        // Written back in table form.
        let toml = toml::to_string(&ProposerPolicy::sticky()).unwrap();
        assert_eq!(toml.trim(), "id = 1");
    }
}
