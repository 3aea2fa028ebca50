// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! Boundary contracts
//!
//! The round state machine, the chain and the network live outside this
//! crate. These traits are what they must provide to, or expect from, the
//! validator and quorum layer. Validator sets produced here are the
//! addressing input for [`Backend::broadcast`] and the membership input for
//! [`Engine::verify_seal`].

use qbft_types::{code, Address, Hash, Header, Preprepare, Proposal, Round, U256};
use std::time::Duration;

use crate::error::EngineResult;
use crate::validator_set::ValidatorSet;

/// Round engine lifecycle and proposer facts.
pub trait Core: Send + Sync {
    fn start(&self) -> EngineResult<()>;

    fn stop(&self) -> EngineResult<()>;

    /// Whether the local node proposes in the current round.
    fn is_proposer(&self) -> bool;

    /// Whether `hash` is the block this node is currently proposing.
    fn is_current_proposal(&self, hash: &Hash) -> bool;
}

/// Chain and network services used by the round engine.
pub trait Backend: Send + Sync {
    type Proposal: Proposal;

    /// Local validator address.
    fn address(&self) -> Address;

    /// Validator set that must agree on `proposal`.
    fn validators(&self, proposal: &Self::Proposal) -> ValidatorSet;

    /// Send `payload` to every member of `validators`, self included.
    fn broadcast(&self, validators: &ValidatorSet, code: u64, payload: &[u8]) -> EngineResult<()>;

    /// Send `payload` to every member of `validators` except self.
    fn gossip(&self, validators: &ValidatorSet, code: u64, payload: &[u8]) -> EngineResult<()>;

    /// Write a proposal that gathered a quorum of commit seals.
    fn commit(&self, proposal: &Self::Proposal, seals: &[Vec<u8>], round: Round) -> EngineResult<()>;

    /// Validate a proposal. `Ok` carries how far in the future it is.
    fn verify(&self, proposal: &Self::Proposal) -> EngineResult<Duration>;

    fn sign(&self, data: &[u8]) -> EngineResult<Vec<u8>>;

    fn check_signature(&self, data: &[u8], signer: &Address, signature: &[u8]) -> EngineResult<()>;

    /// Latest committed proposal and its proposer.
    fn last_proposal(&self) -> Option<(Self::Proposal, Address)>;

    fn has_proposal(&self, hash: &Hash, number: u64) -> bool;

    /// Proposer of the committed block at `number`, zero when unknown.
    fn get_proposer(&self, number: u64) -> Address;

    /// Validator set of the parent of `proposal`.
    fn parent_validators(&self, proposal: &Self::Proposal) -> ValidatorSet;

    fn has_bad_proposal(&self, hash: &Hash) -> bool;

    fn close(&self) -> EngineResult<()>;
}

/// Header verification and assembly for the chain.
pub trait Engine: Send + Sync {
    fn address(&self) -> Address;

    /// Recover the block author from the header seal.
    fn author(&self, header: &Header) -> EngineResult<Address>;

    fn extract_genesis_validators(&self, header: &Header) -> EngineResult<Vec<Address>>;

    /// Addresses whose commit seals are in `header`.
    fn signers(&self, header: &Header) -> EngineResult<Vec<Address>>;

    fn commit_header(&self, header: &mut Header, seals: &[Vec<u8>], round: Round) -> EngineResult<()>;

    fn verify_header(
        &self,
        header: &Header,
        parents: &[Header],
        validators: &ValidatorSet,
    ) -> EngineResult<()>;

    /// Check the proposer seal against `validators`.
    fn verify_seal(&self, header: &Header, validators: &ValidatorSet) -> EngineResult<()>;

    fn prepare(&self, header: &mut Header, validators: &[Address]) -> EngineResult<()>;

    fn seal_hash(&self, header: &Header) -> Hash;

    fn calc_difficulty(&self, parent: &Header) -> U256;

    /// Record a vote to add (`authorize`) or drop `candidate`.
    fn write_vote(&self, header: &mut Header, candidate: Address, authorize: bool) -> EngineResult<()>;

    fn read_vote(&self, header: &Header) -> EngineResult<(Address, bool)>;
}

/// A proposal handed to the round engine for agreement.
#[derive(Debug, Clone)]
pub struct RequestEvent<P: Proposal> {
    pub proposal: P,
}

/// An encoded consensus message received from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub code: u64,
    pub payload: Vec<u8>,
}

/// A block was committed to the chain; the round engine moves to the next
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinalCommittedEvent;

/// Members of `validators` other than `local`, in set order.
pub fn gossip_targets(validators: &ValidatorSet, local: &Address) -> Vec<Address> {
    validators
        .list()
        .iter()
        .map(|v| v.address())
        .filter(|address| address != local)
        .collect()
}

/// Encode `preprepare` and broadcast it to `validators`.
pub fn broadcast_preprepare<B: Backend>(
    backend: &B,
    validators: &ValidatorSet,
    preprepare: &Preprepare<B::Proposal>,
) -> EngineResult<()> {
    let payload = preprepare.encode()?;
    backend.broadcast(validators, code::PREPREPARE, &payload)
}
