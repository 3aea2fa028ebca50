// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! Proposer Selection
//!
//! Deterministic leader choice for a (last proposer, round) pair over a
//! sorted validator set. Every honest node runs the same arithmetic on the
//! same ordering, so all of them agree on the proposer without talking.
//!
//! ```text
//! offset      = sorted index of last_proposer (0 when not a member)
//! round-robin = (offset + round + 1) % N
//! sticky      = (offset + round)     % N
//! ```
//!
//! With no previous proposer (the zero address, i.e. genesis) both strategies
//! pick `round % N`.

use qbft_types::{Address, Round, Validator};

use crate::validator_set::ValidatorSet;

/// Offset into the sorted member list that rotation starts from.
fn calc_seed(set: &ValidatorSet, last_proposer: &Address, round: Round) -> u64 {
    let offset = set
        .get_by_address(last_proposer)
        .map(|(index, _)| index as u64)
        .unwrap_or(0);
    offset.wrapping_add(round)
}

fn pick(set: &ValidatorSet, seed: u64) -> Option<Validator> {
    let size = set.size() as u64;
    if size == 0 {
        return None;
    }
    set.get_by_index(seed % size)
}

/// Rotate to the next member every round.
///
/// Over `N` consecutive rounds every member proposes exactly once.
pub fn round_robin_proposer(
    set: &ValidatorSet,
    last_proposer: &Address,
    round: Round,
) -> Option<Validator> {
    let seed = if last_proposer.is_zero() {
        round
    } else {
        calc_seed(set, last_proposer, round).wrapping_add(1)
    };
    pick(set, seed)
}

/// Keep the last proposer at round 0 and only move on round changes.
pub fn sticky_proposer(
    set: &ValidatorSet,
    last_proposer: &Address,
    round: Round,
) -> Option<Validator> {
    let seed = if last_proposer.is_zero() {
        round
    } else {
        calc_seed(set, last_proposer, round)
    };
    pick(set, seed)
}
