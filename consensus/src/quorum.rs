// Copyright (c) Hetu Project
// SPDX-License-Identifier: Apache-2.0

//! Quorum models.
//!
//! `2F + 1` is exact only when `N = 3F + 1`. For other sizes it can be
//! smaller than two thirds of the set (N = 5 gives 3 of 5), so chains move to
//! `ceil(2N / 3)` from a configured block onwards.

use serde::{Deserialize, Serialize};

use crate::validator_set::max_faulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuorumModel {
    /// `2 * floor((N - 1) / 3) + 1`
    TwoFPlusOne,
    /// `ceil(2 * N / 3)`
    Ceil2NBy3,
}

impl QuorumModel {
    /// Votes needed among `n` validators.
    pub fn size(&self, n: usize) -> usize {
        match self {
            QuorumModel::TwoFPlusOne => 2 * max_faulty(n) + 1,
            QuorumModel::Ceil2NBy3 => (2 * n + 2) / 3,
        }
    }

    pub fn has_quorum(&self, n: usize, votes: usize) -> bool {
        votes >= self.size(n)
    }
}
