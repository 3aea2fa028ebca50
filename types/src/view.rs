//! Consensus view: the (round, sequence) pair a message belongs to.

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::codec;
use crate::error::WireResult;

/// A round number within one sequence (block height).
pub type Round = u64;

/// A block height being agreed upon.
pub type Sequence = u64;

/// Identifies one attempt to agree on one block.
///
/// Each sequence starts at round 0. When validators fail to agree on the
/// proposal a round change moves everyone to `round + 1` for the same
/// sequence.
///
/// Views are ordered by sequence first and round second. On the wire a view
/// is the RLP list `[round, sequence]`, which is the field order below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct View {
    pub round: Round,
    pub sequence: Sequence,
}

impl View {
    pub fn new(round: Round, sequence: Sequence) -> Self {
        Self { round, sequence }
    }

    /// Three-way comparison: -1 if `self < other`, 0 if equal, +1 if greater.
    pub fn cmp_view(&self, other: &View) -> i32 {
        match self.cmp(other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    /// True when a message for `self` is older than `current` and can be dropped.
    pub fn is_stale(&self, current: &View) -> bool {
        self < current
    }

    pub fn encode(&self) -> WireResult<Vec<u8>> {
        Ok(codec::encode(self))
    }

    pub fn decode(bytes: &[u8]) -> WireResult<Self> {
        codec::decode("view", bytes)
    }
}

impl Encodable for View {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.round);
        s.append(&self.sequence);
    }
}

impl Decodable for View {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        codec::list_len(rlp, 2, 2)?;
        Ok(Self {
            round: rlp.val_at(0)?,
            sequence: rlp.val_at(1)?,
        })
    }
}

impl Ord for View {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence
            .cmp(&other.sequence)
            .then(self.round.cmp(&other.round))
    }
}

impl PartialOrd for View {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Round: {}, Sequence: {}}}", self.round, self.sequence)
    }
}
