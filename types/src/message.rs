//! Protocol message envelopes exchanged between validators.

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec;
use crate::error::WireResult;
use crate::primitives::Hash;
use crate::proposal::{Block, Proposal};
use crate::view::View;

/// Message codes carried next to an encoded envelope.
pub mod code {
    pub const PREPREPARE: u64 = 0x12;
    pub const PREPARE: u64 = 0x13;
    pub const COMMIT: u64 = 0x14;
    pub const ROUND_CHANGE: u64 = 0x15;
}

/// The proposer's candidate for a view. Wire layout: the RLP list
/// `[view, proposal]`.
///
/// Decoding defaults to [`Block`]; other proposal types decode through the
/// type parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprepare<P: Proposal = Block> {
    pub view: View,
    pub proposal: P,
}

impl<P: Proposal> Preprepare<P> {
    pub fn new(view: View, proposal: P) -> Self {
        Self { view, proposal }
    }

    /// The subject a prepare/commit vote for this preprepare carries.
    pub fn subject(&self) -> Subject {
        Subject::new(self.view, self.proposal.hash())
    }

    pub fn encode(&self) -> WireResult<Vec<u8>> {
        Ok(codec::encode(self))
    }

    pub fn decode(bytes: &[u8]) -> WireResult<Self> {
        codec::decode("preprepare", bytes)
    }
}

impl<P: Proposal> Encodable for Preprepare<P> {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.view);
        s.append(&self.proposal);
    }
}

impl<P: Proposal> Decodable for Preprepare<P> {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        codec::list_len(rlp, 2, 2)?;
        Ok(Self {
            view: rlp.val_at(0)?,
            proposal: rlp.val_at(1)?,
        })
    }
}

/// A prepare or commit vote. Wire layout: the RLP list `[view, digest]`
/// with the digest as a 32-byte string.
///
/// Two validators agree exactly when their subjects are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub view: View,
    pub digest: Hash,
}

impl Subject {
    pub fn new(view: View, digest: Hash) -> Self {
        Self { view, digest }
    }

    pub fn encode(&self) -> WireResult<Vec<u8>> {
        Ok(codec::encode(self))
    }

    pub fn decode(bytes: &[u8]) -> WireResult<Self> {
        codec::decode("subject", bytes)
    }
}

impl Encodable for Subject {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.view);
        s.append(&self.digest);
    }
}

impl Decodable for Subject {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        codec::list_len(rlp, 2, 2)?;
        Ok(Self {
            view: rlp.val_at(0)?,
            digest: rlp.val_at(1)?,
        })
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{View: {}, Digest: {}}}", self.view, self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WireError;
    use crate::primitives::keccak256;
    use crate::proposal::Header;

    fn block(number: u64) -> Block {
        Block::new(
            Header {
                number,
                timestamp: 100 + number,
                ..Default::default()
            },
            // One legacy-style transaction: the RLP list [1, 2, 3].
            vec![vec![0xc3, 0x01, 0x02, 0x03]],
        )
    }

    #[test]
    fn test_preprepare_round_trip() {
        let preprepare = Preprepare::new(View::new(0, 5), block(5));
        let bytes = preprepare.encode().unwrap();
        let decoded: Preprepare = Preprepare::decode(&bytes).unwrap();
        assert_eq!(decoded, preprepare);
        assert_eq!(decoded.encode().unwrap(), bytes);
    }

    #[test]
    fn test_preprepare_layout_is_view_then_block() {
        let view = View::new(3, 9);
        let proposal = block(9);
        let bytes = Preprepare::new(view, proposal.clone()).encode().unwrap();

        let rlp = Rlp::new(&bytes);
        assert_eq!(rlp.item_count().unwrap(), 2);
        assert_eq!(rlp.at(0).unwrap().as_raw(), view.encode().unwrap().as_slice());
        assert_eq!(rlp.at(1).unwrap().as_raw(), proposal.to_bytes().as_slice());
    }

    #[test]
    fn test_subject_layout() {
        let subject = Subject::new(View::new(1, 2), Hash::ZERO);
        let bytes = subject.encode().unwrap();
        let mut expected = vec![0xe4, 0xc2, 0x01, 0x02, 0xa0];
        expected.extend_from_slice(&[0u8; 32]);
        assert_eq!(bytes, expected);

        let subject = Subject::new(View::new(1, 2), keccak256(b"block"));
        let bytes = subject.encode().unwrap();
        assert_eq!(&bytes[5..], subject.digest.as_bytes());
        assert_eq!(Subject::decode(&bytes).unwrap(), subject);
    }

    #[test]
    fn test_subject_rejects_short_digest() {
        // [[1, 2], 31 zero bytes]
        let mut bytes = vec![0xe3, 0xc2, 0x01, 0x02, 0x9f];
        bytes.extend_from_slice(&[0u8; 31]);
        assert!(matches!(
            Subject::decode(&bytes),
            Err(WireError::Decode { kind: "subject", .. })
        ));
    }

    #[test]
    fn test_subject_from_preprepare() {
        let preprepare = Preprepare::new(View::new(0, 4), block(4));
        let subject = preprepare.subject();
        assert_eq!(subject.view, preprepare.view);
        assert_eq!(subject.digest, preprepare.proposal.hash());
    }

    #[test]
    fn test_decode_errors_are_typed() {
        let subject = Subject::new(View::new(1, 1), keccak256(b"x"));
        let bytes = subject.encode().unwrap();
        let err = Subject::decode(&bytes[..20]).unwrap_err();
        assert!(matches!(err, WireError::Decode { kind: "subject", .. }));

        let err = Preprepare::<Block>::decode(&[0xff; 3]).unwrap_err();
        assert!(matches!(err, WireError::Decode { kind: "preprepare", .. }));

        // A preprepare whose proposal is a bare string instead of a block.
        let err = Preprepare::<Block>::decode(&[0xc4, 0xc2, 0x80, 0x01, 0x07]).unwrap_err();
        assert!(matches!(err, WireError::Decode { kind: "preprepare", .. }));
    }

    #[test]
    fn test_subject_display() {
        let subject = Subject::new(View::new(0, 1), Hash::ZERO);
        assert_eq!(
            subject.to_string(),
            format!("{{View: {{Round: 0, Sequence: 1}}, Digest: 0x{}}}", "00".repeat(32))
        );
    }
}
