//! Proposal capability and the concrete block proposal.

use primitive_types::U256;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use std::fmt;

use crate::codec;
use crate::error::WireResult;
use crate::primitives::{keccak256, Address, Hash};

/// Anything that can be agreed on by the protocol.
///
/// The protocol layer only needs the height, a content digest and a
/// deterministic RLP encoding, so it does not depend on how the chain
/// represents blocks internally.
pub trait Proposal: Encodable + Decodable + Clone + fmt::Debug + Send + Sync {
    /// Sequence number (block height) of this proposal.
    fn number(&self) -> u64;

    /// Content digest the votes refer to.
    fn hash(&self) -> Hash;

    fn to_bytes(&self) -> Vec<u8> {
        codec::encode(self)
    }

    fn from_bytes(bytes: &[u8]) -> WireResult<Self> {
        codec::decode("proposal", bytes)
    }
}

/// Length of a header log bloom in bytes.
pub const BLOOM_LENGTH: usize = 256;

/// 2048-bit log bloom filter.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bloom(pub [u8; BLOOM_LENGTH]);

impl Default for Bloom {
    fn default() -> Self {
        Self([0u8; BLOOM_LENGTH])
    }
}

impl fmt::Debug for Bloom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bloom(0x{})", hex::encode(self.0))
    }
}

/// Ethereum block header. Field order is the RLP order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub parent_hash: Hash,
    pub uncle_hash: Hash,
    /// Beneficiary of the block reward.
    pub coinbase: Address,
    pub root: Hash,
    pub tx_hash: Hash,
    pub receipt_hash: Hash,
    pub bloom: Bloom,
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    /// Consensus extra-data (vanity, validators, vote, round, seals).
    pub extra: Vec<u8>,
    pub mix_digest: Hash,
    pub nonce: [u8; 8],
    /// Present from the London fork on. Encoded only when set.
    pub base_fee: Option<U256>,
}

impl Header {
    /// Keccak-256 of the RLP encoded header.
    pub fn hash(&self) -> Hash {
        keccak256(codec::encode(self))
    }
}

impl Encodable for Header {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(if self.base_fee.is_some() { 16 } else { 15 });
        s.append(&self.parent_hash);
        s.append(&self.uncle_hash);
        s.append(&self.coinbase);
        s.append(&self.root);
        s.append(&self.tx_hash);
        s.append(&self.receipt_hash);
        codec::append_fixed(s, &self.bloom.0);
        s.append(&self.difficulty);
        s.append(&self.number);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.timestamp);
        s.append(&self.extra);
        s.append(&self.mix_digest);
        codec::append_fixed(s, &self.nonce);
        if let Some(base_fee) = &self.base_fee {
            s.append(base_fee);
        }
    }
}

impl Decodable for Header {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let count = codec::list_len(rlp, 15, 16)?;
        Ok(Self {
            parent_hash: rlp.val_at(0)?,
            uncle_hash: rlp.val_at(1)?,
            coinbase: rlp.val_at(2)?,
            root: rlp.val_at(3)?,
            tx_hash: rlp.val_at(4)?,
            receipt_hash: rlp.val_at(5)?,
            bloom: Bloom(codec::decode_fixed(&rlp.at(6)?)?),
            difficulty: rlp.val_at(7)?,
            number: rlp.val_at(8)?,
            gas_limit: rlp.val_at(9)?,
            gas_used: rlp.val_at(10)?,
            timestamp: rlp.val_at(11)?,
            extra: rlp.val_at(12)?,
            mix_digest: rlp.val_at(13)?,
            nonce: codec::decode_fixed(&rlp.at(14)?)?,
            base_fee: if count == 16 { Some(rlp.val_at(15)?) } else { None },
        })
    }
}

/// A full block, the production proposal type. Encoded as the RLP list
/// `[header, transactions, uncles]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub header: Header,
    /// Each entry is one complete RLP item: a list for legacy transactions,
    /// a string for typed envelopes. Entries are copied into the block
    /// encoding as is.
    pub transactions: Vec<Vec<u8>>,
    pub uncles: Vec<Header>,
}

impl Block {
    pub fn new(header: Header, transactions: Vec<Vec<u8>>) -> Self {
        Self {
            header,
            transactions,
            uncles: Vec::new(),
        }
    }
}

impl Encodable for Block {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.header);
        s.begin_list(self.transactions.len());
        for tx in &self.transactions {
            s.append_raw(tx, 1);
        }
        s.append_list::<Header, Header>(&self.uncles);
    }
}

impl Decodable for Block {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        codec::list_len(rlp, 3, 3)?;

        let txs = rlp.at(1)?;
        let tx_count = codec::list_len(&txs, 0, usize::MAX)?;
        let transactions = (0..tx_count)
            .map(|i| txs.at(i).map(|tx| tx.as_raw().to_vec()))
            .collect::<Result<_, _>>()?;

        let uncles = rlp.at(2)?;
        let uncle_count = codec::list_len(&uncles, 0, usize::MAX)?;
        let uncles = (0..uncle_count)
            .map(|i| uncles.val_at(i))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            header: rlp.val_at(0)?,
            transactions,
            uncles,
        })
    }
}

impl Proposal for Block {
    fn number(&self) -> u64 {
        self.header.number
    }

    fn hash(&self) -> Hash {
        self.header.hash()
    }
}
