//! RLP helpers shared by the wire types.
//!
//! The `rlp` crate is lenient in two places that matter for consensus
//! messages: it ignores bytes after the first item and its list iterator
//! stops silently at a malformed element. Everything decoded through this
//! module is checked for both.

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use std::cmp::Ordering;

use crate::error::{WireError, WireResult};

pub(crate) fn encode<T: Encodable>(value: &T) -> Vec<u8> {
    rlp::encode(value).to_vec()
}

/// Decode exactly one item spanning all of `bytes`.
pub(crate) fn decode<T: Decodable>(kind: &'static str, bytes: &[u8]) -> WireResult<T> {
    let rlp = Rlp::new(bytes);
    let wrap = |source| WireError::Decode { kind, source };
    let total = rlp.payload_info().map_err(wrap)?.total();
    match total.cmp(&bytes.len()) {
        Ordering::Greater => Err(wrap(DecoderError::RlpIsTooShort)),
        Ordering::Less => Err(WireError::TrailingBytes {
            kind,
            extra: bytes.len() - total,
        }),
        Ordering::Equal => rlp.as_val().map_err(wrap),
    }
}

/// Check that `rlp` is a well-formed list of `min..=max` items whose
/// elements cover the whole payload. Returns the item count.
pub(crate) fn list_len(rlp: &Rlp, min: usize, max: usize) -> Result<usize, DecoderError> {
    if !rlp.is_list() {
        return Err(DecoderError::RlpExpectedToBeList);
    }
    let count = rlp.item_count()?;
    if count < min || count > max {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    let mut consumed = 0;
    for index in 0..count {
        consumed += rlp.at(index)?.as_raw().len();
    }
    if consumed != rlp.payload_info()?.value_len {
        return Err(DecoderError::RlpInconsistentLengthAndData);
    }
    Ok(count)
}

pub(crate) fn append_fixed(stream: &mut RlpStream, bytes: &[u8]) {
    stream.encoder().encode_value(bytes);
}

/// Decode a byte string of exactly `N` bytes.
pub(crate) fn decode_fixed<const N: usize>(rlp: &Rlp) -> Result<[u8; N], DecoderError> {
    rlp.decoder()
        .decode_value(|bytes| match bytes.len().cmp(&N) {
            Ordering::Less => Err(DecoderError::RlpIsTooShort),
            Ordering::Greater => Err(DecoderError::RlpIsTooBig),
            Ordering::Equal => {
                let mut out = [0u8; N];
                out.copy_from_slice(bytes);
                Ok(out)
            }
        })
}
