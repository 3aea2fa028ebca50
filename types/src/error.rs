//! Wire and parsing errors for QBFT types.

/// Result alias for encoding, decoding and parsing primitives.
pub type WireResult<T> = Result<T, WireError>;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("failed to decode {kind}: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: rlp::DecoderError,
    },

    #[error("failed to decode {kind}: {extra} trailing bytes")]
    TrailingBytes { kind: &'static str, extra: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}
