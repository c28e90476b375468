//! The decode boundary
//!
//! The byte-to-markup conversion is owned by a separately-versioned module;
//! this crate only defines the seam. Decoding either succeeds or fails with
//! a [`DecodeError`]; a failure is propagated as "no result" or an explicit
//! failure post depending on the worker's policy, never as a crash.

use tilemux_tile::TileFailure;

/// External byte → markup conversion.
///
/// Pure and synchronous; invoked from the worker context only. The returned
/// markup is installed verbatim as a placeholder's content.
pub trait TileDecoder {
    /// Decode one tile's bytes into displayable markup.
    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError>;
}

/// Rejection reported by the decode boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    detail: String,
}

impl DecodeError {
    /// Wrap the boundary's diagnostic detail.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.detail
    }
}

impl From<DecodeError> for TileFailure {
    fn from(err: DecodeError) -> Self {
        TileFailure::Decode(err.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_carries_detail() {
        let err = DecodeError::new("truncated varint at offset 12");
        assert_eq!(err.message(), "truncated varint at offset 12");
        assert_eq!(
            TileFailure::from(err),
            TileFailure::Decode("truncated varint at offset 12".to_string())
        );
    }
}
