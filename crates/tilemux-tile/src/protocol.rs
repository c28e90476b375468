//! Worker message protocol
//!
//! Request/response pairs crossing the grid-layer ↔ decode-worker boundary.
//! Encoded as JSON on the browser boundary (`postMessage`), passed as plain
//! values over channels natively. There is no acknowledgement and no
//! heartbeat: one request produces at most one result, and results for
//! different identities may arrive in any order.
//!
//! Every message carries the generation token minted by the grid layer when
//! the placeholder was created. A result whose generation no longer matches
//! the live entry is dropped by the grid layer, which closes the stale-result
//! window that identity strings alone would leave open when a coordinate is
//! torn down and revisited quickly.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::coord::{TileCoord, TileId};

/// Request for one tile's content, sent once per placeholder creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodeRequest {
    /// Identity of the placeholder this request belongs to
    pub id: TileId,
    /// Generation token of that placeholder
    pub generation: u64,
    /// Where the bytes come from
    pub payload: TilePayload,
}

impl DecodeRequest {
    /// Bytes already fetched by the caller.
    pub fn bytes(id: TileId, generation: u64, bytes: Vec<u8>) -> Self {
        Self {
            id,
            generation,
            payload: TilePayload::Bytes(bytes),
        }
    }

    /// A fetchable reference the worker dereferences itself.
    pub fn blob_ref(id: TileId, generation: u64, reference: impl Into<String>) -> Self {
        Self {
            id,
            generation,
            payload: TilePayload::BlobRef(reference.into()),
        }
    }

    /// Bare coordinates; the worker constructs the fetch URL.
    pub fn coord(id: TileId, generation: u64, coord: TileCoord) -> Self {
        Self {
            id,
            generation,
            payload: TilePayload::Coord(coord),
        }
    }
}

/// Byte source of a decode request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TilePayload {
    /// Raw tile bytes, fetched by the caller
    Bytes(Vec<u8>),
    /// Opaque fetchable reference (e.g. an object-local blob URL)
    BlobRef(String),
    /// Coordinates only; the worker builds the URL and fetches
    Coord(TileCoord),
}

/// Result of one decode request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodeResult {
    /// Identity echoed from the request
    pub id: TileId,
    /// Generation echoed from the request
    pub generation: u64,
    /// What the worker produced
    pub outcome: DecodeOutcome,
}

impl DecodeResult {
    /// Successful decode.
    pub fn markup(id: TileId, generation: u64, markup: impl Into<String>) -> Self {
        Self {
            id,
            generation,
            outcome: DecodeOutcome::Markup(markup.into()),
        }
    }

    /// Explicit failure report.
    pub fn failed(id: TileId, generation: u64, failure: TileFailure) -> Self {
        Self {
            id,
            generation,
            outcome: DecodeOutcome::Failed(failure),
        }
    }
}

/// Outcome variants of a decode request.
///
/// The `Failed` variant is only posted when the worker runs with an explicit
/// failure policy; under silent-loss semantics a failed request simply never
/// produces a result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DecodeOutcome {
    /// Rendered markup ready to install into the placeholder
    Markup(String),
    /// The request failed; the placeholder can show an error surface
    Failed(TileFailure),
}

/// Why a tile produced no markup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileFailure {
    /// The bytes never arrived
    Transport(TransportError),
    /// The decoder rejected the bytes; detail from the decode boundary
    Decode(String),
}

impl TileFailure {
    /// Human-readable description.
    pub fn message(&self) -> &str {
        match self {
            TileFailure::Transport(err) => err.message(),
            TileFailure::Decode(detail) => detail,
        }
    }
}

/// Byte-fetch failures.
///
/// None of these are retried; the transport cache is the only second chance
/// a tile gets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    /// Endpoint answered with a non-2xx status
    Status(u16),
    /// Connection-level failure, no response at all
    Unreachable,
    /// A blob reference could not be resolved
    BadReference,
}

impl TransportError {
    /// Human-readable description.
    pub fn message(&self) -> &'static str {
        match self {
            TransportError::Status(_) => "tile endpoint returned an error status",
            TransportError::Unreachable => "tile endpoint unreachable",
            TransportError::BadReference => "byte reference could not be resolved",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_request_roundtrips_through_json() {
        let req = DecodeRequest::coord("5-3-4".into(), 7, TileCoord::new(5, 3, 4));
        let json = serde_json::to_string(&req).unwrap();
        let back: DecodeRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn test_blob_ref_request_carries_reference() {
        let req = DecodeRequest::blob_ref("1-0-0".into(), 1, "blob:abc");
        match req.payload {
            TilePayload::BlobRef(ref reference) => assert_eq!(reference, "blob:abc"),
            ref other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_result_roundtrips_through_json() {
        let res = DecodeResult::markup("5-3-4".into(), 7, "<path d=\"m 0 0\"></path>");
        let json = serde_json::to_string(&res).unwrap();
        let back: DecodeResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, res);
    }

    #[test]
    fn test_failure_messages() {
        let failure = TileFailure::Transport(TransportError::Status(503));
        assert_eq!(failure.message(), "tile endpoint returned an error status");

        let failure = TileFailure::Decode(String::from("truncated varint"));
        assert_eq!(failure.message(), "truncated varint");
    }

    #[test]
    fn test_bytes_request_owns_payload() {
        let req = DecodeRequest::bytes("1-0-0".into(), 2, vec![0x1a, 0x00]);
        assert_eq!(req.payload, TilePayload::Bytes(vec![0x1a, 0x00]));
    }
}
