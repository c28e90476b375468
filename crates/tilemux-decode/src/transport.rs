//! Byte transport seam

use tilemux_tile::TransportError;

/// Where a request's bytes are fetched from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchTarget {
    /// A fully-constructed tile endpoint URL
    Url(String),
    /// An opaque reference handed over by the requester (e.g. a blob handle)
    BlobRef(String),
}

/// Blocking byte fetch used inside the worker context.
///
/// Implementations should prefer a locally cached copy without forced
/// revalidation — the transport cache is the pipeline's only caching tier
/// and its eviction policy is the only one there is. A failed fetch is
/// terminal for the request; nothing retries.
pub trait ByteSource {
    /// Fetch the raw bytes behind a target.
    fn fetch(&self, target: &FetchTarget) -> Result<Vec<u8>, TransportError>;
}
