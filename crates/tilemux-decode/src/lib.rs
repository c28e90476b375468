//! Decode worker runtime for tilemux
//!
//! CPU-bound tile decoding runs in a single long-lived background execution
//! context, isolated from the grid layer. The two sides communicate only by
//! message passing — no shared mutable memory crosses the boundary.
//!
//! # Architecture
//!
//! ```text
//! Grid Layer (foreground)
//!        │
//!        │ DecodeRequest            channel (native) / postMessage (browser)
//!        ▼
//! ┌──────────────────┐
//! │   DecodeWorker   │  dedicated thread
//! │  ┌────────────┐  │
//! │  │ ByteSource │  │  ◄── fetches when handed a reference or coordinate
//! │  ├────────────┤  │
//! │  │TileDecoder │  │  ◄── external decode boundary, bytes → markup
//! │  └────────────┘  │
//! └────────┬─────────┘
//!          │
//!          │ DecodeResult (at most one per request)
//!          ▼
//! Grid Layer polls and installs
//! ```
//!
//! There is no cancellation, no timeout, and no retry: once a request is
//! submitted its result is eventually delivered or — on failure under the
//! silent policy — never delivered. Completion order across identities is
//! unspecified; only the per-identity "at most one result per request"
//! guarantee holds.

mod boundary;
mod runtime;
mod source;
mod transport;

pub use boundary::{DecodeError, TileDecoder};
pub use runtime::{DecodeWorker, FailurePolicy, RequestSender, WorkerError};
pub use source::{RelayMode, WorkerRelaySource};
pub use transport::{ByteSource, FetchTarget};
