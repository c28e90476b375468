//! Shared tile formats for tilemux
//!
//! This crate is the single source of truth for everything that crosses a
//! boundary in the tile pipeline:
//!
//! - **Tile addressing** — zoom/column/row coordinates and the derived
//!   identity string that keys placeholders and decode requests.
//! - **Endpoint configuration** — the tile byte endpoint, layer selection,
//!   and fetch-URL construction.
//! - **Worker message protocol** — the request/response pairs exchanged
//!   between the grid layer and the decode worker.
//!
//! # Architecture
//!
//! ```text
//! Grid Layer (foreground)
//!        │
//!        │ DecodeRequest { id, generation, payload }
//!        ▼
//! ┌─────────────────┐
//! │  Decode Worker  │  ◄── fetches bytes if needed, runs the decoder
//! └────────┬────────┘
//!          │
//!          │ DecodeResult { id, generation, outcome }
//!          ▼
//! Grid Layer installs markup if the placeholder is still live
//! ```
//!
//! Both sides of the boundary depend on this crate and nothing else shared,
//! so the protocol cannot drift between the foreground and the worker.

#![no_std]

extern crate alloc;

pub mod coord;
pub mod protocol;
pub mod service;

pub use coord::{CoordParseError, TileCoord, TileId};
pub use protocol::{
    DecodeOutcome, DecodeRequest, DecodeResult, TileFailure, TilePayload, TransportError,
};
pub use service::{LayerSelect, TileService};
