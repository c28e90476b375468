//! Browser bindings for tilemux
//!
//! This crate runs the tile pipeline in a real browser. The page-side half
//! owns the DOM tile elements and the Web Worker handle; the worker-side
//! half fetches bytes and calls the external decode boundary. Both halves
//! speak the JSON-encoded message protocol from `tilemux-tile`.
//!
//! ## Module Structure
//!
//! - `config` - layer and worker options parsed from JS values
//! - `layer` - `VectorTileLayer`, the DOM-owning grid layer binding
//! - `worker` - `DecodeWorkerContext`, the worker-side message handler
//! - `fragsync` - `MapFragmentSync`, location.hash ↔ map widget glue
//!
//! ## Architecture
//!
//! The page half is a thin boundary layer: it creates 256×256 SVG
//! placeholders, starts fetches, and installs decoded markup. Every decision
//! about liveness and staleness is made by the platform-neutral grid layer;
//! this crate only translates its outcomes into DOM mutations and console
//! diagnostics.

// =============================================================================
// Module declarations
// =============================================================================

mod config;
mod fragsync;
mod layer;
mod worker;

// =============================================================================
// Public re-exports
// =============================================================================

pub use config::{LayerOptions, RelayChoice, WorkerOptions};
pub use fragsync::MapFragmentSync;
pub use layer::VectorTileLayer;
pub use worker::DecodeWorkerContext;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
