//! Tile grid layer for tilemux
//!
//! Owns the set of currently-materialized tile placeholders. A placeholder is
//! created synchronously when the map widget asks for a coordinate, content
//! arrives later through an asynchronous decode pipeline, and the placeholder
//! may be torn down at any point in between. That race is normal: installing
//! a result checks the live registry first and drops anything stale.
//!
//! The layer is composed around a pluggable [`TileContentSource`] strategy
//! rather than being subclassed per content kind. The grid decides *when* a
//! coordinate needs content; the source decides *how* the content is
//! produced (fetch-then-relay, coordinate delegation, in-process decode in
//! tests).
//!
//! There is no cancellation: removing a placeholder only removes its registry
//! entry, in-flight work completes and its result is discarded on arrival.

mod layer;
mod placeholder;

pub use layer::{InstallOutcome, TileContentSource, TileGridLayer, TileTicket};
pub use placeholder::{TilePlaceholder, TileSurface, TILE_SIZE};
