//! Viewport ↔ URL-fragment synchronization for tilemux
//!
//! Keeps the map's visual viewport and the persisted location fragment
//! (`map={zoom}/{lat}/{lng}`) mutually consistent without feedback loops.
//! Neither side owns the other: whichever changed most recently propagates,
//! and a small positional threshold stops a fragment write from bouncing
//! straight back into the viewport it was derived from.
//!
//! The map widget itself is an external collaborator reached through the
//! [`MapHost`] trait; fragment persistence is likewise behind
//! [`FragmentStore`]. The synchronizer holds no state beyond its fallback
//! view — both triggers are idempotent relative to each other.

mod fragment;
mod state;
mod sync;

pub use fragment::{format_fragment, parse_fragment};
pub use state::{LatLng, ViewState};
pub use sync::{FragmentStore, FragmentSync, MapHost, CENTER_DELTA_THRESHOLD};
