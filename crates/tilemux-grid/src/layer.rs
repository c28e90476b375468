//! Placeholder registry and result installation

use std::collections::HashMap;

use tilemux_tile::{DecodeOutcome, DecodeResult, TileCoord, TileId};

use crate::placeholder::{TilePlaceholder, TileSurface};

/// Strategy for producing a tile's content asynchronously.
///
/// Called once per placeholder creation. Implementations start whatever work
/// produces a [`DecodeResult`] for the ticket — fetching bytes and relaying
/// them to a worker, delegating the bare coordinate, or decoding inline in
/// tests. The result is fed back through [`TileGridLayer::install`]; the
/// source never touches a placeholder directly.
pub trait TileContentSource {
    /// Start producing content for `coord` under the given ticket.
    fn request(&mut self, ticket: &TileTicket, coord: TileCoord);
}

/// Token identifying one placeholder incarnation.
///
/// Carries the identity plus the generation minted when the placeholder was
/// created. Everything that travels through the async pipeline is tagged with
/// a ticket, so a late result from a torn-down incarnation can never be
/// attributed to a newer placeholder that reuses the same identity string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileTicket {
    /// Coordinate-derived identity
    pub id: TileId,
    /// Monotonically increasing creation token
    pub generation: u64,
}

/// What happened to a delivered result.
///
/// Only `Installed` mutates a surface. The other outcomes are defined,
/// silent discards — callers may log them, nothing treats them as errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The placeholder is live and now holds the result
    Installed,
    /// No placeholder is registered for this identity (torn down)
    Missing,
    /// A newer placeholder for the same coordinate owns the entry
    Superseded,
}

impl InstallOutcome {
    /// True if the result landed on a live surface.
    pub fn installed(&self) -> bool {
        matches!(self, InstallOutcome::Installed)
    }
}

struct LiveTile {
    generation: u64,
    placeholder: TilePlaceholder,
}

/// Owner of all currently-materialized placeholders.
///
/// Maps identity → placeholder handle. Creation is synchronous (the caller
/// gets a renderable surface immediately), population is asynchronous, and
/// removal races with in-flight work by design.
pub struct TileGridLayer<S> {
    source: S,
    tiles: HashMap<TileId, LiveTile>,
    next_generation: u64,
}

impl<S: TileContentSource> TileGridLayer<S> {
    /// Create a grid layer around a content source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            tiles: HashMap::new(),
            next_generation: 1,
        }
    }

    /// Materialize a placeholder for `coord` and request its content.
    ///
    /// Revisiting a coordinate replaces the stale registry entry with a fresh
    /// generation; the earlier incarnation's in-flight request keeps running
    /// but its result will come back `Superseded`. Each creation issues its
    /// own request — there is no de-duplication.
    pub fn create_tile(&mut self, coord: TileCoord) -> TileTicket {
        let id = coord.id();
        let generation = self.next_generation;
        self.next_generation += 1;

        self.tiles.insert(
            id.clone(),
            LiveTile {
                generation,
                placeholder: TilePlaceholder::new(coord),
            },
        );

        let ticket = TileTicket { id, generation };
        self.source.request(&ticket, coord);
        ticket
    }

    /// Drop the registry entry for an identity.
    ///
    /// No cancellation is sent anywhere; a late result for the removed
    /// placeholder is discarded when it arrives. Returns whether an entry
    /// existed.
    pub fn remove_tile(&mut self, id: &TileId) -> bool {
        self.tiles.remove(id).is_some()
    }

    /// Install a delivered result if its placeholder is still live.
    ///
    /// This is the sole mutation point for tile surfaces. Identity and
    /// generation must both match the live entry; anything else is a defined
    /// discard, never an error.
    pub fn install(&mut self, result: DecodeResult) -> InstallOutcome {
        let live = match self.tiles.get_mut(&result.id) {
            Some(live) => live,
            None => return InstallOutcome::Missing,
        };
        if live.generation != result.generation {
            return InstallOutcome::Superseded;
        }
        let surface = match result.outcome {
            DecodeOutcome::Markup(markup) => TileSurface::Markup(markup),
            DecodeOutcome::Failed(failure) => TileSurface::Failed(failure),
        };
        live.placeholder.set_surface(surface);
        InstallOutcome::Installed
    }

    /// Whether the ticket still names the live incarnation of its tile.
    ///
    /// Used between byte-fetch completion and decode dispatch to skip work
    /// for placeholders that were torn down while the fetch was in flight.
    pub fn is_live(&self, ticket: &TileTicket) -> bool {
        self.tiles
            .get(&ticket.id)
            .map(|live| live.generation == ticket.generation)
            .unwrap_or(false)
    }

    /// Look up a placeholder by identity.
    pub fn get(&self, id: &TileId) -> Option<&TilePlaceholder> {
        self.tiles.get(id).map(|live| &live.placeholder)
    }

    /// Number of live placeholders.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True when nothing is materialized.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// The content source this layer was composed with.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the content source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilemux_tile::{TileFailure, TransportError};

    /// Records requests instead of producing content.
    #[derive(Default)]
    struct RecordingSource {
        requests: Vec<(TileTicket, TileCoord)>,
    }

    impl TileContentSource for RecordingSource {
        fn request(&mut self, ticket: &TileTicket, coord: TileCoord) {
            self.requests.push((ticket.clone(), coord));
        }
    }

    fn layer() -> TileGridLayer<RecordingSource> {
        TileGridLayer::new(RecordingSource::default())
    }

    #[test]
    fn test_create_tile_registers_and_requests() {
        let mut grid = layer();
        let ticket = grid.create_tile(TileCoord::new(5, 3, 4));

        assert_eq!(ticket.id.as_str(), "5-3-4");
        assert!(grid.is_live(&ticket));
        assert!(grid.get(&ticket.id).unwrap().is_empty());
        assert_eq!(grid.source().requests.len(), 1);
        assert_eq!(grid.source().requests[0].0, ticket);
    }

    #[test]
    fn test_install_populates_live_placeholder() {
        let mut grid = layer();
        let ticket = grid.create_tile(TileCoord::new(5, 3, 4));

        let result = DecodeResult::markup(ticket.id.clone(), ticket.generation, "<svg/>");
        assert_eq!(grid.install(result), InstallOutcome::Installed);
        assert_eq!(
            grid.get(&ticket.id).unwrap().surface(),
            &TileSurface::Markup("<svg/>".to_string())
        );
    }

    #[test]
    fn test_stale_result_for_removed_tile_is_discarded() {
        let mut grid = layer();
        let ticket = grid.create_tile(TileCoord::new(5, 3, 4));
        assert!(grid.remove_tile(&ticket.id));

        // The in-flight result arrives after teardown: dropped, no panic,
        // nothing mutated.
        let result = DecodeResult::markup(ticket.id.clone(), ticket.generation, "<svg/>");
        assert_eq!(grid.install(result), InstallOutcome::Missing);
        assert!(grid.get(&ticket.id).is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_revisited_coordinate_keeps_second_creation() {
        let mut grid = layer();
        let first = grid.create_tile(TileCoord::new(5, 3, 4));
        let second = grid.create_tile(TileCoord::new(5, 3, 4));

        assert_eq!(first.id, second.id);
        assert!(second.generation > first.generation);
        assert!(!grid.is_live(&first));
        assert!(grid.is_live(&second));

        // First creation's late result must not overwrite the fresh entry.
        let stale = DecodeResult::markup(first.id.clone(), first.generation, "stale");
        assert_eq!(grid.install(stale), InstallOutcome::Superseded);
        assert!(grid.get(&second.id).unwrap().is_empty());

        // The second request resolves normally afterwards.
        let fresh = DecodeResult::markup(second.id.clone(), second.generation, "fresh");
        assert_eq!(grid.install(fresh), InstallOutcome::Installed);
        assert_eq!(
            grid.get(&second.id).unwrap().surface(),
            &TileSurface::Markup("fresh".to_string())
        );

        // Both creations issued their own request; no de-duplication.
        assert_eq!(grid.source().requests.len(), 2);
    }

    #[test]
    fn test_out_of_order_stale_then_fresh_resolution() {
        // Same revisit race, but the fresh result lands before the stale one.
        let mut grid = layer();
        let first = grid.create_tile(TileCoord::new(7, 1, 2));
        let second = grid.create_tile(TileCoord::new(7, 1, 2));

        let fresh = DecodeResult::markup(second.id.clone(), second.generation, "fresh");
        assert_eq!(grid.install(fresh), InstallOutcome::Installed);

        let stale = DecodeResult::markup(first.id.clone(), first.generation, "stale");
        assert_eq!(grid.install(stale), InstallOutcome::Superseded);

        assert_eq!(
            grid.get(&second.id).unwrap().surface(),
            &TileSurface::Markup("fresh".to_string())
        );
    }

    #[test]
    fn test_failed_outcome_marks_surface() {
        let mut grid = layer();
        let ticket = grid.create_tile(TileCoord::new(5, 3, 4));

        let failure = TileFailure::Transport(TransportError::Status(404));
        let result = DecodeResult::failed(ticket.id.clone(), ticket.generation, failure.clone());
        assert_eq!(grid.install(result), InstallOutcome::Installed);
        assert_eq!(
            grid.get(&ticket.id).unwrap().surface(),
            &TileSurface::Failed(failure)
        );
    }

    #[test]
    fn test_removed_ticket_is_not_live() {
        let mut grid = layer();
        let ticket = grid.create_tile(TileCoord::new(2, 1, 1));
        assert!(grid.is_live(&ticket));

        grid.remove_tile(&ticket.id);
        assert!(!grid.is_live(&ticket));
        assert!(!grid.remove_tile(&ticket.id));
    }
}
