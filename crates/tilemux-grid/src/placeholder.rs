//! Tile placeholder surfaces

use tilemux_tile::{TileCoord, TileFailure, TileId};

/// Logical edge length of every tile surface, in pixels.
pub const TILE_SIZE: u32 = 256;

/// Content state of a placeholder surface.
#[derive(Clone, Debug, PartialEq)]
pub enum TileSurface {
    /// Created, nothing installed yet
    Empty,
    /// Decoded markup, ready to render
    Markup(String),
    /// The pipeline reported an explicit failure for this tile
    Failed(TileFailure),
}

/// A visual surface created immediately for a coordinate and populated later.
///
/// The identity never changes after creation; content is written exactly once
/// per delivered result, and only through [`TileGridLayer::install`]
/// (the single mutation point of the pipeline).
///
/// [`TileGridLayer::install`]: crate::TileGridLayer::install
#[derive(Clone, Debug)]
pub struct TilePlaceholder {
    coord: TileCoord,
    id: TileId,
    surface: TileSurface,
}

impl TilePlaceholder {
    /// Allocate an empty placeholder for a coordinate.
    pub fn new(coord: TileCoord) -> Self {
        Self {
            coord,
            id: coord.id(),
            surface: TileSurface::Empty,
        }
    }

    /// The coordinate this placeholder was created for.
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// The identity string derived from the coordinate.
    pub fn id(&self) -> &TileId {
        &self.id
    }

    /// Current content state.
    pub fn surface(&self) -> &TileSurface {
        &self.surface
    }

    /// True until a result has been installed.
    pub fn is_empty(&self) -> bool {
        matches!(self.surface, TileSurface::Empty)
    }

    pub(crate) fn set_surface(&mut self, surface: TileSurface) {
        self.surface = surface;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_placeholder_is_empty() {
        let tile = TilePlaceholder::new(TileCoord::new(5, 3, 4));
        assert!(tile.is_empty());
        assert_eq!(tile.id().as_str(), "5-3-4");
        assert_eq!(tile.coord(), TileCoord::new(5, 3, 4));
    }
}
