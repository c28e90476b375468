//! Tile addressing
//!
//! A tile is addressed by zoom level, column, and row. The identity string
//! `"{z}-{x}-{y}"` is derived once when a placeholder is created and keys the
//! tile for its whole lifetime.

use alloc::string::{String, ToString};
use core::fmt::{self, Display};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Grid coordinate of a single tile.
///
/// Immutable once a placeholder has been created for it. The coordinate is
/// the identity of a tile; two placeholders for the same coordinate share the
/// same identity string and are disambiguated by generation tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level (0 = whole world in one tile)
    pub z: u32,
    /// Column index
    pub x: u32,
    /// Row index
    pub y: u32,
}

impl TileCoord {
    /// Create a coordinate from zoom/column/row.
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Derive the identity string for this coordinate.
    pub fn id(&self) -> TileId {
        TileId(self.to_string())
    }
}

impl Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.z, self.x, self.y)
    }
}

impl FromStr for TileCoord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let z = parse_part(parts.next())?;
        let x = parse_part(parts.next())?;
        let y = parse_part(parts.next())?;
        if parts.next().is_some() {
            return Err(CoordParseError::BadShape);
        }
        Ok(Self { z, x, y })
    }
}

fn parse_part(part: Option<&str>) -> Result<u32, CoordParseError> {
    part.ok_or(CoordParseError::BadShape)?
        .parse()
        .map_err(|_| CoordParseError::BadNumber)
}

/// Failure to parse an identity string back into a coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordParseError {
    /// Not three dash-separated fields
    BadShape,
    /// A field is not a non-negative integer
    BadNumber,
}

impl CoordParseError {
    /// Human-readable description.
    pub fn message(&self) -> &'static str {
        match self {
            CoordParseError::BadShape => "expected \"z-x-y\"",
            CoordParseError::BadNumber => "coordinate field is not an integer",
        }
    }
}

/// Identity of a tile placeholder and its decode request.
///
/// Serializes as a plain string on the wire. Minted from a [`TileCoord`];
/// the free-form constructors exist for routing results whose coordinate is
/// no longer known.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(String);

impl TileId {
    /// View the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TileCoord> for TileId {
    fn from(coord: TileCoord) -> Self {
        coord.id()
    }
}

impl From<&TileCoord> for TileId {
    fn from(coord: &TileCoord) -> Self {
        coord.id()
    }
}

impl From<&str> for TileId {
    fn from(s: &str) -> Self {
        Self(String::from(s))
    }
}

impl From<String> for TileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_format() {
        let coord = TileCoord::new(5, 3, 4);
        assert_eq!(coord.id().as_str(), "5-3-4");
    }

    #[test]
    fn test_identity_roundtrip() {
        let coord = TileCoord::new(12, 2200, 1343);
        let parsed: TileCoord = coord.id().as_str().parse().unwrap();
        assert_eq!(parsed, coord);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!("5-3".parse::<TileCoord>(), Err(CoordParseError::BadShape));
        assert_eq!(
            "5-3-4-1".parse::<TileCoord>(),
            Err(CoordParseError::BadShape)
        );
        assert_eq!(
            "5-x-4".parse::<TileCoord>(),
            Err(CoordParseError::BadNumber)
        );
        assert_eq!(
            "5-3--4".parse::<TileCoord>(),
            Err(CoordParseError::BadNumber)
        );
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = TileCoord::new(1, 0, 0).id();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1-0-0\"");
    }
}
