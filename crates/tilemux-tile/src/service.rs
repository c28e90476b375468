//! Tile endpoint configuration and fetch-URL construction
//!
//! The byte endpoint is templated as
//! `{base}{layers}/{z}/{x}/{y}.mvt?api_key={key}`. Both the grid layer (when
//! it fetches bytes itself) and the decode worker (when it is handed bare
//! coordinates) build URLs from their own copy of this configuration.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::coord::TileCoord;

/// Which named layers a tile request should include.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LayerSelectRepr", into = "LayerSelectRepr")]
pub enum LayerSelect {
    /// Every layer the endpoint offers (path segment `all`)
    All,
    /// An explicit list of layer names, comma-joined in the path
    Named(Vec<String>),
}

impl LayerSelect {
    /// Render the URL path segment for this selection.
    pub fn path_segment(&self) -> String {
        match self {
            LayerSelect::All => String::from("all"),
            LayerSelect::Named(names) => names.join(","),
        }
    }
}

impl Default for LayerSelect {
    fn default() -> Self {
        LayerSelect::All
    }
}

/// Configuration-file shape: `"all"`, a single layer name, or a list.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum LayerSelectRepr {
    Name(String),
    List(Vec<String>),
}

impl From<LayerSelectRepr> for LayerSelect {
    fn from(repr: LayerSelectRepr) -> Self {
        match repr {
            LayerSelectRepr::Name(name) if name == "all" => LayerSelect::All,
            LayerSelectRepr::Name(name) => LayerSelect::Named(vec![name]),
            LayerSelectRepr::List(names) => LayerSelect::Named(names),
        }
    }
}

impl From<LayerSelect> for LayerSelectRepr {
    fn from(select: LayerSelect) -> Self {
        match select {
            LayerSelect::All => LayerSelectRepr::Name(String::from("all")),
            LayerSelect::Named(names) => LayerSelectRepr::List(names),
        }
    }
}

/// Tile byte endpoint configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileService {
    /// Endpoint base URL, trailing slash included
    pub base: String,
    /// API key appended to every tile URL
    pub api_key: String,
    /// Layer selection for every tile URL
    #[serde(default)]
    pub layers: LayerSelect,
}

impl Default for TileService {
    fn default() -> Self {
        Self {
            base: String::from("https://tile.mapzen.com/mapzen/vector/v1/"),
            api_key: String::from("mapzen-j16kH4C"),
            layers: LayerSelect::All,
        }
    }
}

impl TileService {
    /// Create a service description for a custom endpoint.
    pub fn new(base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            api_key: api_key.into(),
            layers: LayerSelect::All,
        }
    }

    /// Restrict requests to the given layers.
    pub fn with_layers(mut self, layers: LayerSelect) -> Self {
        self.layers = layers;
        self
    }

    /// Build the fetch URL for one tile.
    pub fn tile_url(&self, coord: &TileCoord) -> String {
        format!(
            "{}{}/{}/{}/{}.mvt?api_key={}",
            self.base,
            self.layers.path_segment(),
            coord.z,
            coord.x,
            coord.y,
            self.api_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_default_layer_segment_is_all() {
        assert_eq!(LayerSelect::default().path_segment(), "all");
    }

    #[test]
    fn test_named_layers_are_comma_joined() {
        let layers = LayerSelect::Named(vec!["roads".to_string(), "water".to_string()]);
        assert_eq!(layers.path_segment(), "roads,water");
    }

    #[test]
    fn test_tile_url_template() {
        let service = TileService::new("https://tiles.example.org/v1/", "k123");
        let url = service.tile_url(&TileCoord::new(12, 2200, 1343));
        assert_eq!(
            url,
            "https://tiles.example.org/v1/all/12/2200/1343.mvt?api_key=k123"
        );
    }

    #[test]
    fn test_tile_url_with_named_layers() {
        let service = TileService::new("https://tiles.example.org/v1/", "k123")
            .with_layers(LayerSelect::Named(vec![
                "roads".to_string(),
                "water".to_string(),
            ]));
        let url = service.tile_url(&TileCoord::new(5, 3, 4));
        assert_eq!(
            url,
            "https://tiles.example.org/v1/roads,water/5/3/4.mvt?api_key=k123"
        );
    }

    #[test]
    fn test_layer_select_accepts_all_string() {
        let select: LayerSelect = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(select, LayerSelect::All);
    }

    #[test]
    fn test_layer_select_accepts_single_name() {
        let select: LayerSelect = serde_json::from_str("\"roads\"").unwrap();
        assert_eq!(select, LayerSelect::Named(vec!["roads".to_string()]));
    }

    #[test]
    fn test_layer_select_accepts_list() {
        let select: LayerSelect = serde_json::from_str("[\"roads\",\"water\"]").unwrap();
        assert_eq!(
            select,
            LayerSelect::Named(vec!["roads".to_string(), "water".to_string()])
        );
    }
}
