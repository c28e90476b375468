//! Options crossing the JS boundary

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use tilemux_tile::TileService;

/// Which request shape the page sends to the worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayChoice {
    /// Fetch bytes in the page, hand the worker a blob reference
    #[default]
    Bytes,
    /// Hand the worker bare coordinates; it fetches for itself
    Coordinates,
}

/// Options for [`VectorTileLayer`].
///
/// [`VectorTileLayer`]: crate::VectorTileLayer
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayerOptions {
    /// Tile endpoint; defaults to the stock vector-tile service
    #[serde(default)]
    pub service: TileService,
    /// Request shape toward the worker
    #[serde(default)]
    pub relay: RelayChoice,
}

/// Options for [`DecodeWorkerContext`].
///
/// [`DecodeWorkerContext`]: crate::DecodeWorkerContext
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerOptions {
    /// Endpoint configuration for coordinate-relay requests
    #[serde(default)]
    pub service: TileService,
    /// Post explicit `Failed` outcomes instead of dropping failures silently
    #[serde(default = "default_report_failures")]
    pub report_failures: bool,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            service: TileService::default(),
            report_failures: default_report_failures(),
        }
    }
}

fn default_report_failures() -> bool {
    true
}

/// Parse an options object handed over from JS; `undefined`/`null` mean
/// "use defaults".
pub(crate) fn options_from_js<T>(value: &JsValue) -> Result<Option<T>, JsValue>
where
    T: serde::de::DeserializeOwned,
{
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let json: String = js_sys::JSON::stringify(value)
        .map_err(|_| JsValue::from_str("options are not JSON-serializable"))?
        .into();
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|err| JsValue::from_str(&format!("invalid options: {}", err)))
}
