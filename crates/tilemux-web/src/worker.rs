//! Worker-side decode dispatch
//!
//! Runs inside the dedicated Web Worker. The worker bootstrap script loads
//! the external decode module, constructs a [`DecodeWorkerContext`], and
//! forwards every `message` event to it. Bytes are fetched here when the
//! page relayed only a reference or a coordinate, then pushed through the
//! decode boundary, and the result is posted back as JSON.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DedicatedWorkerGlobalScope, Request, RequestCache, RequestInit, Response};

use tilemux_decode::{DecodeError, FailurePolicy, TileDecoder};
use tilemux_tile::{
    DecodeRequest, DecodeResult, TileFailure, TilePayload, TileService, TransportError,
};

use crate::config::{options_from_js, WorkerOptions};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    /// The external decode boundary, loaded by the worker bootstrap before
    /// this module. Separately versioned; treated as a black box that either
    /// returns markup or throws.
    #[wasm_bindgen(js_name = decodeTile, catch)]
    fn decode_tile(bytes: &[u8]) -> Result<JsValue, JsValue>;
}

/// Decode boundary adapter over the JS `decodeTile` global.
struct BoundaryDecoder;

impl TileDecoder for BoundaryDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        match decode_tile(bytes) {
            Ok(markup) => markup
                .as_string()
                .ok_or_else(|| DecodeError::new("decode boundary returned a non-string")),
            Err(err) => Err(DecodeError::new(
                err.as_string()
                    .unwrap_or_else(|| "decode boundary rejected the tile".to_string()),
            )),
        }
    }
}

/// Worker-side half of the decode pipeline.
///
/// One instance per worker, constructed by the bootstrap script. Multiple
/// requests may be in flight at once because fetches are non-blocking;
/// results are posted independently and arrive at the page in whatever order
/// they finish.
#[wasm_bindgen]
pub struct DecodeWorkerContext {
    scope: DedicatedWorkerGlobalScope,
    service: TileService,
    policy: FailurePolicy,
}

#[wasm_bindgen]
impl DecodeWorkerContext {
    /// Construct from an optional `{ service, report_failures }` object.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<DecodeWorkerContext, JsValue> {
        let options: WorkerOptions = options_from_js(&options)?.unwrap_or_default();
        let scope: DedicatedWorkerGlobalScope = js_sys::global()
            .dyn_into()
            .map_err(|_| JsValue::from_str("not running inside a dedicated worker"))?;

        Ok(DecodeWorkerContext {
            scope,
            service: options.service,
            policy: if options.report_failures {
                FailurePolicy::Report
            } else {
                FailurePolicy::Silent
            },
        })
    }

    /// Handle one message from the page (a JSON-encoded request).
    #[wasm_bindgen(js_name = onMessage)]
    pub fn on_message(&self, message: JsValue) {
        let text = match message.as_string() {
            Some(text) => text,
            None => {
                log("[tilemux-worker] non-string message dropped");
                return;
            }
        };
        let request: DecodeRequest = match serde_json::from_str(&text) {
            Ok(request) => request,
            Err(err) => {
                log(&format!("[tilemux-worker] request decoding failed: {}", err));
                return;
            }
        };

        let scope = self.scope.clone();
        let service = self.service.clone();
        let policy = self.policy;
        wasm_bindgen_futures::spawn_local(async move {
            if let Some(result) = resolve(&scope, &service, policy, request).await {
                post_result(&scope, &result);
            }
        });
    }
}

/// Produce at most one result for a request.
async fn resolve(
    scope: &DedicatedWorkerGlobalScope,
    service: &TileService,
    policy: FailurePolicy,
    request: DecodeRequest,
) -> Option<DecodeResult> {
    let DecodeRequest {
        id,
        generation,
        payload,
    } = request;

    let bytes = match payload {
        TilePayload::Bytes(bytes) => Ok(bytes),
        TilePayload::BlobRef(reference) => fetch_bytes(scope, &reference)
            .await
            .map_err(|_| TransportError::BadReference),
        TilePayload::Coord(coord) => {
            let url = service.tile_url(&coord);
            fetch_bytes(scope, &url).await
        }
    };

    let failure = match bytes {
        Ok(raw) => match BoundaryDecoder.decode(&raw) {
            Ok(markup) => return Some(DecodeResult::markup(id, generation, markup)),
            Err(err) => TileFailure::from(err),
        },
        Err(err) => TileFailure::Transport(err),
    };

    log(&format!("[tilemux-worker] tile {}: {}", id, failure.message()));
    match policy {
        FailurePolicy::Report => Some(DecodeResult::failed(id, generation, failure)),
        FailurePolicy::Silent => None,
    }
}

/// Cache-preferring byte fetch inside the worker scope.
async fn fetch_bytes(
    scope: &DedicatedWorkerGlobalScope,
    url: &str,
) -> Result<Vec<u8>, TransportError> {
    let init = RequestInit::new();
    init.set_cache(RequestCache::ForceCache);
    let request = Request::new_with_str_and_init(url, &init)
        .map_err(|_| TransportError::Unreachable)?;

    let response: Response = JsFuture::from(scope.fetch_with_request(&request))
        .await
        .map_err(|_| TransportError::Unreachable)?
        .dyn_into()
        .map_err(|_| TransportError::Unreachable)?;
    if !response.ok() {
        return Err(TransportError::Status(response.status()));
    }

    let buffer = JsFuture::from(
        response
            .array_buffer()
            .map_err(|_| TransportError::Unreachable)?,
    )
    .await
    .map_err(|_| TransportError::Unreachable)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn post_result(scope: &DedicatedWorkerGlobalScope, result: &DecodeResult) {
    match serde_json::to_string(result) {
        Ok(json) => {
            if scope.post_message(&JsValue::from_str(&json)).is_err() {
                log(&format!("[tilemux-worker] tile {} result undeliverable", result.id));
            }
        }
        Err(err) => log(&format!("[tilemux-worker] result encoding failed: {}", err)),
    }
}
