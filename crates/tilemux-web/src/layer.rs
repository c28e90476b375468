//! DOM-owning tile layer binding

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, MessageEvent, Request, RequestInit, RequestCache, Response, Worker,
};

use tilemux_grid::{InstallOutcome, TileContentSource, TileGridLayer, TileSurface, TileTicket, TILE_SIZE};
use tilemux_tile::{DecodeRequest, DecodeResult, TileCoord, TileId, TileService};

use crate::config::{options_from_js, LayerOptions, RelayChoice};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

const SVG_NS: &str = "http://www.w3.org/2000/svg";

type SharedGrid = Rc<RefCell<TileGridLayer<BrowserRelaySource>>>;
type WeakGrid = Weak<RefCell<TileGridLayer<BrowserRelaySource>>>;

/// Content source that relays tile requests to the browser worker.
///
/// In bytes mode the fetch happens here on the page (cache-preferring), the
/// bytes become an object URL, and the worker gets a blob reference. In
/// coordinates mode the worker receives the bare coordinate and fetches for
/// itself.
struct BrowserRelaySource {
    worker: Worker,
    service: TileService,
    relay: RelayChoice,
    grid: WeakGrid,
}

impl TileContentSource for BrowserRelaySource {
    fn request(&mut self, ticket: &TileTicket, coord: TileCoord) {
        match self.relay {
            RelayChoice::Coordinates => {
                let request = DecodeRequest::coord(ticket.id.clone(), ticket.generation, coord);
                post_request(&self.worker, &request);
            }
            RelayChoice::Bytes => {
                let url = self.service.tile_url(&coord);
                wasm_bindgen_futures::spawn_local(fetch_and_relay(
                    self.grid.clone(),
                    self.worker.clone(),
                    url,
                    ticket.clone(),
                ));
            }
        }
    }
}

/// Fetch tile bytes on the page and hand the worker a blob reference.
async fn fetch_and_relay(grid: WeakGrid, worker: Worker, url: String, ticket: TileTicket) {
    let reference = match fetch_blob_ref(&url).await {
        Ok(reference) => reference,
        Err(err) => {
            // Transport failure: no decode request is ever issued.
            log(&format!(
                "[tilemux] tile {} fetch failed: {:?}",
                ticket.id, err
            ));
            return;
        }
    };

    // The placeholder may have been torn down while the fetch was in flight.
    let live = grid
        .upgrade()
        .map(|grid| grid.borrow().is_live(&ticket))
        .unwrap_or(false);
    if !live {
        log(&format!(
            "[tilemux] tile {} was removed before its bytes arrived",
            ticket.id
        ));
        return;
    }

    let request = DecodeRequest::blob_ref(ticket.id.clone(), ticket.generation, reference);
    post_request(&worker, &request);
}

/// Cache-preferring byte fetch, returning an object URL for the body.
async fn fetch_blob_ref(url: &str) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let init = RequestInit::new();
    init.set_cache(RequestCache::ForceCache);
    let request = Request::new_with_str_and_init(url, &init)?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!("status {}", response.status())));
    }

    let blob: web_sys::Blob = JsFuture::from(response.blob()?).await?.dyn_into()?;
    web_sys::Url::create_object_url_with_blob(&blob)
}

fn post_request(worker: &Worker, request: &DecodeRequest) {
    match serde_json::to_string(request) {
        Ok(json) => {
            if worker.post_message(&JsValue::from_str(&json)).is_err() {
                // A dead worker is equivalent to a lost result.
                log(&format!("[tilemux] tile {} could not reach the worker", request.id));
            }
        }
        Err(err) => log(&format!("[tilemux] request encoding failed: {}", err)),
    }
}

/// Grid layer bound to the live DOM.
///
/// Owns the identity → element mapping alongside the platform-neutral
/// placeholder registry; nothing here queries the global document tree.
/// The host's map widget calls [`create_tile`](VectorTileLayer::create_tile)
/// for every coordinate it materializes and
/// [`remove_tile`](VectorTileLayer::remove_tile) on eviction.
#[wasm_bindgen]
pub struct VectorTileLayer {
    grid: SharedGrid,
    elements: Rc<RefCell<HashMap<TileId, Element>>>,
    document: Document,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onerror: Closure<dyn FnMut(JsValue)>,
}

#[wasm_bindgen]
impl VectorTileLayer {
    /// Create the layer and its decode worker.
    ///
    /// `options` is an optional `{ service, relay }` object.
    #[wasm_bindgen(constructor)]
    pub fn new(worker_url: &str, options: JsValue) -> Result<VectorTileLayer, JsValue> {
        let options: LayerOptions = options_from_js(&options)?.unwrap_or_default();

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let worker = Worker::new(worker_url)?;

        let grid: SharedGrid = Rc::new_cyclic(|weak: &WeakGrid| {
            RefCell::new(TileGridLayer::new(BrowserRelaySource {
                worker: worker.clone(),
                service: options.service.clone(),
                relay: options.relay,
                grid: weak.clone(),
            }))
        });
        let elements: Rc<RefCell<HashMap<TileId, Element>>> =
            Rc::new(RefCell::new(HashMap::new()));

        let onmessage_grid = grid.clone();
        let onmessage_elements = elements.clone();
        let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
            handle_worker_message(&onmessage_grid, &onmessage_elements, event);
        }) as Box<dyn FnMut(MessageEvent)>);
        worker.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let onerror = Closure::wrap(Box::new(move |event: JsValue| {
            let msg = js_sys::Reflect::get(&event, &"message".into())
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_else(|| "unknown error".to_string());
            log(&format!("[tilemux] decode worker error: {}", msg));
        }) as Box<dyn FnMut(JsValue)>);
        worker.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        Ok(VectorTileLayer {
            grid,
            elements,
            document,
            _onmessage: onmessage,
            _onerror: onerror,
        })
    }

    /// Materialize the placeholder element for a coordinate.
    ///
    /// Returns a 256×256 SVG element immediately; decoded markup is
    /// installed into it later, if the tile is still alive by then.
    #[wasm_bindgen(js_name = createTile)]
    pub fn create_tile(&self, z: u32, x: u32, y: u32) -> Result<Element, JsValue> {
        let coord = TileCoord::new(z, x, y);
        let ticket = self.grid.borrow_mut().create_tile(coord);

        let tile = self.document.create_element_ns(Some(SVG_NS), "svg")?;
        tile.set_attribute("width", &TILE_SIZE.to_string())?;
        tile.set_attribute("height", &TILE_SIZE.to_string())?;
        tile.set_id(ticket.id.as_str());

        self.elements
            .borrow_mut()
            .insert(ticket.id.clone(), tile.clone());
        Ok(tile)
    }

    /// Tear down a tile when the map widget evicts its coordinate.
    ///
    /// In-flight work for the tile is not cancelled; its result is discarded
    /// on arrival.
    #[wasm_bindgen(js_name = removeTile)]
    pub fn remove_tile(&self, id: &str) -> bool {
        let id = TileId::from(id);
        self.elements.borrow_mut().remove(&id);
        self.grid.borrow_mut().remove_tile(&id)
    }

    /// Number of live placeholders.
    #[wasm_bindgen(js_name = tileCount)]
    pub fn tile_count(&self) -> usize {
        self.grid.borrow().len()
    }
}

fn handle_worker_message(
    grid: &SharedGrid,
    elements: &Rc<RefCell<HashMap<TileId, Element>>>,
    event: MessageEvent,
) {
    let text = match event.data().as_string() {
        Some(text) => text,
        None => {
            log("[tilemux] non-string worker message dropped");
            return;
        }
    };
    let result: DecodeResult = match serde_json::from_str(&text) {
        Ok(result) => result,
        Err(err) => {
            log(&format!("[tilemux] result decoding failed: {}", err));
            return;
        }
    };

    let id = result.id.clone();
    let outcome = grid.borrow_mut().install(result);
    match outcome {
        InstallOutcome::Installed => {
            let surface = grid
                .borrow()
                .get(&id)
                .map(|placeholder| placeholder.surface().clone());
            let element = elements.borrow().get(&id).cloned();
            if let (Some(surface), Some(element)) = (surface, element) {
                apply_surface(&element, &surface);
            }
        }
        InstallOutcome::Missing => {
            log(&format!("[tilemux] tile {} was removed before its result", id));
        }
        InstallOutcome::Superseded => {
            log(&format!(
                "[tilemux] stale result for tile {} dropped in favor of a newer placeholder",
                id
            ));
        }
    }
}

fn apply_surface(element: &Element, surface: &TileSurface) {
    match surface {
        TileSurface::Markup(markup) => element.set_inner_html(markup),
        TileSurface::Failed(failure) => {
            // Visible hook for styling; the detail goes to the console.
            let _ = element.set_attribute("class", "tile-failed");
            log(&format!("[tilemux] tile {} failed: {}", element.id(), failure.message()));
        }
        TileSurface::Empty => {}
    }
}
