//! location.hash ↔ map widget glue

use wasm_bindgen::prelude::*;
use web_sys::Location;

use tilemux_viewsync::{FragmentStore, FragmentSync, LatLng, MapHost, ViewState};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    /// External map widget contract. The host page installs a small shim
    /// around its map library exposing exactly these three methods.
    pub type MapWidget;

    #[wasm_bindgen(method, structural, js_name = setView)]
    fn set_view(this: &MapWidget, lat: f64, lng: f64, zoom: u32);

    #[wasm_bindgen(method, structural, js_name = getCenter)]
    fn get_center(this: &MapWidget) -> JsValue;

    #[wasm_bindgen(method, structural, js_name = getZoom)]
    fn get_zoom(this: &MapWidget) -> f64;
}

/// [`MapHost`] over the widget shim.
struct WidgetHost {
    widget: MapWidget,
}

impl MapHost for WidgetHost {
    fn center(&self) -> LatLng {
        let center = self.widget.get_center();
        let component = |name: &str| {
            js_sys::Reflect::get(&center, &name.into())
                .ok()
                .and_then(|value| value.as_f64())
                .unwrap_or(0.0)
        };
        LatLng::new(component("lat"), component("lng"))
    }

    fn zoom(&self) -> u32 {
        self.widget.get_zoom() as u32
    }

    fn set_view(&mut self, center: LatLng, zoom: u32) {
        self.widget.set_view(center.lat, center.lng, zoom);
    }
}

/// [`FragmentStore`] over `location.hash`.
struct HashStore {
    location: Location,
}

impl FragmentStore for HashStore {
    fn read(&self) -> Option<String> {
        self.location.hash().ok().filter(|hash| !hash.is_empty())
    }

    fn write(&mut self, fragment: &str) {
        if self.location.set_hash(fragment).is_err() {
            log("[tilemux] fragment write failed");
        }
    }
}

/// Viewport ↔ fragment synchronizer bound to the browser.
///
/// The host page wires the two triggers:
///
/// ```js
/// const sync = new MapFragmentSync(widgetShim);
/// sync.initialize();
/// map.on('moveend', () => sync.onMoveEnd());
/// window.onhashchange = () => sync.onHashChange();
/// ```
#[wasm_bindgen]
pub struct MapFragmentSync {
    sync: FragmentSync,
    host: WidgetHost,
    store: HashStore,
}

#[wasm_bindgen]
impl MapFragmentSync {
    /// Bind the synchronizer to the widget shim and the window location.
    #[wasm_bindgen(constructor)]
    pub fn new(widget: MapWidget) -> Result<MapFragmentSync, JsValue> {
        let location = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))?
            .location();
        Ok(MapFragmentSync {
            sync: FragmentSync::new(ViewState::default()),
            host: WidgetHost { widget },
            store: HashStore { location },
        })
    }

    /// Position the viewport from the fragment, or the fallback view.
    pub fn initialize(&mut self) {
        self.sync.initialize(&mut self.host, &self.store);
    }

    /// Viewport settled: persist it into the fragment.
    #[wasm_bindgen(js_name = onMoveEnd)]
    pub fn on_move_end(&mut self) {
        self.sync.viewport_settled(&self.host, &mut self.store);
    }

    /// Fragment changed externally: push it into the viewport if warranted.
    /// Returns whether the viewport moved.
    #[wasm_bindgen(js_name = onHashChange)]
    pub fn on_hash_change(&mut self) -> bool {
        let fragment = self.store.read().unwrap_or_default();
        self.sync.fragment_changed(&mut self.host, &fragment)
    }
}
