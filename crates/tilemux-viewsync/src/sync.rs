//! The synchronizer state machine

use crate::fragment::{format_fragment, parse_fragment};
use crate::state::{LatLng, ViewState};

/// Positional delta below which a fragment change is treated as an echo of
/// our own write and suppressed.
pub const CENTER_DELTA_THRESHOLD: f64 = 0.001;

/// The external map widget, as far as synchronization is concerned.
///
/// Supplied by the host; this crate only consumes the contract. `set_view`
/// corresponds to an instantaneous jump, and the host is expected to emit its
/// settle notification afterwards like for any other viewport change.
pub trait MapHost {
    /// Current viewport center.
    fn center(&self) -> LatLng;
    /// Current zoom level.
    fn zoom(&self) -> u32;
    /// Move the viewport.
    fn set_view(&mut self, center: LatLng, zoom: u32);
}

/// Persisted location descriptor, e.g. the browser's URL fragment.
pub trait FragmentStore {
    /// Current fragment, if any.
    fn read(&self) -> Option<String>;
    /// Overwrite the fragment.
    fn write(&mut self, fragment: &str);
}

/// Keeps viewport and fragment mutually consistent without feedback loops.
#[derive(Clone, Debug)]
pub struct FragmentSync {
    fallback: ViewState,
}

impl Default for FragmentSync {
    fn default() -> Self {
        Self::new(ViewState::default())
    }
}

impl FragmentSync {
    /// Create a synchronizer with the given startup fallback view.
    pub fn new(fallback: ViewState) -> Self {
        Self { fallback }
    }

    /// Parse the fragment once at startup and position the viewport.
    ///
    /// An absent or malformed fragment falls back to the configured default;
    /// the returned state is whatever was pushed into the host.
    pub fn initialize<H, F>(&self, host: &mut H, store: &F) -> ViewState
    where
        H: MapHost,
        F: FragmentStore,
    {
        let view = store
            .read()
            .and_then(|fragment| parse_fragment(&fragment))
            .unwrap_or(self.fallback);
        host.set_view(view.center, view.zoom);
        view
    }

    /// Viewport settled (pan/zoom finished): write the fragment.
    ///
    /// Always overwrites, even when nothing moved — the write is cheap and
    /// the suppression logic lives entirely on the other trigger.
    pub fn viewport_settled<H, F>(&self, host: &H, store: &mut F)
    where
        H: MapHost,
        F: FragmentStore,
    {
        let view = ViewState {
            center: host.center(),
            zoom: host.zoom(),
        }
        .rounded();
        store.write(&format_fragment(&view));
    }

    /// External fragment change: push it into the viewport if it moved far
    /// enough.
    ///
    /// A non-matching fragment is ignored. A matching one only updates the
    /// viewport when the positional delta exceeds
    /// [`CENTER_DELTA_THRESHOLD`] or the zoom differs — otherwise the change
    /// is the echo of our own `viewport_settled` write and feeding it back
    /// would loop. Returns whether the viewport was updated.
    pub fn fragment_changed<H>(&self, host: &mut H, fragment: &str) -> bool
    where
        H: MapHost,
    {
        let view = match parse_fragment(fragment) {
            Some(view) => view,
            None => return false,
        };

        let delta = host.center().delta(&view.center);
        if delta > CENTER_DELTA_THRESHOLD || host.zoom() != view.zoom {
            host.set_view(view.center, view.zoom);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Host that records every `set_view` call.
    struct RecordingHost {
        center: LatLng,
        zoom: u32,
        set_views: Vec<(LatLng, u32)>,
    }

    impl RecordingHost {
        fn at(lat: f64, lng: f64, zoom: u32) -> Self {
            Self {
                center: LatLng::new(lat, lng),
                zoom,
                set_views: Vec::new(),
            }
        }
    }

    impl MapHost for RecordingHost {
        fn center(&self) -> LatLng {
            self.center
        }

        fn zoom(&self) -> u32 {
            self.zoom
        }

        fn set_view(&mut self, center: LatLng, zoom: u32) {
            self.center = center;
            self.zoom = zoom;
            self.set_views.push((center, zoom));
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        fragment: Option<String>,
        writes: Vec<String>,
    }

    impl FragmentStore for MemoryStore {
        fn read(&self) -> Option<String> {
            self.fragment.clone()
        }

        fn write(&mut self, fragment: &str) {
            self.fragment = Some(fragment.to_string());
            self.writes.push(fragment.to_string());
        }
    }

    #[test]
    fn test_settle_writes_fragment() {
        let host = RecordingHost::at(50.1, 8.6, 12);
        let mut store = MemoryStore::default();

        FragmentSync::default().viewport_settled(&host, &mut store);
        assert_eq!(store.fragment.as_deref(), Some("map=12/50.1000/8.6000"));
    }

    #[test]
    fn test_own_write_does_not_feed_back() {
        let sync = FragmentSync::default();
        let mut host = RecordingHost::at(50.1, 8.6, 12);
        let mut store = MemoryStore::default();

        sync.viewport_settled(&host, &mut store);
        let fragment = store.fragment.clone().unwrap();

        // Observing the fragment we just wrote must not move the viewport.
        assert!(!sync.fragment_changed(&mut host, &fragment));
        assert!(host.set_views.is_empty());
    }

    #[test]
    fn test_far_fragment_updates_viewport() {
        let sync = FragmentSync::default();
        let mut host = RecordingHost::at(50.1, 8.6, 12);

        // Delta of 0.9 in latitude, well over the threshold.
        assert!(sync.fragment_changed(&mut host, "map=12/51.0000/8.6000"));
        assert_eq!(host.set_views, vec![(LatLng::new(51.0, 8.6), 12)]);
    }

    #[test]
    fn test_zoom_change_alone_updates_viewport() {
        let sync = FragmentSync::default();
        let mut host = RecordingHost::at(50.1, 8.6, 12);

        assert!(sync.fragment_changed(&mut host, "map=13/50.1000/8.6000"));
        assert_eq!(host.zoom, 13);
    }

    #[test]
    fn test_sub_threshold_drift_is_suppressed() {
        let sync = FragmentSync::default();
        let mut host = RecordingHost::at(50.1, 8.6, 12);

        // 0.0004 + 0.0004 < 0.001: still counts as an echo.
        assert!(!sync.fragment_changed(&mut host, "map=12/50.1004/8.6004"));
        assert!(host.set_views.is_empty());
    }

    #[test]
    fn test_malformed_fragment_is_ignored() {
        let sync = FragmentSync::default();
        let mut host = RecordingHost::at(50.1, 8.6, 12);

        assert!(!sync.fragment_changed(&mut host, "#foo=bar"));
        assert!(host.set_views.is_empty());
        assert_eq!(host.center, LatLng::new(50.1, 8.6));
    }

    #[test]
    fn test_initialize_uses_fragment_when_present() {
        let sync = FragmentSync::default();
        let mut host = RecordingHost::at(0.0, 0.0, 1);
        let store = MemoryStore {
            fragment: Some("#map=9/48.8566/2.3522".to_string()),
            writes: Vec::new(),
        };

        let view = sync.initialize(&mut host, &store);
        assert_eq!(view, ViewState::new(48.8566, 2.3522, 9));
        assert_eq!(host.set_views.len(), 1);
    }

    #[test]
    fn test_initialize_falls_back_on_malformed_fragment() {
        let sync = FragmentSync::default();
        let mut host = RecordingHost::at(0.0, 0.0, 1);
        let store = MemoryStore {
            fragment: Some("#foo=bar".to_string()),
            writes: Vec::new(),
        };

        let view = sync.initialize(&mut host, &store);
        assert_eq!(view, ViewState::default());
        assert_eq!(host.center, LatLng::new(50.1, 8.6));
        assert_eq!(host.zoom, 12);
    }

    #[test]
    fn test_initialize_falls_back_on_missing_fragment() {
        let sync = FragmentSync::new(ViewState::new(1.0, 2.0, 3));
        let mut host = RecordingHost::at(0.0, 0.0, 1);
        let store = MemoryStore::default();

        let view = sync.initialize(&mut host, &store);
        assert_eq!(view, ViewState::new(1.0, 2.0, 3));
    }
}
