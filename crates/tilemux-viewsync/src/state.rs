//! Viewport state

use serde::{Deserialize, Serialize};

/// Geographic center of the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl LatLng {
    /// Create a center point.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Round both components to 4 decimal digits, the fragment precision.
    pub fn rounded(&self) -> Self {
        Self {
            lat: round4(self.lat),
            lng: round4(self.lng),
        }
    }

    /// Sum of absolute component differences, the measure the feedback
    /// suppression threshold is compared against.
    pub fn delta(&self, other: &LatLng) -> f64 {
        (self.lat - other.lat).abs() + (self.lng - other.lng).abs()
    }
}

/// Viewport position and zoom.
///
/// Round-trips through the fragment string representation up to 4 decimal
/// digits of center precision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Viewport center
    pub center: LatLng,
    /// Integer zoom level
    pub zoom: u32,
}

impl ViewState {
    /// Create a view state.
    pub fn new(lat: f64, lng: f64, zoom: u32) -> Self {
        Self {
            center: LatLng::new(lat, lng),
            zoom,
        }
    }

    /// This state at fragment precision.
    pub fn rounded(&self) -> Self {
        Self {
            center: self.center.rounded(),
            zoom: self.zoom,
        }
    }
}

impl Default for ViewState {
    /// Startup fallback when no usable fragment exists: Frankfurt (Main).
    fn default() -> Self {
        Self::new(50.1, 8.6, 12)
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_to_fragment_precision() {
        let center = LatLng::new(50.123456, 8.654321).rounded();
        assert_eq!(center, LatLng::new(50.1235, 8.6543));
    }

    #[test]
    fn test_rounding_is_idempotent() {
        let center = LatLng::new(50.1, 8.6).rounded();
        assert_eq!(center, center.rounded());
    }

    #[test]
    fn test_delta_sums_absolute_differences() {
        let a = LatLng::new(50.1, 8.6);
        let b = LatLng::new(51.0, 8.6);
        assert!((a.delta(&b) - 0.9).abs() < 1e-9);
        assert_eq!(a.delta(&a), 0.0);
    }

    #[test]
    fn test_view_state_serialization() {
        let view = ViewState::new(50.1, 8.6, 12);
        let json = serde_json::to_string(&view).unwrap();
        let restored: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, view);
    }

    #[test]
    fn test_default_view_is_frankfurt() {
        let view = ViewState::default();
        assert_eq!(view.center, LatLng::new(50.1, 8.6));
        assert_eq!(view.zoom, 12);
    }
}
