//! Fragment codec
//!
//! The persisted form is `map={zoom}/{lat}/{lng}` with the center printed to
//! 4 decimal digits. Parsing accepts the pattern
//! `map=(\d+)/([\d.]+)/([\d.]+)` anywhere inside the fragment (`#map=...`,
//! `#x=1&map=...`); only unsigned decimals are recognized. Anything that
//! does not match is not an error — the caller ignores the change and keeps
//! the previous viewport.

use crate::state::ViewState;

/// Render a view state as its fragment string.
pub fn format_fragment(view: &ViewState) -> String {
    format!(
        "map={}/{:.4}/{:.4}",
        view.zoom, view.center.lat, view.center.lng
    )
}

/// Extract a view state from a fragment, if one is present.
pub fn parse_fragment(fragment: &str) -> Option<ViewState> {
    // Try every "map=" occurrence so that a failed partial match earlier in
    // the string does not hide a well-formed one later.
    let mut rest = fragment;
    while let Some(pos) = rest.find("map=") {
        let candidate = &rest[pos + 4..];
        if let Some(view) = parse_triplet(candidate) {
            return Some(view);
        }
        rest = candidate;
    }
    None
}

fn parse_triplet(input: &str) -> Option<ViewState> {
    let (zoom, input) = take(input, |c: char| c.is_ascii_digit())?;
    let input = input.strip_prefix('/')?;
    let (lat, input) = take(input, |c: char| c.is_ascii_digit() || c == '.')?;
    let input = input.strip_prefix('/')?;
    let (lng, _) = take(input, |c: char| c.is_ascii_digit() || c == '.')?;

    Some(ViewState::new(
        lat.parse().ok()?,
        lng.parse().ok()?,
        zoom.parse().ok()?,
    ))
}

/// Longest non-empty prefix of characters matching `accept`.
fn take(input: &str, accept: impl Fn(char) -> bool) -> Option<(&str, &str)> {
    let end = input
        .char_indices()
        .find(|(_, c)| !accept(*c))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    if end == 0 {
        None
    } else {
        Some((&input[..end], &input[end..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LatLng;

    #[test]
    fn test_format_pads_to_four_decimals() {
        let view = ViewState::new(50.1, 8.6, 12);
        assert_eq!(format_fragment(&view), "map=12/50.1000/8.6000");
    }

    #[test]
    fn test_roundtrip_at_fragment_precision() {
        for view in [
            ViewState::new(50.1, 8.6, 12),
            ViewState::new(12.3456, 98.7654, 3),
            ViewState::new(0.0, 0.0, 0),
            ViewState::new(89.9999, 179.9999, 18),
        ] {
            let rounded = view.rounded();
            assert_eq!(parse_fragment(&format_fragment(&rounded)), Some(rounded));
        }
    }

    #[test]
    fn test_parse_with_hash_prefix() {
        let view = parse_fragment("#map=12/50.1/8.6").unwrap();
        assert_eq!(view.zoom, 12);
        assert_eq!(view.center, LatLng::new(50.1, 8.6));
    }

    #[test]
    fn test_parse_finds_pattern_among_other_params() {
        let view = parse_fragment("#theme=dark&map=7/1.5/2.5").unwrap();
        assert_eq!(view.zoom, 7);
        assert_eq!(view.center, LatLng::new(1.5, 2.5));
    }

    #[test]
    fn test_malformed_fragments_are_rejected() {
        assert_eq!(parse_fragment(""), None);
        assert_eq!(parse_fragment("#foo=bar"), None);
        assert_eq!(parse_fragment("#map=12/50.1"), None);
        assert_eq!(parse_fragment("#map=abc/50.1/8.6"), None);
        // The accepted pattern has no sign characters.
        assert_eq!(parse_fragment("#map=12/-50.1/8.6"), None);
        // Multiple dots survive the character scan but not the number parse.
        assert_eq!(parse_fragment("#map=12/50..1/8.6"), None);
    }

    #[test]
    fn test_later_occurrence_recovers_from_bad_first_match() {
        let view = parse_fragment("#map=oops&map=5/1.0/2.0").unwrap();
        assert_eq!(view.zoom, 5);
    }
}
