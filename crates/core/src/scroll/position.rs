//! Window edge parsing and the per-engine position cache.

use std::collections::HashMap;

use super::descriptor::{AnimationDescriptor, Bound, ScrollReference};

/// Resolved window as fractions of the progress signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    /// Map `progress` linearly into this window and clamp to [0, 1]. A
    /// zero-width window acts as a step at its edge.
    pub fn local_progress(&self, progress: f64) -> f64 {
        map_range(progress, self.start, self.end)
    }
}

pub(crate) fn map_range(value: f64, start: f64, end: f64) -> f64 {
    if end == start {
        return if value >= end { 1.0 } else { 0.0 };
    }
    let t = (value - start) / (end - start);
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Leading-number parse: `"50vh"` is 50, `"-12.5%"` is -12.5, `"vh"` is
/// `None`. Surrounding text after the number is ignored.
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}

/// Convert one window edge into a fraction.
///
/// Numbers and `%`/bare strings are percentages. `vh` edges depend on the
/// reference: against a container they are a share of its scrollable
/// distance, against the viewport they are scaled by
/// `viewport_height / reference_height`.
pub fn parse_position(
    bound: &Bound,
    reference_height: f64,
    viewport_height: f64,
    mode: ScrollReference,
) -> f64 {
    let text = match bound {
        Bound::Number(n) => return n / 100.0,
        Bound::Text(text) => text.as_str(),
    };

    if text == "0" || text == "100" {
        return parse_float(text).unwrap_or(0.0) / 100.0;
    }

    if text.ends_with("vh") {
        let vh = parse_float(text).unwrap_or(0.0);
        return match mode {
            ScrollReference::Container => {
                if viewport_height <= 0.0 {
                    return 0.0;
                }
                let max_scroll_vh =
                    (reference_height - viewport_height).max(0.0) * 100.0 / viewport_height;
                if max_scroll_vh > 0.0 {
                    vh / max_scroll_vh
                } else {
                    0.0
                }
            }
            ScrollReference::Viewport => {
                if reference_height <= 0.0 {
                    return 0.0;
                }
                vh * viewport_height / 100.0 / reference_height
            }
        };
    }

    parse_float(text).unwrap_or(0.0) / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub selector: String,
    pub start: String,
    pub end: String,
    pub mode: ScrollReference,
}

impl PositionKey {
    pub fn for_descriptor(descriptor: &AnimationDescriptor) -> Self {
        Self {
            selector: descriptor.selector.clone(),
            start: descriptor.start.key(),
            end: descriptor.end.key(),
            mode: descriptor.mode,
        }
    }
}

/// Memoized windows. Entries depend on the viewport height, so the owner
/// clears the cache on every resize.
#[derive(Debug, Default)]
pub struct PositionCache {
    entries: HashMap<PositionKey, Window>,
}

impl PositionCache {
    /// Cached window for `descriptor`, computing it on first use.
    /// Viewport-mode windows resolve against the viewport height itself.
    pub fn resolve(
        &mut self,
        descriptor: &AnimationDescriptor,
        container_height: f64,
        viewport_height: f64,
    ) -> Window {
        *self
            .entries
            .entry(PositionKey::for_descriptor(descriptor))
            .or_insert_with(|| {
                let reference = match descriptor.mode {
                    ScrollReference::Viewport => viewport_height,
                    ScrollReference::Container => container_height,
                };
                Window {
                    start: parse_position(&descriptor.start, reference, viewport_height, descriptor.mode),
                    end: parse_position(&descriptor.end, reference, viewport_height, descriptor.mode),
                }
            })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every window computed for `selector`.
    pub fn evict_selector(&mut self, selector: &str) {
        self.entries.retain(|key, _| key.selector != selector);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_float_reads_leading_numbers() {
        assert_eq!(parse_float("50vh"), Some(50.0));
        assert_eq!(parse_float("  -12.5%"), Some(-12.5));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("3."), Some(3.0));
        assert_eq!(parse_float("1e2px"), Some(100.0));
        assert_eq!(parse_float("2em"), Some(2.0));
        assert_eq!(parse_float("vh"), None);
        assert_eq!(parse_float("-"), None);
        assert_eq!(parse_float(""), None);
    }

    #[test]
    fn percentages_become_fractions() {
        let c = ScrollReference::Container;
        assert_eq!(parse_position(&Bound::Number(25.0), 3000.0, 1000.0, c), 0.25);
        assert_eq!(parse_position(&Bound::from("100"), 3000.0, 1000.0, c), 1.0);
        assert_eq!(parse_position(&Bound::from("40%"), 3000.0, 1000.0, c), 0.4);
        assert_eq!(parse_position(&Bound::from("60"), 3000.0, 1000.0, c), 0.6);
        assert_eq!(parse_position(&Bound::from("nonsense"), 3000.0, 1000.0, c), 0.0);
    }

    #[test]
    fn container_vh_is_share_of_scrollable_distance() {
        // 3000px container in a 1000px viewport scrolls 200vh.
        let c = ScrollReference::Container;
        assert_eq!(parse_position(&Bound::from("50vh"), 3000.0, 1000.0, c), 0.25);
        assert_eq!(parse_position(&Bound::from("200vh"), 3000.0, 1000.0, c), 1.0);
        // A container that fits never scrolls.
        assert_eq!(parse_position(&Bound::from("50vh"), 800.0, 1000.0, c), 0.0);
    }

    #[test]
    fn viewport_vh_scales_by_reference() {
        let v = ScrollReference::Viewport;
        assert_eq!(parse_position(&Bound::from("50vh"), 1000.0, 1000.0, v), 0.5);
        assert_eq!(parse_position(&Bound::from("50vh"), 2000.0, 1000.0, v), 0.25);
    }

    #[test]
    fn window_mapping_clamps() {
        let w = Window { start: 0.2, end: 0.6 };
        assert_eq!(w.local_progress(0.0), 0.0);
        assert!((w.local_progress(0.4) - 0.5).abs() < 1e-12);
        assert_eq!(w.local_progress(0.9), 1.0);

        let step = Window { start: 0.5, end: 0.5 };
        assert_eq!(step.local_progress(0.49), 0.0);
        assert_eq!(step.local_progress(0.5), 1.0);
    }

    #[test]
    fn cache_is_keyed_by_selector_bounds_and_mode() {
        let mut cache = PositionCache::default();
        let a = AnimationDescriptor::new(".a", "x", 0.0, 1.0, "50vh", "100vh");
        let b = AnimationDescriptor::new(".b", "x", 0.0, 1.0, "50vh", "100vh");

        let first = cache.resolve(&a, 3000.0, 1000.0);
        // A different container height does not recompute a cached entry.
        assert_eq!(cache.resolve(&a, 9000.0, 1000.0), first);
        cache.resolve(&b, 3000.0, 1000.0);
        assert_eq!(cache.len(), 2);

        cache.evict_selector(".a");
        assert_eq!(cache.len(), 1);
        assert_ne!(cache.resolve(&a, 9000.0, 1000.0), first);

        cache.clear();
        assert!(cache.is_empty());
    }
}
