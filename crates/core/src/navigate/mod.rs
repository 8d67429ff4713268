//! Jumping the viewport to named page sections.

use serde::Deserialize;

use crate::host::Host;
use crate::scroll::position::parse_float;

/// Extra distance added to a section's top edge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Pixels(f64),
    /// `"50vh"`, `"10%"` (both of viewport height), `"24px"` or a bare number.
    Text(String),
}

impl Default for Offset {
    fn default() -> Self {
        Offset::Pixels(0.0)
    }
}

impl From<f64> for Offset {
    fn from(px: f64) -> Self {
        Offset::Pixels(px)
    }
}

impl From<&str> for Offset {
    fn from(s: &str) -> Self {
        Offset::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScrollToOptions {
    #[serde(default)]
    pub offset: Offset,
}

/// Convert an offset into pixels. Unparseable strings count as 0.
pub fn parse_offset(offset: &Offset, viewport_height: f64) -> f64 {
    let text = match offset {
        Offset::Pixels(px) => return *px,
        Offset::Text(text) => text.as_str(),
    };
    let number = parse_float(text).unwrap_or(0.0);
    if text.ends_with("vh") || text.ends_with('%') {
        number * viewport_height / 100.0
    } else {
        number
    }
}

/// Jump to the element with id `section_id`, shifted by `options.offset`.
/// Returns the target position, or `None` when the section does not exist.
pub fn scroll_to_section(host: &mut dyn Host, section_id: &str, options: &ScrollToOptions) -> Option<f64> {
    let element = host.element_by_id(section_id)?;
    let target = host.offset_top(element) + parse_offset(&options.offset, host.viewport_height());
    tracing::trace!(section = section_id, target, "scrolling to section");
    host.scroll_to(target);
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_convert_to_pixels() {
        assert_eq!(parse_offset(&Offset::from("50vh"), 800.0), 400.0);
        assert_eq!(parse_offset(&Offset::from("25%"), 800.0), 200.0);
        assert_eq!(parse_offset(&Offset::from("-64px"), 800.0), -64.0);
        assert_eq!(parse_offset(&Offset::from("12"), 800.0), 12.0);
        assert_eq!(parse_offset(&Offset::from(120.0), 800.0), 120.0);
        assert_eq!(parse_offset(&Offset::from("bogus"), 800.0), 0.0);
    }

    #[test]
    fn options_deserialize_either_form() {
        let opts: ScrollToOptions = serde_json::from_str(r#"{"offset": "-10vh"}"#).unwrap();
        assert_eq!(opts.offset, Offset::Text("-10vh".into()));
        let opts: ScrollToOptions = serde_json::from_str(r#"{"offset": 80}"#).unwrap();
        assert_eq!(opts.offset, Offset::Pixels(80.0));
        let opts: ScrollToOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.offset, Offset::Pixels(0.0));
    }
}
