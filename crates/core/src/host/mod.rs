//! The document/window surface the presentation logic runs against.
//!
//! Everything the scroll engine and the navigator need from a browser is
//! expressed through [`Host`]. A real embedding forwards these calls to the
//! DOM; [`crate::page::HeadlessPage`] implements them over a parsed and laid
//! out HTML document.

use std::fmt;

/// Opaque handle to an element owned by the host document.
///
/// Holding an `ElementId` does not keep the element alive; hosts must
/// tolerate stale handles by returning neutral geometry and ignoring writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// Handle returned by [`Host::request_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Window events the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    Scroll,
    Resize,
}

/// Execution environment, decided by the embedder at construction time.
///
/// `Server` covers document-less rendering (SSR): lifecycle operations that
/// would touch the window become no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Browser,
    Server,
}

impl Environment {
    pub fn is_browser(self) -> bool {
        matches!(self, Environment::Browser)
    }
}

/// Where a property write lands on an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyPath {
    /// `object.field`, e.g. `style.opacity`.
    Nested { object: String, field: String },
    /// `width` / `height`, routed to the element's style.
    Style(String),
    /// Any other name, assigned directly on the element (`textContent`).
    Field(String),
}

impl PropertyPath {
    /// Resolve a descriptor property name. Dotted names keep only their first
    /// two segments; `None` when either of them is empty.
    pub fn parse(property: &str) -> Option<Self> {
        if property.contains('.') {
            let mut parts = property.split('.');
            let object = parts.next().unwrap_or_default();
            let field = parts.next().unwrap_or_default();
            if object.is_empty() || field.is_empty() {
                return None;
            }
            return Some(PropertyPath::Nested {
                object: object.to_string(),
                field: field.to_string(),
            });
        }
        match property {
            "width" | "height" => Some(PropertyPath::Style(property.to_string())),
            _ => Some(PropertyPath::Field(property.to_string())),
        }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyPath::Nested { object, field } => write!(f, "{}.{}", object, field),
            PropertyPath::Style(name) => write!(f, "style.{}", name),
            PropertyPath::Field(name) => f.write_str(name),
        }
    }
}

/// Browser primitives used by the scroll engine and navigator.
///
/// All geometry is in CSS pixels. `bounding_top` is relative to the current
/// viewport (like `getBoundingClientRect().top`); `offset_top` is relative to
/// the document.
pub trait Host {
    fn viewport_width(&self) -> f64;
    fn viewport_height(&self) -> f64;
    /// Current vertical scroll offset of the window.
    fn page_offset(&self) -> f64;

    /// First element matching `selector` in document order.
    fn query_selector(&self, selector: &str) -> Option<ElementId>;
    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    fn bounding_top(&self, element: ElementId) -> f64;
    fn offset_height(&self, element: ElementId) -> f64;
    fn offset_top(&self, element: ElementId) -> f64;

    fn write_property(&mut self, element: ElementId, path: &PropertyPath, value: &str);

    /// Jump the window to a vertical offset.
    fn scroll_to(&mut self, y: f64);

    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Register a passive listener for `event`.
    fn listen(&mut self, event: HostEvent);
    fn unlisten(&mut self, event: HostEvent);
}

/// An element borrowed together with its host, handed to custom
/// application handlers.
pub struct ElementMut<'a> {
    host: &'a mut dyn Host,
    id: ElementId,
}

impl<'a> ElementMut<'a> {
    pub fn new(host: &'a mut dyn Host, id: ElementId) -> Self {
        Self { host, id }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Write `value` to a property using descriptor addressing rules.
    pub fn set(&mut self, property: &str, value: &str) {
        if let Some(path) = PropertyPath::parse(property) {
            self.host.write_property(self.id, &path, value);
        }
    }

    pub fn offset_height(&self) -> f64 {
        self.host.offset_height(self.id)
    }

    pub fn viewport_height(&self) -> f64 {
        self.host.viewport_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_paths_keep_two_segments() {
        assert_eq!(
            PropertyPath::parse("style.transform.x"),
            Some(PropertyPath::Nested {
                object: "style".into(),
                field: "transform".into()
            })
        );
        assert_eq!(PropertyPath::parse(".opacity"), None);
        assert_eq!(PropertyPath::parse("style."), None);
    }

    #[test]
    fn size_properties_route_to_style() {
        let width = PropertyPath::parse("width").unwrap();
        assert_eq!(width, PropertyPath::Style("width".into()));
        assert_eq!(width.to_string(), "style.width");

        let text = PropertyPath::parse("textContent").unwrap();
        assert_eq!(text.to_string(), "textContent");
    }
}
