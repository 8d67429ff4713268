//! Declarative animation configuration.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::easing::Easing;
use crate::host::ElementMut;

/// A start or end value: a number, or a string switched discretely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnimValue {
    Number(f64),
    Text(String),
}

impl AnimValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnimValue::Number(n) => Some(*n),
            AnimValue::Text(_) => None,
        }
    }
}

impl fmt::Display for AnimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimValue::Number(n) => f.write_str(&format_number(*n)),
            AnimValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for AnimValue {
    fn from(n: f64) -> Self {
        AnimValue::Number(n)
    }
}

impl From<&str> for AnimValue {
    fn from(s: &str) -> Self {
        AnimValue::Text(s.to_string())
    }
}

/// Render a number the way a style value is written: no trailing `.0`,
/// no negative zero.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// A window edge: a percentage as a number, or a string with an optional
/// `vh` / `%` suffix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Number(f64),
    Text(String),
}

impl Bound {
    /// The numeric part of a `vh` bound.
    pub fn vh(&self) -> Option<f64> {
        match self {
            Bound::Text(s) if s.ends_with("vh") => Some(super::position::parse_float(s).unwrap_or(0.0)),
            _ => None,
        }
    }

    /// Stable text form used in cache keys.
    pub fn key(&self) -> String {
        match self {
            Bound::Number(n) => format_number(*n),
            Bound::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for Bound {
    fn from(n: f64) -> Self {
        Bound::Number(n)
    }
}

impl From<&str> for Bound {
    fn from(s: &str) -> Self {
        Bound::Text(s.to_string())
    }
}

/// What scroll signal a descriptor's window is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollReference {
    /// Global progress through the configured container.
    #[default]
    Container,
    /// The target element's own position within the viewport.
    Viewport,
}

pub type Handler = Arc<dyn Fn(&mut ElementMut<'_>, f64, &AnimationDescriptor) + Send + Sync>;

/// How a computed value reaches the element.
#[derive(Clone, Default)]
pub enum Application {
    /// Queue a write of the interpolated value to `property`.
    #[default]
    Default,
    /// Hand the element and eased progress to the handler instead.
    Custom(Handler),
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Application::Default => f.write_str("Default"),
            Application::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One scroll-driven property animation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDescriptor {
    pub selector: String,
    pub property: String,
    pub from: AnimValue,
    pub to: AnimValue,
    pub start: Bound,
    pub end: Bound,
    #[serde(default)]
    pub easing: Option<Easing>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub mode: ScrollReference,
    #[serde(skip)]
    pub apply: Application,
}

impl AnimationDescriptor {
    pub fn new(
        selector: impl Into<String>,
        property: impl Into<String>,
        from: impl Into<AnimValue>,
        to: impl Into<AnimValue>,
        start: impl Into<Bound>,
        end: impl Into<Bound>,
    ) -> Self {
        Self {
            selector: selector.into(),
            property: property.into(),
            from: from.into(),
            to: to.into(),
            start: start.into(),
            end: end.into(),
            easing: None,
            unit: None,
            mode: ScrollReference::Container,
            apply: Application::Default,
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn mode(mut self, mode: ScrollReference) -> Self {
        self.mode = mode;
        self
    }

    pub fn custom(
        mut self,
        handler: impl Fn(&mut ElementMut<'_>, f64, &AnimationDescriptor) + Send + Sync + 'static,
    ) -> Self {
        self.apply = Application::Custom(Arc::new(handler));
        self
    }

    /// Whether either window edge is expressed in `vh`.
    pub fn is_vh_window(&self) -> bool {
        self.start.vh().is_some() || self.end.vh().is_some()
    }

    /// Value at eased progress `t`: interpolated when both ends are numbers,
    /// otherwise `from` until `t` reaches 1.
    pub fn value_at(&self, t: f64) -> String {
        match (self.from.as_number(), self.to.as_number()) {
            (Some(from), Some(to)) => {
                let value = from + (to - from) * t;
                format!("{}{}", format_number(value), self.unit.as_deref().unwrap_or(""))
            }
            _ if t >= 1.0 => self.to.to_string(),
            _ => self.from.to_string(),
        }
    }
}

pub type ProgressFn = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Source of global progress.
#[derive(Clone, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Timeline {
    /// Progress through the configured container element.
    #[default]
    Container,
    /// Window scroll offset over `end_value` (viewport height when unset).
    #[serde(rename_all = "camelCase")]
    PageOffset {
        #[serde(default)]
        end_value: Option<f64>,
    },
    /// Caller-supplied progress, clamped to [0, 1].
    #[serde(skip)]
    Custom(ProgressFn),
}

impl Timeline {
    pub fn custom(f: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        Timeline::Custom(Arc::new(f))
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeline::Container => f.write_str("Container"),
            Timeline::PageOffset { end_value } => f
                .debug_struct("PageOffset")
                .field("end_value", end_value)
                .finish(),
            Timeline::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Selector of the element whose scroll-through drives progress.
    pub container: String,
    #[serde(default)]
    pub animations: Vec<AnimationDescriptor>,
    #[serde(default)]
    pub timeline: Timeline,
}

impl EngineConfig {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            animations: Vec::new(),
            timeline: Timeline::Container,
        }
    }

    pub fn animation(mut self, descriptor: AnimationDescriptor) -> Self {
        self.animations.push(descriptor);
        self
    }

    pub fn timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = timeline;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_values_interpolate_with_unit() {
        let d = AnimationDescriptor::new(".a", "style.width", 0.0, 200.0, 0.0, 100.0).unit("px");
        assert_eq!(d.value_at(0.0), "0px");
        assert_eq!(d.value_at(0.25), "50px");
        assert_eq!(d.value_at(1.0), "200px");
    }

    #[test]
    fn text_values_switch_at_the_end() {
        let d = AnimationDescriptor::new(".a", "style.visibility", "hidden", "visible", 0.0, 100.0);
        assert_eq!(d.value_at(0.0), "hidden");
        assert_eq!(d.value_at(0.999), "hidden");
        assert_eq!(d.value_at(1.0), "visible");
    }

    #[test]
    fn mixed_values_switch_discretely() {
        let d = AnimationDescriptor::new(".a", "style.zIndex", 1.0, "auto", 0.0, 100.0);
        assert_eq!(d.value_at(0.5), "1");
        assert_eq!(d.value_at(1.0), "auto");
    }

    #[test]
    fn vh_windows_are_detected_on_either_edge() {
        assert!(AnimationDescriptor::new(".a", "x", 0.0, 1.0, "50vh", 100.0).is_vh_window());
        assert!(AnimationDescriptor::new(".a", "x", 0.0, 1.0, 0.0, "120vh").is_vh_window());
        assert!(!AnimationDescriptor::new(".a", "x", 0.0, 1.0, "10%", "90%").is_vh_window());
    }

    #[test]
    fn config_deserializes_from_json() {
        let config: EngineConfig = serde_json::from_str(
            r#"{
                "container": ".scroll-container",
                "timeline": { "mode": "pageOffset", "endValue": 1200 },
                "animations": [
                    {
                        "selector": ".hero",
                        "property": "style.opacity",
                        "from": 1, "to": 0,
                        "start": "0", "end": "50vh",
                        "easing": "easeOut"
                    },
                    {
                        "selector": ".card",
                        "property": "style.transform",
                        "from": "none", "to": "scale(1.1)",
                        "start": 20, "end": 80,
                        "mode": "viewport"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.container, ".scroll-container");
        assert!(matches!(config.timeline, Timeline::PageOffset { end_value: Some(v) } if v == 1200.0));
        assert_eq!(config.animations.len(), 2);
        assert_eq!(config.animations[0].end, Bound::Text("50vh".into()));
        assert!(matches!(config.animations[0].easing, Some(Easing::EaseOut)));
        assert_eq!(config.animations[1].mode, ScrollReference::Viewport);
        assert_eq!(config.animations[1].from, AnimValue::Text("none".into()));
    }
}
