//! Scroll-linked animation engine.
//!
//! A [`ScrollAnimations`] instance turns scroll position (or a custom
//! progress source) into per-element property values. The host drives it:
//! scroll and resize events record the latest input and request at most one
//! animation frame; the frame callback recomputes every descriptor, reading
//! all geometry before writing any value.

pub mod descriptor;
pub mod easing;
pub mod position;

use std::collections::HashMap;

use tracing::{debug, trace};

pub use descriptor::{
    AnimValue, AnimationDescriptor, Application, Bound, EngineConfig, ScrollReference, Timeline,
};
pub use easing::Easing;
pub use position::{PositionCache, Window};

use crate::host::{ElementId, ElementMut, Environment, FrameHandle, Host, HostEvent, PropertyPath};

/// Global progress and the container height it was derived from.
#[derive(Debug, Clone, Copy)]
struct Progress {
    value: f64,
    container_height: f64,
}

pub struct ScrollAnimations {
    config: EngineConfig,
    environment: Environment,

    elements: HashMap<String, ElementId>,
    positions: PositionCache,
    container: Option<ElementId>,

    destroyed: bool,
    scheduled_frame: Option<FrameHandle>,
    viewport_height: f64,
    page_offset: f64,

    scroll_percent: u32,
    scroll_vh: f64,
}

impl ScrollAnimations {
    pub fn new(config: EngineConfig, environment: Environment) -> Self {
        Self {
            config,
            environment,
            elements: HashMap::new(),
            positions: PositionCache::default(),
            container: None,
            destroyed: false,
            scheduled_frame: None,
            viewport_height: 0.0,
            page_offset: 0.0,
            scroll_percent: 0,
            scroll_vh: 0.0,
        }
    }

    /// Progress through the timeline as a rounded percentage.
    pub fn scroll_percent(&self) -> u32 {
        self.scroll_percent
    }

    /// Viewport heights scrolled within the container, two decimals.
    pub fn scroll_vh(&self) -> f64 {
        self.scroll_vh
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn has_pending_frame(&self) -> bool {
        self.scheduled_frame.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Attach listeners and schedule the first recomputation. Does nothing
    /// when rendering without a document.
    pub fn init(&mut self, host: &mut dyn Host) {
        if !self.environment.is_browser() || self.destroyed {
            return;
        }
        self.viewport_height = host.viewport_height();
        self.page_offset = host.page_offset();

        host.listen(HostEvent::Scroll);
        host.listen(HostEvent::Resize);
        debug!(
            container = %self.config.container,
            animations = self.config.animations.len(),
            "scroll animations attached"
        );

        self.request_update(host);
    }

    /// Stop all frame work, detach listeners and drop both caches.
    pub fn destroy(&mut self, host: &mut dyn Host) {
        self.destroyed = true;
        if !self.environment.is_browser() {
            return;
        }
        if let Some(handle) = self.scheduled_frame.take() {
            host.cancel_frame(handle);
        }
        host.unlisten(HostEvent::Scroll);
        host.unlisten(HostEvent::Resize);

        self.elements.clear();
        self.positions.clear();
        self.container = None;
        debug!(container = %self.config.container, "scroll animations detached");
    }

    pub fn handle_scroll(&mut self, host: &mut dyn Host) {
        self.page_offset = host.page_offset();
        self.request_update(host);
    }

    /// Viewport-dependent windows and the container box are stale after a
    /// resize.
    pub fn handle_resize(&mut self, host: &mut dyn Host) {
        self.viewport_height = host.viewport_height();
        self.positions.clear();
        self.container = None;
        trace!(viewport_height = self.viewport_height, "position cache cleared on resize");
        self.request_update(host);
    }

    /// Frame callback. Stale or foreign handles and frames arriving after
    /// `destroy` are ignored.
    pub fn on_frame(&mut self, host: &mut dyn Host, handle: FrameHandle) {
        if self.destroyed || self.scheduled_frame != Some(handle) {
            return;
        }
        self.scheduled_frame = None;
        self.update(host);
    }

    fn request_update(&mut self, host: &mut dyn Host) {
        if self.destroyed || !self.environment.is_browser() || self.scheduled_frame.is_some() {
            return;
        }
        self.scheduled_frame = Some(host.request_frame());
    }

    /// Forget cached lookups for one selector, or for everything.
    pub fn clear_element_cache(&mut self, selector: Option<&str>) {
        match selector {
            Some(selector) => {
                self.elements.remove(selector);
                self.positions.evict_selector(selector);
            }
            None => {
                self.elements.clear();
                self.positions.clear();
            }
        }
    }

    /// Resolved window of `descriptor`, memoized until the next resize.
    pub fn positions(&mut self, descriptor: &AnimationDescriptor, container_height: f64) -> Window {
        self.positions
            .resolve(descriptor, container_height, self.viewport_height)
    }

    /// Recompute and apply every animation now.
    pub fn update(&mut self, host: &mut dyn Host) {
        if self.destroyed || !self.environment.is_browser() {
            return;
        }
        let Some(progress) = self.global_progress(host) else {
            return;
        };

        self.scroll_percent = (progress.value * 100.0).round() as u32;
        let max_scroll = (progress.container_height - self.viewport_height).max(0.0);
        self.scroll_vh = if max_scroll > 0.0 {
            (progress.value * max_scroll * 100.0 / self.viewport_height * 100.0).round() / 100.0
        } else {
            0.0
        };

        // Reads first; every write waits for the second pass.
        let mut writes: Vec<(ElementId, PropertyPath, String)> = Vec::new();
        let mut custom: Vec<(usize, ElementId, f64)> = Vec::new();

        for (index, animation) in self.config.animations.iter().enumerate() {
            let Some(element) = lookup_element(&mut self.elements, host, &animation.selector) else {
                continue;
            };

            let local = match animation.mode {
                ScrollReference::Viewport => {
                    let window =
                        self.positions
                            .resolve(animation, progress.container_height, self.viewport_height);
                    let element_top = self.page_offset + host.bounding_top(element);
                    let viewport_progress =
                        (self.page_offset - element_top + self.viewport_height) / self.viewport_height;
                    window.local_progress(viewport_progress)
                }
                ScrollReference::Container if animation.is_vh_window() => {
                    let start = animation.start.vh().unwrap_or(0.0);
                    let end = animation.end.vh().unwrap_or(100.0);
                    position::map_range(self.scroll_vh, start, end)
                }
                ScrollReference::Container => {
                    let window =
                        self.positions
                            .resolve(animation, progress.container_height, self.viewport_height);
                    window.local_progress(progress.value)
                }
            };

            let eased = animation
                .easing
                .as_ref()
                .map_or(local, |easing| easing.apply(local));

            match &animation.apply {
                Application::Custom(_) => custom.push((index, element, eased)),
                Application::Default => {
                    if let Some(path) = PropertyPath::parse(&animation.property) {
                        writes.push((element, path, animation.value_at(eased)));
                    }
                }
            }
        }

        for (index, element, eased) in custom {
            let animation = &self.config.animations[index];
            if let Application::Custom(handler) = &animation.apply {
                let mut target = ElementMut::new(host, element);
                handler(&mut target, eased, animation);
            }
        }
        for (element, path, value) in &writes {
            host.write_property(*element, path, value);
        }
    }

    fn global_progress(&mut self, host: &dyn Host) -> Option<Progress> {
        match &self.config.timeline {
            Timeline::Custom(progress) => Some(Progress {
                value: clamp_unit(progress()),
                container_height: 1.0,
            }),
            Timeline::PageOffset { end_value } => {
                let end = end_value
                    .filter(|v| *v != 0.0)
                    .unwrap_or(self.viewport_height);
                let value = if end > 0.0 {
                    clamp_unit(self.page_offset / end)
                } else {
                    0.0
                };
                Some(Progress {
                    value,
                    container_height: end,
                })
            }
            Timeline::Container => {
                if self.container.is_none() {
                    self.container = host.query_selector(&self.config.container);
                }
                let container = self.container?;

                let top = host.bounding_top(container);
                let container_height = host.offset_height(container);
                let distance = container_height - self.viewport_height;
                let value = if distance > 0.0 {
                    clamp_unit(-top / distance)
                } else if top <= 0.0 {
                    1.0
                } else {
                    0.0
                };
                Some(Progress {
                    value,
                    container_height,
                })
            }
        }
    }
}

/// Cached element lookup. Misses are retried on the next pass, since the
/// element may simply not be mounted yet.
fn lookup_element(
    cache: &mut HashMap<String, ElementId>,
    host: &dyn Host,
    selector: &str,
) -> Option<ElementId> {
    if let Some(id) = cache.get(selector) {
        return Some(*id);
    }
    let id = host.query_selector(selector)?;
    cache.insert(selector.to_string(), id);
    Some(id)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
