//! A headless [`Host`]: an HTML document laid out at a fixed viewport, with
//! a scroll offset, a frame queue and a record of every property write.
//!
//! Writes are recorded, not rendered; `style.width`/`style.height` writes do
//! not trigger relayout.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::css::selector::{ElementFacts, SelectorList};
use crate::css::{self, Viewport};
use crate::dom::{self, DomNode};
use crate::host::{ElementId, FrameHandle, Host, HostEvent, PropertyPath};
use crate::layout::{self, Bounds, LayoutNode};
use crate::scroll::ScrollAnimations;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("layout failed: {0}")]
    Layout(#[from] taffy::TaffyError),
}

#[derive(Debug, Clone)]
struct PageElement {
    bounds: Bounds,
    text: String,
}

pub struct HeadlessPage {
    html: String,
    viewport: Viewport,
    elements: Vec<PageElement>,
    facts: Vec<ElementFacts>,
    document_height: f64,
    scroll_y: f64,
    listeners: HashSet<HostEvent>,
    next_frame: u64,
    pending_frames: Vec<FrameHandle>,
    writes: HashMap<ElementId, BTreeMap<String, String>>,
    write_count: usize,
}

impl HeadlessPage {
    /// Parse and lay out `html` at the given viewport size.
    pub fn parse(html: &str, viewport_width: f64, viewport_height: f64) -> Result<Self, PageError> {
        let mut page = Self {
            html: html.to_string(),
            viewport: Viewport {
                width: viewport_width as f32,
                height: viewport_height as f32,
            },
            elements: Vec::new(),
            facts: Vec::new(),
            document_height: 0.0,
            scroll_y: 0.0,
            listeners: HashSet::new(),
            next_frame: 1,
            pending_frames: Vec::new(),
            writes: HashMap::new(),
            write_count: 0,
        };
        page.relayout()?;
        Ok(page)
    }

    fn relayout(&mut self) -> Result<(), PageError> {
        let dom = dom::parse_html(&self.html);
        let styled = css::compute_styles(&dom, self.viewport);
        let root = layout::compute_layout(&styled, self.viewport)?;

        let mut elements = Vec::new();
        let mut facts = Vec::new();
        flatten(&root, None, &mut elements, &mut facts);
        // Written text survives a re-parse.
        for (id, props) in &self.writes {
            if let (Some(text), Some(element)) =
                (props.get("textContent"), elements.get_mut(id.0 as usize))
            {
                element.text = text.clone();
            }
        }
        self.document_height = f64::from(root.bounds.height);
        self.elements = elements;
        self.facts = facts;
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
        Ok(())
    }

    /// Change the viewport size and lay the document out again. Element
    /// handles stay valid since the document structure does not change.
    pub fn resize(&mut self, viewport_width: f64, viewport_height: f64) -> Result<(), PageError> {
        self.viewport = Viewport {
            width: viewport_width as f32,
            height: viewport_height as f32,
        };
        self.relayout()
    }

    pub fn document_height(&self) -> f64 {
        self.document_height
    }

    fn max_scroll(&self) -> f64 {
        (self.document_height - f64::from(self.viewport.height)).max(0.0)
    }

    pub fn is_listening(&self, event: HostEvent) -> bool {
        self.listeners.contains(&event)
    }

    pub fn pending_frames(&self) -> usize {
        self.pending_frames.len()
    }

    /// Hand every queued frame to `engine`, as the browser would before the
    /// next paint. Frames requested while flushing wait for the next call.
    pub fn flush_frames(&mut self, engine: &mut ScrollAnimations) {
        let frames = std::mem::take(&mut self.pending_frames);
        for handle in frames {
            engine.on_frame(self, handle);
        }
    }

    /// Scroll the window and notify `engine` if it listens for scrolling.
    pub fn dispatch_scroll(&mut self, engine: &mut ScrollAnimations, y: f64) {
        self.scroll_to(y);
        if self.is_listening(HostEvent::Scroll) {
            engine.handle_scroll(self);
        }
    }

    /// Resize the viewport and notify `engine` if it listens for resizes.
    pub fn dispatch_resize(
        &mut self,
        engine: &mut ScrollAnimations,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Result<(), PageError> {
        self.resize(viewport_width, viewport_height)?;
        if self.is_listening(HostEvent::Resize) {
            engine.handle_resize(self);
        }
        Ok(())
    }

    /// Last value written to `property` (rendered path, e.g. `style.opacity`).
    pub fn property(&self, element: ElementId, property: &str) -> Option<&str> {
        self.writes
            .get(&element)
            .and_then(|props| props.get(property))
            .map(String::as_str)
    }

    /// Convenience lookup by selector.
    pub fn property_of(&self, selector: &str, property: &str) -> Option<&str> {
        self.query_selector(selector)
            .and_then(|id| self.property(id, property))
    }

    /// Total number of property writes since the page was created.
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    pub fn text_content(&self, element: ElementId) -> Option<&str> {
        self.element(element).map(|e| e.text.as_str())
    }

    pub fn bounds(&self, element: ElementId) -> Option<Bounds> {
        self.element(element).map(|e| e.bounds)
    }

    fn element(&self, element: ElementId) -> Option<&PageElement> {
        self.elements.get(element.0 as usize)
    }
}

/// Pre-order walk over elements; an element's index is its `ElementId`.
fn flatten(
    node: &LayoutNode<'_>,
    parent: Option<usize>,
    elements: &mut Vec<PageElement>,
    facts: &mut Vec<ElementFacts>,
) {
    let parent = if node.node.is_element() {
        facts.push(element_facts(node.node, parent));
        elements.push(PageElement {
            bounds: node.bounds,
            text: node.node.text_content(),
        });
        Some(elements.len() - 1)
    } else {
        parent
    };
    for child in &node.children {
        flatten(child, parent, elements, facts);
    }
}

fn element_facts(node: &DomNode, parent: Option<usize>) -> ElementFacts {
    ElementFacts {
        tag: node.tag.clone(),
        id: node.id().map(String::from),
        classes: node.classes(),
        attributes: node.attributes.clone(),
        parent,
    }
}

impl Host for HeadlessPage {
    fn viewport_width(&self) -> f64 {
        f64::from(self.viewport.width)
    }

    fn viewport_height(&self) -> f64 {
        f64::from(self.viewport.height)
    }

    fn page_offset(&self) -> f64 {
        self.scroll_y
    }

    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        let selector = SelectorList::parse(selector)?;
        (0..self.facts.len())
            .find(|&idx| selector.matches(&self.facts, idx))
            .map(|idx| ElementId(idx as u32))
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.facts
            .iter()
            .position(|f| f.id.as_deref() == Some(id))
            .map(|idx| ElementId(idx as u32))
    }

    fn bounding_top(&self, element: ElementId) -> f64 {
        self.element(element)
            .map(|e| f64::from(e.bounds.y) - self.scroll_y)
            .unwrap_or(0.0)
    }

    fn offset_height(&self, element: ElementId) -> f64 {
        self.element(element)
            .map(|e| f64::from(e.bounds.height))
            .unwrap_or(0.0)
    }

    fn offset_top(&self, element: ElementId) -> f64 {
        self.element(element)
            .map(|e| f64::from(e.bounds.y))
            .unwrap_or(0.0)
    }

    fn write_property(&mut self, element: ElementId, path: &PropertyPath, value: &str) {
        if self.element(element).is_none() {
            return;
        }
        if matches!(path, PropertyPath::Field(name) if name == "textContent") {
            if let Some(e) = self.elements.get_mut(element.0 as usize) {
                e.text = value.to_string();
            }
        }
        self.writes
            .entry(element)
            .or_default()
            .insert(path.to_string(), value.to_string());
        self.write_count += 1;
    }

    fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_frame);
        self.next_frame += 1;
        self.pending_frames.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending_frames.retain(|h| *h != handle);
    }

    fn listen(&mut self, event: HostEvent) {
        self.listeners.insert(event);
    }

    fn unlisten(&mut self, event: HostEvent) {
        self.listeners.remove(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <header id="top" style="height: 200px"><h1 class="title">Studio</h1></header>
            <section id="work" class="panel" style="height: 1000px"></section>
            <footer id="contacts" style="height: 400px"></footer>
        </body></html>
    "#;

    #[test]
    fn queries_by_selector_and_id() {
        let page = HeadlessPage::parse(PAGE, 1280.0, 800.0).unwrap();
        let work = page.query_selector(".panel").unwrap();
        assert_eq!(page.element_by_id("work"), Some(work));
        assert_eq!(page.offset_top(work), 200.0);
        assert_eq!(page.offset_height(work), 1000.0);
        assert!(page.query_selector("#missing").is_none());
        assert_eq!(
            page.query_selector("header .title").and_then(|id| page.text_content(id)),
            Some("Studio")
        );
    }

    #[test]
    fn scrolling_moves_bounding_rects_and_clamps() {
        let mut page = HeadlessPage::parse(PAGE, 1280.0, 800.0).unwrap();
        assert_eq!(page.document_height(), 1600.0);
        let contacts = page.element_by_id("contacts").unwrap();

        page.scroll_to(500.0);
        assert_eq!(page.bounding_top(contacts), 700.0);

        page.scroll_to(10_000.0);
        assert_eq!(page.page_offset(), 800.0);
        page.scroll_to(-5.0);
        assert_eq!(page.page_offset(), 0.0);
    }

    #[test]
    fn records_writes_by_rendered_path() {
        let mut page = HeadlessPage::parse(PAGE, 1280.0, 800.0).unwrap();
        let top = page.element_by_id("top").unwrap();
        page.write_property(top, &PropertyPath::parse("style.opacity").unwrap(), "0.5");
        page.write_property(top, &PropertyPath::parse("height").unwrap(), "10px");
        assert_eq!(page.property(top, "style.opacity"), Some("0.5"));
        assert_eq!(page.property(top, "style.height"), Some("10px"));
        assert_eq!(page.write_count(), 2);
    }

    #[test]
    fn written_text_survives_resize() {
        let mut page = HeadlessPage::parse(PAGE, 1280.0, 800.0).unwrap();
        let title = page.query_selector(".title").unwrap();
        page.write_property(title, &PropertyPath::parse("textContent").unwrap(), "42%");
        assert_eq!(page.text_content(title), Some("42%"));

        page.resize(600.0, 400.0).unwrap();
        assert_eq!(page.text_content(title), Some("42%"));
        assert_eq!(page.property(title, "textContent"), Some("42%"));
    }

    #[test]
    fn cancelled_frames_leave_the_queue() {
        let mut page = HeadlessPage::parse(PAGE, 1280.0, 800.0).unwrap();
        let a = page.request_frame();
        let b = page.request_frame();
        assert_ne!(a, b);
        page.cancel_frame(a);
        assert_eq!(page.pending_frames(), 1);
    }
}
