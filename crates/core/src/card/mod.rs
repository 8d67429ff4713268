//! State of the floating "card copy" overlay: the enlarged copy of a card
//! image shown over the page while a card is hovered or opened.

use serde::{Deserialize, Serialize};

/// What the overlay currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardCopyData {
    pub image_index: usize,
    pub image_src: String,
    pub rect_width: String,
    pub rect_height: String,
}

impl Default for CardCopyData {
    fn default() -> Self {
        Self {
            image_index: 0,
            image_src: String::new(),
            rect_width: "15rem".to_string(),
            rect_height: "20rem".to_string(),
        }
    }
}

type Observer = Box<dyn Fn(&CardCopyData, bool)>;

/// Overlay state shared by the cards of one page.
///
/// `show` replaces the data wholesale; `hide` only flips visibility, so the
/// last shown data stays readable while the overlay animates out.
#[derive(Default)]
pub struct CardCopy {
    data: CardCopyData,
    visible: bool,
    observers: Vec<Observer>,
}

impl CardCopy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, data: CardCopyData) {
        self.data = data;
        self.visible = true;
        self.notify();
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.notify();
    }

    pub fn data(&self) -> &CardCopyData {
        &self.data
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Call `observer` with the new state after every `show` and `hide`.
    pub fn subscribe(&mut self, observer: impl Fn(&CardCopyData, bool) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer(&self.data, self.visible);
        }
    }
}

impl std::fmt::Debug for CardCopy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardCopy")
            .field("data", &self.data)
            .field("visible", &self.visible)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn starts_hidden_with_default_rect() {
        let card = CardCopy::new();
        assert!(!card.is_visible());
        assert_eq!(card.data().rect_width, "15rem");
        assert_eq!(card.data().rect_height, "20rem");
        assert_eq!(card.data().image_src, "");
    }

    #[test]
    fn show_replaces_everything() {
        let mut card = CardCopy::new();
        card.show(CardCopyData {
            image_index: 3,
            image_src: "/assets/a.webp".into(),
            rect_width: "300px".into(),
            rect_height: "400px".into(),
        });
        card.show(CardCopyData {
            image_index: 1,
            ..Default::default()
        });

        assert_eq!(
            card.data(),
            &CardCopyData {
                image_index: 1,
                image_src: String::new(),
                rect_width: "15rem".into(),
                rect_height: "20rem".into(),
            }
        );
    }

    #[test]
    fn hide_keeps_last_data() {
        let mut card = CardCopy::new();
        card.show(CardCopyData {
            image_index: 2,
            image_src: "x".into(),
            ..Default::default()
        });
        card.hide();
        assert!(!card.is_visible());
        assert_eq!(card.data().image_index, 2);

        card.hide();
        assert!(!card.is_visible());
    }

    #[test]
    fn observers_see_each_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut card = CardCopy::new();
        let sink = Rc::clone(&seen);
        card.subscribe(move |data, visible| sink.borrow_mut().push((data.image_index, visible)));

        card.show(CardCopyData {
            image_index: 4,
            ..Default::default()
        });
        card.hide();

        assert_eq!(*seen.borrow(), vec![(4, true), (4, false)]);
    }

    #[test]
    fn deserializes_partial_payload() {
        let data: CardCopyData =
            serde_json::from_str(r#"{"imageIndex":5,"imageSrc":"/b.webp"}"#).unwrap();
        assert_eq!(data.image_index, 5);
        assert_eq!(data.rect_width, "15rem");
    }
}
