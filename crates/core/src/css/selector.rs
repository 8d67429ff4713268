/// Minimal selector engine backing `querySelector` on a headless page.
/// Supports: tag, .class, #id, [attr], [attr=value], *, descendant and
/// child combinators, and comma-separated lists. Pseudo-classes parse but
/// never match, since a headless page has no interaction state.
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

/// What a selector needs to know about one element.
#[derive(Debug, Clone, Default)]
pub struct ElementFacts {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: HashMap<String, String>,
    /// Index of the parent element in the same slice, if any.
    pub parent: Option<usize>,
}

/// A comma-separated selector list; matches when any entry does.
#[derive(Debug, Clone)]
pub struct SelectorList(Vec<Selector>);

/// Compound selectors joined by combinators, stored right to left.
#[derive(Debug, Clone)]
struct Selector {
    /// `steps[0]` is the subject; each later step is linked to the previous
    /// one by its combinator.
    steps: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    /// Placeholder on the subject step.
    Subject,
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
    universal: bool,
    /// Pseudo-classes never match on a static page.
    has_pseudo: bool,
}

impl SelectorList {
    pub fn parse(input: &str) -> Option<Self> {
        let selectors: Option<Vec<Selector>> = input
            .split(',')
            .map(|part| parse_selector(part.trim()))
            .collect();
        let selectors = selectors?;
        if selectors.is_empty() {
            None
        } else {
            Some(SelectorList(selectors))
        }
    }

    /// Whether `elements[index]` matches, using parent links for combinators.
    pub fn matches(&self, elements: &[ElementFacts], index: usize) -> bool {
        self.0.iter().any(|s| s.matches(elements, index))
    }
}

impl Selector {
    fn matches(&self, elements: &[ElementFacts], index: usize) -> bool {
        let Some(element) = elements.get(index) else {
            return false;
        };
        let Some((_, subject)) = self.steps.first() else {
            return false;
        };
        if !subject.matches(element) {
            return false;
        }
        self.match_ancestors(elements, element.parent, 1)
    }

    /// Match `steps[step..]` starting at `candidate`, backtracking over
    /// descendant combinators.
    fn match_ancestors(&self, elements: &[ElementFacts], candidate: Option<usize>, step: usize) -> bool {
        let Some((combinator, compound)) = self.steps.get(step) else {
            return true;
        };
        let mut current = candidate;
        while let Some(idx) = current {
            let element = &elements[idx];
            if compound.matches(element) && self.match_ancestors(elements, element.parent, step + 1) {
                return true;
            }
            if *combinator == Combinator::Child {
                return false;
            }
            current = element.parent;
        }
        false
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && !self.universal
            && !self.has_pseudo
    }

    fn matches(&self, element: &ElementFacts) -> bool {
        if self.has_pseudo {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(&element.tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.classes.contains(c)) {
            return false;
        }
        self.attributes.iter().all(|(name, expected)| {
            match (element.attributes.get(name), expected) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

fn parse_selector(input: &str) -> Option<Selector> {
    if input.is_empty() {
        return None;
    }

    // Left to right first, reversed at the end.
    let mut compounds: Vec<(Combinator, Compound)> = Vec::new();
    let mut current = Compound::default();
    let mut pending = Combinator::Subject;
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            '.' => {
                chars.next();
                current.classes.push(read_ident(&mut chars)?);
            }
            '#' => {
                chars.next();
                current.id = Some(read_ident(&mut chars)?);
            }
            '[' => {
                chars.next();
                current.attributes.push(read_attribute(&mut chars)?);
            }
            ':' => {
                chars.next();
                if chars.peek() == Some(&':') {
                    chars.next();
                }
                read_ident(&mut chars)?;
                skip_parenthesized(&mut chars);
                current.has_pseudo = true;
            }
            '*' => {
                chars.next();
                current.universal = true;
            }
            '>' | ' ' | '\t' | '\n' | '\r' => {
                let mut combinator = Combinator::Descendant;
                while let Some(&c) = chars.peek() {
                    if c == '>' {
                        combinator = Combinator::Child;
                    } else if !c.is_whitespace() {
                        break;
                    }
                    chars.next();
                }
                if current.is_empty() {
                    return None;
                }
                compounds.push((pending, std::mem::take(&mut current)));
                pending = combinator;
            }
            c if c.is_alphanumeric() || c == '-' || c == '_' => {
                current.tag = Some(read_ident(&mut chars)?.to_lowercase());
            }
            _ => return None,
        }
    }
    if current.is_empty() {
        return None;
    }
    compounds.push((pending, current));

    // Re-key combinators onto the right-hand side of each link, reading
    // from the subject outwards.
    let mut steps = Vec::with_capacity(compounds.len());
    let mut link = Combinator::Subject;
    for (combinator, compound) in compounds.into_iter().rev() {
        steps.push((link, compound));
        link = combinator;
    }
    Some(Selector { steps })
}

fn read_ident(chars: &mut Peekable<Chars>) -> Option<String> {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn read_attribute(chars: &mut Peekable<Chars>) -> Option<(String, Option<String>)> {
    let mut name = String::new();
    let mut value = None;
    loop {
        match chars.next()? {
            ']' => break,
            '=' => {
                let mut val = String::new();
                let quote = chars.peek().copied().filter(|q| *q == '"' || *q == '\'');
                if let Some(q) = quote {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == q {
                            break;
                        }
                        val.push(c);
                    }
                } else {
                    while let Some(&c) = chars.peek() {
                        if c == ']' {
                            break;
                        }
                        val.push(c);
                        chars.next();
                    }
                }
                value = Some(val.trim().to_string());
            }
            c => name.push(c),
        }
    }
    let name = name.trim().to_string();
    if name.is_empty() {
        None
    } else {
        Some((name, value))
    }
}

fn skip_parenthesized(chars: &mut Peekable<Chars>) {
    if chars.peek() != Some(&'(') {
        return;
    }
    let mut depth = 0;
    for c in chars.by_ref() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, id: Option<&str>, classes: &[&str], parent: Option<usize>) -> ElementFacts {
        ElementFacts {
            tag: tag.to_string(),
            id: id.map(String::from),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            attributes: HashMap::new(),
            parent,
        }
    }

    fn tree() -> Vec<ElementFacts> {
        let mut hero = element("section", Some("hero"), &["screen"], Some(0));
        hero.attributes.insert("data-scene".into(), "intro".into());
        vec![
            element("main", None, &[], None),
            hero,
            element("div", None, &["card", "wide"], Some(1)),
            element("h2", None, &["title"], Some(2)),
        ]
    }

    #[test]
    fn matches_simple_selectors() {
        let els = tree();
        assert!(SelectorList::parse("#hero").unwrap().matches(&els, 1));
        assert!(SelectorList::parse(".card.wide").unwrap().matches(&els, 2));
        assert!(SelectorList::parse("div.card").unwrap().matches(&els, 2));
        assert!(!SelectorList::parse("span.card").unwrap().matches(&els, 2));
        assert!(SelectorList::parse("[data-scene]").unwrap().matches(&els, 1));
        assert!(SelectorList::parse("[data-scene=\"intro\"]").unwrap().matches(&els, 1));
        assert!(!SelectorList::parse("[data-scene=outro]").unwrap().matches(&els, 1));
    }

    #[test]
    fn matches_combinators() {
        let els = tree();
        assert!(SelectorList::parse("#hero .title").unwrap().matches(&els, 3));
        assert!(SelectorList::parse("main h2").unwrap().matches(&els, 3));
        assert!(SelectorList::parse(".card > .title").unwrap().matches(&els, 3));
        assert!(!SelectorList::parse("#hero > .title").unwrap().matches(&els, 3));
        assert!(SelectorList::parse("main > section > div").unwrap().matches(&els, 2));
    }

    #[test]
    fn comma_lists_match_any() {
        let els = tree();
        let list = SelectorList::parse("footer, .title").unwrap();
        assert!(list.matches(&els, 3));
        assert!(!list.matches(&els, 0));
    }

    #[test]
    fn pseudo_classes_never_match() {
        let els = tree();
        assert!(!SelectorList::parse(".card:hover").unwrap().matches(&els, 2));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(SelectorList::parse("").is_none());
        assert!(SelectorList::parse(".").is_none());
        assert!(SelectorList::parse("div, ").is_none());
    }
}
