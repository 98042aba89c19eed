//! Compound selector parsing and matching.
//!
//! Tracker state targets may name a descendant with a CSS selector. Only the
//! compound subset is supported — a tag, classes, and an id stacked on one
//! element (`button.primary`, `.card#hero`) — because a target addresses a
//! single element, never a combinator chain.
//!
//! Selector forms follow [Selectors Level 4](https://www.w3.org/TR/selectors-4/):
//! type selectors (§ 5.1), class selectors (§ 6.6), and ID selectors (§ 6.7).

use crate::ElementData;

/// A single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// — matches on the element's tag name. Example: `div`.
    Type(String),
    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// — a full stop followed by an identifier. Example: `.hint`.
    Class(String),
    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// — a hash followed by an identifier. Example: `#hero`.
    Id(String),
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// — `*`, matches any element.
    Universal,
}

impl SimpleSelector {
    /// Check whether one condition holds for an element.
    fn matches(&self, element: &ElementData) -> bool {
        match self {
            SimpleSelector::Type(tag) => element.tag_name.eq_ignore_ascii_case(tag),
            SimpleSelector::Class(class) => element.has_class(class),
            SimpleSelector::Id(id) => element.id().is_some_and(|v| v == id),
            SimpleSelector::Universal => true,
        }
    }
}

/// A compound selector: several simple selectors that must all match the
/// same element.
///
/// [§ 4.1 Structure](https://www.w3.org/TR/selectors-4/#structure)
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The stacked conditions; all must hold.
    pub parts: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Check whether every part matches the element.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        self.parts.iter().all(|part| part.matches(element))
    }
}

/// Parse a compound selector.
///
/// Returns `None` for empty input, embedded whitespace (combinators are not
/// supported for state targets), or a dangling `.`/`#`.
#[must_use]
pub fn parse_compound_selector(text: &str) -> Option<CompoundSelector> {
    let text = text.trim();
    if text.is_empty() || text.contains(char::is_whitespace) {
        return None;
    }

    let mut parts = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '.' => {
                let _ = chars.next();
                let name = take_identifier(&mut chars);
                if name.is_empty() {
                    return None;
                }
                parts.push(SimpleSelector::Class(name));
            }
            '#' => {
                let _ = chars.next();
                let name = take_identifier(&mut chars);
                if name.is_empty() {
                    return None;
                }
                parts.push(SimpleSelector::Id(name));
            }
            '*' => {
                let _ = chars.next();
                parts.push(SimpleSelector::Universal);
            }
            _ => {
                let name = take_identifier(&mut chars);
                if name.is_empty() {
                    // Unsupported syntax (attribute selector, pseudo-class, ...)
                    return None;
                }
                parts.push(SimpleSelector::Type(name));
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(CompoundSelector { parts })
    }
}

/// Consume an identifier (letters, digits, `-`, `_`) from the stream.
fn take_identifier(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            name.push(c);
            let _ = chars.next();
        } else {
            break;
        }
    }
    name
}
