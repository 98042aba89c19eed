//! Interaction and view state vocabulary.
//!
//! A variant can be conditioned on a state of the element itself, of a named
//! ancestor, or of a descendant matched by a selector. Self-targeted
//! interaction states compile to plain pseudo-classes per
//! [Selectors Level 4 § 4](https://www.w3.org/TR/selectors-4/#useraction-pseudos);
//! every other target compiles to an attribute selector over a data attribute
//! the runtime tracker synthesizes at the dependent element.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// A state a variant can be conditioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum State {
    /// [§ 4.3 :hover](https://www.w3.org/TR/selectors-4/#the-hover-pseudo)
    /// "The :hover pseudo-class applies while the user designates an element
    /// with a pointing device."
    #[serde(rename = "hover")]
    #[strum(serialize = "hover")]
    Hover,
    /// [§ 4.4 :focus](https://www.w3.org/TR/selectors-4/#the-focus-pseudo)
    /// "The :focus pseudo-class applies while an element has the focus."
    #[serde(rename = "focus")]
    #[strum(serialize = "focus")]
    Focus,
    /// [§ 4.3 :active](https://www.w3.org/TR/selectors-4/#the-active-pseudo)
    /// "The :active pseudo-class applies while an element is being activated
    /// by the user."
    #[serde(rename = "active")]
    #[strum(serialize = "active")]
    Active,
    /// [§ 13.1 :disabled](https://www.w3.org/TR/selectors-4/#enableddisabled)
    /// "An element that is in a disabled state."
    #[serde(rename = "disabled")]
    #[strum(serialize = "disabled")]
    Disabled,
    /// The element's bounding box intersects the viewport.
    #[serde(rename = "inView")]
    #[strum(serialize = "in-view")]
    InView,
    /// The element's bounding box does not intersect the viewport.
    #[serde(rename = "notInView")]
    #[strum(serialize = "not-in-view")]
    NotInView,
    /// The element has intersected the viewport at least once; latches on and
    /// never clears (used for enter-once animations).
    #[serde(rename = "firstTimeInView")]
    #[strum(serialize = "first-time-in-view")]
    FirstTimeInView,
}

impl State {
    /// Whether this is a viewport-intersection state rather than an
    /// interaction state.
    #[must_use]
    pub fn is_view_state(self) -> bool {
        matches!(
            self,
            State::InView | State::NotInView | State::FirstTimeInView
        )
    }

    /// The pseudo-class name for interaction states (`hover` → `:hover`).
    ///
    /// View states have no pseudo-class and return `None`.
    #[must_use]
    pub fn pseudo_class(self) -> Option<&'static str> {
        match self {
            State::Hover => Some(":hover"),
            State::Focus => Some(":focus"),
            State::Active => Some(":active"),
            State::Disabled => Some(":disabled"),
            State::InView | State::NotInView | State::FirstTimeInView => None,
        }
    }
}

/// Which scope a selector target binds: observe the element and toggle the
/// matched descendant, or the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectorScope {
    /// Observe the element itself; the dependent target is the descendant
    /// matched by the selector (or the element itself if nothing matches).
    #[serde(rename = "self")]
    Slf,
    /// Swapped: observe the matched descendant; toggle the element itself.
    #[serde(rename = "block")]
    Block,
}

/// What the state is observed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TargetKind {
    /// The element itself.
    #[default]
    #[serde(rename = "self")]
    Slf,
    /// An ancestor at `level` ≥ 1, counting only elements carrying the block
    /// marker class.
    Parent {
        /// The 1-based block-ancestor level.
        level: u32,
    },
    /// An element addressed by a CSS selector relative to the element.
    Selector {
        /// The compound selector text.
        selector: String,
        /// Which side of the pair is observed vs. toggled.
        scope: SelectorScope,
    },
}

/// A state paired with the target it is observed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateTarget {
    /// The observed state.
    pub state: State,
    /// Where the state is observed. Defaults to the element itself.
    #[serde(default)]
    pub target: TargetKind,
}

impl StateTarget {
    /// A state observed on the element itself.
    #[must_use]
    pub fn on_self(state: State) -> Self {
        StateTarget {
            state,
            target: TargetKind::Slf,
        }
    }

    /// A state observed on a block ancestor at the given level.
    #[must_use]
    pub fn on_parent(state: State, level: u32) -> Self {
        StateTarget {
            state,
            target: TargetKind::Parent { level },
        }
    }

    /// A state bound through a selector target.
    #[must_use]
    pub fn on_selector(state: State, selector: &str, scope: SelectorScope) -> Self {
        StateTarget {
            state,
            target: TargetKind::Selector {
                selector: selector.to_string(),
                scope,
            },
        }
    }

    /// The synthesized data attribute toggled by the runtime tracker for this
    /// target, or `None` when the state is expressible as a plain
    /// pseudo-class on the element itself.
    ///
    /// Attribute values are always the literal string `"true"`; the attribute
    /// is removed, never set to anything else.
    #[must_use]
    pub fn data_attribute(&self) -> Option<String> {
        if self.state.is_view_state() {
            // View states always go through an attribute, whatever the target.
            return Some(format!("data-{}", self.state));
        }
        match &self.target {
            TargetKind::Slf => None,
            TargetKind::Parent { level } => Some(format!("data-parent-{level}-{}", self.state)),
            TargetKind::Selector { .. } => Some(format!("data-selector-{}", self.state)),
        }
    }

    /// The nested CSS selector fragment the compiler emits for this target:
    /// `&:hover` for self interaction states, `&[data-…="true"]` for
    /// attribute-backed targets.
    #[must_use]
    pub fn css_selector(&self) -> String {
        match self.data_attribute() {
            Some(attr) => format!("&[{attr}=\"true\"]"),
            // data_attribute() is None only for self interaction states,
            // which always have a pseudo-class.
            None => match self.state.pseudo_class() {
                Some(pseudo) => format!("&{pseudo}"),
                None => String::new(),
            },
        }
    }
}

/// Order-insensitive set equality on state-target lists.
///
/// Variant axes are sets, not sequences: `[hover, focus]` and
/// `[focus, hover]` address the same variant.
#[must_use]
pub fn same_state_set(a: &[StateTarget], b: &[StateTarget]) -> bool {
    a.len() == b.len() && a.iter().all(|item| b.contains(item))
}
