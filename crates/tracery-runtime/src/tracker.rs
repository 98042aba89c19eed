//! The state tracker service.

use std::collections::HashMap;

use strum_macros::Display;
use tracery_common::warning::warn_once;
use tracery_dom::{DocTree, NodeId};
use tracery_style::state::{SelectorScope, State, StateTarget, TargetKind};

/// Opaque identity for one tracked element's registrations.
///
/// Issued by [`StateTracker::initialize_element`]; the caller passes it back
/// to [`StateTracker::cleanup_element`] on unmount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackerHandle(u64);

/// A raw interaction event delivered by the host.
///
/// Events arrive on the *observed* target; the tracker resolves which
/// dependent element's attribute to toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ElementEvent {
    /// Pointer entered the element.
    #[strum(serialize = "mouse-enter")]
    MouseEnter,
    /// Pointer left the element.
    #[strum(serialize = "mouse-leave")]
    MouseLeave,
    /// Element (or a descendant) gained focus.
    #[strum(serialize = "focus-in")]
    FocusIn,
    /// Element (or a descendant) lost focus.
    #[strum(serialize = "focus-out")]
    FocusOut,
    /// Primary button pressed on the element.
    #[strum(serialize = "mouse-down")]
    MouseDown,
    /// Primary button released on the element.
    #[strum(serialize = "mouse-up")]
    MouseUp,
}

/// One interaction-state registration: which node is observed, which node's
/// attribute is toggled, and on which event pair.
#[derive(Debug, Clone)]
struct Registration {
    observed: NodeId,
    dependent: NodeId,
    attribute: String,
    enter: ElementEvent,
    leave: ElementEvent,
}

/// One viewport-intersection watch.
#[derive(Debug, Clone)]
struct IntersectionWatch {
    observed: NodeId,
    dependent: NodeId,
    attribute: String,
    state: State,
    /// Latched once `FirstTimeInView` has fired; never reset.
    seen: bool,
}

/// Everything registered for one handle.
#[derive(Debug, Default)]
struct ElementEntry {
    registrations: Vec<Registration>,
    watches: Vec<IntersectionWatch>,
}

/// Runtime tracker translating host notifications into the data-attribute
/// mutations the compiled CSS selects on.
///
/// Attribute values are always the literal `"true"`; clearing a state
/// removes the attribute entirely.
#[derive(Debug, Default)]
pub struct StateTracker {
    next_handle: u64,
    entries: HashMap<TrackerHandle, ElementEntry>,
    handle_by_element: HashMap<NodeId, TrackerHandle>,
}

impl StateTracker {
    /// Create a tracker for one document/session.
    #[must_use]
    pub fn new() -> Self {
        StateTracker::default()
    }

    /// Register an element's declared states and return its handle.
    ///
    /// Re-initializing an element that is already tracked first tears down
    /// every prior registration for it — leaked duplicate listeners are a
    /// correctness bug, not a performance one.
    ///
    /// Targets that do not resolve (missing block ancestor, selector with no
    /// match) are skipped as a normal condition: the element may not be fully
    /// mounted yet, or the marker class may be absent.
    pub fn initialize_element(
        &mut self,
        tree: &mut DocTree,
        element: NodeId,
        states: &[StateTarget],
    ) -> TrackerHandle {
        if let Some(&previous) = self.handle_by_element.get(&element) {
            self.cleanup_element(tree, previous);
        }

        let mut entry = ElementEntry::default();
        for target in states {
            register_state(tree, element, target, &mut entry);
        }

        self.next_handle += 1;
        let handle = TrackerHandle(self.next_handle);
        let _ = self.entries.insert(handle, entry);
        let _ = self.handle_by_element.insert(element, handle);
        handle
    }

    /// Deliver a raw interaction event observed on `target`.
    ///
    /// Every registration observing that node toggles its dependent
    /// element's attribute: set to `"true"` on the enter-type event, removed
    /// on the leave-type event. Unknown targets are a no-op.
    pub fn dispatch_event(&self, tree: &mut DocTree, target: NodeId, event: ElementEvent) {
        for entry in self.entries.values() {
            for registration in &entry.registrations {
                if registration.observed != target {
                    continue;
                }
                if event == registration.enter {
                    tree.set_attribute(registration.dependent, &registration.attribute, "true");
                } else if event == registration.leave {
                    tree.remove_attribute(registration.dependent, &registration.attribute);
                }
            }
        }
    }

    /// Deliver an intersection notification observed on `target`.
    ///
    /// `InView` follows the intersection flag, `NotInView` inverts it, and
    /// `FirstTimeInView` latches on the first intersecting notification and
    /// never clears.
    pub fn observe_intersection(&mut self, tree: &mut DocTree, target: NodeId, intersecting: bool) {
        for entry in self.entries.values_mut() {
            for watch in &mut entry.watches {
                if watch.observed != target {
                    continue;
                }
                match watch.state {
                    State::InView => {
                        if intersecting {
                            tree.set_attribute(watch.dependent, &watch.attribute, "true");
                        } else {
                            tree.remove_attribute(watch.dependent, &watch.attribute);
                        }
                    }
                    State::NotInView => {
                        if intersecting {
                            tree.remove_attribute(watch.dependent, &watch.attribute);
                        } else {
                            tree.set_attribute(watch.dependent, &watch.attribute, "true");
                        }
                    }
                    State::FirstTimeInView => {
                        if intersecting && !watch.seen {
                            tree.set_attribute(watch.dependent, &watch.attribute, "true");
                            watch.seen = true;
                        }
                    }
                    // Interaction states never appear in watches.
                    _ => {}
                }
            }
        }
    }

    /// Tear down everything registered under a handle.
    ///
    /// Clears any attributes the registrations set and discards them. Safe
    /// to call with an unknown or already-cleaned handle (no-op).
    pub fn cleanup_element(&mut self, tree: &mut DocTree, handle: TrackerHandle) {
        let Some(entry) = self.entries.remove(&handle) else {
            return;
        };
        for registration in &entry.registrations {
            tree.remove_attribute(registration.dependent, &registration.attribute);
        }
        for watch in &entry.watches {
            tree.remove_attribute(watch.dependent, &watch.attribute);
        }
        self.handle_by_element
            .retain(|_, &mut tracked| tracked != handle);
    }

    /// The number of live handles (diagnostics/tests).
    #[must_use]
    pub fn tracked_elements(&self) -> usize {
        self.entries.len()
    }
}

/// Resolve one state target into the entry's registrations or watches.
///
/// View states observe and toggle the element itself, whatever the declared
/// target. Self-targeted interaction states are plain pseudo-classes and need
/// no runtime registration at all.
fn register_state(tree: &DocTree, element: NodeId, target: &StateTarget, entry: &mut ElementEntry) {
    if target.state.is_view_state() {
        let Some(attribute) = target.data_attribute() else {
            return;
        };
        entry.watches.push(IntersectionWatch {
            observed: element,
            dependent: element,
            attribute,
            state: target.state,
            seen: false,
        });
        return;
    }

    let (observed, dependent) = match &target.target {
        TargetKind::Slf => return,
        TargetKind::Parent { level } => {
            let Some(ancestor) = tree.block_ancestor(element, *level) else {
                warn_once(
                    "Tracker",
                    &format!("no block ancestor at level {level} for {} state", target.state),
                );
                return;
            };
            (ancestor, element)
        }
        TargetKind::Selector { selector, scope } => match scope {
            // Observe the element; toggle the matched descendant (or the
            // element itself when nothing matches).
            SelectorScope::Slf => {
                let matched = tree.query_descendant(element, selector).unwrap_or(element);
                (element, matched)
            }
            // Swapped: observe the descendant, toggle the element.
            SelectorScope::Block => {
                let Some(matched) = tree.query_descendant(element, selector) else {
                    warn_once(
                        "Tracker",
                        &format!("selector '{selector}' matched no descendant"),
                    );
                    return;
                };
                (matched, element)
            }
        },
    };

    let Some(attribute) = target.data_attribute() else {
        return;
    };
    let (enter, leave) = event_pair(target.state);
    entry.registrations.push(Registration {
        observed,
        dependent,
        attribute,
        enter,
        leave,
    });
}

/// The event pair toggling each interaction state.
///
/// `disabled` has no dedicated DOM event; the focus pair is the stand-in
/// signal the original runtime uses.
fn event_pair(state: State) -> (ElementEvent, ElementEvent) {
    match state {
        State::Hover => (ElementEvent::MouseEnter, ElementEvent::MouseLeave),
        State::Active => (ElementEvent::MouseDown, ElementEvent::MouseUp),
        State::Focus
        | State::Disabled
        | State::InView
        | State::NotInView
        | State::FirstTimeInView => (ElementEvent::FocusIn, ElementEvent::FocusOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracery_dom::{BLOCK_MARKER_CLASS, ElementData};

    fn make_element(tag: &str, classes: &[&str]) -> ElementData {
        let mut data = ElementData::new(tag);
        if !classes.is_empty() {
            let _ = data
                .attrs
                .insert("class".to_string(), classes.join(" "));
        }
        data
    }

    /// Tree: root > section.block > div.wrapper > span (the tracked element),
    /// with a sibling icon under the section.
    fn fixture() -> (DocTree, NodeId, NodeId, NodeId) {
        let mut tree = DocTree::new();
        let section = tree.alloc(make_element("section", &[BLOCK_MARKER_CLASS]));
        let wrapper = tree.alloc(make_element("div", &["wrapper"]));
        let span = tree.alloc(make_element("span", &[]));
        let icon = tree.alloc(make_element("i", &["icon"]));
        tree.append_child(NodeId::ROOT, section);
        tree.append_child(section, wrapper);
        tree.append_child(wrapper, span);
        tree.append_child(span, icon);
        (tree, section, span, icon)
    }

    #[test]
    fn test_parent_hover_toggles_dependent_attribute() {
        let (mut tree, section, span, _) = fixture();
        let mut tracker = StateTracker::new();
        let _handle =
            tracker.initialize_element(&mut tree, span, &[StateTarget::on_parent(State::Hover, 1)]);

        tracker.dispatch_event(&mut tree, section, ElementEvent::MouseEnter);
        assert_eq!(tree.attribute(span, "data-parent-1-hover"), Some("true"));

        tracker.dispatch_event(&mut tree, section, ElementEvent::MouseLeave);
        assert_eq!(tree.attribute(span, "data-parent-1-hover"), None);
    }

    #[test]
    fn test_events_on_unobserved_nodes_are_ignored() {
        let (mut tree, _, span, icon) = fixture();
        let mut tracker = StateTracker::new();
        let _handle =
            tracker.initialize_element(&mut tree, span, &[StateTarget::on_parent(State::Hover, 1)]);

        // The icon is not the observed target.
        tracker.dispatch_event(&mut tree, icon, ElementEvent::MouseEnter);
        assert_eq!(tree.attribute(span, "data-parent-1-hover"), None);
    }

    #[test]
    fn test_missing_block_ancestor_is_a_silent_noop() {
        let mut tree = DocTree::new();
        let orphan = tree.alloc(make_element("div", &[]));
        tree.append_child(NodeId::ROOT, orphan);

        let mut tracker = StateTracker::new();
        let handle = tracker
            .initialize_element(&mut tree, orphan, &[StateTarget::on_parent(State::Hover, 3)]);

        // A handle is still issued; it simply carries no registrations.
        assert_eq!(tracker.tracked_elements(), 1);
        tracker.cleanup_element(&mut tree, handle);
        assert_eq!(tracker.tracked_elements(), 0);
    }

    #[test]
    fn test_selector_self_scope_toggles_matched_descendant() {
        let (mut tree, _, span, icon) = fixture();
        let mut tracker = StateTracker::new();
        let _handle = tracker.initialize_element(
            &mut tree,
            span,
            &[StateTarget::on_selector(
                State::Hover,
                ".icon",
                SelectorScope::Slf,
            )],
        );

        // Observed: the span itself. Dependent: the matched icon.
        tracker.dispatch_event(&mut tree, span, ElementEvent::MouseEnter);
        assert_eq!(tree.attribute(icon, "data-selector-hover"), Some("true"));
        assert_eq!(tree.attribute(span, "data-selector-hover"), None);

        tracker.dispatch_event(&mut tree, span, ElementEvent::MouseLeave);
        assert_eq!(tree.attribute(icon, "data-selector-hover"), None);
    }

    #[test]
    fn test_selector_block_scope_swaps_observed_and_dependent() {
        let (mut tree, _, span, icon) = fixture();
        let mut tracker = StateTracker::new();
        let _handle = tracker.initialize_element(
            &mut tree,
            span,
            &[StateTarget::on_selector(
                State::Focus,
                ".icon",
                SelectorScope::Block,
            )],
        );

        // Observed: the icon. Dependent: the span.
        tracker.dispatch_event(&mut tree, icon, ElementEvent::FocusIn);
        assert_eq!(tree.attribute(span, "data-selector-focus"), Some("true"));

        tracker.dispatch_event(&mut tree, icon, ElementEvent::FocusOut);
        assert_eq!(tree.attribute(span, "data-selector-focus"), None);
    }

    #[test]
    fn test_self_interaction_states_need_no_runtime() {
        let (mut tree, _, span, _) = fixture();
        let mut tracker = StateTracker::new();
        let _handle =
            tracker.initialize_element(&mut tree, span, &[StateTarget::on_self(State::Hover)]);

        // Pure pseudo-class: no registrations, no attribute mutations.
        tracker.dispatch_event(&mut tree, span, ElementEvent::MouseEnter);
        assert!(
            tree.as_element(span)
                .unwrap()
                .attrs
                .keys()
                .all(|k| !k.starts_with("data-"))
        );
    }

    #[test]
    fn test_in_view_follows_intersection() {
        let (mut tree, _, span, _) = fixture();
        let mut tracker = StateTracker::new();
        let _handle =
            tracker.initialize_element(&mut tree, span, &[StateTarget::on_self(State::InView)]);

        tracker.observe_intersection(&mut tree, span, true);
        assert_eq!(tree.attribute(span, "data-in-view"), Some("true"));
        tracker.observe_intersection(&mut tree, span, false);
        assert_eq!(tree.attribute(span, "data-in-view"), None);
    }

    #[test]
    fn test_not_in_view_inverts_intersection() {
        let (mut tree, _, span, _) = fixture();
        let mut tracker = StateTracker::new();
        let _handle =
            tracker.initialize_element(&mut tree, span, &[StateTarget::on_self(State::NotInView)]);

        tracker.observe_intersection(&mut tree, span, false);
        assert_eq!(tree.attribute(span, "data-not-in-view"), Some("true"));
        tracker.observe_intersection(&mut tree, span, true);
        assert_eq!(tree.attribute(span, "data-not-in-view"), None);
    }

    #[test]
    fn test_first_time_in_view_latches() {
        let (mut tree, _, span, _) = fixture();
        let mut tracker = StateTracker::new();
        let _handle = tracker.initialize_element(
            &mut tree,
            span,
            &[StateTarget::on_self(State::FirstTimeInView)],
        );

        tracker.observe_intersection(&mut tree, span, true);
        assert_eq!(tree.attribute(span, "data-first-time-in-view"), Some("true"));

        // Leaving the viewport never clears the latch.
        tracker.observe_intersection(&mut tree, span, false);
        assert_eq!(tree.attribute(span, "data-first-time-in-view"), Some("true"));
    }

    #[test]
    fn test_reinitialization_replaces_registrations() {
        let (mut tree, section, span, _) = fixture();
        let mut tracker = StateTracker::new();
        let first =
            tracker.initialize_element(&mut tree, span, &[StateTarget::on_parent(State::Hover, 1)]);
        let second =
            tracker.initialize_element(&mut tree, span, &[StateTarget::on_parent(State::Focus, 1)]);
        assert_ne!(first, second);
        assert_eq!(tracker.tracked_elements(), 1);

        // Only the second list's registrations remain active.
        tracker.dispatch_event(&mut tree, section, ElementEvent::MouseEnter);
        assert_eq!(tree.attribute(span, "data-parent-1-hover"), None);
        tracker.dispatch_event(&mut tree, section, ElementEvent::FocusIn);
        assert_eq!(tree.attribute(span, "data-parent-1-focus"), Some("true"));
    }

    #[test]
    fn test_cleanup_removes_registrations_and_attributes() {
        let (mut tree, section, span, _) = fixture();
        let mut tracker = StateTracker::new();
        let handle =
            tracker.initialize_element(&mut tree, span, &[StateTarget::on_parent(State::Hover, 1)]);

        tracker.dispatch_event(&mut tree, section, ElementEvent::MouseEnter);
        assert_eq!(tree.attribute(span, "data-parent-1-hover"), Some("true"));

        tracker.cleanup_element(&mut tree, handle);
        // The attribute set by the registration is cleared on teardown…
        assert_eq!(tree.attribute(span, "data-parent-1-hover"), None);
        // …and subsequent events mutate nothing.
        tracker.dispatch_event(&mut tree, section, ElementEvent::MouseEnter);
        assert_eq!(tree.attribute(span, "data-parent-1-hover"), None);

        // Cleaning an unknown handle is a no-op.
        tracker.cleanup_element(&mut tree, handle);
    }
}
