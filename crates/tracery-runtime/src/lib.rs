//! Ancestor/view state tracker.
//!
//! CSS pseudo-classes can only express an element's *own* interaction state.
//! Variants conditioned on an ancestor's state (hover a card, restyle its
//! icon) or on viewport intersection compile to attribute selectors instead
//! (see `tracery-style`), and this crate supplies the runtime that toggles
//! those attributes.
//!
//! # Design
//!
//! [`StateTracker`] is an explicitly constructed, explicitly owned service —
//! one per document/session, injected by whatever owns the document — rather
//! than a process-wide global, so lifecycle is visible and testable.
//! Registration identity is an opaque [`TrackerHandle`] issued by
//! [`StateTracker::initialize_element`] and passed back to
//! [`StateTracker::cleanup_element`]; identity is never read back out of the
//! tree.
//!
//! The host event loop delivers raw notifications
//! ([`StateTracker::dispatch_event`], [`StateTracker::observe_intersection`])
//! and the tracker translates them into attribute mutations. Nothing here
//! blocks or awaits; notifications are fire-and-forget and teardown is an
//! explicit call, which makes single-threaded event-loop hosts serialize all
//! access automatically.

pub mod tracker;

pub use tracker::{ElementEvent, StateTracker, TrackerHandle};
