//! Style-variant model, CSS compiler, and shortcut matcher for the Tracery
//! page builder.
//!
//! # Scope
//!
//! This crate implements:
//! - **Breakpoint vocabulary** ([Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/))
//!   - Fixed min-width/max-width pairs (sm=40rem … 2xl=96rem)
//!   - Pair validation (one min + one max forming a non-empty range)
//!   - Deterministic `@media` query assembly
//!
//! - **State vocabulary** ([Selectors Level 4 § 4](https://www.w3.org/TR/selectors-4/#useraction-pseudos))
//!   - Interaction states (hover, focus, active, disabled) and view states
//!   - Ancestor-, selector-, and self-relative state targets
//!   - Synthesized data-attribute naming for tracker-backed selectors
//!
//! - **Variant model**
//!   - Per-property variant lists over the breakpoint × state axes
//!   - JSON-compatible style-set serialization that round-trips unchanged
//!
//! - **CSS Compiler** ([CSS Nesting Level 1](https://www.w3.org/TR/css-nesting-1/))
//!   - Deterministic grouping into root, `&:state`, and `@media` buckets
//!   - Byte-identical output for unchanged inputs
//!
//! - **Shortcut matcher**
//!   - Fuzzy preset scoring with a variant-coverage bonus and stable ties
//!   - Preset application with replace/merge semantics
//!
//! # Not In Scope
//!
//! - Per-property renderers (injected through [`registry::StyleRegistry`])
//! - The visual editor, document persistence, and the runtime tracker
//!   (see the `tracery-runtime` crate)

/// Responsive breakpoint vocabulary and media query assembly.
pub mod breakpoint;
/// CSS compilation with deterministic state/media grouping.
pub mod compile;
/// Injected style-property registry.
pub mod registry;
/// Shortcut preset scoring and application.
pub mod shortcut;
/// Interaction and view state vocabulary.
pub mod state;
/// Variant model and style set.
pub mod variant;

// Re-exports for convenience
pub use breakpoint::{
    Breakpoint, BreakpointPairError, BreakpointParseError, media_query, validate_pair,
};
pub use compile::{compile, compile_document};
pub use registry::{PropertyDefinition, RenderOptions, StyleRegistry};
pub use shortcut::{
    ApplyOutcome, Shortcut, ShortcutInput, ShortcutOption, StyleTarget, TargetValue,
    VariantTarget, apply_option, current_value,
};
pub use state::{SelectorScope, State, StateTarget, TargetKind};
pub use variant::{StyleSet, Variant};
