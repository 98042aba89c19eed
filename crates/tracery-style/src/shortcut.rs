//! Shortcut presets: scoring and application.
//!
//! A shortcut is a named group of preset options, each describing a partial
//! target style set. The matcher works in both directions: given the current
//! style set it scores every option and recovers which preset (if any) the
//! styles represent, and given a chosen option it produces the new style set.
//!
//! Application deliberately has asymmetric semantics (observed product
//! behavior, preserved as-is): a variants-array target *replaces* the
//! property's whole variant list, while a single axis-addressed target
//! *merges* into it. The two paths are kept as separately named operations —
//! [`replace_all_variants`] and [`merge_one_variant`] — so the asymmetry
//! stays visible and unit-tested.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::breakpoint::Breakpoint;
use crate::state::StateTarget;
use crate::variant::{StyleSet, Variant};

/// A deferred-or-literal target value.
///
/// Value-producing functions embedded in preset data are represented as an
/// explicit tagged variant rather than runtime type inspection; `Unset` is
/// the explicit removal signal.
pub enum TargetValue {
    /// A plain value applied as-is.
    Literal(Value),
    /// A value computed from the previous value (`None` when the property
    /// or variant did not exist).
    Derived(DeriveFn),
    /// Explicit removal of the addressed value.
    Unset,
}

/// The boxed computation carried by [`TargetValue::Derived`].
pub type DeriveFn = Box<dyn Fn(Option<&Value>) -> Value + Send + Sync>;

impl TargetValue {
    /// A literal target value.
    #[must_use]
    pub fn literal(value: Value) -> Self {
        TargetValue::Literal(value)
    }

    /// A derived target value.
    pub fn derived(f: impl Fn(Option<&Value>) -> Value + Send + Sync + 'static) -> Self {
        TargetValue::Derived(Box::new(f))
    }

    /// Resolve against the previous value. `None` means removal.
    ///
    /// A derived function that panics propagates to the caller — presets are
    /// authored data and a defective one is a caller-visible failure, not
    /// something to paper over with a fallback.
    #[must_use]
    pub fn resolve(&self, previous: Option<&Value>) -> Option<Value> {
        match self {
            TargetValue::Literal(value) => Some(value.clone()),
            TargetValue::Derived(f) => Some(f(previous)),
            TargetValue::Unset => None,
        }
    }
}

impl fmt::Debug for TargetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            TargetValue::Derived(_) => f.write_str("Derived(..)"),
            TargetValue::Unset => f.write_str("Unset"),
        }
    }
}

/// One axis-addressed target inside a preset.
#[derive(Debug)]
pub struct VariantTarget {
    /// The value to apply (or `Unset` to remove the addressed variant).
    pub value: TargetValue,
    /// The breakpoint axis addressed.
    pub breakpoint: Vec<Breakpoint>,
    /// The state axis addressed.
    pub state: Vec<StateTarget>,
}

impl VariantTarget {
    /// A base-variant target (both axes empty).
    #[must_use]
    pub fn base(value: TargetValue) -> Self {
        VariantTarget {
            value,
            breakpoint: Vec::new(),
            state: Vec::new(),
        }
    }

    /// Builder: address a breakpoint set.
    #[must_use]
    pub fn with_breakpoints(mut self, breakpoints: &[Breakpoint]) -> Self {
        self.breakpoint = breakpoints.to_vec();
        self
    }

    /// Builder: address a state set.
    #[must_use]
    pub fn with_states(mut self, states: &[StateTarget]) -> Self {
        self.state = states.to_vec();
        self
    }
}

/// What a preset prescribes for one property.
#[derive(Debug)]
pub enum StyleTarget {
    /// Legacy single-base form: applied across every existing variant of the
    /// property, or as a new base variant if none exist.
    Value(TargetValue),
    /// One axis-addressed target, merged into the existing list.
    Variant(VariantTarget),
    /// A full target list: the property's variant list is replaced wholesale.
    Variants(Vec<VariantTarget>),
    /// Delete the property entirely.
    Remove,
}

/// How a shortcut is presented in the editor.
///
/// Only option-based shortcuts are matchable; free-form inputs are settable
/// but `current_value` never recovers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutInput {
    /// A fixed set of named options.
    Options,
    /// Free-form numeric input.
    Numeric,
    /// An asset reference.
    Asset,
    /// A raw color value.
    Color,
}

/// One selectable preset within a shortcut.
#[derive(Debug, Default)]
pub struct ShortcutOption {
    /// Stable option identifier.
    pub id: String,
    /// Display label (editor presentation, opaque here).
    pub label: String,
    /// Per-property prescriptions.
    pub target_styles: BTreeMap<String, StyleTarget>,
    /// Per-prop (component props, not styles) prescriptions.
    pub target_props: BTreeMap<String, bool>,
}

impl ShortcutOption {
    /// Create an option with an id and label.
    #[must_use]
    pub fn new(id: &str, label: &str) -> Self {
        ShortcutOption {
            id: id.to_string(),
            label: label.to_string(),
            target_styles: BTreeMap::new(),
            target_props: BTreeMap::new(),
        }
    }

    /// Builder: add a style prescription.
    #[must_use]
    pub fn style(mut self, property: &str, target: StyleTarget) -> Self {
        let _ = self.target_styles.insert(property.to_string(), target);
        self
    }

    /// Builder: add a prop prescription.
    #[must_use]
    pub fn prop(mut self, name: &str, value: bool) -> Self {
        let _ = self.target_props.insert(name.to_string(), value);
        self
    }
}

/// A named group of preset options plus presentation metadata.
#[derive(Debug)]
pub struct Shortcut {
    /// The shortcut name (e.g. "Section width").
    pub name: String,
    /// Presentation kind; non-`Options` shortcuts are never matchable.
    pub input: ShortcutInput,
    /// The selectable options, in declaration order.
    pub options: Vec<ShortcutOption>,
}

impl Shortcut {
    /// Create an option-based shortcut.
    #[must_use]
    pub fn with_options(name: &str, options: Vec<ShortcutOption>) -> Self {
        Shortcut {
            name: name.to_string(),
            input: ShortcutInput::Options,
            options,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scoring
// ─────────────────────────────────────────────────────────────────────────────

/// Score every option of a shortcut against the current style set and return
/// the id of the best match, or `None` for unmatchable shortcuts.
///
/// The strictly-highest combined score wins; ties keep the first-seen option
/// so repeated evaluation is stable.
#[must_use]
pub fn current_value<'a>(
    shortcut: &'a Shortcut,
    style_set: &StyleSet,
    props: Option<&BTreeMap<String, bool>>,
) -> Option<&'a str> {
    // Free-form shortcuts (numeric, asset, color) are settable, never
    // matchable.
    if shortcut.input != ShortcutInput::Options {
        return None;
    }

    let mut best: Option<(f64, &str)> = None;
    for option in &shortcut.options {
        let score = score_option(option, style_set, props);
        let beaten = best.is_none_or(|(best_score, _)| score > best_score);
        if beaten {
            best = Some((score, option.id.as_str()));
        }
    }
    best.map(|(_, id)| id)
}

/// Combined style (and optionally props) score for one option.
fn score_option(
    option: &ShortcutOption,
    style_set: &StyleSet,
    props: Option<&BTreeMap<String, bool>>,
) -> f64 {
    let mut total_score = 0.0_f64;
    let mut total_checks = 0.0_f64;

    for (property, target) in &option.target_styles {
        total_checks += 1.0;
        total_score += match target {
            StyleTarget::Variants(targets) => score_variants_target(targets, style_set, property),
            StyleTarget::Value(value) => score_single_value(value, style_set, property),
            StyleTarget::Variant(variant_target) => {
                score_single_value(&variant_target.value, style_set, property)
            }
            // A removal target matches exactly when the property is absent.
            StyleTarget::Remove => {
                if style_set.get(property).is_none() {
                    1.0
                } else {
                    0.0
                }
            }
        };
    }

    let style_avg = if total_checks > 0.0 {
        total_score / total_checks
    } else {
        0.0
    };

    // Props participate only when the option declares target props and the
    // caller supplied runtime props.
    let Some(current_props) = props else {
        return style_avg;
    };
    if option.target_props.is_empty() {
        return style_avg;
    }

    let mut props_score = 0.0_f64;
    let mut props_checks = 0.0_f64;
    for (name, target) in &option.target_props {
        props_checks += 1.0;
        props_score += match current_props.get(name) {
            Some(current) if current == target => 1.0,
            Some(_) => 0.0,
            // Absent prop vs. false target is a near-match (unset means
            // "off" almost everywhere); vs. true target a weak one.
            None if !*target => 0.8,
            None => 0.2,
        };
    }
    let props_avg = if props_checks > 0.0 {
        props_score / props_checks
    } else {
        0.0
    };

    (style_avg + props_avg) / 2.0
}

/// Score a variants-array target against the property's current list.
fn score_variants_target(targets: &[VariantTarget], style_set: &StyleSet, property: &str) -> f64 {
    let current = style_set.get(property).unwrap_or(&[]);

    match (targets.is_empty(), current.is_empty()) {
        // Both empty: a perfect, trivial match.
        (true, true) => 1.0,
        // Target prescribes variants but nothing is styled yet: a weak
        // signal that this option is plausible.
        (false, true) => 0.3,
        (true, false) => 0.0,
        (false, false) => {
            let mut matches = 0.0_f64;
            let mut possible = 0.0_f64;
            for target in targets {
                // Only axis-equal current variants participate; targets with
                // no counterpart neither help nor hurt the ratio.
                let Some(existing) = current
                    .iter()
                    .find(|v| v.matches_axes(&target.breakpoint, &target.state))
                else {
                    continue;
                };
                possible += 1.0;
                if let Some(resolved) = target.value.resolve(Some(&existing.value)) {
                    if resolved == existing.value {
                        matches += 1.0;
                    }
                }
            }
            let ratio = if possible > 0.0 { matches / possible } else { 0.0 };
            // Bonus rewarding options with more comprehensive variant
            // coverage, capped at +0.5. This is what lets a richer
            // "contained" preset outscore a simpler "full" preset even when
            // their shared base variants tie.
            #[allow(clippy::cast_precision_loss, reason = "target lists are tiny")]
            let target_len = targets.len() as f64;
            let bonus = (matches / target_len * 0.5).min(0.5);
            ratio + bonus
        }
    }
}

/// Score a non-array target against only the current *base* variant.
fn score_single_value(target: &TargetValue, style_set: &StyleSet, property: &str) -> f64 {
    let Some(current) = style_set.base_value(property) else {
        // Nothing styled yet: plausible but unconfirmed.
        return 0.3;
    };
    let Some(resolved) = target.resolve(Some(current)) else {
        return 0.0;
    };
    if resolved == *current {
        return 1.0;
    }
    // Numeric closeness heuristic: score degrades with relative distance.
    if let (Some(a), Some(b)) = (current.as_f64(), resolved.as_f64()) {
        let denom = a.abs().max(b.abs());
        if denom > 0.0 {
            return (1.0 - (a - b).abs() / denom).max(0.0);
        }
    }
    0.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Application
// ─────────────────────────────────────────────────────────────────────────────

/// The result of applying an option: the new style set plus merged props.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// The new style set.
    pub style_set: StyleSet,
    /// Runtime props with the option's target props shallow-merged in.
    pub props: BTreeMap<String, bool>,
}

/// Apply a preset option to a style set, producing the new set.
///
/// The input set is not mutated; editors treat style sets as immutable
/// snapshots and swap the whole document node state.
#[must_use]
pub fn apply_option(
    option: &ShortcutOption,
    style_set: &StyleSet,
    props: Option<&BTreeMap<String, bool>>,
) -> ApplyOutcome {
    let mut next = style_set.clone();

    for (property, target) in &option.target_styles {
        match target {
            StyleTarget::Remove => next.remove(property),
            StyleTarget::Variants(targets) => replace_all_variants(&mut next, property, targets),
            StyleTarget::Variant(variant_target) => {
                merge_one_variant(&mut next, property, variant_target);
            }
            StyleTarget::Value(value) => apply_legacy_value(&mut next, property, value),
        }
    }

    let mut merged_props = props.cloned().unwrap_or_default();
    for (name, value) in &option.target_props {
        let _ = merged_props.insert(name.clone(), *value);
    }

    ApplyOutcome {
        style_set: next,
        props: merged_props,
    }
}

/// Replace a property's entire variant list from a target list.
///
/// This is a *full replace*: variants not named by the targets are dropped.
/// `Unset` targets are omitted from the result; if everything is omitted the
/// property key is deleted.
fn replace_all_variants(style_set: &mut StyleSet, property: &str, targets: &[VariantTarget]) {
    let mut next: Vec<Variant> = Vec::new();
    for target in targets {
        let previous = style_set.variant_value(property, &target.breakpoint, &target.state);
        let Some(resolved) = target.value.resolve(previous) else {
            // Unset: marked for removal, omitted from the result.
            continue;
        };
        if let Some(existing) = next
            .iter_mut()
            .find(|v| v.matches_axes(&target.breakpoint, &target.state))
        {
            existing.value = resolved;
        } else {
            next.push(
                Variant::base(resolved)
                    .with_breakpoints(&target.breakpoint)
                    .with_states(&target.state),
            );
        }
    }
    style_set.set_variants(property, next);
}

/// Merge a single axis-addressed target into a property's variant list.
///
/// Unlike [`replace_all_variants`] this leaves every other variant
/// untouched; `Unset` removes only the axis-matching variant (deleting the
/// key if the list empties).
fn merge_one_variant(style_set: &mut StyleSet, property: &str, target: &VariantTarget) {
    let previous = style_set.variant_value(property, &target.breakpoint, &target.state);
    match target.value.resolve(previous) {
        Some(resolved) => style_set.upsert_variant(
            property,
            Variant::base(resolved)
                .with_breakpoints(&target.breakpoint)
                .with_states(&target.state),
        ),
        None => style_set.remove_variant(property, &target.breakpoint, &target.state),
    }
}

/// Apply a legacy bare-value target: map the value across every existing
/// variant, or create a single base variant when the property is unset.
fn apply_legacy_value(style_set: &mut StyleSet, property: &str, target: &TargetValue) {
    match style_set.get(property) {
        Some(existing) => {
            let mut next: Vec<Variant> = Vec::new();
            for variant in existing {
                match target.resolve(Some(&variant.value)) {
                    Some(resolved) => {
                        let mut updated = variant.clone();
                        updated.value = resolved;
                        next.push(updated);
                    }
                    // Unset maps every variant away, removing the property.
                    None => {}
                }
            }
            style_set.set_variants(property, next);
        }
        None => {
            if let Some(resolved) = target.resolve(None) {
                style_set.upsert_variant(property, Variant::base(resolved));
            }
        }
    }
}
