//! CSS compilation.
//!
//! Turns a [`StyleSet`] into CSS text: a root rule body with nested
//! pseudo-state blocks and combined media queries, in a fixed deterministic
//! order so that repeated compilation of an unchanged style set is
//! byte-identical (required for caching and diffing).
//!
//! Nesting follows [CSS Nesting Level 1](https://www.w3.org/TR/css-nesting-1/)
//! (`& selector { … }` relative rules); media queries follow
//! [Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/). The caller
//! supplies the root selector and wraps the returned body — the compiler
//! emits only the body.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::breakpoint::{media_query, validate_pair};
use crate::registry::{RenderOptions, StyleRegistry};
use crate::variant::StyleSet;
use tracery_common::warning::warn_once;

/// Indentation unit for nested blocks.
const INDENT: &str = "  ";

/// A map preserving the insertion order of first encounter.
///
/// Bucket order must be deterministic across compilations, so buckets are
/// kept in a vector keyed by their first appearance rather than a hash map.
struct OrderedBuckets<V> {
    entries: Vec<(String, V)>,
}

impl<V: Default> OrderedBuckets<V> {
    fn new() -> Self {
        OrderedBuckets {
            entries: Vec::new(),
        }
    }

    /// Get the bucket for `key`, creating it at the end on first encounter.
    fn entry(&mut self, key: &str) -> &mut V {
        let pos = match self.entries.iter().position(|(k, _)| k == key) {
            Some(pos) => pos,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }
}

/// Rules buffered under one media query: unconditioned declarations plus
/// per-state sub-buckets nested inside the query.
#[derive(Default)]
struct MediaBucket {
    base: Vec<String>,
    states: Vec<(String, Vec<String>)>,
}

impl MediaBucket {
    fn state_bucket(&mut self, selector: &str) -> &mut Vec<String> {
        let pos = match self.states.iter().position(|(k, _)| k == selector) {
            Some(pos) => pos,
            None => {
                self.states.push((selector.to_string(), Vec::new()));
                self.states.len() - 1
            }
        };
        &mut self.states[pos].1
    }
}

/// Compile a style set to a CSS rule body.
///
/// `default_properties` carries implicit values not expressed as variants
/// (the editor's defaults for the node type); they are emitted after the
/// registry prelude and before variant-derived declarations. `editor_mode`
/// is passed through to renderers opaquely.
///
/// Unknown properties in the style set are skipped silently (with a one-time
/// diagnostic), keeping old documents forward-compatible with registries
/// that shrink.
#[must_use]
pub fn compile(
    registry: &StyleRegistry,
    style_set: &StyleSet,
    default_properties: Option<&BTreeMap<String, Value>>,
    editor_mode: bool,
) -> String {
    compile_body(registry, style_set, default_properties, editor_mode, true)
}

/// Compile a root style set plus nested child scopes.
///
/// Each scope is a `(selector, style set)` pair emitted as a distinct
/// `selector { … }` block after the root body. Scope bodies never re-emit
/// the prelude or defaults, and properties never leak between the root body
/// and any scope block.
#[must_use]
pub fn compile_document(
    registry: &StyleRegistry,
    root: &StyleSet,
    scopes: &[(String, StyleSet)],
    default_properties: Option<&BTreeMap<String, Value>>,
    editor_mode: bool,
) -> String {
    let mut out = compile(registry, root, default_properties, editor_mode);
    for (selector, set) in scopes {
        let body = compile_body(registry, set, None, editor_mode, false);
        if body.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(selector);
        out.push_str(" {\n");
        for line in body.lines() {
            out.push_str(INDENT);
            out.push_str(line);
            out.push('\n');
        }
        out.push('}');
    }
    out
}

/// Shared compilation pass; `include_prelude` is false for scope bodies.
fn compile_body(
    registry: &StyleRegistry,
    style_set: &StyleSet,
    default_properties: Option<&BTreeMap<String, Value>>,
    editor_mode: bool,
    include_prelude: bool,
) -> String {
    let options = RenderOptions { editor_mode };
    let mut root_lines: Vec<String> = Vec::new();

    // STEP 1: Fixed prelude rules required by the registry come first,
    // unconditionally.
    if include_prelude {
        root_lines.extend(registry.prelude().iter().cloned());
    }

    // STEP 2: Implicit default values, rendered like any other value. The
    // renderer decides the fragment text; a trailing separator is trimmed
    // when the body is assembled.
    if let Some(defaults) = default_properties {
        for (property, value) in defaults {
            let Some(definition) = registry.get(property) else {
                continue;
            };
            if let Some(fragment) = definition.render(value, options) {
                root_lines.push(fragment);
            }
        }
    }

    // Unregistered properties are a normal condition (registries shrink);
    // skip them with a one-time diagnostic.
    for property in style_set.properties() {
        if !registry.contains(property) {
            warn_once(
                "Compiler",
                &format!("unknown property '{property}' in style set"),
            );
        }
    }

    let mut state_buckets: OrderedBuckets<Vec<String>> = OrderedBuckets::new();
    let mut media_buckets: OrderedBuckets<MediaBucket> = OrderedBuckets::new();

    // STEP 3: Render every variant of every registered property, iterating
    // in registry order so bucket creation order never depends on style-set
    // storage.
    for definition in registry.iter() {
        let Some(variants) = style_set.get(&definition.name) else {
            continue;
        };
        for variant in variants {
            if let Err(err) = validate_pair(&variant.breakpoint) {
                warn_once(
                    "Compiler",
                    &format!("skipping variant of '{}': {err}", definition.name),
                );
                continue;
            }
            // A renderer returning None means "no CSS for this value" and is
            // silently skipped, not an error.
            let Some(fragment) = definition.render(&variant.value, options) else {
                continue;
            };

            // STEP 4: Classify by (breakpoint-set, state-set).
            match (variant.breakpoint.is_empty(), variant.state.is_empty()) {
                // Both empty: the base variant goes straight into the root
                // rule body. Duplicate base variants overwrite in render
                // order via the normal cascade.
                (true, true) => root_lines.push(fragment),
                // State only: buffer under a per-state bucket.
                (true, false) => {
                    for target in &variant.state {
                        state_buckets
                            .entry(&target.css_selector())
                            .push(fragment.clone());
                    }
                }
                // Breakpoint only: buffer under the media query key.
                (false, true) => media_buckets
                    .entry(&media_query(&variant.breakpoint))
                    .base
                    .push(fragment),
                // Both: same media bucket, duplicated into one sub-bucket
                // per individual state in the state set.
                (false, false) => {
                    let bucket = media_buckets.entry(&media_query(&variant.breakpoint));
                    for target in &variant.state {
                        bucket
                            .state_bucket(&target.css_selector())
                            .push(fragment.clone());
                    }
                }
            }
        }
    }

    // STEP 5: Assemble. Root declarations, then pure-state blocks, then
    // media blocks with their nested state blocks.
    let mut out = String::new();
    for line in &root_lines {
        out.push_str(line);
        out.push('\n');
    }

    for (selector, rules) in &state_buckets.entries {
        out.push_str(selector);
        out.push_str(" {\n");
        for rule in rules {
            out.push_str(INDENT);
            out.push_str(rule);
            out.push('\n');
        }
        out.push_str("}\n");
    }

    for (query, bucket) in &media_buckets.entries {
        out.push_str(query);
        out.push_str(" {\n");
        for rule in &bucket.base {
            out.push_str(INDENT);
            out.push_str(rule);
            out.push('\n');
        }
        for (selector, rules) in &bucket.states {
            out.push_str(INDENT);
            out.push_str(selector);
            out.push_str(" {\n");
            for rule in rules {
                out.push_str(INDENT);
                out.push_str(INDENT);
                out.push_str(rule);
                out.push('\n');
            }
            out.push_str(INDENT);
            out.push_str("}\n");
        }
        out.push_str("}\n");
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::Breakpoint;
    use crate::registry::demo::demo_registry;
    use crate::state::{State, StateTarget};
    use crate::variant::Variant;
    use serde_json::json;

    fn color_hover_set() -> StyleSet {
        let mut set = StyleSet::new();
        set.set_variants(
            "color",
            vec![
                Variant::base(json!("black")),
                Variant::base(json!("red")).with_states(&[StateTarget::on_self(State::Hover)]),
            ],
        );
        set
    }

    #[test]
    fn test_compile_is_idempotent() {
        let registry = demo_registry();
        let set = color_hover_set();
        let first = compile(&registry, &set, None, false);
        let second = compile(&registry, &set, None, false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_prelude_comes_first() {
        let registry = demo_registry();
        let set = color_hover_set();
        let css = compile(&registry, &set, None, false);
        assert!(css.starts_with("--tracery-opacity: 1;\n"));
    }

    #[test]
    fn test_base_and_state_grouping() {
        let registry = demo_registry();
        let css = compile(&registry, &color_hover_set(), None, false);
        assert!(css.contains("color: black;\n"));
        assert!(css.contains("&:hover {\n  color: red;\n}"));
    }

    #[test]
    fn test_media_query_combination_exact() {
        let registry = demo_registry();
        let mut set = StyleSet::new();
        set.set_variants(
            "width",
            vec![
                Variant::base(json!("50%"))
                    .with_breakpoints(&[Breakpoint::Sm, Breakpoint::MaxLg]),
            ],
        );
        let css = compile(&registry, &set, None, false);
        assert!(
            css.contains(
                "@media (min-width: 40rem) and (max-width: 64rem) {\n  width: 50%;\n}"
            ),
            "got: {css}"
        );
    }

    #[test]
    fn test_breakpoint_and_state_nest_inside_media() {
        let registry = demo_registry();
        let mut set = StyleSet::new();
        set.set_variants(
            "width",
            vec![
                Variant::base(json!("50%")).with_breakpoints(&[Breakpoint::Md]),
                Variant::base(json!("60%"))
                    .with_breakpoints(&[Breakpoint::Md])
                    .with_states(&[StateTarget::on_self(State::Hover)]),
            ],
        );
        let css = compile(&registry, &set, None, false);
        assert!(
            css.contains(
                "@media (min-width: 48rem) {\n  width: 50%;\n  &:hover {\n    width: 60%;\n  }\n}"
            ),
            "got: {css}"
        );
    }

    #[test]
    fn test_multi_state_variant_duplicates_into_each_bucket() {
        let registry = demo_registry();
        let mut set = StyleSet::new();
        set.set_variants(
            "color",
            vec![Variant::base(json!("blue")).with_states(&[
                StateTarget::on_self(State::Hover),
                StateTarget::on_self(State::Focus),
            ])],
        );
        let css = compile(&registry, &set, None, false);
        assert!(css.contains("&:hover {\n  color: blue;\n}"));
        assert!(css.contains("&:focus {\n  color: blue;\n}"));
    }

    #[test]
    fn test_parent_state_compiles_to_attribute_selector() {
        let registry = demo_registry();
        let mut set = StyleSet::new();
        set.set_variants(
            "opacity",
            vec![Variant::base(json!(0.5)).with_states(&[StateTarget::on_parent(State::Hover, 2)])],
        );
        let css = compile(&registry, &set, None, false);
        assert!(css.contains("&[data-parent-2-hover=\"true\"] {\n  opacity: 0.5;\n}"));
    }

    #[test]
    fn test_unknown_property_is_skipped() {
        let registry = demo_registry();
        let mut set = color_hover_set();
        set.set_variants("textGlow", vec![Variant::base(json!("3px"))]);
        let css = compile(&registry, &set, None, false);
        assert!(!css.contains("textGlow"));
        assert!(css.contains("color: black;"));
    }

    #[test]
    fn test_declined_renderer_output_is_skipped() {
        let registry = demo_registry();
        let mut set = StyleSet::new();
        set.set_variants("hide", vec![Variant::base(json!(false))]);
        let css = compile(&registry, &set, None, false);
        assert!(!css.contains("display"));
    }

    #[test]
    fn test_editor_mode_reaches_renderers() {
        let registry = demo_registry();
        let mut set = StyleSet::new();
        set.set_variants("hide", vec![Variant::base(json!(true))]);
        assert!(compile(&registry, &set, None, false).contains("display: none;"));
        assert!(compile(&registry, &set, None, true).contains("opacity: 0.3;"));
    }

    #[test]
    fn test_invalid_breakpoint_pair_is_skipped() {
        let registry = demo_registry();
        let mut set = StyleSet::new();
        set.set_variants(
            "width",
            vec![
                Variant::base(json!("50%")).with_breakpoints(&[Breakpoint::Sm, Breakpoint::Md]),
                Variant::base(json!("100%")),
            ],
        );
        let css = compile(&registry, &set, None, false);
        assert!(css.contains("width: 100%;"));
        assert!(!css.contains("@media"));
    }

    #[test]
    fn test_default_properties_precede_variant_rules() {
        let registry = demo_registry();
        let mut defaults = BTreeMap::new();
        let _ = defaults.insert("padding".to_string(), json!("8px"));
        let css = compile(&registry, &color_hover_set(), Some(&defaults), false);
        let padding_at = css.find("padding: 8px;").unwrap();
        let color_at = css.find("color: black;").unwrap();
        assert!(padding_at < color_at);
    }

    #[test]
    fn test_document_scopes_do_not_leak() {
        let registry = demo_registry();
        let mut root = StyleSet::new();
        root.set_variants("color", vec![Variant::base(json!("black"))]);
        let mut header = StyleSet::new();
        header.set_variants("background", vec![Variant::base(json!("white"))]);

        let css = compile_document(
            &registry,
            &root,
            &[(".header".to_string(), header)],
            None,
            false,
        );

        assert!(css.contains("color: black;"));
        assert!(css.contains(".header {\n  background-color: white;\n}"));
        // No leakage in either direction.
        let header_block = css.split(".header {").nth(1).unwrap();
        assert!(!header_block.contains("color: black;"));
        let root_block = css.split(".header {").next().unwrap();
        assert!(!root_block.contains("background-color"));
    }
}
