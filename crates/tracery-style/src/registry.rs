//! Style property registry.
//!
//! The registry is an injected capability table: an ordered mapping from
//! property name to a definition carrying a default value and a renderer
//! `(value) -> CSS fragment | None`. The core never validates values against
//! a schema — it trusts the editor to supply conforming values and lets the
//! renderer decide whether a value produces CSS at all.
//!
//! Registration order is the compiler's property iteration order, which is
//! what makes compilation deterministic independent of style-set storage.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// Flags passed through to renderers opaquely.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Some properties render differently inside the visual editor, e.g. a
    /// "hide" property renders a dimming opacity instead of `display: none`
    /// so the hidden block stays editable.
    pub editor_mode: bool,
}

/// A property renderer: value in, CSS declaration out.
///
/// Returning `None` means "no CSS for this value" and is silently skipped by
/// the compiler, not an error.
pub type RenderFn = Box<dyn Fn(&Value, RenderOptions) -> Option<String> + Send + Sync>;

/// Definition of one style property.
pub struct PropertyDefinition {
    /// The property name (the style-set key).
    pub name: String,
    /// Grouping category for editor presentation (opaque to the core).
    pub category: String,
    /// The value implied when the property is unset.
    pub default_value: Value,
    render: RenderFn,
}

impl PropertyDefinition {
    /// Create a definition with a renderer.
    pub fn new(
        name: &str,
        category: &str,
        default_value: Value,
        render: impl Fn(&Value, RenderOptions) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        PropertyDefinition {
            name: name.to_string(),
            category: category.to_string(),
            default_value,
            render: Box::new(render),
        }
    }

    /// Render a value to a CSS declaration, or `None` for "no CSS".
    #[must_use]
    pub fn render(&self, value: &Value, options: RenderOptions) -> Option<String> {
        (self.render)(value, options)
    }
}

impl fmt::Debug for PropertyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDefinition")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of property definitions plus fixed prelude rules.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    definitions: Vec<PropertyDefinition>,
    index: HashMap<String, usize>,
    prelude: Vec<String>,
}

impl StyleRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        StyleRegistry::default()
    }

    /// Register a property definition.
    ///
    /// Re-registering an existing name replaces the definition in place,
    /// preserving its position in iteration order.
    pub fn register(&mut self, definition: PropertyDefinition) {
        if let Some(&pos) = self.index.get(&definition.name) {
            self.definitions[pos] = definition;
        } else {
            let _ = self
                .index
                .insert(definition.name.clone(), self.definitions.len());
            self.definitions.push(definition);
        }
    }

    /// Look up a definition by property name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyDefinition> {
        self.index.get(name).map(|&pos| &self.definitions[pos])
    }

    /// Whether a property name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterate definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.definitions.iter()
    }

    /// The number of registered properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no properties are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Append a fixed prelude rule the compiler emits unconditionally before
    /// anything else (e.g. a custom-property default).
    pub fn push_prelude(&mut self, rule: &str) {
        self.prelude.push(rule.to_string());
    }

    /// The registered prelude rules, in order.
    #[must_use]
    pub fn prelude(&self) -> &[String] {
        &self.prelude
    }
}

/// Demo registry used by the CLI and integration tests.
///
/// Real deployments inject their own registry; these renderers exist so the
/// engine can be exercised end to end without the product's property catalog.
pub mod demo {
    use super::{PropertyDefinition, StyleRegistry};
    use serde_json::{Value, json};

    /// Render a string-valued property to `name: value;`.
    fn simple(css_name: &'static str) -> impl Fn(&Value, super::RenderOptions) -> Option<String> {
        move |value, _| value.as_str().map(|v| format!("{css_name}: {v};"))
    }

    /// Build the demo registry.
    #[must_use]
    pub fn demo_registry() -> StyleRegistry {
        let mut registry = StyleRegistry::new();
        registry.push_prelude("--tracery-opacity: 1;");

        registry.register(PropertyDefinition::new(
            "color",
            "typography",
            json!("inherit"),
            simple("color"),
        ));
        registry.register(PropertyDefinition::new(
            "background",
            "fill",
            json!("transparent"),
            simple("background-color"),
        ));
        registry.register(PropertyDefinition::new(
            "width",
            "layout",
            json!("auto"),
            simple("width"),
        ));
        registry.register(PropertyDefinition::new(
            "maxWidth",
            "layout",
            json!("none"),
            simple("max-width"),
        ));
        registry.register(PropertyDefinition::new(
            "margin",
            "layout",
            json!("0"),
            simple("margin"),
        ));
        registry.register(PropertyDefinition::new(
            "padding",
            "layout",
            json!("0"),
            simple("padding"),
        ));
        registry.register(PropertyDefinition::new(
            "opacity",
            "effects",
            json!(1.0),
            |value, _| value.as_f64().map(|v| format!("opacity: {v};")),
        ));
        registry.register(PropertyDefinition::new(
            "hide",
            "visibility",
            json!(false),
            |value, options| {
                if value.as_bool() == Some(true) {
                    if options.editor_mode {
                        // Keep hidden blocks visible-but-dimmed in the editor.
                        Some("opacity: 0.3;".to_string())
                    } else {
                        Some("display: none;".to_string())
                    }
                } else {
                    None
                }
            },
        ));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::demo::demo_registry;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registration_order_is_preserved() {
        let registry = demo_registry();
        let names: Vec<&str> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "color",
                "background",
                "width",
                "maxWidth",
                "margin",
                "padding",
                "opacity",
                "hide"
            ]
        );
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut registry = demo_registry();
        registry.register(PropertyDefinition::new(
            "width",
            "layout",
            json!("100%"),
            |_, _| Some("width: 100%;".to_string()),
        ));
        // Position unchanged, definition replaced.
        let names: Vec<&str> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names[2], "width");
        assert_eq!(registry.get("width").unwrap().default_value, json!("100%"));
    }

    #[test]
    fn test_renderer_may_decline_a_value() {
        let registry = demo_registry();
        let hide = registry.get("hide").unwrap();
        assert_eq!(hide.render(&json!(false), RenderOptions::default()), None);
        assert_eq!(
            hide.render(&json!(true), RenderOptions::default()),
            Some("display: none;".to_string())
        );
        assert_eq!(
            hide.render(&json!(true), RenderOptions { editor_mode: true }),
            Some("opacity: 0.3;".to_string())
        );
    }
}
