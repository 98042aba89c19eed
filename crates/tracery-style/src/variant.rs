//! Variant model and style set.
//!
//! One style property holds an ordered list of [`Variant`]s. Each variant
//! pairs a value with two optional axes: a breakpoint set (responsive
//! condition) and a state set (interaction/view condition). A variant with
//! both axes empty is the property's *base* variant.
//!
//! The [`StyleSet`] is the persisted editing unit: a JSON-compatible mapping
//! `{ [property]: [{ value, breakpoint?, state? }] }` that round-trips
//! through serde unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::breakpoint::Breakpoint;
use crate::state::{StateTarget, same_state_set};

/// One conditioned value of a style property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// The property value. Values are opaque to the core; only the
    /// registry's renderer interprets them.
    pub value: Value,
    /// The responsive axis: 0, 1, or a valid min/max pair of breakpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakpoint: Vec<Breakpoint>,
    /// The state axis: zero or more state targets that must all hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state: Vec<StateTarget>,
}

impl Variant {
    /// A base variant: a bare value with both axes empty.
    #[must_use]
    pub fn base(value: Value) -> Self {
        Variant {
            value,
            breakpoint: Vec::new(),
            state: Vec::new(),
        }
    }

    /// Builder: attach a breakpoint set.
    #[must_use]
    pub fn with_breakpoints(mut self, breakpoints: &[Breakpoint]) -> Self {
        self.breakpoint = breakpoints.to_vec();
        self
    }

    /// Builder: attach a state set.
    #[must_use]
    pub fn with_states(mut self, states: &[StateTarget]) -> Self {
        self.state = states.to_vec();
        self
    }

    /// Whether this is the base variant (both axes empty).
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.breakpoint.is_empty() && self.state.is_empty()
    }

    /// Order-insensitive equality of this variant's axes against the given
    /// breakpoint and state sets.
    #[must_use]
    pub fn matches_axes(&self, breakpoints: &[Breakpoint], states: &[StateTarget]) -> bool {
        same_breakpoint_set(&self.breakpoint, breakpoints) && same_state_set(&self.state, states)
    }
}

/// Order-insensitive set equality on breakpoint lists.
#[must_use]
pub fn same_breakpoint_set(a: &[Breakpoint], b: &[Breakpoint]) -> bool {
    a.len() == b.len() && a.iter().all(|item| b.contains(item))
}

/// A mapping from style property name to its variant list.
///
/// An absent key and an empty list mean the same thing — "property unset" —
/// and every mutation that empties a list removes the key, so the two forms
/// never coexist after a round-trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSet {
    properties: BTreeMap<String, Vec<Variant>>,
}

impl StyleSet {
    /// An empty style set.
    #[must_use]
    pub fn new() -> Self {
        StyleSet::default()
    }

    /// The variants of a property, if set.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&[Variant]> {
        self.properties.get(property).map(Vec::as_slice)
    }

    /// Whether the set holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The number of set properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Iterate property names in stable (sorted) order.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Replace a property's full variant list.
    ///
    /// An empty list deletes the key: absence is the canonical "unset" form.
    pub fn set_variants(&mut self, property: &str, variants: Vec<Variant>) {
        if variants.is_empty() {
            let _ = self.properties.remove(property);
        } else {
            let _ = self.properties.insert(property.to_string(), variants);
        }
    }

    /// Remove a property entirely.
    pub fn remove(&mut self, property: &str) {
        let _ = self.properties.remove(property);
    }

    /// The base variant's value for a property, if one exists.
    #[must_use]
    pub fn base_value(&self, property: &str) -> Option<&Value> {
        self.get(property)?
            .iter()
            .find(|v| v.is_base())
            .map(|v| &v.value)
    }

    /// The value of the variant whose axes equal the given sets, if any.
    #[must_use]
    pub fn variant_value(
        &self,
        property: &str,
        breakpoints: &[Breakpoint],
        states: &[StateTarget],
    ) -> Option<&Value> {
        self.get(property)?
            .iter()
            .find(|v| v.matches_axes(breakpoints, states))
            .map(|v| &v.value)
    }

    /// Update the existing variant with equal axes in place, or append the
    /// variant if no axis match exists.
    pub fn upsert_variant(&mut self, property: &str, variant: Variant) {
        let list = self.properties.entry(property.to_string()).or_default();
        if let Some(existing) = list
            .iter_mut()
            .find(|v| v.matches_axes(&variant.breakpoint, &variant.state))
        {
            existing.value = variant.value;
        } else {
            list.push(variant);
        }
    }

    /// Remove the variant whose axes equal the given sets.
    ///
    /// If the removal empties the list, the key is deleted entirely — the
    /// property must not round-trip as "present but empty".
    pub fn remove_variant(
        &mut self,
        property: &str,
        breakpoints: &[Breakpoint],
        states: &[StateTarget],
    ) {
        if let Some(list) = self.properties.get_mut(property) {
            list.retain(|v| !v.matches_axes(breakpoints, states));
            if list.is_empty() {
                let _ = self.properties.remove(property);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;
    use serde_json::json;

    #[test]
    fn test_base_variant_lookup() {
        let mut set = StyleSet::new();
        set.set_variants(
            "color",
            vec![
                Variant::base(json!("black")),
                Variant::base(json!("red")).with_states(&[StateTarget::on_self(State::Hover)]),
            ],
        );
        assert_eq!(set.base_value("color"), Some(&json!("black")));
        assert_eq!(set.base_value("width"), None);
    }

    #[test]
    fn test_axes_equality_is_order_insensitive() {
        let variant = Variant::base(json!(1))
            .with_breakpoints(&[Breakpoint::Sm, Breakpoint::MaxLg])
            .with_states(&[StateTarget::on_self(State::Hover)]);
        assert!(variant.matches_axes(
            &[Breakpoint::MaxLg, Breakpoint::Sm],
            &[StateTarget::on_self(State::Hover)],
        ));
        assert!(!variant.matches_axes(&[Breakpoint::Sm], &[StateTarget::on_self(State::Hover)]));
    }

    #[test]
    fn test_upsert_updates_in_place() {
        let mut set = StyleSet::new();
        set.upsert_variant("width", Variant::base(json!("50%")));
        set.upsert_variant("width", Variant::base(json!("100%")));
        let variants = set.get("width").unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].value, json!("100%"));

        // A different axis appends instead.
        set.upsert_variant(
            "width",
            Variant::base(json!("25%")).with_breakpoints(&[Breakpoint::Md]),
        );
        assert_eq!(set.get("width").unwrap().len(), 2);
    }

    #[test]
    fn test_remove_variant_deletes_emptied_key() {
        let mut set = StyleSet::new();
        set.upsert_variant("opacity", Variant::base(json!(0.5)));
        set.remove_variant("opacity", &[], &[]);
        assert!(set.get("opacity").is_none());
        assert!(set.is_empty());

        // Removing from an absent property is a no-op.
        set.remove_variant("opacity", &[], &[]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_variants_with_empty_list_deletes_key() {
        let mut set = StyleSet::new();
        set.set_variants("color", vec![Variant::base(json!("black"))]);
        set.set_variants("color", Vec::new());
        assert!(set.get("color").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let mut set = StyleSet::new();
        set.set_variants(
            "color",
            vec![
                Variant::base(json!("black")),
                Variant::base(json!("blue"))
                    .with_breakpoints(&[Breakpoint::Sm])
                    .with_states(&[StateTarget::on_self(State::Hover)]),
            ],
        );

        let json = serde_json::to_string(&set).unwrap();
        let back: StyleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, back);

        // Empty axes are omitted from the serialized form.
        assert!(!json.contains("\"breakpoint\":[]"));
        assert!(!json.contains("\"state\":[]"));
    }
}
