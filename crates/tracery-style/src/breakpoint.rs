//! Responsive breakpoint vocabulary.
//!
//! Breakpoints name fixed viewport-width conditions compiled to media query
//! features per [Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/).
//! Each minimum-width breakpoint (`sm` … `2xl`) has a maximum-width complement
//! (`max-sm` … `max-2xl`) bound to the same magnitude, so a variant can target
//! an open range (one breakpoint) or a closed range (a valid min/max pair).

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;

/// A named viewport-width condition.
///
/// [§ 4.1 width](https://www.w3.org/TR/mediaqueries-4/#width)
/// "The width media feature describes the width of the targeted display area."
///
/// The width table is fixed: sm=40rem, md=48rem, lg=64rem, xl=80rem, 2xl=96rem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Breakpoint {
    /// `(min-width: 40rem)`
    #[serde(rename = "sm")]
    #[strum(serialize = "sm")]
    Sm,
    /// `(min-width: 48rem)`
    #[serde(rename = "md")]
    #[strum(serialize = "md")]
    Md,
    /// `(min-width: 64rem)`
    #[serde(rename = "lg")]
    #[strum(serialize = "lg")]
    Lg,
    /// `(min-width: 80rem)`
    #[serde(rename = "xl")]
    #[strum(serialize = "xl")]
    Xl,
    /// `(min-width: 96rem)`
    #[serde(rename = "2xl")]
    #[strum(serialize = "2xl")]
    Xxl,
    /// `(max-width: 40rem)`
    #[serde(rename = "max-sm")]
    #[strum(serialize = "max-sm")]
    MaxSm,
    /// `(max-width: 48rem)`
    #[serde(rename = "max-md")]
    #[strum(serialize = "max-md")]
    MaxMd,
    /// `(max-width: 64rem)`
    #[serde(rename = "max-lg")]
    #[strum(serialize = "max-lg")]
    MaxLg,
    /// `(max-width: 80rem)`
    #[serde(rename = "max-xl")]
    #[strum(serialize = "max-xl")]
    MaxXl,
    /// `(max-width: 96rem)`
    #[serde(rename = "max-2xl")]
    #[strum(serialize = "max-2xl")]
    MaxXxl,
}

impl Breakpoint {
    /// The bound width in rem units.
    #[must_use]
    pub fn width_rem(self) -> u32 {
        match self {
            Breakpoint::Sm | Breakpoint::MaxSm => 40,
            Breakpoint::Md | Breakpoint::MaxMd => 48,
            Breakpoint::Lg | Breakpoint::MaxLg => 64,
            Breakpoint::Xl | Breakpoint::MaxXl => 80,
            Breakpoint::Xxl | Breakpoint::MaxXxl => 96,
        }
    }

    /// Whether this is a maximum-width breakpoint.
    #[must_use]
    pub fn is_max(self) -> bool {
        matches!(
            self,
            Breakpoint::MaxSm
                | Breakpoint::MaxMd
                | Breakpoint::MaxLg
                | Breakpoint::MaxXl
                | Breakpoint::MaxXxl
        )
    }

    /// The media feature condition for this breakpoint.
    ///
    /// [§ 2.3 Media Features](https://www.w3.org/TR/mediaqueries-4/#mq-features)
    /// "A media feature is a more fine-grained test... wrapped in parentheses."
    #[must_use]
    pub fn media_condition(self) -> String {
        if self.is_max() {
            format!("(max-width: {}rem)", self.width_rem())
        } else {
            format!("(min-width: {}rem)", self.width_rem())
        }
    }

    /// Sort key for deterministic condition ordering: min-width conditions
    /// before max-width, then ascending width.
    fn sort_key(self) -> (bool, u32) {
        (self.is_max(), self.width_rem())
    }

    /// Parse a breakpoint name (`"sm"` … `"max-2xl"`).
    ///
    /// # Errors
    ///
    /// Returns [`BreakpointParseError`] for an unknown name.
    pub fn parse(name: &str) -> Result<Self, BreakpointParseError> {
        match name {
            "sm" => Ok(Breakpoint::Sm),
            "md" => Ok(Breakpoint::Md),
            "lg" => Ok(Breakpoint::Lg),
            "xl" => Ok(Breakpoint::Xl),
            "2xl" => Ok(Breakpoint::Xxl),
            "max-sm" => Ok(Breakpoint::MaxSm),
            "max-md" => Ok(Breakpoint::MaxMd),
            "max-lg" => Ok(Breakpoint::MaxLg),
            "max-xl" => Ok(Breakpoint::MaxXl),
            "max-2xl" => Ok(Breakpoint::MaxXxl),
            other => Err(BreakpointParseError {
                name: other.to_string(),
            }),
        }
    }
}

impl std::str::FromStr for Breakpoint {
    type Err = BreakpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Breakpoint::parse(s)
    }
}

/// Error for an unrecognized breakpoint name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown breakpoint name '{name}'")]
pub struct BreakpointParseError {
    /// The name that failed to parse.
    pub name: String,
}

/// Error for an invalid breakpoint combination on a variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BreakpointPairError {
    /// A variant carries 0, 1, or 2 breakpoints — never more.
    #[error("a variant may carry at most 2 breakpoints, got {0}")]
    TooMany(usize),
    /// A 2-element set must pair one min-width with one max-width breakpoint.
    #[error("breakpoint pair {0} and {1} are both {2}-width conditions")]
    SameDirection(Breakpoint, Breakpoint, &'static str),
    /// The min-width bound must be strictly below the max-width bound.
    #[error("breakpoint pair {0} and {1} forms an empty range")]
    EmptyRange(Breakpoint, Breakpoint),
}

/// Validate a variant's breakpoint set.
///
/// A set of 0 or 1 breakpoints is always valid. A 2-element set must contain
/// one min-width and one max-width breakpoint forming a non-empty range
/// (min-width value strictly below max-width value).
///
/// # Errors
///
/// Returns [`BreakpointPairError`] describing the violated rule.
pub fn validate_pair(breakpoints: &[Breakpoint]) -> Result<(), BreakpointPairError> {
    match breakpoints {
        [] | [_] => Ok(()),
        [a, b] => {
            if a.is_max() == b.is_max() {
                let direction = if a.is_max() { "max" } else { "min" };
                return Err(BreakpointPairError::SameDirection(*a, *b, direction));
            }
            let (min, max) = if a.is_max() { (*b, *a) } else { (*a, *b) };
            if min.width_rem() >= max.width_rem() {
                return Err(BreakpointPairError::EmptyRange(min, max));
            }
            Ok(())
        }
        more => Err(BreakpointPairError::TooMany(more.len())),
    }
}

/// The complete `@media` prelude for a breakpoint set, with conditions in
/// deterministic order (min-width before max-width) joined by `and`.
///
/// [§ 2.1 Combining Media Queries](https://www.w3.org/TR/mediaqueries-4/#media)
/// "Several media features can be combined into a single media query using
/// the `and` keyword."
///
/// This string doubles as the compiler's bucket key: two variants share a
/// media block exactly when they produce the same query text.
#[must_use]
pub fn media_query(breakpoints: &[Breakpoint]) -> String {
    let mut sorted = breakpoints.to_vec();
    sorted.sort_by_key(|bp| bp.sort_key());
    let conditions: Vec<String> = sorted.iter().map(|bp| bp.media_condition()).collect();
    format!("@media {}", conditions.join(" and "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_table_is_exact() {
        assert_eq!(Breakpoint::Sm.width_rem(), 40);
        assert_eq!(Breakpoint::Md.width_rem(), 48);
        assert_eq!(Breakpoint::Lg.width_rem(), 64);
        assert_eq!(Breakpoint::Xl.width_rem(), 80);
        assert_eq!(Breakpoint::Xxl.width_rem(), 96);
        assert_eq!(Breakpoint::MaxLg.width_rem(), 64);
    }

    #[test]
    fn test_parse_round_trips_display() {
        for name in [
            "sm", "md", "lg", "xl", "2xl", "max-sm", "max-md", "max-lg", "max-xl", "max-2xl",
        ] {
            let bp = Breakpoint::parse(name).unwrap();
            assert_eq!(bp.to_string(), name);
        }
        assert!(Breakpoint::parse("xs").is_err());
    }

    #[test]
    fn test_validate_pair_accepts_valid_ranges() {
        assert!(validate_pair(&[]).is_ok());
        assert!(validate_pair(&[Breakpoint::Md]).is_ok());
        assert!(validate_pair(&[Breakpoint::Sm, Breakpoint::MaxLg]).is_ok());
        // Order within the set does not matter.
        assert!(validate_pair(&[Breakpoint::MaxLg, Breakpoint::Sm]).is_ok());
    }

    #[test]
    fn test_validate_pair_rejects_same_direction() {
        let err = validate_pair(&[Breakpoint::Sm, Breakpoint::Md]).unwrap_err();
        assert!(matches!(err, BreakpointPairError::SameDirection(..)));

        let err = validate_pair(&[Breakpoint::MaxSm, Breakpoint::MaxMd]).unwrap_err();
        assert!(matches!(err, BreakpointPairError::SameDirection(..)));
    }

    #[test]
    fn test_validate_pair_rejects_empty_and_inverted_ranges() {
        // min 64 / max 40 is inverted.
        let err = validate_pair(&[Breakpoint::Lg, Breakpoint::MaxSm]).unwrap_err();
        assert!(matches!(err, BreakpointPairError::EmptyRange(..)));

        // min 40 / max 40 is empty (bounds are exclusive of each other).
        let err = validate_pair(&[Breakpoint::Sm, Breakpoint::MaxSm]).unwrap_err();
        assert!(matches!(err, BreakpointPairError::EmptyRange(..)));
    }

    #[test]
    fn test_validate_pair_rejects_three_breakpoints() {
        let err =
            validate_pair(&[Breakpoint::Sm, Breakpoint::MaxLg, Breakpoint::MaxXl]).unwrap_err();
        assert_eq!(err, BreakpointPairError::TooMany(3));
    }

    #[test]
    fn test_media_query_orders_min_before_max() {
        // Input order must not leak into the output.
        assert_eq!(
            media_query(&[Breakpoint::MaxLg, Breakpoint::Sm]),
            "@media (min-width: 40rem) and (max-width: 64rem)"
        );
        assert_eq!(
            media_query(&[Breakpoint::Sm, Breakpoint::MaxLg]),
            "@media (min-width: 40rem) and (max-width: 64rem)"
        );
        assert_eq!(media_query(&[Breakpoint::Md]), "@media (min-width: 48rem)");
    }
}
