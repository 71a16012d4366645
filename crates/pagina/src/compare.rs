//! Comparison engine: pure evaluation of one declared rule against an
//! actual value.
//!
//! Text comparisons are case-insensitive because expected values come from
//! human-authored assertion tables. State rules (`Exists`, `Enabled`, ...)
//! are evaluated against element probes by the property handle, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of comparison rules usable in validation tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonRule {
    /// Actual equals expected (case-insensitive)
    Equals,
    /// Actual does not equal expected
    DoesNotEqual,
    /// Actual contains expected as a substring
    Contains,
    /// Actual does not contain expected
    DoesNotContain,
    /// Actual starts with expected
    StartsWith,
    /// Actual ends with expected
    EndsWith,
    /// The field's element exists
    Exists,
    /// The field's element does not exist
    DoesNotExist,
    /// The field's element is enabled
    Enabled,
    /// The field's element is not enabled
    NotEnabled,
}

impl ComparisonRule {
    /// All rules, in declaration order
    pub const ALL: [Self; 10] = [
        Self::Equals,
        Self::DoesNotEqual,
        Self::Contains,
        Self::DoesNotContain,
        Self::StartsWith,
        Self::EndsWith,
        Self::Exists,
        Self::DoesNotExist,
        Self::Enabled,
        Self::NotEnabled,
    ];

    /// Display name used in rendered diff tables
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::DoesNotEqual => "DoesNotEqual",
            Self::Contains => "Contains",
            Self::DoesNotContain => "DoesNotContain",
            Self::StartsWith => "StartsWith",
            Self::EndsWith => "EndsWith",
            Self::Exists => "Exists",
            Self::DoesNotExist => "DoesNotExist",
            Self::Enabled => "Enabled",
            Self::NotEnabled => "NotEnabled",
        }
    }

    /// Parse a rule from a free-form name, tolerating case and spacing
    /// ("does not equal", "DoesNotEqual", "doesnotequal" all parse).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let key = crate::normalize::normalize(name);
        Self::ALL
            .into_iter()
            .find(|rule| crate::normalize::normalize(rule.name()) == key)
    }

    /// Whether this rule probes element state rather than displayed text
    #[must_use]
    pub const fn is_state_rule(&self) -> bool {
        matches!(
            self,
            Self::Exists | Self::DoesNotExist | Self::Enabled | Self::NotEnabled
        )
    }

    /// Whether this rule passes automatically when the field is absent.
    /// Negative checks assert the absence of something, so a missing field
    /// satisfies them.
    #[must_use]
    pub const fn passes_when_absent(&self) -> bool {
        matches!(
            self,
            Self::DoesNotEqual | Self::DoesNotContain | Self::DoesNotExist
        )
    }

    /// Evaluate this rule against a single actual text value.
    ///
    /// State rules cannot be decided from text; callers route those through
    /// [`ComparisonRule::evaluate_state`] instead.
    #[must_use]
    pub fn evaluate(&self, expected: &str, actual: &str) -> bool {
        let expected_lc = expected.to_lowercase();
        let actual_lc = actual.to_lowercase();
        match self {
            Self::Equals => actual_lc == expected_lc,
            Self::DoesNotEqual => actual_lc != expected_lc,
            Self::Contains => actual_lc.contains(&expected_lc),
            Self::DoesNotContain => !actual_lc.contains(&expected_lc),
            Self::StartsWith => actual_lc.starts_with(&expected_lc),
            Self::EndsWith => actual_lc.ends_with(&expected_lc),
            // A text value being present at all satisfies existence
            Self::Exists => true,
            Self::DoesNotExist => false,
            // State rules cannot be decided from text alone
            Self::Enabled | Self::NotEnabled => false,
        }
    }

    /// Evaluate a state rule against the element's probe results
    #[must_use]
    pub const fn evaluate_state(&self, exists: bool, enabled: bool) -> bool {
        match self {
            Self::Exists => exists,
            Self::DoesNotExist => !exists,
            Self::Enabled => exists && enabled,
            Self::NotEnabled => exists && !enabled,
            _ => false,
        }
    }

    /// Evaluate this rule against a multi-valued actual: the rule passes if
    /// any contained value satisfies it. An empty collection follows the
    /// absence policy.
    #[must_use]
    pub fn evaluate_many<'a, I>(&self, expected: &str, actuals: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = false;
        for actual in actuals {
            seen = true;
            if self.evaluate(expected, actual) {
                return true;
            }
        }
        if !seen {
            return self.passes_when_absent();
        }
        false
    }
}

impl fmt::Display for ComparisonRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
