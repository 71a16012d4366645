//! Validation engine: declarative expected-vs-actual comparison over single
//! items and repeating lists, with tabular diff rendering.
//!
//! Mismatches are data, not errors: each check is recorded in a
//! [`ValidationCheck`] and folded into a [`ValidationResult`]. Errors are
//! raised only for location failures and invalid configuration (an
//! unsupported comparison for list mode always raises, in both the single
//! and list paths).

use crate::compare::ComparisonRule;
use crate::handle::PropertyHandle;
use crate::locator;
use crate::page::PageObject;
use crate::result::{PaginaError, PaginaResult};
use serde::{Deserialize, Serialize};

/// One declared field/rule/expected-value triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemValidation {
    /// User-facing field name
    pub field: String,
    /// Comparison rule to apply
    pub rule: ComparisonRule,
    /// Raw expected value, parsed per rule
    pub expected: String,
}

impl ItemValidation {
    /// Create a validation triple
    #[must_use]
    pub fn new(field: impl Into<String>, rule: ComparisonRule, expected: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule,
            expected: expected.into(),
        }
    }
}

/// Comparer strategy for list validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListComparison {
    /// Valid when at least one item satisfies all validations
    Contains,
    /// Valid when no item satisfies all validations
    DoesNotContain,
    /// Valid when the number of items satisfying all validations equals the
    /// declared count, regardless of order or total item count
    ContainsExactly(usize),
}

impl ListComparison {
    /// Derive a list comparer from a comparison rule. Rules with no list
    /// semantics are a configuration error, raised rather than silently
    /// treated as false.
    pub fn from_rule(rule: ComparisonRule) -> PaginaResult<Self> {
        match rule {
            ComparisonRule::Contains => Ok(Self::Contains),
            ComparisonRule::DoesNotContain => Ok(Self::DoesNotContain),
            other => Err(PaginaError::configuration(format!(
                "comparison '{other}' is not supported for list validation"
            ))),
        }
    }

    /// Display name for reports
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Contains => "Contains".to_string(),
            Self::DoesNotContain => "DoesNotContain".to_string(),
            Self::ContainsExactly(n) => format!("ContainsExactly({n})"),
        }
    }
}

/// Builder for a [`ValidationTable`]
#[derive(Debug, Clone, Default)]
pub struct ValidationTableBuilder {
    validations: Vec<ItemValidation>,
    comparer: Option<ListComparison>,
}

impl ValidationTableBuilder {
    /// Add one validation triple
    #[must_use]
    pub fn with_validation(mut self, validation: ItemValidation) -> Self {
        self.validations.push(validation);
        self
    }

    /// Choose the comparer strategy for list mode
    #[must_use]
    pub const fn with_comparer(mut self, comparer: ListComparison) -> Self {
        self.comparer = Some(comparer);
        self
    }

    /// Freeze into an immutable table
    #[must_use]
    pub fn process(self) -> ValidationTable {
        ValidationTable {
            validations: self.validations,
            comparer: self.comparer,
        }
    }
}

/// Ordered, immutable sequence of validations plus the chosen list comparer.
/// Built once per assertion step via [`ValidationTable::builder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationTable {
    validations: Vec<ItemValidation>,
    comparer: Option<ListComparison>,
}

impl ValidationTable {
    /// Start building a table
    #[must_use]
    pub fn builder() -> ValidationTableBuilder {
        ValidationTableBuilder::default()
    }

    /// The declared validations, in order
    #[must_use]
    pub fn validations(&self) -> &[ItemValidation] {
        &self.validations
    }

    /// The chosen list comparer, if any
    #[must_use]
    pub const fn comparer(&self) -> Option<ListComparison> {
        self.comparer
    }
}

/// Outcome of one validation against one checked item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCheck {
    /// The validation that was evaluated
    pub validation: ItemValidation,
    /// Whether the field resolved on the checked item
    pub found: bool,
    /// Whether the check passed
    pub passed: bool,
    /// Recorded actual value, for diffing
    pub actual: Option<String>,
}

/// Per-checked-item pass/fail with recorded actual values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationItemResult {
    /// The individual checks, in table order
    pub checks: Vec<ValidationCheck>,
}

impl ValidationItemResult {
    /// Create an empty item result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one check
    pub fn record(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    /// Whether every check passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    /// First recorded actual value, used to name items in list diffs
    #[must_use]
    pub fn first_actual(&self) -> Option<&str> {
        self.checks
            .iter()
            .find_map(|check| check.actual.as_deref())
    }
}

/// Aggregated validation outcome; created fresh per validation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Number of items checked (1 in single-item mode)
    pub item_count: usize,
    /// Overall validity under the chosen mode
    pub is_valid: bool,
    /// Per-item results
    pub items: Vec<ValidationItemResult>,
    /// Mode-level failure detail (e.g. which items were unexpected)
    pub detail: Option<String>,
}

impl ValidationResult {
    /// Render one row per validation as `| field | rule | value |`, with a
    /// header row. The value cell is annotated `expected [actual]` on
    /// mismatch and the field cell `field [Not Found]` when the field did
    /// not resolve. Columns are right-padded to the widest cell, header
    /// included.
    #[must_use]
    pub fn comparison_table(&self) -> String {
        let mut rows = vec![vec![
            "Field".to_string(),
            "Rule".to_string(),
            "Value".to_string(),
        ]];
        for item in &self.items {
            for check in &item.checks {
                rows.push(vec![
                    field_cell(check),
                    check.validation.rule.name().to_string(),
                    value_cell(check),
                ]);
            }
        }
        render_table(&rows)
    }

    /// Render a per-rule table: one header cell per validation
    /// (`field Rule expected`) and a single body row of actual values.
    ///
    /// Exactly one checked item must exist; rendering a multi-item result
    /// this way is a caller usage error and raises.
    pub fn comparison_table_by_rule(&self) -> PaginaResult<String> {
        if self.items.len() != 1 {
            return Err(PaginaError::configuration(format!(
                "per-rule table renders exactly one checked item; {} present",
                self.items.len()
            )));
        }
        let item = &self.items[0];
        let header = item
            .checks
            .iter()
            .map(|check| {
                format!(
                    "{} {} {}",
                    field_cell(check),
                    check.validation.rule.name(),
                    check.validation.expected
                )
            })
            .collect();
        let body = item
            .checks
            .iter()
            .map(|check| check.actual.clone().unwrap_or_default())
            .collect();
        Ok(render_table(&[header, body]))
    }
}

fn field_cell(check: &ValidationCheck) -> String {
    if check.found {
        check.validation.field.clone()
    } else {
        format!("{} [Not Found]", check.validation.field)
    }
}

fn value_cell(check: &ValidationCheck) -> String {
    match (&check.passed, &check.actual) {
        (false, Some(actual)) => format!("{} [{actual}]", check.validation.expected),
        _ => check.validation.expected.clone(),
    }
}

fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    rows.iter()
        .map(|row| {
            let mut line = String::from("|");
            for (i, width) in widths.iter().enumerate() {
                let cell = row.get(i).map_or("", String::as_str);
                let pad = width - cell.chars().count();
                line.push(' ');
                line.push_str(cell);
                line.push_str(&" ".repeat(pad));
                line.push_str(" |");
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Evaluate one validation against an optionally-resolved property handle
pub(crate) fn check_one(
    validation: &ItemValidation,
    handle: Option<&PropertyHandle>,
) -> PaginaResult<ValidationCheck> {
    match handle {
        None => Ok(ValidationCheck {
            validation: validation.clone(),
            found: false,
            passed: validation.rule.passes_when_absent(),
            actual: None,
        }),
        Some(handle) => {
            let (passed, actual) = handle.validate_item(validation)?;
            Ok(ValidationCheck {
                validation: validation.clone(),
                found: true,
                passed,
                actual,
            })
        }
    }
}

/// Single-item mode: resolve each validation's field through `resolver` and
/// fold the checks into one result. A field that does not resolve is a named
/// failure unless its rule tolerates absence.
pub fn evaluate_single<'a, R>(table: &ValidationTable, mut resolver: R) -> PaginaResult<ValidationResult>
where
    R: FnMut(&ItemValidation) -> Option<&'a PropertyHandle>,
{
    let mut item = ValidationItemResult::new();
    for validation in table.validations() {
        let handle = resolver(validation);
        item.record(check_one(validation, handle)?);
    }
    let is_valid = item.passed();
    tracing::debug!(checks = item.checks.len(), is_valid, "single-item validation evaluated");
    Ok(ValidationResult {
        item_count: 1,
        is_valid,
        items: vec![item],
        detail: None,
    })
}

/// List mode: evaluate the whole table against each item page and combine
/// per the comparer.
pub fn evaluate_list(
    comparer: ListComparison,
    validations: &[ItemValidation],
    items: &[PageObject],
) -> PaginaResult<ValidationResult> {
    let mut results = Vec::with_capacity(items.len());
    for page in items {
        let mut item = ValidationItemResult::new();
        for validation in validations {
            let handle = locator::try_get_property(page, &validation.field);
            item.record(check_one(validation, handle)?);
        }
        results.push(item);
    }

    let satisfying = results.iter().filter(|item| item.passed()).count();
    let (is_valid, detail) = match comparer {
        ListComparison::Contains => {
            let valid = satisfying >= 1;
            let detail = (!valid)
                .then(|| format!("no item of {} satisfied all validations", results.len()));
            (valid, detail)
        }
        ListComparison::DoesNotContain => {
            let valid = satisfying == 0;
            let detail =
                (!valid).then(|| format!("{satisfying} item(s) unexpectedly satisfied the table"));
            (valid, detail)
        }
        ListComparison::ContainsExactly(expected) => {
            let valid = satisfying == expected;
            let detail = if valid {
                None
            } else {
                // Surplus matches beyond the expected count are the
                // interesting ones; name them in the diff
                let extras: Vec<String> = results
                    .iter()
                    .filter(|item| item.passed())
                    .skip(expected)
                    .map(|item| item.first_actual().unwrap_or("<unknown>").to_string())
                    .collect();
                let mut message = format!(
                    "expected exactly {expected} matching item(s), found {satisfying} of {}",
                    results.len()
                );
                if !extras.is_empty() {
                    message.push_str(&format!("; unexpected items: [{}]", extras.join(", ")));
                }
                Some(message)
            };
            (valid, detail)
        }
    };

    tracing::debug!(
        comparer = %comparer.name(),
        item_count = results.len(),
        satisfying,
        is_valid,
        "list validation evaluated"
    );
    Ok(ValidationResult {
        item_count: results.len(),
        is_valid,
        items: results,
        detail,
    })
}
