//! Result and error types for Pagina.
//!
//! Two failure families exist. Location failures (`ElementExecute`,
//! `Navigation`, `Timeout`) are raised as errors by verb-internal logic and
//! converted to an [`crate::pipeline::ActionResult::Failure`] only at the
//! pipeline boundary. Validation mismatches travel as data inside
//! [`crate::validation::ValidationResult`]; only the validate verb turns an
//! invalid result into a [`PaginaError::ValidationFailed`] carrying the
//! rendered diff table.

use thiserror::Error;

/// Result type for Pagina operations
pub type PaginaResult<T> = Result<T, PaginaError>;

/// Errors that can occur in Pagina
#[derive(Debug, Clone, Error)]
pub enum PaginaError {
    /// A property/field could not be found, or the underlying element is not
    /// present. Carries the attempted name and the declared candidate names
    /// so a failure message never reads as a bare "not found".
    #[error("{message}")]
    ElementExecute {
        /// The name the caller attempted to resolve
        name: String,
        /// Declaring page type or page name
        page: String,
        /// Declared property names on the page, for diagnostics
        candidates: Vec<String>,
        /// Pre-rendered human-readable message
        message: String,
    },

    /// The named property exists but is declared as a list; a business
    /// outcome recoverable by using a list verb, not a location fault.
    #[error("property '{name}' on page '{page}' was found but is a list; use a list operation instead")]
    PropertyIsList {
        /// The property's declared name
        name: String,
        /// Declaring page type or page name
        page: String,
    },

    /// Declared validations did not hold; a business outcome carrying the
    /// rendered expected-vs-actual diff table
    #[error("validation failed:\n{table}")]
    ValidationFailed {
        /// Rendered comparison table naming each failed check
        table: String,
    },

    /// A page-level operation could not establish the expected page state
    #[error("navigation failure on page '{page}': {message}")]
    Navigation {
        /// Page name or type id
        page: String,
        /// Error message
        message: String,
    },

    /// A bounded poll loop exceeded its timeout
    #[error("operation timed out after {elapsed_ms}ms (timeout {ms}ms)")]
    Timeout {
        /// Configured timeout in milliseconds
        ms: u64,
        /// Observed elapsed time in milliseconds
        elapsed_ms: u64,
    },

    /// Invalid declarative configuration (duplicate property names, unknown
    /// nested type ids, unsupported comparison for a validation mode)
    #[error("configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl PaginaError {
    /// Build an [`PaginaError::ElementExecute`] for a name that resolved to
    /// nothing on a page, listing the declared candidates.
    #[must_use]
    pub fn not_found(name: &str, page: &str, candidates: Vec<String>) -> Self {
        let listed = if candidates.is_empty() {
            "none".to_string()
        } else {
            candidates.join(", ")
        };
        Self::ElementExecute {
            name: name.to_string(),
            page: page.to_string(),
            candidates,
            message: format!(
                "could not locate property '{name}' on page '{page}'; declared properties: {listed}"
            ),
        }
    }

    /// Build an [`PaginaError::ElementExecute`] for an element that exists in
    /// the page model but is not present in the running UI.
    #[must_use]
    pub fn element_missing(name: &str, page: &str) -> Self {
        Self::ElementExecute {
            name: name.to_string(),
            page: page.to_string(),
            candidates: Vec::new(),
            message: format!("element '{name}' on page '{page}' does not exist in the UI"),
        }
    }

    /// Build an [`PaginaError::ElementExecute`] with a custom detail message
    #[must_use]
    pub fn element_execute(name: &str, page: &str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::ElementExecute {
            name: name.to_string(),
            page: page.to_string(),
            candidates: Vec::new(),
            message: format!("element '{name}' on page '{page}': {detail}"),
        }
    }

    /// Build a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error is a location failure (as opposed to a business
    /// outcome such as [`PaginaError::PropertyIsList`])
    #[must_use]
    pub fn is_location_failure(&self) -> bool {
        matches!(
            self,
            Self::ElementExecute { .. } | Self::Navigation { .. } | Self::Timeout { .. }
        )
    }
}
