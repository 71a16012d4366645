//! Property handles: the lazily-bound unit representing one logical page
//! property.
//!
//! A handle never caches the native element reference; the resolution thunk
//! runs again on every access because UI elements detach and reattach
//! between calls. `is_list` and `is_element` are mutually exclusive; a
//! handle that is neither is a plain data property.

use crate::config::Settings;
use crate::descriptor::PropertyKind;
use crate::element::{ClickError, ElementRef, FillRegistry};
use crate::page::PageObject;
use crate::result::{PaginaError, PaginaResult};
use crate::validation::{evaluate_list, ItemValidation, ListComparison, ValidationResult};
use crate::wait::{self, WaitOptions};
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Lazy resolution thunk producing the current native element, or `None`
/// when the element is not in the UI
pub type ElementResolver = Arc<dyn Fn() -> Option<ElementRef> + Send + Sync>;

/// Lazy enumeration of a list property's current child pages
pub type ItemEnumerator = Arc<dyn Fn() -> Vec<PageObject> + Send + Sync>;

/// Lazy construction of a nested page rooted at this property's element
pub type NestedPageResolver = Arc<dyn Fn() -> Option<PageObject> + Send + Sync>;

/// Conditions usable with [`PropertyHandle::wait_for_element_condition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementCondition {
    /// Element is present in the UI
    Exists,
    /// Element is absent from the UI
    NotExists,
    /// Element is present and enabled
    Enabled,
    /// Element is present but not enabled
    NotEnabled,
    /// Element is present and has stopped moving
    Stationary,
}

impl fmt::Display for ElementCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exists => "exists",
            Self::NotExists => "not exists",
            Self::Enabled => "enabled",
            Self::NotEnabled => "not enabled",
            Self::Stationary => "stationary",
        };
        write!(f, "{name}")
    }
}

/// Lazily-bound accessor for one named page property
pub struct PropertyHandle {
    name: String,
    page_type: String,
    kind: PropertyKind,
    resolver: Option<ElementResolver>,
    items: Option<ItemEnumerator>,
    nested: Option<NestedPageResolver>,
    data: Option<Arc<RwLock<Vec<String>>>>,
    fills: Arc<FillRegistry>,
    settings: Settings,
}

impl fmt::Debug for PropertyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyHandle")
            .field("name", &self.name)
            .field("page_type", &self.page_type)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl PropertyHandle {
    /// Create a plain data property backed by an internal value store
    #[must_use]
    pub fn data_property(name: impl Into<String>, page_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page_type: page_type.into(),
            kind: PropertyKind::Scalar,
            resolver: None,
            items: None,
            nested: None,
            data: Some(Arc::new(RwLock::new(Vec::new()))),
            fills: Arc::new(FillRegistry::new()),
            settings: Settings::default(),
        }
    }

    /// Create a single-element property
    #[must_use]
    pub fn element_property(
        name: impl Into<String>,
        page_type: impl Into<String>,
        resolver: ElementResolver,
        fills: Arc<FillRegistry>,
        settings: Settings,
    ) -> Self {
        Self {
            name: name.into(),
            page_type: page_type.into(),
            kind: PropertyKind::Element,
            resolver: Some(resolver),
            items: None,
            nested: None,
            data: None,
            fills,
            settings,
        }
    }

    /// Create a list property: a parent element resolver plus a lazy child
    /// page enumerator
    #[must_use]
    pub fn list_property(
        name: impl Into<String>,
        page_type: impl Into<String>,
        resolver: ElementResolver,
        items: ItemEnumerator,
        fills: Arc<FillRegistry>,
        settings: Settings,
    ) -> Self {
        Self {
            name: name.into(),
            page_type: page_type.into(),
            kind: PropertyKind::List,
            resolver: Some(resolver),
            items: Some(items),
            nested: None,
            data: None,
            fills,
            settings,
        }
    }

    /// Create a nested-page property
    #[must_use]
    pub fn nested_page_property(
        name: impl Into<String>,
        page_type: impl Into<String>,
        resolver: ElementResolver,
        nested: NestedPageResolver,
        fills: Arc<FillRegistry>,
        settings: Settings,
    ) -> Self {
        Self {
            name: name.into(),
            page_type: page_type.into(),
            kind: PropertyKind::NestedPage,
            resolver: Some(resolver),
            items: None,
            nested: Some(nested),
            data: None,
            fills,
            settings,
        }
    }

    /// User-facing property name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaring page type id
    #[must_use]
    pub fn page_type(&self) -> &str {
        &self.page_type
    }

    /// Declared property kind
    #[must_use]
    pub const fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Whether this handle binds a single element (nested pages are
    /// element-backed too)
    #[must_use]
    pub const fn is_element(&self) -> bool {
        matches!(self.kind, PropertyKind::Element | PropertyKind::NestedPage)
    }

    /// Whether this handle is a repeating list
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self.kind, PropertyKind::List)
    }

    /// Whether this handle is a plain data property
    #[must_use]
    pub const fn is_data(&self) -> bool {
        matches!(self.kind, PropertyKind::Scalar)
    }

    /// Re-run the resolution thunk and return the current native element
    #[must_use]
    pub fn resolve(&self) -> Option<ElementRef> {
        self.resolver.as_ref().and_then(|resolver| resolver())
    }

    fn resolve_required(&self) -> PaginaResult<ElementRef> {
        self.resolve()
            .filter(|element| element.exists())
            .ok_or_else(|| PaginaError::element_missing(&self.name, &self.page_type))
    }

    /// Whether the underlying element currently exists. Never fails.
    #[must_use]
    pub fn check_element_exists(&self) -> bool {
        self.resolve().is_some_and(|element| element.exists())
    }

    /// Whether the underlying element currently exists and is enabled.
    /// Never fails.
    #[must_use]
    pub fn check_element_enabled(&self) -> bool {
        self.resolve()
            .is_some_and(|element| element.exists() && element.is_enabled())
    }

    /// Click the element. With `wait_for_still_element` enabled (the
    /// default) the click is preceded by a bounded wait for the element to
    /// be stationary and enabled; a timeout there falls through to a
    /// best-effort click. A "not clickable" error from the native layer is
    /// treated as success.
    pub fn click_element(&self) -> PaginaResult<()> {
        let _ = self.resolve_required()?;
        if self.settings.wait_for_still_element {
            let options = WaitOptions::new()
                .with_timeout(self.settings.default_timeout_ms)
                .with_poll_interval(self.settings.poll_interval_ms);
            let still = wait::wait_for(
                || {
                    self.resolve()
                        .is_some_and(|element| element.is_stationary() && element.is_enabled())
                },
                &options,
            );
            if still.is_err() {
                tracing::debug!(
                    property = %self.name,
                    "element never became still and enabled; clicking anyway"
                );
            }
        }
        let element = self.resolve_required()?;
        match element.click() {
            Ok(()) => Ok(()),
            Err(ClickError::NotClickable) => {
                tracing::debug!(
                    property = %self.name,
                    "native layer reported not-clickable; treating as actuated"
                );
                Ok(())
            }
            Err(ClickError::Other(message)) => Err(PaginaError::element_execute(
                &self.name,
                &self.page_type,
                format!("click failed: {message}"),
            )),
        }
    }

    /// Fill the element with a value, dispatching by native element kind
    pub fn fill_data(&self, value: &str) -> PaginaResult<()> {
        let element = self.resolve_required()?;
        let handler = self.fills.handler_for(element.kind()).ok_or_else(|| {
            PaginaError::element_execute(
                &self.name,
                &self.page_type,
                format!("no fill strategy for kind '{}'", element.kind()),
            )
        })?;
        handler(element.as_ref(), value).map_err(|message| {
            PaginaError::element_execute(&self.name, &self.page_type, format!("fill failed: {message}"))
        })
    }

    /// Current value of the property: displayed text for element-backed
    /// handles, the stored value(s) for data handles
    pub fn get_current_value(&self) -> PaginaResult<Option<String>> {
        if self.is_data() {
            let values = self.values();
            return Ok(if values.is_empty() {
                None
            } else {
                Some(values.join(", "))
            });
        }
        let element = self.resolve_required()?;
        Ok(Some(element.text()))
    }

    /// Replace the stored value of a data property
    pub fn set_value(&self, value: impl Into<String>) -> PaginaResult<()> {
        let store = self.data.as_ref().ok_or_else(|| {
            PaginaError::element_execute(&self.name, &self.page_type, "not a data property")
        })?;
        let mut values = store
            .write()
            .map_err(|_| PaginaError::configuration("data store lock poisoned"))?;
        values.clear();
        values.push(value.into());
        Ok(())
    }

    /// Append a value to a multi-valued data property
    pub fn push_value(&self, value: impl Into<String>) -> PaginaResult<()> {
        let store = self.data.as_ref().ok_or_else(|| {
            PaginaError::element_execute(&self.name, &self.page_type, "not a data property")
        })?;
        store
            .write()
            .map_err(|_| PaginaError::configuration("data store lock poisoned"))?
            .push(value.into());
        Ok(())
    }

    /// Stored values of a data property; empty for element-backed handles
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.data
            .as_ref()
            .and_then(|store| store.read().ok().map(|values| values.clone()))
            .unwrap_or_default()
    }

    /// Evaluate one validation against this property.
    ///
    /// Element handles compare displayed text; list handles delegate to the
    /// parent element's displayed text; data handles compare the stored
    /// value(s), passing when any contained value satisfies the rule. State
    /// rules (`Exists`, `Enabled`, ...) probe the element without requiring
    /// presence.
    pub fn validate_item(&self, validation: &ItemValidation) -> PaginaResult<(bool, Option<String>)> {
        let rule = validation.rule;
        if self.is_data() {
            let values = self.values();
            if rule.is_state_rule() {
                let passed = rule.evaluate_state(!values.is_empty(), true);
                return Ok((passed, None));
            }
            let passed = rule.evaluate_many(&validation.expected, values.iter().map(String::as_str));
            let actual = if values.is_empty() {
                None
            } else {
                Some(values.join(", "))
            };
            return Ok((passed, actual));
        }

        if rule.is_state_rule() {
            let element = self.resolve();
            let exists = element.as_ref().is_some_and(|e| e.exists());
            let enabled = element.as_ref().is_some_and(|e| e.is_enabled());
            let actual = if exists {
                if enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            } else {
                "not present"
            };
            return Ok((rule.evaluate_state(exists, enabled), Some(actual.to_string())));
        }

        let element = self.resolve_required()?;
        let actual = element.text();
        let passed = rule.evaluate(&validation.expected, &actual);
        Ok((passed, Some(actual)))
    }

    /// Evaluate a validation table against every current item of this list
    /// property, per the comparer strategy
    pub fn validate_list(
        &self,
        comparer: ListComparison,
        validations: &[ItemValidation],
    ) -> PaginaResult<ValidationResult> {
        let enumerator = self.items.as_ref().ok_or_else(|| {
            PaginaError::element_execute(&self.name, &self.page_type, "not a list property")
        })?;
        let _ = self.resolve_required()?;
        let items = enumerator();
        evaluate_list(comparer, validations, &items)
    }

    /// The i-th (0-based) child page of this list property. Out of range or
    /// unconstructible yields `None`, never an error.
    #[must_use]
    pub fn get_item_at_index(&self, index: usize) -> Option<PageObject> {
        let enumerator = self.items.as_ref()?;
        let mut items = enumerator();
        if index < items.len() {
            Some(items.swap_remove(index))
        } else {
            None
        }
    }

    /// The sole child page of a nested element, or the first item of a
    /// list. `None` when the page cannot be constructed.
    #[must_use]
    pub fn get_item_as_page(&self) -> Option<PageObject> {
        if let Some(nested) = self.nested.as_ref() {
            return nested();
        }
        self.get_item_at_index(0)
    }

    /// Poll until the element satisfies `condition`, using the settings
    /// timeout when none is given. A timeout becomes a descriptive location
    /// failure carrying the elapsed duration.
    pub fn wait_for_element_condition(
        &self,
        condition: ElementCondition,
        timeout: Option<Duration>,
    ) -> PaginaResult<Duration> {
        let timeout_ms = timeout.map_or(self.settings.default_timeout_ms, |d| {
            u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
        });
        let options = WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(self.settings.poll_interval_ms);
        match wait::wait_for(|| self.condition_met(condition), &options) {
            Ok(outcome) => Ok(outcome.elapsed),
            Err(PaginaError::Timeout { ms, elapsed_ms }) => Err(PaginaError::element_execute(
                &self.name,
                &self.page_type,
                format!("condition '{condition}' not met after {elapsed_ms}ms (timeout {ms}ms)"),
            )),
            Err(other) => Err(other),
        }
    }

    fn condition_met(&self, condition: ElementCondition) -> bool {
        // Re-resolve on every poll; the element may detach and reattach
        let element = self.resolve();
        let exists = element.as_ref().is_some_and(|e| e.exists());
        match condition {
            ElementCondition::Exists => exists,
            ElementCondition::NotExists => !exists,
            ElementCondition::Enabled => {
                exists && element.as_ref().is_some_and(|e| e.is_enabled())
            }
            ElementCondition::NotEnabled => {
                exists && !element.as_ref().is_some_and(|e| e.is_enabled())
            }
            ElementCondition::Stationary => {
                exists && element.as_ref().is_some_and(|e| e.is_stationary())
            }
        }
    }
}
