//! Runtime page objects: the bound form of a page type descriptor.
//!
//! A `PageObject` owns one [`PropertyHandle`] per declared property, keyed
//! by normalized name. Two builds of the same descriptor yield independent
//! objects; handles are never shared across pages.

use crate::descriptor::UrlMatcher;
use crate::handle::PropertyHandle;
use crate::normalize::normalize;
use crate::result::{PaginaError, PaginaResult};
use std::collections::HashMap;

/// One bound page: type identity plus resolvable property handles
#[derive(Debug)]
pub struct PageObject {
    type_id: String,
    name: String,
    url_pattern: Option<UrlMatcher>,
    handles: HashMap<String, PropertyHandle>,
    declared_order: Vec<String>,
}

impl PageObject {
    /// Create an empty page; the builder populates it property by property
    #[must_use]
    pub fn new(
        type_id: impl Into<String>,
        name: impl Into<String>,
        url_pattern: Option<UrlMatcher>,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            name: name.into(),
            url_pattern,
            handles: HashMap::new(),
            declared_order: Vec::new(),
        }
    }

    /// Attach a handle under its normalized name. Collisions are a
    /// configuration error; descriptors fail fast on them first, so this
    /// second gate only trips for hand-assembled pages.
    pub fn add_property(&mut self, handle: PropertyHandle) -> PaginaResult<()> {
        let key = normalize(handle.name());
        if self.handles.contains_key(&key) {
            return Err(PaginaError::configuration(format!(
                "property '{}' on page '{}' collides with an existing property under key '{key}'",
                handle.name(),
                self.name
            )));
        }
        self.declared_order.push(handle.name().to_string());
        let _ = self.handles.insert(key, handle);
        Ok(())
    }

    /// Stable page type identity
    #[must_use]
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// User-facing page name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Navigation pattern declared for this page, if any
    #[must_use]
    pub const fn url_pattern(&self) -> Option<&UrlMatcher> {
        self.url_pattern.as_ref()
    }

    /// Whether `url` identifies this page. Pages without a declared pattern
    /// match any url; identity cannot be refuted without one.
    #[must_use]
    pub fn matches_url(&self, url: &str) -> bool {
        self.url_pattern
            .as_ref()
            .map_or(true, |pattern| pattern.matches(url))
    }

    /// Look up a handle by user-facing name, tolerant of articles, spacing
    /// and case
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyHandle> {
        self.handles.get(&normalize(name))
    }

    /// First handle satisfying a capability predicate, in declaration order
    #[must_use]
    pub fn property_where<P>(&self, mut predicate: P) -> Option<&PropertyHandle>
    where
        P: FnMut(&PropertyHandle) -> bool,
    {
        self.declared_order
            .iter()
            .filter_map(|name| self.handles.get(&normalize(name)))
            .find(|handle| predicate(handle))
    }

    /// Declared property names in declaration order, for diagnostics
    #[must_use]
    pub fn property_names(&self) -> Vec<&str> {
        self.declared_order.iter().map(String::as_str).collect()
    }

    /// Number of declared properties
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.handles.len()
    }
}
