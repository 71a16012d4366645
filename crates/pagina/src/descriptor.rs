//! Page type descriptors: the declarative shape of a page.
//!
//! A [`PageTypeDescriptor`] is the explicit, host-built equivalent of
//! attribute-driven page typing: each property carries a name, a declared
//! kind, and location metadata that stays opaque to this crate. Descriptors
//! are immutable once built and live for the process in a
//! [`DescriptorCache`] keyed by type identity.

use crate::normalize::normalize;
use crate::result::{PaginaError, PaginaResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Declared kind of a page property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Plain data value, no element binding
    Scalar,
    /// Single UI element
    Element,
    /// Repeating list of child pages
    List,
    /// Independent nested page reachable through this property
    NestedPage,
}

/// Opaque element-location metadata. The core never interprets the raw
/// string; it is handed verbatim to the host's scoped lookup provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    raw: String,
}

impl Location {
    /// Create location metadata from the host's raw locator string
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw locator string, uninterpreted
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// One declared property of a page type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// User-facing property name ("First Name", "Search Results")
    pub name: String,
    /// Declared kind
    pub kind: PropertyKind,
    /// Location metadata for Element/List/NestedPage kinds
    pub location: Option<Location>,
    /// Type id of the child page for List/NestedPage kinds
    pub nested_type: Option<String>,
}

impl PropertyDescriptor {
    /// Declare a scalar data property
    #[must_use]
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Scalar,
            location: None,
            nested_type: None,
        }
    }

    /// Declare a single-element property
    #[must_use]
    pub fn element(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Element,
            location: Some(location),
            nested_type: None,
        }
    }

    /// Declare a repeating list whose items are pages of `nested_type`
    #[must_use]
    pub fn list(name: impl Into<String>, location: Location, nested_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::List,
            location: Some(location),
            nested_type: Some(nested_type.into()),
        }
    }

    /// Declare a nested page rooted at the located element
    #[must_use]
    pub fn nested_page(
        name: impl Into<String>,
        location: Location,
        nested_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::NestedPage,
            location: Some(location),
            nested_type: Some(nested_type.into()),
        }
    }
}

/// URL pattern matcher for page navigation metadata.
///
/// Patterns support literal segments (`/login`), wildcards (`/users/*`) and
/// named parameters (`/users/:id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a matcher from a pattern
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();
        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check whether a URL matches this pattern. Wildcards and parameters
    /// each consume exactly one segment.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();
        if url_segments.len() != self.segments.len() {
            return false;
        }
        self.segments.iter().enumerate().all(|(i, segment)| match segment {
            UrlSegment::Literal(lit) => url_segments.get(i) == Some(&lit.as_str()),
            UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
        })
    }

    /// The original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Immutable description of a page type: identity, navigation metadata and
/// declared properties. Build through [`PageTypeDescriptor::builder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTypeDescriptor {
    type_id: String,
    page_name: String,
    url_pattern: Option<UrlMatcher>,
    properties: Vec<PropertyDescriptor>,
}

impl PageTypeDescriptor {
    /// Start building a descriptor for the given type id and page name
    #[must_use]
    pub fn builder(type_id: impl Into<String>, page_name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            type_id: type_id.into(),
            page_name: page_name.into(),
            url_pattern: None,
            properties: Vec::new(),
        }
    }

    /// Stable type identity used as the cache key
    #[must_use]
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// User-facing page name
    #[must_use]
    pub fn page_name(&self) -> &str {
        &self.page_name
    }

    /// Navigation metadata, if declared
    #[must_use]
    pub fn url_pattern(&self) -> Option<&UrlMatcher> {
        self.url_pattern.as_ref()
    }

    /// Declared properties in declaration order
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }
}

/// Builder for [`PageTypeDescriptor`]; `build()` fails fast when two
/// properties collide after normalization, rather than silently shadowing.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    type_id: String,
    page_name: String,
    url_pattern: Option<UrlMatcher>,
    properties: Vec<PropertyDescriptor>,
}

impl DescriptorBuilder {
    /// Declare the URL pattern this page lives at
    #[must_use]
    pub fn with_url_pattern(mut self, pattern: &str) -> Self {
        self.url_pattern = Some(UrlMatcher::new(pattern));
        self
    }

    /// Add a property declaration
    #[must_use]
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Finish building, validating normalized-name uniqueness
    pub fn build(self) -> PaginaResult<PageTypeDescriptor> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for property in &self.properties {
            let key = normalize(&property.name);
            if let Some(previous) = seen.insert(key.clone(), &property.name) {
                return Err(PaginaError::configuration(format!(
                    "page type '{}' declares properties '{previous}' and '{}' which collide on normalized key '{key}'",
                    self.type_id, property.name
                )));
            }
        }
        Ok(PageTypeDescriptor {
            type_id: self.type_id,
            page_name: self.page_name,
            url_pattern: self.url_pattern,
            properties: self.properties,
        })
    }
}

/// Process-lifetime cache of page type descriptors.
///
/// Append-only and keyed by type identity: entries, once written, never
/// change, so read-mostly concurrent access needs no coordination beyond the
/// interior lock. Constructor-injected into the page builder; there is no
/// ambient static instance.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<String, Arc<PageTypeDescriptor>>>,
}

impl DescriptorCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its type id. Registering the same id
    /// twice is a configuration error; entries are immutable.
    pub fn register(&self, descriptor: PageTypeDescriptor) -> PaginaResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| PaginaError::configuration("descriptor cache lock poisoned"))?;
        let type_id = descriptor.type_id().to_string();
        if entries.contains_key(&type_id) {
            return Err(PaginaError::configuration(format!(
                "descriptor for type '{type_id}' is already registered"
            )));
        }
        let _ = entries.insert(type_id, Arc::new(descriptor));
        Ok(())
    }

    /// Look up a descriptor by type id
    #[must_use]
    pub fn get(&self, type_id: &str) -> Option<Arc<PageTypeDescriptor>> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(type_id).cloned())
    }

    /// Whether a type id has been registered
    #[must_use]
    pub fn contains(&self, type_id: &str) -> bool {
        self.entries
            .read()
            .is_ok_and(|entries| entries.contains_key(type_id))
    }

    /// Number of registered descriptors
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
