//! Page builder: turns an immutable [`PageTypeDescriptor`] into a bound
//! [`PageObject`] within a resolution scope.
//!
//! The walk over declared properties is depth-first; list and nested-page
//! properties capture a clone of the builder so child pages are built
//! lazily, at access time, in a scope chained from the current one. Building
//! is idempotent: two builds of the same descriptor yield independent,
//! structurally identical pages.

use crate::config::Settings;
use crate::descriptor::{DescriptorCache, PageTypeDescriptor, PropertyDescriptor, PropertyKind};
use crate::element::{ElementRef, FillRegistry, ResolutionScope, ScopedLookup};
use crate::handle::{ElementResolver, ItemEnumerator, NestedPageResolver, PropertyHandle};
use crate::page::PageObject;
use crate::result::{PaginaError, PaginaResult};
use std::sync::Arc;

struct BuilderInner {
    cache: Arc<DescriptorCache>,
    lookup: Arc<dyn ScopedLookup>,
    fills: Arc<FillRegistry>,
    settings: Settings,
}

/// Builds page objects from registered descriptors. Cheap to clone; clones
/// share the descriptor cache, lookup provider and fill registry.
#[derive(Clone)]
pub struct PageBuilder {
    inner: Arc<BuilderInner>,
}

impl std::fmt::Debug for PageBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBuilder")
            .field("descriptors", &self.inner.cache.len())
            .finish_non_exhaustive()
    }
}

impl PageBuilder {
    /// Create a builder over a descriptor cache, a host lookup provider, a
    /// fill registry and runtime settings
    #[must_use]
    pub fn new(
        cache: Arc<DescriptorCache>,
        lookup: Arc<dyn ScopedLookup>,
        fills: Arc<FillRegistry>,
        settings: Settings,
    ) -> Self {
        Self {
            inner: Arc::new(BuilderInner {
                cache,
                lookup,
                fills,
                settings,
            }),
        }
    }

    /// Build the page registered under `type_id`, rooted at the document
    pub fn build(&self, type_id: &str) -> PaginaResult<PageObject> {
        self.build_in_scope(type_id, &ResolutionScope::root())
    }

    /// Build the page registered under `type_id` within an explicit scope
    pub fn build_in_scope(&self, type_id: &str, scope: &ResolutionScope) -> PaginaResult<PageObject> {
        let descriptor = self.inner.cache.get(type_id).ok_or_else(|| {
            PaginaError::configuration(format!("no descriptor registered for page type '{type_id}'"))
        })?;
        self.build_descriptor(&descriptor, scope)
    }

    fn build_descriptor(
        &self,
        descriptor: &PageTypeDescriptor,
        scope: &ResolutionScope,
    ) -> PaginaResult<PageObject> {
        tracing::debug!(
            page = descriptor.type_id(),
            depth = scope.depth(),
            properties = descriptor.properties().len(),
            "building page object"
        );
        let mut page = PageObject::new(
            descriptor.type_id(),
            descriptor.page_name(),
            descriptor.url_pattern().cloned(),
        );
        for property in descriptor.properties() {
            let handle = self.build_property(descriptor, property, scope)?;
            page.add_property(handle)?;
        }
        Ok(page)
    }

    fn build_property(
        &self,
        descriptor: &PageTypeDescriptor,
        property: &PropertyDescriptor,
        scope: &ResolutionScope,
    ) -> PaginaResult<PropertyHandle> {
        let page_type = descriptor.type_id().to_string();
        match property.kind {
            PropertyKind::Scalar => Ok(PropertyHandle::data_property(&property.name, page_type)),
            PropertyKind::Element => {
                let resolver = self.element_resolver(descriptor, property, scope)?;
                Ok(PropertyHandle::element_property(
                    &property.name,
                    page_type,
                    resolver,
                    self.inner.fills.clone(),
                    self.inner.settings.clone(),
                ))
            }
            PropertyKind::List => {
                let resolver = self.element_resolver(descriptor, property, scope)?;
                let items = self.item_enumerator(descriptor, property, scope)?;
                Ok(PropertyHandle::list_property(
                    &property.name,
                    page_type,
                    resolver,
                    items,
                    self.inner.fills.clone(),
                    self.inner.settings.clone(),
                ))
            }
            PropertyKind::NestedPage => {
                let resolver = self.element_resolver(descriptor, property, scope)?;
                let nested = self.nested_resolver(descriptor, property, scope)?;
                Ok(PropertyHandle::nested_page_property(
                    &property.name,
                    page_type,
                    resolver,
                    nested,
                    self.inner.fills.clone(),
                    self.inner.settings.clone(),
                ))
            }
        }
    }

    /// Resolution thunk for an element-backed property. Captures the scope
    /// by value; every invocation re-runs the host lookup.
    fn element_resolver(
        &self,
        descriptor: &PageTypeDescriptor,
        property: &PropertyDescriptor,
        scope: &ResolutionScope,
    ) -> PaginaResult<ElementResolver> {
        let location = property.location.clone().ok_or_else(|| {
            PaginaError::configuration(format!(
                "property '{}' on page type '{}' is declared {:?} but carries no location",
                property.name,
                descriptor.type_id(),
                property.kind
            ))
        })?;
        let lookup = self.inner.lookup.clone();
        let scope = scope.clone();
        Ok(Arc::new(move || lookup.find(&scope, &location)))
    }

    fn nested_type(
        descriptor: &PageTypeDescriptor,
        property: &PropertyDescriptor,
    ) -> PaginaResult<String> {
        property.nested_type.clone().ok_or_else(|| {
            PaginaError::configuration(format!(
                "property '{}' on page type '{}' is declared {:?} but names no nested page type",
                property.name,
                descriptor.type_id(),
                property.kind
            ))
        })
    }

    fn require_registered(&self, nested_type: &str, property: &PropertyDescriptor) -> PaginaResult<()> {
        if self.inner.cache.contains(nested_type) {
            Ok(())
        } else {
            Err(PaginaError::configuration(format!(
                "property '{}' references unregistered page type '{nested_type}'",
                property.name
            )))
        }
    }

    /// Lazy enumeration of a list property's items: find all matching
    /// elements, then build the child page type once per element in a scope
    /// chained from the parent's.
    fn item_enumerator(
        &self,
        descriptor: &PageTypeDescriptor,
        property: &PropertyDescriptor,
        scope: &ResolutionScope,
    ) -> PaginaResult<ItemEnumerator> {
        let nested_type = Self::nested_type(descriptor, property)?;
        self.require_registered(&nested_type, property)?;
        let location = property.location.clone().ok_or_else(|| {
            PaginaError::configuration(format!(
                "list property '{}' carries no location",
                property.name
            ))
        })?;
        let builder = self.clone();
        let scope = scope.clone();
        let property_name = property.name.clone();
        Ok(Arc::new(move || {
            let elements = builder.inner.lookup.find_all(&scope, &location);
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                match builder.build_child(&nested_type, &scope, element) {
                    Ok(page) => items.push(page),
                    Err(error) => {
                        tracing::warn!(
                            property = %property_name,
                            %error,
                            "skipping unconstructible list item"
                        );
                    }
                }
            }
            items
        }))
    }

    fn nested_resolver(
        &self,
        descriptor: &PageTypeDescriptor,
        property: &PropertyDescriptor,
        scope: &ResolutionScope,
    ) -> PaginaResult<NestedPageResolver> {
        let nested_type = Self::nested_type(descriptor, property)?;
        self.require_registered(&nested_type, property)?;
        let resolver = self.element_resolver(descriptor, property, scope)?;
        let builder = self.clone();
        let scope = scope.clone();
        Ok(Arc::new(move || {
            let element = resolver()?;
            builder.build_child(&nested_type, &scope, element).ok()
        }))
    }

    fn build_child(
        &self,
        nested_type: &str,
        scope: &ResolutionScope,
        element: ElementRef,
    ) -> PaginaResult<PageObject> {
        let child_scope = scope.child(element);
        self.build_in_scope(nested_type, &child_scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Location, PageTypeDescriptor};
    use crate::mock::{standard_fill_registry, FakeElement, FakePageModel};

    fn builder_with(model: FakePageModel, cache: DescriptorCache) -> PageBuilder {
        PageBuilder::new(
            Arc::new(cache),
            Arc::new(model),
            Arc::new(standard_fill_registry()),
            Settings::new().with_default_timeout(200).with_poll_interval(20),
        )
    }

    fn form_descriptor() -> PageTypeDescriptor {
        PageTypeDescriptor::builder("FormPage", "Form")
            .with_property(PropertyDescriptor::element(
                "User Name",
                Location::new("#user"),
            ))
            .with_property(PropertyDescriptor::scalar("Attempt Count"))
            .build()
            .unwrap()
    }

    mod flat_build_tests {
        use super::*;

        #[test]
        fn test_build_binds_declared_properties() {
            let model = FakePageModel::new();
            model.place("#user", FakeElement::new("text-box").with_text("alice"));
            let cache = DescriptorCache::new();
            cache.register(form_descriptor()).unwrap();

            let page = builder_with(model, cache).build("FormPage").unwrap();
            assert_eq!(page.type_id(), "FormPage");
            assert_eq!(page.property_count(), 2);

            let user = page.property("the user name").unwrap();
            assert!(user.is_element());
            assert_eq!(user.get_current_value().unwrap(), Some("alice".to_string()));

            let count = page.property("attempt count").unwrap();
            assert!(count.is_data());
        }

        #[test]
        fn test_unknown_type_is_configuration_error() {
            let builder = builder_with(FakePageModel::new(), DescriptorCache::new());
            let err = builder.build("NoSuchPage").unwrap_err();
            assert!(err.to_string().contains("NoSuchPage"));
        }

        #[test]
        fn test_builds_are_independent() {
            let model = FakePageModel::new();
            model.place("#user", FakeElement::new("text-box"));
            let cache = DescriptorCache::new();
            cache.register(form_descriptor()).unwrap();
            let builder = builder_with(model, cache);

            let first = builder.build("FormPage").unwrap();
            let second = builder.build("FormPage").unwrap();
            first.property("attempt count").unwrap().set_value("1").unwrap();
            assert_eq!(
                second.property("attempt count").unwrap().get_current_value().unwrap(),
                None
            );
        }
    }

    mod resolution_tests {
        use super::*;

        #[test]
        fn test_resolution_is_lazy_and_uncached() {
            // Element absent at build time, placed afterwards: the handle
            // must see it because the thunk re-runs per access.
            let model = FakePageModel::new();
            let cache = DescriptorCache::new();
            cache.register(form_descriptor()).unwrap();
            let builder = builder_with(model.clone(), cache);

            let page = builder.build("FormPage").unwrap();
            let user = page.property("user name").unwrap();
            assert!(!user.check_element_exists());

            model.place("#user", FakeElement::new("text-box"));
            assert!(user.check_element_exists());
        }
    }

    mod nested_tests {
        use super::*;

        fn nested_cache() -> DescriptorCache {
            let cache = DescriptorCache::new();
            cache
                .register(
                    PageTypeDescriptor::builder("OuterPage", "Outer")
                        .with_property(PropertyDescriptor::nested_page(
                            "Details Panel",
                            Location::new("#panel"),
                            "PanelPage",
                        ))
                        .build()
                        .unwrap(),
                )
                .unwrap();
            cache
                .register(
                    PageTypeDescriptor::builder("PanelPage", "Panel")
                        .with_property(PropertyDescriptor::element(
                            "Title",
                            Location::new(".title"),
                        ))
                        .build()
                        .unwrap(),
                )
                .unwrap();
            cache
        }

        #[test]
        fn test_nested_page_scopes_child_lookups() {
            let model = FakePageModel::new();
            let panel = model.place("#panel", FakeElement::new("panel"));
            model.place_within(&panel, ".title", FakeElement::new("label").with_text("Details"));
            // A root-level .title must not shadow the scoped one
            model.place(".title", FakeElement::new("label").with_text("Wrong"));

            let builder = builder_with(model, nested_cache());
            let outer = builder.build("OuterPage").unwrap();
            let inner = outer.property("details panel").unwrap().get_item_as_page().unwrap();
            assert_eq!(inner.type_id(), "PanelPage");
            assert_eq!(
                inner.property("title").unwrap().get_current_value().unwrap(),
                Some("Details".to_string())
            );
        }

        #[test]
        fn test_unresolvable_nested_page_is_none() {
            let builder = builder_with(FakePageModel::new(), nested_cache());
            let outer = builder.build("OuterPage").unwrap();
            assert!(outer.property("details panel").unwrap().get_item_as_page().is_none());
        }

        #[test]
        fn test_unregistered_nested_type_fails_at_build() {
            let cache = DescriptorCache::new();
            cache
                .register(
                    PageTypeDescriptor::builder("OuterPage", "Outer")
                        .with_property(PropertyDescriptor::nested_page(
                            "Panel",
                            Location::new("#panel"),
                            "MissingPage",
                        ))
                        .build()
                        .unwrap(),
                )
                .unwrap();
            let builder = builder_with(FakePageModel::new(), cache);
            let err = builder.build("OuterPage").unwrap_err();
            assert!(err.to_string().contains("MissingPage"));
        }
    }

    mod list_tests {
        use super::*;

        fn list_cache() -> DescriptorCache {
            let cache = DescriptorCache::new();
            cache
                .register(
                    PageTypeDescriptor::builder("ResultsPage", "Results")
                        .with_property(PropertyDescriptor::list(
                            "Search Results",
                            Location::new(".row"),
                            "RowPage",
                        ))
                        .build()
                        .unwrap(),
                )
                .unwrap();
            cache
                .register(
                    PageTypeDescriptor::builder("RowPage", "Row")
                        .with_property(PropertyDescriptor::element("Name", Location::new(".name")))
                        .build()
                        .unwrap(),
                )
                .unwrap();
            cache
        }

        #[test]
        fn test_list_items_built_per_element() {
            let model = FakePageModel::new();
            model.place("#root", FakeElement::new("panel"));
            for name in ["A", "B", "C"] {
                let row = model.place(".row", FakeElement::new("row"));
                model.place_within(&row, ".name", FakeElement::new("label").with_text(name));
            }

            let builder = builder_with(model, list_cache());
            let page = builder.build("ResultsPage").unwrap();
            let results = page.property("search results").unwrap();
            assert!(results.is_list());

            let second = results.get_item_at_index(1).unwrap();
            assert_eq!(
                second.property("name").unwrap().get_current_value().unwrap(),
                Some("B".to_string())
            );
            assert!(results.get_item_at_index(3).is_none());
        }
    }
}
