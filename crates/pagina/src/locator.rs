//! Element locator: name-based resolution of property handles on a page.
//!
//! Failures here are deliberately rich: a miss carries the attempted name
//! and the page's declared property names, so a step failure reads as a
//! diff against the page model rather than a bare "not found".

use crate::handle::PropertyHandle;
use crate::page::PageObject;
use crate::result::{PaginaError, PaginaResult};

/// Resolve a property handle by name, or `None`
#[must_use]
pub fn try_get_property<'a>(page: &'a PageObject, name: &str) -> Option<&'a PropertyHandle> {
    page.property(name)
}

/// Resolve a property handle by name; a miss is a location failure listing
/// the declared candidates
pub fn get_property<'a>(page: &'a PageObject, name: &str) -> PaginaResult<&'a PropertyHandle> {
    page.property(name).ok_or_else(|| {
        tracing::debug!(name, page = page.name(), "property lookup missed");
        PaginaError::not_found(name, page.name(), declared_names(page))
    })
}

/// Resolve an element-backed handle by name, or `None` when the name misses
/// or the property is not a single element
#[must_use]
pub fn try_get_element<'a>(page: &'a PageObject, name: &str) -> Option<&'a PropertyHandle> {
    page.property(name).filter(|handle| handle.is_element())
}

/// Resolve an element-backed handle by name.
///
/// A miss, or a property that is neither element nor list, is a location
/// failure with candidates. A declared list is a distinct business outcome
/// ([`PaginaError::PropertyIsList`]); callers recover by switching to a list
/// operation.
pub fn get_element<'a>(page: &'a PageObject, name: &str) -> PaginaResult<&'a PropertyHandle> {
    let handle = get_property(page, name)?;
    if handle.is_list() {
        return Err(PaginaError::PropertyIsList {
            name: handle.name().to_string(),
            page: page.name().to_string(),
        });
    }
    if !handle.is_element() {
        return Err(PaginaError::ElementExecute {
            name: name.to_string(),
            page: page.name().to_string(),
            candidates: declared_names(page),
            message: format!(
                "property '{}' on page '{}' is not an element-backed property",
                handle.name(),
                page.name()
            ),
        });
    }
    Ok(handle)
}

fn declared_names(page: &PageObject) -> Vec<String> {
    page.property_names().iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::element::ElementRef;
    use crate::handle::ElementResolver;
    use crate::mock::{standard_fill_registry, FakeElement};
    use std::sync::Arc;

    fn sample_page() -> PageObject {
        let mut page = PageObject::new("SearchPage", "Search Page", None);
        page.add_property(PropertyHandle::data_property("Query History", "SearchPage"))
            .unwrap();
        let element: ElementRef = Arc::new(FakeElement::new("text-box"));
        let resolver: ElementResolver = Arc::new(move || Some(element.clone()));
        page.add_property(PropertyHandle::element_property(
            "Search Box",
            "SearchPage",
            resolver,
            Arc::new(standard_fill_registry()),
            Settings::default(),
        ))
        .unwrap();
        page.add_property(PropertyHandle::list_property(
            "Search Results",
            "SearchPage",
            Arc::new(|| None),
            Arc::new(Vec::new),
            Arc::new(standard_fill_registry()),
            Settings::default(),
        ))
        .unwrap();
        page
    }

    mod property_tests {
        use super::*;

        #[test]
        fn test_get_property_hit() {
            let page = sample_page();
            assert!(get_property(&page, "the query history").is_ok());
            assert!(try_get_property(&page, "Search Box").is_some());
        }

        #[test]
        fn test_miss_lists_candidates() {
            let page = sample_page();
            let err = get_property(&page, "No Such Field").unwrap_err();
            let message = err.to_string();
            assert!(message.contains("No Such Field"));
            assert!(message.contains("Query History"));
            assert!(message.contains("Search Box"));
            assert!(message.contains("Search Results"));
            assert!(err.is_location_failure());
        }

        #[test]
        fn test_try_get_property_miss_is_none() {
            let page = sample_page();
            assert!(try_get_property(&page, "No Such Field").is_none());
        }
    }

    mod element_tests {
        use super::*;

        #[test]
        fn test_get_element_hit() {
            let page = sample_page();
            let handle = get_element(&page, "search box").unwrap();
            assert!(handle.is_element());
        }

        #[test]
        fn test_list_property_is_a_business_failure() {
            let page = sample_page();
            let err = get_element(&page, "Search Results").unwrap_err();
            assert!(matches!(err, PaginaError::PropertyIsList { .. }));
            assert!(err.to_string().contains("Search Results"));
            assert!(!err.is_location_failure());
        }

        #[test]
        fn test_data_property_is_a_location_failure() {
            let page = sample_page();
            let err = get_element(&page, "Query History").unwrap_err();
            assert!(err.is_location_failure());
            assert!(err.to_string().contains("not an element"));
        }

        #[test]
        fn test_try_get_element_filters_kind() {
            let page = sample_page();
            assert!(try_get_element(&page, "Search Box").is_some());
            assert!(try_get_element(&page, "Search Results").is_none());
            assert!(try_get_element(&page, "Query History").is_none());
        }
    }
}
