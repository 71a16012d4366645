//! In-memory fake backend for harness tests without a real UI.
//!
//! [`FakeElement`] is a scriptable [`NativeElement`]: presence, enabled
//! state, text and click behavior are all mutable through shared references,
//! so a test can change the page model mid-scenario and observe lazy
//! re-resolution. [`FakePageModel`] implements [`ScopedLookup`] over a flat
//! list of placements, each optionally parented to an existing element for
//! scoped lookups.

use crate::descriptor::Location;
use crate::element::{ClickError, ElementRef, FillRegistry, NativeElement, ResolutionScope, ScopedLookup};
use std::any::Any;
use std::sync::{Arc, Mutex, RwLock};

#[derive(Debug)]
struct FakeElementState {
    text: String,
    present: bool,
    enabled: bool,
    stationary: bool,
    clicks: u32,
    reject_clicks: u32,
    click_failure: Option<String>,
    fills: Vec<String>,
}

/// Scriptable in-memory element
#[derive(Debug)]
pub struct FakeElement {
    kind: String,
    state: Mutex<FakeElementState>,
}

impl FakeElement {
    /// Create a present, enabled, stationary element of the given kind
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            state: Mutex::new(FakeElementState {
                text: String::new(),
                present: true,
                enabled: true,
                stationary: true,
                clicks: 0,
                reject_clicks: 0,
                click_failure: None,
                fills: Vec::new(),
            }),
        }
    }

    /// Set the displayed text (builder form)
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.state.lock().unwrap().text = text.into();
        self
    }

    /// Wrap into a shared [`ElementRef`]
    #[must_use]
    pub fn into_ref(self) -> ElementRef {
        Arc::new(self)
    }

    /// Script presence
    pub fn set_present(&self, present: bool) {
        self.state.lock().unwrap().present = present;
    }

    /// Script enabled state
    pub fn set_enabled(&self, enabled: bool) {
        self.state.lock().unwrap().enabled = enabled;
    }

    /// Script whether the element has settled
    pub fn set_stationary(&self, stationary: bool) {
        self.state.lock().unwrap().stationary = stationary;
    }

    /// Script the displayed text
    pub fn set_text(&self, text: impl Into<String>) {
        self.state.lock().unwrap().text = text.into();
    }

    /// Reject the next `count` clicks as not-clickable
    pub fn reject_next_clicks(&self, count: u32) {
        self.state.lock().unwrap().reject_clicks = count;
    }

    /// Fail every click with the given message
    pub fn fail_clicks_with(&self, message: impl Into<String>) {
        self.state.lock().unwrap().click_failure = Some(message.into());
    }

    /// Number of successful clicks received
    #[must_use]
    pub fn click_count(&self) -> u32 {
        self.state.lock().unwrap().clicks
    }

    /// Values written through fill handlers, in order
    #[must_use]
    pub fn filled_values(&self) -> Vec<String> {
        self.state.lock().unwrap().fills.clone()
    }

    /// Record a fill: the value becomes the displayed text and is logged
    pub fn record_fill(&self, value: &str) {
        let mut state = self.state.lock().unwrap();
        state.text = value.to_string();
        state.fills.push(value.to_string());
    }
}

impl NativeElement for FakeElement {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn exists(&self) -> bool {
        self.state.lock().unwrap().present
    }

    fn is_enabled(&self) -> bool {
        self.state.lock().unwrap().enabled
    }

    fn is_stationary(&self) -> bool {
        self.state.lock().unwrap().stationary
    }

    fn text(&self) -> String {
        self.state.lock().unwrap().text.clone()
    }

    fn click(&self) -> Result<(), ClickError> {
        let mut state = self.state.lock().unwrap();
        if state.reject_clicks > 0 {
            state.reject_clicks -= 1;
            return Err(ClickError::NotClickable);
        }
        if let Some(message) = &state.click_failure {
            return Err(ClickError::Other(message.clone()));
        }
        state.clicks += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fill registry wired for [`FakeElement`] kinds used in harness tests:
/// `text-box`, `combo-box` and `check-box` all record the written value.
#[must_use]
pub fn standard_fill_registry() -> FillRegistry {
    let mut registry = FillRegistry::new();
    for kind in ["text-box", "combo-box", "check-box"] {
        registry.register(kind, |element, value| {
            element
                .as_any()
                .downcast_ref::<FakeElement>()
                .map(|fake| fake.record_fill(value))
                .ok_or_else(|| "element is not a FakeElement".to_string())
        });
    }
    registry
}

struct Placement {
    selector: String,
    parent: Option<ElementRef>,
    element: ElementRef,
}

/// In-memory page model implementing [`ScopedLookup`] for tests. Cloning
/// shares the underlying placements, so a cloned model handed to a builder
/// still sees later mutations.
#[derive(Clone, Default)]
pub struct FakePageModel {
    placements: Arc<RwLock<Vec<Placement>>>,
}

impl std::fmt::Debug for FakePageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.placements.read().map_or(0, |p| p.len());
        f.debug_struct("FakePageModel").field("placements", &count).finish()
    }
}

impl FakePageModel {
    /// Create an empty model
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an element at the document root under a selector
    pub fn place(&self, selector: impl Into<String>, element: FakeElement) -> ElementRef {
        let element = element.into_ref();
        self.placements.write().unwrap().push(Placement {
            selector: selector.into(),
            parent: None,
            element: element.clone(),
        });
        element
    }

    /// Place an element under a selector, scoped within a parent element
    pub fn place_within(
        &self,
        parent: &ElementRef,
        selector: impl Into<String>,
        element: FakeElement,
    ) -> ElementRef {
        let element = element.into_ref();
        self.placements.write().unwrap().push(Placement {
            selector: selector.into(),
            parent: Some(parent.clone()),
            element: element.clone(),
        });
        element
    }

    fn scope_matches(placement: &Placement, scope: &ResolutionScope) -> bool {
        match (&placement.parent, scope.current()) {
            (None, None) => true,
            (Some(parent), Some(current)) => Arc::ptr_eq(parent, current),
            _ => false,
        }
    }
}

impl ScopedLookup for FakePageModel {
    fn find(&self, scope: &ResolutionScope, location: &Location) -> Option<ElementRef> {
        self.placements.read().ok()?.iter().find_map(|placement| {
            (placement.selector == location.raw() && Self::scope_matches(placement, scope))
                .then(|| placement.element.clone())
        })
    }

    fn find_all(&self, scope: &ResolutionScope, location: &Location) -> Vec<ElementRef> {
        self.placements.read().map_or_else(
            |_| Vec::new(),
            |placements| {
                placements
                    .iter()
                    .filter(|placement| {
                        placement.selector == location.raw()
                            && Self::scope_matches(placement, scope)
                    })
                    .map(|placement| placement.element.clone())
                    .collect()
            },
        )
    }
}
