//! Boundary contracts to the host's UI automation layer.
//!
//! The core never locates elements itself. A host supplies a
//! [`ScopedLookup`] that turns opaque [`Location`](crate::descriptor::Location)
//! metadata into [`NativeElement`] handles, and a [`FillRegistry`] that maps
//! native element kinds to fill strategies. All calls happen on the caller's
//! thread; implementations may assume strict sequential ordering.

use crate::descriptor::Location;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared handle to one native UI element
pub type ElementRef = Arc<dyn NativeElement>;

/// Error raised by a native click
#[derive(Debug, Clone, Error)]
pub enum ClickError {
    /// The automation layer reported the element as not clickable. UI
    /// frameworks often raise this for elements that were in fact actuated,
    /// so callers treat it as best-effort success.
    #[error("element is not clickable")]
    NotClickable,
    /// Any other click failure
    #[error("click failed: {0}")]
    Other(String),
}

/// Capability surface of one native element, implemented per UI technology
/// by the host's adapter.
pub trait NativeElement: Send + Sync {
    /// Concrete native kind ("text-box", "combo-box", ...); selects the fill
    /// strategy
    fn kind(&self) -> &str;

    /// Whether the element is currently attached and present
    fn exists(&self) -> bool;

    /// Whether the element is enabled for interaction
    fn is_enabled(&self) -> bool;

    /// Whether the element has stopped moving (animations settled)
    fn is_stationary(&self) -> bool {
        true
    }

    /// Displayed text of the element
    fn text(&self) -> String;

    /// Named attribute value, if the technology exposes attributes
    fn attribute(&self, _name: &str) -> Option<String> {
        None
    }

    /// Dispatch a click to the element
    fn click(&self) -> Result<(), ClickError>;

    /// Downcast hook for fill handlers that need the concrete element type
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn NativeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeElement")
            .field("kind", &self.kind())
            .field("exists", &self.exists())
            .finish_non_exhaustive()
    }
}

/// Chain of enclosing scopes used to re-establish relative lookups: root
/// document, then each enclosing list item or nested element. The chain is
/// for resolution only and owns nothing.
#[derive(Debug, Clone, Default)]
pub struct ResolutionScope {
    chain: Vec<ElementRef>,
}

impl ResolutionScope {
    /// Scope rooted at the document
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Derive a child scope rooted at the given element
    #[must_use]
    pub fn child(&self, element: ElementRef) -> Self {
        let mut chain = self.chain.clone();
        chain.push(element);
        Self { chain }
    }

    /// Innermost scope element, or `None` at the root
    #[must_use]
    pub fn current(&self) -> Option<&ElementRef> {
        self.chain.last()
    }

    /// Depth of the chain (0 = root)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain.len()
    }
}

/// Host-provided lookup: resolve location metadata within a scope to zero or
/// one element, or to a navigable collection for list properties.
pub trait ScopedLookup: Send + Sync {
    /// Find at most one element for the location within the scope
    fn find(&self, scope: &ResolutionScope, location: &Location) -> Option<ElementRef>;

    /// Find all elements for the location within the scope
    fn find_all(&self, scope: &ResolutionScope, location: &Location) -> Vec<ElementRef>;
}

/// Fill strategy for one native element kind
pub type FillHandler = Arc<dyn Fn(&dyn NativeElement, &str) -> Result<(), String> + Send + Sync>;

/// Verb dispatch table for `fill_data`, keyed by native element kind.
/// Absence of a handler for a kind is a fatal location failure at the call
/// site ("no fill strategy for kind X").
#[derive(Clone, Default)]
pub struct FillRegistry {
    handlers: HashMap<String, FillHandler>,
}

impl FillRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the fill strategy for a native kind, replacing any previous
    /// handler for that kind
    pub fn register<F>(&mut self, kind: impl Into<String>, handler: F)
    where
        F: Fn(&dyn NativeElement, &str) -> Result<(), String> + Send + Sync + 'static,
    {
        let _ = self.handlers.insert(kind.into(), Arc::new(handler));
    }

    /// Look up the handler for a native kind
    #[must_use]
    pub fn handler_for(&self, kind: &str) -> Option<FillHandler> {
        self.handlers.get(kind).cloned()
    }

    /// Registered kinds, for diagnostics
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for FillRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
