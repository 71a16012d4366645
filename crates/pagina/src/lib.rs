//! Pagina: declarative page-object runtime for UI test automation
//!
//! Pagina (Spanish: "page") binds declarative page type descriptors to a
//! host's UI automation layer and executes verbs against them: click, fill,
//! read, wait, validate. The crate owns the page model, the action pipeline
//! and the validation engine; element location and the concrete UI
//! technology stay on the host's side of the [`ScopedLookup`] boundary.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     PAGINA Architecture                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌───────────────────┐     │
//! │  │ Descriptor │   │ Page       │   │ Action Pipeline / │     │
//! │  │ Cache      │──►│ Builder    │──►│ Validation Engine │     │
//! │  └────────────┘   └────────────┘   └───────────────────┘     │
//! │                        │ ScopedLookup / NativeElement        │
//! │                        ▼                                     │
//! │                 host UI automation layer                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod builder;
mod compare;
mod config;
mod descriptor;
mod element;
mod handle;
mod locator;
mod normalize;
mod page;
mod pipeline;
mod result;
mod validation;

/// Polling wait primitive
pub mod wait;

/// In-memory fake backend for harness tests without a real UI
pub mod mock;

pub use builder::PageBuilder;
pub use compare::ComparisonRule;
pub use config::{Settings, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
pub use descriptor::{
    DescriptorBuilder, DescriptorCache, Location, PageTypeDescriptor, PropertyDescriptor,
    PropertyKind, UrlMatcher,
};
pub use element::{
    ClickError, ElementRef, FillHandler, FillRegistry, NativeElement, ResolutionScope, ScopedLookup,
};
pub use handle::{
    ElementCondition, ElementResolver, ItemEnumerator, NestedPageResolver, PropertyHandle,
};
pub use locator::{get_element, get_property, try_get_element, try_get_property};
pub use page::PageObject;
pub use pipeline::{
    ActionContext, ActionPipeline, ActionResult, ClickElementVerb, FillDataVerb, GetValueVerb,
    PostActionHook, PreActionHook, ValidateItemVerb, Verb, VerbKind, VerifyOnPageVerb,
    WaitForElementVerb,
};
pub use result::{PaginaError, PaginaResult};
pub use validation::{
    evaluate_list, evaluate_single, ItemValidation, ListComparison, ValidationCheck,
    ValidationItemResult, ValidationResult, ValidationTable, ValidationTableBuilder,
};

pub use normalize::{equals_normalized, normalize};

/// Convenience re-exports for host crates
pub mod prelude {
    pub use super::builder::PageBuilder;
    pub use super::compare::ComparisonRule;
    pub use super::config::Settings;
    pub use super::descriptor::{
        DescriptorCache, Location, PageTypeDescriptor, PropertyDescriptor, PropertyKind, UrlMatcher,
    };
    pub use super::element::{
        ClickError, ElementRef, FillRegistry, NativeElement, ResolutionScope, ScopedLookup,
    };
    pub use super::handle::{ElementCondition, PropertyHandle};
    pub use super::locator::{get_element, get_property, try_get_element, try_get_property};
    pub use super::mock::*;
    pub use super::page::PageObject;
    pub use super::pipeline::*;
    pub use super::result::{PaginaError, PaginaResult};
    pub use super::validation::*;
    pub use super::wait::{wait_for, WaitOptions, WaitOutcome};
}
