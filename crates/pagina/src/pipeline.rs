//! Action pipeline: uniform execution of verbs against a page, with
//! pre/post hooks and a single error-to-outcome translation point.
//!
//! Verb internals raise [`PaginaError`] freely; only
//! [`ActionPipeline::perform`] converts a raised error into an
//! [`ActionResult::Failure`]. Hooks observe execution in registration order
//! and can resolve properties, but they cannot suppress the verb or alter
//! its outcome. A failing verb skips the post-action hooks.

use crate::handle::ElementCondition;
use crate::locator;
use crate::page::PageObject;
use crate::result::{PaginaError, PaginaResult};
use crate::validation::{evaluate_single, ValidationTable};
use std::sync::Arc;
use std::time::Duration;

/// Capability class of a verb; behavior selection keys off this, not off
/// the concrete verb type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerbKind {
    /// Actuates an element
    Click,
    /// Writes data into an element
    Fill,
    /// Reads a value off the page
    GetValue,
    /// Blocks until an element condition holds
    Wait,
    /// Evaluates declared validations
    Validate,
    /// Establishes or verifies page identity
    Navigation,
}

/// Per-invocation arguments: the targeted property plus free-form extras
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    property: Option<String>,
    arguments: Vec<String>,
}

impl ActionContext {
    /// Context with no target property
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context targeting a named property
    #[must_use]
    pub fn for_property(name: impl Into<String>) -> Self {
        Self {
            property: Some(name.into()),
            arguments: Vec::new(),
        }
    }

    /// Append one extra argument
    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Target property name, if any
    #[must_use]
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    /// All extra arguments, in order
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// The i-th extra argument
    #[must_use]
    pub fn argument(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }

    fn require_property(&self, verb: &str) -> PaginaResult<&str> {
        self.property().ok_or_else(|| {
            PaginaError::configuration(format!("verb '{verb}' requires a target property"))
        })
    }
}

/// One executable action against a page
pub trait Verb {
    /// Human-readable verb name, used in logs and failure messages
    fn name(&self) -> &str;

    /// Declared capability class
    fn kind(&self) -> VerbKind;

    /// Run the verb; an `Ok` value is the verb's produced data, if any
    fn execute(&self, page: &PageObject, ctx: &ActionContext) -> PaginaResult<Option<String>>;
}

/// Observer invoked before every verb execution
pub trait PreActionHook: Send + Sync {
    /// Called before the verb runs
    fn before(&self, verb: &dyn Verb, page: &PageObject, ctx: &ActionContext);
}

/// Observer invoked after a successful verb execution
pub trait PostActionHook: Send + Sync {
    /// Called after the verb succeeds, with the produced value
    fn after(&self, verb: &dyn Verb, page: &PageObject, ctx: &ActionContext, value: Option<&str>);
}

/// Immutable outcome of one pipeline run. A failure always carries its
/// error; there is no errorless failure state.
#[derive(Debug)]
pub enum ActionResult {
    /// The verb ran to completion, possibly producing a value
    Success(Option<String>),
    /// The verb raised; the error is preserved verbatim
    Failure(PaginaError),
}

impl ActionResult {
    /// Whether the action succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Produced value, if the action succeeded with one
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Success(value) => value.as_deref(),
            Self::Failure(_) => None,
        }
    }

    /// The carried error, if the action failed
    #[must_use]
    pub const fn error(&self) -> Option<&PaginaError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }
}

/// Executes verbs with hook dispatch and error translation
#[derive(Default)]
pub struct ActionPipeline {
    pre_hooks: Vec<Arc<dyn PreActionHook>>,
    post_hooks: Vec<Arc<dyn PostActionHook>>,
}

impl std::fmt::Debug for ActionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionPipeline")
            .field("pre_hooks", &self.pre_hooks.len())
            .field("post_hooks", &self.post_hooks.len())
            .finish()
    }
}

impl ActionPipeline {
    /// Create a pipeline with no hooks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-action hook; hooks run in registration order
    pub fn register_pre_hook(&mut self, hook: Arc<dyn PreActionHook>) {
        self.pre_hooks.push(hook);
    }

    /// Register a post-action hook; hooks run in registration order
    pub fn register_post_hook(&mut self, hook: Arc<dyn PostActionHook>) {
        self.post_hooks.push(hook);
    }

    /// Run one verb against a page. This is the only place a raised error
    /// becomes an [`ActionResult::Failure`].
    pub fn perform(&self, verb: &dyn Verb, page: &PageObject, ctx: &ActionContext) -> ActionResult {
        tracing::debug!(
            verb = verb.name(),
            kind = ?verb.kind(),
            page = page.name(),
            property = ctx.property().unwrap_or("<none>"),
            "performing action"
        );
        for hook in &self.pre_hooks {
            hook.before(verb, page, ctx);
        }
        match verb.execute(page, ctx) {
            Ok(value) => {
                for hook in &self.post_hooks {
                    hook.after(verb, page, ctx, value.as_deref());
                }
                ActionResult::Success(value)
            }
            Err(error) => {
                tracing::debug!(verb = verb.name(), %error, "action failed");
                ActionResult::Failure(error)
            }
        }
    }
}

/// Click the targeted element
#[derive(Debug, Default, Clone, Copy)]
pub struct ClickElementVerb;

impl Verb for ClickElementVerb {
    fn name(&self) -> &str {
        "click element"
    }

    fn kind(&self) -> VerbKind {
        VerbKind::Click
    }

    fn execute(&self, page: &PageObject, ctx: &ActionContext) -> PaginaResult<Option<String>> {
        let name = ctx.require_property(self.name())?;
        locator::get_element(page, name)?.click_element()?;
        Ok(None)
    }
}

/// Fill the targeted element with the first context argument
#[derive(Debug, Default, Clone, Copy)]
pub struct FillDataVerb;

impl Verb for FillDataVerb {
    fn name(&self) -> &str {
        "fill data"
    }

    fn kind(&self) -> VerbKind {
        VerbKind::Fill
    }

    fn execute(&self, page: &PageObject, ctx: &ActionContext) -> PaginaResult<Option<String>> {
        let name = ctx.require_property(self.name())?;
        let value = ctx.argument(0).ok_or_else(|| {
            PaginaError::configuration("verb 'fill data' requires a value argument")
        })?;
        locator::get_element(page, name)?.fill_data(value)?;
        Ok(None)
    }
}

/// Read the current value of the targeted property
#[derive(Debug, Default, Clone, Copy)]
pub struct GetValueVerb;

impl Verb for GetValueVerb {
    fn name(&self) -> &str {
        "get value"
    }

    fn kind(&self) -> VerbKind {
        VerbKind::GetValue
    }

    fn execute(&self, page: &PageObject, ctx: &ActionContext) -> PaginaResult<Option<String>> {
        let name = ctx.require_property(self.name())?;
        locator::get_property(page, name)?.get_current_value()
    }
}

/// Block until the targeted element satisfies a condition
#[derive(Debug, Clone, Copy)]
pub struct WaitForElementVerb {
    condition: ElementCondition,
    timeout: Option<Duration>,
}

impl WaitForElementVerb {
    /// Wait for `condition` using the settings default timeout
    #[must_use]
    pub const fn new(condition: ElementCondition) -> Self {
        Self {
            condition,
            timeout: None,
        }
    }

    /// Override the timeout for this wait
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Verb for WaitForElementVerb {
    fn name(&self) -> &str {
        "wait for element"
    }

    fn kind(&self) -> VerbKind {
        VerbKind::Wait
    }

    fn execute(&self, page: &PageObject, ctx: &ActionContext) -> PaginaResult<Option<String>> {
        let name = ctx.require_property(self.name())?;
        let elapsed = locator::get_element(page, name)?
            .wait_for_element_condition(self.condition, self.timeout)?;
        Ok(Some(format!("{}ms", elapsed.as_millis())))
    }
}

/// Evaluate a validation table against the page in single-item mode.
///
/// Fields resolve by name through the page's handles; a mismatch becomes a
/// [`PaginaError::ValidationFailed`] carrying the rendered diff table, so
/// the pipeline reports it like any other failed action.
#[derive(Debug, Clone)]
pub struct ValidateItemVerb {
    table: ValidationTable,
}

impl ValidateItemVerb {
    /// Validate the given table against the page
    #[must_use]
    pub const fn new(table: ValidationTable) -> Self {
        Self { table }
    }
}

impl Verb for ValidateItemVerb {
    fn name(&self) -> &str {
        "validate item"
    }

    fn kind(&self) -> VerbKind {
        VerbKind::Validate
    }

    fn execute(&self, page: &PageObject, _ctx: &ActionContext) -> PaginaResult<Option<String>> {
        let result = evaluate_single(&self.table, |validation| {
            locator::try_get_property(page, &validation.field)
        })?;
        if result.is_valid {
            Ok(None)
        } else {
            Err(PaginaError::ValidationFailed {
                table: result.comparison_table(),
            })
        }
    }
}

/// Verify that the current URL identifies the page. Pages without declared
/// navigation metadata pass; identity cannot be refuted without a pattern.
#[derive(Debug, Clone)]
pub struct VerifyOnPageVerb {
    current_url: String,
}

impl VerifyOnPageVerb {
    /// Verify against the given current URL
    #[must_use]
    pub fn new(current_url: impl Into<String>) -> Self {
        Self {
            current_url: current_url.into(),
        }
    }
}

impl Verb for VerifyOnPageVerb {
    fn name(&self) -> &str {
        "verify on page"
    }

    fn kind(&self) -> VerbKind {
        VerbKind::Navigation
    }

    fn execute(&self, page: &PageObject, _ctx: &ActionContext) -> PaginaResult<Option<String>> {
        if page.matches_url(&self.current_url) {
            Ok(None)
        } else {
            Err(PaginaError::Navigation {
                page: page.name().to_string(),
                message: format!(
                    "current url '{}' does not match declared pattern '{}'",
                    self.current_url,
                    page.url_pattern().map_or("<none>", |p| p.pattern())
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::descriptor::UrlMatcher;
    use crate::element::ElementRef;
    use crate::handle::{ElementResolver, PropertyHandle};
    use crate::mock::{standard_fill_registry, FakeElement};
    use std::sync::Mutex;

    fn page_with_button(fake: &Arc<FakeElement>) -> PageObject {
        let mut page = PageObject::new("FormPage", "Form Page", None);
        let element: ElementRef = fake.clone();
        let resolver: ElementResolver = Arc::new(move || Some(element.clone()));
        page.add_property(PropertyHandle::element_property(
            "Save Button",
            "FormPage",
            resolver,
            Arc::new(standard_fill_registry()),
            Settings::new().with_default_timeout(200).with_poll_interval(20),
        ))
        .unwrap();
        page
    }

    #[derive(Default)]
    struct RecordingHook {
        events: Mutex<Vec<String>>,
    }

    impl RecordingHook {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl PreActionHook for RecordingHook {
        fn before(&self, verb: &dyn Verb, _page: &PageObject, _ctx: &ActionContext) {
            self.events.lock().unwrap().push(format!("pre:{}", verb.name()));
        }
    }

    impl PostActionHook for RecordingHook {
        fn after(
            &self,
            verb: &dyn Verb,
            _page: &PageObject,
            _ctx: &ActionContext,
            _value: Option<&str>,
        ) {
            self.events.lock().unwrap().push(format!("post:{}", verb.name()));
        }
    }

    mod perform_tests {
        use super::*;

        #[test]
        fn test_success_runs_hooks_in_order() {
            let fake = Arc::new(FakeElement::new("button"));
            let page = page_with_button(&fake);
            let hook = Arc::new(RecordingHook::default());
            let mut pipeline = ActionPipeline::new();
            pipeline.register_pre_hook(hook.clone());
            pipeline.register_post_hook(hook.clone());

            let result = pipeline.perform(
                &ClickElementVerb,
                &page,
                &ActionContext::for_property("Save Button"),
            );
            assert!(result.is_success());
            assert_eq!(fake.click_count(), 1);
            assert_eq!(hook.events(), vec!["pre:click element", "post:click element"]);
        }

        #[test]
        fn test_failure_carries_error_and_skips_post_hooks() {
            let fake = Arc::new(FakeElement::new("button"));
            let page = page_with_button(&fake);
            let hook = Arc::new(RecordingHook::default());
            let mut pipeline = ActionPipeline::new();
            pipeline.register_pre_hook(hook.clone());
            pipeline.register_post_hook(hook.clone());

            let result = pipeline.perform(
                &ClickElementVerb,
                &page,
                &ActionContext::for_property("Missing Button"),
            );
            assert!(!result.is_success());
            let error = result.error().unwrap();
            assert!(error.is_location_failure());
            assert!(error.to_string().contains("Save Button"));
            assert_eq!(hook.events(), vec!["pre:click element"]);
        }

        #[test]
        fn test_get_value_produces_data() {
            let fake = Arc::new(FakeElement::new("label").with_text("Ready"));
            let page = page_with_button(&fake);
            let pipeline = ActionPipeline::new();
            let result = pipeline.perform(
                &GetValueVerb,
                &page,
                &ActionContext::for_property("Save Button"),
            );
            assert_eq!(result.value(), Some("Ready"));
        }

        #[test]
        fn test_fill_requires_value_argument() {
            let fake = Arc::new(FakeElement::new("text-box"));
            let page = page_with_button(&fake);
            let pipeline = ActionPipeline::new();
            let result = pipeline.perform(
                &FillDataVerb,
                &page,
                &ActionContext::for_property("Save Button"),
            );
            let error = result.error().unwrap();
            assert!(error.to_string().contains("value argument"));
        }

        #[test]
        fn test_fill_through_pipeline() {
            let fake = Arc::new(FakeElement::new("text-box"));
            let page = page_with_button(&fake);
            let pipeline = ActionPipeline::new();
            let ctx = ActionContext::for_property("Save Button").with_argument("hello");
            assert!(pipeline.perform(&FillDataVerb, &page, &ctx).is_success());
            assert_eq!(fake.filled_values(), vec!["hello".to_string()]);
        }
    }

    mod validate_verb_tests {
        use super::*;
        use crate::compare::ComparisonRule;
        use crate::validation::{ItemValidation, ValidationTable};

        fn name_equals(expected: &str) -> ValidateItemVerb {
            ValidateItemVerb::new(
                ValidationTable::builder()
                    .with_validation(ItemValidation::new(
                        "Save Button",
                        ComparisonRule::Equals,
                        expected,
                    ))
                    .process(),
            )
        }

        #[test]
        fn test_valid_table_is_success() {
            let fake = Arc::new(FakeElement::new("label").with_text("Hello"));
            let page = page_with_button(&fake);
            let pipeline = ActionPipeline::new();
            let result = pipeline.perform(&name_equals("Hello"), &page, &ActionContext::new());
            assert!(result.is_success());
        }

        #[test]
        fn test_mismatch_fails_with_diff_table() {
            let fake = Arc::new(FakeElement::new("label").with_text("World"));
            let page = page_with_button(&fake);
            let pipeline = ActionPipeline::new();
            let result = pipeline.perform(&name_equals("Hello"), &page, &ActionContext::new());
            let error = result.error().unwrap();
            assert!(matches!(error, PaginaError::ValidationFailed { .. }));
            assert!(error.to_string().contains("Hello [World]"));
            assert!(!error.is_location_failure());
        }

        #[test]
        fn test_unknown_field_is_annotated_not_raised() {
            let fake = Arc::new(FakeElement::new("label"));
            let page = page_with_button(&fake);
            let verb = ValidateItemVerb::new(
                ValidationTable::builder()
                    .with_validation(ItemValidation::new("Ghost", ComparisonRule::Equals, "x"))
                    .process(),
            );
            let pipeline = ActionPipeline::new();
            let result = pipeline.perform(&verb, &page, &ActionContext::new());
            let error = result.error().unwrap();
            assert!(error.to_string().contains("Ghost [Not Found]"));
        }

        #[test]
        fn test_declared_kind_is_validate() {
            assert_eq!(name_equals("x").kind(), VerbKind::Validate);
        }
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_verify_on_page_with_pattern() {
            let page = PageObject::new("Home", "Home", Some(UrlMatcher::new("/home")));
            let pipeline = ActionPipeline::new();
            assert!(pipeline
                .perform(&VerifyOnPageVerb::new("/home"), &page, &ActionContext::new())
                .is_success());

            let result =
                pipeline.perform(&VerifyOnPageVerb::new("/other"), &page, &ActionContext::new());
            let error = result.error().unwrap();
            assert!(matches!(error, PaginaError::Navigation { .. }));
            assert!(error.to_string().contains("/other"));
        }

        #[test]
        fn test_verify_without_pattern_passes() {
            let page = PageObject::new("Home", "Home", None);
            let pipeline = ActionPipeline::new();
            assert!(pipeline
                .perform(&VerifyOnPageVerb::new("/anywhere"), &page, &ActionContext::new())
                .is_success());
        }
    }

    mod wait_verb_tests {
        use super::*;

        #[test]
        fn test_wait_verb_reports_elapsed() {
            let fake = Arc::new(FakeElement::new("button"));
            let page = page_with_button(&fake);
            let pipeline = ActionPipeline::new();
            let verb = WaitForElementVerb::new(ElementCondition::Exists);
            let result = pipeline.perform(
                &verb,
                &page,
                &ActionContext::for_property("Save Button"),
            );
            assert!(result.is_success());
            assert!(result.value().unwrap().ends_with("ms"));
        }

        #[test]
        fn test_wait_verb_timeout_is_failure() {
            let fake = Arc::new(FakeElement::new("button"));
            fake.set_present(false);
            let page = page_with_button(&fake);
            let pipeline = ActionPipeline::new();
            let verb = WaitForElementVerb::new(ElementCondition::Exists)
                .with_timeout(Duration::from_millis(80));
            let result = pipeline.perform(
                &verb,
                &page,
                &ActionContext::for_property("Save Button"),
            );
            assert!(result.error().unwrap().is_location_failure());
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_context_accessors() {
            let ctx = ActionContext::for_property("Field")
                .with_argument("one")
                .with_argument("two");
            assert_eq!(ctx.property(), Some("Field"));
            assert_eq!(ctx.arguments().len(), 2);
            assert_eq!(ctx.argument(1), Some("two"));
            assert_eq!(ctx.argument(2), None);
        }
    }
}
