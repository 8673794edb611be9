//! Route definitions.
//!
//! A [`RouteDefinition`] is what callers build; registering it in a
//! [`RouteTable`](crate::table::RouteTable) compiles its template and
//! freezes it into an immutable [`RouteDescriptor`].

use crate::error::RoutePatternError;
use crate::hooks::{AfterNavigationHook, BeforeNavigationHook};
use crate::pattern::RoutePattern;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};

/// Name of the reserved not-found route.
pub const NOT_FOUND_ROUTE: &str = "notFound";

/// Name of the reserved error route.
pub const ERROR_ROUTE: &str = "error";

/// Matches `{paramName}` placeholders in title and description templates.
static PLACEHOLDER: LazyLock<regex::Regex> = LazyLock::new(|| {
	regex::Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
});

/// Replaces `{name}` placeholders with values from `params`.
///
/// Unknown placeholders are replaced with the empty string.
pub fn interpolate(template: &str, params: &HashMap<String, String>) -> String {
	PLACEHOLDER
		.replace_all(template, |caps: &regex::Captures<'_>| {
			params.get(&caps[1]).cloned().unwrap_or_default()
		})
		.into_owned()
}

/// Flags consumed by guard logic and the route cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteMetadata {
	/// Reachable without any prerequisites. Overrides `requires_prerequisites`.
	pub public: bool,
	/// Ask the prerequisite collaborator before committing.
	pub requires_prerequisites: bool,
	/// Resolution results may be memoised.
	pub cacheable: bool,
	/// Application-defined flags.
	pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for RouteMetadata {
	fn default() -> Self {
		Self {
			public: false,
			requires_prerequisites: false,
			cacheable: true,
			extra: BTreeMap::new(),
		}
	}
}

impl RouteMetadata {
	/// Returns an application-defined flag.
	pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
		self.extra.get(key)
	}

}

/// An unvalidated route, as supplied by calling code.
#[derive(Clone, Default)]
pub struct RouteDefinition {
	path_template: String,
	title_template: String,
	description_template: String,
	metadata: RouteMetadata,
	before_enter: Option<Arc<dyn BeforeNavigationHook>>,
	after_enter: Option<Arc<dyn AfterNavigationHook>>,
}

impl std::fmt::Debug for RouteDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteDefinition")
			.field("path_template", &self.path_template)
			.field("title_template", &self.title_template)
			.field("metadata", &self.metadata)
			.field("has_before_enter", &self.before_enter.is_some())
			.field("has_after_enter", &self.after_enter.is_some())
			.finish()
	}
}

impl RouteDefinition {
	/// Creates a definition for the given path template.
	pub fn new(path_template: impl Into<String>) -> Self {
		Self {
			path_template: path_template.into(),
			..Self::default()
		}
	}

	/// Sets the title template (`{param}` placeholders allowed).
	pub fn title(mut self, template: impl Into<String>) -> Self {
		self.title_template = template.into();
		self
	}

	/// Sets the description template (`{param}` placeholders allowed).
	pub fn description(mut self, template: impl Into<String>) -> Self {
		self.description_template = template.into();
		self
	}

	/// Marks the route as public.
	pub fn public(mut self) -> Self {
		self.metadata.public = true;
		self
	}

	/// Requires the prerequisite collaborator to approve entry.
	pub fn requires_prerequisites(mut self) -> Self {
		self.metadata.requires_prerequisites = true;
		self
	}

	/// Controls whether resolution results for this route are memoised.
	pub fn cacheable(mut self, cacheable: bool) -> Self {
		self.metadata.cacheable = cacheable;
		self
	}

	/// Sets an application-defined metadata flag.
	pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.metadata.extra.insert(key.into(), value.into());
		self
	}

	/// Replaces the metadata wholesale.
	pub fn with_metadata(mut self, metadata: RouteMetadata) -> Self {
		self.metadata = metadata;
		self
	}

	/// Adds a guard that runs after the global before-navigation hooks.
	pub fn before_enter(mut self, hook: Arc<dyn BeforeNavigationHook>) -> Self {
		self.before_enter = Some(hook);
		self
	}

	/// Adds a callback that runs after this route has been committed.
	pub fn after_enter(mut self, hook: Arc<dyn AfterNavigationHook>) -> Self {
		self.after_enter = Some(hook);
		self
	}

	/// Returns the path template.
	pub fn path_template(&self) -> &str {
		&self.path_template
	}

	/// Compiles the template and freezes the definition under `name`.
	///
	/// # Errors
	///
	/// Returns [`RoutePatternError`] if the template is malformed.
	pub fn compile(self, name: impl Into<String>) -> Result<RouteDescriptor, RoutePatternError> {
		let pattern = RoutePattern::compile(&self.path_template)?;
		Ok(RouteDescriptor {
			name: name.into(),
			pattern,
			title_template: self.title_template,
			description_template: self.description_template,
			metadata: self.metadata,
			before_enter: self.before_enter,
			after_enter: self.after_enter,
		})
	}
}

/// A registered route. Immutable once registered.
#[derive(Clone)]
pub struct RouteDescriptor {
	name: String,
	pattern: RoutePattern,
	title_template: String,
	description_template: String,
	metadata: RouteMetadata,
	before_enter: Option<Arc<dyn BeforeNavigationHook>>,
	after_enter: Option<Arc<dyn AfterNavigationHook>>,
}

impl std::fmt::Debug for RouteDescriptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteDescriptor")
			.field("name", &self.name)
			.field("pattern", &self.pattern)
			.field("title_template", &self.title_template)
			.field("metadata", &self.metadata)
			.field("has_before_enter", &self.before_enter.is_some())
			.field("has_after_enter", &self.after_enter.is_some())
			.finish()
	}
}

impl RouteDescriptor {
	/// Returns the route name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the path template.
	pub fn path_template(&self) -> &str {
		self.pattern.template()
	}

	/// Returns the compiled pattern.
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	/// Returns the raw title template.
	pub fn title_template(&self) -> &str {
		&self.title_template
	}

	/// Returns the raw description template.
	pub fn description_template(&self) -> &str {
		&self.description_template
	}

	/// Returns the metadata flags.
	pub fn metadata(&self) -> &RouteMetadata {
		&self.metadata
	}

	/// Returns whether this is the `notFound` or `error` route.
	pub fn is_reserved(&self) -> bool {
		self.name == NOT_FOUND_ROUTE || self.name == ERROR_ROUTE
	}

	/// Returns whether entering this route asks the prerequisite collaborator.
	///
	/// Public and reserved routes are always reachable.
	pub fn needs_prerequisite_check(&self) -> bool {
		self.metadata.requires_prerequisites && !self.metadata.public && !self.is_reserved()
	}

	/// Interpolates the title template.
	pub fn title(&self, params: &HashMap<String, String>) -> String {
		interpolate(&self.title_template, params)
	}

	/// Interpolates the description template.
	pub fn description(&self, params: &HashMap<String, String>) -> String {
		interpolate(&self.description_template, params)
	}

	pub(crate) fn before_enter(&self) -> Option<&Arc<dyn BeforeNavigationHook>> {
		self.before_enter.as_ref()
	}

	pub(crate) fn after_enter(&self) -> Option<&Arc<dyn AfterNavigationHook>> {
		self.after_enter.as_ref()
	}
}
