//! Navigation and redirect options.
//!
//! Options form a closed set with explicit defaults. When options arrive as
//! loosely-typed JSON (for instance from a link attribute or a bridge to a
//! scripting layer), [`OptionsMode`] decides whether unrecognised keys are
//! rejected or ignored.

use crate::error::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Keys understood by [`NavigateOptions`].
const NAVIGATE_OPTION_KEYS: &[&str] = &["replace", "force", "initial", "state"];

/// How unrecognised option keys are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionsMode {
	/// Unknown keys are an error.
	Strict,
	/// Unknown keys are logged and ignored.
	#[default]
	Permissive,
}

/// Options accepted by `Router::navigate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigateOptions {
	/// Replace the current history entry instead of pushing a new one.
	pub replace: bool,
	/// Start even if another navigation is in flight.
	pub force: bool,
	/// Treat this as the initial navigation of the session (implies replace).
	pub initial: bool,
	/// Application state stored with the history entry.
	pub state: Option<serde_json::Value>,
}

impl NavigateOptions {
	/// Creates default options: push, not forced, not initial, no state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the replace flag.
	pub fn replace(mut self, replace: bool) -> Self {
		self.replace = replace;
		self
	}

	/// Sets the force flag.
	pub fn force(mut self, force: bool) -> Self {
		self.force = force;
		self
	}

	/// Sets the initial flag.
	pub fn initial(mut self, initial: bool) -> Self {
		self.initial = initial;
		self
	}

	/// Attaches history state.
	pub fn with_state(mut self, state: serde_json::Value) -> Self {
		self.state = Some(state);
		self
	}

	/// Parses options from a JSON value.
	///
	/// `null` yields the defaults.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidOptions`] if the value is not an
	/// object, if a known key has the wrong type, or, in
	/// [`OptionsMode::Strict`], if it contains an unrecognised key.
	pub fn from_json(value: serde_json::Value, mode: OptionsMode) -> RouterResult<Self> {
		let mut object = match value {
			serde_json::Value::Null => return Ok(Self::default()),
			serde_json::Value::Object(object) => object,
			other => {
				return Err(RouterError::InvalidOptions(format!(
					"expected an object, got {}",
					other
				)));
			}
		};

		let unknown: Vec<String> = object
			.keys()
			.filter(|k| !NAVIGATE_OPTION_KEYS.contains(&k.as_str()))
			.cloned()
			.collect();
		if !unknown.is_empty() {
			match mode {
				OptionsMode::Strict => {
					return Err(RouterError::InvalidOptions(format!(
						"unrecognised keys: {}",
						unknown.join(", ")
					)));
				}
				OptionsMode::Permissive => {
					tracing::warn!(keys = ?unknown, "ignoring unrecognised navigation options");
					for key in &unknown {
						object.remove(key);
					}
				}
			}
		}

		serde_json::from_value(serde_json::Value::Object(object))
			.map_err(|e| RouterError::InvalidOptions(e.to_string()))
	}
}

/// Predicate deciding whether a redirect applies to a request path.
pub type RedirectCondition = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Options accepted by `Router::redirect`.
#[derive(Clone, Default)]
pub struct RedirectOptions {
	/// The redirect is permanent.
	pub permanent: bool,
	/// Only redirect when this returns `true` for the request path.
	pub condition: Option<RedirectCondition>,
}

impl std::fmt::Debug for RedirectOptions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RedirectOptions")
			.field("permanent", &self.permanent)
			.field("has_condition", &self.condition.is_some())
			.finish()
	}
}

impl RedirectOptions {
	/// Creates default options: temporary and unconditional.
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks the redirect permanent.
	pub fn permanent(mut self) -> Self {
		self.permanent = true;
		self
	}

	/// Adds a condition on the request path.
	pub fn when<F>(mut self, condition: F) -> Self
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		self.condition = Some(Arc::new(condition));
		self
	}
}
