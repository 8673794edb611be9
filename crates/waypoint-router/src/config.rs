//! Router configuration.

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::{RouterError, RouterResult};
use crate::options::OptionsMode;
use crate::record::DEFAULT_MAX_RECORDS;
use crate::table::{DEFAULT_ERROR_PATH, DEFAULT_NOT_FOUND_PATH};
use serde::{Deserialize, Serialize};

/// Configuration for a [`Router`](crate::core::Router).
///
/// Every field has a default, so a TOML document only needs the keys it
/// changes:
///
/// ```toml
/// cache_capacity = 64
/// options_mode = "strict"
/// title_suffix = " | Atlas"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
	/// Maximum number of navigation records kept; oldest are dropped first.
	pub max_history_records: usize,

	/// Whether resolution results are memoised.
	pub cache_enabled: bool,

	/// Maximum memoised inputs; `0` means unbounded.
	pub cache_capacity: usize,

	/// How unrecognised navigation option keys are treated.
	pub options_mode: OptionsMode,

	/// Appended to every interpolated page title.
	pub title_suffix: Option<String>,

	/// Template of the reserved not-found route.
	pub not_found_path: String,

	/// Template of the reserved error route.
	pub error_path: String,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			max_history_records: DEFAULT_MAX_RECORDS,
			cache_enabled: true,
			cache_capacity: DEFAULT_CACHE_CAPACITY,
			options_mode: OptionsMode::default(),
			title_suffix: None,
			not_found_path: DEFAULT_NOT_FOUND_PATH.to_string(),
			error_path: DEFAULT_ERROR_PATH.to_string(),
		}
	}
}

impl RouterConfig {
	/// Creates a configuration with default values.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a configuration from TOML.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Config`] if the document is not valid TOML or
	/// contains unknown keys or mistyped values.
	pub fn from_toml_str(source: &str) -> RouterResult<Self> {
		toml::from_str(source).map_err(|e| RouterError::Config(e.to_string()))
	}

	/// Sets the navigation record limit.
	pub fn with_max_history_records(mut self, max: usize) -> Self {
		self.max_history_records = max;
		self
	}

	/// Enables or disables the route cache.
	pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
		self.cache_enabled = enabled;
		self
	}

	/// Sets the route cache capacity.
	pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
		self.cache_capacity = capacity;
		self
	}

	/// Sets the option parsing mode.
	pub fn with_options_mode(mut self, mode: OptionsMode) -> Self {
		self.options_mode = mode;
		self
	}

	/// Sets the page title suffix.
	pub fn with_title_suffix(mut self, suffix: impl Into<String>) -> Self {
		self.title_suffix = Some(suffix.into());
		self
	}

	/// Sets the not-found route template.
	pub fn with_not_found_path(mut self, path: impl Into<String>) -> Self {
		self.not_found_path = path.into();
		self
	}

	/// Sets the error route template.
	pub fn with_error_path(mut self, path: impl Into<String>) -> Self {
		self.error_path = path.into();
		self
	}
}
