//! Error types for client-side routing.
//!
//! Expected conditions (no matching route, a guard declining a navigation)
//! are modelled as data elsewhere in the crate: the `notFound` route and
//! [`AbortReason`]. The types here cover the failures that are surfaced to
//! callers or caught at the navigation boundary.

use thiserror::Error;

/// Boxed error produced by hooks and collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for router configuration and registration operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Why a path template was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternErrorKind {
	/// The template is the empty string.
	#[error("template is empty")]
	Empty,
	/// Templates must be absolute paths.
	#[error("template must start with '/'")]
	MissingLeadingSlash,
	/// A `:` placeholder is not followed by a legal identifier.
	#[error("placeholder at byte {position} is not followed by a valid identifier")]
	InvalidParameterName {
		/// Byte offset of the offending `:`.
		position: usize,
	},
	/// The same parameter name appears twice.
	#[error("parameter '{0}' appears more than once")]
	DuplicateParameter(String),
	/// The template exceeds the maximum length.
	#[error("length {length} exceeds maximum of {max} bytes")]
	TooLong {
		/// Actual template length.
		length: usize,
		/// Maximum allowed length.
		max: usize,
	},
	/// The template has too many path segments.
	#[error("{count} path segments exceed maximum of {max}")]
	TooManySegments {
		/// Actual segment count.
		count: usize,
		/// Maximum allowed segments.
		max: usize,
	},
	/// The generated regular expression failed to compile.
	#[error("failed to compile pattern regex: {0}")]
	Regex(String),
}

/// A malformed path template, reported synchronously at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid route pattern '{template}': {kind}")]
pub struct RoutePatternError {
	/// The offending template.
	pub template: String,
	/// What is wrong with it.
	pub kind: PatternErrorKind,
}

impl RoutePatternError {
	pub(crate) fn new(template: &str, kind: PatternErrorKind) -> Self {
		Self {
			template: template.to_string(),
			kind,
		}
	}
}

/// Error type for path parameter extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
	/// Failed to parse a parameter value.
	#[error("failed to parse parameter[{param_index}] '{raw_value}' as {param_type}: {message}")]
	ParseError {
		/// Index of the parameter that failed to parse.
		param_index: usize,
		/// Expected type name.
		param_type: &'static str,
		/// Raw string value that failed to parse.
		raw_value: String,
		/// Error message from parsing.
		message: String,
	},
	/// Parameter count mismatch.
	#[error("parameter count mismatch: expected {expected}, got {actual}")]
	CountMismatch {
		/// Expected number of parameters.
		expected: usize,
		/// Actual number of parameters.
		actual: usize,
	},
	/// A named parameter is absent from the resolved route.
	#[error("missing parameter: {0}")]
	Missing(String),
}

/// Failure reported by a history collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
	/// The backing history API refused the update.
	#[error("history update rejected for '{url}': {reason}")]
	Rejected {
		/// URL that was being pushed or replaced.
		url: String,
		/// Backend-specific reason.
		reason: String,
	},
	/// The history state could not be serialised.
	#[error("history state serialization failed: {0}")]
	State(String),
}

/// Error type for router registration and configuration.
#[derive(Debug, Error)]
pub enum RouterError {
	/// A path template failed to compile.
	#[error(transparent)]
	Pattern(#[from] RoutePatternError),
	/// Another route already owns a structurally identical path.
	#[error("path '{path}' is already registered by route '{existing}'")]
	DuplicatePath {
		/// Template being registered.
		path: String,
		/// Name of the route that already owns it.
		existing: String,
	},
	/// A redirect target references parameters its source does not capture.
	#[error("redirect '{from}' -> '{to}' references unknown parameter '{missing}'")]
	InvalidRedirect {
		/// Source template.
		from: String,
		/// Target template.
		to: String,
		/// First parameter in the target that the source lacks.
		missing: String,
	},
	/// No route is registered under this name.
	#[error("invalid route name: {0}")]
	InvalidRouteName(String),
	/// A parameter needed to build a path is missing.
	#[error("missing parameter: {0}")]
	MissingParameter(String),
	/// Navigation options could not be parsed.
	#[error("invalid navigation options: {0}")]
	InvalidOptions(String),
	/// Router configuration could not be parsed.
	#[error("invalid router configuration: {0}")]
	Config(String),
}

/// Stage of the commit sequence in which an unexpected error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStage {
	/// A global before-navigation hook.
	BeforeHook,
	/// The route's own `before_enter` guard.
	RouteGuard,
	/// The prerequisite collaborator.
	Prerequisites,
	/// Pushing or replacing the history entry.
	History,
}

impl std::fmt::Display for CommitStage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let stage = match self {
			Self::BeforeHook => "before-navigation hook",
			Self::RouteGuard => "route guard",
			Self::Prerequisites => "prerequisite check",
			Self::History => "history update",
		};
		f.write_str(stage)
	}
}

/// Any unexpected failure raised while resolving or committing a navigation.
///
/// Caught at the state machine boundary and converted into a single
/// navigation to the reserved `error` route.
#[derive(Debug, Error)]
#[error("navigation to '{path}' failed during {stage}: {source}")]
pub struct UnhandledNavigationError {
	/// The path that was being navigated to.
	pub path: String,
	/// Name of the route that was current when the failure happened.
	pub current: Option<String>,
	/// Where in the commit sequence the failure happened.
	pub stage: CommitStage,
	/// The underlying error.
	#[source]
	pub source: BoxError,
}

/// Why a navigation was declined.
///
/// This is reported as data rather than as an error: the caller sees a
/// failed navigation and the router stays on its current route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
	/// A global before-navigation hook returned `false`.
	GuardRejected {
		/// Handle id of the rejecting hook.
		hook: u64,
	},
	/// The target route's `before_enter` guard returned `false`.
	RouteGuardRejected {
		/// Name of the guarded route.
		route: String,
	},
	/// The prerequisite collaborator declined the target route.
	PrerequisitesNotMet {
		/// Name of the gated route.
		route: String,
	},
}

impl std::fmt::Display for AbortReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::GuardRejected { hook } => write!(f, "before-navigation hook #{} declined", hook),
			Self::RouteGuardRejected { route } => write!(f, "guard on route '{}' declined", route),
			Self::PrerequisitesNotMet { route } => {
				write!(f, "prerequisites for route '{}' are not met", route)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_pattern_error_names_template() {
		let err = RoutePatternError::new("/a/:", PatternErrorKind::InvalidParameterName { position: 3 });
		let message = err.to_string();
		assert!(message.contains("'/a/:'"));
		assert!(message.contains("byte 3"));
	}

	#[rstest]
	fn test_router_error_from_pattern_error_is_transparent() {
		let err: RouterError = RoutePatternError::new("", PatternErrorKind::Empty).into();
		assert_eq!(err.to_string(), "invalid route pattern '': template is empty");
	}

	#[rstest]
	fn test_path_error_display() {
		let err = PathError::ParseError {
			param_index: 0,
			param_type: "i32",
			raw_value: "abc".to_string(),
			message: "invalid digit".to_string(),
		};
		assert!(err.to_string().contains("parameter[0]"));
		assert!(err.to_string().contains("abc"));
		assert!(err.to_string().contains("i32"));
	}

	#[rstest]
	fn test_unhandled_error_keeps_source() {
		let err = UnhandledNavigationError {
			path: "/projects/1".to_string(),
			current: Some("home".to_string()),
			stage: CommitStage::History,
			source: "quota exceeded".into(),
		};
		assert!(err.to_string().contains("history update"));
		assert!(std::error::Error::source(&err).is_some());
	}

	#[rstest]
	fn test_errors_are_send_sync() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<RouterError>();
		assert_send_sync::<UnhandledNavigationError>();
	}
}
