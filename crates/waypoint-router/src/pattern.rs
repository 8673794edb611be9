//! Path template compilation.
//!
//! Turns a route template such as `/projects/:projectId/workspace` into an
//! anchored regular expression plus the ordered list of parameter names.
//! Compilation is pure and deterministic, which is what allows resolved
//! routes to be memoised by [`RouteCache`](crate::cache::RouteCache).

use crate::error::{PatternErrorKind, RoutePatternError};
use std::collections::HashMap;

/// Maximum allowed length for a path template in bytes.
const MAX_TEMPLATE_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a template.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled template regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Capture group for a single path segment.
const SEGMENT_CAPTURE: &str = "([^/]+)";

/// A piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Param(String),
}

/// A compiled path template.
///
/// Supports templates like:
/// - `/users` - Exact match
/// - `/users/:id` - Single path parameter
/// - `/users/:userId/posts/:postId` - Multiple parameters
/// - `/files/:name.json` - Parameters followed by literal text
///
/// Each `:name` placeholder matches one path segment, that is any
/// non-empty run of characters other than `/`. The pattern is anchored at
/// both ends so it never matches a substring of a longer path.
#[derive(Debug, Clone)]
pub struct RoutePattern {
	/// The original template string.
	template: String,
	/// Compiled regex pattern.
	regex: regex::Regex,
	/// Parameter names in capture-group order.
	param_names: Vec<String>,
	/// Literal and parameter pieces, used for reversing.
	segments: Vec<Segment>,
}

impl RoutePattern {
	/// Compiles a path template.
	///
	/// # Errors
	///
	/// Returns [`RoutePatternError`] naming the template if:
	/// - the template is empty or does not start with `/`
	/// - a `:` is not followed by a legal identifier (`[A-Za-z_][A-Za-z0-9_]*`)
	/// - a parameter name is used twice
	/// - the template exceeds 1024 bytes or 32 segments
	pub fn compile(template: &str) -> Result<Self, RoutePatternError> {
		let fail = |kind| RoutePatternError::new(template, kind);

		if template.is_empty() {
			return Err(fail(PatternErrorKind::Empty));
		}
		if !template.starts_with('/') {
			return Err(fail(PatternErrorKind::MissingLeadingSlash));
		}
		if template.len() > MAX_TEMPLATE_LENGTH {
			return Err(fail(PatternErrorKind::TooLong {
				length: template.len(),
				max: MAX_TEMPLATE_LENGTH,
			}));
		}
		let segment_count = template.split('/').count();
		if segment_count > MAX_PATH_SEGMENTS {
			return Err(fail(PatternErrorKind::TooManySegments {
				count: segment_count,
				max: MAX_PATH_SEGMENTS,
			}));
		}

		let segments = Self::parse_segments(template)?;

		let mut regex_str = String::from("^");
		let mut param_names = Vec::new();
		for segment in &segments {
			match segment {
				Segment::Literal(text) => regex_str.push_str(&regex::escape(text)),
				Segment::Param(name) => {
					regex_str.push_str(SEGMENT_CAPTURE);
					param_names.push(name.clone());
				}
			}
		}
		regex_str.push('$');

		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| fail(PatternErrorKind::Regex(e.to_string())))?;

		Ok(Self {
			template: template.to_string(),
			regex,
			param_names,
			segments,
		})
	}

	/// Splits a template into literal runs and `:name` placeholders.
	fn parse_segments(template: &str) -> Result<Vec<Segment>, RoutePatternError> {
		let mut segments = Vec::new();
		let mut literal = String::new();
		let mut chars = template.char_indices().peekable();

		while let Some((position, c)) = chars.next() {
			if c != ':' {
				literal.push(c);
				continue;
			}

			let mut name = String::new();
			while let Some(&(_, next)) = chars.peek() {
				if !(next.is_ascii_alphanumeric() || next == '_') {
					break;
				}
				name.push(next);
				chars.next();
			}

			let starts_legally = name
				.chars()
				.next()
				.is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
			if !starts_legally {
				return Err(RoutePatternError::new(
					template,
					PatternErrorKind::InvalidParameterName { position },
				));
			}
			let already_used = segments
				.iter()
				.any(|s| matches!(s, Segment::Param(existing) if *existing == name));
			if already_used {
				return Err(RoutePatternError::new(
					template,
					PatternErrorKind::DuplicateParameter(name),
				));
			}

			if !literal.is_empty() {
				segments.push(Segment::Literal(std::mem::take(&mut literal)));
			}
			segments.push(Segment::Param(name));
		}

		if !literal.is_empty() {
			segments.push(Segment::Literal(literal));
		}
		Ok(segments)
	}

	/// Returns the original template string.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Returns the parameter names in the order they appear in the template.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns the compiled regular expression source.
	///
	/// Two templates that differ only in parameter names share the same
	/// source, so this doubles as a structural key for duplicate detection.
	pub fn as_regex_str(&self) -> &str {
		self.regex.as_str()
	}

	/// Returns whether this template has no parameters.
	pub fn is_exact(&self) -> bool {
		self.param_names.is_empty()
	}

	/// Checks if this pattern matches the whole of `path`.
	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Returns the captured values in positional order.
	///
	/// The Nth value corresponds to the Nth entry of [`param_names`](Self::param_names).
	pub fn captures(&self, path: &str) -> Option<Vec<String>> {
		self.regex.captures(path).map(|caps| {
			caps.iter()
				.skip(1)
				.map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
				.collect()
		})
	}

	/// Attempts to match a path against this pattern.
	///
	/// Returns `Some((params, param_values))` if the path matches, where:
	/// - `params` is a map of parameter names to their extracted values
	/// - `param_values` is a vector of values in the order they appear in the template
	pub fn matches(&self, path: &str) -> Option<(HashMap<String, String>, Vec<String>)> {
		self.captures(path).map(|param_values| {
			let params = self
				.param_names
				.iter()
				.cloned()
				.zip(param_values.iter().cloned())
				.collect();
			(params, param_values)
		})
	}

	/// Generates a path from this template with the given parameters.
	///
	/// Returns `None` if a parameter is missing.
	pub fn reverse(&self, params: &HashMap<String, String>) -> Option<String> {
		let mut result = String::with_capacity(self.template.len());
		for segment in &self.segments {
			match segment {
				Segment::Literal(text) => result.push_str(text),
				Segment::Param(name) => result.push_str(params.get(name)?),
			}
		}
		Some(result)
	}
}

impl PartialEq for RoutePattern {
	fn eq(&self, other: &Self) -> bool {
		self.template == other.template
			&& self.regex.as_str() == other.regex.as_str()
			&& self.param_names == other.param_names
	}
}

impl Eq for RoutePattern {}

impl std::fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.template)
	}
}
