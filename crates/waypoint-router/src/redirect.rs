//! Redirect rules.
//!
//! A rule maps a source template onto a target template. Parameters captured
//! by the source are substituted into the target, so `/old/:x -> /new/:x`
//! rewrites `/old/7` to `/new/7`.

use crate::error::{RouterError, RouterResult};
use crate::options::{RedirectCondition, RedirectOptions};
use crate::pattern::RoutePattern;

/// A compiled redirect.
#[derive(Clone)]
pub struct RedirectRule {
	from: RoutePattern,
	to: RoutePattern,
	permanent: bool,
	condition: Option<RedirectCondition>,
}

impl std::fmt::Debug for RedirectRule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RedirectRule")
			.field("from", &self.from.template())
			.field("to", &self.to.template())
			.field("permanent", &self.permanent)
			.field("has_condition", &self.condition.is_some())
			.finish()
	}
}

impl RedirectRule {
	/// Compiles a redirect from `from_template` to `to_template`.
	///
	/// # Errors
	///
	/// - [`RouterError::Pattern`] if either template is malformed
	/// - [`RouterError::InvalidRedirect`] if the target names a parameter
	///   the source does not capture
	pub fn new(from_template: &str, to_template: &str, options: RedirectOptions) -> RouterResult<Self> {
		let from = RoutePattern::compile(from_template)?;
		let to = RoutePattern::compile(to_template)?;

		if let Some(missing) = to
			.param_names()
			.iter()
			.find(|name| !from.param_names().contains(name))
		{
			return Err(RouterError::InvalidRedirect {
				from: from_template.to_string(),
				to: to_template.to_string(),
				missing: missing.clone(),
			});
		}

		Ok(Self {
			from,
			to,
			permanent: options.permanent,
			condition: options.condition,
		})
	}

	/// Returns the source pattern.
	pub fn from_pattern(&self) -> &RoutePattern {
		&self.from
	}

	/// Returns the target template.
	pub fn to_template(&self) -> &str {
		self.to.template()
	}

	/// Returns whether the redirect is permanent.
	pub fn is_permanent(&self) -> bool {
		self.permanent
	}

	/// Rewrites `path` if this rule applies to it.
	///
	/// Returns `None` when the source pattern does not match or the
	/// condition declines.
	pub fn rewrite(&self, path: &str) -> Option<String> {
		let (params, _) = self.from.matches(path)?;
		if self.condition.as_ref().is_some_and(|condition| !condition(path)) {
			return None;
		}
		self.to.reverse(&params)
	}
}

/// Registration-ordered redirect rules.
#[derive(Debug, Clone, Default)]
pub struct RedirectRules {
	rules: Vec<RedirectRule>,
	generation: u64,
}

impl RedirectRules {
	/// Creates an empty rule set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a rule. A rule with the same source template replaces the
	/// existing one in place.
	pub fn add(&mut self, rule: RedirectRule) {
		tracing::debug!(
			from = rule.from.template(),
			to = rule.to.template(),
			permanent = rule.permanent,
			"redirect registered"
		);
		match self
			.rules
			.iter_mut()
			.find(|r| r.from.template() == rule.from.template())
		{
			Some(existing) => *existing = rule,
			None => self.rules.push(rule),
		}
		self.generation += 1;
	}

	/// Returns the first rule that rewrites `path`, with the rewritten path.
	pub fn first_match(&self, path: &str) -> Option<(&RedirectRule, String)> {
		self.rules
			.iter()
			.find_map(|rule| rule.rewrite(path).map(|target| (rule, target)))
	}

	/// Returns the rules in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &RedirectRule> {
		self.rules.iter()
	}

	/// Returns the number of rules.
	pub fn len(&self) -> usize {
		self.rules.len()
	}

	/// Returns whether there are no rules.
	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Returns the mutation counter.
	pub fn generation(&self) -> u64 {
		self.generation
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/old/:x", "/new/:x", "/old/7", Some("/new/7"))]
	#[case("/legacy", "/", "/legacy", Some("/"))]
	#[case("/a/:x/b/:y", "/c/:y/:x", "/a/1/b/2", Some("/c/2/1"))]
	#[case("/u/:id", "/profile", "/u/3", Some("/profile"))]
	#[case("/old/:x", "/new/:x", "/old", None)]
	#[case("/old/:x", "/new/:x", "/old/7/extra", None)]
	fn test_rewrite(
		#[case] from: &str,
		#[case] to: &str,
		#[case] path: &str,
		#[case] expected: Option<&str>,
	) {
		let rule = RedirectRule::new(from, to, RedirectOptions::new()).unwrap();
		assert_eq!(rule.rewrite(path).as_deref(), expected);
	}

	#[rstest]
	fn test_unknown_target_parameter_is_rejected() {
		let err = RedirectRule::new("/old/:x", "/new/:y", RedirectOptions::new()).unwrap_err();

		match err {
			RouterError::InvalidRedirect { missing, .. } => assert_eq!(missing, "y"),
			other => panic!("Expected InvalidRedirect, got {:?}", other),
		}
	}

	#[rstest]
	fn test_malformed_template_is_rejected() {
		assert!(matches!(
			RedirectRule::new("old", "/new", RedirectOptions::new()),
			Err(RouterError::Pattern(_))
		));
	}

	#[rstest]
	fn test_condition_gates_rewrite() {
		let rule = RedirectRule::new(
			"/old/:x",
			"/new/:x",
			RedirectOptions::new().when(|path| path != "/old/keep"),
		)
		.unwrap();

		assert_eq!(rule.rewrite("/old/7").as_deref(), Some("/new/7"));
		assert_eq!(rule.rewrite("/old/keep"), None);
	}

	#[rstest]
	fn test_rules_first_match_and_replace() {
		// Arrange
		let mut rules = RedirectRules::new();
		rules.add(RedirectRule::new("/a", "/first", RedirectOptions::new()).unwrap());
		rules.add(RedirectRule::new("/:any", "/second", RedirectOptions::new()).unwrap());

		// Act
		let (_, target) = rules.first_match("/a").unwrap();
		rules.add(RedirectRule::new("/a", "/replaced", RedirectOptions::new().permanent()).unwrap());
		let (rule, replaced) = rules.first_match("/a").unwrap();

		// Assert
		assert_eq!(target, "/first");
		assert_eq!(replaced, "/replaced");
		assert!(rule.is_permanent());
		assert_eq!(rules.len(), 2);
		assert_eq!(rules.generation(), 3);
	}
}
