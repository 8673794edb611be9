//! Path resolution.
//!
//! [`Resolver::resolve`] never fails. Every input maps to some route, with
//! the reserved `notFound` route as the last resort.

use crate::error::PathError;
use crate::params::{FromPath, ParamContext};
use crate::query::{parse_query, split_path_and_query};
use crate::redirect::RedirectRules;
use crate::route::{NOT_FOUND_ROUTE, RouteDescriptor};
use crate::table::RouteTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Parameter set on the `notFound` route holding the requested input.
pub const ORIGINAL_PATH_PARAM: &str = "originalPath";

/// Parameter set on the `error` route holding the error message.
pub const ERROR_PARAM: &str = "error";

/// The outcome of matching one request against the route table.
///
/// Created fresh per resolution and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
	descriptor: Arc<RouteDescriptor>,
	params: HashMap<String, String>,
	param_values: Vec<String>,
	query: HashMap<String, String>,
	raw_path: String,
	full_path: String,
	is_redirect_target: bool,
	redirect_permanent: bool,
	redirected_from: Option<String>,
}

impl ResolvedRoute {
	fn new(
		descriptor: Arc<RouteDescriptor>,
		params: HashMap<String, String>,
		param_values: Vec<String>,
		path: &str,
		query: &str,
	) -> Self {
		let full_path = if query.is_empty() {
			path.to_string()
		} else {
			format!("{}?{}", path, query)
		};
		Self {
			descriptor,
			params,
			param_values,
			query: parse_query(query),
			raw_path: path.to_string(),
			full_path,
			is_redirect_target: false,
			redirect_permanent: false,
			redirected_from: None,
		}
	}

	/// Returns the matched descriptor.
	pub fn descriptor(&self) -> &Arc<RouteDescriptor> {
		&self.descriptor
	}

	/// Returns the matched route name.
	pub fn name(&self) -> &str {
		self.descriptor.name()
	}

	/// Returns the path parameters by name.
	pub fn params(&self) -> &HashMap<String, String> {
		&self.params
	}

	/// Returns a single path parameter.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Returns the path parameters in template order.
	pub fn param_values(&self) -> &[String] {
		&self.param_values
	}

	/// Returns the parsed query.
	pub fn query(&self) -> &HashMap<String, String> {
		&self.query
	}

	/// Returns the pathname that was matched.
	pub fn raw_path(&self) -> &str {
		&self.raw_path
	}

	/// Returns the pathname plus query string.
	pub fn full_path(&self) -> &str {
		&self.full_path
	}

	/// Returns whether this route was reached through a redirect.
	pub fn is_redirect_target(&self) -> bool {
		self.is_redirect_target
	}

	/// Returns whether the redirect that produced this route is permanent.
	pub fn redirect_permanent(&self) -> bool {
		self.redirect_permanent
	}

	/// Returns the input that was redirected here.
	pub fn redirected_from(&self) -> Option<&str> {
		self.redirected_from.as_deref()
	}

	/// Returns whether this is the reserved `notFound` route.
	pub fn is_not_found(&self) -> bool {
		self.descriptor.name() == NOT_FOUND_ROUTE
	}

	/// Interpolates the descriptor's title with this route's parameters.
	pub fn title(&self) -> String {
		self.descriptor.title(&self.params)
	}

	/// Interpolates the descriptor's description with this route's parameters.
	pub fn description(&self) -> String {
		self.descriptor.description(&self.params)
	}

	/// Extracts typed parameters.
	///
	/// # Example
	///
	/// ```ignore
	/// let Path((project, stage)) = route.extract::<Path<(u64, String)>>()?;
	/// ```
	///
	/// # Errors
	///
	/// Returns [`PathError`] if the parameter count or a value does not fit `T`.
	pub fn extract<T: FromPath>(&self) -> Result<T, PathError> {
		T::from_path(&self.param_context())
	}

	/// Parses one named parameter.
	///
	/// # Errors
	///
	/// Returns [`PathError`] if the parameter is missing or does not parse.
	pub fn param_as<T>(&self, name: &str) -> Result<T, PathError>
	where
		T: std::str::FromStr,
		T::Err: std::fmt::Display,
	{
		self.param_context().parse(name)
	}

	fn param_context(&self) -> ParamContext {
		ParamContext::new(self.params.clone(), self.param_values.clone())
			.with_param_names(self.descriptor.pattern().param_names().to_vec())
	}

	/// Returns a detached copy suitable for logs and history.
	pub fn snapshot(&self) -> RouteSnapshot {
		RouteSnapshot {
			name: self.name().to_string(),
			path_template: self.descriptor.path_template().to_string(),
			params: self.params.clone(),
			query: self.query.clone(),
			raw_path: self.raw_path.clone(),
			full_path: self.full_path.clone(),
			is_redirect_target: self.is_redirect_target,
			redirected_from: self.redirected_from.clone(),
		}
	}
}

/// A serialisable deep copy of a [`ResolvedRoute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSnapshot {
	/// Route name.
	pub name: String,
	/// Path template of the route.
	pub path_template: String,
	/// Path parameters.
	pub params: HashMap<String, String>,
	/// Query parameters.
	pub query: HashMap<String, String>,
	/// Matched pathname.
	pub raw_path: String,
	/// Pathname plus query.
	pub full_path: String,
	/// Reached through a redirect.
	pub is_redirect_target: bool,
	/// Input that was redirected.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redirected_from: Option<String>,
}

/// Matches request paths against a route table and redirect rules.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
	table: &'a RouteTable,
	redirects: &'a RedirectRules,
}

impl<'a> Resolver<'a> {
	/// Creates a resolver over a table snapshot.
	pub fn new(table: &'a RouteTable, redirects: &'a RedirectRules) -> Self {
		Self { table, redirects }
	}

	/// Resolves `raw` into a route.
	///
	/// In order:
	/// 1. an exact route name resolves to that route with no parameters
	/// 2. the pathname is matched against each route in registration order
	/// 3. the first redirect rule that rewrites the pathname is applied
	///    once and the result matched again without further redirects
	/// 4. otherwise the `notFound` route, with `originalPath` set to `raw`
	pub fn resolve(&self, raw: &str) -> ResolvedRoute {
		if let Some(descriptor) = self.table.get(raw) {
			tracing::debug!(input = raw, route = descriptor.name(), "resolved by name");
			let path = descriptor
				.pattern()
				.reverse(&HashMap::new())
				.unwrap_or_else(|| raw.to_string());
			return ResolvedRoute::new(Arc::clone(descriptor), HashMap::new(), Vec::new(), &path, "");
		}

		let (path, query) = split_path_and_query(raw);
		if let Some(route) = self.match_path(path, query) {
			tracing::debug!(input = raw, route = route.name(), "resolved");
			return route;
		}

		if let Some((rule, target)) = self.redirects.first_match(path) {
			match self.match_path(&target, query) {
				Some(mut route) => {
					tracing::debug!(
						input = raw,
						target = %target,
						route = route.name(),
						"resolved through redirect"
					);
					route.is_redirect_target = true;
					route.redirect_permanent = rule.is_permanent();
					route.redirected_from = Some(raw.to_string());
					return route;
				}
				None => {
					tracing::debug!(input = raw, target = %target, "redirect target is unmatched");
				}
			}
		}

		tracing::debug!(input = raw, "no route matched");
		self.not_found(raw)
	}

	/// Tries every route in registration order against `path`.
	fn match_path(&self, path: &str, query: &str) -> Option<ResolvedRoute> {
		self.table.all().find_map(|descriptor| {
			descriptor.pattern().captures(path).map(|captured| {
				let param_values: Vec<String> = captured.iter().map(|v| decode_segment(v)).collect();
				let params = descriptor
					.pattern()
					.param_names()
					.iter()
					.cloned()
					.zip(param_values.iter().cloned())
					.collect();
				ResolvedRoute::new(Arc::clone(descriptor), params, param_values, path, query)
			})
		})
	}

	/// Builds the `notFound` route for `raw`.
	pub fn not_found(&self, raw: &str) -> ResolvedRoute {
		let (path, query) = split_path_and_query(raw);
		let mut params = HashMap::new();
		params.insert(ORIGINAL_PATH_PARAM.to_string(), raw.to_string());
		let mut route = ResolvedRoute::new(
			Arc::clone(self.table.not_found()),
			params,
			Vec::new(),
			path,
			query,
		);
		// Echo the request, not the reserved template.
		route.full_path = raw.to_string();
		route
	}

	/// Builds the `error` route for a failed navigation to `original_path`.
	pub fn error_route(&self, original_path: &str, error: &str) -> ResolvedRoute {
		let descriptor = Arc::clone(self.table.error());
		let path = descriptor
			.pattern()
			.reverse(&HashMap::new())
			.unwrap_or_else(|| descriptor.path_template().to_string());
		let mut params = HashMap::new();
		params.insert(ORIGINAL_PATH_PARAM.to_string(), original_path.to_string());
		params.insert(ERROR_PARAM.to_string(), error.to_string());
		ResolvedRoute::new(descriptor, params, Vec::new(), &path, "")
	}
}

/// Percent-decodes a captured segment, keeping it raw if it is not valid UTF-8.
fn decode_segment(raw: &str) -> String {
	urlencoding::decode(raw)
		.map(|decoded| decoded.into_owned())
		.unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::options::RedirectOptions;
	use crate::params::Path;
	use crate::redirect::RedirectRule;
	use crate::route::RouteDefinition;
	use rstest::{fixture, rstest};

	#[fixture]
	fn table() -> RouteTable {
		let mut table = RouteTable::new();
		table.register("home", RouteDefinition::new("/")).unwrap();
		table
			.register("workspace", RouteDefinition::new("/projects/:id/workspace"))
			.unwrap();
		table
			.register(
				"stage",
				RouteDefinition::new("/projects/:projectId/stages/:stage").title("Stage {stage}"),
			)
			.unwrap();
		table.register("item", RouteDefinition::new("/items/:id")).unwrap();
		table
			.register("featured", RouteDefinition::new("/items/featured"))
			.unwrap();
		table.register("new", RouteDefinition::new("/new/:x")).unwrap();
		table
	}

	#[rstest]
	fn test_params_and_query(table: RouteTable) {
		let redirects = RedirectRules::new();
		let resolver = Resolver::new(&table, &redirects);

		let route = resolver.resolve("/projects/42/workspace?mode=edit");

		assert_eq!(route.name(), "workspace");
		assert_eq!(route.param("id"), Some("42"));
		assert_eq!(route.params().len(), 1);
		assert_eq!(route.query().get("mode"), Some(&"edit".to_string()));
		assert_eq!(route.raw_path(), "/projects/42/workspace");
		assert_eq!(route.full_path(), "/projects/42/workspace?mode=edit");
		assert!(!route.is_redirect_target());
	}

	#[rstest]
	fn test_registration_order_decides(table: RouteTable) {
		let redirects = RedirectRules::new();

		let route = Resolver::new(&table, &redirects).resolve("/items/featured");

		assert_eq!(route.name(), "item");
		assert_eq!(route.param("id"), Some("featured"));
	}

	#[rstest]
	#[case("/does/not/exist")]
	#[case("")]
	#[case("no-leading-slash")]
	#[case("/projects//workspace")]
	#[case("/projects/42/workspace/")]
	fn test_unmatched_falls_back_to_not_found(table: RouteTable, #[case] input: &str) {
		let redirects = RedirectRules::new();

		let route = Resolver::new(&table, &redirects).resolve(input);

		assert_eq!(route.name(), NOT_FOUND_ROUTE);
		assert!(route.is_not_found());
		assert_eq!(route.param(ORIGINAL_PATH_PARAM), Some(input));
	}

	#[rstest]
	fn test_resolve_by_name(table: RouteTable) {
		let redirects = RedirectRules::new();

		let route = Resolver::new(&table, &redirects).resolve("home");

		assert_eq!(route.name(), "home");
		assert!(route.params().is_empty());
		assert!(route.query().is_empty());
		assert_eq!(route.full_path(), "/");
	}

	#[rstest]
	fn test_single_hop_redirect(table: RouteTable) {
		// Arrange
		let mut redirects = RedirectRules::new();
		redirects.add(RedirectRule::new("/old/:x", "/new/:x", RedirectOptions::new().permanent()).unwrap());

		// Act
		let route = Resolver::new(&table, &redirects).resolve("/old/7?ref=mail");

		// Assert
		assert_eq!(route.name(), "new");
		assert_eq!(route.param("x"), Some("7"));
		assert!(route.is_redirect_target());
		assert!(route.redirect_permanent());
		assert_eq!(route.redirected_from(), Some("/old/7?ref=mail"));
		assert_eq!(route.full_path(), "/new/7?ref=mail");
	}

	#[rstest]
	fn test_mutual_redirects_terminate(table: RouteTable) {
		let mut redirects = RedirectRules::new();
		redirects.add(RedirectRule::new("/ping", "/pong", RedirectOptions::new()).unwrap());
		redirects.add(RedirectRule::new("/pong", "/ping", RedirectOptions::new()).unwrap());

		let route = Resolver::new(&table, &redirects).resolve("/ping");

		assert_eq!(route.name(), NOT_FOUND_ROUTE);
		assert_eq!(route.param(ORIGINAL_PATH_PARAM), Some("/ping"));
	}

	#[rstest]
	fn test_captured_segments_are_decoded(table: RouteTable) {
		let redirects = RedirectRules::new();

		let route = Resolver::new(&table, &redirects).resolve("/items/caf%C3%A9%20bar");

		assert_eq!(route.param("id"), Some("café bar"));
	}

	#[rstest]
	fn test_typed_extraction(table: RouteTable) {
		let redirects = RedirectRules::new();
		let route = Resolver::new(&table, &redirects).resolve("/projects/42/stages/design");

		let Path((project, stage)) = route.extract::<Path<(u64, String)>>().unwrap();

		assert_eq!(project, 42);
		assert_eq!(stage, "design");
		assert_eq!(route.param_as::<u64>("projectId").unwrap(), 42);
		assert!(route.param_as::<u64>("stage").is_err());
		assert_eq!(route.title(), "Stage design");
	}

	#[rstest]
	fn test_param_error_index_follows_template_order(table: RouteTable) {
		let redirects = RedirectRules::new();
		let route = Resolver::new(&table, &redirects).resolve("/projects/draft/stages/draft");

		let err = route.param_as::<u64>("stage").unwrap_err();

		assert!(matches!(err, PathError::ParseError { param_index: 1, .. }));
	}

	#[rstest]
	fn test_snapshot_is_detached(table: RouteTable) {
		let redirects = RedirectRules::new();
		let route = Resolver::new(&table, &redirects).resolve("/items/9?tab=a");

		let snapshot = route.snapshot();
		let json = serde_json::to_value(&snapshot).unwrap();

		assert_eq!(snapshot.name, "item");
		assert_eq!(snapshot.path_template, "/items/:id");
		assert_eq!(json["fullPath"], "/items/9?tab=a");
		assert_eq!(serde_json::from_value::<RouteSnapshot>(json).unwrap(), snapshot);
	}

	#[rstest]
	fn test_error_route_carries_context(table: RouteTable) {
		let redirects = RedirectRules::new();

		let route = Resolver::new(&table, &redirects).error_route("/items/1", "boom");

		assert_eq!(route.name(), crate::route::ERROR_ROUTE);
		assert_eq!(route.param(ORIGINAL_PATH_PARAM), Some("/items/1"));
		assert_eq!(route.param(ERROR_PARAM), Some("boom"));
		assert_eq!(route.full_path(), "/error");
	}
}
