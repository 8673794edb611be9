//! The route table.
//!
//! Routes are kept in registration order, which is also the order the
//! resolver tries them in: the first structural match wins. A looser
//! template registered early therefore shadows a more specific one
//! registered later, e.g. `/items/:id` before `/items/featured`.

use crate::error::{RouterError, RouterResult};
use crate::route::{ERROR_ROUTE, NOT_FOUND_ROUTE, RouteDefinition, RouteDescriptor};
use indexmap::IndexMap;
use std::sync::Arc;

/// Default template of the reserved not-found route.
pub const DEFAULT_NOT_FOUND_PATH: &str = "/404";

/// Default template of the reserved error route.
pub const DEFAULT_ERROR_PATH: &str = "/error";

/// Insertion-ordered mapping from route name to descriptor.
///
/// The table always contains a `notFound` and an `error` descriptor. They
/// can be overwritten by registering under the same name but never removed.
#[derive(Debug, Clone)]
pub struct RouteTable {
	routes: IndexMap<String, Arc<RouteDescriptor>>,
	not_found: Arc<RouteDescriptor>,
	error: Arc<RouteDescriptor>,
	/// Bumped on every mutation; derived caches compare against it.
	generation: u64,
}

impl Default for RouteTable {
	fn default() -> Self {
		let not_found = Arc::new(Self::reserved_descriptor(
			NOT_FOUND_ROUTE,
			RouteDefinition::new(DEFAULT_NOT_FOUND_PATH).title("Page not found"),
		));
		let error = Arc::new(Self::reserved_descriptor(
			ERROR_ROUTE,
			RouteDefinition::new(DEFAULT_ERROR_PATH).title("Something went wrong"),
		));
		let mut routes = IndexMap::new();
		routes.insert(NOT_FOUND_ROUTE.to_string(), Arc::clone(&not_found));
		routes.insert(ERROR_ROUTE.to_string(), Arc::clone(&error));

		Self {
			routes,
			not_found,
			error,
			generation: 0,
		}
	}
}

impl RouteTable {
	/// Creates a table containing only the reserved routes.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a table whose reserved routes live at the given templates.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Pattern`] if either template is malformed.
	pub fn with_reserved_paths(not_found_path: &str, error_path: &str) -> RouterResult<Self> {
		let mut table = Self::default();
		if not_found_path != DEFAULT_NOT_FOUND_PATH {
			table.register(
				NOT_FOUND_ROUTE,
				RouteDefinition::new(not_found_path).title("Page not found"),
			)?;
		}
		if error_path != DEFAULT_ERROR_PATH {
			table.register(
				ERROR_ROUTE,
				RouteDefinition::new(error_path).title("Something went wrong"),
			)?;
		}
		table.generation = 0;
		Ok(table)
	}

	fn reserved_descriptor(name: &str, definition: RouteDefinition) -> RouteDescriptor {
		match definition.compile(name) {
			Ok(descriptor) => descriptor,
			// The built-in templates are literal paths; only reachable if they are edited.
			Err(e) => unreachable!("built-in route template rejected: {}", e),
		}
	}

	/// Validates, compiles and inserts a route.
	///
	/// Re-registering an existing name overwrites it in place, keeping its
	/// position in the resolution order.
	///
	/// # Errors
	///
	/// - [`RouterError::InvalidRouteName`] if `name` is empty
	/// - [`RouterError::Pattern`] if the template is malformed
	/// - [`RouterError::DuplicatePath`] if a route with another name already
	///   has a structurally identical template
	pub fn register(
		&mut self,
		name: impl Into<String>,
		definition: RouteDefinition,
	) -> RouterResult<Arc<RouteDescriptor>> {
		let name = name.into();
		if name.is_empty() {
			return Err(RouterError::InvalidRouteName(name));
		}

		let descriptor = definition.compile(name.clone())?;
		let structure = descriptor.pattern().as_regex_str();
		if let Some(existing) = self
			.routes
			.values()
			.find(|d| d.name() != name && d.pattern().as_regex_str() == structure)
		{
			return Err(RouterError::DuplicatePath {
				path: descriptor.path_template().to_string(),
				existing: existing.name().to_string(),
			});
		}

		let descriptor = Arc::new(descriptor);
		match name.as_str() {
			NOT_FOUND_ROUTE => self.not_found = Arc::clone(&descriptor),
			ERROR_ROUTE => self.error = Arc::clone(&descriptor),
			_ => {}
		}
		let replaced = self.routes.insert(name, Arc::clone(&descriptor)).is_some();
		self.generation += 1;

		tracing::debug!(
			route = descriptor.name(),
			path = descriptor.path_template(),
			replaced,
			"route registered"
		);
		Ok(descriptor)
	}

	/// Removes a route. Removing a reserved route is a no-op.
	pub fn unregister(&mut self, name: &str) -> Option<Arc<RouteDescriptor>> {
		if name == NOT_FOUND_ROUTE || name == ERROR_ROUTE {
			tracing::debug!(route = name, "ignoring removal of reserved route");
			return None;
		}
		let removed = self.routes.shift_remove(name);
		if removed.is_some() {
			self.generation += 1;
			tracing::debug!(route = name, "route removed");
		}
		removed
	}

	/// Returns the descriptor registered under `name`.
	pub fn get(&self, name: &str) -> Option<&Arc<RouteDescriptor>> {
		self.routes.get(name)
	}

	/// Returns whether a route is registered under `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.routes.contains_key(name)
	}

	/// Returns the descriptors in registration order.
	pub fn all(&self) -> impl Iterator<Item = &Arc<RouteDescriptor>> {
		self.routes.values()
	}

	/// Returns the route names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.routes.keys().map(String::as_str)
	}

	/// Returns the number of routes, reserved ones included.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Always `false`: the reserved routes are never removed.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Returns the reserved not-found descriptor.
	pub fn not_found(&self) -> &Arc<RouteDescriptor> {
		&self.not_found
	}

	/// Returns the reserved error descriptor.
	pub fn error(&self) -> &Arc<RouteDescriptor> {
		&self.error
	}

	/// Returns the mutation counter.
	pub fn generation(&self) -> u64 {
		self.generation
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::PatternErrorKind;
	use rstest::rstest;

	#[rstest]
	fn test_new_table_has_reserved_routes() {
		let table = RouteTable::new();

		assert!(table.contains(NOT_FOUND_ROUTE));
		assert!(table.contains(ERROR_ROUTE));
		assert_eq!(table.not_found().path_template(), DEFAULT_NOT_FOUND_PATH);
		assert_eq!(table.error().path_template(), DEFAULT_ERROR_PATH);
		assert_eq!(table.generation(), 0);
	}

	#[rstest]
	fn test_register_preserves_insertion_order() {
		let mut table = RouteTable::new();
		table.register("home", RouteDefinition::new("/")).unwrap();
		table.register("items", RouteDefinition::new("/items/:id")).unwrap();
		table.register("about", RouteDefinition::new("/about")).unwrap();

		let names: Vec<&str> = table.names().collect();
		assert_eq!(names, vec![NOT_FOUND_ROUTE, ERROR_ROUTE, "home", "items", "about"]);
	}

	#[rstest]
	fn test_reregister_overwrites_in_place() {
		// Arrange
		let mut table = RouteTable::new();
		table.register("a", RouteDefinition::new("/a")).unwrap();
		table.register("b", RouteDefinition::new("/b")).unwrap();
		let generation = table.generation();

		// Act
		table.register("a", RouteDefinition::new("/alpha")).unwrap();

		// Assert
		let names: Vec<&str> = table.names().collect();
		assert_eq!(&names[2..], &["a", "b"]);
		assert_eq!(table.get("a").unwrap().path_template(), "/alpha");
		assert!(table.generation() > generation);
	}

	#[rstest]
	fn test_register_rejects_malformed_template() {
		let mut table = RouteTable::new();

		let err = table.register("bad", RouteDefinition::new("/x/:")).unwrap_err();

		match err {
			RouterError::Pattern(e) => {
				assert_eq!(e.template, "/x/:");
				assert!(matches!(e.kind, PatternErrorKind::InvalidParameterName { .. }));
			}
			other => panic!("Expected pattern error, got {:?}", other),
		}
		assert!(!table.contains("bad"));
	}

	#[rstest]
	fn test_register_rejects_duplicate_path() {
		let mut table = RouteTable::new();
		table.register("item", RouteDefinition::new("/items/:id")).unwrap();

		let err = table.register("other", RouteDefinition::new("/items/:slug")).unwrap_err();

		assert!(matches!(
			err,
			RouterError::DuplicatePath { ref existing, .. } if existing == "item"
		));
	}

	#[rstest]
	fn test_register_rejects_empty_name() {
		let mut table = RouteTable::new();
		assert!(matches!(
			table.register("", RouteDefinition::new("/x")),
			Err(RouterError::InvalidRouteName(_))
		));
	}

	#[rstest]
	fn test_unregister() {
		let mut table = RouteTable::new();
		table.register("a", RouteDefinition::new("/a")).unwrap();
		let generation = table.generation();

		assert!(table.unregister("a").is_some());
		assert!(table.unregister("a").is_none());
		assert!(!table.contains("a"));
		assert_eq!(table.generation(), generation + 1);
	}

	#[rstest]
	#[case(NOT_FOUND_ROUTE)]
	#[case(ERROR_ROUTE)]
	fn test_unregister_reserved_is_noop(#[case] name: &str) {
		let mut table = RouteTable::new();

		assert!(table.unregister(name).is_none());
		assert!(table.contains(name));
		assert_eq!(table.generation(), 0);
	}

	#[rstest]
	fn test_overwrite_reserved_route() {
		let mut table = RouteTable::new();

		table
			.register(NOT_FOUND_ROUTE, RouteDefinition::new("/missing").title("Lost"))
			.unwrap();

		assert_eq!(table.not_found().path_template(), "/missing");
		assert_eq!(table.not_found().title_template(), "Lost");
	}

	#[rstest]
	fn test_with_reserved_paths() {
		let table = RouteTable::with_reserved_paths("/not-found", "/oops").unwrap();
		assert_eq!(table.not_found().path_template(), "/not-found");
		assert_eq!(table.error().path_template(), "/oops");

		assert!(RouteTable::with_reserved_paths("nope", "/oops").is_err());
	}
}
