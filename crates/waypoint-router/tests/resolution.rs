//! Resolution behaviour observed through the public router surface.

use rstest::{fixture, rstest};
use waypoint_router::{
	NOT_FOUND_ROUTE, Path, RedirectOptions, RouteDefinition, RoutePattern, Router, RouterConfig,
	RouterError,
};

#[fixture]
fn router() -> Router {
	let router = Router::new();
	router
		.add_route("workspace", RouteDefinition::new("/projects/:id/workspace"))
		.unwrap();
	router.add_route("item", RouteDefinition::new("/items/:id")).unwrap();
	router
		.add_route("featured", RouteDefinition::new("/items/featured"))
		.unwrap();
	router.add_route("new", RouteDefinition::new("/new/:x")).unwrap();
	router
}

#[rstest]
#[case("/projects/:id/workspace")]
#[case("/a/:x/b/:y")]
#[case("/static/path.html")]
fn test_compilation_is_idempotent(#[case] template: &str) {
	let first = RoutePattern::compile(template).unwrap();
	let second = RoutePattern::compile(template).unwrap();

	assert_eq!(first, second);
	assert_eq!(first.param_names(), second.param_names());
}

#[rstest]
fn test_params_and_query_round_trip(router: Router) {
	let route = router.resolve("/projects/42/workspace?mode=edit");

	assert_eq!(route.name(), "workspace");
	assert_eq!(route.params().len(), 1);
	assert_eq!(route.param("id"), Some("42"));
	assert_eq!(route.query().len(), 1);
	assert_eq!(route.query().get("mode").map(String::as_str), Some("edit"));
	assert_eq!(route.extract::<Path<u64>>().unwrap().into_inner(), 42);
}

#[rstest]
#[case("/does/not/exist")]
#[case("/projects/42")]
#[case("//")]
#[case("?only=query")]
#[case("%%%")]
fn test_any_input_resolves(router: Router, #[case] input: &str) {
	let route = router.resolve(input);

	assert_eq!(route.name(), NOT_FOUND_ROUTE);
	assert_eq!(route.param("originalPath"), Some(input));
}

#[rstest]
fn test_registration_order_beats_specificity(router: Router) {
	let route = router.resolve("/items/featured");

	assert_eq!(route.name(), "item");
	assert_eq!(route.param("id"), Some("featured"));
}

#[rstest]
fn test_redirect_is_single_hop(router: Router) {
	// Arrange
	router
		.redirect("/old/:x", "/new/:x", RedirectOptions::new())
		.unwrap();
	router
		.redirect("/older/:x", "/old/:x", RedirectOptions::new())
		.unwrap();

	// Act
	let direct = router.resolve("/old/7");
	let chained = router.resolve("/older/7");

	// Assert
	assert_eq!(direct.name(), "new");
	assert_eq!(direct.param("x"), Some("7"));
	assert!(direct.is_redirect_target());
	assert_eq!(chained.name(), NOT_FOUND_ROUTE);
}

#[rstest]
fn test_redirect_with_unknown_parameter_is_rejected(router: Router) {
	let err = router
		.redirect("/old/:x", "/new/:y", RedirectOptions::new())
		.unwrap_err();

	assert!(matches!(err, RouterError::InvalidRedirect { .. }));
}

#[rstest]
fn test_cache_follows_table_changes(router: Router) {
	// Arrange
	assert_eq!(router.resolve("/reports").name(), NOT_FOUND_ROUTE);
	assert_eq!(router.resolve("/reports").name(), NOT_FOUND_ROUTE);

	// Act
	router
		.add_route("reports", RouteDefinition::new("/reports"))
		.unwrap();
	let added = router.resolve("/reports");
	router.remove_route("reports");
	let removed = router.resolve("/reports");

	// Assert
	assert_eq!(added.name(), "reports");
	assert_eq!(removed.name(), NOT_FOUND_ROUTE);
	let stats = router.cache_statistics();
	assert_eq!(stats.hits, 1);
	assert_eq!(stats.invalidations, 2);
}

#[rstest]
fn test_redirect_invalidates_cache(router: Router) {
	assert_eq!(router.resolve("/legacy/3").name(), NOT_FOUND_ROUTE);

	router
		.redirect("/legacy/:id", "/items/:id", RedirectOptions::new())
		.unwrap();

	assert_eq!(router.resolve("/legacy/3").name(), "item");
}

#[rstest]
fn test_disabled_cache_records_nothing() {
	let router = Router::builder()
		.config(RouterConfig::new().with_cache_enabled(false))
		.build()
		.unwrap();

	router.resolve("/a");
	router.resolve("/a");

	assert_eq!(router.cache_statistics().misses, 0);
	assert_eq!(router.cache_statistics().hits, 0);
}

#[rstest]
fn test_duplicate_paths_are_rejected(router: Router) {
	let err = router
		.add_route("other", RouteDefinition::new("/items/:slug"))
		.unwrap_err();

	assert!(matches!(err, RouterError::DuplicatePath { .. }));
}

#[rstest]
fn test_malformed_template_is_rejected(router: Router) {
	let err = router
		.add_route("broken", RouteDefinition::new("/items/:1bad"))
		.unwrap_err();

	assert!(err.to_string().contains("/items/:1bad"));
	assert!(!router.has_route("broken"));
}
