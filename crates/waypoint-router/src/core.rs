//! The router: navigation state machine and public navigation surface.
//!
//! A [`Router`] owns the route table, the redirect rules, the route cache and
//! the navigation state. Navigation methods take `&self` and are async; the
//! locks guarding shared state are only ever held between awaits, never
//! across one.
//!
//! # Commit sequence
//!
//! Once a request is resolved it is committed in this order:
//!
//! 1. global before-navigation hooks, then the route's own `before_enter`
//! 2. the prerequisite check, for non-public routes flagged `requires_prerequisites`
//! 3. history push or replace
//! 4. `previous <- current`, `current <- resolved`
//! 5. page metadata update
//! 6. render
//! 7. after-navigation hooks and the route's `after_enter` (best-effort)
//! 8. navigation record and analytics
//! 9. `navigated` listeners
//!
//! Steps 1 and 2 are the only points where a navigation can be declined.
//! An unexpected error before step 4 sends the router to the reserved
//! `error` route, once.

use crate::cache::{CacheStatistics, RouteCache};
use crate::collaborators::{
	MetadataSink, NavigationRecorder, Noop, PageMetadata, PrerequisiteCheck, Renderer,
};
use crate::config::RouterConfig;
use crate::error::{
	AbortReason, BoxError, CommitStage, RouterError, RouterResult, UnhandledNavigationError,
};
use crate::history::{History, HistoryState, NoopHistory};
use crate::hooks::{
	AfterNavigationHook, BeforeNavigationHook, HandleAllocator, HookRegistry, NavigationContext,
	NavigationEvent, NavigationListener, SubscriptionHandle, SubscriptionKind,
};
use crate::options::{NavigateOptions, RedirectOptions};
use crate::query::split_path_and_query;
use crate::record::{NavigationLog, NavigationRecord};
use crate::redirect::{RedirectRule, RedirectRules};
use crate::resolver::{ResolvedRoute, Resolver};
use crate::route::RouteDefinition;
use crate::state::{NavigationOutcome, NavigationPhase};
use crate::table::RouteTable;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Route table and redirect rules, mutated together under one lock.
#[derive(Debug, Default)]
struct Routing {
	table: RouteTable,
	redirects: RedirectRules,
}

impl Routing {
	/// Combined mutation counter of the table and the redirect rules.
	fn generation(&self) -> u64 {
		self.table.generation() + self.redirects.generation()
	}
}

#[derive(Default)]
struct Hooks {
	before: HookRegistry<dyn BeforeNavigationHook>,
	after: HookRegistry<dyn AfterNavigationHook>,
	listeners: HookRegistry<dyn NavigationListener>,
}

#[derive(Debug, Default)]
struct MachineState {
	phase: NavigationPhase,
	in_flight: usize,
	current: Option<ResolvedRoute>,
	previous: Option<ResolvedRoute>,
	page_metadata: PageMetadata,
}

/// Marks a navigation as in flight until dropped.
struct InFlight<'a> {
	state: &'a Mutex<MachineState>,
}

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		let mut state = self.state.lock();
		state.in_flight = state.in_flight.saturating_sub(1);
		if state.in_flight == 0 {
			state.phase = NavigationPhase::Idle;
		}
	}
}

/// Builder for [`Router`].
#[derive(Default)]
pub struct RouterBuilder {
	config: RouterConfig,
	history: Option<Arc<dyn History>>,
	renderer: Option<Arc<dyn Renderer>>,
	prerequisites: Option<Arc<dyn PrerequisiteCheck>>,
	recorder: Option<Arc<dyn NavigationRecorder>>,
	metadata_sink: Option<Arc<dyn MetadataSink>>,
}

impl RouterBuilder {
	/// Sets the configuration.
	pub fn config(mut self, config: RouterConfig) -> Self {
		self.config = config;
		self
	}

	/// Sets the history collaborator.
	pub fn history(mut self, history: Arc<dyn History>) -> Self {
		self.history = Some(history);
		self
	}

	/// Sets the render collaborator.
	pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
		self.renderer = Some(renderer);
		self
	}

	/// Sets the prerequisite collaborator.
	pub fn prerequisites(mut self, prerequisites: Arc<dyn PrerequisiteCheck>) -> Self {
		self.prerequisites = Some(prerequisites);
		self
	}

	/// Sets the analytics collaborator.
	pub fn recorder(mut self, recorder: Arc<dyn NavigationRecorder>) -> Self {
		self.recorder = Some(recorder);
		self
	}

	/// Sets the page metadata collaborator.
	pub fn metadata_sink(mut self, sink: Arc<dyn MetadataSink>) -> Self {
		self.metadata_sink = Some(sink);
		self
	}

	/// Builds the router.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Pattern`] if a reserved route template in the
	/// configuration is malformed.
	pub fn build(self) -> RouterResult<Router> {
		let table = RouteTable::with_reserved_paths(&self.config.not_found_path, &self.config.error_path)?;
		Ok(Router::from_parts(self, table))
	}
}

/// Client-side navigation router.
///
/// # Example
///
/// ```ignore
/// let router = Router::new();
/// router.add_route("project", RouteDefinition::new("/projects/:id").title("Project {id}"))?;
///
/// assert!(router.navigate("/projects/42", NavigateOptions::new()).await);
/// assert_eq!(router.current_route().unwrap().param("id"), Some("42"));
/// ```
pub struct Router {
	config: RouterConfig,
	routing: RwLock<Routing>,
	cache: Mutex<RouteCache>,
	hooks: RwLock<Hooks>,
	handles: HandleAllocator,
	state: Mutex<MachineState>,
	records: Mutex<NavigationLog>,
	history: Arc<dyn History>,
	renderer: Arc<dyn Renderer>,
	prerequisites: Arc<dyn PrerequisiteCheck>,
	recorder: Arc<dyn NavigationRecorder>,
	metadata_sink: Arc<dyn MetadataSink>,
}

impl std::fmt::Debug for Router {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("Router")
			.field("config", &self.config)
			.field("routes", &self.route_names())
			.field("phase", &state.phase)
			.field("current", &state.current.as_ref().map(|r| r.full_path().to_string()))
			.finish()
	}
}

impl Default for Router {
	fn default() -> Self {
		Self::new()
	}
}

impl Router {
	/// Creates a router with default configuration and no-op collaborators.
	pub fn new() -> Self {
		Self::from_parts(RouterBuilder::default(), RouteTable::new())
	}

	/// Returns a builder.
	pub fn builder() -> RouterBuilder {
		RouterBuilder::default()
	}

	fn from_parts(builder: RouterBuilder, table: RouteTable) -> Self {
		let noop: Arc<Noop> = Arc::new(Noop);
		Self {
			cache: Mutex::new(RouteCache::with_capacity(builder.config.cache_capacity)),
			records: Mutex::new(NavigationLog::with_max(builder.config.max_history_records)),
			config: builder.config,
			routing: RwLock::new(Routing {
				table,
				redirects: RedirectRules::new(),
			}),
			hooks: RwLock::new(Hooks::default()),
			handles: HandleAllocator::default(),
			state: Mutex::new(MachineState::default()),
			history: builder
				.history
				.unwrap_or_else(|| Arc::new(NoopHistory) as Arc<dyn History>),
			renderer: builder.renderer.unwrap_or_else(|| noop.clone() as Arc<dyn Renderer>),
			prerequisites: builder
				.prerequisites
				.unwrap_or_else(|| noop.clone() as Arc<dyn PrerequisiteCheck>),
			recorder: builder
				.recorder
				.unwrap_or_else(|| noop.clone() as Arc<dyn NavigationRecorder>),
			metadata_sink: builder
				.metadata_sink
				.unwrap_or_else(|| noop as Arc<dyn MetadataSink>),
		}
	}

	/// Returns the configuration.
	pub fn config(&self) -> &RouterConfig {
		&self.config
	}

	// ========================================================================
	// Route table
	// ========================================================================

	/// Registers a route, overwriting any route with the same name.
	///
	/// # Errors
	///
	/// See [`RouteTable::register`].
	pub fn add_route(&self, name: impl Into<String>, definition: RouteDefinition) -> RouterResult<()> {
		self.routing.write().table.register(name, definition)?;
		Ok(())
	}

	/// Removes a route. Returns `false` for unknown and reserved names.
	pub fn remove_route(&self, name: &str) -> bool {
		self.routing.write().table.unregister(name).is_some()
	}

	/// Adds a redirect from `from_template` to `to_template`.
	///
	/// # Errors
	///
	/// See [`RedirectRule::new`].
	pub fn redirect(&self, from_template: &str, to_template: &str, options: RedirectOptions) -> RouterResult<()> {
		let rule = RedirectRule::new(from_template, to_template, options)?;
		self.routing.write().redirects.add(rule);
		Ok(())
	}

	/// Returns whether `path` is a route name or directly matches a route.
	///
	/// Redirects are not followed and the reserved routes count as routes.
	pub fn has_route(&self, path: &str) -> bool {
		let routing = self.routing.read();
		if routing.table.contains(path) {
			return true;
		}
		let (pathname, _) = split_path_and_query(path);
		routing.table.all().any(|d| d.pattern().is_match(pathname))
	}

	/// Returns the route names in resolution order.
	pub fn route_names(&self) -> Vec<String> {
		self.routing.read().table.names().map(str::to_string).collect()
	}

	/// Builds a path for a named route.
	///
	/// # Errors
	///
	/// - [`RouterError::InvalidRouteName`] if no route has this name
	/// - [`RouterError::MissingParameter`] naming the first absent parameter
	pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> RouterResult<String> {
		let routing = self.routing.read();
		let descriptor = routing
			.table
			.get(name)
			.ok_or_else(|| RouterError::InvalidRouteName(name.to_string()))?;

		let params_map: HashMap<String, String> = params
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();

		descriptor.pattern().reverse(&params_map).ok_or_else(|| {
			let missing = descriptor
				.pattern()
				.param_names()
				.iter()
				.find(|n| !params_map.contains_key(*n))
				.cloned()
				.unwrap_or_default();
			RouterError::MissingParameter(missing)
		})
	}

	/// Resolves `raw` without navigating.
	///
	/// Goes through the route cache when it is enabled.
	pub fn resolve(&self, raw: &str) -> ResolvedRoute {
		let routing = self.routing.read();
		let resolver = Resolver::new(&routing.table, &routing.redirects);
		if !self.config.cache_enabled {
			return resolver.resolve(raw);
		}
		self.cache
			.lock()
			.resolve_cached(raw, routing.generation(), |raw| resolver.resolve(raw))
	}

	// ========================================================================
	// Hooks
	// ========================================================================

	/// Registers a global before-navigation hook.
	pub fn before_each(&self, hook: Arc<dyn BeforeNavigationHook>) -> SubscriptionHandle {
		let handle = self.handles.allocate(SubscriptionKind::BeforeNavigation);
		self.hooks.write().before.insert(handle, hook);
		handle
	}

	/// Registers a global after-navigation hook.
	pub fn after_each(&self, hook: Arc<dyn AfterNavigationHook>) -> SubscriptionHandle {
		let handle = self.handles.allocate(SubscriptionKind::AfterNavigation);
		self.hooks.write().after.insert(handle, hook);
		handle
	}

	/// Registers a listener notified after every committed navigation.
	pub fn subscribe(&self, listener: Arc<dyn NavigationListener>) -> SubscriptionHandle {
		let handle = self.handles.allocate(SubscriptionKind::Navigated);
		self.hooks.write().listeners.insert(handle, listener);
		handle
	}

	/// Removes a registration. Returns `false` if it was already removed.
	pub fn cancel(&self, handle: SubscriptionHandle) -> bool {
		let mut hooks = self.hooks.write();
		match handle.kind() {
			SubscriptionKind::BeforeNavigation => hooks.before.remove(handle),
			SubscriptionKind::AfterNavigation => hooks.after.remove(handle),
			SubscriptionKind::Navigated => hooks.listeners.remove(handle),
		}
	}

	// ========================================================================
	// Navigation
	// ========================================================================

	/// Navigates to `path`. Returns whether the navigation was committed.
	pub async fn navigate(&self, path: &str, options: NavigateOptions) -> bool {
		self.dispatch(path, options).await.succeeded()
	}

	/// Navigates with options given as JSON, parsed per the configured
	/// [`OptionsMode`](crate::options::OptionsMode).
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidOptions`] if the options do not parse.
	pub async fn navigate_with(&self, path: &str, options: serde_json::Value) -> RouterResult<bool> {
		let options = NavigateOptions::from_json(options, self.config.options_mode)?;
		Ok(self.navigate(path, options).await)
	}

	/// Navigates to `path`, replacing the current history entry.
	pub async fn replace(&self, path: &str, options: NavigateOptions) -> bool {
		self.navigate(path, options.replace(true)).await
	}

	/// Moves `steps` entries back through history.
	///
	/// Returns `false` without touching history if `steps` does not fit an
	/// `isize`.
	pub async fn go_back(&self, steps: usize) -> bool {
		match isize::try_from(steps).ok().and_then(isize::checked_neg) {
			Some(delta) => self.traverse(delta).await,
			None => {
				tracing::warn!(steps, "history traversal rejected: step count out of range");
				false
			}
		}
	}

	/// Moves `steps` entries forward through history.
	///
	/// Returns `false` without touching history if `steps` does not fit an
	/// `isize`.
	pub async fn go_forward(&self, steps: usize) -> bool {
		match isize::try_from(steps) {
			Ok(delta) => self.traverse(delta).await,
			Err(_) => {
				tracing::warn!(steps, "history traversal rejected: step count out of range");
				false
			}
		}
	}

	/// Moves the history cursor by `delta` and navigates to where it lands.
	///
	/// The cursor is moved back when the landing navigation does not change
	/// the current route, so history always points at the current entry.
	async fn traverse(&self, delta: isize) -> bool {
		if self.is_navigating() {
			tracing::warn!(delta, "history traversal rejected: navigation in flight");
			return false;
		}
		let Some(path) = self.history.go(delta) else {
			tracing::debug!(delta, "history traversal did not land synchronously");
			return false;
		};

		let outcome = self
			.dispatch(&path, NavigateOptions::new().replace(true))
			.await;
		match outcome {
			NavigationOutcome::Committed(_) => true,
			NavigationOutcome::Failed { recovered: true, .. } => false,
			_ => {
				tracing::debug!(delta, path = %path, "history traversal declined, restoring cursor");
				if let Some(restore) = delta.checked_neg() {
					self.history.go(restore);
				}
				false
			}
		}
	}

	/// Handles a back/forward event that landed on `path`.
	pub async fn handle_history_event(&self, path: &str) -> bool {
		self.navigate(path, NavigateOptions::new().replace(true)).await
	}

	/// Navigates to `path` and reports how the navigation ended.
	pub async fn dispatch(&self, path: &str, options: NavigateOptions) -> NavigationOutcome {
		let Some(_in_flight) = self.begin(options.force) else {
			tracing::warn!(path, phase = %self.phase(), "navigation rejected: another navigation is in flight");
			return NavigationOutcome::Rejected;
		};
		let started = Instant::now();

		let route = self.resolve(path);
		match self.commit(path, route, &options, started).await {
			Ok(outcome) => outcome,
			Err(error) => self.recover(error, started).await,
		}
	}

	fn begin(&self, force: bool) -> Option<InFlight<'_>> {
		let mut state = self.state.lock();
		if state.in_flight > 0 && !force {
			return None;
		}
		state.in_flight += 1;
		state.phase = NavigationPhase::Resolving;
		Some(InFlight { state: &self.state })
	}

	async fn commit(
		&self,
		request: &str,
		route: ResolvedRoute,
		options: &NavigateOptions,
		started: Instant,
	) -> Result<NavigationOutcome, UnhandledNavigationError> {
		let current = {
			let mut state = self.state.lock();
			state.phase = NavigationPhase::Committing;
			state.current.clone()
		};
		let replace = options.replace || options.initial || current.is_none();
		let ctx = NavigationContext {
			to: route.clone(),
			from: current,
			replace,
			state: options.state.clone(),
		};

		if let Some(reason) = self.run_guards(request, &ctx).await? {
			tracing::warn!(path = request, route = route.name(), %reason, "navigation aborted");
			return Ok(NavigationOutcome::Aborted(reason));
		}

		let history_state = HistoryState::new(route.full_path())
			.with_route_name(route.name())
			.with_params(route.params().clone())
			.with_user_state(options.state.clone());
		let written = if replace {
			self.history.replace_state(route.full_path(), &history_state)
		} else {
			self.history.push_state(route.full_path(), &history_state)
		};
		written.map_err(|e| self.unhandled(request, CommitStage::History, Box::new(e)))?;

		let metadata = self.metadata_for(&route);
		let previous = {
			let mut state = self.state.lock();
			let previous = state.current.replace(route.clone());
			state.previous = previous.clone();
			state.page_metadata = metadata.clone();
			previous
		};
		self.metadata_sink.update_metadata(&metadata);
		self.renderer.render_route(&route).await;

		self.run_after_hooks(&ctx).await;

		let duration_ms = started.elapsed().as_millis() as u64;
		self.records.lock().push(NavigationRecord {
			route: route.snapshot(),
			timestamp: chrono::Utc::now(),
			duration_ms,
		});
		self.recorder.record_navigation(&route, duration_ms);

		let event = NavigationEvent {
			route: route.clone(),
			previous,
			replaced: replace,
			duration_ms,
		};
		let listeners = self.hooks.read().listeners.snapshot();
		for (_, listener) in listeners {
			listener.on_navigated(&event);
		}

		tracing::info!(
			path = route.full_path(),
			route = route.name(),
			replaced = replace,
			redirected = route.is_redirect_target(),
			duration_ms,
			"navigation committed"
		);
		Ok(NavigationOutcome::Committed(route.snapshot()))
	}

	/// Runs every cancellation point. Returns the reason when one declines.
	async fn run_guards(
		&self,
		request: &str,
		ctx: &NavigationContext,
	) -> Result<Option<AbortReason>, UnhandledNavigationError> {
		let before = self.hooks.read().before.snapshot();
		for (handle, hook) in before {
			tracing::debug!(path = request, hook = handle.id(), "running before-navigation hook");
			match hook.before_navigation(ctx).await {
				Ok(true) => {}
				Ok(false) => return Ok(Some(AbortReason::GuardRejected { hook: handle.id() })),
				Err(source) => return Err(self.unhandled(request, CommitStage::BeforeHook, source)),
			}
		}

		let descriptor = ctx.to.descriptor();
		if let Some(guard) = descriptor.before_enter() {
			match guard.before_navigation(ctx).await {
				Ok(true) => {}
				Ok(false) => {
					return Ok(Some(AbortReason::RouteGuardRejected {
						route: descriptor.name().to_string(),
					}));
				}
				Err(source) => return Err(self.unhandled(request, CommitStage::RouteGuard, source)),
			}
		}

		if descriptor.needs_prerequisite_check() {
			match self.prerequisites.check_prerequisites(descriptor).await {
				Ok(true) => {}
				Ok(false) => {
					return Ok(Some(AbortReason::PrerequisitesNotMet {
						route: descriptor.name().to_string(),
					}));
				}
				Err(source) => {
					return Err(self.unhandled(request, CommitStage::Prerequisites, source));
				}
			}
		}

		Ok(None)
	}

	async fn run_after_hooks(&self, ctx: &NavigationContext) {
		let after = self.hooks.read().after.snapshot();
		for (handle, hook) in after {
			if let Err(e) = hook.after_navigation(ctx).await {
				tracing::warn!(
					route = ctx.to.name(),
					hook = handle.id(),
					error = %e,
					"after-navigation hook failed"
				);
			}
		}
		if let Some(hook) = ctx.to.descriptor().after_enter() {
			if let Err(e) = hook.after_navigation(ctx).await {
				tracing::warn!(route = ctx.to.name(), error = %e, "after_enter callback failed");
			}
		}
	}

	fn unhandled(&self, request: &str, stage: CommitStage, source: BoxError) -> UnhandledNavigationError {
		UnhandledNavigationError {
			path: request.to_string(),
			current: self
				.state
				.lock()
				.current
				.as_ref()
				.map(|r| r.name().to_string()),
			stage,
			source,
		}
	}

	/// Makes the single attempt to reach the error route after `error`.
	async fn recover(&self, error: UnhandledNavigationError, started: Instant) -> NavigationOutcome {
		tracing::error!(
			path = %error.path,
			current = ?error.current,
			stage = %error.stage,
			error = %error.source,
			"unhandled navigation error"
		);

		let error_route = {
			let routing = self.routing.read();
			let route = Resolver::new(&routing.table, &routing.redirects)
				.error_route(&error.path, &error.source.to_string());
			route
		};
		let request = error_route.full_path().to_string();
		let options = NavigateOptions::new().replace(true).force(true);

		let recovered = match self.commit(&request, error_route, &options, started).await {
			Ok(NavigationOutcome::Committed(_)) => true,
			Ok(outcome) => {
				tracing::error!(path = %error.path, ?outcome, "error route was declined");
				false
			}
			Err(second) => {
				tracing::error!(
					path = %error.path,
					stage = %second.stage,
					error = %second.source,
					"navigation to the error route failed"
				);
				false
			}
		};

		NavigationOutcome::Failed {
			error: error.to_string(),
			recovered,
		}
	}

	fn metadata_for(&self, route: &ResolvedRoute) -> PageMetadata {
		let mut title = route.title();
		if let Some(suffix) = &self.config.title_suffix {
			title.push_str(suffix);
		}
		PageMetadata {
			title,
			description: route.description(),
		}
	}

	// ========================================================================
	// Inspection
	// ========================================================================

	/// Returns a copy of the current route.
	pub fn current_route(&self) -> Option<ResolvedRoute> {
		self.state.lock().current.clone()
	}

	/// Returns a copy of the previous route.
	pub fn previous_route(&self) -> Option<ResolvedRoute> {
		self.state.lock().previous.clone()
	}

	/// Returns the navigation phase.
	pub fn phase(&self) -> NavigationPhase {
		self.state.lock().phase
	}

	/// Returns whether a navigation is in flight.
	pub fn is_navigating(&self) -> bool {
		self.state.lock().in_flight > 0
	}

	/// Returns the metadata of the current route.
	pub fn page_metadata(&self) -> PageMetadata {
		self.state.lock().page_metadata.clone()
	}

	/// Returns the navigation log, oldest first.
	pub fn navigation_records(&self) -> Vec<NavigationRecord> {
		self.records.lock().records()
	}

	/// Returns route cache counters.
	pub fn cache_statistics(&self) -> CacheStatistics {
		self.cache.lock().statistics()
	}
}
