//! Client-side navigation router.
//!
//! Maps path strings such as `/projects/42/workspace?mode=edit` to registered
//! routes, extracts their parameters and drives a guarded navigation state
//! machine that keeps history, page metadata and the current route in step.
//!
//! ## Layout
//!
//! - [`pattern`]: compiles `:name` path templates
//! - [`table`]: insertion-ordered route table with reserved `notFound` and `error` routes
//! - [`resolver`]: name, pattern, redirect and not-found resolution
//! - [`cache`]: memoised resolution, invalidated on any table change
//! - [`core`]: the [`Router`] itself
//!
//! ## Example
//!
//! ```ignore
//! use waypoint_router::prelude::*;
//!
//! let router = Router::new();
//! router.add_route("workspace", RouteDefinition::new("/projects/:id/workspace"))?;
//! router.redirect("/p/:id", "/projects/:id/workspace", RedirectOptions::new())?;
//!
//! assert!(router.navigate("/p/42", NavigateOptions::new()).await);
//! let route = router.current_route().unwrap();
//! assert_eq!(route.param_as::<u64>("id")?, 42);
//! assert!(route.is_redirect_target());
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod collaborators;
pub mod config;
pub mod core;
pub mod error;
pub mod history;
pub mod hooks;
pub mod options;
pub mod params;
pub mod pattern;
pub mod query;
pub mod record;
pub mod redirect;
pub mod resolver;
pub mod route;
pub mod state;
pub mod table;

pub use cache::{CacheStatistics, RouteCache};
pub use collaborators::{
	MetadataSink, NavigationRecorder, Noop, PageMetadata, PrerequisiteCheck, Renderer,
};
pub use config::RouterConfig;
pub use self::core::{Router, RouterBuilder};
pub use error::{
	AbortReason, BoxError, CommitStage, HistoryError, PathError, PatternErrorKind, RoutePatternError,
	RouterError, RouterResult, UnhandledNavigationError,
};
pub use history::{History, HistoryState, MemoryHistory, NavigationType, NoopHistory};
pub use hooks::{
	AfterNavigationHook, BeforeNavigationHook, NavigationContext, NavigationEvent,
	NavigationListener, SubscriptionHandle, SubscriptionKind, after_fn, guard_fn, listener_fn,
};
pub use options::{NavigateOptions, OptionsMode, RedirectCondition, RedirectOptions};
pub use params::{FromPath, ParamContext, Path, SingleFromPath};
pub use pattern::RoutePattern;
pub use record::{NavigationLog, NavigationRecord};
pub use redirect::{RedirectRule, RedirectRules};
pub use resolver::{ResolvedRoute, Resolver, RouteSnapshot};
pub use route::{ERROR_ROUTE, NOT_FOUND_ROUTE, RouteDefinition, RouteDescriptor, RouteMetadata};
pub use state::{NavigationOutcome, NavigationPhase};
pub use table::RouteTable;

/// Commonly used types.
pub mod prelude {
	pub use crate::{
		FromPath, NavigateOptions, NavigationOutcome, Path, RedirectOptions, ResolvedRoute,
		RouteDefinition, Router, RouterConfig, RouterError, RouterResult, after_fn, guard_fn,
		listener_fn,
	};
}
