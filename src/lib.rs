//! # Waypoint
//!
//! Client-side navigation for Rust applications.
//!
//! Waypoint maps path strings to declared routes, extracts typed parameters
//! and query data, applies redirects and runs every navigation through a
//! small guarded state machine that keeps history, page metadata and the
//! current route consistent.
//!
//! ## Feature Flags
//!
//! - `router` (default) - route table, resolver, cache and the [`Router`](router::Router)
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use waypoint::prelude::*;
//!
//! let router = Router::new();
//! router.add_route("project", RouteDefinition::new("/projects/:id").title("Project {id}"))?;
//! router.before_each(guard_fn(|ctx| ctx.to.name() != "admin"));
//!
//! if router.navigate("/projects/42", NavigateOptions::new()).await {
//!     let Path(id) = router.current_route().unwrap().extract::<Path<u64>>()?;
//!     assert_eq!(id, 42);
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "router")]
#[cfg_attr(docsrs, doc(cfg(feature = "router")))]
pub use waypoint_router as router;

/// Commonly used types.
#[cfg(feature = "router")]
#[cfg_attr(docsrs, doc(cfg(feature = "router")))]
pub mod prelude {
	pub use waypoint_router::prelude::*;
	pub use waypoint_router::{
		MemoryHistory, NavigationPhase, RouteSnapshot, RouterBuilder, SubscriptionHandle,
	};
}
