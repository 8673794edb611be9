//! Boundary traits for the collaborators a router calls into.
//!
//! Each has a no-op implementation so a router can be built with only the
//! pieces an application actually uses.

use crate::error::BoxError;
use crate::resolver::ResolvedRoute;
use crate::route::RouteDescriptor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Interpolated page title and description of the current route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
	/// Page title.
	pub title: String,
	/// Page description.
	pub description: String,
}

/// Mounts the page for a committed route.
#[async_trait]
pub trait Renderer: Send + Sync {
	/// Called once per committed navigation. The result is not inspected.
	async fn render_route(&self, route: &ResolvedRoute);
}

/// Decides whether a gated route may be entered.
#[async_trait]
pub trait PrerequisiteCheck: Send + Sync {
	/// Returns `Ok(false)` to decline the navigation.
	async fn check_prerequisites(&self, descriptor: &RouteDescriptor) -> Result<bool, BoxError>;
}

/// Fire-and-forget analytics sink.
pub trait NavigationRecorder: Send + Sync {
	/// Records a committed navigation.
	fn record_navigation(&self, route: &ResolvedRoute, duration_ms: u64);
}

/// Receives page metadata updates.
pub trait MetadataSink: Send + Sync {
	/// Applies the metadata of the route that was just committed.
	fn update_metadata(&self, metadata: &PageMetadata);
}

/// Collaborator that does nothing and allows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

#[async_trait]
impl Renderer for Noop {
	async fn render_route(&self, _route: &ResolvedRoute) {}
}

#[async_trait]
impl PrerequisiteCheck for Noop {
	async fn check_prerequisites(&self, _descriptor: &RouteDescriptor) -> Result<bool, BoxError> {
		Ok(true)
	}
}

impl NavigationRecorder for Noop {
	fn record_navigation(&self, _route: &ResolvedRoute, _duration_ms: u64) {}
}

impl MetadataSink for Noop {
	fn update_metadata(&self, _metadata: &PageMetadata) {}
}
