//! Navigation hooks and subscriptions.
//!
//! Hooks are registered with a [`Router`](crate::core::Router) and receive a
//! [`NavigationContext`] describing the navigation in progress:
//!
//! - [`BeforeNavigationHook`] may veto a navigation by returning `Ok(false)`.
//!   Returning `Err` is an unexpected failure and routes the navigation to
//!   the reserved `error` route.
//! - [`AfterNavigationHook`] runs once the navigation is committed. Its
//!   failures are logged and never roll anything back.
//! - [`NavigationListener`] receives a [`NavigationEvent`] after every
//!   committed navigation.
//!
//! Every registration returns a [`SubscriptionHandle`]; passing it to
//! `Router::cancel` removes the registration.

use crate::error::BoxError;
use crate::resolver::ResolvedRoute;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// What a hook sees of the navigation in progress.
#[derive(Debug, Clone)]
pub struct NavigationContext {
	/// Where the navigation is going.
	pub to: ResolvedRoute,
	/// The route that is current when the hook runs.
	pub from: Option<ResolvedRoute>,
	/// Whether the history entry will be replaced rather than pushed.
	pub replace: bool,
	/// Caller-supplied history state.
	pub state: Option<serde_json::Value>,
}

/// A hook with veto power over a navigation.
#[async_trait]
pub trait BeforeNavigationHook: Send + Sync {
	/// Returns `Ok(true)` to let the navigation proceed.
	async fn before_navigation(&self, ctx: &NavigationContext) -> Result<bool, BoxError>;
}

/// A best-effort hook that runs after a navigation is committed.
#[async_trait]
pub trait AfterNavigationHook: Send + Sync {
	/// Observes the committed navigation.
	async fn after_navigation(&self, ctx: &NavigationContext) -> Result<(), BoxError>;
}

/// Notification emitted after every committed navigation.
#[derive(Debug, Clone)]
pub struct NavigationEvent {
	/// The route that became current.
	pub route: ResolvedRoute,
	/// The route that was current before.
	pub previous: Option<ResolvedRoute>,
	/// Whether the history entry was replaced.
	pub replaced: bool,
	/// Time spent between accepting the request and committing it.
	pub duration_ms: u64,
}

/// Synchronous observer of committed navigations.
pub trait NavigationListener: Send + Sync {
	/// Called once per committed navigation.
	fn on_navigated(&self, event: &NavigationEvent);
}

/// Before-hook wrapping a synchronous closure.
pub(crate) struct FnGuard<F> {
	guard: F,
}

#[async_trait]
impl<F> BeforeNavigationHook for FnGuard<F>
where
	F: Fn(&NavigationContext) -> bool + Send + Sync,
{
	async fn before_navigation(&self, ctx: &NavigationContext) -> Result<bool, BoxError> {
		Ok((self.guard)(ctx))
	}
}

/// After-hook wrapping a synchronous closure.
pub(crate) struct FnAfterHook<F> {
	hook: F,
}

#[async_trait]
impl<F> AfterNavigationHook for FnAfterHook<F>
where
	F: Fn(&NavigationContext) + Send + Sync,
{
	async fn after_navigation(&self, ctx: &NavigationContext) -> Result<(), BoxError> {
		(self.hook)(ctx);
		Ok(())
	}
}

/// Listener wrapping a closure.
pub(crate) struct FnListener<F> {
	listener: F,
}

impl<F> NavigationListener for FnListener<F>
where
	F: Fn(&NavigationEvent) + Send + Sync,
{
	fn on_navigated(&self, event: &NavigationEvent) {
		(self.listener)(event)
	}
}

/// Helper function to create a before-hook from a predicate.
pub fn guard_fn<F>(guard: F) -> Arc<dyn BeforeNavigationHook>
where
	F: Fn(&NavigationContext) -> bool + Send + Sync + 'static,
{
	Arc::new(FnGuard { guard })
}

/// Helper function to create an after-hook from a closure.
pub fn after_fn<F>(hook: F) -> Arc<dyn AfterNavigationHook>
where
	F: Fn(&NavigationContext) + Send + Sync + 'static,
{
	Arc::new(FnAfterHook { hook })
}

/// Helper function to create a listener from a closure.
pub fn listener_fn<F>(listener: F) -> Arc<dyn NavigationListener>
where
	F: Fn(&NavigationEvent) + Send + Sync + 'static,
{
	Arc::new(FnListener { listener })
}

/// Which registry a subscription belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
	/// A before-navigation hook.
	BeforeNavigation,
	/// An after-navigation hook.
	AfterNavigation,
	/// A navigated listener.
	Navigated,
}

/// Opaque handle returned by every registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
	id: u64,
	kind: SubscriptionKind,
}

impl SubscriptionHandle {
	/// Returns the numeric id, unique per router.
	pub fn id(&self) -> u64 {
		self.id
	}

	/// Returns the registry this handle belongs to.
	pub fn kind(&self) -> SubscriptionKind {
		self.kind
	}
}

/// Issues handle ids that are unique across all registries of one router.
#[derive(Debug, Default)]
pub(crate) struct HandleAllocator {
	next: AtomicU64,
}

impl HandleAllocator {
	pub(crate) fn allocate(&self, kind: SubscriptionKind) -> SubscriptionHandle {
		SubscriptionHandle {
			id: self.next.fetch_add(1, Ordering::Relaxed) + 1,
			kind,
		}
	}
}

/// Registration-ordered collection of subscribers.
pub(crate) struct HookRegistry<T: ?Sized> {
	entries: Vec<(SubscriptionHandle, Arc<T>)>,
}

impl<T: ?Sized> Default for HookRegistry<T> {
	fn default() -> Self {
		Self {
			entries: Vec::new(),
		}
	}
}

impl<T: ?Sized> HookRegistry<T> {
	pub(crate) fn insert(&mut self, handle: SubscriptionHandle, entry: Arc<T>) {
		self.entries.push((handle, entry));
	}

	/// Removes a subscriber. Returns `false` if the handle is unknown.
	pub(crate) fn remove(&mut self, handle: SubscriptionHandle) -> bool {
		let before = self.entries.len();
		self.entries.retain(|(h, _)| *h != handle);
		self.entries.len() != before
	}

	/// Returns a copy of the current subscribers, in registration order.
	pub(crate) fn snapshot(&self) -> Vec<(SubscriptionHandle, Arc<T>)> {
		self.entries.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_handles_are_unique_across_kinds() {
		let allocator = HandleAllocator::default();
		let a = allocator.allocate(SubscriptionKind::BeforeNavigation);
		let b = allocator.allocate(SubscriptionKind::Navigated);

		assert_ne!(a.id(), b.id());
		assert_eq!(a.kind(), SubscriptionKind::BeforeNavigation);
		assert_eq!(b.kind(), SubscriptionKind::Navigated);
	}

	#[rstest]
	fn test_registry_preserves_order_and_removes() {
		// Arrange
		let allocator = HandleAllocator::default();
		let mut registry: HookRegistry<dyn NavigationListener> = HookRegistry::default();
		let first = allocator.allocate(SubscriptionKind::Navigated);
		let second = allocator.allocate(SubscriptionKind::Navigated);
		registry.insert(first, listener_fn(|_| {}));
		registry.insert(second, listener_fn(|_| {}));

		// Act
		let removed = registry.remove(first);
		let removed_again = registry.remove(first);

		// Assert
		assert!(removed);
		assert!(!removed_again);
		assert_eq!(registry.snapshot().len(), 1);
		assert_eq!(registry.snapshot()[0].0, second);
	}
}
