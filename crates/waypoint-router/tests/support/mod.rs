//! Recording test doubles for router collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use waypoint_router::{
	BoxError, History, HistoryError, HistoryState, MemoryHistory, MetadataSink, NavigationRecorder,
	NavigationType, PageMetadata, PrerequisiteCheck, Renderer, ResolvedRoute, RouteDescriptor,
	Router, RouterConfig,
};

#[derive(Default)]
pub struct RecordingRenderer {
	pub rendered: Mutex<Vec<String>>,
}

#[async_trait]
impl Renderer for RecordingRenderer {
	async fn render_route(&self, route: &ResolvedRoute) {
		self.rendered.lock().push(route.full_path().to_string());
	}
}

/// In-memory history that also logs every write.
#[derive(Default)]
pub struct RecordingHistory {
	pub inner: MemoryHistory,
	pub writes: Mutex<Vec<(NavigationType, String)>>,
}

impl History for RecordingHistory {
	fn push_state(&self, url: &str, state: &HistoryState) -> Result<(), HistoryError> {
		self.writes.lock().push((NavigationType::Push, url.to_string()));
		self.inner.push_state(url, state)
	}

	fn replace_state(&self, url: &str, state: &HistoryState) -> Result<(), HistoryError> {
		self.writes.lock().push((NavigationType::Replace, url.to_string()));
		self.inner.replace_state(url, state)
	}

	fn go(&self, delta: isize) -> Option<String> {
		self.inner.go(delta)
	}
}

#[derive(Default)]
pub struct RecordingRecorder {
	pub recorded: Mutex<Vec<(String, u64)>>,
}

impl NavigationRecorder for RecordingRecorder {
	fn record_navigation(&self, route: &ResolvedRoute, duration_ms: u64) {
		self.recorded.lock().push((route.name().to_string(), duration_ms));
	}
}

#[derive(Default)]
pub struct RecordingMetadata {
	pub updates: Mutex<Vec<PageMetadata>>,
}

impl MetadataSink for RecordingMetadata {
	fn update_metadata(&self, metadata: &PageMetadata) {
		self.updates.lock().push(metadata.clone());
	}
}

/// Prerequisite check with a fixed answer that counts how often it is asked.
pub struct FixedPrerequisites {
	pub allow: bool,
	pub calls: AtomicUsize,
}

impl FixedPrerequisites {
	pub fn new(allow: bool) -> Self {
		Self {
			allow,
			calls: AtomicUsize::new(0),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl PrerequisiteCheck for FixedPrerequisites {
	async fn check_prerequisites(&self, _descriptor: &RouteDescriptor) -> Result<bool, BoxError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(self.allow)
	}
}

/// A router wired to recording doubles.
pub struct Harness {
	pub router: Arc<Router>,
	pub renderer: Arc<RecordingRenderer>,
	pub history: Arc<RecordingHistory>,
	pub recorder: Arc<RecordingRecorder>,
	pub metadata: Arc<RecordingMetadata>,
	pub prerequisites: Arc<FixedPrerequisites>,
}

impl Harness {
	pub fn new() -> Self {
		Self::with(RouterConfig::new(), true)
	}

	pub fn with(config: RouterConfig, prerequisites_met: bool) -> Self {
		let renderer = Arc::new(RecordingRenderer::default());
		let history = Arc::new(RecordingHistory::default());
		let recorder = Arc::new(RecordingRecorder::default());
		let metadata = Arc::new(RecordingMetadata::default());
		let prerequisites = Arc::new(FixedPrerequisites::new(prerequisites_met));

		let router = Router::builder()
			.config(config)
			.renderer(renderer.clone())
			.history(history.clone())
			.recorder(recorder.clone())
			.metadata_sink(metadata.clone())
			.prerequisites(prerequisites.clone())
			.build()
			.unwrap();

		Self {
			router: Arc::new(router),
			renderer,
			history,
			recorder,
			metadata,
			prerequisites,
		}
	}

	pub fn rendered(&self) -> Vec<String> {
		self.renderer.rendered.lock().clone()
	}

	pub fn history_writes(&self) -> Vec<(NavigationType, String)> {
		self.history.writes.lock().clone()
	}

	pub fn recorded(&self) -> usize {
		self.recorder.recorded.lock().len()
	}
}

/// Creates a boxed error for hooks that fail.
pub fn boom(message: &str) -> BoxError {
	message.to_string().into()
}
