//! History collaborator.
//!
//! The router writes to history through the [`History`] trait. Inbound
//! back/forward events travel the other way, through
//! `Router::handle_history_event`, and are treated as navigations with an
//! implicit replace.

use crate::error::HistoryError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Navigation type for history management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationType {
	/// A new entry was pushed.
	Push,
	/// The current entry was replaced.
	Replace,
	/// The user moved through existing entries.
	Pop,
}

/// State stored with each history entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
	/// The full path of the entry.
	pub path: String,
	/// Name of the matched route.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub route_name: Option<String>,
	/// Path parameters of the matched route.
	#[serde(default, skip_serializing_if = "HashMap::is_empty")]
	pub params: HashMap<String, String>,
	/// Caller-supplied state.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_state: Option<serde_json::Value>,
}

impl HistoryState {
	/// Creates a new history state.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			..Self::default()
		}
	}

	/// Sets the route name.
	pub fn with_route_name(mut self, name: impl Into<String>) -> Self {
		self.route_name = Some(name.into());
		self
	}

	/// Sets the parameters.
	pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
		self.params = params;
		self
	}

	/// Sets caller-supplied state.
	pub fn with_user_state(mut self, state: Option<serde_json::Value>) -> Self {
		self.user_state = state;
		self
	}
}

/// Outbound side of browser-style history.
pub trait History: Send + Sync {
	/// Pushes a new entry.
	fn push_state(&self, url: &str, state: &HistoryState) -> Result<(), HistoryError>;

	/// Replaces the current entry.
	fn replace_state(&self, url: &str, state: &HistoryState) -> Result<(), HistoryError>;

	/// Moves `delta` entries through the stack (negative is back).
	///
	/// Returns the path landed on when it is known synchronously. A backend
	/// that learns the result later returns `None` and reports it through
	/// `Router::handle_history_event`.
	fn go(&self, delta: isize) -> Option<String>;
}

/// History that records nothing and never moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHistory;

impl History for NoopHistory {
	fn push_state(&self, _url: &str, _state: &HistoryState) -> Result<(), HistoryError> {
		Ok(())
	}

	fn replace_state(&self, _url: &str, _state: &HistoryState) -> Result<(), HistoryError> {
		Ok(())
	}

	fn go(&self, _delta: isize) -> Option<String> {
		None
	}
}

#[derive(Debug, Default)]
struct Stack {
	entries: Vec<HistoryState>,
	index: usize,
}

/// In-process history stack with back/forward support.
///
/// Pushing truncates any forward entries, as a browser does.
#[derive(Debug, Default)]
pub struct MemoryHistory {
	stack: Mutex<Stack>,
}

impl MemoryHistory {
	/// Creates an empty history.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.stack.lock().entries.len()
	}

	/// Returns whether there are no entries.
	pub fn is_empty(&self) -> bool {
		self.stack.lock().entries.is_empty()
	}

	/// Returns the current entry.
	pub fn current(&self) -> Option<HistoryState> {
		let stack = self.stack.lock();
		stack.entries.get(stack.index).cloned()
	}

	/// Returns the position of the current entry.
	pub fn index(&self) -> usize {
		self.stack.lock().index
	}

	/// Returns the paths of every entry, oldest first.
	pub fn paths(&self) -> Vec<String> {
		self.stack
			.lock()
			.entries
			.iter()
			.map(|e| e.path.clone())
			.collect()
	}
}

impl History for MemoryHistory {
	fn push_state(&self, url: &str, state: &HistoryState) -> Result<(), HistoryError> {
		let mut stack = self.stack.lock();
		if !stack.entries.is_empty() {
			let keep = stack.index + 1;
			stack.entries.truncate(keep);
		}
		stack.entries.push(HistoryState {
			path: url.to_string(),
			..state.clone()
		});
		stack.index = stack.entries.len() - 1;
		Ok(())
	}

	fn replace_state(&self, url: &str, state: &HistoryState) -> Result<(), HistoryError> {
		let mut stack = self.stack.lock();
		let entry = HistoryState {
			path: url.to_string(),
			..state.clone()
		};
		let index = stack.index;
		match stack.entries.get_mut(index) {
			Some(current) => *current = entry,
			None => stack.entries.push(entry),
		}
		Ok(())
	}

	fn go(&self, delta: isize) -> Option<String> {
		let mut stack = self.stack.lock();
		if delta == 0 || stack.entries.is_empty() {
			return None;
		}
		let target = stack.index.checked_add_signed(delta)?;
		let path = stack.entries.get(target)?.path.clone();
		stack.index = target;
		Some(path)
	}
}
