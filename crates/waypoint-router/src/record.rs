//! Navigation history log.

use crate::resolver::RouteSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of records kept.
pub const DEFAULT_MAX_RECORDS: usize = 100;

/// One committed navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRecord {
	/// Deep copy of the committed route.
	pub route: RouteSnapshot,
	/// When the navigation was committed.
	pub timestamp: DateTime<Utc>,
	/// Time from accepting the request to committing it.
	pub duration_ms: u64,
}

/// Append-only log bounded to a maximum length, oldest evicted first.
#[derive(Debug, Clone)]
pub struct NavigationLog {
	records: VecDeque<NavigationRecord>,
	max: usize,
}

impl Default for NavigationLog {
	fn default() -> Self {
		Self::with_max(DEFAULT_MAX_RECORDS)
	}
}

impl NavigationLog {
	/// Creates a log keeping at most `max` records.
	pub fn with_max(max: usize) -> Self {
		Self {
			records: VecDeque::with_capacity(max.min(DEFAULT_MAX_RECORDS)),
			max,
		}
	}

	/// Appends a record, evicting the oldest when full.
	pub fn push(&mut self, record: NavigationRecord) {
		if self.max == 0 {
			return;
		}
		while self.records.len() >= self.max {
			self.records.pop_front();
		}
		self.records.push_back(record);
	}

	/// Returns the records, oldest first.
	pub fn records(&self) -> Vec<NavigationRecord> {
		self.records.iter().cloned().collect()
	}

	/// Returns the most recent record.
	pub fn last(&self) -> Option<&NavigationRecord> {
		self.records.back()
	}

	/// Returns the number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns whether the log is empty.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}
