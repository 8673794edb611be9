//! Memoised resolution.
//!
//! The cache is keyed by the exact raw input and tagged with the generation
//! of the route table and redirect rules it was filled from. Any mismatch
//! drops every entry before the lookup, so a route added after a path was
//! cached as not-found is seen on the very next resolution.

use crate::resolver::ResolvedRoute;
use indexmap::IndexMap;

/// Default maximum number of memoised inputs.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatistics {
	/// Number of cache hits
	pub hits: u64,
	/// Number of cache misses
	pub misses: u64,
	/// Current number of entries in cache
	pub entries: u64,
	/// Number of times the cache was dropped wholesale
	pub invalidations: u64,
	/// Number of entries evicted to stay within capacity
	pub evictions: u64,
}

impl CacheStatistics {
	/// Calculate hit rate (0.0 to 1.0)
	pub fn hit_rate(&self) -> f64 {
		let total = self.hits + self.misses;
		if total == 0 {
			0.0
		} else {
			self.hits as f64 / total as f64
		}
	}
}

/// FIFO-bounded memo of resolution results.
#[derive(Debug, Clone)]
pub struct RouteCache {
	entries: IndexMap<String, ResolvedRoute>,
	/// Maximum entries; `0` means unbounded.
	capacity: usize,
	generation: u64,
	stats: CacheStatistics,
}

impl Default for RouteCache {
	fn default() -> Self {
		Self::with_capacity(DEFAULT_CACHE_CAPACITY)
	}
}

impl RouteCache {
	/// Creates a cache with the default capacity.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a cache holding at most `capacity` entries (`0` for no limit).
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			entries: IndexMap::new(),
			capacity,
			generation: 0,
			stats: CacheStatistics::default(),
		}
	}

	/// Returns the memoised route for `raw`, or resolves and stores it.
	///
	/// `generation` identifies the table state `resolve` reads from. Results
	/// for routes flagged as not cacheable are returned but never stored.
	pub fn resolve_cached<F>(&mut self, raw: &str, generation: u64, resolve: F) -> ResolvedRoute
	where
		F: FnOnce(&str) -> ResolvedRoute,
	{
		if generation != self.generation {
			self.invalidate();
			self.generation = generation;
		}

		if let Some(hit) = self.entries.get(raw) {
			self.stats.hits += 1;
			tracing::debug!(input = raw, route = hit.name(), "route cache hit");
			return hit.clone();
		}

		self.stats.misses += 1;
		let route = resolve(raw);
		if !route.descriptor().metadata().cacheable {
			return route;
		}

		if self.capacity > 0 && self.entries.len() >= self.capacity {
			self.entries.shift_remove_index(0);
			self.stats.evictions += 1;
		}
		self.entries.insert(raw.to_string(), route.clone());
		self.stats.entries = self.entries.len() as u64;
		route
	}

	/// Drops every entry.
	pub fn invalidate(&mut self) {
		if self.entries.is_empty() {
			return;
		}
		tracing::debug!(entries = self.entries.len(), "route cache invalidated");
		self.entries.clear();
		self.stats.entries = 0;
		self.stats.invalidations += 1;
	}

	/// Returns whether `raw` is memoised.
	pub fn contains(&self, raw: &str) -> bool {
		self.entries.contains_key(raw)
	}

	/// Returns the number of memoised inputs.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether nothing is memoised.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the counters.
	pub fn statistics(&self) -> CacheStatistics {
		self.stats
	}
}
