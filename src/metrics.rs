//! Cache usage metrics.

/// Snapshot of cache activity and arena usage.
///
/// Counters accumulate from construction (or the last [`Cache::clear`](crate::Cache::clear)).
/// Byte figures are summed across shards, visiting one shard at a time, so
/// under concurrent writes they are approximate.
///
/// # Example
///
/// ```
/// use arena_cache::Cache;
///
/// let cache = Cache::new();
/// cache.set("key", b"value").unwrap();
/// let _ = cache.get("key");
///
/// let metrics = cache.metrics();
/// println!("Hit rate: {:.2}%", metrics.hit_rate() * 100.0);
/// println!("Dead space: {:.2}%", metrics.dead_ratio() * 100.0);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
	/// Lookups that found an entry.
	pub hits: u64,
	/// Lookups that found nothing.
	pub misses: u64,
	/// Successful `set` calls for keys that had no entry.
	pub inserts: u64,
	/// Successful `set` calls that replaced an existing entry.
	pub updates: u64,
	/// `set` calls rejected because the shard's addressable space was exhausted.
	pub rejected: u64,
	/// Arena reallocations across all shards.
	pub arena_growths: u64,
	/// Keys currently indexed.
	pub entry_count: usize,
	/// Bytes occupied by reachable entries, including length prefixes.
	pub live_bytes: usize,
	/// Bytes written to arenas, reachable or not.
	pub written_bytes: usize,
	/// Bytes allocated for arenas.
	pub capacity_bytes: usize,
}

impl CacheMetrics {
	/// Hit ratio between 0.0 and 1.0, or 0.0 before any lookup.
	pub fn hit_rate(&self) -> f64 {
		let total = self.hits + self.misses;
		if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
	}

	/// Bytes held by superseded entries.
	pub fn dead_bytes(&self) -> usize {
		self.written_bytes.saturating_sub(self.live_bytes)
	}

	/// Fraction of written arena bytes that are no longer reachable.
	pub fn dead_ratio(&self) -> f64 {
		if self.written_bytes == 0 {
			0.0
		} else {
			self.dead_bytes() as f64 / self.written_bytes as f64
		}
	}

	/// Total number of lookups.
	pub fn total_accesses(&self) -> u64 {
		self.hits + self.misses
	}

	/// Total number of accepted writes.
	pub fn total_writes(&self) -> u64 {
		self.inserts + self.updates
	}
}
