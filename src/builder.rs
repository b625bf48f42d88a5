use crate::cache::{Cache, DEFAULT_ARENA_CAPACITY, DEFAULT_SHARD_COUNT};
use crate::error::Result;

/// Builder for configuring a Cache.
///
/// # Example
///
/// ```
/// use arena_cache::CacheBuilder;
///
/// let cache = CacheBuilder::new()
///     .shards(256)
///     .initial_arena_capacity(64 * 1024) // 64 KiB per shard
///     .build()
///     .unwrap();
///
/// assert_eq!(cache.shard_count(), 256);
/// ```
///
/// Settings are validated by [`build`](CacheBuilder::build), which returns
/// [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration) rather
/// than rounding a bad value.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
	shard_count: usize,
	initial_arena_capacity: usize,
}

impl CacheBuilder {
	/// Create a builder with 1024 shards and 1 KiB initial arenas.
	pub fn new() -> Self {
		Self {
			shard_count: DEFAULT_SHARD_COUNT,
			initial_arena_capacity: DEFAULT_ARENA_CAPACITY,
		}
	}

	/// Set the number of shards.
	///
	/// More shards reduce contention but each one carries its own arena and
	/// index. Must be a positive power of two.
	///
	/// Default: 1024 shards
	pub fn shards(mut self, count: usize) -> Self {
		self.shard_count = count;
		self
	}

	/// Set the initial arena size of every shard, in bytes.
	///
	/// Arenas double as needed, so this only trades up-front memory for fewer
	/// early reallocations. Must be between 1 and `u32::MAX`.
	///
	/// Default: 1024 bytes
	pub fn initial_arena_capacity(mut self, bytes: usize) -> Self {
		self.initial_arena_capacity = bytes;
		self
	}

	/// Build the cache with the configured settings.
	pub fn build(self) -> Result<Cache> {
		Cache::with_config(self.shard_count, self.initial_arena_capacity)
	}
}

impl Default for CacheBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;

	#[test]
	fn test_builder_default() {
		let cache = CacheBuilder::default().build().unwrap();
		assert!(cache.is_empty());
		assert_eq!(cache.shard_count(), 1024);
	}

	#[test]
	fn test_builder_with_shards() {
		let cache = CacheBuilder::new().shards(32).build().unwrap();
		assert_eq!(cache.shard_count(), 32);
	}

	#[test]
	fn test_builder_full_config() {
		let cache = CacheBuilder::new().shards(8).initial_arena_capacity(4096).build().unwrap();

		assert!(cache.is_empty());
		assert_eq!(cache.arena_capacity(), 8 * 4096);
		assert_eq!(cache.arena_bytes(), 0);
	}

	#[test]
	fn test_builder_invalid_shards() {
		let err = CacheBuilder::new().shards(100).build().unwrap_err();
		assert_eq!(
			err,
			Error::InvalidConfiguration(
				"shard count must be a positive power of two, got 100".to_string()
			)
		);
	}

	#[test]
	fn test_builder_invalid_arena_capacity() {
		let result = CacheBuilder::new().initial_arena_capacity(0).build();
		assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
	}
}
