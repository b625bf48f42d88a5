#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::hasher::Fnv64a;
#[cfg(feature = "metrics")]
use crate::metrics::CacheMetrics;
use crate::shard::{Shard, ShardStats};

/// Default number of shards.
pub(crate) const DEFAULT_SHARD_COUNT: usize = 1024;

/// Default initial arena size per shard, in bytes.
pub(crate) const DEFAULT_ARENA_CAPACITY: usize = 1024;

/// Thread-safe byte cache backed by per-shard arenas.
///
/// Values are copied into a flat byte buffer owned by the key's shard, and the
/// shard's index keeps only a 32-bit offset per key. The allocator sees one
/// long-lived buffer per shard rather than one allocation per entry.
///
/// The cache can be shared across threads via `Arc<Cache>`. All methods are
/// synchronous but safe to call from async contexts: `get` returns an owned
/// copy, so no lock is ever held by the caller.
///
/// # Sharding for Concurrency
///
/// Each key is hashed with FNV-1a and routed to `shards[hash & (shard_count - 1)]`.
/// Every shard has its own reader/writer lock: lookups on a shard run
/// concurrently, a `set` excludes everything else on that shard only, and no
/// operation ever holds two shard locks at once.
///
/// # Hash Collisions
///
/// Keys are identified by their 64-bit digest alone. Two distinct keys with the
/// same digest share an entry. At the entry counts this cache is meant for, the
/// probability of that is negligible.
///
/// # Dead Space
///
/// Overwriting a key appends a fresh entry; the old bytes stay in the arena
/// until [`Cache::clear`].
pub struct Cache {
	/// Sharded storage
	shards: Box<[RwLock<Shard>]>,
	/// Number of shards, always a power of two
	shard_count: usize,
	#[cfg(feature = "metrics")]
	hits: AtomicU64,
	#[cfg(feature = "metrics")]
	misses: AtomicU64,
	#[cfg(feature = "metrics")]
	inserts: AtomicU64,
	#[cfg(feature = "metrics")]
	updates: AtomicU64,
	#[cfg(feature = "metrics")]
	rejected: AtomicU64,
	#[cfg(feature = "metrics")]
	arena_growths: AtomicU64,
}

impl Cache {
	/// Create a cache with 1024 shards and 1 KiB initial arenas.
	pub fn new() -> Self {
		Self::from_parts(DEFAULT_SHARD_COUNT, DEFAULT_ARENA_CAPACITY)
	}

	/// Create a cache with `shard_count` shards.
	///
	/// Fails with [`Error::InvalidConfiguration`] unless `shard_count` is a
	/// positive power of two.
	pub fn with_shards(shard_count: usize) -> Result<Self> {
		Self::with_config(shard_count, DEFAULT_ARENA_CAPACITY)
	}

	/// Create a cache with full custom configuration.
	///
	/// # Arguments
	///
	/// * `shard_count` - Number of shards; must be a positive power of two
	/// * `arena_capacity` - Initial arena size per shard in bytes; must be in `1..=u32::MAX`
	///
	/// This is primarily used by `CacheBuilder`.
	pub fn with_config(shard_count: usize, arena_capacity: usize) -> Result<Self> {
		validate_shard_count(shard_count)?;
		validate_arena_capacity(arena_capacity)?;
		Ok(Self::from_parts(shard_count, arena_capacity))
	}

	fn from_parts(shard_count: usize, arena_capacity: usize) -> Self {
		let shards = (0..shard_count).map(|_| RwLock::new(Shard::new(arena_capacity))).collect();

		debug!(shard_count, arena_capacity, "created arena cache");

		Self {
			shards,
			shard_count,
			#[cfg(feature = "metrics")]
			hits: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			misses: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			inserts: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			updates: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			rejected: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			arena_growths: AtomicU64::new(0),
		}
	}

	/// Store a copy of `value` under `key`, replacing any previous value.
	///
	/// The caller's buffer is not retained. Only fails with
	/// [`Error::CapacityExceeded`] when the key's shard has written close to
	/// 4 GiB, in which case the shard is unchanged.
	///
	/// # Runtime Complexity
	///
	/// O(len(value)) for the copy. Occasionally the shard's arena is
	/// reallocated to twice its size, which costs a copy of the arena.
	pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
		let hashed_key = Fnv64a::sum64(key);
		let result = self.get_shard(hashed_key).write().set(hashed_key, value);

		match result {
			Ok(_outcome) => {
				#[cfg(feature = "metrics")]
				{
					if _outcome.replaced {
						self.updates.fetch_add(1, Ordering::Relaxed);
					} else {
						self.inserts.fetch_add(1, Ordering::Relaxed);
					}
					if _outcome.grew {
						self.arena_growths.fetch_add(1, Ordering::Relaxed);
					}
				}
				Ok(())
			}
			Err(err) => {
				warn!(
					hashed_key,
					key_len = key.len(),
					len = value.len(),
					error = %err,
					"rejected cache write"
				);
				#[cfg(feature = "metrics")]
				self.rejected.fetch_add(1, Ordering::Relaxed);
				Err(err)
			}
		}
	}

	/// Return a copy of the value stored under `key`.
	///
	/// Fails with [`Error::KeyNotFound`] if nothing was stored. The returned
	/// buffer is owned by the caller; mutating it never affects the cache.
	pub fn get(&self, key: &str) -> Result<Vec<u8>> {
		self.get_with(key, <[u8]>::to_vec)
	}

	/// Run `f` on the stored value without copying it out.
	///
	/// `f` runs while the shard's read lock is held, so it should be short and
	/// must not call back into this cache. A nested read of the same shard can
	/// deadlock behind a queued writer, and a nested `set` on it always does.
	pub fn get_with<R>(&self, key: &str, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
		let hashed_key = Fnv64a::sum64(key);
		let result = {
			let shard = self.get_shard(hashed_key).read();
			shard.get(hashed_key).map(f)
		}; // Lock released here

		match result {
			Some(value) => {
				#[cfg(feature = "metrics")]
				self.hits.fetch_add(1, Ordering::Relaxed);
				Ok(value)
			}
			None => {
				#[cfg(feature = "metrics")]
				self.misses.fetch_add(1, Ordering::Relaxed);
				Err(Error::KeyNotFound)
			}
		}
	}

	/// Check if a key has a value, without affecting hit/miss counters.
	pub fn contains(&self, key: &str) -> bool {
		let hashed_key = Fnv64a::sum64(key);
		self.get_shard(hashed_key).read().contains(hashed_key)
	}

	/// Number of keys with a value.
	///
	/// Shards are counted one at a time, so concurrent writers can make this
	/// slightly stale.
	pub fn len(&self) -> usize {
		self.shards.iter().map(|shard| shard.read().len()).sum()
	}

	/// Check if cache is empty.
	pub fn is_empty(&self) -> bool {
		self.shards.iter().all(|shard| shard.read().len() == 0)
	}

	/// Drop every entry and rewind every arena.
	///
	/// Arena allocations are kept, so a cleared cache refills without
	/// reallocating. Shards are cleared one at a time.
	pub fn clear(&self) {
		for shard_lock in self.shards.iter() {
			shard_lock.write().clear();
		}

		#[cfg(feature = "metrics")]
		{
			self.hits.store(0, Ordering::Relaxed);
			self.misses.store(0, Ordering::Relaxed);
			self.inserts.store(0, Ordering::Relaxed);
			self.updates.store(0, Ordering::Relaxed);
			self.rejected.store(0, Ordering::Relaxed);
			self.arena_growths.store(0, Ordering::Relaxed);
		}

		debug!(shard_count = self.shard_count, "cleared arena cache");
	}

	/// Number of shards.
	pub fn shard_count(&self) -> usize {
		self.shard_count
	}

	/// Index of the shard `key` is routed to.
	pub fn shard_index(&self, key: &str) -> usize {
		self.shard_index_for(Fnv64a::sum64(key))
	}

	/// Bytes written to all arenas, including superseded entries.
	pub fn arena_bytes(&self) -> usize {
		self.shard_stats().map(|stats| stats.written_bytes).sum()
	}

	/// Bytes allocated for all arenas.
	pub fn arena_capacity(&self) -> usize {
		self.shard_stats().map(|stats| stats.capacity).sum()
	}

	/// Get a metrics snapshot.
	///
	/// # Example
	///
	/// ```
	/// use arena_cache::Cache;
	///
	/// let cache = Cache::new();
	/// cache.set("a", b"1").unwrap();
	/// assert!(cache.get("b").is_err());
	///
	/// let metrics = cache.metrics();
	/// assert_eq!(metrics.inserts, 1);
	/// assert_eq!(metrics.misses, 1);
	/// ```
	#[cfg(feature = "metrics")]
	pub fn metrics(&self) -> CacheMetrics {
		let mut metrics = CacheMetrics {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			inserts: self.inserts.load(Ordering::Relaxed),
			updates: self.updates.load(Ordering::Relaxed),
			rejected: self.rejected.load(Ordering::Relaxed),
			arena_growths: self.arena_growths.load(Ordering::Relaxed),
			..Default::default()
		};
		for stats in self.shard_stats() {
			metrics.entry_count += stats.entries;
			metrics.live_bytes += stats.live_bytes;
			metrics.written_bytes += stats.written_bytes;
			metrics.capacity_bytes += stats.capacity;
		}
		metrics
	}

	fn shard_stats(&self) -> impl Iterator<Item = ShardStats> + '_ {
		self.shards.iter().map(|shard| shard.read().stats())
	}

	/// Get the shard for a given hash.
	fn get_shard(&self, hash: u64) -> &RwLock<Shard> {
		&self.shards[self.shard_index_for(hash)]
	}

	#[inline]
	fn shard_index_for(&self, hash: u64) -> usize {
		(hash & (self.shard_count as u64 - 1)) as usize
	}
}

impl Default for Cache {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Cache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Cache").field("shard_count", &self.shard_count).finish_non_exhaustive()
	}
}

pub(crate) fn validate_shard_count(shard_count: usize) -> Result<()> {
	if shard_count.is_power_of_two() {
		Ok(())
	} else {
		Err(Error::InvalidConfiguration(format!(
			"shard count must be a positive power of two, got {shard_count}"
		)))
	}
}

pub(crate) fn validate_arena_capacity(arena_capacity: usize) -> Result<()> {
	if (1..=crate::arena::MAX_ARENA_LEN).contains(&arena_capacity) {
		Ok(())
	} else {
		Err(Error::InvalidConfiguration(format!(
			"initial arena capacity must be between 1 and {} bytes, got {arena_capacity}",
			crate::arena::MAX_ARENA_LEN
		)))
	}
}
