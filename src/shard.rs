use hashbrown::HashMap;

use crate::arena::{Arena, entry_size};
use crate::error::Result;
use crate::hasher::BuildDigestHasher;

/// A single shard: one arena plus an index from hashed key to arena offset.
///
/// The shard is not thread-safe on its own; the Cache wraps it in RwLock.
/// The index holds plain `u32` offsets, never references into the arena, so
/// growing the arena never invalidates it.
pub(crate) struct Shard {
	/// Hashed key -> offset of the entry's length prefix
	index: HashMap<u64, u32, BuildDigestHasher>,
	/// Length-prefixed entries, appended at the tail
	arena: Arena,
	/// Bytes occupied by entries still referenced from the index
	live_bytes: usize,
}

/// Result of a successful [`Shard::set`].
#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SetOutcome {
	/// The key already had an entry, which is now dead space
	pub replaced: bool,
	/// The arena was reallocated to fit the entry
	pub grew: bool,
}

/// Point-in-time usage figures for one shard.
#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ShardStats {
	pub entries: usize,
	pub live_bytes: usize,
	pub written_bytes: usize,
	pub capacity: usize,
}

impl Shard {
	/// Create an empty shard whose arena starts with `arena_capacity` bytes.
	pub fn new(arena_capacity: usize) -> Self {
		Self {
			index: HashMap::with_hasher(BuildDigestHasher),
			arena: Arena::with_capacity(arena_capacity),
			live_bytes: 0,
		}
	}

	/// Append `entry` and point `hashed_key` at it.
	///
	/// A previous entry for the same key stays in the arena but is no longer
	/// reachable. On error nothing changes.
	pub fn set(&mut self, hashed_key: u64, entry: &[u8]) -> Result<SetOutcome> {
		let placement = self.arena.push(entry)?;
		self.live_bytes += entry_size(entry.len());

		let previous = self.index.insert(hashed_key, placement.offset);
		if let Some(old_len) = previous.and_then(|offset| self.arena.read(offset)).map(<[u8]>::len) {
			self.live_bytes -= entry_size(old_len);
		}

		Ok(SetOutcome {
			replaced: previous.is_some(),
			grew: placement.grew,
		})
	}

	/// Borrow the payload stored for `hashed_key`.
	///
	/// The borrow is tied to the shard lock; callers copy out before releasing it.
	pub fn get(&self, hashed_key: u64) -> Option<&[u8]> {
		let offset = *self.index.get(&hashed_key)?;
		self.arena.read(offset)
	}

	/// Check if the shard has an entry for `hashed_key`.
	pub fn contains(&self, hashed_key: u64) -> bool {
		self.index.contains_key(&hashed_key)
	}

	/// Number of keys in this shard.
	pub fn len(&self) -> usize {
		self.index.len()
	}

	/// Drop every entry, keeping the arena allocation for reuse.
	pub fn clear(&mut self) {
		self.index.clear();
		self.arena.reset();
		self.live_bytes = 0;
	}

	/// Leave only `available` addressable bytes in the arena.
	#[cfg(test)]
	pub fn exhaust_arena(&mut self, available: usize) {
		self.arena.exhaust(available);
	}

	pub fn stats(&self) -> ShardStats {
		ShardStats {
			entries: self.index.len(),
			live_bytes: self.live_bytes,
			// The sentinel byte is never handed out, so it is not counted as written.
			written_bytes: self.arena.tail() - 1,
			capacity: self.arena.capacity(),
		}
	}
}
