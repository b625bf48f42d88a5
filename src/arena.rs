use tracing::trace;

use crate::error::{Error, Result};

/// Size of the little-endian length prefix written before every payload.
pub(crate) const HEADER_SIZE: usize = 4;

/// Largest arena length whose every byte can be addressed by a `u32` offset.
pub(crate) const MAX_ARENA_LEN: usize = u32::MAX as usize;

/// First writable offset. Offset 0 is reserved to mean "no entry".
const FIRST_OFFSET: usize = 1;

/// Append-only byte buffer holding length-prefixed entries back to back.
///
/// `buf.len()` is the allocated capacity; `tail` is how much of it is in use.
/// Bytes below `tail` are never rewritten until [`Arena::reset`].
pub(crate) struct Arena {
	buf: Vec<u8>,
	tail: usize,
}

/// Where an appended entry landed, and whether the arena had to grow for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
	pub offset: u32,
	pub grew: bool,
}

impl Arena {
	/// Create an arena with `capacity` zeroed bytes.
	///
	/// `capacity` must be at least 1 so the sentinel byte exists.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			buf: vec![0; capacity.clamp(FIRST_OFFSET, MAX_ARENA_LEN)],
			tail: FIRST_OFFSET,
		}
	}

	/// Append `payload` and return the offset of its length prefix.
	///
	/// Grows the buffer by doubling when the entry does not fit. Fails without
	/// touching the arena if the entry would end past [`MAX_ARENA_LEN`].
	pub fn push(&mut self, payload: &[u8]) -> Result<Placement> {
		let requested = HEADER_SIZE + payload.len();
		let available = MAX_ARENA_LEN - self.tail;
		if requested > available {
			return Err(Error::CapacityExceeded {
				requested,
				available,
			});
		}

		let offset = self.tail;
		let end = offset + requested;
		let grew = self.reserve(end);

		self.buf[offset..offset + HEADER_SIZE]
			.copy_from_slice(&(payload.len() as u32).to_le_bytes());
		self.buf[offset + HEADER_SIZE..end].copy_from_slice(payload);
		self.tail = end;

		Ok(Placement {
			offset: offset as u32,
			grew,
		})
	}

	/// Borrow the payload of the entry whose prefix starts at `offset`.
	///
	/// Returns `None` for the sentinel offset or an offset that does not lie
	/// within the written region.
	pub fn read(&self, offset: u32) -> Option<&[u8]> {
		let start = offset as usize;
		if start < FIRST_OFFSET || start + HEADER_SIZE > self.tail {
			return None;
		}
		let header: [u8; HEADER_SIZE] = self.buf[start..start + HEADER_SIZE].try_into().ok()?;
		let len = u32::from_le_bytes(header) as usize;
		self.buf.get(start + HEADER_SIZE..start + HEADER_SIZE + len)
	}

	/// Forget every entry. The allocation is kept for reuse.
	pub fn reset(&mut self) {
		self.tail = FIRST_OFFSET;
	}

	/// Next free write position.
	pub fn tail(&self) -> usize {
		self.tail
	}

	/// Allocated length of the buffer.
	pub fn capacity(&self) -> usize {
		self.buf.len()
	}

	/// Move the tail so that only `available` addressable bytes remain,
	/// without allocating them.
	#[cfg(test)]
	pub fn exhaust(&mut self, available: usize) {
		self.tail = MAX_ARENA_LEN - available;
	}

	/// Ensure the buffer is at least `end` bytes long, doubling as needed.
	///
	/// Existing bytes keep their offsets. Returns whether a reallocation happened.
	fn reserve(&mut self, end: usize) -> bool {
		let current = self.buf.len();
		if end <= current {
			return false;
		}
		let mut target = current.max(FIRST_OFFSET);
		while target < end {
			target = target.saturating_mul(2);
		}
		let target = target.min(MAX_ARENA_LEN);
		trace!(from = current, to = target, "growing arena");
		self.buf.resize(target, 0);
		true
	}
}

/// Bytes an entry with a `payload_len`-byte payload occupies in the arena.
#[inline]
pub(crate) fn entry_size(payload_len: usize) -> usize {
	HEADER_SIZE + payload_len
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_first_entry_skips_sentinel() {
		let mut arena = Arena::with_capacity(64);
		let placed = arena.push(b"abc").unwrap();
		assert_eq!(placed.offset, 1);
		assert!(!placed.grew);
		assert_eq!(arena.tail(), 1 + HEADER_SIZE + 3);
	}

	#[test]
	fn test_entry_encoding_is_le_length_prefix() {
		let mut arena = Arena::with_capacity(64);
		let placed = arena.push(b"hello").unwrap();
		let start = placed.offset as usize;
		assert_eq!(&arena.buf[start..start + HEADER_SIZE], &5u32.to_le_bytes());
		assert_eq!(&arena.buf[start + HEADER_SIZE..start + HEADER_SIZE + 5], b"hello");
	}

	#[test]
	fn test_read_sentinel_is_none() {
		let mut arena = Arena::with_capacity(64);
		arena.push(b"abc").unwrap();
		assert_eq!(arena.read(0), None);
	}

	#[test]
	fn test_read_beyond_tail_is_none() {
		let mut arena = Arena::with_capacity(64);
		arena.push(b"abc").unwrap();
		assert_eq!(arena.read(40), None);
	}

	#[test]
	fn test_entries_are_appended() {
		let mut arena = Arena::with_capacity(64);
		let a = arena.push(b"aaa").unwrap().offset;
		let b = arena.push(b"bb").unwrap().offset;
		assert_eq!(b as usize, a as usize + entry_size(3));
		assert_eq!(arena.read(a), Some(&b"aaa"[..]));
		assert_eq!(arena.read(b), Some(&b"bb"[..]));
	}

	#[test]
	fn test_growth_preserves_existing_entries() {
		let mut arena = Arena::with_capacity(8);
		let first = arena.push(b"one").unwrap();
		assert!(!first.grew);

		let second = arena.push(b"two-two").unwrap();
		assert!(second.grew);
		assert_eq!(arena.capacity(), 32);

		assert_eq!(arena.read(first.offset), Some(&b"one"[..]));
		assert_eq!(arena.read(second.offset), Some(&b"two-two"[..]));
	}

	#[test]
	fn test_growth_doubles_until_entry_fits() {
		let mut arena = Arena::with_capacity(4);
		let payload = vec![7u8; 100];
		let placed = arena.push(&payload).unwrap();
		assert!(placed.grew);
		assert_eq!(arena.capacity(), 128);
		assert_eq!(arena.read(placed.offset), Some(&payload[..]));
	}

	#[test]
	fn test_empty_payload() {
		let mut arena = Arena::with_capacity(16);
		let placed = arena.push(b"").unwrap();
		assert_eq!(arena.read(placed.offset), Some(&b""[..]));
		assert_eq!(arena.tail(), 1 + HEADER_SIZE);
	}

	#[test]
	fn test_zero_capacity_is_clamped() {
		let mut arena = Arena::with_capacity(0);
		assert_eq!(arena.capacity(), 1);
		let placed = arena.push(b"x").unwrap();
		assert_eq!(arena.read(placed.offset), Some(&b"x"[..]));
	}

	#[test]
	fn test_capacity_exceeded_leaves_arena_untouched() {
		let mut arena = Arena::with_capacity(16);
		arena.push(b"keep").unwrap();
		let tail = arena.tail();

		// Pretend the arena is nearly full without allocating 4 GiB.
		arena.exhaust(6);
		let err = arena.push(b"xyz").unwrap_err();
		assert_eq!(
			err,
			Error::CapacityExceeded {
				requested: 7,
				available: 6,
			}
		);
		assert_eq!(arena.tail(), MAX_ARENA_LEN - 6);
		assert_eq!(arena.capacity(), 16);

		arena.tail = tail;
		assert_eq!(arena.read(1), Some(&b"keep"[..]));
	}

	#[test]
	fn test_reset_rewinds_tail_and_keeps_allocation() {
		let mut arena = Arena::with_capacity(8);
		arena.push(&[1u8; 20]).unwrap();
		let capacity = arena.capacity();

		arena.reset();
		assert_eq!(arena.tail(), 1);
		assert_eq!(arena.capacity(), capacity);
		assert_eq!(arena.read(1), None);
	}
}
