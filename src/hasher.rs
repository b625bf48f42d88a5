//! Key hashing.
//!
//! Keys are digested with 64-bit FNV-1a. The digest is deterministic across
//! calls and processes, so the same key always lands in the same shard and the
//! same index slot. The shard index is keyed by digest and only needs a cheap
//! finalizer over it to place entries in buckets.

use std::hash::{BuildHasher, Hasher};

const FNV_OFFSET_BASIS: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

/// Stateless 64-bit FNV-1a hasher.
///
/// # Example
///
/// ```
/// use arena_cache::Fnv64a;
///
/// assert_eq!(Fnv64a::sum64(""), 0xcbf29ce484222325);
/// assert_eq!(Fnv64a::sum64("a"), 0xaf63dc4c8601ec8c);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fnv64a;

impl Fnv64a {
	/// Digest a string key.
	#[inline]
	pub const fn sum64(key: &str) -> u64 {
		Self::sum64_bytes(key.as_bytes())
	}

	/// Digest a raw byte key.
	#[inline]
	pub const fn sum64_bytes(bytes: &[u8]) -> u64 {
		let mut hash = FNV_OFFSET_BASIS;
		let mut i = 0;
		while i < bytes.len() {
			hash ^= bytes[i] as u64;
			hash = hash.wrapping_mul(FNV_PRIME);
			i += 1;
		}
		hash
	}
}

/// Index hasher over a pre-computed `u64` digest.
///
/// Keys reaching a shard share their low bits (that is how they were routed
/// there), so the digest is run through the murmur3 64-bit finalizer before
/// the map picks a bucket from it. Digests arrive through `write_u64`; any
/// other input is folded into the state byte by byte.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DigestHasher(u64);

impl Hasher for DigestHasher {
	#[inline]
	fn finish(&self) -> u64 {
		fmix64(self.0)
	}

	#[inline]
	fn write_u64(&mut self, n: u64) {
		self.0 ^= n;
	}

	fn write(&mut self, bytes: &[u8]) {
		for &b in bytes {
			self.0 ^= b as u64;
			self.0 = self.0.wrapping_mul(FNV_PRIME);
		}
	}
}

/// Murmur3 `fmix64`: every output bit depends on every input bit.
#[inline]
const fn fmix64(mut x: u64) -> u64 {
	x ^= x >> 33;
	x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
	x ^= x >> 33;
	x = x.wrapping_mul(0xc4ce_b53f_e1a8_5ec5);
	x ^= x >> 33;
	x
}

/// [`BuildHasher`] for [`DigestHasher`].
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct BuildDigestHasher;

impl BuildHasher for BuildDigestHasher {
	type Hasher = DigestHasher;

	#[inline]
	fn build_hasher(&self) -> DigestHasher {
		DigestHasher::default()
	}
}
