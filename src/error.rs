//! Error types returned by the cache.

use thiserror::Error;

/// Errors surfaced by [`Cache`](crate::Cache) and [`CacheBuilder`](crate::CacheBuilder).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// No entry has been recorded for the key.
	///
	/// Callers typically fall back to computing the value and calling `set`.
	#[error("key not found")]
	KeyNotFound,

	/// The cache could not be constructed with the requested settings.
	#[error("invalid configuration: {0}")]
	InvalidConfiguration(String),

	/// The entry would end past the last byte a 32-bit offset can address in its shard.
	///
	/// The shard is left untouched when this is returned.
	#[error("entry of {requested} bytes does not fit in the {available} addressable bytes left in its shard")]
	CapacityExceeded {
		/// Bytes the entry needs, including its length prefix.
		requested: usize,
		/// Bytes still addressable past the shard's tail.
		available: usize,
	},
}

/// Convenience `Result` alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
