//! Store a value, read it back, and show a miss.
//!
//! Run with `RUST_LOG=arena_cache=trace cargo run --example basic` to see
//! the cache's own events.

use arena_cache::{Cache, Error};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let cache = Cache::new();

	if let Err(err) = cache.set("key", b"the value") {
		warn!(error = %err, "failed to store value");
		return;
	}

	match cache.get("key") {
		Ok(value) => info!(value = %String::from_utf8_lossy(&value), "read back"),
		Err(err) => warn!(error = %err, "lookup failed"),
	}

	match cache.get("missing") {
		Ok(_) => warn!("unexpected hit"),
		Err(Error::KeyNotFound) => info!("missing key is not found, as expected"),
		Err(err) => warn!(error = %err, "lookup failed"),
	}

	info!(entries = cache.len(), arena_bytes = cache.arena_bytes(), "cache stats");
}
