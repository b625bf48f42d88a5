#![doc = include_str!("../README.md")]

mod arena;
mod builder;
mod cache;
mod error;
mod hasher;
#[cfg(feature = "metrics")]
mod metrics;
mod shard;

pub use builder::CacheBuilder;
pub use cache::Cache;
pub use error::{Error, Result};
pub use hasher::Fnv64a;
#[cfg(feature = "metrics")]
pub use metrics::CacheMetrics;
