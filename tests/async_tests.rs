/// Tests for async usage patterns.
use std::sync::Arc;

use arena_cache::{Cache, Error};

#[tokio::test]
async fn test_get_across_await() {
	let cache = Arc::new(Cache::new());

	cache.set("async", b"async test").unwrap();

	// The returned Vec owns its bytes, so it can be held across an await.
	let value = cache.get("async").unwrap();
	tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;

	assert_eq!(value, b"async test");
}

#[tokio::test]
async fn test_fallback_on_miss() {
	let cache = Arc::new(Cache::new());

	let value = match cache.get("computed") {
		Ok(value) => value,
		Err(Error::KeyNotFound) => {
			tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
			let value = b"expensive".to_vec();
			cache.set("computed", &value).unwrap();
			value
		}
		Err(err) => panic!("unexpected error: {err}"),
	};

	assert_eq!(value, b"expensive");
	assert_eq!(cache.get("computed").unwrap(), b"expensive");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_async_tasks() {
	let cache = Arc::new(Cache::with_shards(32).unwrap());

	// Pre-populate
	for i in 0..100 {
		cache.set(&format!("key-{i}"), format!("value-{i}").as_bytes()).unwrap();
	}

	let mut handles = vec![];

	for task_id in 0..10 {
		let cache = cache.clone();
		handles.push(tokio::spawn(async move {
			for i in 0..100 {
				let key = format!("key-{}", (task_id * 100 + i) % 100);

				let value = cache.get(&key).unwrap();
				tokio::time::sleep(tokio::time::Duration::from_micros(1)).await;
				assert!(value.starts_with(b"value-"));
			}
		}));
	}

	for handle in handles {
		handle.await.unwrap();
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_set_and_get() {
	let cache = Arc::new(Cache::with_shards(16).unwrap());

	let tasks: Vec<_> = (0..20)
		.map(|i| {
			let cache = cache.clone();
			tokio::spawn(async move {
				let key = format!("async-{i}");
				let value = format!("value-{i}");

				cache.set(&key, value.as_bytes()).unwrap();

				tokio::time::sleep(tokio::time::Duration::from_micros(10)).await;

				assert_eq!(cache.get(&key).unwrap(), value.as_bytes());
			})
		})
		.collect();

	for task in tasks {
		task.await.unwrap();
	}

	assert_eq!(cache.len(), 20);
}
