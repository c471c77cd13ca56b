//! Integration tests for the cache engine
//!
//! Exercises file persistence, the cleanup timer and deferred route
//! preloading through the public prelude.

use resilience_core::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct JobListing {
    id: u32,
    title: String,
}

fn listing(id: u32, title: &str) -> JobListing {
    JobListing {
        id,
        title: title.to_string(),
    }
}

#[test]
fn test_file_persistence_survives_reconstruction() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new());
    let config = CacheConfig::new(10, 60_000, true, "jobs".to_string());

    let storage: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(dir.path()).unwrap());
    let first: CacheManager<JobListing> =
        CacheManager::with_parts(config.clone(), Some(storage), clock.clone());
    first.set("job:1", listing(1, "Backend engineer"), None);
    first.set("job:2", listing(2, "Designer"), Some(Duration::from_millis(100)));
    drop(first);

    assert!(dir.path().join("jobs.json").exists());

    clock.advance_millis(500);
    let storage: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(dir.path()).unwrap());
    let second: CacheManager<JobListing> =
        CacheManager::with_parts(config, Some(storage), clock.clone());

    assert_eq!(second.get("job:1"), Some(listing(1, "Backend engineer")));
    assert_eq!(second.get("job:2"), None);
    assert_eq!(second.len(), 1);
}

#[test]
fn test_hit_rate_counts_lookups() {
    let clock = Arc::new(ManualClock::new());
    let cache: CacheManager<u32> =
        CacheManager::with_parts(CacheConfig::new(4, 1000, false, "hits".into()), None, clock);

    cache.set("a", 1, None);
    assert_eq!(cache.get("a"), Some(1));
    assert_eq!(cache.get("a"), Some(1));
    assert_eq!(cache.get("a"), Some(1));
    assert_eq!(cache.get("missing"), None);

    let stats = cache.stats();
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate - 0.75).abs() < f64::EPSILON);
    assert_eq!(stats.top_entries[0].key, "a");
    assert_eq!(stats.top_entries[0].access_count, 3);
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_timer_sweeps_unread_entries() {
    let clock = Arc::new(ManualClock::new());
    let cache: Arc<CacheManager<u32>> = Arc::new(CacheManager::with_parts(
        CacheConfig::new(10, 1000, false, "sweep".into()),
        None,
        clock.clone(),
    ));
    cache.set("short", 1, Some(Duration::from_millis(10)));
    cache.set("long", 2, Some(Duration::from_secs(3600)));

    let mut handle = cache.start_cleanup(Duration::from_secs(300));
    clock.advance_millis(50);
    tokio::time::sleep(Duration::from_secs(301)).await;

    assert_eq!(cache.keys(), vec!["long".to_string()]);
    handle.stop();
    assert!(!handle.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_route_preload_when_idle() {
    let routes = RouteCache::new(CacheConfig::route_defaults(), None)
        .with_idle_delay(Duration::from_millis(100));

    let handle = routes.preload_route_when_idle("/jobs", || async {
        Ok::<_, String>(vec![listing(7, "Data engineer")])
    });
    assert_eq!(routes.get_route_data::<Vec<JobListing>>("/jobs"), None);

    handle.await.unwrap();
    assert_eq!(
        routes.get_route_data::<Vec<JobListing>>("/jobs"),
        Some(vec![listing(7, "Data engineer")])
    );

    // Live data is not reloaded
    routes
        .preload_route("/jobs", || async { Ok::<_, String>(json!([])) })
        .await;
    assert_eq!(routes.get_route_data::<Vec<JobListing>>("/jobs").map(|v| v.len()), Some(1));
}

#[test]
fn test_api_cache_keys_by_params() {
    let api = ApiCache::new(CacheConfig::api_defaults());
    let page_one = json!({"page": 1});
    let page_two = json!({"page": 2});

    api.cache_api_response("/api/jobs", Some(&page_one), &vec![listing(1, "A")], None);
    api.cache_api_response("/api/jobs", Some(&page_two), &vec![listing(2, "B")], None);
    api.cache_api_response("/api/companies", None::<&()>, &json!([]), None);

    let cached: Option<Vec<JobListing>> = api.get_api_response("/api/jobs", Some(&page_two));
    assert_eq!(cached, Some(vec![listing(2, "B")]));

    assert_eq!(api.invalidate_endpoint("/api/jobs"), 2);
    assert!(api.get_api_response::<_, Vec<JobListing>>("/api/jobs", Some(&page_one)).is_none());
    assert!(api.get_api_response::<(), serde_json::Value>("/api/companies", None).is_some());
}
