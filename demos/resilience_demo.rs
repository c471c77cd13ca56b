//! # Resilience Demo
//!
//! This example wires every component together:
//! - Route and API caching with TTL and LRU eviction
//! - Retried API calls recorded as metrics
//! - Alert monitoring with a subscriber
//!
//! Run with `RUST_LOG=resilience_core=debug` to see the library logs.

use resilience_core::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Job {
    id: u32,
    title: String,
    company: String,
}

fn sample_jobs() -> Vec<Job> {
    vec![
        Job {
            id: 1,
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
        },
        Job {
            id: 2,
            title: "Site Reliability Engineer".to_string(),
            company: "Globex".to_string(),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resilience_core=info,alert_system=info".into()),
        )
        .init();

    println!("🚀 Resilience Core Demo");
    println!("=======================");

    // 1. Context setup
    let mut config = AppConfig::load()?;
    config.retry.api = config.retry.api.with_jitter_ms(200);
    let context = ResilienceContext::new(config)?;
    let mut tasks = context.start_background_tasks();
    println!("✅ Context ready, background tasks running");

    context.alerts().on_alert(|alert| {
        println!("🚨 {} {:?}", alert.message, alert.details);
        Ok(())
    });

    // 2. Cached API calls
    println!("\n🗄️  API caching");
    println!("---------------");
    let fetches = AtomicU32::new(0);
    for round in 1..=3 {
        let jobs: Vec<Job> = context
            .fetch_api("/api/jobs", None::<&()>, || {
                fetches.fetch_add(1, Ordering::SeqCst);
                async { Ok(sample_jobs()) }
            })
            .await?;
        println!("Round {}: {} jobs (backend fetches so far: {})", round, jobs.len(), fetches.load(Ordering::SeqCst));
    }

    // 3. Retries
    println!("\n🔁 Retrying a flaky endpoint");
    println!("----------------------------");
    let attempts = AtomicU32::new(0);
    let company: Result<String, ResilienceError> = context
        .fetch_api("/api/companies/1", None::<&()>, || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 1 {
                    Err(OperationError::status(503, "warming up"))
                } else {
                    Ok("Acme".to_string())
                }
            }
        })
        .await;
    println!("Result: {:?} after {} attempts", company, attempts.load(Ordering::SeqCst));

    let missing: Result<String, ResilienceError> = context
        .fetch_api("/api/companies/404", None::<&()>, || async {
            Err(OperationError::status(404, "no such company"))
        })
        .await;
    if let Err(e) = missing {
        println!("Gave up after {:?} attempt(s): {}", e.attempts(), e);
    }

    // 4. Route cache and preload
    println!("\n🧭 Route preloading");
    println!("-------------------");
    let preload = context
        .route_cache()
        .preload_route_when_idle("/jobs/1", || async { Ok::<_, String>(sample_jobs().remove(0)) });
    preload.await?;
    let job: Option<Job> = context.route_cache().get_route_data("/jobs/1");
    println!("Preloaded route data: {:?}", job);

    // 5. Metrics and alerts
    println!("\n📈 Metrics and alerts");
    println!("---------------------");
    let metrics = context.metrics();
    metrics.track_page_load("/dashboard", 5600.0, MetricMetadata::Empty);
    metrics.track_component_render("JobList", 45.0, MetricMetadata::Empty);
    metrics
        .measure_async("load_profile", MetricKind::DatabaseQuery, MetricMetadata::Empty, async {
            tokio::time::sleep(Duration::from_millis(20)).await;
        })
        .await;

    let raised = context.alerts().run_checks_once();
    println!("Checks raised {} alert(s)", raised.len());

    let summary = metrics.performance_summary();
    for (kind, stats) in &summary.by_kind {
        println!("  {:<16} count={} avg={:.1}ms max={:.1}ms", kind.as_str(), stats.count, stats.average_ms, stats.max_ms);
    }

    let stats = context.api_cache().manager().stats();
    println!("API cache: {} entries, hit rate {:.0}%", stats.total_entries, stats.hit_rate * 100.0);

    let alert_stats = context.alerts().get_alert_statistics();
    println!("Alerts: {} total, {} active", alert_stats.total, alert_stats.active);

    // 6. Shutdown
    tasks.stop();
    println!("\n✅ Background tasks stopped");
    Ok(())
}
