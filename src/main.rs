//! Scored Cache demo
//!
//! Warms a media URI cache, drives it through reads, writes and batched
//! updates, then prints the statistics report as JSON.

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scored_cache::{CacheBuilder, CacheConfig, MediaEstimator};

/// Entry point of the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache with the image size estimator and a logging disposer
/// 4. Warm the cache (one key is made to fail on purpose)
/// 5. Exercise get/set/batch operations
/// 6. Print the statistics report
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scored_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scored Cache demo");

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: max_entries={}, max_memory={}B, ttl={}s",
        config.max_entries,
        config.max_memory_bytes,
        config.ttl.as_secs()
    );

    let cache = CacheBuilder::new(config)
        .size_estimator(MediaEstimator::image())
        .disposer(|key: String, uri: String| async move {
            info!(key = %key, uri = %uri, "released media handle");
            Ok::<(), anyhow::Error>(())
        })
        .build()
        .context("failed to build cache")?;

    let keys = ["avatar:1", "avatar:2", "broken:3", "thumbnail:4", "hero:5"];
    let report = cache
        .warmup(keys, |key: String| async move {
            if key.starts_with("broken") {
                anyhow::bail!("origin returned 404 for {key}");
            }
            let kind = key.split(':').next().unwrap_or("image");
            Ok(format!("https://cdn.example.com/{kind}/{key}.jpg"))
        })
        .await;
    info!(
        "Warmup: {} of {} keys loaded",
        report.loaded, report.requested
    );

    for key in ["avatar:1", "avatar:1", "hero:5", "missing:9"] {
        match cache.get(key).await {
            Some(uri) => info!(key = %key, uri = %uri, "hit"),
            None => warn!(key = %key, "miss"),
        }
    }

    cache
        .set("banner:6", "https://cdn.example.com/banner/full-hd.jpg".to_string())
        .await?;

    cache.batch_set([
        ("thumbnail:7", "https://cdn.example.com/thumbnail/7.jpg".to_string()),
        ("thumbnail:8", "https://cdn.example.com/thumbnail/8.jpg".to_string()),
    ]);
    cache.batch_delete(["avatar:2"]);
    tokio::time::sleep(cache.config().batch_debounce + Duration::from_millis(20)).await;

    let removed = cache.cleanup().await;
    info!("Cleanup removed {} entries", removed);

    let stats = cache.stats().await;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    println!("{}", serde_json::to_string_pretty(&report)?);

    cache.clear().await;
    // Give the disposal worker a moment to log the released handles.
    tokio::time::sleep(Duration::from_millis(20)).await;
    info!("Demo complete");
    Ok(())
}
