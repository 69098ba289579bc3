//! Cache Provider demo
//!
//! Walks through the bounded LRU and auto-expiry caches, logging their
//! contents at each step.

use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_provider::diagnostics::log_entries;
use cache_provider::{CacheConfig, CacheFactory, CacheKind};

/// Main entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Exercise a capacity-3 LRU cache: fill, update, read, overflow
/// 4. Exercise an auto-expiry cache and let the sweeper clear it
/// 5. Print the configured cache's statistics as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_provider=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: kind={}, max_capacity={}, expiry_window={}ms, initial_capacity={}",
        config.kind, config.max_capacity, config.expiry_window_ms, config.initial_capacity
    );

    lru_walkthrough()?;
    expiry_walkthrough(config.expiry_window()).await?;

    let cache = CacheFactory::build::<String, String>(&config)
        .context("failed to build configured cache")?;
    for i in 0..5 {
        cache.add(format!("Key {:02}", i), format!("Value {:02}", i))?;
        cache.retrieve(&format!("Key {:02}", i))?;
    }
    log_entries(config.kind.as_str(), cache.as_ref());
    println!("{}", serde_json::to_string_pretty(&cache.stats())?);

    Ok(())
}

fn lru_walkthrough() -> anyhow::Result<()> {
    let cache = CacheFactory::create_fixed_capacity_lru::<String, String>(3)?;

    cache.add("Key 01".into(), "Value 01".into())?;
    cache.add("Key 02".into(), "Value 02".into())?;
    cache.add("Key 03".into(), "Value 03".into())?;
    log_entries("lru", cache.as_ref());

    cache.add("Key 02".into(), "Value 02 Updated".into())?;
    log_entries("lru", cache.as_ref());

    let value = cache.retrieve(&"Key 03".to_string())?;
    info!("Key 03: {:?}", value);
    log_entries("lru", cache.as_ref());

    // Key 01 is now least recently used
    cache.add("Key 04".into(), "Value 04".into())?;
    log_entries("lru", cache.as_ref());

    Ok(())
}

async fn expiry_walkthrough(window: Duration) -> anyhow::Result<()> {
    let config = CacheConfig {
        kind: CacheKind::AutoExpiry,
        expiry_window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
        ..CacheConfig::default()
    };
    let cache = CacheFactory::build::<String, String>(&config)?;
    let step = window * 2 / 5;

    cache.add("Key 01".into(), "Value 01".into())?;
    tokio::time::sleep(step).await;
    cache.add("Key 02".into(), "Value 02".into())?;
    tokio::time::sleep(step).await;
    cache.add("Key 03".into(), "Value 03".into())?;
    log_entries("auto-expiry", cache.as_ref());

    tokio::time::sleep(step).await;
    cache.add("Key 02".into(), "Value 02 Updated".into())?;
    log_entries("auto-expiry", cache.as_ref());
    info!("Key 03: {:?}", cache.retrieve(&"Key 03".to_string())?);

    // Long enough for every entry to go idle and be swept
    tokio::time::sleep(window * 3).await;
    log_entries("auto-expiry", cache.as_ref());

    Ok(())
}
