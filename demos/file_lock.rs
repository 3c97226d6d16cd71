//! Example: Locking a shared file through its marker
//!
//! Run with: `RUST_LOG=debug cargo run --example file_lock`

use marker_lock_core::prelude::*;
use marker_lock_file::MarkerLockProvider;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let resource = dir.path().join("inventory.csv");
    std::fs::write(&resource, "sku,count\n")?;

    let provider = MarkerLockProvider::builder()
        .stale_after(Duration::from_secs(60))
        .max_wait(Duration::from_secs(2))
        .build()?;

    let lock = provider.create_lock(&resource)?;
    println!("Marker for {}: {}", lock.name(), lock.marker_path().display());

    let outcome = lock.acquire(None).await;
    println!("Acquire: {}", serde_json::to_string(&outcome)?);

    // A second caller gives up after its own wait budget.
    let competitor = provider.create_lock(&resource)?;
    let outcome = competitor.acquire(Some(Duration::from_millis(300))).await;
    println!("Competing acquire: {}", serde_json::to_string(&outcome)?);
    println!("Status: {}", serde_json::to_string(&lock.status())?);

    let released = lock.release().await;
    println!("Release: {}", serde_json::to_string(&released)?);

    // Releasing twice is reported, not raised.
    let released = lock.release().await;
    println!("Release again: {}", serde_json::to_string(&released)?);

    Ok(())
}
