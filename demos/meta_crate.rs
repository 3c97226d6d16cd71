//! Example: Using the meta-crate with action words
//!
//! Run with: `cargo run --example meta_crate -- lock`
//!
//! Dispatches the action given on the command line (`lock`, `unlock` or
//! `status`) against a file in the system temp directory, the way a request
//! handler would.

use marker_lock::*;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let action: LockAction = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "status".to_string())
        .parse()?;

    let provider = MarkerLockProvider::builder()
        .max_wait(Duration::from_secs(1))
        .build()?;

    let resource = std::env::temp_dir().join("marker-lock-demo.txt");
    let reply = provider.perform(&resource, action).await?;
    println!("{action} {}: {}", resource.display(), serde_json::to_string(&reply)?);

    Ok(())
}
