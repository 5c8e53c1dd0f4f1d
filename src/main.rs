//! # Batch Fetch Demo
//!
//! Fetches the keys given on the command line from `BATCH_FETCH_BASE_URL` and
//! logs what came back.
//!
//! ```bash
//! BATCH_FETCH_BASE_URL=https://jsonplaceholder.typicode.com \
//! BATCH_FETCH_RESOURCE_PATH=/users/{key} \
//! RUST_LOG=info cargo run -- 1 2 999 3
//! ```
//!
//! Set `BATCH_FETCH_POLICY=fail-fast` to watch key `999` sink the whole batch.

use batch_fetch::logging::setup_tracing;
use batch_fetch::{BatchFetchCoordinator, FetchConfig, HttpTransport};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = FetchConfig::from_env().map_err(|e| e.to_string())?;
    let keys: Vec<String> = std::env::args().skip(1).collect();
    info!(base_url = %config.base_url, policy = ?config.policy, keys = keys.len(), "Starting batch fetch");

    let transport =
        HttpTransport::<String, serde_json::Value>::new(&config).map_err(|e| e.to_string())?;
    let coordinator = BatchFetchCoordinator::new(transport).with_default_policy(config.policy);

    let span = tracing::info_span!("batch");
    let result = async { coordinator.fetch_batch(keys).await }
        .instrument(span)
        .await;

    match result {
        Ok(resources) => {
            info!(fetched = resources.len(), "Batch finished");
            for resource in &resources {
                info!(%resource, "Resource");
            }
        }
        Err(e) => {
            error!(error = %e, "Batch failed");
            return Err(e.to_string());
        }
    }

    Ok(())
}
