//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Single lookups**: a `fetch{key=..}` span per key, `debug` on send and on
//!   success, `warn` with the diagnostic when the key comes back absent.
//! - **Batches**: a `fetch_all{batch_size=.. policy=..}` span, an `info` summary
//!   (`requested`, `fetched`) when the batch settles, `warn` when fail-fast aborts.
//!
//! ```bash
//! RUST_LOG=info cargo run -- 1 2 3          # batch summaries and failures
//! RUST_LOG=batch_fetch=debug cargo run -- 1 # every request and address
//! ```
//!
//! With `RUST_LOG=info` a batch where key 2 is missing looks like:
//!
//! ```text
//! WARN fetch_all:fetch_all_settled:fetch: Failed to fetch resource error="Transport failure: HTTP error! status: 404" key=2
//! INFO fetch_all: Batch settled requested=3 fetched=2 batch_size=3 policy=CollectAll
//! ```

/// Initializes the tracing subscriber. Call once, at program start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
