#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Batch Fetch
//!
//! > **Fetch one resource, or many at once, without one bad key sinking the rest.**
//!
//! This crate fetches remote resources addressed by an opaque key, one at a time
//! or as a concurrent batch, and is explicit about what happens when some of
//! those lookups fail.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Failure is a value
//!
//! A single lookup returns an [`Outcome`]: `Present(resource)` or `Absent`. The
//! network error, the 404 or the malformed body never escape as an `Err`; they
//! are logged and folded into `Absent`. The type says failure is expected and
//! handled.
//!
//! ### Two join policies
//!
//! A batch spawns one task per key and joins them under a [`FailurePolicy`]:
//!
//! - **`CollectAll`** (default): wait for every task, return the present
//!   resources in input order. Never fails because of one key.
//! - **`FailFast`**: fail with [`BatchError::BatchAborted`] on the first absent
//!   key. The remaining tasks are detached, not cancelled. This reproduces a
//!   well-known defect and is kept only to be able to show it.
//!
//! ## 🗺️ Module Tour
//!
//! - [`transport`] - the [`Transport`] trait (address, round trip, decode) and
//!   the `reqwest`-backed [`HttpTransport`].
//! - [`fetcher`] - [`SingleResourceFetcher`], one key to one [`Outcome`].
//! - [`coordinator`] - [`BatchFetchCoordinator`], the fan-out and the joins.
//! - [`config`] - [`FetchConfig`], loadable from the environment.
//! - [`mock`] - [`MockTransport`](mock::MockTransport) for tests.
//! - [`logging`] - tracing setup.
//!
//! ## 🚀 Quick Start
//!
//! ```rust,no_run
//! use batch_fetch::{BatchFetchCoordinator, FailurePolicy, FetchConfig, HttpTransport};
//!
//! #[derive(Debug, serde::Deserialize)]
//! struct User { id: u64, name: String }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FetchConfig {
//!     base_url: "http://localhost:8080".into(),
//!     ..FetchConfig::default()
//! };
//! let transport = HttpTransport::<u64, User>::new(&config)?;
//! let coordinator = BatchFetchCoordinator::new(transport);
//!
//! let users = coordinator.fetch_all(vec![1, 2, 3], FailurePolicy::CollectAll).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! BATCH_FETCH_BASE_URL=http://localhost:8080 RUST_LOG=info cargo run -- 1 2 3
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod mock;
pub mod outcome;
pub mod transport;

pub use config::FetchConfig;
pub use coordinator::{BatchFetchCoordinator, FailurePolicy};
pub use error::{BatchError, ConfigError, FetchError};
pub use fetcher::SingleResourceFetcher;
pub use outcome::Outcome;
pub use transport::{HttpTransport, Transport};
