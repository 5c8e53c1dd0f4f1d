//! # Transport Boundary
//!
//! The fetcher never talks to the network directly. It goes through a
//! [`Transport`], which owns three things:
//!
//! - the **address scheme** (how a key becomes something to call),
//! - the **round trip** ([`Transport::perform_remote_call`]),
//! - the **decoding** of the raw response ([`Transport::decode`]).
//!
//! Both async operations may fail with a [`FetchError`]; turning those failures
//! into an [`Outcome`](crate::outcome::Outcome) is the fetcher's job, not the
//! transport's.
//!
//! ## Implementations
//!
//! - [`HttpTransport`] - HTTP GET + JSON body, backed by `reqwest`.
//! - [`MockTransport`](crate::mock::MockTransport) - scripted responses for tests.

pub mod http;

pub use http::HttpTransport;

use crate::error::FetchError;
use async_trait::async_trait;
use std::fmt::{Debug, Display};

/// The collaborator that performs one network round trip and decodes it.
///
/// Associated types keep a transport's key, raw response and decoded resource
/// tied together, so a coordinator built over an `HttpTransport<User>` can only
/// ever hand back `User`s.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Identifies one remote resource (e.g. `u64`, `String`).
    type Key: Clone + Send + Sync + Display + Debug + 'static;

    /// Whatever the round trip yields before decoding.
    type Response: Send + 'static;

    /// The decoded payload handed back to callers.
    type Resource: Send + 'static;

    /// Map a key to the address passed to [`Transport::perform_remote_call`].
    ///
    /// Fails when the key cannot name exactly one resource under this scheme.
    fn address(&self, key: &Self::Key) -> Result<String, FetchError>;

    /// Perform exactly one remote call. Non-success statuses are failures.
    async fn perform_remote_call(&self, address: &str) -> Result<Self::Response, FetchError>;

    /// Interpret a successful response as a resource.
    async fn decode(&self, response: Self::Response) -> Result<Self::Resource, FetchError>;
}
