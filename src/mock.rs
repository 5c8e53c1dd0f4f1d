//! # Mock Transport
//!
//! Utilities for testing fetchers and coordinators without a network.
//!
//! Create a [`MockTransport`], script how each key should respond with
//! [`MockTransport::expect`], hand [`MockTransport::shared`] to a fetcher, and
//! finish with [`MockTransport::verify`].
//!
//! ```ignore
//! let mock = MockTransport::<u32, User>::new();
//! mock.expect(1).return_ok(alice);
//! mock.expect(2).return_status(404);
//! mock.expect(3).with_delay(Duration::from_millis(20)).return_ok(carol);
//!
//! let coordinator = BatchFetchCoordinator::from_shared(mock.shared());
//! let users = coordinator.fetch_all(vec![1, 2, 3], FailurePolicy::CollectAll).await?;
//!
//! mock.verify(); // every scripted key was requested
//! ```
//!
//! Scripts are not consumed: asking for the same key twice yields the same
//! response, which models a stable backing store. Keys without a script answer
//! with a 404.

use crate::error::FetchError;
use crate::transport::Transport;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

// =============================================================================
// SCRIPTS
// =============================================================================

/// How the mock answers a request for one key.
#[derive(Debug, Clone)]
enum Reply<R> {
    Body(R),
    Status(u16),
    Unreachable(String),
    Malformed(String),
    Panic(String),
}

#[derive(Debug, Clone)]
struct Script<R> {
    delay: Option<Duration>,
    reply: Reply<R>,
}

/// The "raw response" a [`MockTransport`] hands to its own `decode`.
#[derive(Debug)]
pub enum MockResponse<R> {
    Body(R),
    Malformed(String),
}

struct MockState<R> {
    scripts: Mutex<HashMap<String, Script<R>>>,
    requested: Mutex<HashMap<String, usize>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

// =============================================================================
// MOCK TRANSPORT
// =============================================================================

/// A scripted, in-memory [`Transport`].
///
/// Clones share scripts and counters, so a test can keep one handle for
/// assertions while the fetcher owns another.
pub struct MockTransport<K, R> {
    state: Arc<MockState<R>>,
    _key: PhantomData<fn(K)>,
}

impl<K, R> Clone for MockTransport<K, R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            _key: PhantomData,
        }
    }
}

impl<K, R> Default for MockTransport<K, R>
where
    K: Display,
    R: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, R> MockTransport<K, R>
where
    K: Display,
    R: Clone,
{
    /// Creates a mock with no scripted keys.
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState {
                scripts: Mutex::new(HashMap::new()),
                requested: Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
            }),
            _key: PhantomData,
        }
    }

    /// A shared handle suitable for [`SingleResourceFetcher::from_shared`](crate::fetcher::SingleResourceFetcher::from_shared).
    pub fn shared(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    /// Script the response for `key`.
    pub fn expect(&self, key: K) -> ExpectationBuilder<R> {
        ExpectationBuilder {
            key: key.to_string(),
            delay: None,
            state: Arc::clone(&self.state),
        }
    }

    /// Number of remote calls started so far.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Number of remote calls that have run to completion (after any delay).
    pub fn completed(&self) -> usize {
        self.state.completed.load(Ordering::SeqCst)
    }

    /// Number of remote calls started for `key`.
    pub fn calls_for(&self, key: &K) -> usize {
        let requested = self.state.requested.lock().unwrap();
        requested.get(&key.to_string()).copied().unwrap_or(0)
    }

    /// Verifies that every scripted key was requested at least once.
    pub fn verify(&self) {
        let scripts = self.state.scripts.lock().unwrap();
        let requested = self.state.requested.lock().unwrap();
        let mut missing: Vec<&String> = scripts
            .keys()
            .filter(|key| !requested.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            missing.sort();
            panic!("Not all expectations were met. Never requested: {:?}", missing);
        }
    }
}

#[async_trait]
impl<K, R> Transport for MockTransport<K, R>
where
    K: Clone + Send + Sync + Display + Debug + 'static,
    R: Clone + Send + Sync + 'static,
{
    type Key = K;
    type Response = MockResponse<R>;
    type Resource = R;

    fn address(&self, key: &K) -> Result<String, FetchError> {
        Ok(key.to_string())
    }

    async fn perform_remote_call(&self, address: &str) -> Result<MockResponse<R>, FetchError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut requested = self.state.requested.lock().unwrap();
            *requested.entry(address.to_string()).or_insert(0) += 1;
        }
        let script = self.state.scripts.lock().unwrap().get(address).cloned();

        let Some(script) = script else {
            debug!(address, "No script, answering 404");
            self.state.completed.fetch_add(1, Ordering::SeqCst);
            return Err(FetchError::TransportFailure("HTTP error! status: 404".to_string()));
        };

        if let Some(delay) = script.delay {
            tokio::time::sleep(delay).await;
        }
        self.state.completed.fetch_add(1, Ordering::SeqCst);

        match script.reply {
            Reply::Body(resource) => Ok(MockResponse::Body(resource)),
            Reply::Malformed(reason) => Ok(MockResponse::Malformed(reason)),
            Reply::Status(status) => Err(FetchError::TransportFailure(format!(
                "HTTP error! status: {}",
                status
            ))),
            Reply::Unreachable(reason) => Err(FetchError::TransportFailure(reason)),
            Reply::Panic(message) => panic!("{}", message),
        }
    }

    async fn decode(&self, response: MockResponse<R>) -> Result<R, FetchError> {
        match response {
            MockResponse::Body(resource) => Ok(resource),
            MockResponse::Malformed(reason) => Err(FetchError::DecodeFailure(reason)),
        }
    }
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Builder returned by [`MockTransport::expect`].
pub struct ExpectationBuilder<R> {
    key: String,
    delay: Option<Duration>,
    state: Arc<MockState<R>>,
}

impl<R> ExpectationBuilder<R> {
    /// Hold the remote call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer with a successful response that decodes to `resource`.
    pub fn return_ok(self, resource: R) {
        self.push(Reply::Body(resource));
    }

    /// Answer with a non-success status.
    pub fn return_status(self, status: u16) {
        self.push(Reply::Status(status));
    }

    /// Fail the round trip itself (connection refused, DNS, ...).
    pub fn return_transport_error(self, reason: impl Into<String>) {
        self.push(Reply::Unreachable(reason.into()));
    }

    /// Answer successfully, but with a body that cannot be decoded.
    pub fn return_decode_error(self, reason: impl Into<String>) {
        self.push(Reply::Malformed(reason.into()));
    }

    /// Panic inside the remote call, as a buggy transport would.
    pub fn return_panic(self, message: impl Into<String>) {
        self.push(Reply::Panic(message.into()));
    }

    fn push(self, reply: Reply<R>) {
        let mut scripts = self.state.scripts.lock().unwrap();
        scripts.insert(
            self.key,
            Script {
                delay: self.delay,
                reply,
            },
        );
    }
}
