//! # Batch Fetch Coordinator
//!
//! Fans a batch of keys out to one [`SingleResourceFetcher`] task per key and
//! joins the results under a [`FailurePolicy`].
//!
//! ## Join Semantics
//!
//! - [`FailurePolicy::CollectAll`] is an "all settled" join: every task runs to
//!   completion, then the outcomes are filtered down to the present resources,
//!   in input order.
//! - [`FailurePolicy::FailFast`] is an "all or nothing" join: the first task to
//!   finish with [`Outcome::Absent`] aborts the batch with
//!   [`BatchError::BatchAborted`].
//!
//! ## Why FailFast is not the default
//!
//! A single bad key fails the whole batch even when every other key succeeded.
//! Worse, the sibling tasks are **not cancelled**: their handles are detached,
//! they keep running until their remote call resolves, and their results are
//! thrown away. Prefer `CollectAll` and treat `FailFast` as the anti-pattern it
//! reproduces.
//!
//! There is no concurrency limit. A batch of N keys puts N requests in flight.

use crate::error::BatchError;
use crate::fetcher::SingleResourceFetcher;
use crate::outcome::Outcome;
use crate::transport::Transport;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn, Instrument};

/// How a batch reacts to individual lookups coming back `Absent`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Wait for every lookup, keep the ones that succeeded.
    #[default]
    CollectAll,
    /// Abort on the first failed lookup without cancelling the rest.
    FailFast,
}

impl FromStr for FailurePolicy {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collect-all" | "collect_all" | "collectall" => Ok(FailurePolicy::CollectAll),
            "fail-fast" | "fail_fast" | "failfast" => Ok(FailurePolicy::FailFast),
            other => Err(crate::error::ConfigError::Invalid {
                field: "policy",
                reason: format!("unknown failure policy '{}'", other),
            }),
        }
    }
}

/// Fetches batches of resources concurrently.
pub struct BatchFetchCoordinator<T: Transport> {
    fetcher: SingleResourceFetcher<T>,
    default_policy: FailurePolicy,
}

impl<T: Transport> Clone for BatchFetchCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            default_policy: self.default_policy,
        }
    }
}

impl<T: Transport> BatchFetchCoordinator<T> {
    pub fn new(transport: T) -> Self {
        Self::from_fetcher(SingleResourceFetcher::new(transport))
    }

    pub fn from_shared(transport: Arc<T>) -> Self {
        Self::from_fetcher(SingleResourceFetcher::from_shared(transport))
    }

    pub fn from_fetcher(fetcher: SingleResourceFetcher<T>) -> Self {
        Self {
            fetcher,
            default_policy: FailurePolicy::default(),
        }
    }

    /// Set the policy used by [`BatchFetchCoordinator::fetch_batch`].
    pub fn with_default_policy(mut self, policy: FailurePolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn default_policy(&self) -> FailurePolicy {
        self.default_policy
    }

    /// Fetch a single key. Same contract as [`SingleResourceFetcher::fetch`].
    ///
    /// Runs on the caller's task, so a panicking transport unwinds into the
    /// caller here. Batch fetches spawn each key and report a panic as `Absent`.
    pub async fn fetch_one(&self, key: T::Key) -> Outcome<T::Resource> {
        self.fetcher.fetch(key).await
    }

    /// [`BatchFetchCoordinator::fetch_all`] with the configured default policy.
    pub async fn fetch_batch(&self, keys: Vec<T::Key>) -> Result<Vec<T::Resource>, BatchError> {
        self.fetch_all(keys, self.default_policy).await
    }

    /// Fetch every key concurrently and return the resources that came back.
    ///
    /// Under `CollectAll` this never fails and the result keeps input order.
    /// Under `FailFast` it fails with [`BatchError::BatchAborted`] as soon as any
    /// lookup comes back `Absent`.
    #[instrument(skip(self, keys), fields(batch_size = keys.len()))]
    pub async fn fetch_all(
        &self,
        keys: Vec<T::Key>,
        policy: FailurePolicy,
    ) -> Result<Vec<T::Resource>, BatchError> {
        if keys.is_empty() {
            debug!("Empty batch");
            return Ok(Vec::new());
        }

        match policy {
            FailurePolicy::CollectAll => Ok(self.collect_all(keys).await),
            FailurePolicy::FailFast => self.fail_fast(keys).await,
        }
    }

    /// Fetch every key concurrently and return one outcome per key, in input order.
    #[instrument(skip(self, keys), fields(batch_size = keys.len()))]
    pub async fn fetch_all_settled(&self, keys: Vec<T::Key>) -> Vec<(T::Key, Outcome<T::Resource>)> {
        if keys.is_empty() {
            return Vec::new();
        }

        let handles = self.spawn_all(&keys);
        let outcomes = join_all(handles.into_iter().map(settle)).await;
        keys.into_iter().zip(outcomes).collect()
    }

    async fn collect_all(&self, keys: Vec<T::Key>) -> Vec<T::Resource> {
        let requested = keys.len();
        let resources: Vec<T::Resource> = self
            .fetch_all_settled(keys)
            .await
            .into_iter()
            .filter_map(|(_, outcome)| outcome.into_option())
            .collect();
        info!(requested, fetched = resources.len(), "Batch settled");
        resources
    }

    async fn fail_fast(&self, keys: Vec<T::Key>) -> Result<Vec<T::Resource>, BatchError> {
        let handles = self.spawn_all(&keys);
        let mut pending: FuturesUnordered<_> = handles
            .into_iter()
            .enumerate()
            .map(|(index, handle)| async move { (index, settle(handle).await) })
            .collect();

        let mut slots: Vec<Option<T::Resource>> = keys.iter().map(|_| None).collect();
        while let Some((index, outcome)) = pending.next().await {
            match outcome {
                Outcome::Present(resource) => slots[index] = Some(resource),
                Outcome::Absent { diagnostic } => {
                    let key = keys[index].to_string();
                    let cause = diagnostic.unwrap_or_else(|| "resource unavailable".to_string());
                    // Dropping `pending` detaches the remaining handles; those
                    // tasks keep running and their results are discarded.
                    warn!(%key, %cause, in_flight = pending.len(), "Batch aborted");
                    return Err(BatchError::BatchAborted { key, cause });
                }
            }
        }

        info!(requested = keys.len(), "Batch complete");
        Ok(slots.into_iter().flatten().collect())
    }

    fn spawn_all(&self, keys: &[T::Key]) -> Vec<JoinHandle<Outcome<T::Resource>>> {
        keys.iter()
            .map(|key| {
                let fetcher = self.fetcher.clone();
                let key = key.clone();
                tokio::spawn(async move { fetcher.fetch(key).await }.in_current_span())
            })
            .collect()
    }
}

/// Await a fetch task, treating a panicked task as an absent resource.
async fn settle<R>(handle: JoinHandle<Outcome<R>>) -> Outcome<R> {
    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "Fetch task failed");
            Outcome::Absent {
                diagnostic: Some(format!("fetch task failed: {}", e)),
            }
        }
    }
}
