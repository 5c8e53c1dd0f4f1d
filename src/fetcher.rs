//! # Single Resource Fetcher
//!
//! One key in, one [`Outcome`] out. Whatever goes wrong on the way (the
//! connection, the status, the body) is logged and folded into
//! [`Outcome::Absent`], so nothing above this layer has to handle an error for
//! a single lookup.

use crate::error::FetchError;
use crate::outcome::Outcome;
use crate::transport::Transport;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Performs one remote lookup per call.
///
/// Holds the transport behind an `Arc`, so clones are cheap and can be moved
/// into spawned tasks.
pub struct SingleResourceFetcher<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> Clone for SingleResourceFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> SingleResourceFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Fetch one resource. Never fails; a failure becomes `Absent`.
    #[instrument(skip(self))]
    pub async fn fetch(&self, key: T::Key) -> Outcome<T::Resource> {
        let outcome: Outcome<T::Resource> = self.try_fetch(&key).await.into();
        match &outcome {
            Outcome::Present(_) => debug!("Fetched"),
            Outcome::Absent { diagnostic } => {
                warn!(error = diagnostic.as_deref().unwrap_or("unknown"), "Failed to fetch resource");
            }
        }
        outcome
    }

    async fn try_fetch(&self, key: &T::Key) -> Result<T::Resource, FetchError> {
        let address = self.transport.address(key)?;
        debug!(%address, "Sending request");
        let response = self.transport.perform_remote_call(&address).await?;
        self.transport.decode(response).await
    }
}
