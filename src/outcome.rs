//! Per-key result of a single lookup.

use crate::error::FetchError;

/// The result of fetching one key.
///
/// Failure is an expected state here, not an exceptional one: a lookup either
/// produced a resource or it did not. The diagnostic carried by `Absent` exists
/// for logging and is never used to make decisions.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R> {
    Present(R),
    Absent { diagnostic: Option<String> },
}

impl<R> Outcome<R> {
    pub fn is_present(&self) -> bool {
        matches!(self, Outcome::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        !self.is_present()
    }

    /// Borrow the diagnostic, if this is an `Absent` that carries one.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Outcome::Absent { diagnostic } => diagnostic.as_deref(),
            Outcome::Present(_) => None,
        }
    }

    /// Drop the diagnostic and keep only the resource.
    pub fn into_option(self) -> Option<R> {
        match self {
            Outcome::Present(resource) => Some(resource),
            Outcome::Absent { .. } => None,
        }
    }
}

impl<R> From<Result<R, FetchError>> for Outcome<R> {
    fn from(result: Result<R, FetchError>) -> Self {
        match result {
            Ok(resource) => Outcome::Present(resource),
            Err(e) => Outcome::Absent {
                diagnostic: Some(e.to_string()),
            },
        }
    }
}
