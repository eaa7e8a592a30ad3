//! Error types for roar-index.

use thiserror::Error;

use crate::interner::Namespace;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the index.
///
/// Reads other than [`get`](crate::RoarIndex::get) never fail: a missing key or
/// value simply answers `false` or is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The key was never pushed, or was deleted since.
    #[error("key not found")]
    KeyNotFound,

    /// Every 32-bit identifier of a namespace has been handed out.
    #[error("{namespace} identifier space exhausted")]
    IdSpaceExhausted {
        /// Namespace that ran out of identifiers
        namespace: Namespace,
    },
}
