use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur when operating on a [`HandleTable`][crate::HandleTable].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Memory for the slot storage or for a slot payload could not be obtained.
    ///
    /// The table is left exactly as it was before the failed call.
    #[error("failed to allocate {what}")]
    AllocationFailed {
        /// What the memory was requested for.
        what: &'static str,

        /// The underlying reservation failure.
        #[source]
        source: TryReserveError,
    },

    /// The caller referenced a handle that is not currently allocated.
    ///
    /// Only the checked APIs return this. Their unchecked counterparts panic instead because
    /// continuing with a bad handle means the caller's own bookkeeping is already corrupt.
    #[error("invalid handle {handle}: {problem}")]
    InvalidHandle {
        /// The handle the caller supplied.
        handle: usize,

        /// A human-readable description of the problem.
        problem: &'static str,
    },
}

/// A specialized `Result` type for handle table operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
