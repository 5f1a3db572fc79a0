use thiserror::Error;

use crate::BackendError;

/// Errors that can occur when loading frame sequences.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No decoder could be obtained from the decoder pool.
    #[error(transparent)]
    Pool(#[from] keyed_pool::Error),

    /// A call into the decode backend failed.
    #[error("decode backend failed during {operation}")]
    Backend {
        /// The backend operation that failed.
        operation: &'static str,

        /// The error reported by the backend.
        #[source]
        source: BackendError,
    },

    /// The layer description was rejected.
    #[error("invalid layer description: {problem}")]
    InvalidLayer {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// The output buffer layout could not be computed or did not match the request.
    #[error("invalid buffer layout: {problem}")]
    Layout {
        /// A human-readable description of the problem.
        problem: String,
    },
}

/// A specialized `Result` type for frame loading operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
