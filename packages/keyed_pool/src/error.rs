use thiserror::Error;

use crate::PoolKey;

/// Boxed error produced by a resource constructor.
pub type ConstructorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when acquiring a resource from a keyed pool.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The pool was configured with zero slots, so it can never hold a resource.
    #[error("the pool has zero capacity and cannot hold any resources")]
    ZeroCapacity,

    /// The constructor failed to create a resource for the requested key.
    ///
    /// If a resource was evicted to make room for the new one, its slot is left empty.
    /// Nothing else in the pool changes.
    #[error("failed to construct a resource for key {key}")]
    Construction {
        /// The key the resource was being constructed for.
        key: PoolKey,

        /// The error reported by the constructor.
        #[source]
        source: ConstructorError,
    },
}

impl Error {
    /// The key whose resource could not be constructed, if this is a construction failure.
    #[must_use]
    pub fn key(&self) -> Option<PoolKey> {
        match self {
            Self::ZeroCapacity => None,
            Self::Construction { key, .. } => Some(*key),
        }
    }
}

/// A specialized `Result` type for keyed pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
