//! Error types for session operations.
//!
//! Authentication failures are not errors: an unknown, expired or empty token
//! makes [`SessionService::verify`](crate::SessionService::verify) return
//! `Ok(None)`. Everything in [`Error`] is a storage-side failure that the
//! caller should surface as a generic server error.

/// Errors raised by a [`SessionStore`](crate::SessionStore) or the service on top of it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The database rejected or failed a query.
    #[error("session store backend error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored timestamp is outside the range representable by `time`.
    #[error("stored session timestamp out of range: {0}")]
    Timestamp(#[from] time::error::ComponentRange),

    /// The configured TTL does not put expiry in the representable future.
    #[error("session ttl {0} does not yield a future expiry")]
    InvalidTtl(time::Duration),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
