//! The persistence contract consumed by [`SessionService`](crate::SessionService).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Result;
use crate::token::TokenHash;

/// Public projection of the user owning a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

/// Fields supplied by the service when a session is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub user_id: String,
    pub token_hash: TokenHash,
    pub expires_at: OffsetDateTime,
}

/// A persisted session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Store-assigned identifier.
    pub id: i32,
    pub user_id: String,
    pub token_hash: TokenHash,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SessionRecord {
    /// Expiry is strict: a session is dead at the instant it reaches `expires_at`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// Storage backend for session rows.
///
/// Deletions are "delete every match": a hash or user may map to zero or
/// more rows and none of these methods fail on zero.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new session and returns the stored row.
    async fn insert(&self, session: NewSession) -> Result<SessionRecord>;

    /// Looks up a session by hash together with its owning user.
    ///
    /// Returns `None` when no row matches or the owning user no longer
    /// exists. Expired rows are returned; the caller decides validity.
    async fn find_by_hash(&self, hash: &TokenHash) -> Result<Option<(SessionRecord, UserSummary)>>;

    /// Deletes every session with the given hash, returning the count.
    async fn delete_by_hash(&self, hash: &TokenHash) -> Result<u64>;

    /// Deletes every session owned by `user_id`, returning the count.
    async fn delete_by_user(&self, user_id: &str) -> Result<u64>;

    /// Deletes every session with `expires_at <= now`, returning the count.
    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64>;
}
