use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::Result;
use crate::store::{NewSession, SessionRecord, SessionStore, UserSummary};
use crate::token::TokenHash;

/// In-process [`SessionStore`] for tests and single-process embedding.
///
/// Unlike the database store it does not enforce hash uniqueness, so several
/// rows may share a hash and deletions remove all of them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    sessions: Vec<SessionRecord>,
    users: HashMap<String, UserSummary>,
}

impl MemoryStore {
    /// An empty store with no users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a user visible to the session join.
    pub fn insert_user(&self, user: UserSummary) {
        self.lock().users.insert(user.id.clone(), user);
    }

    /// Removes a user; their sessions stay but no longer verify.
    pub fn remove_user(&self, user_id: &str) {
        self.lock().users.remove(user_id);
    }

    /// Number of stored session rows, expired ones included.
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Snapshot of every stored session row.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.lock().sessions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn delete_where(&self, matches: impl Fn(&SessionRecord) -> bool) -> u64 {
        let mut inner = self.lock();
        let before = inner.sessions.len();
        inner.sessions.retain(|session| !matches(session));
        (before - inner.sessions.len()) as u64
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, session: NewSession) -> Result<SessionRecord> {
        let now = OffsetDateTime::now_utc();
        let mut inner = self.lock();
        inner.next_id += 1;

        let record = SessionRecord {
            id: inner.next_id,
            user_id: session.user_id,
            token_hash: session.token_hash,
            expires_at: session.expires_at,
            created_at: now,
            updated_at: now,
        };
        inner.sessions.push(record.clone());

        Ok(record)
    }

    async fn find_by_hash(&self, hash: &TokenHash) -> Result<Option<(SessionRecord, UserSummary)>> {
        let inner = self.lock();
        let found = inner
            .sessions
            .iter()
            .find(|session| &session.token_hash == hash)
            .and_then(|session| {
                inner
                    .users
                    .get(&session.user_id)
                    .map(|user| (session.clone(), user.clone()))
            });

        Ok(found)
    }

    async fn delete_by_hash(&self, hash: &TokenHash) -> Result<u64> {
        Ok(self.delete_where(|session| &session.token_hash == hash))
    }

    async fn delete_by_user(&self, user_id: &str) -> Result<u64> {
        Ok(self.delete_where(|session| session.user_id == user_id))
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64> {
        Ok(self.delete_where(|session| session.is_expired_at(now)))
    }
}
