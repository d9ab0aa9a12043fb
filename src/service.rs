use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::cookie::SessionCookies;
use crate::error::{Error, Result};
use crate::store::{NewSession, SessionStore, UserSummary};
use crate::token::{self, OsRandom, RandomSource, Sha256Hasher, Token, TokenHasher};

/// Issues, verifies and revokes session tokens.
///
/// The service keeps no session state of its own; the [`SessionStore`] is the
/// single source of truth and the service is cheap to clone.
///
/// # Examples
///
/// ```
/// use seaorm_session_auth::{MemoryStore, SessionConfig, SessionService, UserSummary};
///
/// # async fn example() -> seaorm_session_auth::Result<()> {
/// let store = MemoryStore::new();
/// store.insert_user(UserSummary {
///     id: "u1".into(),
///     email: "e@x.com".into(),
///     name: Some("N".into()),
/// });
///
/// let sessions = SessionService::new(store, SessionConfig::default());
/// let token = sessions.create("u1").await?;
///
/// let user = sessions.verify(token.as_str()).await?;
/// assert_eq!(user.map(|u| u.id).as_deref(), Some("u1"));
///
/// sessions.destroy(token.as_str()).await?;
/// assert!(sessions.verify(token.as_str()).await?.is_none());
/// # Ok(())
/// # }
/// ```
pub struct SessionService<S> {
    store: Arc<S>,
    config: SessionConfig,
    random: Arc<dyn RandomSource>,
    hasher: Arc<dyn TokenHasher>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for SessionService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            random: Arc::clone(&self.random),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: SessionStore> SessionService<S> {
    /// Creates a service using the OS random source, SHA-256 and the system clock.
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
            random: Arc::new(OsRandom),
            hasher: Arc::new(Sha256Hasher),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the random source tokens are drawn from.
    pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Arc::new(random);
        self
    }

    /// Replaces the digest used to derive storage keys.
    pub fn with_hasher(mut self, hasher: impl TokenHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    /// Replaces the wall clock used for expiry.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The settings this service was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cookie adapter for one request, bound to this service's cookie settings.
    ///
    /// `cookie_header` is the raw value of the request's `Cookie` header, if any.
    pub fn cookies(&self, cookie_header: Option<&str>) -> SessionCookies {
        SessionCookies::from_header(&self.config, cookie_header)
    }

    /// Issues a new session for `user_id` and returns its raw token.
    ///
    /// The user is not checked for existence. The returned token is the only
    /// copy of the secret; the store keeps its hash.
    ///
    /// Fails with [`Error::InvalidTtl`] before touching the store when the
    /// configured TTL is not positive or overflows the clock.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, user_id: &str) -> Result<Token> {
        let token = token::generate(self.random.as_ref());
        let token_hash = self.hasher.hash(token.as_str());
        let expires_at = self.expires_from_now()?;

        let record = self
            .store
            .insert(NewSession {
                user_id: user_id.to_string(),
                token_hash,
                expires_at,
            })
            .await?;

        debug!(session_id = record.id, %expires_at, "session created");
        Ok(token)
    }

    /// Resolves a presented token to the user owning it.
    ///
    /// Unknown, expired and empty tokens all yield `Ok(None)`; callers cannot
    /// tell them apart.
    #[tracing::instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> Result<Option<UserSummary>> {
        if token.is_empty() {
            return Ok(None);
        }

        let token_hash = self.hasher.hash(token);
        let Some((session, user)) = self.store.find_by_hash(&token_hash).await? else {
            debug!("no session for presented token");
            return Ok(None);
        };

        if session.is_expired_at(self.clock.now()) {
            debug!(session_id = session.id, "session expired");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Revokes the session carrying `token`. Empty or unknown tokens are a no-op.
    #[tracing::instrument(skip_all)]
    pub async fn destroy(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Ok(());
        }

        let removed = self.store.delete_by_hash(&self.hasher.hash(token)).await?;
        debug!(removed, "session destroyed");
        Ok(())
    }

    /// Revokes every session belonging to `user_id`.
    #[tracing::instrument(skip(self))]
    pub async fn destroy_all_for_user(&self, user_id: &str) -> Result<()> {
        let removed = self.store.delete_by_user(user_id).await?;
        debug!(removed, "user sessions destroyed");
        Ok(())
    }

    /// Session rotation for a fresh login: drops every prior session of the
    /// user, then issues a new one.
    #[tracing::instrument(skip(self))]
    pub async fn rotate(&self, user_id: &str) -> Result<Token> {
        // A TTL that cannot issue must not cost the user their sessions.
        self.expires_from_now()?;
        self.destroy_all_for_user(user_id).await?;
        let token = self.create(user_id).await?;
        info!("session rotated");
        Ok(token)
    }

    /// Deletes rows whose expiry has passed. Never scheduled by the crate.
    #[tracing::instrument(skip(self))]
    pub async fn purge_expired(&self) -> Result<u64> {
        let removed = self.store.delete_expired(self.clock.now()).await?;
        info!(removed, "expired sessions purged");
        Ok(removed)
    }

    fn expires_from_now(&self) -> Result<OffsetDateTime> {
        let now = self.clock.now();
        now.checked_add(self.config.ttl)
            .filter(|expires_at| *expires_at > now)
            .ok_or(Error::InvalidTtl(self.config.ttl))
    }
}
