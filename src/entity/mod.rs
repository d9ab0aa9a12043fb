//! Database entity models for seaorm-session-auth.
//!
//! These Sea-ORM entities back [`SeaOrmStore`](crate::SeaOrmStore). The
//! `session` entity belongs to the `user` entity; verification joins the two
//! to project the owning user's summary.

/// Issued sessions, keyed by token hash.
pub mod session;

/// The subset of the user table that session verification reads.
pub mod user;
