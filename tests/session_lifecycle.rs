//! End-to-end session lifecycle against the Sea-ORM store on in-memory SQLite.

use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use seaorm_session_auth::entity::{session, user};
use seaorm_session_auth::migration::{Migrator, MigratorTrait};
use seaorm_session_auth::{
    CookieTransport, SeaOrmStore, SessionConfig, SessionService, Sha256Hasher, TokenHasher,
    UserSummary,
};
use time::{Duration, OffsetDateTime};

async fn setup() -> SessionService<SeaOrmStore> {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&conn, None).await.unwrap();
    add_user(&conn, "u1", "e@x.com", Some("N")).await;
    add_user(&conn, "u2", "other@x.com", None).await;

    SessionService::new(SeaOrmStore::new(conn), SessionConfig::default())
}

async fn add_user(conn: &DatabaseConnection, id: &str, email: &str, name: Option<&str>) {
    user::ActiveModel {
        id: Set(id.to_string()),
        email: Set(email.to_string()),
        name: Set(name.map(str::to_string)),
        ..Default::default()
    }
    .insert(conn)
    .await
    .unwrap();
}

fn u1() -> UserSummary {
    UserSummary {
        id: "u1".to_string(),
        email: "e@x.com".to_string(),
        name: Some("N".to_string()),
    }
}

#[tokio::test]
async fn create_verify_destroy_scenario() {
    let sessions = setup().await;

    let t1 = sessions.create("u1").await.unwrap();
    assert_eq!(sessions.verify(t1.as_str()).await.unwrap(), Some(u1()));

    sessions.destroy(t1.as_str()).await.unwrap();
    assert_eq!(sessions.verify(t1.as_str()).await.unwrap(), None);

    let t2 = sessions.create("u1").await.unwrap();
    let t3 = sessions.create("u1").await.unwrap();
    assert_ne!(t2, t3);
    assert_eq!(sessions.verify(t2.as_str()).await.unwrap(), Some(u1()));
    assert_eq!(sessions.verify(t3.as_str()).await.unwrap(), Some(u1()));

    sessions.destroy(t2.as_str()).await.unwrap();
    assert_eq!(sessions.verify(t2.as_str()).await.unwrap(), None);
    assert_eq!(sessions.verify(t3.as_str()).await.unwrap(), Some(u1()));
}

#[tokio::test]
async fn raw_token_is_not_persisted() {
    let sessions = setup().await;
    let token = sessions.create("u1").await.unwrap();

    let rows = session::Entity::find()
        .all(sessions.store().connection())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_ne!(rows[0].token_hash, token.as_str());
    assert_eq!(rows[0].token_hash, Sha256Hasher.hash(token.as_str()).as_str());
    assert_eq!(rows[0].token_hash.len(), 64);
}

#[tokio::test]
async fn never_issued_token_is_absent() {
    let sessions = setup().await;
    sessions.create("u1").await.unwrap();

    let forged = "0".repeat(64);
    assert_eq!(sessions.verify(&forged).await.unwrap(), None);
    assert_eq!(sessions.verify("").await.unwrap(), None);
}

#[tokio::test]
async fn expired_row_is_absent_but_remains_stored() {
    let sessions = setup().await;
    let token = sessions.create("u1").await.unwrap();
    let conn = sessions.store().connection();

    let row = session::Entity::find().one(conn).await.unwrap().unwrap();
    let past = OffsetDateTime::now_utc() - Duration::minutes(1);
    let mut active: session::ActiveModel = row.into();
    active.expires_at = Set(
        chrono::DateTime::from_timestamp(past.unix_timestamp(), 0)
            .unwrap()
            .into(),
    );
    active.update(conn).await.unwrap();

    assert_eq!(sessions.verify(token.as_str()).await.unwrap(), None);
    assert_eq!(session::Entity::find().all(conn).await.unwrap().len(), 1);

    assert_eq!(sessions.purge_expired().await.unwrap(), 1);
    assert!(session::Entity::find().all(conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn destroy_all_for_user_invalidates_every_token() {
    let sessions = setup().await;
    let tokens = [
        sessions.create("u1").await.unwrap(),
        sessions.create("u1").await.unwrap(),
        sessions.create("u1").await.unwrap(),
    ];
    let other = sessions.create("u2").await.unwrap();

    sessions.destroy_all_for_user("u1").await.unwrap();

    for token in &tokens {
        assert_eq!(sessions.verify(token.as_str()).await.unwrap(), None);
    }
    assert!(sessions.verify(other.as_str()).await.unwrap().is_some());

    // Nothing left to delete is not an error.
    sessions.destroy_all_for_user("u1").await.unwrap();
}

#[tokio::test]
async fn login_rotation_through_cookies() {
    let sessions = setup().await;
    let stale = sessions.create("u1").await.unwrap();

    let token = sessions.rotate("u1").await.unwrap();
    let mut response = sessions.cookies(None);
    response.set(&token);
    let header = response.set_cookie_headers().remove(0);

    // The browser echoes back only the name=value pair.
    let pair = header.split(';').next().unwrap().to_string();
    let request = sessions.cookies(Some(&pair));
    let presented = request.get().unwrap();

    assert_eq!(sessions.verify(presented.as_str()).await.unwrap(), Some(u1()));
    assert_eq!(sessions.verify(stale.as_str()).await.unwrap(), None);
}

#[tokio::test]
async fn deleting_user_cascades_to_sessions() {
    let sessions = setup().await;
    let token = sessions.create("u2").await.unwrap();
    let conn = sessions.store().connection();

    user::Entity::delete_by_id("u2".to_string())
        .exec(conn)
        .await
        .unwrap();

    assert_eq!(sessions.verify(token.as_str()).await.unwrap(), None);
}
