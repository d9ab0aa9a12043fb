//! Session entity model for Sea-ORM database interaction.
//!
//! Maps to the `sessions` table. A row holds the SHA-256 hash of a token,
//! never the token itself.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};

/// Sea-ORM entity model representing one issued session.
///
/// # Database Schema
///
/// | Column     | Type                  | Description                            |
/// |------------|-----------------------|----------------------------------------|
/// | id         | INTEGER (Primary Key) | Store-assigned identifier              |
/// | user_id    | TEXT                  | Owning user, references `users.id`     |
/// | token_hash | TEXT (Unique)         | Hex SHA-256 of the bearer token        |
/// | expires_at | TIMESTAMPTZ           | Absolute expiry, fixed at creation     |
/// | created_at | TIMESTAMPTZ           | Set on insert                          |
/// | updated_at | TIMESTAMPTZ           | Set on every save                      |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text", indexed)]
    pub user_id: String,

    /// Lookup key for verification and deletion.
    #[sea_orm(column_type = "Text", unique)]
    pub token_hash: String,

    pub expires_at: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

/// Fills the bookkeeping timestamps so callers never set them.
#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        if insert {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
