//! Rules repository: read-only access to a user's saving rules.
//!
//! Rule writes happen in the separate CRUD layer; the pipeline only ever
//! reads. Results come back in insertion order so rule application is
//! stable across deliveries.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::rules;

/// Rules repository.
#[derive(Debug, Clone)]
pub struct RulesRepository {
    db: DatabaseConnection,
}

impl RulesRepository {
    /// Creates a new rules repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads all of a user's rules in insertion order.
    ///
    /// Inactive rules are included; the rule engine skips them. An empty
    /// result is normal for users with no rules configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn rules_for_user(&self, user_id: Uuid) -> Result<Vec<rules::Model>, DbErr> {
        rules::Entity::find()
            .filter(rules::Column::UserId.eq(user_id))
            .order_by_asc(rules::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
