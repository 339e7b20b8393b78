//! Recommendation repository.
//!
//! Recommendations are an advisory, derived artifact: insert-only, never
//! updated, not idempotence-checked. The latest batch for a user is the
//! most recently created set of rows.

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use chrono::Utc;
use sprout_core::recommend::RecommendationDraft;

use crate::entities::recommendations;

/// Recommendation repository.
#[derive(Debug, Clone)]
pub struct RecommendationRepository {
    db: DatabaseConnection,
}

impl RecommendationRepository {
    /// Creates a new recommendation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores one generation cycle's drafts for a user.
    ///
    /// All rows in a batch share a creation timestamp so downstream reads
    /// can treat them as one set. An empty draft list stores nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn insert_batch(
        &self,
        user_id: Uuid,
        drafts: &[RecommendationDraft],
    ) -> Result<Vec<Uuid>, DbErr> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let created_at = Utc::now();
        let mut ids = Vec::with_capacity(drafts.len());

        let models: Vec<recommendations::ActiveModel> = drafts
            .iter()
            .map(|draft| {
                let id = Uuid::new_v4();
                ids.push(id);
                recommendations::ActiveModel {
                    id: Set(id),
                    user_id: Set(user_id),
                    title: Set(draft.title.clone()),
                    message: Set(draft.message.clone()),
                    category: Set(draft.category.clone()),
                    created_at: Set(created_at.into()),
                }
            })
            .collect();

        recommendations::Entity::insert_many(models)
            .exec(&self.db)
            .await?;

        Ok(ids)
    }

    /// Loads a user's most recent recommendations, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn latest_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<recommendations::Model>, DbErr> {
        recommendations::Entity::find()
            .filter(recommendations::Column::UserId.eq(user_id))
            .order_by_desc(recommendations::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }
}
