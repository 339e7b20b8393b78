//! Ledger repository: the store side of the transaction processing pipeline.
//!
//! Owns the composite write that records a transaction and applies its
//! saving actions. All dependent writes (transaction row, ledger entries,
//! user total, goal progress) happen inside one database transaction, and
//! the whole operation is idempotent on the caller-supplied dedup token:
//! redelivering the same transaction returns the already-recorded state
//! instead of double-counting.

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use chrono::Utc;
use sprout_core::rules::SavingAction;

use crate::entities::{goal_progress, goals, savings_ledger, transactions, users};

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Transaction not found for a dedup token that should exist.
    #[error("Transaction not found for dedup token: {0}")]
    TransactionNotFound(String),

    /// A saving action carried a non-positive amount.
    #[error("Saving action amount must be positive, got {0}")]
    InvalidSavingAmount(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Owning user ID.
    pub user_id: Uuid,
    /// Transaction amount.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Merchant name.
    pub merchant: String,
    /// Raw category text as delivered.
    pub category_raw: String,
    /// Normalized category (storage form).
    pub category_normalized: String,
    /// When the transaction occurred.
    pub occurred_at: DateTimeWithTimeZone,
    /// Originating system.
    pub source: String,
    /// Caller-supplied idempotence key.
    pub dedup_token: String,
}

/// Allocation of a transaction's savings to a goal.
#[derive(Debug, Clone)]
pub struct GoalAllocation {
    /// Goal that received the savings.
    pub goal_id: Uuid,
    /// Amount added to the goal.
    pub amount_added: Decimal,
    /// Goal progress after the allocation.
    pub current_amount: Decimal,
}

/// Outcome of the composite record operation.
#[derive(Debug, Clone)]
pub struct RecordedTransaction {
    /// Stored transaction ID.
    pub transaction_id: Uuid,
    /// IDs of the savings ledger entries written for this transaction.
    pub ledger_entry_ids: Vec<Uuid>,
    /// User's total saved after the operation.
    pub user_total: Decimal,
    /// Goal allocation performed, if the user had an active goal and
    /// anything was saved.
    pub goal: Option<GoalAllocation>,
    /// True when this delivery was a duplicate and the previously
    /// recorded state was returned instead of writing anything.
    pub deduplicated: bool,
}

/// Ledger repository owning all pipeline state.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a transaction and applies its saving actions atomically.
    ///
    /// Idempotent on `input.dedup_token`: a redelivery of an already
    /// recorded transaction performs no writes and returns the stored
    /// state with `deduplicated: true`. Either every write (transaction,
    /// ledger entries, user total, goal progress) becomes visible
    /// together, or none do.
    ///
    /// # Errors
    ///
    /// Returns an error if a saving action is non-positive, the user does
    /// not exist, or the database fails; in every case no partial state
    /// is left behind.
    pub async fn record_transaction(
        &self,
        input: NewTransaction,
        actions: &[SavingAction],
    ) -> Result<RecordedTransaction, LedgerError> {
        // Fast path: the token has been recorded before.
        if let Some(existing) = self.find_by_dedup_token(&input.dedup_token).await? {
            debug!(
                dedup_token = %input.dedup_token,
                transaction_id = %existing.id,
                "dedup token already recorded, returning stored state"
            );
            return self.load_recorded(existing).await;
        }

        let txn = self.db.begin().await?;

        let transaction = match self.insert_transaction(&txn, &input).await {
            Ok(model) => model,
            // Lost the race against a concurrent delivery of the same
            // token; the winner's state is the result.
            Err(err) if is_unique_violation(&err) => {
                txn.rollback().await?;
                let existing = self
                    .find_by_dedup_token(&input.dedup_token)
                    .await?
                    .ok_or_else(|| LedgerError::TransactionNotFound(input.dedup_token.clone()))?;
                return self.load_recorded(existing).await;
            }
            Err(err) => return Err(err.into()),
        };

        let ledger_entry_ids = self.insert_ledger_entries(&txn, &transaction, actions).await?;

        let total_saved: Decimal = actions.iter().map(|a| a.amount).sum();

        let goal = if total_saved > Decimal::ZERO {
            self.increment_user_total(&txn, input.user_id, total_saved)
                .await?;
            self.allocate_to_goal(&txn, input.user_id, transaction.id, total_saved)
                .await?
        } else {
            None
        };

        let user_total = users::Entity::find_by_id(input.user_id)
            .one(&txn)
            .await?
            .ok_or(LedgerError::UserNotFound(input.user_id))?
            .total_saved;

        txn.commit().await?;

        Ok(RecordedTransaction {
            transaction_id: transaction.id,
            ledger_entry_ids,
            user_total,
            goal,
            deduplicated: false,
        })
    }

    /// Loads a user's transactions since the given instant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn transactions_since(
        &self,
        user_id: Uuid,
        since: DateTimeWithTimeZone,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::OccurredAt.gte(since))
            .order_by_desc(transactions::Column::OccurredAt)
            .all(&self.db)
            .await?;
        Ok(models)
    }

    /// Returns a user's running total saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the query fails.
    pub async fn user_total(&self, user_id: Uuid) -> Result<Decimal, LedgerError> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::UserNotFound(user_id))?;
        Ok(user.total_saved)
    }

    /// Looks up a transaction by its dedup token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_dedup_token(
        &self,
        dedup_token: &str,
    ) -> Result<Option<transactions::Model>, LedgerError> {
        let model = transactions::Entity::find()
            .filter(transactions::Column::DedupToken.eq(dedup_token))
            .one(&self.db)
            .await?;
        Ok(model)
    }

    /// Inserts the transaction row.
    async fn insert_transaction(
        &self,
        txn: &DatabaseTransaction,
        input: &NewTransaction,
    ) -> Result<transactions::Model, DbErr> {
        let transaction = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            amount: Set(input.amount),
            currency: Set(input.currency.clone()),
            merchant: Set(input.merchant.clone()),
            category_raw: Set(input.category_raw.clone()),
            category_normalized: Set(input.category_normalized.clone()),
            occurred_at: Set(input.occurred_at),
            source: Set(input.source.clone()),
            dedup_token: Set(input.dedup_token.clone()),
            created_at: Set(Utc::now().into()),
        };

        transaction.insert(txn).await
    }

    /// Inserts one ledger entry per saving action.
    async fn insert_ledger_entries(
        &self,
        txn: &DatabaseTransaction,
        transaction: &transactions::Model,
        actions: &[SavingAction],
    ) -> Result<Vec<Uuid>, LedgerError> {
        let mut ids = Vec::with_capacity(actions.len());

        for action in actions {
            if action.amount <= Decimal::ZERO {
                return Err(LedgerError::InvalidSavingAmount(action.amount));
            }

            let entry_id = Uuid::new_v4();
            let entry = savings_ledger::ActiveModel {
                id: Set(entry_id),
                user_id: Set(transaction.user_id),
                transaction_id: Set(transaction.id),
                rule_name: Set(action.rule_name.clone()),
                amount: Set(action.amount),
                created_at: Set(Utc::now().into()),
            };
            entry.insert(txn).await?;
            ids.push(entry_id);
        }

        Ok(ids)
    }

    /// Increments the user's running total in the store.
    ///
    /// The increment runs store-side so concurrent transactions for the
    /// same user commute instead of losing updates.
    async fn increment_user_total(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::TotalSaved,
                Expr::col(users::Column::TotalSaved).add(amount),
            )
            .col_expr(
                users::Column::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(LedgerError::UserNotFound(user_id));
        }
        Ok(())
    }

    /// Allocates the saved amount to the user's most recently created
    /// active goal, if any.
    async fn allocate_to_goal(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        transaction_id: Uuid,
        amount: Decimal,
    ) -> Result<Option<GoalAllocation>, LedgerError> {
        let Some(goal) = goals::Entity::find()
            .filter(goals::Column::UserId.eq(user_id))
            .filter(goals::Column::IsActive.eq(true))
            .order_by_desc(goals::Column::CreatedAt)
            .one(txn)
            .await?
        else {
            return Ok(None);
        };

        goals::Entity::update_many()
            .col_expr(
                goals::Column::CurrentAmount,
                Expr::col(goals::Column::CurrentAmount).add(amount),
            )
            .filter(goals::Column::Id.eq(goal.id))
            .exec(txn)
            .await?;

        let progress = goal_progress::ActiveModel {
            id: Set(Uuid::new_v4()),
            goal_id: Set(goal.id),
            transaction_id: Set(transaction_id),
            amount_added: Set(amount),
            created_at: Set(Utc::now().into()),
        };
        progress.insert(txn).await?;

        Ok(Some(GoalAllocation {
            goal_id: goal.id,
            amount_added: amount,
            current_amount: goal.current_amount + amount,
        }))
    }

    /// Reconstructs the recorded outcome for an already-stored transaction.
    async fn load_recorded(
        &self,
        transaction: transactions::Model,
    ) -> Result<RecordedTransaction, LedgerError> {
        let ledger_entry_ids = savings_ledger::Entity::find()
            .filter(savings_ledger::Column::TransactionId.eq(transaction.id))
            .order_by_asc(savings_ledger::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|entry| entry.id)
            .collect();

        let user_total = self.user_total(transaction.user_id).await?;

        let goal = match goal_progress::Entity::find()
            .filter(goal_progress::Column::TransactionId.eq(transaction.id))
            .one(&self.db)
            .await?
        {
            Some(progress) => {
                let goal = goals::Entity::find_by_id(progress.goal_id)
                    .one(&self.db)
                    .await?;
                goal.map(|g| GoalAllocation {
                    goal_id: g.id,
                    amount_added: progress.amount_added,
                    current_amount: g.current_amount,
                })
            }
            None => None,
        };

        Ok(RecordedTransaction {
            transaction_id: transaction.id,
            ledger_entry_ids,
            user_total,
            goal,
            deduplicated: true,
        })
    }
}

/// Whether a database error is a unique-constraint violation.
fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
