//! The event processor itself.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::{debug, info};
use uuid::Uuid;

use sprout_core::category::Category;
use sprout_core::recommend::{self, SpendingWindow};
use sprout_core::rules::{self, RuleConfig};
use sprout_db::{
    LedgerRepository, NewTransaction, RecommendationRepository, RulesRepository,
};

use crate::cache::RulesCache;
use crate::error::ProcessError;
use crate::event::TransactionEvent;

/// Summary of one successfully processed delivery.
#[derive(Debug, Clone)]
pub struct ProcessedEvent {
    /// Stored transaction ID.
    pub transaction_id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// True when the delivery was a duplicate of an already-processed
    /// event and no state changed.
    pub deduplicated: bool,
    /// Number of ledger entries recorded for this transaction.
    pub ledger_entries: usize,
    /// User's total saved after processing.
    pub user_total: Decimal,
    /// Number of recommendations stored in this cycle.
    pub recommendations: usize,
}

/// Processes delivered transaction events, one call per delivery.
///
/// Each invocation runs the full pipeline to completion or failure. The
/// processor holds no per-event state, so concurrent deliveries of
/// different events may run in parallel; duplicate deliveries of the
/// same event are collapsed by the ledger store's dedup token.
#[derive(Clone)]
pub struct EventProcessor {
    ledger: LedgerRepository,
    rules: RulesRepository,
    recommendations: RecommendationRepository,
    cache: RulesCache,
}

impl EventProcessor {
    /// Creates a processor over the given connection pool and rules cache.
    #[must_use]
    pub fn new(db: DatabaseConnection, cache: RulesCache) -> Self {
        Self {
            ledger: LedgerRepository::new(db.clone()),
            rules: RulesRepository::new(db.clone()),
            recommendations: RecommendationRepository::new(db),
            cache,
        }
    }

    /// Runs the pipeline for one delivered payload.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::Malformed` for payloads that can never be
    /// processed (the adapter acknowledges those), and a retryable error
    /// for any store failure (the adapter withholds acknowledgement so
    /// the transport redelivers).
    pub async fn process(&self, payload: &[u8]) -> Result<ProcessedEvent, ProcessError> {
        let event = TransactionEvent::decode(payload)?;

        let rule_set = self.active_rules(event.user_id).await?;
        let actions = rules::apply(event.amount, &rule_set);

        let recorded = self
            .ledger
            .record_transaction(
                NewTransaction {
                    user_id: event.user_id,
                    amount: event.amount,
                    currency: event.currency.clone(),
                    merchant: event.merchant.clone(),
                    category_raw: event.category.clone(),
                    category_normalized: Category::normalize(&event.category)
                        .as_str()
                        .to_string(),
                    occurred_at: event.occurred_at().into(),
                    source: event.source.clone(),
                    dedup_token: event.dedup_token.clone(),
                },
                &actions,
            )
            .await?;

        if recorded.deduplicated {
            debug!(
                user_id = %event.user_id,
                dedup_token = %event.dedup_token,
                "duplicate delivery collapsed to stored state"
            );
        }

        let window_start = recommend::window_start(Utc::now());
        let window_transactions = self
            .ledger
            .transactions_since(event.user_id, window_start.into())
            .await?;
        let window = SpendingWindow::from_amounts(
            window_transactions
                .iter()
                .map(|t| (t.category_normalized.parse().unwrap_or(Category::Other), t.amount)),
        );

        let drafts = recommend::generate(&window);
        let recommendation_ids = self
            .recommendations
            .insert_batch(event.user_id, &drafts)
            .await
            .map_err(ProcessError::StoreRecommendations)?;

        info!(
            user_id = %event.user_id,
            transaction_id = %recorded.transaction_id,
            dedup_token = %event.dedup_token,
            deduplicated = recorded.deduplicated,
            ledger_entries = recorded.ledger_entry_ids.len(),
            user_total = %recorded.user_total,
            recommendations = recommendation_ids.len(),
            "processed transaction event"
        );

        Ok(ProcessedEvent {
            transaction_id: recorded.transaction_id,
            user_id: event.user_id,
            deduplicated: recorded.deduplicated,
            ledger_entries: recorded.ledger_entry_ids.len(),
            user_total: recorded.user_total,
            recommendations: recommendation_ids.len(),
        })
    }

    /// Loads a user's rule set, preferring the cache.
    async fn active_rules(&self, user_id: Uuid) -> Result<Arc<Vec<RuleConfig>>, ProcessError> {
        if let Some(cached) = self.cache.get(&user_id) {
            return Ok(cached);
        }

        let models = self
            .rules
            .rules_for_user(user_id)
            .await
            .map_err(ProcessError::LoadRules)?;
        let configs: Vec<RuleConfig> = models
            .into_iter()
            .map(|model| RuleConfig {
                name: model.name,
                is_active: model.is_active,
                config: model.config,
            })
            .collect();

        let rule_set = Arc::new(configs);
        self.cache.insert(user_id, rule_set.clone());
        Ok(rule_set)
    }
}
