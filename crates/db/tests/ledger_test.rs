//! Integration tests for the ledger repository.
//!
//! Runs the real migrations and repositories against in-memory SQLite and
//! exercises the properties the pipeline depends on: idempotence under
//! redelivery, atomicity of the composite write, additivity of user
//! totals, and goal allocation.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use sprout_core::rules::SavingAction;
use sprout_db::entities::{goal_progress, goals, savings_ledger, transactions, users};
use sprout_db::migration::{Migrator, MigratorTrait};
use sprout_db::{LedgerError, LedgerRepository, NewTransaction};

async fn db_with_schema() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn insert_user(db: &DatabaseConnection) -> Uuid {
    let id = Uuid::new_v4();
    users::ActiveModel {
        id: Set(id),
        email: Set(format!("{id}@sprout.test")),
        total_saved: Set(Decimal::ZERO),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .unwrap();
    id
}

async fn insert_goal(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
    days_ago: i64,
    is_active: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    goals::ActiveModel {
        id: Set(id),
        user_id: Set(user_id),
        name: Set(name.to_string()),
        target_amount: Set(dec!(1000.00)),
        current_amount: Set(Decimal::ZERO),
        deadline: Set(None),
        is_active: Set(is_active),
        created_at: Set((Utc::now() - Duration::days(days_ago)).into()),
    }
    .insert(db)
    .await
    .unwrap();
    id
}

fn new_transaction(user_id: Uuid, amount: Decimal, dedup_token: &str) -> NewTransaction {
    NewTransaction {
        user_id,
        amount,
        currency: "USD".to_string(),
        merchant: "Corner Store".to_string(),
        category_raw: "Uncategorized".to_string(),
        category_normalized: "Other".to_string(),
        occurred_at: Utc::now().into(),
        source: "simulator".to_string(),
        dedup_token: dedup_token.to_string(),
    }
}

fn roundup(amount: Decimal) -> SavingAction {
    SavingAction {
        rule_name: "roundup".to_string(),
        amount,
    }
}

#[tokio::test]
async fn test_record_transaction_writes_all_state() {
    let db = db_with_schema().await;
    let user_id = insert_user(&db).await;
    let repo = LedgerRepository::new(db.clone());

    let recorded = repo
        .record_transaction(
            new_transaction(user_id, dec!(9.75), "tx-1"),
            &[roundup(dec!(0.25))],
        )
        .await
        .unwrap();

    assert!(!recorded.deduplicated);
    assert_eq!(recorded.ledger_entry_ids.len(), 1);
    assert_eq!(recorded.user_total, dec!(0.25));

    let stored = transactions::Entity::find_by_id(recorded.transaction_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.amount, dec!(9.75));
    assert_eq!(stored.dedup_token, "tx-1");
    assert_eq!(stored.category_normalized, "Other");
}

#[tokio::test]
async fn test_redelivery_with_same_token_is_idempotent() {
    let db = db_with_schema().await;
    let user_id = insert_user(&db).await;
    let repo = LedgerRepository::new(db.clone());

    let actions = [roundup(dec!(0.25))];
    let first = repo
        .record_transaction(new_transaction(user_id, dec!(9.75), "tx-dup"), &actions)
        .await
        .unwrap();
    let second = repo
        .record_transaction(new_transaction(user_id, dec!(9.75), "tx-dup"), &actions)
        .await
        .unwrap();

    assert!(!first.deduplicated);
    assert!(second.deduplicated);
    assert_eq!(second.transaction_id, first.transaction_id);
    assert_eq!(second.ledger_entry_ids, first.ledger_entry_ids);
    // The total is unchanged between the first and second call.
    assert_eq!(second.user_total, dec!(0.25));

    let tx_count = transactions::Entity::find().all(&db).await.unwrap().len();
    assert_eq!(tx_count, 1);
    let entry_count = savings_ledger::Entity::find().all(&db).await.unwrap().len();
    assert_eq!(entry_count, 1);
}

#[tokio::test]
async fn test_totals_are_additive_across_transactions() {
    let db = db_with_schema().await;
    let user_id = insert_user(&db).await;
    let repo = LedgerRepository::new(db.clone());

    let saves = [dec!(0.25), dec!(0.50), dec!(0.75)];
    for (i, save) in saves.iter().enumerate() {
        repo.record_transaction(
            new_transaction(user_id, dec!(5.00) - save, &format!("tx-add-{i}")),
            &[roundup(*save)],
        )
        .await
        .unwrap();
    }

    assert_eq!(repo.user_total(user_id).await.unwrap(), dec!(1.50));
}

#[tokio::test]
async fn test_invalid_saving_amount_rolls_everything_back() {
    let db = db_with_schema().await;
    let user_id = insert_user(&db).await;
    insert_goal(&db, user_id, "Emergency Fund", 10, true).await;
    let repo = LedgerRepository::new(db.clone());

    // The transaction row is inserted before ledger entries; a bad action
    // must take it down with it.
    let err = repo
        .record_transaction(
            new_transaction(user_id, dec!(9.75), "tx-bad"),
            &[roundup(dec!(0.25)), roundup(dec!(-0.25))],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidSavingAmount(_)));

    assert!(repo.find_by_dedup_token("tx-bad").await.unwrap().is_none());
    assert_eq!(
        transactions::Entity::find().all(&db).await.unwrap().len(),
        0
    );
    assert_eq!(
        savings_ledger::Entity::find().all(&db).await.unwrap().len(),
        0
    );
    assert_eq!(repo.user_total(user_id).await.unwrap(), Decimal::ZERO);
    assert_eq!(
        goal_progress::Entity::find().all(&db).await.unwrap().len(),
        0
    );
}

#[tokio::test]
async fn test_allocation_goes_to_most_recent_active_goal() {
    let db = db_with_schema().await;
    let user_id = insert_user(&db).await;
    let older = insert_goal(&db, user_id, "Emergency Fund", 30, true).await;
    let newer = insert_goal(&db, user_id, "Vacation", 1, true).await;
    let repo = LedgerRepository::new(db.clone());

    let recorded = repo
        .record_transaction(
            new_transaction(user_id, dec!(8.00), "tx-goal"),
            &[roundup(dec!(2.00))],
        )
        .await
        .unwrap();

    let allocation = recorded.goal.unwrap();
    assert_eq!(allocation.goal_id, newer);
    assert_eq!(allocation.amount_added, dec!(2.00));
    assert_eq!(allocation.current_amount, dec!(2.00));

    let newer_goal = goals::Entity::find_by_id(newer).one(&db).await.unwrap().unwrap();
    assert_eq!(newer_goal.current_amount, dec!(2.00));
    let older_goal = goals::Entity::find_by_id(older).one(&db).await.unwrap().unwrap();
    assert_eq!(older_goal.current_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_inactive_goals_receive_nothing() {
    let db = db_with_schema().await;
    let user_id = insert_user(&db).await;
    let paused = insert_goal(&db, user_id, "Paused", 1, false).await;
    let active = insert_goal(&db, user_id, "Active", 30, true).await;
    let repo = LedgerRepository::new(db.clone());

    let recorded = repo
        .record_transaction(
            new_transaction(user_id, dec!(8.50), "tx-paused"),
            &[roundup(dec!(0.50))],
        )
        .await
        .unwrap();

    // The paused goal is newer but inactive; the older active goal wins.
    assert_eq!(recorded.goal.unwrap().goal_id, active);
    let paused_goal = goals::Entity::find_by_id(paused).one(&db).await.unwrap().unwrap();
    assert_eq!(paused_goal.current_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_no_actions_records_transaction_only() {
    let db = db_with_schema().await;
    let user_id = insert_user(&db).await;
    insert_goal(&db, user_id, "Emergency Fund", 10, true).await;
    let repo = LedgerRepository::new(db.clone());

    let recorded = repo
        .record_transaction(new_transaction(user_id, dec!(5.00), "tx-plain"), &[])
        .await
        .unwrap();

    assert!(recorded.ledger_entry_ids.is_empty());
    assert!(recorded.goal.is_none());
    assert_eq!(recorded.user_total, Decimal::ZERO);
    assert!(repo.find_by_dedup_token("tx-plain").await.unwrap().is_some());
}

#[tokio::test]
async fn test_transactions_since_filters_the_window() {
    let db = db_with_schema().await;
    let user_id = insert_user(&db).await;
    let repo = LedgerRepository::new(db.clone());

    let mut recent = new_transaction(user_id, dec!(5.00), "tx-recent");
    recent.occurred_at = Utc::now().into();
    let mut old = new_transaction(user_id, dec!(7.00), "tx-old");
    old.occurred_at = (Utc::now() - Duration::days(40)).into();

    repo.record_transaction(recent, &[]).await.unwrap();
    repo.record_transaction(old, &[]).await.unwrap();

    let since = (Utc::now() - Duration::days(7)).into();
    let window = repo.transactions_since(user_id, since).await.unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].dedup_token, "tx-recent");
}

#[tokio::test]
async fn test_unknown_user_fails_without_partial_state() {
    let db = db_with_schema().await;
    let repo = LedgerRepository::new(db.clone());

    let result = repo
        .record_transaction(
            new_transaction(Uuid::new_v4(), dec!(9.75), "tx-ghost"),
            &[roundup(dec!(0.25))],
        )
        .await;

    assert!(result.is_err());
    assert_eq!(
        transactions::Entity::find().all(&db).await.unwrap().len(),
        0
    );
}
