//! Database seeder for Sprout development and testing.
//!
//! Seeds a demo user, saving rules, and two goals for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use sprout_db::entities::{goals, rules, users};

/// Demo user ID (consistent for all seeds)
const DEMO_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo user...");
    seed_demo_user(&db).await;

    println!("Seeding saving rules...");
    seed_rules(&db).await;

    println!("Seeding goals...");
    seed_goals(&db).await;

    println!("Seeding complete!");
}

fn demo_user_id() -> Uuid {
    Uuid::from_str(DEMO_USER_ID).unwrap()
}

/// Seeds a demo user for development.
async fn seed_demo_user(db: &DatabaseConnection) {
    // Check if user already exists
    if users::Entity::find_by_id(demo_user_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo user already exists, skipping...");
        return;
    }

    let user = users::ActiveModel {
        id: Set(demo_user_id()),
        email: Set("demo@sprout.dev".to_string()),
        total_saved: Set(Decimal::ZERO),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = user.insert(db).await {
        eprintln!("Failed to insert demo user: {e}");
    } else {
        println!("  Created demo user: demo@sprout.dev");
    }
}

/// Seeds the round-up rule (active) and a percentage rule (inactive).
async fn seed_rules(db: &DatabaseConnection) {
    seed_rule(db, "roundup", true, json!({})).await;
    seed_rule(db, "percentage", false, json!({ "percent": "0.05" })).await;
}

async fn seed_rule(db: &DatabaseConnection, name: &str, is_active: bool, config: serde_json::Value) {
    let existing = rules::Entity::find()
        .filter(rules::Column::UserId.eq(demo_user_id()))
        .filter(rules::Column::Name.eq(name))
        .one(db)
        .await
        .ok()
        .flatten();
    if existing.is_some() {
        println!("  Rule '{name}' already exists, skipping...");
        return;
    }

    let rule = rules::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(demo_user_id()),
        name: Set(name.to_string()),
        is_active: Set(is_active),
        config: Set(config),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = rule.insert(db).await {
        eprintln!("Failed to insert rule '{name}': {e}");
    } else {
        println!("  Created rule '{name}' (active: {is_active})");
    }
}

/// Seeds two active goals; savings land on the most recently created one.
async fn seed_goals(db: &DatabaseConnection) {
    seed_goal(db, "Emergency Fund", Decimal::new(100_000, 2), 30).await;
    seed_goal(db, "Vacation", Decimal::new(50_000, 2), 1).await;
}

async fn seed_goal(db: &DatabaseConnection, name: &str, target: Decimal, days_ago: i64) {
    let existing = goals::Entity::find()
        .filter(goals::Column::UserId.eq(demo_user_id()))
        .filter(goals::Column::Name.eq(name))
        .one(db)
        .await
        .ok()
        .flatten();
    if existing.is_some() {
        println!("  Goal '{name}' already exists, skipping...");
        return;
    }

    let goal = goals::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(demo_user_id()),
        name: Set(name.to_string()),
        target_amount: Set(target),
        current_amount: Set(Decimal::ZERO),
        deadline: Set(None),
        is_active: Set(true),
        created_at: Set((Utc::now() - Duration::days(days_ago)).into()),
    };

    if let Err(e) = goal.insert(db).await {
        eprintln!("Failed to insert goal '{name}': {e}");
    } else {
        println!("  Created goal '{name}' (target: {target})");
    }
}
