//! `SeaORM` entity definitions.

pub mod goal_progress;
pub mod goals;
pub mod recommendations;
pub mod rules;
pub mod savings_ledger;
pub mod transactions;
pub mod users;
