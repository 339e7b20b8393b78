//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The ledger repository owns the composite write that the
//! whole pipeline's correctness rests on.

pub mod ledger;
pub mod recommendation;
pub mod rules;

pub use ledger::{
    GoalAllocation, LedgerError, LedgerRepository, NewTransaction, RecordedTransaction,
};
pub use recommendation::RecommendationRepository;
pub use rules::RulesRepository;
