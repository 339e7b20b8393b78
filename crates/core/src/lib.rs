//! Core business logic for Sprout.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Everything here is deterministic and total over well-formed input: the same
//! transaction and the same rule set always produce the same saving actions,
//! and the same spending window always produces the same recommendations.
//!
//! # Modules
//!
//! - `category` - Merchant/category text normalization
//! - `rules` - Saving rule evaluation (round-ups, percentage-of-spend)
//! - `recommend` - Deterministic spending recommendations

pub mod category;
pub mod recommend;
pub mod rules;
