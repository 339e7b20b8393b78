//! Recommendation data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Spend totals per normalized category over a window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    /// Total Dining spend.
    pub dining: Decimal,
    /// Total Groceries spend.
    pub groceries: Decimal,
    /// Total Other spend.
    pub other: Decimal,
}

impl CategoryTotals {
    /// Adds one transaction's amount to its category bucket.
    pub fn add(&mut self, category: Category, amount: Decimal) {
        match category {
            Category::Dining => self.dining += amount,
            Category::Groceries => self.groceries += amount,
            Category::Other => self.other += amount,
        }
    }

    /// Total spend across all categories.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.dining + self.groceries + self.other
    }
}

/// A user's recent transaction window, reduced to what the
/// recommendation conditions look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpendingWindow {
    /// Number of transactions in the window.
    pub transaction_count: u64,
    /// Per-category spend totals over the same window.
    pub totals: CategoryTotals,
}

impl SpendingWindow {
    /// Builds a window from (category, amount) pairs.
    pub fn from_amounts<I>(amounts: I) -> Self
    where
        I: IntoIterator<Item = (Category, Decimal)>,
    {
        let mut window = Self::default();
        for (category, amount) in amounts {
            window.transaction_count += 1;
            window.totals.add(category, amount);
        }
        window
    }
}

/// A generated recommendation, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationDraft {
    /// Short headline.
    pub title: String,
    /// Full advisory text.
    pub message: String,
    /// Recommendation category (`spending`, `budget_allocation`, ...).
    pub category: String,
}
