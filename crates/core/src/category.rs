//! Spending category normalization.
//!
//! Inbound transactions carry free-text merchant/category strings. Everything
//! downstream (recommendations, analytics reads) works on a fixed category
//! set, so the mapping must be deterministic: the same raw string always
//! normalizes to the same category.

use serde::{Deserialize, Serialize};

/// Normalized spending categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Restaurants, cafes, bars, coffee shops.
    Dining,
    /// Grocery stores and supermarkets.
    Groceries,
    /// Everything that matched no known pattern.
    Other,
}

/// Substrings that map a raw category to Dining.
const DINING_MARKERS: &[&str] = &["coffee", "starbucks", "restaurant", "dining", "cafe", "bar"];

/// Substrings that map a raw category to Groceries.
const GROCERY_MARKERS: &[&str] = &["grocery", "groceries", "market", "supermarket"];

impl Category {
    /// Normalizes a raw merchant/category string.
    ///
    /// Matching is case-insensitive substring search; anything unmatched
    /// lands in `Other`.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let raw = raw.to_lowercase();
        if DINING_MARKERS.iter().any(|m| raw.contains(m)) {
            return Self::Dining;
        }
        if GROCERY_MARKERS.iter().any(|m| raw.contains(m)) {
            return Self::Groceries;
        }
        Self::Other
    }

    /// The stored string form of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dining => "Dining",
            Self::Groceries => "Groceries",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dining" => Ok(Self::Dining),
            "Groceries" => Ok(Self::Groceries),
            "Other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("Starbucks Coffee", Category::Dining)]
    #[case("coffee shop", Category::Dining)]
    #[case("RESTAURANT", Category::Dining)]
    #[case("Wine Bar", Category::Dining)]
    #[case("Whole Foods Market", Category::Groceries)]
    #[case("grocery run", Category::Groceries)]
    #[case("SUPERMARKET", Category::Groceries)]
    #[case("Gas Station", Category::Other)]
    #[case("Uncategorized", Category::Other)]
    #[case("", Category::Other)]
    fn test_normalize(#[case] raw: &str, #[case] expected: Category) {
        assert_eq!(Category::normalize(raw), expected);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        for raw in ["Starbucks", "market", "whatever", ""] {
            assert_eq!(Category::normalize(raw), Category::normalize(raw));
        }
    }

    #[test]
    fn test_category_round_trips_through_storage_form() {
        for category in [Category::Dining, Category::Groceries, Category::Other] {
            assert_eq!(Category::from_str(category.as_str()).unwrap(), category);
        }
        assert!(Category::from_str("Restaurant").is_err());
    }
}
