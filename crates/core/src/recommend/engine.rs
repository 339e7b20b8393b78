//! The recommendation engine: maps a spending window to advisory records.
//!
//! Four fixed conditions are evaluated independently, in a fixed order; any
//! subset may fire. Thresholds are constants, not configuration, so output
//! is reproducible for the same window.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;

use super::types::{RecommendationDraft, SpendingWindow};

/// Transaction count above which the small-purchases condition applies.
const SMALL_SPEND_COUNT: u64 = 20;

/// Start of the spending window containing `now` (the calendar month).
#[must_use]
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Generates recommendations for a spending window.
///
/// An empty window fires nothing; output order is the condition order.
#[must_use]
pub fn generate(window: &SpendingWindow) -> Vec<RecommendationDraft> {
    // Fixed thresholds, expressed as shares of total window spend.
    let dining_share_high = Decimal::new(30, 2);
    let grocery_share_low = Decimal::new(10, 2);
    let other_share_high = Decimal::new(40, 2);
    let small_spend_avg = Decimal::TEN;

    let total = window.totals.total();
    if total <= Decimal::ZERO || window.transaction_count == 0 {
        return Vec::new();
    }

    let dining_share = window.totals.dining / total;
    let grocery_share = window.totals.groceries / total;
    let other_share = window.totals.other / total;
    let average = total / Decimal::from(window.transaction_count);

    let mut drafts = Vec::new();

    // Condition 1: dining at or above 30% of total spend.
    if dining_share >= dining_share_high {
        drafts.push(RecommendationDraft {
            title: "Dining above recommended level".to_string(),
            message: format!(
                "Your Dining spending is {}% of total this month. \
                 Consider lowering your dining budget.",
                as_percent(dining_share)
            ),
            category: "spending".to_string(),
        });
    }

    // Condition 2: dining high while groceries stay under 10%.
    if dining_share >= dining_share_high && grocery_share < grocery_share_low {
        drafts.push(RecommendationDraft {
            title: "Consider shifting spend to groceries".to_string(),
            message: format!(
                "Dining makes up {}% of your spending this month, while Groceries \
                 are only {}%. Cooking at home a bit more could free up extra savings.",
                as_percent(dining_share),
                as_percent(grocery_share)
            ),
            category: "budget_allocation".to_string(),
        });
    }

    // Condition 3: uncategorized spend above 40%.
    if other_share > other_share_high {
        drafts.push(RecommendationDraft {
            title: "High discretionary / uncategorized spending".to_string(),
            message: format!(
                "'Other' category spending is {}% of your total this month. Review \
                 these purchases to identify subscriptions or impulse buys you can \
                 cut back on.",
                as_percent(other_share)
            ),
            category: "spending_hygiene".to_string(),
        });
    }

    // Condition 4: many small purchases.
    if window.transaction_count > SMALL_SPEND_COUNT && average < small_spend_avg {
        drafts.push(RecommendationDraft {
            title: "Many small purchases detected".to_string(),
            message: format!(
                "You've made {} transactions this month with an average size of \
                 ${}. Grouping small purchases or reducing impulse buys could \
                 unlock additional savings.",
                window.transaction_count,
                average.round_dp(2)
            ),
            category: "behavior".to_string(),
        });
    }

    drafts
}

/// Renders a share as a whole percent.
fn as_percent(share: Decimal) -> Decimal {
    (share * Decimal::ONE_HUNDRED).round_dp(0)
}
