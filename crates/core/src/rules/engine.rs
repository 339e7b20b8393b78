//! The rule engine: maps a transaction amount and a rule set to saving actions.
//!
//! Pure and deterministic. The engine never fails: inactive rules produce
//! nothing, unknown rule kinds are skipped, and output order follows the
//! order the rules were supplied in.

use rust_decimal::Decimal;

use super::types::{RuleConfig, SavingAction};

/// Scale used for saving amounts (2 decimal places).
const MONEY_DP: u32 = 2;

/// Rule kinds the engine knows how to evaluate.
enum RuleKind {
    RoundUp,
    Percentage,
}

impl RuleKind {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "roundup" => Some(Self::RoundUp),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// Applies the supplied rules to a transaction amount.
///
/// Each active rule is evaluated independently; a rule that yields a
/// non-positive amount contributes no action. Output order is the order
/// the rules were supplied (insertion order of the active rule set).
#[must_use]
pub fn apply(amount: Decimal, rules: &[RuleConfig]) -> Vec<SavingAction> {
    let mut actions = Vec::new();

    for rule in rules {
        if !rule.is_active {
            continue;
        }
        let Some(kind) = RuleKind::parse(&rule.name) else {
            continue;
        };

        let saved = match kind {
            RuleKind::RoundUp => {
                let nearest = rule.decimal_param("nearest").unwrap_or(Decimal::ONE);
                round_up(amount, nearest)
            }
            RuleKind::Percentage => rule
                .decimal_param("percent")
                .map_or(Decimal::ZERO, |fraction| percentage(amount, fraction)),
        };

        if saved > Decimal::ZERO {
            actions.push(SavingAction {
                rule_name: rule.name.clone(),
                amount: saved,
            });
        }
    }

    actions
}

/// Difference between the amount and the next multiple of `nearest`.
///
/// An amount already on a multiple saves nothing.
fn round_up(amount: Decimal, nearest: Decimal) -> Decimal {
    if nearest <= Decimal::ZERO || amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let units = (amount / nearest).ceil();
    (units * nearest - amount).round_dp(MONEY_DP)
}

/// Fraction of the spent amount, rounded to cents.
fn percentage(amount: Decimal, fraction: Decimal) -> Decimal {
    if fraction <= Decimal::ZERO || amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (amount * fraction).round_dp(MONEY_DP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn roundup_rule() -> RuleConfig {
        RuleConfig {
            name: "roundup".to_string(),
            is_active: true,
            config: json!({}),
        }
    }

    fn percentage_rule(percent: &str) -> RuleConfig {
        RuleConfig {
            name: "percentage".to_string(),
            is_active: true,
            config: json!({ "percent": percent }),
        }
    }

    #[test]
    fn test_roundup_saves_to_next_whole_unit() {
        let actions = apply(dec!(4.35), &[roundup_rule()]);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].rule_name, "roundup");
        assert_eq!(actions[0].amount, dec!(0.65));
    }

    #[test]
    fn test_roundup_whole_amount_saves_nothing() {
        let actions = apply(dec!(12.00), &[roundup_rule()]);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_roundup_with_nearest_multiple() {
        let rule = RuleConfig {
            name: "roundup".to_string(),
            is_active: true,
            config: json!({ "nearest": "5" }),
        };
        let actions = apply(dec!(12.50), &[rule]);
        assert_eq!(actions[0].amount, dec!(2.50));
    }

    #[test]
    fn test_percentage_of_spend() {
        let actions = apply(dec!(40.00), &[percentage_rule("0.05")]);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].amount, dec!(2.00));
    }

    #[test]
    fn test_percentage_without_param_saves_nothing() {
        let rule = RuleConfig {
            name: "percentage".to_string(),
            is_active: true,
            config: json!({}),
        };
        assert!(apply(dec!(40.00), &[rule]).is_empty());
    }

    #[test]
    fn test_inactive_rule_is_skipped() {
        let mut rule = roundup_rule();
        rule.is_active = false;
        assert!(apply(dec!(4.35), &[rule]).is_empty());
    }

    #[test]
    fn test_unknown_rule_kind_is_skipped() {
        let rule = RuleConfig {
            name: "coffee_savings".to_string(),
            is_active: true,
            config: json!({}),
        };
        assert!(apply(dec!(4.35), &[rule]).is_empty());
    }

    #[test]
    fn test_output_follows_supplied_order() {
        let actions = apply(dec!(4.35), &[percentage_rule("0.10"), roundup_rule()]);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].rule_name, "percentage");
        assert_eq!(actions[1].rule_name, "roundup");
    }

    #[test]
    fn test_apply_is_deterministic() {
        let rules = [roundup_rule(), percentage_rule("0.05")];
        assert_eq!(apply(dec!(7.19), &rules), apply(dec!(7.19), &rules));
    }

    /// Strategy for generating positive cent-precision amounts.
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A round-up never saves more than one whole unit and never goes negative.
        #[test]
        fn prop_roundup_bounded(amount in amount_strategy()) {
            let saved = round_up(amount, Decimal::ONE);
            prop_assert!(saved >= Decimal::ZERO);
            prop_assert!(saved < Decimal::ONE);
        }

        /// Amount plus its round-up is a whole number of currency units.
        #[test]
        fn prop_roundup_lands_on_whole_unit(amount in amount_strategy()) {
            let saved = round_up(amount, Decimal::ONE);
            let landed = amount + saved;
            prop_assert_eq!(landed, landed.trunc());
        }

        /// Every produced action carries a strictly positive amount.
        #[test]
        fn prop_actions_are_positive(amount in amount_strategy()) {
            let rules = [roundup_rule(), percentage_rule("0.05")];
            for action in apply(amount, &rules) {
                prop_assert!(action.amount > Decimal::ZERO);
            }
        }
    }
}
