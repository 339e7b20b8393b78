//! Saving rule data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user's saving rule as loaded from cache or store.
///
/// The rule's name doubles as its kind (`roundup`, `percentage`); the
/// parameter set lives in `config` as a free-form JSON object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rule name, unique per user.
    pub name: String,
    /// Whether the rule currently fires.
    pub is_active: bool,
    /// Rule parameters (key -> value).
    pub config: Value,
}

impl RuleConfig {
    /// Reads a decimal parameter from the rule's config.
    ///
    /// Accepts both JSON numbers and strings; anything unparseable is
    /// treated as absent. Parsing goes through the decimal string form,
    /// never through floats.
    #[must_use]
    pub fn decimal_param(&self, key: &str) -> Option<Decimal> {
        match self.config.get(key)? {
            Value::Number(n) => n.to_string().parse().ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// One saving action produced by applying a rule to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingAction {
    /// Name of the rule that fired.
    pub rule_name: String,
    /// Amount to move into savings, always positive.
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn rule(config: Value) -> RuleConfig {
        RuleConfig {
            name: "percentage".to_string(),
            is_active: true,
            config,
        }
    }

    #[test]
    fn test_decimal_param_from_string() {
        let r = rule(json!({"percent": "0.05"}));
        assert_eq!(r.decimal_param("percent"), Some(dec!(0.05)));
    }

    #[test]
    fn test_decimal_param_from_number() {
        let r = rule(json!({"percent": 0.05}));
        assert_eq!(r.decimal_param("percent"), Some(dec!(0.05)));
    }

    #[test]
    fn test_decimal_param_missing_or_invalid() {
        let r = rule(json!({"percent": true}));
        assert_eq!(r.decimal_param("percent"), None);
        assert_eq!(r.decimal_param("nearest"), None);

        let r = rule(json!({}));
        assert_eq!(r.decimal_param("percent"), None);
    }
}
