//! Inbound transaction event payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ProcessError;

/// A transaction event as published on the transactions topic.
///
/// `merchant`, `category`, `timestamp`, and `source` may be omitted by
/// sparse publishers and fall back to the same defaults the gateway uses;
/// everything else is required.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionEvent {
    /// Owning user.
    pub user_id: Uuid,
    /// Transaction amount, must be positive.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Merchant name.
    #[serde(default = "default_merchant")]
    pub merchant: String,
    /// Raw category text.
    #[serde(default = "default_category")]
    pub category: String,
    /// When the transaction occurred (RFC 3339); defaults to delivery time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Originating system.
    #[serde(default = "default_source")]
    pub source: String,
    /// Stable idempotence key for this logical transaction.
    pub dedup_token: String,
}

fn default_merchant() -> String {
    "Unknown".to_string()
}

fn default_category() -> String {
    "Uncategorized".to_string()
}

fn default_source() -> String {
    "simulator".to_string()
}

impl TransactionEvent {
    /// Decodes and validates a raw event payload.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::Malformed` for undecodable JSON, a
    /// non-positive amount, or empty required strings. Malformed events
    /// are never retried.
    pub fn decode(payload: &[u8]) -> Result<Self, ProcessError> {
        let event: Self = serde_json::from_slice(payload)
            .map_err(|err| ProcessError::Malformed(err.to_string()))?;
        event.validate()?;
        Ok(event)
    }

    fn validate(&self) -> Result<(), ProcessError> {
        if self.amount <= Decimal::ZERO {
            return Err(ProcessError::Malformed(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(ProcessError::Malformed("currency is empty".to_string()));
        }
        if self.dedup_token.trim().is_empty() {
            return Err(ProcessError::Malformed("dedup_token is empty".to_string()));
        }
        Ok(())
    }

    /// When the transaction occurred, falling back to now.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.timestamp.unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payload(json: &str) -> Vec<u8> {
        json.as_bytes().to_vec()
    }

    #[test]
    fn test_decode_full_event() {
        let event = TransactionEvent::decode(&payload(
            r#"{
                "user_id": "00000000-0000-0000-0000-000000000002",
                "amount": 4.35,
                "currency": "USD",
                "merchant": "Starbucks",
                "category": "coffee",
                "timestamp": "2026-03-17T12:00:00Z",
                "source": "bank_feed",
                "dedup_token": "evt-1"
            }"#,
        ))
        .unwrap();
        assert_eq!(event.amount, dec!(4.35));
        assert_eq!(event.merchant, "Starbucks");
        assert_eq!(event.source, "bank_feed");
        assert!(event.timestamp.is_some());
    }

    #[test]
    fn test_decode_applies_defaults() {
        let event = TransactionEvent::decode(&payload(
            r#"{
                "user_id": "00000000-0000-0000-0000-000000000002",
                "amount": "4.35",
                "currency": "USD",
                "dedup_token": "evt-2"
            }"#,
        ))
        .unwrap();
        assert_eq!(event.merchant, "Unknown");
        assert_eq!(event.category, "Uncategorized");
        assert_eq!(event.source, "simulator");
        assert!(event.timestamp.is_none());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = TransactionEvent::decode(b"not json").unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let err = TransactionEvent::decode(&payload(r#"{"amount": 1.0}"#)).unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_decode_rejects_non_positive_amount() {
        for amount in ["0", "-3.50"] {
            let err = TransactionEvent::decode(&payload(&format!(
                r#"{{
                    "user_id": "00000000-0000-0000-0000-000000000002",
                    "amount": {amount},
                    "currency": "USD",
                    "dedup_token": "evt-3"
                }}"#
            )))
            .unwrap_err();
            assert!(matches!(err, ProcessError::Malformed(_)));
        }
    }

    #[test]
    fn test_decode_rejects_empty_currency_and_token() {
        let err = TransactionEvent::decode(&payload(
            r#"{
                "user_id": "00000000-0000-0000-0000-000000000002",
                "amount": 1.00,
                "currency": " ",
                "dedup_token": "evt-4"
            }"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ProcessError::Malformed(_)));

        let err = TransactionEvent::decode(&payload(
            r#"{
                "user_id": "00000000-0000-0000-0000-000000000002",
                "amount": 1.00,
                "currency": "USD",
                "dedup_token": ""
            }"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ProcessError::Malformed(_)));
    }
}
