//! Transaction inputs: raw window records and the per-transaction
//! feature vector consumed by the risk scorer.

use crate::types::Party;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One money movement between two parties, as stored in the
/// trailing transaction window. Read-only to the detection cores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    #[serde(rename = "from")]
    pub from_party: Party,
    #[serde(rename = "to")]
    pub to_party: Party,
    pub amount_usd: f64,
    pub timestamp: DateTime<Utc>,
}

/// Precomputed feature vector describing one incoming transaction.
///
/// The boolean-style flags (`is_midnight`, `is_high_amount`,
/// `is_new_sender`) arrive already computed by the feature pipeline;
/// the scorer consumes them and never rederives them from raw fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionFeatures {
    pub amount_usd: f64,
    pub from_country: String,
    pub to_country: String,
    pub hour: f64,
    pub from_tx_count: f64,
    pub from_avg_amount: f64,
    pub from_total_amount: f64,
    pub to_tx_count: f64,
    pub to_avg_amount: f64,
    pub to_total_amount: f64,
    pub is_midnight: i64,
    pub is_high_amount: i64,
    pub is_new_sender: i64,
}

/// Echo of the analyzed transaction, as included in the response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub from: String,
    pub to: String,
    pub amount: String,
}

impl TransactionSummary {
    pub fn from_features(features: &TransactionFeatures) -> Self {
        Self {
            from: features.from_country.clone(),
            to: features.to_country.clone(),
            amount: format_usd(features.amount_usd),
        }
    }
}

/// Format a dollar amount with thousands separators, e.g. `$12,345.67`.
pub fn format_usd(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${grouped}.{frac:02}")
    } else {
        format!("${grouped}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_amounts_with_grouping() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(999.5), "$999.50");
        assert_eq!(format_usd(15000.0), "$15,000.00");
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
    }

    #[test]
    fn feature_vector_round_trips_original_field_names() {
        let json = r#"{
            "amount_usd": 15000.0,
            "from_country": "Russia",
            "to_country": "USA",
            "hour": 14.0,
            "from_tx_count": 2.0,
            "from_avg_amount": 7500.0,
            "from_total_amount": 15000.0,
            "to_tx_count": 4.0,
            "to_avg_amount": 3000.0,
            "to_total_amount": 12000.0,
            "is_midnight": 0,
            "is_high_amount": 1,
            "is_new_sender": 0
        }"#;
        let features: TransactionFeatures = serde_json::from_str(json).unwrap();
        assert_eq!(features.from_country, "Russia");
        assert_eq!(features.is_high_amount, 1);
    }

    #[test]
    fn record_uses_from_to_field_names() {
        let json = r#"{
            "from": "A",
            "to": "B",
            "amount_usd": 100.0,
            "timestamp": "2026-08-29T12:00:00Z"
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.from_party, "A");
        assert_eq!(record.to_party, "B");
    }
}
