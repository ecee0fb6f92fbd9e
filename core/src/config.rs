//! Analyzer configuration.
//!
//! Defaults reproduce the production rule table and 24-hour window;
//! a JSON file can override any subset of fields. Weights are
//! configuration data, but the shipped defaults are the contract the
//! test suite pins down.

use crate::{
    error::AmlResult,
    graph::DEFAULT_MIN_LOOP_SIZE,
    scoring::{RiskThresholds, RuleWeights},
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Trailing observation window fed to loop detection.
    pub window_hours: i64,
    /// Smallest distinct-node cycle reported as a laundering loop.
    pub min_loop_size: usize,
    /// Additive rule weights for the risk scorer.
    pub weights: RuleWeights,
    /// Level and action band edges for the risk scorer.
    pub thresholds: RiskThresholds,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            min_loop_size: DEFAULT_MIN_LOOP_SIZE,
            weights: RuleWeights::default(),
            thresholds: RiskThresholds::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load from a JSON file; absent fields keep their defaults.
    pub fn load(path: &str) -> AmlResult<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading analyzer config {path}"))?;
        let config: Self = serde_json::from_str(&raw)?;
        if config.window_hours <= 0 {
            return Err(crate::error::AmlError::Config(format!(
                "window_hours must be positive, got {}",
                config.window_hours
            )));
        }
        if config.min_loop_size < 2 {
            return Err(crate::error::AmlError::Config(format!(
                "min_loop_size must be at least 2, got {}",
                config.min_loop_size
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_rule_table() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.window_hours, 24);
        assert_eq!(config.min_loop_size, 3);
        assert_eq!(config.weights.high_amount, 0.30);
        assert_eq!(config.weights.sanctioned_sender, 0.40);
        assert_eq!(config.weights.new_sender, 0.15);
        assert_eq!(config.thresholds.critical, 0.7);
        assert_eq!(config.thresholds.high, 0.5);
        assert_eq!(config.thresholds.medium, 0.3);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{ "window_hours": 48 }"#).unwrap();
        assert_eq!(config.window_hours, 48);
        assert_eq!(config.min_loop_size, 3);
        assert_eq!(config.weights, RuleWeights::default());
        assert_eq!(config.thresholds, RiskThresholds::default());
    }

    #[test]
    fn partial_weights_merge_over_defaults() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{ "weights": { "midnight": 0.25 } }"#).unwrap();
        assert_eq!(config.weights.midnight, 0.25);
        assert_eq!(config.weights.high_amount, 0.30);
    }
}
