//! Rule-based risk scoring for a single transaction.
//!
//! A fixed, explainable rule set — not a model. Rules evaluate
//! independently and contribute additive weights; the amount and
//! sender-activity rules are tiered high/low bands (mutually
//! exclusive within the tier).
//!
//! Scoring detail carried over from the feature pipeline this desk
//! inherited: level and action thresholds are applied to the RAW
//! accumulated score, while the reported score is clamped to 1.0.
//! With the default weights the two never disagree, but reclamping
//! before thresholding would silently move the Critical band if
//! weights were ever retuned.

use crate::transaction::TransactionFeatures;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Jurisdictions subject to elevated scrutiny. Static reference
/// data, read-only for the lifetime of the process.
pub const SANCTIONED_COUNTRIES: &[&str] =
    &["Iran", "North Korea", "Syria", "Russia", "Cuba", "Sudan"];

pub fn is_sanctioned(country: &str) -> bool {
    SANCTIONED_COUNTRIES.contains(&country)
}

/// Additive weight of each scoring rule. Defaults reproduce the
/// production rule table exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleWeights {
    pub high_amount: f64,
    pub medium_amount: f64,
    pub sanctioned_sender: f64,
    pub sanctioned_recipient: f64,
    pub midnight: f64,
    pub high_sender_activity: f64,
    pub moderate_sender_activity: f64,
    pub new_sender: f64,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            high_amount: 0.30,
            medium_amount: 0.15,
            sanctioned_sender: 0.40,
            sanctioned_recipient: 0.30,
            midnight: 0.10,
            high_sender_activity: 0.20,
            moderate_sender_activity: 0.10,
            new_sender: 0.15,
        }
    }
}

/// Strict lower bounds of the level bands; the same bounds gate the
/// recommended actions. Defaults are the production 0.7/0.5/0.3.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 0.7,
            high: 0.5,
            medium: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Band the raw (unclamped) score with the default thresholds.
    pub fn from_score(score: f64) -> Self {
        Self::from_score_with(score, &RiskThresholds::default())
    }

    /// Band the raw (unclamped) score into a level.
    pub fn from_score_with(score: f64, thresholds: &RiskThresholds) -> Self {
        if score > thresholds.critical {
            Self::Critical
        } else if score > thresholds.high {
            Self::High
        } else if score > thresholds.medium {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        };
        write!(f, "{label}")
    }
}

/// Advisory next steps. Independent of each other and of the level;
/// every applicable action is listed, nothing is emitted for
/// conditions that did not trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    FileSar,
    TemporaryHold,
    EnhancedReview,
    ApproveNormally,
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FileSar => "File SAR report",
            Self::TemporaryHold => "Temporary hold",
            Self::EnhancedReview => "Enhanced review",
            Self::ApproveNormally => "Approve normally",
        };
        write!(f, "{label}")
    }
}

/// Outcome of rule evaluation for one transaction.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    /// Clamped to 1.0 for presentation.
    pub score: f64,
    pub level: RiskLevel,
    pub factors: Vec<String>,
    pub actions: Vec<RecommendedAction>,
}

/// Evaluate the rule table with the default weights and thresholds.
pub fn assess_risk(features: &TransactionFeatures) -> RiskReport {
    assess_risk_with(features, &RuleWeights::default(), &RiskThresholds::default())
}

/// Evaluate the rule table. Deterministic and stateless: identical
/// input always yields identical output.
pub fn assess_risk_with(
    features: &TransactionFeatures,
    weights: &RuleWeights,
    thresholds: &RiskThresholds,
) -> RiskReport {
    let mut factors = Vec::new();
    let mut score = 0.0;

    // Amount tiers (mutually exclusive).
    if features.amount_usd > 10_000.0 {
        factors.push("High value (>$10k)".to_string());
        score += weights.high_amount;
    } else if features.amount_usd > 5_000.0 {
        factors.push("Medium value (>$5k)".to_string());
        score += weights.medium_amount;
    }

    // Geography.
    if is_sanctioned(&features.from_country) {
        factors.push(format!("Sanctioned sender: {}", features.from_country));
        score += weights.sanctioned_sender;
    }
    if is_sanctioned(&features.to_country) {
        factors.push(format!("Sanctioned recipient: {}", features.to_country));
        score += weights.sanctioned_recipient;
    }

    // Time of day. The flag is precomputed upstream; the hour field
    // is never re-inspected here.
    if features.is_midnight != 0 {
        factors.push("Midnight transaction (3AM-5AM)".to_string());
        score += weights.midnight;
    }

    // Sender activity tiers (mutually exclusive).
    if features.from_tx_count > 10.0 {
        factors.push("High sender activity (>10 tx)".to_string());
        score += weights.high_sender_activity;
    } else if features.from_tx_count > 5.0 {
        factors.push("Moderate sender activity (>5 tx)".to_string());
        score += weights.moderate_sender_activity;
    }

    // Sender novelty.
    if features.is_new_sender != 0 {
        factors.push("New sender (no history)".to_string());
        score += weights.new_sender;
    }

    // Weights are decimal; snap the sum so a band edge like
    // 0.30 + 0.40 lands exactly on 0.70 and not a hair above it.
    let score = (score * 1e9).round() / 1e9;

    // Decisions run on the raw sum; only the reported score clamps.
    let level = RiskLevel::from_score_with(score, thresholds);

    let mut actions = Vec::new();
    if score > thresholds.critical {
        actions.push(RecommendedAction::FileSar);
    }
    if score > thresholds.high {
        actions.push(RecommendedAction::TemporaryHold);
    }
    if score > thresholds.medium {
        actions.push(RecommendedAction::EnhancedReview);
    } else {
        actions.push(RecommendedAction::ApproveNormally);
    }

    if level != RiskLevel::Low {
        log::info!(
            "Risk assessment: score={:.2} level={} factors={}",
            score.min(1.0),
            level,
            factors.len()
        );
    }

    RiskReport {
        score: score.min(1.0),
        level,
        factors,
        actions,
    }
}
