//! Per-request composition of the two detection cores.
//!
//! An analysis request runs loop detection over the trailing window
//! and rule scoring over the incoming feature vector. The two run
//! independently — neither consumes the other's output — and their
//! reports are merged with the echoed transaction summary.

use crate::{
    config::AnalyzerConfig,
    error::AmlResult,
    graph::{detect_loops_with, LoopReport},
    scoring::{assess_risk_with, RiskReport},
    store::TxnStore,
    transaction::{TransactionFeatures, TransactionSummary},
    types::ReportId,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub report_id: ReportId,
    pub transaction: TransactionSummary,
    pub loop_analysis: LoopReport,
    pub risk_analysis: RiskReport,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub database: String,
    pub timestamp: String,
}

pub struct AmlAnalyzer {
    store: TxnStore,
    config: AnalyzerConfig,
}

impl AmlAnalyzer {
    pub fn new(store: TxnStore, config: AnalyzerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &TxnStore {
        &self.store
    }

    /// Analyze against the window trailing the wall clock.
    pub fn analyze(&self, features: &TransactionFeatures) -> AmlResult<AnalysisReport> {
        self.analyze_at(features, Utc::now())
    }

    /// Analyze against the window trailing `now`. Fixed clock plus
    /// fixed store contents gives a reproducible report (modulo the
    /// generated report id).
    pub fn analyze_at(
        &self,
        features: &TransactionFeatures,
        now: DateTime<Utc>,
    ) -> AmlResult<AnalysisReport> {
        let cutoff = now - Duration::hours(self.config.window_hours);
        let window = self.store.transactions_since(cutoff)?;

        log::info!(
            "Analyzing {} -> {} over {} windowed transactions",
            features.from_country,
            features.to_country,
            window.len()
        );

        let loop_analysis = detect_loops_with(&window, self.config.min_loop_size);
        let risk_analysis =
            assess_risk_with(features, &self.config.weights, &self.config.thresholds);

        Ok(AnalysisReport {
            report_id: Uuid::new_v4().to_string(),
            transaction: TransactionSummary::from_features(features),
            loop_analysis,
            risk_analysis,
            timestamp: now.to_rfc3339(),
        })
    }

    /// Connectivity health: status plus database reachability.
    pub fn health(&self, now: DateTime<Utc>) -> HealthReport {
        match self.store.ping() {
            Ok(()) => HealthReport {
                status: "healthy".to_string(),
                database: "connected".to_string(),
                timestamp: now.to_rfc3339(),
            },
            Err(e) => {
                log::warn!("Health check failed: {e}");
                HealthReport {
                    status: "unhealthy".to_string(),
                    database: e.to_string(),
                    timestamp: now.to_rfc3339(),
                }
            }
        }
    }
}
