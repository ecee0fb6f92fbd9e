//! Shared primitive types used across the analyzer.

/// A transacting party — a country or account name as it appears
/// in the transaction feed.
pub type Party = String;

/// The canonical identifier for one analysis report.
pub type ReportId = String;
