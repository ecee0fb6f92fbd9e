//! aml-core: transaction-risk analysis for the AML desk.
//!
//! Two independent detection cores — circular-flow detection over a recent
//! transaction window, and rule-based scoring of a single transaction's
//! feature vector — composed per request by [`analyzer::AmlAnalyzer`].

pub mod analyzer;
pub mod config;
pub mod error;
pub mod generator;
pub mod graph;
pub mod rng;
pub mod scoring;
pub mod store;
pub mod transaction;
pub mod types;
