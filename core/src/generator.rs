//! Deterministic synthetic transaction batches.
//!
//! Lets the runner and tests exercise the full analysis path without
//! a live feed: background corridor flows plus an optional planted
//! laundering loop. Same seed, same batch.

use crate::rng::DetRng;
use crate::transaction::TransactionRecord;
use chrono::{DateTime, Duration, Utc};

const COUNTRIES: &[&str] = &[
    "USA", "Germany", "UK", "France", "Japan", "Brazil", "India", "Canada",
    "Mexico", "Singapore", "UAE", "Nigeria", "Switzerland", "Australia",
];

#[derive(Debug, Clone)]
pub struct ScenarioSpec {
    pub seed: u64,
    /// Background transactions to generate.
    pub background_count: usize,
    /// Parties on the planted loop; fewer than 3 plants nothing.
    pub loop_size: usize,
    /// Amount moved on each hop of the planted loop.
    pub loop_amount: f64,
}

impl Default for ScenarioSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            background_count: 40,
            loop_size: 4,
            loop_amount: 9_500.0,
        }
    }
}

/// Generate a transaction batch ending at `now`, spread over the
/// preceding 24 hours.
pub fn generate_batch(spec: &ScenarioSpec, now: DateTime<Utc>) -> Vec<TransactionRecord> {
    let mut rng = DetRng::derive(spec.seed, 0);
    let mut batch = Vec::with_capacity(spec.background_count + spec.loop_size);

    for _ in 0..spec.background_count {
        let from_idx = rng.next_u64_below(COUNTRIES.len() as u64) as usize;
        // Reroll collisions onto the next entry so edges always cross parties.
        let mut to_idx = rng.next_u64_below(COUNTRIES.len() as u64) as usize;
        if to_idx == from_idx {
            to_idx = (to_idx + 1) % COUNTRIES.len();
        }
        let minutes_ago = rng.next_u64_below(24 * 60) as i64;
        let raw_amount = rng.pareto(80.0, 1.2).min(250_000.0);
        // A share of real corridor traffic moves in round figures.
        let amount_usd = if rng.chance(0.25) {
            (raw_amount / 100.0).round().max(1.0) * 100.0
        } else {
            round_cents(raw_amount)
        };
        batch.push(TransactionRecord {
            from_party: COUNTRIES[from_idx].to_string(),
            to_party: COUNTRIES[to_idx].to_string(),
            amount_usd,
            timestamp: now - Duration::minutes(minutes_ago),
        });
    }

    if spec.loop_size >= 3 {
        batch.extend(planted_loop(spec, now));
    }

    log::info!(
        "Generated scenario: seed={} background={} loop_size={}",
        spec.seed,
        spec.background_count,
        spec.loop_size
    );

    batch
}

/// The planted loop runs through synthetic shell parties so it never
/// entangles with background corridors.
fn planted_loop(spec: &ScenarioSpec, now: DateTime<Utc>) -> Vec<TransactionRecord> {
    let parties: Vec<String> = (0..spec.loop_size)
        .map(|i| format!("SHELL-{:02}", i + 1))
        .collect();

    (0..spec.loop_size)
        .map(|i| TransactionRecord {
            from_party: parties[i].clone(),
            to_party: parties[(i + 1) % spec.loop_size].clone(),
            amount_usd: spec.loop_amount,
            // Hops land an hour apart, newest hop closing the loop.
            timestamp: now - Duration::hours((spec.loop_size - i) as i64),
        })
        .collect()
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
