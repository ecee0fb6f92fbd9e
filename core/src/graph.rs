//! Transaction graph construction and circular-flow detection.
//!
//! A cycle of three or more distinct parties inside the observation
//! window is the classic layering indicator: money leaves a party and
//! comes back to it through intermediaries. Two-party back-and-forth
//! (A→B→A) is ordinary bilateral flow and is never flagged.

use crate::transaction::{format_usd, TransactionRecord};
use crate::types::Party;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Directed money-flow graph derived from one transaction window.
///
/// Rebuilt per analysis call and discarded with the response — no
/// cross-request graph state. Insertion order is preserved on both
/// the node list and each adjacency list so traversal is
/// deterministic for a given batch.
#[derive(Debug, Default)]
pub struct TransactionGraph {
    adjacency: HashMap<Party, Vec<Party>>,
    amounts: HashMap<(Party, Party), Vec<f64>>,
    node_order: Vec<Party>,
}

impl TransactionGraph {
    /// Build the graph from a transaction batch. Parallel edges and
    /// per-pair amounts are kept as-is (duplicates preserved, never
    /// summed at build time).
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        let mut graph = Self::default();
        for tx in records {
            if !graph.adjacency.contains_key(&tx.from_party) {
                graph.node_order.push(tx.from_party.clone());
            }
            graph
                .adjacency
                .entry(tx.from_party.clone())
                .or_default()
                .push(tx.to_party.clone());
            graph
                .amounts
                .entry((tx.from_party.clone(), tx.to_party.clone()))
                .or_default()
                .push(tx.amount_usd);
        }
        graph
    }

    /// Sending parties, in first-seen order.
    pub fn nodes(&self) -> &[Party] {
        &self.node_order
    }

    /// Outgoing edges of `node`, in input order. Empty for parties
    /// that only ever received.
    pub fn neighbors(&self, node: &str) -> &[Party] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of every amount recorded between the ordered pair
    /// (`from`, `to`) inside the window.
    pub fn pair_total(&self, from: &str, to: &str) -> f64 {
        self.amounts
            .get(&(from.to_string(), to.to_string()))
            .map(|v| v.iter().sum())
            .unwrap_or(0.0)
    }
}

/// Outcome of circular-flow detection over one transaction window.
#[derive(Debug, Clone, Serialize)]
pub struct LoopReport {
    pub detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Party>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_indicators: Option<Vec<String>>,
}

impl LoopReport {
    fn not_detected(message: &str) -> Self {
        Self {
            detected: false,
            message: Some(message.to_string()),
            cycle_size: None,
            participants: None,
            total_amount: None,
            risk_indicators: None,
        }
    }
}

/// Smallest distinct-node count that qualifies as a laundering loop.
pub const DEFAULT_MIN_LOOP_SIZE: usize = 3;

/// Detect circular transaction patterns with the default minimum
/// loop size.
pub fn detect_loops(records: &[TransactionRecord]) -> LoopReport {
    detect_loops_with(records, DEFAULT_MIN_LOOP_SIZE)
}

/// Detect circular transaction patterns in a window of records.
/// Cycles with fewer than `min_loop_size` distinct nodes are ignored.
///
/// Pure and total: an empty batch and a batch with no qualifying
/// cycle are both valid non-error outcomes, with distinct messages.
pub fn detect_loops_with(records: &[TransactionRecord], min_loop_size: usize) -> LoopReport {
    if records.is_empty() {
        return LoopReport::not_detected("No recent transactions found");
    }

    let graph = TransactionGraph::from_records(records);

    let mut cycles: Vec<Vec<Party>> = Vec::new();
    let mut visited: HashSet<Party> = HashSet::new();
    for node in graph.nodes() {
        let mut path: Vec<Party> = Vec::new();
        dfs_collect(&graph, node, &mut path, &mut visited, min_loop_size, &mut cycles);
    }

    if cycles.is_empty() {
        return LoopReport::not_detected("No suspicious loops detected");
    }

    // Longest cycle wins; ties go to the first found, which is stable
    // because traversal order follows input order.
    let mut main_cycle = &cycles[0];
    for cycle in &cycles[1..] {
        if cycle.len() > main_cycle.len() {
            main_cycle = cycle;
        }
    }
    let main_cycle = main_cycle.clone();

    // Distinct participants; the list repeats the entry node at the end.
    let cycle_size = main_cycle.len() - 1;

    let total_amount: f64 = main_cycle
        .windows(2)
        .map(|pair| graph.pair_total(&pair[0], &pair[1]))
        .sum();

    log::warn!(
        "Transaction loop detected: {} nodes, {} cycled",
        cycle_size,
        format_usd(total_amount)
    );

    LoopReport {
        detected: true,
        message: None,
        cycle_size: Some(cycle_size),
        participants: Some(main_cycle),
        total_amount: Some(total_amount),
        risk_indicators: Some(vec![
            "High-risk circular pattern".to_string(),
            format!("{cycle_size}-node transaction loop"),
            format!("Total amount cycled: {}", format_usd(total_amount)),
            "Potential money laundering pattern".to_string(),
        ]),
    }
}

/// Depth-first descent from `node` with the current path passed
/// explicitly. Discovered cycles (entry node repeated at the end) are
/// appended to `cycles`; only cycles with at least `min_loop_size`
/// distinct nodes qualify.
fn dfs_collect(
    graph: &TransactionGraph,
    node: &str,
    path: &mut Vec<Party>,
    visited: &mut HashSet<Party>,
    min_loop_size: usize,
    cycles: &mut Vec<Vec<Party>>,
) {
    if let Some(idx) = path.iter().position(|p| p == node) {
        // Closing back onto the current path: the cycle is the
        // sub-path from the earlier occurrence through here.
        let mut cycle: Vec<Party> = path[idx..].to_vec();
        cycle.push(node.to_string());
        if cycle.len() - 1 >= min_loop_size {
            cycles.push(cycle);
        }
        return;
    }
    if visited.contains(node) {
        // Fully explored in an earlier descent; nothing new below.
        return;
    }
    visited.insert(node.to_string());

    path.push(node.to_string());
    for neighbor in graph.neighbors(node) {
        dfs_collect(graph, neighbor, path, visited, min_loop_size, cycles);
    }
    path.pop();
}
