//! aml-runner: headless runner for the AML transaction analyzer.
//!
//! Usage:
//!   aml-runner --seed 12345 --count 60 --db window.db
//!   aml-runner --features tx.json --db window.db
//!   aml-runner --ipc-mode
//!
//! IPC mode reads one JSON command per stdin line (analyze, ingest,
//! health, quit) and writes one JSON response per line — the same
//! operations the original HTTP surface exposed.

use aml_core::{
    analyzer::AmlAnalyzer,
    config::AnalyzerConfig,
    generator::{generate_batch, ScenarioSpec},
    store::TxnStore,
    transaction::{TransactionFeatures, TransactionRecord},
};
use anyhow::{Context, Result};
use chrono::Utc;
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Analyze { features: TransactionFeatures },
    Ingest { transactions: Vec<TransactionRecord> },
    Health,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let count = parse_arg(&args, "--count", 40usize);
    let loop_size = parse_arg(&args, "--loop-size", 4usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let features_path = args
        .windows(2)
        .find(|w| w[0] == "--features")
        .map(|w| w[1].as_str());
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };

    let store = if db == ":memory:" {
        TxnStore::in_memory()?
    } else {
        TxnStore::open(db)?
    };
    store.migrate()?;

    let analyzer = AmlAnalyzer::new(store, config);

    if ipc_mode {
        return run_ipc_loop(&analyzer);
    }

    if let Some(path) = features_path {
        // One-shot: analyze a feature vector against the stored window.
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading features file {path}"))?;
        let features: TransactionFeatures = serde_json::from_str(&raw)?;
        let report = analyzer.analyze(&features)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    // Scenario mode: seed the window, analyze the freshest generated
    // transaction, print a run summary.
    println!("aml-runner — scenario mode");
    println!("  seed:      {seed}");
    println!("  count:     {count}");
    println!("  loop_size: {loop_size}");
    println!("  db:        {db}");
    println!();

    let now = Utc::now();
    let spec = ScenarioSpec {
        seed,
        background_count: count,
        loop_size,
        ..ScenarioSpec::default()
    };
    let batch = generate_batch(&spec, now);
    analyzer.store().insert_batch(&batch)?;

    let features = features_from_latest(&batch);
    let report = analyzer.analyze_at(&features, now)?;

    println!("=== RUN SUMMARY ===");
    println!("  stored txns:  {}", analyzer.store().transaction_count()?);
    println!("  loop found:   {}", report.loop_analysis.detected);
    if let (Some(size), Some(amount)) = (
        report.loop_analysis.cycle_size,
        report.loop_analysis.total_amount,
    ) {
        println!("  loop size:    {size}");
        println!("  loop amount:  ${amount:.2}");
    }
    println!("  risk score:   {:.2}", report.risk_analysis.score);
    println!("  risk level:   {}", report.risk_analysis.level);
    let actions: Vec<String> = report
        .risk_analysis
        .actions
        .iter()
        .map(|a| a.to_string())
        .collect();
    println!("  actions:      {}", actions.join(", "));
    println!();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_ipc_loop(analyzer: &AmlAnalyzer) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Bad IPC command: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Analyze { features } => {
                let report = analyzer.analyze(&features)?;
                writeln!(stdout, "{}", serde_json::to_string(&report)?)?;
            }
            IpcCommand::Ingest { transactions } => {
                analyzer.store().insert_batch(&transactions)?;
                let response = serde_json::json!({
                    "ingested": transactions.len(),
                    "total": analyzer.store().transaction_count()?,
                });
                writeln!(stdout, "{}", response)?;
            }
            IpcCommand::Health => {
                let health = analyzer.health(Utc::now());
                writeln!(stdout, "{}", serde_json::to_string(&health)?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

/// Build a feature vector for the most recent generated transaction,
/// with counts and flags derived from the batch itself.
fn features_from_latest(batch: &[TransactionRecord]) -> TransactionFeatures {
    let latest = batch
        .iter()
        .max_by_key(|tx| tx.timestamp)
        .cloned()
        .unwrap_or_else(|| TransactionRecord {
            from_party: "USA".to_string(),
            to_party: "Germany".to_string(),
            amount_usd: 100.0,
            timestamp: Utc::now(),
        });

    let from_txs: Vec<&TransactionRecord> = batch
        .iter()
        .filter(|tx| tx.from_party == latest.from_party)
        .collect();
    let to_txs: Vec<&TransactionRecord> = batch
        .iter()
        .filter(|tx| tx.to_party == latest.to_party)
        .collect();

    let from_total: f64 = from_txs.iter().map(|tx| tx.amount_usd).sum();
    let to_total: f64 = to_txs.iter().map(|tx| tx.amount_usd).sum();
    let hour = latest
        .timestamp
        .format("%H")
        .to_string()
        .parse()
        .unwrap_or(0.0);

    TransactionFeatures {
        amount_usd: latest.amount_usd,
        from_country: latest.from_party.clone(),
        to_country: latest.to_party.clone(),
        hour,
        from_tx_count: from_txs.len() as f64,
        from_avg_amount: from_total / from_txs.len().max(1) as f64,
        from_total_amount: from_total,
        to_tx_count: to_txs.len() as f64,
        to_avg_amount: to_total / to_txs.len().max(1) as f64,
        to_total_amount: to_total,
        is_midnight: i64::from((3.0..5.0).contains(&hour)),
        is_high_amount: i64::from(latest.amount_usd > 10_000.0),
        is_new_sender: i64::from(from_txs.len() <= 1),
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
