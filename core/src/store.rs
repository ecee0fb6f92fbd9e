//! SQLite persistence layer for the transaction window.
//!
//! RULE: only store.rs talks to the database. The analyzer calls
//! store methods — it never executes SQL directly.

use crate::{error::AmlResult, transaction::TransactionRecord};
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

pub struct TxnStore {
    conn: Connection,
}

impl TxnStore {
    pub fn open(path: &str) -> AmlResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> AmlResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> AmlResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_transactions.sql"))?;
        Ok(())
    }

    /// Connectivity probe for health reporting.
    pub fn ping(&self) -> AmlResult<()> {
        self.conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    pub fn insert_transaction(&self, tx: &TransactionRecord) -> AmlResult<()> {
        self.conn.execute(
            "INSERT INTO transactions (from_party, to_party, amount_usd, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                tx.from_party,
                tx.to_party,
                tx.amount_usd,
                tx.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_batch(&self, batch: &[TransactionRecord]) -> AmlResult<()> {
        for tx in batch {
            self.insert_transaction(tx)?;
        }
        Ok(())
    }

    /// All transactions at or after `cutoff`, oldest first.
    pub fn transactions_since(&self, cutoff: DateTime<Utc>) -> AmlResult<Vec<TransactionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_party, to_party, amount_usd, timestamp
             FROM transactions
             WHERE timestamp >= ?1
             ORDER BY timestamp ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![cutoff.to_rfc3339()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (from_party, to_party, amount_usd, ts) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&ts)
                .map_err(|e| anyhow!("bad timestamp {ts:?} in store: {e}"))?
                .with_timezone(&Utc);
            out.push(TransactionRecord {
                from_party,
                to_party,
                amount_usd,
                timestamp,
            });
        }
        Ok(out)
    }

    pub fn transaction_count(&self) -> AmlResult<i64> {
        let count =
            self.conn
                .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn tx_at(from: &str, to: &str, amount: f64, ts: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord {
            from_party: from.to_string(),
            to_party: to.to_string(),
            amount_usd: amount,
            timestamp: ts,
        }
    }

    fn store() -> TxnStore {
        let store = TxnStore::in_memory().unwrap();
        store.migrate().unwrap();
        store
    }

    #[test]
    fn migrate_is_idempotent() {
        let store = store();
        store.migrate().unwrap();
        store.ping().unwrap();
    }

    #[test]
    fn window_query_excludes_stale_records() {
        let store = store();
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();

        store
            .insert_transaction(&tx_at("A", "B", 100.0, now - Duration::hours(30)))
            .unwrap();
        store
            .insert_transaction(&tx_at("B", "C", 200.0, now - Duration::hours(2)))
            .unwrap();
        store
            .insert_transaction(&tx_at("C", "A", 300.0, now - Duration::minutes(5)))
            .unwrap();

        let window = store.transactions_since(now - Duration::hours(24)).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].from_party, "B");
        assert_eq!(window[1].from_party, "C");
        assert_eq!(store.transaction_count().unwrap(), 3);
    }

    #[test]
    fn records_round_trip_intact() {
        let store = store();
        let ts = Utc.with_ymd_and_hms(2026, 8, 29, 3, 30, 0).unwrap();
        let original = tx_at("Iran", "UAE", 9_999.99, ts);
        store.insert_transaction(&original).unwrap();

        let read = store.transactions_since(ts - Duration::seconds(1)).unwrap();
        assert_eq!(read, vec![original]);
    }

    #[test]
    fn batch_insert_preserves_order_within_same_timestamp() {
        let store = store();
        let ts = Utc.with_ymd_and_hms(2026, 8, 29, 10, 0, 0).unwrap();
        let batch = vec![
            tx_at("A", "B", 1.0, ts),
            tx_at("B", "C", 2.0, ts),
            tx_at("C", "A", 3.0, ts),
        ];
        store.insert_batch(&batch).unwrap();
        let read = store.transactions_since(ts).unwrap();
        assert_eq!(read, batch);
    }
}
