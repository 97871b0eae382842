use anyhow::Context;
use rusqlite::Connection;

/// Idempotently creates the two tables reserved for a future
/// withdrawal-metadata collector. The core pipeline never writes to them; it
/// only guarantees they exist when a store path is configured.
pub fn bootstrap(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("opening persistent store at {path}"))?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS transfer_exchanges (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            exchange TEXT NOT NULL,
            network_code TEXT NOT NULL,
            withdraw_enabled INTEGER NOT NULL,
            deposit_enabled INTEGER NOT NULL,
            withdraw_fee_usdt NUMERIC,
            min_withdraw_usdt NUMERIC,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(exchange, network_code)
        );

        CREATE TABLE IF NOT EXISTS transfer_assets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            exchange TEXT NOT NULL,
            asset TEXT NOT NULL,
            network_code TEXT NOT NULL,
            withdraw_fee NUMERIC,
            min_withdraw NUMERIC,
            withdraw_enabled INTEGER NOT NULL,
            deposit_enabled INTEGER NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(exchange, asset, network_code)
        );
        ",
    )
    .context("bootstrapping transfer_exchanges/transfer_assets schema")?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_creates_both_tables_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let path_str = path.to_str().unwrap();

        bootstrap(path_str).unwrap();
        // Running it again must not fail or duplicate anything.
        let conn = bootstrap(path_str).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name IN ('transfer_exchanges', 'transfer_assets')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(table_count, 2);
    }
}
