//! Database migrations
//!
//! Versioned schema migrations tracked in the schema_migrations table.

use crate::core::error::{RailError, Result};
use rusqlite::Connection;
use tracing::info;

/// Migration version tracking table
const MIGRATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Initial schema migration (version 1)
const MIGRATION_V1: &str = r#"
-- Users table (authentication)
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'USER',
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

-- Stations table
CREATE TABLE IF NOT EXISTS stations (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    city TEXT NOT NULL
);

-- Trains table
CREATE TABLE IF NOT EXISTS trains (
    id TEXT PRIMARY KEY,
    train_no TEXT NOT NULL,
    name TEXT NOT NULL,
    source TEXT NOT NULL,
    destination TEXT NOT NULL,
    departure_time TEXT NOT NULL,
    arrival_time TEXT NOT NULL,
    duration TEXT NOT NULL,
    days_of_operation TEXT NOT NULL
);

-- Seat classes per train
CREATE TABLE IF NOT EXISTS train_classes (
    train_id TEXT NOT NULL,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    fare INTEGER NOT NULL,
    available_seats INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (train_id, code),
    FOREIGN KEY (train_id) REFERENCES trains(id) ON DELETE CASCADE
);

-- Bookings table
CREATE TABLE IF NOT EXISTS bookings (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    pnr TEXT UNIQUE NOT NULL,
    train_id TEXT NOT NULL,
    train_no TEXT NOT NULL,
    train_name TEXT NOT NULL,
    source TEXT NOT NULL,
    destination TEXT NOT NULL,
    date TEXT NOT NULL,
    departure_time TEXT NOT NULL,
    arrival_time TEXT NOT NULL,
    class_code TEXT NOT NULL,
    total_fare INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'CONFIRMED',
    booked_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Passengers per booking
CREATE TABLE IF NOT EXISTS passengers (
    id TEXT PRIMARY KEY,
    booking_id TEXT NOT NULL,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    gender TEXT NOT NULL,
    berth_preference TEXT NOT NULL,
    FOREIGN KEY (booking_id) REFERENCES bookings(id) ON DELETE CASCADE
);
"#;

/// Second schema migration (version 2)
const MIGRATION_V2: &str = r#"
-- Route and history lookups
CREATE INDEX IF NOT EXISTS idx_trains_route ON trains(source, destination);
CREATE INDEX IF NOT EXISTS idx_bookings_user ON bookings(user_id);
"#;

/// Run all pending database migrations
///
/// Applies schema migrations in order, tracking applied versions in the
/// schema_migrations table.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    info!("Running database migrations");

    conn.execute_batch(MIGRATION_TABLE)
        .map_err(RailError::DatabaseError)?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(RailError::DatabaseError)?;

    info!("Current database schema version: {}", current_version);

    if current_version < 1 {
        info!("Applying migration v1: Initial schema");
        apply_migration(conn, 1, MIGRATION_V1)?;
    }

    if current_version < 2 {
        info!("Applying migration v2: Route and booking indexes");
        apply_migration(conn, 2, MIGRATION_V2)?;
    }

    info!("Database migrations completed successfully");
    Ok(())
}

/// Apply a single migration inside a transaction and record its version
fn apply_migration(conn: &mut Connection, version: i64, sql: &str) -> Result<()> {
    let tx = conn.transaction().map_err(RailError::DatabaseError)?;

    tx.execute_batch(sql).map_err(RailError::DatabaseError)?;
    tx.execute(
        "INSERT INTO schema_migrations (version) VALUES (?)",
        [version],
    )
    .map_err(RailError::DatabaseError)?;

    tx.commit().map_err(RailError::DatabaseError)?;

    info!("Migration v{} applied successfully", version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_from_scratch() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();

        let version: i64 = conn
            .query_row(
                "SELECT MAX(version) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, 2);

        // Core tables exist
        for table in ["users", "stations", "trains", "train_classes", "bookings", "passengers"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_email_uniqueness_enforced() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();

        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, role) VALUES ('1','A','a@x.com','h','USER')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO users (id, name, email, password_hash, role) VALUES ('2','B','a@x.com','h','USER')",
            [],
        );
        assert!(dup.is_err());
    }
}
