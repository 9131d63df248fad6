// Database module

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::constants::DB_EXTENSION;
use crate::error::{Result, SimError};

/// Tables every kernel operation depends on. Checked once at bootstrap so a
/// missing table is reported as schema drift instead of failing mid-week.
const REQUIRED_TABLES: &[&str] = &[
    "country",
    "city",
    "address",
    "language",
    "category",
    "actor",
    "film",
    "film_actor",
    "film_category",
    "store",
    "staff",
    "customer",
    "inventory",
    "rental",
    "payment",
];

/// How the sampler resolves a film's release date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseDateSource {
    /// Exact dates from the film_releases table.
    ReleaseTable,
    /// Approximate as January 1 of film.release_year.
    ReleaseYear,
}

/// Capabilities detected at bootstrap. Decided once; the kernel never probes
/// table existence per call.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub release_dates: ReleaseDateSource,
    pub has_late_fees: bool,
    pub has_customer_ar: bool,
    pub has_inventory_status: bool,
    pub has_inventory_purchases: bool,
}

impl Capabilities {
    pub fn probe(conn: &Connection) -> Result<Capabilities> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(SimError::SchemaDrift(format!("missing table '{}'", table)));
            }
        }

        let release_dates = if table_exists(conn, "film_releases")? {
            ReleaseDateSource::ReleaseTable
        } else {
            ReleaseDateSource::ReleaseYear
        };

        Ok(Capabilities {
            release_dates,
            has_late_fees: table_exists(conn, "late_fees")?,
            has_customer_ar: table_exists(conn, "customer_ar")?,
            has_inventory_status: table_exists(conn, "inventory_status")?,
            has_inventory_purchases: table_exists(conn, "inventory_purchases")?,
        })
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Database file path for a configured directory and database name.
pub fn database_path(dir: &str, name: &str) -> PathBuf {
    Path::new(dir).join(format!("{}.{}", name, DB_EXTENSION))
}

/// Open or create the database at the given path and bring the schema up to
/// date. Idempotent: a second invocation is a no-op.
pub fn ensure_database(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SimError::Connection(format!("{}: {}", parent.display(), e)))?;
        }
    }

    let conn = Connection::open(db_path)
        .map_err(|e| SimError::Connection(format!("{}: {}", db_path.display(), e)))?;

    // Enable foreign keys (must be done per connection)
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // WAL keeps readers between weekly batches cheap
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;

    // DDL failures during bootstrap are fatal
    migrations::run_migrations(&conn).map_err(|e| SimError::SchemaDrift(e.to_string()))?;

    Ok(conn)
}

/// In-memory database with the full schema, for tests.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    migrations::run_migrations(&conn).map_err(|e| SimError::SchemaDrift(e.to_string()))?;
    Ok(conn)
}
