// Database migrations
// Migrations are forward-only. Never edit or delete a migration after it ships.

use anyhow::Result;
use rusqlite::Connection;

/// All migrations in order. Each migration is a SQL string.
const MIGRATIONS: &[&str] = &[
    // Migration 1: Base rental schema
    r#"
    -- Reference dimensions
    CREATE TABLE country (
        country_id INTEGER PRIMARY KEY AUTOINCREMENT,
        country TEXT NOT NULL UNIQUE
    );

    CREATE TABLE city (
        city_id INTEGER PRIMARY KEY AUTOINCREMENT,
        city TEXT NOT NULL,
        country_id INTEGER NOT NULL REFERENCES country(country_id)
    );

    CREATE TABLE address (
        address_id INTEGER PRIMARY KEY AUTOINCREMENT,
        address TEXT NOT NULL,
        district TEXT,
        city_id INTEGER NOT NULL REFERENCES city(city_id),
        postal_code TEXT,
        phone TEXT
    );

    CREATE TABLE language (
        language_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE category (
        category_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE actor (
        actor_id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL
    );

    -- Catalog
    CREATE TABLE film (
        film_id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        release_year INTEGER NOT NULL,
        language_id INTEGER NOT NULL REFERENCES language(language_id),
        rental_duration INTEGER NOT NULL DEFAULT 3,
        rental_rate REAL NOT NULL,
        length INTEGER,
        replacement_cost REAL NOT NULL,
        rating TEXT NOT NULL DEFAULT 'G'
            CHECK (rating IN ('G', 'PG', 'PG-13', 'R', 'NC-17')),
        last_update TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE film_actor (
        actor_id INTEGER NOT NULL REFERENCES actor(actor_id),
        film_id INTEGER NOT NULL REFERENCES film(film_id),
        PRIMARY KEY (actor_id, film_id)
    );

    CREATE TABLE film_category (
        film_id INTEGER NOT NULL REFERENCES film(film_id),
        category_id INTEGER NOT NULL REFERENCES category(category_id),
        PRIMARY KEY (film_id, category_id)
    );

    -- Stores and staff reference each other; manager is backfilled after the
    -- store's staff exist, so the column stays nullable.
    CREATE TABLE store (
        store_id INTEGER PRIMARY KEY AUTOINCREMENT,
        manager_staff_id INTEGER,
        address_id INTEGER NOT NULL REFERENCES address(address_id)
    );

    CREATE TABLE staff (
        staff_id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        address_id INTEGER NOT NULL REFERENCES address(address_id),
        email TEXT,
        store_id INTEGER NOT NULL REFERENCES store(store_id),
        active INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE customer (
        customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id INTEGER NOT NULL REFERENCES store(store_id),
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT,
        address_id INTEGER NOT NULL REFERENCES address(address_id),
        active INTEGER NOT NULL DEFAULT 1,
        create_date TEXT NOT NULL,
        segment TEXT NOT NULL DEFAULT 'average'
            CHECK (segment IN ('super_loyal', 'loyal', 'average', 'occasional')),
        lifetime_weeks REAL NOT NULL DEFAULT 60.0
    );

    CREATE TABLE inventory (
        inventory_id INTEGER PRIMARY KEY AUTOINCREMENT,
        film_id INTEGER NOT NULL REFERENCES film(film_id),
        store_id INTEGER NOT NULL REFERENCES store(store_id),
        date_purchased TEXT NOT NULL,
        purchased_by_staff_id INTEGER REFERENCES staff(staff_id),
        status TEXT NOT NULL DEFAULT 'available'
            CHECK (status IN ('available', 'rented', 'damaged', 'missing', 'maintenance'))
    );

    CREATE TABLE rental (
        rental_id INTEGER PRIMARY KEY AUTOINCREMENT,
        rental_date TEXT NOT NULL,
        inventory_id INTEGER NOT NULL REFERENCES inventory(inventory_id),
        customer_id INTEGER NOT NULL REFERENCES customer(customer_id),
        return_date TEXT,
        staff_id INTEGER NOT NULL REFERENCES staff(staff_id)
    );

    CREATE TABLE payment (
        payment_id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL REFERENCES customer(customer_id),
        staff_id INTEGER NOT NULL REFERENCES staff(staff_id),
        rental_id INTEGER NOT NULL UNIQUE REFERENCES rental(rental_id),
        amount REAL NOT NULL,
        payment_date TEXT NOT NULL
    );

    -- Indexes for the weekly hot path
    CREATE INDEX idx_city_country ON city(country_id);
    CREATE INDEX idx_film_category_category ON film_category(category_id);
    CREATE INDEX idx_customer_store_active ON customer(store_id, active);
    CREATE INDEX idx_inventory_store_status ON inventory(store_id, status);
    CREATE INDEX idx_inventory_film ON inventory(film_id);
    CREATE INDEX idx_rental_inventory_open ON rental(inventory_id, return_date);
    CREATE INDEX idx_rental_customer ON rental(customer_id);
    CREATE INDEX idx_rental_date ON rental(rental_date);
    CREATE INDEX idx_payment_rental ON payment(rental_id);
    "#,
    // Migration 2: Feature tables (market releases, purchasing log, late
    // fees, AR, inventory status audit). Created unconditionally; feature
    // flags gate the writes, not the DDL.
    r#"
    CREATE TABLE film_releases (
        release_id INTEGER PRIMARY KEY AUTOINCREMENT,
        film_id INTEGER NOT NULL UNIQUE REFERENCES film(film_id),
        release_quarter TEXT NOT NULL,
        release_date TEXT NOT NULL
    );

    CREATE TABLE inventory_purchases (
        purchase_id INTEGER PRIMARY KEY AUTOINCREMENT,
        film_id INTEGER NOT NULL REFERENCES film(film_id),
        inventory_id INTEGER NOT NULL REFERENCES inventory(inventory_id),
        staff_id INTEGER NOT NULL REFERENCES staff(staff_id),
        purchase_date TEXT NOT NULL
    );

    CREATE TABLE late_fees (
        fee_id INTEGER PRIMARY KEY AUTOINCREMENT,
        rental_id INTEGER NOT NULL UNIQUE REFERENCES rental(rental_id),
        customer_id INTEGER NOT NULL REFERENCES customer(customer_id),
        inventory_id INTEGER NOT NULL REFERENCES inventory(inventory_id),
        days_overdue INTEGER NOT NULL,
        daily_rate REAL NOT NULL,
        total_fee REAL NOT NULL,
        fee_date TEXT NOT NULL,
        paid INTEGER NOT NULL DEFAULT 0,
        paid_date TEXT,
        paid_amount REAL NOT NULL DEFAULT 0
    );

    CREATE TABLE customer_ar (
        ar_id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL UNIQUE REFERENCES customer(customer_id),
        total_owed REAL NOT NULL DEFAULT 0,
        total_paid REAL NOT NULL DEFAULT 0,
        ar_balance REAL NOT NULL DEFAULT 0,
        last_payment_date TEXT,
        days_past_due INTEGER NOT NULL DEFAULT 0,
        ar_status TEXT NOT NULL DEFAULT 'current'
            CHECK (ar_status IN ('current', '30_days', '60_days', '90_days_plus', 'written_off'))
    );

    CREATE TABLE inventory_status (
        status_id INTEGER PRIMARY KEY AUTOINCREMENT,
        inventory_id INTEGER NOT NULL REFERENCES inventory(inventory_id),
        status TEXT NOT NULL
            CHECK (status IN ('available', 'rented', 'damaged', 'missing', 'maintenance')),
        status_date TEXT NOT NULL,
        staff_id INTEGER REFERENCES staff(staff_id)
    );

    CREATE INDEX idx_film_releases_date ON film_releases(release_date);
    CREATE INDEX idx_late_fees_customer ON late_fees(customer_id);
    CREATE INDEX idx_late_fees_paid ON late_fees(paid);
    CREATE INDEX idx_inventory_status_inventory ON inventory_status(inventory_id);
    "#,
];

/// Get current schema version from database
fn get_schema_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Run all pending migrations (crash-safe, idempotent)
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    let target_version = MIGRATIONS.len() as u32;

    // Refuse to open a DB created by a newer rentalgen build
    if current_version > target_version {
        anyhow::bail!(
            "Database schema version {} is newer than this build supports (max {}). Please upgrade rentalgen.",
            current_version,
            target_version
        );
    }

    if current_version == target_version {
        return Ok(());
    }

    // Apply pending migrations one-by-one
    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as u32;
        if migration_version <= current_version {
            continue;
        }

        conn.execute_batch(migration)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", migration_version))?;

        log::debug!("Applied migration {}", migration_version);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_apply_to_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), MIGRATIONS.len() as u32);
    }

    #[test]
    fn migrations_twice_is_a_noop() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'rental'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }
}
