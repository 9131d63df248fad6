// Schema types and query helpers
// One struct + a handful of free functions per table, mirroring the tables
// the simulation reads and writes every week. Dates are TEXT in
// 'YYYY-MM-DD HH:MM:SS' (datetimes) or 'YYYY-MM-DD' (dates) form.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ----- Reference dimensions -----

pub fn insert_country(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO country (country) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_city(conn: &Connection, name: &str, country_id: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO city (city, country_id) VALUES (?1, ?2)",
        params![name, country_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_address(
    conn: &Connection,
    address: &str,
    district: &str,
    city_id: i64,
    postal_code: &str,
    phone: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO address (address, district, city_id, postal_code, phone)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![address, district, city_id, postal_code, phone],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_language(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO language (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_category(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO category (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn get_category_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT category_id FROM category WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn list_city_ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT city_id FROM city ORDER BY city_id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

pub fn list_language_ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT language_id FROM language ORDER BY language_id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// (category_id, name) pairs, id order.
pub fn list_categories(conn: &Connection) -> Result<Vec<(i64, String)>> {
    let mut stmt = conn.prepare("SELECT category_id, name FROM category ORDER BY category_id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_actor(conn: &Connection, first_name: &str, last_name: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO actor (first_name, last_name) VALUES (?1, ?2)",
        params![first_name, last_name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn count_actors(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM actor", [], |row| row.get(0))?;
    Ok(count)
}

// ----- Stores and staff -----

pub fn insert_store(conn: &Connection, address_id: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO store (address_id) VALUES (?1)",
        params![address_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_store_manager(conn: &Connection, store_id: i64, staff_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE store SET manager_staff_id = ?1 WHERE store_id = ?2",
        params![staff_id, store_id],
    )?;
    Ok(())
}

pub fn list_store_ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT store_id FROM store ORDER BY store_id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

pub fn insert_staff(
    conn: &Connection,
    first_name: &str,
    last_name: &str,
    address_id: i64,
    email: &str,
    store_id: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO staff (first_name, last_name, address_id, email, store_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![first_name, last_name, address_id, email, store_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_staff_for_store(conn: &Connection, store_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT staff_id FROM staff WHERE store_id = ?1 AND active = 1 ORDER BY staff_id",
    )?;
    let ids = stmt
        .query_map(params![store_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

// ----- Films -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Film {
    pub film_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub release_year: i32,
    pub language_id: i64,
    pub rental_duration: i64,
    pub rental_rate: f64,
    pub length: Option<i64>,
    pub replacement_cost: f64,
    pub rating: String,
}

#[derive(Debug, Clone)]
pub struct NewFilm {
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub language_id: i64,
    pub rental_duration: i64,
    pub rental_rate: f64,
    pub length: i64,
    pub replacement_cost: f64,
    pub rating: String,
}

pub fn insert_film(conn: &Connection, film: &NewFilm) -> Result<i64> {
    conn.execute(
        "INSERT INTO film (title, description, release_year, language_id, rental_duration,
                           rental_rate, length, replacement_cost, rating)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            film.title,
            film.description,
            film.release_year,
            film.language_id,
            film.rental_duration,
            film.rental_rate,
            film.length,
            film.replacement_cost,
            film.rating,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_film(conn: &Connection, film_id: i64) -> Result<Option<Film>> {
    let film = conn
        .query_row(
            "SELECT film_id, title, description, release_year, language_id, rental_duration,
                    rental_rate, length, replacement_cost, rating
             FROM film WHERE film_id = ?1",
            params![film_id],
            map_film,
        )
        .optional()?;
    Ok(film)
}

fn map_film(row: &rusqlite::Row) -> rusqlite::Result<Film> {
    Ok(Film {
        film_id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        release_year: row.get(3)?,
        language_id: row.get(4)?,
        rental_duration: row.get(5)?,
        rental_rate: row.get(6)?,
        length: row.get(7)?,
        replacement_cost: row.get(8)?,
        rating: row.get(9)?,
    })
}

pub fn count_films(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM film", [], |row| row.get(0))?;
    Ok(count)
}

pub fn link_film_category(conn: &Connection, film_id: i64, category_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO film_category (film_id, category_id) VALUES (?1, ?2)",
        params![film_id, category_id],
    )?;
    Ok(())
}

pub fn link_film_actor(conn: &Connection, actor_id: i64, film_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO film_actor (actor_id, film_id) VALUES (?1, ?2)",
        params![actor_id, film_id],
    )?;
    Ok(())
}

pub fn list_actor_ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT actor_id FROM actor ORDER BY actor_id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// All film ids in a category, oldest first.
pub fn films_in_category(conn: &Connection, category_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT film_id FROM film_category WHERE category_id = ?1 ORDER BY film_id",
    )?;
    let ids = stmt
        .query_map(params![category_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// Film ids in a category whose market release date is on/after `since`.
pub fn films_released_since(
    conn: &Connection,
    category_id: i64,
    since: &str,
) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT fc.film_id
         FROM film_category fc
         JOIN film_releases fr ON fr.film_id = fc.film_id
         WHERE fc.category_id = ?1 AND fr.release_date >= ?2
         ORDER BY fc.film_id",
    )?;
    let ids = stmt
        .query_map(params![category_id, since], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

// ----- Film releases -----

pub fn insert_film_release(
    conn: &Connection,
    film_id: i64,
    release_quarter: &str,
    release_date: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO film_releases (film_id, release_quarter, release_date)
         VALUES (?1, ?2, ?3)",
        params![film_id, release_quarter, release_date],
    )?;
    Ok(conn.last_insert_rowid())
}

/// (film_id, release_date) for market releases on/after `since`.
pub fn releases_since(conn: &Connection, since: &str) -> Result<Vec<(i64, String)>> {
    let mut stmt = conn.prepare(
        "SELECT film_id, release_date FROM film_releases
         WHERE release_date >= ?1 ORDER BY film_id",
    )?;
    let rows = stmt
        .query_map(params![since], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Fallback when film_releases is unavailable: approximate recency from
/// release_year. Returns (film_id, 'YYYY-01-01') for films of `year` or later.
pub fn releases_since_by_year(conn: &Connection, year: i32) -> Result<Vec<(i64, String)>> {
    let mut stmt = conn.prepare(
        "SELECT film_id, release_year FROM film WHERE release_year >= ?1 ORDER BY film_id",
    )?;
    let rows = stmt
        .query_map(params![year], |row| {
            let film_id: i64 = row.get(0)?;
            let release_year: i32 = row.get(1)?;
            Ok((film_id, format!("{:04}-01-01", release_year)))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ----- Inventory -----

pub fn insert_inventory(
    conn: &Connection,
    film_id: i64,
    store_id: i64,
    date_purchased: &str,
    staff_id: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO inventory (film_id, store_id, date_purchased, purchased_by_staff_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![film_id, store_id, date_purchased, staff_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn count_inventory(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM inventory", [], |row| row.get(0))?;
    Ok(count)
}

#[derive(Debug, Clone, Copy)]
pub struct AvailableCopy {
    pub inventory_id: i64,
    pub film_id: i64,
}

/// Copies on the floor at a store, id order.
pub fn available_inventory(conn: &Connection, store_id: i64) -> Result<Vec<AvailableCopy>> {
    let mut stmt = conn.prepare(
        "SELECT inventory_id, film_id FROM inventory
         WHERE store_id = ?1 AND status = 'available'
         ORDER BY inventory_id",
    )?;
    let copies = stmt
        .query_map(params![store_id], |row| {
            Ok(AvailableCopy {
                inventory_id: row.get(0)?,
                film_id: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(copies)
}

pub fn get_inventory_status(conn: &Connection, inventory_id: i64) -> Result<Option<String>> {
    let status = conn
        .query_row(
            "SELECT status FROM inventory WHERE inventory_id = ?1",
            params![inventory_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(status)
}

pub fn set_inventory_status(conn: &Connection, inventory_id: i64, status: &str) -> Result<()> {
    conn.execute(
        "UPDATE inventory SET status = ?1 WHERE inventory_id = ?2",
        params![status, inventory_id],
    )?;
    Ok(())
}

pub fn insert_inventory_purchase(
    conn: &Connection,
    film_id: i64,
    inventory_id: i64,
    staff_id: i64,
    purchase_date: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO inventory_purchases (film_id, inventory_id, staff_id, purchase_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![film_id, inventory_id, staff_id, purchase_date],
    )?;
    Ok(conn.last_insert_rowid())
}

// ----- Customers -----

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub store_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address_id: i64,
    pub create_date: String,
    pub segment: String,
    pub lifetime_weeks: f64,
}

pub fn insert_customer(conn: &Connection, customer: &NewCustomer) -> Result<i64> {
    conn.execute(
        "INSERT INTO customer (store_id, first_name, last_name, email, address_id,
                               active, create_date, segment, lifetime_weeks)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7, ?8)",
        params![
            customer.store_id,
            customer.first_name,
            customer.last_name,
            customer.email,
            customer.address_id,
            customer.create_date,
            customer.segment,
            customer.lifetime_weeks,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

#[derive(Debug, Clone)]
pub struct ActiveCustomer {
    pub customer_id: i64,
    pub store_id: i64,
    pub segment: String,
    pub create_date: String,
}

pub fn list_active_customers(conn: &Connection) -> Result<Vec<ActiveCustomer>> {
    let mut stmt = conn.prepare(
        "SELECT customer_id, store_id, segment, create_date
         FROM customer WHERE active = 1 ORDER BY customer_id",
    )?;
    let customers = stmt
        .query_map([], |row| {
            Ok(ActiveCustomer {
                customer_id: row.get(0)?,
                store_id: row.get(1)?,
                segment: row.get(2)?,
                create_date: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(customers)
}

pub fn list_inactive_customer_ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt =
        conn.prepare("SELECT customer_id FROM customer WHERE active = 0 ORDER BY customer_id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

pub fn set_customer_active(conn: &Connection, customer_id: i64, active: bool) -> Result<()> {
    conn.execute(
        "UPDATE customer SET active = ?1 WHERE customer_id = ?2",
        params![active as i64, customer_id],
    )?;
    Ok(())
}

pub fn count_active_customers(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM customer WHERE active = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Active customer counts per segment, segment-name order.
pub fn active_segment_counts(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT segment, COUNT(*) FROM customer WHERE active = 1
         GROUP BY segment ORDER BY segment",
    )?;
    let counts = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(counts)
}

// ----- Rentals -----

pub fn insert_rental(
    conn: &Connection,
    rental_date: &str,
    inventory_id: i64,
    customer_id: i64,
    staff_id: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO rental (rental_date, inventory_id, customer_id, staff_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![rental_date, inventory_id, customer_id, staff_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_return_date(conn: &Connection, rental_id: i64, return_date: &str) -> Result<()> {
    conn.execute(
        "UPDATE rental SET return_date = ?1 WHERE rental_id = ?2",
        params![return_date, rental_id],
    )?;
    Ok(())
}

/// True if the copy has a rental with no return date yet.
pub fn has_open_rental(conn: &Connection, inventory_id: i64) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM rental WHERE inventory_id = ?1 AND return_date IS NULL",
        params![inventory_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn count_rentals(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM rental", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_open_rentals(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM rental WHERE return_date IS NULL",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Historical rental counts per film over the whole rental table.
pub fn film_rental_counts(conn: &Connection) -> Result<Vec<(i64, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT i.film_id, COUNT(*) FROM rental r
         JOIN inventory i ON i.inventory_id = r.inventory_id
         GROUP BY i.film_id ORDER BY i.film_id",
    )?;
    let counts = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(counts)
}

#[derive(Debug, Clone)]
pub struct OpenRental {
    pub rental_id: i64,
    pub rental_date: String,
    pub inventory_id: i64,
    pub customer_id: i64,
    pub staff_id: i64,
    pub store_id: i64,
    pub film_id: i64,
    pub rental_duration: i64,
    pub rental_rate: f64,
}

/// Open rentals created in [from, to), id order. The return engine walks the
/// week's batch through this.
pub fn open_rentals_in_range(conn: &Connection, from: &str, to: &str) -> Result<Vec<OpenRental>> {
    let mut stmt = conn.prepare(
        "SELECT r.rental_id, r.rental_date, r.inventory_id, r.customer_id, r.staff_id,
                i.store_id, i.film_id, f.rental_duration, f.rental_rate
         FROM rental r
         JOIN inventory i ON i.inventory_id = r.inventory_id
         JOIN film f ON f.film_id = i.film_id
         WHERE r.return_date IS NULL AND r.rental_date >= ?1 AND r.rental_date < ?2
         ORDER BY r.rental_id",
    )?;
    let rentals = stmt
        .query_map(params![from, to], map_open_rental)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rentals)
}

fn map_open_rental(row: &rusqlite::Row) -> rusqlite::Result<OpenRental> {
    Ok(OpenRental {
        rental_id: row.get(0)?,
        rental_date: row.get(1)?,
        inventory_id: row.get(2)?,
        customer_id: row.get(3)?,
        staff_id: row.get(4)?,
        store_id: row.get(5)?,
        film_id: row.get(6)?,
        rental_duration: row.get(7)?,
        rental_rate: row.get(8)?,
    })
}

#[derive(Debug, Clone)]
pub struct OverdueRental {
    pub rental_id: i64,
    pub customer_id: i64,
    pub inventory_id: i64,
    pub rental_date: String,
    pub return_date: Option<String>,
    pub rental_duration: i64,
}

/// Rentals whose due date has passed and whose return is missing or later
/// than due. The fee computation happens in the caller; this just narrows the
/// scan to rentals old enough to possibly be overdue.
pub fn rentals_past_due(conn: &Connection, due_cutoff: &str) -> Result<Vec<OverdueRental>> {
    let mut stmt = conn.prepare(
        "SELECT r.rental_id, r.customer_id, r.inventory_id, r.rental_date,
                r.return_date, f.rental_duration
         FROM rental r
         JOIN inventory i ON i.inventory_id = r.inventory_id
         JOIN film f ON f.film_id = i.film_id
         WHERE r.rental_date < ?1
         ORDER BY r.rental_id",
    )?;
    let rentals = stmt
        .query_map(params![due_cutoff], |row| {
            Ok(OverdueRental {
                rental_id: row.get(0)?,
                customer_id: row.get(1)?,
                inventory_id: row.get(2)?,
                rental_date: row.get(3)?,
                return_date: row.get(4)?,
                rental_duration: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rentals)
}

// ----- Payments -----

pub fn insert_payment(
    conn: &Connection,
    customer_id: i64,
    staff_id: i64,
    rental_id: i64,
    amount: f64,
    payment_date: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO payment (customer_id, staff_id, rental_id, amount, payment_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![customer_id, staff_id, rental_id, amount, payment_date],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn count_payments(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM payment", [], |row| row.get(0))?;
    Ok(count)
}

// ----- Late fees -----

#[derive(Debug, Clone)]
pub struct LateFeeRow {
    pub rental_id: i64,
    pub customer_id: i64,
    pub inventory_id: i64,
    pub days_overdue: i64,
    pub daily_rate: f64,
    pub total_fee: f64,
    pub fee_date: String,
}

/// Stable upsert keyed by rental_id: re-running a week rewrites the same
/// row. fee_date is pinned at first assessment so AR aging accumulates; only
/// the accrual fields refresh as an open rental stays out.
pub fn upsert_late_fee(conn: &Connection, fee: &LateFeeRow) -> Result<()> {
    conn.execute(
        "INSERT INTO late_fees (rental_id, customer_id, inventory_id, days_overdue,
                                daily_rate, total_fee, fee_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(rental_id) DO UPDATE SET
             days_overdue = excluded.days_overdue,
             daily_rate = excluded.daily_rate,
             total_fee = excluded.total_fee",
        params![
            fee.rental_id,
            fee.customer_id,
            fee.inventory_id,
            fee.days_overdue,
            fee.daily_rate,
            fee.total_fee,
            fee.fee_date,
        ],
    )?;
    Ok(())
}

/// Customers holding any late fee, id order.
pub fn customers_with_fees(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT customer_id FROM late_fees ORDER BY customer_id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

#[derive(Debug, Clone, Default)]
pub struct FeeTotals {
    pub total_owed: f64,
    pub total_paid: f64,
    pub oldest_unpaid_fee_date: Option<String>,
    pub last_paid_date: Option<String>,
}

pub fn fee_totals_for_customer(conn: &Connection, customer_id: i64) -> Result<FeeTotals> {
    let totals = conn.query_row(
        "SELECT COALESCE(SUM(total_fee), 0),
                COALESCE(SUM(paid_amount), 0),
                MIN(CASE WHEN paid = 0 THEN fee_date END),
                MAX(paid_date)
         FROM late_fees WHERE customer_id = ?1",
        params![customer_id],
        |row| {
            Ok(FeeTotals {
                total_owed: row.get(0)?,
                total_paid: row.get(1)?,
                oldest_unpaid_fee_date: row.get(2)?,
                last_paid_date: row.get(3)?,
            })
        },
    )?;
    Ok(totals)
}

pub fn late_fee_summary(conn: &Connection) -> Result<(i64, f64, f64)> {
    let summary = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(total_fee), 0),
                COALESCE(SUM(CASE WHEN paid = 0 THEN total_fee - paid_amount ELSE 0 END), 0)
         FROM late_fees",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    Ok(summary)
}

// ----- Customer AR -----

#[derive(Debug, Clone)]
pub struct CustomerArRow {
    pub customer_id: i64,
    pub total_owed: f64,
    pub total_paid: f64,
    pub ar_balance: f64,
    pub last_payment_date: Option<String>,
    pub days_past_due: i64,
    pub ar_status: String,
}

pub fn upsert_customer_ar(conn: &Connection, ar: &CustomerArRow) -> Result<()> {
    conn.execute(
        "INSERT INTO customer_ar (customer_id, total_owed, total_paid, ar_balance,
                                  last_payment_date, days_past_due, ar_status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(customer_id) DO UPDATE SET
             total_owed = excluded.total_owed,
             total_paid = excluded.total_paid,
             ar_balance = excluded.ar_balance,
             last_payment_date = excluded.last_payment_date,
             days_past_due = excluded.days_past_due,
             ar_status = excluded.ar_status",
        params![
            ar.customer_id,
            ar.total_owed,
            ar.total_paid,
            ar.ar_balance,
            ar.last_payment_date,
            ar.days_past_due,
            ar.ar_status,
        ],
    )?;
    Ok(())
}

pub fn get_customer_ar(conn: &Connection, customer_id: i64) -> Result<Option<CustomerArRow>> {
    let row = conn
        .query_row(
            "SELECT customer_id, total_owed, total_paid, ar_balance, last_payment_date,
                    days_past_due, ar_status
             FROM customer_ar WHERE customer_id = ?1",
            params![customer_id],
            |row| {
                Ok(CustomerArRow {
                    customer_id: row.get(0)?,
                    total_owed: row.get(1)?,
                    total_paid: row.get(2)?,
                    ar_balance: row.get(3)?,
                    last_payment_date: row.get(4)?,
                    days_past_due: row.get(5)?,
                    ar_status: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// AR row counts per aging bucket, status order.
pub fn ar_aging_counts(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT ar_status, COUNT(*) FROM customer_ar GROUP BY ar_status ORDER BY ar_status",
    )?;
    let counts = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(counts)
}

// ----- Inventory status audit -----

pub fn insert_inventory_status_event(
    conn: &Connection,
    inventory_id: i64,
    status: &str,
    status_date: &str,
    staff_id: Option<i64>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO inventory_status (inventory_id, status, status_date, staff_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![inventory_id, status, status_date, staff_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Copies sitting in a repairable state whose last status event is strictly
/// before the cutoff, id order.
pub fn repairable_inventory(
    conn: &Connection,
    status: &str,
    cutoff_date: &str,
) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT i.inventory_id FROM inventory i
         WHERE i.status = ?1
           AND COALESCE((SELECT MAX(s.status_date) FROM inventory_status s
                         WHERE s.inventory_id = i.inventory_id), '') < ?2
         ORDER BY i.inventory_id",
    )?;
    let ids = stmt
        .query_map(params![status, cutoff_date], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

// ----- Summary queries -----

pub fn rental_date_range(conn: &Connection) -> Result<Option<(String, String)>> {
    let range = conn
        .query_row(
            "SELECT MIN(rental_date), MAX(rental_date) FROM rental",
            [],
            |row| {
                let min: Option<String> = row.get(0)?;
                let max: Option<String> = row.get(1)?;
                Ok(min.zip(max))
            },
        )
        .optional()?
        .flatten();
    Ok(range)
}

/// Rental counts per calendar year, year order.
pub fn rentals_per_year(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT substr(rental_date, 1, 4) AS year, COUNT(*)
         FROM rental GROUP BY year ORDER BY year",
    )?;
    let counts = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(counts)
}
