// Simulation kernel
// The Kernel owns the configuration, the database connection, the seeded
// RNG, and the simulated clock, and advances the store one week at a time:
// releases -> customers -> rentals -> returns -> fees -> inventory. Each
// week commits as a single transaction.

pub mod clock;
pub mod customers;
pub mod fees;
pub mod inventory;
pub mod releases;
pub mod rentals;
pub mod returns;
pub mod rng;
pub mod summary;
pub mod volume;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rusqlite::Connection;

use crate::config::Config;
use crate::constants::{CONNECT_BASE_BACKOFF_MS, CONNECT_MAX_ATTEMPTS};
use crate::db::{self, schema, Capabilities};
use crate::error::{Result, SimError};
use crate::seed;
use clock::SimClock;
use rng::SimRng;
use summary::{RunSummary, WeekReport};

/// Open the database with retry/backoff. DDL failures are fatal on the
/// first attempt; only connection-level errors are retried.
pub fn connect_with_retry(db_path: &Path) -> Result<Connection> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match db::ensure_database(db_path) {
            Ok(conn) => return Ok(conn),
            Err(SimError::Connection(msg)) if attempt < CONNECT_MAX_ATTEMPTS => {
                let backoff = CONNECT_BASE_BACKOFF_MS * (1u64 << (attempt - 1));
                log::warn!(
                    "Connection attempt {}/{} failed ({}); retrying in {}ms",
                    attempt,
                    CONNECT_MAX_ATTEMPTS,
                    msg,
                    backoff
                );
                std::thread::sleep(std::time::Duration::from_millis(backoff));
            }
            Err(e) => return Err(e),
        }
    }
}

pub struct Kernel {
    config: Config,
    conn: Connection,
    clock: SimClock,
    rng: SimRng,
    caps: Capabilities,
    cancel: Option<Arc<AtomicBool>>,

    // Working set: identifier caches for the current run. The database owns
    // every entity; these are opaque ids only.
    categories: Vec<(i64, String)>,
    language_ids: Vec<i64>,
    city_ids: Vec<i64>,
    store_ids: Vec<i64>,
    store_staff: BTreeMap<i64, Vec<i64>>,
    film_counts: BTreeMap<i64, i64>,
    customer_seq: u64,
    no_candidates_total: u32,
}

impl Kernel {
    pub fn new(config: Config, conn: Connection) -> Result<Kernel> {
        config.validate()?;
        let clock = SimClock::new(&config.simulation.start_date)?;
        let rng = SimRng::new(config.simulation.seed);
        let caps = Capabilities::probe(&conn)?;

        Ok(Kernel {
            config,
            conn,
            clock,
            rng,
            caps,
            cancel: None,
            categories: Vec::new(),
            language_ids: Vec::new(),
            city_ids: Vec::new(),
            store_ids: Vec::new(),
            store_staff: BTreeMap::new(),
            film_counts: BTreeMap::new(),
            customer_seq: 0,
            no_candidates_total: 0,
        })
    }

    /// Cooperative cancellation: checked at week boundaries, so the current
    /// batch always commits before the run stops.
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Hand the connection back (an in-memory database cannot be reopened).
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Seed (when empty), then advance week 1..=N. Returns the closing
    /// summary; on a fatal error, reports the failing and last-committed
    /// weeks before propagating.
    pub fn run(&mut self) -> Result<RunSummary> {
        let tx = self.conn.unchecked_transaction()?;
        seed::seed_all(&tx, &self.config, &self.clock, &mut self.rng)?;
        tx.commit()?;

        self.load_working_set()?;

        let total_weeks = self.config.simulation.weeks;
        let mut last_committed = 0;

        for w in 1..=total_weeks {
            match self.run_week_with_retry(w) {
                Ok(report) => {
                    last_committed = w;
                    self.no_candidates_total += report.no_candidates();
                    summary::print_week(&report);
                }
                Err(e) => {
                    eprintln!(
                        "Fatal at week {} ({}); last committed week: {}",
                        w, e, last_committed
                    );
                    return Err(e);
                }
            }

            if self.cancelled() {
                eprintln!(
                    "Interrupted; week {} committed, stopping before week {}",
                    last_committed,
                    last_committed + 1
                );
                return Err(SimError::Cancelled);
            }
        }

        let run_summary = summary::collect(
            &self.conn,
            &self.config,
            &self.caps,
            total_weeks,
            self.no_candidates_total,
        )?;
        summary::print_summary(&run_summary);
        Ok(run_summary)
    }

    fn load_working_set(&mut self) -> Result<()> {
        self.categories = schema::list_categories(&self.conn)?;
        self.language_ids = schema::list_language_ids(&self.conn)?;
        self.city_ids = schema::list_city_ids(&self.conn)?;
        self.store_ids = schema::list_store_ids(&self.conn)?;

        self.store_staff.clear();
        for &store_id in &self.store_ids {
            let staff = schema::list_staff_for_store(&self.conn, store_id)?;
            if staff.is_empty() {
                return Err(SimError::SchemaDrift(format!(
                    "store {} has no staff",
                    store_id
                )));
            }
            self.store_staff.insert(store_id, staff);
        }

        // Live popularity counts: start from the table, then increment as
        // rentals are written so the Zipf ranking always sees the present.
        self.film_counts = schema::film_rental_counts(&self.conn)?.into_iter().collect();

        self.customer_seq = self
            .conn
            .query_row("SELECT COUNT(*) FROM customer", [], |row| row.get::<_, i64>(0))?
            as u64;
        Ok(())
    }

    /// One week as one transaction; a failed commit rolls back and retries
    /// once before becoming fatal. Row-level constraint violations are a
    /// separate policy: they get their single retry at the insert site and
    /// arrive here as already-fatal `Constraint` errors.
    fn run_week_with_retry(&mut self, w: u32) -> Result<WeekReport> {
        match self.run_week(w) {
            Ok(report) => Ok(report),
            Err(SimError::Database(first)) => {
                log::warn!("Week {} batch failed ({}); retrying once", w, first);
                self.run_week(w)
            }
            Err(e) => Err(e),
        }
    }

    fn run_week(&mut self, w: u32) -> Result<WeekReport> {
        let tx = self.conn.unchecked_transaction()?;

        let releases = releases::run_week(
            &tx,
            &self.config,
            &self.clock,
            &self.caps,
            w,
            &self.categories,
            &self.language_ids,
            &self.store_staff,
            &mut self.rng,
        )?;

        let customer_stats = customers::run_week(
            &tx,
            &self.config,
            &self.clock,
            w,
            &self.store_ids,
            &self.city_ids,
            &mut self.customer_seq,
            &mut self.rng,
        )?;

        let week_volume = volume::resolve_week(&self.config, &self.clock, w, &mut self.rng);

        let rental_stats = rentals::run_week(
            &tx,
            &self.config,
            &self.clock,
            &self.caps,
            w,
            &week_volume,
            &self.store_staff,
            &mut self.film_counts,
            &mut self.rng,
        )?;

        let return_stats =
            returns::run_week(&tx, &self.config, &self.clock, &self.caps, w, &mut self.rng)?;

        let fee_stats = fees::process_week(&tx, &self.config, &self.clock, &self.caps, w)?;

        let repaired = inventory::sync_week(&tx, &self.config, &self.caps, &self.clock, w)?;

        tx.commit()?;

        Ok(WeekReport {
            week: w,
            total_weeks: self.config.simulation.weeks,
            volume: week_volume,
            releases,
            customers: customer_stats,
            rentals: rental_stats,
            returns: return_stats,
            fees: fee_stats,
            repaired,
        })
    }
}
