// Rental sampler
// The weekly hot path: expected volume is split over days, then each rental
// picks an activity-weighted customer, a film by Zipfian popularity over
// live rental counts (with a decaying new-release boost), and one available
// copy at the customer's store.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;

use crate::config::{Config, Segment};
use crate::db::schema::{self, ActiveCustomer};
use crate::db::{Capabilities, ReleaseDateSource};
use crate::error::{Result, SimError};
use crate::sim::clock::{fmt_datetime, parse_date, SimClock};
use crate::sim::inventory;
use crate::sim::rng::SimRng;
use crate::sim::volume::{self, WeekVolume};

#[derive(Debug, Clone, Default)]
pub struct RentalStats {
    pub written: u32,
    /// Rentals dropped because the chosen store had nothing on the shelf.
    pub no_inventory: u32,
    /// Rentals dropped because no customer was active.
    pub no_customers: u32,
}

/// Emit one week of rentals.
#[allow(clippy::too_many_arguments)]
pub fn run_week(
    conn: &Connection,
    config: &Config,
    clock: &SimClock,
    caps: &Capabilities,
    w: u32,
    week_volume: &WeekVolume,
    store_staff: &BTreeMap<i64, Vec<i64>>,
    film_counts: &mut BTreeMap<i64, i64>,
    rng: &mut SimRng,
) -> Result<RentalStats> {
    let mut stats = RentalStats::default();

    let customers = schema::list_active_customers(conn)?;
    let day_counts = volume::distribute_over_days(week_volume.expected, w, clock, rng);

    if customers.is_empty() {
        stats.no_customers = week_volume.expected;
        return Ok(stats);
    }

    let weights = customer_weights(config, &customers);
    let recent_releases = load_recent_releases(conn, config, caps, clock, w)?;
    let audit = config.generation.advanced_features.inventory_status.enabled
        && caps.has_inventory_status;

    for (d, count) in day_counts.iter().enumerate() {
        let date = clock.day_of_week(w, d as u32);
        for _ in 0..*count {
            let customer = &customers[rng.weighted_index(&weights)];
            let placed = emit_one(
                conn,
                config,
                customer,
                date,
                &recent_releases,
                store_staff,
                film_counts,
                audit,
                rng,
            )?;
            if placed {
                stats.written += 1;
            } else {
                stats.no_inventory += 1;
            }
        }
    }

    Ok(stats)
}

/// Per-customer sampling weight from the segment's activity multiplier.
fn customer_weights(config: &Config, customers: &[ActiveCustomer]) -> Vec<f64> {
    let segments = &config.generation.customer_segments;
    customers
        .iter()
        .map(|c| match Segment::from_str(&c.segment) {
            Some(segment) => segments.get(segment).activity_multiplier,
            None => 1.0,
        })
        .collect()
}

/// Release dates inside the boost window, keyed by film. Uses film_releases
/// when present, else approximates from release_year.
fn load_recent_releases(
    conn: &Connection,
    config: &Config,
    caps: &Capabilities,
    clock: &SimClock,
    w: u32,
) -> Result<BTreeMap<i64, NaiveDate>> {
    let boost = &config.generation.new_movie_boost;
    let mut releases = BTreeMap::new();
    if !boost.enabled {
        return Ok(releases);
    }

    let window_start = clock.week_start(w) - Duration::days(boost.days_to_boost);
    let rows = match caps.release_dates {
        ReleaseDateSource::ReleaseTable => {
            schema::releases_since(conn, &crate::sim::clock::fmt_date(window_start))?
        }
        ReleaseDateSource::ReleaseYear => {
            schema::releases_since_by_year(conn, window_start.year())?
        }
    };
    for (film_id, date_str) in rows {
        releases.insert(film_id, parse_date(&date_str)?);
    }
    Ok(releases)
}

/// Place a single rental for the given customer on the given day. Returns
/// false when the store has no available copy (the rental is dropped, not
/// re-sampled against a different customer).
#[allow(clippy::too_many_arguments)]
fn emit_one(
    conn: &Connection,
    config: &Config,
    customer: &ActiveCustomer,
    date: NaiveDate,
    recent_releases: &BTreeMap<i64, NaiveDate>,
    store_staff: &BTreeMap<i64, Vec<i64>>,
    film_counts: &mut BTreeMap<i64, i64>,
    audit: bool,
    rng: &mut SimRng,
) -> Result<bool> {
    let candidates = schema::available_inventory(conn, customer.store_id)?;
    if candidates.is_empty() {
        return Ok(false);
    }

    // Group copies by film; BTreeMap keeps film order deterministic.
    let mut by_film: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for copy in &candidates {
        by_film.entry(copy.film_id).or_default().push(copy.inventory_id);
    }

    let film_id = sample_film(config, &by_film, film_counts, recent_releases, date, rng);
    let copies = &by_film[&film_id];
    let inventory_id = copies[rng.index(copies.len())];

    let staff = &store_staff[&customer.store_id];
    let staff_id = *rng.pick(staff);

    let rental_date = fmt_datetime(SimClock::business_datetime(date, rng));
    insert_rental_row(conn, &rental_date, inventory_id, customer.customer_id, staff_id)?;
    inventory::mark_rented(conn, audit, inventory_id, date, staff_id)?;

    *film_counts.entry(film_id).or_insert(0) += 1;
    Ok(true)
}

/// Write the rental row. A constraint violation here means the copy's
/// status raced an update inside the batch; the row is retried once, and a
/// second failure is fatal for the batch.
fn insert_rental_row(
    conn: &Connection,
    rental_date: &str,
    inventory_id: i64,
    customer_id: i64,
    staff_id: i64,
) -> Result<()> {
    match schema::insert_rental(conn, rental_date, inventory_id, customer_id, staff_id) {
        Ok(_) => Ok(()),
        Err(first) if first.is_constraint_violation() => {
            log::warn!(
                "Rental insert on copy {} hit a constraint ({}); retrying row once",
                inventory_id,
                first
            );
            schema::insert_rental(conn, rental_date, inventory_id, customer_id, staff_id)
                .map(|_| ())
                .map_err(|second| {
                    SimError::Constraint(format!(
                        "rental on inventory {} failed twice: {}",
                        inventory_id, second
                    ))
                })
        }
        Err(e) => Err(e),
    }
}

/// Zipfian film choice over the candidate set: rank films by live rental
/// count (ties to the lower film id), weight 1/rank^alpha, then apply the
/// decaying new-release boost.
fn sample_film(
    config: &Config,
    by_film: &BTreeMap<i64, Vec<i64>>,
    film_counts: &BTreeMap<i64, i64>,
    recent_releases: &BTreeMap<i64, NaiveDate>,
    date: NaiveDate,
    rng: &mut SimRng,
) -> i64 {
    let alpha = config.generation.rental_distribution.alpha;
    let boost = &config.generation.new_movie_boost;

    // BTreeMap iteration is film-id ascending, so a stable sort by count
    // descending leaves ties in film-id order.
    let mut ranked: Vec<(i64, i64)> = by_film
        .keys()
        .map(|film_id| (*film_id, film_counts.get(film_id).copied().unwrap_or(0)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let film_ids: Vec<i64> = ranked.iter().map(|(film_id, _)| *film_id).collect();
    let mut weights: Vec<f64> = (1..=film_ids.len())
        .map(|rank| 1.0 / (rank as f64).powf(alpha))
        .collect();

    if boost.enabled {
        for (i, film_id) in film_ids.iter().enumerate() {
            if let Some(release_date) = recent_releases.get(film_id) {
                let age = (date - *release_date).num_days();
                if age < 0 || age > boost.days_to_boost {
                    continue;
                }
                if (*film_id % 100) as u32 >= boost.boost_percentage {
                    continue;
                }
                let decay = 1.0 - age as f64 / boost.days_to_boost as f64;
                let effective = 1.0 + (boost.boost_factor - 1.0) * decay;
                weights[i] *= effective;
            }
        }
    }

    film_ids[rng.weighted_index(&weights)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boost_config(percentage: u32) -> Config {
        let mut config = Config::default();
        config.generation.new_movie_boost.enabled = true;
        config.generation.new_movie_boost.boost_percentage = percentage;
        config.generation.new_movie_boost.days_to_boost = 40;
        config.generation.new_movie_boost.boost_factor = 2.0;
        config
    }

    fn sample_many(
        config: &Config,
        by_film: &BTreeMap<i64, Vec<i64>>,
        releases: &BTreeMap<i64, NaiveDate>,
        date: NaiveDate,
        n: usize,
    ) -> BTreeMap<i64, u32> {
        let mut rng = SimRng::new(77);
        let counts = BTreeMap::new();
        let mut hits: BTreeMap<i64, u32> = BTreeMap::new();
        for _ in 0..n {
            let film = sample_film(config, by_film, &counts, releases, date, &mut rng);
            *hits.entry(film).or_insert(0) += 1;
        }
        hits
    }

    #[test]
    fn boost_gates_on_film_id_modulus() {
        // Both 40 and 140 are 40 mod 100, so with percentage 50 both boost.
        let date = NaiveDate::from_ymd_opt(2002, 6, 1).unwrap();
        let mut by_film = BTreeMap::new();
        by_film.insert(40_i64, vec![1_i64]);
        by_film.insert(140_i64, vec![2_i64]);
        let mut releases = BTreeMap::new();
        releases.insert(40_i64, date);
        releases.insert(140_i64, date);

        // percentage 50: both films get the boost, so the split stays even
        let boosted = sample_many(&boost_config(50), &by_film, &releases, date, 4000);
        let a = *boosted.get(&40).unwrap_or(&0) as f64;
        let b = *boosted.get(&140).unwrap_or(&0) as f64;
        assert!((a / (a + b) - 0.5).abs() < 0.05);

        // percentage 0: control, no boost anywhere, identical even split
        let control = sample_many(&boost_config(0), &by_film, &releases, date, 4000);
        let a = *control.get(&40).unwrap_or(&0) as f64;
        let b = *control.get(&140).unwrap_or(&0) as f64;
        assert!((a / (a + b) - 0.5).abs() < 0.05);
    }

    #[test]
    fn boost_shifts_mass_toward_released_film() {
        let date = NaiveDate::from_ymd_opt(2002, 6, 1).unwrap();
        // Two equally-ranked films; only film 40 was released recently.
        let mut by_film = BTreeMap::new();
        by_film.insert(40_i64, vec![1_i64]);
        by_film.insert(141_i64, vec![2_i64]);
        let mut releases = BTreeMap::new();
        releases.insert(40_i64, date);

        let hits = sample_many(&boost_config(50), &by_film, &releases, date, 4000);
        let boosted = *hits.get(&40).unwrap_or(&0) as f64;
        let plain = *hits.get(&141).unwrap_or(&0) as f64;
        // Fresh release gets 2x weight: expect roughly a 2:1 split
        let share = boosted / (boosted + plain);
        assert!(share > 0.60 && share < 0.73, "share {:.3}", share);
    }

    #[test]
    fn boost_decays_with_age() {
        let release = NaiveDate::from_ymd_opt(2002, 5, 1).unwrap();
        let mut by_film = BTreeMap::new();
        by_film.insert(40_i64, vec![1_i64]);
        by_film.insert(141_i64, vec![2_i64]);
        let mut releases = BTreeMap::new();
        releases.insert(40_i64, release);

        let config = boost_config(50);
        // Day 39 of a 40-day window: boost nearly gone
        let late = release + Duration::days(39);
        let hits = sample_many(&config, &by_film, &releases, late, 4000);
        let boosted = *hits.get(&40).unwrap_or(&0) as f64;
        let plain = *hits.get(&141).unwrap_or(&0) as f64;
        let share = boosted / (boosted + plain);
        assert!(share < 0.56, "share {:.3}", share);
    }

    #[test]
    fn constraint_violation_retries_then_goes_fatal() {
        let conn = crate::db::open_in_memory().unwrap();
        let mut config = Config::default();
        config.generation.films_count = 2;
        config.generation.stores_count = 1;
        config.generation.initial_customers = 1;
        let clock = SimClock::new("2002-01-01").unwrap();
        let mut rng = SimRng::new(1);
        crate::seed::seed_all(&conn, &config, &clock, &mut rng).unwrap();

        // A valid row goes straight through
        insert_rental_row(&conn, "2002-01-02 12:00:00", 1, 1, 1).unwrap();

        // A missing customer trips the foreign key on both attempts and
        // surfaces as a fatal constraint error, not a generic database one
        let err = insert_rental_row(&conn, "2002-01-03 12:00:00", 2, 9999, 1).unwrap_err();
        assert!(matches!(err, SimError::Constraint(_)));
    }

    #[test]
    fn zipf_ranks_by_live_counts_with_id_tiebreak() {
        let config = Config::default();
        let date = NaiveDate::from_ymd_opt(2002, 3, 1).unwrap();
        let releases = BTreeMap::new();

        let mut by_film = BTreeMap::new();
        by_film.insert(1_i64, vec![10_i64]);
        by_film.insert(2_i64, vec![11_i64]);
        by_film.insert(3_i64, vec![12_i64]);

        let mut counts = BTreeMap::new();
        counts.insert(2_i64, 50_i64);
        counts.insert(3_i64, 10_i64);

        let mut rng = SimRng::new(9);
        let mut hits: BTreeMap<i64, u32> = BTreeMap::new();
        for _ in 0..6000 {
            let film = sample_film(&config, &by_film, &counts, &releases, date, &mut rng);
            *hits.entry(film).or_insert(0) += 1;
        }
        // Rank order is 2 (rank 1), 3 (rank 2), 1 (rank 3): alpha=1 gives
        // weights 1, 1/2, 1/3
        assert!(hits[&2] > hits[&3]);
        assert!(hits[&3] > hits[&1]);
        let total = 6000.0;
        assert!((hits[&2] as f64 / total - 6.0 / 11.0).abs() < 0.05);
    }
}
