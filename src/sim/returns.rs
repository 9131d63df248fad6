// Return & payment engine
// Each week's rentals resolve at the end of the week: 70% come back on time
// (skewed toward early-week days), 20% never come back, and the rest are
// 1-10 days late. Every completed rental gets exactly one payment at the
// film's rental price.

use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;

use crate::config::Config;
use crate::constants::{LATE_RETURN_MAX_DAYS, RETURN_NEVER_PROBABILITY, RETURN_ON_TIME_PROBABILITY};
use crate::db::schema::{self, OpenRental};
use crate::db::Capabilities;
use crate::error::Result;
use crate::sim::clock::{fmt_date, fmt_datetime, parse_datetime, SimClock};
use crate::sim::inventory;
use crate::sim::rng::SimRng;

#[derive(Debug, Clone, Default)]
pub struct ReturnStats {
    pub returned: u32,
    pub payments: u32,
    pub left_open: u32,
    pub damaged: u32,
    pub missing: u32,
    pub maintenance: u32,
}

/// Decide the fate of every rental written in week `w`.
pub fn run_week(
    conn: &Connection,
    config: &Config,
    clock: &SimClock,
    caps: &Capabilities,
    w: u32,
    rng: &mut SimRng,
) -> Result<ReturnStats> {
    let mut stats = ReturnStats::default();
    let from = fmt_date(clock.week_start(w));
    let to = fmt_date(clock.week_end(w));

    for rental in schema::open_rentals_in_range(conn, &from, &to)? {
        let draw = rng.uniform();
        if draw >= RETURN_ON_TIME_PROBABILITY
            && draw < RETURN_ON_TIME_PROBABILITY + RETURN_NEVER_PROBABILITY
        {
            // Never returned: the copy stays out and no payment is written.
            stats.left_open += 1;
            continue;
        }

        let rented_on = parse_datetime(&rental.rental_date)?.date();
        let offset_days = if draw < RETURN_ON_TIME_PROBABILITY {
            on_time_offset(rented_on, rental.rental_duration, rng)
        } else {
            rental.rental_duration + rng.range_i64(1, LATE_RETURN_MAX_DAYS)
        };

        let return_day = rented_on + Duration::days(offset_days);
        let return_dt = SimClock::business_datetime(return_day, rng);
        schema::set_return_date(conn, rental.rental_id, &fmt_datetime(return_dt))?;
        stats.returned += 1;

        // Payment lands shortly after the copy hits the counter.
        let payment_dt = return_dt + Duration::minutes(rng.range_i64(1, 90));
        schema::insert_payment(
            conn,
            rental.customer_id,
            rental.staff_id,
            rental.rental_id,
            rental.rental_rate,
            &fmt_datetime(payment_dt),
        )?;
        stats.payments += 1;

        record_outcome(
            conn,
            config,
            caps,
            &rental,
            return_day,
            &mut stats,
            rng,
        )?;
    }

    Ok(stats)
}

/// Return-day offset within the rental window, biased toward Mon-Wed.
fn on_time_offset(rented_on: NaiveDate, duration: i64, rng: &mut SimRng) -> i64 {
    let duration = duration.max(1);
    let weights: Vec<f64> = (1..=duration)
        .map(|offset| {
            let weekday = (rented_on + Duration::days(offset))
                .weekday()
                .num_days_from_monday();
            if weekday <= 2 {
                2.0
            } else {
                1.0
            }
        })
        .collect();
    1 + rng.weighted_index(&weights) as i64
}

fn record_outcome(
    conn: &Connection,
    config: &Config,
    caps: &Capabilities,
    rental: &OpenRental,
    return_day: NaiveDate,
    stats: &mut ReturnStats,
    rng: &mut SimRng,
) -> Result<()> {
    match inventory::process_return(conn, config, caps, rental.inventory_id, return_day, rng)? {
        inventory::ReturnOutcome::Available => {}
        inventory::ReturnOutcome::Damaged => stats.damaged += 1,
        inventory::ReturnOutcome::Missing => stats.missing += 1,
        inventory::ReturnOutcome::Maintenance => stats.maintenance += 1,
    }
    Ok(())
}
