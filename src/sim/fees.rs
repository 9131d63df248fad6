// Late-fee & AR engine
// After each weekly batch: rentals past their due date accrue a fee
// (days_overdue x daily_rate, upserted by rental), then every customer with
// fees on file gets their receivable balance and aging bucket recomputed.
// Fee payments are never generated here; `paid` stays false.

use chrono::{Duration, NaiveDate};
use rusqlite::Connection;

use crate::config::Config;
use crate::constants::{AR_BUCKET_30, AR_BUCKET_60, AR_BUCKET_90};
use crate::db::schema::{self, CustomerArRow, LateFeeRow};
use crate::db::Capabilities;
use crate::error::Result;
use crate::sim::clock::{fmt_date, parse_date, SimClock};

pub const AR_CURRENT: &str = "current";
pub const AR_30: &str = "30_days";
pub const AR_60: &str = "60_days";
pub const AR_90_PLUS: &str = "90_days_plus";

#[derive(Debug, Clone, Default)]
pub struct FeeStats {
    pub fees_upserted: u32,
    pub ar_rows: u32,
}

/// Process fees and AR as of the end of week `w`. Idempotent: a second run
/// against the same week rewrites identical rows.
pub fn process_week(
    conn: &Connection,
    config: &Config,
    clock: &SimClock,
    caps: &Capabilities,
    w: u32,
) -> Result<FeeStats> {
    let mut stats = FeeStats::default();
    let features = &config.generation.advanced_features;
    if !features.late_fees.enabled || !caps.has_late_fees {
        return Ok(stats);
    }

    let as_of = clock.week_end(w);
    let as_of_str = fmt_date(as_of);
    let daily_rate = features.late_fees.daily_rate;

    // 1. Fee accrual on overdue rentals.
    for rental in schema::rentals_past_due(conn, &as_of_str)? {
        let rented_on = parse_date(&rental.rental_date)?;
        let due = rented_on + Duration::days(rental.rental_duration);
        if due >= as_of {
            continue;
        }

        let effective_end = match &rental.return_date {
            Some(returned) => {
                let returned_on = parse_date(returned)?;
                if returned_on <= due {
                    continue; // came back on time
                }
                returned_on.min(as_of)
            }
            None => as_of,
        };

        let days_overdue = (effective_end - due).num_days();
        if days_overdue <= 0 {
            continue;
        }

        let total_fee = round_cents(days_overdue as f64 * daily_rate);
        schema::upsert_late_fee(
            conn,
            &LateFeeRow {
                rental_id: rental.rental_id,
                customer_id: rental.customer_id,
                inventory_id: rental.inventory_id,
                days_overdue,
                daily_rate,
                total_fee,
                fee_date: as_of_str.clone(),
            },
        )?;
        stats.fees_upserted += 1;
    }

    // 2. Receivables per customer.
    if features.ar_tracking.enabled && caps.has_customer_ar {
        for customer_id in schema::customers_with_fees(conn)? {
            let totals = schema::fee_totals_for_customer(conn, customer_id)?;
            let ar_balance = (totals.total_owed - totals.total_paid).max(0.0);
            let days_past_due = match &totals.oldest_unpaid_fee_date {
                Some(oldest) => (as_of - parse_date(oldest)?).num_days().max(0),
                None => 0,
            };

            schema::upsert_customer_ar(
                conn,
                &CustomerArRow {
                    customer_id,
                    total_owed: round_cents(totals.total_owed),
                    total_paid: round_cents(totals.total_paid),
                    ar_balance: round_cents(ar_balance),
                    last_payment_date: totals.last_paid_date.clone(),
                    days_past_due,
                    ar_status: aging_bucket(days_past_due).to_string(),
                },
            )?;
            stats.ar_rows += 1;
        }
    }

    Ok(stats)
}

/// Aging bucket for days past due: current / 30 / 60 / 90+.
pub fn aging_bucket(days_past_due: i64) -> &'static str {
    if days_past_due < AR_BUCKET_30 {
        AR_CURRENT
    } else if days_past_due < AR_BUCKET_60 {
        AR_30
    } else if days_past_due < AR_BUCKET_90 {
        AR_60
    } else {
        AR_90_PLUS
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Due date of a rental, for tests and summaries.
pub fn due_date(rented_on: NaiveDate, duration: i64) -> NaiveDate {
    rented_on + Duration::days(duration)
}
