// Customer lifecycle
// Weekly intake of new customers, per-segment churn, and windowed
// reactivation. Churned customers stay on file for historical joins.

use rusqlite::Connection;

use crate::config::{Config, Segment};
use crate::db::schema;
use crate::error::Result;
use crate::seed;
use crate::sim::clock::{fmt_date, parse_date, SimClock};
use crate::sim::rng::SimRng;

#[derive(Debug, Clone, Default)]
pub struct CustomerStats {
    pub added: u32,
    pub churned: u32,
    pub reactivated: u32,
}

/// Run intake, churn, and reactivation for week `w`.
pub fn run_week(
    conn: &Connection,
    config: &Config,
    clock: &SimClock,
    w: u32,
    store_ids: &[i64],
    city_ids: &[i64],
    customer_seq: &mut u64,
    rng: &mut SimRng,
) -> Result<CustomerStats> {
    let mut stats = CustomerStats::default();
    let week_start = clock.week_start(w);
    let week_start_str = fmt_date(week_start);

    // 1. Intake
    for _ in 0..config.generation.weekly_new_customers {
        seed::create_customer(
            conn,
            config,
            store_ids,
            city_ids,
            &week_start_str,
            *customer_seq,
            rng,
        )?;
        *customer_seq += 1;
        stats.added += 1;
    }

    // 2. Churn: weekly probability churn_rate / lifetime_weeks, only for
    //    customers with at least a week of tenure.
    if config.generation.advanced_features.customer_churn.enabled {
        let segments = &config.generation.customer_segments;
        for customer in schema::list_active_customers(conn)? {
            let created = parse_date(&customer.create_date)?;
            if created >= week_start {
                continue;
            }
            let segment = match Segment::from_str(&customer.segment) {
                Some(s) => s,
                None => continue,
            };
            let sc = segments.get(segment);
            let weekly_churn = sc.churn_rate / sc.lifetime_weeks;
            if rng.chance(weekly_churn) {
                schema::set_customer_active(conn, customer.customer_id, false)?;
                stats.churned += 1;
            }
        }
    }

    // 3. Reactivation window: lapsed customers come back with their
    //    historical identity intact.
    if config.generation.reactivation.active_at(w) {
        let probability = config.generation.reactivation.probability;
        for customer_id in schema::list_inactive_customer_ids(conn)? {
            if rng.chance(probability) {
                schema::set_customer_active(conn, customer_id, true)?;
                stats.reactivated += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn seeded(initial_customers: u32) -> (Connection, Config, SimClock, SimRng) {
        let conn = open_in_memory().unwrap();
        let mut config = Config::default();
        config.generation.films_count = 5;
        config.generation.initial_customers = initial_customers;
        config.generation.weekly_new_customers = 4;
        let clock = SimClock::new("2002-01-01").unwrap();
        let mut rng = SimRng::new(1);
        seed::seed_all(&conn, &config, &clock, &mut rng).unwrap();
        (conn, config, clock, rng)
    }

    #[test]
    fn weekly_intake_adds_customers() {
        let (conn, config, clock, mut rng) = seeded(10);
        let store_ids = schema::list_store_ids(&conn).unwrap();
        let city_ids = schema::list_city_ids(&conn).unwrap();
        let mut seq = 10;

        let stats = run_week(
            &conn, &config, &clock, 1, &store_ids, &city_ids, &mut seq, &mut rng,
        )
        .unwrap();
        assert_eq!(stats.added, 4);
        assert_eq!(schema::count_active_customers(&conn).unwrap(), 14);
    }

    #[test]
    fn brand_new_customers_do_not_churn() {
        let (conn, mut config, clock, mut rng) = seeded(0);
        // Certain churn for anyone eligible
        config.generation.customer_segments.average.churn_rate = 1.0;
        config.generation.customer_segments.average.lifetime_weeks = 1.0;
        let store_ids = schema::list_store_ids(&conn).unwrap();
        let city_ids = schema::list_city_ids(&conn).unwrap();
        let mut seq = 0;

        // Week 1: intake only; nobody has tenure, so nobody churns
        let stats = run_week(
            &conn, &config, &clock, 1, &store_ids, &city_ids, &mut seq, &mut rng,
        )
        .unwrap();
        assert_eq!(stats.churned, 0);
    }

    #[test]
    fn certain_reactivation_restores_everyone() {
        let (conn, mut config, clock, mut rng) = seeded(20);
        config.generation.reactivation.enabled = true;
        config.generation.reactivation.probability = 1.0;
        config.generation.reactivation.start_week = 2;
        config.generation.reactivation.duration_weeks = 3;
        let store_ids = schema::list_store_ids(&conn).unwrap();
        let city_ids = schema::list_city_ids(&conn).unwrap();
        let mut seq = 20;

        // Deactivate half by hand
        for customer_id in 1..=10 {
            schema::set_customer_active(&conn, customer_id, false).unwrap();
        }
        assert_eq!(schema::count_active_customers(&conn).unwrap(), 10);

        config.generation.weekly_new_customers = 0;
        let stats = run_week(
            &conn, &config, &clock, 2, &store_ids, &city_ids, &mut seq, &mut rng,
        )
        .unwrap();
        assert_eq!(stats.reactivated, 10);
        assert_eq!(schema::count_active_customers(&conn).unwrap(), 20);
    }

    #[test]
    fn reactivation_window_respected() {
        let (conn, mut config, clock, mut rng) = seeded(5);
        config.generation.reactivation.enabled = true;
        config.generation.reactivation.probability = 1.0;
        config.generation.reactivation.start_week = 5;
        config.generation.reactivation.duration_weeks = 2;
        config.generation.weekly_new_customers = 0;
        let store_ids = schema::list_store_ids(&conn).unwrap();
        let city_ids = schema::list_city_ids(&conn).unwrap();
        let mut seq = 5;

        schema::set_customer_active(&conn, 1, false).unwrap();

        // Week 4 is before the window
        let stats = run_week(
            &conn, &config, &clock, 4, &store_ids, &city_ids, &mut seq, &mut rng,
        )
        .unwrap();
        assert_eq!(stats.reactivated, 0);

        // Week 5 opens the window
        let stats = run_week(
            &conn, &config, &clock, 5, &store_ids, &city_ids, &mut seq, &mut rng,
        )
        .unwrap();
        assert_eq!(stats.reactivated, 1);
    }

    #[test]
    fn churn_disabled_keeps_everyone() {
        let (conn, mut config, clock, mut rng) = seeded(30);
        config.generation.advanced_features.customer_churn.enabled = false;
        config.generation.customer_segments.average.churn_rate = 1.0;
        config.generation.weekly_new_customers = 0;
        let store_ids = schema::list_store_ids(&conn).unwrap();
        let city_ids = schema::list_city_ids(&conn).unwrap();
        let mut seq = 30;

        let stats = run_week(
            &conn, &config, &clock, 3, &store_ids, &city_ids, &mut seq, &mut rng,
        )
        .unwrap();
        assert_eq!(stats.churned, 0);
        assert_eq!(schema::count_active_customers(&conn).unwrap(), 30);
    }
}
