// End-to-end simulation scenarios against an in-memory database.

use std::collections::BTreeMap;

use rusqlite::Connection;

use crate::config::{BusinessLifecycle, Config, VolumeModifiers};
use crate::db::{open_in_memory, schema};
use crate::sim::clock::{fmt_date, SimClock};
use crate::sim::summary::RunSummary;
use crate::sim::Kernel;

/// A quiet baseline config: fixed horizon, no spike days, flat seasonality,
/// features off unless a test opts in.
fn base_config(weeks: u32) -> Config {
    let mut config = Config::default();
    config.simulation.weeks = weeks;
    config.simulation.seed = 1;
    config.generation.business_lifecycle = BusinessLifecycle {
        growth_phase_weeks: weeks,
        plateau_phase_weeks: 0,
        decline_phase_weeks: 0,
        reactivation_phase_weeks: 0,
    };
    config.generation.volume_modifiers = VolumeModifiers {
        growth_factor: 0.0,
        plateau_factor: 0.0,
        decline_factor: 0.0,
        reactivation_factor: 0.0,
    };
    config.generation.spike.enabled = false;
    config.generation.advanced_features.seasonality.enabled = false;
    config.generation.seasonality.volatility = 0.0;
    config.master_simulation.film_release_strategy.market_weekly_releases = 0;
    config
}

fn run_to_summary(config: Config) -> (Connection, RunSummary) {
    let conn = open_in_memory().unwrap();
    let mut kernel = Kernel::new(config, conn).unwrap();
    let summary = kernel.run().unwrap();
    // The kernel owns the connection; a :memory: database cannot be
    // reopened, so tests take it back for their assertions.
    (kernel.into_connection(), summary)
}

/// Rentals written per week, via rental_date ranges.
fn weekly_rental_counts(conn: &Connection, start_date: &str, weeks: u32) -> Vec<i64> {
    let clock = SimClock::new(start_date).unwrap();
    (1..=weeks)
        .map(|w| {
            conn.query_row(
                "SELECT COUNT(*) FROM rental WHERE rental_date >= ?1 AND rental_date < ?2",
                rusqlite::params![fmt_date(clock.week_start(w)), fmt_date(clock.week_end(w))],
                |row| row.get(0),
            )
            .unwrap()
        })
        .collect()
}

#[test]
fn tiny_baseline_two_weeks() {
    let mut config = base_config(2);
    config.generation.initial_customers = 10;
    config.generation.weekly_new_customers = 0;
    config.generation.base_weekly_transactions = 20;
    config.generation.films_count = 30;
    config.generation.advanced_features.customer_churn.enabled = false;

    let (conn, summary) = run_to_summary(config);

    assert_eq!(summary.weeks_completed, 2);
    assert!(
        (34..=46).contains(&summary.total_rentals),
        "total rentals {}",
        summary.total_rentals
    );
    assert_eq!(summary.no_candidates_total, 0);

    // 14 dated days of simulation: every rental falls inside them
    let out_of_range: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM rental
             WHERE rental_date < '2002-01-01' OR rental_date >= '2002-01-15'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(out_of_range, 0);

    // Every rental either has a payment or is one of the <=20%-ish unreturned
    let unpaid_closed: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM rental r
             WHERE r.return_date IS NOT NULL
               AND NOT EXISTS (SELECT 1 FROM payment p WHERE p.rental_id = r.rental_id)",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(unpaid_closed, 0);
    assert!(summary.open_rentals <= summary.total_rentals * 2 / 5);
}

#[test]
fn zipf_concentrates_rentals_on_top_films() {
    let mut config = base_config(30);
    config.generation.initial_customers = 150;
    config.generation.weekly_new_customers = 0;
    config.generation.base_weekly_transactions = 150;
    config.generation.films_count = 200;
    // Deep shelves so the 20% never-returned leak cannot starve late weeks
    config.generation.inventory_copies_per_store = [3, 5];
    config.generation.rental_distribution.alpha = 1.5;
    config.generation.advanced_features.customer_churn.enabled = false;
    config.generation.new_movie_boost.enabled = false;

    let (conn, summary) = run_to_summary(config);
    assert!(summary.total_rentals > 4000, "rentals {}", summary.total_rentals);

    let mut counts: Vec<i64> = schema::film_rental_counts(&conn)
        .unwrap()
        .into_iter()
        .map(|(_, n)| n)
        .collect();
    // Films never rented still count toward the catalog
    let total_films = schema::count_films(&conn).unwrap() as usize;
    while counts.len() < total_films {
        counts.push(0);
    }
    counts.sort_unstable_by(|a, b| b.cmp(a));

    let total: i64 = counts.iter().sum();
    let top_20pct: i64 = counts.iter().take(total_films / 5).sum();
    let bottom_half: i64 = counts.iter().skip(total_films / 2).sum();

    let top_share = top_20pct as f64 / total as f64;
    let bottom_share = bottom_half as f64 / total as f64;
    assert!(top_share > 0.45, "top 20% share {:.3}", top_share);
    assert!(bottom_share < 0.25, "bottom 50% share {:.3}", bottom_share);
}

#[test]
fn phase_transitions_shape_weekly_volume() {
    let mut config = base_config(12);
    config.generation.business_lifecycle = BusinessLifecycle {
        growth_phase_weeks: 4,
        plateau_phase_weeks: 4,
        decline_phase_weeks: 2,
        reactivation_phase_weeks: 2,
    };
    config.generation.volume_modifiers = VolumeModifiers {
        growth_factor: 0.05,
        plateau_factor: 0.0,
        decline_factor: -0.05,
        reactivation_factor: 0.03,
    };
    config.generation.initial_customers = 200;
    config.generation.weekly_new_customers = 0;
    config.generation.base_weekly_transactions = 100;
    config.generation.films_count = 100;
    config.generation.advanced_features.customer_churn.enabled = false;

    let (conn, summary) = run_to_summary(config);
    assert_eq!(summary.no_candidates_total, 0);

    let weekly = weekly_rental_counts(&conn, "2002-01-01", 12);

    // Growth: strictly increasing
    for w in 1..4 {
        assert!(weekly[w] > weekly[w - 1], "growth weeks {:?}", weekly);
    }
    // Plateau holds the peak (within rounding of the expected count)
    let peak = weekly[3];
    for w in 4..8 {
        assert!((weekly[w] - peak).abs() <= 1, "plateau weeks {:?}", weekly);
    }
    // Decline: below the plateau and falling
    assert!(weekly[8] < peak);
    assert!(weekly[9] < weekly[8], "decline weeks {:?}", weekly);
    // Reactivation: recovering
    assert!(weekly[11] > weekly[9], "reactivation weeks {:?}", weekly);
}

#[test]
fn reactivation_restores_churned_customers() {
    let mut config = base_config(8);
    config.generation.initial_customers = 20;
    config.generation.weekly_new_customers = 0;
    config.generation.base_weekly_transactions = 5;
    config.generation.films_count = 10;
    // Aggressive churn so the reactivation window has lapsed customers
    config.generation.customer_segments.super_loyal.churn_rate = 1.0;
    config.generation.customer_segments.super_loyal.lifetime_weeks = 1.0;
    config.generation.customer_segments.loyal.churn_rate = 1.0;
    config.generation.customer_segments.loyal.lifetime_weeks = 1.0;
    config.generation.customer_segments.average.churn_rate = 1.0;
    config.generation.customer_segments.average.lifetime_weeks = 1.0;
    config.generation.customer_segments.occasional.churn_rate = 1.0;
    config.generation.customer_segments.occasional.lifetime_weeks = 1.0;
    config.generation.reactivation.enabled = true;
    config.generation.reactivation.probability = 1.0;
    config.generation.reactivation.start_week = 5;
    config.generation.reactivation.duration_weeks = 3;

    let (_conn, summary) = run_to_summary(config);

    // Weeks 5..8 reactivate everyone each week, and reactivation runs after
    // churn, so the run ends with the full population active.
    assert_eq!(summary.active_customers, 20);
}

#[test]
fn segment_mix_stays_near_targets_under_churn() {
    let mut config = base_config(15);
    config.generation.initial_customers = 600;
    config.generation.weekly_new_customers = 20;
    config.generation.base_weekly_transactions = 50;
    config.generation.films_count = 60;

    let (_conn, summary) = run_to_summary(config);
    assert!(summary.active_customers >= 500);

    let total: i64 = summary.segment_counts.iter().map(|(_, n)| n).sum();
    for (segment, count) in &summary.segment_counts {
        let target = match segment.as_str() {
            "super_loyal" => 0.05,
            "loyal" => 0.15,
            "average" => 0.50,
            "occasional" => 0.30,
            other => panic!("unexpected segment {}", other),
        };
        let share = *count as f64 / total as f64;
        assert!(
            (share - target).abs() < 0.05,
            "{} at {:.3}, target {:.3}",
            segment,
            share,
            target
        );
    }
}

#[test]
fn summer_outsells_winter_with_seasonality() {
    let mut config = base_config(52);
    config.generation.advanced_features.seasonality.enabled = true;
    config.generation.seasonality.monthly =
        [0.7, 0.7, 0.9, 1.0, 1.1, 1.3, 1.4, 1.35, 1.0, 0.9, 0.9, 1.0];
    config.generation.seasonality.volatility = 0.0;
    config.generation.initial_customers = 150;
    config.generation.weekly_new_customers = 0;
    config.generation.base_weekly_transactions = 60;
    config.generation.films_count = 120;
    config.generation.inventory_copies_per_store = [3, 5];
    config.generation.advanced_features.customer_churn.enabled = false;

    let (conn, _summary) = run_to_summary(config);
    let weekly = weekly_rental_counts(&conn, "2002-01-01", 52);

    // Weeks 1-4 are deep January; weeks 27-30 are July
    let winter: i64 = weekly[0..4].iter().sum();
    let summer: i64 = weekly[26..30].iter().sum();
    assert!(
        summer > winter,
        "summer {} should exceed winter {}",
        summer,
        winter
    );
}

#[test]
fn identical_seeds_produce_identical_row_sets() {
    let make = || {
        let mut config = base_config(6);
        config.generation.initial_customers = 40;
        config.generation.base_weekly_transactions = 30;
        config.generation.films_count = 25;
        config.master_simulation.film_release_strategy.market_weekly_releases = 2;
        config
    };

    let (conn_a, summary_a) = run_to_summary(make());
    let (conn_b, summary_b) = run_to_summary(make());

    assert_eq!(summary_a.total_rentals, summary_b.total_rentals);
    assert_eq!(summary_a.total_payments, summary_b.total_payments);
    assert_eq!(summary_a.active_customers, summary_b.active_customers);
    assert_eq!(summary_a.total_films, summary_b.total_films);

    let dump = |conn: &Connection| -> Vec<(String, i64, i64, Option<String>)> {
        let mut stmt = conn
            .prepare(
                "SELECT rental_date, inventory_id, customer_id, return_date
                 FROM rental ORDER BY rental_id",
            )
            .unwrap();
        stmt.query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
    };
    assert_eq!(dump(&conn_a), dump(&conn_b));

    let films = |conn: &Connection| -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT title FROM film ORDER BY film_id")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    };
    assert_eq!(films(&conn_a), films(&conn_b));
}

#[test]
fn referential_closure_holds_with_all_features() {
    let mut config = base_config(10);
    config.generation.initial_customers = 80;
    config.generation.base_weekly_transactions = 60;
    config.generation.films_count = 40;
    config.master_simulation.film_release_strategy.market_weekly_releases = 2;
    config.generation.advanced_features.late_fees.enabled = true;
    config.generation.advanced_features.ar_tracking.enabled = true;
    config.generation.advanced_features.inventory_status.enabled = true;

    let (conn, summary) = run_to_summary(config);
    assert!(summary.total_rentals > 0);

    let orphan_checks = [
        // every rental references live inventory, customer, staff
        "SELECT COUNT(*) FROM rental r
         WHERE NOT EXISTS (SELECT 1 FROM inventory i WHERE i.inventory_id = r.inventory_id)
            OR NOT EXISTS (SELECT 1 FROM customer c WHERE c.customer_id = r.customer_id)
            OR NOT EXISTS (SELECT 1 FROM staff s WHERE s.staff_id = r.staff_id)",
        // every payment references a rental with a return date
        "SELECT COUNT(*) FROM payment p
         WHERE NOT EXISTS (SELECT 1 FROM rental r
                           WHERE r.rental_id = p.rental_id AND r.return_date IS NOT NULL)",
        // every late fee references a rental
        "SELECT COUNT(*) FROM late_fees lf
         WHERE NOT EXISTS (SELECT 1 FROM rental r WHERE r.rental_id = lf.rental_id)",
        // every AR row references a customer
        "SELECT COUNT(*) FROM customer_ar ar
         WHERE NOT EXISTS (SELECT 1 FROM customer c WHERE c.customer_id = ar.customer_id)",
        // fee arithmetic holds on every row
        "SELECT COUNT(*) FROM late_fees
         WHERE ABS(total_fee - days_overdue * daily_rate) > 0.005 OR days_overdue <= 0",
        // AR balances derive from totals and never go negative
        "SELECT COUNT(*) FROM customer_ar
         WHERE ABS(ar_balance - (total_owed - total_paid)) > 0.005 OR ar_balance < -0.005",
    ];
    for check in orphan_checks {
        let violations: i64 = conn.query_row(check, [], |row| row.get(0)).unwrap();
        assert_eq!(violations, 0, "violated: {}", check);
    }
}

#[test]
fn no_copy_is_double_booked_while_open() {
    let mut config = base_config(8);
    config.generation.initial_customers = 120;
    config.generation.base_weekly_transactions = 150;
    config.generation.films_count = 20;
    // Small catalog to stress copy reuse

    let (conn, _summary) = run_to_summary(config);

    // For every pair of rentals on the same copy, the earlier one must have
    // closed: no two open rentals share an inventory_id.
    let double_open: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(n), 0) FROM (
                 SELECT COUNT(*) AS n FROM rental
                 WHERE return_date IS NULL GROUP BY inventory_id
             )",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(double_open <= 1, "an inventory copy has {} open rentals", double_open);
}

#[test]
fn weekly_new_customers_grow_the_population() {
    let mut config = base_config(5);
    config.generation.initial_customers = 30;
    config.generation.weekly_new_customers = 6;
    config.generation.base_weekly_transactions = 10;
    config.generation.films_count = 15;
    config.generation.advanced_features.customer_churn.enabled = false;

    let (conn, summary) = run_to_summary(config);
    assert_eq!(summary.active_customers, 30 + 5 * 6);

    // New customers carry their intake week as create_date
    let mismatched: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM rental r
             JOIN customer c ON c.customer_id = r.customer_id
             WHERE r.rental_date < c.create_date",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(mismatched, 0);
}

#[test]
fn market_releases_are_not_stocked_but_hot_purchases_are() {
    let mut config = base_config(4);
    config.generation.initial_customers = 20;
    config.generation.base_weekly_transactions = 10;
    config.generation.films_count = 20;
    config.master_simulation.film_release_strategy.market_weekly_releases = 3;
    config
        .master_simulation
        .film_release_strategy
        .hot_categories
        .push(crate::config::HotCategory {
            weeks: vec![2],
            category: "Action".to_string(),
            purchase_per_release: 2,
        });
    config.inventory_purchasing.diversification = 0.0;

    let (conn, summary) = run_to_summary(config);

    // 3 market releases over 4 weeks, every one recorded
    let releases: i64 = conn
        .query_row("SELECT COUNT(*) FROM film_releases", [], |row| row.get(0))
        .unwrap();
    assert!(releases >= 12, "expected >=12 releases, got {}", releases);
    assert_eq!(summary.total_films, 20 + releases);

    // Hot-category purchases logged and stocked
    let purchases: i64 = conn
        .query_row("SELECT COUNT(*) FROM inventory_purchases", [], |row| row.get(0))
        .unwrap();
    assert!(purchases > 0);

    // Market-released films outside the hot purchase have no inventory
    let unstocked: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM film_releases fr
             WHERE NOT EXISTS (SELECT 1 FROM inventory i WHERE i.film_id = fr.film_id)",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(unstocked > 0, "market releases should not be auto-stocked");
}

#[test]
fn rentals_respect_temporal_order() {
    let mut config = base_config(6);
    config.generation.initial_customers = 50;
    config.generation.base_weekly_transactions = 40;
    config.generation.films_count = 30;

    let (conn, _summary) = run_to_summary(config);

    let checks = [
        "SELECT COUNT(*) FROM rental WHERE return_date IS NOT NULL AND return_date < rental_date",
        "SELECT COUNT(*) FROM payment p JOIN rental r ON r.rental_id = p.rental_id
         WHERE p.payment_date < r.return_date",
    ];
    for check in checks {
        let violations: i64 = conn.query_row(check, [], |row| row.get(0)).unwrap();
        assert_eq!(violations, 0, "violated: {}", check);
    }

    // At most one payment per rental
    let max_payments: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(n), 0) FROM (
                 SELECT COUNT(*) AS n FROM payment GROUP BY rental_id
             )",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(max_payments <= 1);
}

/// Cross-check the weekly counts helper against the summary totals.
#[test]
fn weekly_counts_sum_to_total() {
    let mut config = base_config(4);
    config.generation.initial_customers = 30;
    config.generation.base_weekly_transactions = 25;
    config.generation.films_count = 20;

    let (conn, summary) = run_to_summary(config);
    let weekly = weekly_rental_counts(&conn, "2002-01-01", 4);
    let sum: i64 = weekly.iter().sum();
    assert_eq!(sum, summary.total_rentals);

    let mut by_week: BTreeMap<usize, i64> = BTreeMap::new();
    for (i, n) in weekly.iter().enumerate() {
        by_week.insert(i + 1, *n);
    }
    assert_eq!(by_week.len(), 4);
}
