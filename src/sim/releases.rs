// Film release planner
// Each week: market releases enter the catalog (film + film_releases, no
// inventory), then scheduled hot-category purchases stock copies at every
// store and log them in inventory_purchases.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration};
use rusqlite::Connection;

use crate::config::{Config, PurchaseStrategyKind};
use crate::constants::{HOT_CATEGORY_RECENT_DAYS, HOT_CATEGORY_RECENT_PROBABILITY};
use crate::db::schema;
use crate::db::{Capabilities, ReleaseDateSource};
use crate::error::Result;
use crate::seed;
use crate::sim::clock::{fmt_date, SimClock};
use crate::sim::rng::SimRng;
use crate::titles;

#[derive(Debug, Clone, Default)]
pub struct ReleaseStats {
    pub films_released: u32,
    pub films_purchased: u32,
    pub copies_purchased: u32,
}

/// Inventory purchasing strategy, selected once from config.
#[derive(Debug, Clone, Copy)]
pub enum PurchaseStrategy {
    /// Chase the newest titles.
    Aggressive,
    /// Uniform sample of the candidate pool.
    Stable,
    /// Rotate through the pool week by week.
    Seasonal,
}

impl PurchaseStrategy {
    pub fn from_kind(kind: PurchaseStrategyKind) -> PurchaseStrategy {
        match kind {
            PurchaseStrategyKind::Aggressive => PurchaseStrategy::Aggressive,
            PurchaseStrategyKind::Stable => PurchaseStrategy::Stable,
            PurchaseStrategyKind::Seasonal => PurchaseStrategy::Seasonal,
        }
    }

    /// Pick up to `limit` films from `candidates`.
    pub fn select_films(
        &self,
        candidates: &[i64],
        limit: usize,
        week: u32,
        rng: &mut SimRng,
    ) -> Vec<i64> {
        if candidates.is_empty() || limit == 0 {
            return Vec::new();
        }
        let limit = limit.min(candidates.len());
        match self {
            PurchaseStrategy::Aggressive => {
                let mut newest = candidates.to_vec();
                newest.sort_unstable_by(|a, b| b.cmp(a));
                newest.truncate(limit);
                newest
            }
            PurchaseStrategy::Stable => {
                let mut pool = candidates.to_vec();
                let mut picked = Vec::with_capacity(limit);
                for _ in 0..limit {
                    let idx = rng.index(pool.len());
                    picked.push(pool.swap_remove(idx));
                }
                picked
            }
            PurchaseStrategy::Seasonal => {
                let start = (week as usize * limit) % candidates.len();
                (0..limit)
                    .map(|i| candidates[(start + i) % candidates.len()])
                    .collect()
            }
        }
    }
}

/// Run the planner for week `w`.
#[allow(clippy::too_many_arguments)]
pub fn run_week(
    conn: &Connection,
    config: &Config,
    clock: &SimClock,
    caps: &Capabilities,
    w: u32,
    categories: &[(i64, String)],
    language_ids: &[i64],
    store_staff: &BTreeMap<i64, Vec<i64>>,
    rng: &mut SimRng,
) -> Result<ReleaseStats> {
    let mut stats = ReleaseStats::default();
    let week_start = clock.week_start(w);
    let week_start_str = fmt_date(week_start);
    let strategy = PurchaseStrategy::from_kind(config.inventory_purchasing.strategy);

    // 1. Market releases: new films enter the catalog but not the shelves.
    let release_plan = &config.master_simulation.film_release_strategy;
    for _ in 0..release_plan.market_weekly_releases {
        let idx = rng.index(categories.len());
        release_film(conn, idx, categories, language_ids, week_start_str.as_str(), week_start.year(), rng)?;
        stats.films_released += 1;
    }

    // 2. Scheduled hot-category purchases.
    for hot in &release_plan.hot_categories {
        if !hot.weeks.contains(&w) {
            continue;
        }
        let (category_id, category_idx) = match lookup_category(categories, &hot.category) {
            Some(found) => found,
            None => continue, // validated at config load; stale config tolerated
        };

        let candidates = purchase_candidates(conn, caps, category_id, week_start, rng)?;
        let selected = if candidates.is_empty() {
            // Nothing in the category yet: cut a new film on the spot.
            let film_id = release_film(
                conn,
                category_idx,
                categories,
                language_ids,
                week_start_str.as_str(),
                week_start.year(),
                rng,
            )?;
            stats.films_released += 1;
            vec![film_id]
        } else {
            strategy.select_films(&candidates, hot.purchase_per_release as usize, w, rng)
        };

        for film_id in selected {
            stats.copies_purchased +=
                stock_film(conn, config, caps, film_id, &week_start_str, store_staff, rng)?;
            stats.films_purchased += 1;
        }

        // Diversification: occasionally stock something outside the target
        // category to keep shelves varied.
        if rng.chance(config.inventory_purchasing.diversification) {
            let other_idx = rng.index(categories.len());
            let pool = schema::films_in_category(conn, categories[other_idx].0)?;
            if !pool.is_empty() {
                let film_id = *rng.pick(&pool);
                stats.copies_purchased +=
                    stock_film(conn, config, caps, film_id, &week_start_str, store_staff, rng)?;
                stats.films_purchased += 1;
            }
        }
    }

    Ok(stats)
}

/// 70%: recent releases in the category; 30%: any film of the category.
fn purchase_candidates(
    conn: &Connection,
    caps: &Capabilities,
    category_id: i64,
    week_start: chrono::NaiveDate,
    rng: &mut SimRng,
) -> Result<Vec<i64>> {
    if rng.chance(HOT_CATEGORY_RECENT_PROBABILITY) {
        let cutoff = week_start - Duration::days(HOT_CATEGORY_RECENT_DAYS);
        let recent = match caps.release_dates {
            ReleaseDateSource::ReleaseTable => {
                schema::films_released_since(conn, category_id, &fmt_date(cutoff))?
            }
            ReleaseDateSource::ReleaseYear => schema::films_in_category(conn, category_id)?,
        };
        if !recent.is_empty() {
            return Ok(recent);
        }
    }
    schema::films_in_category(conn, category_id)
}

/// Create a film in the category and record its market release.
#[allow(clippy::too_many_arguments)]
fn release_film(
    conn: &Connection,
    category_idx: usize,
    categories: &[(i64, String)],
    language_ids: &[i64],
    release_date: &str,
    release_year: i32,
    rng: &mut SimRng,
) -> Result<i64> {
    let film_id = seed::create_film(
        conn,
        category_idx,
        categories[category_idx].0,
        language_ids,
        release_year,
        rng,
    )?;
    let date = crate::sim::clock::parse_date(release_date)?;
    schema::insert_film_release(conn, film_id, &SimClock::quarter_label(date), release_date)?;
    Ok(film_id)
}

/// Buy copies of a film at every store; log each copy when the purchase
/// table exists.
fn stock_film(
    conn: &Connection,
    config: &Config,
    caps: &Capabilities,
    film_id: i64,
    purchase_date: &str,
    store_staff: &BTreeMap<i64, Vec<i64>>,
    rng: &mut SimRng,
) -> Result<u32> {
    let per_film = config.inventory_purchasing.inventory_per_film;
    let mut copies = 0;
    for (store_id, staff) in store_staff {
        let n = rng.range_u32(per_film[0], per_film[1]);
        for _ in 0..n {
            let staff_id = *rng.pick(staff);
            let inventory_id =
                schema::insert_inventory(conn, film_id, *store_id, purchase_date, staff_id)?;
            if caps.has_inventory_purchases {
                schema::insert_inventory_purchase(
                    conn,
                    film_id,
                    inventory_id,
                    staff_id,
                    purchase_date,
                )?;
            }
            copies += 1;
        }
    }
    Ok(copies)
}

fn lookup_category(categories: &[(i64, String)], name: &str) -> Option<(i64, usize)> {
    let id = categories.iter().find(|(_, n)| n == name)?.0;
    let idx = titles::CATEGORIES.iter().position(|c| c.name == name)?;
    Some((id, idx))
}
