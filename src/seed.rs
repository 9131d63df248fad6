// Seed loader
// Populates reference dimensions, stores and staff, the initial film
// catalog, starting inventory, and the opening customer population. After
// seeding, every weekly kernel operation can run without creating reference
// data on the fly.

use chrono::{Datelike, Duration};
use rusqlite::Connection;

use crate::config::Config;
use crate::constants::{ACTORS_PER_FILM_MAX, ACTORS_PER_FILM_MIN, RENTAL_DURATION_MAX_DAYS, RENTAL_DURATION_MIN_DAYS};
use crate::db::schema::{self, NewCustomer, NewFilm};
use crate::error::Result;
use crate::sim::clock::{fmt_date, SimClock};
use crate::sim::rng::SimRng;
use crate::titles;

const COUNTRIES: &[(&str, &[&str])] = &[
    ("United States", &["Albany", "Boise", "Chattanooga", "Duluth", "Eugene", "Fresno"]),
    ("Canada", &["Halifax", "Kelowna", "Moncton", "Regina"]),
    ("United Kingdom", &["Bristol", "Dundee", "Leeds", "Swansea"]),
    ("Australia", &["Cairns", "Geelong", "Hobart", "Wollongong"]),
    ("Germany", &["Bremen", "Dortmund", "Kassel", "Leipzig"]),
    ("Japan", &["Kanazawa", "Matsuyama", "Niigata", "Sendai"]),
    ("Brazil", &["Campinas", "Curitiba", "Recife", "Santos"]),
    ("Mexico", &["Culiacan", "Merida", "Puebla", "Toluca"]),
];

const LANGUAGES: &[&str] = &["English", "Italian", "Japanese", "Mandarin", "French", "German"];

const FIRST_NAMES: &[&str] = &[
    "Aaron", "Bianca", "Calvin", "Daphne", "Elliot", "Fiona", "Gavin", "Hazel", "Ivan", "Joanna",
    "Kurt", "Lydia", "Marcus", "Nadine", "Oscar", "Paige", "Quentin", "Rhea", "Simon", "Tessa",
    "Umar", "Valerie", "Wesley", "Xander", "Yvonne", "Zachary", "Audra", "Boyd", "Celeste",
    "Damon", "Esther", "Franklin", "Gloria", "Howard", "Irene", "Jonas", "Katrina", "Leland",
    "Miriam", "Nolan",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Barlow", "Calloway", "Draper", "Ellison", "Fairchild", "Granger", "Hollis",
    "Ingram", "Jennings", "Kessler", "Lockhart", "Mercer", "Nolan", "Osborne", "Prescott",
    "Quimby", "Radford", "Sheffield", "Thatcher", "Underwood", "Vance", "Whitfield", "Xiong",
    "Yarborough", "Zimmerman", "Ashford", "Bowers", "Crandall", "Dempsey", "Eastman", "Fleming",
    "Goodwin", "Hutchins", "Irwin", "Jacobs", "Kendrick", "Landry", "Maddox", "Norwood",
];

const STREET_NAMES: &[&str] = &[
    "Maple", "Cedar", "Willow", "Juniper", "Alder", "Birch", "Sycamore", "Magnolia", "Poplar",
    "Hawthorn", "Chestnut", "Laurel",
];

const STREET_TYPES: &[&str] = &["Street", "Avenue", "Boulevard", "Lane", "Drive", "Court"];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.net", "example.org"];

/// Counts written during seeding, reported in the run summary.
#[derive(Debug, Clone, Default)]
pub struct SeedSummary {
    pub countries: u32,
    pub cities: u32,
    pub languages: u32,
    pub categories: u32,
    pub actors: u32,
    pub stores: u32,
    pub staff: u32,
    pub films: u32,
    pub inventory: u32,
    pub customers: u32,
}

/// Populate an empty database. Returns None when a catalog already exists so
/// a rerun resumes instead of double-seeding.
pub fn seed_all(
    conn: &Connection,
    config: &Config,
    clock: &SimClock,
    rng: &mut SimRng,
) -> Result<Option<SeedSummary>> {
    if schema::count_films(conn)? > 0 {
        log::info!("Catalog already seeded; skipping seed phase");
        return Ok(None);
    }

    let mut summary = SeedSummary::default();
    let start = clock.start();
    let start_str = fmt_date(start);

    // 1. Reference dimensions
    let mut city_ids = Vec::new();
    for (country, cities) in COUNTRIES {
        let country_id = schema::insert_country(conn, country)?;
        summary.countries += 1;
        for city in *cities {
            city_ids.push(schema::insert_city(conn, city, country_id)?);
            summary.cities += 1;
        }
    }

    let mut language_ids = Vec::new();
    for language in LANGUAGES {
        language_ids.push(schema::insert_language(conn, language)?);
        summary.languages += 1;
    }

    let mut category_ids = Vec::new();
    for category in &titles::CATEGORIES {
        category_ids.push(schema::insert_category(conn, category.name)?);
        summary.categories += 1;
    }

    // 2. Actors
    for _ in 0..config.generation.actors_count {
        let first = rng.pick(FIRST_NAMES);
        let last = rng.pick(LAST_NAMES);
        schema::insert_actor(conn, first, last)?;
        summary.actors += 1;
    }
    let actor_ids = schema::list_actor_ids(conn)?;

    // 3. Stores, one manager each plus configured extra staff
    let staff_per_store = config.generation.staff_per_store.max(1);
    let mut store_ids = Vec::new();
    for _ in 0..config.generation.stores_count.max(1) {
        let address_id = create_address(conn, &city_ids, rng)?;
        let store_id = schema::insert_store(conn, address_id)?;
        summary.stores += 1;

        for s in 0..staff_per_store {
            let first = rng.pick(FIRST_NAMES);
            let last = rng.pick(LAST_NAMES);
            let staff_address = create_address(conn, &city_ids, rng)?;
            let email = format!(
                "{}.{}@{}",
                first.to_lowercase(),
                last.to_lowercase(),
                EMAIL_DOMAINS[0]
            );
            let staff_id =
                schema::insert_staff(conn, first, last, staff_address, &email, store_id)?;
            summary.staff += 1;
            if s == 0 {
                schema::set_store_manager(conn, store_id, staff_id)?;
            }
        }
        store_ids.push(store_id);
    }

    // 4. Initial film catalog, genre-appropriate titles via the template
    //    system. Seed films predate the simulation and get no market-release
    //    rows.
    for _ in 0..config.generation.films_count {
        let category_idx = rng.index(titles::CATEGORIES.len());
        let film_id = create_film(
            conn,
            category_idx,
            category_ids[category_idx],
            &language_ids,
            start.year() - rng.range_i64(0, 2) as i32,
            rng,
        )?;
        summary.films += 1;

        // 3-8 actors per film keeps the join table realistic
        let actor_count = rng.range_u32(ACTORS_PER_FILM_MIN, ACTORS_PER_FILM_MAX) as usize;
        for _ in 0..actor_count.min(actor_ids.len()) {
            let actor_id = *rng.pick(&actor_ids);
            schema::link_film_actor(conn, actor_id, film_id)?;
        }
    }

    // 5. Initial inventory: configured copies per film at every store,
    //    purchased sometime in the year before the simulation starts.
    let copies = config.generation.inventory_copies_per_store;
    let film_count = schema::count_films(conn)?;
    for film_id in 1..=film_count {
        for &store_id in &store_ids {
            let staff = schema::list_staff_for_store(conn, store_id)?;
            let n = rng.range_u32(copies[0], copies[1]);
            for _ in 0..n {
                let purchased = start - Duration::days(rng.range_i64(30, 360));
                schema::insert_inventory(
                    conn,
                    film_id,
                    store_id,
                    &fmt_date(purchased),
                    *rng.pick(&staff),
                )?;
                summary.inventory += 1;
            }
        }
    }

    // 6. Opening customer population
    for n in 0..config.generation.initial_customers {
        create_customer(conn, config, &store_ids, &city_ids, &start_str, n as u64, rng)?;
        summary.customers += 1;
    }

    log::info!(
        "Seeded {} films, {} inventory copies, {} customers across {} stores",
        summary.films,
        summary.inventory,
        summary.customers,
        summary.stores
    );

    Ok(Some(summary))
}

/// One street address in a random seeded city.
pub fn create_address(conn: &Connection, city_ids: &[i64], rng: &mut SimRng) -> Result<i64> {
    let number = rng.range_i64(1, 9999);
    let street = format!("{} {} {}", number, rng.pick(STREET_NAMES), rng.pick(STREET_TYPES));
    let district = format!("District {}", rng.range_i64(1, 20));
    let postal = format!("{:05}", rng.range_i64(10000, 99999));
    let phone = format!("555-{:04}", rng.range_i64(0, 9999));
    schema::insert_address(conn, &street, &district, *rng.pick(city_ids), &postal, &phone)
}

/// Write one film in the given category, with category-appropriate title,
/// description, rating, length, and pricing.
pub fn create_film(
    conn: &Connection,
    category_idx: usize,
    category_id: i64,
    language_ids: &[i64],
    release_year: i32,
    rng: &mut SimRng,
) -> Result<i64> {
    let profile = &titles::CATEGORIES[category_idx];
    let generated = titles::generate_film_title(profile, rng);
    let replacement_cost = titles::sample_replacement_cost(profile, rng);

    let film = NewFilm {
        title: generated.title,
        description: generated.description,
        release_year,
        language_id: *rng.pick(language_ids),
        rental_duration: rng.range_i64(RENTAL_DURATION_MIN_DAYS, RENTAL_DURATION_MAX_DAYS),
        rental_rate: titles::rental_price(replacement_cost),
        length: titles::sample_length(profile, rng),
        replacement_cost,
        rating: generated.rating,
    };
    let film_id = schema::insert_film(conn, &film)?;
    schema::link_film_category(conn, film_id, category_id)?;
    Ok(film_id)
}

/// Write one customer with a fresh address, bucketed into a behavioral
/// segment by cumulative percentage.
pub fn create_customer(
    conn: &Connection,
    config: &Config,
    store_ids: &[i64],
    city_ids: &[i64],
    create_date: &str,
    seq: u64,
    rng: &mut SimRng,
) -> Result<i64> {
    let first = rng.pick(FIRST_NAMES);
    let last = rng.pick(LAST_NAMES);
    let email = format!(
        "{}.{}{}@{}",
        first.to_lowercase(),
        last.to_lowercase(),
        seq,
        rng.pick(EMAIL_DOMAINS)
    );
    let segment = config.generation.customer_segments.bucket(rng.uniform());
    let segment_config = config.generation.customer_segments.get(segment);
    let address_id = create_address(conn, city_ids, rng)?;

    schema::insert_customer(
        conn,
        &NewCustomer {
            store_id: *rng.pick(store_ids),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email,
            address_id,
            create_date: create_date.to_string(),
            segment: segment.as_str().to_string(),
            lifetime_weeks: segment_config.lifetime_weeks,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.generation.films_count = 20;
        config.generation.stores_count = 2;
        config.generation.staff_per_store = 2;
        config.generation.actors_count = 15;
        config.generation.initial_customers = 30;
        config
    }

    #[test]
    fn seed_populates_every_dimension() {
        let conn = open_in_memory().unwrap();
        let config = small_config();
        let clock = SimClock::new("2002-01-01").unwrap();
        let mut rng = SimRng::new(1);

        let summary = seed_all(&conn, &config, &clock, &mut rng).unwrap().unwrap();
        assert_eq!(summary.categories, 16);
        assert_eq!(summary.films, 20);
        assert_eq!(summary.stores, 2);
        assert_eq!(summary.staff, 4);
        assert_eq!(summary.customers, 30);
        assert!(summary.inventory >= 20 * 2 * 2);
        assert!(summary.inventory <= 20 * 2 * 3);

        assert_eq!(schema::count_films(&conn).unwrap(), 20);
        assert_eq!(schema::count_active_customers(&conn).unwrap(), 30);
        assert_eq!(schema::list_store_ids(&conn).unwrap().len(), 2);
    }

    #[test]
    fn seed_twice_is_skipped() {
        let conn = open_in_memory().unwrap();
        let config = small_config();
        let clock = SimClock::new("2002-01-01").unwrap();
        let mut rng = SimRng::new(1);

        seed_all(&conn, &config, &clock, &mut rng).unwrap().unwrap();
        let second = seed_all(&conn, &config, &clock, &mut rng).unwrap();
        assert!(second.is_none());
        assert_eq!(schema::count_films(&conn).unwrap(), 20);
    }

    #[test]
    fn every_store_has_a_manager() {
        let conn = open_in_memory().unwrap();
        let config = small_config();
        let clock = SimClock::new("2002-01-01").unwrap();
        let mut rng = SimRng::new(2);
        seed_all(&conn, &config, &clock, &mut rng).unwrap();

        let unmanaged: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM store WHERE manager_staff_id IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(unmanaged, 0);
    }

    #[test]
    fn every_film_has_language_and_category() {
        let conn = open_in_memory().unwrap();
        let config = small_config();
        let clock = SimClock::new("2002-01-01").unwrap();
        let mut rng = SimRng::new(3);
        seed_all(&conn, &config, &clock, &mut rng).unwrap();

        let uncategorized: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM film f
                 WHERE NOT EXISTS (SELECT 1 FROM film_category fc WHERE fc.film_id = f.film_id)",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(uncategorized, 0);
    }

    #[test]
    fn segment_mix_tracks_configured_percentages() {
        let conn = open_in_memory().unwrap();
        let mut config = small_config();
        config.generation.initial_customers = 1000;
        let clock = SimClock::new("2002-01-01").unwrap();
        let mut rng = SimRng::new(4);
        seed_all(&conn, &config, &clock, &mut rng).unwrap();

        let counts = schema::active_segment_counts(&conn).unwrap();
        let total: i64 = counts.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 1000);
        for (segment, count) in counts {
            let expected = match segment.as_str() {
                "super_loyal" => 0.05,
                "loyal" => 0.15,
                "average" => 0.50,
                "occasional" => 0.30,
                other => panic!("unexpected segment {}", other),
            };
            let share = count as f64 / total as f64;
            assert!(
                (share - expected).abs() < 0.05,
                "{} share {:.3} expected {:.3}",
                segment,
                share,
                expected
            );
        }
    }
}
