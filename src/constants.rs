// Rentalgen Constants
// Defaults shared by the config resolver and the simulation kernel.

pub const DB_EXTENSION: &str = "db";
pub const DEFAULT_DB_NAME: &str = "rentalgen";
pub const DEFAULT_CONFIG_FILE: &str = "rentalgen.json";

// Simulation defaults
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_START_DATE: &str = "2002-01-01";
pub const DEFAULT_WEEKS: u32 = 104;
pub const DAYS_PER_WEEK: i64 = 7;

// Generation defaults
pub const DEFAULT_FILMS_COUNT: u32 = 200;
pub const DEFAULT_STORES_COUNT: u32 = 2;
pub const DEFAULT_STAFF_PER_STORE: u32 = 2;
pub const DEFAULT_ACTORS_COUNT: u32 = 60;
pub const DEFAULT_INITIAL_CUSTOMERS: u32 = 300;
pub const DEFAULT_WEEKLY_NEW_CUSTOMERS: u32 = 8;
pub const DEFAULT_BASE_WEEKLY_TRANSACTIONS: u32 = 250;

// Rental distribution
pub const DEFAULT_ZIPF_ALPHA: f64 = 1.0;

// New-release boost
pub const DEFAULT_BOOST_DAYS: i64 = 40;
pub const DEFAULT_BOOST_FACTOR: f64 = 2.0;
pub const DEFAULT_BOOST_PERCENTAGE: u32 = 40;

// Return behavior: 70% on time, 20% never returned, 10% late by 1-10 days
pub const RETURN_ON_TIME_PROBABILITY: f64 = 0.70;
pub const RETURN_NEVER_PROBABILITY: f64 = 0.20;
pub const LATE_RETURN_MAX_DAYS: i64 = 10;

// Spike days
pub const SPIKE_PROBABILITY: f64 = 0.05;
pub const SPIKE_FACTOR: f64 = 4.0;

// Late fees
pub const DEFAULT_DAILY_LATE_FEE: f64 = 1.50;

// AR aging bucket thresholds (days past due)
pub const AR_BUCKET_30: i64 = 30;
pub const AR_BUCKET_60: i64 = 60;
pub const AR_BUCKET_90: i64 = 90;

// Inventory status event probabilities (per return)
pub const DEFAULT_DAMAGED_PROBABILITY: f64 = 0.02;
pub const DEFAULT_MISSING_PROBABILITY: f64 = 0.01;
pub const DEFAULT_MAINTENANCE_PROBABILITY: f64 = 0.03;

// Film pricing: rental price is a fixed fraction of replacement cost
pub const RENTAL_PRICE_RATIO: f64 = 0.20;

// Hot-category purchases: prefer films released within this window
pub const HOT_CATEGORY_RECENT_DAYS: i64 = 30;
pub const HOT_CATEGORY_RECENT_PROBABILITY: f64 = 0.70;

// Day-of-week weighting.
// Early weeks skew to the weekend, later weeks to weekdays; the two vectors
// are interpolated between WEEKEND_ERA_WEEKS and WEEKDAY_ERA_WEEKS.
pub const WEEKEND_ERA_WEEKS: u32 = 8;
pub const WEEKDAY_ERA_WEEKS: u32 = 24;
// Mon..Sun, weekend (Fri+Sat+Sun) carries 50% of volume
pub const EARLY_DAY_WEIGHTS: [f64; 7] = [0.12, 0.12, 0.13, 0.13, 0.15, 0.20, 0.15];
// Mon..Sun, weekdays (Mon-Fri) carry 70% of volume
pub const LATE_DAY_WEIGHTS: [f64; 7] = [0.14, 0.14, 0.14, 0.14, 0.14, 0.16, 0.14];

// Business hours for rental timestamps (inclusive start, exclusive end)
pub const OPEN_HOUR: u32 = 10;
pub const CLOSE_HOUR: u32 = 22;

// Film attributes
pub const RATINGS: [&str; 5] = ["G", "PG", "PG-13", "R", "NC-17"];
pub const RENTAL_DURATION_MIN_DAYS: i64 = 3;
pub const RENTAL_DURATION_MAX_DAYS: i64 = 7;
pub const ACTORS_PER_FILM_MIN: u32 = 3;
pub const ACTORS_PER_FILM_MAX: u32 = 8;

// Driver behavior
pub const CONNECT_MAX_ATTEMPTS: u32 = 3;
pub const CONNECT_BASE_BACKOFF_MS: u64 = 250;
