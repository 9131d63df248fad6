// Simulation clock
// Week arithmetic over the configured anchor date. Week numbers are 1-based;
// each week covers 7 calendar days starting at the anchor.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::constants::{CLOSE_HOUR, DAYS_PER_WEEK, OPEN_HOUR};
use crate::error::{Result, SimError};
use crate::sim::rng::SimRng;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    start: NaiveDate,
}

impl SimClock {
    pub fn new(start_date: &str) -> Result<SimClock> {
        let start = NaiveDate::parse_from_str(start_date, DATE_FORMAT).map_err(|_| {
            SimError::InvalidConfig(format!("start_date '{}' is not YYYY-MM-DD", start_date))
        })?;
        Ok(SimClock { start })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day of 1-based week `w`.
    pub fn week_start(&self, w: u32) -> NaiveDate {
        self.start + Duration::days((w as i64 - 1) * DAYS_PER_WEEK)
    }

    /// Exclusive end of week `w` (first day of week w+1).
    pub fn week_end(&self, w: u32) -> NaiveDate {
        self.week_start(w + 1)
    }

    /// The `d`-th day (0..7) of week `w`.
    pub fn day_of_week(&self, w: u32, d: u32) -> NaiveDate {
        self.week_start(w) + Duration::days(d as i64)
    }

    /// Quarter label for a date, e.g. "2002-Q3".
    pub fn quarter_label(date: NaiveDate) -> String {
        format!("{}-Q{}", date.year(), (date.month0() / 3) + 1)
    }

    /// A datetime on `date` at a uniformly random time within opening hours.
    pub fn business_datetime(date: NaiveDate, rng: &mut SimRng) -> NaiveDateTime {
        let hour = rng.range_u32(OPEN_HOUR, CLOSE_HOUR - 1);
        let minute = rng.range_u32(0, 59);
        let second = rng.range_u32(0, 59);
        date.and_time(NaiveTime::from_hms_opt(hour, minute, second).expect("valid business time"))
    }
}

pub fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn fmt_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    // Accept both plain dates and datetimes; stored values mix the two.
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(date);
    }
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|dt| dt.date())
        .map_err(|_| SimError::Other(format!("unparseable date '{}'", s)))
}

pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight"))
        .map_err(|_| SimError::Other(format!("unparseable datetime '{}'", s)))
}
