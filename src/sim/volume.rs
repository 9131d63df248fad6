// Weekly volume model
// Expected rental count is the base volume under four stacked multipliers:
// lifecycle phase (compounding), seasonality (monthly table or CLI override),
// spike days, and nothing else. The day-of-week split shifts from
// weekend-heavy to weekday-heavy as the simulated business matures.

use chrono::Datelike;

use crate::config::{Config, LifecyclePhase};
use crate::constants::{DAYS_PER_WEEK, EARLY_DAY_WEIGHTS, LATE_DAY_WEIGHTS, WEEKDAY_ERA_WEEKS, WEEKEND_ERA_WEEKS};
use crate::sim::clock::SimClock;
use crate::sim::rng::SimRng;

/// Resolved multipliers for one week.
#[derive(Debug, Clone)]
pub struct WeekVolume {
    pub week: u32,
    pub phase: LifecyclePhase,
    pub phase_multiplier: f64,
    pub seasonal_multiplier: f64,
    pub spike_multiplier: f64,
    pub expected: u32,
}

/// Cumulative phase multiplier for week `w`: each week multiplies by
/// (1 + factor) of its phase, so a plateau holds the level the growth phase
/// reached instead of snapping back to base.
pub fn phase_multiplier(config: &Config, w: u32) -> f64 {
    let lifecycle = &config.generation.business_lifecycle;
    let modifiers = &config.generation.volume_modifiers;
    let mut multiplier = 1.0;
    for k in 2..=w {
        multiplier *= 1.0 + modifiers.factor(lifecycle.phase_at(k));
    }
    multiplier
}

/// Seasonal multiplier for the week starting on `week_start`. The CLI
/// override replaces the monthly table entirely; volatility only applies to
/// table-driven values.
pub fn seasonal_multiplier(config: &Config, clock: &SimClock, w: u32, rng: &mut SimRng) -> f64 {
    if let Some(fixed) = config.season_override {
        return fixed;
    }
    if !config.generation.advanced_features.seasonality.enabled {
        return 1.0;
    }
    let seasonality = &config.generation.seasonality;
    let month = clock.week_start(w).month();
    let base = seasonality.month_multiplier(month);
    if seasonality.volatility > 0.0 {
        let noise = rng.range_f64(-seasonality.volatility, seasonality.volatility);
        (base + noise).max(0.0)
    } else {
        base
    }
}

fn spike_multiplier(config: &Config, rng: &mut SimRng) -> f64 {
    let spike = &config.generation.spike;
    if spike.enabled && rng.chance(spike.probability) {
        spike.factor
    } else {
        1.0
    }
}

/// Resolve the expected volume for week `w`.
pub fn resolve_week(config: &Config, clock: &SimClock, w: u32, rng: &mut SimRng) -> WeekVolume {
    let phase = config.generation.business_lifecycle.phase_at(w);
    let phase_mult = phase_multiplier(config, w);
    let seasonal_mult = seasonal_multiplier(config, clock, w, rng);
    let spike_mult = spike_multiplier(config, rng);

    let base = config.generation.base_weekly_transactions as f64;
    let expected = (base * phase_mult * seasonal_mult * spike_mult).round().max(0.0) as u32;

    WeekVolume {
        week: w,
        phase,
        phase_multiplier: phase_mult,
        seasonal_multiplier: seasonal_mult,
        spike_multiplier: spike_mult,
        expected,
    }
}

/// Day-of-week weight vector (Mon..Sun) for week `w`: weekend-heavy early,
/// weekday-heavy from WEEKDAY_ERA_WEEKS on, with a linear blend in between.
pub fn day_weights(w: u32) -> [f64; 7] {
    if w <= WEEKEND_ERA_WEEKS {
        return EARLY_DAY_WEIGHTS;
    }
    if w >= WEEKDAY_ERA_WEEKS {
        return LATE_DAY_WEIGHTS;
    }
    let t = (w - WEEKEND_ERA_WEEKS) as f64 / (WEEKDAY_ERA_WEEKS - WEEKEND_ERA_WEEKS) as f64;
    let mut blended = [0.0; 7];
    for i in 0..7 {
        blended[i] = EARLY_DAY_WEIGHTS[i] * (1.0 - t) + LATE_DAY_WEIGHTS[i] * t;
    }
    blended
}

/// Distribute `total` rentals over the 7 days of week `w`. Slots are the
/// week's calendar days in order; each is weighted by its actual weekday
/// (the anchor date need not be a Monday).
pub fn distribute_over_days(
    total: u32,
    w: u32,
    clock: &SimClock,
    rng: &mut SimRng,
) -> [u32; DAYS_PER_WEEK as usize] {
    let weekday_weights = day_weights(w);
    let mut slot_weights = [0.0; DAYS_PER_WEEK as usize];
    for (d, slot) in slot_weights.iter_mut().enumerate() {
        let weekday = clock.day_of_week(w, d as u32).weekday().num_days_from_monday() as usize;
        *slot = weekday_weights[weekday];
    }
    let mut counts = [0u32; DAYS_PER_WEEK as usize];
    for _ in 0..total {
        counts[rng.weighted_index(&slot_weights)] += 1;
    }
    counts
}
