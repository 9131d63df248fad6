// Configuration bundle and per-week parameter resolution.
// The config is a single JSON document; every group has serde defaults so a
// partial file (or none at all) still yields a runnable bundle.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SimError};
use crate::titles;

const SEGMENT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub master_simulation: MasterSimulation,
    #[serde(default)]
    pub inventory_purchasing: InventoryPurchasing,

    /// Fixed seasonal boost from the CLI. Replaces the monthly table when set.
    #[serde(skip)]
    pub season_override: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_dir")]
    pub dir: String,
    #[serde(default = "default_db_name")]
    pub name: String,
}

fn default_db_dir() -> String {
    ".".to_string()
}

fn default_db_name() -> String {
    DEFAULT_DB_NAME.to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            dir: default_db_dir(),
            name: default_db_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Anchor date for week 1 (YYYY-MM-DD).
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default = "default_weeks")]
    pub weeks: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_start_date() -> String {
    DEFAULT_START_DATE.to_string()
}

fn default_weeks() -> u32 {
    DEFAULT_WEEKS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            start_date: default_start_date(),
            weeks: default_weeks(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_films_count")]
    pub films_count: u32,
    #[serde(default = "default_stores_count")]
    pub stores_count: u32,
    #[serde(default = "default_staff_per_store")]
    pub staff_per_store: u32,
    #[serde(default = "default_actors_count")]
    pub actors_count: u32,
    #[serde(default = "default_initial_customers")]
    pub initial_customers: u32,
    #[serde(default = "default_weekly_new_customers")]
    pub weekly_new_customers: u32,
    #[serde(default = "default_base_weekly_transactions")]
    pub base_weekly_transactions: u32,
    /// Initial copies per film at each store, inclusive range.
    #[serde(default = "default_copies_per_store")]
    pub inventory_copies_per_store: [u32; 2],
    #[serde(default)]
    pub customer_segments: CustomerSegments,
    #[serde(default)]
    pub business_lifecycle: BusinessLifecycle,
    #[serde(default)]
    pub volume_modifiers: VolumeModifiers,
    #[serde(default)]
    pub rental_distribution: RentalDistribution,
    #[serde(default)]
    pub spike: SpikeConfig,
    #[serde(default)]
    pub new_movie_boost: NewMovieBoost,
    #[serde(default)]
    pub reactivation: ReactivationConfig,
    #[serde(default)]
    pub advanced_features: AdvancedFeatures,
    #[serde(default)]
    pub seasonality: SeasonalityConfig,
}

fn default_films_count() -> u32 {
    DEFAULT_FILMS_COUNT
}
fn default_stores_count() -> u32 {
    DEFAULT_STORES_COUNT
}
fn default_staff_per_store() -> u32 {
    DEFAULT_STAFF_PER_STORE
}
fn default_actors_count() -> u32 {
    DEFAULT_ACTORS_COUNT
}
fn default_initial_customers() -> u32 {
    DEFAULT_INITIAL_CUSTOMERS
}
fn default_weekly_new_customers() -> u32 {
    DEFAULT_WEEKLY_NEW_CUSTOMERS
}
fn default_base_weekly_transactions() -> u32 {
    DEFAULT_BASE_WEEKLY_TRANSACTIONS
}
fn default_copies_per_store() -> [u32; 2] {
    [2, 3]
}

impl Default for GenerationConfig {
    fn default() -> Self {
        serde_json::from_str("{}").expect("empty generation config")
    }
}

// ----- Customer segments -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    SuperLoyal,
    Loyal,
    Average,
    Occasional,
}

impl Segment {
    pub const ALL: [Segment; 4] = [
        Segment::SuperLoyal,
        Segment::Loyal,
        Segment::Average,
        Segment::Occasional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::SuperLoyal => "super_loyal",
            Segment::Loyal => "loyal",
            Segment::Average => "average",
            Segment::Occasional => "occasional",
        }
    }

    pub fn from_str(s: &str) -> Option<Segment> {
        match s {
            "super_loyal" => Some(Segment::SuperLoyal),
            "loyal" => Some(Segment::Loyal),
            "average" => Some(Segment::Average),
            "occasional" => Some(Segment::Occasional),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    pub percentage: f64,
    pub churn_rate: f64,
    pub activity_multiplier: f64,
    pub lifetime_weeks: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSegments {
    #[serde(default = "default_super_loyal")]
    pub super_loyal: SegmentConfig,
    #[serde(default = "default_loyal")]
    pub loyal: SegmentConfig,
    #[serde(default = "default_average")]
    pub average: SegmentConfig,
    #[serde(default = "default_occasional")]
    pub occasional: SegmentConfig,
}

fn default_super_loyal() -> SegmentConfig {
    SegmentConfig {
        percentage: 0.05,
        churn_rate: 0.05,
        activity_multiplier: 3.0,
        lifetime_weeks: 150.0,
    }
}

fn default_loyal() -> SegmentConfig {
    SegmentConfig {
        percentage: 0.15,
        churn_rate: 0.10,
        activity_multiplier: 2.0,
        lifetime_weeks: 100.0,
    }
}

fn default_average() -> SegmentConfig {
    SegmentConfig {
        percentage: 0.50,
        churn_rate: 0.20,
        activity_multiplier: 1.0,
        lifetime_weeks: 60.0,
    }
}

fn default_occasional() -> SegmentConfig {
    SegmentConfig {
        percentage: 0.30,
        churn_rate: 0.40,
        activity_multiplier: 0.5,
        lifetime_weeks: 25.0,
    }
}

impl Default for CustomerSegments {
    fn default() -> Self {
        CustomerSegments {
            super_loyal: default_super_loyal(),
            loyal: default_loyal(),
            average: default_average(),
            occasional: default_occasional(),
        }
    }
}

impl CustomerSegments {
    pub fn get(&self, segment: Segment) -> &SegmentConfig {
        match segment {
            Segment::SuperLoyal => &self.super_loyal,
            Segment::Loyal => &self.loyal,
            Segment::Average => &self.average,
            Segment::Occasional => &self.occasional,
        }
    }

    /// Bucket a uniform draw in [0,1) into a segment by cumulative percentage.
    pub fn bucket(&self, draw: f64) -> Segment {
        let mut acc = 0.0;
        for segment in Segment::ALL {
            acc += self.get(segment).percentage;
            if draw < acc {
                return segment;
            }
        }
        Segment::Occasional
    }
}

// ----- Business lifecycle -----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Growth,
    Plateau,
    Decline,
    Reactivation,
}

impl LifecyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::Growth => "growth",
            LifecyclePhase::Plateau => "plateau",
            LifecyclePhase::Decline => "decline",
            LifecyclePhase::Reactivation => "reactivation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessLifecycle {
    pub growth_phase_weeks: u32,
    pub plateau_phase_weeks: u32,
    pub decline_phase_weeks: u32,
    pub reactivation_phase_weeks: u32,
}

impl Default for BusinessLifecycle {
    fn default() -> Self {
        BusinessLifecycle {
            growth_phase_weeks: 40,
            plateau_phase_weeks: 34,
            decline_phase_weeks: 20,
            reactivation_phase_weeks: 10,
        }
    }
}

impl BusinessLifecycle {
    pub fn total_weeks(&self) -> u32 {
        self.growth_phase_weeks
            + self.plateau_phase_weeks
            + self.decline_phase_weeks
            + self.reactivation_phase_weeks
    }

    /// Phase containing 1-based week `w`. Weeks past the partition stay in
    /// the final phase.
    pub fn phase_at(&self, w: u32) -> LifecyclePhase {
        let mut boundary = self.growth_phase_weeks;
        if w <= boundary {
            return LifecyclePhase::Growth;
        }
        boundary += self.plateau_phase_weeks;
        if w <= boundary {
            return LifecyclePhase::Plateau;
        }
        boundary += self.decline_phase_weeks;
        if w <= boundary {
            return LifecyclePhase::Decline;
        }
        LifecyclePhase::Reactivation
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeModifiers {
    pub growth_factor: f64,
    pub plateau_factor: f64,
    pub decline_factor: f64,
    pub reactivation_factor: f64,
}

impl Default for VolumeModifiers {
    fn default() -> Self {
        VolumeModifiers {
            growth_factor: 0.02,
            plateau_factor: 0.0,
            decline_factor: -0.02,
            reactivation_factor: 0.01,
        }
    }
}

impl VolumeModifiers {
    pub fn factor(&self, phase: LifecyclePhase) -> f64 {
        match phase {
            LifecyclePhase::Growth => self.growth_factor,
            LifecyclePhase::Plateau => self.plateau_factor,
            LifecyclePhase::Decline => self.decline_factor,
            LifecyclePhase::Reactivation => self.reactivation_factor,
        }
    }
}

// ----- Rental distribution -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalDistribution {
    /// Zipf exponent over popularity rank.
    pub alpha: f64,
}

impl Default for RentalDistribution {
    fn default() -> Self {
        RentalDistribution {
            alpha: DEFAULT_ZIPF_ALPHA,
        }
    }
}

/// Occasional rush days: with probability `probability` a week's volume is
/// multiplied by `factor`. Stacks with phase and seasonal multipliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeConfig {
    pub enabled: bool,
    pub probability: f64,
    pub factor: f64,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        SpikeConfig {
            enabled: true,
            probability: SPIKE_PROBABILITY,
            factor: SPIKE_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovieBoost {
    pub enabled: bool,
    pub days_to_boost: i64,
    pub boost_factor: f64,
    /// Films with film_id % 100 below this value receive the boost.
    pub boost_percentage: u32,
}

impl Default for NewMovieBoost {
    fn default() -> Self {
        NewMovieBoost {
            enabled: true,
            days_to_boost: DEFAULT_BOOST_DAYS,
            boost_factor: DEFAULT_BOOST_FACTOR,
            boost_percentage: DEFAULT_BOOST_PERCENTAGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactivationConfig {
    pub enabled: bool,
    pub probability: f64,
    pub start_week: u32,
    pub duration_weeks: u32,
}

impl Default for ReactivationConfig {
    fn default() -> Self {
        ReactivationConfig {
            enabled: false,
            probability: 0.10,
            start_week: 0,
            duration_weeks: 0,
        }
    }
}

impl ReactivationConfig {
    pub fn active_at(&self, w: u32) -> bool {
        self.enabled && w >= self.start_week && w <= self.start_week + self.duration_weeks
    }
}

// ----- Advanced features -----

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdvancedFeatures {
    #[serde(default)]
    pub late_fees: LateFeeFeature,
    #[serde(default)]
    pub ar_tracking: Toggle,
    #[serde(default)]
    pub inventory_status: InventoryStatusFeature,
    #[serde(default)]
    pub seasonality: SeasonalityToggle,
    #[serde(default)]
    pub customer_churn: ChurnToggle,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Toggle {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityToggle {
    pub enabled: bool,
}

impl Default for SeasonalityToggle {
    fn default() -> Self {
        SeasonalityToggle { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnToggle {
    pub enabled: bool,
}

impl Default for ChurnToggle {
    fn default() -> Self {
        ChurnToggle { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LateFeeFeature {
    pub enabled: bool,
    pub daily_rate: f64,
}

impl Default for LateFeeFeature {
    fn default() -> Self {
        LateFeeFeature {
            enabled: false,
            daily_rate: DEFAULT_DAILY_LATE_FEE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryStatusFeature {
    pub enabled: bool,
    pub damaged_probability: f64,
    pub missing_probability: f64,
    pub maintenance_probability: f64,
    /// Weeks a copy stays damaged/in maintenance before returning to the
    /// floor. 1 = back at the next weekly tick.
    pub repair_weeks: u32,
}

impl Default for InventoryStatusFeature {
    fn default() -> Self {
        InventoryStatusFeature {
            enabled: false,
            damaged_probability: DEFAULT_DAMAGED_PROBABILITY,
            missing_probability: DEFAULT_MISSING_PROBABILITY,
            maintenance_probability: DEFAULT_MAINTENANCE_PROBABILITY,
            repair_weeks: 1,
        }
    }
}

// ----- Seasonality -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityConfig {
    /// Jan..Dec base multipliers.
    pub monthly: [f64; 12],
    /// Uniform noise half-width applied to the monthly multiplier.
    pub volatility: f64,
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        SeasonalityConfig {
            monthly: [
                0.90, 0.85, 0.95, 1.00, 1.05, 1.20, 1.30, 1.25, 1.00, 0.95, 1.00, 1.15,
            ],
            volatility: 0.05,
        }
    }
}

impl SeasonalityConfig {
    /// Base multiplier for a 1-based month.
    pub fn month_multiplier(&self, month: u32) -> f64 {
        self.monthly[((month.max(1) - 1) % 12) as usize]
    }
}

// ----- Master simulation -----

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MasterSimulation {
    #[serde(default)]
    pub film_release_strategy: FilmReleaseStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmReleaseStrategy {
    /// New market films generated each week (not stocked as inventory).
    pub market_weekly_releases: u32,
    #[serde(default)]
    pub hot_categories: Vec<HotCategory>,
}

impl Default for FilmReleaseStrategy {
    fn default() -> Self {
        FilmReleaseStrategy {
            market_weekly_releases: 2,
            hot_categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotCategory {
    pub weeks: Vec<u32>,
    pub category: String,
    pub purchase_per_release: u32,
}

// ----- Inventory purchasing -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStrategyKind {
    Aggressive,
    Stable,
    Seasonal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryPurchasing {
    pub strategy: PurchaseStrategyKind,
    /// Copies bought per selected film, inclusive range.
    pub inventory_per_film: [u32; 2],
    /// Fraction of purchases spread across categories outside the target.
    pub diversification: f64,
}

impl Default for InventoryPurchasing {
    fn default() -> Self {
        InventoryPurchasing {
            strategy: PurchaseStrategyKind::Stable,
            inventory_per_film: [1, 2],
            diversification: 0.2,
        }
    }
}

// ----- Load / validate -----

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SimError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| SimError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Apply CLI overrides after load. `season` is an integer percent; 0
    /// disables seasonality entirely, negatives are allowed.
    pub fn apply_overrides(
        &mut self,
        database: Option<String>,
        season: Option<i32>,
        weeks: Option<u32>,
    ) {
        if let Some(name) = database {
            self.database.name = name;
        }
        if let Some(pct) = season {
            self.season_override = Some(1.0 + pct as f64 / 100.0);
        }
        if let Some(w) = weeks {
            self.simulation.weeks = w;
            // Keep the default partition usable when only the horizon moved.
            if self.generation.business_lifecycle.total_weeks() != w {
                self.generation.business_lifecycle = scale_lifecycle(w);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let weeks = self.simulation.weeks;
        if weeks == 0 {
            return Err(SimError::InvalidConfig("simulation.weeks must be > 0".into()));
        }

        chrono::NaiveDate::parse_from_str(&self.simulation.start_date, "%Y-%m-%d").map_err(
            |_| {
                SimError::InvalidConfig(format!(
                    "simulation.start_date '{}' is not YYYY-MM-DD",
                    self.simulation.start_date
                ))
            },
        )?;

        let lifecycle_total = self.generation.business_lifecycle.total_weeks();
        if lifecycle_total != weeks {
            return Err(SimError::InvalidConfig(format!(
                "business_lifecycle phases sum to {} weeks, expected {}",
                lifecycle_total, weeks
            )));
        }

        let segments = &self.generation.customer_segments;
        let pct_sum: f64 = Segment::ALL
            .iter()
            .map(|s| segments.get(*s).percentage)
            .sum();
        if (pct_sum - 1.0).abs() > SEGMENT_EPSILON {
            return Err(SimError::InvalidConfig(format!(
                "customer segment percentages sum to {:.6}, expected 1.0",
                pct_sum
            )));
        }
        for segment in Segment::ALL {
            let sc = segments.get(segment);
            if sc.lifetime_weeks <= 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "segment {} lifetime_weeks must be > 0",
                    segment.as_str()
                )));
            }
            if !(0.0..=1.0).contains(&sc.churn_rate) {
                return Err(SimError::InvalidConfig(format!(
                    "segment {} churn_rate must be in [0,1]",
                    segment.as_str()
                )));
            }
        }

        if self.generation.rental_distribution.alpha <= 0.0 {
            return Err(SimError::InvalidConfig(
                "rental_distribution.alpha must be > 0".into(),
            ));
        }

        let copies = self.generation.inventory_copies_per_store;
        if copies[0] == 0 || copies[0] > copies[1] {
            return Err(SimError::InvalidConfig(format!(
                "inventory_copies_per_store [{}, {}] is not a valid range",
                copies[0], copies[1]
            )));
        }

        let per_film = self.inventory_purchasing.inventory_per_film;
        if per_film[0] == 0 || per_film[0] > per_film[1] {
            return Err(SimError::InvalidConfig(format!(
                "inventory_per_film [{}, {}] is not a valid range",
                per_film[0], per_film[1]
            )));
        }

        let reactivation = &self.generation.reactivation;
        if !(0.0..=1.0).contains(&reactivation.probability) {
            return Err(SimError::InvalidConfig(
                "reactivation.probability must be in [0,1]".into(),
            ));
        }

        for hot in &self.master_simulation.film_release_strategy.hot_categories {
            if !titles::is_known_category(&hot.category) {
                return Err(SimError::InvalidConfig(format!(
                    "hot category '{}' is not in the seed catalog",
                    hot.category
                )));
            }
        }

        let inv = &self.generation.advanced_features.inventory_status;
        for (name, p) in [
            ("damaged_probability", inv.damaged_probability),
            ("missing_probability", inv.missing_probability),
            ("maintenance_probability", inv.maintenance_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::InvalidConfig(format!(
                    "inventory_status.{} must be in [0,1]",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Partition `weeks` into the four phases with the default 40/32/18/10 shape.
fn scale_lifecycle(weeks: u32) -> BusinessLifecycle {
    let growth = ((weeks as f64 * 0.40).round() as u32).clamp(1, weeks);
    let plateau = ((weeks as f64 * 0.32).round() as u32).min(weeks - growth);
    let decline = ((weeks as f64 * 0.18).round() as u32).min(weeks - growth - plateau);
    let reactivation = weeks - growth - plateau - decline;
    BusinessLifecycle {
        growth_phase_weeks: growth,
        plateau_phase_weeks: plateau,
        decline_phase_weeks: decline,
        reactivation_phase_weeks: reactivation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.simulation.weeks, 104);
        assert_eq!(config.generation.business_lifecycle.total_weeks(), 104);
    }

    #[test]
    fn phase_partition_covers_timeline() {
        let lifecycle = BusinessLifecycle {
            growth_phase_weeks: 4,
            plateau_phase_weeks: 4,
            decline_phase_weeks: 2,
            reactivation_phase_weeks: 2,
        };
        assert_eq!(lifecycle.phase_at(1), LifecyclePhase::Growth);
        assert_eq!(lifecycle.phase_at(4), LifecyclePhase::Growth);
        assert_eq!(lifecycle.phase_at(5), LifecyclePhase::Plateau);
        assert_eq!(lifecycle.phase_at(8), LifecyclePhase::Plateau);
        assert_eq!(lifecycle.phase_at(9), LifecyclePhase::Decline);
        assert_eq!(lifecycle.phase_at(10), LifecyclePhase::Decline);
        assert_eq!(lifecycle.phase_at(11), LifecyclePhase::Reactivation);
        assert_eq!(lifecycle.phase_at(12), LifecyclePhase::Reactivation);
        assert_eq!(lifecycle.phase_at(99), LifecyclePhase::Reactivation);
    }

    #[test]
    fn phase_mismatch_rejected() {
        let mut config = Config::default();
        config.simulation.weeks = 50;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn segment_percentages_must_sum_to_one() {
        let mut config = Config::default();
        config.generation.customer_segments.average.percentage = 0.9;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn segment_bucketing_respects_cumulative_order() {
        let segments = CustomerSegments::default();
        assert_eq!(segments.bucket(0.01), Segment::SuperLoyal);
        assert_eq!(segments.bucket(0.10), Segment::Loyal);
        assert_eq!(segments.bucket(0.40), Segment::Average);
        assert_eq!(segments.bucket(0.95), Segment::Occasional);
    }

    #[test]
    fn unknown_hot_category_rejected() {
        let mut config = Config::default();
        config
            .master_simulation
            .film_release_strategy
            .hot_categories
            .push(HotCategory {
                weeks: vec![1],
                category: "Basketweaving".to_string(),
                purchase_per_release: 2,
            });
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn season_override_replaces_monthly_table() {
        let mut config = Config::default();
        config.apply_overrides(None, Some(25), None);
        assert!((config.season_override.unwrap() - 1.25).abs() < 1e-9);
        config.apply_overrides(None, Some(0), None);
        assert!((config.season_override.unwrap() - 1.0).abs() < 1e-9);
        config.apply_overrides(None, Some(-10), None);
        assert!((config.season_override.unwrap() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn weeks_override_rescales_default_lifecycle() {
        let mut config = Config::default();
        config.apply_overrides(None, None, Some(12));
        assert_eq!(config.simulation.weeks, 12);
        assert_eq!(config.generation.business_lifecycle.total_weeks(), 12);
        config.validate().unwrap();
    }
}
