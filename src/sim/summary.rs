// Progress and summary output
// One line per weekly batch while running, and a closing block with the
// totals an operator wants to sanity-check a generated database against.

use rusqlite::Connection;

use crate::config::Config;
use crate::db::schema;
use crate::db::Capabilities;
use crate::error::Result;
use crate::sim::customers::CustomerStats;
use crate::sim::fees::FeeStats;
use crate::sim::releases::ReleaseStats;
use crate::sim::rentals::RentalStats;
use crate::sim::returns::ReturnStats;
use crate::sim::volume::WeekVolume;

/// Everything that happened in one week, for the progress line.
#[derive(Debug, Clone)]
pub struct WeekReport {
    pub week: u32,
    pub total_weeks: u32,
    pub volume: WeekVolume,
    pub releases: ReleaseStats,
    pub customers: CustomerStats,
    pub rentals: RentalStats,
    pub returns: ReturnStats,
    pub fees: FeeStats,
    pub repaired: u32,
}

impl WeekReport {
    pub fn no_candidates(&self) -> u32 {
        self.rentals.no_inventory + self.rentals.no_customers
    }
}

pub fn print_week(report: &WeekReport) {
    let percent = report.week as f64 / report.total_weeks as f64 * 100.0;
    let mut line = format!(
        "Week {:>3}/{} ({:>5.1}%)  phase={:<12} volume={:<4} rentals={:<4} x[phase {:.2} season {:.2} spike {:.1}]",
        report.week,
        report.total_weeks,
        percent,
        report.volume.phase.as_str(),
        report.volume.expected,
        report.rentals.written,
        report.volume.phase_multiplier,
        report.volume.seasonal_multiplier,
        report.volume.spike_multiplier,
    );
    if report.no_candidates() > 0 {
        line.push_str(&format!("  no-candidates={}", report.no_candidates()));
    }
    println!("{}", line);

    log::debug!(
        "week {}: +{} customers (-{} churned, +{} reactivated), {} releases, {} copies bought, {} returns, {} fees, {} repaired",
        report.week,
        report.customers.added,
        report.customers.churned,
        report.customers.reactivated,
        report.releases.films_released,
        report.releases.copies_purchased,
        report.returns.returned,
        report.fees.fees_upserted,
        report.repaired,
    );
}

/// Closing totals over the generated database.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub weeks_completed: u32,
    pub total_rentals: i64,
    pub total_payments: i64,
    pub open_rentals: i64,
    pub active_customers: i64,
    pub total_inventory: i64,
    pub total_films: i64,
    pub date_range: Option<(String, String)>,
    pub yearly_rentals: Vec<(String, i64)>,
    pub segment_counts: Vec<(String, i64)>,
    pub no_candidates_total: u32,
    /// (fee count, fee total, unpaid balance) when late fees ran.
    pub late_fees: Option<(i64, f64, f64)>,
    pub ar_aging: Vec<(String, i64)>,
}

pub fn collect(
    conn: &Connection,
    config: &Config,
    caps: &Capabilities,
    weeks_completed: u32,
    no_candidates_total: u32,
) -> Result<RunSummary> {
    let features = &config.generation.advanced_features;
    let late_fees = if features.late_fees.enabled && caps.has_late_fees {
        Some(schema::late_fee_summary(conn)?)
    } else {
        None
    };
    let ar_aging = if features.ar_tracking.enabled && caps.has_customer_ar {
        schema::ar_aging_counts(conn)?
    } else {
        Vec::new()
    };

    Ok(RunSummary {
        weeks_completed,
        total_rentals: schema::count_rentals(conn)?,
        total_payments: schema::count_payments(conn)?,
        open_rentals: schema::count_open_rentals(conn)?,
        active_customers: schema::count_active_customers(conn)?,
        total_inventory: schema::count_inventory(conn)?,
        total_films: schema::count_films(conn)?,
        date_range: schema::rental_date_range(conn)?,
        yearly_rentals: schema::rentals_per_year(conn)?,
        segment_counts: schema::active_segment_counts(conn)?,
        no_candidates_total,
        late_fees,
        ar_aging,
    })
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("Simulation complete: {} weeks", summary.weeks_completed);
    println!("{}", "-".repeat(56));
    println!("  Total rentals:     {}", summary.total_rentals);
    println!("  Total payments:    {}", summary.total_payments);
    println!("  Checked out now:   {}", summary.open_rentals);
    println!("  Active customers:  {}", summary.active_customers);
    println!("  Films in catalog:  {}", summary.total_films);
    println!("  Inventory copies:  {}", summary.total_inventory);

    if let Some((from, to)) = &summary.date_range {
        println!("  Date range:        {} .. {}", from, to);
    }
    if summary.weeks_completed > 0 {
        println!(
            "  Avg rentals/week:  {:.1}",
            summary.total_rentals as f64 / summary.weeks_completed as f64
        );
    }
    if summary.no_candidates_total > 0 {
        println!("  Dropped rentals:   {}", summary.no_candidates_total);
    }

    if !summary.yearly_rentals.is_empty() {
        println!();
        println!("  Rentals by year:");
        for (year, count) in &summary.yearly_rentals {
            println!("    {}: {}", year, count);
        }
    }

    if !summary.segment_counts.is_empty() {
        println!();
        println!("  Active customers by segment:");
        for (segment, count) in &summary.segment_counts {
            println!("    {:<12} {}", segment, count);
        }
    }

    if let Some((count, total, unpaid)) = summary.late_fees {
        println!();
        println!("  Late fees:         {} totaling ${:.2}", count, total);
        println!("  Unpaid balance:    ${:.2}", unpaid);
        if !summary.ar_aging.is_empty() {
            println!("  AR aging:");
            for (bucket, customers) in &summary.ar_aging {
                println!("    {:<14} {}", bucket, customers);
            }
        }
    }
}
