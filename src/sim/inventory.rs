// Inventory status tracker
// Copies move available <-> rented as rentals open and close; each return
// can also knock a copy into damaged/missing/maintenance. Repairable states
// exit after the configured cooldown; missing copies never come back on
// their own. Every transition leaves an audit row when the feature is on.

use chrono::{Duration, NaiveDate};
use rusqlite::Connection;

use crate::config::Config;
use crate::db::schema;
use crate::db::Capabilities;
use crate::error::Result;
use crate::sim::clock::{fmt_date, SimClock};
use crate::sim::rng::SimRng;

pub const STATUS_AVAILABLE: &str = "available";
pub const STATUS_RENTED: &str = "rented";
pub const STATUS_DAMAGED: &str = "damaged";
pub const STATUS_MISSING: &str = "missing";
pub const STATUS_MAINTENANCE: &str = "maintenance";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    Available,
    Damaged,
    Missing,
    Maintenance,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryStats {
    pub damaged: u32,
    pub missing: u32,
    pub maintenance: u32,
    pub repaired: u32,
}

/// A rental was created against this copy.
pub fn mark_rented(
    conn: &Connection,
    audit: bool,
    inventory_id: i64,
    date: NaiveDate,
    staff_id: i64,
) -> Result<()> {
    schema::set_inventory_status(conn, inventory_id, STATUS_RENTED)?;
    if audit {
        schema::insert_inventory_status_event(
            conn,
            inventory_id,
            STATUS_RENTED,
            &fmt_date(date),
            Some(staff_id),
        )?;
    }
    Ok(())
}

/// The rental against this copy closed. The copy lands back on the floor
/// unless the per-return damage/missing/maintenance rolls say otherwise.
pub fn process_return(
    conn: &Connection,
    config: &Config,
    caps: &Capabilities,
    inventory_id: i64,
    date: NaiveDate,
    rng: &mut SimRng,
) -> Result<ReturnOutcome> {
    let feature = &config.generation.advanced_features.inventory_status;
    let audit = feature.enabled && caps.has_inventory_status;
    let date_str = fmt_date(date);

    schema::set_inventory_status(conn, inventory_id, STATUS_AVAILABLE)?;
    if audit {
        schema::insert_inventory_status_event(
            conn,
            inventory_id,
            STATUS_AVAILABLE,
            &date_str,
            None,
        )?;
    }

    if !feature.enabled {
        return Ok(ReturnOutcome::Available);
    }

    let outcome = if rng.chance(feature.damaged_probability) {
        ReturnOutcome::Damaged
    } else if rng.chance(feature.missing_probability) {
        ReturnOutcome::Missing
    } else if rng.chance(feature.maintenance_probability) {
        ReturnOutcome::Maintenance
    } else {
        ReturnOutcome::Available
    };

    let status = match outcome {
        ReturnOutcome::Available => return Ok(outcome),
        ReturnOutcome::Damaged => STATUS_DAMAGED,
        ReturnOutcome::Missing => STATUS_MISSING,
        ReturnOutcome::Maintenance => STATUS_MAINTENANCE,
    };
    schema::set_inventory_status(conn, inventory_id, status)?;
    if audit {
        schema::insert_inventory_status_event(conn, inventory_id, status, &date_str, None)?;
    }
    Ok(outcome)
}

/// Weekly tick: bring repairable copies back to the floor once their
/// cooldown has elapsed.
pub fn sync_week(
    conn: &Connection,
    config: &Config,
    caps: &Capabilities,
    clock: &SimClock,
    w: u32,
) -> Result<u32> {
    let feature = &config.generation.advanced_features.inventory_status;
    if !feature.enabled {
        return Ok(0);
    }
    let audit = caps.has_inventory_status;
    let repair_weeks = feature.repair_weeks.max(1);
    let cutoff = clock.week_start(w) - Duration::days((repair_weeks as i64 - 1) * 7);
    let cutoff_str = fmt_date(cutoff);
    let today = fmt_date(clock.week_start(w));

    let mut repaired = 0;
    for status in [STATUS_DAMAGED, STATUS_MAINTENANCE] {
        for inventory_id in schema::repairable_inventory(conn, status, &cutoff_str)? {
            schema::set_inventory_status(conn, inventory_id, STATUS_AVAILABLE)?;
            if audit {
                schema::insert_inventory_status_event(
                    conn,
                    inventory_id,
                    STATUS_AVAILABLE,
                    &today,
                    None,
                )?;
            }
            repaired += 1;
        }
    }
    Ok(repaired)
}
