//! Data about the pilot's current star system, plus the jump history.
//!
//! `system_data` only ever describes one system: arriving somewhere new
//! removes the rows of every other system. `star_systems` is the opposite, a
//! catalog of every system visited that is never purged.

use rusqlite::{Transaction, params};

use super::{ApplyError, ProjectionContext, current_system};
use crate::journal::{JournalEvent, ProjectionError};

fn upsert(
    tx: &Transaction<'_>,
    name: &str,
    system: &str,
    kind: &str,
    distance_ls: Option<f64>,
    data_json: &str,
) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO system_data (name, system_name, type, distance_ls, data_json)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(name, system_name) DO UPDATE SET
            type = excluded.type,
            distance_ls = excluded.distance_ls,
            data_json = excluded.data_json",
        params![name, system, kind, distance_ls, data_json],
    )?;
    Ok(())
}

fn purge_other_systems(tx: &Transaction<'_>, system: &str) -> rusqlite::Result<()> {
    let removed = tx.execute("DELETE FROM system_data WHERE system_name <> ?1", [system])?;
    if removed > 0 {
        tracing::debug!(system, removed, "Purged data of previous systems");
    }
    Ok(())
}

/// System named by the event, else the pilot's current system.
fn resolve_system(
    tx: &Transaction<'_>,
    ctx: &ProjectionContext,
    event: &JournalEvent,
) -> rusqlite::Result<Option<String>> {
    match event.str_field("StarSystem") {
        Some(system) => Ok(Some(system.to_string())),
        None => current_system(tx, &ctx.pilot),
    }
}

pub(super) fn record_location(
    tx: &Transaction<'_>,
    ctx: &ProjectionContext,
    event: &JournalEvent,
    previous: Option<&str>,
) -> Result<(), ApplyError> {
    let system = event.require_str("StarSystem")?;
    if previous != Some(system) {
        purge_other_systems(tx, system)?;
    }

    let data = ctx.payload_json.as_str();
    upsert(tx, system, system, "STAR", Some(0.0), data)?;

    if event.bool_field("Docked").unwrap_or(false)
        && let Some(station) = event.str_field("StationName")
    {
        upsert(
            tx,
            station,
            system,
            "STATION",
            event.opt_f64("DistFromStarLS")?,
            data,
        )?;
    }
    Ok(())
}

pub(super) fn record_jump(
    tx: &Transaction<'_>,
    ctx: &ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let system = event.require_str("StarSystem")?;
    purge_other_systems(tx, system)?;
    upsert(tx, system, system, "STAR", Some(0.0), &ctx.payload_json)?;

    let (x, y, z) = star_position(event)?;
    tx.execute(
        "INSERT INTO pilot_journeys
            (timestamp, system_name, jump_distance, star_pos_x, star_pos_y, star_pos_z)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![event.timestamp, system, event.opt_f64("JumpDist")?, x, y, z],
    )?;
    tracing::info!(system, "Jumped");
    Ok(())
}

type Position = (Option<f64>, Option<f64>, Option<f64>);

fn star_position(event: &JournalEvent) -> Result<Position, ProjectionError> {
    let Some(pos) = event.get("StarPos") else {
        return Ok((None, None, None));
    };
    let invalid = || ProjectionError::InvalidField {
        field: "StarPos".to_string(),
        expected: "an array of three numbers",
    };
    let coords = pos.as_array().ok_or_else(invalid)?;
    let [x, y, z] = coords.as_slice() else {
        return Err(invalid());
    };
    let coord = |v: &serde_json::Value| v.as_f64().ok_or_else(invalid);
    Ok((Some(coord(x)?), Some(coord(y)?), Some(coord(z)?)))
}

/// Upsert the visited system into the permanent catalog. Fields the event
/// leaves out keep their stored value.
pub(super) fn record_catalog(tx: &Transaction<'_>, event: &JournalEvent) -> Result<(), ApplyError> {
    let system = event.require_str("StarSystem")?;
    let (x, y, z) = star_position(event)?;
    tx.execute(
        "INSERT INTO star_systems
            (system_name, system_address, star_pos_x, star_pos_y, star_pos_z,
             allegiance, government, population, last_seen)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(system_name) DO UPDATE SET
            system_address = COALESCE(excluded.system_address, system_address),
            star_pos_x = COALESCE(excluded.star_pos_x, star_pos_x),
            star_pos_y = COALESCE(excluded.star_pos_y, star_pos_y),
            star_pos_z = COALESCE(excluded.star_pos_z, star_pos_z),
            allegiance = COALESCE(excluded.allegiance, allegiance),
            government = COALESCE(excluded.government, government),
            population = COALESCE(excluded.population, population),
            last_seen = excluded.last_seen",
        params![
            system,
            event.opt_i64("SystemAddress")?,
            x,
            y,
            z,
            event.str_field("SystemAllegiance").filter(|a| !a.is_empty()),
            event.localised_str("SystemGovernment"),
            event.opt_i64("Population")?,
            event.timestamp
        ],
    )?;
    Ok(())
}

pub(super) fn record_station(
    tx: &Transaction<'_>,
    ctx: &ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let station = event.require_str("StationName")?;
    let Some(system) = resolve_system(tx, ctx, event)? else {
        tracing::warn!(station, "Docked with no known system, station not recorded");
        return Ok(());
    };
    upsert(
        tx,
        station,
        &system,
        "STATION",
        event.opt_f64("DistFromStarLS")?,
        &ctx.payload_json,
    )?;
    Ok(())
}

/// Scanned bodies are typed `STAR` when the scan reports a star type, else by
/// planet class, else the generic `BODY`.
pub(super) fn record_scan(
    tx: &Transaction<'_>,
    ctx: &ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let body = event.require_str("BodyName")?;
    let Some(system) = resolve_system(tx, ctx, event)? else {
        tracing::warn!(body, "Scan with no known system, skipped");
        return Ok(());
    };
    let kind = if event.str_field("StarType").is_some() {
        "STAR"
    } else {
        event.str_field("PlanetClass").unwrap_or("BODY")
    };
    upsert(
        tx,
        body,
        &system,
        kind,
        event.opt_f64("DistanceFromArrivalLS")?,
        &ctx.payload_json,
    )?;
    Ok(())
}

pub(super) fn record_signal(
    tx: &Transaction<'_>,
    ctx: &ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let signal = event
        .localised_str("SignalName")
        .ok_or_else(|| ProjectionError::MissingField("SignalName".to_string()))?;
    let Some(system) = resolve_system(tx, ctx, event)? else {
        tracing::warn!(signal, "Signal with no known system, skipped");
        return Ok(());
    };
    upsert(tx, signal, &system, "SIGNAL", None, &ctx.payload_json)?;
    Ok(())
}
