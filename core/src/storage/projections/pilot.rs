//! Pilot status row: identity, ranks, location and current ship.
//!
//! Each handler overwrites only the columns its event carries.

use edlt_types::RankTrack;
use rusqlite::{Transaction, params};

use super::{ApplyError, ProjectionContext};
use crate::journal::JournalEvent;

/// Create the pilot's row on first touch and bump `last_update`.
fn touch_pilot(tx: &Transaction<'_>, pilot: &str, timestamp: &str) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO pilot_status (pilot_name, last_update) VALUES (?1, ?2)
         ON CONFLICT(pilot_name) DO UPDATE SET last_update = excluded.last_update",
        params![pilot, timestamp],
    )?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

pub(super) fn apply_commander(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    ctx.pilot = event.require_str("Name")?.to_string();
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    Ok(())
}

pub(super) fn apply_load_game(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    ctx.pilot = event.require_str("Commander")?.to_string();
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;

    let ship_id = event.opt_i64("ShipID")?;
    tx.execute(
        "UPDATE pilot_status SET
            ship_id = COALESCE(?1, ship_id),
            ship_model = COALESCE(?2, ship_model),
            ship_name = COALESCE(?3, ship_name)
         WHERE pilot_name = ?4",
        params![
            ship_id,
            event.str_field("Ship"),
            event.str_field("ShipName"),
            ctx.pilot
        ],
    )?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Ranks
// ─────────────────────────────────────────────────────────────────────────────

fn clamped_rank(track: RankTrack, raw: i64) -> i64 {
    let rank = track.clamp_index(raw);
    if rank != raw {
        tracing::warn!(track = %track, raw, clamped = rank, "Rank index out of range");
    }
    rank
}

fn set_rank(tx: &Transaction<'_>, pilot: &str, track: RankTrack, rank: i64) -> rusqlite::Result<()> {
    let sql = format!(
        "UPDATE pilot_status SET rank_{col} = ?1 WHERE pilot_name = ?2",
        col = track.column_suffix()
    );
    tx.execute(&sql, params![rank, pilot])?;
    Ok(())
}

fn set_progress(
    tx: &Transaction<'_>,
    pilot: &str,
    track: RankTrack,
    fraction: f64,
) -> rusqlite::Result<()> {
    let sql = format!(
        "UPDATE pilot_status SET progress_{col} = ?1 WHERE pilot_name = ?2",
        col = track.column_suffix()
    );
    tx.execute(&sql, params![fraction, pilot])?;
    Ok(())
}

pub(super) fn apply_rank(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    for track in RankTrack::ALL {
        if let Some(raw) = event.opt_i64(track.journal_key())? {
            set_rank(tx, &ctx.pilot, track, clamped_rank(track, raw))?;
        }
    }
    Ok(())
}

/// Journal progress is a percentage; stored as a fraction in [0, 1].
pub(super) fn apply_progress(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    for track in RankTrack::ALL {
        if let Some(percent) = event.opt_f64(track.journal_key())? {
            let fraction = (percent / 100.0).clamp(0.0, 1.0);
            if !(0.0..=100.0).contains(&percent) {
                tracing::warn!(track = %track, percent, "Rank progress out of range");
            }
            set_progress(tx, &ctx.pilot, track, fraction)?;
        }
    }
    Ok(())
}

pub(super) fn apply_promotion(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    for track in RankTrack::ALL {
        if let Some(raw) = event.opt_i64(track.journal_key())? {
            let rank = clamped_rank(track, raw);
            set_rank(tx, &ctx.pilot, track, rank)?;
            set_progress(tx, &ctx.pilot, track, 0.0)?;
            tracing::info!(track = %track, rank = track.level_name(rank).unwrap_or("?"), "Promotion");
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Location
// ─────────────────────────────────────────────────────────────────────────────

pub(super) fn apply_location(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let system = event.require_str("StarSystem")?;
    let station = if event.bool_field("Docked").unwrap_or(false) {
        event.str_field("StationName")
    } else {
        None
    };

    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    tx.execute(
        "UPDATE pilot_status SET system_name = ?1, station_name = ?2 WHERE pilot_name = ?3",
        params![system, station, ctx.pilot],
    )?;
    Ok(())
}

pub(super) fn apply_jump(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let system = event.require_str("StarSystem")?;
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    tx.execute(
        "UPDATE pilot_status SET system_name = ?1, station_name = NULL WHERE pilot_name = ?2",
        params![system, ctx.pilot],
    )?;
    Ok(())
}

pub(super) fn apply_docked(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let station = event.require_str("StationName")?;
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    tx.execute(
        "UPDATE pilot_status SET
            station_name = ?1,
            system_name = COALESCE(?2, system_name)
         WHERE pilot_name = ?3",
        params![station, event.str_field("StarSystem"), ctx.pilot],
    )?;
    Ok(())
}

pub(super) fn apply_undocked(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    tx.execute(
        "UPDATE pilot_status SET station_name = NULL WHERE pilot_name = ?1",
        params![ctx.pilot],
    )?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Ship
// ─────────────────────────────────────────────────────────────────────────────

pub(super) fn apply_loadout(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let ship_id = event.require_i64("ShipID")?;
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    tx.execute(
        "UPDATE pilot_status SET
            ship_id = ?1,
            ship_model = COALESCE(?2, ship_model),
            ship_name = ?3
         WHERE pilot_name = ?4",
        params![
            ship_id,
            event.str_field("Ship"),
            event.str_field("ShipName"),
            ctx.pilot
        ],
    )?;
    Ok(())
}

/// The incoming ship's name is not part of the event, so it is cleared
/// until the next `Loadout` reports it.
pub(super) fn apply_shipyard_swap(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let ship_id = event.require_i64("ShipID")?;
    let model = event.require_str("ShipType")?;
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    tx.execute(
        "UPDATE pilot_status SET ship_id = ?1, ship_model = ?2, ship_name = NULL
         WHERE pilot_name = ?3",
        params![ship_id, model, ctx.pilot],
    )?;
    Ok(())
}

pub(super) fn apply_ship_rename(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let name = event.require_str("UserShipName")?;
    let ship_id = event.opt_i64("ShipID")?;
    touch_pilot(tx, &ctx.pilot, &event.timestamp)?;
    tx.execute(
        "UPDATE pilot_status SET ship_name = ?1, ship_id = COALESCE(?2, ship_id)
         WHERE pilot_name = ?3",
        params![name, ship_id, ctx.pilot],
    )?;
    Ok(())
}
