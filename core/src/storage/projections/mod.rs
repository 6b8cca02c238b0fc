//! Per-event-type projections from the raw stream into aggregate tables.
//!
//! Every projection runs inside the ingest transaction. Returning an error
//! rolls back the raw insert together with anything already written.

mod inventory;
mod market;
mod pilot;
mod profit;
mod system;

use rusqlite::Transaction;

use crate::journal::{JournalEvent, ProjectionError};

/// Pilot name used before a `Commander` or `LoadGame` event is seen.
pub const PLACEHOLDER_PILOT: &str = "Unknown";

/// State threaded through one event's projections.
#[derive(Debug, Clone)]
pub(crate) struct ProjectionContext {
    /// Pilot whose status row is written. Identity events replace it; the
    /// store adopts the new value only after commit.
    pub pilot: String,
    /// The event payload as stored in the raw log.
    pub payload_json: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApplyError {
    #[error(transparent)]
    Field(#[from] ProjectionError),
    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}

/// Route an event to the projections that consume its type.
/// Types without a projection are kept only in the raw log.
pub(crate) fn apply(
    tx: &Transaction<'_>,
    ctx: &mut ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    match event.event_type.as_str() {
        // Identity
        "Commander" => pilot::apply_commander(tx, ctx, event),
        "LoadGame" => pilot::apply_load_game(tx, ctx, event),

        // Ranks
        "Rank" => pilot::apply_rank(tx, ctx, event),
        "Progress" => pilot::apply_progress(tx, ctx, event),
        "Promotion" => pilot::apply_promotion(tx, ctx, event),

        // Location
        "Location" => {
            let previous = current_system(tx, &ctx.pilot)?;
            pilot::apply_location(tx, ctx, event)?;
            system::record_location(tx, ctx, event, previous.as_deref())?;
            system::record_catalog(tx, event)
        }
        "FSDJump" => {
            pilot::apply_jump(tx, ctx, event)?;
            system::record_jump(tx, ctx, event)?;
            system::record_catalog(tx, event)
        }
        "Docked" => {
            pilot::apply_docked(tx, ctx, event)?;
            system::record_station(tx, ctx, event)
        }
        "Undocked" => pilot::apply_undocked(tx, ctx, event),

        // Ship
        "Loadout" => {
            pilot::apply_loadout(tx, ctx, event)?;
            inventory::replace_modules(tx, event)
        }
        "ShipyardSwap" => pilot::apply_shipyard_swap(tx, ctx, event),
        "SetUserShipName" => pilot::apply_ship_rename(tx, ctx, event),

        "Materials" => inventory::replace_materials(tx, event),

        // Commodity market
        "MarketBuy" => market::record_transaction(tx, ctx, event),
        "MarketSell" => {
            profit::record(tx, event)?;
            market::record_transaction(tx, ctx, event)
        }

        "Bounty" | "MultiSellExplorationData" | "SellOrganicData" | "SellExplorationData" => {
            profit::record(tx, event)
        }

        "Scan" => system::record_scan(tx, ctx, event),
        "FSSSignalDiscovered" => system::record_signal(tx, ctx, event),

        _ => Ok(()),
    }
}

/// Current system of a pilot as stored in this transaction.
pub(crate) fn current_system(
    tx: &Transaction<'_>,
    pilot: &str,
) -> rusqlite::Result<Option<String>> {
    use rusqlite::OptionalExtension;

    tx.query_row(
        "SELECT system_name FROM pilot_status WHERE pilot_name = ?1",
        [pilot],
        |row| row.get::<_, Option<String>>(0),
    )
    .optional()
    .map(Option::flatten)
}
