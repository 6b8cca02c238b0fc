//! Commodity purchases and sales, one ledger row per market transaction.

use rusqlite::{OptionalExtension, Transaction, params};

use super::{ApplyError, ProjectionContext};
use crate::journal::JournalEvent;

fn current_station(tx: &Transaction<'_>, pilot: &str) -> rusqlite::Result<Option<String>> {
    tx.query_row(
        "SELECT station_name FROM pilot_status WHERE pilot_name = ?1",
        [pilot],
        |row| row.get::<_, Option<String>>(0),
    )
    .optional()
    .map(Option::flatten)
}

pub(super) fn record_transaction(
    tx: &Transaction<'_>,
    ctx: &ProjectionContext,
    event: &JournalEvent,
) -> Result<(), ApplyError> {
    let (kind, price_key, total_key) = match event.event_type.as_str() {
        "MarketBuy" => ("BUY", "BuyPrice", "TotalCost"),
        "MarketSell" => ("SELL", "SellPrice", "TotalSale"),
        _ => return Ok(()),
    };

    let commodity = event.require_str("Type")?;
    let price = event.require_i64(price_key)?;
    let quantity = event.require_i64("Count")?;
    let total = match event.opt_i64(total_key)? {
        Some(total) => total,
        None => price.saturating_mul(quantity),
    };
    let station = match event.str_field("StationName") {
        Some(station) => Some(station.to_string()),
        None => current_station(tx, &ctx.pilot)?,
    };

    tx.execute(
        "INSERT INTO pilot_transactions
            (timestamp, pilot_name, station_name, commodity, commodity_localised,
             transaction_type, price, quantity, total)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            event.timestamp,
            ctx.pilot,
            station,
            commodity,
            event.str_field("Type_Localised"),
            kind,
            price,
            quantity,
            total
        ],
    )?;
    tracing::info!(kind, commodity, quantity, total, "Market transaction recorded");
    Ok(())
}
