use edlt_types::ProfitCategory;
use rusqlite::{Transaction, params};

use super::ApplyError;
use crate::journal::event::{nested_i64, nested_opt_i64};
use crate::journal::{JournalEvent, ProjectionError};

/// Ledger entry for an income event, or `None` for other event types.
pub(crate) fn profit_entry(
    event: &JournalEvent,
) -> Result<Option<(ProfitCategory, i64)>, ProjectionError> {
    let entry = match event.event_type.as_str() {
        "MarketSell" => {
            let price = event.require_i64("SellPrice")?;
            let count = event.require_i64("Count")?;
            (ProfitCategory::Trade, price.saturating_mul(count))
        }
        "Bounty" => {
            let reward = match event.opt_i64("Reward")? {
                Some(reward) => reward,
                None => event.require_i64("TotalReward")?,
            };
            (ProfitCategory::Bounty, reward)
        }
        "MultiSellExplorationData" => (
            ProfitCategory::Exploration,
            event.require_i64("TotalEarnings")?,
        ),
        "SellOrganicData" => {
            let earnings = match event.opt_i64("TotalEarnings")? {
                Some(total) => total,
                None => organic_sum(event)?,
            };
            (ProfitCategory::Exobiology, earnings)
        }
        "SellExplorationData" => {
            let earnings = match event.opt_i64("TotalEarnings")? {
                Some(total) => total,
                None => event
                    .require_i64("BaseValue")?
                    .saturating_add(event.opt_i64("Bonus")?.unwrap_or(0)),
            };
            (ProfitCategory::Cartography, earnings)
        }
        _ => return Ok(None),
    };
    Ok(Some(entry))
}

fn organic_sum(event: &JournalEvent) -> Result<i64, ProjectionError> {
    let mut sum = 0i64;
    for item in event.require_array("BioData")? {
        let value = nested_i64(item, "Value")?;
        let bonus = nested_opt_i64(item, "Bonus")?.unwrap_or(0);
        sum = sum.saturating_add(value).saturating_add(bonus);
    }
    Ok(sum)
}

pub(super) fn record(tx: &Transaction<'_>, event: &JournalEvent) -> Result<(), ApplyError> {
    let Some((category, amount)) = profit_entry(event)? else {
        return Ok(());
    };
    tx.execute(
        "INSERT INTO pilot_profit (timestamp, profit_type, amount) VALUES (?1, ?2, ?3)",
        params![event.timestamp, category.as_str(), amount],
    )?;
    tracing::debug!(category = %category, amount, "Profit recorded");
    Ok(())
}
