//! Materials and ship modules. Both are snapshot events, so the previous rows
//! are deleted and the snapshot re-inserted.

use edlt_types::MaterialCategory;
use rusqlite::{Transaction, params};
use serde_json::Value;

use super::ApplyError;
use crate::game_data::material_capacity;
use crate::journal::JournalEvent;
use crate::journal::ProjectionError;
use crate::journal::event::{nested_i64, nested_opt_f64, nested_str};

pub(super) fn replace_materials(tx: &Transaction<'_>, event: &JournalEvent) -> Result<(), ApplyError> {
    tx.execute("DELETE FROM pilot_materials", [])?;

    let mut stmt = tx.prepare_cached(
        "INSERT INTO pilot_materials (material_name, display_name, category, count, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(material_name) DO UPDATE SET
            display_name = excluded.display_name,
            category = excluded.category,
            count = excluded.count,
            timestamp = excluded.timestamp",
    )?;

    let mut total = 0usize;
    for category in MaterialCategory::ALL {
        let key = category.journal_key();
        let Some(items) = event.get(key) else {
            continue;
        };
        let items = items.as_array().ok_or_else(|| ProjectionError::InvalidField {
            field: key.to_string(),
            expected: "an array",
        })?;

        for item in items {
            // Keyed on the internal name; the localised one follows the client language.
            let name = nested_str(item, "Name")?;
            let display_name = item.get("Name_Localised").and_then(Value::as_str);
            let count = nested_i64(item, "Count")?;
            if count < 0 {
                return Err(ProjectionError::InvalidField {
                    field: "Count".to_string(),
                    expected: "a non-negative integer",
                }
                .into());
            }
            if let Some(capacity) = material_capacity(name)
                && count > capacity
            {
                tracing::debug!(material = name, count, capacity, "Material above grade capacity");
            }
            stmt.execute(params![name, display_name, key, count, event.timestamp])?;
            total += 1;
        }
    }

    tracing::debug!(materials = total, "Material inventory replaced");
    Ok(())
}

pub(super) fn replace_modules(tx: &Transaction<'_>, event: &JournalEvent) -> Result<(), ApplyError> {
    let ship_id = event.require_i64("ShipID")?;
    tx.execute("DELETE FROM ship_modules WHERE ship_id = ?1", [ship_id])?;

    let Some(modules) = event.get("Modules") else {
        return Ok(());
    };
    let modules = modules.as_array().ok_or_else(|| ProjectionError::InvalidField {
        field: "Modules".to_string(),
        expected: "an array",
    })?;

    let mut stmt = tx.prepare_cached(
        "INSERT INTO ship_modules (ship_id, slot, module, health) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(ship_id, slot) DO UPDATE SET module = excluded.module, health = excluded.health",
    )?;
    for module in modules {
        let slot = nested_str(module, "Slot")?;
        let item = nested_str(module, "Item")?;
        let health = nested_opt_f64(module, "Health")?.unwrap_or(1.0).clamp(0.0, 1.0);
        stmt.execute(params![ship_id, slot, item, health])?;
    }
    Ok(())
}
