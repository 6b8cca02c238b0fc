//! Read-side queries for consumers of the journal database.
//!
//! Every function opens its own read-only connection, so callers never
//! contend with the writer beyond a single commit.

use edlt_types::{MaterialCategory, ProfitCategory, RankTrack};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use super::db::open_reader;
use crate::game_data::material_capacity;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankStanding {
    pub track: RankTrack,
    pub index: i64,
    pub name: &'static str,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PilotSummary {
    pub pilot_name: String,
    pub ranks: Vec<RankStanding>,
    pub system_name: Option<String>,
    pub station_name: Option<String>,
    pub ship_id: Option<i64>,
    pub ship_name: Option<String>,
    pub ship_model: Option<String>,
    pub last_update: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialStock {
    /// Internal journal name, stable across client languages.
    pub name: String,
    pub display_name: Option<String>,
    pub category: MaterialCategory,
    pub count: i64,
    /// Grade capacity, when the material is in the reference table.
    pub capacity: Option<i64>,
}

impl MaterialStock {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn over_capacity(&self) -> bool {
        self.capacity.is_some_and(|cap| self.count > cap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemEntry {
    pub name: String,
    pub system_name: String,
    pub kind: String,
    pub distance_ls: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketTransaction {
    pub timestamp: String,
    pub station_name: Option<String>,
    pub commodity: String,
    pub kind: String,
    pub price: i64,
    pub quantity: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarSystem {
    pub name: String,
    pub address: Option<i64>,
    pub position: Option<[f64; 3]>,
    pub allegiance: Option<String>,
    pub government: Option<String>,
    pub population: Option<i64>,
    pub last_seen: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipModule {
    pub ship_id: i64,
    pub slot: String,
    pub module: String,
    pub health: f64,
}

fn parse_column<T: FromStr<Err = String>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Profit
// ─────────────────────────────────────────────────────────────────────────────

/// Total per category, including categories with no entries.
pub fn profit_totals(db: &Path) -> rusqlite::Result<Vec<(ProfitCategory, i64)>> {
    let conn = open_reader(db)?;
    let mut stmt =
        conn.prepare("SELECT profit_type, SUM(amount) FROM pilot_profit GROUP BY profit_type")?;
    let stored: HashMap<String, i64> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<_>>()?;

    Ok(ProfitCategory::ALL
        .into_iter()
        .map(|c| (c, stored.get(c.as_str()).copied().unwrap_or(0)))
        .collect())
}

pub fn profit_total(db: &Path, category: ProfitCategory) -> rusqlite::Result<i64> {
    let conn = open_reader(db)?;
    conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM pilot_profit WHERE profit_type = ?1",
        [category.as_str()],
        |row| row.get(0),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Pilot
// ─────────────────────────────────────────────────────────────────────────────

/// Most recently updated pilot, with rank indices resolved to names.
pub fn pilot_status(db: &Path) -> rusqlite::Result<Option<PilotSummary>> {
    let conn = open_reader(db)?;
    conn.query_row(
        "SELECT pilot_name, system_name, station_name, ship_id, ship_name, ship_model,
                last_update,
                rank_combat, progress_combat, rank_trade, progress_trade,
                rank_explore, progress_explore, rank_cqc, progress_cqc,
                rank_federation, progress_federation, rank_empire, progress_empire
         FROM pilot_status ORDER BY last_update DESC LIMIT 1",
        [],
        |row| {
            let mut ranks = Vec::with_capacity(RankTrack::ALL.len());
            for (i, track) in RankTrack::ALL.into_iter().enumerate() {
                let index: i64 = row.get(7 + i * 2)?;
                let progress: f64 = row.get(8 + i * 2)?;
                ranks.push(RankStanding {
                    track,
                    index,
                    name: track.level_name(index).unwrap_or("Unknown"),
                    progress,
                });
            }
            Ok(PilotSummary {
                pilot_name: row.get(0)?,
                system_name: row.get(1)?,
                station_name: row.get(2)?,
                ship_id: row.get(3)?,
                ship_name: row.get(4)?,
                ship_model: row.get(5)?,
                last_update: row.get(6)?,
                ranks,
            })
        },
    )
    .optional()
}

// ─────────────────────────────────────────────────────────────────────────────
// Inventory
// ─────────────────────────────────────────────────────────────────────────────

pub fn materials(db: &Path) -> rusqlite::Result<Vec<MaterialStock>> {
    let conn = open_reader(db)?;
    let mut stmt = conn.prepare(
        "SELECT material_name, display_name, category, count FROM pilot_materials
         ORDER BY category, material_name",
    )?;
    stmt.query_map([], |row| {
        let name: String = row.get(0)?;
        Ok(MaterialStock {
            capacity: material_capacity(&name),
            display_name: row.get(1)?,
            category: parse_column(row, 2)?,
            count: row.get(3)?,
            name,
        })
    })?
    .collect()
}

/// Materials whose stored count exceeds their grade capacity.
pub fn over_capacity_materials(db: &Path) -> rusqlite::Result<Vec<MaterialStock>> {
    Ok(materials(db)?
        .into_iter()
        .filter(MaterialStock::over_capacity)
        .collect())
}

pub fn ship_modules(db: &Path, ship_id: i64) -> rusqlite::Result<Vec<ShipModule>> {
    let conn = open_reader(db)?;
    let mut stmt = conn.prepare(
        "SELECT ship_id, slot, module, health FROM ship_modules WHERE ship_id = ?1 ORDER BY slot",
    )?;
    stmt.query_map([ship_id], |row| {
        Ok(ShipModule {
            ship_id: row.get(0)?,
            slot: row.get(1)?,
            module: row.get(2)?,
            health: row.get(3)?,
        })
    })?
    .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// System
// ─────────────────────────────────────────────────────────────────────────────

/// Everything recorded about the current system, nearest first.
pub fn system_data(db: &Path) -> rusqlite::Result<Vec<SystemEntry>> {
    let conn = open_reader(db)?;
    let mut stmt = conn.prepare(
        "SELECT name, system_name, type, distance_ls FROM system_data
         ORDER BY distance_ls IS NULL, distance_ls, name",
    )?;
    stmt.query_map([], |row| {
        Ok(SystemEntry {
            name: row.get(0)?,
            system_name: row.get(1)?,
            kind: row.get(2)?,
            distance_ls: row.get(3)?,
        })
    })?
    .collect()
}

/// Every system ever visited, most recent first.
pub fn star_systems(db: &Path) -> rusqlite::Result<Vec<StarSystem>> {
    let conn = open_reader(db)?;
    let mut stmt = conn.prepare(
        "SELECT system_name, system_address, star_pos_x, star_pos_y, star_pos_z,
                allegiance, government, population, last_seen
         FROM star_systems ORDER BY last_seen DESC, system_name",
    )?;
    stmt.query_map([], |row| {
        let x: Option<f64> = row.get(2)?;
        let y: Option<f64> = row.get(3)?;
        let z: Option<f64> = row.get(4)?;
        let position = match (x, y, z) {
            (Some(x), Some(y), Some(z)) => Some([x, y, z]),
            _ => None,
        };
        Ok(StarSystem {
            name: row.get(0)?,
            address: row.get(1)?,
            position,
            allegiance: row.get(5)?,
            government: row.get(6)?,
            population: row.get(7)?,
            last_seen: row.get(8)?,
        })
    })?
    .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Market
// ─────────────────────────────────────────────────────────────────────────────

/// Commodity transactions in the order they happened.
pub fn transactions(db: &Path) -> rusqlite::Result<Vec<MarketTransaction>> {
    let conn = open_reader(db)?;
    let mut stmt = conn.prepare(
        "SELECT timestamp, station_name, COALESCE(commodity_localised, commodity),
                transaction_type, price, quantity, total
         FROM pilot_transactions ORDER BY timestamp, id",
    )?;
    stmt.query_map([], |row| {
        Ok(MarketTransaction {
            timestamp: row.get(0)?,
            station_name: row.get(1)?,
            commodity: row.get(2)?,
            kind: row.get(3)?,
            price: row.get(4)?,
            quantity: row.get(5)?,
            total: row.get(6)?,
        })
    })?
    .collect()
}

pub fn event_count(db: &Path) -> rusqlite::Result<i64> {
    let conn = open_reader(db)?;
    conn.query_row("SELECT COUNT(*) FROM journal_events", [], |row| row.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::parse_line;
    use crate::storage::IngestionStore;

    fn seeded(lines: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edlt.db");
        let mut store = IngestionStore::open(&path).unwrap();
        for line in lines {
            store.ingest(&parse_line(line).unwrap()).unwrap();
        }
        (dir, path)
    }

    #[test]
    fn profit_totals_cover_every_category() {
        let (_dir, db) = seeded(&[
            r#"{"timestamp":"t1","event":"Bounty","Reward":15000}"#,
            r#"{"timestamp":"t2","event":"Bounty","Reward":500}"#,
            r#"{"timestamp":"t3","event":"MarketSell","Type":"gold","SellPrice":100,"Count":50}"#,
        ]);
        let totals = profit_totals(&db).unwrap();
        assert_eq!(totals.len(), ProfitCategory::ALL.len());
        assert!(totals.contains(&(ProfitCategory::Bounty, 15500)));
        assert!(totals.contains(&(ProfitCategory::Exobiology, 0)));
        assert_eq!(profit_total(&db, ProfitCategory::Trade).unwrap(), 5000);
        assert_eq!(event_count(&db).unwrap(), 3);
    }

    #[test]
    fn pilot_status_names_ranks() {
        let (_dir, db) = seeded(&[
            r#"{"timestamp":"t1","event":"Commander","Name":"Jameson"}"#,
            r#"{"timestamp":"t2","event":"Rank","Combat":8,"Explore":2}"#,
            r#"{"timestamp":"t3","event":"Docked","StarSystem":"Shinrarta Dezhra","StationName":"Jameson Memorial"}"#,
        ]);
        let status = pilot_status(&db).unwrap().unwrap();
        assert_eq!(status.pilot_name, "Jameson");
        assert_eq!(status.station_name.as_deref(), Some("Jameson Memorial"));
        let combat = &status.ranks[0];
        assert_eq!((combat.track, combat.name), (RankTrack::Combat, "Elite"));
        assert_eq!(status.ranks[2].name, "Scout");
    }

    #[test]
    fn empty_database_has_no_pilot() {
        let (_dir, db) = seeded(&[]);
        assert_eq!(pilot_status(&db).unwrap(), None);
        assert!(system_data(&db).unwrap().is_empty());
    }

    #[test]
    fn over_capacity_materials_are_listed() {
        let (_dir, db) = seeded(&[
            r#"{"timestamp":"t","event":"Materials","Raw":[{"Name":"carbon","Count":350},{"Name":"iron","Count":12}]}"#,
        ]);
        let all = materials(&db).unwrap();
        assert_eq!(all.len(), 2);
        let over = over_capacity_materials(&db).unwrap();
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].name, "carbon");
        assert_eq!(over[0].capacity, Some(300));
    }

    #[test]
    fn localised_material_names_keep_internal_key() {
        let (_dir, db) = seeded(&[
            r#"{"timestamp":"t","event":"Materials","Manufactured":[{"Name":"chemicalstorageunits","Name_Localised":"Unidades de Armazenamento Químico","Count":400}]}"#,
        ]);
        let all = materials(&db).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "chemicalstorageunits");
        assert_eq!(all[0].label(), "Unidades de Armazenamento Químico");
        assert_eq!(all[0].capacity, Some(300));

        let over = over_capacity_materials(&db).unwrap();
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].name, "chemicalstorageunits");
    }

    #[test]
    fn transactions_and_catalog_are_readable() {
        let (_dir, db) = seeded(&[
            r#"{"timestamp":"t1","event":"FSDJump","StarSystem":"Alioth","SystemAddress":1109989017963,"StarPos":[-33.65,72.46,-20.65],"SystemAllegiance":"Alliance","Population":8000000000}"#,
            r#"{"timestamp":"t2","event":"Docked","StationName":"Irkutsk"}"#,
            r#"{"timestamp":"t3","event":"MarketBuy","Type":"gold","Type_Localised":"Gold","Count":10,"BuyPrice":9000,"TotalCost":90000}"#,
        ]);
        let trades = transactions(&db).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].commodity, "Gold");
        assert_eq!(trades[0].station_name.as_deref(), Some("Irkutsk"));
        assert_eq!((trades[0].kind.as_str(), trades[0].total), ("BUY", 90000));

        let systems = star_systems(&db).unwrap();
        assert_eq!(systems.len(), 1);
        assert_eq!(systems[0].position, Some([-33.65, 72.46, -20.65]));
        assert_eq!(systems[0].population, Some(8_000_000_000));
    }

    #[test]
    fn modules_and_system_data_are_readable() {
        let (_dir, db) = seeded(&[
            r#"{"timestamp":"t1","event":"FSDJump","StarSystem":"Alioth"}"#,
            r#"{"timestamp":"t2","event":"Scan","BodyName":"Alioth 4","PlanetClass":"Earthlike body","DistanceFromArrivalLS":1200.5}"#,
            r#"{"timestamp":"t3","event":"Loadout","Ship":"krait","ShipID":2,"Modules":[{"Slot":"Armour","Item":"krait_armour","Health":0.5}]}"#,
        ]);
        let entries = system_data(&db).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, "STAR");
        assert_eq!(entries[1].distance_ls, Some(1200.5));

        let modules = ship_modules(&db, 2).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].health, 0.5);
        assert!(ship_modules(&db, 99).unwrap().is_empty());
    }
}
