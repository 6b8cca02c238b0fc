//! Single writer for the journal database.
//!
//! Each event is committed in its own transaction: the raw row first (which
//! doubles as the duplicate check through the unique hash), then the
//! projections. A failing projection rolls the raw row back with it, so a
//! later redelivery of the same line is retried rather than skipped.

use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

use super::db;
use super::projections::{self, ApplyError, PLACEHOLDER_PILOT, ProjectionContext};
use crate::journal::{JournalEvent, ProjectionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested,
    Duplicate,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot prepare database directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("projection of {event_type} failed: {source}")]
    Projection {
        event_type: String,
        #[source]
        source: ProjectionError,
    },
}

pub struct IngestionStore {
    conn: Connection,
    path: PathBuf,
    pilot: String,
}

impl IngestionStore {
    /// Open (creating if needed) the database at `path` and restore the
    /// current pilot from the most recently updated status row.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = db::open_writer(path)?;
        let pilot = conn
            .query_row(
                "SELECT pilot_name FROM pilot_status ORDER BY last_update DESC LIMIT 1",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .unwrap_or_else(|| PLACEHOLDER_PILOT.to_string());

        tracing::info!(path = %path.display(), pilot = %pilot, "Opened journal database");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
            pilot,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pilot that status updates are currently written to.
    pub fn pilot(&self) -> &str {
        &self.pilot
    }

    /// Persist one event and its projections atomically.
    pub fn ingest(&mut self, event: &JournalEvent) -> Result<IngestOutcome, StoreError> {
        let data = event.payload_json();
        let hash = event.content_hash_of(&data);
        let tx = self.conn.transaction()?;

        let inserted = tx.execute(
            "INSERT INTO journal_events (timestamp, event_type, event_data, event_hash)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(event_hash) DO NOTHING",
            params![event.timestamp, event.event_type, data, hash],
        )?;
        if inserted == 0 {
            return Ok(IngestOutcome::Duplicate);
        }

        let mut ctx = ProjectionContext {
            pilot: self.pilot.clone(),
            payload_json: data,
        };
        projections::apply(&tx, &mut ctx, event).map_err(|e| match e {
            ApplyError::Field(source) => StoreError::Projection {
                event_type: event.event_type.clone(),
                source,
            },
            ApplyError::Sql(e) => StoreError::Sql(e),
        })?;

        tx.commit()?;

        if ctx.pilot != self.pilot {
            tracing::info!(pilot = %ctx.pilot, "Pilot identity changed");
            self.pilot = ctx.pilot;
        }
        Ok(IngestOutcome::Ingested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::parse_line;

    fn store() -> (tempfile::TempDir, IngestionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = IngestionStore::open(&dir.path().join("edlt.db")).unwrap();
        (dir, store)
    }

    fn ingest(store: &mut IngestionStore, line: &str) -> Result<IngestOutcome, StoreError> {
        store.ingest(&parse_line(line).unwrap())
    }

    fn count(store: &IngestionStore, sql: &str) -> i64 {
        store.conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    const BOUNTY: &str = r#"{"timestamp":"2024-01-01T00:00:00Z","event":"Bounty","Reward":15000}"#;

    #[test]
    fn bounty_is_recorded_once() {
        let (_dir, mut store) = store();
        assert_eq!(ingest(&mut store, BOUNTY).unwrap(), IngestOutcome::Ingested);
        assert_eq!(ingest(&mut store, BOUNTY).unwrap(), IngestOutcome::Duplicate);

        assert_eq!(count(&store, "SELECT COUNT(*) FROM journal_events"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM pilot_profit"), 1);
        assert_eq!(
            count(&store, "SELECT SUM(amount) FROM pilot_profit WHERE profit_type = 'BOUNTY'"),
            15000
        );
    }

    #[test]
    fn duplicates_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edlt.db");
        {
            let mut store = IngestionStore::open(&path).unwrap();
            ingest(&mut store, BOUNTY).unwrap();
        }
        let mut store = IngestionStore::open(&path).unwrap();
        assert_eq!(ingest(&mut store, BOUNTY).unwrap(), IngestOutcome::Duplicate);
    }

    #[test]
    fn failed_projection_rolls_back_raw_row() {
        let (_dir, mut store) = store();
        let err = ingest(
            &mut store,
            r#"{"timestamp":"2024-01-01T00:00:00Z","event":"Bounty","Reward":"abc"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Projection { ref event_type, .. } if event_type == "Bounty"));
        assert_eq!(count(&store, "SELECT COUNT(*) FROM journal_events"), 0);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM pilot_profit"), 0);
    }

    #[test]
    fn market_sell_is_price_times_count() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t","event":"MarketSell","Type":"gold","SellPrice":100,"Count":50}"#,
        )
        .unwrap();
        assert_eq!(
            count(&store, "SELECT amount FROM pilot_profit WHERE profit_type = 'TRADE'"),
            5000
        );
    }

    #[test]
    fn materials_are_fully_replaced() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t1","event":"Materials",
                "Raw":[{"Name":"carbon","Count":10},{"Name":"iron","Count":4},{"Name":"nickel","Count":2}],
                "Manufactured":[{"Name":"wornshieldemitters","Name_Localised":"Worn Shield Emitters","Count":7}],
                "Encoded":[{"Name":"scandatabanks","Count":1}]}"#
                .replace('\n', "")
                .as_str(),
        )
        .unwrap();
        assert_eq!(count(&store, "SELECT COUNT(*) FROM pilot_materials"), 5);

        ingest(
            &mut store,
            r#"{"timestamp":"t2","event":"Materials",
                "Raw":[{"Name":"sulphur","Count":3},{"Name":"zinc","Count":1}],
                "Manufactured":[],
                "Encoded":[{"Name":"shieldcyclerecordings","Count":9}]}"#
                .replace('\n', "")
                .as_str(),
        )
        .unwrap();
        assert_eq!(count(&store, "SELECT COUNT(*) FROM pilot_materials"), 3);
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM pilot_materials WHERE material_name = 'carbon'"),
            0
        );
    }

    #[test]
    fn negative_material_count_is_rejected() {
        let (_dir, mut store) = store();
        let err = ingest(
            &mut store,
            r#"{"timestamp":"t","event":"Materials","Raw":[{"Name":"carbon","Count":-1}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Projection { .. }));
        assert_eq!(count(&store, "SELECT COUNT(*) FROM journal_events"), 0);
    }

    #[test]
    fn jump_purges_previous_system() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t1","event":"Location","StarSystem":"Sol","Docked":true,"StationName":"Abraham Lincoln","DistFromStarLS":506.2}"#,
        )
        .unwrap();
        ingest(
            &mut store,
            r#"{"timestamp":"t2","event":"Scan","StarSystem":"Sol","BodyName":"Earth","PlanetClass":"Earthlike body","DistanceFromArrivalLS":499.0}"#,
        )
        .unwrap();
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM system_data WHERE system_name = 'Sol'"),
            3
        );

        ingest(
            &mut store,
            r#"{"timestamp":"t3","event":"FSDJump","StarSystem":"Alioth","JumpDist":82.6,"StarPos":[-33.65,72.46,-20.65]}"#,
        )
        .unwrap();
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM system_data WHERE system_name = 'Sol'"),
            0
        );
        assert_eq!(
            count(
                &store,
                "SELECT COUNT(*) FROM system_data WHERE system_name = 'Alioth' AND name = 'Alioth' AND type = 'STAR'"
            ),
            1
        );
        assert_eq!(count(&store, "SELECT COUNT(*) FROM pilot_journeys"), 1);
        let station: Option<String> = store
            .conn
            .query_row("SELECT station_name FROM pilot_status", [], |r| r.get(0))
            .unwrap();
        assert_eq!(station, None);
    }

    #[test]
    fn scan_without_system_uses_current_system() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t0","event":"Scan","BodyName":"Lost 1","StarType":"K"}"#,
        )
        .unwrap();
        assert_eq!(count(&store, "SELECT COUNT(*) FROM system_data"), 0);

        ingest(&mut store, r#"{"timestamp":"t1","event":"FSDJump","StarSystem":"Alioth"}"#).unwrap();
        ingest(
            &mut store,
            r#"{"timestamp":"t2","event":"Scan","BodyName":"Alioth 1","PlanetClass":"Icy body"}"#,
        )
        .unwrap();
        ingest(
            &mut store,
            r#"{"timestamp":"t3","event":"FSSSignalDiscovered","SignalName":"$USS;","SignalName_Localised":"Unidentified signal source"}"#,
        )
        .unwrap();
        assert_eq!(
            count(
                &store,
                "SELECT COUNT(*) FROM system_data WHERE system_name = 'Alioth' AND type IN ('Icy body', 'SIGNAL')"
            ),
            2
        );
    }

    #[test]
    fn loadout_replaces_modules_for_that_ship() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t1","event":"Loadout","Ship":"asp","ShipID":7,"ShipName":"Wanderer","Modules":[
                {"Slot":"PowerPlant","Item":"int_powerplant_size5_class5","Health":0.9},
                {"Slot":"FrameShiftDrive","Item":"int_hyperdrive_size5_class5"},
                {"Slot":"Armour","Item":"asp_armour_grade1","Health":1.2}]}"#
                .replace('\n', "")
                .as_str(),
        )
        .unwrap();
        assert_eq!(count(&store, "SELECT COUNT(*) FROM ship_modules WHERE ship_id = 7"), 3);
        let max_health: f64 = store
            .conn
            .query_row("SELECT MAX(health) FROM ship_modules", [], |r| r.get(0))
            .unwrap();
        assert_eq!(max_health, 1.0);

        ingest(
            &mut store,
            r#"{"timestamp":"t2","event":"Loadout","Ship":"asp","ShipID":7,"Modules":[
                {"Slot":"PowerPlant","Item":"int_powerplant_size5_class2","Health":1.0}]}"#
                .replace('\n', "")
                .as_str(),
        )
        .unwrap();
        assert_eq!(count(&store, "SELECT COUNT(*) FROM ship_modules WHERE ship_id = 7"), 1);
    }

    #[test]
    fn ranks_are_clamped_and_progress_scaled() {
        let (_dir, mut store) = store();
        ingest(&mut store, r#"{"timestamp":"t1","event":"Commander","Name":"Jameson"}"#).unwrap();
        assert_eq!(store.pilot(), "Jameson");

        ingest(
            &mut store,
            r#"{"timestamp":"t2","event":"Rank","Combat":3,"Trade":99,"Explore":-2,"CQC":0,"Federation":5,"Empire":1}"#,
        )
        .unwrap();
        ingest(
            &mut store,
            r#"{"timestamp":"t3","event":"Progress","Combat":45,"Trade":150,"Explore":0}"#,
        )
        .unwrap();

        let (combat, trade, explore): (i64, i64, i64) = store
            .conn
            .query_row(
                "SELECT rank_combat, rank_trade, rank_explore FROM pilot_status WHERE pilot_name = 'Jameson'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((combat, trade, explore), (3, 12, 0));

        let (combat_p, trade_p): (f64, f64) = store
            .conn
            .query_row(
                "SELECT progress_combat, progress_trade FROM pilot_status WHERE pilot_name = 'Jameson'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert!((combat_p - 0.45).abs() < 1e-9);
        assert_eq!(trade_p, 1.0);

        ingest(&mut store, r#"{"timestamp":"t4","event":"Promotion","Combat":4}"#).unwrap();
        let (rank, progress): (i64, f64) = store
            .conn
            .query_row(
                "SELECT rank_combat, progress_combat FROM pilot_status WHERE pilot_name = 'Jameson'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!((rank, progress), (4, 0.0));
    }

    #[test]
    fn pilot_is_restored_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edlt.db");
        {
            let mut store = IngestionStore::open(&path).unwrap();
            assert_eq!(store.pilot(), PLACEHOLDER_PILOT);
            ingest(
                &mut store,
                r#"{"timestamp":"2024-05-01T10:00:00Z","event":"LoadGame","Commander":"Obsidian","Ship":"python","ShipID":3,"ShipName":"Slab"}"#,
            )
            .unwrap();
        }
        let store = IngestionStore::open(&path).unwrap();
        assert_eq!(store.pilot(), "Obsidian");
    }

    #[test]
    fn unprojected_events_are_logged_raw() {
        let (_dir, mut store) = store();
        ingest(&mut store, r#"{"timestamp":"t","event":"Music","MusicTrack":"NoTrack"}"#).unwrap();
        assert_eq!(count(&store, "SELECT COUNT(*) FROM journal_events"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM pilot_status"), 0);
    }

    fn ship(store: &IngestionStore) -> (Option<i64>, Option<String>, Option<String>) {
        store
            .conn
            .query_row(
                "SELECT ship_id, ship_model, ship_name FROM pilot_status",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap()
    }

    #[test]
    fn shipyard_swap_and_rename_update_ship_fields() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t1","event":"Loadout","Ship":"asp","ShipID":7,"ShipName":"Wanderer","Modules":[]}"#,
        )
        .unwrap();
        ingest(
            &mut store,
            r#"{"timestamp":"t2","event":"ShipyardSwap","ShipType":"krait_mkii","ShipID":9,"StoreOldShip":"asp","StoreShipID":7}"#,
        )
        .unwrap();
        assert_eq!(ship(&store), (Some(9), Some("krait_mkii".into()), None));

        ingest(
            &mut store,
            r#"{"timestamp":"t3","event":"SetUserShipName","Ship":"krait_mkii","ShipID":9,"UserShipName":"Bob","UserShipId":"BB-01"}"#,
        )
        .unwrap();
        assert_eq!(ship(&store), (Some(9), Some("krait_mkii".into()), Some("Bob".into())));
    }

    #[test]
    fn undocking_clears_station() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t1","event":"Docked","StarSystem":"Sol","StationName":"Galileo"}"#,
        )
        .unwrap();
        ingest(&mut store, r#"{"timestamp":"t2","event":"Undocked","StationName":"Galileo"}"#).unwrap();

        let (system, station): (Option<String>, Option<String>) = store
            .conn
            .query_row("SELECT system_name, station_name FROM pilot_status", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(system.as_deref(), Some("Sol"));
        assert_eq!(station, None);
    }

    #[test]
    fn multi_sell_exploration_is_exploration_profit() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t","event":"MultiSellExplorationData","Discovered":[],"BaseValue":700,"Bonus":77,"TotalEarnings":777}"#,
        )
        .unwrap();
        assert_eq!(
            count(&store, "SELECT SUM(amount) FROM pilot_profit WHERE profit_type = 'EXPLORATION'"),
            777
        );
    }

    #[test]
    fn location_in_another_system_purges_previous_one() {
        let (_dir, mut store) = store();
        ingest(&mut store, r#"{"timestamp":"t1","event":"Location","StarSystem":"Sol"}"#).unwrap();
        ingest(
            &mut store,
            r#"{"timestamp":"t2","event":"Scan","BodyName":"Mars","PlanetClass":"Rocky body"}"#,
        )
        .unwrap();
        // Same system again keeps what was scanned.
        ingest(&mut store, r#"{"timestamp":"t3","event":"Location","StarSystem":"Sol","Docked":false}"#).unwrap();
        assert_eq!(count(&store, "SELECT COUNT(*) FROM system_data WHERE system_name = 'Sol'"), 2);

        ingest(&mut store, r#"{"timestamp":"t4","event":"Location","StarSystem":"Achenar"}"#).unwrap();
        let names: Vec<String> = store
            .conn
            .prepare("SELECT name FROM system_data")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(names, vec!["Achenar".to_string()]);
    }

    #[test]
    fn market_events_fill_transaction_ledger() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t1","event":"Docked","StarSystem":"Sol","StationName":"Daedalus"}"#,
        )
        .unwrap();
        ingest(
            &mut store,
            r#"{"timestamp":"t2","event":"MarketBuy","MarketID":1,"Type":"tea","Count":20,"BuyPrice":1500,"TotalCost":30000}"#,
        )
        .unwrap();
        ingest(
            &mut store,
            r#"{"timestamp":"t3","event":"MarketSell","MarketID":1,"Type":"tea","Count":20,"SellPrice":1700}"#,
        )
        .unwrap();

        let rows: Vec<(String, String, i64)> = store
            .conn
            .prepare("SELECT transaction_type, station_name, total FROM pilot_transactions ORDER BY id")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                ("BUY".to_string(), "Daedalus".to_string(), 30000),
                ("SELL".to_string(), "Daedalus".to_string(), 34000),
            ]
        );
        // Only the sale is income.
        assert_eq!(count(&store, "SELECT COUNT(*) FROM pilot_profit"), 1);
    }

    #[test]
    fn star_catalog_survives_later_jumps() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t1","event":"FSDJump","StarSystem":"Sol","SystemAddress":10477373803,"StarPos":[0.0,0.0,0.0],"SystemAllegiance":"Federation","SystemGovernment":"$government_Democracy;","SystemGovernment_Localised":"Democracy","Population":22780919531}"#,
        )
        .unwrap();
        ingest(
            &mut store,
            r#"{"timestamp":"t2","event":"FSDJump","StarSystem":"Alioth","StarPos":[-33.65,72.46,-20.65]}"#,
        )
        .unwrap();
        // A later visit without the faction fields keeps them.
        ingest(&mut store, r#"{"timestamp":"t3","event":"Location","StarSystem":"Sol"}"#).unwrap();

        assert_eq!(count(&store, "SELECT COUNT(*) FROM star_systems"), 2);
        let (government, population, last_seen): (String, i64, String) = store
            .conn
            .query_row(
                "SELECT government, population, last_seen FROM star_systems WHERE system_name = 'Sol'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((government.as_str(), population, last_seen.as_str()), ("Democracy", 22780919531, "t3"));
    }

    #[test]
    fn materials_keyed_on_internal_name() {
        let (_dir, mut store) = store();
        ingest(
            &mut store,
            r#"{"timestamp":"t1","event":"Materials","Manufactured":[{"Name":"chemicalstorageunits","Name_Localised":"Unidades de Armazenamento Químico","Count":400}]}"#,
        )
        .unwrap();
        ingest(
            &mut store,
            r#"{"timestamp":"t2","event":"Materials","Manufactured":[{"Name":"chemicalstorageunits","Name_Localised":"Chemical Storage Units","Count":12}]}"#,
        )
        .unwrap();
        let (name, display, stored): (String, String, i64) = store
            .conn
            .query_row("SELECT material_name, display_name, count FROM pilot_materials", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!(
            (name.as_str(), display.as_str(), stored),
            ("chemicalstorageunits", "Chemical Storage Units", 12)
        );
    }
}
