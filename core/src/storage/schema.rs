//! Table definitions for the journal database.

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS journal_events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp   TEXT NOT NULL,
    event_type  TEXT NOT NULL,
    event_data  TEXT NOT NULL,
    event_hash  TEXT NOT NULL UNIQUE
);
CREATE INDEX IF NOT EXISTS idx_journal_events_type ON journal_events(event_type);

CREATE TABLE IF NOT EXISTS pilot_status (
    pilot_name          TEXT PRIMARY KEY,
    rank_combat         INTEGER NOT NULL DEFAULT 0,
    progress_combat     REAL NOT NULL DEFAULT 0,
    rank_trade          INTEGER NOT NULL DEFAULT 0,
    progress_trade      REAL NOT NULL DEFAULT 0,
    rank_explore        INTEGER NOT NULL DEFAULT 0,
    progress_explore    REAL NOT NULL DEFAULT 0,
    rank_cqc            INTEGER NOT NULL DEFAULT 0,
    progress_cqc        REAL NOT NULL DEFAULT 0,
    rank_federation     INTEGER NOT NULL DEFAULT 0,
    progress_federation REAL NOT NULL DEFAULT 0,
    rank_empire         INTEGER NOT NULL DEFAULT 0,
    progress_empire     REAL NOT NULL DEFAULT 0,
    system_name         TEXT,
    station_name        TEXT,
    ship_id             INTEGER,
    ship_name           TEXT,
    ship_model          TEXT,
    last_update         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pilot_materials (
    material_name TEXT PRIMARY KEY,
    display_name  TEXT,
    category      TEXT NOT NULL,
    count         INTEGER NOT NULL CHECK (count >= 0),
    timestamp     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pilot_profit (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp   TEXT NOT NULL,
    profit_type TEXT NOT NULL,
    amount      INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_pilot_profit_type ON pilot_profit(profit_type);

CREATE TABLE IF NOT EXISTS pilot_transactions (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp           TEXT NOT NULL,
    pilot_name          TEXT NOT NULL,
    station_name        TEXT,
    commodity           TEXT NOT NULL,
    commodity_localised TEXT,
    transaction_type    TEXT NOT NULL CHECK (transaction_type IN ('BUY', 'SELL')),
    price               INTEGER NOT NULL,
    quantity            INTEGER NOT NULL,
    total               INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS system_data (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    system_name TEXT NOT NULL,
    type        TEXT NOT NULL,
    distance_ls REAL,
    data_json   TEXT NOT NULL,
    UNIQUE(name, system_name)
);

CREATE TABLE IF NOT EXISTS ship_modules (
    ship_id INTEGER NOT NULL,
    slot    TEXT NOT NULL,
    module  TEXT NOT NULL,
    health  REAL NOT NULL,
    PRIMARY KEY (ship_id, slot)
);

CREATE TABLE IF NOT EXISTS pilot_journeys (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp     TEXT NOT NULL,
    system_name   TEXT NOT NULL,
    jump_distance REAL,
    star_pos_x    REAL,
    star_pos_y    REAL,
    star_pos_z    REAL
);

CREATE TABLE IF NOT EXISTS star_systems (
    system_name    TEXT PRIMARY KEY,
    system_address INTEGER,
    star_pos_x     REAL,
    star_pos_y     REAL,
    star_pos_z     REAL,
    allegiance     TEXT,
    government     TEXT,
    population     INTEGER,
    last_seen      TEXT NOT NULL
);
"#;
