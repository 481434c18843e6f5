//! SQL schema for the MGNREGA SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Seed data. Read-only from the sync pipeline's perspective.
CREATE TABLE IF NOT EXISTS districts (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    state       TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS districts_name_idx
    ON districts(name COLLATE NOCASE);

-- One row per (district, fiscal year, month); overwritten by every sync
-- that supplies the key. district_id is not a foreign key: only records
-- for resolved districts ever reach this table.
CREATE TABLE IF NOT EXISTS performance_records (
    district_id             TEXT    NOT NULL,
    fiscal_year             TEXT    NOT NULL,  -- e.g. '2024-2025'
    month                   INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    metrics_json            TEXT    NOT NULL,  -- JSON-encoded Metrics
    women_participation_pct REAL,              -- NULL when undefined
    sc_participation_pct    REAL,
    st_participation_pct    REAL,
    created_at              TEXT    NOT NULL,
    updated_at              TEXT    NOT NULL,
    PRIMARY KEY (district_id, fiscal_year, month)
);

-- Singleton freshness row.
CREATE TABLE IF NOT EXISTS sync_status (
    id            INTEGER PRIMARY KEY CHECK (id = 1),
    last_updated  TEXT    NOT NULL,
    source_status TEXT    NOT NULL,  -- 'active' | 'degraded' | 'error'
    total_records INTEGER NOT NULL,
    notes         TEXT
);

PRAGMA user_version = 1;
";
