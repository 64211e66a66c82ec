//! SQL schema for the Tarif SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Price-list rows are strictly insert-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS hna_data (
    id              TEXT PRIMARY KEY,
    region          TEXT NOT NULL,
    mitra           TEXT NOT NULL,
    kode_item       TEXT NOT NULL,
    nama_barang     TEXT NOT NULL,
    group_transaksi TEXT NOT NULL,
    satuan          TEXT NOT NULL,
    hna             INTEGER NOT NULL CHECK (hna >= 0),
    periode_bulan   TEXT NOT NULL,    -- month name, e.g. 'Januari'
    periode_tahun   INTEGER NOT NULL,
    uploaded_by     TEXT NOT NULL,
    uploaded_at     TEXT NOT NULL     -- ISO 8601 UTC; server-assigned
);

-- Examination rows are insert-only as well. The extra columns of a row
-- travel in additional_data as a JSON object (column name -> text).
CREATE TABLE IF NOT EXISTS pemeriksaan_penunjang (
    id              TEXT PRIMARY KEY,
    mitra           TEXT NOT NULL,
    kode            TEXT NOT NULL,
    deskripsi       TEXT NOT NULL,
    group_transaksi TEXT NOT NULL,
    satuan          TEXT NOT NULL,
    additional_data TEXT NOT NULL DEFAULT '{}',
    uploaded_by     TEXT NOT NULL,
    uploaded_at     TEXT NOT NULL
);

-- Dynamically-discovered extra columns. Entries are created on first
-- sighting (INSERT OR IGNORE) and never deleted.
CREATE TABLE IF NOT EXISTS pemeriksaan_columns_metadata (
    column_name  TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    created_by   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS hna_region_idx   ON hna_data(region);
CREATE INDEX IF NOT EXISTS hna_mitra_idx    ON hna_data(mitra);
CREATE INDEX IF NOT EXISTS hna_periode_idx  ON hna_data(periode_tahun, periode_bulan);
CREATE INDEX IF NOT EXISTS hna_uploaded_idx ON hna_data(uploaded_at);

CREATE INDEX IF NOT EXISTS penunjang_mitra_idx    ON pemeriksaan_penunjang(mitra);
CREATE INDEX IF NOT EXISTS penunjang_uploaded_idx ON pemeriksaan_penunjang(uploaded_at);

PRAGMA user_version = 1;
";
