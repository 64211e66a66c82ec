//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, period months by their name, and the additional-data payload as
//! compact JSON (encoded and decoded only through
//! [`tarif_core::exam::AdditionalData`]).

use chrono::{DateTime, Utc};
use tarif_core::{
  catalog::{HnaRecord, PeriodMonth},
  exam::{AdditionalData, ExamRecord},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `hna_data` row.
pub struct RawHnaRecord {
  pub id:              String,
  pub region:          String,
  pub mitra:           String,
  pub kode_item:       String,
  pub nama_barang:     String,
  pub group_transaksi: String,
  pub satuan:          String,
  pub hna:             i64,
  pub periode_bulan:   String,
  pub periode_tahun:   i32,
  pub uploaded_by:     String,
  pub uploaded_at:     String,
}

impl RawHnaRecord {
  pub fn into_record(self) -> Result<HnaRecord> {
    Ok(HnaRecord {
      id:              decode_uuid(&self.id)?,
      region:          self.region,
      mitra:           self.mitra,
      kode_item:       self.kode_item,
      nama_barang:     self.nama_barang,
      group_transaksi: self.group_transaksi,
      satuan:          self.satuan,
      hna:             self.hna,
      periode_bulan:   PeriodMonth::parse(&self.periode_bulan)
        .map_err(Error::Core)?,
      periode_tahun:   self.periode_tahun,
      uploaded_by:     self.uploaded_by,
      uploaded_at:     decode_dt(&self.uploaded_at)?,
    })
  }
}

/// Raw strings read directly from a `pemeriksaan_penunjang` row.
pub struct RawExamRecord {
  pub id:              String,
  pub mitra:           String,
  pub kode:            String,
  pub deskripsi:       String,
  pub group_transaksi: String,
  pub satuan:          String,
  pub additional_data: String,
  pub uploaded_by:     String,
  pub uploaded_at:     String,
}

impl RawExamRecord {
  pub fn into_record(self) -> Result<ExamRecord> {
    Ok(ExamRecord {
      id:              decode_uuid(&self.id)?,
      mitra:           self.mitra,
      kode:            self.kode,
      deskripsi:       self.deskripsi,
      group_transaksi: self.group_transaksi,
      satuan:          self.satuan,
      additional:      AdditionalData::from_json(&self.additional_data)
        .map_err(Error::Core)?,
      uploaded_by:     self.uploaded_by,
      uploaded_at:     decode_dt(&self.uploaded_at)?,
    })
  }
}
