//! Price-list ("HNA") catalog types.
//!
//! One [`HnaRecord`] is one priced item for one partner, region, and period.
//! Records are written once at upload time and never mutated; there is no
//! delete operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Period ──────────────────────────────────────────────────────────────────

/// Calendar month of a price-list period, as it appears on the upload form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodMonth {
  Januari,
  Februari,
  Maret,
  April,
  Mei,
  Juni,
  Juli,
  Agustus,
  September,
  Oktober,
  November,
  Desember,
}

impl PeriodMonth {
  /// The month name stored in the `periode_bulan` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Januari => "Januari",
      Self::Februari => "Februari",
      Self::Maret => "Maret",
      Self::April => "April",
      Self::Mei => "Mei",
      Self::Juni => "Juni",
      Self::Juli => "Juli",
      Self::Agustus => "Agustus",
      Self::September => "September",
      Self::Oktober => "Oktober",
      Self::November => "November",
      Self::Desember => "Desember",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "Januari" => Ok(Self::Januari),
      "Februari" => Ok(Self::Februari),
      "Maret" => Ok(Self::Maret),
      "April" => Ok(Self::April),
      "Mei" => Ok(Self::Mei),
      "Juni" => Ok(Self::Juni),
      "Juli" => Ok(Self::Juli),
      "Agustus" => Ok(Self::Agustus),
      "September" => Ok(Self::September),
      "Oktober" => Ok(Self::Oktober),
      "November" => Ok(Self::November),
      "Desember" => Ok(Self::Desember),
      other => Err(Error::UnknownMonth(other.to_string())),
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One priced catalog item, as persisted.
///
/// `nama_barang` is the free-text search target; every other field is an
/// exact-match filter dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HnaRecord {
  pub id:              Uuid,
  pub region:          String,
  pub mitra:           String,
  pub kode_item:       String,
  pub nama_barang:     String,
  pub group_transaksi: String,
  pub satuan:          String,
  /// Non-negative currency amount, stored unformatted.
  pub hna:             i64,
  pub periode_bulan:   PeriodMonth,
  pub periode_tahun:   i32,
  pub uploaded_by:     String,
  /// Server-assigned timestamp; never changes after creation.
  pub uploaded_at:     DateTime<Utc>,
}

// ─── Batch input ─────────────────────────────────────────────────────────────

/// One already-validated row of an upload, before batch metadata is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHnaRow {
  pub kode_item:       String,
  pub nama_barang:     String,
  pub group_transaksi: String,
  pub satuan:          String,
  pub hna:             i64,
}

/// Input to [`crate::store::CatalogStore::insert_hna_batch`].
///
/// The region/mitra/period metadata applies uniformly to every row. Record
/// ids and `uploaded_at` are assigned by the store; they are not accepted
/// from callers.
#[derive(Debug, Clone)]
pub struct NewHnaBatch {
  pub region:        String,
  pub mitra:         String,
  pub periode_bulan: PeriodMonth,
  pub periode_tahun: i32,
  pub uploaded_by:   String,
  pub rows:          Vec<NewHnaRow>,
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Conjunctive exact-match filter over the price-list dimensions.
/// `None` means "all values" for that dimension.
#[derive(Debug, Clone, Default)]
pub struct HnaFilter {
  pub region:          Option<String>,
  pub mitra:           Option<String>,
  pub group_transaksi: Option<String>,
  pub satuan:          Option<String>,
  pub periode_bulan:   Option<PeriodMonth>,
  pub periode_tahun:   Option<i32>,
}

// ─── Display formatting ──────────────────────────────────────────────────────

/// Group an integer amount with dot separators, e.g. `1250000` → `"1.250.000"`.
///
/// Display path only — exports always carry the raw value.
pub fn format_grouped(amount: i64) -> String {
  let digits = amount.unsigned_abs().to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
  if amount < 0 {
    out.push('-');
  }
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push('.');
    }
    out.push(c);
  }
  out
}
