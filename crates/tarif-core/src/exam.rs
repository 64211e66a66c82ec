//! Ancillary-examination catalog types and the dynamic column registry.
//!
//! Examination uploads carry a fixed required column set plus arbitrary extra
//! columns. The extra columns are tracked in a registry ([`ColumnEntry`]) and
//! each row's extra values travel in a single schemaless payload
//! ([`AdditionalData`]).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

// ─── Additional data ─────────────────────────────────────────────────────────

/// The schemaless extra-column payload of an examination row: column name →
/// cell text. Insertion order is irrelevant; keys iterate sorted.
///
/// Every key must have a corresponding [`ColumnEntry`] in the registry —
/// ingestion registers newly-seen names before rows are persisted.
///
/// This type is the only encode/decode boundary for the payload's stored
/// form; nothing else parses the `additional_data` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdditionalData(BTreeMap<String, String>);

impl AdditionalData {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.insert(key.into(), value.into());
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Serialise for the `additional_data` database column.
  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string(&self.0)?)
  }

  /// Deserialise from the `additional_data` database column.
  /// An empty or blank column decodes to an empty payload.
  pub fn from_json(s: &str) -> Result<Self> {
    if s.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(Self(serde_json::from_str(s)?))
  }
}

impl FromIterator<(String, String)> for AdditionalData {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One ancillary-examination catalog entry, as persisted.
/// `deskripsi` is the free-text search target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRecord {
  pub id:              Uuid,
  pub mitra:           String,
  pub kode:            String,
  pub deskripsi:       String,
  pub group_transaksi: String,
  pub satuan:          String,
  pub additional:      AdditionalData,
  pub uploaded_by:     String,
  /// Server-assigned timestamp; never changes after creation.
  pub uploaded_at:     DateTime<Utc>,
}

// ─── Batch input ─────────────────────────────────────────────────────────────

/// One already-validated row of an examination upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExamRow {
  pub kode:            String,
  pub deskripsi:       String,
  pub group_transaksi: String,
  pub satuan:          String,
  pub additional:      AdditionalData,
}

/// Input to [`crate::store::CatalogStore::insert_exam_batch`].
/// Record ids and `uploaded_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewExamBatch {
  pub mitra:       String,
  pub uploaded_by: String,
  pub rows:        Vec<NewExamRow>,
}

// ─── Column registry ─────────────────────────────────────────────────────────

/// One dynamically-discovered extra column.
///
/// Created lazily the first time a column name is seen during ingestion;
/// duplicate registrations are no-ops and entries are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEntry {
  pub column_name:  String,
  /// Label used in exports and detail views; defaults to the column name.
  pub display_name: String,
  pub created_by:   String,
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Conjunctive exact-match filter over the examination dimensions.
#[derive(Debug, Clone, Default)]
pub struct ExamFilter {
  pub mitra:           Option<String>,
  pub group_transaksi: Option<String>,
  pub satuan:          Option<String>,
}
