//! [`SqliteStore`] — the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use tarif_core::{
  catalog::{HnaFilter, HnaRecord, NewHnaBatch},
  exam::{ColumnEntry, ExamFilter, ExamRecord, NewExamBatch},
  store::CatalogStore,
};

use crate::{
  Error, Result,
  encode::{RawExamRecord, RawHnaRecord, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tarif catalog store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Price list ────────────────────────────────────────────────────────────

  async fn insert_hna_batch(&self, batch: NewHnaBatch) -> Result<usize> {
    if batch.rows.is_empty() {
      return Ok(0);
    }

    // One server-assigned timestamp for the whole batch.
    let at_str = encode_dt(Utc::now());
    let bulan  = batch.periode_bulan.as_str();
    let NewHnaBatch { region, mitra, periode_tahun, uploaded_by, rows, .. } =
      batch;
    let ids: Vec<String> =
      rows.iter().map(|_| encode_uuid(Uuid::new_v4())).collect();

    let inserted = self
      .conn
      .call(move |conn| {
        // All rows land or none do — the transaction rolls back on any
        // insert failure.
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO hna_data (
               id, region, mitra, kode_item, nama_barang, group_transaksi,
               satuan, hna, periode_bulan, periode_tahun, uploaded_by,
               uploaded_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          )?;
          for (id, row) in ids.iter().zip(&rows) {
            stmt.execute(rusqlite::params![
              id,
              region,
              mitra,
              row.kode_item,
              row.nama_barang,
              row.group_transaksi,
              row.satuan,
              row.hna,
              bulan,
              periode_tahun,
              uploaded_by,
              at_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    Ok(inserted)
  }

  async fn list_hna(&self, filter: &HnaFilter) -> Result<Vec<HnaRecord>> {
    // Build the WHERE clause dynamically; placeholders bind in push order.
    let mut conds: Vec<&'static str> = Vec::new();
    let mut binds: Vec<Value> = Vec::new();

    if let Some(v) = &filter.region {
      conds.push("region = ?");
      binds.push(Value::Text(v.clone()));
    }
    if let Some(v) = &filter.mitra {
      conds.push("mitra = ?");
      binds.push(Value::Text(v.clone()));
    }
    if let Some(v) = &filter.group_transaksi {
      conds.push("group_transaksi = ?");
      binds.push(Value::Text(v.clone()));
    }
    if let Some(v) = &filter.satuan {
      conds.push("satuan = ?");
      binds.push(Value::Text(v.clone()));
    }
    if let Some(v) = filter.periode_bulan {
      conds.push("periode_bulan = ?");
      binds.push(Value::Text(v.as_str().to_owned()));
    }
    if let Some(v) = filter.periode_tahun {
      conds.push("periode_tahun = ?");
      binds.push(Value::Integer(v.into()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    let sql = format!(
      "SELECT id, region, mitra, kode_item, nama_barang, group_transaksi,
              satuan, hna, periode_bulan, periode_tahun, uploaded_by,
              uploaded_at
       FROM hna_data
       {where_clause}
       ORDER BY uploaded_at DESC"
    );

    let raws: Vec<RawHnaRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(binds), |row| {
            Ok(RawHnaRecord {
              id:              row.get(0)?,
              region:          row.get(1)?,
              mitra:           row.get(2)?,
              kode_item:       row.get(3)?,
              nama_barang:     row.get(4)?,
              group_transaksi: row.get(5)?,
              satuan:          row.get(6)?,
              hna:             row.get(7)?,
              periode_bulan:   row.get(8)?,
              periode_tahun:   row.get(9)?,
              uploaded_by:     row.get(10)?,
              uploaded_at:     row.get(11)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHnaRecord::into_record).collect()
  }

  // ── Examinations ──────────────────────────────────────────────────────────

  async fn insert_exam_batch(&self, batch: NewExamBatch) -> Result<usize> {
    if batch.rows.is_empty() {
      return Ok(0);
    }

    let at_str = encode_dt(Utc::now());
    let NewExamBatch { mitra, uploaded_by, rows } = batch;

    // Encode payloads up front so serialisation failures surface before
    // the transaction starts.
    let mut encoded = Vec::with_capacity(rows.len());
    for row in rows {
      encoded.push((
        encode_uuid(Uuid::new_v4()),
        row.kode,
        row.deskripsi,
        row.group_transaksi,
        row.satuan,
        row.additional.to_json()?,
      ));
    }

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO pemeriksaan_penunjang (
               id, mitra, kode, deskripsi, group_transaksi, satuan,
               additional_data, uploaded_by, uploaded_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          )?;
          for (id, kode, deskripsi, group, satuan, payload) in &encoded {
            stmt.execute(rusqlite::params![
              id,
              mitra,
              kode,
              deskripsi,
              group,
              satuan,
              payload,
              uploaded_by,
              at_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(encoded.len())
      })
      .await?;

    Ok(inserted)
  }

  async fn list_examinations(
    &self,
    filter: &ExamFilter,
  ) -> Result<Vec<ExamRecord>> {
    let mut conds: Vec<&'static str> = Vec::new();
    let mut binds: Vec<Value> = Vec::new();

    if let Some(v) = &filter.mitra {
      conds.push("mitra = ?");
      binds.push(Value::Text(v.clone()));
    }
    if let Some(v) = &filter.group_transaksi {
      conds.push("group_transaksi = ?");
      binds.push(Value::Text(v.clone()));
    }
    if let Some(v) = &filter.satuan {
      conds.push("satuan = ?");
      binds.push(Value::Text(v.clone()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    let sql = format!(
      "SELECT id, mitra, kode, deskripsi, group_transaksi, satuan,
              additional_data, uploaded_by, uploaded_at
       FROM pemeriksaan_penunjang
       {where_clause}
       ORDER BY uploaded_at DESC"
    );

    let raws: Vec<RawExamRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(binds), |row| {
            Ok(RawExamRecord {
              id:              row.get(0)?,
              mitra:           row.get(1)?,
              kode:            row.get(2)?,
              deskripsi:       row.get(3)?,
              group_transaksi: row.get(4)?,
              satuan:          row.get(5)?,
              additional_data: row.get(6)?,
              uploaded_by:     row.get(7)?,
              uploaded_at:     row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExamRecord::into_record).collect()
  }

  // ── Column registry ───────────────────────────────────────────────────────

  async fn register_columns(
    &self,
    names:      &[String],
    created_by: &str,
  ) -> Result<usize> {
    if names.is_empty() {
      return Ok(0);
    }

    let names      = names.to_vec();
    let created_by = created_by.to_owned();

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut created = 0usize;
        {
          // Insert-if-absent: a re-registered name changes nothing and
          // keeps its original display name and creator.
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO pemeriksaan_columns_metadata
               (column_name, display_name, created_by)
             VALUES (?1, ?1, ?2)",
          )?;
          for name in &names {
            created += stmt.execute(rusqlite::params![name, created_by])?;
          }
        }
        tx.commit()?;
        Ok(created)
      })
      .await?;

    Ok(created)
  }

  async fn list_columns(&self) -> Result<Vec<ColumnEntry>> {
    let entries = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT column_name, display_name, created_by
           FROM pemeriksaan_columns_metadata
           ORDER BY column_name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(ColumnEntry {
              column_name:  row.get(0)?,
              display_name: row.get(1)?,
              created_by:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(entries)
  }

  async fn column_display_name(&self, name: &str) -> Result<Option<String>> {
    let name = name.to_owned();

    let display = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT display_name FROM pemeriksaan_columns_metadata
               WHERE column_name = ?1",
              rusqlite::params![name],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(display)
  }
}
