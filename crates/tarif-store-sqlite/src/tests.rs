//! Integration tests for `SqliteStore` against an in-memory database.

use tarif_core::{
  catalog::{HnaFilter, NewHnaBatch, NewHnaRow, PeriodMonth},
  exam::{AdditionalData, ExamFilter, NewExamBatch, NewExamRow},
  store::CatalogStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn hna_row(kode_item: &str, nama_barang: &str, hna: i64) -> NewHnaRow {
  NewHnaRow {
    kode_item:       kode_item.into(),
    nama_barang:     nama_barang.into(),
    group_transaksi: "Obat".into(),
    satuan:          "BOX".into(),
    hna,
  }
}

fn hna_batch(region: &str, mitra: &str, rows: Vec<NewHnaRow>) -> NewHnaBatch {
  NewHnaBatch {
    region:        region.into(),
    mitra:         mitra.into(),
    periode_bulan: PeriodMonth::Maret,
    periode_tahun: 2025,
    uploaded_by:   "admin".into(),
    rows,
  }
}

fn exam_row(kode: &str, deskripsi: &str, additional: AdditionalData) -> NewExamRow {
  NewExamRow {
    kode:            kode.into(),
    deskripsi:       deskripsi.into(),
    group_transaksi: "Laboratorium".into(),
    satuan:          "TEST".into(),
    additional,
  }
}

// ─── Price list ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_hna_batch_and_list_all() {
  let s = store().await;

  let inserted = s
    .insert_hna_batch(hna_batch(
      "Jawa Barat",
      "St. Yusup",
      vec![hna_row("A1", "Paracetamol 500mg", 15_500), hna_row("A2", "Ibuprofen", 22_000)],
    ))
    .await
    .unwrap();
  assert_eq!(inserted, 2);

  let rows = s.list_hna(&HnaFilter::default()).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r.region == "Jawa Barat"));
  assert!(rows.iter().all(|r| r.periode_bulan == PeriodMonth::Maret));
}

#[tokio::test]
async fn hna_batch_metadata_applies_to_every_row() {
  let s = store().await;
  s.insert_hna_batch(hna_batch(
    "Jawa Timur",
    "Mitra Sehat",
    vec![hna_row("B1", "Amoxicillin", 9_000)],
  ))
  .await
  .unwrap();

  let rows = s.list_hna(&HnaFilter::default()).await.unwrap();
  let row = &rows[0];
  assert_eq!(row.mitra, "Mitra Sehat");
  assert_eq!(row.periode_tahun, 2025);
  assert_eq!(row.uploaded_by, "admin");
  assert_eq!(row.hna, 9_000);
}

#[tokio::test]
async fn empty_hna_batch_inserts_nothing() {
  let s = store().await;
  let inserted = s
    .insert_hna_batch(hna_batch("Jawa Barat", "St. Yusup", vec![]))
    .await
    .unwrap();
  assert_eq!(inserted, 0);
  assert!(s.list_hna(&HnaFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_hna_filters_are_conjunctive() {
  let s = store().await;
  s.insert_hna_batch(hna_batch(
    "Jawa Barat",
    "St. Yusup",
    vec![hna_row("A1", "Paracetamol 500mg", 15_500)],
  ))
  .await
  .unwrap();
  s.insert_hna_batch(hna_batch(
    "Jawa Barat",
    "Mitra Sehat",
    vec![hna_row("A1", "Paracetamol 500mg", 16_000)],
  ))
  .await
  .unwrap();

  let filter = HnaFilter {
    region: Some("Jawa Barat".into()),
    mitra: Some("Mitra Sehat".into()),
    ..Default::default()
  };
  let rows = s.list_hna(&filter).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].hna, 16_000);

  let none = HnaFilter {
    region: Some("Sumatera".into()),
    mitra: Some("Mitra Sehat".into()),
    ..Default::default()
  };
  assert!(s.list_hna(&none).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_hna_filters_by_period() {
  let s = store().await;
  let mut batch = hna_batch(
    "Jawa Barat",
    "St. Yusup",
    vec![hna_row("A1", "Paracetamol 500mg", 15_500)],
  );
  batch.periode_bulan = PeriodMonth::Januari;
  batch.periode_tahun = 2024;
  s.insert_hna_batch(batch).await.unwrap();

  let hit = HnaFilter {
    periode_bulan: Some(PeriodMonth::Januari),
    periode_tahun: Some(2024),
    ..Default::default()
  };
  assert_eq!(s.list_hna(&hit).await.unwrap().len(), 1);

  let miss = HnaFilter {
    periode_bulan: Some(PeriodMonth::Februari),
    ..Default::default()
  };
  assert!(s.list_hna(&miss).await.unwrap().is_empty());
}

// ─── Examinations ────────────────────────────────────────────────────────────

#[tokio::test]
async fn exam_additional_data_round_trip() {
  let s = store().await;

  let mut additional = AdditionalData::new();
  additional.insert("KELAS", "A");

  s.insert_exam_batch(NewExamBatch {
    mitra:       "St. Yusup".into(),
    uploaded_by: "admin".into(),
    rows:        vec![exam_row("LAB001", "HEMATOLOGY TEST", additional)],
  })
  .await
  .unwrap();

  let rows = s.list_examinations(&ExamFilter::default()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].additional.get("KELAS"), Some("A"));
}

#[tokio::test]
async fn exam_without_extras_round_trips_empty_payload() {
  let s = store().await;

  s.insert_exam_batch(NewExamBatch {
    mitra:       "St. Yusup".into(),
    uploaded_by: "admin".into(),
    rows:        vec![exam_row("RAD002", "X-RAY THORAX", AdditionalData::new())],
  })
  .await
  .unwrap();

  let rows = s.list_examinations(&ExamFilter::default()).await.unwrap();
  assert!(rows[0].additional.is_empty());
}

#[tokio::test]
async fn insert_exam_batch_returns_row_count() {
  let s = store().await;

  let inserted = s
    .insert_exam_batch(NewExamBatch {
      mitra:       "St. Yusup".into(),
      uploaded_by: "admin".into(),
      rows:        vec![
        exam_row("LAB001", "HEMATOLOGY TEST", AdditionalData::new()),
        exam_row("LAB002", "URINALYSIS", AdditionalData::new()),
      ],
    })
    .await
    .unwrap();
  assert_eq!(inserted, 2);
}

#[tokio::test]
async fn list_examinations_filters_by_mitra() {
  let s = store().await;

  s.insert_exam_batch(NewExamBatch {
    mitra:       "St. Yusup".into(),
    uploaded_by: "admin".into(),
    rows:        vec![exam_row("LAB001", "HEMATOLOGY TEST", AdditionalData::new())],
  })
  .await
  .unwrap();
  s.insert_exam_batch(NewExamBatch {
    mitra:       "Mitra Sehat".into(),
    uploaded_by: "admin".into(),
    rows:        vec![exam_row("LAB001", "HEMATOLOGY TEST", AdditionalData::new())],
  })
  .await
  .unwrap();

  let filter = ExamFilter { mitra: Some("Mitra Sehat".into()), ..Default::default() };
  let rows = s.list_examinations(&filter).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].mitra, "Mitra Sehat");
}

// ─── Column registry ─────────────────────────────────────────────────────────

#[tokio::test]
async fn register_columns_creates_entries_with_default_display_name() {
  let s = store().await;

  let created = s
    .register_columns(&["KELAS".into(), "SUB_KATEGORI".into()], "admin")
    .await
    .unwrap();
  assert_eq!(created, 2);

  let columns = s.list_columns().await.unwrap();
  assert_eq!(columns.len(), 2);
  // Ordered by column name; display name defaults to the column name.
  assert_eq!(columns[0].column_name, "KELAS");
  assert_eq!(columns[0].display_name, "KELAS");
  assert_eq!(columns[0].created_by, "admin");
  assert_eq!(columns[1].column_name, "SUB_KATEGORI");
}

#[tokio::test]
async fn register_columns_is_idempotent() {
  let s = store().await;

  s.register_columns(&["KELAS".into()], "admin").await.unwrap();
  let second = s
    .register_columns(&["KELAS".into()], "someone-else")
    .await
    .unwrap();
  assert_eq!(second, 0);

  let columns = s.list_columns().await.unwrap();
  assert_eq!(columns.len(), 1);
  // First registration wins; the entry is left untouched.
  assert_eq!(columns[0].created_by, "admin");
}

#[tokio::test]
async fn column_display_name_lookup() {
  let s = store().await;
  s.register_columns(&["KELAS".into()], "admin").await.unwrap();

  assert_eq!(
    s.column_display_name("KELAS").await.unwrap().as_deref(),
    Some("KELAS")
  );
  assert_eq!(s.column_display_name("ZONA").await.unwrap(), None);
}

#[tokio::test]
async fn register_no_columns_is_a_no_op() {
  let s = store().await;
  assert_eq!(s.register_columns(&[], "admin").await.unwrap(), 0);
  assert!(s.list_columns().await.unwrap().is_empty());
}
