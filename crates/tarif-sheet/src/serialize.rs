//! CSV export of filtered working sets.
//!
//! Exports mirror the display column labels but always carry raw values —
//! in particular the price column is the unformatted integer, not the
//! grouped display form.

use tarif_core::{
  catalog::HnaRecord,
  exam::{ColumnEntry, ExamRecord},
};

use crate::error::Result;

const HNA_EXPORT_HEADERS: [&str; 12] = [
  "No",
  "Regional",
  "Mitra",
  "Kode Item",
  "Nama Barang",
  "Group Transaksi",
  "Satuan",
  "HNA",
  "Periode Bulan",
  "Periode Tahun",
  "Uploaded By",
  "Uploaded At",
];

const EXAM_EXPORT_BASE_HEADERS: [&str; 6] =
  ["No", "Mitra", "Kode", "Deskripsi", "Group Transaksi", "Satuan"];

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
  let buf = writer.into_inner().map_err(|e| e.into_error())?;
  // The writer only ever receives &str fields.
  Ok(String::from_utf8(buf).expect("csv output is utf-8"))
}

/// Serialise price rows in the export column order, raw prices included.
pub fn export_hna(rows: &[HnaRecord]) -> Result<String> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(HNA_EXPORT_HEADERS)?;

  for (i, r) in rows.iter().enumerate() {
    writer.write_record(&[
      (i + 1).to_string(),
      r.region.clone(),
      r.mitra.clone(),
      r.kode_item.clone(),
      r.nama_barang.clone(),
      r.group_transaksi.clone(),
      r.satuan.clone(),
      r.hna.to_string(),
      r.periode_bulan.as_str().to_string(),
      r.periode_tahun.to_string(),
      r.uploaded_by.clone(),
      r.uploaded_at.to_rfc3339(),
    ])?;
  }

  finish(writer)
}

/// Serialise examination rows with every registry column expanded into its
/// own header (display name). Rows without a value for a column get an
/// empty cell.
pub fn export_examinations(
  rows:    &[ExamRecord],
  columns: &[ColumnEntry],
) -> Result<String> {
  let mut writer = csv::Writer::from_writer(Vec::new());

  let mut headers: Vec<&str> = EXAM_EXPORT_BASE_HEADERS.to_vec();
  headers.extend(columns.iter().map(|c| c.display_name.as_str()));
  writer.write_record(&headers)?;

  for (i, r) in rows.iter().enumerate() {
    let no = (i + 1).to_string();
    let mut record: Vec<&str> = vec![
      no.as_str(),
      r.mitra.as_str(),
      r.kode.as_str(),
      r.deskripsi.as_str(),
      r.group_transaksi.as_str(),
      r.satuan.as_str(),
    ];
    record.extend(
      columns
        .iter()
        .map(|c| r.additional.get(&c.column_name).unwrap_or("")),
    );
    writer.write_record(&record)?;
  }

  finish(writer)
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use tarif_core::{
    catalog::PeriodMonth,
    exam::AdditionalData,
  };
  use uuid::Uuid;

  use super::*;

  fn exam_record(kode: &str, additional: AdditionalData) -> ExamRecord {
    ExamRecord {
      id:              Uuid::nil(),
      mitra:           "St. Yusup".to_string(),
      kode:            kode.to_string(),
      deskripsi:       "HEMATOLOGY TEST".to_string(),
      group_transaksi: "Laboratorium".to_string(),
      satuan:          "TEST".to_string(),
      additional,
      uploaded_by:     "admin".to_string(),
      uploaded_at:     Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
    }
  }

  #[test]
  fn hna_export_keeps_raw_price() {
    let row = HnaRecord {
      id:              Uuid::nil(),
      region:          "Jawa Barat".to_string(),
      mitra:           "St. Yusup".to_string(),
      kode_item:       "A1".to_string(),
      nama_barang:     "Paracetamol 500mg".to_string(),
      group_transaksi: "Obat".to_string(),
      satuan:          "BOX".to_string(),
      hna:             1_250_000,
      periode_bulan:   PeriodMonth::Maret,
      periode_tahun:   2025,
      uploaded_by:     "admin".to_string(),
      uploaded_at:     Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
    };

    let out = export_hna(&[row]).unwrap();
    let mut lines = out.lines();
    assert!(lines.next().unwrap().starts_with("No,Regional,Mitra"));
    let data = lines.next().unwrap();
    assert!(data.contains(",1250000,"), "raw price expected: {data}");
    assert!(!data.contains("1.250.000"));
  }

  #[test]
  fn exam_export_expands_registry_columns() {
    let mut additional = AdditionalData::new();
    additional.insert("KELAS", "A");

    let columns = vec![
      ColumnEntry {
        column_name:  "KELAS".to_string(),
        display_name: "KELAS".to_string(),
        created_by:   "admin".to_string(),
      },
      ColumnEntry {
        column_name:  "ZONA".to_string(),
        display_name: "ZONA".to_string(),
        created_by:   "admin".to_string(),
      },
    ];

    let out =
      export_examinations(&[exam_record("LAB001", additional)], &columns)
        .unwrap();
    let mut lines = out.lines();
    assert_eq!(
      lines.next().unwrap(),
      "No,Mitra,Kode,Deskripsi,Group Transaksi,Satuan,KELAS,ZONA"
    );
    // KELAS filled, ZONA empty.
    assert_eq!(
      lines.next().unwrap(),
      "1,St. Yusup,LAB001,HEMATOLOGY TEST,Laboratorium,TEST,A,"
    );
  }
}
