//! CSV upload parsing and validation.
//!
//! Pipeline:
//!   raw CSV &str
//!     └─ Sheet::parse()              → header row + trimmed cells
//!          ├─ extract_price_rows()   → HnaSheet  (closed column set)
//!          └─ extract_examinations() → ExamSheet (+ additional columns)
//!
//! Header validation is exact (case- and name-sensitive, as defined by the
//! templates) and fails before any data row is examined.

use tarif_core::{
  catalog::NewHnaRow,
  exam::{AdditionalData, NewExamRow},
};

use crate::error::{Error, Result};

/// Required headers of the price-list template, in template order.
pub const HNA_COLUMNS: [&str; 5] =
  ["Kode Item", "Nama Barang", "Group Transaksi", "Satuan", "HNA"];

/// Required headers of the examination template, in template order.
/// Every other header is an additional column.
pub const EXAM_COLUMNS: [&str; 4] =
  ["KODE", "DESKRIPSI", "GROUP TRANSAKSI", "SATUAN"];

// ─── Sheet ───────────────────────────────────────────────────────────────────

/// A parsed tabular file: one header row plus data rows.
/// Cells are trimmed; blank cells are `None`.
pub(crate) struct Sheet {
  headers: Vec<String>,
  rows:    Vec<Vec<Option<String>>>,
}

impl Sheet {
  pub(crate) fn parse(input: &str) -> Result<Self> {
    let mut reader = csv::ReaderBuilder::new()
      .flexible(true)
      .trim(csv::Trim::All)
      .from_reader(input.as_bytes());

    let headers: Vec<String> =
      reader.headers()?.iter().map(str::to_owned).collect();
    if headers.iter().all(String::is_empty) {
      return Err(Error::EmptyHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
      let record = record?;
      rows.push(
        record
          .iter()
          .map(|cell| (!cell.is_empty()).then(|| cell.to_owned()))
          .collect(),
      );
    }

    Ok(Self { headers, rows })
  }

  fn column_index(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h == name)
  }

  /// Indexes of `required` headers, or the first missing one as an error.
  fn require_columns(&self, required: &[&str]) -> Result<Vec<usize>> {
    required
      .iter()
      .map(|name| {
        self
          .column_index(name)
          .ok_or_else(|| Error::MissingColumn((*name).to_string()))
      })
      .collect()
  }

  /// Cell at (`row`, `col`); `None` for blank cells and short rows.
  fn cell(&self, row: usize, col: usize) -> Option<&str> {
    self.rows[row].get(col).and_then(Option::as_deref)
  }

  fn row_count(&self) -> usize {
    self.rows.len()
  }
}

// ─── Price-list extraction ───────────────────────────────────────────────────

/// A validated price-list upload.
#[derive(Debug)]
pub struct HnaSheet {
  pub rows:    Vec<NewHnaRow>,
  /// Rows dropped for a blank item code, item name, or price.
  pub skipped: usize,
}

/// Parse a non-negative currency integer. Digit-grouping separators
/// (`1.250.000`, `1,250,000`) are tolerated.
fn parse_price(raw: &str, row: usize) -> Result<i64> {
  let cleaned: String = raw
    .chars()
    .filter(|c| !matches!(c, '.' | ',' | ' '))
    .collect();
  let invalid = || Error::InvalidPrice { row, value: raw.to_string() };
  let amount: i64 = cleaned.parse().map_err(|_| invalid())?;
  if amount < 0 {
    return Err(invalid());
  }
  Ok(amount)
}

pub(crate) fn extract_price_rows(sheet: &Sheet) -> Result<HnaSheet> {
  let idx = sheet.require_columns(&HNA_COLUMNS)?;
  let (kode_i, nama_i, group_i, satuan_i, hna_i) =
    (idx[0], idx[1], idx[2], idx[3], idx[4]);

  let mut rows = Vec::new();
  let mut skipped = 0usize;

  for row in 0..sheet.row_count() {
    let (Some(kode_item), Some(nama_barang), Some(hna_raw)) = (
      sheet.cell(row, kode_i),
      sheet.cell(row, nama_i),
      sheet.cell(row, hna_i),
    ) else {
      skipped += 1;
      continue;
    };

    rows.push(NewHnaRow {
      kode_item:       kode_item.to_owned(),
      nama_barang:     nama_barang.to_owned(),
      group_transaksi: sheet.cell(row, group_i).unwrap_or("").to_owned(),
      satuan:          sheet.cell(row, satuan_i).unwrap_or("").to_owned(),
      hna:             parse_price(hna_raw, row + 1)?,
    });
  }

  Ok(HnaSheet { rows, skipped })
}

// ─── Examination extraction ──────────────────────────────────────────────────

/// A validated examination upload.
#[derive(Debug)]
pub struct ExamSheet {
  /// Headers outside the required set, in input order. These are the names
  /// to register in the column registry before inserting rows.
  pub additional_columns: Vec<String>,
  pub rows:               Vec<NewExamRow>,
  /// Rows dropped for a blank code or description.
  pub skipped:            usize,
}

pub(crate) fn extract_examinations(sheet: &Sheet) -> Result<ExamSheet> {
  let idx = sheet.require_columns(&EXAM_COLUMNS)?;
  let (kode_i, desk_i, group_i, satuan_i) = (idx[0], idx[1], idx[2], idx[3]);

  let additional: Vec<(usize, &str)> = sheet
    .headers
    .iter()
    .enumerate()
    .filter(|(_, h)| !h.is_empty() && !EXAM_COLUMNS.contains(&h.as_str()))
    .map(|(i, h)| (i, h.as_str()))
    .collect();

  let mut rows = Vec::new();
  let mut skipped = 0usize;

  for row in 0..sheet.row_count() {
    let (Some(kode), Some(deskripsi)) =
      (sheet.cell(row, kode_i), sheet.cell(row, desk_i))
    else {
      skipped += 1;
      continue;
    };

    // Missing cells are omitted from the payload — never stored as an
    // empty string or a null key.
    let mut payload = AdditionalData::new();
    for (col, name) in &additional {
      if let Some(value) = sheet.cell(row, *col) {
        payload.insert(*name, value);
      }
    }

    rows.push(NewExamRow {
      kode:            kode.to_owned(),
      deskripsi:       deskripsi.to_owned(),
      group_transaksi: sheet.cell(row, group_i).unwrap_or("").to_owned(),
      satuan:          sheet.cell(row, satuan_i).unwrap_or("").to_owned(),
      additional:      payload,
    });
  }

  Ok(ExamSheet {
    additional_columns: additional.into_iter().map(|(_, h)| h.to_owned()).collect(),
    rows,
    skipped,
  })
}
