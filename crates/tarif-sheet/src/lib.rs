//! Tabular (CSV) codec for Tarif uploads and exports.
//!
//! Converts between CSV text and [`tarif_core`] domain types. Pure
//! synchronous; no HTTP or database dependencies. Parsing validates the
//! whole file before anything is handed to a store, so a structural error
//! never leaves partial state behind.
//!
//! # Quick start
//!
//! ```no_run
//! let csv = "KODE,DESKRIPSI,GROUP TRANSAKSI,SATUAN,KELAS\n\
//!            LAB001,HEMATOLOGY TEST,Laboratorium,TEST,A\n";
//! let sheet = tarif_sheet::parse_examinations(csv).unwrap();
//! println!(
//!   "{} rows, {} skipped, extra columns: {:?}",
//!   sheet.rows.len(),
//!   sheet.skipped,
//!   sheet.additional_columns,
//! );
//! ```

pub mod error;
mod parse;
mod serialize;

pub use error::{Error, Result};
pub use parse::{EXAM_COLUMNS, ExamSheet, HNA_COLUMNS, HnaSheet};
pub use serialize::{export_examinations, export_hna};

/// Parse and validate a price-list upload.
///
/// Fails fast with [`Error::MissingColumn`] if any of [`HNA_COLUMNS`] is
/// absent from the header row. Rows with a blank item code, item name, or
/// price are skipped and counted, not fatal; a malformed price aborts the
/// whole file.
pub fn parse_hna(input: &str) -> Result<HnaSheet> {
  let sheet = parse::Sheet::parse(input)?;
  parse::extract_price_rows(&sheet)
}

/// Parse and validate an examination upload.
///
/// Fails fast with [`Error::MissingColumn`] if any of [`EXAM_COLUMNS`] is
/// absent from the header row. Every other header is an additional column;
/// rows with a blank code or description are skipped and counted.
pub fn parse_examinations(input: &str) -> Result<ExamSheet> {
  let sheet = parse::Sheet::parse(input)?;
  parse::extract_examinations(&sheet)
}
