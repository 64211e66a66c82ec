//! Error types for the tarif-sheet codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required template column is absent from the header row.
  /// Raised before any data row is examined; nothing is persisted.
  #[error("required column {0:?} not found in the uploaded file")]
  MissingColumn(String),

  #[error("the uploaded file has no header row")]
  EmptyHeader,

  /// `row` is the 1-based data row index, header excluded.
  #[error("row {row}: invalid price {value:?}")]
  InvalidPrice { row: usize, value: String },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
