//! The [`CatalogStore`] trait.
//!
//! The trait is implemented by storage backends (e.g. `tarif-store-sqlite`).
//! Higher layers (`tarif-api`, `tarif-server`) depend on this abstraction,
//! not on any concrete backend, and receive the handle explicitly — there is
//! no ambient session.

use std::future::Future;

use crate::{
  catalog::{HnaFilter, HnaRecord, NewHnaBatch},
  exam::{ColumnEntry, ExamFilter, ExamRecord, NewExamBatch},
};

/// Abstraction over a Tarif catalog store backend.
///
/// Rows are insert-only: no method here updates or deletes a record. Column
/// registration is insert-if-absent and safe to repeat — concurrent
/// re-registrations of the same name converge on a single entry. Concurrent
/// re-uploads of overlapping row sets are NOT coordinated; duplicate rows
/// are an accepted product-level outcome.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Price list ────────────────────────────────────────────────────────

  /// Persist every row of `batch` in a single transaction — all rows land
  /// or none do. One server-assigned `uploaded_at` is shared by the batch.
  /// Returns the number of rows inserted.
  fn insert_hna_batch(
    &self,
    batch: NewHnaBatch,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Price rows matching every set dimension of `filter`, newest upload
  /// first.
  fn list_hna<'a>(
    &'a self,
    filter: &'a HnaFilter,
  ) -> impl Future<Output = Result<Vec<HnaRecord>, Self::Error>> + Send + 'a;

  // ── Examinations ──────────────────────────────────────────────────────

  /// Persist every row of `batch` in a single transaction. The caller is
  /// expected to have registered the batch's additional columns first via
  /// [`register_columns`](Self::register_columns) — registry and row writes
  /// are two separate transaction boundaries, registry first.
  fn insert_exam_batch(
    &self,
    batch: NewExamBatch,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Examination rows matching every set dimension of `filter`, newest
  /// upload first.
  fn list_examinations<'a>(
    &'a self,
    filter: &'a ExamFilter,
  ) -> impl Future<Output = Result<Vec<ExamRecord>, Self::Error>> + Send + 'a;

  // ── Column registry ───────────────────────────────────────────────────

  /// Register newly-seen additional columns with their name as the display
  /// name. Existing entries are left untouched. Returns how many entries
  /// were actually created.
  fn register_columns<'a>(
    &'a self,
    names:      &'a [String],
    created_by: &'a str,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// All registered columns, ordered by column name.
  fn list_columns(
    &self,
  ) -> impl Future<Output = Result<Vec<ColumnEntry>, Self::Error>> + Send + '_;

  /// Display label for one column; `None` when the name was never
  /// registered.
  fn column_display_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}
