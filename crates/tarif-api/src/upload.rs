//! Handlers for the upload endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/hna/upload` | `text/csv` body; query: `region`, `mitra`, `periode_bulan`, `periode_tahun`, `uploaded_by` |
//! | `POST` | `/examinations/upload` | `text/csv` body; query: `mitra`, `uploaded_by` |
//!
//! `uploaded_by` is caller-supplied identity — session handling lives in the
//! upstream layer. The whole file is parsed and validated before any store
//! call, so a structural error persists nothing.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tarif_core::{
  catalog::{NewHnaBatch, PeriodMonth},
  exam::NewExamBatch,
  store::CatalogStore,
};

use crate::error::ApiError;

fn require(value: &str, name: &str) -> Result<(), ApiError> {
  if value.trim().is_empty() {
    return Err(ApiError::BadRequest(format!("{name} must not be empty")));
  }
  Ok(())
}

// ─── Price list ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HnaUploadParams {
  pub region:        String,
  pub mitra:         String,
  pub periode_bulan: PeriodMonth,
  pub periode_tahun: i32,
  pub uploaded_by:   String,
}

#[derive(Debug, Serialize)]
pub struct HnaUploadSummary {
  /// Rows persisted.
  pub inserted: usize,
  /// Rows dropped for a blank item code, item name, or price.
  pub skipped:  usize,
}

/// `POST /hna/upload` — batch metadata in the query, CSV in the body.
pub async fn hna<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<HnaUploadParams>,
  body: String,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  require(&params.region, "region")?;
  require(&params.mitra, "mitra")?;
  require(&params.uploaded_by, "uploaded_by")?;

  let sheet = tarif_sheet::parse_hna(&body)?;
  let skipped = sheet.skipped;

  let inserted = store
    .insert_hna_batch(NewHnaBatch {
      region:        params.region,
      mitra:         params.mitra,
      periode_bulan: params.periode_bulan,
      periode_tahun: params.periode_tahun,
      uploaded_by:   params.uploaded_by,
      rows:          sheet.rows,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(inserted, skipped, "hna upload complete");
  Ok((StatusCode::CREATED, Json(HnaUploadSummary { inserted, skipped })))
}

// ─── Examinations ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExamUploadParams {
  pub mitra:       String,
  pub uploaded_by: String,
}

#[derive(Debug, Serialize)]
pub struct ExamUploadSummary {
  pub inserted:    usize,
  /// Rows dropped for a blank code or description.
  pub skipped:     usize,
  /// Additional columns registered for the first time by this upload.
  pub new_columns: usize,
}

/// `POST /examinations/upload` — mitra in the query, CSV in the body.
///
/// Registry writes commit before any row insert begins; the two are
/// separate transaction boundaries.
pub async fn examinations<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ExamUploadParams>,
  body: String,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  require(&params.mitra, "mitra")?;
  require(&params.uploaded_by, "uploaded_by")?;

  let sheet = tarif_sheet::parse_examinations(&body)?;
  let skipped = sheet.skipped;

  // A registry failure is a warning, not an abort — already-registered
  // names are silent no-ops at the store level.
  let new_columns = match store
    .register_columns(&sheet.additional_columns, &params.uploaded_by)
    .await
  {
    Ok(n) => n,
    Err(e) => {
      tracing::warn!(error = %e, "column registration failed; continuing");
      0
    }
  };

  let inserted = store
    .insert_exam_batch(NewExamBatch {
      mitra:       params.mitra,
      uploaded_by: params.uploaded_by,
      rows:        sheet.rows,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(inserted, skipped, new_columns, "examination upload complete");
  Ok((
    StatusCode::CREATED,
    Json(ExamUploadSummary { inserted, skipped, new_columns }),
  ))
}
