//! Handlers for `/examinations` and `/columns`.
//!
//! The description (`deskripsi`) is the free-text search target. Exports
//! expand every registered additional column into its own header.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::header,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tarif_core::{
  exam::{ColumnEntry, ExamFilter, ExamRecord},
  search::{
    DEFAULT_LIMIT, DEFAULT_THRESHOLD, MatchTier, SearchMode, SearchResult,
    search_with_mode, similarity,
  },
  store::CatalogStore,
};

use crate::error::ApiError;

// ─── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ExamParams {
  pub mitra:           Option<String>,
  pub group_transaksi: Option<String>,
  pub satuan:          Option<String>,

  /// Free-text description query.
  pub q:         Option<String>,
  #[serde(default)]
  pub mode:      SearchMode,
  pub threshold: Option<u8>,
  pub limit:     Option<usize>,
}

impl ExamParams {
  fn filter(&self) -> ExamFilter {
    ExamFilter {
      mitra:           self.mitra.clone(),
      group_transaksi: self.group_transaksi.clone(),
      satuan:          self.satuan.clone(),
    }
  }
}

async fn working_set<S>(
  store:  &S,
  params: &ExamParams,
) -> Result<SearchResult<ExamRecord>, ApiError>
where
  S: CatalogStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rows = store
    .list_examinations(&params.filter())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(search_with_mode(
    rows,
    params.q.as_deref().unwrap_or(""),
    |r| Some(r.deskripsi.as_str()),
    params.mode,
    params.threshold.unwrap_or(DEFAULT_THRESHOLD),
    params.limit.unwrap_or(DEFAULT_LIMIT),
  ))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ExamRowView {
  #[serde(flatten)]
  pub record: ExamRecord,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub score:  Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct ExamPage {
  pub tier:  Option<MatchTier>,
  pub total: usize,
  pub rows:  Vec<ExamRowView>,
}

/// `GET /examinations[?mitra=...][&q=...][&mode=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ExamParams>,
) -> Result<Json<ExamPage>, ApiError>
where
  S: CatalogStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let result = working_set(store.as_ref(), &params).await?;
  let tier = result.tier;

  let mut rows: Vec<ExamRowView> = result
    .rows
    .into_iter()
    .map(|r| ExamRowView { record: r, score: None })
    .collect();

  if tier == Some(MatchTier::Fuzzy)
    && let Some(q) = params.q.as_deref()
  {
    for row in &mut rows {
      row.score = Some(similarity(q, &row.record.deskripsi));
    }
    rows.sort_by(|a, b| {
      b.score
        .cmp(&a.score)
        .then_with(|| a.record.deskripsi.cmp(&b.record.deskripsi))
    });
  }

  Ok(Json(ExamPage { tier, total: rows.len(), rows }))
}

// ─── Export ───────────────────────────────────────────────────────────────────

/// `GET /examinations/export` — `text/csv` attachment; one header per
/// registered additional column.
pub async fn export<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ExamParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let result = working_set(store.as_ref(), &params).await?;
  let columns = store
    .list_columns()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let csv = tarif_sheet::export_examinations(&result.rows, &columns)?;

  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
      (
        header::CONTENT_DISPOSITION,
        "attachment; filename=\"pemeriksaan_penunjang.csv\"",
      ),
    ],
    csv,
  ))
}

// ─── Column registry ──────────────────────────────────────────────────────────

/// `GET /columns` — every registered additional column, ordered by name.
pub async fn columns<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<ColumnEntry>>, ApiError>
where
  S: CatalogStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entries = store
    .list_columns()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(entries))
}
