//! Handlers for `/hna` — filtered listing, name search, CSV export.
//!
//! Dimension filters are exact-match and conjunctive, applied by the store;
//! the free-text `q` parameter then runs the tiered search over the working
//! set. The JSON rows are the display path (grouped price, fuzzy scores);
//! the export carries raw values.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::header,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tarif_core::{
  catalog::{HnaFilter, HnaRecord, PeriodMonth, format_grouped},
  search::{
    DEFAULT_LIMIT, DEFAULT_THRESHOLD, MatchTier, SearchMode, SearchResult,
    search_with_mode, similarity,
  },
  store::CatalogStore,
};

use crate::error::ApiError;

// ─── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct HnaParams {
  pub region:          Option<String>,
  pub mitra:           Option<String>,
  pub group_transaksi: Option<String>,
  pub satuan:          Option<String>,
  pub periode_bulan:   Option<PeriodMonth>,
  pub periode_tahun:   Option<i32>,

  /// Free-text item-name query.
  pub q:         Option<String>,
  #[serde(default)]
  pub mode:      SearchMode,
  /// Minimum fuzzy score (0–100).
  pub threshold: Option<u8>,
  /// Fuzzy candidate cap, not a row cap.
  pub limit:     Option<usize>,
}

impl HnaParams {
  fn filter(&self) -> HnaFilter {
    HnaFilter {
      region:          self.region.clone(),
      mitra:           self.mitra.clone(),
      group_transaksi: self.group_transaksi.clone(),
      satuan:          self.satuan.clone(),
      periode_bulan:   self.periode_bulan,
      periode_tahun:   self.periode_tahun,
    }
  }
}

async fn working_set<S>(
  store:  &S,
  params: &HnaParams,
) -> Result<SearchResult<HnaRecord>, ApiError>
where
  S: CatalogStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rows = store
    .list_hna(&params.filter())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(search_with_mode(
    rows,
    params.q.as_deref().unwrap_or(""),
    |r| Some(r.nama_barang.as_str()),
    params.mode,
    params.threshold.unwrap_or(DEFAULT_THRESHOLD),
    params.limit.unwrap_or(DEFAULT_LIMIT),
  ))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Display-path row: the record plus the grouped price and, for fuzzy
/// results, the similarity score.
#[derive(Debug, Serialize)]
pub struct HnaRowView {
  #[serde(flatten)]
  pub record:        HnaRecord,
  pub hna_formatted: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub score:         Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct HnaPage {
  /// Which tier produced the rows; `None` for an unsearched or empty
  /// result.
  pub tier:  Option<MatchTier>,
  pub total: usize,
  pub rows:  Vec<HnaRowView>,
}

/// `GET /hna[?region=...][&mitra=...][&q=...][&mode=...][&threshold=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<HnaParams>,
) -> Result<Json<HnaPage>, ApiError>
where
  S: CatalogStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let result = working_set(store.as_ref(), &params).await?;
  let tier = result.tier;

  let mut rows: Vec<HnaRowView> = result
    .rows
    .into_iter()
    .map(|r| HnaRowView {
      hna_formatted: format_grouped(r.hna),
      score:         None,
      record:        r,
    })
    .collect();

  // Fuzzy results carry their score and come back best first.
  if tier == Some(MatchTier::Fuzzy)
    && let Some(q) = params.q.as_deref()
  {
    for row in &mut rows {
      row.score = Some(similarity(q, &row.record.nama_barang));
    }
    rows.sort_by(|a, b| {
      b.score
        .cmp(&a.score)
        .then_with(|| a.record.nama_barang.cmp(&b.record.nama_barang))
    });
  }

  Ok(Json(HnaPage { tier, total: rows.len(), rows }))
}

// ─── Export ───────────────────────────────────────────────────────────────────

/// `GET /hna/export` — same parameters as the listing, `text/csv` attachment
/// with raw prices.
pub async fn export<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<HnaParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let result = working_set(store.as_ref(), &params).await?;
  let csv = tarif_sheet::export_hna(&result.rows)?;

  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
      (
        header::CONTENT_DISPOSITION,
        "attachment; filename=\"hna_data.csv\"",
      ),
    ],
    csv,
  ))
}
