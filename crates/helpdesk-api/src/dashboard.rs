//! Handlers for `/dashboard` endpoints.
//!
//! All figures are computed on request from the full ticket set, with SLA
//! statuses re-evaluated against the active definitions first.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dashboard/summary` | `?days=` trend window (default 7, max 90) |
//! | `GET`  | `/dashboard/trend` | `?days=` |
//! | `GET`  | `/dashboard/sla-compliance` | |
//! | `GET`  | `/dashboard/workload` | |
//! | `GET`  | `/dashboard/knowledge` | `?limit=` (default 5) |

use std::sync::Arc;

use axum::extract::State;
use chrono::Utc;
use helpdesk_core::{
  dashboard::{self, DailyBucket, DashboardSummary, KnowledgeHighlights, SlaCompliance, Workload},
  knowledge::Article,
  sla,
  store::{ArticleQuery, DeskStore, TicketQuery},
  ticket::Ticket,
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{Json, Query},
};

pub const DEFAULT_TREND_DAYS: u32 = 7;
pub const MAX_TREND_DAYS: u32 = 90;
pub const DEFAULT_HIGHLIGHTS: usize = 5;
pub const MAX_HIGHLIGHTS: usize = 50;

// ─── Parameters ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
  pub days: Option<u32>,
}

impl TrendParams {
  fn days(&self) -> Result<u32, ApiError> {
    match self.days.unwrap_or(DEFAULT_TREND_DAYS) {
      days @ 1..=MAX_TREND_DAYS => Ok(days),
      days => Err(ApiError::BadRequest(format!(
        "days must be between 1 and {MAX_TREND_DAYS}, got {days}"
      ))),
    }
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct HighlightParams {
  pub limit: Option<usize>,
}

// ─── Loading ──────────────────────────────────────────────────────────────────

/// Every ticket in the store with a freshly evaluated SLA status.
async fn load_tickets<S>(store: &S) -> Result<Vec<Ticket>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = TicketQuery { limit: Some(usize::MAX), ..Default::default() };
  let mut tickets = store
    .list_tickets(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let slas = store
    .list_slas(true)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  sla::refresh(&mut tickets, &slas, Utc::now());
  Ok(tickets)
}

async fn load_articles<S>(store: &S) -> Result<Vec<Article>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = ArticleQuery { limit: Some(usize::MAX), ..Default::default() };
  store
    .list_articles(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// `GET /dashboard/summary[?days=N]`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<TrendParams>,
) -> Result<Json<DashboardSummary>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let days = params.days()?;
  let tickets = load_tickets(store.as_ref()).await?;
  Ok(Json(DashboardSummary::compute(&tickets, Utc::now(), days)))
}

/// `GET /dashboard/trend[?days=N]` — oldest day first.
pub async fn trend<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<TrendParams>,
) -> Result<Json<Vec<DailyBucket>>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let days = params.days()?;
  let tickets = load_tickets(store.as_ref()).await?;
  let today = Utc::now().date_naive();
  Ok(Json(dashboard::daily_trend(&tickets, today, days)))
}

/// `GET /dashboard/sla-compliance`
pub async fn sla_compliance<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<SlaCompliance>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let tickets = load_tickets(store.as_ref()).await?;
  Ok(Json(dashboard::sla_compliance(&tickets)))
}

/// `GET /dashboard/workload`
pub async fn workload<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Workload>>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let tickets = load_tickets(store.as_ref()).await?;
  Ok(Json(dashboard::workload(&tickets)))
}

/// `GET /dashboard/knowledge[?limit=N]`
pub async fn knowledge<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<HighlightParams>,
) -> Result<Json<KnowledgeHighlights>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let limit = params.limit.unwrap_or(DEFAULT_HIGHLIGHTS);
  if limit == 0 || limit > MAX_HIGHLIGHTS {
    return Err(ApiError::BadRequest(format!(
      "limit must be between 1 and {MAX_HIGHLIGHTS}, got {limit}"
    )));
  }
  let articles = load_articles(store.as_ref()).await?;
  Ok(Json(dashboard::knowledge_highlights(&articles, limit)))
}
