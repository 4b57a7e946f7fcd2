//! Handlers for `/knowledge` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/knowledge` | Optional `q`, `category`, `tag`, `sort`, `limit`, `offset` |
//! | `POST`  | `/knowledge` | Body: [`NewArticle`]; returns 201 |
//! | `GET`   | `/knowledge/{id}` | Does not count as a view |
//! | `PATCH` | `/knowledge/{id}` | Body: [`ArticlePatch`] |
//! | `POST`  | `/knowledge/{id}/views` | Increments the view counter |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use helpdesk_core::{
  knowledge::{Article, ArticlePatch, ArticleSort, NewArticle},
  store::{ArticleQuery, DeskStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(alias = "search")]
  pub q:        Option<String>,
  pub category: Option<String>,
  #[serde(alias = "tags")]
  pub tag:      Option<String>,
  #[serde(default)]
  pub sort:     ArticleSort,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

/// `GET /knowledge[?category=..&tag=..&sort=most_viewed]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Article>>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = ArticleQuery {
    text:     params.q,
    category: params.category,
    tag:      params.tag,
    sort:     params.sort,
    limit:    params.limit,
    offset:   params.offset,
  };
  let articles = store
    .list_articles(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(articles))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /knowledge`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewArticle>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  body.validate()?;
  let article = store
    .create_article(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(article)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /knowledge/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let article = store
    .get_article(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("article {id} not found")))?;
  Ok(Json(article))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /knowledge/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<ArticlePatch>,
) -> Result<Json<Article>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  patch.validate()?;
  let article = store
    .update_article(id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("article {id} not found")))?;
  Ok(Json(article))
}

// ─── Views ────────────────────────────────────────────────────────────────────

/// `POST /knowledge/{id}/views`
pub async fn record_view<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let article = store
    .record_view(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("article {id} not found")))?;
  Ok(Json(article))
}
