//! Handlers for `/slas` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/slas` | `?active=true` restricts to active definitions |
//! | `POST`  | `/slas` | Body: [`NewSla`]; both times must be positive |
//! | `GET`   | `/slas/{id}` | |
//! | `PATCH` | `/slas/{id}` | Body: [`SlaPatch`] |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use helpdesk_core::{
  sla::{NewSla, SlaDefinition, SlaPatch},
  store::DeskStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub active: bool,
}

/// `GET /slas[?active=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SlaDefinition>>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let slas = store
    .list_slas(params.active)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(slas))
}

/// `POST /slas`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewSla>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  body.validate()?;
  let sla = store
    .create_sla(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  tracing::debug!(sla = %sla.name, priority = %sla.priority, "sla defined");
  Ok((StatusCode::CREATED, Json(sla)))
}

/// `GET /slas/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SlaDefinition>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let sla = store
    .get_sla(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("sla {id} not found")))?;
  Ok(Json(sla))
}

/// `PATCH /slas/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<SlaPatch>,
) -> Result<Json<SlaDefinition>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  patch.validate()?;
  let sla = store
    .update_sla(id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("sla {id} not found")))?;
  Ok(Json(sla))
}
