//! Handlers for `/problems` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/problems` | Optional `status`, `priority`, `limit`, `offset` |
//! | `POST`  | `/problems` | Body: [`NewProblem`]; returns 201 |
//! | `GET`   | `/problems/{id}` | |
//! | `PATCH` | `/problems/{id}` | Body: [`ProblemPatch`] |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use helpdesk_core::{
  problem::{NewProblem, Problem, ProblemPatch, ProblemStatus},
  store::{DeskStore, ProblemQuery},
  ticket::TicketPriority,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub status:   Option<ProblemStatus>,
  pub priority: Option<TicketPriority>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

/// `GET /problems[?status=known_error]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Problem>>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = ProblemQuery {
    status:   params.status,
    priority: params.priority,
    limit:    params.limit,
    offset:   params.offset,
  };
  let problems = store
    .list_problems(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(problems))
}

/// `POST /problems`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewProblem>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  body.validate()?;
  let problem = store
    .create_problem(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(problem)))
}

/// `GET /problems/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Problem>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let problem = store
    .get_problem(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("problem {id} not found")))?;
  Ok(Json(problem))
}

/// `PATCH /problems/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<ProblemPatch>,
) -> Result<Json<Problem>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  patch.validate()?;
  let problem = store
    .update_problem(id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("problem {id} not found")))?;
  Ok(Json(problem))
}
