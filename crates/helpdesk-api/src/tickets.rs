//! Handlers for `/tickets` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/tickets` | Filters: `q`, `status`, `priority`, `type`, `assignee_id`, `created_after`, `created_before`, `limit`, `offset` |
//! | `POST`  | `/tickets` | Body: [`NewTicket`]; returns 201 + stored ticket |
//! | `GET`   | `/tickets/{id}` | 404 if not found |
//! | `PATCH` | `/tickets/{id}` | Body: [`TicketPatch`] |
//!
//! Every ticket leaving these handlers carries an SLA status evaluated at the
//! time of the request.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use helpdesk_core::{
  sla,
  store::{DeskStore, TicketQuery},
  ticket::{NewTicket, Ticket, TicketPatch, TicketPriority, TicketStatus, TicketType},
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
  /// Free-text search over title, description and ticket number.
  #[serde(alias = "search")]
  pub q:              Option<String>,
  pub status:         Option<TicketStatus>,
  pub priority:       Option<TicketPriority>,
  #[serde(rename = "type")]
  pub ticket_type:    Option<TicketType>,
  pub assignee_id:    Option<Uuid>,
  pub created_after:  Option<DateTime<Utc>>,
  pub created_before: Option<DateTime<Utc>>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

impl From<ListParams> for TicketQuery {
  fn from(p: ListParams) -> Self {
    TicketQuery {
      text:           p.q,
      status:         p.status,
      priority:       p.priority,
      ticket_type:    p.ticket_type,
      assignee_id:    p.assignee_id,
      created_after:  p.created_after,
      created_before: p.created_before,
      limit:          p.limit,
      offset:         p.offset,
    }
  }
}

/// `GET /tickets[?status=..&priority=..&q=..]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Ticket>>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = TicketQuery::from(params);
  let mut tickets = store
    .list_tickets(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let slas = store
    .list_slas(true)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  sla::refresh(&mut tickets, &slas, Utc::now());

  Ok(Json(tickets))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /tickets` — returns 201 + the stored [`Ticket`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewTicket>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  body.validate()?;
  let ticket = store
    .create_ticket(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  tracing::debug!(ticket = %ticket.ticket_number, "ticket opened");
  let ticket = settle_sla(store.as_ref(), ticket).await?;
  Ok((StatusCode::CREATED, Json(ticket)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /tickets/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut ticket = store
    .get_ticket(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("ticket {id} not found")))?;

  let slas = store
    .list_slas(true)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  sla::refresh(std::slice::from_mut(&mut ticket), &slas, Utc::now());

  Ok(Json(ticket))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /tickets/{id}` — status moves stamp response and resolution times.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<TicketPatch>,
) -> Result<Json<Ticket>, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  patch.validate()?;
  let ticket = store
    .update_ticket(id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("ticket {id} not found")))?;
  let ticket = settle_sla(store.as_ref(), ticket).await?;
  Ok(Json(ticket))
}

// ─── SLA ──────────────────────────────────────────────────────────────────────

/// Evaluate `ticket` against the active definitions and persist the status
/// if it moved.
async fn settle_sla<S>(store: &S, ticket: Ticket) -> Result<Ticket, ApiError>
where
  S: DeskStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let slas = store
    .list_slas(true)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let Some(definition) = sla::applicable(&slas, ticket.priority) else {
    return Ok(ticket);
  };

  let status = sla::evaluate(&ticket, definition, Utc::now());
  if status == ticket.sla_status {
    return Ok(ticket);
  }

  let patch = TicketPatch { sla_status: Some(status), ..Default::default() };
  let id = ticket.ticket_id;
  let updated = store
    .update_ticket(id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(updated.unwrap_or(ticket))
}
