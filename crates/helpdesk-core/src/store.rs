//! The `DeskStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `helpdesk-store-sqlite`).
//! The REST layer depends on this abstraction, not on a concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  knowledge::{Article, ArticlePatch, ArticleSort, NewArticle},
  problem::{NewProblem, Problem, ProblemPatch, ProblemStatus},
  sla::{NewSla, SlaDefinition, SlaPatch},
  ticket::{NewTicket, Ticket, TicketPatch, TicketPriority, TicketStatus, TicketType},
};

/// Page size used when a query does not set `limit`.
pub const DEFAULT_LIMIT: usize = 100;

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`DeskStore::list_tickets`]. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct TicketQuery {
  /// Substring match over title, description and ticket number.
  pub text:           Option<String>,
  pub status:         Option<TicketStatus>,
  pub priority:       Option<TicketPriority>,
  pub ticket_type:    Option<TicketType>,
  pub assignee_id:    Option<Uuid>,
  pub created_after:  Option<DateTime<Utc>>,
  pub created_before: Option<DateTime<Utc>>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

/// Parameters for [`DeskStore::list_articles`].
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
  /// Substring match over title and content.
  pub text:     Option<String>,
  pub category: Option<String>,
  /// Only articles carrying this tag.
  pub tag:      Option<String>,
  pub sort:     ArticleSort,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

/// Parameters for [`DeskStore::list_problems`]. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct ProblemQuery {
  pub status:   Option<ProblemStatus>,
  pub priority: Option<TicketPriority>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a helpdesk storage backend.
///
/// Lookups and updates of an unknown id resolve to `Ok(None)`. Validation of
/// inputs is the caller's job; the store persists what it is given.
///
/// All methods return `Send` futures so the trait can be used behind `axum`
/// on a multi-threaded runtime.
pub trait DeskStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Tickets ───────────────────────────────────────────────────────────

  /// Persist a new ticket, assigning its id, number and timestamps.
  fn create_ticket(
    &self,
    input: NewTicket,
  ) -> impl Future<Output = Result<Ticket, Self::Error>> + Send + '_;

  fn get_ticket(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Ticket>, Self::Error>> + Send + '_;

  fn list_tickets<'a>(
    &'a self,
    query: &'a TicketQuery,
  ) -> impl Future<Output = Result<Vec<Ticket>, Self::Error>> + Send + 'a;

  /// Apply `patch` and return the updated ticket.
  fn update_ticket(
    &self,
    id: Uuid,
    patch: TicketPatch,
  ) -> impl Future<Output = Result<Option<Ticket>, Self::Error>> + Send + '_;

  // ── Knowledge base ────────────────────────────────────────────────────

  fn create_article(
    &self,
    input: NewArticle,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  fn get_article(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + '_;

  fn list_articles<'a>(
    &'a self,
    query: &'a ArticleQuery,
  ) -> impl Future<Output = Result<Vec<Article>, Self::Error>> + Send + 'a;

  fn update_article(
    &self,
    id: Uuid,
    patch: ArticlePatch,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + '_;

  /// Increment the view counter by one and return the article.
  fn record_view(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + '_;

  // ── SLA definitions ───────────────────────────────────────────────────

  fn create_sla(
    &self,
    input: NewSla,
  ) -> impl Future<Output = Result<SlaDefinition, Self::Error>> + Send + '_;

  fn get_sla(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<SlaDefinition>, Self::Error>> + Send + '_;

  /// All definitions ordered by priority, most severe first.
  fn list_slas(
    &self,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<SlaDefinition>, Self::Error>> + Send + '_;

  fn update_sla(
    &self,
    id: Uuid,
    patch: SlaPatch,
  ) -> impl Future<Output = Result<Option<SlaDefinition>, Self::Error>> + Send + '_;

  // ── Problems ──────────────────────────────────────────────────────────

  fn create_problem(
    &self,
    input: NewProblem,
  ) -> impl Future<Output = Result<Problem, Self::Error>> + Send + '_;

  fn get_problem(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Problem>, Self::Error>> + Send + '_;

  fn list_problems<'a>(
    &'a self,
    query: &'a ProblemQuery,
  ) -> impl Future<Output = Result<Vec<Problem>, Self::Error>> + Send + 'a;

  fn update_problem(
    &self,
    id: Uuid,
    patch: ProblemPatch,
  ) -> impl Future<Output = Result<Option<Problem>, Self::Error>> + Send + '_;
}
