//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 strings (microseconds, `Z` suffix) so
//! that text comparison in SQL matches chronological order. Enumerations are
//! stored as their snake_case names. UUIDs are hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use helpdesk_core::{
  knowledge::Article,
  problem::Problem,
  sla::SlaDefinition,
  ticket::Ticket,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

/// Parse a snake_case enumeration column.
pub fn decode_enum<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| {
    Error::Core(helpdesk_core::Error::UnknownVariant {
      kind,
      value: s.to_owned(),
    })
  })
}

fn decode_u32(column: &'static str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

fn decode_u64(column: &'static str, value: i64) -> Result<u64> {
  u64::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawTicket::from_row`].
pub const TICKET_COLUMNS: &str = "ticket_id, ticket_number, title, description, \
   status, priority, ticket_type, category, requester, assignee_id, time_spent, \
   sla_status, first_response_at, resolved_at, created_at, updated_at";

/// Raw values read directly from a `tickets` row.
pub struct RawTicket {
  pub ticket_id:         String,
  pub ticket_number:     String,
  pub title:             String,
  pub description:       String,
  pub status:            String,
  pub priority:          String,
  pub ticket_type:       String,
  pub category:          Option<String>,
  pub requester:         Option<String>,
  pub assignee_id:       Option<String>,
  pub time_spent:        i64,
  pub sla_status:        String,
  pub first_response_at: Option<String>,
  pub resolved_at:       Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawTicket {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      ticket_id:         row.get(0)?,
      ticket_number:     row.get(1)?,
      title:             row.get(2)?,
      description:       row.get(3)?,
      status:            row.get(4)?,
      priority:          row.get(5)?,
      ticket_type:       row.get(6)?,
      category:          row.get(7)?,
      requester:         row.get(8)?,
      assignee_id:       row.get(9)?,
      time_spent:        row.get(10)?,
      sla_status:        row.get(11)?,
      first_response_at: row.get(12)?,
      resolved_at:       row.get(13)?,
      created_at:        row.get(14)?,
      updated_at:        row.get(15)?,
    })
  }

  pub fn into_ticket(self) -> Result<Ticket> {
    Ok(Ticket {
      ticket_id:         decode_uuid(&self.ticket_id)?,
      ticket_number:     self.ticket_number,
      title:             self.title,
      description:       self.description,
      status:            decode_enum("ticket status", &self.status)?,
      priority:          decode_enum("priority", &self.priority)?,
      ticket_type:       decode_enum("ticket type", &self.ticket_type)?,
      category:          self.category,
      requester:         self.requester,
      assignee_id:       decode_opt_uuid(self.assignee_id)?,
      time_spent:        decode_u32("time_spent", self.time_spent)?,
      sla_status:        decode_enum("sla status", &self.sla_status)?,
      first_response_at: decode_opt_dt(self.first_response_at)?,
      resolved_at:       decode_opt_dt(self.resolved_at)?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

pub const ARTICLE_COLUMNS: &str =
  "article_id, title, content, category, tags, views, author, created_at, updated_at";

pub struct RawArticle {
  pub article_id: String,
  pub title:      String,
  pub content:    String,
  pub category:   String,
  pub tags:       String,
  pub views:      i64,
  pub author:     Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawArticle {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      article_id: row.get(0)?,
      title:      row.get(1)?,
      content:    row.get(2)?,
      category:   row.get(3)?,
      tags:       row.get(4)?,
      views:      row.get(5)?,
      author:     row.get(6)?,
      created_at: row.get(7)?,
      updated_at: row.get(8)?,
    })
  }

  pub fn into_article(self) -> Result<Article> {
    Ok(Article {
      article_id: decode_uuid(&self.article_id)?,
      title:      self.title,
      content:    self.content,
      category:   self.category,
      tags:       decode_tags(&self.tags)?,
      views:      decode_u64("views", self.views)?,
      author:     self.author,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const SLA_COLUMNS: &str = "sla_id, name, priority, response_time, resolution_time, \
   business_hours_only, active, created_at, updated_at";

pub struct RawSla {
  pub sla_id:              String,
  pub name:                String,
  pub priority:            String,
  pub response_time:       i64,
  pub resolution_time:     i64,
  pub business_hours_only: bool,
  pub active:              bool,
  pub created_at:          String,
  pub updated_at:          String,
}

impl RawSla {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      sla_id:              row.get(0)?,
      name:                row.get(1)?,
      priority:            row.get(2)?,
      response_time:       row.get(3)?,
      resolution_time:     row.get(4)?,
      business_hours_only: row.get(5)?,
      active:              row.get(6)?,
      created_at:          row.get(7)?,
      updated_at:          row.get(8)?,
    })
  }

  pub fn into_sla(self) -> Result<SlaDefinition> {
    Ok(SlaDefinition {
      sla_id:              decode_uuid(&self.sla_id)?,
      name:                self.name,
      priority:            decode_enum("priority", &self.priority)?,
      response_time:       decode_u32("response_time", self.response_time)?,
      resolution_time:     decode_u32("resolution_time", self.resolution_time)?,
      business_hours_only: self.business_hours_only,
      active:              self.active,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
    })
  }
}

pub const PROBLEM_COLUMNS: &str = "problem_id, problem_number, title, description, \
   status, priority, category, impact, root_cause, workaround, resolution, \
   created_at, updated_at";

pub struct RawProblem {
  pub problem_id:     String,
  pub problem_number: String,
  pub title:          String,
  pub description:    String,
  pub status:         String,
  pub priority:       String,
  pub category:       Option<String>,
  pub impact:         String,
  pub root_cause:     Option<String>,
  pub workaround:     Option<String>,
  pub resolution:     Option<String>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawProblem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      problem_id:     row.get(0)?,
      problem_number: row.get(1)?,
      title:          row.get(2)?,
      description:    row.get(3)?,
      status:         row.get(4)?,
      priority:       row.get(5)?,
      category:       row.get(6)?,
      impact:         row.get(7)?,
      root_cause:     row.get(8)?,
      workaround:     row.get(9)?,
      resolution:     row.get(10)?,
      created_at:     row.get(11)?,
      updated_at:     row.get(12)?,
    })
  }

  pub fn into_problem(self) -> Result<Problem> {
    Ok(Problem {
      problem_id:     decode_uuid(&self.problem_id)?,
      problem_number: self.problem_number,
      title:          self.title,
      description:    self.description,
      status:         decode_enum("problem status", &self.status)?,
      priority:       decode_enum("priority", &self.priority)?,
      category:       self.category,
      impact:         decode_enum("impact", &self.impact)?,
      root_cause:     self.root_cause,
      workaround:     self.workaround,
      resolution:     self.resolution,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}
