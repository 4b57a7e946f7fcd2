//! Tickets: the unit of support work tracked by the desk.
//!
//! Status changes are never rejected. A patch only records the side effects a
//! status move implies (resolution and first-response timestamps).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Result, error::require_text, nullable};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Where a ticket sits in its working life.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketStatus {
  #[default]
  Open,
  InProgress,
  OnHold,
  Resolved,
  Closed,
}

impl TicketStatus {
  /// `resolved` and `closed` both count as finished work.
  pub fn is_closed(self) -> bool { matches!(self, Self::Resolved | Self::Closed) }
}

/// Urgency of a ticket; declaration order is ascending severity.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketPriority {
  Low,
  #[default]
  Medium,
  High,
  Critical,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketType {
  #[default]
  Incident,
  ServiceRequest,
  Change,
  Problem,
  Question,
}

/// Standing of a ticket against its service level agreement.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SlaStatus {
  #[default]
  OnTrack,
  AtRisk,
  Breached,
  Met,
}

impl SlaStatus {
  pub fn is_compliant(self) -> bool { !matches!(self, Self::Breached) }
}

// ─── Ticket ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
  pub ticket_id:         Uuid,
  /// Human-facing number, e.g. `TKT-000042`. Assigned by the store.
  pub ticket_number:     String,
  pub title:             String,
  pub description:       String,
  pub status:            TicketStatus,
  pub priority:          TicketPriority,
  pub ticket_type:       TicketType,
  pub category:          Option<String>,
  pub requester:         Option<String>,
  pub assignee_id:       Option<Uuid>,
  /// Minutes of work logged against the ticket.
  pub time_spent:        u32,
  pub sla_status:        SlaStatus,
  pub first_response_at: Option<DateTime<Utc>>,
  pub resolved_at:       Option<DateTime<Utc>>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl Ticket {
  /// Minutes from creation to resolution, if the ticket has been resolved.
  pub fn resolution_minutes(&self) -> Option<i64> {
    self
      .resolved_at
      .map(|at| (at - self.created_at).num_minutes().max(0))
  }

  /// Format a store sequence value as a ticket number.
  pub fn format_number(seq: i64) -> String { format!("TKT-{seq:06}") }
}

// ─── NewTicket ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::DeskStore::create_ticket`].
///
/// Ids, numbers and timestamps are assigned by the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTicket {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub status:      TicketStatus,
  #[serde(default)]
  pub priority:    TicketPriority,
  #[serde(default)]
  pub ticket_type: TicketType,
  pub category:    Option<String>,
  pub requester:   Option<String>,
  pub assignee_id: Option<Uuid>,
  #[serde(default)]
  pub time_spent:  u32,
  #[serde(default)]
  pub sla_status:  SlaStatus,
}

impl NewTicket {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), ..Default::default() }
  }

  pub fn validate(&self) -> Result<()> { require_text("title", &self.title) }

  /// Build the stored ticket. Tickets created in a closed state are stamped
  /// as resolved at creation time.
  pub fn into_ticket(
    self,
    ticket_id: Uuid,
    ticket_number: String,
    now: DateTime<Utc>,
  ) -> Ticket {
    let first_response_at = (self.status != TicketStatus::Open
      || self.assignee_id.is_some())
    .then_some(now);
    Ticket {
      ticket_id,
      ticket_number,
      title: self.title,
      description: self.description,
      status: self.status,
      priority: self.priority,
      ticket_type: self.ticket_type,
      category: self.category,
      requester: self.requester,
      assignee_id: self.assignee_id,
      time_spent: self.time_spent,
      sla_status: self.sla_status,
      first_response_at,
      resolved_at: self.status.is_closed().then_some(now),
      created_at: now,
      updated_at: now,
    }
  }
}

// ─── TicketPatch ─────────────────────────────────────────────────────────────

/// A partial update. Absent fields are left untouched; `category` and
/// `assignee_id` accept an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketPatch {
  pub title:          Option<String>,
  pub description:    Option<String>,
  pub status:         Option<TicketStatus>,
  pub priority:       Option<TicketPriority>,
  pub ticket_type:    Option<TicketType>,
  #[serde(default, deserialize_with = "nullable::deserialize")]
  pub category:       Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable::deserialize")]
  pub requester:      Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable::deserialize")]
  pub assignee_id:    Option<Option<Uuid>>,
  /// Replace the logged time outright.
  pub time_spent:     Option<u32>,
  /// Add minutes to the logged time; applied after `time_spent`.
  pub add_time_spent: Option<u32>,
  pub sla_status:     Option<SlaStatus>,
}

impl TicketPatch {
  pub fn validate(&self) -> Result<()> {
    if let Some(title) = &self.title {
      require_text("title", title)?;
    }
    Ok(())
  }

  /// Apply the patch to `ticket` as of `now`.
  pub fn apply(self, ticket: &mut Ticket, now: DateTime<Utc>) {
    if let Some(title) = self.title {
      ticket.title = title;
    }
    if let Some(description) = self.description {
      ticket.description = description;
    }
    if let Some(priority) = self.priority {
      ticket.priority = priority;
    }
    if let Some(ticket_type) = self.ticket_type {
      ticket.ticket_type = ticket_type;
    }
    if let Some(category) = self.category {
      ticket.category = category;
    }
    if let Some(requester) = self.requester {
      ticket.requester = requester;
    }
    if let Some(assignee) = self.assignee_id {
      if assignee.is_some() && ticket.first_response_at.is_none() {
        ticket.first_response_at = Some(now);
      }
      ticket.assignee_id = assignee;
    }
    if let Some(minutes) = self.time_spent {
      ticket.time_spent = minutes;
    }
    if let Some(minutes) = self.add_time_spent {
      ticket.time_spent = ticket.time_spent.saturating_add(minutes);
    }
    if let Some(sla_status) = self.sla_status {
      ticket.sla_status = sla_status;
    }
    if let Some(status) = self.status {
      let previous = ticket.status;
      if previous == TicketStatus::Open
        && status != TicketStatus::Open
        && ticket.first_response_at.is_none()
      {
        ticket.first_response_at = Some(now);
      }
      match (previous.is_closed(), status.is_closed()) {
        (false, true) => {
          ticket.resolved_at.get_or_insert(now);
        }
        (true, false) => ticket.resolved_at = None,
        _ => {}
      }
      ticket.status = status;
    }
    ticket.updated_at = now;
  }
}
