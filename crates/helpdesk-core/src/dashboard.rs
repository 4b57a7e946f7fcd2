//! Dashboard aggregates derived from ticket and article listings.
//!
//! Everything here is a pure function over slices so the same figures can be
//! produced server-side or by a client holding a cached listing.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::{
  knowledge::Article,
  ticket::{Ticket, TicketPriority, TicketStatus},
};

// ─── View models ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
  pub status: TicketStatus,
  pub count:  usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityCount {
  pub priority: TicketPriority,
  pub count:    usize,
}

/// Activity for a single UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
  pub date:                 NaiveDate,
  /// Tickets opened on this day.
  pub created:              usize,
  /// Tickets whose resolution falls on this day.
  pub resolved:             usize,
  /// Mean time to resolve the tickets resolved on this day, one decimal.
  pub avg_resolution_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceFigures {
  pub total:      usize,
  pub compliant:  usize,
  pub breached:   usize,
  /// Rounded share of compliant tickets; `0` when there are none.
  pub percentage: u8,
}

impl ComplianceFigures {
  fn from_counts(total: usize, compliant: usize) -> Self {
    Self {
      total,
      compliant,
      breached: total - compliant,
      percentage: percentage(compliant, total),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityCompliance {
  pub priority: TicketPriority,
  #[serde(flatten)]
  pub figures:  ComplianceFigures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaCompliance {
  pub overall:     ComplianceFigures,
  /// One row per priority, lowest first, zero-filled.
  pub by_priority: Vec<PriorityCompliance>,
}

/// Open work and logged time for one assignee (`None` = unassigned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
  pub assignee_id:  Option<Uuid>,
  pub open_tickets: usize,
  pub time_spent:   u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeHighlights {
  pub most_viewed: Vec<Article>,
  pub most_recent: Vec<Article>,
}

/// Everything the landing dashboard shows, computed in one pass per figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
  pub as_of:                DateTime<Utc>,
  pub total_tickets:        usize,
  pub open_tickets:         usize,
  pub resolved_tickets:     usize,
  pub avg_resolution_hours: f64,
  pub by_status:            Vec<StatusCount>,
  pub by_priority:          Vec<PriorityCount>,
  pub trend:                Vec<DailyBucket>,
  pub sla_compliance:       SlaCompliance,
}

impl DashboardSummary {
  /// Build the summary with a trend covering the `days` days ending on
  /// `as_of`'s date.
  pub fn compute(tickets: &[Ticket], as_of: DateTime<Utc>, days: u32) -> Self {
    let open_tickets = tickets.iter().filter(|t| !t.status.is_closed()).count();
    Self {
      as_of,
      total_tickets: tickets.len(),
      open_tickets,
      resolved_tickets: tickets.len() - open_tickets,
      avg_resolution_hours: average_resolution_hours(tickets.iter()),
      by_status: status_breakdown(tickets),
      by_priority: priority_breakdown(tickets),
      trend: daily_trend(tickets, as_of.date_naive(), days),
      sla_compliance: sla_compliance(tickets),
    }
  }
}

// ─── Aggregations ────────────────────────────────────────────────────────────

/// Ticket count for every status, in declaration order.
pub fn status_breakdown(tickets: &[Ticket]) -> Vec<StatusCount> {
  TicketStatus::iter()
    .map(|status| StatusCount {
      status,
      count: tickets.iter().filter(|t| t.status == status).count(),
    })
    .collect()
}

/// Ticket count for every priority, lowest first.
pub fn priority_breakdown(tickets: &[Ticket]) -> Vec<PriorityCount> {
  TicketPriority::iter()
    .map(|priority| PriorityCount {
      priority,
      count: tickets.iter().filter(|t| t.priority == priority).count(),
    })
    .collect()
}

/// One bucket per day from `end - days + 1` through `end`, oldest first.
pub fn daily_trend(tickets: &[Ticket], end: NaiveDate, days: u32) -> Vec<DailyBucket> {
  (0..i64::from(days))
    .rev()
    .map(|back| {
      let date = end - Duration::days(back);
      let created = tickets
        .iter()
        .filter(|t| t.created_at.date_naive() == date)
        .count();
      let resolved_that_day: Vec<&Ticket> = tickets
        .iter()
        .filter(|t| t.resolved_at.is_some_and(|at| at.date_naive() == date))
        .collect();
      DailyBucket {
        date,
        created,
        resolved: resolved_that_day.len(),
        avg_resolution_hours: average_resolution_hours(resolved_that_day.into_iter()),
      }
    })
    .collect()
}

/// Compliance per priority plus an overall row.
pub fn sla_compliance(tickets: &[Ticket]) -> SlaCompliance {
  let by_priority = TicketPriority::iter()
    .map(|priority| {
      let mut total = 0;
      let mut compliant = 0;
      for t in tickets.iter().filter(|t| t.priority == priority) {
        total += 1;
        if t.sla_status.is_compliant() {
          compliant += 1;
        }
      }
      PriorityCompliance {
        priority,
        figures: ComplianceFigures::from_counts(total, compliant),
      }
    })
    .collect();

  let compliant = tickets.iter().filter(|t| t.sla_status.is_compliant()).count();
  SlaCompliance {
    overall: ComplianceFigures::from_counts(tickets.len(), compliant),
    by_priority,
  }
}

/// Open tickets and logged minutes per assignee, busiest first.
pub fn workload(tickets: &[Ticket]) -> Vec<Workload> {
  let mut by_assignee: HashMap<Option<Uuid>, Workload> = HashMap::new();
  for t in tickets {
    let entry = by_assignee.entry(t.assignee_id).or_insert(Workload {
      assignee_id:  t.assignee_id,
      open_tickets: 0,
      time_spent:   0,
    });
    if !t.status.is_closed() {
      entry.open_tickets += 1;
    }
    entry.time_spent += u64::from(t.time_spent);
  }

  let mut rows: Vec<Workload> = by_assignee.into_values().collect();
  rows.sort_by(|a, b| {
    b.open_tickets
      .cmp(&a.open_tickets)
      .then(b.time_spent.cmp(&a.time_spent))
      .then(a.assignee_id.cmp(&b.assignee_id))
  });
  rows
}

/// The `n` most viewed articles; ties go to the most recently updated.
pub fn most_viewed(articles: &[Article], n: usize) -> Vec<Article> {
  let mut sorted = articles.to_vec();
  sorted.sort_by(|a, b| {
    b.views
      .cmp(&a.views)
      .then(b.updated_at.cmp(&a.updated_at))
      .then(a.article_id.cmp(&b.article_id))
  });
  sorted.truncate(n);
  sorted
}

/// The `n` most recently updated articles.
pub fn most_recent(articles: &[Article], n: usize) -> Vec<Article> {
  let mut sorted = articles.to_vec();
  sorted.sort_by(|a, b| {
    b.updated_at
      .cmp(&a.updated_at)
      .then(a.article_id.cmp(&b.article_id))
  });
  sorted.truncate(n);
  sorted
}

pub fn knowledge_highlights(articles: &[Article], n: usize) -> KnowledgeHighlights {
  KnowledgeHighlights {
    most_viewed: most_viewed(articles, n),
    most_recent: most_recent(articles, n),
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn percentage(part: usize, total: usize) -> u8 {
  if total == 0 {
    return 0;
  }
  (part as f64 * 100.0 / total as f64).round() as u8
}

fn average_resolution_hours<'a>(tickets: impl Iterator<Item = &'a Ticket>) -> f64 {
  let (sum, count) = tickets
    .filter_map(Ticket::resolution_minutes)
    .fold((0i64, 0i64), |(sum, count), m| (sum + m, count + 1));
  if count == 0 {
    return 0.0;
  }
  let hours = sum as f64 / count as f64 / 60.0;
  (hours * 10.0).round() / 10.0
}
