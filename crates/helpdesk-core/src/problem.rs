//! Problems: the underlying causes behind one or more incidents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Result, error::require_text, nullable, ticket::TicketPriority};

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
pub enum ProblemStatus {
  #[default]
  Open,
  Investigating,
  /// Root cause identified and a workaround documented.
  KnownError,
  Resolved,
  Closed,
}

/// Breadth of the disruption caused by a problem.
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
pub enum Impact {
  Low,
  #[default]
  Medium,
  High,
  Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
  pub problem_id:     Uuid,
  /// Human-facing number, e.g. `PRB-000007`. Assigned by the store.
  pub problem_number: String,
  pub title:          String,
  pub description:    String,
  pub status:         ProblemStatus,
  pub priority:       TicketPriority,
  pub category:       Option<String>,
  pub impact:         Impact,
  pub root_cause:     Option<String>,
  pub workaround:     Option<String>,
  pub resolution:     Option<String>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl Problem {
  pub fn format_number(seq: i64) -> String { format!("PRB-{seq:06}") }
}

/// Input to [`crate::store::DeskStore::create_problem`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProblem {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub status:      ProblemStatus,
  #[serde(default)]
  pub priority:    TicketPriority,
  pub category:    Option<String>,
  #[serde(default)]
  pub impact:      Impact,
  pub root_cause:  Option<String>,
  pub workaround:  Option<String>,
}

impl NewProblem {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), ..Default::default() }
  }

  pub fn validate(&self) -> Result<()> { require_text("title", &self.title) }

  pub fn into_problem(
    self,
    problem_id: Uuid,
    problem_number: String,
    now: DateTime<Utc>,
  ) -> Problem {
    Problem {
      problem_id,
      problem_number,
      title: self.title,
      description: self.description,
      status: self.status,
      priority: self.priority,
      category: self.category,
      impact: self.impact,
      root_cause: self.root_cause,
      workaround: self.workaround,
      resolution: None,
      created_at: now,
      updated_at: now,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProblemPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub status:      Option<ProblemStatus>,
  pub priority:    Option<TicketPriority>,
  pub impact:      Option<Impact>,
  #[serde(default, deserialize_with = "nullable::deserialize")]
  pub category:    Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable::deserialize")]
  pub root_cause:  Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable::deserialize")]
  pub workaround:  Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable::deserialize")]
  pub resolution:  Option<Option<String>>,
}

impl ProblemPatch {
  pub fn validate(&self) -> Result<()> {
    if let Some(title) = &self.title {
      require_text("title", title)?;
    }
    Ok(())
  }

  pub fn apply(self, problem: &mut Problem, now: DateTime<Utc>) {
    if let Some(title) = self.title {
      problem.title = title;
    }
    if let Some(description) = self.description {
      problem.description = description;
    }
    if let Some(status) = self.status {
      problem.status = status;
    }
    if let Some(priority) = self.priority {
      problem.priority = priority;
    }
    if let Some(impact) = self.impact {
      problem.impact = impact;
    }
    if let Some(category) = self.category {
      problem.category = category;
    }
    if let Some(root_cause) = self.root_cause {
      problem.root_cause = root_cause;
    }
    if let Some(workaround) = self.workaround {
      problem.workaround = workaround;
    }
    if let Some(resolution) = self.resolution {
      problem.resolution = resolution;
    }
    problem.updated_at = now;
  }
}
