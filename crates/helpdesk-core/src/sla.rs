//! Service level agreements and their evaluation against tickets.
//!
//! An SLA carries two targets in minutes: time to first response and time to
//! resolution. When `business_hours_only` is set, only minutes inside
//! [`BusinessHours`] count towards either target.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  error::require_text,
  ticket::{SlaStatus, Ticket, TicketPriority},
};

/// Share of the resolution target after which an open ticket is `at_risk`.
pub const AT_RISK_PERCENT: i64 = 80;

// ─── Definition ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaDefinition {
  pub sla_id:              Uuid,
  pub name:                String,
  pub priority:            TicketPriority,
  /// Minutes allowed until first response.
  pub response_time:       u32,
  /// Minutes allowed until resolution.
  pub resolution_time:     u32,
  pub business_hours_only: bool,
  pub active:              bool,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

/// Input to [`crate::store::DeskStore::create_sla`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewSla {
  pub name:                String,
  pub priority:            TicketPriority,
  pub response_time:       u32,
  pub resolution_time:     u32,
  #[serde(default)]
  pub business_hours_only: bool,
  #[serde(default = "default_active")]
  pub active:              bool,
}

fn default_active() -> bool { true }

impl NewSla {
  pub fn new(
    name: impl Into<String>,
    priority: TicketPriority,
    response_time: u32,
    resolution_time: u32,
  ) -> Self {
    Self {
      name: name.into(),
      priority,
      response_time,
      resolution_time,
      business_hours_only: false,
      active: true,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require_text("name", &self.name)?;
    require_positive("response_time", self.response_time)?;
    require_positive("resolution_time", self.resolution_time)
  }

  pub fn into_definition(self, sla_id: Uuid, now: DateTime<Utc>) -> SlaDefinition {
    SlaDefinition {
      sla_id,
      name: self.name,
      priority: self.priority,
      response_time: self.response_time,
      resolution_time: self.resolution_time,
      business_hours_only: self.business_hours_only,
      active: self.active,
      created_at: now,
      updated_at: now,
    }
  }

  /// One definition per priority, used to seed an empty store.
  pub fn defaults() -> Vec<Self> {
    vec![
      Self::new("Critical", TicketPriority::Critical, 15, 4 * 60),
      Self::new("High", TicketPriority::High, 60, 8 * 60),
      Self::new("Medium", TicketPriority::Medium, 4 * 60, 24 * 60),
      Self::new("Low", TicketPriority::Low, 8 * 60, 72 * 60),
    ]
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlaPatch {
  pub name:                Option<String>,
  pub priority:            Option<TicketPriority>,
  pub response_time:       Option<u32>,
  pub resolution_time:     Option<u32>,
  pub business_hours_only: Option<bool>,
  pub active:              Option<bool>,
}

impl SlaPatch {
  pub fn validate(&self) -> Result<()> {
    if let Some(name) = &self.name {
      require_text("name", name)?;
    }
    if let Some(minutes) = self.response_time {
      require_positive("response_time", minutes)?;
    }
    if let Some(minutes) = self.resolution_time {
      require_positive("resolution_time", minutes)?;
    }
    Ok(())
  }

  pub fn apply(self, sla: &mut SlaDefinition, now: DateTime<Utc>) {
    if let Some(name) = self.name {
      sla.name = name;
    }
    if let Some(priority) = self.priority {
      sla.priority = priority;
    }
    if let Some(minutes) = self.response_time {
      sla.response_time = minutes;
    }
    if let Some(minutes) = self.resolution_time {
      sla.resolution_time = minutes;
    }
    if let Some(flag) = self.business_hours_only {
      sla.business_hours_only = flag;
    }
    if let Some(flag) = self.active {
      sla.active = flag;
    }
    sla.updated_at = now;
  }
}

fn require_positive(field: &'static str, minutes: u32) -> Result<()> {
  if minutes == 0 {
    return Err(Error::ZeroDuration { field });
  }
  Ok(())
}

// ─── Business hours ──────────────────────────────────────────────────────────

/// The working window: Monday to Friday, 09:00 to 17:00 UTC.
pub struct BusinessHours;

impl BusinessHours {
  const OPEN: u32 = 9;
  const CLOSE: u32 = 17;

  fn is_workday(day: Weekday) -> bool {
    !matches!(day, Weekday::Sat | Weekday::Sun)
  }

  /// Minutes between `start` and `end` that fall inside business hours.
  pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    if end <= start {
      return 0;
    }
    let open = NaiveTime::from_hms_opt(Self::OPEN, 0, 0).unwrap_or_default();
    let close = NaiveTime::from_hms_opt(Self::CLOSE, 0, 0).unwrap_or_default();

    let mut total = 0;
    let mut day = start.date_naive();
    let last = end.date_naive();
    while day <= last {
      if Self::is_workday(day.weekday()) {
        let window_start = day.and_time(open).and_utc().max(start);
        let window_end = day.and_time(close).and_utc().min(end);
        if window_end > window_start {
          total += (window_end - window_start).num_minutes();
        }
      }
      day += Duration::days(1);
    }
    total
  }
}

/// Minutes elapsed between two instants under the given counting rule.
pub fn elapsed_minutes(
  start: DateTime<Utc>,
  end: DateTime<Utc>,
  business_hours_only: bool,
) -> i64 {
  if business_hours_only {
    BusinessHours::minutes_between(start, end)
  } else {
    (end - start).num_minutes().max(0)
  }
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

/// Judge `ticket` against `sla` as of `now`.
pub fn evaluate(ticket: &Ticket, sla: &SlaDefinition, now: DateTime<Utc>) -> SlaStatus {
  let elapsed = |end| elapsed_minutes(ticket.created_at, end, sla.business_hours_only);
  let resolution_target = i64::from(sla.resolution_time);

  if ticket.status.is_closed() {
    let resolved_at = ticket.resolved_at.unwrap_or(ticket.updated_at);
    return if elapsed(resolved_at) <= resolution_target {
      SlaStatus::Met
    } else {
      SlaStatus::Breached
    };
  }

  let open_for = elapsed(now);
  if open_for > resolution_target {
    return SlaStatus::Breached;
  }
  // A response after the target misses it just as no response does.
  let response_missed = match ticket.first_response_at {
    Some(at) => elapsed(at) > i64::from(sla.response_time),
    None => open_for > i64::from(sla.response_time),
  };
  if response_missed {
    return SlaStatus::Breached;
  }
  if open_for * 100 >= resolution_target * AT_RISK_PERCENT {
    return SlaStatus::AtRisk;
  }
  SlaStatus::OnTrack
}

/// The definition governing `priority`: the strictest active one.
pub fn applicable(slas: &[SlaDefinition], priority: TicketPriority) -> Option<&SlaDefinition> {
  slas
    .iter()
    .filter(|s| s.active && s.priority == priority)
    .min_by_key(|s| (s.resolution_time, s.response_time))
}

/// Re-evaluate every ticket that has an applicable definition. Tickets whose
/// priority has no active SLA keep their stored status.
pub fn refresh(tickets: &mut [Ticket], slas: &[SlaDefinition], now: DateTime<Utc>) {
  for ticket in tickets {
    if let Some(sla) = applicable(slas, ticket.priority) {
      ticket.sla_status = evaluate(ticket, sla, now);
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::ticket::{NewTicket, TicketPatch, TicketStatus};

  // 2024-03-04 is a Monday.
  fn monday(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
  }

  fn sla(response: u32, resolution: u32) -> SlaDefinition {
    NewSla::new("Test", TicketPriority::Medium, response, resolution)
      .into_definition(Uuid::new_v4(), monday(0, 0))
  }

  fn ticket_at(created: DateTime<Utc>) -> Ticket {
    NewTicket::new("Laptop will not boot").into_ticket(
      Uuid::new_v4(),
      Ticket::format_number(1),
      created,
    )
  }

  #[test]
  fn business_minutes_skip_nights_and_weekends() {
    // Friday 16:00 to Monday 10:00 → 60 + 60 minutes.
    let friday = Utc.with_ymd_and_hms(2024, 3, 8, 16, 0, 0).unwrap();
    let next_monday = Utc.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap();
    assert_eq!(BusinessHours::minutes_between(friday, next_monday), 120);
  }

  #[test]
  fn business_minutes_within_a_day() {
    assert_eq!(BusinessHours::minutes_between(monday(7, 0), monday(9, 30)), 30);
    assert_eq!(BusinessHours::minutes_between(monday(18, 0), monday(20, 0)), 0);
    assert_eq!(BusinessHours::minutes_between(monday(12, 0), monday(11, 0)), 0);
  }

  #[test]
  fn wall_clock_elapsed_ignores_calendar() {
    assert_eq!(elapsed_minutes(monday(18, 0), monday(20, 0), false), 120);
  }

  #[test]
  fn fresh_ticket_is_on_track() {
    let t = ticket_at(monday(9, 0));
    assert_eq!(evaluate(&t, &sla(60, 600), monday(9, 10)), SlaStatus::OnTrack);
  }

  #[test]
  fn missed_first_response_breaches() {
    let t = ticket_at(monday(9, 0));
    assert_eq!(evaluate(&t, &sla(30, 600), monday(9, 45)), SlaStatus::Breached);
  }

  #[test]
  fn first_response_counts_only_when_in_time() {
    let mut prompt = ticket_at(monday(9, 0));
    TicketPatch { status: Some(TicketStatus::InProgress), ..Default::default() }
      .apply(&mut prompt, monday(9, 20));
    assert_eq!(evaluate(&prompt, &sla(30, 600), monday(10, 0)), SlaStatus::OnTrack);

    // Answered, but 15 minutes past the response target.
    let mut late = ticket_at(monday(9, 0));
    TicketPatch { status: Some(TicketStatus::InProgress), ..Default::default() }
      .apply(&mut late, monday(9, 45));
    assert_eq!(evaluate(&late, &sla(30, 600), monday(10, 0)), SlaStatus::Breached);
  }

  #[test]
  fn late_open_ticket_is_at_risk() {
    let mut t = ticket_at(monday(9, 0));
    TicketPatch { status: Some(TicketStatus::InProgress), ..Default::default() }
      .apply(&mut t, monday(9, 5));
    // 85 of 100 minutes used.
    assert_eq!(evaluate(&t, &sla(30, 100), monday(10, 25)), SlaStatus::AtRisk);
    assert_eq!(evaluate(&t, &sla(30, 100), monday(10, 41)), SlaStatus::Breached);
  }

  #[test]
  fn resolved_ticket_is_met_or_breached() {
    let mut t = ticket_at(monday(9, 0));
    TicketPatch { status: Some(TicketStatus::Resolved), ..Default::default() }
      .apply(&mut t, monday(10, 0));
    assert_eq!(evaluate(&t, &sla(30, 60), monday(23, 0)), SlaStatus::Met);
    assert_eq!(evaluate(&t, &sla(30, 59), monday(23, 0)), SlaStatus::Breached);
  }

  #[test]
  fn business_hours_pause_the_clock() {
    let mut definition = sla(60, 120);
    definition.business_hours_only = true;
    // Created after close; nothing counts until Tuesday 09:00.
    let t = ticket_at(monday(17, 30));
    let tuesday_early = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
    assert_eq!(evaluate(&t, &definition, tuesday_early), SlaStatus::OnTrack);
  }

  #[test]
  fn applicable_prefers_strictest_active() {
    let mut loose = sla(60, 600);
    let strict = sla(30, 300);
    let mut inactive = sla(5, 10);
    inactive.active = false;
    loose.name = "loose".into();

    let slas = vec![loose, strict.clone(), inactive];
    assert_eq!(applicable(&slas, TicketPriority::Medium), Some(&strict));
    assert_eq!(applicable(&slas, TicketPriority::High), None);
  }

  #[test]
  fn refresh_leaves_uncovered_priorities_alone() {
    let mut covered = ticket_at(monday(9, 0));
    let mut uncovered = ticket_at(monday(9, 0));
    uncovered.priority = TicketPriority::Low;
    uncovered.sla_status = SlaStatus::AtRisk;
    covered.sla_status = SlaStatus::AtRisk;

    let mut tickets = vec![covered, uncovered];
    refresh(&mut tickets, &[sla(60, 600)], monday(9, 1));
    assert_eq!(tickets[0].sla_status, SlaStatus::OnTrack);
    assert_eq!(tickets[1].sla_status, SlaStatus::AtRisk);
  }

  #[test]
  fn zero_targets_are_rejected() {
    assert!(NewSla::new("x", TicketPriority::Low, 0, 10).validate().is_err());
    let patch = SlaPatch { resolution_time: Some(0), ..Default::default() };
    assert!(patch.validate().is_err());
  }
}
