//! Ticket detail pane — right panel.

use chrono::{DateTime, Local, Utc};
use helpdesk_core::ticket::Ticket;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{priority_color, sla_color};
use crate::app::{App, Screen};

/// Render the detail pane for the ticket under the cursor.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let ticket = app.cursor_ticket();
  let title = ticket
    .map(|t| format!(" {} ", t.ticket_number))
    .unwrap_or_else(|| " Detail ".to_string());
  let border = if app.screen == Screen::TicketDetail {
    Color::Cyan
  } else {
    Color::DarkGray
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(ticket) = ticket else {
    f.render_widget(
      Paragraph::new("No tickets match.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let scroll = u16::try_from(app.detail_scroll).unwrap_or(u16::MAX);
  f.render_widget(
    Paragraph::new(lines(ticket))
      .wrap(Wrap { trim: false })
      .scroll((scroll, 0)),
    inner,
  );
}

fn lines(ticket: &Ticket) -> Vec<Line<'static>> {
  let mut out = vec![
    Line::from(Span::styled(
      ticket.title.clone(),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    field("status", ticket.status.to_string(), Color::White),
    field(
      "priority",
      ticket.priority.to_string(),
      priority_color(ticket.priority),
    ),
    field("type", ticket.ticket_type.to_string(), Color::White),
    field("sla", ticket.sla_status.to_string(), sla_color(ticket.sla_status)),
    field("category", ticket.category.clone().unwrap_or_else(|| "—".into()), Color::White),
    field("requester", ticket.requester.clone().unwrap_or_else(|| "—".into()), Color::White),
    field(
      "assignee",
      ticket
        .assignee_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unassigned".into()),
      Color::White,
    ),
    field("time spent", format!("{} min", ticket.time_spent), Color::White),
    Line::from(""),
    field("created", timestamp(Some(ticket.created_at)), Color::DarkGray),
    field("responded", timestamp(ticket.first_response_at), Color::DarkGray),
    field("resolved", timestamp(ticket.resolved_at), Color::DarkGray),
    field("updated", timestamp(Some(ticket.updated_at)), Color::DarkGray),
  ];

  if !ticket.description.is_empty() {
    out.push(Line::from(""));
    out.extend(ticket.description.lines().map(|l| Line::from(l.to_string())));
  }
  out
}

fn field(label: &'static str, value: String, color: Color) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<12}"),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ),
    Span::styled(value, Style::default().fg(color)),
  ])
}

fn timestamp(at: Option<DateTime<Utc>>) -> String {
  at.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
    .unwrap_or_else(|| "—".into())
}
