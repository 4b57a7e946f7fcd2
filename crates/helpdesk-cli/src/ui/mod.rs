//! TUI rendering — orchestrates all panes.

pub mod dashboard;
pub mod knowledge;
pub mod ticket_detail;
pub mod ticket_list;

use chrono::Local;
use helpdesk_core::ticket::{SlaStatus, TicketPriority};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  match app.screen {
    Screen::TicketList | Screen::TicketDetail => draw_tickets(f, rows[1], app),
    Screen::Dashboard => dashboard::draw(f, rows[1], app),
    Screen::Knowledge => knowledge::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

// ─── Shared styling ───────────────────────────────────────────────────────────

pub fn priority_color(priority: TicketPriority) -> Color {
  match priority {
    TicketPriority::Low => Color::Gray,
    TicketPriority::Medium => Color::Cyan,
    TicketPriority::High => Color::Yellow,
    TicketPriority::Critical => Color::Red,
  }
}

pub fn sla_color(status: SlaStatus) -> Color {
  match status {
    SlaStatus::OnTrack => Color::Green,
    SlaStatus::AtRisk => Color::Yellow,
    SlaStatus::Breached => Color::Red,
    SlaStatus::Met => Color::Blue,
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let tab = |label: &'static str, active: bool| {
    let style = if active {
      Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::White)
    };
    Span::styled(format!(" {label} "), style)
  };

  let tickets_active = matches!(app.screen, Screen::TicketList | Screen::TicketDetail);
  let mut spans = vec![
    Span::styled(" desk ", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
    tab("Tickets", tickets_active),
    tab("Dashboard", app.screen == Screen::Dashboard),
    tab("Knowledge", app.screen == Screen::Knowledge),
  ];

  let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
  let pad = usize::from(area.width)
    .saturating_sub(used)
    .saturating_sub(date.len() + 1);
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(Span::styled(format!("{date} "), Style::default().fg(Color::Gray)));

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Tickets body ─────────────────────────────────────────────────────────────

fn draw_tickets(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(area);

  ticket_list::draw(f, cols[0], app);
  ticket_detail::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    Screen::TicketList if app.filter_active => (
      "SEARCH",
      "Type to filter  Esc cancel  Enter select",
    ),
    Screen::TicketList => (
      "TICKETS",
      "↑↓/jk navigate  / search  Enter detail  r reload  Tab views  q quit",
    ),
    Screen::TicketDetail => (
      "DETAIL",
      "s next status  t log 15 min  [ ] prev/next  Esc back  q quit",
    ),
    Screen::Dashboard => ("DASHBOARD", "+/- trend window  r reload  Tab views  q quit"),
    Screen::Knowledge => ("KNOWLEDGE", "↑↓/jk navigate  Enter open  Esc close  r reload"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
