//! Ticket list pane — left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::{priority_color, sla_color};
use crate::app::{App, Screen};

/// Render the ticket list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_tickets();
  let total = app.tickets.len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Tickets ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Tickets ({total}) ")
  };

  let border = if app.screen == Screen::TicketList {
    Color::Cyan
  } else {
    Color::DarkGray
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|ticket| {
      let closed = ticket.status.is_closed();
      let title_style = if closed {
        Style::default().fg(Color::DarkGray)
      } else {
        Style::default()
      };
      ListItem::new(Line::from(vec![
        Span::styled("● ", Style::default().fg(sla_color(ticket.sla_status))),
        Span::styled(
          format!("{} ", ticket.ticket_number),
          Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
          format!("{:<8} ", ticket.priority.to_string()),
          Style::default().fg(priority_color(ticket.priority)),
        ),
        Span::styled(ticket.title.clone(), title_style),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar on the last inner row.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height -= 1;

    let cursor = if app.filter_active { "_" } else { "" };
    f.render_widget(
      Paragraph::new(format!("/{}{cursor}", app.filter))
        .style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let mut state = ListState::default();
  state.select((!filtered.is_empty()).then_some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
