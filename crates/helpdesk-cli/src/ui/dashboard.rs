//! Dashboard view — summary figures, status chart, SLA gauge, trend, workload.

use helpdesk_core::dashboard::DashboardSummary;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{BarChart, Block, Borders, Gauge, Paragraph, Row, Sparkline, Table},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(summary) = &app.summary else {
    f.render_widget(
      Paragraph::new("Loading… (r to retry)").style(Style::default().fg(Color::DarkGray)),
      area,
    );
    return;
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3),
      Constraint::Length(12),
      Constraint::Min(6),
    ])
    .split(area);
  let middle = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(rows[1]);
  let bottom = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(rows[2]);

  draw_totals(f, rows[0], summary);
  draw_status_chart(f, middle[0], summary);
  draw_compliance(f, middle[1], summary);
  draw_trend(f, bottom[0], summary, app.trend_days());
  draw_workload(f, bottom[1], app);
}

fn panel(title: String) -> Block<'static> {
  Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

fn draw_totals(f: &mut Frame, area: Rect, s: &DashboardSummary) {
  let figure = |label: &'static str, value: String| {
    vec![
      Span::styled(format!(" {label} "), Style::default().fg(Color::DarkGray)),
      Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
      Span::raw("   "),
    ]
  };
  let spans: Vec<Span> = [
    figure("total", s.total_tickets.to_string()),
    figure("open", s.open_tickets.to_string()),
    figure("resolved", s.resolved_tickets.to_string()),
    figure("avg resolution", format!("{:.1} h", s.avg_resolution_hours)),
    figure("sla", format!("{}%", s.sla_compliance.overall.percentage)),
  ]
  .into_iter()
  .flatten()
  .collect();
  f.render_widget(
    Paragraph::new(Line::from(spans)).block(panel(" Overview ".into())),
    area,
  );
}

fn draw_status_chart(f: &mut Frame, area: Rect, s: &DashboardSummary) {
  let labels: Vec<String> = s.by_status.iter().map(|c| c.status.to_string()).collect();
  let data: Vec<(&str, u64)> = labels
    .iter()
    .zip(&s.by_status)
    .map(|(label, c)| (label.as_str(), c.count as u64))
    .collect();
  f.render_widget(
    BarChart::default()
      .block(panel(" By status ".into()))
      .data(data.as_slice())
      .bar_width(11)
      .bar_gap(1)
      .bar_style(Style::default().fg(Color::Cyan))
      .value_style(Style::default().fg(Color::Black).bg(Color::Cyan)),
    area,
  );
}

fn draw_compliance(f: &mut Frame, area: Rect, s: &DashboardSummary) {
  let block = panel(" SLA compliance ".into());
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut constraints = vec![Constraint::Length(1)];
  constraints.extend(s.sla_compliance.by_priority.iter().map(|_| Constraint::Length(2)));
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints(constraints)
    .split(inner);

  let overall = &s.sla_compliance.overall;
  f.render_widget(
    Paragraph::new(format!(
      "overall {}% ({} of {}, {} breached)",
      overall.percentage, overall.compliant, overall.total, overall.breached
    )),
    rows[0],
  );
  for (row, p) in rows.iter().skip(1).zip(&s.sla_compliance.by_priority) {
    let color = if p.figures.percentage >= 90 {
      Color::Green
    } else if p.figures.percentage >= 70 {
      Color::Yellow
    } else {
      Color::Red
    };
    f.render_widget(
      Gauge::default()
        .gauge_style(Style::default().fg(color))
        .percent(u16::from(p.figures.percentage.min(100)))
        .label(format!("{} {}/{}", p.priority, p.figures.compliant, p.figures.total)),
      *row,
    );
  }
}

fn draw_trend(f: &mut Frame, area: Rect, s: &DashboardSummary, days: u32) {
  let block = panel(format!(" Created per day, last {days} days "));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let created: Vec<u64> = s.trend.iter().map(|b| b.created as u64).collect();
  let resolved: usize = s.trend.iter().map(|b| b.resolved).sum();
  let parts = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(1), Constraint::Length(1)])
    .split(inner);

  f.render_widget(
    Sparkline::default()
      .data(&created)
      .style(Style::default().fg(Color::Green)),
    parts[0],
  );
  f.render_widget(
    Paragraph::new(format!(
      "{} created, {resolved} resolved",
      created.iter().sum::<u64>()
    ))
    .style(Style::default().fg(Color::DarkGray)),
    parts[1],
  );
}

fn draw_workload(f: &mut Frame, area: Rect, app: &App) {
  let rows: Vec<Row> = app
    .workload
    .iter()
    .map(|w| {
      let who = w
        .assignee_id
        .map(|id| id.to_string()[..8].to_string())
        .unwrap_or_else(|| "unassigned".into());
      Row::new(vec![
        who,
        w.open_tickets.to_string(),
        format!("{} min", w.time_spent),
      ])
    })
    .collect();

  f.render_widget(
    Table::new(rows, [
      Constraint::Length(12),
      Constraint::Length(6),
      Constraint::Min(8),
    ])
    .header(
      Row::new(vec!["assignee", "open", "time"])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    )
    .block(panel(" Workload ".into())),
    area,
  );
}
