//! Knowledge view — popular and recent articles, with a reader pane.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  let entries = app.knowledge_entries();
  let items: Vec<ListItem> = entries
    .iter()
    .map(|a| {
      ListItem::new(Line::from(vec![
        Span::styled(format!("{:>5} ", a.views), Style::default().fg(Color::DarkGray)),
        Span::raw(a.title.clone()),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!entries.is_empty()).then_some(app.knowledge_cursor));
  f.render_stateful_widget(
    List::new(items)
      .block(
        Block::default()
          .title(" Articles (views) ")
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Cyan)),
      )
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    cols[0],
    &mut state,
  );

  let reader = Block::default()
    .title(" Article ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let Some(article) = &app.article else {
    f.render_widget(
      Paragraph::new("Press Enter to open an article.")
        .style(Style::default().fg(Color::DarkGray))
        .block(reader),
      cols[1],
    );
    return;
  };

  let mut lines = vec![
    Line::from(Span::styled(
      article.title.clone(),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(Span::styled(
      format!(
        "{}  ·  {} views  ·  {}",
        article.category,
        article.views,
        article.tags.join(", ")
      ),
      Style::default().fg(Color::DarkGray),
    )),
    Line::from(""),
  ];
  lines.extend(article.content.lines().map(|l| Line::from(l.to_string())));
  f.render_widget(
    Paragraph::new(lines).wrap(Wrap { trim: false }).block(reader),
    cols[1],
  );
}
