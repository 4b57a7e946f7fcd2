//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use helpdesk_core::{
  dashboard::{DashboardSummary, KnowledgeHighlights, Workload},
  knowledge::Article,
  ticket::{Ticket, TicketStatus},
};
use uuid::Uuid;

use crate::client::ApiClient;

/// Trend windows offered on the dashboard, cycled with `+` / `-`.
pub const TREND_WINDOWS: [u32; 3] = [7, 30, 90];

/// Minutes added by the "log time" key on the detail screen.
pub const TIME_STEP: u32 = 15;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the ticket list; the right pane previews the cursor ticket.
  TicketList,
  /// Focus on the ticket detail pane.
  TicketDetail,
  Dashboard,
  Knowledge,
}

impl Screen {
  /// Next top-level view for `Tab`.
  fn next_view(self) -> Self {
    match self {
      Screen::TicketList | Screen::TicketDetail => Screen::Dashboard,
      Screen::Dashboard => Screen::Knowledge,
      Screen::Knowledge => Screen::TicketList,
    }
  }
}

/// The status a ticket moves to when `s` is pressed on it.
pub fn next_status(status: TicketStatus) -> TicketStatus {
  match status {
    TicketStatus::Open => TicketStatus::InProgress,
    TicketStatus::InProgress => TicketStatus::OnHold,
    TicketStatus::OnHold => TicketStatus::Resolved,
    TicketStatus::Resolved => TicketStatus::Closed,
    TicketStatus::Closed => TicketStatus::Open,
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,

  /// Tickets as last fetched, newest first.
  pub tickets: Vec<Ticket>,

  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* ticket list.
  pub list_cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: usize,

  /// Dashboard data, fetched when the view is first opened.
  pub summary:  Option<DashboardSummary>,
  pub workload: Vec<Workload>,
  /// Index into [`TREND_WINDOWS`].
  pub window:   usize,

  pub highlights:       Option<KnowledgeHighlights>,
  /// Article opened from the knowledge view.
  pub article:          Option<Article>,
  pub knowledge_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::TicketList,
      tickets: Vec::new(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      detail_scroll: 0,
      summary: None,
      workload: Vec::new(),
      window: 0,
      highlights: None,
      article: None,
      knowledge_cursor: 0,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  pub fn trend_days(&self) -> u32 { TREND_WINDOWS[self.window % TREND_WINDOWS.len()] }

  // ── Data loading ──────────────────────────────────────────────────────────

  pub async fn load_tickets(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading tickets…".into();
    match self.client.list_tickets(None).await {
      Ok(tickets) => {
        tracing::debug!(count = tickets.len(), "tickets loaded");
        self.tickets = tickets;
        self.list_cursor = 0;
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  async fn load_dashboard(&mut self) {
    let days = self.trend_days();
    self.status_msg = "Loading dashboard…".into();
    match tokio::try_join!(self.client.summary(days), self.client.workload()) {
      Ok((summary, workload)) => {
        self.summary = Some(summary);
        self.workload = workload;
        self.status_msg = String::new();
      }
      Err(e) => {
        tracing::warn!(error = %e, "dashboard load failed");
        self.status_msg = format!("Error: {e}");
      }
    }
  }

  async fn load_highlights(&mut self) {
    match self.client.highlights(10).await {
      Ok(highlights) => {
        self.highlights = Some(highlights);
        self.knowledge_cursor = 0;
        self.status_msg = String::new();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Tickets whose number or title match the current filter query.
  pub fn filtered_tickets(&self) -> Vec<&Ticket> {
    if self.filter.is_empty() {
      return self.tickets.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .tickets
      .iter()
      .filter(|t| {
        matcher.fuzzy_match(&t.title, &self.filter).is_some()
          || matcher.fuzzy_match(&t.ticket_number, &self.filter).is_some()
      })
      .collect()
  }

  /// The ticket under the list cursor in the filtered view, if any.
  pub fn cursor_ticket(&self) -> Option<&Ticket> {
    self.filtered_tickets().get(self.list_cursor).copied()
  }

  /// Most-viewed articles followed by recent ones not already listed.
  pub fn knowledge_entries(&self) -> Vec<&Article> {
    let Some(h) = &self.highlights else {
      return Vec::new();
    };
    let mut out: Vec<&Article> = h.most_viewed.iter().collect();
    for article in &h.most_recent {
      if !out.iter().any(|a| a.article_id == article.article_id) {
        out.push(article);
      }
    }
    out
  }

  fn replace_ticket(&mut self, ticket: Ticket) {
    if let Some(slot) = self
      .tickets
      .iter_mut()
      .find(|t| t.ticket_id == ticket.ticket_id)
    {
      *slot = ticket;
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Tab => {
        self.screen = self.screen.next_view();
        self.article = None;
        match self.screen {
          Screen::Dashboard if self.summary.is_none() => self.load_dashboard().await,
          Screen::Knowledge if self.highlights.is_none() => self.load_highlights().await,
          _ => {}
        }
        return Ok(true);
      }
      _ => {}
    }

    match self.screen {
      Screen::TicketList => self.handle_list_key(key).await?,
      Screen::TicketDetail => self.handle_detail_key(key).await,
      Screen::Dashboard => self.handle_dashboard_key(key).await,
      Screen::Knowledge => self.handle_knowledge_key(key).await,
    }
    Ok(true)
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => {
        self.filter_active = false;
        if self.filtered_tickets().len() == 1 {
          self.screen = Screen::TicketDetail;
          self.detail_scroll = 0;
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => return,
    }
    self.list_cursor = 0;
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.filtered_tickets().len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if self.cursor_ticket().is_some() {
          self.screen = Screen::TicketDetail;
          self.detail_scroll = 0;
        }
      }
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Char('r') => self.load_tickets().await?,
      _ => {}
    }
    Ok(())
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::TicketList;
      }
      KeyCode::Down | KeyCode::Char('j') => self.detail_scroll += 1,
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }
      KeyCode::Char(']') | KeyCode::PageDown => {
        if self.list_cursor + 1 < self.filtered_tickets().len() {
          self.list_cursor += 1;
          self.detail_scroll = 0;
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
        self.detail_scroll = 0;
      }
      KeyCode::Char('s') => {
        if let Some((id, status)) = self.cursor_ticket().map(|t| (t.ticket_id, t.status)) {
          let result = self.client.set_status(id, next_status(status)).await;
          self.apply(result, "status");
        }
      }
      KeyCode::Char('t') => {
        if let Some(id) = self.cursor_ticket().map(|t| t.ticket_id) {
          let result = self.client.log_time(id, TIME_STEP).await;
          self.apply(result, "time");
        }
      }
      _ => {}
    }
  }

  fn apply(&mut self, result: anyhow::Result<Ticket>, what: &str) {
    match result {
      Ok(ticket) => {
        self.status_msg = format!(
          "{} {what} updated: {} / {} min",
          ticket.ticket_number, ticket.status, ticket.time_spent
        );
        self.replace_ticket(ticket);
        // Dashboard figures are stale after any ticket change.
        self.summary = None;
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  async fn handle_dashboard_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('+') | KeyCode::Char('=') => {
        self.window = (self.window + 1) % TREND_WINDOWS.len();
        self.load_dashboard().await;
      }
      KeyCode::Char('-') => {
        self.window = (self.window + TREND_WINDOWS.len() - 1) % TREND_WINDOWS.len();
        self.load_dashboard().await;
      }
      KeyCode::Char('r') => self.load_dashboard().await,
      _ => {}
    }
  }

  async fn handle_knowledge_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.knowledge_cursor + 1 < self.knowledge_entries().len() {
          self.knowledge_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.knowledge_cursor = self.knowledge_cursor.saturating_sub(1);
      }
      KeyCode::Enter => {
        let id = self
          .knowledge_entries()
          .get(self.knowledge_cursor)
          .map(|a| a.article_id);
        if let Some(id) = id {
          self.open_article(id).await;
        }
      }
      KeyCode::Esc => self.article = None,
      KeyCode::Char('r') => self.load_highlights().await,
      _ => {}
    }
  }

  async fn open_article(&mut self, id: Uuid) {
    match self.client.open_article(id).await {
      Ok(article) => self.article = Some(article),
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }
}
