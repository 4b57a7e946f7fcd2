//! Async HTTP client wrapping the helpdesk JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use helpdesk_core::{
  dashboard::{DashboardSummary, KnowledgeHighlights, Workload},
  knowledge::Article,
  ticket::{Ticket, TicketStatus},
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

/// Connection settings for the helpdesk API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the helpdesk REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Send `req` and decode a JSON body, turning non-2xx into an error that
  /// carries the server's `error` message when there is one.
  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    let resp = self
      .auth(req)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;

    let status = resp.status();
    if !status.is_success() {
      let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
        .unwrap_or_default();
      return Err(anyhow!("{what} → {status} {message}"));
    }
    resp.json().await.with_context(|| format!("deserialising {what}"))
  }

  // ── Tickets ───────────────────────────────────────────────────────────────

  /// `GET /api/tickets[?status=<s>]`
  pub async fn list_tickets(&self, status: Option<TicketStatus>) -> Result<Vec<Ticket>> {
    let mut req = self
      .client
      .get(self.url("/tickets"))
      .query(&[("limit", "500")]);
    if let Some(status) = status {
      req = req.query(&[("status", status.as_ref())]);
    }
    self.send(req, "GET /tickets").await
  }

  /// `PATCH /api/tickets/{id}` with a new status.
  pub async fn set_status(&self, id: Uuid, status: TicketStatus) -> Result<Ticket> {
    let req = self
      .client
      .patch(self.url(&format!("/tickets/{id}")))
      .json(&json!({ "status": status }));
    self.send(req, "PATCH /tickets/{id}").await
  }

  /// `PATCH /api/tickets/{id}` logging extra minutes of work.
  pub async fn log_time(&self, id: Uuid, minutes: u32) -> Result<Ticket> {
    let patch = json!({ "add_time_spent": minutes });
    let req = self
      .client
      .patch(self.url(&format!("/tickets/{id}")))
      .json(&patch);
    self.send(req, "PATCH /tickets/{id}").await
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  /// `GET /api/dashboard/summary?days=<n>`
  pub async fn summary(&self, days: u32) -> Result<DashboardSummary> {
    let req = self
      .client
      .get(self.url("/dashboard/summary"))
      .query(&[("days", days)]);
    self.send(req, "GET /dashboard/summary").await
  }

  /// `GET /api/dashboard/workload`
  pub async fn workload(&self) -> Result<Vec<Workload>> {
    let req = self.client.get(self.url("/dashboard/workload"));
    self.send(req, "GET /dashboard/workload").await
  }

  // ── Knowledge base ────────────────────────────────────────────────────────

  /// `GET /api/dashboard/knowledge?limit=<n>`
  pub async fn highlights(&self, limit: usize) -> Result<KnowledgeHighlights> {
    let req = self
      .client
      .get(self.url("/dashboard/knowledge"))
      .query(&[("limit", limit)]);
    self.send(req, "GET /dashboard/knowledge").await
  }

  /// `POST /api/knowledge/{id}/views`
  pub async fn open_article(&self, id: Uuid) -> Result<Article> {
    let req = self.client.post(self.url(&format!("/knowledge/{id}/views")));
    self.send(req, "POST /knowledge/{id}/views").await
  }
}
