//! JSON REST API for the helpdesk.
//!
//! Exposes an axum [`Router`] backed by any [`helpdesk_core::store::DeskStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", helpdesk_api::api_router(store.clone()))
//! ```

pub mod dashboard;
pub mod error;
pub mod extract;
pub mod knowledge;
pub mod problems;
pub mod slas;
pub mod tickets;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use helpdesk_core::store::DeskStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DeskStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Tickets
    .route("/tickets", get(tickets::list::<S>).post(tickets::create::<S>))
    .route(
      "/tickets/{id}",
      get(tickets::get_one::<S>).patch(tickets::update::<S>),
    )
    // Knowledge base
    .route("/knowledge", get(knowledge::list::<S>).post(knowledge::create::<S>))
    .route(
      "/knowledge/{id}",
      get(knowledge::get_one::<S>).patch(knowledge::update::<S>),
    )
    .route("/knowledge/{id}/views", post(knowledge::record_view::<S>))
    // SLA definitions
    .route("/slas", get(slas::list::<S>).post(slas::create::<S>))
    .route("/slas/{id}", get(slas::get_one::<S>).patch(slas::update::<S>))
    // Problems
    .route("/problems", get(problems::list::<S>).post(problems::create::<S>))
    .route(
      "/problems/{id}",
      get(problems::get_one::<S>).patch(problems::update::<S>),
    )
    // Dashboard
    .route("/dashboard/summary", get(dashboard::summary::<S>))
    .route("/dashboard/trend", get(dashboard::trend::<S>))
    .route("/dashboard/sla-compliance", get(dashboard::sla_compliance::<S>))
    .route("/dashboard/workload", get(dashboard::workload::<S>))
    .route("/dashboard/knowledge", get(dashboard::knowledge::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use helpdesk_core::{sla::NewSla, store::DeskStore as _};
  use helpdesk_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn make_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  async fn send(
    store: &Arc<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = api_router(store.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  /// Send `body` verbatim as `application/json`.
  async fn send_text(
    store: &Arc<SqliteStore>,
    method: &str,
    uri: &str,
    body: &str,
  ) -> (StatusCode, Value) {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    let resp = api_router(store.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  // ── Tickets ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_ticket_returns_201_with_number() {
    let store = make_store().await;
    let (status, body) = send(
      &store,
      "POST",
      "/tickets",
      Some(json!({ "title": "Email bouncing", "priority": "high" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticket_number"], "TKT-000001");
    assert_eq!(body["status"], "open");
    assert_eq!(body["priority"], "high");
    assert_eq!(body["sla_status"], "on_track");
  }

  #[tokio::test]
  async fn create_ticket_with_blank_title_is_400() {
    let store = make_store().await;
    let (status, body) =
      send(&store, "POST", "/tickets", Some(json!({ "title": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("title"));
  }

  #[tokio::test]
  async fn get_missing_ticket_is_404() {
    let store = make_store().await;
    let (status, body) =
      send(&store, "GET", &format!("/tickets/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn patch_ticket_resolves_and_meets_sla() {
    let store = make_store().await;
    store
      .create_sla(NewSla::new("Standard", helpdesk_core::ticket::TicketPriority::Medium, 60, 480))
      .await
      .unwrap();

    let (_, created) =
      send(&store, "POST", "/tickets", Some(json!({ "title": "Password reset" }))).await;
    let id = created["ticket_id"].as_str().unwrap().to_owned();

    let (status, body) = send(
      &store,
      "PATCH",
      &format!("/tickets/{id}"),
      Some(json!({ "status": "resolved", "add_time_spent": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "resolved");
    assert_eq!(body["time_spent"], 10);
    assert_eq!(body["sla_status"], "met");
    assert!(body["resolved_at"].is_string());

    let (_, fetched) = send(&store, "GET", &format!("/tickets/{id}"), None).await;
    assert_eq!(fetched["sla_status"], "met");
  }

  #[tokio::test]
  async fn patch_ticket_clears_assignee_with_null() {
    let store = make_store().await;
    let agent = Uuid::new_v4();
    let (_, created) = send(
      &store,
      "POST",
      "/tickets",
      Some(json!({ "title": "New laptop", "assignee_id": agent })),
    )
    .await;
    let id = created["ticket_id"].as_str().unwrap().to_owned();
    assert_eq!(created["assignee_id"], agent.to_string());

    let (_, body) = send(
      &store,
      "PATCH",
      &format!("/tickets/{id}"),
      Some(json!({ "assignee_id": null })),
    )
    .await;
    assert!(body["assignee_id"].is_null());
  }

  #[tokio::test]
  async fn list_tickets_filters_by_query_params() {
    let store = make_store().await;
    for (title, priority) in [("a", "low"), ("b", "critical"), ("c", "critical")] {
      send(
        &store,
        "POST",
        "/tickets",
        Some(json!({ "title": title, "priority": priority })),
      )
      .await;
    }
    let (status, body) = send(&store, "GET", "/tickets?priority=critical", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(&store, "GET", "/tickets?limit=1", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "c");
  }

  // ── Knowledge base ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn article_views_are_counted() {
    let store = make_store().await;
    let (status, created) = send(
      &store,
      "POST",
      "/knowledge",
      Some(json!({ "title": "Map a network drive", "category": "how-to", "tags": ["windows"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["article_id"].as_str().unwrap().to_owned();

    send(&store, "POST", &format!("/knowledge/{id}/views"), None).await;
    let (status, body) = send(&store, "POST", &format!("/knowledge/{id}/views"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["views"], 2);

    let (status, _) =
      send(&store, "POST", &format!("/knowledge/{}/views", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn knowledge_list_filters_by_tag() {
    let store = make_store().await;
    send(
      &store,
      "POST",
      "/knowledge",
      Some(json!({ "title": "VPN", "category": "network", "tags": ["vpn"] })),
    )
    .await;
    send(
      &store,
      "POST",
      "/knowledge",
      Some(json!({ "title": "Printers", "category": "hardware" })),
    )
    .await;
    let (_, body) = send(&store, "GET", "/knowledge?tag=vpn", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "VPN");
  }

  // ── SLAs ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sla_with_zero_time_is_rejected() {
    let store = make_store().await;
    let (status, _) = send(
      &store,
      "POST",
      "/slas",
      Some(json!({
        "name": "Broken",
        "priority": "high",
        "response_time": 0,
        "resolution_time": 60,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn sla_deactivation_hides_it_from_active_list() {
    let store = make_store().await;
    let (status, created) = send(
      &store,
      "POST",
      "/slas",
      Some(json!({
        "name": "Gold",
        "priority": "critical",
        "response_time": 15,
        "resolution_time": 240,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["active"], true);
    let id = created["sla_id"].as_str().unwrap().to_owned();

    send(&store, "PATCH", &format!("/slas/{id}"), Some(json!({ "active": false }))).await;

    let (_, all) = send(&store, "GET", "/slas", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
    let (_, active) = send(&store, "GET", "/slas?active=true", None).await;
    assert!(active.as_array().unwrap().is_empty());
  }

  // ── Problems ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn problem_create_and_patch() {
    let store = make_store().await;
    let (status, created) = send(
      &store,
      "POST",
      "/problems",
      Some(json!({ "title": "Nightly backup fails", "impact": "high" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["problem_number"], "PRB-000001");
    let id = created["problem_id"].as_str().unwrap().to_owned();

    let (status, body) = send(
      &store,
      "PATCH",
      &format!("/problems/{id}"),
      Some(json!({ "status": "known_error", "workaround": "Run backup manually" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "known_error");
    assert_eq!(body["workaround"], "Run backup manually");

    let (_, listed) = send(&store, "GET", "/problems?status=known_error", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
  }

  // ── Dashboard ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn dashboard_summary_counts_tickets() {
    let store = make_store().await;
    for title in ["a", "b", "c"] {
      send(&store, "POST", "/tickets", Some(json!({ "title": title }))).await;
    }
    send(
      &store,
      "POST",
      "/tickets",
      Some(json!({ "title": "done", "status": "closed" })),
    )
    .await;

    let (status, body) = send(&store, "GET", "/dashboard/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_tickets"], 4);
    assert_eq!(body["open_tickets"], 3);
    assert_eq!(body["resolved_tickets"], 1);
    assert_eq!(body["trend"].as_array().unwrap().len(), 7);
    assert_eq!(body["by_status"].as_array().unwrap().len(), 5);
  }

  #[tokio::test]
  async fn dashboard_trend_honours_days() {
    let store = make_store().await;
    let (status, body) = send(&store, "GET", "/dashboard/trend?days=30", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 30);

    let (status, _) = send(&store, "GET", "/dashboard/trend?days=91", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&store, "GET", "/dashboard/trend?days=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn dashboard_sla_compliance_and_workload() {
    let store = make_store().await;
    let agent = Uuid::new_v4();
    send(
      &store,
      "POST",
      "/tickets",
      Some(json!({ "title": "x", "assignee_id": agent, "time_spent": 30 })),
    )
    .await;
    send(&store, "POST", "/tickets", Some(json!({ "title": "y" }))).await;

    let (status, compliance) = send(&store, "GET", "/dashboard/sla-compliance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(compliance["overall"]["total"], 2);
    assert_eq!(compliance["overall"]["percentage"], 100);

    let (status, workload) = send(&store, "GET", "/dashboard/workload", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = workload.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    let assigned = rows
      .iter()
      .find(|r| r["assignee_id"] == agent.to_string())
      .unwrap();
    assert_eq!(assigned["open_tickets"], 1);
    assert_eq!(assigned["time_spent"], 30);
  }

  #[tokio::test]
  async fn dashboard_knowledge_limits_highlights() {
    let store = make_store().await;
    for n in 0..4 {
      send(
        &store,
        "POST",
        "/knowledge",
        Some(json!({ "title": format!("article {n}"), "category": "general" })),
      )
      .await;
    }
    let (status, body) = send(&store, "GET", "/dashboard/knowledge?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["most_viewed"].as_array().unwrap().len(), 2);
    assert_eq!(body["most_recent"].as_array().unwrap().len(), 2);
  }

  // ── Request rejections ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn malformed_query_is_400_json() {
    let store = make_store().await;
    let (status, body) = send(&store, "GET", "/dashboard/trend?days=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&store, "GET", "/tickets?status=exploded", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn malformed_path_id_is_400_json() {
    let store = make_store().await;
    let (status, body) = send(&store, "GET", "/tickets/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn bad_json_bodies_are_400_json() {
    let store = make_store().await;

    // Missing required field.
    let (status, body) = send(&store, "POST", "/tickets", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Not JSON at all.
    let (status, body) = send_text(&store, "POST", "/knowledge", "{title:").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Wrong type for a field.
    let sla = json!({
      "name": "Rush",
      "priority": "high",
      "response_time": "soon",
      "resolution_time": 60,
    });
    let (status, body) = send(&store, "POST", "/slas", Some(sla)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  // ── Consistency ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn created_ticket_matches_later_get() {
    let store = make_store().await;
    let (_, created) =
      send(&store, "POST", "/tickets", Some(json!({ "title": "Keyboard sticky" }))).await;
    let id = created["ticket_id"].as_str().unwrap();
    let (_, fetched) = send(&store, "GET", &format!("/tickets/{id}"), None).await;
    assert_eq!(fetched["created_at"], created["created_at"]);
    assert_eq!(fetched["updated_at"], created["updated_at"]);
  }

  #[tokio::test]
  async fn problem_patch_null_clears_root_cause() {
    let store = make_store().await;
    let (_, created) = send(
      &store,
      "POST",
      "/problems",
      Some(json!({ "title": "Wi-Fi drops on floor 3", "root_cause": "Channel overlap" })),
    )
    .await;
    let id = created["problem_id"].as_str().unwrap();

    let (status, patched) = send(
      &store,
      "PATCH",
      &format!("/problems/{id}"),
      Some(json!({ "root_cause": null, "status": "investigating" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(patched["root_cause"].is_null());
    assert_eq!(patched["status"], "investigating");

    let (_, fetched) = send(&store, "GET", &format!("/problems/{id}"), None).await;
    assert!(fetched["root_cause"].is_null());
    assert_eq!(fetched["title"], "Wi-Fi drops on floor 3");
  }
}
