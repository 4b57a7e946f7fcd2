//! HTTP server assembly for the helpdesk.
//!
//! Mounts the JSON API under `/api` behind optional Basic auth, adds a public
//! `/health` probe, and traces every request.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, middleware, routing::get};
use helpdesk_core::{sla::NewSla, store::DeskStore};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `HELPDESK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      Option<String>,
  pub auth_password_hash: Option<String>,
  /// Insert one SLA per priority when the store has none.
  pub seed_default_slas:  bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".to_string(),
      port:               8080,
      store_path:         PathBuf::from("helpdesk.db"),
      auth_username:      None,
      auth_password_hash: None,
      seed_default_slas:  true,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything needed to build the router.
#[derive(Clone)]
pub struct AppState<S: DeskStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Option<Arc<AuthConfig>>,
}

impl<S: DeskStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    let auth = AuthConfig::from_config(&config).map(Arc::new);
    Self {
      store: Arc::new(store),
      config: Arc::new(config),
      auth,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete server [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DeskStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let api = helpdesk_api::api_router(state.store.clone()).layer(
    middleware::from_fn_with_state(state.auth.clone(), auth::require_auth),
  );

  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
  Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

// ─── Seeding ──────────────────────────────────────────────────────────────────

/// Create the default SLA definitions if `store` has none at all. Returns the
/// number of definitions inserted.
pub async fn seed_default_slas<S: DeskStore>(store: &S) -> Result<usize, S::Error> {
  if !store.list_slas(false).await?.is_empty() {
    return Ok(0);
  }
  let defaults = NewSla::defaults();
  let count = defaults.len();
  for input in defaults {
    store.create_sla(input).await?;
  }
  tracing::info!(count, "seeded default SLA definitions");
  Ok(count)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use helpdesk_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn make_state(password: Option<&str>) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let config = ServerConfig {
      store_path: PathBuf::from(":memory:"),
      auth_username: password.map(|_| "agent".to_string()),
      auth_password_hash: password.map(|p| auth::hash_password(p).unwrap()),
      ..Default::default()
    };
    AppState::new(store, config)
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn get(
    state: AppState<SqliteStore>,
    uri: &str,
    auth: Option<String>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = auth {
      builder = builder.header(header::AUTHORIZATION, value);
    }
    let req = builder.body(Body::empty()).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn health_is_public() {
    let state = make_state(Some("secret")).await;
    let resp = get(state, "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn api_requires_credentials_when_configured() {
    let state = make_state(Some("secret")).await;
    let resp = get(state, "/api/tickets", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert_eq!(challenge, "Basic realm=\"helpdesk\"");
  }

  #[tokio::test]
  async fn api_rejects_wrong_password() {
    let state = make_state(Some("secret")).await;
    let resp = get(state, "/api/tickets", Some(auth_header("agent", "nope"))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn api_accepts_valid_credentials() {
    let state = make_state(Some("secret")).await;
    let resp = get(state, "/api/tickets", Some(auth_header("agent", "secret"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn api_is_open_without_auth_config() {
    let state = make_state(None).await;
    let resp = get(state, "/api/dashboard/summary", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn seeding_is_idempotent() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    assert_eq!(seed_default_slas(&store).await.unwrap(), 4);
    assert_eq!(seed_default_slas(&store).await.unwrap(), 0);
    assert_eq!(store.list_slas(false).await.unwrap().len(), 4);
  }

  #[tokio::test]
  async fn seeding_skips_a_store_with_definitions() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .create_sla(NewSla::new(
        "Custom",
        helpdesk_core::ticket::TicketPriority::High,
        30,
        120,
      ))
      .await
      .unwrap();
    assert_eq!(seed_default_slas(&store).await.unwrap(), 0);
  }
}
