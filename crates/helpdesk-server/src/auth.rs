//! HTTP Basic-auth middleware and standalone verifier.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::OsRng;

use crate::{ServerConfig, error::Error};

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AuthConfig {
  /// Auth is enabled only when both the username and the hash are set.
  pub fn from_config(config: &ServerConfig) -> Option<Self> {
    match (&config.auth_username, &config.auth_password_hash) {
      (Some(username), Some(password_hash)) => Some(Self {
        username:      username.clone(),
        password_hash: password_hash.clone(),
      }),
      _ => None,
    }
  }
}

/// Produce an argon2id PHC string for `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}

/// Verify credentials directly from headers.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  if username != config.username {
    return Err(Error::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)
}

/// Middleware guarding the API. A `None` config lets every request through.
pub async fn require_auth(
  State(auth): State<Option<Arc<AuthConfig>>>,
  req: Request,
  next: Next,
) -> Result<Response, Error> {
  if let Some(config) = &auth
    && let Err(e) = verify_auth(req.headers(), config)
  {
    tracing::warn!(method = %req.method(), uri = %req.uri(), "rejected credentials");
    return Err(e);
  }
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{Request, header};

  fn make_config(password: &str) -> AuthConfig {
    AuthConfig {
      username:      "agent".to_string(),
      password_hash: hash_password(password).unwrap(),
    }
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  fn headers(value: &str) -> HeaderMap {
    let req = Request::builder()
      .header(header::AUTHORIZATION, value)
      .body(())
      .unwrap();
    req.headers().clone()
  }

  #[test]
  fn correct_credentials() {
    let config = make_config("secret");
    assert!(verify_auth(&headers(&basic("agent", "secret")), &config).is_ok());
  }

  #[test]
  fn wrong_password() {
    let config = make_config("secret");
    assert!(matches!(
      verify_auth(&headers(&basic("agent", "wrong")), &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn wrong_username() {
    let config = make_config("secret");
    assert!(verify_auth(&headers(&basic("admin", "secret")), &config).is_err());
  }

  #[test]
  fn missing_header() {
    let config = make_config("secret");
    assert!(matches!(
      verify_auth(&HeaderMap::new(), &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64() {
    let config = make_config("secret");
    assert!(verify_auth(&headers("Basic !!!not-base64!!!"), &config).is_err());
  }

  #[test]
  fn auth_needs_both_fields() {
    let mut config = ServerConfig::default();
    assert!(AuthConfig::from_config(&config).is_none());
    config.auth_username = Some("agent".into());
    assert!(AuthConfig::from_config(&config).is_none());
    config.auth_password_hash = Some(hash_password("x").unwrap());
    assert!(AuthConfig::from_config(&config).is_some());
  }
}
