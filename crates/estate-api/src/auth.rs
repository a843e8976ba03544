//! Session tokens and the [`Caller`] extractor.
//!
//! Identity is issued elsewhere; this module only checks that a token was
//! signed with the shared secret and recovers the user id from it.
//!
//! Token format: `base64url(user_id) "." hex(hmac_sha256(secret, payload))`,
//! where `payload` is the first segment.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use hmac::{Hmac, Mac, digest::InvalidLength};
use sha2::Sha256;

use crate::{ApiState, error::ApiError};

/// Name of the cookie that may carry the session token.
pub const SESSION_COOKIE: &str = "token";

/// Signing state keyed with the shared secret.
#[derive(Clone)]
pub struct SessionKeys {
  mac: Hmac<Sha256>,
}

impl SessionKeys {
  pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, InvalidLength> {
    Ok(Self { mac: Hmac::<Sha256>::new_from_slice(secret.as_ref())? })
  }

  fn mac(&self, payload: &str) -> Hmac<Sha256> {
    let mut mac = self.mac.clone();
    mac.update(payload.as_bytes());
    mac
  }

  /// Mint a token for `user_id`.
  pub fn issue(&self, user_id: &str) -> String {
    let payload = B64.encode(user_id);
    let signature = hex::encode(self.mac(&payload).finalize().into_bytes());
    format!("{payload}.{signature}")
  }

  /// Return the user id carried by `token` if its signature is valid.
  pub fn verify(&self, token: &str) -> Option<String> {
    let (payload, signature) = token.trim().split_once('.')?;
    let signature = hex::decode(signature).ok()?;
    self.mac(payload).verify_slice(&signature).ok()?;
    let bytes = B64.decode(payload).ok()?;
    let user_id = String::from_utf8(bytes).ok()?;
    (!user_id.is_empty()).then_some(user_id)
  }
}

/// Pull the raw token from `Authorization: Bearer` or the session cookie.
fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
  if let Some(bearer) = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
  {
    return Some(bearer);
  }

  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value)
}

/// The authenticated user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl<S, R> FromRequestParts<ApiState<S, R>> for Caller
where
  S: Send + Sync,
  R: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, R>,
  ) -> Result<Self, Self::Rejection> {
    let token = token_from_headers(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let user_id = state.sessions.verify(token).ok_or(ApiError::Unauthorized)?;
    Ok(Caller(user_id))
  }
}
