// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer credential verification for inbound requests.
//!
//! Callers present an RS256 access token issued by the identity provider for
//! the API audience. [`JwksVerifier`] checks it against the tenant's published
//! signing keys, which are cached by `kid` and refetched when an unknown `kid`
//! shows up, at most once per refresh interval.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use enrich_common_http::{RequestSpec, UpstreamClient, UpstreamError};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::api::AppState;
use crate::error::ServerError;

#[derive(Debug, Error)]
pub enum AuthError {
	#[error("missing bearer credential")]
	MissingCredentials,

	#[error("authorization header is not a bearer credential")]
	MalformedHeader,

	#[error("token header has no kid")]
	MissingKeyId,

	#[error("no signing key with kid {0}")]
	UnknownKey(String),

	#[error("failed to fetch signing keys: {0}")]
	KeyFetch(#[from] UpstreamError),

	#[error("signing key {kid} is unusable: {source}")]
	BadKey {
		kid: String,
		#[source]
		source: jsonwebtoken::errors::Error,
	},

	#[error("invalid token: {0}")]
	InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Claims read from a verified token. Audience, issuer and expiry have already
/// been checked by the time a caller sees these.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
	pub sub: String,
	pub iss: String,
	pub exp: u64,
	#[serde(default)]
	pub scope: Option<String>,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
	async fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

// ============================================================================
// JWKS verifier
// ============================================================================

#[derive(Debug, Deserialize)]
struct JwkSet {
	keys: Vec<JwkEntry>,
}

#[derive(Debug, Deserialize)]
struct JwkEntry {
	kty: String,
	#[serde(default)]
	kid: Option<String>,
	#[serde(default, rename = "use")]
	usage: Option<String>,
	#[serde(default)]
	n: Option<String>,
	#[serde(default)]
	e: Option<String>,
}

#[derive(Default)]
struct KeyCache {
	keys: HashMap<String, DecodingKey>,
	last_fetch: Option<Instant>,
}

impl KeyCache {
	fn may_refresh(&self, min_interval: Duration) -> bool {
		self.last_fetch
			.map_or(true, |at| at.elapsed() >= min_interval)
	}
}

/// Verifies RS256 bearer tokens against a JWKS endpoint.
pub struct JwksVerifier {
	http: UpstreamClient,
	jwks_url: String,
	audience: String,
	issuer: String,
	min_refresh: Duration,
	cache: RwLock<KeyCache>,
	/// Serializes refetches. Never held together with a write guard on `cache`
	/// across the network call.
	refresh: Mutex<()>,
}

impl std::fmt::Debug for JwksVerifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("JwksVerifier")
			.field("jwks_url", &self.jwks_url)
			.field("audience", &self.audience)
			.field("issuer", &self.issuer)
			.field("min_refresh", &self.min_refresh)
			.finish_non_exhaustive()
	}
}

impl JwksVerifier {
	pub fn new(
		http: UpstreamClient,
		jwks_url: impl Into<String>,
		audience: impl Into<String>,
		issuer: impl Into<String>,
		min_refresh: Duration,
	) -> Self {
		Self {
			http,
			jwks_url: jwks_url.into(),
			audience: audience.into(),
			issuer: issuer.into(),
			min_refresh,
			cache: RwLock::new(KeyCache::default()),
			refresh: Mutex::new(()),
		}
	}

	/// Number of signing keys currently cached.
	pub async fn cached_keys(&self) -> usize {
		self.cache.read().await.keys.len()
	}

	fn validation(&self) -> Validation {
		let mut validation = Validation::new(Algorithm::RS256);
		validation.set_audience(&[&self.audience]);
		validation.set_issuer(&[&self.issuer]);
		validation
	}

	/// Looks up `kid`, refetching the key set once if it is unknown and the
	/// refresh interval has passed.
	///
	/// The cache lock is only taken for map reads and swaps. Requests for a
	/// cached `kid` never wait on a refetch in flight.
	async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
		if let Some(key) = self.cache.read().await.keys.get(kid) {
			return Ok(key.clone());
		}

		let _refresh = self.refresh.lock().await;

		{
			let mut cache = self.cache.write().await;
			// Another request may have refreshed while we waited.
			if let Some(key) = cache.keys.get(kid) {
				return Ok(key.clone());
			}
			if !cache.may_refresh(self.min_refresh) {
				debug!(kid, "unknown kid, key refresh rate-limited");
				return Err(AuthError::UnknownKey(kid.to_string()));
			}
			cache.last_fetch = Some(Instant::now());
		}

		let keys = self.fetch_keys().await?;

		let mut cache = self.cache.write().await;
		cache.keys = keys;
		cache
			.keys
			.get(kid)
			.cloned()
			.ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
	}

	#[instrument(skip(self), fields(url = %self.jwks_url))]
	async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, AuthError> {
		let set: JwkSet = self
			.http
			.call_json(RequestSpec::get(&self.jwks_url))
			.await?;

		let mut keys = HashMap::new();
		for entry in set.keys {
			if entry.kty != "RSA" || entry.usage.as_deref().is_some_and(|u| u != "sig") {
				continue;
			}
			let (Some(kid), Some(n), Some(e)) = (entry.kid, entry.n, entry.e) else {
				continue;
			};
			match DecodingKey::from_rsa_components(&n, &e) {
				Ok(key) => {
					keys.insert(kid, key);
				}
				Err(source) => {
					warn!(error = %AuthError::BadKey { kid, source }, "skipping signing key");
				}
			}
		}

		info!(count = keys.len(), "signing keys refreshed");
		Ok(keys)
	}
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
	async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
		let header = decode_header(token)?;
		let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
		let key = self.key_for(&kid).await?;
		let data = decode::<Claims>(token, &key, &self.validation())?;
		Ok(data.claims)
	}
}

// ============================================================================
// Extractor
// ============================================================================

/// A caller whose bearer credential verified.
///
/// ```ignore
/// async fn handler(AuthenticatedCaller(claims): AuthenticatedCaller) -> String {
///     claims.sub
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Claims);

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
	let value = parts
		.headers
		.get(AUTHORIZATION)
		.ok_or(AuthError::MissingCredentials)?
		.to_str()
		.map_err(|_| AuthError::MalformedHeader)?;

	let (scheme, token) = value.split_once(' ').ok_or(AuthError::MalformedHeader)?;
	if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
		return Err(AuthError::MalformedHeader);
	}
	Ok(token.trim())
}

impl FromRequestParts<AppState> for AuthenticatedCaller {
	type Rejection = ServerError;

	#[instrument(name = "AuthenticatedCaller::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
		let token = bearer_token(parts)?;
		let claims = state.verifier.verify(token).await.map_err(|e| {
			if let AuthError::KeyFetch(_) = &e {
				warn!(error = %e, "bearer verification could not reach key endpoint");
			}
			e
		})?;
		debug!(sub = %claims.sub, "caller authenticated");
		Ok(AuthenticatedCaller(claims))
	}
}
