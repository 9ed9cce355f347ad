// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client-credentials exchange for management API tokens.

use std::time::Duration;

use async_trait::async_trait;
use enrich_common_http::{RequestSpec, UpstreamClient, UpstreamError};
use enrich_common_secret::SecretString;
use enrich_pipeline::{AuthExchangeError, CredentialBroker, ManagementToken};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, instrument};

use crate::config::IdpConfig;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<SecretString>,
	#[serde(default)]
	expires_in: Option<u64>,
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
}

// =============================================================================
// Broker
// =============================================================================

/// Mints a fresh management token on every call.
#[derive(Debug, Clone)]
pub struct ClientCredentialsBroker {
	http: UpstreamClient,
	config: IdpConfig,
}

impl ClientCredentialsBroker {
	pub fn new(http: UpstreamClient, config: IdpConfig) -> Self {
		Self { http, config }
	}

	pub fn audience(&self) -> &str {
		&self.config.management_audience
	}

	/// Performs the exchange without going through the trait object.
	#[instrument(skip(self), fields(audience = %self.config.management_audience))]
	pub async fn exchange(&self) -> Result<ManagementToken, AuthExchangeError> {
		let spec = RequestSpec::post(self.config.token_url()).json(json!({
			"grant_type": "client_credentials",
			"client_id": self.config.client_id,
			"client_secret": self.config.client_secret.expose(),
			"audience": self.config.management_audience,
		}));

		let value = match self.http.call(spec).await {
			Ok(value) => value,
			Err(UpstreamError::Status { status, body }) => {
				return Err(match serde_json::from_str::<OAuthErrorBody>(&body) {
					Ok(oauth) => {
						error!(status, error = %oauth.error, "token exchange rejected");
						AuthExchangeError::Rejected {
							error: oauth.error,
							description: oauth.error_description,
						}
					}
					Err(_) => {
						error!(status, "token exchange failed");
						AuthExchangeError::Upstream(UpstreamError::Status { status, body })
					}
				});
			}
			Err(e) => return Err(e.into()),
		};

		let response: TokenResponse =
			serde_json::from_value(value).map_err(|e| AuthExchangeError::Upstream(UpstreamError::Parse(e)))?;

		// Some providers answer 200 with an error document.
		if let Some(error) = response.error {
			error!(error = %error, "token exchange rejected");
			return Err(AuthExchangeError::Rejected {
				error,
				description: response.error_description,
			});
		}

		let access_token = match response.access_token {
			Some(token) if !token.is_blank() => token,
			_ => {
				error!("token exchange response has no access_token");
				return Err(AuthExchangeError::MissingAccessToken);
			}
		};

		debug!(expires_in = ?response.expires_in, "management token issued");

		let mut token = ManagementToken {
			value: access_token,
			audience: self.config.management_audience.clone(),
			expires_at: None,
			reused: false,
		};
		if let Some(secs) = response.expires_in {
			token = token.with_lifetime(Duration::from_secs(secs));
		}
		Ok(token)
	}
}

#[async_trait]
impl CredentialBroker for ClientCredentialsBroker {
	async fn acquire_management_token(&self) -> Result<ManagementToken, AuthExchangeError> {
		self.exchange().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{body_json, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn broker(server: &MockServer) -> ClientCredentialsBroker {
		let config = IdpConfig::new(
			"tenant.example.com",
			"backend-client",
			SecretString::from("client-secret"),
			"https://tenant.example.com/api/v2/",
		)
		.with_base_url(server.uri());
		ClientCredentialsBroker::new(UpstreamClient::new(None).unwrap(), config)
	}

	#[tokio::test]
	async fn exchanges_client_credentials() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/oauth/token"))
			.and(body_json(json!({
				"grant_type": "client_credentials",
				"client_id": "backend-client",
				"client_secret": "client-secret",
				"audience": "https://tenant.example.com/api/v2/"
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"access_token": "mgmt-abc",
				"token_type": "Bearer",
				"expires_in": 86400
			})))
			.expect(1)
			.mount(&server)
			.await;

		let token = broker(&server).acquire_management_token().await.unwrap();

		assert_eq!(token.value.expose(), "mgmt-abc");
		assert_eq!(token.audience, "https://tenant.example.com/api/v2/");
		assert!(!token.reused);
		assert!(token.is_fresh_for(Duration::from_secs(60)));
	}

	#[tokio::test]
	async fn oauth_error_body_is_rejected() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/oauth/token"))
			.respond_with(ResponseTemplate::new(401).set_body_json(json!({
				"error": "access_denied",
				"error_description": "Unauthorized"
			})))
			.mount(&server)
			.await;

		let err = broker(&server).acquire_management_token().await.unwrap_err();

		match err {
			AuthExchangeError::Rejected { error, description } => {
				assert_eq!(error, "access_denied");
				assert_eq!(description.as_deref(), Some("Unauthorized"));
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn error_document_with_200_is_rejected() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_client"})))
			.mount(&server)
			.await;

		let err = broker(&server).acquire_management_token().await.unwrap_err();
		assert!(matches!(err, AuthExchangeError::Rejected { .. }));
	}

	#[tokio::test]
	async fn missing_access_token_is_an_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
			.mount(&server)
			.await;

		let err = broker(&server).acquire_management_token().await.unwrap_err();
		assert!(matches!(err, AuthExchangeError::MissingAccessToken));
	}

	#[tokio::test]
	async fn non_oauth_failure_keeps_status() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
			.mount(&server)
			.await;

		let err = broker(&server).acquire_management_token().await.unwrap_err();
		match err {
			AuthExchangeError::Upstream(e) => assert_eq!(e.status(), Some(503)),
			other => panic!("unexpected error: {other:?}"),
		}
	}
}
