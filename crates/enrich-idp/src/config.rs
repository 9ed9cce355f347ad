// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use enrich_common_secret::SecretString;

#[derive(Debug, thiserror::Error)]
pub enum IdpConfigError {
	#[error("invalid identity provider configuration: {0}")]
	Invalid(String),
}

/// Everything needed to talk to the identity provider as the back-end client.
#[derive(Debug, Clone)]
pub struct IdpConfig {
	/// Tenant domain, e.g. `example.eu.auth0.com`.
	pub domain: String,
	pub client_id: String,
	pub client_secret: SecretString,
	/// Audience requested for management tokens, usually
	/// `https://{domain}/api/v2/`.
	pub management_audience: String,
	/// Overrides `https://{domain}` for every call. Used by tests and by
	/// deployments that front the tenant with a custom domain.
	pub base_url: Option<String>,
}

impl IdpConfig {
	pub fn new(
		domain: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: SecretString,
		management_audience: impl Into<String>,
	) -> Self {
		Self {
			domain: domain.into(),
			client_id: client_id.into(),
			client_secret,
			management_audience: management_audience.into(),
			base_url: None,
		}
	}

	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());
		self
	}

	/// Root URL of the tenant, without a trailing slash.
	pub fn base_url(&self) -> String {
		match &self.base_url {
			Some(url) => url.trim_end_matches('/').to_string(),
			None => format!("https://{}", self.domain.trim_end_matches('/')),
		}
	}

	pub fn token_url(&self) -> String {
		format!("{}/oauth/token", self.base_url())
	}

	/// The `iss` claim the tenant puts in tokens it signs.
	pub fn issuer(&self) -> String {
		format!("https://{}/", self.domain.trim_end_matches('/'))
	}

	pub fn jwks_url(&self) -> String {
		format!("{}/.well-known/jwks.json", self.base_url())
	}

	pub fn validate(&self) -> Result<(), IdpConfigError> {
		if self.domain.trim().is_empty() {
			return Err(IdpConfigError::Invalid("domain is empty".to_string()));
		}
		if self.domain.contains("://") || self.domain.trim_end_matches('/').contains('/') {
			return Err(IdpConfigError::Invalid(format!(
				"domain must be a bare host name, got '{}'",
				self.domain
			)));
		}
		if self.client_id.trim().is_empty() {
			return Err(IdpConfigError::Invalid("client_id is empty".to_string()));
		}
		if self.client_secret.is_blank() {
			return Err(IdpConfigError::Invalid("client_secret is empty".to_string()));
		}
		if self.management_audience.trim().is_empty() {
			return Err(IdpConfigError::Invalid("management_audience is empty".to_string()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config() -> IdpConfig {
		IdpConfig::new(
			"tenant.example.com",
			"backend-client",
			SecretString::from("s3cret"),
			"https://tenant.example.com/api/v2/",
		)
	}

	#[test]
	fn urls_derive_from_domain() {
		let config = config();
		assert_eq!(config.base_url(), "https://tenant.example.com");
		assert_eq!(config.token_url(), "https://tenant.example.com/oauth/token");
		assert_eq!(config.issuer(), "https://tenant.example.com/");
		assert_eq!(
			config.jwks_url(),
			"https://tenant.example.com/.well-known/jwks.json"
		);
	}

	#[test]
	fn base_url_override_keeps_issuer() {
		let config = config().with_base_url("http://127.0.0.1:9999/");
		assert_eq!(config.token_url(), "http://127.0.0.1:9999/oauth/token");
		assert_eq!(config.issuer(), "https://tenant.example.com/");
	}

	#[test]
	fn validate_rejects_blank_fields() {
		assert!(config().validate().is_ok());

		let mut bad = config();
		bad.client_secret = SecretString::from("  ");
		assert!(bad.validate().is_err());

		let mut bad = config();
		bad.domain = "https://tenant.example.com".to_string();
		assert!(bad.validate().is_err());

		let mut bad = config();
		bad.domain = "tenant.example.com/api/v2".to_string();
		assert!(bad.validate().is_err());

		let mut trailing = config();
		trailing.domain = "tenant.example.com/".to_string();
		assert!(trailing.validate().is_ok());
	}

	#[test]
	fn debug_hides_client_secret() {
		assert!(!format!("{:?}", config()).contains("s3cret"));
	}
}
