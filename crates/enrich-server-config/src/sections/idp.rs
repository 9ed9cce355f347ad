// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity-provider tenant and back-end client credentials.

use enrich_common_config::SecretString;
use enrich_idp::IdpConfig;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdpConfigLayer {
	#[serde(default)]
	pub domain: Option<String>,
	#[serde(default)]
	pub client_id: Option<String>,
	#[serde(default)]
	pub client_secret: Option<SecretString>,
	#[serde(default)]
	pub management_audience: Option<String>,
	#[serde(default)]
	pub base_url: Option<String>,
}

impl IdpConfigLayer {
	pub fn merge(&mut self, other: IdpConfigLayer) {
		if other.domain.is_some() {
			self.domain = other.domain;
		}
		if other.client_id.is_some() {
			self.client_id = other.client_id;
		}
		if other.client_secret.is_some() {
			self.client_secret = other.client_secret;
		}
		if other.management_audience.is_some() {
			self.management_audience = other.management_audience;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
	}

	/// Resolves the layer into the identity-provider client's own config.
	/// Every field except `base_url` is required.
	pub fn finalize(self) -> Result<IdpConfig, ConfigError> {
		let domain = required(self.domain, "ENRICH_SERVER_IDP_DOMAIN", "idp.domain")?;
		let client_id = required(self.client_id, "ENRICH_SERVER_IDP_CLIENT_ID", "idp.client_id")?;
		let client_secret = self
			.client_secret
			.filter(|s| !s.is_blank())
			.ok_or_else(|| ConfigError::missing("ENRICH_SERVER_IDP_CLIENT_SECRET", "idp.client_secret"))?;
		let management_audience = required(
			self.management_audience,
			"ENRICH_SERVER_IDP_MANAGEMENT_AUDIENCE",
			"idp.management_audience",
		)?;

		let mut config = IdpConfig::new(domain, client_id, client_secret, management_audience);
		if let Some(base_url) = self.base_url {
			config = config.with_base_url(base_url);
		}
		config.validate().map_err(|e| ConfigError::InvalidValue {
			key: "idp".to_string(),
			message: e.to_string(),
		})?;
		Ok(config)
	}
}

pub(crate) fn required(value: Option<String>, env: &str, key: &str) -> Result<String, ConfigError> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
		.ok_or_else(|| ConfigError::missing(env, key))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn complete() -> IdpConfigLayer {
		IdpConfigLayer {
			domain: Some("tenant.example.com".to_string()),
			client_id: Some("backend".to_string()),
			client_secret: Some(SecretString::from("s3cret")),
			management_audience: Some("https://tenant.example.com/api/v2/".to_string()),
			base_url: None,
		}
	}

	#[test]
	fn test_complete_layer_finalizes() {
		let config = complete().finalize().unwrap();
		assert_eq!(config.domain, "tenant.example.com");
		assert_eq!(config.client_secret.expose(), "s3cret");
	}

	#[test]
	fn test_missing_domain_names_env_var() {
		let layer = IdpConfigLayer {
			domain: None,
			..complete()
		};
		let err = layer.finalize().unwrap_err();
		assert!(err.to_string().contains("ENRICH_SERVER_IDP_DOMAIN"));
	}

	#[test]
	fn test_blank_secret_is_missing() {
		let layer = IdpConfigLayer {
			client_secret: Some(SecretString::from("")),
			..complete()
		};
		let err = layer.finalize().unwrap_err();
		assert!(matches!(err, ConfigError::Missing { ref env, .. } if env == "ENRICH_SERVER_IDP_CLIENT_SECRET"));
	}

	#[test]
	fn test_domain_with_scheme_is_invalid() {
		let layer = IdpConfigLayer {
			domain: Some("https://tenant.example.com".to_string()),
			..complete()
		};
		assert!(matches!(layer.finalize(), Err(ConfigError::InvalidValue { .. })));
	}

	#[test]
	fn test_domain_with_path_is_invalid() {
		let layer = IdpConfigLayer {
			domain: Some("tenant.example.com/api".to_string()),
			..complete()
		};
		let err = layer.finalize().unwrap_err();
		assert!(err.to_string().contains("bare host name"), "{err}");
	}

	#[test]
	fn test_base_url_carried_into_client_config() {
		let layer = IdpConfigLayer {
			base_url: Some("http://127.0.0.1:9999/".to_string()),
			..complete()
		};
		let config = layer.finalize().unwrap();
		assert_eq!(config.token_url(), "http://127.0.0.1:9999/oauth/token");
		assert_eq!(config.issuer(), "https://tenant.example.com/");
	}
}
