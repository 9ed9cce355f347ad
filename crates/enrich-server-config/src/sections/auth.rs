// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Inbound bearer-token verification settings.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::sections::idp::required;

/// Minimum seconds between signing-key refetches triggered by unknown key ids.
pub const DEFAULT_JWKS_MIN_REFRESH_SECS: u64 = 12;

#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Required `aud` claim of inbound tokens.
	pub audience: String,
	/// Required `iss` claim; `None` means `https://{idp.domain}/`.
	pub issuer: Option<String>,
	/// Signing-key document; `None` means `{idp base}/.well-known/jwks.json`.
	pub jwks_url: Option<String>,
	pub jwks_min_refresh_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub audience: Option<String>,
	#[serde(default)]
	pub issuer: Option<String>,
	#[serde(default)]
	pub jwks_url: Option<String>,
	#[serde(default)]
	pub jwks_min_refresh_secs: Option<u64>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.audience.is_some() {
			self.audience = other.audience;
		}
		if other.issuer.is_some() {
			self.issuer = other.issuer;
		}
		if other.jwks_url.is_some() {
			self.jwks_url = other.jwks_url;
		}
		if other.jwks_min_refresh_secs.is_some() {
			self.jwks_min_refresh_secs = other.jwks_min_refresh_secs;
		}
	}

	pub fn finalize(self) -> Result<AuthConfig, ConfigError> {
		Ok(AuthConfig {
			audience: required(self.audience, "ENRICH_SERVER_AUTH_AUDIENCE", "auth.audience")?,
			issuer: self.issuer,
			jwks_url: self.jwks_url,
			jwks_min_refresh_secs: self
				.jwks_min_refresh_secs
				.unwrap_or(DEFAULT_JWKS_MIN_REFRESH_SECS),
		})
	}
}
