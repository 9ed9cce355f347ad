// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! External data providers.

use enrich_common_config::SecretString;
use enrich_provider_fullcontact::DEFAULT_FULLCONTACT_API_URL;
use enrich_provider_google::{DEFAULT_IDENTITY_PROVIDER, DEFAULT_PEOPLE_API_URL};
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct ProvidersConfig {
	pub google: GoogleConfig,
	pub fullcontact: FullContactConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
	pub api_url: String,
	/// `provider` value of the linked identity whose token is used.
	pub identity_provider: String,
}

impl Default for GoogleConfig {
	fn default() -> Self {
		GoogleConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone)]
pub struct FullContactConfig {
	pub api_url: String,
	pub api_key: SecretString,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfigLayer {
	#[serde(default)]
	pub google: Option<GoogleConfigLayer>,
	#[serde(default)]
	pub fullcontact: Option<FullContactConfigLayer>,
}

impl ProvidersConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if let Some(other_google) = other.google {
			let google = self.google.get_or_insert_with(Default::default);
			google.merge(other_google);
		}
		if let Some(other_fullcontact) = other.fullcontact {
			let fullcontact = self.fullcontact.get_or_insert_with(Default::default);
			fullcontact.merge(other_fullcontact);
		}
	}

	pub fn finalize(self) -> Result<ProvidersConfig, ConfigError> {
		Ok(ProvidersConfig {
			google: self.google.unwrap_or_default().finalize(),
			fullcontact: self.fullcontact.unwrap_or_default().finalize()?,
		})
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleConfigLayer {
	#[serde(default)]
	pub api_url: Option<String>,
	#[serde(default)]
	pub identity_provider: Option<String>,
}

impl GoogleConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.api_url.is_some() {
			self.api_url = other.api_url;
		}
		if other.identity_provider.is_some() {
			self.identity_provider = other.identity_provider;
		}
	}

	pub fn finalize(self) -> GoogleConfig {
		GoogleConfig {
			api_url: self
				.api_url
				.unwrap_or_else(|| DEFAULT_PEOPLE_API_URL.to_string()),
			identity_provider: self
				.identity_provider
				.unwrap_or_else(|| DEFAULT_IDENTITY_PROVIDER.to_string()),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FullContactConfigLayer {
	#[serde(default)]
	pub api_url: Option<String>,
	#[serde(default)]
	pub api_key: Option<SecretString>,
}

impl FullContactConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.api_url.is_some() {
			self.api_url = other.api_url;
		}
		if other.api_key.is_some() {
			self.api_key = other.api_key;
		}
	}

	pub fn finalize(self) -> Result<FullContactConfig, ConfigError> {
		let api_key = self.api_key.filter(|k| !k.is_blank()).ok_or_else(|| {
			ConfigError::missing(
				"ENRICH_SERVER_FULLCONTACT_API_KEY",
				"providers.fullcontact.api_key",
			)
		})?;
		Ok(FullContactConfig {
			api_url: self
				.api_url
				.unwrap_or_else(|| DEFAULT_FULLCONTACT_API_URL.to_string()),
			api_key,
		})
	}
}
