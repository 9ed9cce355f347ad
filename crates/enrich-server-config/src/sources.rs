// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use enrich_common_config::{load_secret_env, SecretString};
use enrich_pipeline::WriteMode;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, FullContactConfigLayer, GoogleConfigLayer, HttpConfigLayer, IdpConfigLayer,
	LoggingConfigLayer, PathsConfigLayer, PipelineConfigLayer, ProvidersConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/enrich/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `ENRICH_SERVER_<SECTION>_<FIELD>`. The legacy deployment names
/// (`REACT_APP_DOMAIN`, `CLIENT_ID_BACK`,
/// `CLIENT_SECRET`, `SERVER_AUDIENCE`, `REACT_APP_AUDIENCE`,
/// `FULLCONTACT_TOKEN`, `PORT`) are read as fallbacks.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			idp: Some(load_idp_from_env()?),
			auth: Some(load_auth_from_env()?),
			providers: Some(load_providers_from_env()?),
			pipeline: Some(load_pipeline_from_env()?),
			paths: Some(load_paths_from_env()),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u16 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn secret_env(name: &str) -> Result<Option<SecretString>, ConfigError> {
	load_secret_env(name).map_err(|e| ConfigError::Secret(e.to_string()))
}

fn secret_env_or(name: &str, legacy: &str) -> Result<Option<SecretString>, ConfigError> {
	match secret_env(name)? {
		Some(secret) => Ok(Some(secret)),
		None => secret_env(legacy),
	}
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	let port = match env_u16("ENRICH_SERVER_PORT")? {
		Some(port) => Some(port),
		None => env_u16("PORT")?,
	};
	Ok(HttpConfigLayer {
		host: env_var("ENRICH_SERVER_HOST"),
		port,
		upstream_timeout_secs: env_u64("ENRICH_SERVER_UPSTREAM_TIMEOUT_SECS")?,
	})
}

fn load_idp_from_env() -> Result<IdpConfigLayer, ConfigError> {
	Ok(IdpConfigLayer {
		domain: env_var("ENRICH_SERVER_IDP_DOMAIN").or_else(|| env_var("REACT_APP_DOMAIN")),
		client_id: env_var("ENRICH_SERVER_IDP_CLIENT_ID").or_else(|| env_var("CLIENT_ID_BACK")),
		client_secret: secret_env_or("ENRICH_SERVER_IDP_CLIENT_SECRET", "CLIENT_SECRET")?,
		management_audience: env_var("ENRICH_SERVER_IDP_MANAGEMENT_AUDIENCE")
			.or_else(|| env_var("SERVER_AUDIENCE")),
		base_url: env_var("ENRICH_SERVER_IDP_BASE_URL"),
	})
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	Ok(AuthConfigLayer {
		audience: env_var("ENRICH_SERVER_AUTH_AUDIENCE").or_else(|| env_var("REACT_APP_AUDIENCE")),
		issuer: env_var("ENRICH_SERVER_AUTH_ISSUER"),
		jwks_url: env_var("ENRICH_SERVER_AUTH_JWKS_URL"),
		jwks_min_refresh_secs: env_u64("ENRICH_SERVER_AUTH_JWKS_MIN_REFRESH_SECS")?,
	})
}

fn load_providers_from_env() -> Result<ProvidersConfigLayer, ConfigError> {
	Ok(ProvidersConfigLayer {
		google: Some(GoogleConfigLayer {
			api_url: env_var("ENRICH_SERVER_GOOGLE_API_URL"),
			identity_provider: env_var("ENRICH_SERVER_GOOGLE_IDENTITY_PROVIDER"),
		}),
		fullcontact: Some(FullContactConfigLayer {
			api_url: env_var("ENRICH_SERVER_FULLCONTACT_API_URL"),
			api_key: secret_env_or("ENRICH_SERVER_FULLCONTACT_API_KEY", "FULLCONTACT_TOKEN")?,
		}),
	})
}

fn load_pipeline_from_env() -> Result<PipelineConfigLayer, ConfigError> {
	let write_mode = match env_var("ENRICH_SERVER_WRITE_MODE") {
		Some(v) => Some(
			v.parse::<WriteMode>()
				.map_err(|message| ConfigError::InvalidValue {
					key: "ENRICH_SERVER_WRITE_MODE".to_string(),
					message,
				})?,
		),
		None => None,
	};

	Ok(PipelineConfigLayer {
		write_mode,
		token_cache: env_bool("ENRICH_SERVER_TOKEN_CACHE"),
	})
}

fn load_paths_from_env() -> PathsConfigLayer {
	PathsConfigLayer {
		web_dir: env_var("ENRICH_SERVER_WEB_DIR"),
	}
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("ENRICH_SERVER_LOG_LEVEL"),
	}
}
