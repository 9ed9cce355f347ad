// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the enrichment server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`ENRICH_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use enrich_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;

use enrich_idp::IdpConfig;
use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub idp: IdpConfig,
	pub auth: AuthConfig,
	pub providers: ProvidersConfig,
	pub pipeline: PipelineConfig,
	pub paths: PathsConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}

	/// Issuer inbound tokens must carry.
	pub fn issuer(&self) -> String {
		self.auth.issuer.clone().unwrap_or_else(|| self.idp.issuer())
	}

	/// Where the signing keys for inbound tokens are published.
	pub fn jwks_url(&self) -> String {
		match &self.auth.jwks_url {
			Some(url) => url.clone(),
			None => self.idp.jwks_url(),
		}
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ENRICH_SERVER_*`, then legacy names)
/// 2. Config file (`/etc/enrich/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let idp = layer.idp.unwrap_or_default().finalize()?;
	let auth = layer.auth.unwrap_or_default().finalize()?;
	let providers = layer.providers.unwrap_or_default().finalize()?;
	let pipeline = layer.pipeline.unwrap_or_default().finalize();
	let paths = layer.paths.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		host = %http.host,
		port = http.port,
		upstream_timeout_secs = http.upstream_timeout_secs,
		idp_domain = %idp.domain,
		write_mode = %pipeline.write_mode,
		token_cache = pipeline.token_cache,
		web_dir = ?paths.web_dir,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		idp,
		auth,
		providers,
		pipeline,
		paths,
		logging,
	})
}
