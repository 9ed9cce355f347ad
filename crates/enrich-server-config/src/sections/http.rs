// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server and outbound client configuration.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 3005;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// HTTP configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
	/// Bound on every outbound call; `0` means unbounded.
	pub upstream_timeout_secs: u64,
}

impl Default for HttpConfig {
	fn default() -> Self {
		HttpConfigLayer::default().finalize()
	}
}

impl HttpConfig {
	pub fn upstream_timeout(&self) -> Option<Duration> {
		match self.upstream_timeout_secs {
			0 => None,
			secs => Some(Duration::from_secs(secs)),
		}
	}
}

/// HTTP configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub upstream_timeout_secs: Option<u64>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.upstream_timeout_secs.is_some() {
			self.upstream_timeout_secs = other.upstream_timeout_secs;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		HttpConfig {
			host: self.host.unwrap_or_else(|| "0.0.0.0".to_string()),
			port: self.port.unwrap_or(DEFAULT_PORT),
			upstream_timeout_secs: self
				.upstream_timeout_secs
				.unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
		}
	}
}
