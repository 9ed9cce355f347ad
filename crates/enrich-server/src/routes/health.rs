// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health HTTP handler.

use axum::{extract::State, Json};
use enrich_pipeline::WriteMode;
use enrich_server_config::ServerConfig;
use serde::Serialize;

use crate::api::AppState;
use crate::version::BuildInfo;

/// Configuration facts worth reporting, captured once at startup. Holds no
/// credentials.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
	pub version: &'static str,
	pub providers: ProviderSummary,
	pub write_mode: WriteMode,
	pub token_cache: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
	pub google: GoogleSummary,
	pub fullcontact: FullContactSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleSummary {
	pub api_url: String,
	pub identity_provider: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullContactSummary {
	pub api_url: String,
	pub api_key_configured: bool,
}

impl HealthSummary {
	pub fn from_config(config: &ServerConfig) -> Self {
		Self {
			version: BuildInfo::current().version,
			providers: ProviderSummary {
				google: GoogleSummary {
					api_url: config.providers.google.api_url.clone(),
					identity_provider: config.providers.google.identity_provider.clone(),
				},
				fullcontact: FullContactSummary {
					api_url: config.providers.fullcontact.api_url.clone(),
					api_key_configured: !config.providers.fullcontact.api_key.is_blank(),
				},
			},
			write_mode: config.pipeline.write_mode,
			token_cache: config.pipeline.token_cache,
		}
	}
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	#[serde(flatten)]
	pub summary: HealthSummary,
}

/// GET /health - liveness plus a configuration summary.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		summary: state.health.clone(),
	})
}
