// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
	routing::{get, post},
	Router,
};
use enrich_common_http::UpstreamClient;
use enrich_idp::{CachingBroker, ClientCredentialsBroker, ManagementApiClient, TokenCache};
use enrich_pipeline::{CredentialBroker, Pipeline};
use enrich_provider_fullcontact::{FullContactClient, GenderResolver};
use enrich_provider_google::{GoogleConnectionsResolver, PeopleClient};
use enrich_server_config::ServerConfig;
use tower_http::services::{ServeDir, ServeFile};

use crate::auth::{JwksVerifier, TokenVerifier};
use crate::error::StartupError;
use crate::routes;
use crate::routes::health::HealthSummary;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub google: Pipeline,
	pub gender: Pipeline,
	pub verifier: Arc<dyn TokenVerifier>,
	pub health: HealthSummary,
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState")
			.field("google", &self.google)
			.field("gender", &self.gender)
			.field("health", &self.health)
			.finish_non_exhaustive()
	}
}

/// Wires clients, resolvers and both pipelines from configuration.
///
/// Every upstream call shares one HTTP client so the configured timeout and
/// User-Agent apply everywhere.
pub fn create_app_state(config: &ServerConfig) -> Result<AppState, StartupError> {
	let http = UpstreamClient::new(config.http.upstream_timeout())?;

	// Hand-built configs skip layer finalization.
	let idp = config.idp.clone();
	idp.validate()?;

	let mut broker: Arc<dyn CredentialBroker> =
		Arc::new(ClientCredentialsBroker::new(http.clone(), idp.clone()));
	if config.pipeline.token_cache {
		tracing::info!(audience = %idp.management_audience, "management token cache enabled");
		broker = Arc::new(CachingBroker::new(
			broker,
			TokenCache::new(),
			idp.management_audience.clone(),
		));
	}

	let management = Arc::new(ManagementApiClient::new(http.clone(), &idp));

	let google_resolver = GoogleConnectionsResolver::new(
		ManagementApiClient::new(http.clone(), &idp),
		PeopleClient::with_base_url(http.clone(), config.providers.google.api_url.clone()),
	)
	.with_identity_provider(config.providers.google.identity_provider.clone());

	let gender_resolver = GenderResolver::new(FullContactClient::with_base_url(
		http.clone(),
		config.providers.fullcontact.api_key.clone(),
		config.providers.fullcontact.api_url.clone(),
	))
	.with_record_email(ManagementApiClient::new(http.clone(), &idp));

	let write_mode = config.pipeline.write_mode;
	let google = Pipeline::new(
		broker.clone(),
		management.clone(),
		Arc::new(google_resolver),
		management.clone(),
	)
	.with_write_mode(write_mode);
	let gender = Pipeline::new(broker, management.clone(), Arc::new(gender_resolver), management)
		.with_write_mode(write_mode);

	let verifier = JwksVerifier::new(
		http,
		config.jwks_url(),
		config.auth.audience.clone(),
		config.issuer(),
		Duration::from_secs(config.auth.jwks_min_refresh_secs),
	);

	Ok(AppState {
		google,
		gender,
		verifier: Arc::new(verifier),
		health: HealthSummary::from_config(config),
	})
}

/// Builds the API router.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/google", post(routes::enrich::enrich_google))
		.route("/api/gender", post(routes::enrich::enrich_gender))
		.route("/enrich/google", post(routes::enrich::enrich_google))
		.route("/enrich/gender", post(routes::enrich::enrich_gender))
		.with_state(state)
}

/// Serves the frontend build from `web_dir` for any path the API does not
/// claim. Unknown paths get `index.html` so client-side routing works.
pub fn with_static_files(router: Router, web_dir: &Path) -> Router {
	let index = web_dir.join("index.html");
	let serve_dir = ServeDir::new(web_dir)
		.append_index_html_on_directories(true)
		.fallback(ServeFile::new(index));
	router.fallback_service(serve_dir)
}
