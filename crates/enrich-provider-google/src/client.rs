// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use enrich_common_http::{RequestSpec, UpstreamClient, UpstreamError};
use enrich_common_secret::SecretString;
use serde::Deserialize;
use tracing::{debug, instrument};

pub const DEFAULT_PEOPLE_API_URL: &str = "https://people.googleapis.com";

/// First page of `people.connections.list`. Only the total is read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsPage {
	/// Omitted by the API when the account has no connections.
	#[serde(default)]
	pub total_people: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct PeopleClient {
	http: UpstreamClient,
	base_url: String,
}

impl PeopleClient {
	pub fn new(http: UpstreamClient) -> Self {
		Self::with_base_url(http, DEFAULT_PEOPLE_API_URL)
	}

	pub fn with_base_url(http: UpstreamClient, base_url: impl Into<String>) -> Self {
		Self {
			http,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		}
	}

	/// Lists the authenticated account's connections, authorised by the
	/// account's own Google access token.
	#[instrument(skip(self, access_token))]
	pub async fn list_connections(&self, access_token: &SecretString) -> Result<ConnectionsPage, UpstreamError> {
		let url = format!(
			"{}/v1/people/me/connections?personFields=relations",
			self.base_url
		);
		let page: ConnectionsPage = self
			.http
			.call_json(RequestSpec::get(url).bearer(access_token))
			.await?;
		debug!(total_people = ?page.total_people, "connections listed");
		Ok(page)
	}
}
