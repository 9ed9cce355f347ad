// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use enrich_common_http::{RequestSpec, UpstreamClient, UpstreamError};
use enrich_common_secret::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

pub const DEFAULT_FULLCONTACT_API_URL: &str = "https://api.fullcontact.com";

/// The fields of a `person.enrich` response the service reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonSummary {
	#[serde(default)]
	pub gender: Option<String>,
}

#[derive(Clone)]
pub struct FullContactClient {
	http: UpstreamClient,
	api_key: SecretString,
	base_url: String,
}

impl std::fmt::Debug for FullContactClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FullContactClient")
			.field("api_key", &self.api_key)
			.field("base_url", &self.base_url)
			.finish_non_exhaustive()
	}
}

impl FullContactClient {
	pub fn new(http: UpstreamClient, api_key: SecretString) -> Self {
		Self::with_base_url(http, api_key, DEFAULT_FULLCONTACT_API_URL)
	}

	pub fn with_base_url(http: UpstreamClient, api_key: SecretString, base_url: impl Into<String>) -> Self {
		Self {
			http,
			api_key,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		}
	}

	/// Looks a person up by email.
	#[instrument(skip(self, email))]
	pub async fn enrich_person(&self, email: &str) -> Result<PersonSummary, UpstreamError> {
		let spec = RequestSpec::post(format!("{}/v3/person.enrich", self.base_url))
			.bearer(&self.api_key)
			.json(json!({ "email": email }));
		let person: PersonSummary = self.http.call_json(spec).await?;
		debug!(has_gender = person.gender.is_some(), "person enriched");
		Ok(person)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{body_json, header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[tokio::test]
	async fn posts_email_with_api_key() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/v3/person.enrich"))
			.and(header("authorization", "Bearer fc-key"))
			.and(body_json(json!({"email": "jane@example.com"})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"fullName": "Jane Doe",
				"gender": "Female",
				"ageRange": "30-39",
				"details": {"emails": []}
			})))
			.expect(1)
			.mount(&server)
			.await;

		let client = FullContactClient::with_base_url(
			UpstreamClient::new(None).unwrap(),
			SecretString::from("fc-key"),
			server.uri(),
		);
		let person = client.enrich_person("jane@example.com").await.unwrap();

		assert_eq!(person.gender.as_deref(), Some("Female"));
	}

	#[test]
	fn debug_hides_api_key() {
		let client = FullContactClient::new(UpstreamClient::new(None).unwrap(), SecretString::from("fc-live-key"));
		assert!(!format!("{client:?}").contains("fc-live-key"));
	}
}
