// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Management API: user reads and metadata patches.

use async_trait::async_trait;
use enrich_common_http::{RequestSpec, UpstreamClient};
use enrich_pipeline::{
	GateResult, LookupError, ManagementToken, MetadataField, MetadataGate, MetadataWriter, WriteError,
};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument, warn};

use crate::config::IdpConfig;
use crate::record::UserRecord;

/// Whether `subject_id` can name a user on the management API.
///
/// Blank ids and the dot segments `.` and `..` are refused: URL parsers treat
/// the latter as path navigation even when percent-encoded, so they would
/// address `/api/v2/users` or `/api/v2` instead of a user.
pub fn is_addressable_subject(subject_id: &str) -> bool {
	!matches!(subject_id.trim(), "" | "." | "..")
}

#[derive(Debug, Clone)]
pub struct ManagementApiClient {
	http: UpstreamClient,
	base_url: String,
}

impl ManagementApiClient {
	pub fn new(http: UpstreamClient, config: &IdpConfig) -> Self {
		Self {
			http,
			base_url: config.base_url(),
		}
	}

	/// `{base}/api/v2/users/{subject}` with the subject percent-encoded as one
	/// path segment (`auth0|123` becomes `auth0%7C123`). Only meaningful for
	/// subjects that pass [`is_addressable_subject`].
	pub fn user_url(&self, subject_id: &str) -> String {
		format!("{}/api/v2/users/{}", self.base_url, urlencoding::encode(subject_id))
	}

	/// Fetches the full user record.
	#[instrument(skip(self, token))]
	pub async fn get_user(&self, subject_id: &str, token: &ManagementToken) -> Result<UserRecord, LookupError> {
		if !is_addressable_subject(subject_id) {
			warn!("subject id is not addressable");
			return Err(LookupError::SubjectNotFound(subject_id.to_string()));
		}
		let spec = RequestSpec::get(self.user_url(subject_id)).bearer(&token.value);
		match self.http.call_json::<UserRecord>(spec).await {
			Ok(user) => Ok(user),
			Err(e) if e.status() == Some(404) => {
				warn!("subject not found");
				Err(LookupError::SubjectNotFound(subject_id.to_string()))
			}
			Err(e) => Err(e.into()),
		}
	}

	/// Sets one key of `user_metadata`. The provider merges the patch into the
	/// existing document, so other keys are left alone.
	#[instrument(skip(self, token, value))]
	pub async fn patch_user_metadata(
		&self,
		subject_id: &str,
		token: &ManagementToken,
		field: MetadataField,
		value: &str,
	) -> Result<(), WriteError> {
		let mut metadata = Map::new();
		metadata.insert(field.as_str().to_string(), Value::String(value.to_string()));

		let spec = RequestSpec::patch(self.user_url(subject_id))
			.bearer(&token.value)
			.json(json!({ "user_metadata": metadata }));
		self.http.call(spec).await?;
		debug!("user metadata patched");
		Ok(())
	}
}

#[async_trait]
impl MetadataGate for ManagementApiClient {
	async fn check_existing(
		&self,
		subject_id: &str,
		token: &ManagementToken,
		field: MetadataField,
	) -> Result<GateResult, LookupError> {
		let user = self.get_user(subject_id, token).await?;
		Ok(match user.metadata_value(field) {
			Some(value) => GateResult::Present(value),
			None => GateResult::Absent,
		})
	}
}

#[async_trait]
impl MetadataWriter for ManagementApiClient {
	async fn write(
		&self,
		subject_id: &str,
		token: &ManagementToken,
		field: MetadataField,
		value: &str,
	) -> Result<(), WriteError> {
		self.patch_user_metadata(subject_id, token, field, value).await
	}
}
