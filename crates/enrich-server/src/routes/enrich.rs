// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Enrichment endpoints.
//!
//! `POST /api/google` and `POST /api/gender` each run one pipeline and answer
//! `200 {field: value}`, whether the value was already stored or freshly
//! resolved.

use axum::{extract::State, Json};
use enrich_idp::is_addressable_subject;
use enrich_pipeline::{EnrichmentRequest, OutcomeSource, Pipeline};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::AppState;
use crate::auth::AuthenticatedCaller;
use crate::error::ServerError;

/// Request body. The web client historically nested the fields under
/// `bodyObject`; both shapes are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InboundBody {
	Wrapped {
		#[serde(rename = "bodyObject")]
		body_object: EnrichmentRequest,
	},
	Direct(EnrichmentRequest),
}

impl InboundBody {
	pub fn into_request(self) -> EnrichmentRequest {
		match self {
			InboundBody::Wrapped { body_object } => body_object,
			InboundBody::Direct(request) => request,
		}
	}
}

/// POST /api/google - count of the subject's Google connections.
pub async fn enrich_google(
	State(state): State<AppState>,
	caller: AuthenticatedCaller,
	Json(body): Json<InboundBody>,
) -> Result<Json<Map<String, Value>>, ServerError> {
	run_pipeline(&state.google, caller, body).await
}

/// POST /api/gender - the subject's gender from the contact email.
pub async fn enrich_gender(
	State(state): State<AppState>,
	caller: AuthenticatedCaller,
	Json(body): Json<InboundBody>,
) -> Result<Json<Map<String, Value>>, ServerError> {
	run_pipeline(&state.gender, caller, body).await
}

async fn run_pipeline(
	pipeline: &Pipeline,
	AuthenticatedCaller(claims): AuthenticatedCaller,
	body: InboundBody,
) -> Result<Json<Map<String, Value>>, ServerError> {
	let request = body.into_request();
	if request.subject_id.trim().is_empty() {
		return Err(ServerError::BadRequest("subjectId must not be empty".to_string()));
	}
	if !is_addressable_subject(&request.subject_id) {
		return Err(ServerError::BadRequest("subjectId is not a user id".to_string()));
	}

	debug!(caller = %claims.sub, subject = %request.subject_id, field = %pipeline.field(), "enrichment requested");

	let outcome = pipeline.run(request).await?;
	if let OutcomeSource::Resolved { write } = outcome.source {
		debug!(write = ?write, "value resolved");
	}

	let mut response = Map::new();
	response.insert(outcome.field.as_str().to_string(), Value::String(outcome.value));
	Ok(Json(response))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_wrapped_body() {
		let json = r#"{"bodyObject":{"user":"auth0|1","token":"t","userEmail":"a@b.c"}}"#;
		let request = serde_json::from_str::<InboundBody>(json).unwrap().into_request();
		assert_eq!(request.subject_id, "auth0|1");
		assert_eq!(request.contact_email.as_deref(), Some("a@b.c"));
	}

	#[test]
	fn accepts_direct_body() {
		let json = r#"{"subjectId":"auth0|2","delegatedToken":"t"}"#;
		let request = serde_json::from_str::<InboundBody>(json).unwrap().into_request();
		assert_eq!(request.subject_id, "auth0|2");
		assert!(request.contact_email.is_none());
	}

	#[test]
	fn rejects_body_without_subject() {
		assert!(serde_json::from_str::<InboundBody>(r#"{"bodyObject":{"token":"t"}}"#).is_err());
		assert!(serde_json::from_str::<InboundBody>(r#"{"foo":1}"#).is_err());
	}
}
