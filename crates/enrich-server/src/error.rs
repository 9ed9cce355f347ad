// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the enrichment server.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use enrich_common_http::UpstreamError;
use enrich_idp::IdpConfigError;
use enrich_pipeline::PipelineFailure;
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;

/// Errors a request handler can return.
#[derive(Debug, Error)]
pub enum ServerError {
	#[error("unauthorized: {0}")]
	Unauthorized(#[from] AuthError),

	#[error("bad request: {0}")]
	BadRequest(String),

	/// A pipeline run ended in `Failed`. The caller learns nothing beyond the
	/// status code; the stage and cause go to the log.
	#[error(transparent)]
	Enrichment(#[from] PipelineFailure),
}

/// Errors raised while wiring the application state at startup.
#[derive(Debug, Error)]
pub enum StartupError {
	#[error("failed to build upstream HTTP client: {0}")]
	Http(#[from] UpstreamError),

	#[error(transparent)]
	Idp(#[from] IdpConfigError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		match self {
			ServerError::Unauthorized(err) => {
				tracing::debug!(error = %err, "rejecting unauthenticated request");
				(
					StatusCode::UNAUTHORIZED,
					Json(ErrorResponse {
						error: "unauthorized".to_string(),
						message: "A valid bearer token is required".to_string(),
					}),
				)
					.into_response()
			}
			ServerError::BadRequest(msg) => (
				StatusCode::BAD_REQUEST,
				Json(ErrorResponse {
					error: "bad_request".to_string(),
					message: msg,
				}),
			)
				.into_response(),
			ServerError::Enrichment(failure) => {
				tracing::debug!(stage = %failure.stage, "responding 500 for failed run");
				StatusCode::INTERNAL_SERVER_ERROR.into_response()
			}
		}
	}
}
