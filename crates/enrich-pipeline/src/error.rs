// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stage error taxonomy.
//!
//! Each stage owns one error type. Transport and parse failures from the
//! upstream client are wrapped, never flattened, so logs keep the cause chain.

use enrich_common_http::UpstreamError;
use thiserror::Error;

use crate::state::Stage;

/// Credential Broker failures.
#[derive(Debug, Error)]
pub enum AuthExchangeError {
	#[error("token exchange request failed: {0}")]
	Upstream(#[from] UpstreamError),

	/// The token endpoint answered with an OAuth error document.
	#[error("identity provider rejected token exchange: {error}")]
	Rejected {
		error: String,
		description: Option<String>,
	},

	#[error("token exchange response has no access_token")]
	MissingAccessToken,
}

/// Metadata Gate failures, and subject-record reads in general.
#[derive(Debug, Error)]
pub enum LookupError {
	#[error("subject record lookup failed: {0}")]
	Upstream(#[from] UpstreamError),

	#[error("subject {0} not found")]
	SubjectNotFound(String),
}

impl LookupError {
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, LookupError::Upstream(e) if e.is_unauthorized())
	}
}

/// Enrichment Resolver failures.
#[derive(Debug, Error)]
pub enum ResolutionError {
	#[error("{provider} request failed: {source}")]
	Upstream {
		provider: &'static str,
		#[source]
		source: UpstreamError,
	},

	#[error("could not read subject record: {0}")]
	Lookup(#[from] LookupError),

	#[error("resolver needs a management token but the context has none")]
	MissingManagementToken,

	#[error("subject has no linked {provider} identity")]
	MissingIdentity { provider: String },

	#[error("subject has {count} linked {provider} identities; refusing to pick one")]
	AmbiguousIdentity { provider: String, count: usize },

	#[error("linked {provider} identity carries no access token")]
	MissingIdentityToken { provider: String },

	#[error("request has no contact email")]
	MissingContactEmail,

	#[error("{provider} response has no usable {field}")]
	MissingField {
		provider: &'static str,
		field: &'static str,
	},
}

/// Metadata Writer failures.
#[derive(Debug, Error)]
pub enum WriteError {
	#[error("metadata update failed: {0}")]
	Upstream(#[from] UpstreamError),
}

impl WriteError {
	pub fn is_unauthorized(&self) -> bool {
		match self {
			WriteError::Upstream(e) => e.is_unauthorized(),
		}
	}
}

/// Any stage's failure.
#[derive(Debug, Error)]
pub enum StageError {
	#[error(transparent)]
	AuthExchange(#[from] AuthExchangeError),

	#[error(transparent)]
	Lookup(#[from] LookupError),

	#[error(transparent)]
	Resolution(#[from] ResolutionError),

	#[error(transparent)]
	Write(#[from] WriteError),

	/// A state was stepped without the data an earlier stage should have left
	/// in the context.
	#[error("pipeline precondition violated: {0}")]
	Precondition(&'static str),
}

/// Terminal failure of a run: which stage broke and why.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {error}")]
pub struct PipelineFailure {
	pub stage: Stage,
	#[source]
	pub error: StageError,
}

impl PipelineFailure {
	pub fn new(stage: Stage, error: impl Into<StageError>) -> Self {
		Self {
			stage,
			error: error.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn unauthorized() -> UpstreamError {
		UpstreamError::Status {
			status: 401,
			body: String::new(),
		}
	}

	#[test]
	fn lookup_unauthorized_only_for_401() {
		assert!(LookupError::Upstream(unauthorized()).is_unauthorized());
		assert!(!LookupError::SubjectNotFound("auth0|1".to_string()).is_unauthorized());
		let forbidden = UpstreamError::Status {
			status: 403,
			body: String::new(),
		};
		assert!(!LookupError::Upstream(forbidden).is_unauthorized());
	}

	#[test]
	fn write_unauthorized_only_for_401() {
		assert!(WriteError::Upstream(unauthorized()).is_unauthorized());
	}

	#[test]
	fn failure_message_names_stage() {
		let failure = PipelineFailure::new(Stage::TokenAcquisition, AuthExchangeError::MissingAccessToken);
		assert_eq!(
			failure.to_string(),
			"token acquisition stage failed: token exchange response has no access_token"
		);
	}

	#[test]
	fn ambiguous_identity_message() {
		let err = ResolutionError::AmbiguousIdentity {
			provider: "google-oauth2".to_string(),
			count: 2,
		};
		assert_eq!(
			err.to_string(),
			"subject has 2 linked google-oauth2 identities; refusing to pick one"
		);
	}
}
