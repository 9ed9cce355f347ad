// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request-scoped data threaded through one pipeline run.

use std::time::{Duration, Instant};

use enrich_common_secret::SecretString;
use serde::Deserialize;

/// The inbound enrichment call.
///
/// Field names follow the public API (`subjectId`, `delegatedToken`,
/// `contactEmail`); the older `user` / `token` / `userEmail` keys are accepted
/// too.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRequest {
	#[serde(alias = "user")]
	pub subject_id: String,
	#[serde(alias = "token")]
	pub delegated_token: SecretString,
	#[serde(default, alias = "userEmail")]
	pub contact_email: Option<String>,
}

impl EnrichmentRequest {
	pub fn new(subject_id: impl Into<String>, delegated_token: impl Into<String>) -> Self {
		Self {
			subject_id: subject_id.into(),
			delegated_token: SecretString::new(delegated_token.into()),
			contact_email: None,
		}
	}

	pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
		self.contact_email = Some(email.into());
		self
	}
}

/// Bearer token for the identity-management API.
#[derive(Debug, Clone)]
pub struct ManagementToken {
	pub value: SecretString,
	pub audience: String,
	/// When the provider said the token stops working, if it said.
	pub expires_at: Option<Instant>,
	/// Set when the token was served from a cache rather than freshly minted.
	pub reused: bool,
}

impl ManagementToken {
	pub fn new(value: impl Into<String>, audience: impl Into<String>) -> Self {
		Self {
			value: SecretString::new(value.into()),
			audience: audience.into(),
			expires_at: None,
			reused: false,
		}
	}

	pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
		self.expires_at = Some(Instant::now() + lifetime);
		self
	}

	/// True if the token is still usable `margin` from now. Tokens without a
	/// known expiry are never considered fresh.
	pub fn is_fresh_for(&self, margin: Duration) -> bool {
		match self.expires_at {
			Some(expires_at) => Instant::now() + margin < expires_at,
			None => false,
		}
	}

	pub fn as_reused(&self) -> Self {
		Self {
			reused: true,
			..self.clone()
		}
	}
}

/// Mutable accumulator owned by exactly one pipeline run.
///
/// Moved from state to state; never shared between runs.
#[derive(Debug, Clone)]
pub struct PipelineContext {
	pub subject_id: String,
	pub delegated_token: SecretString,
	pub contact_email: Option<String>,
	pub management_token: Option<ManagementToken>,
	pub cached_value: Option<String>,
	pub resolved_value: Option<String>,
}

impl PipelineContext {
	pub fn new(request: EnrichmentRequest) -> Self {
		Self {
			subject_id: request.subject_id,
			delegated_token: request.delegated_token,
			contact_email: request.contact_email,
			management_token: None,
			cached_value: None,
			resolved_value: None,
		}
	}
}
