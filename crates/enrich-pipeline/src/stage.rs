// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stage traits. Implementations live with the clients they wrap.

use async_trait::async_trait;

use crate::context::{ManagementToken, PipelineContext};
use crate::error::{AuthExchangeError, LookupError, ResolutionError, WriteError};
use crate::field::MetadataField;

/// Obtains bearer tokens for the identity-management API.
#[async_trait]
pub trait CredentialBroker: Send + Sync {
	async fn acquire_management_token(&self) -> Result<ManagementToken, AuthExchangeError>;

	/// Drop any cached copy of `token`. Brokers without a cache ignore this.
	async fn invalidate(&self, _token: &ManagementToken) {}
}

/// What the gate found for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateResult {
	Present(String),
	Absent,
}

impl GateResult {
	pub fn is_present(&self) -> bool {
		matches!(self, GateResult::Present(_))
	}

	pub fn value(&self) -> Option<&str> {
		match self {
			GateResult::Present(value) => Some(value),
			GateResult::Absent => None,
		}
	}
}

/// Reads one metadata field to decide whether the run can short-circuit.
#[async_trait]
pub trait MetadataGate: Send + Sync {
	async fn check_existing(
		&self,
		subject_id: &str,
		token: &ManagementToken,
		field: MetadataField,
	) -> Result<GateResult, LookupError>;
}

/// Derives one metadata field from an external provider. Must not write.
#[async_trait]
pub trait EnrichmentResolver: Send + Sync {
	fn field(&self) -> MetadataField;

	async fn resolve(&self, context: &PipelineContext) -> Result<String, ResolutionError>;
}

/// Persists one field into the subject's metadata, leaving the rest alone.
#[async_trait]
pub trait MetadataWriter: Send + Sync {
	async fn write(
		&self,
		subject_id: &str,
		token: &ManagementToken,
		field: MetadataField,
		value: &str,
	) -> Result<(), WriteError>;
}
