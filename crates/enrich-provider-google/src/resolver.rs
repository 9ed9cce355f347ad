// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use enrich_idp::{Identity, ManagementApiClient, UserRecord};
use enrich_pipeline::{EnrichmentResolver, MetadataField, PipelineContext, ResolutionError};
use tracing::{debug, instrument, warn};

use crate::client::PeopleClient;

/// Connection strategy name of Google logins on the identity provider.
pub const DEFAULT_IDENTITY_PROVIDER: &str = "google-oauth2";

pub struct GoogleConnectionsResolver {
	management: ManagementApiClient,
	people: PeopleClient,
	identity_provider: String,
}

impl GoogleConnectionsResolver {
	pub fn new(management: ManagementApiClient, people: PeopleClient) -> Self {
		Self {
			management,
			people,
			identity_provider: DEFAULT_IDENTITY_PROVIDER.to_string(),
		}
	}

	pub fn with_identity_provider(mut self, provider: impl Into<String>) -> Self {
		self.identity_provider = provider.into();
		self
	}

	/// Exactly one linked identity for the configured provider.
	fn select_identity<'a>(&self, user: &'a UserRecord) -> Result<&'a Identity, ResolutionError> {
		let matches: Vec<&'a Identity> = user.identities_for(&self.identity_provider).collect();
		match matches.as_slice() {
			[identity] => Ok(*identity),
			[] => Err(ResolutionError::MissingIdentity {
				provider: self.identity_provider.clone(),
			}),
			many => {
				warn!(count = many.len(), "several linked identities for provider");
				Err(ResolutionError::AmbiguousIdentity {
					provider: self.identity_provider.clone(),
					count: many.len(),
				})
			}
		}
	}
}

#[async_trait]
impl EnrichmentResolver for GoogleConnectionsResolver {
	fn field(&self) -> MetadataField {
		MetadataField::GoogleConnections
	}

	#[instrument(skip(self, context), fields(subject = %context.subject_id))]
	async fn resolve(&self, context: &PipelineContext) -> Result<String, ResolutionError> {
		let token = context
			.management_token
			.as_ref()
			.ok_or(ResolutionError::MissingManagementToken)?;

		let user = self.management.get_user(&context.subject_id, token).await?;
		let identity = self.select_identity(&user)?;
		let access_token = match &identity.access_token {
			Some(token) if !token.is_blank() => token,
			_ => {
				return Err(ResolutionError::MissingIdentityToken {
					provider: self.identity_provider.clone(),
				})
			}
		};

		let page = self
			.people
			.list_connections(access_token)
			.await
			.map_err(|source| ResolutionError::Upstream {
				provider: "google",
				source,
			})?;

		let total = page.total_people.unwrap_or(0);
		debug!(total, "google connections resolved");
		Ok(total.to_string())
	}
}
