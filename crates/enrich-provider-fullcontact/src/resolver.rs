// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use enrich_idp::ManagementApiClient;
use enrich_pipeline::{EnrichmentResolver, MetadataField, PipelineContext, ResolutionError};
use tracing::{debug, instrument};

use crate::client::FullContactClient;

/// Resolves `gender` from the request's contact email, or from the email on
/// the user record when a management client is attached and the request
/// carries none.
#[derive(Debug, Clone)]
pub struct GenderResolver {
	client: FullContactClient,
	management: Option<ManagementApiClient>,
}

impl GenderResolver {
	pub fn new(client: FullContactClient) -> Self {
		Self {
			client,
			management: None,
		}
	}

	pub fn with_record_email(mut self, management: ManagementApiClient) -> Self {
		self.management = Some(management);
		self
	}

	async fn lookup_email(&self, context: &PipelineContext) -> Result<String, ResolutionError> {
		if let Some(email) = non_blank(context.contact_email.as_deref()) {
			return Ok(email.to_string());
		}
		let Some(management) = &self.management else {
			return Err(ResolutionError::MissingContactEmail);
		};
		let token = context
			.management_token
			.as_ref()
			.ok_or(ResolutionError::MissingManagementToken)?;

		let user = management.get_user(&context.subject_id, token).await?;
		match non_blank(user.email.as_deref()) {
			Some(email) => {
				debug!("using email from user record");
				Ok(email.to_string())
			}
			None => Err(ResolutionError::MissingContactEmail),
		}
	}
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
impl EnrichmentResolver for GenderResolver {
	fn field(&self) -> MetadataField {
		MetadataField::Gender
	}

	#[instrument(skip(self, context), fields(subject = %context.subject_id))]
	async fn resolve(&self, context: &PipelineContext) -> Result<String, ResolutionError> {
		let email = self.lookup_email(context).await?;

		let person = self
			.client
			.enrich_person(&email)
			.await
			.map_err(|source| ResolutionError::Upstream {
				provider: "fullcontact",
				source,
			})?;

		match person.gender {
			Some(gender) if !gender.trim().is_empty() => {
				debug!("gender resolved");
				Ok(gender)
			}
			_ => Err(ResolutionError::MissingField {
				provider: "fullcontact",
				field: "gender",
			}),
		}
	}
}
