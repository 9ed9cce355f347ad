// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The slice of the identity provider's user document the service reads.

use enrich_common_secret::SecretString;
use enrich_pipeline::MetadataField;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A user as returned by `GET /api/v2/users/{id}`. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
	pub user_id: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub user_metadata: Map<String, Value>,
	#[serde(default)]
	pub identities: Vec<Identity>,
}

/// One linked login on a user record.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
	/// Connection strategy, e.g. `google-oauth2`.
	pub provider: String,
	/// Only present on management API reads with the right scope.
	#[serde(default)]
	pub access_token: Option<SecretString>,
}

impl UserRecord {
	/// The stored value for `field`, if it counts as present.
	pub fn metadata_value(&self, field: MetadataField) -> Option<String> {
		self.user_metadata.get(field.as_str()).and_then(metadata_scalar)
	}

	/// Linked identities whose `provider` is `provider`. The iterator borrows
	/// only the record, so callers may pass a short-lived provider name.
	pub fn identities_for<'a>(&'a self, provider: &str) -> impl Iterator<Item = &'a Identity> + 'a {
		let provider = provider.to_owned();
		self.identities.iter().filter(move |identity| identity.provider == provider)
	}
}

/// Reduce a metadata value to the string the pipeline caches.
///
/// Strings are taken as-is unless empty; numbers and booleans are rendered.
/// Null, empty strings, arrays and objects are treated as absent.
pub fn metadata_scalar(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}
