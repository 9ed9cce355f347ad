// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Metadata fields the service knows how to derive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A key in the subject's `user_metadata` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataField {
	#[serde(rename = "googleConnections")]
	GoogleConnections,
	#[serde(rename = "gender")]
	Gender,
}

impl MetadataField {
	pub const ALL: [MetadataField; 2] = [MetadataField::GoogleConnections, MetadataField::Gender];

	/// The exact key used in the identity provider's metadata document.
	pub fn as_str(&self) -> &'static str {
		match self {
			MetadataField::GoogleConnections => "googleConnections",
			MetadataField::Gender => "gender",
		}
	}
}

impl fmt::Display for MetadataField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metadata field: {0}")]
pub struct UnknownFieldError(pub String);

impl FromStr for MetadataField {
	type Err = UnknownFieldError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		MetadataField::ALL
			.into_iter()
			.find(|field| field.as_str() == s)
			.ok_or_else(|| UnknownFieldError(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keys_match_metadata_document() {
		assert_eq!(MetadataField::GoogleConnections.as_str(), "googleConnections");
		assert_eq!(MetadataField::Gender.as_str(), "gender");
	}

	#[test]
	fn parses_known_keys_only() {
		assert_eq!(
			"googleConnections".parse::<MetadataField>(),
			Ok(MetadataField::GoogleConnections)
		);
		assert_eq!("gender".parse::<MetadataField>(), Ok(MetadataField::Gender));
		assert!("Gender".parse::<MetadataField>().is_err());
	}

	#[test]
	fn serializes_as_metadata_key() {
		let json = serde_json::to_string(&MetadataField::GoogleConnections).unwrap();
		assert_eq!(json, "\"googleConnections\"");
	}
}
