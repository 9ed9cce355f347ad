// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Errors produced by [`crate::UpstreamClient`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
	/// The reqwest client could not be constructed.
	#[error("failed to build HTTP client: {0}")]
	Build(#[source] reqwest::Error),

	/// Connection, DNS, TLS or timeout failure; no response was read.
	#[error("transport error: {0}")]
	Transport(#[source] reqwest::Error),

	/// A response arrived but its body is not JSON.
	#[error("response body is not valid JSON: {0}")]
	Parse(#[source] serde_json::Error),

	/// A response arrived with a non-success status.
	#[error("upstream returned {status}: {body}")]
	Status { status: u16, body: String },
}

impl UpstreamError {
	pub fn status(&self) -> Option<u16> {
		match self {
			UpstreamError::Status { status, .. } => Some(*status),
			_ => None,
		}
	}

	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(401)
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, UpstreamError::Transport(e) if e.is_timeout())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_accessors() {
		let err = UpstreamError::Status {
			status: 401,
			body: "{}".to_string(),
		};
		assert_eq!(err.status(), Some(401));
		assert!(err.is_unauthorized());
		assert!(!err.is_timeout());
	}

	#[test]
	fn parse_error_has_no_status() {
		let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
		let err = UpstreamError::Parse(source);
		assert_eq!(err.status(), None);
		assert!(!err.is_unauthorized());
		assert!(err.to_string().starts_with("response body is not valid JSON"));
	}
}
