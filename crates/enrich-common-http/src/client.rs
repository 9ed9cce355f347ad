// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! reqwest client construction with the service User-Agent.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Creates a client builder carrying the standard User-Agent.
///
/// Use this when a caller needs extra knobs (proxies, custom TLS roots).
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a client with no request timeout.
pub fn new_client() -> Result<Client, reqwest::Error> {
	builder().build()
}

/// Creates a client whose requests fail after `timeout`.
///
/// `None` leaves requests unbounded, matching [`new_client`].
pub fn new_client_with_timeout(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
	match timeout {
		Some(timeout) => builder().timeout(timeout).build(),
		None => new_client(),
	}
}

/// Returns the User-Agent string: `enrich/{version}`.
pub fn user_agent() -> String {
	format!("enrich/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_product_and_version() {
		let ua = user_agent();
		let (product, version) = ua.split_once('/').unwrap();
		assert_eq!(product, "enrich");
		assert!(!version.is_empty());
	}

	#[test]
	fn clients_build_with_and_without_timeout() {
		assert!(new_client().is_ok());
		assert!(new_client_with_timeout(Some(Duration::from_secs(5))).is_ok());
		assert!(new_client_with_timeout(None).is_ok());
	}
}
