// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The upstream call abstraction.
//!
//! [`UpstreamClient::call`] sends exactly one request and hands back the parsed
//! JSON body. It never retries; callers decide what a failure means for their
//! stage.

use std::time::Duration;

use enrich_common_secret::SecretString;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument, trace, warn};

use crate::error::UpstreamError;

/// Description of one outbound request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
	pub method: Method,
	pub url: String,
	pub headers: Vec<(String, String)>,
	/// Sent as `Authorization: Bearer ...`; kept apart from `headers` so it
	/// stays redacted in logs.
	pub bearer: Option<SecretString>,
	pub body: Option<Value>,
}

impl RequestSpec {
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			headers: Vec::new(),
			bearer: None,
			body: None,
		}
	}

	pub fn get(url: impl Into<String>) -> Self {
		Self::new(Method::GET, url)
	}

	pub fn post(url: impl Into<String>) -> Self {
		Self::new(Method::POST, url)
	}

	pub fn patch(url: impl Into<String>) -> Self {
		Self::new(Method::PATCH, url)
	}

	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}

	pub fn bearer(mut self, token: &SecretString) -> Self {
		self.bearer = Some(token.clone());
		self
	}

	pub fn json(mut self, body: Value) -> Self {
		self.body = Some(body);
		self
	}
}

/// Sends [`RequestSpec`]s and parses JSON responses.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
	http: Client,
}

impl UpstreamClient {
	/// Creates a client; `timeout` bounds each request end to end.
	pub fn new(timeout: Option<Duration>) -> Result<Self, UpstreamError> {
		let http = crate::client::new_client_with_timeout(timeout).map_err(UpstreamError::Build)?;
		Ok(Self { http })
	}

	/// Wraps an existing reqwest client.
	pub fn from_client(http: Client) -> Self {
		Self { http }
	}

	/// Sends `spec` and parses the response body as JSON.
	///
	/// A `204 No Content` with an empty body yields `Value::Null`.
	#[instrument(skip(self, spec), fields(method = %spec.method, url = %spec.url))]
	pub async fn call(&self, spec: RequestSpec) -> Result<Value, UpstreamError> {
		let mut request = self
			.http
			.request(spec.method.clone(), &spec.url)
			.header(ACCEPT, "application/json");

		for (name, value) in &spec.headers {
			request = request.header(name.as_str(), value.as_str());
		}
		if let Some(token) = &spec.bearer {
			request = request.bearer_auth(token.expose());
		}
		if let Some(body) = &spec.body {
			request = request.json(body);
		}

		debug!("sending upstream request");

		let response = request.send().await.map_err(|e| {
			if e.is_timeout() {
				error!("upstream request timed out");
			} else {
				error!(error = %e, "upstream transport failure");
			}
			UpstreamError::Transport(e)
		})?;

		let status = response.status();
		let bytes = response.bytes().await.map_err(|e| {
			error!(error = %e, "failed to read upstream response body");
			UpstreamError::Transport(e)
		})?;

		debug!(status = %status, bytes = bytes.len(), "received upstream response");

		if !status.is_success() {
			let body = String::from_utf8_lossy(&bytes).into_owned();
			warn!(status = status.as_u16(), "upstream returned non-success status");
			trace!(body = %body, "upstream error body");
			return Err(UpstreamError::Status {
				status: status.as_u16(),
				body,
			});
		}

		if status == StatusCode::NO_CONTENT && bytes.is_empty() {
			return Ok(Value::Null);
		}

		serde_json::from_slice(&bytes).map_err(|e| {
			error!(error = %e, "upstream response is not valid JSON");
			UpstreamError::Parse(e)
		})
	}

	/// [`call`](Self::call), then deserialize into `T`.
	///
	/// A body that is JSON but the wrong shape is also a [`UpstreamError::Parse`].
	pub async fn call_json<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, UpstreamError> {
		let value = self.call(spec).await?;
		serde_json::from_value(value).map_err(UpstreamError::Parse)
	}
}
