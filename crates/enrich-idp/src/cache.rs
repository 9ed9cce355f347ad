// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audience-keyed management token cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use enrich_pipeline::{AuthExchangeError, CredentialBroker, ManagementToken};
use tokio::sync::RwLock;
use tracing::debug;

/// Tokens are dropped from the cache this long before they expire.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Shared store of management tokens, one per audience.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
	inner: Arc<RwLock<HashMap<String, ManagementToken>>>,
}

impl TokenCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// A cached token for `audience` that stays valid for at least `margin`.
	pub async fn get_fresh(&self, audience: &str, margin: Duration) -> Option<ManagementToken> {
		let guard = self.inner.read().await;
		guard
			.get(audience)
			.filter(|token| token.is_fresh_for(margin))
			.cloned()
	}

	pub async fn insert(&self, token: ManagementToken) {
		let mut guard = self.inner.write().await;
		guard.insert(token.audience.clone(), token);
	}

	/// Removes the entry for `token.audience` if it still holds `token`.
	pub async fn remove_if_same(&self, token: &ManagementToken) -> bool {
		let mut guard = self.inner.write().await;
		match guard.get(&token.audience) {
			Some(cached) if cached.value == token.value => {
				guard.remove(&token.audience);
				true
			}
			_ => false,
		}
	}

	pub async fn len(&self) -> usize {
		self.inner.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.len().await == 0
	}
}

/// Wraps a broker so tokens are reused until they near expiry.
///
/// Tokens served from the cache carry `reused = true`, which lets the pipeline
/// re-acquire once if the management API rejects them.
pub struct CachingBroker {
	inner: Arc<dyn CredentialBroker>,
	cache: TokenCache,
	audience: String,
	margin: Duration,
}

impl CachingBroker {
	pub fn new(inner: Arc<dyn CredentialBroker>, cache: TokenCache, audience: impl Into<String>) -> Self {
		Self {
			inner,
			cache,
			audience: audience.into(),
			margin: DEFAULT_EXPIRY_MARGIN,
		}
	}

	pub fn with_margin(mut self, margin: Duration) -> Self {
		self.margin = margin;
		self
	}
}

#[async_trait]
impl CredentialBroker for CachingBroker {
	async fn acquire_management_token(&self) -> Result<ManagementToken, AuthExchangeError> {
		if let Some(token) = self.cache.get_fresh(&self.audience, self.margin).await {
			debug!(audience = %self.audience, "management token cache hit");
			return Ok(token.as_reused());
		}

		let token = self.inner.acquire_management_token().await?;
		// Tokens without a lifetime are never fresh, so caching them is pointless.
		if token.expires_at.is_some() {
			self.cache.insert(token.clone()).await;
		}
		Ok(token)
	}

	async fn invalidate(&self, token: &ManagementToken) {
		if self.cache.remove_if_same(token).await {
			debug!(audience = %token.audience, "management token evicted");
		}
		self.inner.invalidate(token).await;
	}
}
