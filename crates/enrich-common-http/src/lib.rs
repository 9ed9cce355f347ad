// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the enrichment service.
//!
//! This crate provides:
//! - A pre-configured reqwest client with a consistent User-Agent header
//! - [`UpstreamClient`], the single outbound-call abstraction every stage uses:
//!   send one request, parse the body as JSON, never retry

mod client;
mod error;
mod upstream;

pub use client::{builder, new_client, new_client_with_timeout, user_agent};
pub use error::UpstreamError;
pub use upstream::{RequestSpec, UpstreamClient};
