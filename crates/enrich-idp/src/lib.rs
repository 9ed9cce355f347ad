// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity-provider integration.
//!
//! - [`ClientCredentialsBroker`] exchanges the service's client id and secret
//!   for a management API token (`POST /oauth/token`).
//! - [`CachingBroker`] optionally keeps that token until shortly before it
//!   expires.
//! - [`ManagementApiClient`] reads user records and patches `user_metadata`;
//!   it is both the pipeline's [`MetadataGate`](enrich_pipeline::MetadataGate)
//!   and its [`MetadataWriter`](enrich_pipeline::MetadataWriter).

mod broker;
mod cache;
mod config;
mod management;
mod record;

pub use broker::ClientCredentialsBroker;
pub use cache::{CachingBroker, TokenCache, DEFAULT_EXPIRY_MARGIN};
pub use config::{IdpConfig, IdpConfigError};
pub use management::{is_addressable_subject, ManagementApiClient};
pub use record::{metadata_scalar, Identity, UserRecord};
