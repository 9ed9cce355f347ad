// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for enrich-server.

pub mod auth;
pub mod http;
pub mod idp;
pub mod logging;
pub mod paths;
pub mod pipeline;
pub mod providers;

pub use auth::{AuthConfig, AuthConfigLayer, DEFAULT_JWKS_MIN_REFRESH_SECS};
pub use http::{HttpConfig, HttpConfigLayer, DEFAULT_PORT, DEFAULT_UPSTREAM_TIMEOUT_SECS};
pub use idp::IdpConfigLayer;
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use paths::{PathsConfig, PathsConfigLayer};
pub use pipeline::{PipelineConfig, PipelineConfigLayer};
pub use providers::{
	FullContactConfig, FullContactConfigLayer, GoogleConfig, GoogleConfigLayer, ProvidersConfig,
	ProvidersConfigLayer,
};
