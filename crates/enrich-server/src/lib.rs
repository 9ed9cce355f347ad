// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server for profile enrichment.
//!
//! Exposes one authenticated endpoint per enrichment pipeline plus a health
//! check, and optionally serves the web client's static build.

pub mod api;
pub mod auth;
pub mod error;
pub mod routes;
pub mod version;

pub use api::{create_app_state, create_router, with_static_files, AppState};
pub use auth::{AuthError, AuthenticatedCaller, Claims, JwksVerifier, TokenVerifier};
pub use enrich_server_config::ServerConfig;
pub use error::{ServerError, StartupError};
