// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Common configuration primitives.
//!
//! - [`Secret`] / [`SecretString`] re-exported from [`enrich_common_secret`]
//! - [`load_secret_env`] / [`require_secret_env`] for `VAR` / `VAR_FILE` lookups

pub mod env;

pub use enrich_common_secret::{Secret, SecretString, REDACTED};

pub use env::{load_secret_env, require_secret_env, RequiredSecretError, SecretEnvError};
