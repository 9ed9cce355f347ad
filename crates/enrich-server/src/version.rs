// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information for enrich-server.

use std::env::consts::{ARCH, OS};

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
	pub version: &'static str,
	pub platform: String,
}

impl BuildInfo {
	pub fn current() -> Self {
		Self {
			version: env!("CARGO_PKG_VERSION"),
			platform: format!("{OS}-{ARCH}"),
		}
	}
}

/// Format version info for display.
pub fn format_version_info() -> String {
	let info = BuildInfo::current();
	format!(
		"enrich-server version: {}\n\
         Platform:              {}",
		info.version, info.platform,
	)
}
