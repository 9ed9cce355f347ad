// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Filesystem paths.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
	/// Built frontend served for any path no API route matches.
	pub web_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfigLayer {
	#[serde(default)]
	pub web_dir: Option<String>,
}

impl PathsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.web_dir.is_some() {
			self.web_dir = other.web_dir;
		}
	}

	pub fn finalize(self) -> PathsConfig {
		PathsConfig {
			web_dir: self.web_dir.filter(|d| !d.is_empty()).map(PathBuf::from),
		}
	}
}
