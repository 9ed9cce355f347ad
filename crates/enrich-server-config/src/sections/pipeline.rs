// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pipeline behaviour switches.

use enrich_pipeline::WriteMode;
use serde::Deserialize;

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
	pub write_mode: WriteMode,
	/// Reuse management tokens until shortly before they expire.
	pub token_cache: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfigLayer {
	#[serde(default)]
	pub write_mode: Option<WriteMode>,
	#[serde(default)]
	pub token_cache: Option<bool>,
}

impl PipelineConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.write_mode.is_some() {
			self.write_mode = other.write_mode;
		}
		if other.token_cache.is_some() {
			self.token_cache = other.token_cache;
		}
	}

	pub fn finalize(self) -> PipelineConfig {
		PipelineConfig {
			write_mode: self.write_mode.unwrap_or_default(),
			token_cache: self.token_cache.unwrap_or(false),
		}
	}
}
