// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pipeline states and the stages that move between them.

use std::fmt;

use serde::Serialize;

use crate::context::PipelineContext;
use crate::error::PipelineFailure;
use crate::orchestrator::WriteStatus;

/// The I/O step that runs when leaving a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
	TokenAcquisition,
	GateCheck,
	Resolution,
	Write,
}

impl Stage {
	pub fn as_str(&self) -> &'static str {
		match self {
			Stage::TokenAcquisition => "token acquisition",
			Stage::GateCheck => "gate check",
			Stage::Resolution => "resolution",
			Stage::Write => "write",
		}
	}
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One position in a run. The context moves with the state.
#[derive(Debug)]
pub enum PipelineState {
	/// The caller's bearer credential has been verified.
	Authenticated(PipelineContext),
	/// `context.management_token` is set.
	TokenAcquired(PipelineContext),
	/// The gate ran; `context.cached_value` is set on a hit.
	GateChecked(PipelineContext),
	/// Terminal: the field already existed.
	CacheHit(PipelineContext),
	/// `context.resolved_value` is set.
	Resolved(PipelineContext),
	/// Terminal: the resolved value was written, or handed off when running
	/// in [`crate::WriteMode::Detached`].
	Written {
		context: PipelineContext,
		write: WriteStatus,
	},
	/// Terminal.
	Failed(PipelineFailure),
}

/// Payload-free mirror of [`PipelineState`], for run history and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
	Authenticated,
	TokenAcquired,
	GateChecked,
	CacheHit,
	Resolved,
	Written,
	Failed,
}

impl PipelineState {
	pub fn kind(&self) -> StateKind {
		match self {
			PipelineState::Authenticated(_) => StateKind::Authenticated,
			PipelineState::TokenAcquired(_) => StateKind::TokenAcquired,
			PipelineState::GateChecked(_) => StateKind::GateChecked,
			PipelineState::CacheHit(_) => StateKind::CacheHit,
			PipelineState::Resolved(_) => StateKind::Resolved,
			PipelineState::Written { .. } => StateKind::Written,
			PipelineState::Failed(_) => StateKind::Failed,
		}
	}

	pub fn is_terminal(&self) -> bool {
		self.kind().is_terminal()
	}
}

impl StateKind {
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			StateKind::CacheHit | StateKind::Written | StateKind::Failed
		)
	}
}
