// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sequences the stages of one enrichment run.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::context::{EnrichmentRequest, ManagementToken, PipelineContext};
use crate::error::{AuthExchangeError, PipelineFailure, StageError};
use crate::field::MetadataField;
use crate::stage::{CredentialBroker, EnrichmentResolver, GateResult, MetadataGate, MetadataWriter};
use crate::state::{PipelineState, Stage, StateKind};

/// Whether a run waits for the metadata write before it completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
	/// Complete only after the write succeeded; a failed write fails the run.
	#[default]
	Await,
	/// Spawn the write and complete immediately. The outcome is only logged.
	Detached,
}

impl WriteMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			WriteMode::Await => "await",
			WriteMode::Detached => "detached",
		}
	}
}

impl fmt::Display for WriteMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for WriteMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"await" => Ok(WriteMode::Await),
			"detached" => Ok(WriteMode::Detached),
			other => Err(format!("unknown write mode '{other}', expected 'await' or 'detached'")),
		}
	}
}

/// What happened to the write of a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
	Confirmed,
	Dispatched,
}

/// Where a run's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum OutcomeSource {
	Cached,
	Resolved { write: WriteStatus },
}

/// Successful end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
	pub field: MetadataField,
	pub value: String,
	pub source: OutcomeSource,
	/// Every state the run passed through, in order.
	pub history: Vec<StateKind>,
}

/// One enrichment workflow for one metadata field.
///
/// Cheap to clone; the stage implementations are shared, the per-run
/// [`PipelineContext`] is not.
#[derive(Clone)]
pub struct Pipeline {
	broker: Arc<dyn CredentialBroker>,
	gate: Arc<dyn MetadataGate>,
	resolver: Arc<dyn EnrichmentResolver>,
	writer: Arc<dyn MetadataWriter>,
	write_mode: WriteMode,
}

impl fmt::Debug for Pipeline {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Pipeline")
			.field("field", &self.resolver.field())
			.field("write_mode", &self.write_mode)
			.finish_non_exhaustive()
	}
}

impl Pipeline {
	pub fn new(
		broker: Arc<dyn CredentialBroker>,
		gate: Arc<dyn MetadataGate>,
		resolver: Arc<dyn EnrichmentResolver>,
		writer: Arc<dyn MetadataWriter>,
	) -> Self {
		Self {
			broker,
			gate,
			resolver,
			writer,
			write_mode: WriteMode::default(),
		}
	}

	pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
		self.write_mode = write_mode;
		self
	}

	pub fn field(&self) -> MetadataField {
		self.resolver.field()
	}

	pub fn write_mode(&self) -> WriteMode {
		self.write_mode
	}

	/// Drives a request from `Authenticated` to a terminal state.
	#[instrument(skip(self, request), fields(field = %self.field(), subject = %request.subject_id))]
	pub async fn run(&self, request: EnrichmentRequest) -> Result<PipelineOutcome, PipelineFailure> {
		let field = self.field();
		let mut state = PipelineState::Authenticated(PipelineContext::new(request));
		let mut history = vec![state.kind()];

		loop {
			state = self.step(state).await;
			history.push(state.kind());

			match state {
				PipelineState::CacheHit(context) => {
					let value = context.cached_value.ok_or_else(|| {
						PipelineFailure::new(Stage::GateCheck, StageError::Precondition("cache hit without value"))
					})?;
					info!(value = %value, "metadata already present");
					return Ok(PipelineOutcome {
						field,
						value,
						source: OutcomeSource::Cached,
						history,
					});
				}
				PipelineState::Written { context, write } => {
					let value = context.resolved_value.ok_or_else(|| {
						PipelineFailure::new(Stage::Write, StageError::Precondition("written without value"))
					})?;
					info!(value = %value, write = ?write, "metadata enriched");
					return Ok(PipelineOutcome {
						field,
						value,
						source: OutcomeSource::Resolved { write },
						history,
					});
				}
				PipelineState::Failed(failure) => {
					error!(stage = %failure.stage, error = %failure.error, "enrichment failed");
					return Err(failure);
				}
				other => state = other,
			}
		}
	}

	/// Performs the single transition out of `state`. Terminal states are
	/// returned unchanged.
	pub async fn step(&self, state: PipelineState) -> PipelineState {
		match state {
			PipelineState::Authenticated(context) => self.acquire_token(context).await,
			PipelineState::TokenAcquired(context) => self.check_gate(context).await,
			PipelineState::GateChecked(context) => {
				if context.cached_value.is_some() {
					PipelineState::CacheHit(context)
				} else {
					self.resolve(context).await
				}
			}
			PipelineState::Resolved(context) => self.write(context).await,
			terminal => terminal,
		}
	}

	async fn acquire_token(&self, mut context: PipelineContext) -> PipelineState {
		match self.broker.acquire_management_token().await {
			Ok(token) => {
				debug!(audience = %token.audience, reused = token.reused, "management token acquired");
				context.management_token = Some(token);
				PipelineState::TokenAcquired(context)
			}
			Err(e) => PipelineState::Failed(PipelineFailure::new(Stage::TokenAcquisition, e)),
		}
	}

	async fn check_gate(&self, mut context: PipelineContext) -> PipelineState {
		let Some(token) = context.management_token.clone() else {
			return precondition(Stage::GateCheck, "gate check without management token");
		};
		let field = self.field();

		let result = match self.gate.check_existing(&context.subject_id, &token, field).await {
			Err(e) if e.is_unauthorized() && token.reused => {
				warn!("cached management token rejected by gate, re-acquiring");
				let fresh = match self.reacquire(&token).await {
					Ok(fresh) => fresh,
					Err(e) => return PipelineState::Failed(PipelineFailure::new(Stage::TokenAcquisition, e)),
				};
				let retried = self.gate.check_existing(&context.subject_id, &fresh, field).await;
				context.management_token = Some(fresh);
				retried
			}
			other => other,
		};

		match result {
			Ok(GateResult::Present(value)) => {
				context.cached_value = Some(value);
				PipelineState::GateChecked(context)
			}
			Ok(GateResult::Absent) => {
				debug!("metadata field absent");
				PipelineState::GateChecked(context)
			}
			Err(e) => PipelineState::Failed(PipelineFailure::new(Stage::GateCheck, e)),
		}
	}

	async fn resolve(&self, mut context: PipelineContext) -> PipelineState {
		match self.resolver.resolve(&context).await {
			Ok(value) => {
				debug!(value = %value, "value resolved");
				context.resolved_value = Some(value);
				PipelineState::Resolved(context)
			}
			Err(e) => PipelineState::Failed(PipelineFailure::new(Stage::Resolution, e)),
		}
	}

	async fn write(&self, mut context: PipelineContext) -> PipelineState {
		let Some(token) = context.management_token.clone() else {
			return precondition(Stage::Write, "write without management token");
		};
		let Some(value) = context.resolved_value.clone() else {
			return precondition(Stage::Write, "write without resolved value");
		};
		let field = self.field();

		if self.write_mode == WriteMode::Detached {
			let writer = Arc::clone(&self.writer);
			let subject_id = context.subject_id.clone();
			tokio::spawn(async move {
				match writer.write(&subject_id, &token, field, &value).await {
					Ok(()) => info!(subject = %subject_id, field = %field, "detached metadata write succeeded"),
					Err(e) => error!(subject = %subject_id, field = %field, error = %e, "detached metadata write failed"),
				}
			});
			return PipelineState::Written {
				context,
				write: WriteStatus::Dispatched,
			};
		}

		let result = match self.writer.write(&context.subject_id, &token, field, &value).await {
			Err(e) if e.is_unauthorized() && token.reused => {
				warn!("cached management token rejected by writer, re-acquiring");
				let fresh = match self.reacquire(&token).await {
					Ok(fresh) => fresh,
					Err(e) => return PipelineState::Failed(PipelineFailure::new(Stage::TokenAcquisition, e)),
				};
				let retried = self.writer.write(&context.subject_id, &fresh, field, &value).await;
				context.management_token = Some(fresh);
				retried
			}
			other => other,
		};

		match result {
			Ok(()) => PipelineState::Written {
				context,
				write: WriteStatus::Confirmed,
			},
			Err(e) => PipelineState::Failed(PipelineFailure::new(Stage::Write, e)),
		}
	}

	async fn reacquire(&self, stale: &ManagementToken) -> Result<ManagementToken, AuthExchangeError> {
		self.broker.invalidate(stale).await;
		self.broker.acquire_management_token().await
	}
}

fn precondition(stage: Stage, what: &'static str) -> PipelineState {
	PipelineState::Failed(PipelineFailure::new(stage, StageError::Precondition(what)))
}
