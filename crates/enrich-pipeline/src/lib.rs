// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The enrichment pipeline.
//!
//! One inbound request drives one [`Pipeline::run`]. The run walks an explicit
//! state machine, moving a request-scoped [`PipelineContext`] from state to
//! state:
//!
//! ```text
//! Authenticated -> TokenAcquired -> GateChecked -> CacheHit                 (terminal)
//!                                              \-> Resolved -> Written      (terminal)
//! any stage failure                            --> Failed                   (terminal)
//! ```
//!
//! Each stage is a trait ([`CredentialBroker`], [`MetadataGate`],
//! [`EnrichmentResolver`], [`MetadataWriter`]) so the identity-provider and
//! data-provider clients live in their own crates and tests can swap in
//! in-memory doubles.

pub mod context;
pub mod error;
pub mod field;
pub mod orchestrator;
pub mod stage;
pub mod state;

pub use context::{EnrichmentRequest, ManagementToken, PipelineContext};
pub use error::{
	AuthExchangeError, LookupError, PipelineFailure, ResolutionError, StageError, WriteError,
};
pub use field::{MetadataField, UnknownFieldError};
pub use orchestrator::{OutcomeSource, Pipeline, PipelineOutcome, WriteMode, WriteStatus};
pub use stage::{CredentialBroker, EnrichmentResolver, GateResult, MetadataGate, MetadataWriter};
pub use state::{PipelineState, Stage, StateKind};
