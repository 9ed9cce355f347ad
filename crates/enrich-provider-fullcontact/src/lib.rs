// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! FullContact person enrichment.
//!
//! [`GenderResolver`] derives the `gender` metadata field from the contact
//! email supplied with the request, falling back to the email on the user
//! record.

mod client;
mod resolver;

pub use client::{FullContactClient, PersonSummary, DEFAULT_FULLCONTACT_API_URL};
pub use resolver::GenderResolver;
