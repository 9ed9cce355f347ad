// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Google People API integration.
//!
//! [`GoogleConnectionsResolver`] derives the `googleConnections` metadata
//! field: it looks up the subject's linked Google identity through the
//! management API, then asks the People API how many connections that account
//! has.

mod client;
mod resolver;

pub use client::{ConnectionsPage, PeopleClient, DEFAULT_PEOPLE_API_URL};
pub use resolver::{GoogleConnectionsResolver, DEFAULT_IDENTITY_PROVIDER};
