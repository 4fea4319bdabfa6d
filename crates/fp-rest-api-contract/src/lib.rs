// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! flow-publisher REST API contract types and validation
//!
//! These types are shared between the server, the operation describer and
//! any client that talks to published operations.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
