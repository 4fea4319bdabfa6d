// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server state management

use crate::config::ServerConfig;
use fp_core::{OperationDescriber, PublicationRegistry, RequestAdapter};
use std::sync::Arc;

/// Shared server state
///
/// The registry is complete before the state is built and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<PublicationRegistry>,
    pub adapter: Arc<RequestAdapter>,
    pub describer: Arc<OperationDescriber>,
}

impl AppState {
    /// Get configuration reference
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
