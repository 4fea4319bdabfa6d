// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! flow-publisher REST server
//!
//! Serves the operations held by a [`fp_core::PublicationRegistry`] over HTTP:
//! `GET /<root>/` lists them, `GET /<root>/<name>` describes one and
//! `POST /<root>/<name>` executes it.

pub mod auth;
pub mod config;
pub mod demo;
pub mod dependencies;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::{PublicationConfig, ServerConfig};
pub use dependencies::{publish_all, ServerDependencies};
pub use error::{ServerError, ServerResult};
pub use server::Server;
