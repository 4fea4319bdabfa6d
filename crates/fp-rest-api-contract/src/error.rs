// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for API contract validation and parsing

use thiserror::Error;

/// Errors that can occur during API contract validation and parsing
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid public URL {0}: must be http or https without query or fragment")]
    InvalidPublicUrl(String),

    #[error("Invalid service root: {0}")]
    InvalidServiceRoot(String),
}

/// Problem+JSON error response format as per RFC 7807
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub detail: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty", default)]
    pub errors: std::collections::HashMap<String, Vec<String>>,
}

impl ProblemDetails {
    /// Problem whose type URI ends in `slug`
    pub fn new(slug: &str, title: impl Into<String>, status: u16, detail: impl Into<String>) -> Self {
        Self {
            problem_type: format!("https://docs.flow-publisher.dev/errors/{}", slug),
            title: title.into(),
            status: Some(status),
            detail: detail.into(),
            errors: std::collections::HashMap::new(),
        }
    }

    pub fn with_errors(mut self, errors: std::collections::HashMap<String, Vec<String>>) -> Self {
        self.errors = errors;
        self
    }
}
