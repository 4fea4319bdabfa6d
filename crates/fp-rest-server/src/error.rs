// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server error types and handling

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use fp_core::{ExecutionError, RegistrationError};
use fp_rest_api_contract::ProblemDetails;
use std::collections::HashMap;
use tracing::{debug, error};

/// Server result type
pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Publication failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Execution(err) => match err {
                ExecutionError::NotFound(_) => StatusCode::NOT_FOUND,
                ExecutionError::Forbidden { .. } => StatusCode::FORBIDDEN,
                ExecutionError::MalformedRequestBody(_) | ExecutionError::Deserialization(_) => {
                    StatusCode::BAD_REQUEST
                }
                ExecutionError::ProcedureExecution { .. }
                | ExecutionError::InternalInconsistency { .. }
                | ExecutionError::ObjectModel(_)
                | ExecutionError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Registration(_)
            | ServerError::Config(_)
            | ServerError::Io(_)
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert error to Problem+JSON response body
    pub fn to_problem(&self) -> ProblemDetails {
        let status = self.status().as_u16();
        match self {
            ServerError::Execution(err) => match err {
                ExecutionError::NotFound(_) => {
                    ProblemDetails::new("not-found", "Operation Not Found", status, err.to_string())
                }
                ExecutionError::Forbidden { .. } => {
                    ProblemDetails::new("forbidden", "Forbidden", status, err.to_string())
                }
                ExecutionError::MalformedRequestBody(_) => {
                    ProblemDetails::new("malformed-body", "Malformed Request Body", status, err.to_string())
                }
                ExecutionError::Deserialization(_) => {
                    ProblemDetails::new("invalid-arguments", "Invalid Arguments", status, err.to_string())
                }
                ExecutionError::ProcedureExecution { .. } => {
                    ProblemDetails::new("procedure-failed", "Procedure Failed", status, err.to_string())
                }
                ExecutionError::InternalInconsistency { procedure, .. } => ProblemDetails::new(
                    "internal",
                    "Internal Server Error",
                    status,
                    format!("Procedure {} produced an unexpected result", procedure),
                ),
                ExecutionError::ObjectModel(_) => ProblemDetails::new(
                    "internal",
                    "Internal Server Error",
                    status,
                    "Object model error",
                ),
                ExecutionError::Render(_) => ProblemDetails::new(
                    "internal",
                    "Internal Server Error",
                    status,
                    err.to_string(),
                ),
            },
            ServerError::Validation(errors) => {
                ProblemDetails::new("validation", "Validation Error", status, "Request validation failed")
                    .with_errors(field_errors(errors))
            }
            ServerError::Registration(_)
            | ServerError::Config(_)
            | ServerError::Io(_)
            | ServerError::Internal(_) => ProblemDetails::new(
                "internal",
                "Internal Server Error",
                status,
                "The server could not complete the request",
            ),
        }
    }
}

fn field_errors(errors: &validator::ValidationErrors) -> HashMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Display of `err` followed by every source, `: ` separated
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %error_chain(&self), "request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let mut response = (status, Json(self.to_problem())).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}
