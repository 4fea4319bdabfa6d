// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for publication and request execution

use thiserror::Error;

/// Errors raised while validating or registering a publication.
///
/// These are configuration-shape errors: they abort the registration and are
/// reported to the operator, never to end users.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Cannot publish procedure {procedure}: it does not yield a valid operation name")]
    InvalidName { procedure: String },

    #[error(
        "Cannot publish procedure {procedure}: security role '{role}' does not exist; use '*' to make the operation world readable"
    )]
    UnknownRole { procedure: String, role: String },

    #[error("Cannot publish procedure {procedure}: no such procedure")]
    UnknownProcedure { procedure: String },

    #[error("Cannot publish procedure {procedure}: it should have zero or one argument, found {count}")]
    TooManyArguments { procedure: String, count: usize },

    #[error("Cannot publish procedure {procedure}: argument '{argument}' should be an object, found {found}")]
    InvalidArgumentShape {
        procedure: String,
        argument: String,
        found: String,
    },

    #[error(
        "Cannot publish procedure {procedure}: argument type {entity} should be a transient object or a file document"
    )]
    ArgumentMustBeTransient { procedure: String, entity: String },

    #[error(
        "Cannot publish procedure {procedure}: return type {entity} should be a transient object or a file document"
    )]
    ReturnMustBeTransient { procedure: String, entity: String },

    #[error("Cannot publish procedure {procedure}: return type should be a String, Object or List, found {found}")]
    UnsupportedReturnType { procedure: String, found: String },

    #[error("An operation named '{name}' is already published")]
    DuplicateName { name: String },
}

/// Errors raised while serving a request for a published operation
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Operation '{0}' not found")]
    NotFound(String),

    #[error("Operation '{operation}' requires role '{role}'")]
    Forbidden { operation: String, role: String },

    #[error("Malformed request body: {0}")]
    MalformedRequestBody(String),

    #[error("Invalid request data: {0}")]
    Deserialization(#[source] CodecError),

    #[error("Procedure {procedure} failed")]
    ProcedureExecution {
        procedure: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unexpected result from procedure {procedure}: {detail}")]
    InternalInconsistency { procedure: String, detail: String },

    #[error("Object model error: {0}")]
    ObjectModel(#[source] CodecError),

    #[error("Cannot render operation description")]
    Render(#[source] serde_json::Error),
}

/// Errors raised by an [`crate::ObjectCodec`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unknown entity {0}")]
    UnknownEntity(String),

    #[error("expected a JSON object for {entity}")]
    NotAnObject { entity: String },

    #[error("member '{member}' of {entity} expects {expected}")]
    TypeMismatch {
        entity: String,
        member: String,
        expected: String,
    },

    #[error("{entity} has no member '{member}'")]
    UnknownMember { entity: String, member: String },
}

/// Errors raised by a [`crate::TypeIntrospector`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntrospectionError {
    #[error("unknown procedure {0}")]
    UnknownProcedure(String),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;
