// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Collaborator interfaces supplied by the hosting platform

use crate::error::{CodecError, IntrospectionError};
use crate::request::CallerContext;
use crate::types::{Arguments, DataObject, EntityDescriptor, ProcedureValue, TypeDescriptor};
use async_trait::async_trait;

/// Read-only view of procedure signatures and entity shapes
pub trait TypeIntrospector: Send + Sync {
    /// Parameters of `procedure` in declaration order
    fn argument_signature(
        &self,
        procedure: &str,
    ) -> Result<Vec<(String, TypeDescriptor)>, IntrospectionError>;

    fn return_type(&self, procedure: &str) -> Result<TypeDescriptor, IntrospectionError>;

    /// Entity shape with inherited attributes resolved
    fn entity(&self, entity: &str) -> Option<EntityDescriptor>;
}

/// Converts between typed objects and JSON
pub trait ObjectCodec: Send + Sync {
    /// Create a fresh transient instance scoped to the caller
    fn instantiate(&self, caller: &CallerContext, entity: &str) -> Result<DataObject, CodecError>;

    fn serialize(&self, object: &DataObject) -> Result<serde_json::Value, CodecError>;

    /// Fill `target` from `json`. In partial mode unknown keys are ignored.
    fn deserialize(
        &self,
        json: &serde_json::Value,
        target: &mut DataObject,
        partial: bool,
    ) -> Result<(), CodecError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RoleResolver: Send + Sync {
    fn role_exists(&self, role: &str) -> bool;
}

/// Runs a procedure on behalf of a caller
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcedureInvoker: Send + Sync {
    async fn invoke(
        &self,
        caller: &CallerContext,
        procedure: &str,
        arguments: Arguments,
    ) -> anyhow::Result<ProcedureValue>;
}
