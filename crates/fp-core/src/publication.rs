// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Published operation records

use crate::error::ExecutionError;
use crate::request::CallerContext;
use crate::types::{ObjectType, PrimitiveKind, TypeDescriptor};

/// Role name that makes an operation world readable
pub const ANY_ROLE: &str = "*";

/// Access requirement of a published operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    Anyone,
    Role(String),
}

impl RoleRequirement {
    pub fn parse(role: &str) -> Self {
        if role == ANY_ROLE {
            RoleRequirement::Anyone
        } else {
            RoleRequirement::Role(role.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RoleRequirement::Anyone => ANY_ROLE,
            RoleRequirement::Role(role) => role,
        }
    }

    pub fn permits(&self, caller: &CallerContext) -> bool {
        match self {
            RoleRequirement::Anyone => true,
            RoleRequirement::Role(role) => caller.has_role(role),
        }
    }
}

/// How the procedure's result is written back, pinned at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    None,
    String,
    Object,
    List,
}

/// The single input argument of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationArgument {
    pub name: String,
    pub object_type: ObjectType,
}

/// A validated, immutable published operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationRecord {
    name: String,
    procedure: String,
    required_role: RoleRequirement,
    argument: Option<OperationArgument>,
    return_kind: ReturnKind,
    return_type: Option<ObjectType>,
    description: String,
}

impl PublicationRecord {
    pub(crate) fn new(
        name: String,
        procedure: String,
        required_role: RoleRequirement,
        argument: Option<OperationArgument>,
        return_kind: ReturnKind,
        return_type: Option<ObjectType>,
        description: String,
    ) -> Self {
        Self {
            name,
            procedure,
            required_role,
            argument,
            return_kind,
            return_type,
            description,
        }
    }

    /// Operation name (procedure name without its namespace)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified procedure name
    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    pub fn required_role(&self) -> &RoleRequirement {
        &self.required_role
    }

    pub fn has_argument(&self) -> bool {
        self.argument.is_some()
    }

    pub fn argument(&self) -> Option<&OperationArgument> {
        self.argument.as_ref()
    }

    pub fn return_kind(&self) -> ReturnKind {
        self.return_kind
    }

    pub fn return_type(&self) -> Option<&ObjectType> {
        self.return_type.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Type descriptor of the argument, if any
    pub fn argument_descriptor(&self) -> Option<TypeDescriptor> {
        self.argument
            .as_ref()
            .map(|argument| TypeDescriptor::Object(argument.object_type.clone()))
    }

    /// Type descriptor of the result as classified at registration
    pub fn result_descriptor(&self) -> TypeDescriptor {
        match (self.return_kind, &self.return_type) {
            (ReturnKind::String, _) => TypeDescriptor::Primitive(PrimitiveKind::String),
            (ReturnKind::Object, Some(object)) => TypeDescriptor::Object(object.clone()),
            (ReturnKind::List, Some(object)) => TypeDescriptor::List(object.clone()),
            _ => TypeDescriptor::Void,
        }
    }

    /// Check that `caller` may describe or invoke this operation
    pub fn authorize(&self, caller: &CallerContext) -> Result<(), ExecutionError> {
        if self.required_role.permits(caller) {
            Ok(())
        } else {
            Err(ExecutionError::Forbidden {
                operation: self.name.clone(),
                role: self.required_role.as_str().to_string(),
            })
        }
    }
}

/// Operation name for a qualified procedure name: the part after the last `.`
pub fn operation_name(procedure: &str) -> Option<&str> {
    let name = procedure.rsplit('.').next().unwrap_or(procedure).trim();
    (!name.is_empty()).then_some(name)
}

/// Canonical URL of an operation: `<base>/<root>/<name>`
pub fn service_url(base_url: &str, service_root: &str, name: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let root = service_root.trim_matches('/');
    if root.is_empty() {
        format!("{}/{}", base, name)
    } else {
        format!("{}/{}/{}", base, root, name)
    }
}
