// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-process platform backing tests and the demo server
//!
//! Holds an entity catalog, a role list and procedure handlers, and answers the
//! introspection, role and invocation collaborator interfaces from them.

use crate::error::IntrospectionError;
use crate::request::CallerContext;
use crate::traits::{ProcedureInvoker, RoleResolver, TypeIntrospector};
use crate::types::{
    Arguments, AttributeKind, EntityDescriptor, ObjectType, ProcedureValue, TypeDescriptor,
    FILE_DOCUMENT_ENTITY,
};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Procedure body: receives the caller and the bound arguments
pub type ProcedureHandler =
    Arc<dyn Fn(&CallerContext, &Arguments) -> anyhow::Result<ProcedureValue> + Send + Sync>;

#[derive(Clone)]
struct ProcedureDefinition {
    parameters: Vec<(String, TypeDescriptor)>,
    return_type: TypeDescriptor,
    handler: ProcedureHandler,
}

#[derive(Clone)]
pub struct InMemoryPlatform {
    entities: BTreeMap<String, EntityDescriptor>,
    roles: BTreeSet<String>,
    procedures: BTreeMap<String, ProcedureDefinition>,
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlatform {
    /// A platform that knows only the file document entity
    pub fn new() -> Self {
        let file_document = EntityDescriptor::persistable(FILE_DOCUMENT_ENTITY)
            .attribute("Name", AttributeKind::String)
            .attribute("Size", AttributeKind::Long)
            .attribute("Contents", AttributeKind::Binary);
        Self {
            entities: BTreeMap::from([(FILE_DOCUMENT_ENTITY.to_string(), file_document)]),
            roles: BTreeSet::new(),
            procedures: BTreeMap::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Register an entity with its own attributes; inherited ones are resolved on lookup.
    pub fn with_entity(mut self, entity: EntityDescriptor) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    pub fn with_procedure<F>(
        mut self,
        name: impl Into<String>,
        parameters: Vec<(&str, TypeDescriptor)>,
        return_type: TypeDescriptor,
        handler: F,
    ) -> Self
    where
        F: Fn(&CallerContext, &Arguments) -> anyhow::Result<ProcedureValue> + Send + Sync + 'static,
    {
        let definition = ProcedureDefinition {
            parameters: parameters
                .into_iter()
                .map(|(name, descriptor)| (name.to_string(), descriptor))
                .collect(),
            return_type,
            handler: Arc::new(handler),
        };
        self.procedures.insert(name.into(), definition);
        self
    }

    /// Generalization chain of `entity`, starting with itself
    fn lineage(&self, entity: &str) -> Vec<&EntityDescriptor> {
        let mut chain: Vec<&EntityDescriptor> = Vec::new();
        let mut next = self.entities.get(entity);
        while let Some(descriptor) = next {
            if chain.iter().any(|seen| seen.name == descriptor.name) {
                break;
            }
            chain.push(descriptor);
            next = descriptor
                .generalization
                .as_deref()
                .and_then(|parent| self.entities.get(parent));
        }
        chain
    }

    fn resolve_object(&self, object: &ObjectType) -> ObjectType {
        let lineage = self.lineage(&object.entity);
        ObjectType {
            entity: object.entity.clone(),
            persistable: lineage.first().map(|e| e.persistable).unwrap_or(object.persistable),
            file_document: object.entity == FILE_DOCUMENT_ENTITY
                || lineage.iter().any(|e| e.name == FILE_DOCUMENT_ENTITY),
        }
    }

    /// Fill in persistence and file-document flags from the catalog
    fn resolve(&self, descriptor: &TypeDescriptor) -> TypeDescriptor {
        match descriptor {
            TypeDescriptor::Object(object) => TypeDescriptor::Object(self.resolve_object(object)),
            TypeDescriptor::List(object) => TypeDescriptor::List(self.resolve_object(object)),
            other => other.clone(),
        }
    }

    fn procedure(&self, name: &str) -> Result<&ProcedureDefinition, IntrospectionError> {
        self.procedures
            .get(name)
            .ok_or_else(|| IntrospectionError::UnknownProcedure(name.to_string()))
    }
}

impl TypeIntrospector for InMemoryPlatform {
    fn argument_signature(
        &self,
        procedure: &str,
    ) -> Result<Vec<(String, TypeDescriptor)>, IntrospectionError> {
        Ok(self
            .procedure(procedure)?
            .parameters
            .iter()
            .map(|(name, descriptor)| (name.clone(), self.resolve(descriptor)))
            .collect())
    }

    fn return_type(&self, procedure: &str) -> Result<TypeDescriptor, IntrospectionError> {
        Ok(self.resolve(&self.procedure(procedure)?.return_type))
    }

    fn entity(&self, entity: &str) -> Option<EntityDescriptor> {
        let lineage = self.lineage(entity);
        let own = lineage.first()?;
        let mut resolved = EntityDescriptor {
            name: own.name.clone(),
            persistable: own.persistable,
            generalization: own.generalization.clone(),
            attributes: Vec::new(),
        };
        // ancestors first, so inherited attributes lead
        for ancestor in lineage.iter().rev() {
            for attribute in &ancestor.attributes {
                if resolved.find(&attribute.name).is_none() {
                    resolved.attributes.push(attribute.clone());
                }
            }
        }
        Some(resolved)
    }
}

impl RoleResolver for InMemoryPlatform {
    fn role_exists(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

#[async_trait]
impl ProcedureInvoker for InMemoryPlatform {
    async fn invoke(
        &self,
        caller: &CallerContext,
        procedure: &str,
        arguments: Arguments,
    ) -> anyhow::Result<ProcedureValue> {
        let definition = self
            .procedures
            .get(procedure)
            .ok_or_else(|| anyhow!("unknown procedure {}", procedure))?;
        (definition.handler)(caller, &arguments)
    }
}
