// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! JSON-Schema documents for operation arguments and results

use crate::traits::TypeIntrospector;
use crate::types::{AttributeKind, PrimitiveKind, TypeDescriptor};
use serde_json::{json, Map, Value};

/// Default nesting limit for object schemas
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Builds schema documents from type descriptors.
///
/// Entity graphs may be recursive; an entity already on the current path, or
/// one past `max_depth`, is emitted as a stub and not descended into.
pub struct SchemaBuilder<'a> {
    introspector: &'a dyn TypeIntrospector,
    max_depth: usize,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(introspector: &'a dyn TypeIntrospector) -> Self {
        Self {
            introspector,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Schema for `descriptor`; `None` for [`TypeDescriptor::Void`]
    pub fn build(&self, descriptor: &TypeDescriptor) -> Option<Value> {
        let mut path = Vec::new();
        match descriptor {
            TypeDescriptor::Void => None,
            TypeDescriptor::Primitive(kind) => Some(primitive_schema(*kind)),
            TypeDescriptor::Object(object) => Some(self.entity_schema(&object.entity, &mut path)),
            TypeDescriptor::List(object) => Some(json!({
                "type": "array",
                "items": self.entity_schema(&object.entity, &mut path),
            })),
        }
    }

    fn entity_schema(&self, entity: &str, path: &mut Vec<String>) -> Value {
        if path.len() >= self.max_depth || path.iter().any(|seen| seen == entity) {
            return json!({
                "type": "object",
                "title": entity,
                "$comment": "recursive reference",
            });
        }
        let Some(descriptor) = self.introspector.entity(entity) else {
            return json!({ "type": "object", "title": entity });
        };

        path.push(entity.to_string());
        let mut properties = Map::new();
        for attribute in &descriptor.attributes {
            let schema = match &attribute.kind {
                AttributeKind::Reference(target) => self.entity_schema(target, path),
                AttributeKind::ReferenceSet(target) => json!({
                    "type": "array",
                    "items": self.entity_schema(target, path),
                }),
                other => attribute_schema(other),
            };
            properties.insert(attribute.name.clone(), schema);
        }
        path.pop();

        json!({
            "type": "object",
            "title": entity,
            "properties": properties,
        })
    }
}

fn primitive_schema(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::String | PrimitiveKind::Binary | PrimitiveKind::Enumeration => {
            json!({ "type": "string" })
        }
        PrimitiveKind::Integer | PrimitiveKind::Long => json!({ "type": "integer" }),
        PrimitiveKind::Decimal => json!({ "type": "number" }),
        PrimitiveKind::Boolean => json!({ "type": "boolean" }),
        PrimitiveKind::DateTime => json!({ "type": "string", "format": "date-time" }),
    }
}

fn attribute_schema(kind: &AttributeKind) -> Value {
    match kind {
        AttributeKind::String => primitive_schema(PrimitiveKind::String),
        AttributeKind::Binary => primitive_schema(PrimitiveKind::Binary),
        AttributeKind::Integer => primitive_schema(PrimitiveKind::Integer),
        AttributeKind::Long => primitive_schema(PrimitiveKind::Long),
        AttributeKind::Decimal => primitive_schema(PrimitiveKind::Decimal),
        AttributeKind::Boolean => primitive_schema(PrimitiveKind::Boolean),
        AttributeKind::DateTime => primitive_schema(PrimitiveKind::DateTime),
        AttributeKind::Enumeration(values) => json!({ "type": "string", "enum": values }),
        // references are expanded by the builder
        AttributeKind::Reference(target) | AttributeKind::ReferenceSet(target) => {
            json!({ "type": "object", "title": target })
        }
    }
}
