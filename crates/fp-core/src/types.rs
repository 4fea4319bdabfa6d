// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Type descriptors and the typed object model
//!
//! These are the immutable shapes reported by a [`crate::TypeIntrospector`]
//! and the runtime values exchanged with a [`crate::ProcedureInvoker`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entity name of the platform's file document type.
pub const FILE_DOCUMENT_ENTITY: &str = "System.FileDocument";

/// Primitive (non-object) value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Integer,
    Long,
    Decimal,
    Boolean,
    DateTime,
    Enumeration,
    Binary,
}

/// A complex object type as seen by the introspector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    /// Qualified entity name, e.g. `Orders.OrderRequest`
    pub entity: String,
    /// Whether instances have persisted storage identity
    pub persistable: bool,
    /// Whether the entity is, or inherits from, [`FILE_DOCUMENT_ENTITY`]
    pub file_document: bool,
}

impl ObjectType {
    /// A transient, non-file object type
    pub fn transient(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            persistable: false,
            file_document: false,
        }
    }

    /// Objects may cross the REST boundary when they are transient or file documents.
    pub fn is_publishable(&self) -> bool {
        !self.persistable || self.file_document
    }
}

/// Type of a procedure parameter or return value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// No value (procedure returns nothing)
    Void,
    Primitive(PrimitiveKind),
    Object(ObjectType),
    /// List of complex objects
    List(ObjectType),
}

impl TypeDescriptor {
    /// Shorthand for a transient object type; flags are resolved by the introspector.
    pub fn object(entity: impl Into<String>) -> Self {
        TypeDescriptor::Object(ObjectType::transient(entity))
    }

    /// Shorthand for a list of transient objects.
    pub fn list_of(entity: impl Into<String>) -> Self {
        TypeDescriptor::List(ObjectType::transient(entity))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive(PrimitiveKind::String))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeDescriptor::Object(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TypeDescriptor::List(_))
    }

    /// Object or element type for object and list descriptors
    pub fn object_type(&self) -> Option<&ObjectType> {
        match self {
            TypeDescriptor::Object(object) | TypeDescriptor::List(object) => Some(object),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDescriptor::Void => write!(f, "void"),
            TypeDescriptor::Primitive(kind) => write!(f, "{:?}", kind),
            TypeDescriptor::Object(object) => write!(f, "{}", object.entity),
            TypeDescriptor::List(object) => write!(f, "List of {}", object.entity),
        }
    }
}

/// Kind of a single entity attribute or association
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Integer,
    Long,
    Decimal,
    Boolean,
    /// Stored as epoch milliseconds
    DateTime,
    /// Allowed enumeration values
    Enumeration(Vec<String>),
    Binary,
    /// Single association to another entity
    Reference(String),
    /// Many association to another entity
    ReferenceSet(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub name: String,
    pub kind: AttributeKind,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Full shape of an entity, inherited attributes included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub name: String,
    pub persistable: bool,
    /// Direct parent entity, if any
    pub generalization: Option<String>,
    pub attributes: Vec<AttributeDescriptor>,
}

impl EntityDescriptor {
    /// A transient entity without parent
    pub fn transient(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persistable: false,
            generalization: None,
            attributes: Vec::new(),
        }
    }

    /// A persistable entity without parent
    pub fn persistable(name: impl Into<String>) -> Self {
        Self {
            persistable: true,
            ..Self::transient(name)
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.generalization = Some(parent.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.attributes.push(AttributeDescriptor::new(name, kind));
        self
    }

    pub fn find(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }
}

/// Value held by a single member of a [`DataObject`]
#[derive(Debug, Clone, PartialEq)]
pub enum MemberValue {
    Null,
    /// String, number or boolean
    Scalar(serde_json::Value),
    Object(Box<DataObject>),
    Objects(Vec<DataObject>),
}

impl MemberValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MemberValue::Scalar(value) => value.as_str(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MemberValue::Scalar(value) => value.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MemberValue::Scalar(value) => value.as_bool(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MemberValue::Null)
    }
}

/// An instance of an entity living in the caller's context
#[derive(Debug, Clone, PartialEq)]
pub struct DataObject {
    entity: String,
    members: BTreeMap<String, MemberValue>,
}

impl DataObject {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            members: BTreeMap::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn get(&self, member: &str) -> Option<&MemberValue> {
        self.members.get(member)
    }

    pub fn set(&mut self, member: impl Into<String>, value: MemberValue) {
        self.members.insert(member.into(), value);
    }

    /// Builder-style setter for scalar members
    pub fn with(mut self, member: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.set(member, MemberValue::Scalar(value.into()));
        self
    }

    pub fn get_str(&self, member: &str) -> Option<&str> {
        self.get(member).and_then(MemberValue::as_str)
    }

    pub fn members(&self) -> impl Iterator<Item = (&String, &MemberValue)> {
        self.members.iter()
    }
}

/// Arguments bound for a procedure call, keyed by parameter name
pub type Arguments = BTreeMap<String, DataObject>;

/// Runtime result of a procedure invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ProcedureValue {
    /// The procedure returned nothing
    Empty,
    String(String),
    Object(DataObject),
    List(Vec<ProcedureValue>),
    /// Any other primitive value
    Scalar(serde_json::Value),
}

impl ProcedureValue {
    pub fn objects(objects: impl IntoIterator<Item = DataObject>) -> Self {
        ProcedureValue::List(objects.into_iter().map(ProcedureValue::Object).collect())
    }

    /// Short runtime shape name used in diagnostics
    pub fn shape(&self) -> &'static str {
        match self {
            ProcedureValue::Empty => "empty",
            ProcedureValue::String(_) => "string",
            ProcedureValue::Object(_) => "object",
            ProcedureValue::List(_) => "list",
            ProcedureValue::Scalar(_) => "scalar",
        }
    }
}
