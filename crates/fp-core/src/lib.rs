// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Publication of platform procedures as REST operations
//!
//! Procedures are validated once at startup by [`PublicationValidator`] and
//! stored in a [`PublicationRegistry`]. Each inbound call is executed by the
//! [`RequestAdapter`] and operations describe themselves through
//! [`OperationDescriber`]. The platform itself (type introspection, role
//! lookup, procedure invocation, object model) is reached through the traits
//! in [`traits`].

pub mod adapter;
pub mod codec;
pub mod describe;
pub mod error;
pub mod html;
pub mod memory;
pub mod publication;
pub mod registry;
pub mod request;
pub mod schema;
pub mod traits;
pub mod types;
pub mod validator;

pub use adapter::RequestAdapter;
pub use codec::JsonObjectCodec;
pub use describe::OperationDescriber;
pub use error::{CodecError, ExecutionError, ExecutionResult, IntrospectionError, RegistrationError};
pub use memory::{InMemoryPlatform, ProcedureHandler};
pub use publication::{
    operation_name, service_url, OperationArgument, PublicationRecord, ReturnKind, RoleRequirement,
    ANY_ROLE,
};
pub use registry::PublicationRegistry;
pub use request::{
    CallerContext, RequestContentType, RequestContext, ResponseBody, ResponseContentType,
};
pub use schema::SchemaBuilder;
pub use traits::{ObjectCodec, ProcedureInvoker, RoleResolver, TypeIntrospector};
pub use types::{
    Arguments, AttributeDescriptor, AttributeKind, DataObject, EntityDescriptor, MemberValue,
    ObjectType, PrimitiveKind, ProcedureValue, TypeDescriptor, FILE_DOCUMENT_ENTITY,
};
pub use validator::PublicationValidator;
