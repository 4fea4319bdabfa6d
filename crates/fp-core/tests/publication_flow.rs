// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! End-to-end publication and execution against the in-memory platform

use fp_core::{
    AttributeKind, CallerContext, DataObject, EntityDescriptor, ExecutionError, InMemoryPlatform,
    JsonObjectCodec, OperationDescriber, PrimitiveKind, ProcedureValue, PublicationRegistry,
    PublicationValidator, RegistrationError, RequestAdapter, RequestContext, ResponseBody,
    TypeDescriptor,
};
use serde_json::json;
use std::sync::Arc;

fn platform() -> InMemoryPlatform {
    InMemoryPlatform::new()
        .with_entity(EntityDescriptor::transient("Hello.Input").attribute("name", AttributeKind::String))
        .with_entity(
            EntityDescriptor::transient("Hello.Greeting")
                .attribute("text", AttributeKind::String)
                .attribute("position", AttributeKind::Integer),
        )
        .with_entity(EntityDescriptor::persistable("Hello.Visitor").attribute("name", AttributeKind::String))
        .with_procedure(
            "Hello.Greet",
            vec![("input", TypeDescriptor::object("Hello.Input"))],
            TypeDescriptor::Primitive(PrimitiveKind::String),
            |_, arguments| {
                let name = arguments["input"].get_str("name").unwrap_or("stranger");
                Ok(ProcedureValue::String(format!("Hello, {}", name)))
            },
        )
        .with_procedure(
            "Hello.List",
            vec![],
            TypeDescriptor::list_of("Hello.Greeting"),
            |_, _| {
                Ok(ProcedureValue::objects([
                    DataObject::new("Hello.Greeting").with("text", "Hi").with("position", 1),
                    DataObject::new("Hello.Greeting").with("text", "Hey").with("position", 2),
                ]))
            },
        )
        .with_procedure(
            "Hello.Pair",
            vec![
                ("left", TypeDescriptor::object("Hello.Input")),
                ("right", TypeDescriptor::object("Hello.Input")),
            ],
            TypeDescriptor::Void,
            |_, _| Ok(ProcedureValue::Empty),
        )
        .with_procedure(
            "Hello.Visitors",
            vec![],
            TypeDescriptor::list_of("Hello.Visitor"),
            |_, _| Ok(ProcedureValue::Empty),
        )
}

struct Harness {
    registry: PublicationRegistry,
    adapter: RequestAdapter,
    describer: OperationDescriber,
}

fn harness() -> Harness {
    let platform = platform();
    let mut registry = PublicationRegistry::new();
    {
        let validator = PublicationValidator::new(&platform, &platform);
        validator.publish(&mut registry, "Hello.Greet", "*", "Greets by name").unwrap();
        validator.publish(&mut registry, "Hello.List", "*", "").unwrap();
    }
    let platform = Arc::new(platform);
    let adapter = RequestAdapter::new(
        Arc::new(JsonObjectCodec::new(platform.clone())),
        platform.clone(),
    );
    let describer = OperationDescriber::new(platform, "http://localhost:8080", "rest");
    Harness {
        registry,
        adapter,
        describer,
    }
}

async fn call(harness: &Harness, name: &str, body: &[u8]) -> Result<ResponseBody, ExecutionError> {
    let record = harness.registry.lookup(name)?;
    harness
        .adapter
        .execute(&record, &RequestContext::json(CallerContext::anonymous()), body, &[])
        .await
}

#[tokio::test]
async fn greet_returns_unquoted_text() {
    let harness = harness();
    let body = call(&harness, "Greet", br#"{"name":"Ada"}"#).await.unwrap();
    assert_eq!(body, ResponseBody::Text("Hello, Ada".into()));
    assert_eq!(body.into_bytes(), b"Hello, Ada".to_vec());
}

#[tokio::test]
async fn empty_body_behaves_like_empty_object() {
    let harness = harness();
    let empty = call(&harness, "Greet", b"").await.unwrap();
    let object = call(&harness, "Greet", b"{}").await.unwrap();
    assert_eq!(empty, object);
    assert_eq!(empty, ResponseBody::Text("Hello, stranger".into()));
}

#[tokio::test]
async fn unknown_keys_are_tolerated() {
    let harness = harness();
    let body = call(&harness, "Greet", br#"{"name":"Ada","mood":"happy"}"#).await.unwrap();
    assert_eq!(body, ResponseBody::Text("Hello, Ada".into()));
}

#[tokio::test]
async fn list_preserves_order() {
    let harness = harness();
    let body = call(&harness, "List", b"").await.unwrap();
    assert_eq!(
        body,
        ResponseBody::Json(json!([
            { "text": "Hi", "position": 1 },
            { "text": "Hey", "position": 2 }
        ]))
    );
}

#[tokio::test]
async fn malformed_body_and_unknown_operation() {
    let harness = harness();
    let err = call(&harness, "Greet", b"not json").await.unwrap_err();
    assert!(matches!(err, ExecutionError::MalformedRequestBody(_)));

    let err = call(&harness, "Nope", b"").await.unwrap_err();
    assert!(matches!(err, ExecutionError::NotFound(ref name) if name == "Nope"));
}

#[tokio::test]
async fn type_mismatch_is_a_deserialization_error() {
    let harness = harness();
    let err = call(&harness, "Greet", br#"{"name":{"first":"Ada"}}"#).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Deserialization(_)));
}

#[test]
fn rejected_publications_never_become_visible() {
    let platform = platform();
    let validator = PublicationValidator::new(&platform, &platform);
    let mut registry = PublicationRegistry::new();

    let err = validator.publish(&mut registry, "Hello.Pair", "*", "").unwrap_err();
    assert!(matches!(err, RegistrationError::TooManyArguments { count: 2, .. }));
    let err = validator.publish(&mut registry, "Hello.Visitors", "*", "").unwrap_err();
    assert!(matches!(err, RegistrationError::ReturnMustBeTransient { .. }));

    assert!(registry.list_all().is_empty());
    assert!(registry.lookup("Pair").is_err());
}

#[test]
fn description_matches_publication() {
    let harness = harness();
    let greet = harness.describer.description(&harness.registry.lookup("Greet").unwrap());
    assert_eq!(greet.name, "Greet");
    assert_eq!(greet.url, "http://localhost:8080/rest/Greet");
    assert_eq!(greet.arguments.unwrap()["properties"]["name"]["type"], "string");

    let list = harness.describer.description(&harness.registry.lookup("List").unwrap());
    assert!(list.arguments.is_none());
    assert_eq!(list.result.unwrap()["items"]["title"], "Hello.Greeting");
}
