// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Demo catalog served by `fp-rest-server --demo`

use crate::config::PublicationConfig;
use fp_core::{
    AttributeKind, DataObject, EntityDescriptor, InMemoryPlatform, PrimitiveKind, ProcedureValue,
    TypeDescriptor,
};

const LANGUAGES: [(&str, &str); 3] = [("en", "Hello"), ("fr", "Bonjour"), ("nl", "Hallo")];

fn languages() -> AttributeKind {
    AttributeKind::Enumeration(LANGUAGES.iter().map(|(code, _)| code.to_string()).collect())
}

/// In-memory platform with one procedure per return kind
pub fn demo_platform() -> InMemoryPlatform {
    InMemoryPlatform::new()
        .with_role("Tester")
        .with_entity(
            EntityDescriptor::transient("Demo.GreetingRequest")
                .attribute("Name", AttributeKind::String)
                .attribute("Language", languages()),
        )
        .with_entity(
            EntityDescriptor::transient("Demo.Greeting")
                .attribute("Language", languages())
                .attribute("Text", AttributeKind::String),
        )
        .with_entity(
            EntityDescriptor::transient("Demo.Message")
                .attribute("Text", AttributeKind::String)
                .attribute("Repeat", AttributeKind::Integer)
                .attribute("SentAt", AttributeKind::DateTime)
                .attribute("Urgent", AttributeKind::Boolean),
        )
        .with_procedure(
            "Demo.Greet",
            vec![("request", TypeDescriptor::object("Demo.GreetingRequest"))],
            TypeDescriptor::Primitive(PrimitiveKind::String),
            |_, arguments| {
                let request = arguments
                    .get("request")
                    .ok_or_else(|| anyhow::anyhow!("missing argument 'request'"))?;
                let language = request.get_str("Language").unwrap_or("en");
                let salutation = LANGUAGES
                    .iter()
                    .find(|(code, _)| *code == language)
                    .map(|(_, salutation)| *salutation)
                    .unwrap_or("Hello");
                let name = request.get_str("Name").unwrap_or("world");
                Ok(ProcedureValue::String(format!("{}, {}", salutation, name)))
            },
        )
        .with_procedure(
            "Demo.ListGreetings",
            vec![],
            TypeDescriptor::list_of("Demo.Greeting"),
            |_, _| {
                Ok(ProcedureValue::objects(LANGUAGES.iter().map(|(code, text)| {
                    DataObject::new("Demo.Greeting")
                        .with("Language", *code)
                        .with("Text", *text)
                })))
            },
        )
        .with_procedure("Demo.Ping", vec![], TypeDescriptor::Void, |_, _| {
            Ok(ProcedureValue::Empty)
        })
        .with_procedure(
            "Demo.Echo",
            vec![("message", TypeDescriptor::object("Demo.Message"))],
            TypeDescriptor::object("Demo.Message"),
            |_, arguments| {
                arguments
                    .get("message")
                    .cloned()
                    .map(ProcedureValue::Object)
                    .ok_or_else(|| anyhow::anyhow!("missing argument 'message'"))
            },
        )
}

pub fn demo_publications() -> Vec<PublicationConfig> {
    vec![
        PublicationConfig::new("Demo.Greet", "*").with_description("Greets the caller by name"),
        PublicationConfig::new("Demo.ListGreetings", "*")
            .with_description("Lists the known greetings"),
        PublicationConfig::new("Demo.Ping", "*").with_description("Does nothing"),
        PublicationConfig::new("Demo.Echo", "Tester")
            .with_description("Returns its argument unchanged"),
    ]
}
