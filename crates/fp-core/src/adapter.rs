// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Request execution for published operations
//!
//! Builds the call argument from the request body and parameters, invokes the
//! procedure and writes its result according to the record's [`ReturnKind`].
//! The invocation is awaited as is: no timeout, no cancellation, no retry.

use crate::error::{ExecutionError, ExecutionResult};
use crate::publication::{PublicationRecord, ReturnKind};
use crate::request::{parse_params, RequestContentType, RequestContext, ResponseBody};
use crate::traits::{ObjectCodec, ProcedureInvoker};
use crate::types::{Arguments, ProcedureValue};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Clone)]
pub struct RequestAdapter {
    codec: Arc<dyn ObjectCodec>,
    invoker: Arc<dyn ProcedureInvoker>,
}

impl RequestAdapter {
    pub fn new(codec: Arc<dyn ObjectCodec>, invoker: Arc<dyn ProcedureInvoker>) -> Self {
        Self { codec, invoker }
    }

    /// Execute `record` for one inbound call.
    ///
    /// `params` are the query parameters; they override body keys of the same name.
    pub async fn execute(
        &self,
        record: &PublicationRecord,
        context: &RequestContext,
        body: &[u8],
        params: &[(String, String)],
    ) -> ExecutionResult<ResponseBody> {
        record.authorize(&context.caller)?;

        let mut arguments = Arguments::new();
        if let Some(argument) = record.argument() {
            let mut object = self
                .codec
                .instantiate(&context.caller, &argument.object_type.entity)
                .map_err(ExecutionError::ObjectModel)?;

            let mut data = match context.request_content_type {
                RequestContentType::Json => parse_json_body(body)?,
                RequestContentType::Form => {
                    let mut data = Map::new();
                    merge_params(&mut data, &parse_params(body));
                    data
                }
                RequestContentType::Other => Map::new(),
            };
            merge_params(&mut data, params);

            self.codec
                .deserialize(&Value::Object(data), &mut object, true)
                .map_err(ExecutionError::Deserialization)?;
            arguments.insert(argument.name.clone(), object);
        }

        debug!(
            operation = record.name(),
            procedure = record.procedure(),
            user = context.caller.user().unwrap_or("anonymous"),
            "invoking procedure"
        );
        let result = self
            .invoker
            .invoke(&context.caller, record.procedure(), arguments)
            .await
            .map_err(|source| ExecutionError::ProcedureExecution {
                procedure: record.procedure().to_string(),
                source,
            })?;

        self.write_result(record, result)
    }

    fn write_result(
        &self,
        record: &PublicationRecord,
        result: ProcedureValue,
    ) -> ExecutionResult<ResponseBody> {
        match (record.return_kind(), result) {
            (_, ProcedureValue::Empty) => Ok(ResponseBody::Empty),
            (ReturnKind::String, ProcedureValue::String(text)) => Ok(ResponseBody::Text(text)),
            (ReturnKind::Object, ProcedureValue::Object(object)) => {
                let json = self.codec.serialize(&object).map_err(ExecutionError::ObjectModel)?;
                Ok(ResponseBody::Json(json))
            }
            (ReturnKind::List, ProcedureValue::List(items)) => {
                let mut array = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        ProcedureValue::Object(object) => array.push(
                            self.codec.serialize(&object).map_err(ExecutionError::ObjectModel)?,
                        ),
                        other => {
                            return Err(inconsistent(
                                record,
                                format!("list element of shape {}", other.shape()),
                            ));
                        }
                    }
                }
                Ok(ResponseBody::Json(Value::Array(array)))
            }
            (kind, other) => Err(inconsistent(
                record,
                format!("{} result for return kind {:?}", other.shape(), kind),
            )),
        }
    }
}

fn inconsistent(record: &PublicationRecord, detail: String) -> ExecutionError {
    // unreachable while the registration-time classification holds
    error!(
        operation = record.name(),
        procedure = record.procedure(),
        detail = %detail,
        "procedure result does not match its published return kind"
    );
    ExecutionError::InternalInconsistency {
        procedure: record.procedure().to_string(),
        detail,
    }
}

/// Parse a request body as a JSON object. An empty body is `{}`.
fn parse_json_body(body: &[u8]) -> ExecutionResult<Map<String, Value>> {
    if body.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ExecutionError::MalformedRequestBody(
            "expected a JSON object".to_string(),
        )),
        Err(err) => Err(ExecutionError::MalformedRequestBody(err.to_string())),
    }
}

fn merge_params(data: &mut Map<String, Value>, params: &[(String, String)]) {
    for (key, value) in params {
        data.insert(key.clone(), Value::String(value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonObjectCodec;
    use crate::memory::InMemoryPlatform;
    use crate::registry::PublicationRegistry;
    use crate::request::{CallerContext, ResponseContentType};
    use crate::traits::MockProcedureInvoker;
    use crate::types::{AttributeKind, DataObject, EntityDescriptor, PrimitiveKind, TypeDescriptor};
    use crate::validator::PublicationValidator;
    use serde_json::json;

    fn platform() -> InMemoryPlatform {
        InMemoryPlatform::new()
            .with_role("Clerk")
            .with_entity(
                EntityDescriptor::transient("Shop.Query")
                    .attribute("Term", AttributeKind::String)
                    .attribute("Limit", AttributeKind::Integer),
            )
            .with_entity(EntityDescriptor::transient("Shop.Item").attribute("Sku", AttributeKind::String))
            .with_procedure(
                "Shop.Search",
                vec![("query", TypeDescriptor::object("Shop.Query"))],
                TypeDescriptor::list_of("Shop.Item"),
                |_, _| Ok(ProcedureValue::Empty),
            )
            .with_procedure(
                "Shop.Secret",
                vec![],
                TypeDescriptor::Primitive(PrimitiveKind::String),
                |_, _| Ok(ProcedureValue::Empty),
            )
    }

    fn registry(platform: &InMemoryPlatform) -> PublicationRegistry {
        let validator = PublicationValidator::new(platform, platform);
        let mut registry = PublicationRegistry::new();
        validator.publish(&mut registry, "Shop.Search", "*", "").unwrap();
        validator.publish(&mut registry, "Shop.Secret", "Clerk", "").unwrap();
        registry
    }

    fn adapter(platform: InMemoryPlatform, invoker: MockProcedureInvoker) -> RequestAdapter {
        RequestAdapter::new(Arc::new(JsonObjectCodec::new(Arc::new(platform))), Arc::new(invoker))
    }

    #[tokio::test]
    async fn query_parameters_override_body_and_bind_argument() {
        let platform = platform();
        let registry = registry(&platform);
        let mut invoker = MockProcedureInvoker::new();
        invoker
            .expect_invoke()
            .withf(|_, procedure, arguments| {
                let query = &arguments["query"];
                procedure == "Shop.Search"
                    && query.get_str("Term") == Some("lamp")
                    && query.get("Limit").and_then(|l| l.as_i64()) == Some(5)
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(ProcedureValue::objects([
                    DataObject::new("Shop.Item").with("Sku", "A"),
                    DataObject::new("Shop.Item").with("Sku", "B"),
                ]))
            });

        let record = registry.lookup("Search").unwrap();
        let body = adapter(platform, invoker)
            .execute(
                &record,
                &RequestContext::json(CallerContext::anonymous()),
                br#"{"Term":"chair","Limit":5}"#,
                &[("Term".to_string(), "lamp".to_string())],
            )
            .await
            .expect("execute");
        assert_eq!(body, ResponseBody::Json(json!([{ "Sku": "A" }, { "Sku": "B" }])));
    }

    #[tokio::test]
    async fn form_body_is_decoded_as_parameters() {
        let platform = platform();
        let registry = registry(&platform);
        let mut invoker = MockProcedureInvoker::new();
        invoker
            .expect_invoke()
            .withf(|_, _, arguments| arguments["query"].get_str("Term") == Some("desk"))
            .returning(|_, _, _| Ok(ProcedureValue::Empty));

        let context = RequestContext::new(
            RequestContentType::Form,
            ResponseContentType::Json,
            CallerContext::anonymous(),
        );
        let body = adapter(platform, invoker)
            .execute(&registry.lookup("Search").unwrap(), &context, b"Term=desk&Limit=2", &[])
            .await
            .expect("execute");
        assert_eq!(body, ResponseBody::Empty);
    }

    #[tokio::test]
    async fn non_object_json_body_is_malformed() {
        let platform = platform();
        let registry = registry(&platform);
        let mut invoker = MockProcedureInvoker::new();
        invoker.expect_invoke().never();

        let err = adapter(platform, invoker)
            .execute(
                &registry.lookup("Search").unwrap(),
                &RequestContext::json(CallerContext::anonymous()),
                b"[1, 2]",
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::MalformedRequestBody(_)));
    }

    #[tokio::test]
    async fn whitespace_body_is_malformed() {
        let platform = platform();
        let registry = registry(&platform);
        let mut invoker = MockProcedureInvoker::new();
        invoker.expect_invoke().never();

        let err = adapter(platform, invoker)
            .execute(
                &registry.lookup("Search").unwrap(),
                &RequestContext::json(CallerContext::anonymous()),
                b"  \n ",
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::MalformedRequestBody(_)));
    }

    #[tokio::test]
    async fn missing_role_is_forbidden_before_invocation() {
        let platform = platform();
        let registry = registry(&platform);
        let mut invoker = MockProcedureInvoker::new();
        invoker.expect_invoke().never();

        let err = adapter(platform, invoker)
            .execute(
                &registry.lookup("Secret").unwrap(),
                &RequestContext::json(CallerContext::anonymous()),
                b"",
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Forbidden { ref role, .. } if role == "Clerk"));
    }

    #[tokio::test]
    async fn procedure_failure_preserves_cause() {
        let platform = platform();
        let registry = registry(&platform);
        let mut invoker = MockProcedureInvoker::new();
        invoker
            .expect_invoke()
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("database offline")));

        let err = adapter(platform, invoker)
            .execute(
                &registry.lookup("Secret").unwrap(),
                &RequestContext::json(CallerContext::anonymous().with_role("Clerk")),
                b"",
                &[],
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Procedure Shop.Secret failed");
        let cause = std::error::Error::source(&err).map(|c| c.to_string());
        assert_eq!(cause.as_deref(), Some("database offline"));
    }

    #[tokio::test]
    async fn mismatched_runtime_shape_is_inconsistent() {
        let platform = platform();
        let registry = registry(&platform);
        let mut invoker = MockProcedureInvoker::new();
        invoker
            .expect_invoke()
            .returning(|_, _, _| Ok(ProcedureValue::List(vec![ProcedureValue::String("x".into())])));

        let err = adapter(platform, invoker)
            .execute(
                &registry.lookup("Search").unwrap(),
                &RequestContext::json(CallerContext::anonymous()),
                b"{}",
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::InternalInconsistency { .. }));
    }

    #[tokio::test]
    async fn mismatched_top_level_result_is_inconsistent() {
        let platform = platform();
        let registry = registry(&platform);
        let mut invoker = MockProcedureInvoker::new();
        invoker
            .expect_invoke()
            .times(2)
            .returning(|_, procedure, _| {
                Ok(match procedure {
                    "Shop.Search" => ProcedureValue::String("not a list".into()),
                    _ => ProcedureValue::Object(DataObject::new("Shop.Item").with("Sku", "A")),
                })
            });
        let adapter = adapter(platform, invoker);

        let err = adapter
            .execute(
                &registry.lookup("Search").unwrap(),
                &RequestContext::json(CallerContext::anonymous()),
                b"{}",
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::InternalInconsistency { ref procedure, .. } if procedure == "Shop.Search"));

        let err = adapter
            .execute(
                &registry.lookup("Secret").unwrap(),
                &RequestContext::json(CallerContext::anonymous().with_role("Clerk")),
                b"",
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::InternalInconsistency { ref detail, .. } if detail.starts_with("object result")));
    }
}
