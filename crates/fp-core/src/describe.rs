// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Self-description of published operations

use crate::error::{ExecutionError, ExecutionResult};
use crate::html::{escape, render_page};
use crate::publication::{service_url, PublicationRecord};
use crate::registry::PublicationRegistry;
use crate::request::{RequestContext, ResponseBody, ResponseContentType};
use crate::schema::{SchemaBuilder, DEFAULT_MAX_DEPTH};
use crate::traits::TypeIntrospector;
use fp_rest_api_contract::{OperationDescription, OperationListResponse, OperationSummary};
use serde_json::Value;
use std::sync::Arc;

/// Renders operation descriptions and the operation index
#[derive(Clone)]
pub struct OperationDescriber {
    introspector: Arc<dyn TypeIntrospector>,
    base_url: String,
    service_root: String,
    max_depth: usize,
}

impl OperationDescriber {
    pub fn new(
        introspector: Arc<dyn TypeIntrospector>,
        base_url: impl Into<String>,
        service_root: impl Into<String>,
    ) -> Self {
        Self {
            introspector,
            base_url: base_url.into(),
            service_root: service_root.into(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn url(&self, record: &PublicationRecord) -> String {
        service_url(&self.base_url, &self.service_root, record.name())
    }

    pub fn description(&self, record: &PublicationRecord) -> OperationDescription {
        let schemas =
            SchemaBuilder::new(self.introspector.as_ref()).with_max_depth(self.max_depth);
        OperationDescription {
            name: record.name().to_string(),
            description: record.description().to_string(),
            url: self.url(record),
            arguments: record
                .argument_descriptor()
                .and_then(|descriptor| schemas.build(&descriptor)),
            result: schemas.build(&record.result_descriptor()),
        }
    }

    /// Describe `record` to the caller in the negotiated representation
    pub fn describe(
        &self,
        record: &PublicationRecord,
        context: &RequestContext,
    ) -> ExecutionResult<ResponseBody> {
        record.authorize(&context.caller)?;
        let document = to_value(&self.description(record))?;
        Ok(match context.response_content_type {
            ResponseContentType::Json => ResponseBody::Json(document),
            ResponseContentType::Html => ResponseBody::Html(render_page(
                &format!("Operation '{}'", escape(record.name())),
                &document,
            )),
        })
    }

    pub fn summaries(&self, registry: &PublicationRegistry) -> OperationListResponse {
        OperationListResponse {
            operations: registry
                .list_all()
                .iter()
                .map(|record| OperationSummary {
                    name: record.name().to_string(),
                    description: record.description().to_string(),
                    url: self.url(record),
                    required_role: record.required_role().as_str().to_string(),
                })
                .collect(),
        }
    }

    /// The operation index in the negotiated representation
    pub fn list(
        &self,
        registry: &PublicationRegistry,
        context: &RequestContext,
    ) -> ExecutionResult<ResponseBody> {
        let document = to_value(&self.summaries(registry))?;
        Ok(match context.response_content_type {
            ResponseContentType::Json => ResponseBody::Json(document),
            ResponseContentType::Html => ResponseBody::Html(render_page("Operations", &document)),
        })
    }
}

fn to_value<T: serde::Serialize>(document: &T) -> ExecutionResult<Value> {
    serde_json::to_value(document).map_err(ExecutionError::Render)
}
