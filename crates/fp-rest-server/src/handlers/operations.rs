// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Published operation endpoints

use crate::{auth::request_context, state::AppState, ServerResult};
use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use fp_core::{request::parse_params, ResponseBody};
use tracing::debug;

/// A response body produced by the publication core
pub struct WriteEffect(pub ResponseBody);

impl IntoResponse for WriteEffect {
    fn into_response(self) -> Response {
        let content_type = self.0.content_type();
        let mut response = (StatusCode::OK, self.0.into_bytes()).into_response();
        match content_type {
            Some(content_type) => {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
            None => {
                response.headers_mut().remove(header::CONTENT_TYPE);
            }
        }
        response
    }
}

/// `GET /<root>/`: index of every published operation
pub async fn list_operations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ServerResult<WriteEffect> {
    let context = request_context(&headers, state.config());
    Ok(WriteEffect(state.describer.list(&state.registry, &context)?))
}

/// `GET /<root>/<name>`: operation description
pub async fn describe_operation(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> ServerResult<WriteEffect> {
    let record = state.registry.lookup(&name)?;
    let context = request_context(&headers, state.config());
    Ok(WriteEffect(state.describer.describe(&record, &context)?))
}

/// `POST /<root>/<name>`: invoke the operation
pub async fn execute_operation(
    State(state): State<AppState>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<WriteEffect> {
    let record = state.registry.lookup(&name)?;
    let context = request_context(&headers, state.config());
    let params = query
        .map(|query| parse_params(query.as_bytes()))
        .unwrap_or_default();
    debug!(
        operation = %name,
        body_bytes = body.len(),
        params = params.len(),
        "executing operation"
    );
    let result = state.adapter.execute(&record, &context, &body, &params).await?;
    Ok(WriteEffect(result))
}
