// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Per-request context and content negotiation

use std::collections::BTreeSet;

/// Representation of the inbound request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestContentType {
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
    /// Anything else; the body is ignored
    Other,
}

impl RequestContentType {
    /// Classify a `Content-Type` header value. A missing header means JSON.
    pub fn from_header(content_type: Option<&str>) -> Self {
        let Some(value) = content_type else {
            return RequestContentType::Json;
        };
        let media_type = media_type(value);
        if media_type.is_empty()
            || media_type == "application/json"
            || media_type.ends_with("+json")
        {
            RequestContentType::Json
        } else if media_type == "application/x-www-form-urlencoded" {
            RequestContentType::Form
        } else {
            RequestContentType::Other
        }
    }
}

/// Representation the caller wants back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseContentType {
    #[default]
    Json,
    Html,
}

impl ResponseContentType {
    /// Pick a response type from an `Accept` header, honoring q-values.
    pub fn from_accept(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return ResponseContentType::Json;
        };

        let mut ranges: Vec<(String, f32)> = accept
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let media_type = parts.next()?.trim().to_ascii_lowercase();
                let quality = parts
                    .filter_map(|param| param.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (!media_type.is_empty()).then_some((media_type, quality))
            })
            .collect();
        // stable: equal q-values keep header order
        ranges.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        for (media_type, quality) in ranges {
            if quality <= 0.0 {
                continue;
            }
            match media_type.as_str() {
                "text/html" | "application/xhtml+xml" => return ResponseContentType::Html,
                "application/json" | "application/*" | "*/*" => return ResponseContentType::Json,
                _ => {}
            }
        }
        ResponseContentType::Json
    }
}

fn media_type(header: &str) -> String {
    header.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

/// Identity of the caller as established by the hosting layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    user: Option<String>,
    roles: BTreeSet<String>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(user: Option<String>, roles: impl IntoIterator<Item = String>) -> Self {
        Self {
            user,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}

/// Negotiated state for one inbound call
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_content_type: RequestContentType,
    pub response_content_type: ResponseContentType,
    pub caller: CallerContext,
}

impl RequestContext {
    pub fn new(
        request_content_type: RequestContentType,
        response_content_type: ResponseContentType,
        caller: CallerContext,
    ) -> Self {
        Self {
            request_content_type,
            response_content_type,
            caller,
        }
    }

    /// JSON in, JSON out
    pub fn json(caller: CallerContext) -> Self {
        Self::new(RequestContentType::Json, ResponseContentType::Json, caller)
    }
}

/// What to write back to the caller
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Successful call without a body
    Empty,
    /// Raw text, written unquoted
    Text(String),
    Json(serde_json::Value),
    Html(String),
}

impl ResponseBody {
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            ResponseBody::Empty => None,
            ResponseBody::Text(_) => Some("text/plain; charset=utf-8"),
            ResponseBody::Json(_) => Some("application/json"),
            ResponseBody::Html(_) => Some("text/html; charset=utf-8"),
        }
    }

    /// Body bytes as they go on the wire
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Text(text) | ResponseBody::Html(text) => text.into_bytes(),
            ResponseBody::Json(value) => value.to_string().into_bytes(),
        }
    }
}

/// Decode `application/x-www-form-urlencoded` pairs, keeping order and duplicates.
pub fn parse_params(encoded: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(encoded).into_owned().collect()
}
