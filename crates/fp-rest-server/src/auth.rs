// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Caller identity from trusted gateway headers
//!
//! Authentication happens upstream; the gateway forwards the user name and
//! a comma separated role list in the configured headers.

use crate::config::ServerConfig;
use axum::http::{header, HeaderMap};
use fp_core::{CallerContext, RequestContentType, RequestContext, ResponseContentType};

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

pub fn caller_context(headers: &HeaderMap, config: &ServerConfig) -> CallerContext {
    let user = header_str(headers, &config.user_header)
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(str::to_string);
    let roles = headers
        .get_all(config.role_header.as_str())
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    CallerContext::new(user, roles)
}

/// Negotiate content types and resolve the caller for one request
pub fn request_context(headers: &HeaderMap, config: &ServerConfig) -> RequestContext {
    RequestContext::new(
        RequestContentType::from_header(header_str(headers, header::CONTENT_TYPE.as_str())),
        ResponseContentType::from_accept(header_str(headers, header::ACCEPT.as_str())),
        caller_context(headers, config),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn roles_are_split_and_trimmed() {
        let config = ServerConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-user-name", HeaderValue::from_static(" ada "));
        headers.append("x-user-roles", HeaderValue::from_static("Clerk, Auditor"));
        headers.append("x-user-roles", HeaderValue::from_static("Admin,,"));

        let caller = caller_context(&headers, &config);
        assert_eq!(caller.user(), Some("ada"));
        assert_eq!(caller.roles().collect::<Vec<_>>(), vec!["Admin", "Auditor", "Clerk"]);
    }

    #[test]
    fn missing_headers_mean_anonymous_json() {
        let context = request_context(&HeaderMap::new(), &ServerConfig::default());
        assert_eq!(context.caller, CallerContext::anonymous());
        assert_eq!(context.request_content_type, RequestContentType::Json);
        assert_eq!(context.response_content_type, ResponseContentType::Json);
    }
}
