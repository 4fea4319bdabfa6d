// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Validation helpers for values that end up in operation URLs

use crate::error::ApiContractError;
use url::Url;

/// Validate an externally visible base URL
pub fn validate_public_url(url_str: &str) -> Result<Url, ApiContractError> {
    let url = Url::parse(url_str)?;
    if !matches!(url.scheme(), "http" | "https")
        || url.query().is_some()
        || url.fragment().is_some()
    {
        return Err(ApiContractError::InvalidPublicUrl(url_str.to_string()));
    }
    Ok(url)
}

/// Validate the path segment operations are mounted under
///
/// Leading and trailing slashes are tolerated; the root must otherwise be a
/// plain relative path without empty, `.` or `..` segments.
pub fn validate_service_root(root: &str) -> Result<(), ApiContractError> {
    let trimmed = root.trim_matches('/');
    if trimmed.is_empty() {
        return Err(ApiContractError::InvalidServiceRoot(root.to_string()));
    }
    for segment in trimmed.split('/') {
        let valid = !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'));
        if !valid {
            return Err(ApiContractError::InvalidServiceRoot(root.to_string()));
        }
    }
    Ok(())
}
