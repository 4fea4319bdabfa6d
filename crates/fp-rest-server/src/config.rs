// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server configuration
//!
//! Loaded from an optional TOML file and then overridden from the command line.
//!
//! ```toml
//! bind-addr = "0.0.0.0:8080"
//! service-root = "rest"
//! public-url = "https://apps.example.com"
//!
//! [[publication]]
//! procedure = "Orders.Greet"
//! role = "*"
//! description = "Says hello"
//! ```

use crate::error::{ServerError, ServerResult};
use fp_core::ANY_ROLE;
use fp_rest_api_contract::validation::{validate_public_url, validate_service_root};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use validator::Validate;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,

    /// Path segment operations are mounted under
    pub service_root: String,

    /// Externally visible base URL used in operation descriptions
    pub public_url: Option<String>,

    /// Largest accepted request body
    #[validate(range(min = 1))]
    pub max_body_bytes: usize,

    /// Allow any origin
    pub enable_cors: bool,

    /// Trusted header with the caller's comma separated roles
    #[validate(length(min = 1))]
    pub role_header: String,

    /// Trusted header with the caller's user name
    #[validate(length(min = 1))]
    pub user_header: String,

    #[validate(range(min = 1, max = 64))]
    pub schema_max_depth: usize,

    #[serde(rename = "publication")]
    #[validate(nested)]
    pub publications: Vec<PublicationConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            service_root: "rest".to_string(),
            public_url: None,
            max_body_bytes: 1024 * 1024,
            enable_cors: false,
            role_header: "x-user-roles".to_string(),
            user_header: "x-user-name".to_string(),
            schema_max_depth: fp_core::schema::DEFAULT_MAX_DEPTH,
            publications: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load a TOML configuration file; absent keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| ServerError::Config(format!("cannot read {}: {}", path.display(), err)))?;
        toml::from_str(&text)
            .map_err(|err| ServerError::Config(format!("cannot parse {}: {}", path.display(), err)))
    }

    /// Validate field constraints, the service root and the public URL
    pub fn check(&self) -> ServerResult<()> {
        self.validate()?;
        validate_service_root(&self.service_root)
            .map_err(|err| ServerError::Config(err.to_string()))?;
        if let Some(public_url) = &self.public_url {
            validate_public_url(public_url).map_err(|err| ServerError::Config(err.to_string()))?;
        }
        Ok(())
    }

    /// Base URL for operation URLs, without a trailing slash
    pub fn base_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.bind_addr),
        }
    }

    /// Service root without surrounding slashes
    pub fn service_root(&self) -> &str {
        self.service_root.trim_matches('/')
    }
}

/// One procedure to publish at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "kebab-case")]
pub struct PublicationConfig {
    /// Qualified procedure name, `Module.Name`
    #[validate(length(min = 1))]
    pub procedure: String,

    #[serde(default = "default_role")]
    #[validate(length(min = 1))]
    pub role: String,

    #[serde(default)]
    pub description: String,
}

impl PublicationConfig {
    pub fn new(procedure: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            procedure: procedure.into(),
            role: role.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

fn default_role() -> String {
    ANY_ROLE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.service_root(), "rest");
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
        assert!(config.check().is_ok());
    }

    #[test]
    fn loads_publications_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
bind-addr = "0.0.0.0:9000"
public-url = "https://apps.example.com/"

[[publication]]
procedure = "Orders.Greet"
description = "Says hello"

[[publication]]
procedure = "Orders.Purge"
role = "Administrator"
"#
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.service_root, "rest");
        assert_eq!(config.base_url(), "https://apps.example.com");
        assert_eq!(
            config.publications,
            vec![
                PublicationConfig::new("Orders.Greet", "*").with_description("Says hello"),
                PublicationConfig::new("Orders.Purge", "Administrator"),
            ]
        );
        assert!(config.check().is_ok());
    }

    #[test]
    fn missing_and_malformed_files_are_config_errors() {
        let err = ServerConfig::from_file("/nonexistent/fp.toml").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "bind-addr = 12").unwrap();
        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn check_rejects_invalid_values() {
        let config = ServerConfig {
            publications: vec![PublicationConfig::new("", "*")],
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(ServerError::Validation(_))));

        let config = ServerConfig {
            service_root: "a b".into(),
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(ServerError::Config(_))));

        let config = ServerConfig {
            public_url: Some("ftp://example.com".into()),
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(ServerError::Config(_))));
    }
}
