// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Dependency wiring for the REST server

use crate::{
    config::{PublicationConfig, ServerConfig},
    error::ServerResult,
    state::AppState,
};
use fp_core::{
    JsonObjectCodec, ObjectCodec, OperationDescriber, ProcedureInvoker, PublicationRegistry,
    PublicationValidator, RequestAdapter, RoleResolver, TypeIntrospector,
};
use std::sync::Arc;
use tracing::{error, info};

/// Validate and register every configured publication in order.
///
/// Stops at the first rejected publication; nothing is served in that case.
pub fn publish_all(
    publications: &[PublicationConfig],
    introspector: &dyn TypeIntrospector,
    roles: &dyn RoleResolver,
) -> ServerResult<PublicationRegistry> {
    let validator = PublicationValidator::new(introspector, roles);
    let mut registry = PublicationRegistry::new();
    for publication in publications {
        if let Err(err) = validator.publish(
            &mut registry,
            &publication.procedure,
            &publication.role,
            &publication.description,
        ) {
            error!(procedure = %publication.procedure, error = %err, "publication rejected");
            return Err(err.into());
        }
    }
    info!(operations = registry.len(), "publication complete");
    Ok(registry)
}

/// Builds the app state from the platform collaborators
pub struct ServerDependencies {
    state: AppState,
}

impl ServerDependencies {
    /// Wire a platform that provides every collaborator, with the reference object codec
    pub fn new<P>(config: ServerConfig, platform: Arc<P>) -> ServerResult<Self>
    where
        P: TypeIntrospector + RoleResolver + ProcedureInvoker + 'static,
    {
        let introspector: Arc<dyn TypeIntrospector> = platform.clone();
        let codec = Arc::new(JsonObjectCodec::new(introspector.clone()));
        Self::with_collaborators(config, introspector, platform.clone(), platform, codec)
    }

    pub fn with_collaborators(
        config: ServerConfig,
        introspector: Arc<dyn TypeIntrospector>,
        roles: Arc<dyn RoleResolver>,
        invoker: Arc<dyn ProcedureInvoker>,
        codec: Arc<dyn ObjectCodec>,
    ) -> ServerResult<Self> {
        config.check()?;
        let registry = publish_all(&config.publications, introspector.as_ref(), roles.as_ref())?;

        let describer =
            OperationDescriber::new(introspector, config.base_url(), config.service_root())
                .with_max_depth(config.schema_max_depth);
        let adapter = RequestAdapter::new(codec, invoker);

        Ok(Self {
            state: AppState {
                config: Arc::new(config),
                registry: Arc::new(registry),
                adapter: Arc::new(adapter),
                describer: Arc::new(describer),
            },
        })
    }

    /// Consume the dependency builder and return the resulting app state
    pub fn into_state(self) -> AppState {
        self.state
    }
}
