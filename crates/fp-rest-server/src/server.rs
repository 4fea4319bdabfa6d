// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Main server implementation

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handlers;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

/// REST API server
pub struct Server {
    config: ServerConfig,
    app: Router,
}

impl Server {
    /// Construct a server from an already-built app state
    pub fn with_state(state: AppState) -> Self {
        let config = state.config().clone();
        let app = Self::build_app(state, &config);
        Self { config, app }
    }

    /// Build the Axum application with routes and middleware
    fn build_app(state: AppState, config: &ServerConfig) -> Router {
        let middleware_stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(if config.enable_cors {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
            });

        let root = format!("/{}", config.service_root());
        let operation_routes = Router::new()
            .route(&root, get(handlers::operations::list_operations))
            .route(&format!("{}/", root), get(handlers::operations::list_operations))
            .route(
                &format!("{}/:name", root),
                get(handlers::operations::describe_operation)
                    .post(handlers::operations::execute_operation),
            )
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes));

        Router::new()
            .route("/healthz", get(handlers::health::health_check))
            .route("/version", get(handlers::health::version))
            .merge(operation_routes)
            .with_state(state)
            .layer(middleware_stack)
    }

    /// The routed application, for serving elsewhere or driving in tests
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Run the server
    pub async fn run(self) -> ServerResult<()> {
        let addr = self.config.bind_addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(
            "Serving operations on http://{}/{}/",
            listener.local_addr()?,
            self.config.service_root()
        );

        axum::serve(listener, self.app)
            .await
            .map_err(|err| ServerError::Internal(format!("REST server error: {err}")))
    }
}
