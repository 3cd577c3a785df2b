//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the example routes and `/health`
//! - Wire up middleware (request ID, logging, security, CORS, timeout)
//! - Keep CORS inside the security filter so preflights are screened and hardened
//! - Attach the response cache and token guard to `/examples` when enabled
//! - Swap the security policy on config reload
//! - Serve with graceful shutdown
//!
//! # Layer Order (outermost first)
//! ```text
//! SetRequestId → PropagateRequestId → Trace → log_requests → security_filter
//!     → CORS → request_timeout → routes
//!                                           └ /examples: require_auth → response_cache
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, Uri},
    middleware,
    routing::get,
    Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::cache::InMemoryResponseCache;
use crate::config::{AppConfig, SecurityConfig};
use crate::example::{handlers, ExampleRepository, ExampleService};
use crate::http::error::{set_expose_error_details, AppError};
use crate::http::middleware::{log_requests, request_timeout, response_cache, CacheState};
use crate::http::response::ApiResponse;
use crate::security::{
    require_auth, security_filter, RateLimiter, SecurityPolicy, SecurityState, TokenValidator,
};

/// HTTP server for the example API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    security: SecurityState,
}

impl HttpServer {
    /// Create a new HTTP server over the given example store.
    pub fn new(config: AppConfig, repo: Arc<dyn ExampleRepository>) -> Self {
        set_expose_error_details(!config.is_production());

        let security = SecurityState::new(SecurityPolicy::from_config(&config), RateLimiter::in_memory());
        let service = ExampleService::new(repo);
        let router = Self::build_router(&config, service, security.clone());

        Self {
            router,
            config,
            security,
        }
    }

    fn build_router(config: &AppConfig, service: ExampleService, security: SecurityState) -> Router {
        let mut examples = handlers::routes(service);

        if config.cache.enabled {
            let cache = CacheState {
                store: Arc::new(InMemoryResponseCache::new()),
                ttl: Duration::from_secs(config.cache.ttl_secs),
                invalidate_pattern: "/examples".to_string(),
            };
            examples = examples.route_layer(middleware::from_fn_with_state(cache, response_cache));
        }

        if config.auth.enabled {
            let validator = Arc::new(TokenValidator::new(&config.auth));
            examples = examples.route_layer(middleware::from_fn_with_state(validator, require_auth));
        }

        let environment = config.app.env.clone();

        Router::new()
            .route("/health", get(move || health(environment.clone())))
            .merge(examples)
            .fallback(fallback)
            .layer(middleware::from_fn_with_state(
                Duration::from_millis(config.timeouts.request_ms),
                request_timeout,
            ))
            .layer(cors_layer(&config.security))
            .layer(middleware::from_fn_with_state(security, security_filter))
            .layer(middleware::from_fn(log_requests))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Every config received on `config_updates` replaces the security policy.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, env = %self.config.app.env, "HTTP server starting");

        let policy = self.security.policy.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                let next = SecurityPolicy::from_config(&config);
                tracing::info!(
                    bypass = next.bypass,
                    allowed_hosts = ?next.allowed_hosts,
                    rate_limit_max = next.rate_limit_max,
                    "Security policy reloaded"
                );
                policy.store(Arc::new(next));
            }
        });

        let sweep_interval = Duration::from_secs(self.config.security.rate_limit.sweep_interval_secs);
        tokio::spawn(
            self.security
                .limiter
                .clone()
                .run_sweeper(sweep_interval, shutdown.resubscribe()),
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn security(&self) -> &SecurityState {
        &self.security
    }
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if security.allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins)).allow_credentials(true)
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
    environment: String,
}

async fn health(environment: String) -> ApiResponse<HealthStatus> {
    ApiResponse::ok(
        HealthStatus {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            environment,
        },
        &Method::GET,
    )
}

async fn fallback(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Cannot {method} {}", uri.path()))
}
