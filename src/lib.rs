use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use ipnet::IpNet;

pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod github;
pub mod http;
pub mod logging;
pub mod mcp;

use github::GitHubProvider;

#[derive(Clone)]
pub struct AppState {
    pub api_token: Option<Arc<str>>,
    pub allowed_cidr: Option<IpNet>,
    pub trusted_proxies: Arc<[IpNet]>,
    pub github: Arc<dyn GitHubProvider>,
    pub base_url: Arc<str>,
    pub environment: Arc<str>,
}

impl AppState {
    pub fn new(
        api_token: Option<String>,
        allowed_cidr: Option<IpNet>,
        trusted_proxies: Vec<IpNet>,
        github: Arc<dyn GitHubProvider>,
        base_url: String,
        environment: String,
    ) -> Self {
        Self {
            api_token: api_token.map(Arc::<str>::from),
            allowed_cidr,
            trusted_proxies: Arc::from(trusted_proxies),
            github,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            environment: Arc::from(environment),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/mcp",
            post(http::handlers::mcp_endpoint).options(http::handlers::mcp_options),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token,
        ));

    Router::new()
        .route("/", get(http::handlers::status))
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .route("/.well-known/openapi.json", get(http::handlers::openapi))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::enforce_ip_allowlist,
        ))
        .layer(middleware::from_fn(http::headers::security_headers))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
