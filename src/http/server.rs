//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, security headers)
//! - Record request metrics per matched route
//! - Apply reloaded configuration to the running server
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::PortfolioConfig;
use crate::http::content::{delete_content, get_content, put_content};
use crate::http::request::request_id;
use crate::http::session::{callback, session, sign_in, sign_out};
use crate::http::site::{get_status, sitemap};
use crate::http::state::AppState;
use crate::observability::metrics;
use crate::security::headers::with_security_headers;

/// HTTP server for the portfolio site.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server with the store and identity provider named by `config`.
    pub fn new(config: PortfolioConfig) -> Self {
        Self::from_state(AppState::from_config(config))
    }

    /// Create a server over prepared state.
    pub fn from_state(state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Body limit, timeout and security headers are fixed at startup; a reload
    /// only affects values read per request.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config();

        let router = Router::new()
            .route(
                "/api/content",
                get(get_content).put(put_content).delete(delete_content),
            )
            .route(
                "/api/portfolio",
                get(get_content).put(put_content).delete(delete_content),
            )
            .route("/api/status", get(get_status))
            .route("/auth/signin", get(sign_in))
            .route("/auth/callback", get(callback))
            .route("/auth/session", get(session))
            .route("/auth/signout", post(sign_out))
            .route("/sitemap.xml", get(sitemap))
            .merge(setup_admin_router(state.clone()))
            .with_state(state)
            .layer(middleware::from_fn(track_requests))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        let router = if config.security.enable_headers {
            with_security_headers(router)
        } else {
            router
        };

        router
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request.headers()),
                    method = %request.method(),
                    path = %request.uri().path()
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    ///
    /// Every configuration received on `config_updates` is applied to the
    /// running server.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<PortfolioConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.apply_config(config);
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Count and time each request by its matched route.
async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::GoogleProvider;
    use crate::config::GoogleOAuthConfig;
    use crate::content::MemoryCollection;
    use axum::http::{header, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn server(config: PortfolioConfig) -> HttpServer {
        let provider = Arc::new(GoogleProvider::new(&GoogleOAuthConfig::default()));
        HttpServer::from_state(AppState::new(config, Arc::new(MemoryCollection::new()), provider))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_responses_carry_security_headers_and_request_id() {
        let response = server(PortfolioConfig::default())
            .router()
            .oneshot(get("/api/status"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["referrer-policy"], "origin-when-cross-origin");
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_security_headers_can_be_disabled() {
        let mut config = PortfolioConfig::default();
        config.security.enable_headers = false;

        let response = server(config).router().oneshot(get("/api/status")).await.unwrap();
        assert!(!response.headers().contains_key("x-frame-options"));
    }

    #[tokio::test]
    async fn test_admin_requires_session() {
        let router = server(PortfolioConfig::default()).router();

        let response = router.clone().oneshot(get("/admin")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin/login");

        let login = router.oneshot(get("/admin/login")).await.unwrap();
        assert_eq!(login.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sign_in_without_provider_credentials_is_unavailable() {
        let response = server(PortfolioConfig::default())
            .router()
            .oneshot(get("/auth/signin"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
