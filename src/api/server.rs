//! HTTP server implementation for the feedback service
//!
//! This module sets up the Axum web server with all routes, middleware,
//! storage wiring and graceful shutdown handling.

use axum::{
    extract::MatchedPath,
    http::{header, HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use uuid::Uuid;

use crate::{
    api::{
        feedback::submit_feedback,
        health::{health_check, ready_check},
    },
    config::{Config, CorsConfig, StorageBackend},
    db::{create_pool, FeedbackRepository, InMemoryFeedbackRepository, PgFeedbackRepository},
    error::{Error, Result},
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Storage collaborator, constructed once at startup
    pub repository: Arc<dyn FeedbackRepository>,
}

impl AppState {
    /// Wrap a storage collaborator
    pub fn new(repository: Arc<dyn FeedbackRepository>) -> Self {
        Self { repository }
    }
}

/// Header carrying the per-request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator
#[derive(Clone, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(id.parse().ok()?))
    }
}

/// Build the CORS layer from the configured origins
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allows_any() {
        AllowOrigin::from(Any)
    } else {
        let origins = config.origins_list().into_iter().filter_map(|origin| {
            match HeaderValue::from_str(&origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                },
            }
        });
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the main application router
pub fn create_router(config: Arc<Config>, state: AppState) -> Router {
    let api_routes = Router::new().route("/api/feedback", post(submit_feedback));

    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/readyz", get(ready_check));

    let app = Router::new().merge(api_routes).merge(health_routes).with_state(state);

    // Apply middleware; the last layer added runs first, so the request id
    // is assigned before the trace span reads it.
    app.layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.cors))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path =
                        request.extensions().get::<MatchedPath>().map(MatchedPath::as_str);
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "http_request",
                        method = ?request.method(),
                        matched_path,
                        request_id,
                        latency = tracing::field::Empty,
                        status = tracing::field::Empty,
                    )
                })
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(tracing::Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Construct the configured storage collaborator
pub async fn build_repository(config: &Config) -> Result<Arc<dyn FeedbackRepository>> {
    match config.database.backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database).await?;
            let repository = PgFeedbackRepository::new(pool, config.database.table.clone());
            repository.ensure_schema().await?;
            Ok(Arc::new(repository))
        },
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; feedback is lost on restart");
            Ok(Arc::new(InMemoryFeedbackRepository::new()))
        },
    }
}

/// Create and start the HTTP server
pub async fn create_server(config: Arc<Config>) -> Result<()> {
    let repository = build_repository(&config).await?;
    let app = create_router(config.clone(), AppState::new(repository));

    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| Error::config(format!("Invalid server address: {}", e)))?;

    tracing::info!(
        address = %addr,
        environment = %config.server.environment,
        "Starting HTTP server"
    );

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!(address = %addr, "HTTP server listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::internal(format!("Server error: {}", e)))
}

/// Shutdown signal handler
///
/// Waits for CTRL+C or SIGTERM signals to gracefully shutdown the server.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL+C, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, ServerConfig};
    use crate::test_utils::MockFeedbackRepository;
    use axum::http::StatusCode;
    use std::sync::Mutex;
    use tower::ServiceExt;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Records the `request_id` field of every new span
    #[derive(Clone, Default)]
    struct RequestIdCapture(Arc<Mutex<Vec<String>>>);

    struct RequestIdVisitor<'a>(&'a mut Vec<String>);

    impl Visit for RequestIdVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "request_id" {
                self.0.push(value.to_string());
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "request_id" {
                self.0.push(format!("{:?}", value));
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for RequestIdCapture {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: Context<'_, S>,
        ) {
            let mut ids = self.0.lock().unwrap();
            attrs.record(&mut RequestIdVisitor(&mut *ids));
        }
    }

    fn test_config() -> Arc<Config> {
        Arc::new(Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5050,
                log_level: "info".to_string(),
                environment: "test".to_string(),
                request_timeout_secs: 30,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: String::new(),
                table: "feedback".to_string(),
                pool_max_size: 1,
                pool_min_idle: 0,
                pool_timeout_seconds: 5,
                pool_idle_timeout_seconds: 60,
            },
            cors: CorsConfig {
                allowed_origins: "http://localhost:5173".to_string(),
            },
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(
            test_config(),
            AppState::new(Arc::new(MockFeedbackRepository::new())),
        );

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_span_carries_assigned_id() {
        let capture = RequestIdCapture::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

        let app = create_router(
            test_config(),
            AppState::new(Arc::new(MockFeedbackRepository::new())),
        );

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let assigned = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .expect("response should carry a request id");
        assert!(Uuid::parse_str(&assigned).is_ok());

        let recorded = capture.0.lock().unwrap().clone();
        assert_eq!(recorded, vec![assigned]);
    }

    #[tokio::test]
    async fn test_build_repository_memory_backend() {
        let repository = build_repository(&test_config()).await.unwrap();
        assert_eq!(repository.count().await.unwrap(), 0);
    }

    #[test]
    fn test_cors_layer_accepts_wildcard_and_lists() {
        let _ = cors_layer(&CorsConfig {
            allowed_origins: "*".to_string(),
        });
        let _ = cors_layer(&CorsConfig {
            allowed_origins: "http://localhost:5173,not a header\n".to_string(),
        });
    }
}
