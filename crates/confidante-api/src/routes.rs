//! Router setup with all API routes and middleware.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use confidante_core::config::ServerConfig;
use confidante_core::error::ConfidanteError;

use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

const BODY_LIMIT_BYTES: usize = 64 * 1024;
const IDLE_SWEEP_PERIOD: Duration = Duration::from_secs(60);

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let dev_port = server.port.saturating_add(1);
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", server.port),
        format!("http://localhost:{}", server.port),
        format!("http://127.0.0.1:{}", dev_port),
        format!("http://localhost:{}", dev_port),
    ]
    .into_iter()
    .chain(server.allowed_origins.iter().cloned())
    .filter_map(|origin| match origin.parse::<HeaderValue>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
            None
        }
    })
    .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);
    let limiter = RateLimiter::new(state.config.server.rate_limit_per_sec);

    let public_routes = Router::new().route("/health", get(handlers::health));

    let api_routes = Router::new()
        .route("/api/contact", post(handlers::submit_contact))
        .route("/api/posts", get(handlers::list_posts))
        .route("/api/posts/categories", get(handlers::list_categories))
        .route("/api/posts/{slug}", get(handlers::get_post))
        .route("/api/posts/{slug}/related", get(handlers::related_posts))
        .route("/api/chat/options", get(handlers::chat_options))
        .route("/api/chat/resolve", post(handlers::resolve_option))
        .route("/api/chat/sessions", post(handlers::create_session))
        .route(
            "/api/chat/sessions/{id}",
            get(handlers::get_session).delete(handlers::close_session),
        )
        .route(
            "/api/chat/sessions/{id}/select",
            post(handlers::select_option),
        )
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(limiter));

    // Long-lived SSE connections are exempt from rate limiting.
    let stream_routes = Router::new().route(
        "/api/chat/sessions/{id}/events",
        get(handlers::session_events),
    );

    public_routes
        .merge(api_routes)
        .merge(stream_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `listener` until `signal` resolves.
///
/// Chat sessions are closed as soon as the signal fires. Open SSE streams
/// end on the session's `closed` event, which lets graceful shutdown finish.
pub async fn serve_until<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    signal: F,
) -> Result<(), ConfidanteError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let sessions = Arc::clone(&state.sessions);
    let sweeper = (state.config.chat.idle_timeout_secs > 0)
        .then(|| tokio::spawn(Arc::clone(&sessions).reap_idle_every(IDLE_SWEEP_PERIOD)));
    let router = create_router(state);

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            signal.await;
            sessions.shutdown();
        })
        .await
        .map_err(|e| ConfidanteError::Api(format!("Server error: {}", e)));

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    result
}
