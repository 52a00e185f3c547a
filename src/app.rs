//! The axum application and server.

use std::iter;
use std::time::Duration;

use crate::infra::error::PanicHandler;
use crate::infra::middleware::MakeRequestIdSpan;
use crate::infra::state::AppState;
use axum::Router;
use http::{header::AUTHORIZATION, StatusCode};
use tokio::net::TcpListener;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// The versioned root all API paths are relative to.
pub const API_ROOT: &str = "/api/v1";

/// How much longer than the request timeout the server waits before dropping a request.
/// Requests normally end earlier, when their [`Context`](crate::infra::context::Context) expires.
const TIMEOUT_SLACK: Duration = Duration::from_secs(1);

/// Constructs the full axum application.
pub fn app(state: AppState) -> Router {
    let server = &state.config().server;
    let timeout = server.request_timeout;
    let concurrency_limit = server.concurrency_limit;

    Router::new()
        .nest(API_ROOT, crate::api::api(state))
        // Layers
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout + TIMEOUT_SLACK,
        ))
        .layer(axum::middleware::from_fn(
            crate::infra::middleware::trace_bodies,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(MakeRequestIdSpan)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(()),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(SetSensitiveRequestHeadersLayer::new(iter::once(
            AUTHORIZATION,
        )))
        .layer(GlobalConcurrencyLimitLayer::new(concurrency_limit))
        .layer(CatchPanicLayer::custom(PanicHandler))
}

/// Starts the axum server, and runs it until ctrl-c is pressed.
pub async fn run_app(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = app(state).into_make_service();

    tracing::info!("Starting axum on {}", listener.local_addr()?);
    let exit_result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await;

    match &exit_result {
        Ok(_) => tracing::info!("Successfully shut down"),
        Err(e) => tracing::error!("Shutdown failed: {}", e),
    }

    exit_result
}

/// Completes when ctrl-c is pressed.
pub(crate) async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to fetch ctrl_c: {}", e);
    }
    tracing::info!("Shutting down");
}
