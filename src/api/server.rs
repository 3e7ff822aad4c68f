use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use super::classify::Classifier;
use super::config::AppConfig;
use super::routes;
use super::types::FailureResponse;

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub config: Arc<AppConfig>,
    pub classifier: Arc<Classifier>,
}

/// Maps a handler panic to the 500 failure envelope instead of dropping
/// the connection.
fn panic_to_500(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal error".to_string()
    };
    tracing::error!("handler panicked: {message}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FailureResponse {
            success: false,
            error: message,
        }),
    )
        .into_response()
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/lookup", get(routes::lookup))
        .route("/markets", get(routes::market_list))
        .route("/health", get(routes::health))
        .layer(cors)
        .layer(CatchPanicLayer::custom(panic_to_500))
        .with_state(state)
}

pub async fn run(config: AppConfig, port: u16) {
    let http = reqwest::Client::new();
    let state = AppState {
        http,
        config: Arc::new(config),
        classifier: Arc::new(Classifier::new()),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("Failed to bind");

    tracing::info!("API server listening on port {port}");
    axum::serve(listener, app).await.expect("Server failed");
}
