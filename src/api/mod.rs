pub mod health;
pub mod pages;
pub mod responses;

use crate::config::Config;
use crate::db::ResponseStore;
use crate::error::AppError;
use axum::handler::HandlerWithoutStateExt;
use axum::response::{IntoResponse, Response};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application context handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ResponseStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<ResponseStore>, config: Config) -> Self {
        Self { store, config }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files =
        ServeDir::new(&state.config.static_dir).not_found_service(not_found.into_service());

    Router::new()
        .route("/", get(pages::home).fallback(method_not_allowed))
        .route("/matrix", get(pages::matrix).fallback(method_not_allowed))
        .route(
            "/save_response",
            post(responses::save_response).fallback(method_not_allowed),
        )
        .route("/health", get(health::health).fallback(method_not_allowed))
        .nest_service("/static", static_files)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Turn a handler panic into the generic 500 response.
pub fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    AppError::Internal(detail).into_response()
}
