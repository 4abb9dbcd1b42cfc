// src/api/mod.rs
use crate::config::HttpSettings;
use crate::error::AppError;
use crate::logging::{inject_request_context, logging_middleware};
use crate::repository::SubscriptionStore;
use axum::{
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub mod dto;
pub mod handlers;

/// ハンドラー間で共有するアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubscriptionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }
}

/// 全ルートとミドルウェアを組み立てる
pub fn app_router(app_state: AppState, http: &HttpSettings) -> Router {
    let routes = Router::new()
        .merge(handlers::system_handler::system_router())
        .nest(
            "/api/v1",
            handlers::subscription_handler::subscription_router(app_state),
        );

    with_middleware(routes, http)
}

/// 共通ミドルウェアを適用する
///
/// ハンドラーの panic は 500 に変換され、接続は切断されない。
pub fn with_middleware(router: Router, http: &HttpSettings) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(inject_request_context))
        .layer(TimeoutLayer::new(http.request_timeout))
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::InternalServerError(format!("handler panicked: {}", detail)).into_response()
}
