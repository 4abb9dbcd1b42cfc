// src/error.rs

use crate::repository::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Multiple validation errors")]
    ValidationErrors(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

// ストレージのセンチネルを HTTP の意味に対応付ける
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => AppError::NotFound("Subscription not found".to_string()),
            StorageError::AlreadyExists => {
                AppError::Conflict("Subscription already exists".to_string())
            }
            StorageError::Validation(message) => AppError::ValidationError(message),
            StorageError::AlreadyClosed => {
                AppError::ServiceUnavailable("Storage is shutting down".to_string())
            }
            StorageError::Connection(_) | StorageError::Internal { .. } => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_)
            | AppError::ValidationErrors(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// axum でエラーをHTTPレスポンスに変換するための実装
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = match self {
            AppError::NotFound(message) => ErrorResponse::simple(message, "not_found"),
            AppError::ValidationError(message) => {
                ErrorResponse::simple(message, "validation_error")
            }
            AppError::ValidationErrors(errors) => {
                let mut field_errors = HashMap::new();
                for error in &errors {
                    if let Some((field, message)) = error.split_once(": ") {
                        field_errors
                            .entry(field.to_string())
                            .or_insert_with(Vec::new)
                            .push(message.to_string());
                    }
                }
                let errors_array: Vec<serde_json::Value> =
                    errors.iter().map(|e| json!({"message": e})).collect();
                ErrorResponse::validation(field_errors, errors_array)
            }
            AppError::BadRequest(message) => ErrorResponse::simple(message, "bad_request"),
            AppError::Conflict(message) => ErrorResponse::simple(message, "conflict"),
            AppError::ServiceUnavailable(message) => {
                warn!(reason = %message, "Request rejected while storage is unavailable");
                ErrorResponse::simple(message, "service_unavailable")
            }
            AppError::InternalServerError(message) => {
                // 詳細はサーバーログにのみ出す
                error!(error = %message, "Internal server error");
                ErrorResponse::simple(
                    "An internal server error occurred".to_string(),
                    "internal_server_error",
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
    pub error_type: String,
}

impl ErrorResponse {
    fn simple(message: String, error_type: &str) -> Self {
        Self {
            success: false,
            error: message.clone(),
            message,
            validation_errors: None,
            errors: None,
            error_type: error_type.to_string(),
        }
    }

    fn validation(
        field_errors: HashMap<String, Vec<String>>,
        errors: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            error: "Validation failed".to_string(),
            message: "Validation failed".to_string(),
            validation_errors: Some(field_errors),
            errors: Some(errors),
            error_type: "validation_errors".to_string(),
        }
    }
}
