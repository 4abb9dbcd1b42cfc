use crate::error::AppError;
use crate::utils::error_helper::convert_validation_errors;
use axum::{
    extract::{FromRequest, Json, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON ボディをデコードしてから `Validate` を通す Extractor
///
/// デコード失敗も検証失敗も 400 として扱う（axum 既定の 415/422 にはしない）。
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let context = format!("{} {}", req.method(), req.uri().path());
        let has_json_content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if !has_json_content_type {
            return Err(AppError::BadRequest(
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
            })?;

        value
            .validate()
            .map_err(|errors| convert_validation_errors(errors, &context))?;

        Ok(ValidatedJson(value))
    }
}
