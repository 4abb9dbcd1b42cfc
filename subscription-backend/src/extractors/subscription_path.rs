use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// `/{service_name}/{user_id}` の識別子キーを取り出す Extractor
///
/// サービス名はパーセントデコード済み。空のサービス名や UUID でない user_id は 400。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPath {
    pub service_name: String,
    pub user_id: Uuid,
}

impl SubscriptionPath {
    /// 生のパスセグメントから識別子キーを組み立てる
    pub fn parse(service_name: &str, user_id: &str) -> Result<Self, AppError> {
        let service_name = service_name.trim();
        if service_name.is_empty() {
            return Err(AppError::BadRequest(
                "Path parameter 'service_name' must not be empty".to_string(),
            ));
        }

        let user_id = Uuid::parse_str(user_id.trim()).map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid UUID format for 'user_id': '{}'",
                user_id
            ))
        })?;

        Ok(Self {
            service_name: service_name.to_string(),
            user_id,
        })
    }
}

impl<S> FromRequestParts<S> for SubscriptionPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((service_name, user_id)) =
            Path::<(String, String)>::from_request_parts(parts, state)
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid path parameters: {}", e)))?;

        Self::parse(&service_name, &user_id)
    }
}
