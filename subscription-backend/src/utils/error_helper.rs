// subscription-backend/src/utils/error_helper.rs

//! エラーハンドリングの統一化ヘルパー

use crate::error::AppError;
use tracing::warn;
use validator::ValidationErrors;

/// validatorのValidationErrorsをAppErrorに変換する統一処理
///
/// # Arguments
/// * `validation_errors` - validator crate からのバリデーションエラー
/// * `context` - エラーが発生したコンテキスト（ログ用）
///
/// # Returns
/// * `AppError::ValidationErrors` - `"field: message"` 形式のメッセージ一覧
pub fn convert_validation_errors(validation_errors: ValidationErrors, context: &str) -> AppError {
    warn!(
        context = %context,
        error_count = validation_errors.field_errors().len(),
        "Validation failed"
    );

    let mut errors: Vec<String> = validation_errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| "Invalid value".to_string(), |cow| cow.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();

    // HashMap 由来の順序を安定させる
    errors.sort();

    AppError::ValidationErrors(errors)
}
