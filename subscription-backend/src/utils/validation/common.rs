// subscription-backend/src/utils/validation/common.rs

//! 共通バリデーション定数
//!
//! DTO とストレージ層で同じ制約を参照するためにここで一元管理する。

use chrono::NaiveDate;
use validator::ValidationError;

// =============================================================================
// バリデーション定数
// =============================================================================

/// サブスクリプション関連の制約
pub mod subscription {
    pub const SERVICE_NAME_MIN_LENGTH: u64 = 1;
    pub const SERVICE_NAME_MAX_LENGTH: u64 = 255;
    /// price は integer カラムに収まる正の整数
    pub const PRICE_MIN: u32 = 1;
    pub const PRICE_MAX: u32 = i32::MAX as u32;
}

// =============================================================================
// カスタムバリデーション関数
// =============================================================================

/// 空白のみのサービス名を弾く（長さチェックは validator の length で行う）
pub fn validate_service_name(service_name: &str) -> Result<(), ValidationError> {
    if service_name.trim().is_empty() {
        let mut error = ValidationError::new("blank_service_name");
        error.message = Some("Service name must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// 終了日は開始日より前にできない（同日は可）
pub fn validate_date_order(
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match end_date {
        Some(end_date) if end_date < start_date => {
            let mut error = ValidationError::new("end_before_start");
            error.message = Some("End date must not be before start date".into());
            Err(error)
        }
        _ => Ok(()),
    }
}
