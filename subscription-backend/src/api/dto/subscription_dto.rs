// src/api/dto/subscription_dto.rs

use crate::domain::{PriceRangeQuery, Subscription, SubscriptionChanges};
use crate::types::{flexible_date, optional_flexible_date};
use crate::utils::validation::common;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Request DTOs ---

/// サブスクリプション作成リクエスト
#[derive(Deserialize, Serialize, Debug, Validate)]
#[validate(schema(function = validate_create_dates))]
pub struct CreateSubscriptionDto {
    #[validate(
        length(
            min = common::subscription::SERVICE_NAME_MIN_LENGTH,
            max = common::subscription::SERVICE_NAME_MAX_LENGTH,
            message = "Service name must be between 1 and 255 characters"
        ),
        custom(function = common::validate_service_name)
    )]
    pub service_name: String,

    #[validate(range(
        min = common::subscription::PRICE_MIN,
        max = common::subscription::PRICE_MAX,
        message = "Price must be a positive integer"
    ))]
    pub price: u32,

    pub user_id: Uuid,

    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,

    #[serde(default, with = "optional_flexible_date")]
    pub end_date: Option<NaiveDate>,
}

impl From<CreateSubscriptionDto> for Subscription {
    fn from(dto: CreateSubscriptionDto) -> Self {
        Self {
            service_name: dto.service_name.trim().to_string(),
            user_id: dto.user_id,
            price: dto.price,
            start_date: dto.start_date,
            end_date: dto.end_date,
        }
    }
}

/// サブスクリプション更新リクエスト（識別子はパスで指定する）
#[derive(Deserialize, Serialize, Debug, Validate)]
#[validate(schema(function = validate_update_dates))]
pub struct UpdateSubscriptionDto {
    #[validate(range(
        min = common::subscription::PRICE_MIN,
        max = common::subscription::PRICE_MAX,
        message = "Price must be a positive integer"
    ))]
    pub price: u32,

    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,

    #[serde(default, with = "optional_flexible_date")]
    pub end_date: Option<NaiveDate>,
}

impl From<UpdateSubscriptionDto> for SubscriptionChanges {
    fn from(dto: UpdateSubscriptionDto) -> Self {
        Self {
            price: dto.price,
            start_date: dto.start_date,
            end_date: dto.end_date,
        }
    }
}

/// 期間内の合計金額リクエスト
///
/// `service_name` と `user_id` は省略または空文字でフィルタ無効。
#[derive(Deserialize, Serialize, Debug, Validate)]
#[validate(schema(function = validate_range_dates))]
pub struct RangePriceRequestDto {
    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,

    #[serde(with = "flexible_date")]
    pub end_date: NaiveDate,

    #[serde(default)]
    pub service_name: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<Uuid>,
}

impl From<RangePriceRequestDto> for PriceRangeQuery {
    fn from(dto: RangePriceRequestDto) -> Self {
        Self {
            start: dto.start_date,
            end: dto.end_date,
            service_name: dto.service_name,
            user_id: dto.user_id,
        }
    }
}

fn validate_create_dates(dto: &CreateSubscriptionDto) -> Result<(), ValidationError> {
    common::validate_date_order(dto.start_date, dto.end_date)
}

fn validate_update_dates(dto: &UpdateSubscriptionDto) -> Result<(), ValidationError> {
    common::validate_date_order(dto.start_date, dto.end_date)
}

fn validate_range_dates(dto: &RangePriceRequestDto) -> Result<(), ValidationError> {
    if dto.start_date > dto.end_date {
        let mut error = ValidationError::new("start_after_end");
        error.message = Some("Start date cannot be after end date".into());
        return Err(error);
    }
    Ok(())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => Uuid::parse_str(value.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// --- Response DTOs ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionDto {
    pub service_name: String,
    pub price: u32,
    pub user_id: Uuid,
    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,
    #[serde(default, with = "optional_flexible_date")]
    pub end_date: Option<NaiveDate>,
}

impl From<Subscription> for SubscriptionDto {
    fn from(subscription: Subscription) -> Self {
        Self {
            service_name: subscription.service_name,
            price: subscription.price,
            user_id: subscription.user_id,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RangePriceResponseDto {
    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,
    #[serde(with = "flexible_date")]
    pub end_date: NaiveDate,
    pub price: u64,
}
