// tests/common/test_data.rs

use chrono::NaiveDate;
use serde_json::{json, Value};
use subscription_backend::domain::{Subscription, SubscriptionChanges};
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 終了日なし（継続中）のサブスクリプション
pub fn create_test_subscription(service_name: &str, price: u32) -> Subscription {
    Subscription {
        service_name: service_name.to_string(),
        user_id: Uuid::new_v4(),
        price,
        start_date: date(2025, 7, 1),
        end_date: None,
    }
}

/// 期間を指定したサブスクリプション
pub fn create_subscription_with_period(
    service_name: &str,
    user_id: Uuid,
    price: u32,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Subscription {
    Subscription {
        service_name: service_name.to_string(),
        user_id,
        price,
        start_date,
        end_date,
    }
}

pub fn create_test_changes(price: u32) -> SubscriptionChanges {
    SubscriptionChanges {
        price,
        start_date: date(2025, 8, 1),
        end_date: Some(date(2026, 7, 31)),
    }
}

/// POST /api/v1/subscriptions 用のリクエストボディ
pub fn create_subscription_body(service_name: &str, user_id: Uuid, price: i64) -> Value {
    json!({
        "service_name": service_name,
        "price": price,
        "user_id": user_id,
        "start_date": "2025-07-01"
    })
}
