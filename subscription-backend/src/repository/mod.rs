// src/repository/mod.rs
pub mod subscription_repository;

use crate::domain::{PriceRangeQuery, Subscription, SubscriptionChanges};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// ストレージ層のエラー
///
/// `AlreadyExists` と `NotFound` は呼び出し側が分岐するためのセンチネル。
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to storage: {0}")]
    Connection(#[source] DbErr),

    #[error("subscription already exists")]
    AlreadyExists,

    #[error("subscription not found")]
    NotFound,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{op}: {source}")]
    Internal {
        op: &'static str,
        #[source]
        source: DbErr,
    },

    #[error("storage is already closed")]
    AlreadyClosed,
}

impl StorageError {
    pub fn internal(op: &'static str, source: DbErr) -> Self {
        StorageError::Internal { op, source }
    }

    /// 正常系の分岐として扱う結果か（ロールバック時のログレベル判定に使う）
    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            StorageError::AlreadyExists | StorageError::NotFound | StorageError::Validation(_)
        )
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// HTTP 層が依存するサブスクリプションストレージの契約
///
/// 各操作は1トランザクションで完結する。
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// 識別子が既に存在すれば `AlreadyExists`（書き込みは行わない）
    async fn create(&self, subscription: Subscription) -> StorageResult<Uuid>;

    async fn read(&self, service_name: &str, user_id: Uuid) -> StorageResult<Subscription>;

    /// 対象がなければ `NotFound`。新規作成はしない
    async fn update(
        &self,
        service_name: &str,
        user_id: Uuid,
        changes: SubscriptionChanges,
    ) -> StorageResult<()>;

    async fn delete(&self, service_name: &str, user_id: Uuid) -> StorageResult<()>;

    async fn list(&self) -> StorageResult<Vec<Subscription>>;

    /// 期間が重なるサブスクリプションの価格合計。該当なしは 0
    async fn range_price(&self, query: PriceRangeQuery) -> StorageResult<u64>;

    /// 二回目以降の呼び出しは `AlreadyClosed`
    async fn close(&self) -> StorageResult<()>;
}

/// 入力値のうちストレージ側でも保証する制約（空でないサービス名・正の価格）
pub fn validate_new_record(service_name: &str, price: u32) -> StorageResult<i32> {
    if service_name.trim().is_empty() {
        return Err(StorageError::Validation(
            "service_name must not be empty".to_string(),
        ));
    }
    validate_price(price)
}

pub fn validate_price(price: u32) -> StorageResult<i32> {
    if price == 0 {
        return Err(StorageError::Validation(
            "price must be greater than zero".to_string(),
        ));
    }
    i32::try_from(price).map_err(|_| {
        StorageError::Validation(format!("price must not exceed {}", i32::MAX))
    })
}
