// src/repository/subscription_repository.rs
use crate::config::DatabaseSettings;
use crate::db::{self, DbPool};
use crate::domain::subscription_model::{ActiveModel, Column, Entity as SubscriptionEntity};
use crate::domain::{PriceRangeQuery, Subscription, SubscriptionChanges};
use crate::repository::{
    validate_new_record, validate_price, StorageError, StorageResult, SubscriptionStore,
};
use crate::with_transaction;
use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    entity::*, query::*, Condition, DbConn, DbErr, FromQueryResult, QueryFilter, QueryOrder,
    Set,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const OP_CREATE: &str = "subscription_repository.create";
const OP_READ: &str = "subscription_repository.read";
const OP_UPDATE: &str = "subscription_repository.update";
const OP_DELETE: &str = "subscription_repository.delete";
const OP_LIST: &str = "subscription_repository.list";
const OP_RANGE_PRICE: &str = "subscription_repository.range_price";

/// SUM(price) の結果。Postgres では integer の合計は bigint になる
#[derive(Debug, FromQueryResult)]
struct PriceTotal {
    total: Option<i64>,
}

/// PostgreSQL をバックエンドにしたサブスクリプションストア
///
/// 接続プールはクローン間で共有される。`close` 後は全操作が `AlreadyClosed` を返す。
pub struct SubscriptionRepository {
    db: DbConn,
    closed: AtomicBool,
}

impl SubscriptionRepository {
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            closed: AtomicBool::new(false),
        }
    }

    /// プールを作成し、スキーマを用意してからストアを返す
    #[instrument(skip_all, fields(max_connections = settings.max_connections))]
    pub async fn open(settings: &DatabaseSettings) -> StorageResult<Self> {
        let pool = db::create_db_pool(settings)
            .await
            .map_err(StorageError::Connection)?;

        // スキーマを用意できない場合も接続エラーとして扱う
        db::run_migrations(&pool)
            .await
            .map_err(StorageError::Connection)?;

        info!("Subscription storage opened");
        Ok(Self::new(pool))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // 各操作の最初に呼び出す
    fn connection(&self) -> StorageResult<&DbPool> {
        if self.is_closed() {
            return Err(StorageError::AlreadyClosed);
        }
        Ok(&self.db)
    }

    #[instrument(skip(self, subscription), fields(service_name = %subscription.service_name, user_id = %subscription.user_id))]
    pub async fn create(&self, subscription: Subscription) -> StorageResult<Uuid> {
        let price = validate_new_record(&subscription.service_name, subscription.price)?;
        let db = self.connection()?;
        let user_id = subscription.user_id;

        with_transaction!(db, OP_CREATE, |txn| async move {
            // 既存行がある場合は何も書き込まない（先勝ち）
            let inserted = SubscriptionEntity::insert(ActiveModel::for_insert(subscription, price))
                .on_conflict(
                    OnConflict::columns([Column::ServiceName, Column::UserId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(txn)
                .await
                .map_err(|e| StorageError::internal(OP_CREATE, e))?;

            if inserted == 0 {
                return Err(StorageError::AlreadyExists);
            }

            debug!("Subscription created");
            Ok(user_id)
        })
    }

    #[instrument(skip(self))]
    pub async fn read(&self, service_name: &str, user_id: Uuid) -> StorageResult<Subscription> {
        let db = self.connection()?;
        let key = (service_name.to_owned(), user_id);

        with_transaction!(db, OP_READ, |txn| async move {
            let model = SubscriptionEntity::find_by_id(key)
                .one(txn)
                .await
                .map_err(|e| StorageError::internal(OP_READ, e))?
                .ok_or(StorageError::NotFound)?;

            Subscription::try_from(model).map_err(|e| StorageError::internal(OP_READ, e))
        })
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        service_name: &str,
        user_id: Uuid,
        changes: SubscriptionChanges,
    ) -> StorageResult<()> {
        let price = validate_price(changes.price)?;
        let db = self.connection()?;
        let service_name = service_name.to_owned();

        with_transaction!(db, OP_UPDATE, |txn| async move {
            let result = SubscriptionEntity::update_many()
                .set(ActiveModel {
                    price: Set(price),
                    start_date: Set(changes.start_date),
                    end_date: Set(changes.end_date),
                    ..Default::default()
                })
                .filter(Column::ServiceName.eq(service_name))
                .filter(Column::UserId.eq(user_id))
                .exec(txn)
                .await
                .map_err(|e| StorageError::internal(OP_UPDATE, e))?;

            // 更新対象がなければ作成はしない
            if result.rows_affected == 0 {
                return Err(StorageError::NotFound);
            }

            debug!("Subscription updated");
            Ok(())
        })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, service_name: &str, user_id: Uuid) -> StorageResult<()> {
        let db = self.connection()?;
        let key = (service_name.to_owned(), user_id);

        with_transaction!(db, OP_DELETE, |txn| async move {
            let result = SubscriptionEntity::delete_by_id(key)
                .exec(txn)
                .await
                .map_err(|e| StorageError::internal(OP_DELETE, e))?;

            if result.rows_affected == 0 {
                return Err(StorageError::NotFound);
            }

            debug!("Subscription deleted");
            Ok(())
        })
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> StorageResult<Vec<Subscription>> {
        let db = self.connection()?;

        with_transaction!(db, OP_LIST, |txn| async move {
            let models = SubscriptionEntity::find()
                .order_by_asc(Column::ServiceName)
                .order_by_asc(Column::UserId)
                .all(txn)
                .await
                .map_err(|e| StorageError::internal(OP_LIST, e))?;

            models
                .into_iter()
                .map(|model| {
                    Subscription::try_from(model).map_err(|e| StorageError::internal(OP_LIST, e))
                })
                .collect()
        })
    }

    #[instrument(skip(self, query), fields(start = %query.start, end = %query.end))]
    pub async fn range_price(&self, query: PriceRangeQuery) -> StorageResult<u64> {
        if !query.is_valid_range() {
            return Err(StorageError::Validation(
                "start must not be after end".to_string(),
            ));
        }
        let db = self.connection()?;
        let condition = overlap_condition(&query);

        with_transaction!(db, OP_RANGE_PRICE, |txn| async move {
            let row = SubscriptionEntity::find()
                .select_only()
                .column_as(Expr::col(Column::Price).sum(), "total")
                .filter(condition)
                .into_model::<PriceTotal>()
                .one(txn)
                .await
                .map_err(|e| StorageError::internal(OP_RANGE_PRICE, e))?;

            let total = row.and_then(|row| row.total).unwrap_or(0);
            u64::try_from(total).map_err(|_| {
                StorageError::internal(
                    OP_RANGE_PRICE,
                    DbErr::Custom(format!("negative price total {}", total)),
                )
            })
        })
    }

    /// プールを閉じる。二回目以降は `AlreadyClosed`
    #[instrument(skip(self))]
    pub async fn close(&self) -> StorageResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(StorageError::AlreadyClosed);
        }

        self.db
            .close_by_ref()
            .await
            .map_err(StorageError::Connection)?;

        info!("Subscription storage closed");
        Ok(())
    }
}

/// [start, end] と重なる行を選ぶ条件（空のサービス名フィルタは無視）
fn overlap_condition(query: &PriceRangeQuery) -> Condition {
    let mut condition = Condition::all()
        .add(Column::StartDate.lte(query.end))
        .add(
            Condition::any()
                .add(Column::EndDate.is_null())
                .add(Column::EndDate.gte(query.start)),
        );

    if let Some(service_name) = query.service_filter() {
        condition = condition.add(Column::ServiceName.eq(service_name));
    }

    if let Some(user_id) = query.user_id {
        condition = condition.add(Column::UserId.eq(user_id));
    }

    condition
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepository {
    async fn create(&self, subscription: Subscription) -> StorageResult<Uuid> {
        SubscriptionRepository::create(self, subscription).await
    }

    async fn read(&self, service_name: &str, user_id: Uuid) -> StorageResult<Subscription> {
        SubscriptionRepository::read(self, service_name, user_id).await
    }

    async fn update(
        &self,
        service_name: &str,
        user_id: Uuid,
        changes: SubscriptionChanges,
    ) -> StorageResult<()> {
        SubscriptionRepository::update(self, service_name, user_id, changes).await
    }

    async fn delete(&self, service_name: &str, user_id: Uuid) -> StorageResult<()> {
        SubscriptionRepository::delete(self, service_name, user_id).await
    }

    async fn list(&self) -> StorageResult<Vec<Subscription>> {
        SubscriptionRepository::list(self).await
    }

    async fn range_price(&self, query: PriceRangeQuery) -> StorageResult<u64> {
        SubscriptionRepository::range_price(self, query).await
    }

    async fn close(&self) -> StorageResult<()> {
        SubscriptionRepository::close(self).await
    }
}
