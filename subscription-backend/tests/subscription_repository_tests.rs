// tests/subscription_repository_tests.rs
//
// 実際の PostgreSQL（Docker）に対する結合テスト
// cargo test --features pg-tests

#![cfg(feature = "pg-tests")]

mod common;

use common::db::TestDatabase;
use common::test_data::{
    create_subscription_with_period, create_test_changes, create_test_subscription, date,
};
use sea_orm::ConnectionTrait;
use std::collections::HashSet;
use std::sync::Arc;
use subscription_backend::domain::PriceRangeQuery;
use subscription_backend::repository::subscription_repository::SubscriptionRepository;
use subscription_backend::repository::{StorageError, StorageResult, SubscriptionStore};
use subscription_backend::with_transaction;
use uuid::Uuid;

#[tokio::test]
async fn test_create_then_read_round_trip() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let store = db.open_store().await;

    let mut subscription = create_test_subscription("Yandex Plus", 400);
    subscription.end_date = Some(date(2025, 12, 31));

    let user_id = store.create(subscription.clone()).await.unwrap();
    let stored = store.read("Yandex Plus", user_id).await.unwrap();

    assert_eq!(user_id, subscription.user_id);
    assert_eq!(stored, subscription);
}

#[tokio::test]
async fn test_duplicate_create_keeps_first_values() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let store = db.open_store().await;

    let first = create_test_subscription("Netflix", 599);
    let mut second = first.clone();
    second.price = 999;

    store.create(first.clone()).await.unwrap();
    let result = store.create(second).await;

    assert!(matches!(result, Err(StorageError::AlreadyExists)));
    let stored = store.read("Netflix", first.user_id).await.unwrap();
    assert_eq!(stored.price, 599);
}

#[tokio::test]
async fn test_update_and_delete_missing_are_not_found() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let store = db.open_store().await;
    let user_id = Uuid::new_v4();

    let update = store
        .update("Netflix", user_id, create_test_changes(100))
        .await;
    let delete = store.delete("Netflix", user_id).await;

    assert!(matches!(update, Err(StorageError::NotFound)));
    assert!(matches!(delete, Err(StorageError::NotFound)));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_replaces_mutable_fields() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let store = db.open_store().await;
    let subscription = create_test_subscription("Spotify", 299);
    store.create(subscription.clone()).await.unwrap();

    let changes = create_test_changes(349);
    store
        .update("Spotify", subscription.user_id, changes.clone())
        .await
        .unwrap();

    let stored = store.read("Spotify", subscription.user_id).await.unwrap();
    assert_eq!(stored.price, changes.price);
    assert_eq!(stored.start_date, changes.start_date);
    assert_eq!(stored.end_date, changes.end_date);
}

#[tokio::test]
async fn test_delete_removes_record() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let store = db.open_store().await;
    let subscription = create_test_subscription("Netflix", 599);
    store.create(subscription.clone()).await.unwrap();

    store
        .delete("Netflix", subscription.user_id)
        .await
        .unwrap();

    let result = store.read("Netflix", subscription.user_id).await;
    assert!(matches!(result, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn test_list_returns_every_distinct_key() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let store = db.open_store().await;
    let user_id = Uuid::new_v4();

    for service in ["Netflix", "Spotify", "Yandex Plus"] {
        store
            .create(create_subscription_with_period(
                service,
                user_id,
                100,
                date(2025, 1, 1),
                None,
            ))
            .await
            .unwrap();
    }
    store
        .create(create_test_subscription("Netflix", 100))
        .await
        .unwrap();

    let listed = store.list().await.unwrap();
    let keys: HashSet<_> = listed
        .iter()
        .map(|s| (s.service_name.clone(), s.user_id))
        .collect();

    assert_eq!(listed.len(), 4);
    assert_eq!(keys.len(), 4);
}

#[tokio::test]
async fn test_range_price_overlap_semantics() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let store = db.open_store().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let records = [
        create_subscription_with_period("Netflix", alice, 500, date(2024, 6, 1), None),
        create_subscription_with_period(
            "Spotify",
            alice,
            300,
            date(2025, 3, 1),
            Some(date(2025, 4, 30)),
        ),
        // 期間の最終日に開始
        create_subscription_with_period("Netflix", bob, 700, date(2025, 12, 31), None),
        // 期間の初日に終了
        create_subscription_with_period(
            "Spotify",
            bob,
            200,
            date(2024, 1, 1),
            Some(date(2025, 1, 1)),
        ),
        // 期間より前に終了
        create_subscription_with_period(
            "Netflix",
            Uuid::new_v4(),
            1000,
            date(2023, 1, 1),
            Some(date(2024, 12, 31)),
        ),
    ];
    for record in records {
        store.create(record).await.unwrap();
    }

    let year = PriceRangeQuery::new(date(2025, 1, 1), date(2025, 12, 31));

    assert_eq!(store.range_price(year.clone()).await.unwrap(), 1700);
    assert_eq!(
        store
            .range_price(year.clone().with_service_name("Netflix"))
            .await
            .unwrap(),
        1200
    );
    assert_eq!(
        store
            .range_price(year.clone().with_user_id(alice))
            .await
            .unwrap(),
        800
    );
    assert_eq!(
        store
            .range_price(year.clone().with_service_name(""))
            .await
            .unwrap(),
        1700
    );
    assert_eq!(
        store
            .range_price(PriceRangeQuery::new(date(2030, 1, 1), date(2030, 1, 31)).with_service_name("Spotify"))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_range_price_on_empty_table_is_zero() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let store = db.open_store().await;

    let total = store
        .range_price(PriceRangeQuery::new(date(2025, 1, 1), date(2025, 1, 31)))
        .await
        .unwrap();

    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_concurrent_creates_have_exactly_one_winner() {
    common::init_test_env();
    let db = TestDatabase::with_max_connections(10).await;
    let store = Arc::new(db.open_store().await);
    let user_id = Uuid::new_v4();

    let handles: Vec<_> = (0..20u32)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .create(create_subscription_with_period(
                        "Netflix",
                        user_id,
                        100 + i,
                        date(2025, 1, 1),
                        None,
                    ))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(StorageError::AlreadyExists) => conflicts += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 19);
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reopen_is_idempotent_and_close_twice() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let first = db.open_store().await;
    let subscription = create_test_subscription("Netflix", 599);
    first.create(subscription.clone()).await.unwrap();

    // スキーマは既に存在するので二度目の open もそのまま成功する
    let second = db.open_store().await;
    assert_eq!(second.list().await.unwrap().len(), 1);

    first.close().await.unwrap();
    assert!(matches!(first.close().await, Err(StorageError::AlreadyClosed)));
    assert!(matches!(
        first.read("Netflix", subscription.user_id).await,
        Err(StorageError::AlreadyClosed)
    ));

    second.close().await.unwrap();
}

#[tokio::test]
async fn test_open_without_create_privilege_is_connection_error() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let admin = db.connect().await;

    admin
        .execute_unprepared("CREATE ROLE app_no_ddl LOGIN PASSWORD 'app_no_ddl'")
        .await
        .unwrap();
    admin
        .execute_unprepared("REVOKE CREATE ON SCHEMA public FROM PUBLIC")
        .await
        .unwrap();

    let settings = db.settings_for_role("app_no_ddl", "app_no_ddl");
    let result = SubscriptionRepository::open(&settings).await;

    assert!(matches!(result, Err(StorageError::Connection(_))));
}

#[tokio::test]
async fn test_failed_rollback_keeps_operation_error() {
    common::init_test_env();
    let db = TestDatabase::new().await;
    let pool = db.connect().await;

    // セッションを切断してからエラーを返すので、ロールバック自体も失敗する
    let result: StorageResult<()> =
        with_transaction!(pool, "test.rollback_failure", |txn| async move {
            let _ = txn
                .execute_unprepared("SELECT pg_terminate_backend(pg_backend_pid())")
                .await;
            Err(StorageError::NotFound)
        });

    assert!(matches!(result, Err(StorageError::NotFound)));
}
