// tests/common/mock_store.rs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use subscription_backend::domain::{PriceRangeQuery, Subscription, SubscriptionChanges};
use subscription_backend::repository::{
    validate_new_record, validate_price, StorageError, StorageResult, SubscriptionStore,
};
use uuid::Uuid;

type Key = (String, Uuid);

/// テスト用のインメモリストア
///
/// 識別子ごとに1件だけ保持し、PostgreSQL 実装と同じセンチネルを返す。
#[derive(Clone, Default)]
pub struct MockSubscriptionStore {
    records: Arc<Mutex<HashMap<Key, Subscription>>>,
    closed: Arc<AtomicBool>,
}

impl MockSubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = Subscription>) -> Self {
        let store = Self::new();
        {
            let mut map = store.records.lock().unwrap();
            for record in records {
                map.insert(key(&record.service_name, record.user_id), record);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::AlreadyClosed);
        }
        Ok(())
    }
}

fn key(service_name: &str, user_id: Uuid) -> Key {
    (service_name.to_string(), user_id)
}

#[async_trait]
impl SubscriptionStore for MockSubscriptionStore {
    async fn create(&self, subscription: Subscription) -> StorageResult<Uuid> {
        validate_new_record(&subscription.service_name, subscription.price)?;
        self.ensure_open()?;

        let mut records = self.records.lock().unwrap();
        let key = key(&subscription.service_name, subscription.user_id);
        if records.contains_key(&key) {
            return Err(StorageError::AlreadyExists);
        }

        let user_id = subscription.user_id;
        records.insert(key, subscription);
        Ok(user_id)
    }

    async fn read(&self, service_name: &str, user_id: Uuid) -> StorageResult<Subscription> {
        self.ensure_open()?;
        self.records
            .lock()
            .unwrap()
            .get(&key(service_name, user_id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn update(
        &self,
        service_name: &str,
        user_id: Uuid,
        changes: SubscriptionChanges,
    ) -> StorageResult<()> {
        validate_price(changes.price)?;
        self.ensure_open()?;

        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&key(service_name, user_id))
            .ok_or(StorageError::NotFound)?;
        record.apply(&changes);
        Ok(())
    }

    async fn delete(&self, service_name: &str, user_id: Uuid) -> StorageResult<()> {
        self.ensure_open()?;
        self.records
            .lock()
            .unwrap()
            .remove(&key(service_name, user_id))
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn list(&self) -> StorageResult<Vec<Subscription>> {
        self.ensure_open()?;
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }

    async fn range_price(&self, query: PriceRangeQuery) -> StorageResult<u64> {
        if !query.is_valid_range() {
            return Err(StorageError::Validation(
                "start must not be after end".to_string(),
            ));
        }
        self.ensure_open()?;

        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|subscription| query.matches(subscription))
            .map(|subscription| u64::from(subscription.price))
            .sum())
    }

    async fn close(&self) -> StorageResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(StorageError::AlreadyClosed);
        }
        Ok(())
    }
}
