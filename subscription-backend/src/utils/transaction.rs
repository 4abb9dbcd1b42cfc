// subscription-backend/src/utils/transaction.rs

//! トランザクション管理の統一化
//!
//! ストレージの各操作は必ずここを通り、1操作 = 1トランザクションになる。
//! 成功時は commit、失敗時は rollback してから元のエラーを返す。

use crate::repository::{StorageError, StorageResult};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, error, instrument, warn};

// Future型エイリアス（Boxed Future）
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// =============================================================================
// トランザクション管理トレイト
// =============================================================================

/// トランザクション実行を抽象化するトレイト
pub trait TransactionManager {
    /// トランザクション内で操作を実行
    #[allow(clippy::manual_async_fn)]
    fn execute_in_transaction<F, R>(
        &self,
        op: &'static str,
        operation: F,
    ) -> impl Future<Output = StorageResult<R>> + Send
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, StorageResult<R>> + Send,
        R: Send;
}

// DatabaseConnection への実装
impl TransactionManager for DatabaseConnection {
    #[instrument(skip(self, operation), name = "database_transaction")]
    #[allow(clippy::manual_async_fn)]
    fn execute_in_transaction<F, R>(
        &self,
        op: &'static str,
        operation: F,
    ) -> impl Future<Output = StorageResult<R>> + Send
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, StorageResult<R>> + Send,
        R: Send,
    {
        async move {
            let transaction_start = std::time::Instant::now();

            let txn = self
                .begin()
                .await
                .map_err(|e| StorageError::internal(op, e))?;

            let result = operation(&txn).await;

            match result {
                Ok(value) => {
                    txn.commit()
                        .await
                        .map_err(|e| StorageError::internal(op, e))?;

                    debug!(
                        op,
                        duration_ms = transaction_start.elapsed().as_millis() as u64,
                        "Transaction committed"
                    );

                    Ok(value)
                }
                Err(storage_error) => {
                    rollback_after_error(txn, op, &storage_error).await;
                    Err(storage_error)
                }
            }
        }
    }
}

/// ベストエフォートのロールバック
///
/// ロールバック自体の失敗はログに残すだけで、呼び出し元には元のエラーを返す。
async fn rollback_after_error(txn: DatabaseTransaction, op: &'static str, original: &StorageError) {
    match txn.rollback().await {
        Ok(()) if original.is_sentinel() => {
            debug!(op, reason = %original, "Transaction rolled back");
        }
        Ok(()) => {
            warn!(op, error = %original, "Transaction operation failed, rolled back");
        }
        Err(rollback_error) => {
            error!(
                op,
                original_error = %original,
                rollback_error = %rollback_error,
                "Failed to rollback transaction"
            );
        }
    }
}

// =============================================================================
// 便利なマクロ
// =============================================================================

/// トランザクション内での操作を簡単に記述するマクロ
#[macro_export]
macro_rules! with_transaction {
    ($db:expr, $op:expr, |$txn:ident| $body:expr) => {{
        use $crate::utils::transaction::TransactionManager;

        $db.execute_in_transaction($op, move |$txn| Box::pin($body))
            .await
    }};
}

// =============================================================================
// テスト
// =============================================================================
