// src/db.rs
use crate::config::DatabaseSettings;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

pub type DbPool = DatabaseConnection;

/// 上限付きの接続プールを作成する
///
/// 上限に達した呼び出しは `acquire_timeout` まで空きを待つ。
pub async fn create_db_pool(settings: &DatabaseSettings) -> Result<DbPool, DbErr> {
    let mut opt = ConnectOptions::new(settings.url.clone());

    // 接続オプションを設定
    opt.max_connections(settings.max_connections)
        .connect_timeout(settings.connect_timeout)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .max_lifetime(settings.max_lifetime)
        .sqlx_logging(settings.sqlx_logging);

    info!(
        url = %settings.redacted_url(),
        max_connections = settings.max_connections,
        "Connecting to database"
    );

    Database::connect(opt).await
}

/// subscriptions テーブルとインデックスを用意する（既にあれば何もしない）
pub async fn run_migrations(conn: &DbPool) -> Result<(), DbErr> {
    Migrator::up(conn, None).await?;
    info!("Database schema is up to date");
    Ok(())
}
