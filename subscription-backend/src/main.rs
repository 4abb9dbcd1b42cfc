// src/main.rs
use std::sync::Arc;
use std::time::Duration;
use subscription_backend::api::{app_router, AppState};
use subscription_backend::config::AppConfig;
use subscription_backend::logging::init_tracing;
use subscription_backend::repository::subscription_repository::SubscriptionRepository;
use subscription_backend::repository::{StorageError, SubscriptionStore};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 設定を読み込む
    let app_config = AppConfig::from_env()?;

    // トレーシングの設定
    init_tracing(app_config.environment);

    info!("Starting Subscription Backend server...");
    info!(config = ?app_config, "Configuration loaded");

    // ストレージ（接続プール + スキーマ）を用意
    let store: Arc<dyn SubscriptionStore> =
        Arc::new(SubscriptionRepository::open(&app_config.database).await?);

    info!("Database pool created successfully.");

    // ルーターの設定
    let app_router = app_router(AppState::new(store.clone()), &app_config.http);

    // サーバーの起動
    let listener = TcpListener::bind(&app_config.server_addr).await?;
    info!(
        "Router configured. Server listening on {}",
        app_config.server_addr
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app_router.into_make_service()).with_graceful_shutdown(
        async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        },
    );

    // シグナル受信後、処理中のリクエストは shutdown_timeout まで待つ
    let drain_deadline = drain_deadline(&mut shutdown_rx, app_config.http.shutdown_timeout);

    tokio::select! {
        result = async { server.await } => {
            if let Err(e) = result {
                error!(error = %e, "Server error");
            }
        }
        _ = drain_deadline => {
            warn!(
                timeout_secs = app_config.http.shutdown_timeout.as_secs(),
                "Graceful shutdown timed out, dropping in-flight requests"
            );
        }
    }

    match store.close().await {
        Ok(()) | Err(StorageError::AlreadyClosed) => {}
        Err(e) => error!(error = %e, "Failed to close storage"),
    }

    info!("Server stopped");
    Ok(())
}

async fn drain_deadline(shutdown_rx: &mut watch::Receiver<bool>, timeout: Duration) {
    if shutdown_rx.wait_for(|requested| *requested).await.is_err() {
        // 送信側が消えた = サーバーが既に終了している
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(timeout).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
