// migration/src/main.rs
use migration::Migrator;
use sea_orm_migration::prelude::*;

// sea-orm-migration の CLI（up / down / status / fresh）を async-std ランタイムで実行
#[async_std::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
