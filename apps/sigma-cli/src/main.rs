//! SIGMA 命令行入口：遗留数据导入、初始数据加载、车辆登记与工单操作。

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};
use commands::Context;
use sigma_config::AppConfig;
use sigma_storage::{PgStore, SigmaStore, apply_schema, connect_pool_with};
use sigma_telemetry::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let pool = connect_pool_with(&config.database_url, config.db_max_connections).await?;
    if config.apply_schema {
        apply_schema(&pool).await?;
        info!("schema applied");
    }
    let store: Arc<dyn SigmaStore> = Arc::new(PgStore::new(pool));
    let ctx = Context::new(store, config, cli.json);

    match cli.command {
        Command::Import(args) => commands::import::run(&ctx, args).await,
        Command::Seed(args) => commands::seed::run(&ctx, args).await,
        Command::Unit(command) => commands::units::run(&ctx, command).await,
        Command::Ticket(command) => commands::tickets::run(&ctx, command).await,
    }
}
