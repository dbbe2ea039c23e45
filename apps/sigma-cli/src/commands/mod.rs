//! 子命令实现。

pub mod import;
pub mod seed;
pub mod tickets;
pub mod units;

use serde::Serialize;
use sigma_config::AppConfig;
use sigma_storage::SigmaStore;
use std::sync::Arc;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// 子命令共享的运行上下文。
pub struct Context {
    pub store: Arc<dyn SigmaStore>,
    pub config: AppConfig,
    pub json: bool,
}

impl Context {
    pub fn new(store: Arc<dyn SigmaStore>, config: AppConfig, json: bool) -> Self {
        Self {
            store,
            config,
            json,
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
