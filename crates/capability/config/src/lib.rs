//! 应用运行配置加载。

use std::env;
use std::path::PathBuf;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    /// 遗留导出文件目录（Lugares.txt、Detenciones.txt 等）。
    pub legacy_path: PathBuf,
    /// 初始数据目录（ums.csv、personal.csv）。
    pub initial_data_path: PathBuf,
    pub import_batch_size: usize,
    /// 启动时执行建表脚本。
    pub apply_schema: bool,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("SIGMA_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("SIGMA_DATABASE_URL".to_string()))?;
        let db_max_connections = read_u32_with_default("SIGMA_DB_MAX_CONNECTIONS", 8)?;
        let legacy_path = read_path_with_default("SIGMA_LEGACY_PATH", "context/db-legacy");
        let initial_data_path = read_path_with_default("SIGMA_INITIAL_DATA_PATH", "context");
        let import_batch_size = read_usize_with_default("SIGMA_IMPORT_BATCH_SIZE", 1000)?;
        if import_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "SIGMA_IMPORT_BATCH_SIZE".to_string(),
                "0".to_string(),
            ));
        }
        let apply_schema = read_bool_with_default("SIGMA_APPLY_SCHEMA", false);

        Ok(Self {
            database_url,
            db_max_connections,
            legacy_path,
            initial_data_path,
            import_batch_size,
            apply_schema,
        })
    }
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_path_with_default(key: &str, default: &str) -> PathBuf {
    match env::var(key) {
        Ok(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(default),
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
