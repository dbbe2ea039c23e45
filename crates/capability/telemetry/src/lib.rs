//! 追踪初始化、导入运行 ID 与导入计数。

use serde::Serialize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 导入计数快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportMetricsSnapshot {
    pub rows_read: u64,
    pub rows_created: u64,
    pub rows_updated: u64,
    pub rows_skipped: u64,
    pub rows_duplicate: u64,
    pub rows_unmapped: u64,
    pub batches_flushed: u64,
}

/// 进程级导入计数，跨导入流累加。
pub struct ImportMetrics {
    rows_read: AtomicU64,
    rows_created: AtomicU64,
    rows_updated: AtomicU64,
    rows_skipped: AtomicU64,
    rows_duplicate: AtomicU64,
    rows_unmapped: AtomicU64,
    batches_flushed: AtomicU64,
}

impl ImportMetrics {
    pub fn new() -> Self {
        Self {
            rows_read: AtomicU64::new(0),
            rows_created: AtomicU64::new(0),
            rows_updated: AtomicU64::new(0),
            rows_skipped: AtomicU64::new(0),
            rows_duplicate: AtomicU64::new(0),
            rows_unmapped: AtomicU64::new(0),
            batches_flushed: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> ImportMetricsSnapshot {
        ImportMetricsSnapshot {
            rows_read: self.rows_read.load(Ordering::Relaxed),
            rows_created: self.rows_created.load(Ordering::Relaxed),
            rows_updated: self.rows_updated.load(Ordering::Relaxed),
            rows_skipped: self.rows_skipped.load(Ordering::Relaxed),
            rows_duplicate: self.rows_duplicate.load(Ordering::Relaxed),
            rows_unmapped: self.rows_unmapped.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
        }
    }
}

impl Default for ImportMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<ImportMetrics> = OnceLock::new();

/// 获取全局导入计数实例。
pub fn metrics() -> &'static ImportMetrics {
    METRICS.get_or_init(ImportMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的导入运行 ID，作为 `import` span 字段。
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 记录读取的数据行数。
pub fn record_row_read() {
    metrics().rows_read.fetch_add(1, Ordering::Relaxed);
}

/// 记录新建行数。
pub fn record_row_created() {
    metrics().rows_created.fetch_add(1, Ordering::Relaxed);
}

/// 记录更新行数。
pub fn record_row_updated() {
    metrics().rows_updated.fetch_add(1, Ordering::Relaxed);
}

/// 记录跳过行数（格式错误、已存在、排除）。
pub fn record_row_skipped() {
    metrics().rows_skipped.fetch_add(1, Ordering::Relaxed);
}

/// 记录去重丢弃行数。
pub fn record_row_duplicate() {
    metrics().rows_duplicate.fetch_add(1, Ordering::Relaxed);
}

/// 记录未映射系列行数。
pub fn record_row_unmapped() {
    metrics().rows_unmapped.fetch_add(1, Ordering::Relaxed);
}

/// 记录批量写入次数。
pub fn record_batch_flushed() {
    metrics().batches_flushed.fetch_add(1, Ordering::Relaxed);
}
