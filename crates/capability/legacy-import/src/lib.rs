//! # SIGMA 遗留数据导入
//!
//! 把 Access 数据库导出的文本文件导入规范化存储：
//!
//! | 导入流 | 文件 | 写入方式 |
//! |---|---|---|
//! | lugares | `Lugares.txt` | 按数字编码 upsert |
//! | intervenciones / intervenciones-ccrr | `Intervenciones.txt` / `IntervencionesCCRR.txt` | 按编码 upsert |
//! | locomotoras / coches | `Locomotoras.txt` / `Coches.txt` | 经系列目录映射，已存在跳过 |
//! | detenciones / detenciones-ccrr | `Detenciones.txt` / `DetencionesCCRR.txt` | 去重后批量写入 |
//!
//! 行级错误记录日志、计数并跳过；只有输入文件缺失会让该导入流失败。
//! dry-run 不写入存储，但给出与真实执行相同的计数。
//!
//! [`seed`] 模块负责初始参考数据与 `personal.csv` / `ums.csv` 的加载。

pub mod catalog;
pub mod dates;
mod events;
mod reference;
pub mod report;
mod rolling_stock;
pub mod seed;
pub mod source;

pub use catalog::RollingStockCatalog;
pub use report::ImportReport;
pub use seed::{InitialDataLoader, SeedReport};

use serde::Serialize;
use sigma_storage::{SigmaStore, StorageError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("path does not exist: {0}")]
    MissingDirectory(PathBuf),
    #[error("file not found: {0}")]
    MissingFile(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// 导入流，`ORDER` 即执行顺序：参考表、车辆、事件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImportStream {
    #[serde(rename = "lugares")]
    Locations,
    #[serde(rename = "intervenciones")]
    Interventions,
    #[serde(rename = "intervenciones-ccrr")]
    RailcarInterventions,
    #[serde(rename = "locomotoras")]
    Locomotives,
    #[serde(rename = "coches")]
    Railcars,
    #[serde(rename = "detenciones")]
    Events,
    #[serde(rename = "detenciones-ccrr")]
    RailcarEvents,
}

impl ImportStream {
    pub const ORDER: [ImportStream; 7] = [
        ImportStream::Locations,
        ImportStream::Interventions,
        ImportStream::RailcarInterventions,
        ImportStream::Locomotives,
        ImportStream::Railcars,
        ImportStream::Events,
        ImportStream::RailcarEvents,
    ];

    /// `--all` 包含的导入流。
    pub const ALL: [ImportStream; 5] = [
        ImportStream::Locations,
        ImportStream::Interventions,
        ImportStream::Locomotives,
        ImportStream::Railcars,
        ImportStream::Events,
    ];

    /// `--all-ccrr` 包含的导入流。
    pub const ALL_CCRR: [ImportStream; 3] = [
        ImportStream::RailcarInterventions,
        ImportStream::Railcars,
        ImportStream::RailcarEvents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStream::Locations => "lugares",
            ImportStream::Interventions => "intervenciones",
            ImportStream::RailcarInterventions => "intervenciones-ccrr",
            ImportStream::Locomotives => "locomotoras",
            ImportStream::Railcars => "coches",
            ImportStream::Events => "detenciones",
            ImportStream::RailcarEvents => "detenciones-ccrr",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImportStream::Locations => "Lugares",
            ImportStream::Interventions => "Intervenciones",
            ImportStream::RailcarInterventions => "Intervenciones CCRR",
            ImportStream::Locomotives => "Locomotoras",
            ImportStream::Railcars => "Coches",
            ImportStream::Events => "Detenciones",
            ImportStream::RailcarEvents => "Detenciones CCRR",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ImportStream::Locations => "Lugares.txt",
            ImportStream::Interventions => "Intervenciones.txt",
            ImportStream::RailcarInterventions => "IntervencionesCCRR.txt",
            ImportStream::Locomotives => "Locomotoras.txt",
            ImportStream::Railcars => "Coches.txt",
            ImportStream::Events => "Detenciones.txt",
            ImportStream::RailcarEvents => "DetencionesCCRR.txt",
        }
    }
}

/// 某个导入流的失败（目前只有输入文件缺失）。
#[derive(Debug, Clone, Serialize)]
pub struct StreamFailure {
    pub stream: ImportStream,
    pub error: String,
}

/// 一次导入运行的汇总。
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub run_id: String,
    pub dry_run: bool,
    pub reports: Vec<ImportReport>,
    pub failures: Vec<StreamFailure>,
}

impl ImportSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn report(&self, stream: ImportStream) -> Option<&ImportReport> {
        self.reports.iter().find(|report| report.stream == stream)
    }
}

/// 一次运行内已处理过的自然键，跨导入流共享。
///
/// dry-run 不写入存储，后续导入流依靠它看到前面导入流“本应写入”的数据。
#[derive(Default)]
struct RunState {
    locations: HashSet<i32>,
    interventions: HashSet<String>,
    units: HashSet<String>,
    event_keys: HashSet<events::EventKey>,
}

/// 遗留数据导入器。
pub struct LegacyImporter {
    store: Arc<dyn SigmaStore>,
    catalog: RollingStockCatalog,
    batch_size: usize,
}

impl LegacyImporter {
    pub fn new(store: Arc<dyn SigmaStore>) -> Self {
        Self {
            store,
            catalog: RollingStockCatalog::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_catalog(mut self, catalog: RollingStockCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// 事件批量写入的批次大小，最小为 1。
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// 导入单个流。文件缺失返回 `ImportError::MissingFile`。
    pub async fn import_stream(
        &self,
        dir: &Path,
        stream: ImportStream,
        dry_run: bool,
    ) -> Result<ImportReport, ImportError> {
        self.import_stream_with(dir, stream, dry_run, &mut RunState::default())
            .await
    }

    async fn import_stream_with(
        &self,
        dir: &Path,
        stream: ImportStream,
        dry_run: bool,
        state: &mut RunState,
    ) -> Result<ImportReport, ImportError> {
        let path = dir.join(stream.file_name());
        let records = source::read_records(&path, source::LEGACY_DELIMITER)?;
        info!(stream = stream.as_str(), path = %path.display(), rows = records.len(), "importing");

        let store = self.store.as_ref();
        let mut report = ImportReport::new(stream, dry_run);
        match stream {
            ImportStream::Locations => {
                reference::import_locations(
                    store,
                    records,
                    &mut state.locations,
                    dry_run,
                    &mut report,
                )
                .await?
            }
            ImportStream::Interventions | ImportStream::RailcarInterventions => {
                reference::import_interventions(
                    store,
                    records,
                    &mut state.interventions,
                    dry_run,
                    &mut report,
                )
                .await?
            }
            ImportStream::Locomotives => {
                rolling_stock::import_locomotives(
                    store,
                    &self.catalog,
                    records,
                    &mut state.units,
                    dry_run,
                    &mut report,
                )
                .await?
            }
            ImportStream::Railcars => {
                rolling_stock::import_railcars(
                    store,
                    &self.catalog,
                    records,
                    &mut state.units,
                    dry_run,
                    &mut report,
                )
                .await?
            }
            ImportStream::Events | ImportStream::RailcarEvents => {
                let unit_column = match stream {
                    ImportStream::RailcarEvents => "Coche",
                    _ => "Locs",
                };
                events::import_events(
                    store,
                    records,
                    unit_column,
                    &mut state.event_keys,
                    self.batch_size,
                    dry_run,
                    &mut report,
                )
                .await?
            }
        }
        info!(stream = stream.as_str(), %report, "stream finished");
        Ok(report)
    }

    /// 按固定顺序执行选中的导入流。
    ///
    /// 目录不存在直接返回错误；单个文件缺失记录为该流的失败并继续后续导入流。
    pub async fn run(
        &self,
        dir: &Path,
        streams: &[ImportStream],
        dry_run: bool,
    ) -> Result<ImportSummary, ImportError> {
        if !dir.is_dir() {
            return Err(ImportError::MissingDirectory(dir.to_path_buf()));
        }
        let run_id = sigma_telemetry::new_run_id();
        let span = info_span!("legacy_import", run_id = %run_id, dry_run);
        async move {
            let mut summary = ImportSummary {
                run_id,
                dry_run,
                reports: Vec::new(),
                failures: Vec::new(),
            };
            let mut state = RunState::default();
            for stream in ImportStream::ORDER {
                if !streams.contains(&stream) {
                    continue;
                }
                match self
                    .import_stream_with(dir, stream, dry_run, &mut state)
                    .await
                {
                    Ok(report) => summary.reports.push(report),
                    Err(err @ ImportError::MissingFile(_)) => {
                        error!(stream = stream.as_str(), %err, "stream failed");
                        summary.failures.push(StreamFailure {
                            stream,
                            error: err.to_string(),
                        });
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(summary)
        }
        .instrument(span)
        .await
    }
}
