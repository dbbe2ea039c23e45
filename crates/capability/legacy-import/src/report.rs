//! 导入统计

use crate::ImportStream;
use serde::Serialize;
use sigma_telemetry as telemetry;
use std::fmt;
use tracing::warn;

/// 单个导入流的统计结果。
///
/// 每次计数同时累加到进程级导入指标。
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub stream: ImportStream,
    pub dry_run: bool,
    pub rows: u64,
    pub created: u64,
    pub updated: u64,
    /// 行级数据错误。
    pub skipped: u64,
    pub already_exists: u64,
    /// 已知但不导入（货车、空系列、动车组）。
    pub excluded: u64,
    /// 系列未出现在映射目录中。
    pub unmapped: u64,
    pub duplicates: u64,
    pub batches: u64,
}

impl ImportReport {
    pub fn new(stream: ImportStream, dry_run: bool) -> Self {
        Self {
            stream,
            dry_run,
            rows: 0,
            created: 0,
            updated: 0,
            skipped: 0,
            already_exists: 0,
            excluded: 0,
            unmapped: 0,
            duplicates: 0,
            batches: 0,
        }
    }

    pub(crate) fn row_read(&mut self) {
        self.rows += 1;
        telemetry::record_row_read();
    }

    pub(crate) fn created(&mut self) {
        self.created += 1;
        telemetry::record_row_created();
    }

    pub(crate) fn updated(&mut self) {
        self.updated += 1;
        telemetry::record_row_updated();
    }

    pub(crate) fn skip(&mut self, line: u64, reason: &dyn fmt::Display) {
        warn!(stream = self.stream.as_str(), line, %reason, "skipping row");
        self.skipped += 1;
        telemetry::record_row_skipped();
    }

    pub(crate) fn already_exists(&mut self) {
        self.already_exists += 1;
        telemetry::record_row_skipped();
    }

    pub(crate) fn excluded(&mut self) {
        self.excluded += 1;
        telemetry::record_row_skipped();
    }

    pub(crate) fn unmapped(&mut self, line: u64, serie: &str, unit: &str) {
        warn!(stream = self.stream.as_str(), line, serie, unit, "unknown serie");
        self.unmapped += 1;
        telemetry::record_row_unmapped();
    }

    pub(crate) fn duplicate(&mut self) {
        self.duplicates += 1;
        telemetry::record_row_duplicate();
    }

    pub(crate) fn batch_flushed(&mut self) {
        self.batches += 1;
        telemetry::record_batch_flushed();
    }

    /// 行级错误与未映射系列合计。
    pub fn errors(&self) -> u64 {
        self.skipped + self.unmapped
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.stream.label();
        match self.stream {
            ImportStream::Locations
            | ImportStream::Interventions
            | ImportStream::RailcarInterventions => write!(
                f,
                "{label}: {} created, {} updated, {} skipped",
                self.created, self.updated, self.skipped
            )?,
            ImportStream::Locomotives => write!(
                f,
                "{label}: {} created, {} already exist, {} motorcoaches excluded, {} errors",
                self.created,
                self.already_exists,
                self.excluded,
                self.errors()
            )?,
            ImportStream::Railcars => write!(
                f,
                "{label}: {} created, {} already exist, {} cargo wagons skipped, {} errors",
                self.created,
                self.already_exists,
                self.excluded,
                self.errors()
            )?,
            ImportStream::Events | ImportStream::RailcarEvents => write!(
                f,
                "{label}: {} created, {} skipped, {} duplicates",
                self.created, self.skipped, self.duplicates
            )?,
        }
        if self.dry_run {
            f.write_str(" (dry run)")?;
        }
        Ok(())
    }
}
