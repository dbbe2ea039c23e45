//! 历史事件导入：Detenciones / DetencionesCCRR
//!
//! - 地点、单元、干预类型的查找表每次导入只构建一次
//! - 无法匹配的引用保留原始遗留编码，从不创建新的参考数据
//! - 以 (单元, 起始日期, 干预类型, 地点) 为去重键，覆盖已导入的遗留事件与本次先前的行
//! - 按批次写入，文件结束时写入剩余部分

use crate::ImportError;
use crate::dates::parse_legacy_date;
use crate::report::ImportReport;
use crate::source::{LegacyRecord, LegacyRow, RowError};
use chrono::NaiveDate;
use domain::{LegacyRef, MaintenanceEvent};
use sigma_storage::{SigmaStore, UnitFilter};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

/// 去重键，引用统一以原始编码表示。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EventKey {
    unit: Option<String>,
    date_from: NaiveDate,
    intervention: Option<String>,
    location: Option<i32>,
}

/// 编码 <-> id 双向查找表。
struct Lookup<K> {
    by_code: HashMap<K, Uuid>,
    by_id: HashMap<Uuid, K>,
}

impl<K> Lookup<K>
where
    K: Clone + Eq + std::hash::Hash,
{
    fn new(entries: impl IntoIterator<Item = (K, Uuid)>) -> Self {
        let mut by_code = HashMap::new();
        let mut by_id = HashMap::new();
        for (code, id) in entries {
            by_id.insert(id, code.clone());
            by_code.insert(code, id);
        }
        Self { by_code, by_id }
    }

    fn resolve(&self, code: K) -> LegacyRef<K> {
        match self.by_code.get(&code) {
            Some(id) => LegacyRef::Resolved(*id),
            None => LegacyRef::Legacy(code),
        }
    }

    fn code_of(&self, reference: &LegacyRef<K>) -> Option<K> {
        match reference {
            LegacyRef::Resolved(id) => self.by_id.get(id).cloned(),
            LegacyRef::Legacy(code) => Some(code.clone()),
            LegacyRef::Absent => None,
        }
    }
}

struct Lookups {
    units: Lookup<String>,
    interventions: Lookup<String>,
    locations: Lookup<i32>,
}

impl Lookups {
    async fn load(store: &dyn SigmaStore) -> Result<Self, ImportError> {
        let units = store.list_units(UnitFilter::default()).await?;
        let interventions = store.list_intervention_types().await?;
        let locations = store.list_locations().await?;
        let lookups = Self {
            units: Lookup::new(units.into_iter().map(|unit| (unit.number, unit.id))),
            interventions: Lookup::new(
                interventions
                    .into_iter()
                    .map(|intervention| (intervention.code, intervention.id)),
            ),
            locations: Lookup::new(
                locations
                    .into_iter()
                    .map(|location| (location.code, location.id)),
            ),
        };
        info!(
            units = lookups.units.by_code.len(),
            interventions = lookups.interventions.by_code.len(),
            locations = lookups.locations.by_code.len(),
            "event lookups loaded"
        );
        Ok(lookups)
    }

    fn key_of(&self, event: &MaintenanceEvent) -> EventKey {
        EventKey {
            unit: self.units.code_of(&event.unit),
            date_from: event.date_from,
            intervention: self.interventions.code_of(&event.intervention),
            location: self.locations.code_of(&event.location),
        }
    }

    fn resolve_text(lookup: &Lookup<String>, code: &str) -> LegacyRef<String> {
        if code.is_empty() {
            LegacyRef::Absent
        } else {
            lookup.resolve(code.to_string())
        }
    }

    fn build_event(
        &self,
        row: &LegacyRow,
        unit_column: &str,
    ) -> Result<MaintenanceEvent, RowError> {
        let unit_code = row.field(unit_column)?;
        let date_text = row.field("Fecha_desde")?;
        let intervention_code = row.field("Intervencion")?;
        let date_from = parse_legacy_date(date_text).ok_or_else(|| RowError::BadDate {
            field: "Fecha_desde".to_string(),
            value: date_text.to_string(),
        })?;

        let mut event =
            MaintenanceEvent::new(Self::resolve_text(&self.units, unit_code), date_from);
        event.date_to = row.optional("Fecha_hasta").and_then(parse_legacy_date);
        event.estimated_date = row.optional("Fecha_est").and_then(parse_legacy_date);
        event.intervention = Self::resolve_text(&self.interventions, intervention_code);
        // 非数字的地点编码忽略
        event.location = match row.get("Lugar").parse::<i32>() {
            Ok(code) => self.locations.resolve(code),
            Err(_) => LegacyRef::Absent,
        };
        event.observations = row.optional("Observaciones").map(str::to_string);
        event.is_legacy = true;
        Ok(event)
    }
}

async fn flush(
    store: &dyn SigmaStore,
    batch: &mut Vec<MaintenanceEvent>,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    if batch.is_empty() {
        return Ok(());
    }
    let written = store.insert_events(std::mem::take(batch)).await?;
    report.batch_flushed();
    debug!(written, created = report.created, "event batch inserted");
    Ok(())
}

pub(crate) async fn import_events(
    store: &dyn SigmaStore,
    records: Vec<LegacyRecord>,
    unit_column: &str,
    keys: &mut HashSet<EventKey>,
    batch_size: usize,
    dry_run: bool,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    let lookups = Lookups::load(store).await?;
    let existing = store.list_legacy_events().await?;
    info!(existing = existing.len(), "existing legacy events loaded");
    keys.extend(existing.iter().map(|event| lookups.key_of(event)));

    let batch_size = batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    for record in records {
        report.row_read();
        let event = match record
            .result
            .and_then(|row| lookups.build_event(&row, unit_column))
        {
            Ok(event) => event,
            Err(err) => {
                report.skip(record.line, &err);
                continue;
            }
        };
        if !keys.insert(lookups.key_of(&event)) {
            report.duplicate();
            continue;
        }

        report.created();
        if dry_run {
            continue;
        }
        batch.push(event);
        if batch.len() >= batch_size {
            flush(store, &mut batch, report).await?;
        }
    }
    if !dry_run {
        flush(store, &mut batch, report).await?;
    }
    Ok(())
}
