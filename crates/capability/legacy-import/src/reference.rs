//! 参考表导入：地点（Lugares）与干预类型（Intervenciones / IntervencionesCCRR）
//!
//! 按自然键 upsert。dry-run 不写入，只查询存储判断新建还是更新；
//! 本次运行中已处理过的键记录在 `seen` 中，dry-run 时按“更新”计数，与真实执行一致。

use crate::ImportError;
use crate::report::ImportReport;
use crate::source::{LegacyRecord, LegacyRow, RowError};
use domain::{InterventionClass, InterventionType, Location};
use sigma_storage::{SigmaStore, UpsertOutcome};
use std::collections::HashSet;
use tracing::debug;

pub(crate) fn parse_location(row: &LegacyRow) -> Result<Location, RowError> {
    let code = row.required_i32("Lugar_codigo")?;
    let description = row.field("Lugar_descripcion")?;
    let mut location = Location::new(code, description);
    location.short_code = row
        .optional("Lugar_shortdesc")
        .filter(|short| *short != "-")
        .map(str::to_string);
    // 识别集合之外的类型 / 检修类别按空值保存
    location.kind = row.optional("Lugar_tipo").and_then(|kind| kind.parse().ok());
    location.revision = row
        .optional("Lugar_revision")
        .and_then(|revision| revision.parse().ok());
    Ok(location)
}

pub(crate) fn parse_intervention(row: &LegacyRow) -> Result<InterventionType, RowError> {
    let code = row.required("Intervencion_tipo")?;
    let description = row.field("Intervencion_descripcion")?;
    let class = InterventionClass::from_legacy(row.get("Intervencion_clase"));
    Ok(InterventionType::new(code, description, class))
}

pub(crate) async fn import_locations(
    store: &dyn SigmaStore,
    records: Vec<LegacyRecord>,
    seen: &mut HashSet<i32>,
    dry_run: bool,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    for record in records {
        report.row_read();
        let location = match record.result.and_then(|row| parse_location(&row)) {
            Ok(location) => location,
            Err(err) => {
                report.skip(record.line, &err);
                continue;
            }
        };

        let outcome = if dry_run {
            let exists = seen.contains(&location.code)
                || store.find_location_by_code(location.code).await?.is_some();
            seen.insert(location.code);
            if exists {
                UpsertOutcome::Updated
            } else {
                UpsertOutcome::Created
            }
        } else {
            store.upsert_location(location.clone()).await?.1
        };
        debug!(code = location.code, ?outcome, "location");
        match outcome {
            UpsertOutcome::Created => report.created(),
            UpsertOutcome::Updated => report.updated(),
        }
    }
    Ok(())
}

/// 两个干预类型文件写入同一张表。
pub(crate) async fn import_interventions(
    store: &dyn SigmaStore,
    records: Vec<LegacyRecord>,
    seen: &mut HashSet<String>,
    dry_run: bool,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    for record in records {
        report.row_read();
        let intervention = match record.result.and_then(|row| parse_intervention(&row)) {
            Ok(intervention) => intervention,
            Err(err) => {
                report.skip(record.line, &err);
                continue;
            }
        };

        let outcome = if dry_run {
            let exists = seen.contains(&intervention.code)
                || store
                    .find_intervention_type_by_code(&intervention.code)
                    .await?
                    .is_some();
            seen.insert(intervention.code.clone());
            if exists {
                UpsertOutcome::Updated
            } else {
                UpsertOutcome::Created
            }
        } else {
            store.upsert_intervention_type(intervention.clone()).await?.1
        };
        debug!(code = %intervention.code, ?outcome, "intervention type");
        match outcome {
            UpsertOutcome::Created => report.created(),
            UpsertOutcome::Updated => report.updated(),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{LEGACY_DELIMITER, parse_records};
    use domain::{LocationKind, LocationRevision};

    fn row(text: &str) -> LegacyRow {
        parse_records(text, LEGACY_DELIMITER)
            .expect("parse")
            .remove(0)
            .result
            .expect("row")
    }

    #[test]
    fn location_enums_outside_the_set_become_none() {
        let location = parse_location(&row(
            "Lugar_codigo,Lugar_descripcion,Lugar_shortdesc,Lugar_tipo,Lugar_revision\n\
             7,Remedios de Escalada,-,Galpón,Pintura\n",
        ))
        .expect("location");
        assert_eq!(location.code, 7);
        assert_eq!(location.short_code, None);
        assert_eq!(location.kind, None);
        assert_eq!(location.revision, None);

        let location = parse_location(&row(
            "Lugar_codigo,Lugar_descripcion,Lugar_shortdesc,Lugar_tipo,Lugar_revision\n\
             8,Temperley,TY,Taller,Reparacion\n",
        ))
        .expect("location");
        assert_eq!(location.short_code.as_deref(), Some("TY"));
        assert_eq!(location.kind, Some(LocationKind::Workshop));
        assert_eq!(location.revision, Some(LocationRevision::Repair));
    }

    #[test]
    fn intervention_class_falls_back_to_unclassified() {
        let intervention = parse_intervention(&row(
            "Intervencion_tipo,Intervencion_descripcion,Intervencion_clase\nRG,Reparación general,XYZ\n",
        ))
        .expect("intervention");
        assert_eq!(intervention.class, InterventionClass::Unclassified);

        let err = parse_intervention(&row(
            "Intervencion_tipo,Intervencion_descripcion,Intervencion_clase\n,Sin código,REV\n",
        ))
        .expect_err("empty code");
        assert!(matches!(err, RowError::MissingField(_)));
    }
}
