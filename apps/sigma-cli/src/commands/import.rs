use super::{CommandResult, Context, print_json};
use crate::cli::ImportArgs;
use sigma_legacy_import::LegacyImporter;
use tracing::warn;

pub async fn run(ctx: &Context, args: ImportArgs) -> CommandResult {
    let streams = args.selected_streams();
    if streams.is_empty() {
        warn!(
            "No import option specified. Use --lugares, --intervenciones, --intervenciones-ccrr, \
             --locomotoras, --coches, --detenciones, --detenciones-ccrr, --all or --all-ccrr"
        );
        return Ok(());
    }

    let dir = args.path.unwrap_or_else(|| ctx.config.legacy_path.clone());
    let batch_size = args.batch_size.unwrap_or(ctx.config.import_batch_size);
    let importer = LegacyImporter::new(ctx.store.clone()).with_batch_size(batch_size);
    let summary = importer.run(&dir, &streams, args.dry_run).await?;

    if ctx.json {
        print_json(&summary)?;
    } else {
        for report in &summary.reports {
            println!("{report}");
        }
        for failure in &summary.failures {
            println!("{}: {}", failure.stream.label(), failure.error);
        }
    }

    // 有导入流失败时以非零状态退出
    if summary.is_success() {
        Ok(())
    } else {
        Err(format!("{} import stream(s) failed", summary.failures.len()).into())
    }
}
