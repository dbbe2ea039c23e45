use super::{CommandResult, Context, print_json};
use crate::cli::SeedArgs;
use sigma_legacy_import::InitialDataLoader;
use tracing::info;

pub async fn run(ctx: &Context, args: SeedArgs) -> CommandResult {
    let dir = args
        .path
        .unwrap_or_else(|| ctx.config.initial_data_path.clone());
    info!(dir = %dir.display(), "loading initial data");
    let report = InitialDataLoader::new(ctx.store.clone()).load(&dir).await?;
    if ctx.json {
        print_json(&report)
    } else {
        println!("{report}");
        Ok(())
    }
}
