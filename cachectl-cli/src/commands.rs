use crate::cli::{Command, FlushTarget};
use crate::output::CommandOutput;
use cachectl::BatchOperationEngine;
use shared::Result;

/// Run one parsed command against the engine.
///
/// Only fatal conditions surface as `Err`; per-type failures are carried in
/// the returned output.
pub async fn execute(engine: &BatchOperationEngine, command: &Command) -> Result<CommandOutput> {
    let output = match command {
        Command::List => CommandOutput::Listing {
            rows: engine.list().await?,
        },
        Command::Enable { selector } => {
            let ids = engine.resolve(selector.as_deref());
            CommandOutput::Batch(engine.enable(&ids).await?)
        }
        Command::Disable { selector } => {
            let ids = engine.resolve(selector.as_deref());
            CommandOutput::Batch(engine.disable(&ids).await?)
        }
        Command::Refresh { selector } => {
            let ids = engine.resolve(selector.as_deref());
            CommandOutput::Batch(engine.refresh(&ids).await)
        }
        Command::Invalidate { selector } => {
            let ids = engine.resolve(selector.as_deref());
            CommandOutput::Batch(engine.invalidate(&ids).await)
        }
        Command::Flush { target } => match target.parse::<FlushTarget>()? {
            FlushTarget::Magento => CommandOutput::Batch(engine.clean_tagged_cache().await),
            FlushTarget::Storage => CommandOutput::Batch(engine.flush_storage().await),
        },
        Command::CleanMedia => CommandOutput::Batch(engine.clean_media_cache().await),
        Command::CleanImages => CommandOutput::Batch(engine.clean_images_cache().await),
        Command::Purge => CommandOutput::Purge(engine.purge_all().await),
    };
    Ok(output)
}
