//! Empty the destination calendar.

use anyhow::Result;
use owo_colors::OwoColorize;

use calmirror_core::store::{Collection, Directory};
use calmirror_core::window::SyncWindow;

use crate::config::AppConfig;
use crate::render;

pub async fn run(config: &AppConfig, yes: bool) -> Result<()> {
    let name = &config.mirror.dest_calendar;
    let directory = super::connect(config).await?;

    let dest = directory
        .find(name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Destination calendar '{}' not found", name))?;

    let docs = dest.list(&SyncWindow::unbounded()).await?;
    if docs.is_empty() {
        println!("'{}' is already empty.", name);
        return Ok(());
    }

    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete all {} events in '{}'?", docs.len(), name))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let spinner = render::create_spinner(format!("Clearing '{}'", name));
    let mut deleted = 0usize;
    let mut failed = 0usize;
    for doc in &docs {
        match dest.delete(&doc.doc_ref).await {
            Ok(()) => deleted += 1,
            Err(e) => {
                failed += 1;
                spinner.suspend(|| println!("   {}", e.to_string().red()));
            }
        }
    }
    spinner.finish_and_clear();

    println!("Deleted {} events from '{}'", deleted.red(), name);
    if failed > 0 {
        println!("   {}", format!("{} deletions failed", failed).red());
    }

    Ok(())
}
