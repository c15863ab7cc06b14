use anyhow::Result;
use owo_colors::OwoColorize;

use calmirror_core::merge::Mirror;

use crate::config::AppConfig;
use crate::render;

pub async fn run(config: &AppConfig) -> Result<()> {
    let directory = super::connect(config).await?;
    let mirror = Mirror::new(config.mirror.clone());

    let spinner = render::create_spinner("Computing changes".to_string());
    let plan = mirror.preview(&directory).await?;
    spinner.finish_and_clear();

    render::print_warnings(&plan.report);

    if plan.deletions.is_empty() && plan.insertions.is_empty() {
        println!("'{}' is up to date.", config.mirror.dest_calendar);
        return Ok(());
    }

    for deletion in &plan.deletions {
        println!(
            "   {} {} ({})",
            "-".red(),
            render::event_title(&deletion.entry.event),
            deletion.reason
        );
    }
    for event in &plan.insertions {
        println!(
            "   {} {}  {}",
            "+".green(),
            event.start.to_ics_string(),
            render::event_title(event)
        );
    }

    println!(
        "\n{} to insert, {} to delete, {} already present",
        plan.insertions.len().green(),
        plan.deletions.len().red(),
        plan.report.skipped,
    );

    Ok(())
}
