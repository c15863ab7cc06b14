use anyhow::Result;
use owo_colors::OwoColorize;

use calmirror_core::merge::Mirror;

use crate::config::AppConfig;
use crate::render;

pub async fn run(config: &AppConfig) -> Result<()> {
    let directory = super::connect(config).await?;
    let mirror = Mirror::new(config.mirror.clone());

    let spinner = render::create_spinner(format!(
        "Mirroring into '{}'",
        config.mirror.dest_calendar
    ));
    let report = mirror.run(&directory).await?;
    spinner.finish_and_clear();

    render::print_warnings(&report);

    if report.has_changes() {
        println!(
            "Mirrored {} events from {} calendars into '{}': {} inserted, {} deleted, {} already present",
            report.fetched,
            report.sources,
            config.mirror.dest_calendar,
            report.inserted.green(),
            report.deleted.red(),
            report.skipped,
        );
    } else {
        println!(
            "'{}' is up to date ({} records checked).",
            config.mirror.dest_calendar, report.skipped
        );
    }

    if report.suppressed > 0 {
        println!(
            "   {} declined or cancelled events suppressed",
            report.suppressed
        );
    }
    if report.has_failures() {
        if report.parse_failures > 0 {
            println!(
                "   {}",
                format!("{} documents skipped (unparsable)", report.parse_failures).yellow()
            );
        }
        let failed_mutations = report.delete_failures + report.insert_failures;
        if failed_mutations > 0 {
            println!(
                "   {}",
                format!("{} mutations failed; the next pass will retry them", failed_mutations)
                    .red()
            );
        }
    }

    Ok(())
}
