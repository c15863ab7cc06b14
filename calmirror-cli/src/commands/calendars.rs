use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::AppConfig;

pub async fn run(config: &AppConfig) -> Result<()> {
    let directory = super::connect(config).await?;
    let sources = config.mirror.source_calendars();

    for name in directory.calendar_names() {
        if name == config.mirror.dest_calendar {
            println!("{}  {}", name, "(destination)".dimmed());
        } else if sources.iter().any(|s| s == name) {
            println!("{}  {}", name, "(source)".dimmed());
        } else {
            println!("{}", name);
        }
    }

    Ok(())
}
