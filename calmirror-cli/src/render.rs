//! Terminal output helpers.

use std::time::Duration;

use indicatif::ProgressBar;
use owo_colors::OwoColorize;

use calmirror_core::event::Event;
use calmirror_core::merge::RunReport;

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Display title for an event, covering stripped-empty summaries.
pub fn event_title(event: &Event) -> &str {
    if event.summary.is_empty() {
        "(no title)"
    } else {
        &event.summary
    }
}

pub fn print_warnings(report: &RunReport) {
    for warning in &report.warnings {
        println!("   {}", warning.yellow());
    }
}
