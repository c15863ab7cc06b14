pub mod calendars;
pub mod clear;
pub mod status;
pub mod sync;

use anyhow::Result;
use calmirror_caldav::CalDavDirectory;

use crate::config::AppConfig;
use crate::render;

/// Connect to the configured server and discover its calendars.
pub async fn connect(config: &AppConfig) -> Result<CalDavDirectory> {
    let spinner = render::create_spinner(format!("Connecting to {}", config.server.url));
    let result = CalDavDirectory::connect(
        &config.server.url,
        &config.server.username,
        &config.server.password,
    )
    .await;
    spinner.finish_and_clear();

    Ok(result?)
}
