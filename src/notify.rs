use std::time::Duration;

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::utils::format_gib;
use crate::RunStatistics;

#[derive(Debug, Serialize)]
struct AlertPayload<'a> {
    content: &'a str,
}

/// One-paragraph summary of a run, sizes in GiB
pub fn alert_message(stats: &RunStatistics) -> String {
    format!(
        "media-dedup: {} files already linked ({} saved); {} files to link ({} projected); {} total",
        stats.files_already_linked,
        format_gib(stats.already_saved_bytes),
        stats.files_to_link,
        format_gib(stats.projected_savings_bytes),
        format_gib(stats.total_saved_bytes()),
    )
}

/// POST the run summary to `url`. Not retried; any failure is returned.
pub fn send_alert(url: &str, stats: &RunStatistics) -> Result<()> {
    let message = alert_message(stats);
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    client
        .post(url)
        .json(&AlertPayload { content: &message })
        .send()?
        .error_for_status()?;

    info!("alert delivered to {}", url);
    Ok(())
}
