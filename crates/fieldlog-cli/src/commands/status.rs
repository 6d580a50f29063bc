use std::path::Path;

use fieldlog_core::util::unix_timestamp_now;

use crate::commands::common::{format_status_lines, load_store, status_summary};
use crate::error::CliError;

pub fn run_status(as_json: bool, state_path: &Path) -> Result<(), CliError> {
    let store = load_store(state_path)?;
    let summary = status_summary(&store);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for line in format_status_lines(&summary, unix_timestamp_now()) {
            println!("{line}");
        }
    }
    Ok(())
}
