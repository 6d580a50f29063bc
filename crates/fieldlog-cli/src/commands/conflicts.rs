use std::path::Path;

use crate::commands::common::{
    collect_conflicts, conflict_to_item, format_conflict_lines, load_store, ConflictItem,
};
use crate::error::CliError;

pub fn run_conflicts(limit: usize, as_json: bool, state_path: &Path) -> Result<(), CliError> {
    let store = load_store(state_path)?;
    let conflicts = collect_conflicts(&store, limit);

    if as_json {
        let json_items = conflicts
            .iter()
            .map(|(log, conflict)| conflict_to_item(log, conflict))
            .collect::<Vec<ConflictItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No sync conflicts recorded.");
        return Ok(());
    }

    for line in format_conflict_lines(&conflicts) {
        println!("{line}");
    }
    Ok(())
}
