use std::path::Path;

use fieldlog_core::models::ReferenceKind;
use fieldlog_core::StoreIntent;

use crate::commands::common::{load_store, open_synchronizer, resolve_sync_config, save_store};
use crate::error::CliError;

pub async fn run_refresh(
    state_path: &Path,
    kind: Option<ReferenceKind>,
    host: Option<String>,
    token: Option<String>,
) -> Result<(), CliError> {
    let mut store = load_store(state_path)?;
    let config = resolve_sync_config(host, token, store.sync_date)?;
    let synchronizer = open_synchronizer(&config)?;

    let kinds = kind.map_or_else(|| ReferenceKind::ALL.to_vec(), |kind| vec![kind]);
    for kind in kinds {
        let intent = synchronizer.refresh(kind).await?;
        if let StoreIntent::ReplaceAll { items, .. } = &intent {
            println!("Refreshed {kind}: {} items", items.len());
        }
        store.apply(intent)?;
    }

    save_store(state_path, &store)?;
    Ok(())
}
