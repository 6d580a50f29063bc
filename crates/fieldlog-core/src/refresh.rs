//! Wholesale refresh of reference collections.
//!
//! Areas, assets, units, categories and equipment are never merged. Each
//! refresh fetches the whole collection and emits one
//! [`StoreIntent::ReplaceAll`].

use crate::error::Result;
use crate::models::{ReferenceItem, ReferenceKind};
use crate::store::StoreIntent;
use crate::transport::SyncTransport;

/// Fetch one reference collection and describe its replacement.
pub async fn refresh(transport: &dyn SyncTransport, kind: ReferenceKind) -> Result<StoreIntent> {
    let items: Vec<ReferenceItem> = match kind {
        ReferenceKind::Areas => transport
            .fetch_areas()
            .await?
            .into_iter()
            .map(ReferenceItem::Area)
            .collect(),
        ReferenceKind::Assets => transport
            .fetch_assets()
            .await?
            .into_iter()
            .map(ReferenceItem::Asset)
            .collect(),
        ReferenceKind::Equipment => transport
            .fetch_assets()
            .await?
            .into_iter()
            .filter(|asset| asset.is_equipment())
            .map(ReferenceItem::Asset)
            .collect(),
        ReferenceKind::Units | ReferenceKind::Categories => {
            let vocabulary = kind.vocabulary().unwrap_or_default();
            transport
                .fetch_terms(vocabulary)
                .await?
                .into_iter()
                .map(ReferenceItem::Term)
                .collect()
        }
    };

    tracing::info!(%kind, count = items.len(), "Refreshed reference data");
    Ok(StoreIntent::ReplaceAll { kind, items })
}
