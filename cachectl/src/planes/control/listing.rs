use crate::domain::{EnabledState, ListingRow, ValidityState};
use crate::planes::control::CacheTypeRegistry;
use shared::Result;

/// Assemble the cache type listing in registry order.
///
/// Validity is derived on every call from the current invalidated set.
pub async fn build_listing(registry: &CacheTypeRegistry) -> Result<Vec<ListingRow>> {
    let types = registry.list_all().await?;
    let invalidated = registry.invalidated_ids().await?;

    Ok(types
        .into_iter()
        .map(|cache_type| {
            let validity =
                ValidityState::derive(cache_type.enabled, invalidated.contains(&cache_type.id));
            ListingRow {
                status: EnabledState::from(cache_type.enabled),
                validity,
                id: cache_type.id,
                cache_type: cache_type.cache_type,
            }
        })
        .collect())
}
