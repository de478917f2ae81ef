use crate::domain::CacheTypeDefinition;
use crate::planes::data::EnabledMap;

/// Create the standard cache type declarations, in listing order
pub fn create_default_cache_types() -> Vec<CacheTypeDefinition> {
    vec![
        CacheTypeDefinition::new(
            "config",
            "Configuration",
            "system",
            &["CONFIG"],
        ),
        CacheTypeDefinition::new(
            "layout",
            "Layouts",
            "frontend",
            &["LAYOUT_GENERAL_CACHE_TAG"],
        ),
        CacheTypeDefinition::new(
            "block_html",
            "Blocks HTML output",
            "frontend",
            &["BLOCK_HTML"],
        ),
        CacheTypeDefinition::new(
            "translate",
            "Translations",
            "frontend",
            &["TRANSLATE"],
        ),
        CacheTypeDefinition::new(
            "collections",
            "Collections Data",
            "data",
            &["COLLECTION_DATA"],
        ),
        CacheTypeDefinition::new(
            "eav",
            "EAV types and attributes",
            "data",
            &["EAV"],
        ),
        CacheTypeDefinition::new(
            "config_api",
            "Web Services Configuration",
            "api",
            &["CONFIG_API"],
        ),
        CacheTypeDefinition::new(
            "config_api2",
            "Web Services Configuration (REST)",
            "api",
            &["CONFIG_API2"],
        ),
    ]
}

/// Enabled map used when nothing has been persisted yet: every declared type on
pub fn create_default_enabled_map(definitions: &[CacheTypeDefinition]) -> EnabledMap {
    definitions
        .iter()
        .map(|definition| (definition.id.clone(), true))
        .collect()
}
