pub mod listing;
pub mod registry;
pub mod selector;

pub use listing::build_listing;
pub use registry::CacheTypeRegistry;
pub use selector::{resolve, TypeSelector};
