pub mod memory_store;
pub mod sled_store;

pub use memory_store::InMemoryConfigStore;
pub use sled_store::SledPersistence;
