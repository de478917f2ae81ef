pub mod batch_operations;
pub mod enabled_map;

pub use batch_operations::{AuxiliaryCleaners, BatchOperationEngine};
pub use enabled_map::{apply_and_persist, ChangeSet, EnabledMap};
