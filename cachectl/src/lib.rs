//! Cache type administration: list cache types with their enabled and
//! validity state, enable or disable them persistently, refresh their
//! contents and flush the underlying storage.
//!
//! Collaborators (storage engine, configuration store, invalidation tracker,
//! auxiliary cleaners) are plugged in through [`ports`].

pub mod defaults;
pub mod domain;
pub mod events;
pub mod persistence;
pub mod planes;
pub mod ports;

pub use domain::response::{
    BatchResult, ItemFailure, ItemOutcome, PurgeReport, PurgeStep, PurgeStepResult,
};
pub use domain::{
    AuxiliaryCache, CacheType, CacheTypeDefinition, EnabledState, ListingRow, Operation,
    ValidityState,
};
pub use planes::control::{build_listing, resolve, CacheTypeRegistry, TypeSelector};
pub use planes::data::{
    apply_and_persist, AuxiliaryCleaners, BatchOperationEngine, ChangeSet, EnabledMap,
};
