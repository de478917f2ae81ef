use serde::{Deserialize, Serialize};
use std::fmt;

/// Declaration of a cache type known to the application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTypeDefinition {
    pub id: String,         // stable identifier, unique per registry
    pub label: String,      // display name
    pub cache_type: String, // display grouping only
    pub tags: Vec<String>,  // storage tags cleaned when the type is refreshed
}

impl CacheTypeDefinition {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        cache_type: impl Into<String>,
        tags: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            cache_type: cache_type.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// A cache type as seen at the start of an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheType {
    pub id: String,
    pub label: String,
    pub enabled: bool,
    pub cache_type: String,
}

impl CacheType {
    pub fn from_definition(definition: &CacheTypeDefinition, enabled: bool) -> Self {
        Self {
            id: definition.id.clone(),
            label: definition.label.clone(),
            enabled,
            cache_type: definition.cache_type.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnabledState {
    Enabled,
    Disabled,
}

impl From<bool> for EnabledState {
    fn from(enabled: bool) -> Self {
        if enabled {
            EnabledState::Enabled
        } else {
            EnabledState::Disabled
        }
    }
}

impl fmt::Display for EnabledState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnabledState::Enabled => f.write_str("Enabled"),
            EnabledState::Disabled => f.write_str("Disabled"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityState {
    Valid,
    Invalid,
    NotApplicable,
}

impl ValidityState {
    /// Disabled types have no validity; enabled ones are invalid while flagged.
    pub fn derive(enabled: bool, invalidated: bool) -> Self {
        match (enabled, invalidated) {
            (false, _) => ValidityState::NotApplicable,
            (true, true) => ValidityState::Invalid,
            (true, false) => ValidityState::Valid,
        }
    }
}

impl fmt::Display for ValidityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityState::Valid => f.write_str("Valid"),
            ValidityState::Invalid => f.write_str("Invalid"),
            ValidityState::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// One row of the cache type listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListingRow {
    pub id: String,
    pub status: EnabledState,
    pub validity: ValidityState,
    pub cache_type: String,
}

/// Special-purpose caches cleaned outside the per-type model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxiliaryCache {
    Media,
    Images,
}

impl AuxiliaryCache {
    pub fn as_str(&self) -> &str {
        match self {
            AuxiliaryCache::Media => "media",
            AuxiliaryCache::Images => "images",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Enable,
    Disable,
    Refresh,
    Invalidate,
    FlushStorage,
    CleanTaggedCache,
    CleanMediaCache,
    CleanImagesCache,
}

impl Operation {
    /// Past-tense verb used in summaries.
    pub fn verb(&self) -> &str {
        match self {
            Operation::Enable => "enabled",
            Operation::Disable => "disabled",
            Operation::Refresh => "refreshed",
            Operation::Invalidate => "invalidated",
            Operation::FlushStorage => "flushed",
            Operation::CleanTaggedCache
            | Operation::CleanMediaCache
            | Operation::CleanImagesCache => "cleaned",
        }
    }

    pub fn is_single_shot(&self) -> bool {
        matches!(
            self,
            Operation::FlushStorage
                | Operation::CleanTaggedCache
                | Operation::CleanMediaCache
                | Operation::CleanImagesCache
        )
    }
}

pub mod response {
    use super::Operation;
    use serde::Serialize;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
    pub struct ItemFailure {
        pub id: String,
        pub message: String,
    }

    /// Outcome of one id within a batch.
    ///
    /// `changed` is independent of `error`: a disable can flip a flag and
    /// still fail to clean the type's data.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ItemOutcome {
        pub id: String,
        pub changed: bool,
        pub error: Option<String>,
    }

    impl ItemOutcome {
        pub fn new(
            id: impl Into<String>,
            changed: bool,
            result: std::result::Result<(), String>,
        ) -> Self {
            Self {
                id: id.into(),
                changed,
                error: result.err(),
            }
        }

        pub fn ok(id: impl Into<String>, changed: bool) -> Self {
            Self::new(id, changed, Ok(()))
        }

        pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
            Self::new(id, false, Err(message.into()))
        }

        pub fn is_ok(&self) -> bool {
            self.error.is_none()
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
    pub struct BatchResult {
        pub operation: Operation,
        pub attempted: usize,
        pub succeeded: usize,
        /// Ids whose state changed, failed ones included.
        pub changed: usize,
        /// Ids that succeeded without a change (already in the requested state).
        pub unchanged: usize,
        pub failures: Vec<ItemFailure>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub persist_error: Option<String>,
    }

    impl BatchResult {
        pub fn new(operation: Operation) -> Self {
            Self {
                operation,
                attempted: 0,
                succeeded: 0,
                changed: 0,
                unchanged: 0,
                failures: Vec::new(),
                persist_error: None,
            }
        }

        /// Builds a result from per-id outcomes, in processing order.
        pub fn from_outcomes(operation: Operation, outcomes: Vec<ItemOutcome>) -> Self {
            let mut result = Self::new(operation);
            for outcome in outcomes {
                result.record(outcome);
            }
            result
        }

        /// Result of an all-or-nothing call, counted as a batch of one.
        pub fn single(
            operation: Operation,
            name: impl Into<String>,
            outcome: shared::Result<()>,
        ) -> Self {
            let changed = outcome.is_ok();
            let outcome = ItemOutcome::new(name, changed, outcome.map_err(|e| e.to_string()));
            Self::from_outcomes(operation, vec![outcome])
        }

        /// Nothing counts as changed; every outcome that had succeeded becomes
        /// a failure carrying `message`.
        pub fn rolled_back(
            operation: Operation,
            outcomes: Vec<ItemOutcome>,
            message: impl Into<String>,
        ) -> Self {
            let message = message.into();
            let outcomes = outcomes
                .into_iter()
                .map(|outcome| {
                    let error = outcome.error.unwrap_or_else(|| message.clone());
                    ItemOutcome::failed(outcome.id, error)
                })
                .collect();
            let mut result = Self::from_outcomes(operation, outcomes);
            result.persist_error = Some(message);
            result
        }

        pub fn record(&mut self, outcome: ItemOutcome) {
            if outcome.changed {
                self.changed += 1;
            }
            match outcome.error {
                None => {
                    self.attempted += 1;
                    self.succeeded += 1;
                    if !outcome.changed {
                        self.unchanged += 1;
                    }
                }
                Some(message) => self.record_failure(outcome.id, message),
            }
        }

        pub fn record_success(&mut self, changed: bool) {
            self.attempted += 1;
            self.succeeded += 1;
            if changed {
                self.changed += 1;
            } else {
                self.unchanged += 1;
            }
        }

        pub fn record_failure(&mut self, id: impl Into<String>, message: impl Into<String>) {
            self.attempted += 1;
            self.failures.push(ItemFailure {
                id: id.into(),
                message: message.into(),
            });
        }

        pub fn is_success(&self) -> bool {
            self.failures.is_empty()
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PurgeStep {
        Refresh,
        Images,
        Media,
        TaggedCache,
        Storage,
    }

    impl PurgeStep {
        pub const ORDER: [PurgeStep; 5] = [
            PurgeStep::Refresh,
            PurgeStep::Images,
            PurgeStep::Media,
            PurgeStep::TaggedCache,
            PurgeStep::Storage,
        ];
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
    pub struct PurgeStepResult {
        pub step: PurgeStep,
        pub result: BatchResult,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
    pub struct PurgeReport {
        pub steps: Vec<PurgeStepResult>,
    }

    impl PurgeReport {
        pub fn push(&mut self, step: PurgeStep, result: BatchResult) {
            self.steps.push(PurgeStepResult { step, result });
        }

        pub fn is_success(&self) -> bool {
            self.steps.iter().all(|s| s.result.is_success())
        }

        pub fn step(&self, step: PurgeStep) -> Option<&BatchResult> {
            self.steps.iter().find(|s| s.step == step).map(|s| &s.result)
        }
    }
}
