use crate::ports::ConfigPersister;
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use std::collections::BTreeMap;

/// Persisted cache type configuration: type id -> enabled flag.
///
/// Ids missing from the map are disabled. Ids that no declaration knows about
/// are carried along untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledMap(BTreeMap<String, bool>);

impl EnabledMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: impl Into<String>, enabled: bool) {
        self.0.insert(id.into(), enabled);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(id, enabled)| (id.as_str(), *enabled))
    }
}

impl FromIterator<(String, bool)> for EnabledMap {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordered flag changes planned by one batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<(String, bool)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: impl Into<String>, enabled: bool) {
        self.changes.push((id.into(), enabled));
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn ids(&self) -> Vec<String> {
        self.changes.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Apply the changes to `map` without persisting anything.
    pub fn apply_to(&self, mut map: EnabledMap) -> EnabledMap {
        for (id, enabled) in &self.changes {
            map.set(id.clone(), *enabled);
        }
        map
    }
}

/// The single write boundary for the enabled map.
///
/// Applies `changes` and persists the whole map in one write. No write happens
/// when there is nothing to change. Any persister failure is reported as
/// `Error::PersistenceWrite`.
pub async fn apply_and_persist(
    persister: &dyn ConfigPersister,
    map: EnabledMap,
    changes: &ChangeSet,
) -> Result<EnabledMap> {
    if changes.is_empty() {
        return Ok(map);
    }

    let updated = changes.apply_to(map);
    persister.write_all(&updated).await.map_err(|e| match e {
        Error::PersistenceWrite(_) => e,
        other => Error::PersistenceWrite(other.to_string()),
    })?;

    tracing::debug!(
        "Persisted enabled map with {} change(s), {} type(s) total",
        changes.len(),
        updated.len()
    );
    Ok(updated)
}
