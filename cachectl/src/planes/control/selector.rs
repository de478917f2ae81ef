/// Which cache types an operation targets, as the caller wrote it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSelector {
    All,
    Explicit(Vec<String>),
}

impl TypeSelector {
    /// Parse comma-separated ids. Empty or absent input selects everything.
    ///
    /// Tokens are kept exactly as written: no trimming, no deduplication,
    /// no check against the registry.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => TypeSelector::All,
            Some(raw) => TypeSelector::Explicit(raw.split(',').map(str::to_string).collect()),
        }
    }

    pub fn resolve(self, all_ids: &[String]) -> Vec<String> {
        match self {
            TypeSelector::All => all_ids.to_vec(),
            TypeSelector::Explicit(ids) => ids,
        }
    }
}

/// Resolve raw selector input against the known type ids.
pub fn resolve(raw: Option<&str>, all_ids: &[String]) -> Vec<String> {
    TypeSelector::parse(raw).resolve(all_ids)
}
