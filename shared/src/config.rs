use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Where cached data lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Sled,   // durable, shared between invocations
    Memory, // in-process moka cache, for embedding and tests
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(Backend::Sled),
            "memory" | "moka" => Ok(Backend::Memory),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

impl Backend {
    pub fn as_str(&self) -> &str {
        match self {
            Backend::Sled => "sled",
            Backend::Memory => "memory",
        }
    }
}

pub struct Config {
    pub data_dir: PathBuf,
    pub backend: Backend,
    pub media_dirs: Vec<PathBuf>,
    pub image_dir: PathBuf,
    pub app_tag: String,
    pub log_level: String,
    pub memory_max_entries: Option<u64>, // memory backend only
    pub memory_ttl: Option<Duration>,    // memory backend only
}

impl Config {
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_MEDIA_DIRS: &str = "media/js,media/css,media/css_secure";
    const DEFAULT_IMAGE_DIR: &str = "media/catalog/product/cache";
    const DEFAULT_APP_TAG: &str = "MAGE";
    const DEFAULT_LOG_LEVEL: &str = "warn";

    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend = match lookup("CACHECTL_BACKEND") {
            Some(raw) => raw.parse::<Backend>().unwrap_or_else(|e| {
                warn!("{}, falling back to sled", e);
                Backend::Sled
            }),
            None => Backend::Sled,
        };

        let media_dirs = lookup("CACHECTL_MEDIA_DIRS")
            .unwrap_or_else(|| Self::DEFAULT_MEDIA_DIRS.to_string())
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();

        let app_tag = match lookup("CACHECTL_APP_TAG") {
            Some(tag) if !tag.trim().is_empty() => tag.trim().to_string(),
            Some(_) => {
                warn!(
                    "CACHECTL_APP_TAG is blank, using '{}'",
                    Self::DEFAULT_APP_TAG
                );
                Self::DEFAULT_APP_TAG.to_string()
            }
            None => Self::DEFAULT_APP_TAG.to_string(),
        };

        let memory_max_entries = Self::parse_optional::<u64>(&lookup, "CACHECTL_MEMORY_MAX_ENTRIES");
        let memory_ttl = Self::parse_optional::<u64>(&lookup, "CACHECTL_MEMORY_TTL_SECS")
            .map(Duration::from_secs);

        Self {
            data_dir: PathBuf::from(
                lookup("CACHECTL_DATA_DIR").unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            ),
            backend,
            media_dirs,
            image_dir: PathBuf::from(
                lookup("CACHECTL_IMAGE_DIR").unwrap_or_else(|| Self::DEFAULT_IMAGE_DIR.to_string()),
            ),
            app_tag,
            log_level: lookup("CACHECTL_LOG_LEVEL")
                .unwrap_or_else(|| Self::DEFAULT_LOG_LEVEL.to_string()),
            memory_max_entries,
            memory_ttl,
        }
    }

    /// Unset or unparseable values are `None`; the latter also log a warning.
    fn parse_optional<T: FromStr>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &str,
    ) -> Option<T> {
        let raw = lookup(key)?;
        match raw.trim().parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("{}='{}' is not a valid number, ignoring it", key, raw);
                None
            }
        }
    }

    /// Sled database holding the enabled map and the invalidated set.
    pub fn state_db_path(&self) -> PathBuf {
        self.data_dir.join("cache_state.sled")
    }

    /// Sled database holding cached entries when the sled backend is selected.
    pub fn storage_db_path(&self) -> PathBuf {
        self.data_dir.join("cache_storage.sled")
    }
}
