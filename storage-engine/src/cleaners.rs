use async_trait::async_trait;
use cachectl::ports::AuxiliaryCleaner;
use cachectl::AuxiliaryCache;
use shared::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cleans an auxiliary cache kept as files on disk by emptying its directories.
///
/// The directories themselves stay in place; missing directories count as
/// already clean.
#[derive(Clone, Debug)]
pub struct DirectoryCleaner {
    kind: AuxiliaryCache,
    dirs: Vec<PathBuf>,
}

impl DirectoryCleaner {
    pub fn new(kind: AuxiliaryCache, dirs: Vec<PathBuf>) -> Self {
        Self { kind, dirs }
    }

    fn error(&self, path: &Path, err: std::io::Error) -> Error {
        Error::Cleaner {
            name: self.kind.as_str().to_string(),
            message: format!("{}: {}", path.display(), err),
        }
    }

    async fn empty_dir(&self, dir: &Path) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.error(dir, e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.error(dir, e))?
        {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| self.error(&path, e))?;
            let removal = if file_type.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            removal.map_err(|e| self.error(&path, e))?;
            removed += 1;
        }
        Ok(removed)
    }
}

#[async_trait]
impl AuxiliaryCleaner for DirectoryCleaner {
    fn kind(&self) -> AuxiliaryCache {
        self.kind
    }

    async fn clean(&self) -> Result<()> {
        for dir in &self.dirs {
            let removed = self.empty_dir(dir).await?;
            debug!(
                "Removed {} entr(ies) from {} cache directory {}",
                removed,
                self.kind.as_str(),
                dir.display()
            );
        }
        Ok(())
    }
}
