// Local filesystem adapter - File system operations

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::*;
use crate::ports::*;

/// Filesystem adapter backed by tokio::fs
#[derive(Debug, Default)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    /// Create new filesystem adapter
    pub fn new() -> Result<Self, DomainError> {
        Ok(Self)
    }
}

#[async_trait]
impl FsPort for LocalFsAdapter {
    async fn file_exists(&self, path: &Path) -> Result<bool, DomainError> {
        tokio::fs::try_exists(path).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to stat {}: {}", path.display(), e))
        })
    }

    async fn ensure_parent_dir(&self, path: &Path) -> Result<(), DomainError> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        if tokio::fs::try_exists(parent).await.unwrap_or(false) {
            return Ok(());
        }

        debug!(dir = %parent.display(), "creating output directory");
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })
    }
}
