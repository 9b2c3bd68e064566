// ESRI ASCII adapter - Raster file input and output

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Reads and writes `.asc` rasters on the local filesystem
#[derive(Debug, Default)]
pub struct EsriAsciiAdapter;

impl EsriAsciiAdapter {
    /// Create new raster adapter
    pub fn new() -> Result<Self, DomainError> {
        Ok(Self)
    }

    /// Write `contents` next to `path` and rename it into place
    fn write_atomic(path: &Path, contents: &str) -> Result<(), DomainError> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create temp file in {}: {}",
                parent.display(),
                e
            ))
        })?;
        tmp.write_all(contents.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| DomainError::FsFail(format!("Failed to write {}: {}", path.display(), e)))?;
        tmp.persist(path).map_err(|e| {
            DomainError::FsFail(format!("Failed to move output to {}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

#[async_trait]
impl RasterPort for EsriAsciiAdapter {
    async fn read_grid(&self, path: &Path) -> Result<AsciiGrid, DomainError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => DomainError::FileNotFound(path.display().to_string()),
            _ => DomainError::FsFail(format!("Failed to read {}: {}", path.display(), e)),
        })?;

        let grid = tokio::task::spawn_blocking(move || AsciiGrid::parse(&text))
            .await
            .map_err(|e| DomainError::Internal(format!("grid parser task failed: {}", e)))?
            .map_err(|e| match e {
                DomainError::InvalidFormat(msg) => {
                    DomainError::InvalidFormat(format!("{}: {}", path.display(), msg))
                }
                other => other,
            })?;

        debug!(
            path = %path.display(),
            ncols = grid.header.ncols,
            nrows = grid.header.nrows,
            "grid read"
        );
        Ok(grid)
    }

    async fn write_grid(
        &self,
        grid: &AsciiGrid,
        path: &Path,
        overwrite: OverwritePolicy,
    ) -> Result<(), DomainError> {
        if overwrite == OverwritePolicy::Never && tokio::fs::try_exists(path).await.unwrap_or(false)
        {
            return Err(DomainError::OutputExists(path.display().to_string()));
        }

        let mut contents = grid.render();
        contents.push('\n');
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::write_atomic(&target, &contents))
            .await
            .map_err(|e| DomainError::Internal(format!("grid writer task failed: {}", e)))??;

        info!(path = %path.display(), cells = grid.data.len(), "grid written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn grid() -> AsciiGrid {
        let header = GridHeader::new(2, 2, 0.0, 0.0, 1.0, DEFAULT_NODATA).unwrap();
        AsciiGrid::new(header, vec![1.0, 2.0, -9999.0, 4.0]).unwrap()
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("veg.asc");
        let adapter = EsriAsciiAdapter::new().unwrap();

        adapter
            .write_grid(&grid(), &path, OverwritePolicy::Always)
            .await
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("1 2\n-9999 4\n"));
        assert_eq!(adapter.read_grid(&path).await.unwrap(), grid());
    }

    #[tokio::test]
    async fn test_overwrite_never_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("veg.asc");
        std::fs::write(&path, "original").unwrap();
        let adapter = EsriAsciiAdapter::new().unwrap();

        let err = adapter
            .write_grid(&grid(), &path, OverwritePolicy::Never)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::OutputExists(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");

        adapter
            .write_grid(&grid(), &path, OverwritePolicy::Always)
            .await
            .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("ncols 2"));
    }

    #[tokio::test]
    async fn test_read_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        let adapter = EsriAsciiAdapter::new().unwrap();

        let missing = dir.path().join("missing.asc");
        assert!(matches!(
            adapter.read_grid(&missing).await,
            Err(DomainError::FileNotFound(_))
        ));

        let short = dir.path().join("short.asc");
        std::fs::write(
            &short,
            "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n",
        )
        .unwrap();
        match adapter.read_grid(&short).await {
            Err(DomainError::InvalidFormat(msg)) => assert!(msg.contains("short.asc")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
