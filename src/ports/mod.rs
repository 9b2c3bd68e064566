// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for reading and writing ESRI ASCII rasters
#[async_trait]
pub trait RasterPort: Send + Sync {
    /// Read and validate a grid
    async fn read_grid(&self, path: &Path) -> Result<AsciiGrid, DomainError>;

    /// Write a grid, honouring the overwrite policy
    async fn write_grid(
        &self,
        grid: &AsciiGrid,
        path: &Path,
        overwrite: OverwritePolicy,
    ) -> Result<(), DomainError>;
}

/// Port for reading D-FLOW mesh output
#[async_trait]
pub trait MeshPort: Send + Sync {
    /// Flow element centres and bed shear stress at the last output time
    async fn read_shear_mesh(
        &self,
        path: &Path,
        variables: &MeshVariables,
    ) -> Result<ShearMesh, DomainError>;
}

/// Port for reading the landscape model table
#[async_trait]
pub trait LandscapePort: Send + Sync {
    /// Read the table, optionally from a named sheet
    async fn read_landscape(
        &self,
        path: &Path,
        sheet: Option<&str>,
    ) -> Result<LandscapeTable, DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Check if file exists
    async fn file_exists(&self, path: &Path) -> Result<bool, DomainError>;

    /// Create the parent directory of `path` if missing
    async fn ensure_parent_dir(&self, path: &Path) -> Result<(), DomainError>;
}

/// Port for configuration management
#[async_trait]
pub trait ConfigPort: Send + Sync {
    /// Get configuration value
    async fn get_config(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Set configuration value
    async fn set_config(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Load configuration from file
    async fn load_config(&self, file_path: &Path) -> Result<(), DomainError>;

    /// Validate configuration
    async fn validate_config(&self) -> Result<(), DomainError>;

    /// Path of the loaded configuration file, if any
    async fn get_config_file_path(&self) -> Result<Option<PathBuf>, DomainError>;
}

/// Port for logging operations
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
