// TOML config adapter - Configuration management using TOML files

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::{InterpolationMethod, OverwritePolicy};
use crate::ports::*;
use crate::utils::logging::LogFormat;

/// Built-in defaults, lowest precedence
const DEFAULTS: &[(&str, &str)] = &[
    ("log.level", "info"),
    ("log.format", "pretty"),
    ("output.overwrite", "always"),
    ("mesh.interpolation", "linear"),
    ("inputs.vegetation", "data/vegclass_2z.asc"),
    ("inputs.zones", "data/zonemap_2z.asc"),
    ("inputs.landscape", "data/casimir-data-requirements.xlsx"),
];

/// TOML configuration adapter
///
/// Values are kept as strings under dotted keys; `[mesh] shear_variable = "taus"`
/// is stored as `mesh.shear_variable`.
pub struct TomlConfigAdapter {
    config: Arc<RwLock<HashMap<String, String>>>,
    config_file_path: Arc<RwLock<Option<PathBuf>>>,
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter holding the defaults
    pub fn new() -> Result<Self, DomainError> {
        let config = DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_file_path: Arc::new(RwLock::new(None)),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, String>>, DomainError> {
        self.config
            .read()
            .map_err(|_| DomainError::Internal("config lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, String>>, DomainError> {
        self.config
            .write()
            .map_err(|_| DomainError::Internal("config lock poisoned".to_string()))
    }

    /// Parse TOML text into dotted key/value pairs
    pub fn parse_toml(toml_content: &str) -> Result<Vec<(String, String)>, DomainError> {
        let parsed: toml::Table = toml::from_str(toml_content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))?;

        let mut entries = Vec::new();
        flatten("", &toml::Value::Table(parsed), &mut entries)?;
        Ok(entries)
    }
}

fn flatten(
    prefix: &str,
    value: &toml::Value,
    out: &mut Vec<(String, String)>,
) -> Result<(), DomainError> {
    let scalar = match value {
        toml::Value::Table(table) => {
            for (key, nested) in table {
                let full = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&full, nested, out)?;
            }
            return Ok(());
        }
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(d) => d.to_string(),
        toml::Value::Array(_) => {
            return Err(DomainError::Config(format!(
                "array values are not supported (key '{}')",
                prefix
            )))
        }
    };
    out.push((prefix.to_string(), scalar));
    Ok(())
}

#[async_trait]
impl ConfigPort for TomlConfigAdapter {
    async fn get_config(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.read()?.get(key).cloned())
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.write()?.insert(key.to_string(), value.to_string());
        tracing::debug!(key, value, "config set");
        Ok(())
    }

    async fn load_config(&self, file_path: &Path) -> Result<(), DomainError> {
        let content = tokio::fs::read_to_string(file_path).await.map_err(|e| {
            DomainError::Config(format!(
                "Failed to read config file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        let entries = Self::parse_toml(&content)?;
        let count = entries.len();
        self.write()?.extend(entries);
        *self
            .config_file_path
            .write()
            .map_err(|_| DomainError::Internal("config lock poisoned".to_string()))? =
            Some(file_path.to_path_buf());

        tracing::debug!(path = %file_path.display(), keys = count, "config file loaded");
        Ok(())
    }

    async fn validate_config(&self) -> Result<(), DomainError> {
        let config = self.read()?;
        let invalid = |key: &str, e: DomainError| {
            let detail = match e {
                DomainError::BadArgs(msg) => msg,
                other => other.to_string(),
            };
            DomainError::Config(format!("{}: {}", key, detail))
        };

        if let Some(level) = config.get("log.level") {
            LogLevel::parse(level).map_err(|e| invalid("log.level", e))?;
        }
        if let Some(format) = config.get("log.format") {
            LogFormat::parse(format).map_err(|e| invalid("log.format", e))?;
        }
        if let Some(policy) = config.get("output.overwrite") {
            OverwritePolicy::parse(policy).map_err(|e| invalid("output.overwrite", e))?;
        }
        if let Some(method) = config.get("mesh.interpolation") {
            InterpolationMethod::parse(method).map_err(|e| invalid("mesh.interpolation", e))?;
        }

        for key in ["mesh.x_variable", "mesh.y_variable", "mesh.shear_variable"] {
            if config.get(key).is_some_and(|v| v.trim().is_empty()) {
                return Err(DomainError::Config(format!("{} must not be empty", key)));
            }
        }

        Ok(())
    }

    async fn get_config_file_path(&self) -> Result<Option<PathBuf>, DomainError> {
        Ok(self
            .config_file_path
            .read()
            .map_err(|_| DomainError::Internal("config lock poisoned".to_string()))?
            .clone())
    }
}
