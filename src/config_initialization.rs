//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::{InterpolationMethod, MeshVariables, OverwritePolicy};
use crate::ports::{ConfigPort, LogLevel};
use crate::utils::logging::{LogFormat, LoggingConfig};

/// Config file picked up from the working directory when none is named
pub const DEFAULT_CONFIG_FILE: &str = "ripcas.toml";

/// Environment variables and the config keys they override
pub const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("RIPCAS_LOG_LEVEL", "log.level"),
    ("RIPCAS_LOG_FORMAT", "log.format"),
    ("RIPCAS_OVERWRITE", "output.overwrite"),
    ("RIPCAS_INTERPOLATION", "mesh.interpolation"),
];

/// Values given on the command line, highest precedence
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub overwrite: Option<String>,
    pub interpolation: Option<String>,
}

impl ConfigOverrides {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("log.level", self.log_level.as_deref()),
            ("log.format", self.log_format.as_deref()),
            ("output.overwrite", self.overwrite.as_deref()),
            ("mesh.interpolation", self.interpolation.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

/// Typed view of the resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub logging: LoggingConfig,
    pub overwrite: OverwritePolicy,
    pub interpolation: InterpolationMethod,
    pub mesh_variables: MeshVariables,
    pub landscape_sheet: Option<String>,
    pub vegetation: PathBuf,
    pub zones: PathBuf,
    pub landscape: PathBuf,
}

impl RunSettings {
    /// Resolve typed settings from the config store
    pub async fn resolve(config: &dyn ConfigPort) -> Result<Self, DomainError> {
        let get = |key: &'static str| async move {
            config
                .get_config(key)
                .await
                .map(|v| v.filter(|s| !s.trim().is_empty()))
        };
        let require = |key: &'static str| async move {
            config
                .get_config(key)
                .await?
                .ok_or_else(|| DomainError::Config(format!("missing config key '{}'", key)))
        };

        let level = LogLevel::parse(&require("log.level").await?)?;
        let format = LogFormat::parse(&require("log.format").await?)?;
        let overwrite = OverwritePolicy::parse(&require("output.overwrite").await?)?;
        let interpolation = InterpolationMethod::parse(&require("mesh.interpolation").await?)?;

        let x = get("mesh.x_variable").await?;
        let y = get("mesh.y_variable").await?;
        let shear = get("mesh.shear_variable").await?;
        let mesh_variables = if x.is_none() && y.is_none() && shear.is_none() {
            MeshVariables::default()
        } else {
            let default = MeshVariables::default();
            MeshVariables::named(
                x.as_deref().unwrap_or(&default.x),
                y.as_deref().unwrap_or(&default.y),
                shear.as_deref().unwrap_or(&default.shear),
            )
        };

        Ok(Self {
            logging: LoggingConfig { level, format },
            overwrite,
            interpolation,
            mesh_variables,
            landscape_sheet: get("landscape.sheet").await?,
            vegetation: PathBuf::from(require("inputs.vegetation").await?),
            zones: PathBuf::from(require("inputs.zones").await?),
            landscape: PathBuf::from(require("inputs.landscape").await?),
        })
    }
}

/// Build the configuration with precedence CLI > Env > File > Defaults
pub async fn initialize_configuration_hierarchy(
    config: &dyn ConfigPort,
    overrides: &ConfigOverrides,
) -> Result<RunSettings> {
    // Defaults are loaded by the adapter itself
    load_config_file(config, overrides.config_file.as_deref()).await?;

    apply_environment(config, |name| std::env::var(name).ok()).await?;

    apply_cli_overrides(config, overrides).await?;

    config
        .validate_config()
        .await
        .context("Invalid configuration")?;
    let settings = RunSettings::resolve(config)
        .await
        .context("Failed to resolve configuration")?;

    debug!(?settings, "configuration resolved");
    Ok(settings)
}

/// Where the configuration came from: the loaded file, or the defaults
pub async fn configuration_source(config: &dyn ConfigPort) -> Result<String, DomainError> {
    Ok(config
        .get_config_file_path()
        .await?
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string()))
}

/// Log the resolved configuration.
///
/// Configuration is resolved before the subscriber exists, so this runs
/// once logging is initialized.
pub async fn log_configuration_summary(
    config: &dyn ConfigPort,
    settings: &RunSettings,
) -> Result<()> {
    let source = configuration_source(config).await?;
    info!(
        source = %source,
        level = settings.logging.level.as_str(),
        overwrite = %settings.overwrite,
        interpolation = %settings.interpolation,
        shear_variable = %settings.mesh_variables.shear,
        "Configuration loaded"
    );
    debug!(
        vegetation = %settings.vegetation.display(),
        zones = %settings.zones.display(),
        landscape = %settings.landscape.display(),
        "Default inputs"
    );
    Ok(())
}

/// Load the named config file, or `ripcas.toml` if one exists here
async fn load_config_file(config: &dyn ConfigPort, explicit: Option<&Path>) -> Result<()> {
    match explicit {
        Some(path) => {
            config
                .load_config(path)
                .await
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
        }
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if tokio::fs::try_exists(fallback).await.unwrap_or(false) {
                config.load_config(fallback).await.with_context(|| {
                    format!("Failed to load config file {}", DEFAULT_CONFIG_FILE)
                })?;
            } else {
                debug!("No config file found, using defaults");
            }
        }
    }
    Ok(())
}

/// Apply `RIPCAS_*` variables found through `lookup`
pub async fn apply_environment<F>(config: &dyn ConfigPort, lookup: F) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_overrides = 0;
    for &(env_var, key) in ENV_MAPPINGS {
        if let Some(value) = lookup(env_var).filter(|v| !v.trim().is_empty()) {
            debug!("Environment override: {} = {}", env_var, value);
            config.set_config(key, &value).await?;
            env_overrides += 1;
        }
    }

    if env_overrides > 0 {
        debug!("Applied {} environment variable overrides", env_overrides);
    }
    Ok(env_overrides)
}

/// Apply command line overrides
pub async fn apply_cli_overrides(
    config: &dyn ConfigPort,
    overrides: &ConfigOverrides,
) -> Result<usize> {
    let entries = overrides.entries();
    for (key, value) in &entries {
        debug!("CLI override: {} = {}", key, value);
        config.set_config(key, value).await?;
    }
    Ok(entries.len())
}
