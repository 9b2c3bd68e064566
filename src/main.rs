//! ripcas - RipCAS / D-FLOW coupling CLI
//!
//! Runs one CASiMiR vegetation succession step from D-FLOW bed shear stress
//! and converts between the models' file formats.
//!
//! # Usage
//!
//! ```bash
//! ripcas couple run_map.nc vegclass_out.asc
//! ripcas succession --vegetation veg.asc --zones zones.asc --shear shear.asc \
//!     --landscape landscape.xlsx --output veg_next.asc
//! ripcas inspect --input veg_next.asc --json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ripcas_dflow::app::container::{AppContainer, DefaultAppContainer};
use ripcas_dflow::cli::{commands, Cli};
use ripcas_dflow::config_initialization::{
    initialize_configuration_hierarchy, log_configuration_summary,
};
use ripcas_dflow::utils::logging::LoggingSystem;

/// Main entry point for the ripcas CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let container = DefaultAppContainer::new().context("Failed to initialize application")?;
    let config_port = container.config_port();
    let settings = initialize_configuration_hierarchy(config_port.as_ref(), &cli.overrides()).await?;

    // Initialize logging
    let logging = LoggingSystem::new(settings.logging.clone());
    logging.initialize()?;
    logging.log_system_info();
    log_configuration_summary(config_port.as_ref(), &settings).await?;

    commands::run(&container, &settings, cli.command).await?;

    info!("ripcas completed successfully");
    Ok(())
}
