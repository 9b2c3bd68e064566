//! CLI module for ripcas
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config_initialization::ConfigOverrides;

pub mod args;
pub mod commands;

/// RipCAS / D-FLOW coupling toolkit
///
/// Runs CASiMiR vegetation succession driven by D-FLOW bed shear stress and
/// converts between the two models' file formats.
#[derive(Parser, Debug)]
#[command(name = "ripcas")]
#[command(about = "RipCAS / D-FLOW coupling - vegetation succession from bed shear stress")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// TOML configuration file
    #[arg(long, global = true, env = "RIPCAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overwrite behavior for existing outputs (never, always)
    #[arg(long, global = true)]
    pub overwrite: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration values given on the command line
    pub fn overrides(&self) -> ConfigOverrides {
        let interpolation = match &self.command {
            Commands::Couple(args) => args.interpolation.clone(),
            Commands::ShearGrid(args) => args.interpolation.clone(),
            _ => None,
        };

        ConfigOverrides {
            config_file: self.config.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            overwrite: self.overwrite.clone(),
            interpolation,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one succession step with shear stress given as a grid
    Succession(args::SuccessionArgs),
    /// Run one coupled step from D-FLOW map output
    Couple(args::CoupleArgs),
    /// Interpolate D-FLOW bed shear stress onto a grid
    ShearGrid(args::ShearGridArgs),
    /// Convert a vegetation map to a Manning n roughness map
    Roughness(args::RoughnessArgs),
    /// Show grid header and statistics
    Inspect(args::InspectArgs),
}
