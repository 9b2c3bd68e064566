//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the succession command
#[derive(Args, Debug)]
pub struct SuccessionArgs {
    /// Vegetation map (.asc)
    #[arg(long)]
    pub vegetation: PathBuf,

    /// Zone map holding the age-zero vegetation type per cell (.asc)
    #[arg(long)]
    pub zones: PathBuf,

    /// Bed shear stress grid (.asc)
    #[arg(long)]
    pub shear: PathBuf,

    /// Landscape model table (.xlsx, .xls, .ods or .csv)
    #[arg(long)]
    pub landscape: PathBuf,

    /// Output vegetation map (.asc)
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the couple command
///
/// Accepts either flags or the two positional arguments
/// `<SHEAR_NC> <VEG_OUT>`; missing inputs come from the `[inputs]` config.
#[derive(Args, Debug)]
pub struct CoupleArgs {
    /// D-FLOW map output (positional form)
    #[arg(value_name = "SHEAR_NC", conflicts_with = "shear_nc")]
    pub shear_nc_pos: Option<PathBuf>,

    /// Output vegetation map (positional form)
    #[arg(value_name = "VEG_OUT", conflicts_with = "output")]
    pub output_pos: Option<PathBuf>,

    /// Vegetation map (.asc) [default: config inputs.vegetation]
    #[arg(long)]
    pub vegetation: Option<PathBuf>,

    /// Zone map (.asc) [default: config inputs.zones]
    #[arg(long)]
    pub zones: Option<PathBuf>,

    /// D-FLOW map output (*_map.nc)
    #[arg(long)]
    pub shear_nc: Option<PathBuf>,

    /// Landscape model table [default: config inputs.landscape]
    #[arg(long)]
    pub landscape: Option<PathBuf>,

    /// Output vegetation map (.asc)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also save the interpolated shear grid here
    #[arg(long)]
    pub shear_output: Option<PathBuf>,

    /// Also write the Manning n map of the updated vegetation here
    #[arg(long)]
    pub roughness_output: Option<PathBuf>,

    /// Interpolation method (linear, natural)
    #[arg(long)]
    pub interpolation: Option<String>,
}

/// Arguments for the shear-grid command
#[derive(Args, Debug)]
pub struct ShearGridArgs {
    /// D-FLOW map output (*_map.nc)
    #[arg(long)]
    pub shear_nc: PathBuf,

    /// Grid whose header defines the output grid (.asc)
    #[arg(long)]
    pub template: PathBuf,

    /// Output shear grid (.asc)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Interpolation method (linear, natural)
    #[arg(long)]
    pub interpolation: Option<String>,
}

/// Arguments for the roughness command
#[derive(Args, Debug)]
pub struct RoughnessArgs {
    /// Vegetation map (.asc)
    #[arg(long)]
    pub vegetation: PathBuf,

    /// Landscape model table with an n_val column
    #[arg(long)]
    pub landscape: PathBuf,

    /// Output roughness map (.asc)
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Grid file (.asc)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
