//! Command implementations

use anyhow::{Context, Result};
use tracing::info;

use crate::app::container::AppContainer;
use crate::cli::args::{CoupleArgs, InspectArgs, RoughnessArgs, ShearGridArgs, SuccessionArgs};
use crate::cli::Commands;
use crate::config_initialization::RunSettings;
use crate::domain::model::*;
use crate::domain::rules::SuccessionSummary;

/// Dispatch a parsed command
pub async fn run(container: &dyn AppContainer, settings: &RunSettings, command: Commands) -> Result<()> {
    match command {
        Commands::Succession(args) => succession(container, args).await,
        Commands::Couple(args) => couple(container, settings, args).await,
        Commands::ShearGrid(args) => shear_grid(container, settings, args).await,
        Commands::Roughness(args) => roughness(container, args).await,
        Commands::Inspect(args) => inspect(container, args).await,
    }
}

/// Execute the succession command
pub async fn succession(container: &dyn AppContainer, args: SuccessionArgs) -> Result<()> {
    info!("Executing succession command");
    let request = SuccessionRequest {
        vegetation: args.vegetation,
        zones: args.zones,
        shear: args.shear,
        landscape: args.landscape,
        output: args.output,
    };

    let response = container
        .succession_interactor()
        .execute(request)
        .await
        .context("Succession step failed")?;

    println!("Vegetation map written to {}", response.output.display());
    print_summary(&response.summary);
    Ok(())
}

/// Execute the couple command
pub async fn couple(container: &dyn AppContainer, settings: &RunSettings, args: CoupleArgs) -> Result<()> {
    info!("Executing couple command");
    let shear_nc = args
        .shear_nc
        .or(args.shear_nc_pos)
        .context("D-FLOW output is required (--shear-nc or first positional argument)")?;
    let output = args
        .output
        .or(args.output_pos)
        .context("Output path is required (--output or second positional argument)")?;

    let request = CoupleRequest {
        vegetation: args.vegetation.unwrap_or_else(|| settings.vegetation.clone()),
        zones: args.zones.unwrap_or_else(|| settings.zones.clone()),
        shear_nc,
        landscape: args.landscape.unwrap_or_else(|| settings.landscape.clone()),
        output,
        shear_output: args.shear_output,
        roughness_output: args.roughness_output,
        interpolation: settings.interpolation,
    };

    let response = container
        .couple_interactor()
        .execute(request)
        .await
        .context("Coupled step failed")?;

    println!("Vegetation map written to {}", response.output.display());
    if let Some(path) = &response.shear_output {
        println!("Shear grid written to {}", path.display());
    }
    if let Some(path) = &response.roughness_output {
        println!("Roughness map written to {}", path.display());
    }
    println!(
        "  D-FLOW flow elements: {} ({} usable)",
        response.mesh_elements, response.mesh_points
    );
    println!("  Cells outside mesh: {}", response.shear_nodata_cells);
    print_summary(&response.summary);
    Ok(())
}

/// Execute the shear-grid command
pub async fn shear_grid(container: &dyn AppContainer, settings: &RunSettings, args: ShearGridArgs) -> Result<()> {
    info!("Executing shear-grid command");
    let request = ShearGridRequest {
        shear_nc: args.shear_nc,
        template: args.template,
        output: args.output,
        interpolation: settings.interpolation,
    };

    let response = container
        .shear_grid_interactor()
        .execute(request)
        .await
        .context("Shear gridding failed")?;

    println!("Shear grid written to {}", response.output.display());
    println!("  Cells: {} ({} outside mesh)", response.cells, response.nodata_cells);
    if let Some(max) = response.max_shear {
        println!("  Max shear: {}", max);
    }
    Ok(())
}

/// Execute the roughness command
pub async fn roughness(container: &dyn AppContainer, args: RoughnessArgs) -> Result<()> {
    info!("Executing roughness command");
    let request = RoughnessRequest {
        vegetation: args.vegetation,
        landscape: args.landscape,
        output: args.output,
    };

    let response = container
        .roughness_interactor()
        .execute(request)
        .await
        .context("Roughness conversion failed")?;

    println!("Roughness map written to {}", response.output.display());
    println!(
        "  Cells: {} valid, {} NODATA",
        response.valid_cells, response.nodata_cells
    );
    Ok(())
}

/// Execute the inspect command
pub async fn inspect(container: &dyn AppContainer, args: InspectArgs) -> Result<()> {
    info!("Executing inspect command");
    let response = container
        .inspect_interactor()
        .execute(InspectRequest { input: args.input })
        .await
        .context("Failed to inspect grid")?;

    if args.json {
        println!("{}", response.to_json()?);
    } else {
        print!("{}", response.to_text());
    }
    Ok(())
}

fn print_summary(summary: &SuccessionSummary) {
    println!("  Cells: {}", summary.total_cells);
    println!("  Bare: {}", summary.bare_cells);
    println!("  Skipped (NODATA): {}", summary.nodata_cells);
    println!("  Reset by shear: {}", summary.reset_cells);
    println!("  Aged: {}", summary.aged_cells);
    if summary.unzoned_resets > 0 {
        println!("  Reset without zone: {}", summary.unzoned_resets);
    }
}
