// Succession interactor - Orchestrates one CASiMiR succession step

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::app::{ensure_inputs_exist, ensure_output_writable, run_blocking};
use crate::config_initialization::RunSettings;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::{self, SuccessionSummary};
use crate::ports::*;

/// Interactor for the succession use case (shear given as a grid)
pub struct SuccessionInteractor {
    raster_port: Arc<dyn RasterPort>,
    landscape_port: Arc<dyn LandscapePort>,
    fs_port: Arc<dyn FsPort>,
    config_port: Arc<dyn ConfigPort>,
    log_port: Arc<dyn LogPort>,
}

impl SuccessionInteractor {
    /// Create new succession interactor with injected ports
    pub fn new(
        raster_port: Arc<dyn RasterPort>,
        landscape_port: Arc<dyn LandscapePort>,
        fs_port: Arc<dyn FsPort>,
        config_port: Arc<dyn ConfigPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            raster_port,
            landscape_port,
            fs_port,
            config_port,
            log_port,
        }
    }

    /// Execute one succession step and write the updated vegetation map
    pub async fn execute(&self, request: SuccessionRequest) -> Result<SuccessionResponse, DomainError> {
        let settings = RunSettings::resolve(self.config_port.as_ref()).await?;

        self.log_port
            .info(&format!(
                "Starting succession for vegetation map: {}",
                request.vegetation.display()
            ))
            .await;

        ensure_inputs_exist(
            self.fs_port.as_ref(),
            &[
                ("vegetation", request.vegetation.as_path()),
                ("zone", request.zones.as_path()),
                ("shear", request.shear.as_path()),
                ("landscape", request.landscape.as_path()),
            ],
        )
        .await?;
        ensure_output_writable(self.fs_port.as_ref(), &request.output, settings.overwrite).await?;

        let (vegetation, zones, shear, table) = tokio::try_join!(
            self.raster_port.read_grid(&request.vegetation),
            self.raster_port.read_grid(&request.zones),
            self.raster_port.read_grid(&request.shear),
            self.landscape_port
                .read_landscape(&request.landscape, settings.landscape_sheet.as_deref()),
        )?;
        self.log_port
            .debug(&format!(
                "Inputs loaded: {}x{} grid, {} vegetation codes",
                vegetation.header.ncols,
                vegetation.header.nrows,
                table.len()
            ))
            .await;

        let outcome =
            run_blocking(move || rules::succession(&vegetation, &zones, &shear, &table)).await?;

        self.raster_port
            .write_grid(&outcome.grid, &request.output, settings.overwrite)
            .await?;

        let summary = outcome.summary;
        if summary.unzoned_resets > 0 {
            self.log_port
                .warn(&format!(
                    "{} scoured cells have no zone and were set to NODATA",
                    summary.unzoned_resets
                ))
                .await;
        }
        self.log_port
            .info(&format!(
                "Succession completed: {} reset, {} aged. Output: {}",
                summary.reset_cells,
                summary.aged_cells,
                request.output.display()
            ))
            .await;

        Ok(SuccessionResponse {
            output: request.output,
            summary,
        })
    }
}

/// Response from a succession step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessionResponse {
    pub output: PathBuf,
    pub summary: SuccessionSummary,
}
