// Roughness interactor - Vegetation map to Manning n map

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::app::{ensure_inputs_exist, ensure_output_writable, run_blocking};
use crate::config_initialization::RunSettings;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules;
use crate::ports::*;

/// Interactor producing the D-FLOW roughness input
pub struct RoughnessInteractor {
    raster_port: Arc<dyn RasterPort>,
    landscape_port: Arc<dyn LandscapePort>,
    fs_port: Arc<dyn FsPort>,
    config_port: Arc<dyn ConfigPort>,
    log_port: Arc<dyn LogPort>,
}

impl RoughnessInteractor {
    /// Create new roughness interactor with injected ports
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

    pub async fn execute(&self, request: RoughnessRequest) -> Result<RoughnessResponse, DomainError> {
        let settings = RunSettings::resolve(self.config_port.as_ref()).await?;

        self.log_port
            .info(&format!(
                "Converting vegetation map to roughness: {}",
                request.vegetation.display()
            ))
            .await;

        ensure_inputs_exist(
            self.fs_port.as_ref(),
            &[
                ("vegetation", request.vegetation.as_path()),
                ("landscape", request.landscape.as_path()),
            ],
        )
        .await?;
        ensure_output_writable(self.fs_port.as_ref(), &request.output, settings.overwrite).await?;

        let (vegetation, table) = tokio::try_join!(
            self.raster_port.read_grid(&request.vegetation),
            self.landscape_port
                .read_landscape(&request.landscape, settings.landscape_sheet.as_deref()),
        )?;

        let grid = run_blocking(move || rules::roughness(&vegetation, &table)).await?;
        let stats = grid.stats();

        self.raster_port
            .write_grid(&grid, &request.output, settings.overwrite)
            .await?;

        self.log_port
            .info(&format!(
                "Roughness map written: {} valid cells. Output: {}",
                stats.valid_cells,
                request.output.display()
            ))
            .await;

        Ok(RoughnessResponse {
            output: request.output,
            valid_cells: stats.valid_cells,
            nodata_cells: stats.nodata_cells,
        })
    }
}

/// Response from a roughness conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoughnessResponse {
    pub output: PathBuf,
    pub valid_cells: usize,
    pub nodata_cells: usize,
}
