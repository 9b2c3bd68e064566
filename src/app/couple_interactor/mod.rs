// Couple interactor - One D-FLOW to RipCAS coupling step

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::app::{ensure_inputs_exist, ensure_output_writable, run_blocking};
use crate::config_initialization::RunSettings;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::regrid::regrid;
use crate::domain::rules::{self, SuccessionSummary};
use crate::ports::*;

/// Interactor for the coupled step: D-FLOW shear in, updated vegetation
/// (and optionally the next roughness map) out
pub struct CoupleInteractor {
    raster_port: Arc<dyn RasterPort>,
    mesh_port: Arc<dyn MeshPort>,
    landscape_port: Arc<dyn LandscapePort>,
    fs_port: Arc<dyn FsPort>,
    config_port: Arc<dyn ConfigPort>,
    log_port: Arc<dyn LogPort>,
}

/// Grids produced by the blocking part of the step
struct CoupledGrids {
    shear: AsciiGrid,
    vegetation: AsciiGrid,
    roughness: Option<AsciiGrid>,
    summary: SuccessionSummary,
}

impl CoupleInteractor {
    /// Create new couple interactor with injected ports
    pub fn new(
        raster_port: Arc<dyn RasterPort>,
        mesh_port: Arc<dyn MeshPort>,
        landscape_port: Arc<dyn LandscapePort>,
        fs_port: Arc<dyn FsPort>,
        config_port: Arc<dyn ConfigPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            raster_port,
            mesh_port,
            landscape_port,
            fs_port,
            config_port,
            log_port,
        }
    }

    /// Execute the coupled step.
    ///
    /// Nothing is written unless every grid has been computed.
    pub async fn execute(&self, request: CoupleRequest) -> Result<CoupleResponse, DomainError> {
        let settings = RunSettings::resolve(self.config_port.as_ref()).await?;

        self.log_port
            .info(&format!(
                "Starting coupled step with D-FLOW output: {}",
                request.shear_nc.display()
            ))
            .await;

        ensure_inputs_exist(
            self.fs_port.as_ref(),
            &[
                ("vegetation", request.vegetation.as_path()),
                ("zone", request.zones.as_path()),
                ("D-FLOW", request.shear_nc.as_path()),
                ("landscape", request.landscape.as_path()),
            ],
        )
        .await?;
        let outputs = std::iter::once(&request.output)
            .chain(request.shear_output.iter())
            .chain(request.roughness_output.iter());
        for output in outputs {
            ensure_output_writable(self.fs_port.as_ref(), output, settings.overwrite).await?;
        }

        let (vegetation, zones, mesh, table) = tokio::try_join!(
            self.raster_port.read_grid(&request.vegetation),
            self.raster_port.read_grid(&request.zones),
            self.mesh_port
                .read_shear_mesh(&request.shear_nc, &settings.mesh_variables),
            self.landscape_port
                .read_landscape(&request.landscape, settings.landscape_sheet.as_deref()),
        )?;

        let mesh_elements = mesh.len();
        let mesh_points = mesh.finite_count();
        self.log_port
            .info(&format!(
                "D-FLOW mesh: {} flow elements ({} usable), interpolation: {}",
                mesh_elements, mesh_points, request.interpolation
            ))
            .await;

        let method = request.interpolation;
        let want_roughness = request.roughness_output.is_some();
        let grids = run_blocking(move || {
            let shear = regrid(&mesh, &vegetation.header, method)?;
            let outcome = rules::succession(&vegetation, &zones, &shear, &table)?;
            let roughness = if want_roughness {
                Some(rules::roughness(&outcome.grid, &table)?)
            } else {
                None
            };
            Ok(CoupledGrids {
                shear,
                vegetation: outcome.grid,
                roughness,
                summary: outcome.summary,
            })
        })
        .await?;

        let shear_nodata = grids.shear.stats().nodata_cells;
        if shear_nodata > 0 {
            self.log_port
                .warn(&format!(
                    "{} grid cells lie outside the D-FLOW mesh and have no shear value",
                    shear_nodata
                ))
                .await;
        }

        if let Some(path) = &request.shear_output {
            self.raster_port
                .write_grid(&grids.shear, path, settings.overwrite)
                .await?;
        }
        self.raster_port
            .write_grid(&grids.vegetation, &request.output, settings.overwrite)
            .await?;
        if let (Some(path), Some(roughness)) = (&request.roughness_output, &grids.roughness) {
            self.raster_port
                .write_grid(roughness, path, settings.overwrite)
                .await?;
        }

        self.log_port
            .info(&format!(
                "Coupled step completed: {} reset, {} aged. Output: {}",
                grids.summary.reset_cells,
                grids.summary.aged_cells,
                request.output.display()
            ))
            .await;

        Ok(CoupleResponse {
            output: request.output,
            shear_output: request.shear_output,
            roughness_output: request.roughness_output,
            summary: grids.summary,
            mesh_elements,
            mesh_points,
            shear_nodata_cells: shear_nodata,
        })
    }
}

/// Response from a coupled step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoupleResponse {
    pub output: PathBuf,
    pub shear_output: Option<PathBuf>,
    pub roughness_output: Option<PathBuf>,
    pub summary: SuccessionSummary,
    /// Flow elements in the D-FLOW output
    pub mesh_elements: usize,
    /// Flow elements with a usable shear value
    pub mesh_points: usize,
    /// Grid cells outside the mesh hull
    pub shear_nodata_cells: usize,
}
