// Shear grid interactor - D-FLOW mesh output to an ESRI grid

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::app::{ensure_inputs_exist, ensure_output_writable, run_blocking};
use crate::config_initialization::RunSettings;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::regrid::regrid;
use crate::ports::*;

/// Interactor converting bed shear stress to a grid matching a template
pub struct ShearGridInteractor {
    raster_port: Arc<dyn RasterPort>,
    mesh_port: Arc<dyn MeshPort>,
    fs_port: Arc<dyn FsPort>,
    config_port: Arc<dyn ConfigPort>,
    log_port: Arc<dyn LogPort>,
}

impl ShearGridInteractor {
    /// Create new shear grid interactor with injected ports
    pub fn new(
        raster_port: Arc<dyn RasterPort>,
        mesh_port: Arc<dyn MeshPort>,
        fs_port: Arc<dyn FsPort>,
        config_port: Arc<dyn ConfigPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            raster_port,
            mesh_port,
            fs_port,
            config_port,
            log_port,
        }
    }

    /// Execute the conversion; the template supplies the grid header only
    pub async fn execute(&self, request: ShearGridRequest) -> Result<ShearGridResponse, DomainError> {
        let settings = RunSettings::resolve(self.config_port.as_ref()).await?;

        self.log_port
            .info(&format!(
                "Gridding bed shear stress from: {}",
                request.shear_nc.display()
            ))
            .await;

        ensure_inputs_exist(
            self.fs_port.as_ref(),
            &[
                ("D-FLOW", request.shear_nc.as_path()),
                ("template", request.template.as_path()),
            ],
        )
        .await?;
        ensure_output_writable(self.fs_port.as_ref(), &request.output, settings.overwrite).await?;

        let (template, mesh) = tokio::try_join!(
            self.raster_port.read_grid(&request.template),
            self.mesh_port
                .read_shear_mesh(&request.shear_nc, &settings.mesh_variables),
        )?;
        let mesh_elements = mesh.len();

        let method = request.interpolation;
        let header = template.header;
        let grid = run_blocking(move || regrid(&mesh, &header, method)).await?;
        let stats = grid.stats();

        self.raster_port
            .write_grid(&grid, &request.output, settings.overwrite)
            .await?;

        self.log_port
            .info(&format!(
                "Shear grid written: {} cells, {} outside the mesh. Output: {}",
                grid.data.len(),
                stats.nodata_cells,
                request.output.display()
            ))
            .await;

        Ok(ShearGridResponse {
            output: request.output,
            mesh_elements,
            cells: grid.data.len(),
            nodata_cells: stats.nodata_cells,
            max_shear: stats.max,
        })
    }
}

/// Response from a shear grid conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShearGridResponse {
    pub output: PathBuf,
    pub mesh_elements: usize,
    pub cells: usize,
    pub nodata_cells: usize,
    pub max_shear: Option<f64>,
}
