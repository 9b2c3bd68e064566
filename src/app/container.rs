use std::sync::Arc;

use crate::adapters::{
    EsriAsciiAdapter, LocalFsAdapter, NetcdfMeshAdapter, SpreadsheetAdapter, TomlConfigAdapter,
    TracingLogAdapter,
};
use crate::app::{
    CoupleInteractor, InspectInteractor, RoughnessInteractor, ShearGridInteractor,
    SuccessionInteractor,
};
use crate::domain::errors::DomainError;
use crate::ports::{ConfigPort, FsPort, LandscapePort, LogPort, MeshPort, RasterPort};

pub trait AppContainer: Send + Sync {
    fn config_port(&self) -> Arc<dyn ConfigPort>;
    fn succession_interactor(&self) -> Arc<SuccessionInteractor>;
    fn couple_interactor(&self) -> Arc<CoupleInteractor>;
    fn shear_grid_interactor(&self) -> Arc<ShearGridInteractor>;
    fn roughness_interactor(&self) -> Arc<RoughnessInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    config_port: Arc<dyn ConfigPort>,
    succession_interactor: Arc<SuccessionInteractor>,
    couple_interactor: Arc<CoupleInteractor>,
    shear_grid_interactor: Arc<ShearGridInteractor>,
    roughness_interactor: Arc<RoughnessInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    pub fn new() -> Result<Self, DomainError> {
        let raster_port = Arc::new(EsriAsciiAdapter::new()?);
        let mesh_port = Arc::new(NetcdfMeshAdapter::new()?);
        let landscape_port = Arc::new(SpreadsheetAdapter::new()?);
        let fs_port = Arc::new(LocalFsAdapter::new()?);
        let config_port = Arc::new(TomlConfigAdapter::new()?);
        let log_port = Arc::new(TracingLogAdapter::new()?);

        let succession_interactor = Arc::new(SuccessionInteractor::new(
            Arc::clone(&raster_port) as Arc<dyn RasterPort>,
            Arc::clone(&landscape_port) as Arc<dyn LandscapePort>,
            Arc::clone(&fs_port) as Arc<dyn FsPort>,
            Arc::clone(&config_port) as Arc<dyn ConfigPort>,
            Arc::clone(&log_port) as Arc<dyn LogPort>,
        ));

        let couple_interactor = Arc::new(CoupleInteractor::new(
            Arc::clone(&raster_port) as Arc<dyn RasterPort>,
            Arc::clone(&mesh_port) as Arc<dyn MeshPort>,
            Arc::clone(&landscape_port) as Arc<dyn LandscapePort>,
            Arc::clone(&fs_port) as Arc<dyn FsPort>,
            Arc::clone(&config_port) as Arc<dyn ConfigPort>,
            Arc::clone(&log_port) as Arc<dyn LogPort>,
        ));

        let shear_grid_interactor = Arc::new(ShearGridInteractor::new(
            Arc::clone(&raster_port) as Arc<dyn RasterPort>,
            Arc::clone(&mesh_port) as Arc<dyn MeshPort>,
            Arc::clone(&fs_port) as Arc<dyn FsPort>,
            Arc::clone(&config_port) as Arc<dyn ConfigPort>,
            Arc::clone(&log_port) as Arc<dyn LogPort>,
        ));

        let roughness_interactor = Arc::new(RoughnessInteractor::new(
            Arc::clone(&raster_port) as Arc<dyn RasterPort>,
            Arc::clone(&landscape_port) as Arc<dyn LandscapePort>,
            Arc::clone(&fs_port) as Arc<dyn FsPort>,
            Arc::clone(&config_port) as Arc<dyn ConfigPort>,
            Arc::clone(&log_port) as Arc<dyn LogPort>,
        ));

        let inspect_interactor = Arc::new(InspectInteractor::new(
            Arc::clone(&raster_port) as Arc<dyn RasterPort>,
            Arc::clone(&fs_port) as Arc<dyn FsPort>,
            Arc::clone(&log_port) as Arc<dyn LogPort>,
        ));

        Ok(Self {
            config_port,
            succession_interactor,
            couple_interactor,
            shear_grid_interactor,
            roughness_interactor,
            inspect_interactor,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn config_port(&self) -> Arc<dyn ConfigPort> {
        Arc::clone(&self.config_port)
    }

    fn succession_interactor(&self) -> Arc<SuccessionInteractor> {
        Arc::clone(&self.succession_interactor)
    }

    fn couple_interactor(&self) -> Arc<CoupleInteractor> {
        Arc::clone(&self.couple_interactor)
    }

    fn shear_grid_interactor(&self) -> Arc<ShearGridInteractor> {
        Arc::clone(&self.shear_grid_interactor)
    }

    fn roughness_interactor(&self) -> Arc<RoughnessInteractor> {
        Arc::clone(&self.roughness_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}
