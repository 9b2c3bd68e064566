// Application layer - Use case interactors

use std::path::Path;

use crate::domain::errors::DomainError;
use crate::domain::model::OverwritePolicy;
use crate::ports::FsPort;

pub mod container;
pub mod couple_interactor;
pub mod inspect_interactor;
pub mod roughness_interactor;
pub mod shear_grid_interactor;
pub mod succession_interactor;

// Re-export interactors
pub use couple_interactor::{CoupleInteractor, CoupleResponse};
pub use inspect_interactor::{InspectInteractor, InspectResponse};
pub use roughness_interactor::{RoughnessInteractor, RoughnessResponse};
pub use shear_grid_interactor::{ShearGridInteractor, ShearGridResponse};
pub use succession_interactor::{SuccessionInteractor, SuccessionResponse};

/// Fail with `FileNotFound` for the first missing input
pub(crate) async fn ensure_inputs_exist(
    fs_port: &dyn FsPort,
    inputs: &[(&str, &Path)],
) -> Result<(), DomainError> {
    for (label, path) in inputs {
        if !fs_port.file_exists(path).await? {
            return Err(DomainError::FileNotFound(format!(
                "{} input {}",
                label,
                path.display()
            )));
        }
    }
    Ok(())
}

/// Refuse to start when an output exists and overwriting is off
pub(crate) async fn ensure_output_writable(
    fs_port: &dyn FsPort,
    output: &Path,
    overwrite: OverwritePolicy,
) -> Result<(), DomainError> {
    if overwrite == OverwritePolicy::Never
        && fs_port.file_exists(output).await?
    {
        return Err(DomainError::OutputExists(output.display().to_string()));
    }
    fs_port.ensure_parent_dir(output).await
}

/// Run CPU-bound work on the blocking pool
pub(crate) async fn run_blocking<F, T>(task: F) -> Result<T, DomainError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| DomainError::Internal(format!("worker task failed: {}", e)))?
}
