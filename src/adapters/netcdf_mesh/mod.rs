// NetCDF mesh adapter - Reads D-FLOW FM map output

use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use netcdf3::{DataType, DataVector, FileReader, Variable};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

const HDF5_MAGIC: [u8; 4] = *b"\x89HDF";
const CDF5_MAGIC: [u8; 4] = *b"CDF\x05";
const FILL_VALUE: &str = "_FillValue";

/// Reads flow element centres and bed shear stress from `*_map.nc`
#[derive(Debug, Default)]
pub struct NetcdfMeshAdapter;

impl NetcdfMeshAdapter {
    /// Create new mesh adapter
    pub fn new() -> Result<Self, DomainError> {
        Ok(Self)
    }

    /// Read the mesh from a classic or 64-bit offset NetCDF file
    pub fn read_mesh(path: &Path, variables: &MeshVariables) -> Result<ShearMesh, DomainError> {
        let file_len = Self::check_format(path)?;
        let mut reader = FileReader::open(path)
            .map_err(|e| DomainError::Mesh(format!("not a readable NetCDF file: {}", e)))?;

        let variables = Self::resolve_variables(&reader, variables)?;

        let x = Self::read_masked(&mut reader, &variables.x, file_len, false)?;
        let y = Self::read_masked(&mut reader, &variables.y, file_len, false)?;
        let shear = Self::read_masked(&mut reader, &variables.shear, file_len, true)?;

        let mesh = ShearMesh::new(x, y, shear)?;
        debug!(
            elements = mesh.len(),
            usable = mesh.finite_count(),
            shear = %variables.shear,
            "mesh read"
        );
        Ok(mesh)
    }

    /// Reject formats netcdf3 cannot parse and return the file length
    fn check_format(path: &Path) -> Result<u64, DomainError> {
        let open_err =
            |e: std::io::Error| DomainError::FsFail(format!("Failed to open {}: {}", path.display(), e));
        let mut file = std::fs::File::open(path).map_err(open_err)?;
        let file_len = file.metadata().map_err(open_err)?.len();

        let mut magic = [0u8; 4];
        let read = file.read(&mut magic).map_err(open_err)?;
        if read == magic.len() {
            if magic == HDF5_MAGIC {
                return Err(DomainError::Mesh(
                    "NetCDF-4 (HDF5) file; convert it with `nccopy -k classic` first".to_string(),
                ));
            }
            if magic == CDF5_MAGIC {
                return Err(DomainError::Mesh(
                    "CDF-5 file; convert it with `nccopy -k 64-bit offset` first".to_string(),
                ));
            }
        }
        Ok(file_len)
    }

    /// Pick the variable set present in the file
    fn resolve_variables(
        reader: &FileReader,
        requested: &MeshVariables,
    ) -> Result<MeshVariables, DomainError> {
        let data_set = reader.data_set();
        let present = |v: &MeshVariables| {
            data_set.has_var(&v.x) && data_set.has_var(&v.y) && data_set.has_var(&v.shear)
        };

        if present(requested) {
            return Ok(requested.clone());
        }
        if !requested.explicit {
            let ugrid = MeshVariables::ugrid();
            if present(&ugrid) {
                debug!("using UGRID mesh variable names");
                return Ok(ugrid);
            }
        }

        let missing: Vec<&str> = [&requested.x, &requested.y, &requested.shear]
            .into_iter()
            .filter(|name| !data_set.has_var(name))
            .map(String::as_str)
            .collect();
        Err(DomainError::Mesh(format!(
            "variables not found: {}",
            missing.join(", ")
        )))
    }

    /// Read a variable with its fill value replaced by NaN.
    ///
    /// With `last_slab` only the final output time is kept: the last record
    /// of a record variable, or the last slice along the leading dimension.
    fn read_masked(
        reader: &mut FileReader,
        name: &str,
        file_len: u64,
        last_slab: bool,
    ) -> Result<Vec<f64>, DomainError> {
        let (dims, data_type, record_var, fill) = {
            let var = reader
                .data_set()
                .get_var(name)
                .ok_or_else(|| DomainError::Mesh(format!("variable '{}' not found", name)))?;
            let dims: Vec<usize> = var.get_dims().iter().map(|d| d.size()).collect();
            (dims, var.data_type(), var.is_record_var(), fill_value(var))
        };
        check_declared_size(name, &dims, data_type, file_len)?;

        let read_err = |e: netcdf3::ReadError| {
            DomainError::Mesh(format!("failed to read '{}': {}", name, e))
        };
        let mut values = if last_slab && record_var {
            let records = reader.data_set().num_records().unwrap_or(0);
            if records == 0 {
                return Err(DomainError::Mesh(format!(
                    "variable '{}' has no output times",
                    name
                )));
            }
            to_f64(reader.read_record(name, records - 1).map_err(read_err)?)
        } else {
            to_f64(reader.read_var(name).map_err(read_err)?)
        };

        if last_slab && !record_var && dims.len() > 1 {
            let slab = values.len() / dims[0].max(1);
            values.drain(..values.len() - slab);
        }

        Ok(values
            .into_iter()
            .map(|v| if v == fill { f64::NAN } else { v })
            .collect())
    }
}

/// The header alone decides allocation sizes, so they are bounded by the file
fn check_declared_size(
    name: &str,
    dims: &[usize],
    data_type: DataType,
    file_len: u64,
) -> Result<(), DomainError> {
    let bytes = dims
        .iter()
        .try_fold(data_type.size_of(), |acc, &len| acc.checked_mul(len));
    match bytes {
        Some(bytes) if bytes as u64 <= file_len => Ok(()),
        Some(bytes) => Err(DomainError::Mesh(format!(
            "variable '{}' declares {} bytes but the file holds {}",
            name, bytes, file_len
        ))),
        None => Err(DomainError::Mesh(format!(
            "variable '{}' declares a size that overflows",
            name
        ))),
    }
}

fn fill_value(var: &Variable) -> f64 {
    fn first<T: Copy + Into<f64>>(values: Option<&[T]>, default: T) -> f64 {
        values
            .and_then(|v| v.first().copied())
            .unwrap_or(default)
            .into()
    }

    match var.data_type() {
        DataType::I8 => first(var.get_attr_i8(FILL_VALUE), netcdf3::NC_FILL_I8),
        DataType::U8 => first(var.get_attr_u8(FILL_VALUE), netcdf3::NC_FILL_U8),
        DataType::I16 => first(var.get_attr_i16(FILL_VALUE), netcdf3::NC_FILL_I16),
        DataType::I32 => first(var.get_attr_i32(FILL_VALUE), netcdf3::NC_FILL_I32),
        DataType::F32 => first(var.get_attr_f32(FILL_VALUE), netcdf3::NC_FILL_F32),
        DataType::F64 => first(var.get_attr_f64(FILL_VALUE), netcdf3::NC_FILL_F64),
    }
}

fn to_f64(data: DataVector) -> Vec<f64> {
    match data {
        DataVector::I8(v) => v.into_iter().map(f64::from).collect(),
        DataVector::U8(v) => v.into_iter().map(f64::from).collect(),
        DataVector::I16(v) => v.into_iter().map(f64::from).collect(),
        DataVector::I32(v) => v.into_iter().map(f64::from).collect(),
        DataVector::F32(v) => v.into_iter().map(f64::from).collect(),
        DataVector::F64(v) => v,
    }
}

#[async_trait]
impl MeshPort for NetcdfMeshAdapter {
    async fn read_shear_mesh(
        &self,
        path: &Path,
        variables: &MeshVariables,
    ) -> Result<ShearMesh, DomainError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(DomainError::FileNotFound(path.display().to_string()));
        }

        let owned_path = path.to_path_buf();
        let variables = variables.clone();
        let mesh = tokio::task::spawn_blocking(move || Self::read_mesh(&owned_path, &variables))
            .await
            .map_err(|e| DomainError::Internal(format!("mesh reader task failed: {}", e)))?
            .map_err(|e| match e {
                DomainError::Mesh(msg) => DomainError::Mesh(format!("{}: {}", path.display(), msg)),
                other => other,
            })?;

        info!(
            path = %path.display(),
            elements = mesh.len(),
            "D-FLOW shear stress loaded"
        );
        Ok(mesh)
    }
}
