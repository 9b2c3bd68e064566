// Adapters - External system implementations

pub mod esri_ascii;
pub mod local_fs;
pub mod netcdf_mesh;
pub mod spreadsheet;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use esri_ascii::EsriAsciiAdapter;
pub use local_fs::LocalFsAdapter;
pub use netcdf_mesh::NetcdfMeshAdapter;
pub use spreadsheet::SpreadsheetAdapter;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::TracingLogAdapter;
