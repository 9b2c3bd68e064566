// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// Input file not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Malformed grid or table content
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Grids that must share a shape do not
    #[error("Grid mismatch: {0}")]
    GridMismatch(String),

    /// Vegetation codes absent from the landscape table
    #[error("Vegetation codes missing from landscape table: {}", format_codes(.0))]
    MissingCodes(Vec<i64>),

    /// A required landscape table column is absent
    #[error("Landscape table has no '{0}' column")]
    MissingColumn(String),

    /// Landscape table could not be interpreted
    #[error("Landscape table error: {0}")]
    Landscape(String),

    /// D-FLOW mesh output could not be read
    #[error("Mesh error: {0}")]
    Mesh(String),

    /// Too few usable mesh points to triangulate
    #[error("Insufficient mesh: {0}")]
    InsufficientMesh(String),

    /// Output file exists and overwrite is disabled
    #[error("Output file already exists: {0}")]
    OutputExists(String),

    /// File system operation failed
    #[error("File system error: {0}")]
    FsFail(String),

    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_codes(codes: &[i64]) -> String {
    codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
