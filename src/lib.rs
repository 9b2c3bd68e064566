//! RipCAS / D-FLOW coupling library
//!
//! Reads D-FLOW FM bed shear stress, runs the CASiMiR vegetation succession
//! rule on ESRI ASCII grids and writes the Manning roughness map D-FLOW
//! needs for its next run.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{AsciiGrid, GridHeader, LandscapeTable, ShearMesh};
pub use domain::regrid::regrid;
pub use domain::rules::{roughness, succession, SuccessionOutcome, SuccessionSummary};
