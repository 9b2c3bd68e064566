// Inspect interactor - Orchestrates grid inspection use case

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::app::ensure_inputs_exist;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Interactor for grid inspection use case
pub struct InspectInteractor {
    raster_port: Arc<dyn RasterPort>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(
        raster_port: Arc<dyn RasterPort>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            raster_port,
            fs_port,
            log_port,
        }
    }

    /// Read a grid and summarise it
    pub async fn execute(&self, request: InspectRequest) -> Result<InspectResponse, DomainError> {
        self.log_port
            .info(&format!("Inspecting grid: {}", request.input.display()))
            .await;

        ensure_inputs_exist(self.fs_port.as_ref(), &[("grid", request.input.as_path())]).await?;

        let grid = self.raster_port.read_grid(&request.input).await?;
        let stats = grid.stats();
        if stats.valid_cells == 0 {
            self.log_port.warn("Grid contains only NODATA cells").await;
        }

        self.log_port
            .debug(&format!(
                "Grid inspected: {} valid, {} NODATA",
                stats.valid_cells, stats.nodata_cells
            ))
            .await;

        Ok(InspectResponse {
            file: request.input,
            header: grid.header,
            stats,
        })
    }
}

/// Response from grid inspection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectResponse {
    pub file: PathBuf,
    pub header: GridHeader,
    pub stats: GridStats,
}

impl InspectResponse {
    /// Format as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DomainError::Internal(format!("JSON serialization failed: {}", e)))
    }

    /// Format as human-readable text
    pub fn to_text(&self) -> String {
        let h = &self.header;
        let s = &self.stats;
        let mut output = String::new();

        let _ = writeln!(output, "Grid: {}", self.file.display());
        let _ = writeln!(output, "  Size: {} cols x {} rows", h.ncols, h.nrows);
        let _ = writeln!(output, "  Lower-left corner: ({}, {})", h.xllcorner, h.yllcorner);
        let _ = writeln!(output, "  Cell size: {}", h.cellsize);
        let _ = writeln!(output, "  NODATA value: {}", h.nodata_value);
        let _ = writeln!(output, "  Valid cells: {}", s.valid_cells);
        let _ = writeln!(output, "  NODATA cells: {}", s.nodata_cells);

        if let (Some(min), Some(max), Some(mean)) = (s.min, s.max, s.mean) {
            let _ = writeln!(output, "  Range: {} .. {} (mean {:.4})", min, max, mean);
        }
        if !s.distinct_values.is_empty() {
            let codes: Vec<String> = s.distinct_values.iter().map(|c| c.to_string()).collect();
            let more = if s.distinct_truncated { ", ..." } else { "" };
            let _ = writeln!(output, "  Integral values: {}{}", codes.join(", "), more);
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> InspectResponse {
        let header = GridHeader::new(2, 1, 10.0, 20.0, 5.0, DEFAULT_NODATA).unwrap();
        let grid = AsciiGrid::new(header, vec![3.0, -9999.0]).unwrap();
        InspectResponse {
            file: PathBuf::from("veg.asc"),
            stats: grid.stats(),
            header: grid.header,
        }
    }

    #[test]
    fn test_text_summary() {
        let text = response().to_text();
        assert!(text.contains("Size: 2 cols x 1 rows"));
        assert!(text.contains("NODATA cells: 1"));
        assert!(text.contains("Integral values: 3"));
    }

    #[test]
    fn test_json_uses_esri_header_names() {
        let json: serde_json::Value = serde_json::from_str(&response().to_json().unwrap()).unwrap();
        assert_eq!(json["header"]["ncols"], 2);
        assert_eq!(json["header"]["NODATA_value"], -9999.0);
        assert_eq!(json["stats"]["valid_cells"], 1);
    }
}
