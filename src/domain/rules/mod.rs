// Domain rules - Vegetation succession and roughness conversion

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, trace};

use crate::domain::errors::DomainError;
use crate::domain::model::*;

#[cfg(test)]
mod tests;

/// Cell counts produced by one succession step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuccessionSummary {
    pub total_cells: usize,
    /// Cells with vegetation code 0, left untouched
    pub bare_cells: usize,
    /// Vegetated cells skipped because vegetation or shear is NODATA
    pub nodata_cells: usize,
    /// Cells whose vegetation was scoured and reset to the zone type
    pub reset_cells: usize,
    /// Cells aged by one step
    pub aged_cells: usize,
    /// Resets that landed on a NODATA zone and became NODATA
    pub unzoned_resets: usize,
}

/// Updated vegetation map together with its summary
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessionOutcome {
    pub grid: AsciiGrid,
    pub summary: SuccessionSummary,
}

/// Run one CASiMiR succession step.
///
/// Vegetation is reset to the zone's age-zero type wherever bed shear
/// exceeds the vegetation's shear resistance; every valid vegetated cell
/// then ages by one.
pub fn succession(
    vegetation: &AsciiGrid,
    zones: &AsciiGrid,
    shear: &AsciiGrid,
    table: &LandscapeTable,
) -> Result<SuccessionOutcome, DomainError> {
    ensure_same_shape("vegetation", vegetation, "zone", zones)?;
    ensure_same_shape("vegetation", vegetation, "shear", shear)?;
    ensure_codes_known(vegetation, table, false, |t, code| t.contains(code))?;

    let veg_nodata = vegetation.header.nodata_value;
    let mut out = vegetation.clone();
    let mut summary = SuccessionSummary {
        total_cells: vegetation.data.len(),
        ..Default::default()
    };

    for (idx, cell) in out.data.iter_mut().enumerate() {
        let veg_value = vegetation.data[idx];
        // NaN truncates to code 0, so NODATA is checked before bare ground
        if vegetation.is_nodata(veg_value) {
            summary.nodata_cells += 1;
            continue;
        }
        let code = to_code(veg_value);
        if code == 0 {
            summary.bare_cells += 1;
            continue;
        }

        let shear_value = shear.data[idx];
        if shear.is_nodata(shear_value) {
            summary.nodata_cells += 1;
            continue;
        }

        // Pre-check above guarantees the lookup
        let resistance = table.shear_resistance(code).ok_or_else(|| {
            DomainError::Internal(format!("code {} vanished from landscape table", code))
        })?;

        if shear_value > resistance {
            let zone_value = zones.data[idx];
            summary.reset_cells += 1;
            trace!(idx, code, shear = shear_value, resistance, zone = zone_value, "vegetation reset");
            if zones.is_nodata(zone_value) {
                summary.unzoned_resets += 1;
                *cell = veg_nodata;
                continue;
            }
            *cell = zone_value;
        }

        *cell += 1.0;
        summary.aged_cells += 1;
    }

    debug!(
        total = summary.total_cells,
        reset = summary.reset_cells,
        aged = summary.aged_cells,
        "succession step complete"
    );

    Ok(SuccessionOutcome { grid: out, summary })
}

/// Convert a vegetation map to a Manning n roughness map for D-FLOW
pub fn roughness(vegetation: &AsciiGrid, table: &LandscapeTable) -> Result<AsciiGrid, DomainError> {
    if !table.has_manning_n() {
        return Err(DomainError::MissingColumn("n_val".to_string()));
    }
    ensure_codes_known(vegetation, table, true, |t, code| t.manning_n(code).is_some())?;

    let data = vegetation
        .data
        .iter()
        .map(|&v| {
            if vegetation.is_nodata(v) {
                Ok(vegetation.header.nodata_value)
            } else {
                let code = to_code(v);
                table.manning_n(code).ok_or_else(|| {
                    DomainError::Internal(format!("code {} has no n_val", code))
                })
            }
        })
        .collect::<Result<Vec<f64>, DomainError>>()?;

    AsciiGrid::new(vegetation.header.clone(), data)
}

fn ensure_same_shape(
    left_name: &str,
    left: &AsciiGrid,
    right_name: &str,
    right: &AsciiGrid,
) -> Result<(), DomainError> {
    if left.header.same_shape(&right.header) {
        return Ok(());
    }
    Err(DomainError::GridMismatch(format!(
        "{} map is {}x{} but {} map is {}x{}",
        left_name,
        left.header.ncols,
        left.header.nrows,
        right_name,
        right.header.ncols,
        right.header.nrows
    )))
}

/// Every non-NODATA code must satisfy `known`; bare ground (code 0) only
/// when `include_bare` is set
fn ensure_codes_known<F>(
    grid: &AsciiGrid,
    table: &LandscapeTable,
    include_bare: bool,
    known: F,
) -> Result<(), DomainError>
where
    F: Fn(&LandscapeTable, i64) -> bool,
{
    let missing: BTreeSet<i64> = grid
        .data
        .iter()
        .filter(|&&v| !grid.is_nodata(v))
        .map(|&v| to_code(v))
        .filter(|&code| (include_bare || code != 0) && !known(table, code))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::MissingCodes(missing.into_iter().collect()))
    }
}
