// Unit tests for succession and roughness rules

use super::*;

fn grid(values: &[f64]) -> AsciiGrid {
    let header = GridHeader::new(3, 3, 0.0, 0.0, 1.0, DEFAULT_NODATA).unwrap();
    AsciiGrid::new(header, values.to_vec()).unwrap()
}

fn table() -> LandscapeTable {
    LandscapeTable::from_entries([
        LandscapeEntry { code: 1, shear_resistance: 1.0, manning_n: Some(0.03) },
        LandscapeEntry { code: 2, shear_resistance: 2.0, manning_n: Some(0.05) },
        LandscapeEntry { code: 3, shear_resistance: 4.0, manning_n: Some(0.08) },
    ])
}

const ND: f64 = DEFAULT_NODATA;

fn vegetation() -> AsciiGrid {
    grid(&[1.0, 2.0, 0.0, 3.0, ND, 1.0, 2.0, 2.0, 3.0])
}

fn zones() -> AsciiGrid {
    grid(&[1.0, 1.0, 1.0, 2.0, 2.0, 2.0, ND, 1.0, 1.0])
}

fn shear() -> AsciiGrid {
    grid(&[0.5, 3.0, 9.0, 2.0, 5.0, ND, 4.0, 0.1, 5.0])
}

#[test]
fn test_succession_resets_and_ages() {
    let outcome = succession(&vegetation(), &zones(), &shear(), &table()).unwrap();

    assert_eq!(
        outcome.grid.data,
        vec![2.0, 2.0, 0.0, 4.0, ND, 1.0, ND, 3.0, 2.0]
    );
    assert_eq!(outcome.grid.header, vegetation().header);
    assert_eq!(
        outcome.summary,
        SuccessionSummary {
            total_cells: 9,
            bare_cells: 1,
            nodata_cells: 2,
            reset_cells: 3,
            aged_cells: 5,
            unzoned_resets: 1,
        }
    );
}

#[test]
fn test_succession_shear_equal_to_resistance_survives() {
    let veg = grid(&[2.0; 9]);
    let zones = grid(&[7.0; 9]);
    let shear = grid(&[2.0; 9]);

    let outcome = succession(&veg, &zones, &shear, &table()).unwrap();
    assert!(outcome.grid.data.iter().all(|&v| v == 3.0));
    assert_eq!(outcome.summary.reset_cells, 0);
}

#[test]
fn test_succession_nan_vegetation_is_nodata_not_bare() {
    let mut values = [1.0; 9];
    values[4] = f64::NAN;
    let outcome = succession(&grid(&values), &zones(), &grid(&[0.0; 9]), &table()).unwrap();

    assert_eq!(outcome.summary.bare_cells, 0);
    assert_eq!(outcome.summary.nodata_cells, 1);
    assert_eq!(outcome.summary.aged_cells, 8);
    assert!(outcome.grid.data[4].is_nan());
}

#[test]
fn test_succession_rejects_unknown_codes() {
    let veg = grid(&[1.0, 9.0, 0.0, 5.0, ND, 1.0, 9.0, 2.0, 3.0]);
    let err = succession(&veg, &zones(), &shear(), &table()).unwrap_err();
    assert_eq!(err, DomainError::MissingCodes(vec![5, 9]));
}

#[test]
fn test_succession_rejects_shape_mismatch() {
    let header = GridHeader::new(9, 1, 0.0, 0.0, 1.0, ND).unwrap();
    let flat = AsciiGrid::new(header, vec![0.0; 9]).unwrap();

    let err = succession(&vegetation(), &zones(), &flat, &table()).unwrap_err();
    assert!(matches!(err, DomainError::GridMismatch(_)));
}

#[test]
fn test_succession_truncates_fractional_codes() {
    // 2.7 looks up code 2 but ages the stored value
    let veg = grid(&[2.7; 9]);
    let outcome = succession(&veg, &grid(&[1.0; 9]), &grid(&[0.0; 9]), &table()).unwrap();
    assert!((outcome.grid.data[0] - 3.7).abs() < 1e-12);
}

#[test]
fn test_roughness_maps_codes() {
    let veg = grid(&[1.0, 2.0, 3.0, ND, 1.0, 1.0, 2.0, 2.0, 3.0]);
    let n = roughness(&veg, &table()).unwrap();
    assert_eq!(n.data, vec![0.03, 0.05, 0.08, ND, 0.03, 0.03, 0.05, 0.05, 0.08]);
}

#[test]
fn test_roughness_requires_bare_ground_entry() {
    let err = roughness(&vegetation(), &table()).unwrap_err();
    assert_eq!(err, DomainError::MissingCodes(vec![0]));
}

#[test]
fn test_roughness_requires_n_val_column() {
    let table = LandscapeTable::from_entries([LandscapeEntry {
        code: 1,
        shear_resistance: 1.0,
        manning_n: None,
    }]);
    let err = roughness(&grid(&[1.0; 9]), &table).unwrap_err();
    assert_eq!(err, DomainError::MissingColumn("n_val".to_string()));
}
