use std::path::{Path, PathBuf};

use ripcas_dflow::app::container::{AppContainer, DefaultAppContainer};
use ripcas_dflow::domain::model::*;
use ripcas_dflow::DomainError;
use netcdf3::{DataSet, FileWriter, Version};
use tempfile::TempDir;

/// Fixture builders for grids, landscape tables and D-FLOW output
mod test_utils {
    use super::*;

    pub const HEADER_3X3: &str =
        "ncols 3\nnrows 3\nxllcorner 0\nyllcorner 0\ncellsize 1\nNODATA_value -9999\n";

    pub fn write_grid(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("{}{}\n", HEADER_3X3, rows.join("\n"))).unwrap();
        path
    }

    /// Codes 0-4 with shear resistance and Manning n
    pub fn write_landscape_csv(dir: &Path) -> PathBuf {
        let path = dir.join("landscape.csv");
        std::fs::write(
            &path,
            "Code,shear_resis,n_val\n0,0,0.03\n1,10,0.035\n2,40,0.05\n3,4,0.04\n4,60,0.08\n",
        )
        .unwrap();
        path
    }

    /// D-FLOW-like map file on a 5x5 lattice over [-1, 3]^2.
    ///
    /// The first output time has 999 everywhere; the last one carries
    /// `taus = 10 x + 3`, with one fill value far from the grid.
    pub fn write_map_nc(dir: &Path) -> PathBuf {
        let path = dir.join("run_map.nc");
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut last = Vec::new();
        for j in -1..=3 {
            for i in -1..=3 {
                x.push(i as f64);
                y.push(j as f64);
                last.push(10.0 * i as f32 + 3.0);
            }
        }
        last[0] = -999.0;

        let mut taus = vec![999.0f32; x.len()];
        taus.extend(last);

        let mut data_set = DataSet::new();
        data_set.set_unlimited_dim("time", 2).unwrap();
        data_set.add_fixed_dim("nFlowElem", x.len()).unwrap();
        data_set.add_var_f64("FlowElem_xcc", &["nFlowElem"]).unwrap();
        data_set.add_var_f64("FlowElem_ycc", &["nFlowElem"]).unwrap();
        data_set.add_var_f64("time", &["time"]).unwrap();
        data_set.add_var_f32("taus", &["time", "nFlowElem"]).unwrap();
        data_set
            .add_var_attr_f32("taus", "_FillValue", vec![-999.0])
            .unwrap();

        let mut writer = FileWriter::open(&path).unwrap();
        writer.set_def(&data_set, Version::Classic, 0).unwrap();
        writer.write_var_f64("FlowElem_xcc", &x).unwrap();
        writer.write_var_f64("FlowElem_ycc", &y).unwrap();
        writer.write_var_f64("time", &[0.0, 86400.0]).unwrap();
        writer.write_var_f32("taus", &taus).unwrap();
        writer.close().unwrap();
        path
    }

    pub fn read_values(path: &Path) -> Vec<f64> {
        AsciiGrid::parse(&std::fs::read_to_string(path).unwrap())
            .unwrap()
            .data
    }
}

use test_utils::*;

#[tokio::test]
async fn test_couple_writes_vegetation_shear_and_roughness() {
    let dir = TempDir::new().unwrap();
    let veg = write_grid(dir.path(), "veg.asc", &["1 1 1", "3 3 3", "2 2 2"]);
    let zones = write_grid(dir.path(), "zones.asc", &["2 2 2", "2 2 2", "2 2 2"]);
    let landscape = write_landscape_csv(dir.path());
    let shear_nc = write_map_nc(dir.path());
    let output = dir.path().join("veg_next.asc");
    let shear_output = dir.path().join("shear.asc");
    let roughness_output = dir.path().join("n.asc");

    let container = DefaultAppContainer::new().unwrap();
    let response = container
        .couple_interactor()
        .execute(CoupleRequest {
            vegetation: veg,
            zones,
            shear_nc,
            landscape,
            output: output.clone(),
            shear_output: Some(shear_output.clone()),
            roughness_output: Some(roughness_output.clone()),
            interpolation: InterpolationMethod::Linear,
        })
        .await
        .unwrap();

    assert_eq!(response.mesh_elements, 25);
    assert_eq!(response.mesh_points, 24);
    assert_eq!(response.shear_nodata_cells, 0);
    assert_eq!(response.summary.reset_cells, 4);
    assert_eq!(response.summary.aged_cells, 9);

    // Column shear is 3, 13, 23
    let shear = read_values(&shear_output);
    for (value, expected) in shear.iter().zip([3.0, 13.0, 23.0].iter().cycle()) {
        assert!((value - expected).abs() < 1e-6, "{} != {}", value, expected);
    }

    assert_eq!(
        read_values(&output),
        vec![2.0, 3.0, 3.0, 4.0, 3.0, 3.0, 3.0, 3.0, 3.0]
    );
    assert_eq!(
        read_values(&roughness_output),
        vec![0.05, 0.04, 0.04, 0.08, 0.04, 0.04, 0.04, 0.04, 0.04]
    );
}

#[tokio::test]
async fn test_missing_code_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    let veg = write_grid(dir.path(), "veg.asc", &["1 9 1", "3 3 3", "2 2 7"]);
    let zones = write_grid(dir.path(), "zones.asc", &["2 2 2", "2 2 2", "2 2 2"]);
    let shear = write_grid(dir.path(), "shear.asc", &["0 0 0", "0 0 0", "0 0 0"]);
    let landscape = write_landscape_csv(dir.path());
    let output = dir.path().join("veg_next.asc");

    let container = DefaultAppContainer::new().unwrap();
    let err = container
        .succession_interactor()
        .execute(SuccessionRequest {
            vegetation: veg,
            zones,
            shear,
            landscape,
            output: output.clone(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::MissingCodes(vec![7, 9]));
    assert!(err.to_string().contains("7, 9"));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_overwrite_never_from_config() {
    let dir = TempDir::new().unwrap();
    let veg = write_grid(dir.path(), "veg.asc", &["1 1 1", "1 1 1", "1 1 1"]);
    let landscape = write_landscape_csv(dir.path());
    let output = dir.path().join("n.asc");
    std::fs::write(&output, "keep me").unwrap();

    let container = DefaultAppContainer::new().unwrap();
    container
        .config_port()
        .set_config("output.overwrite", "never")
        .await
        .unwrap();

    let err = container
        .roughness_interactor()
        .execute(RoughnessRequest {
            vegetation: veg,
            landscape,
            output: output.clone(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::OutputExists(_)));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");
}

#[tokio::test]
async fn test_roughness_requires_n_val() {
    let dir = TempDir::new().unwrap();
    let veg = write_grid(dir.path(), "veg.asc", &["0 1 1", "1 1 1", "1 1 -9999"]);
    let landscape = dir.path().join("no_n.csv");
    std::fs::write(&landscape, "Code,shear_resis\n0,0\n1,10\n").unwrap();

    let container = DefaultAppContainer::new().unwrap();
    let err = container
        .roughness_interactor()
        .execute(RoughnessRequest {
            vegetation: veg.clone(),
            landscape,
            output: dir.path().join("n.asc"),
        })
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::MissingColumn("n_val".to_string()));

    let response = container
        .roughness_interactor()
        .execute(RoughnessRequest {
            vegetation: veg,
            landscape: write_landscape_csv(dir.path()),
            output: dir.path().join("n.asc"),
        })
        .await
        .unwrap();
    assert_eq!(response.valid_cells, 8);
    assert_eq!(response.nodata_cells, 1);
}

#[tokio::test]
async fn test_shear_grid_marks_nodes_outside_mesh() {
    let dir = TempDir::new().unwrap();
    let shear_nc = write_map_nc(dir.path());
    let template = dir.path().join("template.asc");
    // Nodes at x = 1.5, 2.5, 3.5; the last lies outside the mesh
    std::fs::write(
        &template,
        "ncols 3\nnrows 1\nxllcorner 1.5\nyllcorner 0.5\ncellsize 1\nNODATA_value -1\n0 0 0\n",
    )
    .unwrap();
    let output = dir.path().join("shear.asc");

    let container = DefaultAppContainer::new().unwrap();
    let response = container
        .shear_grid_interactor()
        .execute(ShearGridRequest {
            shear_nc,
            template,
            output: output.clone(),
            interpolation: InterpolationMethod::Natural,
        })
        .await
        .unwrap();

    assert_eq!(response.cells, 3);
    assert_eq!(response.nodata_cells, 1);
    let values = read_values(&output);
    // Natural neighbour interpolation reproduces the linear field
    assert!((values[0] - 18.0).abs() < 1e-6);
    assert!((values[1] - 28.0).abs() < 1e-6);
    assert_eq!(values[2], -1.0);
}

#[tokio::test]
async fn test_missing_input_is_reported() {
    let dir = TempDir::new().unwrap();
    let container = DefaultAppContainer::new().unwrap();

    let err = container
        .inspect_interactor()
        .execute(InspectRequest {
            input: dir.path().join("absent.asc"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::FileNotFound(msg) if msg.contains("absent.asc")));
}

#[tokio::test]
async fn test_inspect_reports_stats() {
    let dir = TempDir::new().unwrap();
    let veg = write_grid(dir.path(), "veg.asc", &["0 1 2", "2 -9999 3", "3 3 1"]);

    let container = DefaultAppContainer::new().unwrap();
    let response = container
        .inspect_interactor()
        .execute(InspectRequest { input: veg })
        .await
        .unwrap();

    assert_eq!(response.header.ncols, 3);
    assert_eq!(response.stats.valid_cells, 8);
    assert_eq!(response.stats.nodata_cells, 1);
    assert_eq!(response.stats.distinct_values, vec![0, 1, 2, 3]);
    assert_eq!(response.stats.max, Some(3.0));
}
