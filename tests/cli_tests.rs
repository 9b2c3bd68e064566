use std::path::Path;

use assert_cmd::Command;
use netcdf3::{DataSet, FileWriter, Version};
use predicates::prelude::*;
use tempfile::TempDir;

const GRID: &str = "ncols 3\nnrows 3\nxllcorner 0\nyllcorner 0\ncellsize 1\nNODATA_value -9999\n";

fn write_grid(dir: &Path, name: &str, rows: &str) {
    std::fs::write(dir.join(name), format!("{}{}\n", GRID, rows)).unwrap();
}

fn ripcas(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ripcas").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RIPCAS_CONFIG")
        .env_remove("RIPCAS_OVERWRITE")
        .env_remove("RIPCAS_LOG_LEVEL")
        .env("RUST_LOG", "error");
    cmd
}

fn succession_inputs(dir: &TempDir) {
    write_grid(dir.path(), "veg.asc", "1 1 1\n2 2 2\n1 2 1");
    write_grid(dir.path(), "zones.asc", "1 1 1\n1 1 1\n1 1 1");
    write_grid(dir.path(), "shear.asc", "0 0 0\n0 50 0\n0 0 0");
    std::fs::write(
        dir.path().join("landscape.csv"),
        "Code,shear_resis,n_val\n0,0,0.03\n1,10,0.035\n2,40,0.05\n3,4,0.04\n",
    )
    .unwrap();
}

/// Map file on a 5x5 lattice over [-1, 3]^2 with `taus = 10 x + 3`
fn write_map_nc(path: &Path) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut taus = Vec::new();
    for j in -1..=3 {
        for i in -1..=3 {
            x.push(i as f64);
            y.push(j as f64);
            taus.push(10.0 * i as f32 + 3.0);
        }
    }

    let mut data_set = DataSet::new();
    data_set.set_unlimited_dim("time", 1).unwrap();
    data_set.add_fixed_dim("nFlowElem", x.len()).unwrap();
    data_set.add_var_f64("FlowElem_xcc", &["nFlowElem"]).unwrap();
    data_set.add_var_f64("FlowElem_ycc", &["nFlowElem"]).unwrap();
    data_set.add_var_f32("taus", &["time", "nFlowElem"]).unwrap();

    let mut writer = FileWriter::open(path).unwrap();
    writer.set_def(&data_set, Version::Classic, 0).unwrap();
    writer.write_var_f64("FlowElem_xcc", &x).unwrap();
    writer.write_var_f64("FlowElem_ycc", &y).unwrap();
    writer.write_var_f32("taus", &taus).unwrap();
    writer.close().unwrap();
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    ripcas(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("succession"))
        .stdout(predicate::str::contains("couple"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    write_grid(dir.path(), "veg.asc", "0 1 2\n2 -9999 3\n3 3 1");

    ripcas(&dir)
        .args(["inspect", "--input", "veg.asc", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ncols\": 3"))
        .stdout(predicate::str::contains("\"NODATA_value\""));
}

#[test]
fn test_succession_writes_output() {
    let dir = TempDir::new().unwrap();
    succession_inputs(&dir);

    ripcas(&dir)
        .args([
            "succession",
            "--vegetation",
            "veg.asc",
            "--zones",
            "zones.asc",
            "--shear",
            "shear.asc",
            "--landscape",
            "landscape.csv",
            "--output",
            "out/veg_next.asc",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset by shear: 1"));

    let written = std::fs::read_to_string(dir.path().join("out/veg_next.asc")).unwrap();
    assert!(written.ends_with("2 2 2\n3 2 3\n2 3 2\n"));
}

#[test]
fn test_overwrite_never_refuses_existing_output() {
    let dir = TempDir::new().unwrap();
    succession_inputs(&dir);
    std::fs::write(dir.path().join("veg_next.asc"), "keep me").unwrap();

    ripcas(&dir)
        .args([
            "succession",
            "--vegetation",
            "veg.asc",
            "--zones",
            "zones.asc",
            "--shear",
            "shear.asc",
            "--landscape",
            "landscape.csv",
            "--output",
            "veg_next.asc",
            "--overwrite",
            "never",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(
        std::fs::read_to_string(dir.path().join("veg_next.asc")).unwrap(),
        "keep me"
    );
}

#[test]
fn test_couple_positional_form_uses_config_inputs() {
    let dir = TempDir::new().unwrap();
    let maps = dir.path().join("maps");
    std::fs::create_dir(&maps).unwrap();
    write_grid(&maps, "veg.asc", "1 1 1\n3 3 3\n2 2 2");
    write_grid(&maps, "zones.asc", "2 2 2\n2 2 2\n2 2 2");
    std::fs::write(
        maps.join("landscape.csv"),
        "Code,shear_resis,n_val\n0,0,0.03\n1,10,0.035\n2,40,0.05\n3,4,0.04\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("ripcas.toml"),
        "[inputs]\nvegetation = \"maps/veg.asc\"\nzones = \"maps/zones.asc\"\nlandscape = \"maps/landscape.csv\"\n",
    )
    .unwrap();
    write_map_nc(&dir.path().join("run_map.nc"));

    ripcas(&dir)
        .args(["couple", "run_map.nc", "veg_out.asc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("veg_out.asc"))
        .stdout(predicate::str::contains("Reset by shear: 4"));

    let written = std::fs::read_to_string(dir.path().join("veg_out.asc")).unwrap();
    assert!(written.ends_with("2 3 3\n4 3 3\n3 3 3\n"), "{}", written);
}

#[test]
fn test_couple_without_shear_input_fails() {
    let dir = TempDir::new().unwrap();

    ripcas(&dir)
        .arg("couple")
        .assert()
        .failure()
        .stderr(predicate::str::contains("D-FLOW output is required"));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_grid(dir.path(), "veg.asc", "1 1 1\n1 1 1\n1 1 1");

    ripcas(&dir)
        .args(["--log-level", "loud", "inspect", "--input", "veg.asc"])
        .assert()
        .failure();
}
