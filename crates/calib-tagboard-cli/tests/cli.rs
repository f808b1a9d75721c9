use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const SMALL_CONFIG: &str = "\
apriltag:
  grid_x: 2
  grid_y: 2
  dpi: 50
boards:
  - name: Front
    start_id: 0
    end_id: 3
  - name: Back
    start_id: 4
    end_id: 7
";

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("boards.yaml");
    fs::write(&path, SMALL_CONFIG).expect("write config");
    path
}

fn cli() -> Command {
    Command::cargo_bin("calib-tagboard").expect("binary")
}

#[test]
fn generates_boards_from_config() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_config(tmp.path());
    let out = tmp.path().join("out");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("GENERATION COMPLETE!"))
        .stdout(predicate::str::contains("Generated 2 AprilTag calibration boards"));

    assert!(out.join("board_1_ids_0-3.png").is_file());
    assert!(out.join("board_2_ids_4-7.png").is_file());
    let sheet = fs::read_to_string(out.join("board_specifications.txt")).expect("sheet");
    assert!(sheet.contains("Grid Layout: 2 x 2 tags"));
    assert!(sheet.contains("Image Resolution: 50 DPI"));
}

#[test]
fn flags_override_config_values() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_config(tmp.path());
    let out = tmp.path().join("out");

    cli()
        .args(["-c"])
        .arg(&config)
        .args(["-o"])
        .arg(&out)
        .args(["--grid-x", "3", "--tag-size", "20", "--spacing", "5", "--dpi", "25"])
        .assert()
        .success();

    let sheet = fs::read_to_string(out.join("board_specifications.txt")).expect("sheet");
    assert!(sheet.contains("Grid Layout: 3 x 2 tags"));
    assert!(sheet.contains("Tag Size: 20mm x 20mm"));
    assert!(sheet.contains("Tag Spacing: 5mm (edge to edge)"));
    assert!(sheet.contains("Image Resolution: 25 DPI"));
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("out");

    cli()
        .arg("--config")
        .arg(tmp.path().join("absent.yaml"))
        .arg("--output")
        .arg(&out)
        .args(["--dpi", "20"])
        .assert()
        .success()
        .stderr(predicate::str::contains("not found, using defaults"));

    assert!(out.join("board_3_ids_98-146.png").is_file());
}

#[test]
fn invalid_override_exits_with_failure() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("out");

    cli()
        .arg("--config")
        .arg(tmp.path().join("absent.yaml"))
        .arg("--output")
        .arg(&out)
        .args(["--grid-x", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));

    assert!(!out.exists());
}

#[test]
fn inverted_range_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("bad.yaml");
    fs::write(&config, "boards:\n  - start_id: 9\n    end_id: 2\n").expect("write config");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(tmp.path().join("out"))
        .args(["--dpi", "20"])
        .assert()
        .failure();
}
