//! Setup sequence tests: step ordering, install-if-absent semantics and
//! fail-fast behavior, all against temporary workspaces.

use std::io::Write;
use std::path::Path;

use wellplan::bootstrap::{self, SetupError, StepStatus, Workspace};

const HEADER: &str = "name,cluster,field,layer,purpose,well_type,oil_rate,liq_rate,length,init_entry_date,depend_from_cluster,readiness_date";

fn write_wells(path: &Path, rows: &[&str]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
}

/// A config file pointing at the given dataset, everything else default.
fn write_config(path: &Path, wells_path: &Path) {
    let contents = format!(
        "[project]\nname = \"test project\"\n\n[data]\nwells_path = {:?}\n",
        wells_path.to_str().unwrap()
    );
    std::fs::write(path, contents).unwrap();
}

#[test]
fn workspace_and_config_are_created_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path().join(".wellplan"), dir.path().join("wellplan.toml"));

    // Setup may fail later (no dataset configured here), but the directory
    // and config steps run first and must leave their artifacts behind.
    let _ = bootstrap::run_setup(&workspace);

    assert!(workspace.root.is_dir());
    assert!(workspace.config_path.exists());
    assert!(workspace.is_initialized());
}

#[test]
fn existing_config_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let wells = dir.path().join("wells.csv");
    write_wells(&wells, &["W-1,K-1,Поле,Ю1,production,ГС,100,150,3000,,,"]);

    let workspace = Workspace::new(dir.path().join(".wellplan"), dir.path().join("wellplan.toml"));
    write_config(&workspace.config_path, &wells);
    let before = std::fs::read_to_string(&workspace.config_path).unwrap();

    let outcome = bootstrap::run_setup(&workspace).unwrap();

    assert_eq!(outcome.config_file, StepStatus::Present);
    assert_eq!(outcome.config.project.name, "test project");
    let after = std::fs::read_to_string(&workspace.config_path).unwrap();
    assert_eq!(before, after, "install step must skip an existing config");
}

#[test]
fn successful_setup_loads_wells_and_passes_self_check() {
    let dir = tempfile::tempdir().unwrap();
    let wells = dir.path().join("wells.csv");
    write_wells(
        &wells,
        &[
            "W-1,K-1,Поле,Ю1,production,ГС,100,150,3000,,,",
            "W-2,K-2,Поле,Ю1,production,ГС+ГРП,120,180,2500,,,",
        ],
    );

    let workspace = Workspace::new(dir.path().join(".wellplan"), dir.path().join("wellplan.toml"));
    write_config(&workspace.config_path, &wells);

    let outcome = bootstrap::run_setup(&workspace).unwrap();

    assert_eq!(outcome.workspace_dir, StepStatus::Installed);
    assert_eq!(outcome.wells.len(), 2);
    assert!(outcome.self_check_profit.is_finite());

    let banner = bootstrap::banner(&outcome);
    assert!(banner.contains("setup complete"));
    assert!(banner.contains("2 loaded"));
}

#[test]
fn missing_dataset_fails_as_a_dataset_error() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path().join(".wellplan"), dir.path().join("wellplan.toml"));
    write_config(&workspace.config_path, &dir.path().join("nowhere.csv"));

    let err = bootstrap::run_setup(&workspace).unwrap_err();
    // The dataset check runs before the engine self-check, so this must
    // surface as a Dataset failure naming the expected path.
    match err {
        SetupError::Dataset { path, .. } => {
            assert!(path.ends_with("nowhere.csv"));
        }
        other => panic!("expected Dataset error, got {other:?}"),
    }
}

#[test]
fn broken_engine_config_fails_as_a_self_check_error() {
    let dir = tempfile::tempdir().unwrap();
    let wells = dir.path().join("wells.csv");
    write_wells(&wells, &["W-1,K-1,Поле,Ю1,production,ГС,100,150,3000,,,"]);

    let workspace = Workspace::new(dir.path().join(".wellplan"), dir.path().join("wellplan.toml"));
    // No build cost table at all: the dataset loads fine, but the one-well
    // compile cannot price the well.
    let contents = format!(
        "[data]\nwells_path = {:?}\n\n[economics]\nbuild_cost_per_metre = {{}}\n",
        wells.to_str().unwrap()
    );
    std::fs::write(&workspace.config_path, contents).unwrap();

    let err = bootstrap::run_setup(&workspace).unwrap_err();
    assert!(matches!(err, SetupError::SelfCheck(_)), "got {err:?}");
}

#[test]
fn invalid_config_file_aborts_setup() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path().join(".wellplan"), dir.path().join("wellplan.toml"));
    std::fs::write(&workspace.config_path, "[project]\nhorizon_years = 0\n").unwrap();

    let err = bootstrap::run_setup(&workspace).unwrap_err();
    assert!(matches!(err, SetupError::Config(_)), "got {err:?}");
}
