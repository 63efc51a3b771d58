//! Integration tests for the CQT CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a cqt command
fn cqt() -> Command {
    let mut cmd = Command::cargo_bin("cqt").unwrap();
    cmd.env("CQT_AUTHOR", "Test Lab").env_remove("CQT_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    cqt().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to create a batch, returning its lot number
fn create_test_batch(tmp: &TempDir, extra: &[&str]) -> String {
    let mut args = vec![
        "batch",
        "new",
        "--product-type",
        "Faïence 25x40 blanc",
        "--date",
        "2025-01-24",
        "--format",
        "id",
    ];
    args.extend_from_slice(extra);
    let output = cqt().current_dir(tmp.path()).args(&args).output().unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to record a sample, returning its ID
fn create_test_sample(tmp: &TempDir, batch: &str, stage: &str, readings: &[&str]) -> String {
    let mut args = vec![
        "sample", "new", "--batch", batch, "--stage", stage, "--date", "2025-01-24", "-f", "id",
    ];
    for reading in readings {
        args.push("--set");
        args.push(reading);
    }
    let output = cqt().current_dir(tmp.path()).args(&args).output().unwrap();
    assert!(
        output.status.success(),
        "sample new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn read_sample(tmp: &TempDir, id: &str) -> String {
    fs::read_to_string(tmp.path().join("samples").join(format!("{}.cqt.yaml", id))).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    cqt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ceramic Quality Toolkit"))
        .stdout(predicate::str::contains("sample"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn test_version_displays() {
    cqt()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cqt"));
}

#[test]
fn test_completions_bash() {
    cqt()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cqt"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    cqt()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized CQT project"));

    assert!(tmp.path().join(".cqt/config.yaml").exists());
    assert!(tmp.path().join("batches").is_dir());
    assert!(tmp.path().join("samples").is_dir());
    assert!(tmp.path().join("energy").is_dir());
    assert!(tmp.path().join("waste").is_dir());
    assert!(tmp.path().join("materials").is_dir());
    assert!(tmp.path().join("standards/catalog.yaml").exists());
}

#[test]
fn test_init_twice_reports_existing_project() {
    let tmp = setup_test_project();

    cqt()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    cqt()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized CQT project"));
}

#[test]
fn test_commands_fail_outside_project() {
    let tmp = TempDir::new().unwrap();

    cqt()
        .current_dir(tmp.path())
        .args(["sample", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a CQT project"));
}

// ============================================================================
// Batch Tests
// ============================================================================

#[test]
fn test_batch_ids_increment_per_date() {
    let tmp = setup_test_project();

    assert_eq!(create_test_batch(&tmp, &[]), "LOT20250124001");
    assert_eq!(create_test_batch(&tmp, &[]), "LOT20250124002");
    assert!(tmp.path().join("batches/LOT20250124001.cqt.yaml").exists());

    cqt()
        .current_dir(tmp.path())
        .args(["batch", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_batch_show_infers_format() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &["--length", "400", "--width", "250"]);

    cqt()
        .current_dir(tmp.path())
        .args(["batch", "show", &lot])
        .assert()
        .success()
        .stdout(predicate::str::contains("product_type: Faïence 25x40 blanc"))
        .stdout(predicate::str::contains("length: 400.0"))
        .stdout(predicate::str::contains("status: planned"));

    cqt()
        .current_dir(tmp.path())
        .args(["batch", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25x40"));
}

#[test]
fn test_batch_status_transitions() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);

    cqt()
        .current_dir(tmp.path())
        .args(["batch", "status", &lot, "approved"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status transition"));

    cqt()
        .current_dir(tmp.path())
        .args(["batch", "status", &lot, "in-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("planned → in_progress"));

    cqt()
        .current_dir(tmp.path())
        .args(["batch", "list", "--status", "in-progress", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

// ============================================================================
// Sample Tests
// ============================================================================

#[test]
fn test_clay_sample_scores_half() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);

    let id = create_test_sample(
        &tmp,
        &lot,
        "clay_testing",
        &["clay_humidity_hopper=3.0", "clay_humidity_silo=7,0"],
    );
    assert_eq!(id, "SAMP20250124001");

    let yaml = read_sample(&tmp, &id);
    assert!(yaml.contains("compliance_score: 50.0"));
    assert!(yaml.contains("result: fail"));
    assert!(yaml.contains("Silo humidity: NON CONFORME"));
    assert!(yaml.contains("evaluation_mode: automatic"));
}

#[test]
fn test_sample_new_prints_checks() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);

    cqt()
        .current_dir(tmp.path())
        .args([
            "sample",
            "new",
            "--batch",
            &lot,
            "--stage",
            "drying",
            "--set",
            "residual_humidity=0.8",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created sample"))
        .stdout(predicate::str::contains("Residual humidity: CONFORME"))
        .stdout(predicate::str::contains("100.0%"));
}

#[test]
fn test_water_absorption_sets_classification() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);

    let id = create_test_sample(&tmp, &lot, "water_absorption", &["water_absorption=12"]);
    let yaml = read_sample(&tmp, &id);
    assert!(yaml.contains("tile_classification: BIII"));
    assert!(yaml.contains("absorption_group: C"));
    assert!(yaml.contains("absorption_label: compliant"));
    assert!(yaml.contains("result: pass"));
}

#[test]
fn test_dimensional_uses_batch_nominal() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &["--length", "200"]);

    let id = create_test_sample(&tmp, &lot, "dimensional", &["length=202.5"]);
    let yaml = read_sample(&tmp, &id);
    assert!(yaml.contains("result: fail"));
    assert!(yaml.contains("compliance_score: 0.0"));
}

#[test]
fn test_breaking_strength_records_modulus() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);

    let id = create_test_sample(
        &tmp,
        &lot,
        "breaking_strength",
        &["breaking_force=1000", "length=300", "width=150", "thickness=10"],
    );
    let yaml = read_sample(&tmp, &id);
    assert!(yaml.contains("flexural_strength: 27.0"));
    assert!(!yaml.contains("breaking_strength:"));
    assert!(yaml.contains("result: pass"));
}

#[test]
fn test_unknown_field_is_rejected() {
    let tmp = setup_test_project();

    cqt()
        .current_dir(tmp.path())
        .args([
            "sample",
            "new",
            "--batch",
            "LOT20250124001",
            "--stage",
            "drying",
            "--set",
            "moisture=1.0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown sample field"));

    cqt()
        .current_dir(tmp.path())
        .args([
            "sample",
            "new",
            "--batch",
            "LOT20250124001",
            "--stage",
            "drying",
            "--set",
            "residual_humidity=wet",
        ])
        .assert()
        .failure();
}

#[test]
fn test_unknown_stage_is_rejected() {
    let tmp = setup_test_project();

    cqt()
        .current_dir(tmp.path())
        .args(["sample", "new", "--batch", "LOT20250124001", "--stage", "glazing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown test stage"));
}

#[test]
fn test_sample_without_readings_stays_pending() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);

    let id = create_test_sample(&tmp, &lot, "drying", &[]);
    let yaml = read_sample(&tmp, &id);
    assert!(!yaml.contains("result:"));
    assert!(!yaml.contains("compliance_score:"));

    cqt()
        .current_dir(tmp.path())
        .args(["sample", "list", "--result", "pending", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_manual_override_only_when_inconclusive() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);

    let pending = create_test_sample(&tmp, &lot, "surface_quality", &[]);
    cqt()
        .current_dir(tmp.path())
        .args(["sample", "override", &pending, "--result", "pass", "--score", "90"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded manual verdict"));

    let yaml = read_sample(&tmp, &pending);
    assert!(yaml.contains("result: pass"));
    assert!(yaml.contains("evaluation_mode: manual"));

    // Re-evaluation keeps the manual verdict while nothing can be checked
    cqt()
        .current_dir(tmp.path())
        .args(["sample", "eval", &pending])
        .assert()
        .success()
        .stdout(predicate::str::contains("keeps its manual verdict"));
    assert!(read_sample(&tmp, &pending).contains("evaluation_mode: manual"));

    let evaluated = create_test_sample(&tmp, &lot, "drying", &["residual_humidity=2.0"]);
    cqt()
        .current_dir(tmp.path())
        .args(["sample", "override", &evaluated, "--result", "pass"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already"));
}

#[test]
fn test_override_refused_for_unevaluated_readings() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);

    let output = cqt()
        .current_dir(tmp.path())
        .args([
            "sample", "new", "--batch", &lot, "--stage", "drying", "--set",
            "residual_humidity=2.0", "--no-eval", "-f", "id",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(!read_sample(&tmp, &id).contains("result:"));

    cqt()
        .current_dir(tmp.path())
        .args(["sample", "override", &id, "--result", "pass"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already"));
    assert!(!read_sample(&tmp, &id).contains("evaluation_mode: manual"));
}


#[test]
fn test_eval_is_idempotent() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);
    create_test_sample(&tmp, &lot, "glaze_testing", &["glaze_density=1800", "glaze_viscosity=55"]);
    create_test_sample(&tmp, &lot, "drying", &["residual_humidity=0.5"]);

    cqt()
        .current_dir(tmp.path())
        .args(["sample", "eval", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 record(s) updated"));
}

#[test]
fn test_set_re_evaluates() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);
    let id = create_test_sample(&tmp, &lot, "drying", &["residual_humidity=2.0"]);
    assert!(read_sample(&tmp, &id).contains("result: fail"));

    cqt()
        .current_dir(tmp.path())
        .args(["sample", "set", &id, "residual_humidity=0.4"])
        .assert()
        .success();
    assert!(read_sample(&tmp, &id).contains("result: pass"));
}

#[test]
fn test_sample_list_filters() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);
    create_test_sample(&tmp, &lot, "drying", &["residual_humidity=2.0"]);
    create_test_sample(&tmp, &lot, "drying", &["residual_humidity=0.5"]);
    create_test_sample(&tmp, &lot, "glaze_testing", &["glaze_density=1800"]);

    cqt()
        .current_dir(tmp.path())
        .args(["sample", "list", "--stage", "drying", "--count"])
        .assert()
        .success()
        .stdout("2\n");

    cqt()
        .current_dir(tmp.path())
        .args(["sample", "list", "--result", "fail", "-f", "id"])
        .assert()
        .success()
        .stdout("SAMP20250124001\n");
}

#[test]
fn test_sample_show_json() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);
    let id = create_test_sample(&tmp, &lot, "drying", &["residual_humidity=0.5"]);

    cqt()
        .current_dir(tmp.path())
        .args(["sample", "show", &id, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"test_stage\": \"drying\""))
        .stdout(predicate::str::contains("\"result\": \"pass\""));
}

// ============================================================================
// Utility Tests
// ============================================================================

#[test]
fn test_classify() {
    cqt()
        .args(["classify", "--absorption", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BIa"))
        .stdout(predicate::str::contains("group A"));

    cqt()
        .args(["classify", "--absorption", "4", "--method", "extruded", "-f", "id"])
        .assert()
        .success()
        .stdout("AIIb\n");
}

#[test]
fn test_flexural() {
    cqt()
        .args([
            "flexural",
            "--force",
            "1000",
            "--length",
            "300",
            "--width",
            "150",
            "--thickness",
            "10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("27.00 N/mm²"));

    cqt()
        .args([
            "flexural",
            "--force",
            "1000",
            "--length",
            "300",
            "--width",
            "150",
            "--thickness",
            "0",
        ])
        .assert()
        .failure();
}

#[test]
fn test_tolerances_without_project() {
    let tmp = TempDir::new().unwrap();

    cqt()
        .current_dir(tmp.path())
        .args(["tolerances", "--stage", "clay_testing", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Silo humidity\trange 5.30-6.30 %"));

    cqt()
        .current_dir(tmp.path())
        .args(["tolerances", "--stage", "pressing", "--tile-format", "25x40", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("range 6.80-7.40 mm"))
        .stdout(predicate::str::contains("'coeur noir'").not());
}

#[test]
fn test_standards_list() {
    let tmp = setup_test_project();

    cqt()
        .current_dir(tmp.path())
        .args(["standards", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ISO 10545-3"))
        .stdout(predicate::str::contains("NM 10.1.008"));

    cqt()
        .current_dir(tmp.path())
        .args(["standards", "show", "iso 10545-4", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"min_threshold\": 600.0"));
}

#[test]
fn test_catalog_row_overrides_builtin_bound() {
    let tmp = setup_test_project();
    let catalog = tmp.path().join("standards/catalog.yaml");
    let mut content = fs::read_to_string(&catalog).unwrap();
    content.push_str(
        "- code: LAB-01\n  title: Stricter drying limit\n  category: Internal\n  stage: drying\n  parameter: residual_humidity\n  max_threshold: 0.5\n  unit: '%'\n",
    );
    fs::write(&catalog, content).unwrap();

    let lot = create_test_batch(&tmp, &[]);
    let id = create_test_sample(&tmp, &lot, "drying", &["residual_humidity=0.8"]);
    assert!(read_sample(&tmp, &id).contains("result: fail"));
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_report_markdown_and_csv() {
    let tmp = setup_test_project();
    let lot = create_test_batch(&tmp, &[]);
    create_test_sample(&tmp, &lot, "drying", &["residual_humidity=2.0"]);
    create_test_sample(&tmp, &lot, "drying", &["residual_humidity=0.5"]);

    cqt()
        .current_dir(tmp.path())
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Quality Compliance Report"))
        .stdout(predicate::str::contains("## Recent Failures"))
        .stdout(predicate::str::contains("SAMP20250124001"))
        .stdout(predicate::str::contains("50.0%"));

    cqt()
        .current_dir(tmp.path())
        .args(["report", "--csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,batch,stage,result,score"))
        .stdout(predicate::str::contains("SAMP20250124002,LOT20250124001,drying,pass,100.0"));

    let out = tmp.path().join("report.md");
    cqt()
        .current_dir(tmp.path())
        .args(["report", "--output", out.to_str().unwrap()])
        .assert()
        .success();
    assert!(fs::read_to_string(out).unwrap().contains("## Summary by Stage"));
}

// ============================================================================
// Plant Resource Log Tests
// ============================================================================

#[test]
fn test_energy_new_and_list() {
    let tmp = setup_test_project();

    cqt()
        .current_dir(tmp.path())
        .args([
            "energy", "new", "--source", "gas", "--kwh", "1000", "--kiln", "K1",
            "--heat-recovery", "200", "--date", "2025-01-20",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded energy reading NRG20250120001"));

    cqt()
        .current_dir(tmp.path())
        .args([
            "energy", "new", "--source", "electricity", "--kwh", "500", "--date", "2025-01-24",
        ])
        .assert()
        .success();

    let yaml =
        fs::read_to_string(tmp.path().join("energy").join("NRG20250120001.cqt.yaml")).unwrap();
    assert!(yaml.contains("energy_source: gas"));
    assert!(yaml.contains("kiln_number: K1"));

    // Newest first
    cqt()
        .current_dir(tmp.path())
        .args(["energy", "list", "-f", "id"])
        .assert()
        .success()
        .stdout("NRG20250124001\nNRG20250120001\n");

    cqt()
        .current_dir(tmp.path())
        .args(["energy", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total 1500.0 kWh, net of recovery 1300.0 kWh"));

    cqt()
        .current_dir(tmp.path())
        .args(["energy", "list", "--kiln", "K1", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_energy_rejects_bad_values() {
    let tmp = setup_test_project();

    cqt()
        .current_dir(tmp.path())
        .args(["energy", "new", "--source", "coal", "--kwh", "10"])
        .assert()
        .failure();

    cqt()
        .current_dir(tmp.path())
        .args(["energy", "new", "--source", "gas", "--kwh", "10", "--efficiency", "140"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("efficiency_rating"));

    assert_eq!(fs::read_dir(tmp.path().join("energy")).unwrap().count(), 0);
}

#[test]
fn test_waste_new_and_list() {
    let tmp = setup_test_project();

    cqt()
        .current_dir(tmp.path())
        .args([
            "waste", "new", "--type", "solid", "--category", "fired rejects", "--kg", "400",
            "--disposal", "recycled", "--recycled", "75", "--date", "2025-01-24",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded waste WST20250124001"));

    cqt()
        .current_dir(tmp.path())
        .args([
            "waste", "new", "--type", "liquid", "--category", "glaze sludge", "--kg", "100",
            "--disposal", "disposed", "--date", "2025-01-24",
        ])
        .assert()
        .success();

    cqt()
        .current_dir(tmp.path())
        .args(["waste", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total 500.0 kg, recycled 300.0 kg"));

    cqt()
        .current_dir(tmp.path())
        .args(["waste", "list", "--disposal", "disposed", "-f", "id"])
        .assert()
        .success()
        .stdout("WST20250124002\n");

    cqt()
        .current_dir(tmp.path())
        .args([
            "waste", "new", "--type", "solid", "--category", "dust", "--kg", "5",
            "--disposal", "reused", "--recycled", "120",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0 and 100"));
}

#[test]
fn test_material_new_and_list() {
    let tmp = setup_test_project();

    cqt()
        .current_dir(tmp.path())
        .args([
            "material", "new", "--name", "Red clay", "--supplier", "Argiles du Sud",
            "--category", "clay", "--kg", "25000", "--unit-cost", "0.04",
            "--received", "2025-01-20", "--certified",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded material MAT20250120001"))
        .stdout(predicate::str::contains("Total cost: 1000.00"));

    cqt()
        .current_dir(tmp.path())
        .args([
            "material", "new", "--name", "Feldspar", "--supplier", "Minerals Co",
            "--category", "flux", "--kg", "8000", "--received", "2025-01-22",
        ])
        .assert()
        .success();

    cqt()
        .current_dir(tmp.path())
        .args(["material", "list", "--search", "sud", "-f", "id"])
        .assert()
        .success()
        .stdout("MAT20250120001\n");

    cqt()
        .current_dir(tmp.path())
        .args(["material", "list", "--category", "FLUX", "--count"])
        .assert()
        .success()
        .stdout("1\n");

    cqt()
        .current_dir(tmp.path())
        .args([
            "material", "new", "--name", "Frit", "--supplier", "Colorobbia", "--category",
            "frit", "--kg", "100", "--received", "2025-01-22", "--expires", "2025-01-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("before the receipt date"));
}
