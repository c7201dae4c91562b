// End-to-end tests for the namematch binary: exit codes, output files, --json contract.
//
// Run with: cargo test -p namematch-cli --test run_tests -- --nocapture

use std::path::Path;
use std::process::{Command, Output};

fn namematch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_namematch"));
    cmd.env_remove("NAMEMATCH_CONFIG");
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    namematch().current_dir(dir).args(args).output().expect("run namematch")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const STAFF_CSV: &str = "\
источник;Фамилия;Имя;Отчество;Отдел
ЗУП;Иванов;Иван;Иванович;Бухгалтерия
ЗУП;Петров;Пётр;;Склад
ЗУП;;;;Склад
портал;иванов;иван;иванович;Бухгалтерия
портал;Петрова;Пётр;;Склад
портал;Волков;Алексей;;ИТ
";

fn write_input(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

// ===========================================================================
// run
// ===========================================================================

#[test]
fn run_writes_default_xlsx_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);

    let output = run_in(dir.path(), &["run", &input]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let written = dir.path().join("staff_результат.xlsx");
    assert!(written.exists());
    assert!(stderr(&output).contains("ЗУП: 3 rows, портал: 3 rows"));
}

#[test]
fn run_csv_output_has_result_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);
    let out = dir.path().join("result.csv");

    let output = run_in(dir.path(), &["run", &input, "--output", out.to_str().unwrap(), "--quiet"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).is_empty(), "--quiet should silence the summary");

    let content = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "источник,статус_совпадения,совпадение_с_порталом,процент_совпадения,фио_в_зуп,Отдел"
    );
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("ЗУП,Полное совпадение,иванов иван иванович,100,"));
    assert!(lines[2].starts_with("ЗУП,Частичное совпадение,Петрова Пётр,"));
    assert!(lines[3].starts_with("ЗУП,Пустое ФИО в ЗУП,,0,"));
    assert!(lines[4].starts_with("портал,Нет в ЗУП,Волков Алексей,0,"));
}

#[test]
fn threshold_flag_changes_verdicts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);
    let out = dir.path().join("strict.csv");

    let output = run_in(
        dir.path(),
        &["run", &input, "--threshold", "99", "--output", out.to_str().unwrap()],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let content = std::fs::read_to_string(&out).unwrap();
    assert!(content.contains("Совпадений не найдено"));
    assert!(!content.contains("Частичное совпадение"));
}

#[test]
fn json_report_is_single_value_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);
    let report = dir.path().join("report.json");

    let output = run_in(
        dir.path(),
        &["run", &input, "--json", "--quiet", "--report", report.to_str().unwrap()],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let val: serde_json::Value = serde_json::from_str(stdout.trim()).expect("stdout is one JSON value");
    assert_eq!(val["meta"]["threshold"], 85);
    assert_eq!(val["summary"]["primary_rows"], 3);
    assert_eq!(val["summary"]["status_counts"]["unmatched_secondary"], 1);
    assert!(val["output"].as_str().unwrap().ends_with("staff_результат.xlsx"));

    let from_file: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(from_file["summary"], val["summary"]);
}

#[test]
fn config_file_overrides_labels() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);
    let config = write_input(
        dir.path(),
        "namematch.toml",
        "[labels]\nfull_match = \"OK\"\n[output]\nfile_suffix = \"_checked\"\n",
    );

    let output = run_in(dir.path(), &["run", &input, "--config", &config, "--format", "csv"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let content = std::fs::read_to_string(dir.path().join("staff_checked.csv")).unwrap();
    assert!(content.lines().nth(1).unwrap().starts_with("ЗУП,OK,"));
}

// ===========================================================================
// Exit codes
// ===========================================================================

#[test]
fn missing_name_columns_exit_61() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "bad.csv", "источник,Отдел\nЗУП,ИТ\nпортал,ИТ\n");
    let output = run_in(dir.path(), &["run", &input]);
    assert_eq!(output.status.code(), Some(61));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn no_secondary_rows_exit_62() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "one.csv", "источник,ФИО\nЗУП,Иванов Иван\n");
    let output = run_in(dir.path(), &["run", &input]);
    assert_eq!(output.status.code(), Some(62));
    assert!(stderr(&output).contains("no secondary records"));
}

#[test]
fn invalid_config_exit_60() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);
    let config = write_input(dir.path(), "bad.toml", "threshold = 150\n");
    let output = run_in(dir.path(), &["run", &input, "--config", &config]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn missing_input_exit_63() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["run", "nowhere.xlsx"]);
    assert_eq!(output.status.code(), Some(63));
}

#[test]
fn out_of_range_threshold_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);
    let output = run_in(dir.path(), &["run", &input, "--threshold", "101"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unwritable_output_exit_64() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);
    let out = dir.path().join("no_such_dir").join("result.csv");
    let output = run_in(dir.path(), &["run", &input, "--output", out.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(64));
}

// ===========================================================================
// validate + labels
// ===========================================================================

#[test]
fn validate_defaults_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["validate"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("built-in defaults"));

    let config = write_input(dir.path(), "c.toml", "[source]\nprimary_keyword = \"портал\"\n");
    let output = run_in(dir.path(), &["validate", "--config", &config]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn labels_lists_all_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["labels"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 5);
    assert!(stdout.contains("partial_match"));
    assert!(stdout.contains("#FFEB9C"));
}

#[test]
fn long_version_reports_build_profile() {
    let output = namematch().arg("--version").output().expect("run namematch");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("engine:  namematch-recon"));
    assert!(stdout.contains("build:   debug") || stdout.contains("build:   release"));
    assert!(stdout.contains("target:  "));
}
