use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const REGISTRATIONS: &str = "\
Status,Name,Country,WCA ID
a,Alice Smith,United Kingdom,
a,Li Wei (李伟),China,
";

fn run_certgen(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_certgen"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("run certgen")
}

#[test]
fn help_lists_options() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = run_certgen(&["--help"], dir.path());

    assert!(output.status.success(), "process failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--all", "--ascii-only", "--template", "--fallback-dir", "--id"] {
        assert!(stdout.contains(flag), "expected {flag} in help, got: {stdout}");
    }
}

#[test]
fn missing_registrations_fails() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = run_certgen(&["nope.csv"], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nope.csv"), "unexpected stderr: {stderr}");
}

#[test]
fn missing_default_font_aborts_without_output() {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("registrations.csv"), REGISTRATIONS).expect("write csv");

    let output = run_certgen(&["registrations.csv", "--id", "Open2024"], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load font"), "unexpected stderr: {stderr}");
    assert!(!dir.path().join("Open2024-certificates.pdf").exists());
}

#[test]
fn corrupt_default_font_aborts() {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("registrations.csv"), REGISTRATIONS).expect("write csv");
    fs::write(dir.path().join("Broken.ttf"), b"not a font").expect("write font");

    let output = run_certgen(
        &["registrations.csv", "--font", "Broken.ttf", "--fallback-dir", "."],
        dir.path(),
    );

    assert!(!output.status.success());
    assert!(!dir.path().join("certificates.pdf").exists());
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("registrations.csv"), REGISTRATIONS).expect("write csv");
    fs::write(dir.path().join("certgen.json"), "{ \"layout\": { \"fontSize\": -1 } }")
        .expect("write config");

    let output = run_certgen(&["registrations.csv", "--config", "certgen.json"], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fontSize"), "unexpected stderr: {stderr}");
}
