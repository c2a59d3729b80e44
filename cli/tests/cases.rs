//! Data-driven CLI cases. Each `cases/**/*.toml` file describes one changelog,
//! the flags to run with, and the expected output or error.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CaseConfig {
    /// Human-readable case description.
    #[serde(default)]
    description: Option<String>,

    /// Changelog contents written to a temporary CHANGELOG.md.
    document: String,

    /// Value for `--release`. Omitted means the default selector.
    #[serde(default)]
    release: Option<String>,

    /// Pass `--strict`.
    #[serde(default)]
    strict: bool,

    /// Expected exact stdout, without the trailing newline.
    #[serde(default)]
    expect_output: Option<String>,

    /// Substring the stderr of a failing run must contain.
    #[serde(default)]
    expect_error: Option<String>,
}

fn collect_cases(dir: &Path, out: &mut Vec<PathBuf>) {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", dir.display(), e))
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_cases(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            out.push(path);
        }
    }
}

fn run_case(path: &Path) -> Result<(), String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("cannot read case: {}", e))?;
    let config: CaseConfig = toml::from_str(&raw).map_err(|e| format!("invalid case: {}", e))?;

    let dir = tempfile::tempdir().map_err(|e| e.to_string())?;
    let changelog = dir.path().join("CHANGELOG.md");
    fs::write(&changelog, &config.document).map_err(|e| e.to_string())?;

    let mut cmd = cargo_bin_cmd!("changelog");
    cmd.arg(&changelog).arg("--no-color").env_remove("CHANGELOG_RELEASE");
    if let Some(release) = &config.release {
        cmd.args(["--release", release.as_str()]);
    }
    if config.strict {
        cmd.arg("--strict");
    }

    check_output(&mut cmd, &config).map_err(|message| match &config.description {
        Some(description) => format!("{} ({})", message, description),
        None => message,
    })
}

fn check_output(cmd: &mut Command, config: &CaseConfig) -> Result<(), String> {
    let output = cmd.output().map_err(|e| format!("cannot run binary: {}", e))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    match (&config.expect_output, &config.expect_error) {
        (Some(expected), None) => {
            if !output.status.success() {
                return Err(format!("expected success, got {}: {}", output.status, stderr));
            }
            let expected = format!("{}\n", expected.trim());
            if stdout != expected {
                return Err(format!("expected output {:?}, got {:?}", expected, stdout));
            }
            Ok(())
        }
        (None, Some(expected)) => {
            if output.status.success() {
                return Err(format!("expected failure, got success with {:?}", stdout));
            }
            if !stderr.contains(expected.as_str()) {
                return Err(format!("expected error containing {:?}, got {:?}", expected, stderr));
            }
            Ok(())
        }
        _ => Err("case must set exactly one of expect_output or expect_error".to_string()),
    }
}

#[test]
fn changelog_cases() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/cases");
    let mut cases = Vec::new();
    collect_cases(&root, &mut cases);
    assert!(!cases.is_empty(), "no cases under {}", root.display());

    let mut failures = Vec::new();
    for path in &cases {
        if let Err(message) = run_case(path) {
            let name = path.strip_prefix(&root).unwrap_or(path).display().to_string();
            failures.push(format!("{}: {}", name, message));
        }
    }

    assert!(
        failures.is_empty(),
        "{} of {} cases failed:\n{}",
        failures.len(),
        cases.len(),
        failures.join("\n")
    );
}
