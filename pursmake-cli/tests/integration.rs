use std::process::Command;

use tempfile::tempdir;

fn pursmake() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pursmake"))
}

#[test]
fn list_prints_the_registered_tasks() {
    let output = pursmake().arg("--list").output().expect("run pursmake");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for task in ["build", "docs", "test", "clean", "jsvalidate", "default"] {
        assert!(stdout.contains(task), "missing `{task}` in:\n{stdout}");
    }
}

#[test]
fn unknown_task_exits_nonzero() {
    let tmp = tempdir().expect("tempdir");

    let output = pursmake()
        .args(["-C"])
        .arg(tmp.path())
        .arg("deploy")
        .output()
        .expect("run pursmake");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown task `deploy`"), "stderr:\n{stderr}");
}

#[cfg(unix)]
mod with_fake_toolchain {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn scratch_project() -> (TempDir, String) {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path();

        fs::create_dir_all(root.join("src/Pux")).expect("mkdir");
        fs::write(root.join("src/Pux/Undo.purs"), "module Pux.Undo where\n").expect("write");
        fs::write(
            root.join("src/Pux/Undo.js"),
            "\"use strict\";\nexports.noop = function () {};\n",
        )
        .expect("write");

        let purs = root.join("fake-purs");
        fs::write(
            &purs,
            "#!/bin/sh\nif [ \"$1\" = \"compile\" ]; then\n  mkdir -p output/Pux.Undo\n  echo 'module.exports = {};' > output/Pux.Undo/index.js\nfi\n",
        )
        .expect("write fake purs");
        let mut perms = fs::metadata(&purs).expect("meta").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&purs, perms).expect("chmod");

        let purs = purs.display().to_string();
        (tmp, purs)
    }

    fn run_tasks(root: &Path, purs: &str, extra: &[&str]) -> std::process::Output {
        pursmake()
            .arg("-C")
            .arg(root)
            .args(["--purs", purs])
            .args(extra)
            .output()
            .expect("run pursmake")
    }

    #[test]
    fn bare_invocation_runs_the_default_chain() {
        let (tmp, purs) = scratch_project();

        let output = run_tasks(tmp.path(), &purs, &["--json"]);

        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let parsed: Value = serde_json::from_slice(&output.stdout).expect("parse json");
        let names: Vec<&str> = parsed
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|r| r["name"].as_str())
            .collect();
        assert_eq!(names, ["build", "test", "default"]);
    }

    #[test]
    fn plain_report_lists_each_task_with_duration() {
        let (tmp, purs) = scratch_project();

        let output = run_tasks(tmp.path(), &purs, &["test"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("build"));
        assert!(lines[0].trim_end().ends_with("ms"));
        assert!(lines[1].starts_with("test"));
    }

    #[test]
    fn jsvalidate_reports_each_bad_file_and_exits_nonzero() {
        let (tmp, purs) = scratch_project();
        fs::write(
            tmp.path().join("src/Pux/Broken.js"),
            "exports.f = function ( {;\n",
        )
        .expect("write");

        let output = run_tasks(tmp.path(), &purs, &["jsvalidate"]);

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("src/Pux/Broken.js"), "stderr:\n{stderr}");
        assert!(stderr.contains("failed validation"), "stderr:\n{stderr}");
        // The clean file produced no complaint.
        assert!(!stderr.contains("Undo.js:"), "stderr:\n{stderr}");
    }

    #[test]
    fn jsvalidate_succeeds_on_clean_foreign_files() {
        let (tmp, purs) = scratch_project();

        let output = run_tasks(tmp.path(), &purs, &["jsvalidate"]);

        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    #[test]
    fn config_file_overrides_are_honored() {
        let (tmp, purs) = scratch_project();
        // Point the output directory somewhere else; clean must follow it.
        fs::write(tmp.path().join("pursmake.toml"), "output_dir = \"dist\"\n").expect("write");
        fs::create_dir_all(tmp.path().join("dist")).expect("mkdir");
        fs::write(tmp.path().join("dist/stale.js"), b"x").expect("write");

        let output = run_tasks(tmp.path(), &purs, &["clean"]);

        assert!(output.status.success());
        assert!(!tmp.path().join("dist").exists());
    }
}
