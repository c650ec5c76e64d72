#![allow(deprecated)] // cargo_bin deprecation - still works fine

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("decomment").expect("binary should exist");
    cmd.current_dir(dir);
    cmd
}

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(dir: &Path, relative: &str) -> String {
    fs::read_to_string(dir.join(relative)).unwrap()
}

#[test]
fn declining_the_prompt_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.js", "f(); // note\n");

    cmd(temp_dir.path())
        .write_stdin("no\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation cancelled"));

    assert_eq!(read(temp_dir.path(), "a.js"), "f(); // note\n");
}

#[test]
fn empty_answer_cancels() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.py", "# note\n");

    cmd(temp_dir.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation cancelled"));

    assert_eq!(read(temp_dir.path(), "a.py"), "# note\n");
}

#[test]
fn accepting_the_prompt_strips_current_directory() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "src/a.js", "f(); // note\n");
    write(temp_dir.path(), "src/clean.css", "a{}\n");

    cmd(temp_dir.path())
        .write_stdin("Y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files processed: 2"))
        .stdout(predicate::str::contains("Files modified: 1"))
        .stdout(predicate::str::contains("Files unchanged: 1"));

    assert_eq!(read(temp_dir.path(), "src/a.js"), "f(); \n");
}

#[test]
fn frontend_and_backend_take_precedence_over_cwd() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "frontend/app.tsx", "/* c */export {};\n");
    write(temp_dir.path(), "backend/api.py", "x = 1  # c\n");
    write(temp_dir.path(), "scripts/tool.js", "// untouched\n");

    cmd(temp_dir.path())
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing: app.tsx"))
        .stdout(predicate::str::contains("Processing: api.py"));

    assert_eq!(read(temp_dir.path(), "frontend/app.tsx"), "export {};\n");
    assert_eq!(read(temp_dir.path(), "backend/api.py"), "x = 1  \n");
    assert_eq!(read(temp_dir.path(), "scripts/tool.js"), "// untouched\n");
}

#[test]
fn dry_run_reports_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "page.html", "<!-- x --><p>y</p>");

    cmd(temp_dir.path())
        .args(["--yes", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Comments found (dry run)"));

    assert_eq!(read(temp_dir.path(), "page.html"), "<!-- x --><p>y</p>");
}

#[test]
fn file_errors_do_not_change_exit_status() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("bad.py"), [0xff, b'\n']).unwrap();
    write(temp_dir.path(), "good.css", "/* c */a{}");

    cmd(temp_dir.path())
        .args(["--yes", "--parallel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files failed: 1"))
        .stderr(predicate::str::contains("bad.py"));

    assert_eq!(read(temp_dir.path(), "good.css"), "a{}");
}

#[test]
fn missing_explicit_path_fails() {
    let temp_dir = TempDir::new().unwrap();

    cmd(temp_dir.path())
        .args(["--yes", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn completion_script_is_generated() {
    let temp_dir = TempDir::new().unwrap();

    cmd(temp_dir.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("decomment"));
}
