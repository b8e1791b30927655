//! Exit codes and report lines of the `luagrep search` binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

fn write_lua(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).expect("write fixture");
    path
}

fn search(template: &str, paths: &[&Path], extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_luagrep"))
        .arg("search")
        .args(paths)
        .arg("-e")
        .arg(template)
        .args(extra)
        .env_remove("RUST_LOG")
        .output()
        .expect("luagrep runs")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn match_exits_zero_and_reports_statement() {
    let dir = tempdir().expect("temp dir");
    let file = write_lua(&dir, "main.lua", "local x = 1\nprint(x)\n");

    let output = search("print(_IdentExpr_)", &[file.as_path()], &[]);
    assert_eq!(output.status.code(), Some(0));
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], format!("{}:2:1: statements 2..2", file.display()));
    assert_eq!(lines[1], "  $1 2:7 identifier: x");
}

#[test]
fn nested_hit_without_captures_reports_enclosing_statement() {
    let dir = tempdir().expect("temp dir");
    let source = "local n = 0\nwhile n < 3 do\n    n = n + 1\n    print(n)\nend\n";
    let file = write_lua(&dir, "loop.lua", source);

    let output = search("print(n)", &[file.as_path()], &[]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_lines(&output),
        vec![format!("{}:2:1: inside a nested block", file.display())]
    );

    let output = search("print(n)", &[file.as_path()], &["--json"]);
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("one JSON report");
    assert_eq!(report["line"], 2);
    assert_eq!(report["column"], 1);
    assert_eq!(report["verdict"]["scope"], "block");
}

#[test]
fn no_match_exits_one() {
    let dir = tempdir().expect("temp dir");
    let file = write_lua(&dir, "main.lua", "local x = 1\n");

    let output = search("print(_IdentExpr_)", &[file.as_path()], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn unparsable_file_exits_two_even_with_a_match() {
    let dir = tempdir().expect("temp dir");
    write_lua(&dir, "a_good.lua", "print(x)\n");
    write_lua(&dir, "b_bad.lua", "local = 1\n");
    write_lua(&dir, "notes.txt", "local = 1\n");

    let output = search("print(_IdentExpr_)", &[dir.path()], &[]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout_lines(&output).len(), 2);
}

#[test]
fn invalid_template_exits_two() {
    let dir = tempdir().expect("temp dir");
    let file = write_lua(&dir, "main.lua", "print(x)\n");

    assert_eq!(search("", &[file.as_path()], &[]).status.code(), Some(2));
    assert_eq!(search("local = ", &[file.as_path()], &[]).status.code(), Some(2));
}
