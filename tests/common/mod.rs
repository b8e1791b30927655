#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use luagrep::ast::{Expr, Stmt};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Load a Lua source from tests/fixtures/lua/
pub fn load_source(name: &str) -> String {
    let path = fixtures_dir().join("lua").join(format!("{}.lua", name));
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load source {}: {}", name, e))
}

/// Load a template from tests/fixtures/templates/
pub fn load_template(name: &str) -> String {
    let path = fixtures_dir().join("templates").join(format!("{}.lua", name));
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load template {}: {}", name, e))
}

/// Every .lua file under tests/fixtures/
pub fn all_fixture_files() -> Vec<PathBuf> {
    let mut files = Vec::new();
    for sub in ["lua", "templates"] {
        let dir = fixtures_dir().join(sub);
        let entries = fs::read_dir(&dir)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", dir.display(), e));
        files.extend(
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("lua")),
        );
    }
    files.sort();
    files
}

/// Source text of each captured expression
pub fn expr_texts<'a>(source: &'a str, exprs: &[Expr]) -> Vec<&'a str> {
    exprs
        .iter()
        .map(|e| e.span.text(source).expect("capture span inside source"))
        .collect()
}

/// First source line of each captured statement
pub fn stmt_heads<'a>(source: &'a str, stmts: &[Stmt]) -> Vec<&'a str> {
    stmts
        .iter()
        .map(|s| {
            s.span
                .text(source)
                .and_then(|text| text.lines().next())
                .expect("capture span inside source")
        })
        .collect()
}
