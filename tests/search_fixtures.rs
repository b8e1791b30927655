//! End-to-end searches over the Lua fixtures
//!
//! Each test parses a fixture and a template from tests/fixtures/ and checks
//! the verdict together with the source text of every capture.

mod common;

use common::*;
use luagrep::matcher::{CapturePolicy, MatchOptions, NestedScope, ScanMode, Verdict};
use luagrep::search_source;
use pretty_assertions::assert_eq;

#[test]
fn protected_call_inside_callback() {
    let source = load_source("events");
    let result = search_source(&source, &load_template("protected_call"), &MatchOptions::default())
        .expect("search runs");

    assert_eq!(
        result.verdict,
        Verdict::Nested {
            scope: NestedScope::Function
        }
    );
    let texts = expr_texts(&source, &result.exprs);
    assert_eq!(texts.len(), 3);
    assert!(texts[0].starts_with("function()"));
    assert!(texts[0].ends_with("end"));
    assert_eq!(&texts[1..], &["ok", "err"]);
}

#[test]
fn loop_over_items_inside_method() {
    let source = load_source("inventory");
    let result = search_source(&source, &load_template("items_loop"), &MatchOptions::default())
        .expect("search runs");

    assert_eq!(
        result.verdict,
        Verdict::Nested {
            scope: NestedScope::Function
        }
    );
    assert_eq!(expr_texts(&source, &result.exprs), vec!["self"]);
}

#[test]
fn guard_then_backoff_inside_while() {
    let source = load_source("retry");
    let result = search_source(&source, &load_template("backoff"), &MatchOptions::default())
        .expect("search runs");

    assert_eq!(
        result.verdict,
        Verdict::Nested {
            scope: NestedScope::Block
        }
    );
    assert_eq!(expr_texts(&source, &result.exprs), vec!["attempts", "2"]);
    assert_eq!(stmt_heads(&source, &result.stmts), vec!["if ok then"]);
}

#[test]
fn arity_mismatch_finds_nothing() {
    let source = load_source("retry");
    let result = search_source(&source, &load_template("connect_host"), &MatchOptions::default())
        .expect("search runs");

    assert_eq!(result.verdict, Verdict::NoMatch);
    assert!(result.exprs.is_empty());
    assert!(result.stmts.is_empty());
}

#[test]
fn top_level_run_is_located() {
    let source = load_source("retry");
    let template = "local _IdentExpr_ = _NumberExpr_\nwhile _IdentExpr_ < 5 do end";
    let result = search_source(&source, template, &MatchOptions::default()).expect("search runs");

    assert_eq!(result.verdict, Verdict::At { stmts: 0..2 });
    assert_eq!(
        expr_texts(&source, &result.exprs),
        vec!["0", "attempts", "attempts"]
    );
}

#[test]
fn options_agree_on_unambiguous_matches() {
    let source = load_source("retry");
    let template = load_template("backoff");
    let default = search_source(&source, &template, &MatchOptions::default()).expect("search runs");

    let options = MatchOptions::new()
        .with_scan(ScanMode::Exhaustive)
        .with_captures(CapturePolicy::Discard);
    let strict = search_source(&source, &template, &options).expect("search runs");

    assert_eq!(strict, default);
}

#[test]
fn result_serializes_with_tagged_verdict() {
    let source = load_source("retry");
    let result = search_source(&source, &load_template("backoff"), &MatchOptions::default())
        .expect("search runs");

    let json = serde_json::to_value(&result).expect("serializes");
    assert_eq!(json["verdict"]["kind"], "nested");
    assert_eq!(json["verdict"]["scope"], "block");
    assert_eq!(json["exprs"].as_array().map(Vec::len), Some(2));
    assert!(json["stmts"][0]["kind"]["If"].is_object());

    let at = search_source("print(1)", "print(_NumberExpr_)", &MatchOptions::default())
        .expect("search runs");
    let json = serde_json::to_value(&at.verdict).expect("serializes");
    assert_eq!(json, serde_json::json!({ "kind": "at", "stmts": { "start": 0, "end": 1 } }));
}
