//! luagrep CLI - Search Lua sources by example

use std::fs;
use std::path::{Path, PathBuf};

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use luagrep_ast::{Chunk, Span, Stmt};
use luagrep_matcher::{
    find_with, CapturePolicy, MatchOptions, MatchResult, NestedScope, ScanMode, Template, Verdict,
    DEFAULT_MAX_DEPTH,
};
use luagrep_parser::{parse, ParseError};

const EXIT_MATCH: i32 = 0;
const EXIT_NO_MATCH: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[derive(Parser)]
#[command(name = "luagrep")]
#[command(about = "Structural search over Lua source using code templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search files for a template
    Search {
        /// Files or directories; directories are searched for *.lua files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        template: TemplateArgs,
        /// Print one JSON object per file
        #[arg(long)]
        json: bool,
        /// Try the template at every statement instead of a single greedy pass
        #[arg(long)]
        exhaustive: bool,
        /// Drop captures recorded by comparisons that end up failing
        #[arg(long)]
        discard_failed_captures: bool,
        /// Nesting limit for templates and searched code
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Parse a file and output the AST as JSON
    Parse {
        /// Input file
        file: PathBuf,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Show a template after wildcard lowering, as JSON
    Template {
        #[command(flatten)]
        template: TemplateArgs,
    },
}

#[derive(Args)]
struct TemplateArgs {
    /// Read the template from a file
    #[arg(short = 'p', long = "template", value_name = "FILE", conflicts_with = "source")]
    file: Option<PathBuf>,
    /// Template source text
    #[arg(
        short = 'e',
        long = "expr",
        value_name = "SOURCE",
        required_unless_present = "file"
    )]
    source: Option<String>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Search {
            paths,
            template,
            json,
            exhaustive,
            discard_failed_captures,
            max_depth,
        } => {
            let options = MatchOptions::new()
                .with_scan(if exhaustive {
                    ScanMode::Exhaustive
                } else {
                    ScanMode::Greedy
                })
                .with_captures(if discard_failed_captures {
                    CapturePolicy::Discard
                } else {
                    CapturePolicy::Retain
                })
                .with_max_depth(max_depth);
            cmd_search(&paths, &template, &options, json)
        }
        Commands::Parse { file, pretty } => cmd_parse(&file, pretty),
        Commands::Template { template } => cmd_template(&template),
    };
    std::process::exit(code);
}

/// Install a stderr subscriber when `RUST_LOG` is set
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn cmd_search(paths: &[PathBuf], args: &TemplateArgs, options: &MatchOptions, json: bool) -> i32 {
    let Some(template) = load_template(args) else {
        return EXIT_ERROR;
    };

    let mut matched = false;
    let mut failed = false;

    for file in collect_files(paths, &mut failed) {
        let Some((source, chunk)) = read_and_parse(&file) else {
            failed = true;
            continue;
        };

        let result = match find_with(&chunk, &template, options) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("{}: {}", file.display(), e);
                failed = true;
                continue;
            }
        };
        if !result.is_match() {
            debug!(file = %file.display(), "no match");
            continue;
        }
        matched = true;

        let anchor = anchor_stmt(&chunk, &template, options, &result.verdict);
        let report = FileReport::new(&file, &source, anchor, &result);
        if json {
            match serde_json::to_string(&report) {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    eprintln!("{}: {}", file.display(), e);
                    failed = true;
                }
            }
        } else {
            print_report(&report);
        }
    }

    if failed {
        EXIT_ERROR
    } else if matched {
        EXIT_MATCH
    } else {
        EXIT_NO_MATCH
    }
}

fn cmd_parse(file: &Path, pretty: bool) -> i32 {
    let Some((_, chunk)) = read_and_parse(file) else {
        return EXIT_ERROR;
    };
    print_json(&chunk, pretty)
}

fn cmd_template(args: &TemplateArgs) -> i32 {
    match load_template(args) {
        Some(template) => print_json(&template, true),
        None => EXIT_ERROR,
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> i32 {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => {
            println!("{}", json);
            EXIT_MATCH
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            EXIT_ERROR
        }
    }
}

fn load_template(args: &TemplateArgs) -> Option<Template> {
    let (name, source) = match (&args.file, &args.source) {
        (Some(file), _) => match fs::read_to_string(file) {
            Ok(source) => (file.to_string_lossy().to_string(), source),
            Err(e) => {
                eprintln!("Error reading template {}: {}", file.display(), e);
                return None;
            }
        },
        (None, Some(source)) => ("<template>".to_string(), source.clone()),
        (None, None) => {
            eprintln!("No template given");
            return None;
        }
    };

    let chunk = match parse(&source) {
        Ok(chunk) => chunk,
        Err(e) => {
            report_parse_error(&source, &name, &e);
            return None;
        }
    };
    match Template::new(chunk) {
        Ok(template) => Some(template),
        Err(e) => {
            eprintln!("Invalid template: {}", e);
            None
        }
    }
}

/// Expand directories into the `*.lua` files below them
fn collect_files(paths: &[PathBuf], failed: &mut bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_lua(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(entry) => debug!(path = %entry.path().display(), "skipping"),
                Err(e) => {
                    warn!(error = %e, "cannot walk directory entry");
                    *failed = true;
                }
            }
        }
    }
    files
}

fn is_lua(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "lua")
}

fn read_and_parse(file: &Path) -> Option<(String, Chunk)> {
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", file.display(), e);
            return None;
        }
    };
    match parse(&source) {
        Ok(chunk) => Some((source, chunk)),
        Err(e) => {
            report_parse_error(&source, &file.to_string_lossy(), &e);
            None
        }
    }
}

#[derive(Serialize)]
struct FileReport {
    path: String,
    verdict: Verdict,
    /// Start of the first matched statement, or of the top-level statement holding a nested hit
    line: Option<usize>,
    column: Option<usize>,
    exprs: Vec<CaptureReport>,
    stmts: Vec<CaptureReport>,
}

#[derive(Serialize)]
struct CaptureReport {
    kind: &'static str,
    line: usize,
    column: usize,
    text: String,
}

impl CaptureReport {
    fn new(kind: &'static str, span: Span, source: &str) -> Self {
        let (line, column) = span.line_col(source);
        Self {
            kind,
            line,
            column,
            text: span.text(source).unwrap_or_default().to_string(),
        }
    }
}

impl FileReport {
    fn new(path: &Path, source: &str, anchor: Option<&Stmt>, result: &MatchResult) -> Self {
        let exprs: Vec<_> = result
            .exprs
            .iter()
            .map(|e| CaptureReport::new(e.kind_name(), e.span, source))
            .collect();
        let stmts: Vec<_> = result
            .stmts
            .iter()
            .map(|s| CaptureReport::new(s.kind_name(), s.span, source))
            .collect();

        let anchor = anchor.map(|stmt| stmt.span.line_col(source));

        Self {
            path: path.to_string_lossy().to_string(),
            verdict: result.verdict.clone(),
            line: anchor.map(|(line, _)| line),
            column: anchor.map(|(_, column)| column),
            exprs,
            stmts,
        }
    }
}

/// Top-level statement a hit is reported at.
///
/// A nested verdict does not say which statement held the hit, so each
/// top-level statement is searched on its own until one reports it.
fn anchor_stmt<'c>(
    chunk: &'c [Stmt],
    template: &Template,
    options: &MatchOptions,
    verdict: &Verdict,
) -> Option<&'c Stmt> {
    match verdict {
        Verdict::At { stmts } => chunk.get(stmts.start),
        Verdict::Nested { .. } => chunk.iter().find(|stmt| {
            find_with(std::slice::from_ref(*stmt), template, options)
                .is_ok_and(|alone| matches!(alone.verdict, Verdict::Nested { .. }))
        }),
        Verdict::NoMatch => None,
    }
}

fn print_report(report: &FileReport) {
    let place = match &report.verdict {
        Verdict::At { stmts } => format!("statements {}..{}", stmts.start + 1, stmts.end),
        Verdict::Nested {
            scope: NestedScope::Block,
        } => "inside a nested block".to_string(),
        Verdict::Nested {
            scope: NestedScope::Function,
        } => "inside a function".to_string(),
        Verdict::NoMatch => return,
    };
    match (report.line, report.column) {
        (Some(line), Some(column)) => println!("{}:{}:{}: {}", report.path, line, column, place),
        _ => println!("{}: {}", report.path, place),
    }

    for (i, capture) in report.exprs.iter().enumerate() {
        println!(
            "  ${} {}:{} {}: {}",
            i + 1,
            capture.line,
            capture.column,
            capture.kind,
            capture.text
        );
    }
    for (i, capture) in report.stmts.iter().enumerate() {
        let first_line = capture.text.lines().next().unwrap_or_default();
        println!(
            "  @{} {}:{} {}: {}",
            i + 1,
            capture.line,
            capture.column,
            capture.kind,
            first_line
        );
    }
}

fn report_parse_error(source: &str, name: &str, error: &ParseError) {
    let span = error.span();
    let printed = Report::build(ReportKind::Error, name.to_string(), span.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((name.to_string(), span.start..span.end))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name.to_string(), Source::from(source)));
    if let Err(e) = printed {
        eprintln!("{}: {}", name, error);
        debug!(error = %e, "failed to render diagnostic");
    }
}
