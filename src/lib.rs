//! luagrep - Structural search over Lua source by example
//!
//! This is the root workspace crate that provides integration tests and a
//! source-level entry point. The implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use luagrep_ast as ast;
pub use luagrep_lexer as lexer;
pub use luagrep_matcher as matcher;
pub use luagrep_parser as parser;

use luagrep_matcher::{MatchError, MatchOptions, MatchResult, Template};
use luagrep_parser::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("template: {0}")]
    Template(#[source] ParseError),

    #[error("source: {0}")]
    Source(#[source] ParseError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Parse both texts and search `source` for `template`
pub fn search_source(
    source: &str,
    template: &str,
    options: &MatchOptions,
) -> Result<MatchResult, SearchError> {
    let template = luagrep_parser::parse(template).map_err(SearchError::Template)?;
    let template = Template::new(template)?;
    let chunk = luagrep_parser::parse(source).map_err(SearchError::Source)?;
    Ok(luagrep_matcher::find_with(&chunk, &template, options)?)
}
