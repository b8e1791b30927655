//! luagrep Matcher - Structural template matching
//!
//! Finds where a template chunk occurs inside a candidate chunk and returns
//! the nodes its wildcards matched.
//!
//! ```ignore
//! let template = Template::new(luagrep_parser::parse("local _IdentExpr_ = 1")?)?;
//! let result = find(&luagrep_parser::parse(source)?, &template)?;
//! ```
//!
//! The scan is a single greedy pass over each statement sequence (see
//! [`ScanMode`]). Statements that fail to line up with the template are
//! searched inside: their nested bodies, and the bodies of function literals
//! in their expressions. A hit inside a function literal ends the whole call.

mod equal;
mod error;
mod options;
mod scan;
mod state;
mod template;
mod traverse;

pub use error::*;
pub use options::*;
pub use scan::{NestedScope, Verdict};
pub use state::{Captures, MatchState};
pub use template::*;

use luagrep_ast::{Expr, Stmt};
use serde::Serialize;
use tracing::debug;

/// Outcome of one match call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub verdict: Verdict,
    /// Captured expressions, in discovery order
    pub exprs: Vec<Expr>,
    /// Captured statements, in discovery order
    pub stmts: Vec<Stmt>,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        self.verdict.is_match()
    }
}

/// Match `candidate` against a template written with marker names, using default options
pub fn match_chunk(candidate: &[Stmt], template: &[Stmt]) -> Result<MatchResult, MatchError> {
    let template = Template::new(template.to_vec())?;
    find(candidate, &template)
}

pub fn find(candidate: &[Stmt], template: &Template) -> Result<MatchResult, MatchError> {
    find_with(candidate, template, &MatchOptions::default())
}

pub fn find_with(
    candidate: &[Stmt],
    template: &Template,
    options: &MatchOptions,
) -> Result<MatchResult, MatchError> {
    if template.depth() > options.max_depth {
        return Err(MatchError::TemplateTooDeep {
            depth: template.depth(),
            limit: options.max_depth,
        });
    }
    debug!(
        template_len = template.len(),
        candidate_len = candidate.len(),
        scan = ?options.scan,
        captures = ?options.captures,
        "matching"
    );

    let mut state = MatchState::new(template.stmts(), *options);
    let verdict = state.scan(candidate)?;
    let captures = state.into_captures();

    debug!(
        ?verdict,
        exprs = captures.exprs.len(),
        stmts = captures.stmts.len(),
        "match finished"
    );
    Ok(MatchResult {
        verdict,
        exprs: captures.exprs,
        stmts: captures.stmts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use luagrep_ast::{Span, StmtKind};

    #[test]
    fn test_empty_template_is_an_error() {
        assert_eq!(match_chunk(&[], &[]), Err(MatchError::EmptyTemplate));
    }

    #[test]
    fn test_template_deeper_than_limit_is_rejected() {
        let inner = Stmt::new(StmtKind::Break, Span::dummy());
        let nested = Stmt::new(StmtKind::Do(vec![inner]), Span::dummy());
        let template = Template::new(vec![nested]).expect("non-empty");
        let options = MatchOptions::new().with_max_depth(1);
        assert_eq!(
            find_with(&[], &template, &options),
            Err(MatchError::TemplateTooDeep { depth: 2, limit: 1 })
        );
    }

    #[test]
    fn test_empty_candidate_does_not_match() {
        let template =
            Template::new(vec![Stmt::new(StmtKind::Break, Span::dummy())]).expect("non-empty");
        let result = find(&[], &template).expect("match runs");
        assert_eq!(result.verdict, Verdict::NoMatch);
        assert!(!result.is_match());
    }
}
