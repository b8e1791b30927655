//! Per-call match state

use luagrep_ast::{Expr, Stmt};

use crate::{CapturePolicy, MatchError, MatchOptions};

/// Nodes recorded by wildcards, in discovery order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Captures {
    pub exprs: Vec<Expr>,
    pub stmts: Vec<Stmt>,
}

/// Capture list lengths at some point of the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mark {
    exprs: usize,
    stmts: usize,
}

/// State threaded through one top-level match call.
///
/// Every recursive helper borrows the same instance mutably, so captures
/// made while searching nested scopes are visible to the caller.
pub struct MatchState<'t> {
    pub(crate) template: &'t [Stmt],
    pub(crate) options: MatchOptions,
    captures: Captures,
    depth: usize,
}

impl<'t> MatchState<'t> {
    pub fn new(template: &'t [Stmt], options: MatchOptions) -> Self {
        Self {
            template,
            options,
            captures: Captures::default(),
            depth: 0,
        }
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn into_captures(self) -> Captures {
        self.captures
    }

    pub(crate) fn capture_expr(&mut self, expr: Expr) {
        self.captures.exprs.push(expr);
    }

    pub(crate) fn capture_stmt(&mut self, stmt: &Stmt) {
        self.captures.stmts.push(stmt.clone());
    }

    pub(crate) fn mark(&self) -> Mark {
        Mark {
            exprs: self.captures.exprs.len(),
            stmts: self.captures.stmts.len(),
        }
    }

    /// Drop captures recorded after `mark`. Under `CapturePolicy::Retain` this is a no-op.
    pub(crate) fn discard_since(&mut self, mark: Mark) {
        if self.options.captures == CapturePolicy::Discard {
            self.captures.exprs.truncate(mark.exprs);
            self.captures.stmts.truncate(mark.stmts);
        }
    }

    /// Run `f` one scope deeper into the candidate tree.
    pub(crate) fn descend<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, MatchError>,
    ) -> Result<T, MatchError> {
        if self.depth >= self.options.max_depth {
            return Err(MatchError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
