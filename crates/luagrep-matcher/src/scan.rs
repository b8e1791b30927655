//! Statement sequence scanning

use std::ops::Range;

use luagrep_ast::{Stmt, StmtKind};
use serde::Serialize;
use tracing::trace;

use crate::state::MatchState;
use crate::{MatchError, ScanMode};

/// Where a scan found the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    NoMatch,
    /// Statement indices of the matched run in the scanned sequence
    At { stmts: Range<usize> },
    /// Found inside a statement of the scanned sequence; the position is not tracked
    Nested { scope: NestedScope },
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        !matches!(self, Verdict::NoMatch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedScope {
    /// A nested statement body: `do`, loops, `if` branches
    Block,
    /// The body of a function literal. Ends every enclosing scan.
    Function,
}

impl MatchState<'_> {
    pub fn scan(&mut self, chunk: &[Stmt]) -> Result<Verdict, MatchError> {
        self.descend(|state| match state.options.scan {
            ScanMode::Greedy => state.scan_greedy(chunk),
            ScanMode::Exhaustive => state.scan_exhaustive(chunk),
        })
    }

    fn scan_greedy(&mut self, chunk: &[Stmt]) -> Result<Verdict, MatchError> {
        let template = self.template;
        let Some(first) = template.first() else {
            return Ok(Verdict::NoMatch);
        };

        let entry = self.mark();
        let mut run_mark = entry;
        let mut run_start = 0;
        let mut pos = 0;

        for (index, stmt) in chunk.iter().enumerate() {
            if pos == 0 {
                run_start = index;
                run_mark = self.mark();
            }

            let mut matched = self.stmt_equal(stmt, &template[pos]);
            if !matched && pos > 0 {
                trace!(index, abandoned = pos, "alignment broken, retrying first statement");
                self.discard_since(run_mark);
                pos = 0;
                run_start = index;
                run_mark = self.mark();
                matched = self.stmt_equal(stmt, first);
            }

            if matched {
                pos += 1;
                if pos == template.len() {
                    return Ok(Verdict::At {
                        stmts: run_start..index + 1,
                    });
                }
                continue;
            }

            self.discard_since(run_mark);
            pos = 0;
            if let Some(scope) = self.search_within(stmt)? {
                return Ok(Verdict::Nested { scope });
            }
        }

        self.discard_since(entry);
        Ok(Verdict::NoMatch)
    }

    fn scan_exhaustive(&mut self, chunk: &[Stmt]) -> Result<Verdict, MatchError> {
        let template = self.template;
        let entry = self.mark();

        for (index, stmt) in chunk.iter().enumerate() {
            let mark = self.mark();
            let window = &chunk[index..];
            let matched = window.len() >= template.len()
                && window
                    .iter()
                    .zip(template)
                    .all(|(stmt, other)| self.stmt_equal(stmt, other));
            if matched {
                return Ok(Verdict::At {
                    stmts: index..index + template.len(),
                });
            }
            self.discard_since(mark);

            if let Some(scope) = self.search_within(stmt)? {
                return Ok(Verdict::Nested { scope });
            }
        }

        self.discard_since(entry);
        Ok(Verdict::NoMatch)
    }

    /// Look for the template inside a statement that did not match at its position.
    ///
    /// Expressions are searched first, then nested bodies in source order.
    fn search_within(&mut self, stmt: &Stmt) -> Result<Option<NestedScope>, MatchError> {
        let in_function = match &stmt.kind {
            StmtKind::Assign { targets, values } => {
                self.traverse_exprs(targets)? || self.traverse_exprs(values)?
            }
            StmtKind::Local { values, .. } | StmtKind::Return(values) => {
                self.traverse_exprs(values)?
            }
            StmtKind::Call(call) => self.traverse_expr(call)?,
            StmtKind::While { condition, .. }
            | StmtKind::Repeat { condition, .. }
            | StmtKind::If { condition, .. } => self.traverse_expr(condition)?,
            StmtKind::LocalFunction { func, .. } | StmtKind::Function { func, .. } => {
                self.traverse_function(func, stmt.span)?
            }
            StmtKind::NumericFor {
                start, limit, step, ..
            } => {
                self.traverse_expr(start)?
                    || self.traverse_expr(limit)?
                    || match step {
                        Some(step) => self.traverse_expr(step)?,
                        None => false,
                    }
            }
            StmtKind::GenericFor { exprs, .. } => self.traverse_exprs(exprs)?,
            StmtKind::Do(_)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Capture(_) => false,
        };
        if in_function {
            return Ok(Some(NestedScope::Function));
        }

        for body in stmt.bodies() {
            trace!(kind = stmt.kind_name(), "searching nested body");
            match self.scan(body)? {
                Verdict::NoMatch => {}
                Verdict::Nested {
                    scope: NestedScope::Function,
                } => return Ok(Some(NestedScope::Function)),
                _ => return Ok(Some(NestedScope::Block)),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CapturePolicy, MatchOptions};
    use luagrep_ast::{Expr, Span};

    fn span() -> Span {
        Span::dummy()
    }

    fn call_stmt(callee: &str, argc: usize) -> Stmt {
        let args = (0..argc).map(|i| Expr::ident(format!("a{i}"), span())).collect();
        Stmt::new(
            StmtKind::Call(Expr::new(
                luagrep_ast::ExprKind::Call(luagrep_ast::CallExpr {
                    target: luagrep_ast::CallTarget::Function(Box::new(Expr::ident(
                        callee,
                        span(),
                    ))),
                    args,
                    adjust_ret: false,
                }),
                span(),
            )),
            span(),
        )
    }

    fn break_stmt() -> Stmt {
        Stmt::new(StmtKind::Break, span())
    }

    #[test]
    fn test_restart_reanchors_on_first_template_statement() {
        // [A, B, A, C] against [A, C], telling statements apart by call arity
        let chunk = vec![call_stmt("a", 1), break_stmt(), call_stmt("a", 1), call_stmt("c", 2)];
        let template = vec![call_stmt("a", 1), call_stmt("c", 2)];
        let mut state = MatchState::new(&template, MatchOptions::new());
        assert_eq!(state.scan(&chunk), Ok(Verdict::At { stmts: 2..4 }));
    }

    #[test]
    fn test_nested_block_match_is_reported_as_block() {
        let chunk = vec![Stmt::new(StmtKind::Do(vec![break_stmt()]), span())];
        let template = vec![break_stmt()];
        let mut state = MatchState::new(&template, MatchOptions::new());
        assert_eq!(
            state.scan(&chunk),
            Ok(Verdict::Nested {
                scope: NestedScope::Block
            })
        );
    }

    #[test]
    fn test_greedy_misses_overlapping_occurrence_that_exhaustive_finds() {
        // [A, A, A, B] against [A, A, B]
        let a = || call_stmt("a", 1);
        let b = || call_stmt("b", 2);
        let chunk = vec![a(), a(), a(), b()];
        let template = vec![a(), a(), b()];

        let mut greedy = MatchState::new(&template, MatchOptions::new());
        assert_eq!(greedy.scan(&chunk), Ok(Verdict::NoMatch));

        let options = MatchOptions::new().with_scan(ScanMode::Exhaustive);
        let mut exhaustive = MatchState::new(&template, options);
        assert_eq!(exhaustive.scan(&chunk), Ok(Verdict::At { stmts: 1..4 }));
    }

    #[test]
    fn test_depth_limit_fails_cleanly() {
        let mut chunk = vec![call_stmt("f", 0)];
        for _ in 0..10 {
            chunk = vec![Stmt::new(StmtKind::Do(chunk), span())];
        }
        let template = vec![break_stmt()];
        let options = MatchOptions::new()
            .with_max_depth(4)
            .with_captures(CapturePolicy::Discard);
        let mut state = MatchState::new(&template, options);
        assert_eq!(
            state.scan(&chunk),
            Err(MatchError::DepthExceeded { limit: 4 })
        );
    }
}
