//! Search for the template inside function literals embedded in expressions

use luagrep_ast::*;
use tracing::trace;

use crate::state::MatchState;
use crate::MatchError;

impl MatchState<'_> {
    /// Walk `expr` looking for function literals whose body contains the template.
    ///
    /// Returns `true` on the first such hit; the rest of the expression is not visited.
    /// Operator chains are walked with a work list, so only function bodies count
    /// towards the depth limit.
    pub fn traverse_expr(&mut self, expr: &Expr) -> Result<bool, MatchError> {
        let mut pending = vec![expr];
        while let Some(expr) = pending.pop() {
            // Children are pushed in reverse to visit them in source order.
            match &expr.kind {
                ExprKind::Index { object, key } => {
                    pending.push(key);
                    pending.push(object);
                }
                ExprKind::Arithmetic { left, right, .. }
                | ExprKind::Relational { left, right, .. }
                | ExprKind::Logical { left, right, .. }
                | ExprKind::Concat { left, right } => {
                    pending.push(right);
                    pending.push(left);
                }
                ExprKind::Unary { operand, .. } => pending.push(operand),
                ExprKind::Table(fields) => {
                    for field in fields.iter().rev() {
                        pending.push(&field.value);
                        if let Some(key) = &field.key {
                            pending.push(key);
                        }
                    }
                }
                ExprKind::Call(call) => {
                    pending.extend(call.args.iter().rev());
                    match &call.target {
                        CallTarget::Function(callee) => pending.push(callee),
                        CallTarget::Method { receiver, .. } => pending.push(receiver),
                    }
                }
                ExprKind::Function(func) => {
                    if self.traverse_function(func, expr.span)? {
                        return Ok(true);
                    }
                }
                _ => {}
            }
        }
        Ok(false)
    }

    pub fn traverse_exprs(&mut self, exprs: &[Expr]) -> Result<bool, MatchError> {
        for expr in exprs {
            if self.traverse_expr(expr)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Run the full scan over a function body
    pub(crate) fn traverse_function(
        &mut self,
        func: &FunctionExpr,
        span: Span,
    ) -> Result<bool, MatchError> {
        let found = self.scan(&func.body)?.is_match();
        if found {
            trace!(start = span.start, end = span.end, "template found inside function literal");
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchOptions;

    fn span() -> Span {
        Span::dummy()
    }

    fn break_stmt() -> Stmt {
        Stmt::new(StmtKind::Break, span())
    }

    fn function_with(body: Vec<Stmt>) -> Expr {
        Expr::new(
            ExprKind::Function(FunctionExpr {
                params: ParamList::default(),
                body,
            }),
            span(),
        )
    }

    #[test]
    fn test_finds_function_inside_table_field() {
        let template = vec![break_stmt()];
        let mut state = MatchState::new(&template, MatchOptions::new());
        let table = Expr::new(
            ExprKind::Table(vec![
                TableField {
                    key: None,
                    value: Expr::ident("x", span()),
                },
                TableField {
                    key: Some(Expr::new(ExprKind::String("cb".into()), span())),
                    value: function_with(vec![break_stmt()]),
                },
            ]),
            span(),
        );
        assert_eq!(state.traverse_expr(&table), Ok(true));
    }

    #[test]
    fn test_plain_expressions_find_nothing() {
        let template = vec![break_stmt()];
        let mut state = MatchState::new(&template, MatchOptions::new());
        let sum = Expr::new(
            ExprKind::Arithmetic {
                op: ArithOp::Add,
                left: Box::new(Expr::ident("a", span())),
                right: Box::new(function_with(vec![])),
            },
            span(),
        );
        assert_eq!(state.traverse_expr(&sum), Ok(false));
    }

    #[test]
    fn test_operator_chain_does_not_count_as_depth() {
        let template = vec![break_stmt()];
        let options = MatchOptions::new().with_max_depth(2);
        let mut state = MatchState::new(&template, options);

        let mut chain = Expr::ident("a", span());
        for _ in 0..1_000 {
            chain = Expr::new(
                ExprKind::Arithmetic {
                    op: ArithOp::Add,
                    left: Box::new(chain),
                    right: Box::new(Expr::ident("a", span())),
                },
                span(),
            );
        }
        assert_eq!(state.traverse_expr(&chain), Ok(false));

        let chain = Expr::new(
            ExprKind::Concat {
                left: Box::new(chain),
                right: Box::new(function_with(vec![break_stmt()])),
            },
            span(),
        );
        assert_eq!(state.traverse_expr(&chain), Ok(true));
    }
}
