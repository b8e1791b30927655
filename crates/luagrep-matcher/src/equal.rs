//! Structural equality between candidate and template nodes
//!
//! Every comparison takes the candidate first and the template second.
//! Wildcards only ever appear on the template side; a capture variant in a
//! candidate never compares equal.

use luagrep_ast::*;

use crate::state::MatchState;

impl MatchState<'_> {
    pub fn expr_equal(&mut self, expr: &Expr, template: &Expr) -> bool {
        use ExprKind as E;

        match (&expr.kind, &template.kind) {
            (E::String(_), E::String(_))
            | (E::Number(_), E::Number(_))
            | (E::Nil, E::Nil)
            | (E::False, E::False)
            | (E::True, E::True)
            | (E::Vararg, E::Vararg) => true,

            (E::String(_), E::Capture(ExprCapture::String))
            | (E::Number(_), E::Capture(ExprCapture::Number))
            | (E::Function(_), E::Capture(ExprCapture::Function)) => {
                self.capture_expr(expr.clone());
                true
            }

            // Markers are identifiers in the source grammar, so every marker
            // still matches an identifier; only two of them record it.
            (E::Ident(_), E::Ident(_)) => true,
            (E::Ident(_), E::Capture(capture)) => {
                if matches!(capture, ExprCapture::Ident | ExprCapture::Function) {
                    self.capture_expr(expr.clone());
                }
                true
            }

            // The operator itself is not compared.
            (E::Unary { operand, .. }, E::Unary { operand: other, .. }) => {
                self.expr_equal(operand, other)
            }

            (
                E::Arithmetic { op, left, right },
                E::Arithmetic {
                    op: t_op,
                    left: t_left,
                    right: t_right,
                },
            ) => op == t_op && self.expr_equal(left, t_left) && self.expr_equal(right, t_right),
            (
                E::Relational { op, left, right },
                E::Relational {
                    op: t_op,
                    left: t_left,
                    right: t_right,
                },
            ) => op == t_op && self.expr_equal(left, t_left) && self.expr_equal(right, t_right),
            (
                E::Logical { op, left, right },
                E::Logical {
                    op: t_op,
                    left: t_left,
                    right: t_right,
                },
            ) => op == t_op && self.expr_equal(left, t_left) && self.expr_equal(right, t_right),
            (
                E::Concat { left, right },
                E::Concat {
                    left: t_left,
                    right: t_right,
                },
            ) => self.expr_equal(left, t_left) && self.expr_equal(right, t_right),

            (
                E::Index { object, key },
                E::Index {
                    object: t_object,
                    key: t_key,
                },
            ) => self.expr_equal(object, t_object) && self.expr_equal(key, t_key),

            // Fields are not compared.
            (E::Table(_), E::Table(_)) => true,

            (E::Call(call), E::Call(other)) => self.call_equal(call, other),
            (E::Function(func), E::Function(other)) => self.function_equal(func, other),

            _ => false,
        }
    }

    fn call_equal(&mut self, call: &CallExpr, template: &CallExpr) -> bool {
        if call.adjust_ret != template.adjust_ret || call.args.len() != template.args.len() {
            return false;
        }
        let target_equal = match (&call.target, &template.target) {
            (CallTarget::Function(callee), CallTarget::Function(other)) => {
                self.expr_equal(callee, other)
            }
            (
                CallTarget::Method { receiver, .. },
                CallTarget::Method {
                    receiver: other, ..
                },
            ) => self.expr_equal(receiver, other),
            _ => false,
        };
        target_equal && self.exprs_equal(&call.args, &template.args)
    }

    fn function_equal(&mut self, func: &FunctionExpr, template: &FunctionExpr) -> bool {
        if func.params.has_varargs != template.params.has_varargs
            || func.params.names.len() != template.params.names.len()
            || !self.stmts_equal(&func.body, &template.body)
        {
            return false;
        }
        self.capture_binders(&func.params.names, &template.params.names);
        true
    }

    /// Record the candidate names declared where the template declares `BinderKind::Capture`
    fn capture_binders(&mut self, names: &[Binder], template: &[Binder]) {
        for (binder, other) in names.iter().zip(template) {
            if let (BinderKind::Name(name), BinderKind::Capture) = (&binder.kind, &other.kind) {
                self.capture_expr(Expr::ident(name.clone(), binder.span));
            }
        }
    }

    /// Pairwise equality; lists of different length are never equal
    pub fn exprs_equal(&mut self, exprs: &[Expr], template: &[Expr]) -> bool {
        exprs.len() == template.len()
            && exprs
                .iter()
                .zip(template)
                .all(|(expr, other)| self.expr_equal(expr, other))
    }

    pub fn stmt_equal(&mut self, stmt: &Stmt, template: &Stmt) -> bool {
        use StmtKind as S;

        match (&stmt.kind, &template.kind) {
            (
                S::Assign { targets, values },
                S::Assign {
                    targets: t_targets,
                    values: t_values,
                },
            ) => {
                targets.len() == t_targets.len()
                    && values.len() == t_values.len()
                    && self.exprs_equal(targets, t_targets)
                    && self.exprs_equal(values, t_values)
            }

            (
                S::Local { names, values },
                S::Local {
                    names: t_names,
                    values: t_values,
                },
            ) => {
                if names.len() != t_names.len() || !self.exprs_equal(values, t_values) {
                    return false;
                }
                self.capture_binders(names, t_names);
                true
            }

            (S::Call(call), S::Call(other)) => self.expr_equal(call, other),

            (S::Do(body), S::Do(other)) => self.stmts_equal(body, other),

            (
                S::While { condition, body },
                S::While {
                    condition: t_condition,
                    body: t_body,
                },
            )
            | (
                S::Repeat { body, condition },
                S::Repeat {
                    body: t_body,
                    condition: t_condition,
                },
            ) => self.expr_equal(condition, t_condition) && self.stmts_equal(body, t_body),

            (S::LocalFunction { .. }, S::Capture(StmtCapture::LocalFunction))
            | (S::If { .. }, S::Capture(StmtCapture::If)) => {
                self.capture_stmt(stmt);
                true
            }
            // The declared name is not compared.
            (S::LocalFunction { func, .. }, S::LocalFunction { func: other, .. }) => {
                self.function_equal(func, other)
            }

            (
                S::Function {
                    target,
                    method,
                    func,
                },
                S::Function {
                    target: t_target,
                    method: t_method,
                    func: t_func,
                },
            ) => {
                method.is_some() == t_method.is_some()
                    && self.expr_equal(target, t_target)
                    && self.function_equal(func, t_func)
            }

            (S::Return(values), S::Return(other)) => self.exprs_equal(values, other),

            (
                S::If {
                    condition,
                    then_body,
                    else_body,
                },
                S::If {
                    condition: t_condition,
                    then_body: t_then,
                    else_body: t_else,
                },
            ) => {
                self.expr_equal(condition, t_condition)
                    && self.stmts_equal(then_body, t_then)
                    && self.stmts_equal(else_body, t_else)
            }

            (S::Break, S::Break) => true,

            // Start and limit are not compared.
            (
                S::NumericFor { step, body, .. },
                S::NumericFor {
                    step: t_step,
                    body: t_body,
                    ..
                },
            ) => {
                let step_equal = match (step, t_step) {
                    (None, None) => true,
                    (Some(step), Some(t_step)) => self.expr_equal(step, t_step),
                    (Some(step), None) => self.expr_equal(step, &unit_step(template.span)),
                    (None, Some(t_step)) => self.expr_equal(&unit_step(stmt.span), t_step),
                };
                step_equal && self.stmts_equal(body, t_body)
            }

            (
                S::GenericFor { names, exprs, body },
                S::GenericFor {
                    names: t_names,
                    exprs: t_exprs,
                    body: t_body,
                },
            ) => {
                names.len() == t_names.len()
                    && self.exprs_equal(exprs, t_exprs)
                    && self.stmts_equal(body, t_body)
            }

            _ => false,
        }
    }

    /// An empty template sequence matches any candidate sequence.
    pub fn stmts_equal(&mut self, stmts: &[Stmt], template: &[Stmt]) -> bool {
        if template.is_empty() {
            return true;
        }
        stmts.len() == template.len()
            && stmts
                .iter()
                .zip(template)
                .all(|(stmt, other)| self.stmt_equal(stmt, other))
    }
}

/// The step a numeric `for` without one runs with
fn unit_step(span: Span) -> Expr {
    Expr::new(ExprKind::Number("1".into()), span)
}
