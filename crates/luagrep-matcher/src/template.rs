//! Templates and wildcard lowering
//!
//! Templates are written in ordinary Lua. Since the grammar has no wildcard
//! syntax, wildcards are spelled with reserved names:
//!
//! | Marker | Lowered to |
//! |---|---|
//! | `_IdentExpr_` (expression) | `ExprKind::Capture(ExprCapture::Ident)` |
//! | `_IdentExpr_` (local or parameter name) | `BinderKind::Capture` |
//! | `_StringExpr_` | `ExprKind::Capture(ExprCapture::String)` |
//! | `_NumberExpr_` | `ExprKind::Capture(ExprCapture::Number)` |
//! | `_FunctionExpr_` | `ExprKind::Capture(ExprCapture::Function)` |
//! | `local function _LocalFunctionStmt_() end` | `StmtKind::Capture(StmtCapture::LocalFunction)` |
//! | `_IfStmt_()` (call statement) | `StmtKind::Capture(StmtCapture::If)` |
//!
//! Lowering happens once in [`Template::new`]; the matcher itself only ever
//! looks at capture variants, never at marker names.

use luagrep_ast::*;
use serde::Serialize;

use crate::MatchError;

pub const IDENT_MARKER: &str = "_IdentExpr_";
pub const STRING_MARKER: &str = "_StringExpr_";
pub const NUMBER_MARKER: &str = "_NumberExpr_";
pub const FUNCTION_MARKER: &str = "_FunctionExpr_";
pub const LOCAL_FUNCTION_MARKER: &str = "_LocalFunctionStmt_";
pub const IF_MARKER: &str = "_IfStmt_";

/// A non-empty, lowered statement sequence to search for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    stmts: Vec<Stmt>,
    depth: usize,
}

impl Template {
    /// Lower marker names into capture variants.
    ///
    /// Nodes that already are capture variants pass through unchanged.
    pub fn new(chunk: Vec<Stmt>) -> Result<Self, MatchError> {
        if chunk.is_empty() {
            return Err(MatchError::EmptyTemplate);
        }
        let stmts: Vec<Stmt> = chunk.into_iter().map(lower_stmt).collect();
        let depth = block_depth(&stmts);
        Ok(Self { stmts, depth })
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    /// Deepest scope nesting in the template, counting the template itself
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl TryFrom<Vec<Stmt>> for Template {
    type Error = MatchError;

    fn try_from(chunk: Vec<Stmt>) -> Result<Self, Self::Error> {
        Template::new(chunk)
    }
}

fn expr_marker(name: &str) -> Option<ExprCapture> {
    match name {
        IDENT_MARKER => Some(ExprCapture::Ident),
        STRING_MARKER => Some(ExprCapture::String),
        NUMBER_MARKER => Some(ExprCapture::Number),
        FUNCTION_MARKER => Some(ExprCapture::Function),
        _ => None,
    }
}

/// `_IfStmt_(...)` as a call statement
fn is_if_marker(call: &Expr) -> bool {
    match &call.kind {
        ExprKind::Call(CallExpr {
            target: CallTarget::Function(callee),
            ..
        }) => matches!(&callee.kind, ExprKind::Ident(name) if name == IF_MARKER),
        _ => false,
    }
}

fn lower_block(block: Block) -> Block {
    block.into_iter().map(lower_stmt).collect()
}

fn lower_exprs(exprs: Vec<Expr>) -> Vec<Expr> {
    exprs.into_iter().map(lower_expr).collect()
}

fn lower_binder(binder: Binder) -> Binder {
    match binder.kind {
        BinderKind::Name(ref name) if name == IDENT_MARKER => Binder {
            kind: BinderKind::Capture,
            span: binder.span,
        },
        _ => binder,
    }
}

fn lower_function(func: FunctionExpr) -> FunctionExpr {
    FunctionExpr {
        params: ParamList {
            names: func.params.names.into_iter().map(lower_binder).collect(),
            has_varargs: func.params.has_varargs,
        },
        body: lower_block(func.body),
    }
}

fn lower_stmt(stmt: Stmt) -> Stmt {
    let span = stmt.span;
    let kind = match stmt.kind {
        StmtKind::LocalFunction { name, .. } if name == LOCAL_FUNCTION_MARKER => {
            StmtKind::Capture(StmtCapture::LocalFunction)
        }
        StmtKind::Call(call) if is_if_marker(&call) => StmtKind::Capture(StmtCapture::If),

        StmtKind::Assign { targets, values } => StmtKind::Assign {
            targets: lower_exprs(targets),
            values: lower_exprs(values),
        },
        StmtKind::Local { names, values } => StmtKind::Local {
            names: names.into_iter().map(lower_binder).collect(),
            values: lower_exprs(values),
        },
        StmtKind::Call(call) => StmtKind::Call(lower_expr(call)),
        StmtKind::Do(body) => StmtKind::Do(lower_block(body)),
        StmtKind::While { condition, body } => StmtKind::While {
            condition: lower_expr(condition),
            body: lower_block(body),
        },
        StmtKind::Repeat { body, condition } => StmtKind::Repeat {
            body: lower_block(body),
            condition: lower_expr(condition),
        },
        StmtKind::LocalFunction { name, func } => StmtKind::LocalFunction {
            name,
            func: lower_function(func),
        },
        StmtKind::Function {
            target,
            method,
            func,
        } => StmtKind::Function {
            target: lower_expr(target),
            method,
            func: lower_function(func),
        },
        StmtKind::Return(values) => StmtKind::Return(lower_exprs(values)),
        StmtKind::If {
            condition,
            then_body,
            else_body,
        } => StmtKind::If {
            condition: lower_expr(condition),
            then_body: lower_block(then_body),
            else_body: lower_block(else_body),
        },
        StmtKind::NumericFor {
            var,
            start,
            limit,
            step,
            body,
        } => StmtKind::NumericFor {
            var,
            start: lower_expr(start),
            limit: lower_expr(limit),
            step: step.map(lower_expr),
            body: lower_block(body),
        },
        StmtKind::GenericFor { names, exprs, body } => StmtKind::GenericFor {
            names,
            exprs: lower_exprs(exprs),
            body: lower_block(body),
        },
        kind @ (StmtKind::Break | StmtKind::Continue | StmtKind::Capture(_)) => kind,
    };
    Stmt::new(kind, span)
}

fn lower_expr(expr: Expr) -> Expr {
    let span = expr.span;
    let boxed = |e: Box<Expr>| Box::new(lower_expr(*e));
    let kind = match expr.kind {
        ExprKind::Ident(name) => match expr_marker(&name) {
            Some(capture) => ExprKind::Capture(capture),
            None => ExprKind::Ident(name),
        },
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op,
            operand: boxed(operand),
        },
        ExprKind::Arithmetic { op, left, right } => ExprKind::Arithmetic {
            op,
            left: boxed(left),
            right: boxed(right),
        },
        ExprKind::Relational { op, left, right } => ExprKind::Relational {
            op,
            left: boxed(left),
            right: boxed(right),
        },
        ExprKind::Logical { op, left, right } => ExprKind::Logical {
            op,
            left: boxed(left),
            right: boxed(right),
        },
        ExprKind::Concat { left, right } => ExprKind::Concat {
            left: boxed(left),
            right: boxed(right),
        },
        ExprKind::Index { object, key } => ExprKind::Index {
            object: boxed(object),
            key: boxed(key),
        },
        ExprKind::Table(fields) => ExprKind::Table(
            fields
                .into_iter()
                .map(|field| TableField {
                    key: field.key.map(lower_expr),
                    value: lower_expr(field.value),
                })
                .collect(),
        ),
        ExprKind::Call(call) => ExprKind::Call(CallExpr {
            target: match call.target {
                CallTarget::Function(callee) => CallTarget::Function(boxed(callee)),
                CallTarget::Method { receiver, method } => CallTarget::Method {
                    receiver: boxed(receiver),
                    method,
                },
            },
            args: lower_exprs(call.args),
            adjust_ret: call.adjust_ret,
        }),
        ExprKind::Function(func) => ExprKind::Function(lower_function(func)),
        kind => kind,
    };
    Expr::new(kind, span)
}

/// Scopes nested under `block`, counting the block itself
fn block_depth(block: &[Stmt]) -> usize {
    1 + block.iter().map(stmt_depth).max().unwrap_or(0)
}

fn exprs_depth<'a>(exprs: impl IntoIterator<Item = &'a Expr>) -> usize {
    exprs.into_iter().map(expr_depth).max().unwrap_or(0)
}

fn stmt_depth(stmt: &Stmt) -> usize {
    let bodies = stmt
        .bodies()
        .into_iter()
        .map(|body| block_depth(body))
        .max()
        .unwrap_or(0);
    let exprs = match &stmt.kind {
        StmtKind::Assign { targets, values } => exprs_depth(targets.iter().chain(values)),
        StmtKind::Local { values, .. } | StmtKind::Return(values) => exprs_depth(values),
        StmtKind::Call(call) => expr_depth(call),
        StmtKind::While { condition, .. }
        | StmtKind::Repeat { condition, .. }
        | StmtKind::If { condition, .. } => expr_depth(condition),
        StmtKind::LocalFunction { func, .. } => block_depth(&func.body),
        StmtKind::Function { target, func, .. } => expr_depth(target).max(block_depth(&func.body)),
        StmtKind::NumericFor {
            start,
            limit,
            step,
            ..
        } => exprs_depth([start, limit].into_iter().chain(step)),
        StmtKind::GenericFor { exprs, .. } => exprs_depth(exprs),
        StmtKind::Do(_) | StmtKind::Break | StmtKind::Continue | StmtKind::Capture(_) => 0,
    };
    bodies.max(exprs)
}

/// Scopes opened by function literals inside `expr`; plain operators add nothing
fn expr_depth(expr: &Expr) -> usize {
    match &expr.kind {
        ExprKind::Unary { operand, .. } => expr_depth(operand),
        ExprKind::Arithmetic { left, right, .. }
        | ExprKind::Relational { left, right, .. }
        | ExprKind::Logical { left, right, .. }
        | ExprKind::Concat { left, right } => expr_depth(left).max(expr_depth(right)),
        ExprKind::Index { object, key } => expr_depth(object).max(expr_depth(key)),
        ExprKind::Table(fields) => fields
            .iter()
            .map(|f| f.key.as_ref().map_or(0, expr_depth).max(expr_depth(&f.value)))
            .max()
            .unwrap_or(0),
        ExprKind::Call(call) => {
            let target = match &call.target {
                CallTarget::Function(callee) => expr_depth(callee),
                CallTarget::Method { receiver, .. } => expr_depth(receiver),
            };
            target.max(exprs_depth(&call.args))
        }
        ExprKind::Function(func) => block_depth(&func.body),
        _ => 0,
    }
}
