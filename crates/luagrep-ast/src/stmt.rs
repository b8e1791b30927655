//! Statement AST nodes

use serde::{Deserialize, Serialize};
use crate::{Binder, Expr, FunctionExpr, Span};

/// A sequence of statements: a chunk, or the body of a block
pub type Block = Vec<Stmt>;

/// A whole source file
pub type Chunk = Block;

/// A statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Short name of the node kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            StmtKind::Assign { .. } => "assignment",
            StmtKind::Local { .. } => "local",
            StmtKind::Call(_) => "call",
            StmtKind::Do(_) => "do",
            StmtKind::While { .. } => "while",
            StmtKind::Repeat { .. } => "repeat",
            StmtKind::LocalFunction { .. } => "local function",
            StmtKind::Function { .. } => "function",
            StmtKind::Return(_) => "return",
            StmtKind::If { .. } => "if",
            StmtKind::Break => "break",
            StmtKind::Continue => "continue",
            StmtKind::NumericFor { .. } => "numeric for",
            StmtKind::GenericFor { .. } => "generic for",
            StmtKind::Capture(_) => "capture",
        }
    }

    /// Nested statement bodies owned by this statement, in source order
    pub fn bodies(&self) -> Vec<&Block> {
        match &self.kind {
            StmtKind::Do(body)
            | StmtKind::While { body, .. }
            | StmtKind::Repeat { body, .. }
            | StmtKind::NumericFor { body, .. }
            | StmtKind::GenericFor { body, .. } => vec![body],
            StmtKind::If {
                then_body,
                else_body,
                ..
            } => vec![then_body, else_body],
            _ => vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// Assignment: `a, b.c = 1, 2`
    Assign {
        targets: Vec<Expr>,
        values: Vec<Expr>,
    },

    /// Local declaration: `local a, b = 1, 2`
    Local {
        names: Vec<Binder>,
        values: Vec<Expr>,
    },

    /// Call statement: `print(x)`; always holds a call expression
    Call(Expr),

    /// Block: `do ... end`
    Do(Block),

    /// `while cond do ... end`
    While {
        condition: Expr,
        body: Block,
    },

    /// `repeat ... until cond`
    Repeat {
        body: Block,
        condition: Expr,
    },

    /// `local function name() ... end`
    LocalFunction {
        name: String,
        func: FunctionExpr,
    },

    /// `function a.b:c() ... end`; `target` is the dotted path, `method` the name after `:`
    Function {
        target: Expr,
        method: Option<String>,
        func: FunctionExpr,
    },

    /// `return a, b`
    Return(Vec<Expr>),

    /// `if c then ... else ... end`; `elseif` nests another `If` in `else_body`
    If {
        condition: Expr,
        then_body: Block,
        else_body: Block,
    },

    Break,

    /// Dialect extension: `continue`
    Continue,

    /// `for i = start, limit, step do ... end`
    NumericFor {
        var: String,
        start: Expr,
        limit: Expr,
        step: Option<Expr>,
        body: Block,
    },

    /// `for k, v in exprs do ... end`
    GenericFor {
        names: Vec<String>,
        exprs: Vec<Expr>,
        body: Block,
    },

    /// Template wildcard; never produced by the parser
    Capture(StmtCapture),
}

/// Statement wildcards available to templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StmtCapture {
    LocalFunction,
    If,
}
