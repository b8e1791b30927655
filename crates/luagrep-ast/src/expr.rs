//! Expression AST nodes

use serde::{Deserialize, Serialize};
use crate::{Block, Span};

/// An expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Identifier expression: `x`
    pub fn ident(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Ident(name.into()), span)
    }

    pub fn is_call(&self) -> bool {
        matches!(self.kind, ExprKind::Call(_))
    }

    /// Short name of the node kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::String(_) => "string",
            ExprKind::Number(_) => "number",
            ExprKind::Nil => "nil",
            ExprKind::False => "false",
            ExprKind::True => "true",
            ExprKind::Vararg => "vararg",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Unary { .. } => "unary",
            ExprKind::Arithmetic { .. } => "arithmetic",
            ExprKind::Relational { .. } => "relational",
            ExprKind::Logical { .. } => "logical",
            ExprKind::Concat { .. } => "concat",
            ExprKind::Index { .. } => "index",
            ExprKind::Table(_) => "table",
            ExprKind::Call(_) => "call",
            ExprKind::Function(_) => "function",
            ExprKind::Capture(_) => "capture",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// String literal (unescaped contents): `"hello"`, `[[text]]`
    String(String),

    /// Number literal, kept as written: `42`, `0x1F`, `1e3`
    Number(String),

    Nil,
    False,
    True,

    /// Variadic marker: `...`
    Vararg,

    /// Identifier: `x`, `print`
    Ident(String),

    /// Unary operation: `-x`, `not y`, `#t`
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Arithmetic and bitwise operations: `a + b`, `a // b`, `a << 2`
    Arithmetic {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Comparison: `a == b`, `a < b`
    Relational {
        op: RelOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Short-circuit logic: `a and b`, `a or b`
    Logical {
        op: LogicOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// String concatenation: `a .. b`
    Concat {
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Attribute get: `a.b` (string key) or `a[b]`
    Index {
        object: Box<Expr>,
        key: Box<Expr>,
    },

    /// Table constructor: `{ 1, x = 2, [k] = v }`
    Table(Vec<TableField>),

    /// Function or method call: `f(a)`, `obj:m(a)`
    Call(CallExpr),

    /// Function literal: `function(a, ...) end`
    Function(FunctionExpr),

    /// Template wildcard; never produced by the parser
    Capture(ExprCapture),
}

/// A table constructor field; positional fields have no key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableField {
    pub key: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub target: CallTarget,
    pub args: Vec<Expr>,
    /// Set when the call is parenthesized, truncating its results to one value
    pub adjust_ret: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CallTarget {
    /// Plain call: `f(...)`
    Function(Box<Expr>),
    /// Method call: `receiver:method(...)`
    Method {
        receiver: Box<Expr>,
        method: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionExpr {
    pub params: ParamList,
    pub body: Block,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamList {
    pub names: Vec<Binder>,
    pub has_varargs: bool,
}

/// A declared name: a local variable or a function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binder {
    pub kind: BinderKind,
    pub span: Span,
}

impl Binder {
    pub fn named(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: BinderKind::Name(name.into()),
            span,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            BinderKind::Name(name) => Some(name),
            BinderKind::Capture => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BinderKind {
    Name(String),
    /// Template wildcard capturing whatever name the candidate declares
    Capture,
}

/// Expression wildcards available to templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprCapture {
    Ident,
    String,
    Number,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    Len,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
    And,
    Or,
}
