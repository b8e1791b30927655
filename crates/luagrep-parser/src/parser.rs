//! Recursive descent parser implementation

use luagrep_ast::*;
use luagrep_lexer::{Token, TokenKind};

use crate::ParseError;

/// Priority of unary operators; binary operators above it bind tighter only for `^`
const UNARY_PRIORITY: u8 = 12;

/// Limit on nested blocks and sub-expressions, the same as Lua's own
pub const MAX_NESTING: usize = 200;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

/// A binary operator together with the node family it builds
#[derive(Clone, Copy)]
enum BinOp {
    Arith(ArithOp),
    Rel(RelOp),
    Logic(LogicOp),
    Concat,
}

impl BinOp {
    fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => BinOp::Arith(ArithOp::Add),
            TokenKind::Minus => BinOp::Arith(ArithOp::Sub),
            TokenKind::Star => BinOp::Arith(ArithOp::Mul),
            TokenKind::Slash => BinOp::Arith(ArithOp::Div),
            TokenKind::SlashSlash => BinOp::Arith(ArithOp::FloorDiv),
            TokenKind::Percent => BinOp::Arith(ArithOp::Mod),
            TokenKind::Caret => BinOp::Arith(ArithOp::Pow),
            TokenKind::Amp => BinOp::Arith(ArithOp::BitAnd),
            TokenKind::Pipe => BinOp::Arith(ArithOp::BitOr),
            TokenKind::Tilde => BinOp::Arith(ArithOp::BitXor),
            TokenKind::Shl => BinOp::Arith(ArithOp::Shl),
            TokenKind::Shr => BinOp::Arith(ArithOp::Shr),
            TokenKind::EqEq => BinOp::Rel(RelOp::Eq),
            TokenKind::TildeEq => BinOp::Rel(RelOp::Ne),
            TokenKind::Lt => BinOp::Rel(RelOp::Lt),
            TokenKind::Le => BinOp::Rel(RelOp::Le),
            TokenKind::Gt => BinOp::Rel(RelOp::Gt),
            TokenKind::Ge => BinOp::Rel(RelOp::Ge),
            TokenKind::And => BinOp::Logic(LogicOp::And),
            TokenKind::Or => BinOp::Logic(LogicOp::Or),
            TokenKind::DotDot => BinOp::Concat,
            _ => return None,
        };
        Some(op)
    }

    /// Operator for a compound assignment token: `+=` is `+`
    fn from_compound(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::PlusEq => BinOp::Arith(ArithOp::Add),
            TokenKind::MinusEq => BinOp::Arith(ArithOp::Sub),
            TokenKind::StarEq => BinOp::Arith(ArithOp::Mul),
            TokenKind::SlashEq => BinOp::Arith(ArithOp::Div),
            TokenKind::PercentEq => BinOp::Arith(ArithOp::Mod),
            TokenKind::CaretEq => BinOp::Arith(ArithOp::Pow),
            TokenKind::DotDotEq => BinOp::Concat,
            _ => return None,
        };
        Some(op)
    }

    /// Left and right binding priorities, as in the reference Lua parser
    fn priority(self) -> (u8, u8) {
        match self {
            BinOp::Logic(LogicOp::Or) => (1, 1),
            BinOp::Logic(LogicOp::And) => (2, 2),
            BinOp::Rel(_) => (3, 3),
            BinOp::Arith(ArithOp::BitOr) => (4, 4),
            BinOp::Arith(ArithOp::BitXor) => (5, 5),
            BinOp::Arith(ArithOp::BitAnd) => (6, 6),
            BinOp::Arith(ArithOp::Shl | ArithOp::Shr) => (7, 7),
            BinOp::Concat => (9, 8),
            BinOp::Arith(ArithOp::Add | ArithOp::Sub) => (10, 10),
            BinOp::Arith(ArithOp::Mul | ArithOp::Div | ArithOp::FloorDiv | ArithOp::Mod) => {
                (11, 11)
            }
            BinOp::Arith(ArithOp::Pow) => (14, 13),
        }
    }

    fn build(self, left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        let left = Box::new(left);
        let right = Box::new(right);
        let kind = match self {
            BinOp::Arith(op) => ExprKind::Arithmetic { op, left, right },
            BinOp::Rel(op) => ExprKind::Relational { op, left, right },
            BinOp::Logic(op) => ExprKind::Logical { op, left, right },
            BinOp::Concat => ExprKind::Concat { left, right },
        };
        Expr::new(kind, span)
    }
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // === Utilities ===

    fn current(&self) -> Token {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(token) => token.clone(),
            None => Token {
                kind: TokenKind::Eof,
                span: Span::new(self.source.len(), self.source.len()),
            },
        }
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_ahead(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Move past the current token and return it
    fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                kind.describe(),
                self.peek(),
                self.current().span,
            ))
        }
    }

    fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    fn span(&self) -> Span {
        self.current().span
    }

    /// Span from `start` to the end of the last consumed token
    fn finish(&self, start: Span) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(last) => start.merge(last.span),
            None => start,
        }
    }

    /// Run `f` one nesting level deeper, failing past `MAX_NESTING`
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep {
                limit: MAX_NESTING,
                span: self.span(),
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn consume_name(&mut self) -> Result<(String, Span), ParseError> {
        let token = self.consume(TokenKind::Ident)?;
        Ok((self.text(&token).to_string(), token.span))
    }

    // === Chunk and blocks ===

    pub fn parse_chunk(&mut self) -> Result<Chunk, ParseError> {
        if let Some(bad) = self.tokens.iter().find(|t| t.kind == TokenKind::Error) {
            return Err(ParseError::InvalidToken { span: bad.span });
        }

        let block = self.parse_block()?;
        self.consume(TokenKind::Eof)?;
        Ok(block)
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.nested(Self::parse_block_statements)
    }

    fn parse_block_statements(&mut self) -> Result<Block, ParseError> {
        let mut statements = Vec::new();

        while !self.peek().ends_block() {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            if self.at(TokenKind::Return) {
                statements.push(self.parse_return_stmt()?);
                self.eat(TokenKind::Semicolon);
                break;
            }
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    // === Statements ===

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.span();

        let kind = match self.peek() {
            TokenKind::Do => {
                self.advance();
                let body = self.parse_block()?;
                self.consume(TokenKind::End)?;
                StmtKind::Do(body)
            }
            TokenKind::While => self.parse_while_stmt()?,
            TokenKind::Repeat => self.parse_repeat_stmt()?,
            TokenKind::If => self.parse_if_stmt()?,
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::Function => self.parse_function_stmt()?,
            TokenKind::Local => {
                if self.peek_ahead(1) == TokenKind::Function {
                    self.parse_local_function_stmt()?
                } else {
                    self.parse_local_stmt()?
                }
            }
            TokenKind::Break => {
                self.advance();
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                StmtKind::Continue
            }
            _ => self.parse_expr_stmt()?,
        };

        Ok(Stmt::new(kind, self.finish(start)))
    }

    fn parse_while_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.consume(TokenKind::While)?;
        let condition = self.parse_expr()?;
        self.consume(TokenKind::Do)?;
        let body = self.parse_block()?;
        self.consume(TokenKind::End)?;
        Ok(StmtKind::While { condition, body })
    }

    fn parse_repeat_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.consume(TokenKind::Repeat)?;
        let body = self.parse_block()?;
        self.consume(TokenKind::Until)?;
        let condition = self.parse_expr()?;
        Ok(StmtKind::Repeat { body, condition })
    }

    fn parse_if_stmt(&mut self) -> Result<StmtKind, ParseError> {
        // `if` and `elseif` share the tail
        self.advance();
        let condition = self.parse_expr()?;
        self.consume(TokenKind::Then)?;
        let then_body = self.parse_block()?;

        let else_body = match self.peek() {
            TokenKind::ElseIf => {
                let start = self.span();
                let nested = self.nested(Self::parse_if_stmt)?;
                vec![Stmt::new(nested, self.finish(start))]
            }
            TokenKind::Else => {
                self.advance();
                let body = self.parse_block()?;
                self.consume(TokenKind::End)?;
                body
            }
            _ => {
                self.consume(TokenKind::End)?;
                vec![]
            }
        };

        Ok(StmtKind::If {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_for_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.consume(TokenKind::For)?;
        let (first, _) = self.consume_name()?;

        if self.eat(TokenKind::Eq) {
            let start = self.parse_expr()?;
            self.consume(TokenKind::Comma)?;
            let limit = self.parse_expr()?;
            let step = if self.eat(TokenKind::Comma) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.consume(TokenKind::Do)?;
            let body = self.parse_block()?;
            self.consume(TokenKind::End)?;
            return Ok(StmtKind::NumericFor {
                var: first,
                start,
                limit,
                step,
                body,
            });
        }

        let mut names = vec![first];
        while self.eat(TokenKind::Comma) {
            names.push(self.consume_name()?.0);
        }
        self.consume(TokenKind::In)?;
        let exprs = self.parse_expr_list()?;
        self.consume(TokenKind::Do)?;
        let body = self.parse_block()?;
        self.consume(TokenKind::End)?;
        Ok(StmtKind::GenericFor { names, exprs, body })
    }

    fn parse_function_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.consume(TokenKind::Function)?;

        let (name, span) = self.consume_name()?;
        let mut target = Expr::ident(name, span);
        while self.eat(TokenKind::Dot) {
            let (field, field_span) = self.consume_name()?;
            target = index_by_name(target, field, field_span);
        }

        let method = if self.eat(TokenKind::Colon) {
            Some(self.consume_name()?)
        } else {
            None
        };

        let mut func = self.parse_func_body()?;
        if let Some((_, span)) = &method {
            func.params.names.insert(0, Binder::named("self", *span));
        }

        Ok(StmtKind::Function {
            target,
            method: method.map(|(name, _)| name),
            func,
        })
    }

    fn parse_local_function_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.consume(TokenKind::Local)?;
        self.consume(TokenKind::Function)?;
        let (name, _) = self.consume_name()?;
        let func = self.parse_func_body()?;
        Ok(StmtKind::LocalFunction { name, func })
    }

    fn parse_local_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.consume(TokenKind::Local)?;

        let mut names = Vec::new();
        loop {
            let (name, span) = self.consume_name()?;
            names.push(Binder::named(name, span));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let values = if self.eat(TokenKind::Eq) {
            self.parse_expr_list()?
        } else {
            vec![]
        };

        Ok(StmtKind::Local { names, values })
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.span();
        self.consume(TokenKind::Return)?;

        let values = if self.peek().ends_block() || self.at(TokenKind::Semicolon) {
            vec![]
        } else {
            self.parse_expr_list()?
        };

        Ok(Stmt::new(StmtKind::Return(values), self.finish(start)))
    }

    /// Call statement, assignment, or compound assignment
    fn parse_expr_stmt(&mut self) -> Result<StmtKind, ParseError> {
        let first = self.parse_suffixed_expr()?;

        if let Some(op) = BinOp::from_compound(self.peek()) {
            self.advance();
            check_assignable(&first)?;
            let value = self.parse_expr()?;
            let combined = op.build(first.clone(), value);
            return Ok(StmtKind::Assign {
                targets: vec![first],
                values: vec![combined],
            });
        }

        if self.at(TokenKind::Eq) || self.at(TokenKind::Comma) {
            let mut targets = vec![first];
            while self.eat(TokenKind::Comma) {
                targets.push(self.parse_suffixed_expr()?);
            }
            for target in &targets {
                check_assignable(target)?;
            }
            self.consume(TokenKind::Eq)?;
            let values = self.parse_expr_list()?;
            return Ok(StmtKind::Assign { targets, values });
        }

        if first.is_call() {
            Ok(StmtKind::Call(first))
        } else {
            Err(ParseError::InvalidStatement { span: first.span })
        }
    }

    // === Functions ===

    /// `( params ) block end`
    fn parse_func_body(&mut self) -> Result<FunctionExpr, ParseError> {
        self.consume(TokenKind::LParen)?;

        let mut params = ParamList::default();
        if !self.at(TokenKind::RParen) {
            loop {
                if self.eat(TokenKind::Ellipsis) {
                    params.has_varargs = true;
                    break;
                }
                let (name, span) = self.consume_name()?;
                params.names.push(Binder::named(name, span));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen)?;

        let body = self.parse_block()?;
        self.consume(TokenKind::End)?;
        Ok(FunctionExpr { params, body })
    }

    // === Expressions ===

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_sub_expr(0)
    }

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    /// Precedence climbing: parse operators binding tighter than `limit`
    fn parse_sub_expr(&mut self, limit: u8) -> Result<Expr, ParseError> {
        self.nested(|parser| parser.parse_operators(limit))
    }

    fn parse_operators(&mut self, limit: u8) -> Result<Expr, ParseError> {
        let unary = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Hash => Some(UnaryOp::Len),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };

        let mut left = match unary {
            Some(op) => {
                let start = self.advance().span;
                let operand = self.parse_sub_expr(UNARY_PRIORITY)?;
                let span = start.merge(operand.span);
                Expr::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                )
            }
            None => self.parse_simple_expr()?,
        };

        while let Some(op) = BinOp::from_token(self.peek()) {
            let (left_priority, right_priority) = op.priority();
            if left_priority <= limit {
                break;
            }
            self.advance();
            let right = self.parse_sub_expr(right_priority)?;
            left = op.build(left, right);
        }

        Ok(left)
    }

    fn parse_simple_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.span();

        let kind = match self.peek() {
            TokenKind::Number => {
                let token = self.advance();
                ExprKind::Number(self.text(&token).to_string())
            }
            TokenKind::String | TokenKind::LongString => {
                let token = self.advance();
                ExprKind::String(self.parse_string_literal(&token))
            }
            TokenKind::Nil => {
                self.advance();
                ExprKind::Nil
            }
            TokenKind::True => {
                self.advance();
                ExprKind::True
            }
            TokenKind::False => {
                self.advance();
                ExprKind::False
            }
            TokenKind::Ellipsis => {
                self.advance();
                ExprKind::Vararg
            }
            TokenKind::LBrace => ExprKind::Table(self.parse_table()?),
            TokenKind::Function => {
                self.advance();
                ExprKind::Function(self.parse_func_body()?)
            }
            _ => return self.parse_suffixed_expr(),
        };

        Ok(Expr::new(kind, self.finish(start)))
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            TokenKind::Ident => {
                let (name, span) = self.consume_name()?;
                Ok(Expr::ident(name, span))
            }
            TokenKind::LParen => {
                let start = self.advance().span;
                let mut inner = self.parse_expr()?;
                self.consume(TokenKind::RParen)?;
                if let ExprKind::Call(call) = &mut inner.kind {
                    call.adjust_ret = true;
                }
                inner.span = self.finish(start);
                Ok(inner)
            }
            TokenKind::Eof => Err(ParseError::unexpected(
                "expression",
                TokenKind::Eof,
                self.span(),
            )),
            _ => Err(ParseError::InvalidExpression { span: self.span() }),
        }
    }

    /// `primary { .name | [expr] | :name args | args }`
    fn parse_suffixed_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.span();
        let mut expr = self.parse_primary_expr()?;

        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let (field, span) = self.consume_name()?;
                    expr = index_by_name(expr, field, span);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let key = self.parse_expr()?;
                    self.consume(TokenKind::RBracket)?;
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            key: Box::new(key),
                        },
                        self.finish(start),
                    );
                }
                TokenKind::Colon => {
                    self.advance();
                    let (method, _) = self.consume_name()?;
                    let args = self.parse_call_args()?;
                    let target = CallTarget::Method {
                        receiver: Box::new(expr),
                        method,
                    };
                    expr = call(target, args, self.finish(start));
                }
                TokenKind::LParen | TokenKind::LBrace | TokenKind::String | TokenKind::LongString => {
                    let args = self.parse_call_args()?;
                    expr = call(CallTarget::Function(Box::new(expr)), args, self.finish(start));
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `( explist )`, a table constructor, or a single string literal
    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let start = self.span();
        match self.peek() {
            TokenKind::LParen => {
                self.advance();
                let args = if self.at(TokenKind::RParen) {
                    vec![]
                } else {
                    self.parse_expr_list()?
                };
                self.consume(TokenKind::RParen)?;
                Ok(args)
            }
            TokenKind::LBrace => {
                let fields = self.parse_table()?;
                Ok(vec![Expr::new(ExprKind::Table(fields), self.finish(start))])
            }
            TokenKind::String | TokenKind::LongString => {
                let token = self.advance();
                let value = self.parse_string_literal(&token);
                Ok(vec![Expr::new(ExprKind::String(value), token.span)])
            }
            other => Err(ParseError::unexpected("function arguments", other, start)),
        }
    }

    fn parse_table(&mut self) -> Result<Vec<TableField>, ParseError> {
        self.consume(TokenKind::LBrace)?;
        let mut fields = Vec::new();

        while !self.at(TokenKind::RBrace) {
            let field = match self.peek() {
                TokenKind::LBracket => {
                    self.advance();
                    let key = self.parse_expr()?;
                    self.consume(TokenKind::RBracket)?;
                    self.consume(TokenKind::Eq)?;
                    TableField {
                        key: Some(key),
                        value: self.parse_expr()?,
                    }
                }
                TokenKind::Ident if self.peek_ahead(1) == TokenKind::Eq => {
                    let (name, span) = self.consume_name()?;
                    self.consume(TokenKind::Eq)?;
                    TableField {
                        key: Some(Expr::new(ExprKind::String(name), span)),
                        value: self.parse_expr()?,
                    }
                }
                _ => TableField {
                    key: None,
                    value: self.parse_expr()?,
                },
            };
            fields.push(field);

            if !self.eat(TokenKind::Comma) && !self.eat(TokenKind::Semicolon) {
                break;
            }
        }

        self.consume(TokenKind::RBrace)?;
        Ok(fields)
    }

    fn parse_string_literal(&self, token: &Token) -> String {
        let text = self.text(token);
        if token.kind == TokenKind::LongString {
            return long_string_contents(text);
        }
        // Strip the quotes
        let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or("");
        unescape(inner)
    }
}

fn call(target: CallTarget, args: Vec<Expr>, span: Span) -> Expr {
    Expr::new(
        ExprKind::Call(CallExpr {
            target,
            args,
            adjust_ret: false,
        }),
        span,
    )
}

/// `object.name`, which the tree stores as `object["name"]`
fn index_by_name(object: Expr, name: String, name_span: Span) -> Expr {
    let span = object.span.merge(name_span);
    Expr::new(
        ExprKind::Index {
            object: Box::new(object),
            key: Box::new(Expr::new(ExprKind::String(name), name_span)),
        },
        span,
    )
}

fn check_assignable(target: &Expr) -> Result<(), ParseError> {
    match target.kind {
        ExprKind::Ident(_) | ExprKind::Index { .. } => Ok(()),
        _ => Err(ParseError::InvalidAssignmentTarget { span: target.span }),
    }
}

/// Contents of `[==[ ... ]==]`, dropping a newline right after the opener
fn long_string_contents(text: &str) -> String {
    let level = text[1..].bytes().take_while(|b| *b == b'=').count();
    let open = level + 2;
    let inner = text.get(open..text.len().saturating_sub(open)).unwrap_or("");
    let inner = inner
        .strip_prefix("\r\n")
        .or_else(|| inner.strip_prefix('\n'))
        .unwrap_or(inner);
    inner.to_string()
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            break;
        };
        match escape {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '\n' => out.push('\n'),
            'z' => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            'x' => {
                let hex: String = (0..2).filter_map(|_| chars.next_if(|c| c.is_ascii_hexdigit())).collect();
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            'u' => {
                if chars.next_if_eq(&'{').is_some() {
                    let hex: String = std::iter::from_fn(|| chars.next_if(|c| c.is_ascii_hexdigit())).collect();
                    chars.next_if_eq(&'}');
                    if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        out.push(ch);
                    }
                }
            }
            d if d.is_ascii_digit() => {
                let mut digits = String::from(d);
                while digits.len() < 3 {
                    match chars.next_if(|c| c.is_ascii_digit()) {
                        Some(next) => digits.push(next),
                        None => break,
                    }
                }
                if let Some(ch) = digits.parse::<u32>().ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            other => out.push(other),
        }
    }

    out
}
