//! Token definitions for the Lua dialect

use logos::{Lexer, Logos};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]  // Skip whitespace
#[logos(skip r"#![^\n]*")]      // Skip shebang line
pub enum TokenKind {
    // === Keywords ===
    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("elseif")]
    ElseIf,
    #[token("end")]
    End,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("local")]
    Local,
    #[token("nil")]
    Nil,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("repeat")]
    Repeat,
    #[token("return")]
    Return,
    #[token("then")]
    Then,
    #[token("true")]
    True,
    #[token("until")]
    Until,
    #[token("while")]
    While,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("#")]
    Hash,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("~")]
    Tilde,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,

    #[token("==")]
    EqEq,
    #[token("~=")]
    TildeEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("=")]
    Eq,

    // Compound assignment (dialect extension)
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("^=")]
    CaretEq,
    #[token("..=")]
    DotDotEq,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // === Punctuation ===
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("...")]
    Ellipsis,

    // === Literals ===
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xX][0-9a-fA-F]+(\.[0-9a-fA-F]*)?([pP][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\(.|\n))*""#)]
    #[regex(r#"'([^'\\\n]|\\(.|\n))*'"#)]
    String,

    /// `[[...]]`, `[==[...]==]`
    #[regex(r"\[=*\[", long_bracket)]
    LongString,

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// `-- line` or `--[[ long ]]`; dropped by `tokenize`
    #[regex(r"--", comment)]
    Comment,

    // === Special ===
    Error,
    Eof,
}

/// Level of a long bracket opener such as `[==[` (the number of `=`)
fn bracket_level(opener: &str) -> Option<usize> {
    let inner = opener.strip_prefix('[')?;
    let equals = inner.bytes().take_while(|b| *b == b'=').count();
    (inner.as_bytes().get(equals) == Some(&b'[')).then_some(equals)
}

/// Consume input up to and including the closing bracket of the given level
fn close_long_bracket(lex: &mut Lexer<TokenKind>, level: usize) -> bool {
    let closer = format!("]{}]", "=".repeat(level));
    match lex.remainder().find(&closer) {
        Some(offset) => {
            lex.bump(offset + closer.len());
            true
        }
        None => false,
    }
}

fn long_bracket(lex: &mut Lexer<TokenKind>) -> bool {
    match bracket_level(lex.slice()) {
        Some(level) => close_long_bracket(lex, level),
        None => false,
    }
}

fn comment(lex: &mut Lexer<TokenKind>) -> bool {
    let remainder = lex.remainder();
    let opener_len = remainder
        .strip_prefix('[')
        .map(|rest| rest.bytes().take_while(|b| *b == b'=').count() + 2);
    if let Some(len) = opener_len {
        if let Some(level) = remainder.get(..len).and_then(bracket_level) {
            lex.bump(len);
            return close_long_bracket(lex, level);
        }
    }
    let line_len = remainder.find('\n').unwrap_or(remainder.len());
    lex.bump(line_len);
    true
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::And
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Do
                | TokenKind::Else
                | TokenKind::ElseIf
                | TokenKind::End
                | TokenKind::False
                | TokenKind::For
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::In
                | TokenKind::Local
                | TokenKind::Nil
                | TokenKind::Not
                | TokenKind::Or
                | TokenKind::Repeat
                | TokenKind::Return
                | TokenKind::Then
                | TokenKind::True
                | TokenKind::Until
                | TokenKind::While
        )
    }

    /// Whether this token closes a block
    pub fn ends_block(&self) -> bool {
        matches!(
            self,
            TokenKind::End
                | TokenKind::Else
                | TokenKind::ElseIf
                | TokenKind::Until
                | TokenKind::Eof
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::And => "'and'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Do => "'do'",
            TokenKind::Else => "'else'",
            TokenKind::ElseIf => "'elseif'",
            TokenKind::End => "'end'",
            TokenKind::False => "'false'",
            TokenKind::For => "'for'",
            TokenKind::Function => "'function'",
            TokenKind::If => "'if'",
            TokenKind::In => "'in'",
            TokenKind::Local => "'local'",
            TokenKind::Nil => "'nil'",
            TokenKind::Not => "'not'",
            TokenKind::Or => "'or'",
            TokenKind::Repeat => "'repeat'",
            TokenKind::Return => "'return'",
            TokenKind::Then => "'then'",
            TokenKind::True => "'true'",
            TokenKind::Until => "'until'",
            TokenKind::While => "'while'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::SlashSlash => "'//'",
            TokenKind::Percent => "'%'",
            TokenKind::Caret => "'^'",
            TokenKind::Hash => "'#'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Tilde => "'~'",
            TokenKind::Shl => "'<<'",
            TokenKind::Shr => "'>>'",
            TokenKind::EqEq => "'=='",
            TokenKind::TildeEq => "'~='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::Eq => "'='",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::CaretEq => "'^='",
            TokenKind::DotDotEq => "'..='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::ColonColon => "'::'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::DotDot => "'..'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::LongString => "long string",
            TokenKind::Ident => "identifier",
            TokenKind::Comment => "comment",
            TokenKind::Error => "error",
            TokenKind::Eof => "end of file",
        }
    }
}
