use std::fmt;

use crate::ast::{CompOp, JoinOp};

/// Lexical token produced by the [`Lexer`](crate::lexer::Lexer).
///
/// Equality compares kind and value, which is what the parser uses to detect
/// expected punctuation and operators.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Operands
    /// Bracketed field reference
    ///
    /// # Examples
    /// ```text
    /// [status]
    /// [owner name]
    /// ```
    Field(String),

    /// Braced session variable, optionally carrying a default
    ///
    /// The raw text between the braces is kept; `name:default` is split
    /// when the variable is resolved, not here.
    ///
    /// # Examples
    /// ```text
    /// {user}
    /// {user:guest}
    /// ```
    Variable(String),

    /// Single-quoted string literal (`''` is an embedded quote)
    Str(String),

    /// Floating point literal
    Float(f64),

    /// Integer literal
    Integer(i64),

    /// `true` / `false`, any case
    Boolean(bool),

    /// `null`, any case
    Null,

    // Operators
    /// `=`, `<>`, `<`, `<=`, `>`, `>=`, `like`, `ilike`
    Comparison(CompOp),

    /// `in`
    In,

    /// `not`
    Not,

    /// `&` / `|`
    Join(JoinOp),

    // Punctuation
    LParen,
    RParen,
    Comma,

    /// End of input
    Eof,
}

/// Coarse token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Field,
    Variable,
    StrConst,
    NumConst,
    BoolConst,
    NamedConst,
    CompOp,
    FuncOp,
    UnaryOp,
    JoinOp,
    Punct,
    Eof,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Field(_) => TokenKind::Field,
            Token::Variable(_) => TokenKind::Variable,
            Token::Str(_) => TokenKind::StrConst,
            Token::Float(_) | Token::Integer(_) => TokenKind::NumConst,
            Token::Boolean(_) => TokenKind::BoolConst,
            Token::Null => TokenKind::NamedConst,
            Token::Comparison(_) => TokenKind::CompOp,
            Token::In => TokenKind::FuncOp,
            Token::Not => TokenKind::UnaryOp,
            Token::Join(_) => TokenKind::JoinOp,
            Token::LParen | Token::RParen | Token::Comma => TokenKind::Punct,
            Token::Eof => TokenKind::Eof,
        }
    }
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Field => "field",
            TokenKind::Variable => "variable",
            TokenKind::StrConst => "str_const",
            TokenKind::NumConst => "num_const",
            TokenKind::BoolConst => "bool_const",
            TokenKind::NamedConst => "named_const",
            TokenKind::CompOp => "comp_op",
            TokenKind::FuncOp => "func_op",
            TokenKind::UnaryOp => "unary_op",
            TokenKind::JoinOp => "join_op",
            TokenKind::Punct => "punct",
            TokenKind::Eof => "eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Field(name) => write!(f, "[{name}]"),
            Token::Variable(name) => write!(f, "{{{name}}}"),
            Token::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::Float(n) => write!(f, "{n}"),
            Token::Integer(n) => write!(f, "{n}"),
            Token::Boolean(b) => write!(f, "{b}"),
            Token::Null => f.write_str("null"),
            Token::Comparison(op) => write!(f, "{op}"),
            Token::In => f.write_str("in"),
            Token::Not => f.write_str("not"),
            Token::Join(op) => write!(f, "{op}"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Eof => f.write_str("end of input"),
        }
    }
}
