use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::trace;

use crate::ast::{CompOp, JoinOp, Token, TokenKind};

/// Errors raised while scanning an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// No token rule matches at this position
    #[error("unexpected character '{ch}' at position {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    /// A numeric literal that does not fit its type
    #[error("invalid number '{text}' at position {offset}")]
    InvalidNumber { text: String, offset: usize },
}

impl LexError {
    /// Character offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedChar { offset, .. } | LexError::InvalidNumber { offset, .. } => {
                *offset
            }
        }
    }
}

type Cast = fn(&str) -> Option<Token>;

struct Rule {
    kind: TokenKind,
    pattern: Regex,
    cast: Cast,
}

fn cast_field(s: &str) -> Option<Token> {
    Some(Token::Field(s.to_string()))
}

fn cast_variable(s: &str) -> Option<Token> {
    Some(Token::Variable(s.to_string()))
}

fn cast_str(s: &str) -> Option<Token> {
    Some(Token::Str(s.replace("''", "'")))
}

fn cast_float(s: &str) -> Option<Token> {
    s.parse::<f64>().ok().map(Token::Float)
}

fn cast_integer(s: &str) -> Option<Token> {
    s.parse::<i64>().ok().map(Token::Integer)
}

fn cast_bool(s: &str) -> Option<Token> {
    Some(Token::Boolean(s.eq_ignore_ascii_case("true")))
}

fn cast_null(_: &str) -> Option<Token> {
    Some(Token::Null)
}

fn cast_comparison(s: &str) -> Option<Token> {
    CompOp::from_symbol(s).map(Token::Comparison)
}

fn cast_in(_: &str) -> Option<Token> {
    Some(Token::In)
}

fn cast_not(_: &str) -> Option<Token> {
    Some(Token::Not)
}

fn cast_join(s: &str) -> Option<Token> {
    match s {
        "&" => Some(Token::Join(JoinOp::And)),
        "|" => Some(Token::Join(JoinOp::Or)),
        _ => None,
    }
}

fn cast_punct(s: &str) -> Option<Token> {
    match s {
        "(" => Some(Token::LParen),
        ")" => Some(Token::RParen),
        "," => Some(Token::Comma),
        _ => None,
    }
}

// The order of this table is part of the grammar: floats before integers,
// keyword literals before keyword operators, two-character comparisons
// before single-character ones. Capture group 1 is handed to the cast.
const RULE_TABLE: &[(TokenKind, &str, bool, Cast)] = &[
    (TokenKind::Field, r"^\[([^\]]+)\]", false, cast_field),
    (TokenKind::Variable, r"^\{([^{}]+)\}", false, cast_variable),
    (TokenKind::StrConst, r"^'((?:[^']|'')*)'", false, cast_str),
    (TokenKind::NumConst, r"^(-?[0-9]*\.[0-9]+)", false, cast_float),
    (TokenKind::NumConst, r"^(-?[0-9]+)", false, cast_integer),
    (TokenKind::BoolConst, r"^(true|false)\b", true, cast_bool),
    (TokenKind::NamedConst, r"^(null)\b", true, cast_null),
    (TokenKind::CompOp, r"^(<>|<=|>=)", false, cast_comparison),
    (TokenKind::CompOp, r"^([<>=])", false, cast_comparison),
    (TokenKind::CompOp, r"^(like|ilike)\b", true, cast_comparison),
    (TokenKind::FuncOp, r"^(in)\b", true, cast_in),
    (TokenKind::UnaryOp, r"^(not)\b", true, cast_not),
    (TokenKind::JoinOp, r"^([&|])", false, cast_join),
    (TokenKind::Punct, r"^([(),])", false, cast_punct),
];

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(kind, pattern, case_insensitive, cast)| Rule {
            kind,
            pattern: RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()
                .expect("lexer patterns are valid regexes"),
            cast,
        })
        .collect()
});

/// On-demand scanner over a filter expression.
///
/// Tokens are produced one at a time as the parser pulls them, with one
/// token of lookahead through [`Lexer::peek_token`].
pub struct Lexer {
    input: String,
    /// Byte offset of the next unscanned character
    position: usize,
    /// Character offset of the same point
    char_position: usize,
    /// Character offset of the most recently scanned token
    token_start: usize,
    peeked: Option<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.to_string(),
            position: 0,
            char_position: 0,
            token_start: 0,
            peeked: None,
        }
    }

    /// Character offset where the most recently scanned token starts.
    ///
    /// After a [`peek_token`](Self::peek_token) this is the offset of the
    /// peeked token.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    pub fn peek_token(&mut self) -> Result<&Token, LexError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// Moves past `bytes` bytes of input, all of them ASCII whitespace or a
    /// whole token.
    fn consume(&mut self, bytes: usize) {
        let consumed = &self.input[self.position..self.position + bytes];
        self.char_position += consumed.chars().count();
        self.position += bytes;
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.position..];
        let trimmed = rest.trim_start_matches([' ', '\t', '\n', '\r']);
        self.consume(rest.len() - trimmed.len());
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.char_position;

        let rest = &self.input[self.position..];
        let Some(ch) = rest.chars().next() else {
            return Ok(Token::Eof);
        };

        for rule in RULES.iter() {
            let Some(caps) = rule.pattern.captures(rest) else {
                continue;
            };
            let whole = caps.get(0).map_or(0, |m| m.end());
            let text = caps.get(1).map_or("", |m| m.as_str());
            let token = (rule.cast)(text).ok_or_else(|| LexError::InvalidNumber {
                text: text.to_string(),
                offset: self.token_start,
            })?;
            trace!(kind = %rule.kind, offset = self.token_start, "scanned token");
            self.consume(whole);
            return Ok(token);
        }

        Err(LexError::UnexpectedChar {
            ch,
            offset: self.token_start,
        })
    }
}

/// Scans a whole expression, up to and including `Eof`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("like ILIKE in Not true FALSE null");
    assert_eq!(lexer.next_token().unwrap(), Token::Comparison(CompOp::Like));
    assert_eq!(lexer.next_token().unwrap(), Token::Comparison(CompOp::ILike));
    assert_eq!(lexer.next_token().unwrap(), Token::In);
    assert_eq!(lexer.next_token().unwrap(), Token::Not);
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_peek_does_not_consume() {
    let mut lexer = Lexer::new("[a] = 1");
    assert_eq!(lexer.peek_token().unwrap(), &Token::Field("a".into()));
    assert_eq!(lexer.peek_token().unwrap(), &Token::Field("a".into()));
    assert_eq!(lexer.next_token().unwrap(), Token::Field("a".into()));
    assert_eq!(lexer.peek_token().unwrap(), &Token::Comparison(CompOp::Equal));
    assert_eq!(lexer.token_start(), 4);
}
