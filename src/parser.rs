use thiserror::Error;

use crate::{
    ast::{JoinOp, MAX_DEPTH, Predicate, Token},
    lexer::{LexError, Lexer},
};

/// Syntax errors raised while parsing an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A specific token was required
    #[error("expected {expected}, got {found} at position {offset}")]
    Unexpected {
        expected: String,
        found: Token,
        offset: usize,
    },

    /// A field, variable or constant was required
    #[error("expected an operand, got {found} at position {offset}")]
    ExpectedOperand { found: Token, offset: usize },

    /// An operand that is not a boolean literal was left without an operator
    #[error("expected a comparison or 'in' after {operand}, got {found} at position {offset}")]
    ExpectedOperator {
        operand: String,
        found: Token,
        offset: usize,
    },

    /// Parentheses or `not` nested past [`MAX_NESTING`], or a tree taller
    /// than [`MAX_DEPTH`]
    #[error("expression nested deeper than {limit} levels at position {offset}")]
    TooDeep { limit: usize, offset: usize },
}

impl ParseError {
    /// Character offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lex(e) => e.offset(),
            ParseError::Unexpected { offset, .. }
            | ParseError::ExpectedOperand { offset, .. }
            | ParseError::ExpectedOperator { offset, .. }
            | ParseError::TooDeep { offset, .. } => *offset,
        }
    }
}

/// Recursive-descent parser for filter expressions.
///
/// ```text
/// expr         := and_expr { '|' and_expr }
/// and_expr     := clause { '&' clause }
/// clause       := 'not' clause | bool_clause
/// bool_clause  := '(' expr ')' | bool_expr
/// bool_expr    := operand [ (comp_op | 'in') rhs ]
/// rhs          := operand | operand_list
/// operand_list := '(' operand { ',' operand } ')'
/// ```
pub struct Parser {
    lexer: Lexer,
    /// Open parentheses and `not`s around the clause being parsed
    nesting: usize,
}

/// Deepest run of parentheses and `not` accepted in one expression.
pub const MAX_NESTING: usize = 100;

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Parser { lexer, nesting: 0 }
    }

    fn peek(&mut self) -> Result<Token, ParseError> {
        Ok(self.lexer.peek_token()?.clone())
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        Ok(self.lexer.next_token()?)
    }

    fn check(&mut self, token: &Token) -> Result<bool, ParseError> {
        Ok(self.lexer.peek_token()? == token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        let found = self.peek()?;
        if found != expected {
            return Err(ParseError::Unexpected {
                expected: expected.to_string(),
                found,
                offset: self.lexer.token_start(),
            });
        }
        self.advance()?;
        Ok(())
    }

    /// Parse a complete expression; the whole input must be consumed.
    pub fn parse(&mut self) -> Result<Predicate, ParseError> {
        let predicate = self.parse_expression()?;
        self.expect(Token::Eof)?;
        if predicate.depth() > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                offset: self.lexer.token_start(),
            });
        }
        Ok(predicate)
    }

    pub fn parse_expression(&mut self) -> Result<Predicate, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Predicate, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::Join(JoinOp::Or))? {
            self.advance()?;
            let right = self.parse_and()?;
            left = Predicate::join(JoinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Predicate, ParseError> {
        let mut left = self.parse_clause()?;

        while self.check(&Token::Join(JoinOp::And))? {
            self.advance()?;
            let right = self.parse_clause()?;
            left = Predicate::join(JoinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_clause(&mut self) -> Result<Predicate, ParseError> {
        self.lexer.peek_token()?;
        if self.nesting >= MAX_NESTING {
            return Err(ParseError::TooDeep {
                limit: MAX_NESTING,
                offset: self.lexer.token_start(),
            });
        }

        self.nesting += 1;
        let clause = self.parse_nested_clause();
        self.nesting -= 1;
        clause
    }

    fn parse_nested_clause(&mut self) -> Result<Predicate, ParseError> {
        if self.check(&Token::Not)? {
            self.advance()?;
            let inner = self.parse_clause()?; // right-associative
            return Ok(Predicate::negate(inner));
        }
        self.parse_bool_clause()
    }

    fn parse_bool_clause(&mut self) -> Result<Predicate, ParseError> {
        if self.check(&Token::LParen)? {
            self.advance()?;
            let inner = self.parse_expression()?;
            self.expect(Token::RParen)?;
            return Ok(inner);
        }
        self.parse_bool_expr()
    }

    fn parse_bool_expr(&mut self) -> Result<Predicate, ParseError> {
        let left = self.parse_operand()?;

        match self.peek()? {
            Token::Comparison(op) => {
                self.advance()?;
                let right = self.parse_operand()?;
                Ok(Predicate::compare(op, left, right))
            }
            Token::In => {
                self.advance()?;
                let list = if self.check(&Token::LParen)? {
                    self.parse_operand_list()?
                } else {
                    self.parse_operand()?
                };
                Ok(Predicate::is_in(left, list))
            }
            // A bare boolean literal is a complete clause
            _ if matches!(left, Predicate::Boolean(_)) => Ok(left),
            found => Err(ParseError::ExpectedOperator {
                operand: left.to_string(),
                found,
                offset: self.lexer.token_start(),
            }),
        }
    }

    fn parse_operand_list(&mut self) -> Result<Predicate, ParseError> {
        self.expect(Token::LParen)?;

        let mut items = vec![self.parse_operand()?];
        while self.check(&Token::Comma)? {
            self.advance()?;
            items.push(self.parse_operand()?);
        }

        self.expect(Token::RParen)?;
        Ok(Predicate::OperandList(items))
    }

    fn parse_operand(&mut self) -> Result<Predicate, ParseError> {
        let token = self.peek()?;
        let operand = match token {
            Token::Field(name) => Predicate::Field(name),
            Token::Variable(name) => Predicate::Variable(name),
            Token::Str(s) => Predicate::Str(s),
            Token::Integer(n) => Predicate::Integer(n),
            Token::Float(n) => Predicate::Float(n),
            Token::Boolean(b) => Predicate::Boolean(b),
            Token::Null => Predicate::Null,
            found => {
                return Err(ParseError::ExpectedOperand {
                    found,
                    offset: self.lexer.token_start(),
                });
            }
        };
        self.advance()?;
        Ok(operand)
    }
}

/// Parse an expression string into a predicate tree.
pub fn parse(input: &str) -> Result<Predicate, ParseError> {
    Parser::new(Lexer::new(input)).parse()
}
