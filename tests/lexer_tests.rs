// tests/lexer_tests.rs

use layerfilter::ast::{CompOp, JoinOp, Token};
use layerfilter::lexer::{LexError, Lexer, tokenize};

// ============================================================================
// Operands
// ============================================================================

#[test]
fn test_field_and_variable() {
    let tokens = tokenize("[owner name] {user:guest}").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Field("owner name".into()),
            Token::Variable("user:guest".into()),
            Token::Eof,
        ]
    );
}

#[test]
fn test_string_with_doubled_quote() {
    let tokens = tokenize("'O''Brien'").unwrap();
    assert_eq!(tokens[0], Token::Str("O'Brien".into()));
}

#[test]
fn test_empty_string() {
    assert_eq!(tokenize("''").unwrap()[0], Token::Str(String::new()));
}

#[test]
fn test_numbers() {
    let tokens = tokenize("42 -7 3.25 .5 -0.5").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Integer(42),
            Token::Integer(-7),
            Token::Float(3.25),
            Token::Float(0.5),
            Token::Float(-0.5),
            Token::Eof,
        ]
    );
}

#[test]
fn test_integer_overflow_is_invalid_number() {
    let err = tokenize("[a] = 99999999999999999999").unwrap_err();
    assert_eq!(
        err,
        LexError::InvalidNumber {
            text: "99999999999999999999".into(),
            offset: 6,
        }
    );
}

#[test]
fn test_keyword_prefix_is_not_a_keyword() {
    // "nothing" must not lex as `not` followed by something
    let err = tokenize("nothing").unwrap_err();
    assert!(matches!(err, LexError::UnexpectedChar { ch: 'n', offset: 0 }));
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_comparison_operators() {
    let tokens = tokenize("= <> < <= > >= like ilike").unwrap();
    let ops: Vec<_> = tokens
        .into_iter()
        .filter_map(|t| match t {
            Token::Comparison(op) => Some(op),
            _ => None,
        })
        .collect();
    assert_eq!(
        ops,
        vec![
            CompOp::Equal,
            CompOp::NotEqual,
            CompOp::LessThan,
            CompOp::LessEqual,
            CompOp::GreaterThan,
            CompOp::GreaterEqual,
            CompOp::Like,
            CompOp::ILike,
        ]
    );
}

#[test]
fn test_no_whitespace_needed() {
    let tokens = tokenize("[a]<=1&[b]<>'x'|not([c]in(1,2))").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Field("a".into()),
            Token::Comparison(CompOp::LessEqual),
            Token::Integer(1),
            Token::Join(JoinOp::And),
            Token::Field("b".into()),
            Token::Comparison(CompOp::NotEqual),
            Token::Str("x".into()),
            Token::Join(JoinOp::Or),
            Token::Not,
            Token::LParen,
            Token::Field("c".into()),
            Token::In,
            Token::LParen,
            Token::Integer(1),
            Token::Comma,
            Token::Integer(2),
            Token::RParen,
            Token::RParen,
            Token::Eof,
        ]
    );
}

#[test]
fn test_bang_equal_is_not_a_token() {
    let err = tokenize("[a] != 1").unwrap_err();
    assert!(matches!(err, LexError::UnexpectedChar { ch: '!', offset: 4 }));
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_unexpected_char_offset_counts_characters() {
    let err = tokenize("[straße] = #").unwrap_err();
    assert_eq!(err.offset(), 11);
}

#[test]
fn test_eof_repeats() {
    let mut lexer = Lexer::new("  ");
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_token_kinds() {
    let kinds: Vec<_> = tokenize("[a] in ({v}, 'x', 1, null) & not true")
        .unwrap()
        .iter()
        .map(|t| t.kind().as_str())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "field", "func_op", "punct", "variable", "punct", "str_const", "punct", "num_const",
            "punct", "named_const", "punct", "join_op", "unary_op", "bool_const", "eof",
        ]
    );
}

#[test]
fn test_offsets_stay_exact_on_long_input() {
    let clause = "[straße] = 'größe' | ";
    let input = format!("{}#", clause.repeat(2000));
    let err = tokenize(&input).unwrap_err();
    assert_eq!(err.offset(), clause.chars().count() * 2000);
}
