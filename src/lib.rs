pub mod ast;
pub mod cli;
pub mod config;
pub mod convert;
pub mod evaluator;
pub mod filter;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod record;
pub mod session;
pub mod sql;
pub mod value;

pub use ast::{CompOp, GeomOp, JoinOp, Predicate, PredicateKind, Token, TokenKind};
pub use config::{ConfigError, FilterConfig};
pub use convert::{ConvertError, Converter};
pub use evaluator::{EvalError, Evaluator, like_to_regex};
pub use filter::Filter;
pub use lexer::{LexError, Lexer, tokenize};
pub use output::TreePrinter;
pub use parser::{ParseError, Parser, parse};
pub use record::Record;
pub use session::Variables;
pub use sql::{
    BindParams, Dialect, FieldMap, FieldTarget, GeometryProvider, SpatialRequest, SqlContext,
    SqlError, SqlFragment,
};
pub use value::Value;
