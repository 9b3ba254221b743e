//! # Filter Expression Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the tree produced when a layer filter
//! expression is parsed. A filter is a boolean predicate over one record:
//!
//! ```text
//! [status] = 'open' & ([age] >= 18 | [owner] = {user:guest})
//! ```
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Comparison, logical and spatial operators
//! - **[predicate]** - Tree nodes, one variant per node kind
//!
//! ## Operands
//!
//! - `[name]` - field of the record
//! - `{name}` / `{name:default}` - session variable, resolved at evaluation
//!   or generation time
//! - `'text'`, `42`, `1.5`, `true`, `null` - constants
//!
//! ## Operators
//!
//! Comparisons `= <> < <= > >= like ilike`, membership `in (...)`,
//! negation `not`, and the connectives `&` (binds tighter) and `|`.
//!
//! ## One Tree, Two Engines
//!
//! A parsed tree can be compiled to a `WHERE` fragment in the SQLite or the
//! GeoServer CQL dialect ([`crate::sql`]), or evaluated directly against a
//! record ([`crate::evaluator`]). Both engines read the same immutable tree.
pub mod operators;
pub mod predicate;
pub mod tokens;

pub use operators::{CompOp, GeomOp, JoinOp};
pub use predicate::{MAX_DEPTH, Predicate, PredicateKind};
pub use tokens::{Token, TokenKind};
