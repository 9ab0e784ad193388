//! # texast
//!
//! LaTeX source to a structured, queryable document tree.
//!
//! The pipeline has two stages:
//! - a state-machine [`Lexer`] turning source text into [`Token`]s
//! - a recursive-descent [`Parser`] building a [`Document`] from those tokens
//!
//! ## Example
//!
//! ```
//! let doc = texast::parse("\\section{Intro}\nHello $x$").unwrap();
//! let section = doc.sections()[0];
//! assert_eq!(doc.title_text(section), "Intro");
//! ```
//!
//! Math is kept as opaque strings and no macro is ever expanded.

pub mod core;
pub mod utils;

pub use crate::core::ast::{Document, Node, NodeId, NodeKind, NodeSnapshot};
pub use crate::core::engine::{detokenize, Lexer, Position, Token, TokenKind};
pub use crate::core::parser::{
    CommandRegistry, GroupClosing, NewlineMode, Parser, ParserOptions, MAX_NESTING_DEPTH,
};
pub use crate::utils::error::{ParseError, ParseResult};

/// Tokenize LaTeX source
pub fn tokenize(source: &str) -> Vec<Token> {
    crate::core::engine::tokenize(source)
}

/// Parse LaTeX source with default options
pub fn parse(source: &str) -> ParseResult<Document> {
    parse_with_options(source, ParserOptions::default())
}

/// Parse LaTeX source with custom options
pub fn parse_with_options(source: &str, options: ParserOptions) -> ParseResult<Document> {
    Parser::with_options(tokenize(source), options).parse()
}
