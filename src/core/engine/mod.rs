//! Lexing engine
//!
//! Turns LaTeX source into a flat token stream that the parser consumes.

pub mod lexer;
pub mod token;

pub use lexer::{detokenize, tokenize, LexState, Lexer};
pub use token::{Position, Token, TokenKind};
