//! Core parsing pipeline
//!
//! - `engine`: tokens and the lexer
//! - `parser`: recursive-descent parser and command registry
//! - `ast`: the document tree and its queries

pub mod ast;
pub mod engine;
pub mod parser;
