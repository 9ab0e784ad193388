//! Utility modules
//!
//! This module contains the error and result types shared by the parser.

pub mod error;

// Re-export commonly used items
pub use error::{ParseError, ParseResult};
