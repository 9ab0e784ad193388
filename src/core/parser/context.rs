//! Parser configuration and cursor scoping
//!
//! This module contains the pass-wide parser options and the guard that
//! restores the insertion point when a nested parse finishes.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Parser;
use crate::core::ast::NodeId;
use crate::utils::error::ParseError;

// =============================================================================
// Parser Options
// =============================================================================

/// Deepest tree level a group or environment may open at. Anything nested
/// deeper fails with a syntax error instead of exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// How line breaks in running text become tree content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineMode {
    /// Blank lines split paragraphs, single breaks become spaces
    #[default]
    Default,
    /// Every break becomes a `"\n"` text node
    Literal,
    /// Every break becomes a `" "` text node
    Compact,
}

impl NewlineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewlineMode::Default => "default",
            NewlineMode::Literal => "literal",
            NewlineMode::Compact => "compact",
        }
    }
}

impl fmt::Display for NewlineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewlineMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(NewlineMode::Default),
            "literal" => Ok(NewlineMode::Literal),
            "compact" => Ok(NewlineMode::Compact),
            other => Err(ParseError::syntax(format!(
                "unknown newline mode '{}' (expected default, literal or compact)",
                other
            ))),
        }
    }
}

/// What happens when a group is still open at end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupClosing {
    /// Fail with an unclosed-group error
    #[default]
    Strict,
    /// Close body groups implicitly; argument groups still fail
    Lenient,
}

/// Options for parsing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Merge runs of text and space tokens into one text node
    /// Default: false
    pub text_merge: bool,

    /// Line break interpretation
    /// Default: `NewlineMode::Default`
    pub newline_mode: NewlineMode,

    /// Unclosed group handling
    /// Default: `GroupClosing::Strict`
    pub group_closing: GroupClosing,
}

impl ParserOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge adjacent text into single nodes with source ranges
    pub fn merged() -> Self {
        Self {
            text_merge: true,
            ..Self::default()
        }
    }

    /// Flatten every line break into a space
    pub fn compact() -> Self {
        Self {
            newline_mode: NewlineMode::Compact,
            ..Self::default()
        }
    }

    /// Keep every line break as literal text
    pub fn literal() -> Self {
        Self {
            newline_mode: NewlineMode::Literal,
            ..Self::default()
        }
    }

    /// Tolerate body groups left open at end of input
    pub fn lenient() -> Self {
        Self {
            group_closing: GroupClosing::Lenient,
            ..Self::default()
        }
    }
}

// =============================================================================
// Cursor scoping
// =============================================================================

/// Moves the parser's insertion point and puts it back on drop.
///
/// Dropping also happens when `?` returns early, so the cursor can never
/// leak out of a failed nested parse.
pub(crate) struct CursorGuard<'p> {
    parser: &'p mut Parser,
    saved: NodeId,
}

impl<'p> CursorGuard<'p> {
    pub(crate) fn descend(parser: &'p mut Parser, node: NodeId) -> Self {
        let saved = parser.cursor;
        parser.cursor = node;
        CursorGuard { parser, saved }
    }
}

impl Deref for CursorGuard<'_> {
    type Target = Parser;

    fn deref(&self) -> &Parser {
        self.parser
    }
}

impl DerefMut for CursorGuard<'_> {
    fn deref_mut(&mut self) -> &mut Parser {
        self.parser
    }
}

impl Drop for CursorGuard<'_> {
    fn drop(&mut self) {
        self.parser.cursor = self.saved;
    }
}
