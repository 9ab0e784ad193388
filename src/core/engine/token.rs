//! LaTeX token definitions.
//!
//! Tokens are produced by the [`Lexer`](super::lexer::Lexer) and consumed by
//! the parser. A token is pure data: a kind, the text it carries, and the
//! 1-based source position where it starts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based `(line, column)` position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.column)
    }
}

/// The category of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// `{`
    BraceOpen,
    /// `}`
    BraceClose,
    /// `[`
    BracketOpen,
    /// `]`
    BracketClose,

    /// A control sequence like `\textbf`. The value does NOT include the backslash.
    Command,
    /// `\begin{name}`, value is `name`
    EnvBegin,
    /// `\end{name}`, value is `name`
    EnvEnd,

    /// Plain text run
    Text,
    /// Inline math content (`$...$`), without delimiters
    MathInline,
    /// Display math content (`$$...$$`), without delimiters
    MathFormula,
    /// A comment from `%` through the end of the line, newline included
    Comment,
    /// An escaped character such as `\$` or `\%`, value is the bare character
    EscapeSequence,

    /// One of `&`, `_`, `^`, `~` (or a lone `#`)
    SpecialChar,

    /// A single non-newline whitespace character
    Space,
    /// A single `\n`
    Newline,

    /// `#` followed by a digit
    ParamMarker,

    /// End of input marker
    Eof,
    /// Lexical error (reserved, the lexer degrades instead of failing)
    Error,
}

impl TokenKind {
    /// The canonical upper-case name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::BraceOpen => "BRACE_OPEN",
            TokenKind::BraceClose => "BRACE_CLOSE",
            TokenKind::BracketOpen => "BRACKET_OPEN",
            TokenKind::BracketClose => "BRACKET_CLOSE",
            TokenKind::Command => "COMMAND",
            TokenKind::EnvBegin => "ENV_BEGIN",
            TokenKind::EnvEnd => "ENV_END",
            TokenKind::Text => "TEXT",
            TokenKind::MathInline => "MATH_INLINE",
            TokenKind::MathFormula => "MATH_FORMULA",
            TokenKind::Comment => "COMMENT",
            TokenKind::EscapeSequence => "ESCAPE_SEQUENCE",
            TokenKind::SpecialChar => "SPECIAL_CHAR",
            TokenKind::Space => "SPACE",
            TokenKind::Newline => "NEWLINE",
            TokenKind::ParamMarker => "PARAM_MARKER",
            TokenKind::Eof => "EOF",
            TokenKind::Error => "ERROR",
        }
    }

    /// Returns true for `{` and `[`
    pub fn is_open_delimiter(&self) -> bool {
        matches!(self, TokenKind::BraceOpen | TokenKind::BracketOpen)
    }

    /// Returns true for `}` and `]`
    pub fn is_close_delimiter(&self) -> bool {
        matches!(self, TokenKind::BraceClose | TokenKind::BracketClose)
    }

    /// Returns true for plain text and single spaces
    pub fn is_inline_text(&self) -> bool {
        matches!(self, TokenKind::Text | TokenKind::Space)
    }

    /// Returns true for either math flavour
    pub fn is_math(&self) -> bool {
        matches!(self, TokenKind::MathInline | TokenKind::MathFormula)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexical token: kind, carried text and starting position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            value: value.into(),
            position,
        }
    }

    /// Returns true if this token has the given kind
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Length of the carried text in characters
    pub fn char_len(&self) -> usize {
        self.value.chars().count()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token({}, '{}', {})",
            self.kind,
            self.value.escape_debug(),
            self.position
        )
    }
}
