//! Recursive-descent parser
//!
//! Consumes the token stream produced by the lexer and assembles a
//! [`Document`]. The parser keeps an insertion point (the *cursor*) into the
//! tree; nested constructs move it through a [`CursorGuard`] which puts it
//! back once the construct is done, even when parsing fails half-way.
//!
//! Structural policy lives here:
//! - heading nesting by level ([`commands`])
//! - paragraph splitting and newline interpretation ([`content`])
//! - group balancing ([`content`])

pub mod commands;
pub mod content;
pub mod context;
pub mod registry;

use tracing::debug;

use crate::core::ast::{Document, NodeId};
use crate::core::engine::token::{Position, Token, TokenKind};
use crate::utils::error::{ParseError, ParseResult};

pub(crate) use context::CursorGuard;
pub use context::{GroupClosing, NewlineMode, ParserOptions, MAX_NESTING_DEPTH};
pub use registry::{CommandRegistry, NodeConstructor};

/// LaTeX parser
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    document: Document,
    /// Current insertion point
    cursor: NodeId,
    options: ParserOptions,
    registry: CommandRegistry,
    /// Set once `\begin{document}` has been seen
    in_document_env: bool,
}

impl Parser {
    /// Create a parser with default options
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_options(tokens, ParserOptions::default())
    }

    pub fn with_options(tokens: Vec<Token>, options: ParserOptions) -> Self {
        let document = Document::new();
        let cursor = document.root();
        Parser {
            tokens,
            pos: 0,
            document,
            cursor,
            options,
            registry: CommandRegistry::with_structural_commands(),
            in_document_env: false,
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Registry used to build command nodes, for registering extra headings
    /// or specialized commands before parsing
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// Parse the whole token stream
    pub fn parse(mut self) -> ParseResult<Document> {
        debug!(tokens = self.tokens.len(), options = ?self.options, "parsing");
        while self.current().is_some() {
            self.parse_token()?;
        }
        Ok(self.document)
    }

    /// Dispatch on the current token. Kinds without a handler are skipped.
    pub(crate) fn parse_token(&mut self) -> ParseResult<()> {
        let kind = match self.current_kind() {
            Some(kind) => kind,
            None => return Ok(()),
        };

        match kind {
            TokenKind::Command => self.parse_command(),
            TokenKind::EnvBegin | TokenKind::EnvEnd => self.parse_environment(),
            TokenKind::MathInline | TokenKind::MathFormula => {
                self.parse_math();
                Ok(())
            }
            TokenKind::BraceOpen => self.parse_group(),
            TokenKind::Text | TokenKind::Space => {
                self.parse_text();
                Ok(())
            }
            TokenKind::Newline => {
                self.parse_newline();
                Ok(())
            }
            TokenKind::SpecialChar => {
                self.parse_special_char();
                Ok(())
            }
            _ => {
                self.advance();
                Ok(())
            }
        }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|token| token.kind)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Fail if `node` sits deeper than [`MAX_NESTING_DEPTH`]
    fn check_depth(&self, node: NodeId, what: &str, position: Position) -> ParseResult<()> {
        if self.document.depth(node) > MAX_NESTING_DEPTH {
            return Err(ParseError::syntax_at(
                format!("{} nesting too deep", what),
                position,
            ));
        }
        Ok(())
    }

    /// Check that the current token has the given kind
    fn expect(&self, kind: TokenKind) -> ParseResult<&Token> {
        match self.current() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(ParseError::unexpected(
                kind,
                token.kind,
                token.value.clone(),
                token.position,
            )),
            None => Err(ParseError::syntax(format!(
                "Expected {}, got end of input",
                kind
            ))),
        }
    }
}
