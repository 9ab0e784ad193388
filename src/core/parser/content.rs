//! Running content: text, math, special characters, line breaks and groups

use tracing::{debug, trace};

use super::context::{GroupClosing, NewlineMode};
use super::registry::SINGLE_LINE_ENVIRONMENTS;
use super::{CursorGuard, Parser};
use crate::core::ast::{Document, GroupData, MathData, NodeId, NodeKind, SourceRange, TextData};
use crate::core::engine::token::{Position, TokenKind};
use crate::utils::error::{ParseError, ParseResult};

impl Parser {
    pub(crate) fn parse_math(&mut self) {
        let Some(token) = self.current() else {
            return;
        };
        let math = MathData::new(token.value.clone(), token.kind == TokenKind::MathFormula);
        self.document.append_child(self.cursor, NodeKind::Math(math));
        self.advance();
    }

    pub(crate) fn parse_special_char(&mut self) {
        let Some(c) = self.current().and_then(|token| token.value.chars().next()) else {
            self.advance();
            return;
        };
        self.document
            .append_child(self.cursor, NodeKind::SpecialChar(c));
        self.advance();
    }

    pub(crate) fn parse_text(&mut self) {
        if !self.options.text_merge {
            let Some(token) = self.current() else {
                return;
            };
            let text = TextData::new(token.value.clone(), token.position);
            self.document.append_child(self.cursor, NodeKind::Text(text));
            self.advance();
            return;
        }

        let mut content = String::new();
        let mut ranges = Vec::new();
        let mut start = None;

        while let Some(token) = self.current() {
            if !token.kind.is_inline_text() {
                break;
            }
            start.get_or_insert(token.position);
            content.push_str(&token.value);
            ranges.push(SourceRange::new(token.position, token.char_len()));
            self.advance();
        }

        let Some(start) = start else {
            return;
        };
        trace!(tokens = ranges.len(), "merged text run");
        let text = TextData::merged(content, start, ranges);
        self.document.append_child(self.cursor, NodeKind::Text(text));
    }

    pub(crate) fn parse_newline(&mut self) {
        let position = match self.current() {
            Some(token) => token.position,
            None => return,
        };

        if self.options.newline_mode == NewlineMode::Literal {
            self.push_text("\n", position);
            self.advance();
            return;
        }

        if self.in_single_line_environment() || self.options.newline_mode == NewlineMode::Compact {
            self.push_text(" ", position);
            self.advance();
            return;
        }

        let mut count = 0;
        while self.current_kind() == Some(TokenKind::Newline) {
            count += 1;
            self.advance();
        }

        if !self.in_document_env {
            return;
        }

        if count > 1 {
            debug!(newlines = count, "paragraph break");
            self.start_new_paragraph();
        } else if !self.document.children(self.cursor).is_empty() {
            let mut space = TextData::new(" ", position);
            space.from_newline = true;
            self.document.append_child(self.cursor, NodeKind::Text(space));
        }
    }

    fn push_text(&mut self, content: &str, position: Position) {
        self.document
            .append_child(self.cursor, NodeKind::Text(TextData::new(content, position)));
    }

    fn in_single_line_environment(&self) -> bool {
        let innermost = if self.document.kind(self.cursor).is_environment() {
            Some(self.cursor)
        } else {
            self.document
                .ancestor_where(self.cursor, NodeKind::is_environment)
        };

        innermost
            .and_then(|env| self.document.kind(env).name())
            .map_or(false, |name| SINGLE_LINE_ENVIRONMENTS.contains(name))
    }

    /// Leave the open paragraph, if any, and open a fresh one in its place
    pub(crate) fn start_new_paragraph(&mut self) {
        if matches!(self.document.kind(self.cursor), NodeKind::Paragraph(_)) {
            self.cursor = self
                .document
                .parent(self.cursor)
                .unwrap_or(self.document.root());
        }

        let paragraph = self
            .document
            .append_child(self.cursor, Document::new_paragraph());
        self.cursor = paragraph;
    }

    /// A `{..}` group in running content
    pub(crate) fn parse_group(&mut self) -> ParseResult<()> {
        let opener = match self.current() {
            Some(token) => token.position,
            None => return Ok(()),
        };
        self.advance();

        let group = self
            .document
            .append_child(self.cursor, NodeKind::Group(GroupData::new(false)));
        self.parse_group_content(group, TokenKind::BraceClose, opener)?;
        self.finish_body_group(TokenKind::BraceClose, opener);
        Ok(())
    }

    /// Parse tokens into `group` until its closing delimiter, which is left
    /// for the caller to consume.
    ///
    /// Closing delimiters of the other flavour are skipped. Reaching end of
    /// input fails under [`GroupClosing::Strict`] and returns normally under
    /// [`GroupClosing::Lenient`]. A group deeper than
    /// [`MAX_NESTING_DEPTH`](super::MAX_NESTING_DEPTH) is a syntax error.
    ///
    /// Any `[` inside the group opens a nested optional group, so prose such
    /// as `\textbf{interval [0,1)}` leaves a bracket open and fails at end of
    /// input.
    pub(crate) fn parse_group_content(
        &mut self,
        group: NodeId,
        close: TokenKind,
        opener: Position,
    ) -> ParseResult<()> {
        self.check_depth(group, "group", opener)?;
        trace!(position = %opener, "open group");
        let mut scope = CursorGuard::descend(self, group);
        scope.group_loop(close, opener)
    }

    fn group_loop(&mut self, close: TokenKind, opener: Position) -> ParseResult<()> {
        loop {
            let kind = match self.current_kind() {
                Some(TokenKind::Eof) | None => return self.end_of_input_in_group(close, opener),
                Some(kind) => kind,
            };

            if kind == close {
                return Ok(());
            }

            match kind {
                TokenKind::BraceOpen | TokenKind::BracketOpen => {
                    let optional = kind == TokenKind::BracketOpen;
                    let nested_close = if optional {
                        TokenKind::BracketClose
                    } else {
                        TokenKind::BraceClose
                    };
                    let nested_opener = match self.current() {
                        Some(token) => token.position,
                        None => opener,
                    };
                    self.advance();

                    let nested = self
                        .document
                        .append_child(self.cursor, NodeKind::Group(GroupData::new(optional)));
                    self.parse_group_content(nested, nested_close, nested_opener)?;
                    self.finish_body_group(nested_close, nested_opener);
                }
                TokenKind::BraceClose | TokenKind::BracketClose => {
                    debug!(kind = %kind, "skipping stray closing delimiter");
                    self.advance();
                }
                _ => self.parse_token()?,
            }
        }
    }

    fn end_of_input_in_group(&self, close: TokenKind, opener: Position) -> ParseResult<()> {
        let delimiter = if close == TokenKind::BracketClose { '[' } else { '{' };
        match self.options.group_closing {
            GroupClosing::Strict => Err(ParseError::unclosed(delimiter, opener)),
            GroupClosing::Lenient => Ok(()),
        }
    }

    /// Consume the closing delimiter of a body group, or note that the group
    /// was closed implicitly
    fn finish_body_group(&mut self, close: TokenKind, opener: Position) {
        if self.current_kind() == Some(close) {
            self.advance();
        } else {
            debug!(position = %opener, "implicitly closed group at end of input");
        }
    }
}
