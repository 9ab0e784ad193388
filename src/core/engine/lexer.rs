//! LaTeX Lexer/Tokenizer
//!
//! Converts a LaTeX source string into a flat stream of [`Token`]s using an
//! explicit state machine. Every state has one handler; the current character
//! plus a one-character lookahead drive the transitions.
//!
//! - Plain characters accumulate in a pending buffer which is flushed as a
//!   token typed by the *current* state whenever a special character shows up
//!   or the state changes.
//! - Each physical line is processed with a synthesized trailing `\n`, so the
//!   stream always looks as if the input ended with exactly one line break.
//! - The lexer never fails. Unterminated math, comments or environment names
//!   degrade to best-effort tokens and the stream always ends with a single
//!   [`TokenKind::Eof`].

use super::token::{Position, Token, TokenKind};
use phf::phf_set;
use tracing::trace;

/// Characters forming a single-character escape after a backslash.
static PUNCTUATION_ESCAPES: phf::Set<char> = phf_set! {
    '$', '%', '&', '#', '_', '{', '}', '\\', ' ', '~', '^',
};

/// Lexer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    /// Plain text processing
    Normal,
    /// Right after a backslash
    Escape,
    /// Inside `$...$`
    MathInline,
    /// Inside `$$...$$`
    MathDisplay,
    /// From `%` to the end of the line
    Comment,
    /// Capturing the `{name}` after `\begin` / `\end`
    Environment,
    /// Right after `#`
    Parameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MathDelimiter {
    Inline,
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvKeyword {
    Begin,
    End,
}

/// The LaTeX lexer.
///
/// A lexer owns all of its mutable state, so independent instances can run
/// on separate inputs concurrently.
#[derive(Debug)]
pub struct Lexer {
    state: LexState,
    tokens: Vec<Token>,
    buffer: String,
    /// Where the construct currently held in `buffer` started
    buffer_start: Option<Position>,
    position: Position,
    math_stack: Vec<MathDelimiter>,
    env_keyword: Option<EnvKeyword>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    /// Create a new lexer
    pub fn new() -> Self {
        Lexer {
            state: LexState::Normal,
            tokens: Vec::new(),
            buffer: String::new(),
            buffer_start: None,
            position: Position::default(),
            math_stack: Vec::new(),
            env_keyword: None,
        }
    }

    /// Current state of the machine
    pub fn state(&self) -> LexState {
        self.state
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self, source: &str) -> Vec<Token> {
        self.reset();

        for (index, line) in source.lines().enumerate() {
            let mut chars: Vec<char> = line.chars().collect();
            chars.push('\n');
            self.process_line(index + 1, &chars);
        }

        self.flush();
        self.tokens
            .push(Token::new(TokenKind::Eof, "", self.position));
        trace!(count = self.tokens.len(), "tokenized input");
        std::mem::take(&mut self.tokens)
    }

    fn reset(&mut self) {
        self.state = LexState::Normal;
        self.tokens.clear();
        self.buffer.clear();
        self.buffer_start = None;
        self.position = Position::default();
        self.math_stack.clear();
        self.env_keyword = None;
    }

    fn process_line(&mut self, line: usize, chars: &[char]) {
        let mut col = 0;
        while col < chars.len() {
            self.position = Position::new(line, col + 1);
            let consumed = self.step(&chars[col..]);
            col += consumed.max(1);
        }
    }

    /// Dispatch the character at the head of `rest` to the current state's
    /// handler. Returns how many characters were consumed.
    fn step(&mut self, rest: &[char]) -> usize {
        let current = rest[0];
        let next = rest.get(1).copied();

        match self.state {
            LexState::Normal => self.handle_normal(current, next),
            LexState::Escape => self.handle_escape(rest),
            LexState::MathInline => self.handle_math(current, next, MathDelimiter::Inline),
            LexState::MathDisplay => self.handle_math(current, next, MathDelimiter::Display),
            LexState::Comment => self.handle_comment(current),
            LexState::Environment => self.handle_environment(current),
            LexState::Parameter => self.handle_parameter(current, next),
        }
    }

    fn handle_normal(&mut self, current: char, next: Option<char>) -> usize {
        match current {
            '\\' => {
                self.flush();
                self.mark_start();
                self.enter(LexState::Escape);
                1
            }
            '$' if next == Some('$') => {
                self.flush();
                self.mark_start();
                self.math_stack.push(MathDelimiter::Display);
                self.enter(LexState::MathDisplay);
                2
            }
            '$' => {
                self.flush();
                self.mark_start();
                self.math_stack.push(MathDelimiter::Inline);
                self.enter(LexState::MathInline);
                1
            }
            '%' => {
                self.flush();
                self.enter(LexState::Comment);
                self.push_char(current);
                1
            }
            '{' => self.emit_single(TokenKind::BraceOpen, current),
            '}' => self.emit_single(TokenKind::BraceClose, current),
            '[' => self.emit_single(TokenKind::BracketOpen, current),
            ']' => self.emit_single(TokenKind::BracketClose, current),
            '#' => {
                self.flush();
                self.enter(LexState::Parameter);
                self.push_char(current);
                1
            }
            '&' | '_' | '^' | '~' => self.emit_single(TokenKind::SpecialChar, current),
            '\n' => self.emit_single(TokenKind::Newline, current),
            c if c.is_whitespace() => self.emit_single(TokenKind::Space, c),
            c => {
                self.push_char(c);
                1
            }
        }
    }

    fn handle_escape(&mut self, rest: &[char]) -> usize {
        let current = rest[0];

        if PUNCTUATION_ESCAPES.contains(&current) {
            self.push_char(current);
            self.flush_as(TokenKind::EscapeSequence);
            self.enter(self.ambient_state());
            return 1;
        }

        if is_command_char(current) {
            let name: String = rest
                .iter()
                .take_while(|c| is_command_char(**c))
                .collect();
            let consumed = name.chars().count();

            match name.as_str() {
                "begin" | "end" => {
                    self.env_keyword = Some(if name == "begin" {
                        EnvKeyword::Begin
                    } else {
                        EnvKeyword::End
                    });
                    self.buffer.push_str(&name);
                    self.enter(LexState::Environment);
                }
                _ => {
                    self.buffer.push_str(&name);
                    self.flush_as(TokenKind::Command);
                    self.enter(self.ambient_state());
                }
            }
            return consumed;
        }

        // Unknown escape, kept as-is
        self.push_char(current);
        self.flush_as(TokenKind::EscapeSequence);
        self.enter(self.ambient_state());
        1
    }

    fn handle_math(&mut self, current: char, next: Option<char>, mode: MathDelimiter) -> usize {
        match current {
            '$' if mode == MathDelimiter::Display && next == Some('$') => {
                if self.math_stack.last() == Some(&MathDelimiter::Display) {
                    self.close_math();
                    return 2;
                }
                self.push_char(current);
                1
            }
            '$' if mode == MathDelimiter::Inline => {
                if self.math_stack.last() == Some(&MathDelimiter::Inline) {
                    self.close_math();
                } else {
                    self.push_char(current);
                }
                1
            }
            '\\' => {
                // Escaped characters are never mode-sensitive inside math
                self.push_char(current);
                match next {
                    Some(escaped) => {
                        self.push_char(escaped);
                        2
                    }
                    None => 1,
                }
            }
            c => {
                self.push_char(c);
                1
            }
        }
    }

    fn close_math(&mut self) {
        self.math_stack.pop();
        self.flush();
        self.enter(self.ambient_state());
    }

    fn handle_comment(&mut self, current: char) -> usize {
        self.push_char(current);
        if current == '\n' {
            self.flush_as(TokenKind::Comment);
            self.enter(LexState::Normal);
        }
        1
    }

    fn handle_environment(&mut self, current: char) -> usize {
        match current {
            '{' => self.buffer.clear(),
            '}' => {
                let kind = match self.env_keyword.take() {
                    Some(EnvKeyword::End) => TokenKind::EnvEnd,
                    _ => TokenKind::EnvBegin,
                };
                self.flush_as(kind);
                self.enter(LexState::Normal);
            }
            c => self.push_char(c),
        }
        1
    }

    fn handle_parameter(&mut self, current: char, next: Option<char>) -> usize {
        if current.is_ascii_digit() {
            self.push_char(current);
            self.flush_as(TokenKind::ParamMarker);
            self.enter(LexState::Normal);
            return 1;
        }

        // A lone `#`: emit it and re-process the character as plain input
        self.flush_as(TokenKind::SpecialChar);
        self.enter(LexState::Normal);
        self.handle_normal(current, next)
    }

    /// The state to fall back to after a command or escape.
    fn ambient_state(&self) -> LexState {
        match self.math_stack.last() {
            Some(MathDelimiter::Inline) => LexState::MathInline,
            Some(MathDelimiter::Display) => LexState::MathDisplay,
            None => LexState::Normal,
        }
    }

    fn enter(&mut self, state: LexState) {
        if self.state != state {
            trace!(from = ?self.state, to = ?state, position = %self.position, "lexer transition");
        }
        self.state = state;
    }

    fn mark_start(&mut self) {
        self.buffer_start = Some(self.position);
    }

    fn push_char(&mut self, c: char) {
        if self.buffer_start.is_none() {
            self.buffer_start = Some(self.position);
        }
        self.buffer.push(c);
    }

    fn emit_single(&mut self, kind: TokenKind, c: char) -> usize {
        self.flush();
        self.tokens.push(Token::new(kind, c, self.position));
        1
    }

    /// Flush the pending buffer as a token typed by the current state.
    fn flush(&mut self) {
        let kind = match self.state {
            LexState::MathInline => TokenKind::MathInline,
            LexState::MathDisplay => TokenKind::MathFormula,
            LexState::Comment => TokenKind::Comment,
            LexState::Escape => TokenKind::EscapeSequence,
            LexState::Parameter => TokenKind::ParamMarker,
            LexState::Normal | LexState::Environment => TokenKind::Text,
        };
        self.flush_as(kind);
    }

    /// Flush the pending buffer with an explicit token kind.
    fn flush_as(&mut self, kind: TokenKind) {
        let start = self.buffer_start.take().unwrap_or(self.position);
        if self.buffer.is_empty() {
            return;
        }
        let value = std::mem::take(&mut self.buffer);
        trace!(kind = %kind, position = %start, "flush");
        self.tokens.push(Token::new(kind, value, start));
    }
}

fn is_command_char(c: char) -> bool {
    c.is_alphabetic() || c == '*'
}

/// Convenience function to tokenize a string
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new().tokenize(source)
}

/// Convert a token stream back to LaTeX source (detokenize)
pub fn detokenize(tokens: &[Token]) -> String {
    let mut result = String::new();

    for token in tokens {
        match token.kind {
            TokenKind::Command | TokenKind::EscapeSequence => {
                result.push('\\');
                result.push_str(&token.value);
            }
            TokenKind::EnvBegin => {
                result.push_str("\\begin{");
                result.push_str(&token.value);
                result.push('}');
            }
            TokenKind::EnvEnd => {
                result.push_str("\\end{");
                result.push_str(&token.value);
                result.push('}');
            }
            TokenKind::MathInline => {
                result.push('$');
                result.push_str(&token.value);
                result.push('$');
            }
            TokenKind::MathFormula => {
                result.push_str("$$");
                result.push_str(&token.value);
                result.push_str("$$");
            }
            TokenKind::Eof => {}
            _ => result.push_str(&token.value),
        }
    }

    result
}
