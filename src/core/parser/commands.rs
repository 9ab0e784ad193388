//! Commands, headings and environments

use tracing::debug;

use super::registry::ENVIRONMENT_ARITY;
use super::{CursorGuard, Parser};
use crate::core::ast::{ArgumentSlot, CommandData, GroupData, NodeId, NodeKind};
use crate::core::engine::token::{Position, TokenKind};
use crate::utils::error::{ParseError, ParseResult};

impl Parser {
    pub(crate) fn parse_command(&mut self) -> ParseResult<()> {
        let name = match self.current() {
            Some(token) => token.value.clone(),
            None => return Ok(()),
        };
        self.advance();

        let kind = self.registry.create_command_node(&name);
        if matches!(kind, NodeKind::Section(_)) {
            return self.parse_section(kind);
        }

        let node = self.document.append_child(self.cursor, kind);
        {
            let mut scope = CursorGuard::descend(self, node);
            scope.parse_command_arguments(node)?;
        }
        self.post_process(node);

        if name == "label" {
            self.apply_label(node);
        }
        Ok(())
    }

    /// Zero or more `[..]` groups, then zero or more `{..}` groups
    pub(crate) fn parse_command_arguments(&mut self, owner: NodeId) -> ParseResult<()> {
        while self.current_kind() == Some(TokenKind::BracketOpen) {
            self.parse_argument(owner, ArgumentSlot::Option)?;
        }
        while self.current_kind() == Some(TokenKind::BraceOpen) {
            self.parse_argument(owner, ArgumentSlot::Parameter)?;
        }
        Ok(())
    }

    fn parse_argument(&mut self, owner: NodeId, slot: ArgumentSlot) -> ParseResult<()> {
        let (close, optional) = match slot {
            ArgumentSlot::Option => (TokenKind::BracketClose, true),
            ArgumentSlot::Parameter => (TokenKind::BraceClose, false),
        };
        let opener = match self.current() {
            Some(token) => token.position,
            None => return Ok(()),
        };
        self.advance();

        let group = self
            .document
            .append_argument(owner, slot, NodeKind::Group(GroupData::new(optional)))
            .ok_or_else(|| ParseError::syntax_at("node cannot take arguments", opener))?;

        self.parse_group_content(group, close, opener)?;
        self.expect(close)?;
        self.advance();
        Ok(())
    }

    /// Attach a heading under the nearest shallower heading (or the root),
    /// then open its first paragraph.
    fn parse_section(&mut self, kind: NodeKind) -> ParseResult<()> {
        let level = match &kind {
            NodeKind::Section(section) => section.level,
            _ => return Ok(()),
        };
        let node = self.document.alloc(kind);
        {
            let mut scope = CursorGuard::descend(self, node);
            scope.parse_command_arguments(node)?;
        }

        let mut parent = self.cursor;
        loop {
            match self.document.kind(parent) {
                NodeKind::Document => break,
                NodeKind::Section(section) if section.level < level => break,
                _ => {}
            }
            match self.document.parent(parent) {
                Some(up) => parent = up,
                None => break,
            }
        }

        self.document.attach(parent, node);
        debug!(
            level,
            title = %self.document.title_text(node),
            parent = ?self.document.kind(parent).type_name(),
            "attached section"
        );

        self.cursor = node;
        self.start_new_paragraph();
        Ok(())
    }

    /// Fill in the attributes specialized commands derive from their arguments
    fn post_process(&mut self, node: NodeId) {
        let first_param = self
            .document
            .kind(node)
            .command_data()
            .and_then(|data| data.parameters.first().copied());
        let Some(first_param) = first_param else {
            return;
        };

        match self.document.kind(node) {
            NodeKind::Footnote(_) => {
                if let NodeKind::Footnote(footnote) = self.document.kind_mut(node) {
                    footnote.content = Some(first_param);
                }
            }
            NodeKind::Cite(_) => {
                let keys: Vec<String> = self
                    .document
                    .text_content(first_param)
                    .split(',')
                    .map(|key| key.trim().to_string())
                    .collect();
                if let NodeKind::Cite(cite) = self.document.kind_mut(node) {
                    cite.keys = keys;
                }
            }
            _ => {}
        }
    }

    /// `\label{key}` inside a heading's paragraph names that heading
    fn apply_label(&mut self, node: NodeId) {
        let key = match self.document.kind(node).command_data() {
            Some(data) => match data.parameters.first() {
                Some(param) => self.document.text_content(*param),
                None => return,
            },
            None => return,
        };

        let mut current = self.cursor;
        loop {
            match self.document.kind(current) {
                NodeKind::Section(_) => break,
                NodeKind::Paragraph(_) => match self.document.parent(current) {
                    Some(up) => current = up,
                    None => return,
                },
                _ => return,
            }
        }

        if let NodeKind::Section(section) = self.document.kind_mut(current) {
            if section.label.is_none() {
                debug!(label = %key, "labelled section");
                section.label = Some(key);
            }
        }
    }

    pub(crate) fn parse_environment(&mut self) -> ParseResult<()> {
        let (kind, name, position) = match self.current() {
            Some(token) => (token.kind, token.value.clone(), token.position),
            None => return Ok(()),
        };
        self.advance();

        if kind == TokenKind::EnvBegin {
            self.begin_environment(name, position)
        } else {
            self.end_environment(&name);
            Ok(())
        }
    }

    fn begin_environment(&mut self, name: String, position: Position) -> ParseResult<()> {
        if name == "document" {
            self.in_document_env = true;
        }
        let arity = ENVIRONMENT_ARITY.get(name.as_str()).copied().unwrap_or(0);

        let node = self
            .document
            .append_child(self.cursor, NodeKind::Environment(CommandData::new(name)));
        self.check_depth(node, "environment", position)?;
        self.cursor = node;
        debug!(environment = ?self.document.kind(node).name(), "open environment");

        while self.current_kind() == Some(TokenKind::BracketOpen) {
            self.parse_argument(node, ArgumentSlot::Option)?;
        }
        for _ in 0..arity {
            if self.current_kind() != Some(TokenKind::BraceOpen) {
                break;
            }
            self.parse_argument(node, ArgumentSlot::Parameter)?;
        }
        Ok(())
    }

    /// Close the innermost open environment if its name matches.
    ///
    /// Only the cursor and its ancestors count as open. A heading lifted out
    /// of `document` leaves that environment behind, so its `\end` is ignored
    /// and later text stays in the heading's paragraph.
    fn end_environment(&mut self, name: &str) {
        let innermost = if self.document.kind(self.cursor).is_environment() {
            Some(self.cursor)
        } else {
            self.document
                .ancestor_where(self.cursor, NodeKind::is_environment)
        };

        match innermost {
            Some(env) if self.document.kind(env).name() == Some(name) => {
                debug!(environment = name, "close environment");
                self.cursor = self.document.parent(env).unwrap_or(self.document.root());
            }
            other => {
                debug!(
                    environment = name,
                    open = ?other.and_then(|env| self.document.kind(env).name()),
                    "ignoring mismatched \\end"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::lexer::tokenize;
    use crate::core::parser::MAX_NESTING_DEPTH;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> crate::core::ast::Document {
        Parser::new(tokenize(source)).parse().unwrap()
    }

    #[test]
    fn test_command_arguments() {
        let doc = parse("\\includegraphics[width=5cm]{fig.png}");
        let cmd = doc.children(doc.root())[0];
        let data = doc.kind(cmd).command_data().unwrap();
        assert_eq!(data.name, "includegraphics");
        assert_eq!(data.optional_args().len(), 1);
        assert_eq!(data.required_args().len(), 1);
        assert_eq!(doc.text_content(data.options[0]), "width=5cm");
        assert_eq!(doc.text_content(data.parameters[0]), "fig.png");
        assert_eq!(doc.parent(data.parameters[0]), Some(cmd));
    }

    #[test]
    fn test_footnote_content() {
        let doc = parse("\\footnote{A note}");
        let node = doc.children(doc.root())[0];
        let footnote = doc.kind(node).as_footnote().unwrap();
        let content = footnote.content.unwrap();
        assert_eq!(doc.text_content(content), "A note");
    }

    #[test]
    fn test_cite_keys() {
        let doc = parse("\\citep{knuth84, lamport94 ,}");
        let node = doc.children(doc.root())[0];
        let cite = doc.kind(node).as_cite().unwrap();
        assert_eq!(cite.keys, vec!["knuth84", "lamport94", ""]);
        assert!(cite.citations.is_empty());
    }

    #[test]
    fn test_section_short_title() {
        let doc = parse("\\section[Short]{A Long Title}");
        let section = doc.sections()[0];
        assert_eq!(doc.title_text(section), "A Long Title");
        assert_eq!(doc.short_title_text(section), "Short");
    }

    #[test]
    fn test_section_opens_paragraph() {
        let doc = parse("\\section{Intro}");
        let section = doc.sections()[0];
        let children = doc.children(section);
        assert_eq!(children.len(), 1);
        assert!(matches!(doc.kind(children[0]), NodeKind::Paragraph(_)));
    }

    #[test]
    fn test_label_names_section() {
        let doc = parse("\\section{Intro}\n\\label{sec:intro}\n\\label{sec:other}");
        let section = doc.sections()[0];
        let data = doc.kind(section).as_section().unwrap();
        assert_eq!(data.label.as_deref(), Some("sec:intro"));
    }

    #[test]
    fn test_environment_options_and_arity() {
        let doc = parse("\\begin{tabular}[t]{ll}{x}\\end{tabular}");
        let env = doc.environments()[0];
        let data = doc.kind(env).command_data().unwrap();
        assert_eq!(data.options.len(), 1);
        assert_eq!(data.parameters.len(), 1);
        assert_eq!(doc.text_content(data.parameters[0]), "ll");
        // the extra group is body content
        assert_eq!(doc.children(env).len(), 1);
    }

    #[test]
    fn test_mismatched_end_is_ignored() {
        let doc = parse("\\begin{itemize}\\end{enumerate}x\\end{itemize}y");
        let root = doc.root();
        let env = doc.children(root)[0];
        assert_eq!(doc.children(root).len(), 2);
        assert_eq!(doc.children(env).len(), 1);
        assert_eq!(doc.text_content(doc.children(root)[1]), "y");
    }

    #[test]
    fn test_text_after_document_end_joins_last_section() {
        let doc = parse("\\begin{document}\n\\section{A}\nbody\n\\end{document}\nafter");
        let env = doc.find_environment("document").unwrap();
        assert!(doc.children(env).is_empty());

        let section = doc.sections()[0];
        let paragraph = doc.children(section)[0];
        assert_eq!(doc.text_content(paragraph), "body after");
    }

    #[test]
    fn test_deep_environment_nesting_fails() {
        let depth = MAX_NESTING_DEPTH + 1;
        let source = format!(
            "{}{}",
            "\\begin{a}".repeat(depth),
            "\\end{a}".repeat(depth)
        );
        let err = Parser::new(tokenize(&source)).parse().unwrap_err();
        assert_eq!(err.message(), "environment nesting too deep");

        let source = format!(
            "{}{}",
            "\\begin{a}".repeat(depth - 1),
            "\\end{a}".repeat(depth - 1)
        );
        assert!(Parser::new(tokenize(&source)).parse().is_ok());
    }
}
