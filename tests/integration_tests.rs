//! Integration tests for texast: source text to document tree

use texast::{parse, parse_with_options, tokenize, Document, NodeId, NodeKind, ParserOptions, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).iter().map(|t| t.kind).collect()
}

fn section_level(doc: &Document, id: NodeId) -> u8 {
    doc.kind(id).as_section().map(|s| s.level).unwrap_or(0)
}

// ============================================================================
// Lexer
// ============================================================================

mod lexer {
    use super::*;

    #[test]
    fn test_empty_document_environment() {
        let tokens = tokenize("\\begin{document}\\end{document}");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].kind, TokenKind::EnvBegin);
        assert_eq!(tokens[0].value, "document");
        assert_eq!(tokens[1].kind, TokenKind::EnvEnd);
        assert_eq!(tokens[1].value, "document");
        assert_eq!(tokens[2].kind, TokenKind::Newline);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_math_tokens() {
        let tokens = tokenize("$E=mc^2$ and $$\\int_a^b f(x)dx$$");
        let inline = tokens.iter().find(|t| t.kind == TokenKind::MathInline).unwrap();
        assert_eq!(inline.value, "E=mc^2");
        let display = tokens.iter().find(|t| t.kind == TokenKind::MathFormula).unwrap();
        assert_eq!(display.value, "\\int_a^b f(x)dx");
    }

    #[test]
    fn test_command_token_count() {
        // 13 content tokens, the synthesized line break and EOF
        assert_eq!(tokenize("\\textbf{Bold text} \\emph{Italic text}").len(), 15);
    }

    #[test]
    fn test_comment_swallows_line_break() {
        assert_eq!(
            kinds("a % note\nb"),
            vec![
                TokenKind::Text,
                TokenKind::Space,
                TokenKind::Comment,
                TokenKind::Text,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }
}

// ============================================================================
// Document structure
// ============================================================================

mod structure {
    use super::*;

    #[test]
    fn test_simple_document() {
        let source = r"
\documentclass{article}
\begin{document}
\section{Introduction}
Hello, world!
\end{document}
";
        let doc = parse(source).unwrap();

        let envs = doc.environments();
        assert_eq!(envs.len(), 1);
        assert_eq!(doc.kind(envs[0]).name(), Some("document"));

        // headings climb to the nearest shallower heading or the root
        let sections = doc.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(doc.title_text(sections[0]), "Introduction");

        let paragraph = doc.children(sections[0])[0];
        assert!(matches!(doc.kind(paragraph), NodeKind::Paragraph(_)));
        assert_eq!(doc.text_content(paragraph), "Hello, world!");

        let class = doc.find_command("documentclass").unwrap();
        let data = doc.kind(class).command_data().unwrap();
        assert_eq!(doc.text_content(data.parameters[0]), "article");
    }

    #[test]
    fn test_section_nesting() {
        let source = "\n\\section{First}\n\\subsection{Second}\n\\subsubsection*{Third}\n";
        let doc = parse(source).unwrap();

        let sections = doc.sections();
        assert_eq!(sections.len(), 1);
        let first = sections[0];
        assert_eq!(section_level(&doc, first), 1);
        assert_eq!(doc.title_text(first), "First");

        let first_children = doc.children(first);
        assert_eq!(first_children.len(), 2);
        assert!(matches!(doc.kind(first_children[0]), NodeKind::Paragraph(_)));
        let second = first_children[1];
        assert_eq!(section_level(&doc, second), 2);
        assert_eq!(doc.title_text(second), "Second");

        let third = doc.children(second)[1];
        assert_eq!(section_level(&doc, third), 3);
        assert_eq!(doc.title_text(third), "Third");
        assert!(!doc.kind(third).as_section().unwrap().numbered);
        assert!(doc.kind(second).as_section().unwrap().numbered);
    }

    #[test]
    fn test_sibling_sections() {
        let doc = parse("\\section{A}\n\\subsection{A.1}\n\\section{B}").unwrap();
        let sections = doc.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(doc.title_text(sections[1]), "B");
    }

    #[test]
    fn test_math_nodes() {
        let doc = parse("$E=mc^2$ and $$\\int_a^b f(x)dx$$").unwrap();
        let children = doc.children(doc.root());
        assert_eq!(children.len(), 5);

        let inline = doc.kind(children[0]).as_math().unwrap();
        assert_eq!(inline.content, "E=mc^2");
        assert!(!inline.display);
        assert_eq!(doc.text_content(children[2]), "and");
        let display = doc.kind(children[4]).as_math().unwrap();
        assert_eq!(display.content, "\\int_a^b f(x)dx");
        assert!(display.display);
    }

    #[test]
    fn test_command_parameters() {
        let doc = parse("\\textbf{Bold text} \\emph{Italic text}").unwrap();
        let children = doc.children(doc.root());
        assert_eq!(children.len(), 3);

        for (id, name, text) in [
            (children[0], "textbf", "Bold text"),
            (children[2], "emph", "Italic text"),
        ] {
            let data = doc.kind(id).command_data().unwrap();
            assert_eq!(data.name, name);
            assert_eq!(data.required_args().len(), 1);
            assert_eq!(doc.children(data.parameters[0]).len(), 3);
            assert_eq!(doc.text_content(data.parameters[0]), text);
        }
    }

    #[test]
    fn test_abstract_and_title() {
        let source = r"\title{On Trees}
\begin{document}
\begin{abstract}
We parse.
\end{abstract}
\end{document}";
        let doc = parse(source).unwrap();

        let title = doc.title().unwrap();
        assert_eq!(doc.text_content(title), "On Trees");
        let abs = doc.abstract_env().unwrap();
        assert!(doc.full_text().contains("\\begin{abstract}"));
        assert!(doc.text_content(abs).ends_with("\\end{abstract}"));
    }

    #[test]
    fn test_footnote_and_citations() {
        let doc = parse("Text\\footnote{See \\cite{a, b}}.").unwrap();
        let commands = doc.commands();
        assert_eq!(commands.len(), 2);

        let cite = doc.kind(commands[1]).as_cite().unwrap();
        assert_eq!(cite.keys, vec!["a", "b"]);
        let footnote = doc.kind(commands[0]).as_footnote().unwrap();
        assert_eq!(doc.text_content(footnote.content.unwrap()), "See a, b");
    }

    #[test]
    fn test_section_label() {
        let doc = parse("\\section{Intro}\\label{sec:intro}\nBody").unwrap();
        let section = doc.kind(doc.sections()[0]).as_section().unwrap();
        assert_eq!(section.label.as_deref(), Some("sec:intro"));
    }
}

// ============================================================================
// Text reconstruction
// ============================================================================

mod reconstruction {
    use super::*;

    #[test]
    fn test_text_content_is_idempotent() {
        let doc = parse("\\begin{figure}[h]{x $y$}\\end{figure}").unwrap();
        let env = doc.environments()[0];
        let group = doc.children(env)[0];
        let math = doc.children(group)[2];

        for id in [env, group, math] {
            assert_eq!(doc.text_content(id), doc.text_content(id));
        }
        assert_eq!(doc.text_content(env), "\\begin{figure}[h]{x $y$}\\end{figure}");
    }

    #[test]
    fn test_remove_children_and_refresh() {
        let mut doc = parse("\\begin{document}\n\nkeep drop\\end{document}").unwrap();
        let env = doc.environments()[0];
        let paragraph = doc.children(env)[0];
        assert_eq!(doc.text_content(paragraph), "keep drop");

        doc.remove_children(paragraph, &[2]);
        assert_eq!(doc.text_content(paragraph), "keep drop");
        doc.refresh_text_content();
        assert_eq!(doc.text_content(paragraph), "keep");
    }

    #[test]
    fn test_merged_text_positions() {
        let doc = parse_with_options("x\n  two words", ParserOptions::merged()).unwrap();
        let last = *doc.children(doc.root()).last().unwrap();
        let text = doc.kind(last).as_text().unwrap();
        assert_eq!(text.content, "  two words");
        assert_eq!(text.source_ranges.len(), 5);
        assert_eq!(text.source_position(2).map(|p| (p.line, p.column)), Some((2, 3)));
    }
}

// ============================================================================
// Dump & snapshot
// ============================================================================

mod dump {
    use super::*;

    #[test]
    fn test_tree_dump() {
        let doc = parse("\\section{Intro}\nSee $x$ & more").unwrap();
        let tree = doc.to_tree();
        assert!(tree.starts_with("└── Document\n"));
        assert!(tree.contains("Section: Intro"));
        assert!(tree.contains("Group (required)"));
        assert!(tree.contains("Math (Inline): 'x'"));
        assert!(tree.contains("SpecialChar: '&'"));
    }

    #[test]
    fn test_json_snapshot() {
        let doc = parse("\\cite{k1,k2}").unwrap();
        let snapshot = doc.snapshot();
        let cite = &snapshot.children[0];
        assert_eq!(cite.node_type, "Cite");
        assert_eq!(cite.attributes["keys"], "k1,k2");

        let json = doc.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["children"][0]["label"], "Cite: k1, k2");
    }
}

// ============================================================================
// Errors
// ============================================================================

mod errors {
    use super::*;
    use texast::{ParseError, Position};

    #[test]
    fn test_unclosed_argument() {
        let err = parse("\\textbf{never closed").unwrap_err();
        assert_eq!(err, ParseError::unclosed('{', Position::new(1, 8)));
        assert_eq!(err.position(), Some(Position::new(1, 8)));
    }

    #[test]
    fn test_unclosed_optional_argument_lenient() {
        let err = parse_with_options("\\section[short", ParserOptions::lenient()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
        assert!(err.message().contains("BRACKET_CLOSE"));
    }

    #[test]
    fn test_runaway_nesting_is_an_error() {
        let source = format!("{}{}", "{".repeat(3000), "}".repeat(3000));
        let err = parse(&source).unwrap_err();
        assert_eq!(err.message(), "group nesting too deep");

        let source = format!("{}x{}", "\\textbf{".repeat(3000), "}".repeat(3000));
        assert!(parse(&source).is_err());
    }

    #[test]
    fn test_mismatched_end_is_lenient() {
        assert!(parse("\\begin{a}\\end{b}").is_ok());
        assert!(parse("\\end{document}").is_ok());
    }
}
