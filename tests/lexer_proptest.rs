//! Property-based tests for the lexer
//!
//! These tests ensure that tokenizing never panics, always terminates the
//! stream with a single EOF, keeps positions inside the source, and that
//! detokenizing reproduces well-formed input.

use proptest::prelude::*;
use texast::{detokenize, parse_with_options, tokenize, NodeKind, ParserOptions, TokenKind};

/// Source text with line terminators normalized to `\n` and a final `\n`
fn normalized(source: &str) -> String {
    source.lines().map(|line| format!("{}\n", line)).collect()
}

fn latex_piece_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9,.!?()=+-]{1,8}",
        "[ \n{}\\[\\]&_~^]",
        "\\\\(textbf|emph|section|item|alpha)\\{",
        "\\$[a-z+=^ ]{1,5}\\$",
        "\\$\\$[a-z+= ]{1,5}\\$\\$",
        "#[0-9]",
        "%[a-z ]{0,6}\n",
        "\\\\(begin|end)\\{[a-z]{1,6}\\}",
        "\\\\[$%&#_{}~^]",
    ]
}

fn latex_document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(latex_piece_strategy(), 0..40).prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn test_tokenize_never_panics(input in "(?s).{0,200}") {
        let _tokens = tokenize(&input);
    }

    #[test]
    fn test_stream_ends_with_single_eof(input in "(?s).{0,200}") {
        let tokens = tokenize(&input);
        let eof_count = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        prop_assert_eq!(eof_count, 1);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn test_positions_within_bounds(input in "(?s).{0,200}") {
        let lines: Vec<usize> = input.lines().map(|line| line.chars().count()).collect();
        let tokens = tokenize(&input);

        for token in tokens.iter().filter(|t| t.kind != TokenKind::Eof) {
            let line = token.position.line;
            prop_assert!(line >= 1 && line <= lines.len(), "line out of range: {}", token);
            let column = token.position.column;
            prop_assert!(
                column >= 1 && column <= lines[line - 1] + 1,
                "column out of range: {}",
                token
            );
        }
    }

    #[test]
    fn test_detokenize_roundtrip(input in latex_document_strategy()) {
        let tokens = tokenize(&input);
        prop_assert_eq!(detokenize(&tokens), normalized(&input));
    }

    #[test]
    fn test_merged_text_matches_unmerged(input in "[a-z][a-z ]{0,30}") {
        let plain = parse_with_options(&input, ParserOptions::default()).unwrap();
        let merged = parse_with_options(&input, ParserOptions::merged()).unwrap();

        let pieces = plain.children(plain.root());
        let merged_children = merged.children(merged.root());
        prop_assert_eq!(merged_children.len(), 1);

        let expected: String = pieces.iter().map(|id| plain.text_content(*id)).collect();
        match merged.kind(merged_children[0]) {
            NodeKind::Text(text) => {
                prop_assert_eq!(&text.content, &expected);
                prop_assert_eq!(text.source_ranges.len(), pieces.len());
            }
            other => prop_assert!(false, "expected text, got {:?}", other),
        }
    }
}
