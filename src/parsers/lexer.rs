//! Flat token stream over a tree-sitter JavaScript parse.
//!
//! The extractor only pattern-matches token windows, so the tree is read
//! back as its leaves in document order. String and regex literals stay
//! single tokens; comments are dropped.

use serde::Serialize;
use thiserror::Error;
use tree_sitter::{Node as TSNode, Tree};

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Punctuator,
    String,
    Numeric,
    Template,
    RegularExpression,
    Boolean,
    Null,
}

/// A single token borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw text; string literals keep their quotes and escapes.
    pub value: &'a str,
    pub line: usize,
}

impl Token<'_> {
    pub fn is(&self, kind: TokenKind, value: &str) -> bool {
        self.kind == kind && self.value == value
    }

    pub fn is_punctuator(&self, value: &str) -> bool {
        self.is(TokenKind::Punctuator, value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("syntax error at line {line}")]
    Syntax { line: usize },
}

/// Flatten `tree`, parsed from `source`, into tokens.
///
/// A tree containing error or missing nodes is rejected.
pub fn tokenize<'a>(tree: &Tree, source: &'a str) -> Result<Vec<Token<'a>>, LexError> {
    let root = tree.root_node();
    if root.has_error() {
        return Err(LexError::Syntax {
            line: first_error_line(root),
        });
    }

    let mut tokens = Vec::with_capacity(source.len() / 4);
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "comment" | "html_comment" | "hash_bang_line" => continue,
            "string" | "regex" => {
                tokens.push(token(&node, source));
                continue;
            }
            "template_string" => {
                // The template as a whole, then the contents of each `${...}`.
                tokens.push(token(&node, source));
                let mut inner = Vec::new();
                for part in node.children(&mut node.walk()) {
                    if part.kind() == "template_substitution" {
                        let count = part.child_count();
                        inner.extend(
                            part.children(&mut part.walk())
                                .enumerate()
                                .filter(|(i, _)| *i != 0 && *i + 1 != count)
                                .map(|(_, child)| child),
                        );
                    }
                }
                stack.extend(inner.into_iter().rev());
                continue;
            }
            _ => {}
        }

        if node.child_count() == 0 {
            if !node.byte_range().is_empty() {
                tokens.push(token(&node, source));
            }
            continue;
        }

        let children: Vec<TSNode> = node.children(&mut node.walk()).collect();
        stack.extend(children.into_iter().rev());
    }

    Ok(tokens)
}

fn token<'a>(node: &TSNode, source: &'a str) -> Token<'a> {
    let value = &source[node.byte_range()];
    Token {
        kind: classify(node, value),
        value,
        line: node.start_position().row + 1,
    }
}

fn classify(node: &TSNode, value: &str) -> TokenKind {
    match node.kind() {
        "string" => TokenKind::String,
        "template_string" => TokenKind::Template,
        "regex" => TokenKind::RegularExpression,
        "number" => TokenKind::Numeric,
        "true" | "false" => TokenKind::Boolean,
        "null" => TokenKind::Null,
        "this" | "super" => TokenKind::Keyword,
        kind if node.is_named() && (kind.ends_with("identifier") || kind == "undefined") => {
            TokenKind::Identifier
        }
        _ if value.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '$') => {
            if node.is_named() {
                TokenKind::Identifier
            } else {
                TokenKind::Keyword
            }
        }
        _ => TokenKind::Punctuator,
    }
}

fn first_error_line(root: TSNode) -> usize {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return node.start_position().row + 1;
        }
        if node.has_error() {
            let children: Vec<TSNode> = node.children(&mut node.walk()).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    1
}
