use anyhow::Result;
use serde::Serialize;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

/// Parsed-structure side artifact of an extraction.
///
/// The program body is stripped; only secondary metadata survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxTree {
    pub root_kind: String,
    pub has_errors: bool,
    /// Number of top-level statements dropped with the body.
    pub stripped_statements: usize,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub text: String,
    pub line: usize,
    pub block: bool,
}

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(Self { parser })
    }

    pub fn javascript() -> Result<Self> {
        Self::new(tree_sitter_javascript::language())
    }

    pub fn parse_source(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("tree-sitter produced no syntax tree"))
    }
}

impl SyntaxTree {
    /// Reduce a parse of `source` to its secondary metadata.
    pub fn from_tree(tree: &Tree, source: &str) -> Self {
        let root = tree.root_node();

        let mut comments = Vec::new();
        collect_comments(root, source.as_bytes(), &mut comments);

        let stripped_statements = root
            .children(&mut root.walk())
            .filter(|child| child.is_named() && child.kind() != "comment")
            .count();

        Self {
            root_kind: root.kind().to_string(),
            has_errors: root.has_error(),
            stripped_statements,
            comments,
        }
    }
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

fn collect_comments(root: TSNode, source: &[u8], comments: &mut Vec<Comment>) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "comment" {
            let text = extract_text(&node, source);
            comments.push(Comment {
                text: text.to_string(),
                line: node.start_position().row + 1,
                block: text.starts_with("/*"),
            });
            continue;
        }

        let mut cursor = node.walk();
        let children: Vec<TSNode> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
}
