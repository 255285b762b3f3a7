//! Namespace declarations of a single source file.
//!
//! Declarations are recognised on the flat token stream as the five-token
//! shape `goog . <method> ( '<namespace>'`, independent of statement
//! context, so calls inside dead branches still count.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

use super::common::{SyntaxTree, TreeSitterParser};
use super::lexer::{tokenize, LexError, Token, TokenKind};

/// Namespace implicitly provided by the file carrying [`PROVIDE_GOOG_FLAG`].
pub const GOOG: &str = "goog";

/// Block-comment marker of the file that bootstraps the `goog` namespace.
pub const PROVIDE_GOOG_FLAG: &str = "@provideGoog";

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*[\s\S]*?\*/").expect("block comment pattern is valid"));

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to tokenize {}", .path.display())]
    Tokenize {
        path: PathBuf,
        #[source]
        source: LexError,
    },
    #[error("failed to parse {}: {message}", .path.display())]
    Syntax { path: PathBuf, message: String },
}

impl ExtractError {
    pub fn path(&self) -> &Path {
        match self {
            ExtractError::Read { path, .. }
            | ExtractError::Tokenize { path, .. }
            | ExtractError::Syntax { path, .. } => path,
        }
    }
}

/// Provided and required namespaces of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    path: PathBuf,
    provides: Vec<String>,
    requires: Vec<String>,
    is_module: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    syntax_tree: Option<SyntaxTree>,
}

/// The `goog.*` calls the extractor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declaration {
    Provide,
    Module,
    Require,
    SetTestOnly,
}

impl Declaration {
    fn from_method(method: &str) -> Option<Self> {
        match method {
            "provide" => Some(Declaration::Provide),
            "module" => Some(Declaration::Module),
            "require" => Some(Declaration::Require),
            "setTestOnly" => Some(Declaration::SetTestOnly),
            _ => None,
        }
    }
}

impl Source {
    pub fn new(
        path: impl Into<PathBuf>,
        provides: Vec<String>,
        requires: Vec<String>,
        is_module: bool,
    ) -> Self {
        Self {
            path: path.into(),
            provides,
            requires,
            is_module,
            syntax_tree: None,
        }
    }

    /// Read `path` and extract its declarations.
    pub fn from_file(path: impl AsRef<Path>, save_syntax_tree: bool) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| {
            error!(path = %path.display(), error = %source, "failed to read source file");
            ExtractError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_text(path, &text, save_syntax_tree)
    }

    /// Extract declarations from already loaded `text`.
    pub fn from_text(
        path: impl Into<PathBuf>,
        text: &str,
        save_syntax_tree: bool,
    ) -> Result<Self, ExtractError> {
        let path = path.into();

        let parsed =
            TreeSitterParser::javascript().and_then(|mut parser| parser.parse_source(text));
        let tree = match parsed {
            Ok(tree) => tree,
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to parse source file");
                return Err(ExtractError::Syntax {
                    path,
                    message: err.to_string(),
                });
            }
        };

        let tokens = match tokenize(&tree, text) {
            Ok(tokens) => tokens,
            Err(source) => {
                error!(path = %path.display(), error = %source, "failed to tokenize source file");
                return Err(ExtractError::Tokenize { path, source });
            }
        };

        let syntax_tree = save_syntax_tree.then(|| SyntaxTree::from_tree(&tree, text));

        let mut provides = Vec::new();
        let mut requires = Vec::new();
        let mut is_module = false;

        if !is_test_only(&tokens) {
            for (declaration, namespace) in declarations(&tokens) {
                match declaration {
                    Declaration::Provide => provides.push(namespace.to_string()),
                    Declaration::Module => {
                        provides.push(namespace.to_string());
                        is_module = true;
                    }
                    Declaration::Require => requires.push(namespace.to_string()),
                    Declaration::SetTestOnly => {}
                }
            }
        }

        if has_provide_goog_flag(text) {
            provides.push(GOOG.to_string());
        }

        Ok(Self {
            path,
            provides,
            requires,
            is_module,
            syntax_tree,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn provides(&self) -> &[String] {
        &self.provides
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    pub fn is_module(&self) -> bool {
        self.is_module
    }

    pub fn syntax_tree(&self) -> Option<&SyntaxTree> {
        self.syntax_tree.as_ref()
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Source {}", self.path.display())
    }
}

/// Whether any block comment in `text` carries [`PROVIDE_GOOG_FLAG`].
pub fn has_provide_goog_flag(text: &str) -> bool {
    BLOCK_COMMENT
        .find_iter(text)
        .any(|comment| comment.as_str().contains(PROVIDE_GOOG_FLAG))
}

fn is_test_only(tokens: &[Token<'_>]) -> bool {
    declarations(tokens).any(|(declaration, _)| declaration == Declaration::SetTestOnly)
}

fn declarations<'t, 'a: 't>(
    tokens: &'t [Token<'a>],
) -> impl Iterator<Item = (Declaration, &'a str)> + 't {
    tokens.windows(5).filter_map(goog_call)
}

/// Match `goog . <method> ( <string>` and return the call with its unquoted argument.
fn goog_call<'a>(window: &[Token<'a>]) -> Option<(Declaration, &'a str)> {
    match window {
        [goog, dot, method, paren, literal]
            if goog.is(TokenKind::Identifier, GOOG)
                && dot.is_punctuator(".")
                && method.kind == TokenKind::Identifier
                && paren.is_punctuator("(")
                && literal.kind == TokenKind::String =>
        {
            let declaration = Declaration::from_method(method.value)?;
            Some((declaration, strip_quotes(literal.value)))
        }
        _ => None,
    }
}

fn strip_quotes(literal: &str) -> &str {
    // String tokens always open and close with an ASCII quote.
    &literal[1..literal.len() - 1]
}
