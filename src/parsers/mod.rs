pub mod cache;
pub mod common;
pub mod lexer;
pub mod source;

pub use cache::{CacheError, SourceCache};
pub use common::SyntaxTree;
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use source::{has_provide_goog_flag, ExtractError, Source};
