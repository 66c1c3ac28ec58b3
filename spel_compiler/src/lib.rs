// Internal modules
pub mod config;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use config::SpelParserConfiguration;
pub use grammar::{BinaryOp, Literal, NodeKind, SelectionVariant, SpelNode, UnaryOp};
pub use lexical::{LexerError, Tokenizer};
pub use syntax::{parse_expression, ParseResult, SpelParseError, SpelParser};
pub use tokens::{SpannedToken, Token, TokenKind};
pub use utils::Span;
