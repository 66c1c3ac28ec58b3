//! Token system for SpEL lexical analysis
//!
//! The tokenizer turns an expression string into an eager `Vec` of
//! [`SpannedToken`]s; the parser walks them through a [`TokenStream`].
//!
//! ## Key Components
//!
//! - **[`TokenKind`]** - closed set of operator, punctuation and literal kinds
//! - **[`Token`]** - immutable kind plus optional raw lexeme
//! - **[`TokenStream`]** - forward cursor with lookahead and checkpoints
//!
//! Spans are character offsets into the original expression, so error
//! positions line up with what a user sees.

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenClass, TokenKind};
pub use token_stream::{SpannedToken, TokenStream};

pub use crate::utils::{Position, SourceMap, Span, Spanned};
