//! Grammar definitions for SpEL: keywords and the AST

pub mod ast;
pub mod keywords;

// Re-export AST types
pub use ast::nodes::*;

// Re-export keywords
pub use keywords::{alias_operator, identifier_operator, is_reserved_keyword, Keyword};
