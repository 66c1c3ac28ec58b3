//! Abstract syntax tree for parsed expressions

pub mod nodes;

pub use nodes::{BinaryOp, Literal, NodeKind, SelectionVariant, SpelNode, UnaryOp};
