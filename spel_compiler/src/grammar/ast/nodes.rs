//! AST node definitions for parsed expressions
//!
//! Design principles:
//! - Closed sum type: every construct is one `NodeKind` variant
//! - Strict tree: children are owned through `Box`/`Vec`, nothing is shared
//! - Span tracking: every node records its char offsets
//! - Serde compatible: trees serialize for tooling output

use crate::tokens::TokenKind;
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

// === OPERATORS ===

/// Two-operand operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Logical
    Or,
    And,
    // Relational
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    InstanceOf,
    Matches,
    Between,
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulus,
    Power,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::InstanceOf => "instanceof",
            Self::Matches => "matches",
            Self::Between => "between",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulus => "%",
            Self::Power => "^",
        }
    }

    /// Operator a token kind introduces in binary position
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::SymbolicOr => Self::Or,
            TokenKind::SymbolicAnd => Self::And,
            TokenKind::Eq => Self::Eq,
            TokenKind::Ne => Self::Ne,
            TokenKind::Lt => Self::Lt,
            TokenKind::Le => Self::Le,
            TokenKind::Gt => Self::Gt,
            TokenKind::Ge => Self::Ge,
            TokenKind::InstanceOf => Self::InstanceOf,
            TokenKind::Matches => Self::Matches,
            TokenKind::Between => Self::Between,
            TokenKind::Plus => Self::Plus,
            TokenKind::Minus => Self::Minus,
            TokenKind::Star => Self::Multiply,
            TokenKind::Div => Self::Divide,
            TokenKind::Mod => Self::Modulus,
            TokenKind::Power => Self::Power,
            _ => return None,
        };
        Some(op)
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::Ne
                | Self::Lt
                | Self::Le
                | Self::Gt
                | Self::Ge
                | Self::InstanceOf
                | Self::Matches
                | Self::Between
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Self::Or | Self::And)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Plus => "+",
            Self::Minus => "-",
        }
    }
}

/// Which matches a selection keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionVariant {
    /// `?[...]`
    All,
    /// `^[...]`
    First,
    /// `$[...]`
    Last,
}

impl SelectionVariant {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::All => "?[",
            Self::First => "^[",
            Self::Last => "$[",
        }
    }
}

// === LITERALS ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i32),
    Long(i64),
    Float(f32),
    Real(f64),
    String(String),
    Boolean(bool),
    Null,
}

impl Literal {
    /// Canonical source form
    pub fn to_source(&self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Long(l) => format!("{}L", l),
            Self::Float(f) => format!("{}f", format_real(*f as f64)),
            Self::Real(r) => format_real(*r),
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Boolean(b) => b.to_string(),
            Self::Null => "null".to_string(),
        }
    }
}

/// Reals always render with a fraction so they reparse as reals
fn format_real(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{}.0", text)
    } else {
        text
    }
}

// === NODES ===

/// One node of the expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpelNode {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Literal(Literal),
    Binary {
        op: BinaryOp,
        left: Box<SpelNode>,
        right: Box<SpelNode>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<SpelNode>,
    },
    Increment {
        operand: Box<SpelNode>,
        postfix: bool,
    },
    Decrement {
        operand: Box<SpelNode>,
        postfix: bool,
    },
    Ternary {
        condition: Box<SpelNode>,
        if_true: Box<SpelNode>,
        if_false: Box<SpelNode>,
    },
    Elvis {
        value: Box<SpelNode>,
        fallback: Box<SpelNode>,
    },
    Assign {
        target: Box<SpelNode>,
        value: Box<SpelNode>,
    },
    PropertyOrField {
        name: String,
        null_safe: bool,
    },
    MethodReference {
        name: String,
        args: Vec<SpelNode>,
        null_safe: bool,
    },
    /// `#name(args)`
    FunctionReference {
        name: String,
        args: Vec<SpelNode>,
    },
    /// `#name`, including `#this` and `#root`
    VariableReference {
        name: String,
    },
    /// `@name`, or `&name` for a factory bean (name keeps the `&`)
    BeanReference {
        name: String,
    },
    /// `T(qualified.Name[][])`
    TypeReference {
        type_name: Box<SpelNode>,
        dimensions: usize,
    },
    QualifiedIdentifier {
        parts: Vec<String>,
    },
    Constructor {
        type_name: Box<SpelNode>,
        args: Vec<SpelNode>,
    },
    /// `new T[d1][d2]` or `new T[]{...}`; absent dimensions are `None`
    ArrayConstructor {
        type_name: Box<SpelNode>,
        dimensions: Vec<Option<SpelNode>>,
        initializer: Option<Box<SpelNode>>,
    },
    Indexer {
        index: Box<SpelNode>,
        null_safe: bool,
    },
    Selection {
        variant: SelectionVariant,
        criteria: Box<SpelNode>,
        null_safe: bool,
    },
    Projection {
        expression: Box<SpelNode>,
        null_safe: bool,
    },
    InlineList(Vec<SpelNode>),
    InlineMap(Vec<(SpelNode, SpelNode)>),
    /// Navigation chain; each step runs against the previous result
    Compound(Vec<SpelNode>),
}

impl SpelNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn literal(literal: Literal, span: Span) -> Self {
        Self::new(NodeKind::Literal(literal), span)
    }

    pub fn null_literal(span: Span) -> Self {
        Self::literal(Literal::Null, span)
    }

    pub fn start_position(&self) -> usize {
        self.span.start
    }

    pub fn end_position(&self) -> usize {
        self.span.end
    }

    /// Short variant name for diagnostics
    pub fn node_type(&self) -> &'static str {
        match &self.kind {
            NodeKind::Literal(_) => "Literal",
            NodeKind::Binary { .. } => "Operator",
            NodeKind::Unary { .. } => "UnaryOperator",
            NodeKind::Increment { .. } => "OpInc",
            NodeKind::Decrement { .. } => "OpDec",
            NodeKind::Ternary { .. } => "Ternary",
            NodeKind::Elvis { .. } => "Elvis",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::PropertyOrField { .. } => "PropertyOrFieldReference",
            NodeKind::MethodReference { .. } => "MethodReference",
            NodeKind::FunctionReference { .. } => "FunctionReference",
            NodeKind::VariableReference { .. } => "VariableReference",
            NodeKind::BeanReference { .. } => "BeanReference",
            NodeKind::TypeReference { .. } => "TypeReference",
            NodeKind::QualifiedIdentifier { .. } => "QualifiedIdentifier",
            NodeKind::Constructor { .. } => "ConstructorReference",
            NodeKind::ArrayConstructor { .. } => "ArrayConstructor",
            NodeKind::Indexer { .. } => "Indexer",
            NodeKind::Selection { .. } => "Selection",
            NodeKind::Projection { .. } => "Projection",
            NodeKind::InlineList(_) => "InlineList",
            NodeKind::InlineMap(_) => "InlineMap",
            NodeKind::Compound(_) => "CompoundExpression",
        }
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<&SpelNode> {
        match &self.kind {
            NodeKind::Literal(_)
            | NodeKind::PropertyOrField { .. }
            | NodeKind::VariableReference { .. }
            | NodeKind::BeanReference { .. }
            | NodeKind::QualifiedIdentifier { .. } => Vec::new(),
            NodeKind::Binary { left, right, .. } => vec![left, right],
            NodeKind::Unary { operand, .. }
            | NodeKind::Increment { operand, .. }
            | NodeKind::Decrement { operand, .. } => vec![operand],
            NodeKind::Ternary {
                condition,
                if_true,
                if_false,
            } => vec![condition, if_true, if_false],
            NodeKind::Elvis { value, fallback } => vec![value, fallback],
            NodeKind::Assign { target, value } => vec![target, value],
            NodeKind::MethodReference { args, .. } | NodeKind::FunctionReference { args, .. } => {
                args.iter().collect()
            }
            NodeKind::TypeReference { type_name, .. } => vec![type_name],
            NodeKind::Constructor { type_name, args } => {
                let mut children: Vec<&SpelNode> = vec![type_name];
                children.extend(args.iter());
                children
            }
            NodeKind::ArrayConstructor {
                type_name,
                dimensions,
                initializer,
            } => {
                let mut children: Vec<&SpelNode> = vec![type_name];
                children.extend(dimensions.iter().flatten());
                children.extend(initializer.as_deref());
                children
            }
            NodeKind::Indexer { index, .. } => vec![index],
            NodeKind::Selection { criteria, .. } => vec![criteria],
            NodeKind::Projection { expression, .. } => vec![expression],
            NodeKind::InlineList(items) | NodeKind::Compound(items) => items.iter().collect(),
            NodeKind::InlineMap(entries) => entries.iter().flat_map(|(k, v)| [k, v]).collect(),
        }
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(SpelNode::node_count)
            .sum::<usize>()
    }

    /// Whether the node can be the target of `=`, `++` or `--`
    pub fn is_assignable(&self) -> bool {
        match &self.kind {
            NodeKind::PropertyOrField { .. } | NodeKind::Indexer { .. } => true,
            NodeKind::VariableReference { name } => name != "this" && name != "root",
            NodeKind::Compound(steps) => steps.last().is_some_and(SpelNode::is_assignable),
            _ => false,
        }
    }

    /// Qualified name text for `QualifiedIdentifier` nodes
    pub fn qualified_name(&self) -> Option<String> {
        match &self.kind {
            NodeKind::QualifiedIdentifier { parts } => Some(parts.join(".")),
            _ => None,
        }
    }

    /// Render the tree back to canonical expression text
    pub fn to_expression_string(&self) -> String {
        match &self.kind {
            NodeKind::Literal(literal) => literal.to_source(),
            NodeKind::Binary { op, left, right } => format!(
                "({} {} {})",
                left.to_expression_string(),
                op.as_str(),
                right.to_expression_string()
            ),
            NodeKind::Unary { op, operand } => {
                format!("{}{}", op.as_str(), operand.to_expression_string())
            }
            NodeKind::Increment { operand, postfix } => {
                affix(operand.to_expression_string(), "++", *postfix)
            }
            NodeKind::Decrement { operand, postfix } => {
                affix(operand.to_expression_string(), "--", *postfix)
            }
            NodeKind::Ternary {
                condition,
                if_true,
                if_false,
            } => format!(
                "({} ? {} : {})",
                condition.to_expression_string(),
                if_true.to_expression_string(),
                if_false.to_expression_string()
            ),
            NodeKind::Elvis { value, fallback } => format!(
                "({} ?: {})",
                value.to_expression_string(),
                fallback.to_expression_string()
            ),
            NodeKind::Assign { target, value } => format!(
                "{}={}",
                target.to_expression_string(),
                value.to_expression_string()
            ),
            NodeKind::PropertyOrField { name, .. } => name.clone(),
            NodeKind::MethodReference { name, args, .. } => {
                format!("{}({})", name, join_nodes(args))
            }
            NodeKind::FunctionReference { name, args } => {
                format!("#{}({})", name, join_nodes(args))
            }
            NodeKind::VariableReference { name } => format!("#{}", name),
            NodeKind::BeanReference { name } => match name.strip_prefix('&') {
                Some(factory) => format!("&{}", factory),
                None => format!("@{}", name),
            },
            NodeKind::TypeReference {
                type_name,
                dimensions,
            } => format!(
                "T({}{})",
                type_name.to_expression_string(),
                "[]".repeat(*dimensions)
            ),
            NodeKind::QualifiedIdentifier { parts } => parts.join("."),
            NodeKind::Constructor { type_name, args } => format!(
                "new {}({})",
                type_name.to_expression_string(),
                join_nodes(args)
            ),
            NodeKind::ArrayConstructor {
                type_name,
                dimensions,
                initializer,
            } => {
                let mut text = format!("new {}", type_name.to_expression_string());
                for dimension in dimensions {
                    match dimension {
                        Some(size) => text.push_str(&format!("[{}]", size.to_expression_string())),
                        None => text.push_str("[]"),
                    }
                }
                if let Some(init) = initializer {
                    text.push_str(&init.to_expression_string());
                }
                text
            }
            NodeKind::Indexer { index, .. } => format!("[{}]", index.to_expression_string()),
            NodeKind::Selection {
                variant, criteria, ..
            } => format!("{}{}]", variant.prefix(), criteria.to_expression_string()),
            NodeKind::Projection { expression, .. } => {
                format!("![{}]", expression.to_expression_string())
            }
            NodeKind::InlineList(items) => format!("{{{}}}", join_nodes(items)),
            NodeKind::InlineMap(entries) => {
                if entries.is_empty() {
                    return "{:}".to_string();
                }
                let body: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| {
                        format!("{}:{}", k.to_expression_string(), v.to_expression_string())
                    })
                    .collect();
                format!("{{{}}}", body.join(","))
            }
            NodeKind::Compound(steps) => {
                let mut text = String::new();
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        if step.is_null_safe() {
                            text.push_str("?.");
                        } else if !matches!(step.kind, NodeKind::Indexer { .. }) {
                            text.push('.');
                        }
                    }
                    text.push_str(&step.to_expression_string());
                }
                text
            }
        }
    }

    /// Whether the node was reached through `?.`
    pub fn is_null_safe(&self) -> bool {
        match &self.kind {
            NodeKind::PropertyOrField { null_safe, .. }
            | NodeKind::MethodReference { null_safe, .. }
            | NodeKind::Indexer { null_safe, .. }
            | NodeKind::Selection { null_safe, .. }
            | NodeKind::Projection { null_safe, .. } => *null_safe,
            _ => false,
        }
    }
}

fn affix(operand: String, symbol: &str, postfix: bool) -> String {
    if postfix {
        format!("{}{}", operand, symbol)
    } else {
        format!("{}{}", symbol, operand)
    }
}

fn join_nodes(nodes: &[SpelNode]) -> String {
    nodes
        .iter()
        .map(SpelNode::to_expression_string)
        .collect::<Vec<_>>()
        .join(",")
}

// === DISPLAY IMPLEMENTATIONS ===

impl fmt::Display for SpelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_expression_string())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: NodeKind) -> SpelNode {
        SpelNode::new(kind, Span::new(0, 1))
    }

    fn int(i: i32) -> SpelNode {
        SpelNode::literal(Literal::Int(i), Span::new(0, 1))
    }

    #[test]
    fn literal_sources() {
        assert_eq!(Literal::Long(5).to_source(), "5L");
        assert_eq!(Literal::Real(2.0).to_source(), "2.0");
        assert_eq!(Literal::Float(1.5).to_source(), "1.5f");
        assert_eq!(Literal::String("it's".into()).to_source(), "'it''s'");
        assert_eq!(Literal::Null.to_source(), "null");
    }

    #[test]
    fn binary_renders_parenthesized() {
        let tree = node(NodeKind::Binary {
            op: BinaryOp::Plus,
            left: Box::new(int(1)),
            right: Box::new(node(NodeKind::Binary {
                op: BinaryOp::Multiply,
                left: Box::new(int(2)),
                right: Box::new(int(3)),
            })),
        });

        assert_eq!(tree.to_expression_string(), "(1 + (2 * 3))");
        assert_eq!(tree.children().len(), 2);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn compound_renders_navigation() {
        let tree = node(NodeKind::Compound(vec![
            node(NodeKind::PropertyOrField {
                name: "a".into(),
                null_safe: false,
            }),
            node(NodeKind::PropertyOrField {
                name: "b".into(),
                null_safe: true,
            }),
            node(NodeKind::Indexer {
                index: Box::new(int(0)),
                null_safe: false,
            }),
            node(NodeKind::MethodReference {
                name: "size".into(),
                args: vec![],
                null_safe: false,
            }),
        ]));

        assert_eq!(tree.to_expression_string(), "a?.b[0].size()");
        assert!(!tree.is_assignable());
    }

    #[test]
    fn assignability() {
        let property = node(NodeKind::PropertyOrField {
            name: "x".into(),
            null_safe: false,
        });
        assert!(property.is_assignable());

        let this = node(NodeKind::VariableReference { name: "this".into() });
        assert!(!this.is_assignable());

        let var = node(NodeKind::VariableReference { name: "v".into() });
        assert!(var.is_assignable());
        assert!(!int(1).is_assignable());
    }

    #[test]
    fn inline_collections_render() {
        assert_eq!(node(NodeKind::InlineMap(vec![])).to_expression_string(), "{:}");
        assert_eq!(node(NodeKind::InlineList(vec![])).to_expression_string(), "{}");
        let map = node(NodeKind::InlineMap(vec![(int(1), int(2))]));
        assert_eq!(map.to_expression_string(), "{1:2}");
    }

    #[test]
    fn bean_references_render_with_sigil() {
        let bean = node(NodeKind::BeanReference { name: "svc".into() });
        let factory = node(NodeKind::BeanReference { name: "&svc".into() });
        assert_eq!(bean.to_expression_string(), "@svc");
        assert_eq!(factory.to_expression_string(), "&svc");
    }

    #[test]
    fn operator_lookup() {
        assert_eq!(BinaryOp::from_token_kind(TokenKind::Star), Some(BinaryOp::Multiply));
        assert_eq!(BinaryOp::from_token_kind(TokenKind::Comma), None);
        assert!(BinaryOp::Between.is_relational());
        assert!(BinaryOp::Or.is_logical());
    }
}
