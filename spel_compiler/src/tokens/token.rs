//! Token kinds and the immutable token value produced by the tokenizer
//!
//! Every operator, punctuation mark and literal category is a dedicated
//! `TokenKind`. Literal and identifier tokens carry their raw lexeme in
//! `data`; operator tokens created from a textual alias (`lt`, `div`, ...)
//! also keep the word they were spelled with.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of lexeme categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // === LITERALS ===
    LiteralInt,
    LiteralLong,
    LiteralHexInt,
    LiteralHexLong,
    LiteralString,
    LiteralReal,
    LiteralRealFloat,

    // === PUNCTUATION ===
    LParen,
    RParen,
    Comma,
    Identifier,
    Colon,
    Hash,
    RSquare,
    LSquare,
    LCurly,
    RCurly,
    Dot,

    // === ARITHMETIC ===
    Plus,
    Star,
    Minus,

    // === SELECTION AND PROJECTION ===
    SelectFirst,
    SelectLast,
    QMark,
    Project,

    Div,

    // === RELATIONAL ===
    Ge,
    Gt,
    Le,
    Lt,
    Eq,
    Ne,

    Mod,
    Not,
    Assign,
    InstanceOf,
    Matches,
    Between,
    Select,
    Power,
    Elvis,
    SafeNavi,
    BeanRef,
    FactoryBeanRef,
    SymbolicOr,
    SymbolicAnd,
    Inc,
    Dec,
}

impl TokenKind {
    /// Source text of the symbol; empty for payload-carrying kinds
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::LiteralInt
            | Self::LiteralLong
            | Self::LiteralHexInt
            | Self::LiteralHexLong
            | Self::LiteralString
            | Self::LiteralReal
            | Self::LiteralRealFloat
            | Self::Identifier => "",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Hash => "#",
            Self::RSquare => "]",
            Self::LSquare => "[",
            Self::LCurly => "{",
            Self::RCurly => "}",
            Self::Dot => ".",
            Self::Plus => "+",
            Self::Star => "*",
            Self::Minus => "-",
            Self::SelectFirst => "^[",
            Self::SelectLast => "$[",
            Self::QMark => "?",
            Self::Project => "![",
            Self::Div => "/",
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Lt => "<",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Mod => "%",
            Self::Not => "!",
            Self::Assign => "=",
            Self::InstanceOf => "instanceof",
            Self::Matches => "matches",
            Self::Between => "between",
            Self::Select => "?[",
            Self::Power => "^",
            Self::Elvis => "?:",
            Self::SafeNavi => "?.",
            Self::BeanRef => "@",
            Self::FactoryBeanRef => "&",
            Self::SymbolicOr => "||",
            Self::SymbolicAnd => "&&",
            Self::Inc => "++",
            Self::Dec => "--",
        }
    }

    /// Upper-case kind name as used in diagnostics (`LITERAL_INT`, `RPAREN`)
    pub fn name(&self) -> &'static str {
        match self {
            Self::LiteralInt => "LITERAL_INT",
            Self::LiteralLong => "LITERAL_LONG",
            Self::LiteralHexInt => "LITERAL_HEXINT",
            Self::LiteralHexLong => "LITERAL_HEXLONG",
            Self::LiteralString => "LITERAL_STRING",
            Self::LiteralReal => "LITERAL_REAL",
            Self::LiteralRealFloat => "LITERAL_REAL_FLOAT",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::Comma => "COMMA",
            Self::Identifier => "IDENTIFIER",
            Self::Colon => "COLON",
            Self::Hash => "HASH",
            Self::RSquare => "RSQUARE",
            Self::LSquare => "LSQUARE",
            Self::LCurly => "LCURLY",
            Self::RCurly => "RCURLY",
            Self::Dot => "DOT",
            Self::Plus => "PLUS",
            Self::Star => "STAR",
            Self::Minus => "MINUS",
            Self::SelectFirst => "SELECT_FIRST",
            Self::SelectLast => "SELECT_LAST",
            Self::QMark => "QMARK",
            Self::Project => "PROJECT",
            Self::Div => "DIV",
            Self::Ge => "GE",
            Self::Gt => "GT",
            Self::Le => "LE",
            Self::Lt => "LT",
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Mod => "MOD",
            Self::Not => "NOT",
            Self::Assign => "ASSIGN",
            Self::InstanceOf => "INSTANCEOF",
            Self::Matches => "MATCHES",
            Self::Between => "BETWEEN",
            Self::Select => "SELECT",
            Self::Power => "POWER",
            Self::Elvis => "ELVIS",
            Self::SafeNavi => "SAFE_NAVI",
            Self::BeanRef => "BEAN_REF",
            Self::FactoryBeanRef => "FACTORY_BEAN_REF",
            Self::SymbolicOr => "SYMBOLIC_OR",
            Self::SymbolicAnd => "SYMBOLIC_AND",
            Self::Inc => "INC",
            Self::Dec => "DEC",
        }
    }

    /// Literal and identifier kinds carry their lexeme
    pub fn has_payload(&self) -> bool {
        self.symbol().is_empty()
    }

    /// Number of source characters the symbol occupies
    pub fn symbol_len(&self) -> usize {
        self.symbol().chars().count()
    }

    /// Lower-case form used as an insert in error messages (`lt(<)`)
    pub fn display_name(&self) -> String {
        self.to_string().to_lowercase()
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::LiteralInt
                | Self::LiteralLong
                | Self::LiteralHexInt
                | Self::LiteralHexLong
                | Self::LiteralString
                | Self::LiteralReal
                | Self::LiteralRealFloat
        )
    }

    /// `> >= < <= == !=`
    pub fn is_numeric_relational(&self) -> bool {
        matches!(
            self,
            Self::Gt | Self::Ge | Self::Lt | Self::Le | Self::Eq | Self::Ne
        )
    }

    pub fn token_class(&self) -> TokenClass {
        match self {
            k if k.is_literal() => TokenClass::Literal,
            Self::Identifier => TokenClass::Identifier,
            Self::LParen
            | Self::RParen
            | Self::Comma
            | Self::Colon
            | Self::RSquare
            | Self::LSquare
            | Self::LCurly
            | Self::RCurly => TokenClass::Punctuation,
            Self::Dot
            | Self::SafeNavi
            | Self::Select
            | Self::SelectFirst
            | Self::SelectLast
            | Self::Project => TokenClass::Navigation,
            Self::Hash | Self::BeanRef | Self::FactoryBeanRef => TokenClass::Reference,
            _ => TokenClass::Operator,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_payload() {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}({})", self.name(), self.symbol())
        }
    }
}

/// Coarse grouping of token kinds for tooling output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    Literal,
    Identifier,
    Operator,
    Punctuation,
    Navigation,
    Reference,
}

/// One lexical unit; positions live in the surrounding `Spanned`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub data: Option<String>,
}

impl Token {
    /// Token without payload
    pub fn new(kind: TokenKind) -> Self {
        Self { kind, data: None }
    }

    pub fn with_data(kind: TokenKind, data: impl Into<String>) -> Self {
        Self {
            kind,
            data: Some(data.into()),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    pub fn is_numeric_relational_operator(&self) -> bool {
        self.kind.is_numeric_relational()
    }

    /// Raw lexeme, or an empty string for symbol-only tokens
    pub fn string_value(&self) -> &str {
        self.data.as_deref().unwrap_or("")
    }

    /// Text used when the token is quoted in a diagnostic
    pub fn describe(&self) -> String {
        if self.kind.has_payload() {
            self.string_value().to_string()
        } else {
            self.kind.display_name()
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.has_payload() {
            write!(f, "[{}:{}]", self.kind, self.string_value())
        } else {
            write!(f, "[{}]", self.kind)
        }
    }
}
