//! Textual keywords of the expression language
//!
//! Two families of words act as operators. The short aliases
//! (`div eq ge gt le lt mod ne not`) are converted to operator tokens by the
//! tokenizer. The long ones (`and or instanceof matches between`) stay
//! identifiers and are reinterpreted by the parser through
//! [`identifier_operator`], which never mutates the token.
//!
//! All keyword matching is case-insensitive except the type sigil `T`.
use crate::tokens::{Token, TokenKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    // === TOKENIZER ALIASES ===
    Div,
    Eq,
    Ge,
    Gt,
    Le,
    Lt,
    Mod,
    Ne,
    Not,

    // === PARSER ALIASES ===
    And,
    Or,
    InstanceOf,
    Matches,
    Between,

    // === LITERAL AND CONSTRUCT WORDS ===
    True,
    False,
    Null,
    New,
    T,
}

impl Keyword {
    /// Canonical spelling
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Eq => "eq",
            Self::Ge => "ge",
            Self::Gt => "gt",
            Self::Le => "le",
            Self::Lt => "lt",
            Self::Mod => "mod",
            Self::Ne => "ne",
            Self::Not => "not",
            Self::And => "and",
            Self::Or => "or",
            Self::InstanceOf => "instanceof",
            Self::Matches => "matches",
            Self::Between => "between",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::New => "new",
            Self::T => "T",
        }
    }

    /// Look up a word; `T` is the only case-sensitive keyword
    pub fn from_str(s: &str) -> Option<Self> {
        if s == "T" {
            return Some(Self::T);
        }

        let keyword = match s.to_ascii_lowercase().as_str() {
            "div" => Self::Div,
            "eq" => Self::Eq,
            "ge" => Self::Ge,
            "gt" => Self::Gt,
            "le" => Self::Le,
            "lt" => Self::Lt,
            "mod" => Self::Mod,
            "ne" => Self::Ne,
            "not" => Self::Not,
            "and" => Self::And,
            "or" => Self::Or,
            "instanceof" => Self::InstanceOf,
            "matches" => Self::Matches,
            "between" => Self::Between,
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            "new" => Self::New,
            _ => return None,
        };
        Some(keyword)
    }

    /// Operator kind this keyword stands for, if any
    pub const fn operator_kind(self) -> Option<TokenKind> {
        match self {
            Self::Div => Some(TokenKind::Div),
            Self::Eq => Some(TokenKind::Eq),
            Self::Ge => Some(TokenKind::Ge),
            Self::Gt => Some(TokenKind::Gt),
            Self::Le => Some(TokenKind::Le),
            Self::Lt => Some(TokenKind::Lt),
            Self::Mod => Some(TokenKind::Mod),
            Self::Ne => Some(TokenKind::Ne),
            Self::Not => Some(TokenKind::Not),
            Self::And => Some(TokenKind::SymbolicAnd),
            Self::Or => Some(TokenKind::SymbolicOr),
            Self::InstanceOf => Some(TokenKind::InstanceOf),
            Self::Matches => Some(TokenKind::Matches),
            Self::Between => Some(TokenKind::Between),
            Self::True | Self::False | Self::Null | Self::New | Self::T => None,
        }
    }

    /// Converted to an operator token during tokenizing
    pub const fn is_tokenizer_alias(self) -> bool {
        matches!(
            self,
            Self::Div
                | Self::Eq
                | Self::Ge
                | Self::Gt
                | Self::Le
                | Self::Lt
                | Self::Mod
                | Self::Ne
                | Self::Not
        )
    }

    /// Reinterpreted as an operator by the parser
    pub const fn is_parser_alias(self) -> bool {
        matches!(
            self,
            Self::And | Self::Or | Self::InstanceOf | Self::Matches | Self::Between
        )
    }
}

/// Operator kind for a 2 or 3 letter alias word seen by the tokenizer
pub fn alias_operator(word: &str) -> Option<TokenKind> {
    let len = word.chars().count();
    if !(2..=3).contains(&len) {
        return None;
    }

    Keyword::from_str(word)
        .filter(|k| k.is_tokenizer_alias())
        .and_then(Keyword::operator_kind)
}

/// Operator kind an identifier token plays in operator position
pub fn identifier_operator(token: &Token) -> Option<TokenKind> {
    if !token.is_identifier() {
        return None;
    }

    Keyword::from_str(token.string_value())
        .filter(|k| k.is_parser_alias())
        .and_then(Keyword::operator_kind)
}

/// True when `token` is an identifier spelling `keyword` (case-insensitive)
pub fn is_keyword_identifier(token: &Token, keyword: Keyword) -> bool {
    token.is_identifier() && Keyword::from_str(token.string_value()) == Some(keyword)
}

pub fn reserved_keywords() -> &'static [&'static str] {
    &[
        "div",
        "eq",
        "ge",
        "gt",
        "le",
        "lt",
        "mod",
        "ne",
        "not",
        "and",
        "or",
        "instanceof",
        "matches",
        "between",
        "true",
        "false",
        "null",
        "new",
        "T",
    ]
}

pub fn is_reserved_keyword(s: &str) -> bool {
    Keyword::from_str(s).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_case_insensitive() {
        assert_eq!(alias_operator("lt"), Some(TokenKind::Lt));
        assert_eq!(alias_operator("LT"), Some(TokenKind::Lt));
        assert_eq!(alias_operator("Div"), Some(TokenKind::Div));
        assert_eq!(alias_operator("NOT"), Some(TokenKind::Not));
        assert_eq!(alias_operator("and"), None);
        assert_eq!(alias_operator("less"), None);
    }

    #[test]
    fn identifier_operators_do_not_touch_tokenizer_aliases() {
        let and = Token::with_data(TokenKind::Identifier, "AnD");
        assert_eq!(identifier_operator(&and), Some(TokenKind::SymbolicAnd));

        let between = Token::with_data(TokenKind::Identifier, "between");
        assert_eq!(identifier_operator(&between), Some(TokenKind::Between));

        let plain = Token::with_data(TokenKind::Identifier, "name");
        assert_eq!(identifier_operator(&plain), None);

        let string = Token::with_data(TokenKind::LiteralString, "'and'");
        assert_eq!(identifier_operator(&string), None);
    }

    #[test]
    fn type_sigil_is_case_sensitive() {
        assert_eq!(Keyword::from_str("T"), Some(Keyword::T));
        assert_eq!(Keyword::from_str("t"), None);
        assert_eq!(Keyword::from_str("NeW"), Some(Keyword::New));
    }

    #[test]
    fn every_reserved_word_round_trips() {
        for word in reserved_keywords() {
            let keyword = Keyword::from_str(word);
            assert!(keyword.is_some(), "{word} should be a keyword");
            assert_eq!(keyword.map(Keyword::as_str), Some(*word));
        }
    }
}
