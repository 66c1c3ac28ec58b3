//! The single categorized parse error surfaced by the parser
//!
//! Carries the expression, the zero-based char offset of the failure, the
//! message code and its insertion arguments. Lexical failures are folded in
//! at the parser boundary.

use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::utils::{SourceMap, Span};

pub type ParseResult<T> = Result<T, SpelParseError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct SpelParseError {
    pub expression: String,
    pub position: usize,
    pub code: Code,
    pub inserts: Vec<String>,
    message: String,
}

impl SpelParseError {
    pub fn new(expression: &str, position: usize, code: Code, inserts: Vec<String>) -> Self {
        let message = codes::format_message(code, &inserts);
        Self {
            expression: expression.to_string(),
            position,
            code,
            inserts,
            message,
        }
    }

    pub fn from_lexer(expression: &str, error: LexerError) -> Self {
        Self::new(expression, error.position(), error.error_code(), error.inserts())
    }

    pub fn error_code(&self) -> Code {
        self.code
    }

    /// Message template filled with the inserts, without the code
    pub fn message(&self) -> &str {
        &self.message
    }

    /// `expression@position: CODE: message`
    pub fn detailed_message(&self) -> String {
        format!("{}@{}: {}", self.expression, self.position, self)
    }

    pub fn span(&self) -> Span {
        Span::single(self.position)
    }

    pub fn is_lexical(&self) -> bool {
        self.category() == "Lexical"
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    /// Caret diagnostic pointing at the failure offset
    pub fn format_diagnostic(&self) -> String {
        let source_map = SourceMap::new(&self.expression);
        let mut rendered = source_map.format_error(&self.span(), &self.to_string());
        rendered.push_str(&format!("   = help: {}\n", self.recommended_action()));
        rendered
    }
}
