//! Evaluation failures
//!
//! Same shape as the parse error: a registry code plus insertion arguments,
//! with the char offset of the node that failed.

use spel_compiler::logging::{codes, Code};
use spel_compiler::utils::{SourceMap, Span};

pub type EvaluationResult<T> = Result<T, EvaluationError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct EvaluationError {
    pub position: Option<usize>,
    pub code: Code,
    pub inserts: Vec<String>,
    message: String,
}

impl EvaluationError {
    pub fn new(code: Code, inserts: Vec<String>) -> Self {
        let message = codes::format_message(code, &inserts);
        Self {
            position: None,
            code,
            inserts,
            message,
        }
    }

    /// Attach the offset of the failing node; an inner node's offset wins
    pub fn with_position(mut self, position: usize) -> Self {
        if self.position.is_none() {
            self.position = Some(position);
        }
        self
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(codes::system::INTERNAL_ERROR, vec![detail.into()])
    }

    pub fn error_code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    /// Caret diagnostic against the evaluated expression text
    pub fn format_diagnostic(&self, expression: &str) -> String {
        let span = Span::single(self.position.unwrap_or(0));
        let mut rendered = SourceMap::new(expression).format_error(&span, &self.to_string());
        rendered.push_str(&format!("   = help: {}\n", self.recommended_action()));
        rendered
    }
}
