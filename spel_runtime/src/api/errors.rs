//! # Expression Errors

use crate::types::EvaluationError;
use spel_compiler::logging::Code;
use spel_compiler::SpelParseError;

/// Either half of parse-then-evaluate failing
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExpressionError {
    #[error(transparent)]
    Parse(#[from] SpelParseError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl ExpressionError {
    pub fn error_code(&self) -> Code {
        match self {
            ExpressionError::Parse(e) => e.error_code(),
            ExpressionError::Evaluation(e) => e.error_code(),
        }
    }

    /// Char offset into the expression, when known
    pub fn position(&self) -> Option<usize> {
        match self {
            ExpressionError::Parse(e) => Some(e.position),
            ExpressionError::Evaluation(e) => e.position,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, ExpressionError::Parse(_))
    }

    /// Caret diagnostic; parse errors carry their own expression text
    pub fn format_diagnostic(&self, expression: &str) -> String {
        match self {
            ExpressionError::Parse(e) => e.format_diagnostic(),
            ExpressionError::Evaluation(e) => e.format_diagnostic(expression),
        }
    }
}
