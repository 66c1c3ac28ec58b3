//! # Public API for SpEL evaluation
//!
//! Parse once with [`SpelExpressionParser`], evaluate many times against an
//! [`EvaluationContext`].

pub mod context;
pub mod errors;
pub mod expression;

pub use context::{EvaluationContext, StandardEvaluationContext};
pub use errors::ExpressionError;
pub use expression::{SpelExpression, SpelExpressionParser};

use crate::types::Value;

/// Parse and evaluate in one step with the default configuration
pub fn evaluate(expression: &str, context: &mut dyn EvaluationContext) -> Result<Value, ExpressionError> {
    let parsed = SpelExpressionParser::new().parse_expression(expression)?;
    Ok(parsed.get_value_with_context(context)?)
}
