//! # SpEL runtime
//!
//! Evaluates expressions parsed by `spel_compiler` against a dynamically
//! typed value model.

pub mod api;
pub mod execution;
pub mod strategies;
pub mod types;

// Convenience re-exports
pub use api::*;

pub mod prelude {
    pub use crate::api::{
        evaluate, EvaluationContext, ExpressionError, SpelExpression, SpelExpressionParser,
        StandardEvaluationContext,
    };

    pub use crate::strategies::{
        BeanResolver, MethodResolver, StandardTypeLocator, StaticBeanResolver, TypeLocator,
    };

    pub use crate::types::{EvaluationError, EvaluationResult, FunctionRef, TypeDescriptor, Value};

    pub use spel_compiler::SpelParserConfiguration;
}
