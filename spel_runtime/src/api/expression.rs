//! # Expression API
//!
//! [`SpelExpressionParser`] turns text into a [`SpelExpression`]: the
//! original text, its AST and the configuration it was parsed with. A parsed
//! expression is immutable and can be evaluated any number of times, against
//! any context, from any thread.

use crate::api::context::{EvaluationContext, StandardEvaluationContext};
use crate::execution::ExecutionEngine;
use crate::types::{EvaluationError, EvaluationResult, Value};
use serde::de::DeserializeOwned;
use spel_compiler::logging::codes;
use spel_compiler::syntax::parse_expression_with_configuration;
use spel_compiler::{log_debug, log_error, log_success};
use spel_compiler::{ParseResult, SpelNode, SpelParserConfiguration};
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
pub struct SpelExpressionParser {
    configuration: SpelParserConfiguration,
}

impl SpelExpressionParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configuration(configuration: SpelParserConfiguration) -> Self {
        Self { configuration }
    }

    pub fn configuration(&self) -> &SpelParserConfiguration {
        &self.configuration
    }

    pub fn parse_expression(&self, expression: &str) -> ParseResult<SpelExpression> {
        let ast = parse_expression_with_configuration(expression, &self.configuration)?;
        Ok(SpelExpression {
            expression: expression.to_string(),
            ast,
            configuration: self.configuration,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpelExpression {
    expression: String,
    ast: SpelNode,
    configuration: SpelParserConfiguration,
}

impl SpelExpression {
    pub fn expression_string(&self) -> &str {
        &self.expression
    }

    pub fn ast(&self) -> &SpelNode {
        &self.ast
    }

    pub fn configuration(&self) -> &SpelParserConfiguration {
        &self.configuration
    }

    /// Evaluate with an empty context and a null root
    pub fn get_value(&self) -> EvaluationResult<Value> {
        self.get_value_with_context(&mut StandardEvaluationContext::new())
    }

    pub fn get_value_with_root(&self, root: Value) -> EvaluationResult<Value> {
        self.get_value_with_context(&mut StandardEvaluationContext::with_root(root))
    }

    pub fn get_value_with_context(&self, context: &mut dyn EvaluationContext) -> EvaluationResult<Value> {
        self.run(context, "Evaluation", |engine, ast| engine.evaluate(ast))
    }

    /// Evaluate, then convert the result through its JSON form
    pub fn get_value_as<T: DeserializeOwned>(&self, context: &mut dyn EvaluationContext) -> EvaluationResult<T> {
        let value = self.get_value_with_context(context)?;
        serde_json::from_value(value.to_json()).map_err(|_| {
            EvaluationError::new(
                codes::evaluation::TYPE_CONVERSION_ERROR,
                vec![value.type_name(), std::any::type_name::<T>().to_string()],
            )
        })
    }

    /// Write `value` to the location the expression denotes
    pub fn set_value(&self, context: &mut dyn EvaluationContext, value: Value) -> EvaluationResult<()> {
        self.run(context, "Assignment", |engine, ast| engine.set_value(ast, value))
    }

    pub fn is_writable(&self, context: &mut dyn EvaluationContext) -> EvaluationResult<bool> {
        let mut engine = ExecutionEngine::new(context, self.configuration);
        engine.is_writable(&self.ast)
    }

    /// Canonical text of the parsed tree
    pub fn to_string_ast(&self) -> String {
        self.ast.to_expression_string()
    }

    fn run<T>(
        &self,
        context: &mut dyn EvaluationContext,
        operation: &str,
        f: impl FnOnce(&mut ExecutionEngine, &SpelNode) -> EvaluationResult<T>,
    ) -> EvaluationResult<T> {
        log_debug!("Starting evaluation", "operation" => operation, "nodes" => self.ast.node_count());
        let started = Instant::now();

        let mut engine = ExecutionEngine::new(context, self.configuration);
        let result = f(&mut engine, &self.ast);

        match &result {
            Ok(_) => {
                log_success!(
                    codes::success::EVALUATION_COMPLETE,
                    &format!("{} completed successfully", operation),
                    "duration_ms" => started.elapsed().as_secs_f64() * 1000.0
                );
            }
            Err(error) => {
                log_error!(error.error_code(), &format!("{} failed", operation),
                    "error" => error.message(),
                    "position" => error.position.map(|p| p.to_string()).unwrap_or_default()
                );
            }
        }

        result
    }
}

impl fmt::Display for SpelExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}
