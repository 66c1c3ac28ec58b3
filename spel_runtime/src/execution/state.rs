//! Per-evaluation state
//!
//! Created for one `get_value`/`set_value` call and dropped afterwards, so
//! nothing leaks from one evaluation into the next.

use crate::api::context::EvaluationContext;
use crate::types::{EvaluationError, EvaluationResult, Value};
use regex::Regex;
use spel_compiler::config::compile_time::evaluation;
use spel_compiler::logging::codes;
use spel_compiler::SpelParserConfiguration;
use std::collections::HashMap;

pub struct ExpressionState<'a> {
    context: &'a mut dyn EvaluationContext,
    configuration: SpelParserConfiguration,
    root: Value,
    active: Vec<Value>,
    scope_roots: Vec<Value>,
    depth: usize,
    patterns: HashMap<String, Regex>,
}

impl<'a> ExpressionState<'a> {
    pub fn new(context: &'a mut dyn EvaluationContext, configuration: SpelParserConfiguration) -> Self {
        let root = context.root_object();
        Self {
            context,
            configuration,
            root,
            active: Vec::new(),
            scope_roots: Vec::new(),
            depth: 0,
            patterns: HashMap::new(),
        }
    }

    pub fn context(&self) -> &dyn EvaluationContext {
        &*self.context
    }

    pub fn context_mut(&mut self) -> &mut dyn EvaluationContext {
        &mut *self.context
    }

    pub fn configuration(&self) -> &SpelParserConfiguration {
        &self.configuration
    }

    pub fn root(&self) -> Value {
        self.root.clone()
    }

    /// `#this`: the innermost pushed object, or the root
    pub fn active_object(&self) -> Value {
        self.active.last().cloned().unwrap_or_else(|| self.root.clone())
    }

    pub fn push_active(&mut self, value: Value) {
        self.active.push(value);
    }

    pub fn pop_active(&mut self) {
        self.active.pop();
    }

    /// Object arguments and index keys are evaluated against
    pub fn scope_root(&self) -> Value {
        self.scope_roots
            .last()
            .cloned()
            .unwrap_or_else(|| self.root.clone())
    }

    /// Selection and projection open a scope per element
    pub fn enter_scope(&mut self) {
        let active = self.active_object();
        self.scope_roots.push(active);
    }

    pub fn exit_scope(&mut self) {
        self.scope_roots.pop();
    }

    pub fn enter(&mut self) -> EvaluationResult<()> {
        if self.depth >= evaluation::MAX_EVALUATION_DEPTH {
            return Err(EvaluationError::new(
                codes::evaluation::MAX_EVALUATION_DEPTH_EXCEEDED,
                vec![evaluation::MAX_EVALUATION_DEPTH.to_string()],
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn lookup_variable(&self, name: &str) -> Value {
        self.context.lookup_variable(name).unwrap_or(Value::Null)
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.context.set_variable(name, value);
    }

    /// Compiled whole-input pattern, cached for the rest of this evaluation
    pub fn pattern(&mut self, source: &str) -> EvaluationResult<Regex> {
        if let Some(pattern) = self.patterns.get(source) {
            return Ok(pattern.clone());
        }

        if source.chars().count() > evaluation::MAX_REGEX_LENGTH {
            return Err(EvaluationError::new(
                codes::evaluation::MAX_REGEX_LENGTH_EXCEEDED,
                vec![evaluation::MAX_REGEX_LENGTH.to_string()],
            ));
        }

        let pattern = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
            EvaluationError::new(
                codes::evaluation::INVALID_PATTERN,
                vec![source.to_string(), e.to_string()],
            )
        })?;
        self.patterns.insert(source.to_string(), pattern.clone());
        Ok(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::context::StandardEvaluationContext;

    #[test]
    fn active_object_defaults_to_root() {
        let mut context = StandardEvaluationContext::with_root(Value::Int(1));
        let mut state = ExpressionState::new(&mut context, SpelParserConfiguration::default());

        assert_eq!(state.active_object(), Value::Int(1));
        state.push_active(Value::Int(2));
        assert_eq!(state.active_object(), Value::Int(2));
        assert_eq!(state.scope_root(), Value::Int(1));

        state.enter_scope();
        assert_eq!(state.scope_root(), Value::Int(2));
        state.exit_scope();
        state.pop_active();
        assert_eq!(state.active_object(), Value::Int(1));
    }

    #[test]
    fn depth_is_bounded() {
        let mut context = StandardEvaluationContext::new();
        let mut state = ExpressionState::new(&mut context, SpelParserConfiguration::default());

        for _ in 0..evaluation::MAX_EVALUATION_DEPTH {
            state.enter().unwrap();
        }
        let error = state.enter().unwrap_err();
        assert_eq!(error.code, codes::evaluation::MAX_EVALUATION_DEPTH_EXCEEDED);
    }

    #[test]
    fn patterns_match_whole_input_and_are_cached() {
        let mut context = StandardEvaluationContext::new();
        let mut state = ExpressionState::new(&mut context, SpelParserConfiguration::default());

        let pattern = state.pattern("a+").unwrap();
        assert!(pattern.is_match("aaa"));
        assert!(!pattern.is_match("aab"));
        assert_eq!(state.patterns.len(), 1);
        state.pattern("a+").unwrap();
        assert_eq!(state.patterns.len(), 1);

        let error = state.pattern("(").unwrap_err();
        assert_eq!(error.code, codes::evaluation::INVALID_PATTERN);
    }

    #[test]
    fn undefined_variables_are_null() {
        let mut context = StandardEvaluationContext::new();
        let mut state = ExpressionState::new(&mut context, SpelParserConfiguration::default());

        assert_eq!(state.lookup_variable("missing"), Value::Null);
        state.set_variable("x", Value::Int(3));
        assert_eq!(state.lookup_variable("x"), Value::Int(3));
    }
}
