//! Evaluation contexts
//!
//! A context supplies what an expression can see besides its own text: the
//! root object, variables and functions, and the bean, method and type
//! lookups. Contexts are mutable (assignment to `#var` writes into them) and
//! are not shared between threads.

use crate::strategies::{BeanResolver, MethodResolver, StandardTypeLocator, TypeLocator};
use crate::types::{FunctionRef, Value};
use std::collections::HashMap;

pub trait EvaluationContext {
    /// Object `#root` and unqualified names evaluate against
    fn root_object(&self) -> Value;

    fn lookup_variable(&self, name: &str) -> Option<Value>;

    fn set_variable(&mut self, name: &str, value: Value);

    fn bean_resolver(&self) -> Option<&dyn BeanResolver>;

    fn type_locator(&self) -> &dyn TypeLocator;

    fn method_resolvers(&self) -> &[Box<dyn MethodResolver>];
}

pub struct StandardEvaluationContext {
    root: Value,
    variables: HashMap<String, Value>,
    bean_resolver: Option<Box<dyn BeanResolver>>,
    type_locator: Box<dyn TypeLocator>,
    method_resolvers: Vec<Box<dyn MethodResolver>>,
}

impl Default for StandardEvaluationContext {
    fn default() -> Self {
        Self {
            root: Value::Null,
            variables: HashMap::new(),
            bean_resolver: None,
            type_locator: Box::new(StandardTypeLocator::new()),
            method_resolvers: Vec::new(),
        }
    }
}

impl StandardEvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: Value) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    pub fn set_root_object(&mut self, root: Value) {
        self.root = root;
    }

    /// Functions live alongside variables and are called as `#name(...)`
    pub fn register_function(&mut self, function: FunctionRef) {
        self.variables
            .insert(function.name().to_string(), Value::Function(function));
    }

    pub fn set_bean_resolver(&mut self, resolver: impl BeanResolver + 'static) {
        self.bean_resolver = Some(Box::new(resolver));
    }

    pub fn set_type_locator(&mut self, locator: impl TypeLocator + 'static) {
        self.type_locator = Box::new(locator);
    }

    pub fn add_method_resolver(&mut self, resolver: impl MethodResolver + 'static) {
        self.method_resolvers.push(Box::new(resolver));
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }
}

impl EvaluationContext for StandardEvaluationContext {
    fn root_object(&self) -> Value {
        self.root.clone()
    }

    fn lookup_variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).cloned()
    }

    fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    fn bean_resolver(&self) -> Option<&dyn BeanResolver> {
        self.bean_resolver.as_deref()
    }

    fn type_locator(&self) -> &dyn TypeLocator {
        self.type_locator.as_ref()
    }

    fn method_resolvers(&self) -> &[Box<dyn MethodResolver>] {
        &self.method_resolvers
    }
}
