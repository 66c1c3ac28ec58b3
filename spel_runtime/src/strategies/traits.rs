//! Extension points consulted during evaluation
//!
//! Hosts plug bean lookup, extra methods and type lookup into an
//! evaluation context through these traits.

use crate::types::{TypeDescriptor, Value};
use std::collections::HashMap;

/// Resolves `@name` and `&name` references
pub trait BeanResolver {
    /// `name` keeps the leading `&` for factory bean references
    fn resolve(&self, name: &str) -> Result<Value, String>;
}

/// Host-provided methods, tried before the built-in ones
pub trait MethodResolver {
    /// `None` when this resolver has no method `name` for `target`
    fn invoke(&self, target: &Value, name: &str, args: &[Value]) -> Option<Result<Value, String>>;
}

/// Maps the name inside `T(...)` or after `new` to a type
pub trait TypeLocator {
    fn find_type(&self, name: &str) -> Option<TypeDescriptor>;
}

/// Bean resolver over a fixed set of named values
#[derive(Debug, Clone, Default)]
pub struct StaticBeanResolver {
    beans: HashMap<String, Value>,
}

impl StaticBeanResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bean(mut self, name: impl Into<String>, value: Value) -> Self {
        self.beans.insert(name.into(), value);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, value: Value) {
        self.beans.insert(name.into(), value);
    }
}

impl BeanResolver for StaticBeanResolver {
    fn resolve(&self, name: &str) -> Result<Value, String> {
        self.beans
            .get(name)
            .cloned()
            .ok_or_else(|| format!("No bean named '{}' available", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_beans_resolve_by_exact_name() {
        let resolver = StaticBeanResolver::new()
            .with_bean("config", Value::Int(1))
            .with_bean("&factory", Value::string("factory"));

        assert_eq!(resolver.resolve("config"), Ok(Value::Int(1)));
        assert_eq!(resolver.resolve("&factory"), Ok(Value::string("factory")));
        assert!(resolver.resolve("factory").is_err());
    }
}
