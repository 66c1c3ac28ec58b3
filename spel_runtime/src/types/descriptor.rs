//! Type descriptors produced by `T(...)` and consumed by `instanceof`,
//! constructors and static member access

use crate::types::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of types the runtime knows how to model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Object,
    Number,
    String,
    Character,
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    List,
    Map,
    Math,
}

impl TypeKind {
    fn qualified_name(&self) -> &'static str {
        match self {
            Self::Object => "java.lang.Object",
            Self::Number => "java.lang.Number",
            Self::String => "java.lang.String",
            Self::Character => "java.lang.Character",
            Self::Boolean => "java.lang.Boolean",
            Self::Integer => "java.lang.Integer",
            Self::Long => "java.lang.Long",
            Self::Float => "java.lang.Float",
            Self::Double => "java.lang.Double",
            Self::List => "java.util.List",
            Self::Map => "java.util.Map",
            Self::Math => "java.lang.Math",
        }
    }

    fn primitive_name(&self) -> Option<&'static str> {
        match self {
            Self::Character => Some("char"),
            Self::Boolean => Some("boolean"),
            Self::Integer => Some("int"),
            Self::Long => Some("long"),
            Self::Float => Some("float"),
            Self::Double => Some("double"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    pub primitive: bool,
    pub dimensions: usize,
}

impl TypeDescriptor {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            primitive: false,
            dimensions: 0,
        }
    }

    /// Primitive flavour (`int`, `boolean`); kinds without one stay boxed
    pub fn primitive(kind: TypeKind) -> Self {
        Self {
            kind,
            primitive: kind.primitive_name().is_some(),
            dimensions: 0,
        }
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn is_array(&self) -> bool {
        self.dimensions > 0
    }

    /// Element type of an array type
    pub fn component(&self) -> Self {
        Self {
            dimensions: self.dimensions.saturating_sub(1),
            ..self.clone()
        }
    }

    pub fn name(&self) -> String {
        let base = match (self.primitive, self.kind.primitive_name()) {
            (true, Some(primitive)) => primitive,
            _ => self.kind.qualified_name(),
        };
        format!("{}{}", base, "[]".repeat(self.dimensions))
    }

    /// Runtime type of a value, as `getClass()` reports it
    pub fn of_value(value: &Value) -> Option<Self> {
        let kind = match value {
            Value::Null => return None,
            Value::Boolean(_) => TypeKind::Boolean,
            Value::Int(_) => TypeKind::Integer,
            Value::Long(_) => TypeKind::Long,
            Value::Float(_) => TypeKind::Float,
            Value::Double(_) => TypeKind::Double,
            Value::String(_) => TypeKind::String,
            Value::List(_) => TypeKind::List,
            Value::Map(_) => TypeKind::Map,
            Value::Type(_) | Value::Function(_) => TypeKind::Object,
        };
        Some(Self::new(kind))
    }

    /// Zero value an array of this element type is filled with
    pub fn default_value(&self) -> Value {
        if self.is_array() || !self.primitive {
            return Value::Null;
        }
        match self.kind {
            TypeKind::Boolean => Value::Boolean(false),
            TypeKind::Integer => Value::Int(0),
            TypeKind::Long => Value::Long(0),
            TypeKind::Float => Value::Float(0.0),
            TypeKind::Double => Value::Double(0.0),
            TypeKind::Character => Value::String("\0".to_string()),
            _ => Value::Null,
        }
    }

    pub fn is_instance(&self, value: &Value) -> bool {
        if self.is_array() {
            return matches!(value, Value::List(_));
        }
        match (self.kind, value) {
            (_, Value::Null) => false,
            (TypeKind::Object, _) => true,
            (TypeKind::Number, v) => v.is_number(),
            (TypeKind::String, Value::String(_)) => true,
            (TypeKind::Character, Value::String(s)) => s.chars().count() == 1,
            (TypeKind::Boolean, Value::Boolean(_)) => true,
            (TypeKind::Integer, Value::Int(_)) => true,
            (TypeKind::Long, Value::Long(_)) => true,
            (TypeKind::Float, Value::Float(_)) => true,
            (TypeKind::Double, Value::Double(_)) => true,
            (TypeKind::List, Value::List(_)) => true,
            (TypeKind::Map, Value::Map(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_primitive_flag_and_dimensions() {
        assert_eq!(TypeDescriptor::new(TypeKind::Integer).name(), "java.lang.Integer");
        assert_eq!(TypeDescriptor::primitive(TypeKind::Integer).name(), "int");
        assert_eq!(
            TypeDescriptor::primitive(TypeKind::Double).with_dimensions(2).name(),
            "double[][]"
        );
        // no primitive form
        assert!(!TypeDescriptor::primitive(TypeKind::String).primitive);
    }

    #[test]
    fn array_defaults() {
        assert_eq!(TypeDescriptor::primitive(TypeKind::Integer).default_value(), Value::Int(0));
        assert_eq!(TypeDescriptor::new(TypeKind::Integer).default_value(), Value::Null);
        assert_eq!(
            TypeDescriptor::primitive(TypeKind::Boolean).default_value(),
            Value::Boolean(false)
        );
    }

    #[test]
    fn instance_checks() {
        let number = TypeDescriptor::new(TypeKind::Number);
        assert!(number.is_instance(&Value::Long(3)));
        assert!(!number.is_instance(&Value::string("3")));
        assert!(!TypeDescriptor::new(TypeKind::Object).is_instance(&Value::Null));
        assert!(TypeDescriptor::new(TypeKind::Integer)
            .with_dimensions(1)
            .is_instance(&Value::list(vec![])));
    }
}
