//! Dynamically typed runtime values
//!
//! Lists and maps are shared handles: cloning a `Value::List` clones the
//! handle, so a write through one handle is visible through every other.
//! That is what lets `x = 10` mutate the root object the caller passed in.

use crate::types::descriptor::TypeDescriptor;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type ListRef = Rc<RefCell<Vec<Value>>>;
pub type MapRef = Rc<RefCell<IndexMap<MapKey, Value>>>;

/// Host function callable as `#name(args)`
pub type NativeFunction = dyn Fn(&[Value]) -> Result<Value, String>;

#[derive(Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    List(ListRef),
    Map(MapRef),
    Type(TypeDescriptor),
    Function(FunctionRef),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn map<K: Into<MapKey>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let map: IndexMap<MapKey, Value> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Map(Rc::new(RefCell::new(map)))
    }

    pub fn empty_map() -> Self {
        Value::Map(Rc::new(RefCell::new(IndexMap::new())))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integral numbers widened to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i64::from(*i)),
            Value::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Any number widened to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(f64::from(*i)),
            Value::Long(l) => Some(*l as f64),
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Snapshot of the list elements
    pub fn list_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.borrow().clone()),
            _ => None,
        }
    }

    /// Fully qualified runtime type name used in diagnostics
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Type(_) => "java.lang.Class".to_string(),
            Value::Function(_) => "java.lang.reflect.Method".to_string(),
            other => TypeDescriptor::of_value(other)
                .map(|t| t.name())
                .unwrap_or_default(),
        }
    }

    /// Boolean view used by logical operators and conditions
    pub fn to_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(small) => Value::Int(small),
                        Err(_) => Value::Long(i),
                    }
                } else {
                    Value::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::list(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::map(
                entries
                    .iter()
                    .map(|(k, v)| (MapKey::String(k.clone()), Value::from_json(v))),
            ),
        }
    }

    /// JSON form; a collection nested inside itself becomes `"(this Map)"` or
    /// `"(this Collection)"`
    pub fn to_json(&self) -> serde_json::Value {
        self.json_within(&mut Vec::new())
    }

    fn json_within(&self, visiting: &mut Vec<*const ()>) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Long(l) => serde_json::Value::from(*l),
            Value::Float(f) => real_to_json(f64::from(*f)),
            Value::Double(d) => real_to_json(*d),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                let ptr = Rc::as_ptr(items) as *const ();
                if visiting.contains(&ptr) {
                    return serde_json::Value::String(SELF_COLLECTION.to_string());
                }
                visiting.push(ptr);
                let json = items.borrow().iter().map(|item| item.json_within(visiting)).collect();
                visiting.pop();
                serde_json::Value::Array(json)
            }
            Value::Map(entries) => {
                let ptr = Rc::as_ptr(entries) as *const ();
                if visiting.contains(&ptr) {
                    return serde_json::Value::String(SELF_MAP.to_string());
                }
                visiting.push(ptr);
                let json = entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.json_within(visiting)))
                    .collect();
                visiting.pop();
                serde_json::Value::Object(json)
            }
            Value::Type(t) => serde_json::Value::String(t.name()),
            Value::Function(f) => serde_json::Value::String(format!("#{}", f.name())),
        }
    }

    fn write_within(&self, f: &mut fmt::Formatter<'_>, visiting: &mut Vec<*const ()>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}", l),
            Value::Float(v) => write!(f, "{}", format_java_double(f64::from(*v))),
            Value::Double(d) => write!(f, "{}", format_java_double(*d)),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                let ptr = Rc::as_ptr(items) as *const ();
                if visiting.contains(&ptr) {
                    return f.write_str(SELF_COLLECTION);
                }
                visiting.push(ptr);
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.write_within(f, visiting)?;
                }
                visiting.pop();
                write!(f, "]")
            }
            Value::Map(entries) => {
                let ptr = Rc::as_ptr(entries) as *const ();
                if visiting.contains(&ptr) {
                    return f.write_str(SELF_MAP);
                }
                visiting.push(ptr);
                write!(f, "{{")?;
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}=", key)?;
                    value.write_within(f, visiting)?;
                }
                visiting.pop();
                write!(f, "}}")
            }
            Value::Type(t) => write!(f, "class {}", t.name()),
            Value::Function(func) => write!(f, "function {}", func.name()),
        }
    }

    /// Pairs already under comparison count as equal, so cyclic structures terminate
    fn equals_within(&self, other: &Value, comparing: &mut Vec<(*const (), *const ())>) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                let pair = (Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ());
                if Rc::ptr_eq(a, b) || comparing.contains(&pair) {
                    return true;
                }
                let (left, right) = (a.borrow(), b.borrow());
                if left.len() != right.len() {
                    return false;
                }
                comparing.push(pair);
                let equal = left
                    .iter()
                    .zip(right.iter())
                    .all(|(x, y)| x.equals_within(y, comparing));
                comparing.pop();
                equal
            }
            (Value::Map(a), Value::Map(b)) => {
                let pair = (Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ());
                if Rc::ptr_eq(a, b) || comparing.contains(&pair) {
                    return true;
                }
                let (left, right) = (a.borrow(), b.borrow());
                if left.len() != right.len() {
                    return false;
                }
                comparing.push(pair);
                let equal = left.iter().all(|(key, x)| {
                    right
                        .get(key)
                        .is_some_and(|y| x.equals_within(y, comparing))
                });
                comparing.pop();
                equal
            }
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

const SELF_MAP: &str = "(this Map)";
const SELF_COLLECTION: &str = "(this Collection)";

fn real_to_json(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(format_java_double(value)))
}

/// `Double.toString` formatting: always a fraction, scientific outside 1e-3..1e7
pub fn format_java_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-3..1e7).contains(&magnitude) {
        let text = format!("{:e}", value);
        let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
        let mantissa = if mantissa.contains('.') {
            mantissa.to_string()
        } else {
            format!("{}.0", mantissa)
        };
        return format!("{}E{}", mantissa, exponent);
    }

    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_within(f, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Long(l) => write!(f, "Long({})", l),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Double(d) => write!(f, "Double({})", d),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::List(_) => write!(f, "List({})", self),
            Value::Map(_) => write!(f, "Map({})", self),
            Value::Type(t) => write!(f, "Type({})", t.name()),
            Value::Function(func) => write!(f, "{:?}", func),
        }
    }
}

/// Structural equality; numbers of different kinds are not equal here
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals_within(other, &mut Vec::new())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

// ============================================================================
// MAP KEYS
// ============================================================================

/// Hashable projection of a value used as a map key
///
/// Reals hash by bit pattern; collections and other non-scalar keys are
/// keyed by their display text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    String(String),
    Other(String),
}

impl MapKey {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => MapKey::Null,
            Value::Boolean(b) => MapKey::Boolean(*b),
            Value::Int(i) => MapKey::Int(*i),
            Value::Long(l) => MapKey::Long(*l),
            Value::Float(f) => MapKey::Float(f.to_bits()),
            Value::Double(d) => MapKey::Double(d.to_bits()),
            Value::String(s) => MapKey::String(s.clone()),
            other => MapKey::Other(other.to_string()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Null => Value::Null,
            MapKey::Boolean(b) => Value::Boolean(*b),
            MapKey::Int(i) => Value::Int(*i),
            MapKey::Long(l) => Value::Long(*l),
            MapKey::Float(bits) => Value::Float(f32::from_bits(*bits)),
            MapKey::Double(bits) => Value::Double(f64::from_bits(*bits)),
            MapKey::String(s) | MapKey::Other(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl From<&str> for MapKey {
    fn from(value: &str) -> Self {
        MapKey::String(value.to_string())
    }
}

impl From<String> for MapKey {
    fn from(value: String) -> Self {
        MapKey::String(value)
    }
}

impl From<Value> for MapKey {
    fn from(value: Value) -> Self {
        MapKey::from_value(&value)
    }
}

// ============================================================================
// FUNCTIONS
// ============================================================================

#[derive(Clone)]
pub struct FunctionRef {
    name: String,
    arity: Option<usize>,
    function: Rc<NativeFunction>,
}

impl FunctionRef {
    /// Function taking exactly `arity` arguments
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        function: impl Fn(&[Value]) -> Result<Value, String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity: Some(arity),
            function: Rc::new(function),
        }
    }

    /// Function accepting any number of arguments
    pub fn variadic(
        name: impl Into<String>,
        function: impl Fn(&[Value]) -> Result<Value, String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity: None,
            function: Rc::new(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        (self.function)(args)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRef")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.function, &other.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_pick_narrowest_kind() {
        assert_eq!(Value::from_json(&json!(7)), Value::Int(7));
        assert_eq!(Value::from_json(&json!(5_000_000_000i64)), Value::Long(5_000_000_000));
        assert_eq!(Value::from_json(&json!(1.5)), Value::Double(1.5));
    }

    #[test]
    fn json_objects_become_shared_maps() {
        let root = Value::from_json(&json!({"name": "Ada", "tags": ["a", "b"]}));
        let Value::Map(map) = &root else {
            panic!("expected map");
        };
        assert_eq!(map.borrow().get(&MapKey::from("name")), Some(&Value::string("Ada")));
        assert_eq!(root.to_json(), json!({"name": "Ada", "tags": ["a", "b"]}));
    }

    #[test]
    fn list_handles_share_storage() {
        let list = Value::list(vec![Value::Int(1)]);
        let alias = list.clone();
        if let Value::List(items) = &alias {
            items.borrow_mut().push(Value::Int(2));
        }
        assert_eq!(list.list_items().map(|items| items.len()), Some(2));
    }

    #[test]
    fn display_matches_java_to_string() {
        assert_eq!(Value::Double(1.0).to_string(), "1.0");
        assert_eq!(Value::Double(0.25).to_string(), "0.25");
        assert_eq!(Value::Double(1e10).to_string(), "1.0E10");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::list(vec![Value::Int(1), Value::string("a")]).to_string(), "[1, a]");
        assert_eq!(Value::map([("k", Value::Int(1))]).to_string(), "{k=1}");
    }

    #[test]
    fn self_containing_collections_render_a_marker() {
        let map = Value::empty_map();
        if let Value::Map(entries) = &map {
            entries.borrow_mut().insert("self".into(), map.clone());
        }
        assert_eq!(map.to_string(), "{self=(this Map)}");
        assert_eq!(map.to_json(), json!({"self": "(this Map)"}));

        let list = Value::list(vec![Value::Int(1)]);
        if let Value::List(items) = &list {
            items.borrow_mut().push(list.clone());
        }
        assert_eq!(list.to_string(), "[1, (this Collection)]");
        assert_eq!(list.to_json(), json!([1, "(this Collection)"]));
    }

    #[test]
    fn cyclic_equality_terminates() {
        let first = Value::empty_map();
        let second = Value::empty_map();
        for map in [&first, &second] {
            if let Value::Map(entries) = map {
                entries.borrow_mut().insert("self".into(), map.clone());
            }
        }
        assert_eq!(first, second);
        assert_eq!(first, first.clone());
        assert_ne!(first, Value::map([("self", Value::Null)]));
    }

    #[test]
    fn non_finite_reals_serialize_as_text() {
        assert_eq!(Value::Double(f64::INFINITY).to_json(), json!("Infinity"));
    }

    #[test]
    fn boolean_view_accepts_text() {
        assert_eq!(Value::string("TRUE").to_boolean(), Some(true));
        assert_eq!(Value::Int(1).to_boolean(), None);
    }

    #[test]
    fn map_keys_distinguish_number_kinds() {
        assert_ne!(MapKey::from_value(&Value::Int(1)), MapKey::from_value(&Value::Long(1)));
        assert_eq!(MapKey::from_value(&Value::Double(2.0)).to_value(), Value::Double(2.0));
    }
}
