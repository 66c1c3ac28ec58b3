//! Built-in members of the values and types the runtime models
//!
//! Every lookup answers `None` when no member with that name accepts the
//! given arguments, and `Some(Err(..))` when the member exists but failed.

use crate::execution::operators::NumericPair;
use crate::types::{format_java_double, MapKey, TypeDescriptor, TypeKind, Value};
use regex::Regex;
use spel_compiler::config::compile_time::evaluation;
use std::cmp::Ordering;

pub type MemberResult = Option<Result<Value, String>>;

/// `name(type,type)` as reported in method errors
pub fn format_signature(name: &str, args: &[Value]) -> String {
    let types: Vec<String> = args.iter().map(Value::type_name).collect();
    format!("{}({})", name, types.join(","))
}

/// Instance method on a non-null value
pub fn invoke(target: &Value, name: &str, args: &[Value]) -> MemberResult {
    let specific = match target {
        Value::String(text) => string_method(text, name, args),
        Value::List(_) => list_method(target, name, args),
        Value::Map(_) => map_method(target, name, args),
        Value::Boolean(b) => match (name, args) {
            ("booleanValue", []) => Some(Ok(Value::Boolean(*b))),
            _ => None,
        },
        Value::Type(descriptor) => {
            type_method(descriptor, name, args).or_else(|| static_method(descriptor, name, args))
        }
        number if number.is_number() => number_method(number, name, args),
        _ => None,
    };

    specific.or_else(|| object_method(target, name, args))
}

/// `x.name` on a non-map value through its `getName()`/`isName()` method
pub fn read_getter(target: &Value, name: &str) -> MemberResult {
    let mut chars = name.chars();
    let first = chars.next()?;
    let capitalized: String = first.to_uppercase().chain(chars).collect();

    invoke(target, &format!("get{}", capitalized), &[])
        .or_else(|| invoke(target, &format!("is{}", capitalized), &[]))
}

fn object_method(target: &Value, name: &str, args: &[Value]) -> MemberResult {
    match (name, args) {
        ("toString", []) => Some(Ok(Value::String(target.to_string()))),
        ("equals", [other]) => Some(Ok(Value::Boolean(target == other))),
        ("getClass", []) => TypeDescriptor::of_value(target).map(|t| Ok(Value::Type(t))),
        _ => None,
    }
}

// ============================================================================
// ARGUMENT HELPERS
// ============================================================================

fn int_arg(value: &Value) -> Option<i64> {
    value.as_i64()
}

fn text_arg(value: &Value) -> Option<&str> {
    value.as_str()
}

fn out_of_bounds(index: i64, length: usize) -> String {
    format!("Index {} out of bounds for length {}", index, length)
}

fn checked_index(index: i64, length: usize) -> Result<usize, String> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < length)
        .ok_or_else(|| out_of_bounds(index, length))
}

fn char_offset(text: &str, byte_offset: Option<usize>) -> Value {
    match byte_offset {
        Some(offset) => Value::Int(text[..offset].chars().count() as i32),
        None => Value::Int(-1),
    }
}

// ============================================================================
// STRING
// ============================================================================

fn string_method(text: &str, name: &str, args: &[Value]) -> MemberResult {
    let length = text.chars().count();

    let result = match (name, args) {
        ("length", []) => Ok(Value::Int(length as i32)),
        ("isEmpty", []) => Ok(Value::Boolean(text.is_empty())),
        ("isBlank", []) => Ok(Value::Boolean(text.trim().is_empty())),
        ("toUpperCase", []) => Ok(Value::String(text.to_uppercase())),
        ("toLowerCase", []) => Ok(Value::String(text.to_lowercase())),
        ("trim", []) => Ok(Value::string(text.trim_matches(|c: char| c <= ' '))),
        ("strip", []) => Ok(Value::string(text.trim())),
        ("charAt", [index]) => {
            let index = int_arg(index)?;
            checked_index(index, length)
                .map(|i| text.chars().nth(i).map(String::from).unwrap_or_default())
                .map(Value::String)
        }
        ("substring", [begin]) => substring(text, int_arg(begin)?, length as i64, length),
        ("substring", [begin, end]) => substring(text, int_arg(begin)?, int_arg(end)?, length),
        ("indexOf", [needle]) => Ok(char_offset(text, text.find(text_arg(needle)?))),
        ("lastIndexOf", [needle]) => Ok(char_offset(text, text.rfind(text_arg(needle)?))),
        ("contains", [needle]) => Ok(Value::Boolean(text.contains(text_arg(needle)?))),
        ("startsWith", [prefix]) => Ok(Value::Boolean(text.starts_with(text_arg(prefix)?))),
        ("endsWith", [suffix]) => Ok(Value::Boolean(text.ends_with(text_arg(suffix)?))),
        ("concat", [other]) => Ok(Value::String(format!("{}{}", text, text_arg(other)?))),
        ("replace", [from, to]) => Ok(Value::String(text.replace(text_arg(from)?, text_arg(to)?))),
        ("equalsIgnoreCase", [other]) => Ok(Value::Boolean(
            other.as_str().is_some_and(|o| o.to_lowercase() == text.to_lowercase()),
        )),
        ("compareTo", [other]) => Ok(Value::Int(compare_text(text, text_arg(other)?))),
        ("matches", [pattern]) => Regex::new(&format!("^(?:{})$", text_arg(pattern)?))
            .map(|re| Value::Boolean(re.is_match(text)))
            .map_err(|e| e.to_string()),
        ("split", [pattern]) => split(text, text_arg(pattern)?),
        ("repeat", [count]) => repeat(text, int_arg(count)?),
        _ => return None,
    };
    Some(result)
}

fn substring(text: &str, begin: i64, end: i64, length: usize) -> Result<Value, String> {
    if begin < 0 || end > length as i64 || begin > end {
        return Err(format!(
            "begin {}, end {}, length {}",
            begin, end, length
        ));
    }
    Ok(Value::String(
        text.chars()
            .skip(begin as usize)
            .take((end - begin) as usize)
            .collect(),
    ))
}

/// `String.compareTo`: first differing char, else the length difference
fn compare_text(left: &str, right: &str) -> i32 {
    for (a, b) in left.chars().zip(right.chars()) {
        if a != b {
            return a as i32 - b as i32;
        }
    }
    left.chars().count() as i32 - right.chars().count() as i32
}

/// `String.split`: trailing empty parts are dropped
fn split(text: &str, pattern: &str) -> Result<Value, String> {
    let re = Regex::new(pattern).map_err(|e| e.to_string())?;
    let mut parts: Vec<&str> = re.split(text).collect();
    while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    Ok(Value::list(parts.into_iter().map(Value::string).collect()))
}

fn repeat(text: &str, count: i64) -> Result<Value, String> {
    let count = usize::try_from(count).map_err(|_| format!("count is negative: {}", count))?;
    if text.chars().count().saturating_mul(count) > evaluation::MAX_REPEATED_TEXT_SIZE {
        return Err(format!(
            "repeated text exceeds {} characters",
            evaluation::MAX_REPEATED_TEXT_SIZE
        ));
    }
    Ok(Value::String(text.repeat(count)))
}

// ============================================================================
// LIST
// ============================================================================

fn list_method(target: &Value, name: &str, args: &[Value]) -> MemberResult {
    let Value::List(list) = target else {
        return None;
    };

    let result = match (name, args) {
        ("size", []) => Ok(Value::Int(list.borrow().len() as i32)),
        ("isEmpty", []) => Ok(Value::Boolean(list.borrow().is_empty())),
        ("get", [index]) => {
            let items = list.borrow();
            checked_index(int_arg(index)?, items.len()).map(|i| items[i].clone())
        }
        ("contains", [value]) => Ok(Value::Boolean(list.borrow().contains(value))),
        ("indexOf", [value]) => Ok(Value::Int(
            list.borrow()
                .iter()
                .position(|item| item == value)
                .map_or(-1, |i| i as i32),
        )),
        ("add", [value]) => {
            list.borrow_mut().push(value.clone());
            Ok(Value::Boolean(true))
        }
        ("add", [index, value]) => {
            let index = int_arg(index)?;
            let mut items = list.borrow_mut();
            let length = items.len();
            match usize::try_from(index).ok().filter(|i| *i <= length) {
                Some(i) => {
                    items.insert(i, value.clone());
                    Ok(Value::Null)
                }
                None => Err(out_of_bounds(index, length)),
            }
        }
        ("addAll", [Value::List(other)]) => {
            let extra = other.borrow().clone();
            list.borrow_mut().extend(extra);
            Ok(Value::Boolean(true))
        }
        ("set", [index, value]) => {
            let mut items = list.borrow_mut();
            let length = items.len();
            checked_index(int_arg(index)?, length)
                .map(|i| std::mem::replace(&mut items[i], value.clone()))
        }
        ("remove", [Value::Int(index)]) => {
            let mut items = list.borrow_mut();
            let length = items.len();
            checked_index(i64::from(*index), length).map(|i| items.remove(i))
        }
        ("remove", [value]) => {
            let position = list.borrow().iter().position(|item| item == value);
            if let Some(i) = position {
                list.borrow_mut().remove(i);
            }
            Ok(Value::Boolean(position.is_some()))
        }
        ("clear", []) => {
            list.borrow_mut().clear();
            Ok(Value::Null)
        }
        ("subList", [from, to]) => {
            let (from, to) = (int_arg(from)?, int_arg(to)?);
            let items = list.borrow();
            if from < 0 || to > items.len() as i64 || from > to {
                Err(format!("fromIndex {}, toIndex {}, size {}", from, to, items.len()))
            } else {
                Ok(Value::list(items[from as usize..to as usize].to_vec()))
            }
        }
        _ => return None,
    };
    Some(result)
}

// ============================================================================
// MAP
// ============================================================================

/// Map entry as seen by selection and projection: `{key=.., value=..}`
pub fn entry_value(key: &MapKey, value: &Value) -> Value {
    Value::map([("key", key.to_value()), ("value", value.clone())])
}

fn map_method(target: &Value, name: &str, args: &[Value]) -> MemberResult {
    let Value::Map(map) = target else {
        return None;
    };

    let result = match (name, args) {
        ("size", []) => Ok(Value::Int(map.borrow().len() as i32)),
        ("isEmpty", []) => Ok(Value::Boolean(map.borrow().is_empty())),
        ("get", [key]) => Ok(map
            .borrow()
            .get(&MapKey::from_value(key))
            .cloned()
            .unwrap_or(Value::Null)),
        ("getOrDefault", [key, fallback]) => Ok(map
            .borrow()
            .get(&MapKey::from_value(key))
            .cloned()
            .unwrap_or_else(|| fallback.clone())),
        ("containsKey", [key]) => Ok(Value::Boolean(
            map.borrow().contains_key(&MapKey::from_value(key)),
        )),
        ("containsValue", [value]) => Ok(Value::Boolean(
            map.borrow().values().any(|v| v == value),
        )),
        ("put", [key, value]) => {
            // the key may render the map itself
            let key = MapKey::from_value(key);
            Ok(map.borrow_mut().insert(key, value.clone()).unwrap_or(Value::Null))
        }
        ("remove", [key]) => {
            let key = MapKey::from_value(key);
            Ok(map.borrow_mut().shift_remove(&key).unwrap_or(Value::Null))
        }
        ("keySet", []) => Ok(Value::list(map.borrow().keys().map(MapKey::to_value).collect())),
        ("values", []) => Ok(Value::list(map.borrow().values().cloned().collect())),
        ("entrySet", []) => Ok(Value::list(
            map.borrow().iter().map(|(k, v)| entry_value(k, v)).collect(),
        )),
        ("clear", []) => {
            map.borrow_mut().clear();
            Ok(Value::Null)
        }
        _ => return None,
    };
    Some(result)
}

// ============================================================================
// NUMBER
// ============================================================================

fn number_method(number: &Value, name: &str, args: &[Value]) -> MemberResult {
    let as_double = number.as_f64()?;

    let result = match (name, args) {
        ("intValue", []) => Value::Int(match number {
            Value::Long(l) => *l as i32,
            _ => as_double as i32,
        }),
        ("longValue", []) => Value::Long(number.as_i64().unwrap_or(as_double as i64)),
        ("floatValue", []) => Value::Float(as_double as f32),
        ("doubleValue", []) => Value::Double(as_double),
        ("isNaN", []) => Value::Boolean(as_double.is_nan()),
        ("isInfinite", []) => Value::Boolean(as_double.is_infinite()),
        ("compareTo", [other]) => {
            let ordering = match NumericPair::promote(number, other)? {
                NumericPair::Int(a, b) => a.cmp(&b),
                NumericPair::Long(a, b) => a.cmp(&b),
                NumericPair::Float(a, b) => a.total_cmp(&b),
                NumericPair::Double(a, b) => a.total_cmp(&b),
            };
            Value::Int(ordering as i32)
        }
        _ => return None,
    };
    Some(Ok(result))
}

// ============================================================================
// TYPES: STATIC MEMBERS AND CONSTRUCTORS
// ============================================================================

fn type_method(descriptor: &TypeDescriptor, name: &str, args: &[Value]) -> MemberResult {
    let qualified = descriptor.name();
    match (name, args) {
        ("getName", []) => Some(Ok(Value::String(qualified))),
        ("getSimpleName", []) => Some(Ok(Value::string(
            qualified.rsplit('.').next().unwrap_or_default(),
        ))),
        ("isArray", []) => Some(Ok(Value::Boolean(descriptor.is_array()))),
        ("isPrimitive", []) => Some(Ok(Value::Boolean(descriptor.primitive && !descriptor.is_array()))),
        _ => None,
    }
}

/// `T(Integer).MAX_VALUE` and friends
pub fn static_field(descriptor: &TypeDescriptor, name: &str) -> Option<Value> {
    if descriptor.is_array() {
        return None;
    }

    let value = match (descriptor.kind, name) {
        (TypeKind::Integer, "MAX_VALUE") => Value::Int(i32::MAX),
        (TypeKind::Integer, "MIN_VALUE") => Value::Int(i32::MIN),
        (TypeKind::Long, "MAX_VALUE") => Value::Long(i64::MAX),
        (TypeKind::Long, "MIN_VALUE") => Value::Long(i64::MIN),
        (TypeKind::Float, "MAX_VALUE") => Value::Float(f32::MAX),
        (TypeKind::Float, "MIN_VALUE") => Value::Float(f32::from_bits(1)),
        (TypeKind::Double, "MAX_VALUE") => Value::Double(f64::MAX),
        (TypeKind::Double, "MIN_VALUE") => Value::Double(f64::from_bits(1)),
        (TypeKind::Double, "POSITIVE_INFINITY") => Value::Double(f64::INFINITY),
        (TypeKind::Double, "NEGATIVE_INFINITY") => Value::Double(f64::NEG_INFINITY),
        (TypeKind::Double, "NaN") => Value::Double(f64::NAN),
        (TypeKind::Boolean, "TRUE") => Value::Boolean(true),
        (TypeKind::Boolean, "FALSE") => Value::Boolean(false),
        (TypeKind::Math, "PI") => Value::Double(std::f64::consts::PI),
        (TypeKind::Math, "E") => Value::Double(std::f64::consts::E),
        _ => return None,
    };
    Some(value)
}

fn number_format_error(text: &str) -> String {
    format!("For input string: \"{}\"", text)
}

fn parse_int(text: &str) -> Result<Value, String> {
    text.parse::<i32>()
        .map(Value::Int)
        .map_err(|_| number_format_error(text))
}

fn parse_long(text: &str) -> Result<Value, String> {
    text.parse::<i64>()
        .map(Value::Long)
        .map_err(|_| number_format_error(text))
}

fn parse_double(text: &str) -> Result<Value, String> {
    let trimmed = text.trim();
    let normalized = trimmed.trim_end_matches(['d', 'D', 'f', 'F']);
    match normalized {
        "Infinity" | "+Infinity" => Ok(Value::Double(f64::INFINITY)),
        "-Infinity" => Ok(Value::Double(f64::NEG_INFINITY)),
        "NaN" => Ok(Value::Double(f64::NAN)),
        _ => normalized
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .map(Value::Double)
            .ok_or_else(|| number_format_error(text)),
    }
}

fn static_method(descriptor: &TypeDescriptor, name: &str, args: &[Value]) -> MemberResult {
    if descriptor.is_array() {
        return None;
    }

    let result = match (descriptor.kind, name, args) {
        (TypeKind::Math, "max", [a, b]) => math_extreme(a, b, Ordering::Greater)?,
        (TypeKind::Math, "min", [a, b]) => math_extreme(a, b, Ordering::Less)?,
        (TypeKind::Math, "abs", [x]) => match x {
            Value::Int(i) => Value::Int(i.wrapping_abs()),
            Value::Long(l) => Value::Long(l.wrapping_abs()),
            Value::Float(f) => Value::Float(f.abs()),
            Value::Double(d) => Value::Double(d.abs()),
            _ => return None,
        },
        (TypeKind::Math, "pow", [a, b]) => Value::Double(a.as_f64()?.powf(b.as_f64()?)),
        (TypeKind::Math, "sqrt", [x]) => Value::Double(x.as_f64()?.sqrt()),
        (TypeKind::Math, "floor", [x]) => Value::Double(x.as_f64()?.floor()),
        (TypeKind::Math, "ceil", [x]) => Value::Double(x.as_f64()?.ceil()),
        (TypeKind::Math, "round", [x]) => match x {
            Value::Int(_) | Value::Float(_) => {
                Value::Int((x.as_f64()? + 0.5).floor() as i32)
            }
            _ => Value::Long((x.as_f64()? + 0.5).floor() as i64),
        },

        (TypeKind::Integer, "parseInt" | "valueOf", [Value::String(s)]) => return Some(parse_int(s)),
        (TypeKind::Integer, "valueOf", [Value::Int(i)]) => Value::Int(*i),
        (TypeKind::Integer, "toString", [Value::Int(i)]) => Value::String(i.to_string()),
        (TypeKind::Long, "parseLong" | "valueOf", [Value::String(s)]) => return Some(parse_long(s)),
        (TypeKind::Long, "valueOf", [v]) => Value::Long(v.as_i64()?),
        (TypeKind::Double, "parseDouble" | "valueOf", [Value::String(s)]) => {
            return Some(parse_double(s))
        }
        (TypeKind::Double, "valueOf", [v]) => Value::Double(v.as_f64()?),
        (TypeKind::Double, "toString", [v]) => Value::String(format_java_double(v.as_f64()?)),
        (TypeKind::Float, "parseFloat" | "valueOf", [Value::String(s)]) => {
            return Some(parse_double(s).map(|d| Value::Float(d.as_f64().unwrap_or_default() as f32)))
        }
        (TypeKind::Boolean, "parseBoolean", [Value::String(s)]) => {
            Value::Boolean(s.eq_ignore_ascii_case("true"))
        }
        (TypeKind::Boolean, "valueOf", [v]) => match v {
            Value::Boolean(b) => Value::Boolean(*b),
            Value::String(s) => Value::Boolean(s.eq_ignore_ascii_case("true")),
            _ => return None,
        },
        (TypeKind::String, "valueOf", [v]) => Value::String(v.to_string()),
        (TypeKind::String, "join", [Value::String(separator), Value::List(items)]) => {
            let parts: Vec<String> = items.borrow().iter().map(Value::to_string).collect();
            Value::String(parts.join(separator.as_str()))
        }
        (TypeKind::String, "join", [Value::String(separator), rest @ ..]) => {
            let parts: Vec<String> = rest.iter().map(Value::to_string).collect();
            Value::String(parts.join(separator.as_str()))
        }
        (TypeKind::Character, "isDigit", [Value::String(c)]) => {
            Value::Boolean(single_char(c)?.is_ascii_digit())
        }
        (TypeKind::Character, "isLetter", [Value::String(c)]) => {
            Value::Boolean(single_char(c)?.is_alphabetic())
        }
        _ => return None,
    };
    Some(Ok(result))
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn math_extreme(a: &Value, b: &Value, keep: Ordering) -> Option<Value> {
    let value = match NumericPair::promote(a, b)? {
        NumericPair::Int(x, y) => Value::Int(if x.cmp(&y) == keep { x } else { y }),
        NumericPair::Long(x, y) => Value::Long(if x.cmp(&y) == keep { x } else { y }),
        NumericPair::Float(x, y) => {
            Value::Float(if keep == Ordering::Greater { x.max(y) } else { x.min(y) })
        }
        NumericPair::Double(x, y) => {
            Value::Double(if keep == Ordering::Greater { x.max(y) } else { x.min(y) })
        }
    };
    Some(value)
}

/// `new T(args)` for the non-array types
pub fn construct(descriptor: &TypeDescriptor, args: &[Value]) -> MemberResult {
    if descriptor.is_array() || descriptor.primitive {
        return None;
    }

    let result = match (descriptor.kind, args) {
        (TypeKind::String, []) => Value::string(""),
        (TypeKind::String, [Value::String(s)]) => Value::String(s.clone()),
        (TypeKind::Integer, [Value::Int(i)]) => Value::Int(*i),
        (TypeKind::Integer, [Value::String(s)]) => return Some(parse_int(s)),
        (TypeKind::Long, [Value::String(s)]) => return Some(parse_long(s)),
        (TypeKind::Long, [v]) => Value::Long(v.as_i64()?),
        (TypeKind::Double, [Value::String(s)]) => return Some(parse_double(s)),
        (TypeKind::Double, [v]) => Value::Double(v.as_f64()?),
        (TypeKind::Float, [v]) => Value::Float(v.as_f64()? as f32),
        (TypeKind::Boolean, [Value::Boolean(b)]) => Value::Boolean(*b),
        (TypeKind::Boolean, [Value::String(s)]) => Value::Boolean(s.eq_ignore_ascii_case("true")),
        (TypeKind::List, []) | (TypeKind::List, [Value::Int(_)]) => Value::list(Vec::new()),
        (TypeKind::List, [Value::List(items)]) => Value::list(items.borrow().clone()),
        (TypeKind::Map, []) | (TypeKind::Map, [Value::Int(_)]) => Value::empty_map(),
        (TypeKind::Map, [Value::Map(entries)]) => {
            Value::Map(std::rc::Rc::new(std::cell::RefCell::new(entries.borrow().clone())))
        }
        _ => return None,
    };
    Some(Ok(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(target: &Value, name: &str, args: &[Value]) -> Value {
        invoke(target, name, args)
            .unwrap_or_else(|| panic!("no method {}", name))
            .unwrap()
    }

    #[test]
    fn string_methods_work_on_chars() {
        let text = Value::string("héllo");
        assert_eq!(call(&text, "length", &[]), Value::Int(5));
        assert_eq!(call(&text, "charAt", &[Value::Int(1)]), Value::string("é"));
        assert_eq!(call(&text, "substring", &[Value::Int(1), Value::Int(3)]), Value::string("él"));
        assert_eq!(call(&text, "indexOf", &[Value::string("l")]), Value::Int(2));
        assert_eq!(call(&text, "toUpperCase", &[]), Value::string("HÉLLO"));
        assert!(invoke(&text, "charAt", &[Value::Int(9)]).unwrap().is_err());
    }

    #[test]
    fn split_drops_trailing_empty_parts() {
        let parts = call(&Value::string("a,b,,"), "split", &[Value::string(",")]);
        assert_eq!(parts.to_string(), "[a, b]");
    }

    #[test]
    fn compare_to_follows_char_difference() {
        assert_eq!(call(&Value::string("a"), "compareTo", &[Value::string("c")]), Value::Int(-2));
        assert_eq!(call(&Value::string("ab"), "compareTo", &[Value::string("a")]), Value::Int(1));
    }

    #[test]
    fn list_methods_mutate_shared_storage() {
        let list = Value::list(vec![Value::Int(1)]);
        assert_eq!(call(&list, "add", &[Value::Int(2)]), Value::Boolean(true));
        assert_eq!(call(&list, "size", &[]), Value::Int(2));
        assert_eq!(call(&list, "remove", &[Value::Int(0)]), Value::Int(1));
        assert_eq!(call(&list, "contains", &[Value::Int(2)]), Value::Boolean(true));
        assert_eq!(list.to_string(), "[2]");
    }

    #[test]
    fn map_methods() {
        let map = Value::map([("a", Value::Int(1))]);
        assert_eq!(call(&map, "get", &[Value::string("a")]), Value::Int(1));
        assert_eq!(call(&map, "get", &[Value::string("z")]), Value::Null);
        assert_eq!(call(&map, "put", &[Value::string("b"), Value::Int(2)]), Value::Null);
        assert_eq!(call(&map, "keySet", &[]).to_string(), "[a, b]");
        assert_eq!(call(&map, "entrySet", &[]).to_string(), "[{key=a, value=1}, {key=b, value=2}]");
    }

    #[test]
    fn getters_back_property_reads() {
        assert_eq!(
            read_getter(&Value::string(""), "empty").map(|r| r.unwrap()),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            read_getter(&Value::Int(1), "class").map(|r| r.unwrap()),
            Some(Value::Type(TypeDescriptor::new(TypeKind::Integer)))
        );
        assert!(read_getter(&Value::Int(1), "missing").is_none());
    }

    #[test]
    fn static_members() {
        let integer = TypeDescriptor::new(TypeKind::Integer);
        let math = TypeDescriptor::new(TypeKind::Math);
        assert_eq!(static_field(&integer, "MAX_VALUE"), Some(Value::Int(i32::MAX)));
        assert_eq!(
            call(&Value::Type(math.clone()), "max", &[Value::Int(3), Value::Long(7)]),
            Value::Long(7)
        );
        assert_eq!(call(&Value::Type(math), "round", &[Value::Double(2.5)]), Value::Long(3));
        assert_eq!(
            call(&Value::Type(integer.clone()), "parseInt", &[Value::string("42")]),
            Value::Int(42)
        );
        assert!(invoke(&Value::Type(integer), "parseInt", &[Value::string("x")])
            .unwrap()
            .is_err());
    }

    #[test]
    fn type_values_expose_their_name() {
        let string = Value::Type(TypeDescriptor::new(TypeKind::String));
        assert_eq!(call(&string, "getName", &[]), Value::string("java.lang.String"));
        assert_eq!(call(&string, "getSimpleName", &[]), Value::string("String"));
    }

    #[test]
    fn constructors_of_known_types() {
        let list = TypeDescriptor::new(TypeKind::List);
        assert_eq!(construct(&list, &[]).unwrap().unwrap(), Value::list(vec![]));
        assert_eq!(
            construct(&TypeDescriptor::new(TypeKind::String), &[Value::string("x")])
                .unwrap()
                .unwrap(),
            Value::string("x")
        );
        assert!(construct(&TypeDescriptor::new(TypeKind::Math), &[]).is_none());
        assert!(construct(&TypeDescriptor::primitive(TypeKind::Integer), &[]).is_none());
    }

    #[test]
    fn signature_lists_argument_types() {
        assert_eq!(
            format_signature("foo", &[Value::Int(1), Value::Null]),
            "foo(java.lang.Integer,null)"
        );
    }
}
