//! Readable and writable locations
//!
//! Assignment, `++`/`--` and `set_value` resolve their target to a
//! [`ValueRef`] first, then read and write through it. Plain reads of
//! properties and indexes go through the same code.

use crate::execution::engine::ExecutionEngine;
use crate::execution::methods;
use crate::types::{EvaluationError, EvaluationResult, MapKey, Value};
use spel_compiler::logging::codes;

#[derive(Debug, Clone)]
pub enum ValueRef {
    /// `#name`
    Variable(String),
    /// `target.name`
    Property { target: Value, name: String },
    /// `target[index]`
    Indexed { target: Value, index: Value },
    /// Navigation cut short by `?.` on null
    NullSafe,
    /// Any other expression; readable only
    Computed { value: Value, text: String },
}

fn not_assignable(text: &str) -> EvaluationError {
    EvaluationError::new(codes::evaluation::NOT_ASSIGNABLE, vec![text.to_string()])
}

/// Index into a list or string
fn to_index(index: &Value) -> EvaluationResult<i64> {
    let converted = match index {
        Value::Int(_) | Value::Long(_) => index.as_i64(),
        Value::Float(_) | Value::Double(_) => index.as_f64().map(|d| d as i64),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    converted.ok_or_else(|| {
        EvaluationError::new(
            codes::evaluation::TYPE_CONVERSION_ERROR,
            vec![index.type_name(), "java.lang.Integer".to_string()],
        )
    })
}

fn out_of_bounds(size: usize, index: i64) -> EvaluationError {
    EvaluationError::new(
        codes::evaluation::COLLECTION_INDEX_OUT_OF_BOUNDS,
        vec![size.to_string(), index.to_string()],
    )
}

fn position_in(index: i64, size: usize) -> EvaluationResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < size)
        .ok_or_else(|| out_of_bounds(size, index))
}

fn indexing_unsupported(target: &Value) -> EvaluationError {
    EvaluationError::new(
        codes::evaluation::INDEXING_NOT_SUPPORTED_FOR_TYPE,
        vec![target.type_name()],
    )
}

impl ExecutionEngine<'_> {
    pub fn read(&mut self, reference: &ValueRef) -> EvaluationResult<Value> {
        match reference {
            ValueRef::Variable(name) => Ok(self.state().lookup_variable(name)),
            ValueRef::Property { target, name } => self.read_property(target, name, false),
            ValueRef::Indexed { target, index } => self.read_indexed(target, index),
            ValueRef::NullSafe => Ok(Value::Null),
            ValueRef::Computed { value, .. } => Ok(value.clone()),
        }
    }

    pub fn write(&mut self, reference: &ValueRef, value: Value) -> EvaluationResult<()> {
        match reference {
            ValueRef::Variable(name) => {
                self.state_mut().set_variable(name, value);
                Ok(())
            }
            ValueRef::Property { target, name } => write_property(target, name, value),
            ValueRef::Indexed { target, index } => self.write_indexed(target, index, value),
            ValueRef::NullSafe => Ok(()),
            ValueRef::Computed { text, .. } => Err(not_assignable(text)),
        }
    }

    pub fn is_writable_reference(&self, reference: &ValueRef) -> bool {
        match reference {
            ValueRef::Variable(_) => true,
            ValueRef::Property { target, .. } => matches!(target, Value::Map(_)),
            ValueRef::Indexed { target, .. } => matches!(target, Value::List(_) | Value::Map(_)),
            ValueRef::NullSafe | ValueRef::Computed { .. } => false,
        }
    }

    /// `target.name`: map key, static field, then a `getName()`/`isName()` getter
    pub fn read_property(&mut self, target: &Value, name: &str, null_safe: bool) -> EvaluationResult<Value> {
        match target {
            Value::Null if null_safe => return Ok(Value::Null),
            Value::Null => {
                return Err(EvaluationError::new(
                    codes::evaluation::PROPERTY_OR_FIELD_NOT_READABLE_ON_NULL,
                    vec![name.to_string()],
                ))
            }
            Value::Map(map) => {
                if let Some(value) = map.borrow().get(&MapKey::from(name)) {
                    return Ok(value.clone());
                }
            }
            Value::Type(descriptor) => {
                if let Some(value) = methods::static_field(descriptor, name) {
                    return Ok(value);
                }
            }
            _ => {}
        }

        match methods::read_getter(target, name) {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(EvaluationError::new(
                codes::evaluation::EXCEPTION_DURING_METHOD_INVOCATION,
                vec![name.to_string(), target.type_name(), message],
            )),
            None => Err(EvaluationError::new(
                codes::evaluation::PROPERTY_OR_FIELD_NOT_READABLE,
                vec![name.to_string(), target.type_name()],
            )),
        }
    }

    pub fn read_indexed(&mut self, target: &Value, index: &Value) -> EvaluationResult<Value> {
        match target {
            Value::List(list) => {
                let items = list.borrow();
                let position = position_in(to_index(index)?, items.len())?;
                Ok(items[position].clone())
            }
            Value::String(text) => {
                let length = text.chars().count();
                let position = position_in(to_index(index)?, length)?;
                Ok(text
                    .chars()
                    .nth(position)
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Null))
            }
            Value::Map(map) => Ok(map
                .borrow()
                .get(&MapKey::from_value(index))
                .cloned()
                .unwrap_or(Value::Null)),
            Value::Null => Err(EvaluationError::new(
                codes::evaluation::CANNOT_INDEX_INTO_NULL_VALUE,
                vec![],
            )),
            other => match index {
                Value::String(name) => self.read_property(other, name, false),
                _ => Err(indexing_unsupported(other)),
            },
        }
    }

    fn write_indexed(&mut self, target: &Value, index: &Value, value: Value) -> EvaluationResult<()> {
        match target {
            Value::List(list) => {
                let index = to_index(index)?;
                let mut items = list.borrow_mut();
                let size = items.len();
                let Ok(position) = usize::try_from(index) else {
                    return Err(out_of_bounds(size, index));
                };

                if position >= size {
                    let configuration = self.state().configuration();
                    if !configuration.auto_grow_collections {
                        return Err(out_of_bounds(size, index));
                    }
                    if position >= configuration.maximum_auto_grow_size {
                        return Err(EvaluationError::new(
                            codes::evaluation::UNABLE_TO_GROW_COLLECTION,
                            vec![configuration.maximum_auto_grow_size.to_string()],
                        ));
                    }
                    items.resize(position + 1, Value::Null);
                }
                items[position] = value;
                Ok(())
            }
            Value::Map(map) => {
                let key = MapKey::from_value(index);
                map.borrow_mut().insert(key, value);
                Ok(())
            }
            Value::Null => Err(EvaluationError::new(
                codes::evaluation::CANNOT_INDEX_INTO_NULL_VALUE,
                vec![],
            )),
            Value::String(_) => Err(indexing_unsupported(target)),
            other => match index {
                Value::String(name) => write_property(other, name, value),
                _ => Err(indexing_unsupported(other)),
            },
        }
    }
}

fn write_property(target: &Value, name: &str, value: Value) -> EvaluationResult<()> {
    match target {
        Value::Map(map) => {
            map.borrow_mut().insert(MapKey::from(name), value);
            Ok(())
        }
        Value::Null => Err(EvaluationError::new(
            codes::evaluation::PROPERTY_OR_FIELD_NOT_WRITABLE_ON_NULL,
            vec![name.to_string()],
        )),
        other => Err(EvaluationError::new(
            codes::evaluation::PROPERTY_OR_FIELD_NOT_WRITABLE,
            vec![name.to_string(), other.type_name()],
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::context::StandardEvaluationContext;
    use spel_compiler::SpelParserConfiguration;

    fn with_engine<T>(configuration: SpelParserConfiguration, f: impl FnOnce(&mut ExecutionEngine) -> T) -> T {
        let mut context = StandardEvaluationContext::new();
        let mut engine = ExecutionEngine::new(&mut context, configuration);
        f(&mut engine)
    }

    #[test]
    fn list_writes_past_the_end_need_auto_grow() {
        let list = Value::list(vec![Value::Int(1)]);
        let reference = ValueRef::Indexed {
            target: list.clone(),
            index: Value::Int(3),
        };

        let error = with_engine(SpelParserConfiguration::default(), |engine| {
            engine.write(&reference, Value::Int(9)).unwrap_err()
        });
        assert_eq!(error.code, codes::evaluation::COLLECTION_INDEX_OUT_OF_BOUNDS);
        assert_eq!(error.inserts, vec!["1", "3"]);

        with_engine(SpelParserConfiguration::new(false, true), |engine| {
            engine.write(&reference, Value::Int(9)).unwrap();
        });
        assert_eq!(list.to_string(), "[1, null, null, 9]");
    }

    #[test]
    fn auto_grow_is_bounded() {
        let reference = ValueRef::Indexed {
            target: Value::list(vec![]),
            index: Value::Int(10),
        };
        let configuration = SpelParserConfiguration::new(false, true).with_maximum_auto_grow_size(5);

        let error = with_engine(configuration, |engine| engine.write(&reference, Value::Null).unwrap_err());
        assert_eq!(error.code, codes::evaluation::UNABLE_TO_GROW_COLLECTION);
        assert_eq!(error.inserts, vec!["5"]);
    }

    #[test]
    fn map_properties_read_keys_then_getters() {
        let map = Value::map([("name", Value::string("Ada"))]);
        with_engine(SpelParserConfiguration::default(), |engine| {
            assert_eq!(engine.read_property(&map, "name", false).unwrap(), Value::string("Ada"));
            assert_eq!(engine.read_property(&map, "empty", false).unwrap(), Value::Boolean(false));

            let error = engine.read_property(&map, "age", false).unwrap_err();
            assert_eq!(error.code, codes::evaluation::PROPERTY_OR_FIELD_NOT_READABLE);
            assert_eq!(error.inserts, vec!["age", "java.util.Map"]);
        });
    }

    #[test]
    fn null_targets() {
        with_engine(SpelParserConfiguration::default(), |engine| {
            assert_eq!(engine.read_property(&Value::Null, "x", true).unwrap(), Value::Null);

            let error = engine.read_property(&Value::Null, "x", false).unwrap_err();
            assert_eq!(error.code, codes::evaluation::PROPERTY_OR_FIELD_NOT_READABLE_ON_NULL);

            let reference = ValueRef::Property {
                target: Value::Null,
                name: "x".to_string(),
            };
            let error = engine.write(&reference, Value::Int(1)).unwrap_err();
            assert_eq!(error.code, codes::evaluation::PROPERTY_OR_FIELD_NOT_WRITABLE_ON_NULL);
        });
    }

    #[test]
    fn string_indexing_reads_chars_only() {
        with_engine(SpelParserConfiguration::default(), |engine| {
            let text = Value::string("abc");
            assert_eq!(engine.read_indexed(&text, &Value::Int(1)).unwrap(), Value::string("b"));

            let error = engine.read_indexed(&text, &Value::Int(3)).unwrap_err();
            assert_eq!(error.code, codes::evaluation::COLLECTION_INDEX_OUT_OF_BOUNDS);

            let reference = ValueRef::Indexed {
                target: text,
                index: Value::Int(0),
            };
            let error = engine.write(&reference, Value::string("z")).unwrap_err();
            assert_eq!(error.code, codes::evaluation::INDEXING_NOT_SUPPORTED_FOR_TYPE);
        });
    }

    #[test]
    fn computed_references_are_read_only() {
        with_engine(SpelParserConfiguration::default(), |engine| {
            let reference = ValueRef::Computed {
                value: Value::Int(1),
                text: "1".to_string(),
            };
            assert!(!engine.is_writable_reference(&reference));
            let error = engine.write(&reference, Value::Int(2)).unwrap_err();
            assert_eq!(error.code, codes::evaluation::NOT_ASSIGNABLE);
            assert_eq!(error.inserts, vec!["1"]);
        });
    }
}
