//! Selection, projection, inline literals and array construction

use crate::execution::engine::ExecutionEngine;
use crate::execution::methods;
use crate::types::{EvaluationError, EvaluationResult, MapKey, TypeDescriptor, TypeKind, Value};
use indexmap::IndexMap;
use spel_compiler::config::compile_time::evaluation;
use spel_compiler::logging::codes;
use spel_compiler::{NodeKind, SelectionVariant, SpelNode};

fn too_many_elements() -> EvaluationError {
    EvaluationError::new(
        codes::evaluation::MAX_ARRAY_ELEMENTS_THRESHOLD_EXCEEDED,
        vec![evaluation::MAX_ARRAY_ELEMENTS.to_string()],
    )
}

fn not_convertible(value: &Value, target: &TypeDescriptor) -> EvaluationError {
    EvaluationError::new(
        codes::evaluation::TYPE_CONVERSION_ERROR,
        vec![value.type_name(), target.name()],
    )
}

/// Convert an initializer element to the array's component type
pub fn convert_element(value: Value, component: &TypeDescriptor) -> EvaluationResult<Value> {
    if value.is_null() {
        if component.primitive && !component.is_array() {
            return Err(not_convertible(&value, component));
        }
        return Ok(Value::Null);
    }
    if component.is_array() {
        return match value {
            Value::List(_) => Ok(value),
            other => Err(not_convertible(&other, component)),
        };
    }

    let converted = match component.kind {
        TypeKind::Integer => match &value {
            Value::String(s) => s.trim().parse::<i32>().ok().map(Value::Int),
            Value::Float(_) | Value::Double(_) => value.as_f64().map(|d| Value::Int(d as i32)),
            _ => value.as_i64().and_then(|l| i32::try_from(l).ok()).map(Value::Int),
        },
        TypeKind::Long => match &value {
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::Long),
            Value::Float(_) | Value::Double(_) => value.as_f64().map(|d| Value::Long(d as i64)),
            _ => value.as_i64().map(Value::Long),
        },
        TypeKind::Float => match &value {
            Value::String(s) => s.trim().parse::<f32>().ok().map(Value::Float),
            _ => value.as_f64().map(|d| Value::Float(d as f32)),
        },
        TypeKind::Double => match &value {
            Value::String(s) => s.trim().parse::<f64>().ok().map(Value::Double),
            _ => value.as_f64().map(Value::Double),
        },
        TypeKind::Boolean => value.to_boolean().map(Value::Boolean),
        TypeKind::Character => match &value {
            Value::String(s) if s.chars().count() == 1 => Some(value.clone()),
            _ => None,
        },
        TypeKind::String => Some(Value::String(value.to_string())),
        _ if component.is_instance(&value) => Some(value.clone()),
        _ => None,
    };

    converted.ok_or_else(|| not_convertible(&value, component))
}

/// Non-negative `int` array dimension
fn array_size(value: &Value) -> EvaluationResult<usize> {
    let size = match value {
        Value::Int(i) => usize::try_from(*i).ok(),
        Value::Long(l) => i32::try_from(*l).ok().and_then(|i| usize::try_from(i).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok().and_then(|i| usize::try_from(i).ok()),
        _ => None,
    };
    size.ok_or_else(|| {
        EvaluationError::new(
            codes::evaluation::TYPE_CONVERSION_ERROR,
            vec![value.to_string(), "array size".to_string()],
        )
    })
}

fn filled(sizes: &[usize], fill: &Value) -> Value {
    match sizes.split_first() {
        None => fill.clone(),
        Some((size, rest)) => Value::list((0..*size).map(|_| filled(rest, fill)).collect()),
    }
}

enum Elements {
    List(Vec<Value>),
    Map(Vec<(MapKey, Value)>),
}

impl ExecutionEngine<'_> {
    /// Run `f` with `element` as both `#this` and the argument scope root
    fn with_element<T>(
        &mut self,
        element: Value,
        f: impl FnOnce(&mut Self) -> EvaluationResult<T>,
    ) -> EvaluationResult<T> {
        self.state_mut().push_active(element);
        self.state_mut().enter_scope();
        let result = f(self);
        self.state_mut().exit_scope();
        self.state_mut().pop_active();
        result
    }

    fn elements(target: &Value) -> Option<Elements> {
        match target {
            Value::List(items) => Some(Elements::List(items.borrow().clone())),
            Value::Map(entries) => Some(Elements::Map(
                entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )),
            _ => None,
        }
    }

    fn selected(&mut self, element: Value, criteria: &SpelNode) -> EvaluationResult<bool> {
        match self.with_element(element, |engine| engine.evaluate(criteria))? {
            Value::Boolean(b) => Ok(b),
            _ => Err(EvaluationError::new(
                codes::evaluation::RESULT_OF_SELECTION_CRITERIA_IS_NOT_BOOLEAN,
                vec![],
            )
            .with_position(criteria.start_position())),
        }
    }

    /// `?[..]`, `^[..]` and `$[..]`
    pub fn select(
        &mut self,
        target: &Value,
        variant: SelectionVariant,
        criteria: &SpelNode,
        null_safe: bool,
    ) -> EvaluationResult<Value> {
        if target.is_null() && null_safe {
            return Ok(Value::Null);
        }
        let Some(elements) = Self::elements(target) else {
            return Err(EvaluationError::new(
                codes::evaluation::INVALID_TYPE_FOR_SELECTION,
                vec![target.type_name()],
            ));
        };

        match elements {
            Elements::List(items) => {
                let mut matches = Vec::new();
                for item in items {
                    if self.selected(item.clone(), criteria)? {
                        if variant == SelectionVariant::First {
                            return Ok(item);
                        }
                        matches.push(item);
                    }
                }
                Ok(match variant {
                    SelectionVariant::All => Value::list(matches),
                    _ => matches.pop().unwrap_or(Value::Null),
                })
            }
            Elements::Map(entries) => {
                let mut matches: IndexMap<MapKey, Value> = IndexMap::new();
                for (key, value) in entries {
                    if self.selected(methods::entry_value(&key, &value), criteria)? {
                        if variant == SelectionVariant::First {
                            return Ok(Value::map([(key, value)]));
                        }
                        matches.insert(key, value);
                    }
                }
                Ok(match variant {
                    SelectionVariant::All => Value::map(matches),
                    _ => matches
                        .pop()
                        .map(|entry| Value::map([entry]))
                        .unwrap_or(Value::Null),
                })
            }
        }
    }

    /// `![..]`
    pub fn project(&mut self, target: &Value, expression: &SpelNode, null_safe: bool) -> EvaluationResult<Value> {
        if target.is_null() && null_safe {
            return Ok(Value::Null);
        }
        let items = match Self::elements(target) {
            Some(Elements::List(items)) => items,
            Some(Elements::Map(entries)) => entries
                .iter()
                .map(|(k, v)| methods::entry_value(k, v))
                .collect(),
            None => {
                return Err(EvaluationError::new(
                    codes::evaluation::PROJECTION_NOT_SUPPORTED_ON_TYPE,
                    vec![target.type_name()],
                ))
            }
        };

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(self.with_element(item, |engine| engine.evaluate(expression))?);
        }
        Ok(Value::list(results))
    }

    /// `{a, b}`; a new list on every evaluation
    pub fn inline_list(&mut self, items: &[SpelNode]) -> EvaluationResult<Value> {
        let values = items
            .iter()
            .map(|item| self.evaluate(item))
            .collect::<EvaluationResult<Vec<_>>>()?;
        Ok(Value::list(values))
    }

    /// `{k: v}`; bare identifiers as keys are taken literally
    pub fn inline_map(&mut self, entries: &[(SpelNode, SpelNode)]) -> EvaluationResult<Value> {
        let mut map = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let key = match &key.kind {
                NodeKind::PropertyOrField { name, .. } => Value::String(name.clone()),
                _ => self.evaluate(key)?,
            };
            let value = self.evaluate(value)?;
            map.insert(MapKey::from_value(&key), value);
        }
        Ok(Value::map(map))
    }

    /// `new T[n]`, `new T[n][m]` and `new T[]{...}`
    pub fn construct_array(
        &mut self,
        type_name: &SpelNode,
        dimensions: &[Option<SpelNode>],
        initializer: Option<&SpelNode>,
    ) -> EvaluationResult<Value> {
        let component = self.find_type(type_name)?;

        if let Some(initializer) = initializer {
            if dimensions.len() > 1 {
                return Err(EvaluationError::new(
                    codes::evaluation::MULTIDIM_ARRAY_INITIALIZER_NOT_SUPPORTED,
                    vec![],
                ));
            }

            let initial = self.evaluate(initializer)?;
            let Some(items) = initial.list_items() else {
                return Err(not_convertible(&initial, &component.clone().with_dimensions(1)));
            };

            if let Some(Some(dimension)) = dimensions.first() {
                let size = array_size(&self.evaluate(dimension)?)?;
                if size != items.len() {
                    return Err(EvaluationError::new(
                        codes::evaluation::INITIALIZER_LENGTH_INCORRECT,
                        vec![],
                    ));
                }
            }
            if items.len() > evaluation::MAX_ARRAY_ELEMENTS {
                return Err(too_many_elements());
            }

            let converted = items
                .into_iter()
                .map(|item| convert_element(item, &component))
                .collect::<EvaluationResult<Vec<_>>>()?;
            return Ok(Value::list(converted));
        }

        let mut sizes = Vec::with_capacity(dimensions.len());
        for dimension in dimensions {
            let Some(dimension) = dimension else {
                return Err(EvaluationError::new(
                    codes::evaluation::MISSING_ARRAY_DIMENSION,
                    vec![],
                ));
            };
            sizes.push(array_size(&self.evaluate(dimension)?)?);
        }

        let total = sizes
            .iter()
            .try_fold(1usize, |acc, size| acc.checked_mul(*size))
            .filter(|total| *total <= evaluation::MAX_ARRAY_ELEMENTS);
        if total.is_none() {
            return Err(too_many_elements());
        }

        Ok(filled(&sizes, &component.default_value()))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::context::StandardEvaluationContext;
    use crate::execution::engine::ExecutionEngine;
    use crate::types::{EvaluationResult, Value};
    use spel_compiler::logging::codes;
    use spel_compiler::{parse_expression, SpelParserConfiguration};

    fn eval_with_root(root: Value, expression: &str) -> EvaluationResult<Value> {
        let mut context = StandardEvaluationContext::with_root(root);
        let ast = parse_expression(expression).unwrap();
        ExecutionEngine::new(&mut context, SpelParserConfiguration::default()).evaluate(&ast)
    }

    fn render(expression: &str) -> String {
        eval_with_root(Value::Null, expression).unwrap().to_string()
    }

    #[test]
    fn list_selection() {
        assert_eq!(render("{1,2,3,4}.?[#this>2]"), "[3, 4]");
        assert_eq!(render("{1,2,3,4}.^[#this>1]"), "2");
        assert_eq!(render("{1,2,3,4}.$[#this<3]"), "2");
        assert_eq!(render("{1,2,3,4}.^[#this>9]"), "null");
        assert_eq!(render("{1,2,3,4}.?[#this>9]"), "[]");
    }

    #[test]
    fn selection_and_projection_on_a_list_root() {
        let root = || Value::list((1..=4).map(Value::Int).collect());
        assert_eq!(eval_with_root(root(), ".?[#this>2]").unwrap().to_string(), "[3, 4]");
        assert_eq!(eval_with_root(root(), "^[#this>2]").unwrap(), Value::Int(3));
        assert_eq!(eval_with_root(root(), "$[#this>2]").unwrap(), Value::Int(4));
        assert_eq!(eval_with_root(root(), "![#this*2]").unwrap().to_string(), "[2, 4, 6, 8]");
    }

    #[test]
    fn map_selection_keeps_entries() {
        let root = Value::map([("a", Value::Int(1)), ("b", Value::Int(5)), ("c", Value::Int(7))]);
        let selected = eval_with_root(root.clone(), "?[value > 2]").unwrap();
        assert_eq!(selected.to_string(), "{b=5, c=7}");

        let last = eval_with_root(root.clone(), "$[value > 2]").unwrap();
        assert_eq!(last.to_string(), "{c=7}");

        let keys = eval_with_root(root, "![key]").unwrap();
        assert_eq!(keys.to_string(), "[a, b, c]");
    }

    #[test]
    fn selection_criteria_must_be_boolean() {
        let error = eval_with_root(Value::Null, "{1,2}.?['true']").unwrap_err();
        assert_eq!(error.code, codes::evaluation::RESULT_OF_SELECTION_CRITERIA_IS_NOT_BOOLEAN);
    }

    #[test]
    fn projection() {
        assert_eq!(render("{1,2,3}.![#this * 2]"), "[2, 4, 6]");
        assert_eq!(render("{'a','bb'}.![length()]"), "[1, 2]");
    }

    #[test]
    fn element_scope_is_visible_to_arguments() {
        let root = Value::from_json(&serde_json::json!({
            "words": ["ab", "abc"],
            "n": 1
        }));
        let result = eval_with_root(root, "words.![substring(#this.length() - 1)]").unwrap();
        assert_eq!(result.to_string(), "[b, c]");
    }

    #[test]
    fn null_targets() {
        let root = Value::map([("items", Value::Null)]);
        assert_eq!(eval_with_root(root.clone(), "items?.?[#this > 1]").unwrap(), Value::Null);
        assert_eq!(eval_with_root(root.clone(), "items?.![#this]").unwrap(), Value::Null);

        let error = eval_with_root(root.clone(), "items.?[#this > 1]").unwrap_err();
        assert_eq!(error.code, codes::evaluation::INVALID_TYPE_FOR_SELECTION);
        let error = eval_with_root(root, "items.![#this]").unwrap_err();
        assert_eq!(error.code, codes::evaluation::PROJECTION_NOT_SUPPORTED_ON_TYPE);
        assert_eq!(error.inserts, vec!["null"]);
    }

    #[test]
    fn inline_literals_are_fresh_each_time() {
        let mut context = StandardEvaluationContext::new();
        let ast = parse_expression("{1,2}").unwrap();

        let first = ExecutionEngine::new(&mut context, SpelParserConfiguration::default())
            .evaluate(&ast)
            .unwrap();
        let Value::List(items) = &first else {
            panic!("expected list");
        };
        items.borrow_mut().push(Value::Int(3));

        let second = ExecutionEngine::new(&mut context, SpelParserConfiguration::default())
            .evaluate(&ast)
            .unwrap();
        assert_eq!(second.to_string(), "[1, 2]");
    }

    #[test]
    fn inline_maps() {
        assert_eq!(render("{a:1, 'b c':2, 3:{}}"), "{a=1, b c=2, 3=[]}");
        assert_eq!(render("{:}"), "{}");
    }

    #[test]
    fn arrays() {
        assert_eq!(render("new int[3]"), "[0, 0, 0]");
        assert_eq!(render("new String[2]"), "[null, null]");
        assert_eq!(render("new int[2][2]"), "[[0, 0], [0, 0]]");
        assert_eq!(render("new int[]{1, 2, 3}"), "[1, 2, 3]");
        assert_eq!(render("new long[]{1}[0]"), "1");
        assert_eq!(render("new String[]{1, 'a'}"), "[1, a]");
    }

    #[test]
    fn array_errors() {
        let code = |expression: &str| eval_with_root(Value::Null, expression).unwrap_err().code;

        assert_eq!(code("new int[2]{1, 2, 3}"), codes::evaluation::INITIALIZER_LENGTH_INCORRECT);
        assert_eq!(code("new int[][]{{1}}"), codes::evaluation::MULTIDIM_ARRAY_INITIALIZER_NOT_SUPPORTED);
        assert_eq!(code("new int[]{null}"), codes::evaluation::TYPE_CONVERSION_ERROR);
        assert_eq!(code("new int[-1]"), codes::evaluation::TYPE_CONVERSION_ERROR);
        assert_eq!(code("new int[100000][100000]"), codes::evaluation::MAX_ARRAY_ELEMENTS_THRESHOLD_EXCEEDED);
    }
}
