//! Equality, ordering and the relational keyword operators

use crate::execution::operators::{unsupported, NumericPair};
use crate::execution::state::ExpressionState;
use crate::types::{EvaluationError, EvaluationResult, Value};
use spel_compiler::logging::codes;
use spel_compiler::BinaryOp;
use std::cmp::Ordering;

/// `==`: numbers compare after promotion, everything else structurally
pub fn equal(left: &Value, right: &Value) -> bool {
    match NumericPair::promote(left, right) {
        Some(NumericPair::Int(a, b)) => a == b,
        Some(NumericPair::Long(a, b)) => a == b,
        Some(NumericPair::Float(a, b)) => a == b,
        Some(NumericPair::Double(a, b)) => a == b,
        None => left == right,
    }
}

/// Total order used by `between` and sorting; null sorts first
pub fn compare(left: &Value, right: &Value) -> EvaluationResult<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => return Ok(Ordering::Equal),
        (Value::Null, _) => return Ok(Ordering::Less),
        (_, Value::Null) => return Ok(Ordering::Greater),
        _ => {}
    }

    if let Some(pair) = NumericPair::promote(left, right) {
        return Ok(match pair {
            NumericPair::Int(a, b) => a.cmp(&b),
            NumericPair::Long(a, b) => a.cmp(&b),
            NumericPair::Float(a, b) => a.total_cmp(&b),
            NumericPair::Double(a, b) => a.total_cmp(&b),
        });
    }

    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
        _ => Err(EvaluationError::new(
            codes::evaluation::NOT_COMPARABLE,
            vec![left.type_name(), right.type_name()],
        )),
    }
}

/// `< <= > >=`; numbers use IEEE comparison so NaN is never ordered
pub fn relational(op: BinaryOp, left: &Value, right: &Value) -> EvaluationResult<bool> {
    let ordering = match NumericPair::promote(left, right) {
        Some(NumericPair::Float(a, b)) => a.partial_cmp(&b),
        Some(NumericPair::Double(a, b)) => a.partial_cmp(&b),
        _ => Some(compare(left, right)?),
    };

    let Some(ordering) = ordering else {
        return Ok(false);
    };

    Ok(match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => return Err(EvaluationError::internal(format!("'{}' is not relational", op.as_str()))),
    })
}

pub fn instance_of(left: &Value, right: &Value) -> EvaluationResult<bool> {
    match right {
        Value::Type(descriptor) => Ok(descriptor.is_instance(left)),
        _ => Err(unsupported("instanceof", left, right)),
    }
}

/// Whole-input regex match of a string against a string pattern
pub fn matches(state: &mut ExpressionState, left: &Value, right: &Value) -> EvaluationResult<bool> {
    let (Value::String(text), Value::String(pattern)) = (left, right) else {
        return Err(unsupported("matches", left, right));
    };
    Ok(state.pattern(pattern)?.is_match(text))
}

/// Inclusive range check against a two-element list
pub fn between(left: &Value, right: &Value) -> EvaluationResult<bool> {
    let bounds = match right.list_items() {
        Some(items) if items.len() == 2 => items,
        _ => {
            return Err(EvaluationError::new(
                codes::evaluation::BETWEEN_RIGHT_OPERAND_MUST_BE_TWO_ELEMENT_LIST,
                vec![],
            ))
        }
    };

    Ok(compare(left, &bounds[0])? != Ordering::Less
        && compare(left, &bounds[1])? != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::context::StandardEvaluationContext;
    use crate::types::{TypeDescriptor, TypeKind};
    use spel_compiler::SpelParserConfiguration;

    #[test]
    fn equality_promotes_numbers_only() {
        assert!(equal(&Value::Int(1), &Value::Long(1)));
        assert!(equal(&Value::Int(1), &Value::Double(1.0)));
        assert!(!equal(&Value::Int(1), &Value::string("1")));
        assert!(equal(&Value::Null, &Value::Null));
        assert!(!equal(&Value::Null, &Value::Int(0)));
        assert!(equal(
            &Value::list(vec![Value::Int(1)]),
            &Value::list(vec![Value::Int(1)])
        ));
    }

    #[test]
    fn ordering_covers_numbers_text_booleans_and_null() {
        assert!(relational(BinaryOp::Lt, &Value::Int(1), &Value::Long(2)).unwrap());
        assert!(relational(BinaryOp::Ge, &Value::string("b"), &Value::string("a")).unwrap());
        assert!(relational(BinaryOp::Gt, &Value::Boolean(true), &Value::Boolean(false)).unwrap());
        assert!(relational(BinaryOp::Lt, &Value::Null, &Value::Int(0)).unwrap());
        assert!(!relational(BinaryOp::Lt, &Value::Double(f64::NAN), &Value::Int(0)).unwrap());
    }

    #[test]
    fn mixed_kinds_are_not_comparable() {
        let error = relational(BinaryOp::Lt, &Value::string("a"), &Value::Int(1)).unwrap_err();
        assert_eq!(error.code, codes::evaluation::NOT_COMPARABLE);
        assert_eq!(error.inserts, vec!["java.lang.String", "java.lang.Integer"]);
    }

    #[test]
    fn instanceof_needs_a_type() {
        let integer = Value::Type(TypeDescriptor::new(TypeKind::Integer));
        assert!(instance_of(&Value::Int(3), &integer).unwrap());
        assert!(!instance_of(&Value::Null, &integer).unwrap());

        let error = instance_of(&Value::Int(3), &Value::string("Integer")).unwrap_err();
        assert_eq!(error.code, codes::evaluation::OPERATOR_NOT_SUPPORTED_BETWEEN_TYPES);
    }

    #[test]
    fn matches_requires_text_operands() {
        let mut context = StandardEvaluationContext::new();
        let mut state = ExpressionState::new(&mut context, SpelParserConfiguration::default());

        assert!(matches(&mut state, &Value::string("5.00"), &Value::string(r"^-?\d+(\.\d{2})?$")).unwrap());
        assert!(!matches(&mut state, &Value::string("abc1"), &Value::string("[a-z]+")).unwrap());

        let error = matches(&mut state, &Value::Int(1), &Value::string("1")).unwrap_err();
        assert_eq!(error.code, codes::evaluation::OPERATOR_NOT_SUPPORTED_BETWEEN_TYPES);
    }

    #[test]
    fn between_is_inclusive() {
        let range = Value::list(vec![Value::Int(1), Value::Int(5)]);
        assert!(between(&Value::Int(1), &range).unwrap());
        assert!(between(&Value::Int(5), &range).unwrap());
        assert!(!between(&Value::Int(6), &range).unwrap());

        let letters = Value::list(vec![Value::string("a"), Value::string("c")]);
        assert!(between(&Value::string("b"), &letters).unwrap());

        let error = between(&Value::Int(1), &Value::list(vec![Value::Int(1)])).unwrap_err();
        assert_eq!(error.code, codes::evaluation::BETWEEN_RIGHT_OPERAND_MUST_BE_TWO_ELEMENT_LIST);
    }
}
