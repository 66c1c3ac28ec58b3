//! Arithmetic with Java numeric promotion
//!
//! Operands widen to the wider of the two kinds (int < long < float <
//! double). Integer arithmetic wraps on overflow.

use crate::types::{EvaluationError, EvaluationResult, Value};
use spel_compiler::config::compile_time::evaluation;
use spel_compiler::logging::codes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    Power,
}

impl Operation {
    /// Name reported in operator errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Subtract => "SUBTRACT",
            Self::Multiply => "MULTIPLY",
            Self::Divide => "DIVIDE",
            Self::Modulus => "MODULUS",
            Self::Power => "POWER",
        }
    }
}

/// Promoted operand pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericPair {
    Int(i32, i32),
    Long(i64, i64),
    Float(f32, f32),
    Double(f64, f64),
}

impl NumericPair {
    pub fn promote(left: &Value, right: &Value) -> Option<Self> {
        let rank = rank(left)?.max(rank(right)?);
        let pair = match rank {
            0 => Self::Int(as_i32(left)?, as_i32(right)?),
            1 => Self::Long(left.as_i64()?, right.as_i64()?),
            2 => Self::Float(as_f32(left)?, as_f32(right)?),
            _ => Self::Double(left.as_f64()?, right.as_f64()?),
        };
        Some(pair)
    }
}

fn rank(value: &Value) -> Option<u8> {
    match value {
        Value::Int(_) => Some(0),
        Value::Long(_) => Some(1),
        Value::Float(_) => Some(2),
        Value::Double(_) => Some(3),
        _ => None,
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Int(i) => Some(*i),
        _ => None,
    }
}

fn as_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Int(i) => Some(*i as f32),
        Value::Long(l) => Some(*l as f32),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

pub fn unsupported(operator: &str, left: &Value, right: &Value) -> EvaluationError {
    EvaluationError::new(
        codes::evaluation::OPERATOR_NOT_SUPPORTED_BETWEEN_TYPES,
        vec![operator.to_string(), left.type_name(), right.type_name()],
    )
}

fn division_by_zero() -> EvaluationError {
    EvaluationError::new(codes::evaluation::DIVISION_BY_ZERO, vec![])
}

/// Numeric sum, or concatenation when either side is a string
pub fn add(left: &Value, right: &Value) -> EvaluationResult<Value> {
    if let Some(pair) = NumericPair::promote(left, right) {
        return Ok(match pair {
            NumericPair::Int(a, b) => Value::Int(a.wrapping_add(b)),
            NumericPair::Long(a, b) => Value::Long(a.wrapping_add(b)),
            NumericPair::Float(a, b) => Value::Float(a + b),
            NumericPair::Double(a, b) => Value::Double(a + b),
        });
    }

    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        return Ok(Value::String(format!("{}{}", left, right)));
    }

    Err(unsupported(Operation::Add.name(), left, right))
}

pub fn subtract(left: &Value, right: &Value) -> EvaluationResult<Value> {
    match NumericPair::promote(left, right) {
        Some(NumericPair::Int(a, b)) => Ok(Value::Int(a.wrapping_sub(b))),
        Some(NumericPair::Long(a, b)) => Ok(Value::Long(a.wrapping_sub(b))),
        Some(NumericPair::Float(a, b)) => Ok(Value::Float(a - b)),
        Some(NumericPair::Double(a, b)) => Ok(Value::Double(a - b)),
        None => Err(unsupported(Operation::Subtract.name(), left, right)),
    }
}

/// Numeric product, or `text * count` repetition
pub fn multiply(left: &Value, right: &Value) -> EvaluationResult<Value> {
    if let (Value::String(text), Value::Int(count)) = (left, right) {
        return repeat(text, *count, left, right);
    }

    match NumericPair::promote(left, right) {
        Some(NumericPair::Int(a, b)) => Ok(Value::Int(a.wrapping_mul(b))),
        Some(NumericPair::Long(a, b)) => Ok(Value::Long(a.wrapping_mul(b))),
        Some(NumericPair::Float(a, b)) => Ok(Value::Float(a * b)),
        Some(NumericPair::Double(a, b)) => Ok(Value::Double(a * b)),
        None => Err(unsupported(Operation::Multiply.name(), left, right)),
    }
}

fn repeat(text: &str, count: i32, left: &Value, right: &Value) -> EvaluationResult<Value> {
    let Ok(count) = usize::try_from(count) else {
        return Err(unsupported(Operation::Multiply.name(), left, right));
    };

    let size = text.chars().count().saturating_mul(count);
    if size > evaluation::MAX_REPEATED_TEXT_SIZE {
        return Err(EvaluationError::new(
            codes::evaluation::MAX_REPEATED_TEXT_SIZE_EXCEEDED,
            vec![evaluation::MAX_REPEATED_TEXT_SIZE.to_string()],
        ));
    }
    Ok(Value::String(text.repeat(count)))
}

pub fn divide(left: &Value, right: &Value) -> EvaluationResult<Value> {
    match NumericPair::promote(left, right) {
        Some(NumericPair::Int(_, 0)) | Some(NumericPair::Long(_, 0)) => Err(division_by_zero()),
        Some(NumericPair::Int(a, b)) => Ok(Value::Int(a.wrapping_div(b))),
        Some(NumericPair::Long(a, b)) => Ok(Value::Long(a.wrapping_div(b))),
        Some(NumericPair::Float(a, b)) => Ok(Value::Float(a / b)),
        Some(NumericPair::Double(a, b)) => Ok(Value::Double(a / b)),
        None => Err(unsupported(Operation::Divide.name(), left, right)),
    }
}

pub fn modulus(left: &Value, right: &Value) -> EvaluationResult<Value> {
    match NumericPair::promote(left, right) {
        Some(NumericPair::Int(_, 0)) | Some(NumericPair::Long(_, 0)) => Err(division_by_zero()),
        Some(NumericPair::Int(a, b)) => Ok(Value::Int(a.wrapping_rem(b))),
        Some(NumericPair::Long(a, b)) => Ok(Value::Long(a.wrapping_rem(b))),
        Some(NumericPair::Float(a, b)) => Ok(Value::Float(a % b)),
        Some(NumericPair::Double(a, b)) => Ok(Value::Double(a % b)),
        None => Err(unsupported(Operation::Modulus.name(), left, right)),
    }
}

/// `int ^ int` stays an int when the result fits and widens to long otherwise
pub fn power(left: &Value, right: &Value) -> EvaluationResult<Value> {
    match NumericPair::promote(left, right) {
        Some(NumericPair::Int(a, b)) => {
            let result = f64::from(a).powf(f64::from(b));
            if result >= f64::from(i32::MIN) && result <= f64::from(i32::MAX) {
                Ok(Value::Int(result as i32))
            } else {
                Ok(Value::Long(result as i64))
            }
        }
        Some(NumericPair::Long(a, b)) => Ok(Value::Long((a as f64).powf(b as f64) as i64)),
        Some(NumericPair::Float(a, b)) => Ok(Value::Float(a.powf(b))),
        Some(NumericPair::Double(a, b)) => Ok(Value::Double(a.powf(b))),
        None => Err(unsupported(Operation::Power.name(), left, right)),
    }
}

pub fn negate(operand: &Value) -> EvaluationResult<Value> {
    match operand {
        Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
        Value::Long(l) => Ok(Value::Long(l.wrapping_neg())),
        Value::Float(f) => Ok(Value::Float(-f)),
        Value::Double(d) => Ok(Value::Double(-d)),
        other => Err(unsupported(Operation::Subtract.name(), other, &Value::Null)),
    }
}

pub fn identity(operand: &Value) -> EvaluationResult<Value> {
    if operand.is_number() {
        Ok(operand.clone())
    } else {
        Err(unsupported(Operation::Add.name(), operand, &Value::Null))
    }
}

/// `value + delta` keeping the operand's kind; `None` for non-numbers
pub fn step(value: &Value, delta: i32) -> Option<Value> {
    match value {
        Value::Int(i) => Some(Value::Int(i.wrapping_add(delta))),
        Value::Long(l) => Some(Value::Long(l.wrapping_add(i64::from(delta)))),
        Value::Float(f) => Some(Value::Float(f + delta as f32)),
        Value::Double(d) => Some(Value::Double(d + f64::from(delta))),
        _ => None,
    }
}
