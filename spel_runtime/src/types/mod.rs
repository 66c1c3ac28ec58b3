//! Runtime data model: values, type descriptors and evaluation errors

pub mod descriptor;
pub mod error;
pub mod value;

pub use descriptor::{TypeDescriptor, TypeKind};
pub use error::{EvaluationError, EvaluationResult};
pub use value::{format_java_double, FunctionRef, ListRef, MapKey, MapRef, NativeFunction, Value};
