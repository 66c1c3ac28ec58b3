//! Pluggable lookups used by the evaluator: beans, methods and types

pub mod traits;
pub mod type_locator;

pub use traits::{BeanResolver, MethodResolver, StaticBeanResolver, TypeLocator};
pub use type_locator::StandardTypeLocator;
