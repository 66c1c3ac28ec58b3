pub mod collections;
pub mod comparisons;
pub mod engine;
pub mod methods;
pub mod operators;
pub mod reference;
pub mod state;

pub use engine::{to_boolean, ExecutionEngine};
pub use reference::ValueRef;
pub use state::ExpressionState;
