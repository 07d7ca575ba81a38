//! Evaluation of parsed expressions into runtime [`Value`]s.

pub mod constants;
pub mod context;
pub mod evaluator;
pub mod value;

pub use context::Context;
pub use evaluator::{evaluate, evaluate_all, EvalError, EvalResult, Evaluator};
pub use value::{Array, ArrayKey, DeferredCall, Value, ValueKind};
