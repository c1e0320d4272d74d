//! Spel Eval - evaluator for chained property/method expressions.
//!
//! Evaluation walks an immutable `spel_ir::Expr` tree against a root object.
//! All mutable evaluation state lives in an [`EvaluationState`] owned by the
//! caller, so one tree can be evaluated from many threads at once.
//!
//! # Architecture
//!
//! - [`ExpressionNode`]: the four operations every node supports
//!   (`evaluate`, `assign`, `is_assignable`, `render`), implemented for
//!   `spel_ir::Expr` and open to other node types.
//! - [`CompoundExpression`]: evaluates `a.b.c` by pushing each segment's
//!   result as the active context of the next segment, and re-positions
//!   failures at the segment that raised them.
//! - [`EvaluationState`]: root object, variables, and the active-context
//!   stack with its RAII guard [`ActiveContextScope`].
//! - [`Value`] / [`TypedValue`]: runtime values; objects and lists are shared
//!   handles, so writes through a chain are visible from the root.
//!
//! # Errors
//!
//! Domain errors ([`EvalError`]) carry a span and are re-positioned by
//! compounds. Host errors ([`HostError`]) pass through untouched. Both are
//! joined in [`EvalFailure`].

mod compound;
mod config;
pub mod errors;
mod node;
mod nodes;
mod state;
mod typed_value;
mod value;

#[cfg(test)]
mod test_helpers;

pub use compound::CompoundExpression;
pub use config::{EvalConfig, PositionPolicy, DEFAULT_MAX_DEPTH};
pub use errors::{EvalError, EvalErrorKind, EvalFailure, EvalNote, EvalResult, HostError};
pub use node::ExpressionNode;
pub use state::{ActiveContextScope, EvalCounters, EvaluationState, EvaluationStateBuilder};
pub use typed_value::{TypeDescriptor, TypedValue};
pub use value::{Field, HostObject, ListRef, ObjectRef, Value};
