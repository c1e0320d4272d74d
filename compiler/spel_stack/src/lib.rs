//! Stack growth for recursive descent over expression trees.
//!
//! Both the parser and the evaluator recurse once per nested node: a chain
//! `a.b[c.d[e]]` nests an indexer inside a compound inside an indexer, and
//! method arguments can hold whole chains of their own. Input comes from
//! users, so depth is unbounded in principle.
//!
//! Every recursive entry point wraps its body in [`ensure_sufficient_stack`].
//! On native targets the `stacker` crate allocates a new stack segment when
//! the remaining space drops below the red zone. On `wasm32` the closure is
//! called directly.
//!
//! This only keeps the process alive. The evaluator additionally enforces a
//! configurable nesting limit that surfaces as a normal evaluation error.

/// Remaining stack below which a new segment is allocated (128KB).
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment (1MB).
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn eval(&self, state: &mut EvaluationState) -> EvalResult {
///     ensure_sufficient_stack(|| match self.kind { /* recurse into children */ })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Remaining stack in bytes, when the platform can report it.
///
/// Used for trace output when the evaluator hits its nesting limit.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining_stack() -> Option<usize> {
    stacker::remaining_stack()
}

/// WASM cannot report remaining stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn remaining_stack() -> Option<usize> {
    None
}
