//! Per-evaluation mutable state.
//!
//! An [`EvaluationState`] holds the root object, variable bindings and the
//! **active-context stack**: the "current object" that property, method and
//! indexer nodes resolve against. It is created for one evaluation call and
//! never shared between threads; the expression tree itself is immutable and
//! can be evaluated concurrently with separate states.
//!
//! # Scoped pushes
//!
//! Nodes never pair `push_active_context`/`pop_active_context` by hand. They
//! take an [`ActiveContextScope`] guard which pops on drop, so the stack is
//! restored on every exit path: `?` propagation, early return, or unwinding.
//!
//! ```text
//! let mut scoped = state.scoped_context(previous);
//! let next = child.evaluate(&mut scoped)?;
//! // popped here, error or not
//! ```

use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashMap;

use crate::errors::{recursion_limit, EvalError, HostError};
use crate::{EvalConfig, TypedValue};

/// Counters maintained during evaluation.
///
/// Reported by `spel --profile`; tests use them to check push/pop balance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalCounters {
    pub nodes_evaluated: u64,
    pub context_pushes: u64,
    pub context_pops: u64,
    pub max_context_depth: usize,
}

/// Call-scoped evaluation state.
#[derive(Debug)]
pub struct EvaluationState {
    root: TypedValue,
    variables: FxHashMap<String, TypedValue>,
    /// Active contexts, innermost last. Empty means "the root".
    active_contexts: Vec<TypedValue>,
    /// Current node nesting depth.
    depth: usize,
    config: EvalConfig,
    counters: EvalCounters,
}

impl EvaluationState {
    /// State with `root` as the ambient context and default configuration.
    pub fn new(root: impl Into<TypedValue>) -> Self {
        Self::builder(root).build()
    }

    pub fn builder(root: impl Into<TypedValue>) -> EvaluationStateBuilder {
        EvaluationStateBuilder::new(root.into())
    }

    #[inline]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    #[inline]
    pub fn root(&self) -> &TypedValue {
        &self.root
    }

    #[inline]
    pub fn counters(&self) -> &EvalCounters {
        &self.counters
    }

    pub fn lookup_variable(&self, name: &str) -> Option<&TypedValue> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: TypedValue) {
        self.variables.insert(name.into(), value);
    }

    /// Make `value` the active context for subsequent node evaluation.
    pub fn push_active_context(&mut self, value: TypedValue) {
        self.active_contexts.push(value);
        let depth = self.active_contexts.len();
        self.counters.context_pushes = self.counters.context_pushes.wrapping_add(1);
        self.counters.max_context_depth = self.counters.max_context_depth.max(depth);
        tracing::trace!(depth, "push active context");
    }

    /// Remove the innermost active context.
    pub fn pop_active_context(&mut self) -> Result<TypedValue, HostError> {
        let Some(value) = self.active_contexts.pop() else {
            tracing::warn!("pop on empty active context stack");
            return Err(HostError::ContextUnderflow);
        };
        self.counters.context_pops = self.counters.context_pops.wrapping_add(1);
        tracing::trace!(depth = self.active_contexts.len(), "pop active context");
        Ok(value)
    }

    /// The innermost active context, or the root when none was pushed.
    #[inline]
    pub fn current_active_context(&self) -> &TypedValue {
        self.active_contexts.last().unwrap_or(&self.root)
    }

    /// Number of pushed contexts (the root does not count).
    #[inline]
    pub fn active_context_depth(&self) -> usize {
        self.active_contexts.len()
    }

    /// Push `value` and return a guard that pops it when dropped.
    ///
    /// The guard derefs to the state, so evaluation continues through it.
    pub fn scoped_context(&mut self, value: TypedValue) -> ActiveContextScope<'_> {
        let entry = self.active_contexts.len();
        self.push_active_context(value);
        ActiveContextScope { state: self, entry }
    }

    /// Enter one level of node nesting, failing once the configured limit
    /// is reached. The level is left when the guard drops.
    pub(crate) fn enter_node(&mut self) -> Result<NestingScope<'_>, EvalError> {
        if let Some(limit) = self.config.depth_limit() {
            if self.depth >= limit {
                tracing::debug!(
                    limit,
                    remaining_stack = ?spel_stack::remaining_stack(),
                    "expression nesting limit reached"
                );
                return Err(recursion_limit(limit));
            }
        }
        self.depth += 1;
        self.counters.nodes_evaluated = self.counters.nodes_evaluated.wrapping_add(1);
        Ok(NestingScope { state: self })
    }

    /// Current node nesting depth.
    #[inline]
    pub fn nesting_depth(&self) -> usize {
        self.depth
    }
}

/// Builder for [`EvaluationState`].
pub struct EvaluationStateBuilder {
    root: TypedValue,
    variables: FxHashMap<String, TypedValue>,
    config: EvalConfig,
}

impl EvaluationStateBuilder {
    fn new(root: TypedValue) -> Self {
        Self {
            root,
            variables: FxHashMap::default(),
            config: EvalConfig::default(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Bind `#name` before evaluation starts.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> EvaluationState {
        EvaluationState {
            root: self.root,
            variables: self.variables,
            active_contexts: Vec::new(),
            depth: 0,
            config: self.config,
            counters: EvalCounters::default(),
        }
    }
}

/// Guard for one pushed active context; pops on drop, including unwinding.
///
/// Drop restores the depth the stack had before the push. Contexts pushed
/// and left behind inside the scope are removed with it; contexts below the
/// entry depth are never touched.
pub struct ActiveContextScope<'s> {
    state: &'s mut EvaluationState,
    /// Stack depth before our push.
    entry: usize,
}

impl Drop for ActiveContextScope<'_> {
    fn drop(&mut self) {
        let found = self.state.active_contexts.len();
        if found != self.entry + 1 {
            tracing::warn!(
                expected = self.entry + 1,
                found,
                "active context stack changed inside a scope"
            );
        }
        while self.state.active_contexts.len() > self.entry {
            if self.state.pop_active_context().is_err() {
                break;
            }
        }
    }
}

impl Deref for ActiveContextScope<'_> {
    type Target = EvaluationState;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for ActiveContextScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

/// Guard for one level of node nesting.
pub(crate) struct NestingScope<'s> {
    state: &'s mut EvaluationState,
}

impl Drop for NestingScope<'_> {
    fn drop(&mut self) {
        self.state.depth = self.state.depth.saturating_sub(1);
    }
}

impl Deref for NestingScope<'_> {
    type Target = EvaluationState;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for NestingScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

#[cfg(test)]
mod tests;
