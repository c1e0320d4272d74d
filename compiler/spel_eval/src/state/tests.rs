use super::*;
use pretty_assertions::assert_eq;

use crate::{EvalErrorKind, Value};

fn int(n: i64) -> TypedValue {
    TypedValue::new(Value::Int(n))
}

#[test]
fn test_current_context_defaults_to_root() {
    let state = EvaluationState::new(Value::from("root"));
    assert_eq!(state.current_active_context().value(), &Value::from("root"));
    assert_eq!(state.active_context_depth(), 0);
}

#[test]
fn test_push_pop_lifo() {
    let mut state = EvaluationState::new(Value::Null);
    state.push_active_context(int(1));
    state.push_active_context(int(2));
    assert_eq!(state.current_active_context(), &int(2));
    assert_eq!(state.pop_active_context().ok(), Some(int(2)));
    assert_eq!(state.current_active_context(), &int(1));
    assert_eq!(state.pop_active_context().ok(), Some(int(1)));
    assert_eq!(
        state.counters(),
        &EvalCounters {
            nodes_evaluated: 0,
            context_pushes: 2,
            context_pops: 2,
            max_context_depth: 2,
        }
    );
}

#[test]
fn test_pop_on_empty_stack_is_host_error() {
    let mut state = EvaluationState::new(Value::Null);
    assert!(matches!(
        state.pop_active_context(),
        Err(HostError::ContextUnderflow)
    ));
    assert_eq!(state.counters().context_pops, 0);
}

#[test]
fn test_scoped_context_pops_on_drop() {
    let mut state = EvaluationState::new(Value::Null);
    {
        let mut scoped = state.scoped_context(int(1));
        assert_eq!(scoped.current_active_context(), &int(1));
        let inner = scoped.scoped_context(int(2));
        assert_eq!(inner.active_context_depth(), 2);
    }
    assert_eq!(state.active_context_depth(), 0);
    assert_eq!(state.counters().context_pops, 2);
}

#[test]
fn test_scoped_context_pops_on_unwind() {
    let mut state = EvaluationState::new(Value::Null);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _scoped = state.scoped_context(int(1));
        panic!("node blew up");
    }));
    assert!(result.is_err());
    assert_eq!(state.active_context_depth(), 0);
}

#[test]
fn test_scope_keeps_caller_context_after_manual_pop() {
    let mut state = EvaluationState::new(Value::Null);
    state.push_active_context(int(10));
    {
        let mut scoped = state.scoped_context(int(1));
        assert_eq!(scoped.pop_active_context().ok(), Some(int(1)));
    }
    assert_eq!(state.active_context_depth(), 1);
    assert_eq!(state.current_active_context(), &int(10));
}

#[test]
fn test_scope_removes_contexts_left_inside() {
    let mut state = EvaluationState::new(Value::Null);
    state.push_active_context(int(10));
    {
        let mut scoped = state.scoped_context(int(1));
        scoped.push_active_context(int(2));
        scoped.push_active_context(int(3));
    }
    assert_eq!(state.active_context_depth(), 1);
    assert_eq!(state.current_active_context(), &int(10));
    assert_eq!(state.counters().context_pops, 3);
}

#[test]
fn test_builder_variables_and_config() {
    let state = EvaluationState::builder(Value::Null)
        .variable("limit", Value::Int(3))
        .config(EvalConfig::new().max_depth(None))
        .build();
    assert_eq!(state.lookup_variable("limit"), Some(&int(3)));
    assert_eq!(state.lookup_variable("other"), None);
    assert_eq!(state.config().depth_limit(), None);
}

#[test]
fn test_enter_node_enforces_limit() {
    let mut state = EvaluationState::builder(Value::Null)
        .config(EvalConfig::new().max_depth(Some(2)))
        .build();
    let mut first = match state.enter_node() {
        Ok(scope) => scope,
        Err(err) => panic!("first level rejected: {err}"),
    };
    let mut second = match first.enter_node() {
        Ok(scope) => scope,
        Err(err) => panic!("second level rejected: {err}"),
    };
    assert_eq!(second.nesting_depth(), 2);
    let err = match second.enter_node() {
        Ok(_) => panic!("third level accepted"),
        Err(err) => err,
    };
    assert_eq!(err.kind, EvalErrorKind::RecursionLimit { limit: 2 });
    drop(second);
    drop(first);
    assert_eq!(state.nesting_depth(), 0);
    assert_eq!(state.counters().nodes_evaluated, 2);
}
