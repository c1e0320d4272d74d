use std::cell::RefCell;

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::errors::HostError;
use crate::test_helpers::{domain_error, ok, parse};
use crate::{EvalConfig, EvalError, ObjectRef, PositionPolicy, Value};

/// Span every stub error is raised with, before any repositioning.
const RAISED_AT: Span = Span::new(100, 101);

#[derive(Clone, Debug)]
enum Outcome {
    Yield(Value),
    FailDomain,
    FailHost,
    Panic,
}

/// Test node that records the active context of every call.
struct Stub {
    text: String,
    span: Span,
    outcome: Outcome,
    writable: bool,
    calls: RefCell<Vec<(&'static str, Value)>>,
}

impl Stub {
    fn new(text: &str, start: u32, outcome: Outcome) -> Self {
        let len = u32::try_from(text.len()).unwrap_or(u32::MAX);
        Stub {
            text: text.to_string(),
            span: Span::new(start, start + len),
            outcome,
            writable: true,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn yielding(text: &str, start: u32, value: impl Into<Value>) -> Self {
        Self::new(text, start, Outcome::Yield(value.into()))
    }

    fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    fn record(&self, op: &'static str, state: &EvaluationState) -> EvalResult<()> {
        self.calls
            .borrow_mut()
            .push((op, state.current_active_context().value().clone()));
        match &self.outcome {
            Outcome::Yield(_) => Ok(()),
            Outcome::FailDomain => Err(EvalError::new(format!("{} failed", self.text))
                .with_span(RAISED_AT)
                .into()),
            Outcome::FailHost => Err(HostError::object("Stub", "unavailable").into()),
            Outcome::Panic => panic!("stub {} panicked", self.text),
        }
    }

    fn calls(&self) -> Vec<(&'static str, Value)> {
        self.calls.borrow().clone()
    }
}

impl ExpressionNode for Stub {
    fn evaluate(&self, state: &mut EvaluationState) -> EvalResult {
        self.record("evaluate", state)?;
        match &self.outcome {
            Outcome::Yield(value) => Ok(TypedValue::new(value.clone())),
            _ => unreachable!("record fails for every other outcome"),
        }
    }

    fn assign(&self, state: &mut EvaluationState, value: TypedValue) -> EvalResult<()> {
        self.record("assign", state)?;
        self.calls.borrow_mut().push(("assigned", value.into_value()));
        Ok(())
    }

    fn is_assignable(&self, state: &mut EvaluationState) -> EvalResult<bool> {
        self.record("is_assignable", state)?;
        Ok(self.writable)
    }

    fn span(&self) -> Span {
        self.span
    }

    fn render(&self) -> String {
        self.text.clone()
    }
}

fn chain<N: ExpressionNode>(segments: &[N]) -> CompoundExpression<'_, N> {
    let span = segments.first().map_or(Span::DUMMY, ExpressionNode::span);
    match CompoundExpression::from_slice(segments, span) {
        Some(chain) => chain,
        None => panic!("empty chain"),
    }
}

fn root() -> Value {
    Value::from("root")
}

// === Read path ===

#[test]
fn test_each_segment_sees_previous_result() {
    let stubs = [
        Stub::yielding("a", 0, 1),
        Stub::yielding(".b", 1, 2),
        Stub::yielding(".c", 3, 3),
    ];
    let mut state = EvaluationState::new(root());
    let result = ok(chain(&stubs).evaluate(&mut state));

    assert_eq!(result.value(), &Value::Int(3));
    assert_eq!(stubs[0].calls(), vec![("evaluate", root())]);
    assert_eq!(stubs[1].calls(), vec![("evaluate", Value::Int(1))]);
    assert_eq!(stubs[2].calls(), vec![("evaluate", Value::Int(2))]);
    assert_eq!(state.active_context_depth(), 0);
    assert_eq!(state.counters().context_pushes, 2);
    assert_eq!(state.counters().context_pops, 2);
    assert_eq!(state.counters().max_context_depth, 1);
}

#[test]
fn test_head_sees_callers_context() {
    let stubs = [Stub::yielding("a", 0, 1), Stub::yielding(".b", 1, 2)];
    let mut state = EvaluationState::new(root());
    state.push_active_context(TypedValue::new(Value::from("outer")));
    ok(chain(&stubs).evaluate(&mut state));
    assert_eq!(stubs[0].calls(), vec![("evaluate", Value::from("outer"))]);
    assert_eq!(state.active_context_depth(), 1);
}

#[test]
fn test_single_segment_is_pass_through() {
    let stubs = [Stub::yielding("5", 0, 5)];
    let mut state = EvaluationState::new(root());
    let compound = chain(&stubs);
    assert_eq!(ok(compound.evaluate(&mut state)).value(), &Value::Int(5));
    assert_eq!(compound.render(), "5");
    assert_eq!(state.counters().context_pushes, 0);

    let failing = [Stub::new("x", 7, Outcome::FailDomain)];
    let err = domain_error(chain(&failing).evaluate(&mut state));
    assert_eq!(err.span, Some(RAISED_AT));
}

#[test]
fn test_failure_is_positioned_at_failing_segment() {
    for failing in 0..3 {
        let stubs: Vec<Stub> = ["a", ".bb", ".ccc"]
            .iter()
            .zip([0, 1, 4])
            .enumerate()
            .map(|(i, (text, start))| {
                let outcome = if i == failing {
                    Outcome::FailDomain
                } else {
                    Outcome::Yield(Value::Int(i64::try_from(i).unwrap_or(0)))
                };
                Stub::new(text, start, outcome)
            })
            .collect();
        let mut state = EvaluationState::new(root());
        let err = domain_error(chain(&stubs).evaluate(&mut state));

        assert_eq!(err.span, Some(stubs[failing].span()), "segment {failing}");
        assert_eq!(state.active_context_depth(), 0);
        assert!(stubs[failing + 1..].iter().all(|p| p.calls().is_empty()));
    }
}

#[test]
fn test_host_errors_keep_no_position() {
    let stubs = [
        Stub::yielding("a", 0, 1),
        Stub::new(".b", 1, Outcome::FailHost),
        Stub::yielding(".c", 3, 3),
    ];
    let mut state = EvaluationState::new(root());
    match chain(&stubs).evaluate(&mut state) {
        Err(failure @ EvalFailure::Host(_)) => assert_eq!(failure.span(), None),
        other => panic!("expected host error, got {other:?}"),
    }
    assert_eq!(state.active_context_depth(), 0);
}

#[test]
fn test_stack_restored_after_panic() {
    let stubs = [
        Stub::yielding("a", 0, 1),
        Stub::new(".b", 1, Outcome::Panic),
    ];
    let mut state = EvaluationState::new(root());
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        chain(&stubs).evaluate(&mut state)
    }));
    assert!(result.is_err());
    assert_eq!(state.active_context_depth(), 0);
}

// === Write path ===

#[test]
fn test_assign_targets_last_segment() {
    let stubs = [
        Stub::yielding("a", 0, "A"),
        Stub::yielding(".b", 1, "B"),
        Stub::yielding(".c", 3, "C"),
    ];
    let mut state = EvaluationState::new(root());
    ok(chain(&stubs).assign(&mut state, TypedValue::new(Value::Int(7))));

    assert_eq!(stubs[0].calls(), vec![("evaluate", root())]);
    assert_eq!(stubs[1].calls(), vec![("evaluate", Value::from("A"))]);
    assert_eq!(
        stubs[2].calls(),
        vec![("assign", Value::from("B")), ("assigned", Value::Int(7))]
    );
    assert_eq!(state.active_context_depth(), 0);
}

#[test]
fn test_is_assignable_asks_last_segment_only() {
    let stubs = [
        Stub::yielding("a", 0, "A"),
        Stub::yielding(".b", 1, "B").read_only(),
    ];
    let mut state = EvaluationState::new(root());
    assert!(!ok(chain(&stubs).is_assignable(&mut state)));
    assert_eq!(stubs[1].calls(), vec![("is_assignable", Value::from("A"))]);
    assert_eq!(state.active_context_depth(), 0);
}

#[test]
fn test_single_segment_assign_delegates() {
    let stubs = [Stub::yielding("a", 0, 1)];
    let mut state = EvaluationState::new(root());
    ok(chain(&stubs).assign(&mut state, TypedValue::new(Value::Bool(true))));
    assert_eq!(
        stubs[0].calls(),
        vec![("assign", root()), ("assigned", Value::Bool(true))]
    );
    assert_eq!(state.counters().context_pushes, 0);
}

#[test]
fn test_write_failures_keep_position_by_default() {
    let stubs = [
        Stub::yielding("a", 0, 1),
        Stub::new(".b", 1, Outcome::FailDomain),
    ];
    let mut state = EvaluationState::new(root());
    let err = domain_error(chain(&stubs).assign(&mut state, TypedValue::NULL));
    assert_eq!(err.span, Some(RAISED_AT));
    let err = domain_error(chain(&stubs).is_assignable(&mut state));
    assert_eq!(err.span, Some(RAISED_AT));
    assert_eq!(state.active_context_depth(), 0);
}

#[test]
fn test_write_failures_repositioned_when_configured() {
    let stubs = [
        Stub::new("a", 0, Outcome::FailDomain),
        Stub::yielding(".b", 1, 2),
    ];
    let tail_fails = [
        Stub::yielding("a", 0, 1),
        Stub::new(".b", 1, Outcome::FailDomain),
    ];
    let mut state = EvaluationState::builder(root())
        .config(EvalConfig::new().position_policy(PositionPolicy::ReadAndWrite))
        .build();

    let err = domain_error(chain(&stubs).assign(&mut state, TypedValue::NULL));
    assert_eq!(err.span, Some(Span::new(0, 1)));
    let err = domain_error(chain(&tail_fails).is_assignable(&mut state));
    assert_eq!(err.span, Some(Span::new(1, 3)));
    assert_eq!(state.active_context_depth(), 0);
}

// === Rendering & composition ===

#[test]
fn test_render_concatenates_segments() {
    let stubs = [
        Stub::yielding("a", 0, 0),
        Stub::yielding(".b", 1, 0),
        Stub::yielding("[0]", 3, 0),
        Stub::yielding(".size()", 6, 0),
    ];
    assert_eq!(chain(&stubs).render(), "a.b[0].size()");
    assert_eq!(chain(&stubs).len(), 4);
    assert!(stubs.iter().all(|p| p.calls().is_empty()));
}

#[test]
fn test_render_wraps_assignment_segment() {
    let expr = parse("(#x = 'a').length()");
    let spel_ir::ExprKind::Compound(segments) = &expr.kind else {
        panic!("expected compound, got {expr:?}");
    };
    let compound = CompoundExpression::new(segments.head(), segments.tail(), expr.span);
    assert_eq!(compound.render(), "(#x = 'a').length()");

    let mut state = EvaluationState::new(root());
    let result = ok(compound.evaluate(&mut state));
    assert_eq!(result.value(), &Value::Int(1));
}

#[test]
fn test_empty_slice_is_not_a_chain() {
    let none: &[Stub] = &[];
    assert!(CompoundExpression::from_slice(none, Span::DUMMY).is_none());
}

#[test]
fn test_mixed_parsed_and_foreign_segments() {
    let root = ObjectRef::new().with("name", "Ada");
    let stub = Stub::yielding(".shout()", 4, "ADA");
    let segments: Vec<Box<dyn ExpressionNode>> = vec![Box::new(parse("name")), Box::new(stub)];
    let mut state = EvaluationState::new(Value::from(root));

    let result = ok(chain(&segments).evaluate(&mut state));
    assert_eq!(result.value(), &Value::from("ADA"));
    assert_eq!(chain(&segments).render(), "name.shout()");
}

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        6 => any::<i64>().prop_map(|n| Outcome::Yield(Value::Int(n))),
        1 => Just(Outcome::FailDomain),
        1 => Just(Outcome::FailHost),
    ]
}

proptest! {
    #[test]
    fn prop_context_stack_is_balanced(
        outcomes in prop::collection::vec(outcome(), 1..8),
        operation in 0u8..3,
        outer in 0usize..3,
    ) {
        let stubs: Vec<Stub> = outcomes
            .into_iter()
            .zip(0u32..)
            .map(|(outcome, i)| Stub::new(".p", i * 2, outcome))
            .collect();
        let mut state = EvaluationState::new(root());
        for _ in 0..outer {
            state.push_active_context(TypedValue::NULL);
        }

        let compound = chain(&stubs);
        let _ = match operation {
            0 => compound.evaluate(&mut state).map(drop),
            1 => compound.assign(&mut state, TypedValue::NULL),
            _ => compound.is_assignable(&mut state).map(drop),
        };

        let counters = state.counters();
        prop_assert_eq!(state.active_context_depth(), outer);
        prop_assert_eq!(
            counters.context_pushes,
            counters.context_pops + u64::try_from(outer).unwrap_or(0)
        );
    }
}
