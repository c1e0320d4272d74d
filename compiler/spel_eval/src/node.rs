//! The node capability interface and its implementation for parsed trees.

use spel_ir::{Expr, ExprKind, Span};
use spel_stack::ensure_sufficient_stack;

use crate::nodes::{assign, indexer, literal, method, property, variable};
use crate::{CompoundExpression, EvalFailure, EvalResult, EvaluationState, TypedValue};

/// What every expression node can do.
///
/// A node that works on "the current object" (property, method, indexer)
/// reads it from [`EvaluationState::current_active_context`]. Compound
/// expressions rely on this: they push each segment's result before
/// evaluating the next segment.
pub trait ExpressionNode {
    /// Produce the node's value.
    fn evaluate(&self, state: &mut EvaluationState) -> EvalResult;

    /// Store `value` in the location the node denotes.
    fn assign(&self, state: &mut EvaluationState, value: TypedValue) -> EvalResult<()>;

    /// Whether [`assign`](ExpressionNode::assign) would succeed. Never mutates
    /// the target.
    fn is_assignable(&self, state: &mut EvaluationState) -> EvalResult<bool>;

    /// Source location of the node.
    fn span(&self) -> Span;

    /// Structural text of the node, independent of any state.
    fn render(&self) -> String;

    /// Text of the node when it appears as a chain segment.
    fn render_segment(&self) -> String {
        self.render()
    }
}

impl<N: ExpressionNode + ?Sized> ExpressionNode for Box<N> {
    fn evaluate(&self, state: &mut EvaluationState) -> EvalResult {
        (**self).evaluate(state)
    }

    fn assign(&self, state: &mut EvaluationState, value: TypedValue) -> EvalResult<()> {
        (**self).assign(state, value)
    }

    fn is_assignable(&self, state: &mut EvaluationState) -> EvalResult<bool> {
        (**self).is_assignable(state)
    }

    fn span(&self) -> Span {
        (**self).span()
    }

    fn render(&self) -> String {
        (**self).render()
    }

    fn render_segment(&self) -> String {
        (**self).render_segment()
    }
}

impl ExpressionNode for Expr {
    fn evaluate(&self, state: &mut EvaluationState) -> EvalResult {
        ensure_sufficient_stack(|| {
            let mut state = state
                .enter_node()
                .map_err(|err| EvalFailure::from(err.with_span(self.span)))?;
            let span = self.span;
            match &self.kind {
                ExprKind::Literal(lit) => Ok(literal::evaluate(lit)),
                ExprKind::Property(prop) => property::evaluate(prop, span, &state),
                ExprKind::Variable(name) => variable::evaluate(name, span, &state),
                ExprKind::Indexer(index) => indexer::evaluate(index, span, &mut state),
                ExprKind::Method(call) => method::evaluate(call, span, &mut state),
                ExprKind::Assign { target, value } => assign::evaluate(target, value, &mut state),
                ExprKind::Compound(chain) => {
                    CompoundExpression::new(chain.head(), chain.tail(), span).evaluate(&mut state)
                }
            }
        })
    }

    fn assign(&self, state: &mut EvaluationState, value: TypedValue) -> EvalResult<()> {
        ensure_sufficient_stack(|| {
            let mut state = state
                .enter_node()
                .map_err(|err| EvalFailure::from(err.with_span(self.span)))?;
            let span = self.span;
            match &self.kind {
                ExprKind::Literal(_) => literal::assign(span),
                ExprKind::Property(prop) => property::assign(prop, span, &state, value),
                ExprKind::Variable(name) => variable::assign(name, span, &mut state, value),
                ExprKind::Indexer(index) => indexer::assign(index, span, &mut state, value),
                ExprKind::Method(_) => method::assign(span),
                ExprKind::Assign { .. } => assign::assign(span),
                ExprKind::Compound(chain) => CompoundExpression::new(chain.head(), chain.tail(), span)
                    .assign(&mut state, value),
            }
        })
    }

    fn is_assignable(&self, state: &mut EvaluationState) -> EvalResult<bool> {
        ensure_sufficient_stack(|| {
            let mut state = state
                .enter_node()
                .map_err(|err| EvalFailure::from(err.with_span(self.span)))?;
            let span = self.span;
            match &self.kind {
                ExprKind::Literal(_) | ExprKind::Method(_) | ExprKind::Assign { .. } => Ok(false),
                ExprKind::Property(prop) => property::is_assignable(prop, &state),
                ExprKind::Variable(name) => Ok(variable::is_assignable(name)),
                ExprKind::Indexer(index) => indexer::is_assignable(index, &mut state),
                ExprKind::Compound(chain) => {
                    CompoundExpression::new(chain.head(), chain.tail(), span)
                        .is_assignable(&mut state)
                }
            }
        })
    }

    fn span(&self) -> Span {
        self.span
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn render_segment(&self) -> String {
        self.render_operand()
    }
}
