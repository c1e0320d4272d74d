//! Dot-chained expression evaluation.
//!
//! `a.b.c()` is a compound of three segments. Each segment is evaluated
//! against the result of the previous one:
//!
//! ```text
//! v0 = a    (ambient context: whatever the caller established)
//! push v0;  v1 = .b    ; pop
//! push v1;  v2 = .c()  ; pop
//! result = v2
//! ```
//!
//! Writes go through the last segment only; everything before it is
//! evaluated as a read to find the object being written to.
//!
//! Every push is owned by an [`ActiveContextScope`](crate::ActiveContextScope)
//! guard, so the stack depth on return always equals the depth on entry.

use spel_ir::Span;

use crate::{EvalFailure, EvalResult, EvaluationState, ExpressionNode, TypedValue};

/// A non-empty chain of segments borrowed from an expression tree.
///
/// Generic over the segment type so the same chaining logic applies to
/// parsed trees (`spel_ir::Expr`) and to nodes supplied by other code.
pub struct CompoundExpression<'n, N> {
    head: &'n N,
    tail: &'n [N],
    span: Span,
}

impl<'n, N: ExpressionNode> CompoundExpression<'n, N> {
    /// Chain of `head` followed by `tail`, spanning `span` in the source.
    pub fn new(head: &'n N, tail: &'n [N], span: Span) -> Self {
        CompoundExpression { head, tail, span }
    }

    /// Chain over `segments`; `None` when empty.
    pub fn from_slice(segments: &'n [N], span: Span) -> Option<Self> {
        let (head, tail) = segments.split_first()?;
        Some(Self::new(head, tail, span))
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.tail.len() + 1
    }

    /// Always `false`: a chain has at least one segment.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Evaluate `head` and then each of `middle` with the previous result
    /// pushed, returning the last result.
    ///
    /// Failures are re-positioned at the failing segment when `correct` is set.
    fn read_through(
        &self,
        middle: &[N],
        state: &mut EvaluationState,
        correct: bool,
    ) -> EvalResult<TypedValue> {
        let mut result = self
            .head
            .evaluate(state)
            .map_err(|err| reposition(err, self.head, correct))?;
        for segment in middle {
            let mut scoped = state.scoped_context(result);
            result = segment
                .evaluate(&mut scoped)
                .map_err(|err| reposition(err, segment, correct))?;
        }
        Ok(result)
    }
}

fn reposition<N: ExpressionNode>(err: EvalFailure, segment: &N, correct: bool) -> EvalFailure {
    if correct {
        err.at(segment.span())
    } else {
        err
    }
}

impl<N: ExpressionNode> ExpressionNode for CompoundExpression<'_, N> {
    #[tracing::instrument(level = "trace", skip_all, fields(segments = self.len()))]
    fn evaluate(&self, state: &mut EvaluationState) -> EvalResult {
        // A single segment is a pass-through: no push, no repositioning
        if self.tail.is_empty() {
            return self.head.evaluate(state);
        }
        self.read_through(self.tail, state, true)
    }

    #[tracing::instrument(level = "trace", skip_all, fields(segments = self.len()))]
    fn assign(&self, state: &mut EvaluationState, value: TypedValue) -> EvalResult<()> {
        let correct = state.config().positions().corrects_writes();
        let Some((last, middle)) = self.tail.split_last() else {
            return self.head.assign(state, value);
        };
        let target = self.read_through(middle, state, correct)?;
        let mut scoped = state.scoped_context(target);
        last.assign(&mut scoped, value)
            .map_err(|err| reposition(err, last, correct))
    }

    #[tracing::instrument(level = "trace", skip_all, fields(segments = self.len()))]
    fn is_assignable(&self, state: &mut EvaluationState) -> EvalResult<bool> {
        let correct = state.config().positions().corrects_writes();
        let Some((last, middle)) = self.tail.split_last() else {
            return self.head.is_assignable(state);
        };
        let target = self.read_through(middle, state, correct)?;
        let mut scoped = state.scoped_context(target);
        last.is_assignable(&mut scoped)
            .map_err(|err| reposition(err, last, correct))
    }

    fn span(&self) -> Span {
        self.span
    }

    fn render(&self) -> String {
        std::iter::once(self.head)
            .chain(self.tail)
            .map(|segment| segment.render_segment())
            .collect()
    }
}

#[cfg(test)]
mod tests;
