//! Evaluation policy.

/// Default limit on node nesting during one evaluation.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Which compound operations rewrite error positions to the failing segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PositionPolicy {
    /// Only reads (`evaluate`) are corrected. Failures from `assign` and
    /// `is_assignable` keep the span set by the node that raised them.
    #[default]
    ReadPathOnly,
    /// Reads, writes and writability queries are all corrected.
    ReadAndWrite,
}

impl PositionPolicy {
    #[inline]
    pub fn corrects_writes(self) -> bool {
        matches!(self, PositionPolicy::ReadAndWrite)
    }
}

/// Configuration carried by an [`EvaluationState`](crate::EvaluationState).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    max_depth: Option<usize>,
    position_policy: PositionPolicy,
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit node nesting. `None` leaves only the stack-growth guard.
    #[must_use]
    pub fn max_depth(mut self, limit: Option<usize>) -> Self {
        self.max_depth = limit;
        self
    }

    #[must_use]
    pub fn position_policy(mut self, policy: PositionPolicy) -> Self {
        self.position_policy = policy;
        self
    }

    #[inline]
    pub fn depth_limit(&self) -> Option<usize> {
        self.max_depth
    }

    #[inline]
    pub fn positions(&self) -> PositionPolicy {
        self.position_policy
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            position_policy: PositionPolicy::default(),
        }
    }
}
