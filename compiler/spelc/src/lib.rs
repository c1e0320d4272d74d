//! Spelc - parse expressions once, evaluate them many times.
//!
//! ```text
//! let parser = ExpressionParser::new();
//! let expr = parser.parse("order.lines[0].price")?;
//! let mut state = EvaluationState::new(root);
//! let price = expr.get_value(&mut state)?;
//! ```
//!
//! An [`Expression`] is immutable and `Send + Sync`; each evaluation brings
//! its own [`EvaluationState`].

pub mod commands;
pub mod diagnostic;
pub mod json;

use std::sync::Once;

pub use spel_eval::{
    EvalConfig, EvalFailure, EvalResult, EvaluationState, PositionPolicy, TypedValue, Value,
};
pub use spel_parse::ParseError;

use spel_eval::ExpressionNode;
use spel_ir::{Expr, Span};

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// With `tree` set, events are printed as an indented call tree on stderr
/// (defaulting to `trace` when `RUST_LOG` is unset). Otherwise a subscriber is
/// only installed when `RUST_LOG` is set. Later calls are no-ops.
pub fn init_tracing(tree: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if tree {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_writer(std::io::stderr)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// Turns source text into reusable [`Expression`]s.
#[derive(Clone, Debug, Default)]
pub struct ExpressionParser;

impl ExpressionParser {
    pub fn new() -> Self {
        ExpressionParser
    }

    pub fn parse(&self, source: &str) -> Result<Expression, ParseError> {
        let ast = spel_parse::parse(source)?;
        Ok(Expression {
            source: source.to_string(),
            ast,
        })
    }
}

/// A parsed expression together with the text it was parsed from.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    source: String,
    ast: Expr,
}

impl Expression {
    /// Evaluate against the state's root object.
    pub fn get_value(&self, state: &mut EvaluationState) -> EvalResult<TypedValue> {
        self.ast.evaluate(state)
    }

    /// Store `value` in the location the expression denotes.
    pub fn set_value(
        &self,
        state: &mut EvaluationState,
        value: impl Into<TypedValue>,
    ) -> EvalResult<()> {
        self.ast.assign(state, value.into())
    }

    /// Whether [`set_value`](Expression::set_value) would succeed.
    pub fn is_writable(&self, state: &mut EvaluationState) -> EvalResult<bool> {
        self.ast.is_assignable(state)
    }

    /// The text this expression was parsed from.
    pub fn expression_string(&self) -> &str {
        &self.source
    }

    /// Structural rendering of the parsed tree.
    pub fn render(&self) -> String {
        self.ast.render()
    }

    pub fn span(&self) -> Span {
        self.ast.span
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }
}
