//! The `spel` subcommands, returning their output instead of printing it.

use std::fmt;

use spel_eval::{EvalCounters, EvalFailure, EvaluationState, Value};
use spel_ir::Span;

use crate::{diagnostic, json, ExpressionParser, ParseError};

/// Anything a command can fail with.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalFailure),
    #[error("invalid root document: {0}")]
    Root(#[from] serde_json::Error),
}

impl CommandError {
    /// Location in the expression source, when the error has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            CommandError::Parse(err) => Some(err.span()),
            CommandError::Eval(err) => err.span(),
            CommandError::Root(_) => None,
        }
    }
}

/// A command error together with the expression text it refers to.
///
/// Displays as a full report with the offending part underlined.
#[derive(Debug)]
pub struct Report {
    pub source: String,
    pub error: CommandError,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = diagnostic::render(&self.source, &self.error.to_string(), self.error.span());
        f.write_str(report.trim_end())
    }
}

impl std::error::Error for Report {}

fn located<E: Into<CommandError>>(source: &str) -> impl FnOnce(E) -> Report + '_ {
    move |err| {
        let error = err.into();
        tracing::debug!(%error, span = ?error.span(), "command failed");
        Report {
            source: source.to_string(),
            error,
        }
    }
}

/// What a command prints, plus the evaluation counters when something was
/// evaluated.
#[derive(Debug)]
pub struct Output {
    pub text: String,
    pub counters: Option<EvalCounters>,
}

fn root_value(root: Option<&str>) -> Result<Value, serde_json::Error> {
    root.map_or(Ok(Value::Null), json::parse_root)
}

/// `spel eval <expr> [--root <json>]`: the value and its type.
#[tracing::instrument(level = "debug", skip_all, fields(source = %source))]
pub fn eval(source: &str, root: Option<&str>) -> Result<Output, Report> {
    let expr = ExpressionParser::new().parse(source).map_err(located(source))?;
    let root = root_value(root).map_err(located(source))?;
    let mut state = EvaluationState::new(root);
    let value = expr.get_value(&mut state).map_err(located(source))?;
    tracing::debug!(counters = ?state.counters(), "evaluated");
    Ok(Output {
        text: value.to_string(),
        counters: Some(state.counters().clone()),
    })
}

/// `spel render <expr>`: the structural rendering of the parsed tree.
#[tracing::instrument(level = "debug", skip_all, fields(source = %source))]
pub fn render(source: &str) -> Result<Output, Report> {
    let expr = ExpressionParser::new().parse(source).map_err(located(source))?;
    Ok(Output {
        text: expr.render(),
        counters: None,
    })
}

/// `spel set <expr> <value> --root <json>`: evaluate `value` against the
/// root, assign it through `expr`, and print the updated root as JSON.
#[tracing::instrument(level = "debug", skip_all, fields(source = %source, value = %value))]
pub fn set(source: &str, value: &str, root: &str) -> Result<Output, Report> {
    let parser = ExpressionParser::new();
    let target = parser.parse(source).map_err(located(source))?;
    let value_expr = parser.parse(value).map_err(located(value))?;
    let root = root_value(Some(root)).map_err(located(source))?;
    let mut state = EvaluationState::new(root);
    let value = value_expr.get_value(&mut state).map_err(located(value))?;
    target.set_value(&mut state, value).map_err(located(source))?;
    tracing::debug!(counters = ?state.counters(), "assigned");
    Ok(Output {
        text: json::from_value(state.root().value()).to_string(),
        counters: Some(state.counters().clone()),
    })
}
