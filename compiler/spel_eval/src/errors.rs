//! Error types for expression evaluation.
//!
//! Two families of failure exist and they are treated differently:
//!
//! - [`EvalError`]: a domain error raised while resolving a node (missing
//!   property, bad index, unknown method). It carries a span that the
//!   compound evaluator rewrites to point at the failing segment.
//! - [`HostError`]: something outside the expression language went wrong,
//!   usually inside a [`HostObject`](crate::HostObject) implementation. It
//!   passes through untouched.
//!
//! [`EvalFailure`] joins the two so every node operation returns one
//! `Result` type.

use std::fmt;

use spel_ir::Span;

/// Result of a node operation; defaults to producing a value.
pub type EvalResult<T = crate::TypedValue> = Result<T, EvalFailure>;

/// Typed category of a domain error.
///
/// Factory functions below populate both `kind` and `message`; the message
/// is always `kind.to_string()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Property access
    PropertyNotFound {
        name: String,
        type_name: String,
    },
    NullContext {
        operation: String,
    },
    ReadOnlyProperty {
        name: String,
        type_name: String,
    },
    NotAssignable {
        node: String,
    },

    // Indexing
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    CannotIndex {
        type_name: String,
    },
    InvalidIndex {
        expected: String,
        got: String,
    },

    // Variables
    UndefinedVariable {
        name: String,
    },

    // Methods
    MethodNotFound {
        method: String,
        type_name: String,
    },
    ArityMismatch {
        method: String,
        expected: String,
        got: usize,
    },
    ArgumentType {
        method: String,
        expected: String,
        got: String,
    },

    // Resources
    RecursionLimit {
        limit: usize,
    },

    /// Catch-all for errors without a structured category.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PropertyNotFound { name, type_name } => {
                write!(f, "property '{name}' cannot be found on object of type '{type_name}'")
            }
            Self::NullContext { operation } => {
                write!(f, "cannot {operation} on null context")
            }
            Self::ReadOnlyProperty { name, type_name } => {
                write!(f, "property '{name}' on type '{type_name}' is read-only")
            }
            Self::NotAssignable { node } => write!(f, "cannot assign to {node}"),

            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::CannotIndex { type_name } => write!(f, "cannot index into a {type_name}"),
            Self::InvalidIndex { expected, got } => {
                write!(f, "index must be {expected}, got {got}")
            }

            Self::UndefinedVariable { name } => write!(f, "undefined variable: #{name}"),

            Self::MethodNotFound { method, type_name } => {
                write!(f, "method '{method}' cannot be found on type '{type_name}'")
            }
            Self::ArityMismatch {
                method,
                expected,
                got,
            } => write!(f, "method '{method}' expects {expected} argument(s), got {got}"),
            Self::ArgumentType {
                method,
                expected,
                got,
            } => write!(f, "method '{method}' expects {expected}, got {got}"),

            Self::RecursionLimit { limit } => {
                write!(f, "maximum expression nesting exceeded (limit: {limit})")
            }

            Self::Custom { message } => f.write_str(message),
        }
    }
}

/// Secondary information attached to an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalNote {
    pub message: String,
    pub span: Option<Span>,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }
}

/// Domain error raised while evaluating a node.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    /// Structured category.
    pub kind: EvalErrorKind,
    /// Human-readable message, equal to `kind.to_string()` for factory errors.
    pub message: String,
    /// Source location of the node that failed.
    ///
    /// Set by the raising node and overwritten by an enclosing compound
    /// expression with the span of its failing segment.
    pub span: Option<Span>,
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    /// Create an uncategorized error.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            span: None,
            notes: Vec::new(),
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }

    /// Byte offset of the error, if known.
    pub fn position(&self) -> Option<u32> {
        self.span.map(|span| span.start)
    }
}

/// Failure outside the expression language.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A host object rejected an operation.
    #[error("host object '{type_name}' failed: {message}")]
    Object { type_name: String, message: String },

    /// More pops than pushes on the active-context stack.
    #[error("active context stack underflow")]
    ContextUnderflow,

    /// Any other error surfaced by host code.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HostError {
    pub fn object(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        HostError::Object {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

/// Any failure a node operation can produce.
#[derive(Debug, thiserror::Error)]
pub enum EvalFailure {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Host(#[from] HostError),
}

impl EvalFailure {
    /// The domain error, if this is one.
    pub fn as_eval(&self) -> Option<&EvalError> {
        match self {
            EvalFailure::Eval(err) => Some(err),
            EvalFailure::Host(_) => None,
        }
    }

    /// Span of a domain error; host errors have none.
    pub fn span(&self) -> Option<Span> {
        self.as_eval().and_then(|err| err.span)
    }

    /// Overwrite the span of a domain error. Host errors are left untouched.
    #[must_use]
    pub(crate) fn at(mut self, span: Span) -> Self {
        if let EvalFailure::Eval(err) = &mut self {
            if err.span != Some(span) {
                tracing::debug!(from = ?err.span, to = ?span, "rewriting error position");
            }
            err.span = Some(span);
        }
        self
    }
}

// Property Access Errors

/// Property missing on the active context.
#[cold]
pub fn property_not_found(name: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PropertyNotFound {
        name: name.to_string(),
        type_name: type_name.to_string(),
    })
}

/// Property or method access on `null`.
#[cold]
pub fn null_context(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NullContext {
        operation: operation.to_string(),
    })
}

/// Write to a read-only property.
#[cold]
pub fn read_only_property(name: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReadOnlyProperty {
        name: name.to_string(),
        type_name: type_name.to_string(),
    })
}

/// Assignment to a node kind that has no storage (literal, method call, ...).
#[cold]
pub fn not_assignable(node: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAssignable {
        node: node.to_string(),
    })
}

// Index Errors

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn cannot_index(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotIndex {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn invalid_index(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidIndex {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

// Variable Errors

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

// Method Errors

#[cold]
pub fn method_not_found(method: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MethodNotFound {
        method: method.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn arity_mismatch(method: &str, expected: &str, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        method: method.to_string(),
        expected: expected.to_string(),
        got,
    })
}

#[cold]
pub fn argument_type(method: &str, expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentType {
        method: method.to_string(),
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

// Resource Errors

#[cold]
pub fn recursion_limit(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimit { limit })
}
