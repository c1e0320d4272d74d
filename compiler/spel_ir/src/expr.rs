//! Expression nodes.
//!
//! The tree is built once by the parser and never mutated afterwards. Every
//! node owns its children exclusively (`Box`/`Vec`, no arena sharing), so a
//! finished tree is `Send + Sync` and can be evaluated from several threads at
//! once, each thread with its own evaluation state.

use std::fmt;

use crate::Span;

/// Expression node: what it is and where it came from.
#[derive(Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Structural reconstruction of the source text.
    ///
    /// Depends only on the tree. Each node renders its own punctuation, so a
    /// chain renders as the concatenation of its segments. Reparsing the
    /// result yields the same tree shape.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Rendering for a node embedded in a larger one: an assignment is
    /// parenthesized so `=` does not capture its surroundings on reparse.
    pub fn render_operand(&self) -> String {
        Operand(self).to_string()
    }
}

struct Operand<'a>(&'a Expr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.kind {
            ExprKind::Assign { .. } => write!(f, "({})", self.0),
            _ => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Expression variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// `42`, `1.5`, `'text'`, `true`, `null`.
    Literal(Literal),
    /// Field of the active context: `name`, or `.name` inside a chain.
    Property(PropertyRef),
    /// `#name`, `#root`, `#this`.
    Variable(String),
    /// `[index]` applied to the active context.
    Indexer(Box<Expr>),
    /// `name(args)` invoked on the active context.
    Method(MethodCall),
    /// `target = value`.
    Assign { target: Box<Expr>, value: Box<Expr> },
    /// Dot/index chain, each segment evaluated against the previous result.
    Compound(CompoundChain),
}

/// Literal value as written in the source.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Property segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRef {
    pub name: String,
    /// Whether the segment was written after a `.`.
    pub dotted: bool,
}

/// Method segment.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodCall {
    pub name: String,
    pub args: Vec<Expr>,
    /// Whether the segment was written after a `.`.
    pub dotted: bool,
}

/// Ordered, non-empty sequence of chain segments.
///
/// The first segment is stored apart from the rest so the type itself rules
/// out an empty chain.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundChain {
    head: Box<Expr>,
    tail: Vec<Expr>,
}

impl CompoundChain {
    pub fn new(head: Expr, tail: Vec<Expr>) -> Self {
        CompoundChain {
            head: Box::new(head),
            tail,
        }
    }

    /// Build a chain from a list of segments, `None` when the list is empty.
    pub fn from_segments(segments: Vec<Expr>) -> Option<Self> {
        let mut iter = segments.into_iter();
        let head = iter.next()?;
        Some(Self::new(head, iter.collect()))
    }

    /// Segment evaluated against the caller's ambient context.
    #[inline]
    pub fn head(&self) -> &Expr {
        &self.head
    }

    /// Segments evaluated against the previous segment's result.
    #[inline]
    pub fn tail(&self) -> &[Expr] {
        &self.tail
    }

    /// Number of segments (always at least one).
    #[inline]
    pub fn len(&self) -> usize {
        self.tail.len() + 1
    }

    /// Always `false`; present for API symmetry with slices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expr> {
        std::iter::once(self.head.as_ref()).chain(self.tail.iter())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{lit}"),
            ExprKind::Property(prop) => {
                if prop.dotted {
                    f.write_str(".")?;
                }
                f.write_str(&prop.name)
            }
            ExprKind::Variable(name) => write!(f, "#{name}"),
            ExprKind::Indexer(index) => write!(f, "[{index}]"),
            ExprKind::Method(call) => {
                if call.dotted {
                    f.write_str(".")?;
                }
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", Operand(arg))?;
                }
                f.write_str(")")
            }
            // `=` is right-associative, so only the target needs wrapping
            ExprKind::Assign { target, value } => write!(f, "{} = {value}", Operand(target)),
            ExprKind::Compound(chain) => {
                for segment in chain.iter() {
                    write!(f, "{}", Operand(segment))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
            // Keep a decimal point so `1.0` does not read back as an int
            Literal::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}
