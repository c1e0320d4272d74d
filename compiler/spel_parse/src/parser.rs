//! Recursive-descent parser.
//!
//! ```text
//! expr     := chain ('=' expr)?
//! chain    := primary (('.' segment) | indexer)*
//! primary  := literal | '(' expr ')' | variable | segment | indexer
//! segment  := IDENT ('(' args? ')')?
//! variable := '#' IDENT
//! indexer  := '[' expr ']'
//! args     := expr (',' expr)*
//! ```

use spel_ir::{CompoundChain, Expr, ExprKind, Literal, MethodCall, PropertyRef, Span};
use spel_stack::ensure_sufficient_stack;

use crate::lexer::{Token, TokenKind};
use crate::ParseError;

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Offset one past the last byte, used for end-of-input errors.
    eof: u32,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>, eof: u32) -> Self {
        Parser {
            tokens,
            pos: 0,
            eof,
        }
    }

    /// Parse a complete expression; trailing tokens are an error.
    pub(crate) fn parse_complete(mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: "end of expression",
                found: token.kind.describe(),
                span: token.span,
            }),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> Option<Span> {
        if self.peek_kind() == Some(kind) {
            self.bump().map(|t| t.span)
        } else {
            None
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<Span, ParseError> {
        if let Some(span) = self.eat(kind) {
            return Ok(span);
        }
        Err(self.unexpected(expected))
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<(String, Span), ParseError> {
        let ident = match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(name),
                span,
            }) => (name.clone(), *span),
            _ => return Err(self.unexpected(expected)),
        };
        self.pos += 1;
        Ok(ident)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                expected,
                found: token.kind.describe(),
                span: token.span,
            },
            None => ParseError::UnexpectedEnd {
                expected,
                span: Span::point(self.eof),
            },
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| {
            let target = self.parse_chain()?;
            if self.eat(&TokenKind::Eq).is_none() {
                return Ok(target);
            }
            let value = self.parse_expr()?;
            let span = target.span.merge(value.span);
            Ok(Expr::new(
                ExprKind::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                span,
            ))
        })
    }

    fn parse_chain(&mut self) -> Result<Expr, ParseError> {
        let head = self.parse_primary()?;
        let mut tail = Vec::new();
        loop {
            match self.peek_kind() {
                Some(TokenKind::Dot) => {
                    self.bump();
                    let (name, span) = self.expect_ident("property or method name after `.`")?;
                    tail.push(self.parse_segment(name, span, true)?);
                }
                Some(TokenKind::LBracket) => tail.push(self.parse_indexer()?),
                _ => break,
            }
        }
        let Some(last) = tail.last() else {
            return Ok(head);
        };
        let span = head.span.merge(last.span);
        Ok(Expr::new(
            ExprKind::Compound(CompoundChain::new(head, tail)),
            span,
        ))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.unexpected("an expression"));
        };
        let literal = match token.kind {
            TokenKind::Null => Some(Literal::Null),
            TokenKind::True => Some(Literal::Bool(true)),
            TokenKind::False => Some(Literal::Bool(false)),
            TokenKind::Int(n) => Some(Literal::Int(n)),
            TokenKind::Float(x) => Some(Literal::Float(x)),
            TokenKind::Str(ref s) => Some(Literal::Str(s.clone())),
            _ => None,
        };
        if let Some(literal) = literal {
            self.bump();
            return Ok(Expr::new(ExprKind::Literal(literal), token.span));
        }

        match token.kind {
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            TokenKind::Hash => {
                self.bump();
                let (name, span) = self.expect_ident("variable name after `#`")?;
                Ok(Expr::new(
                    ExprKind::Variable(name),
                    token.span.merge(span),
                ))
            }
            TokenKind::Ident(name) => {
                self.bump();
                self.parse_segment(name, token.span, false)
            }
            TokenKind::LBracket => self.parse_indexer(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// Property or method segment whose name token was already consumed.
    fn parse_segment(
        &mut self,
        name: String,
        name_span: Span,
        dotted: bool,
    ) -> Result<Expr, ParseError> {
        if self.eat(&TokenKind::LParen).is_none() {
            return Ok(Expr::new(
                ExprKind::Property(PropertyRef { name, dotted }),
                name_span,
            ));
        }

        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen).is_none() {
            loop {
                args.push(self.parse_expr()?);
                if self.eat(&TokenKind::Comma).is_some() {
                    continue;
                }
                break;
            }
            self.expect(&TokenKind::RParen, "`,` or `)`")?;
        }
        let end = self.tokens.get(self.pos.saturating_sub(1)).map_or(name_span, |t| t.span);
        Ok(Expr::new(
            ExprKind::Method(MethodCall { name, args, dotted }),
            name_span.merge(end),
        ))
    }

    fn parse_indexer(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect(&TokenKind::LBracket, "`[`")?;
        let index = self.parse_expr()?;
        let close = self.expect(&TokenKind::RBracket, "`]`")?;
        Ok(Expr::new(
            ExprKind::Indexer(Box::new(index)),
            open.merge(close),
        ))
    }
}
