//! Tokenizer built on `logos`.

use logos::Logos;
use spel_ir::Span;

use crate::ParseError;

/// Raw token as recognized by logos.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub(crate) enum TokenKind {
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("=")]
    Eq,
    #[token("#")]
    Hash,

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"-?[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    // Single-quoted; a doubled quote stands for one quote character
    #[regex(r"'([^']|'')*'", |lex| unquote(lex.slice()))]
    Str(String),

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl TokenKind {
    /// Short description used in "expected X, found Y" messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::True => "`true`".to_string(),
            TokenKind::False => "`false`".to_string(),
            TokenKind::Null => "`null`".to_string(),
            TokenKind::Dot => "`.`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::LBracket => "`[`".to_string(),
            TokenKind::RBracket => "`]`".to_string(),
            TokenKind::Eq => "`=`".to_string(),
            TokenKind::Hash => "`#`".to_string(),
            TokenKind::Int(n) => format!("integer `{n}`"),
            TokenKind::Float(x) => format!("number `{x}`"),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
        }
    }
}

fn unquote(slice: &str) -> String {
    let inner = slice
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(slice);
    inner.replace("''", "'")
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenize the whole source up front.
pub(crate) fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = Span::try_from_range(lexer.span())?;
        match result {
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(()) => {
                return Err(ParseError::InvalidToken {
                    text: lexer.slice().to_string(),
                    span,
                })
            }
        }
    }
    Ok(tokens)
}
