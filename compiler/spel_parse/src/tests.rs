use super::*;
use pretty_assertions::assert_eq;
use spel_ir::{ExprKind, Literal, PropertyRef};

fn parse_ok(source: &str) -> Expr {
    match parse(source) {
        Ok(expr) => expr,
        Err(err) => panic!("failed to parse `{source}`: {err}"),
    }
}

fn parse_err(source: &str) -> ParseError {
    match parse(source) {
        Ok(expr) => panic!("expected `{source}` to fail, got {expr:?}"),
        Err(err) => err,
    }
}

#[test]
fn test_dotted_chain_segments_and_spans() {
    let expr = parse_ok("a.b.c");
    assert_eq!(expr.span, Span::new(0, 5));
    let ExprKind::Compound(chain) = &expr.kind else {
        panic!("expected compound, got {expr:?}");
    };
    let spans: Vec<Span> = chain.iter().map(|e| e.span).collect();
    assert_eq!(spans, vec![Span::new(0, 1), Span::new(2, 3), Span::new(4, 5)]);
    assert_eq!(
        chain.tail()[0].kind,
        ExprKind::Property(PropertyRef {
            name: "b".to_string(),
            dotted: true,
        })
    );
    assert_eq!(expr.render(), "a.b.c");
}

#[test]
fn test_single_segment_is_not_wrapped() {
    let expr = parse_ok("name");
    assert_eq!(
        expr.kind,
        ExprKind::Property(PropertyRef {
            name: "name".to_string(),
            dotted: false,
        })
    );
    assert_eq!(parse_ok("5").kind, ExprKind::Literal(Literal::Int(5)));
}

#[test]
fn test_literals() {
    assert_eq!(parse_ok("-12").kind, ExprKind::Literal(Literal::Int(-12)));
    assert_eq!(parse_ok("2.5").kind, ExprKind::Literal(Literal::Float(2.5)));
    assert_eq!(parse_ok("null").kind, ExprKind::Literal(Literal::Null));
    assert_eq!(parse_ok("false").kind, ExprKind::Literal(Literal::Bool(false)));
    assert_eq!(
        parse_ok("'it''s'").kind,
        ExprKind::Literal(Literal::Str("it's".to_string()))
    );
}

#[test]
fn test_methods_indexers_and_variables() {
    let expr = parse_ok("#root.items[0].substring(1, 'x'.length())");
    let ExprKind::Compound(chain) = &expr.kind else {
        panic!("expected compound, got {expr:?}");
    };
    assert_eq!(chain.len(), 4);
    assert!(matches!(&chain.head().kind, ExprKind::Variable(name) if name == "root"));
    assert!(matches!(chain.tail()[1].kind, ExprKind::Indexer(_)));
    let ExprKind::Method(call) = &chain.tail()[2].kind else {
        panic!("expected method call");
    };
    assert_eq!(call.name, "substring");
    assert_eq!(call.args.len(), 2);
    assert!(call.dotted);
    assert_eq!(expr.render(), "#root.items[0].substring(1,'x'.length())");
}

#[test]
fn test_method_without_arguments() {
    let expr = parse_ok("size()");
    let ExprKind::Method(call) = &expr.kind else {
        panic!("expected method call, got {expr:?}");
    };
    assert!(call.args.is_empty());
    assert!(!call.dotted);
    assert_eq!(expr.span, Span::new(0, 6));
}

#[test]
fn test_assignment_is_right_associative() {
    let expr = parse_ok("a.b = #x = 7");
    let ExprKind::Assign { target, value } = &expr.kind else {
        panic!("expected assignment, got {expr:?}");
    };
    assert_eq!(target.render(), "a.b");
    assert!(matches!(value.kind, ExprKind::Assign { .. }));
    assert_eq!(expr.render(), "a.b = #x = 7");
}

#[test]
fn test_parenthesized_head() {
    let expr = parse_ok("(a.b).c");
    assert_eq!(expr.render(), "a.b.c");
    let ExprKind::Compound(chain) = &expr.kind else {
        panic!("expected compound, got {expr:?}");
    };
    assert_eq!(chain.len(), 2);
}

#[test]
fn test_parenthesized_assignment_round_trips() {
    for source in ["(#x = a).b", "f((#x = 1)).g", "a[(#i = 0)]", "#y = #x = a"] {
        let expr = parse_ok(source);
        let rendered = expr.render();
        assert_eq!(parse_ok(&rendered).render(), rendered, "{source}");
    }

    let expr = parse_ok("(#x = a).b");
    assert_eq!(expr.render(), "(#x = a).b");
    let ExprKind::Compound(chain) = &expr.kind else {
        panic!("expected compound, got {expr:?}");
    };
    assert!(matches!(chain.head().kind, ExprKind::Assign { .. }));

    let reparsed = parse_ok(&expr.render());
    assert!(matches!(reparsed.kind, ExprKind::Compound(_)));
}

#[test]
fn test_missing_segment_after_dot() {
    let err = parse_err("a..b");
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    assert_eq!(err.span(), Span::new(2, 3));
}

#[test]
fn test_unexpected_end() {
    let err = parse_err("a.b(");
    assert!(matches!(err, ParseError::UnexpectedEnd { .. }));
    assert_eq!(err.span(), Span::point(4));
}

#[test]
fn test_trailing_input() {
    let err = parse_err("a b");
    assert_eq!(err.to_string(), "expected end of expression, found identifier `b`");
    assert_eq!(err.span(), Span::new(2, 3));
}

#[test]
fn test_invalid_token() {
    let err = parse_err("a ~ b");
    assert_eq!(
        err,
        ParseError::InvalidToken {
            text: "~".to_string(),
            span: Span::new(2, 3),
        }
    );
}

#[test]
fn test_deep_parentheses() {
    let depth = 20_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(parse_ok(&source).kind, ExprKind::Literal(Literal::Int(1)));
}
