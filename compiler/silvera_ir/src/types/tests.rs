use pretty_assertions::assert_eq;

use super::*;

fn parse(text: &str) -> TypeRef {
    TypeRef::parse(text, Span::DUMMY).unwrap()
}

#[test]
fn test_primitives() {
    for p in Primitive::ALL {
        assert_eq!(parse(p.as_str()), TypeRef::Primitive(p));
    }
    assert_eq!(Primitive::from_name("string"), None);
}

#[test]
fn test_nested_collections() {
    let ty = parse("list< dict<str, set<Order>> >");
    assert_eq!(ty.to_string(), "list<dict<str, set<Order>>>");
    assert!(ty.is_collection());
    assert!(!ty.is_resolved());
    assert!(!ty.is_primitive_only());
    assert!(parse("dict<i64, list<date>>").is_primitive_only());
}

#[test]
fn test_user_name_keeps_span() {
    let span = Span::new(4, 9);
    let ty = TypeRef::parse("Order", span).unwrap();
    let TypeRef::User(Ref::Unresolved(symbol)) = ty else {
        panic!("expected an unresolved user type");
    };
    assert_eq!(symbol.name, "Order");
    assert_eq!(symbol.span, span);
}

#[test]
fn test_syntax_errors() {
    let err = TypeRef::parse("list<str", Span::DUMMY).unwrap_err();
    assert_eq!(err.reason, "expected `>`");
    assert_eq!(err.offset, 8);

    let err = TypeRef::parse("dict<str>", Span::DUMMY).unwrap_err();
    assert_eq!(err.reason, "expected `,`");

    let err = TypeRef::parse("str extra", Span::DUMMY).unwrap_err();
    assert_eq!(err.reason, "unexpected trailing input");

    assert!(TypeRef::parse("", Span::DUMMY).is_err());
}

#[test]
fn test_nesting_limit() {
    let nested = |depth: usize| format!("{}str{}", "list<".repeat(depth), ">".repeat(depth));

    let ty = parse(&nested(MAX_TYPE_NESTING));
    assert!(ty.is_primitive_only());

    let err = TypeRef::parse(&nested(MAX_TYPE_NESTING + 1), Span::DUMMY).unwrap_err();
    assert_eq!(err.reason, format!("collections nested deeper than {MAX_TYPE_NESTING} levels"));

    let err = TypeRef::parse(&nested(100_000), Span::DUMMY).unwrap_err();
    assert!(err.reason.starts_with("collections nested deeper"));
}

#[test]
fn test_user_slots_and_visit_order() {
    let mut ty = parse("dict<Key, list<Value>>");
    let mut next = 0;
    ty.for_each_user_slot(&mut |slot| -> Result<(), ()> {
        *slot = Ref::Resolved(TypeDefId::new(next));
        next += 1;
        Ok(())
    })
    .unwrap();
    assert!(ty.is_resolved());
    assert_eq!(ty.to_string(), "dict<#0, list<#1>>");

    let mut seen = Vec::new();
    ty.for_each_user_type(&mut |id| seen.push(id));
    assert_eq!(seen, vec![TypeDefId::new(0), TypeDefId::new(1)]);
}

#[test]
fn test_slot_error_stops_walk() {
    let mut ty = parse("dict<A, B>");
    let mut visited = 0;
    let result = ty.for_each_user_slot(&mut |_| {
        visited += 1;
        Err("stop")
    });
    assert_eq!(result, Err("stop"));
    assert_eq!(visited, 1);
}
