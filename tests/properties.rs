mod utils;

use petal_infer::{infer, BinaryOp, Builtin, FunDef, Node, Options, Program, StructDef, Type, TypeErrorKind};
use utils::*;

fn add2() -> FunDef {
    FunDef::new("add2", ["x", "y"], vec![Node::ret(Node::add(Node::ident("x"), Node::ident("y")))])
}

fn calling_add2(args: Vec<Node>) -> Program {
    Program::new([add2(), main_fn(vec![Node::ret(Node::call(Node::ident("add2"), args))])])
}

fn two_structs_with_x() -> [StructDef; 2] {
    [
        StructDef::new("Point", [("x", Type::Int), ("y", Type::Int)]),
        StructDef::new("Label", [("x", Type::String)]),
    ]
}

#[test]
fn inference_is_deterministic() {
    let program = Program::new([
        nullary("count", vec![Node::yield_(Node::int(1))]),
        main_fn(vec![
            Node::assign(Node::ident("arr"), Node::Array(vec![Node::int(5)])),
            Node::ret(Node::builtin(Builtin::Next, [Node::call(Node::ident("count"), [])])),
        ]),
    ]);
    let first = infer_default(&program).unwrap();
    let second = infer_default(&program).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.get(&Node::ident("arr")), first.get(&Node::ident("arr")));
}

#[test]
fn addition_accepts_ints_floats_and_strings() {
    let floats = Node::add(Node::float(1.5), Node::float(2.5));
    let strings = Node::add(Node::str("a"), Node::str("b"));
    let program = Program::new([
        nullary("floats", vec![Node::ret(floats.clone())]),
        nullary("strings", vec![Node::ret(strings.clone())]),
        main_fn(vec![Node::ret(Node::add(Node::int(1), Node::int(2)))]),
    ]);
    let table = infer_default(&program).unwrap();

    assert_eq!(table.get(&floats), Some(&Type::Float));
    assert_eq!(table.get(&strings), Some(&Type::String));
    assert_eq!(table.function("strings"), Some(&Type::function([], Type::String)));
    assert_eq!(table.get(&Node::add(Node::int(1), Node::int(2))), Some(&Type::Int));
}

#[test]
fn calls_must_match_the_parameter_count() {
    let table = infer_default(&calling_add2(vec![Node::int(1), Node::int(2)])).unwrap();
    assert_eq!(table.function("add2"), Some(&Type::function([Type::Int, Type::Int], Type::Int)));

    for args in [vec![Node::int(1)], vec![Node::int(1), Node::int(2), Node::int(3)]] {
        let kind = error_kind(&calling_add2(args));
        assert!(matches!(kind, TypeErrorKind::ArityMismatch(..)), "{kind}");
    }
}

#[test]
fn builtins_check_their_argument_count() {
    let program = Program::new([main_fn(vec![Node::ret(Node::builtin(Builtin::Len, []))])]);
    assert_eq!(error_kind(&program), TypeErrorKind::ArityMismatch(0, 1));
}

#[test]
fn self_application_terminates() {
    let program = Program::new([
        FunDef::new("apply_self", ["f"], vec![Node::ret(Node::call(Node::ident("f"), [Node::ident("f")]))]),
        main_fn(vec![Node::ret(Node::int(0))]),
    ]);
    let kind = error_kind(&program);
    assert!(matches!(kind, TypeErrorKind::CategoryViolation(_)), "{kind}");
}

#[test]
fn argument_type_picks_the_struct() {
    let access = Node::access(Node::ident("p"), "x");
    let [point, label] = two_structs_with_x();
    let program = Program::new([
        FunDef::new("get_x", ["p"], vec![Node::ret(access.clone())]),
        main_fn(vec![
            Node::assign(Node::ident("shown"), Node::call(Node::ident("get_x"), [Node::call(Node::ident("Label"), [Node::str("s")])])),
            Node::ret(Node::int(0)),
        ]),
    ])
    .with_struct(point)
    .with_struct(label);
    let table = infer_default(&program).unwrap();

    assert_eq!(table.get(&access), Some(&Type::String));
    assert_eq!(table.get(&Node::ident("shown")), Some(&Type::String));
}

#[test]
fn shared_field_without_usage_is_ambiguous() {
    let [point, label] = two_structs_with_x();
    let program = Program::new([
        FunDef::new("get_x", ["p"], vec![Node::ret(Node::access(Node::ident("p"), "x"))]),
        main_fn(vec![Node::ret(Node::int(0))]),
    ])
    .with_struct(point)
    .with_struct(label);
    let error = infer_default(&program).unwrap_err();
    assert_eq!(
        error.kind,
        TypeErrorKind::UnresolvedField("x".into(), vec!["Point".into(), "Label".into()])
    );
}

#[test]
fn several_ambiguous_fields_report_the_same_one_every_time() {
    let program = Program::new([
        FunDef::new("gx", ["p"], vec![Node::ret(Node::access(Node::ident("p"), "x"))]),
        FunDef::new("gy", ["q"], vec![Node::ret(Node::access(Node::ident("q"), "y"))]),
    ])
    .with_struct(StructDef::new("A", [("x", Type::Int), ("y", Type::Int)]))
    .with_struct(StructDef::new("B", [("x", Type::String), ("y", Type::String)]));

    let first = infer_default(&program).unwrap_err();
    assert_eq!(first.kind, TypeErrorKind::UnresolvedField("x".into(), vec!["A".into(), "B".into()]));
    for _ in 0..50 {
        assert_eq!(infer_default(&program).unwrap_err(), first);
    }
}

#[test]
fn unknown_field_has_no_candidates() {
    let [point, label] = two_structs_with_x();
    let program = Program::new([
        FunDef::new("get_z", ["q"], vec![Node::ret(Node::access(Node::ident("q"), "z"))]),
        main_fn(vec![Node::ret(Node::int(0))]),
    ])
    .with_struct(point)
    .with_struct(label);
    let kind = error_kind(&program);
    assert!(matches!(kind, TypeErrorKind::UnresolvedField(ref field, _) if field == "z"), "{kind}");
}

#[test]
fn never_resolved_subscript_is_under_constrained() {
    let program = Program::new([
        FunDef::new("first", ["t"], vec![Node::ret(Node::index(Node::ident("t"), Node::int(0)))]),
        main_fn(vec![Node::ret(Node::int(0))]),
    ]);
    let kind = error_kind(&program);
    assert!(matches!(kind, TypeErrorKind::UnderConstrained(_)), "{kind}");
}

#[test]
fn subscripting_a_string_yields_bytes() {
    let program = Program::new([nullary(
        "initial",
        vec![
            Node::assign(Node::ident("s"), Node::str("abc")),
            Node::ret(Node::index(Node::ident("s"), Node::int(0))),
        ],
    )]);
    let table = infer_default(&program).unwrap();
    assert_eq!(table.function("initial"), Some(&Type::function([], Type::Byte)));
}

#[test]
fn tuple_access_past_the_end_mismatches() {
    let program = Program::new([nullary(
        "third",
        vec![
            Node::assign(Node::ident("pair"), Node::Tuple(vec![Node::int(1), Node::int(2)])),
            Node::ret(Node::tuple_access(Node::ident("pair"), 5)),
        ],
    )]);
    let kind = error_kind(&program);
    assert!(matches!(kind, TypeErrorKind::TypeMismatch(..)), "{kind}");
}

#[test]
fn operators_outside_their_category_are_rejected() {
    let cases = [
        Node::add(Node::bool(true), Node::bool(false)),
        Node::binary(BinaryOp::Lt, Node::str("a"), Node::str("b")),
        Node::binary(BinaryOp::Mod, Node::float(5.5), Node::float(2.0)),
        Node::builtin(Builtin::Len, [Node::int(5)]),
    ];
    for case in cases {
        let program = Program::new([nullary("check", vec![Node::ret(case.clone())])]);
        let kind = error_kind(&program);
        assert!(matches!(kind, TypeErrorKind::CategoryViolation(_)), "{case}: {kind}");
    }
}

#[test]
fn void_results_cannot_be_used_as_values() {
    let program = Program::new([
        nullary("noop", vec![Node::assign(Node::ident("unused"), Node::int(1))]),
        main_fn(vec![Node::assign(Node::ident("y"), Node::call(Node::ident("noop"), [])), Node::ret(Node::int(0))]),
    ]);
    assert_eq!(
        infer_default(&program).unwrap_err().to_string(),
        "void type used as value in 'noop()'"
    );
}

#[test]
fn literals_are_not_assignable() {
    let program = Program::new([nullary("store", vec![Node::assign(Node::int(1), Node::int(2))])]);
    let kind = error_kind(&program);
    assert!(matches!(kind, TypeErrorKind::CategoryViolation(_)), "{kind}");
}

#[test]
fn void_struct_members_are_rejected() {
    let program = Program::new([main_fn(vec![Node::ret(Node::int(0))])]).with_struct(StructDef::new("Hollow", [("v", Type::Void)]));
    let kind = error_kind(&program);
    assert!(matches!(kind, TypeErrorKind::CategoryViolation(_)), "{kind}");
}

#[test]
fn hints_seed_identifiers_and_functions() {
    let program = Program::new([
        FunDef::new("size", ["xs"], vec![Node::ret(Node::builtin(Builtin::Len, [Node::ident("xs")]))]),
        FunDef::new("id", ["v"], vec![Node::ret(Node::ident("v"))]).with_hint(Type::function([Type::Int], Type::Unconstrained)),
    ])
    .with_hint("xs", Type::array(Type::Float));
    let table = infer_default(&program).unwrap();

    assert_eq!(table.function("size"), Some(&Type::function([Type::array(Type::Float)], Type::Int)));
    assert_eq!(table.function("id"), Some(&Type::function([Type::Int], Type::Int)));
}

#[test]
fn conflicting_hint_mismatches() {
    let program = Program::new([
        FunDef::new("id", ["v"], vec![Node::ret(Node::ident("v"))]).with_hint(Type::function([Type::Int], Type::String)),
    ]);
    let kind = error_kind(&program);
    assert!(matches!(kind, TypeErrorKind::TypeMismatch(..)), "{kind}");
}

#[test]
fn entry_point_returns_int() {
    let program = Program::new([nullary("start", vec![Node::assign(Node::ident("x"), Node::int(1))])]);

    let table = infer(&program, &Options::with_entry_point("start")).unwrap();
    assert_eq!(table.function("start"), Some(&Type::function([], Type::Int)));

    let table = infer_default(&program).unwrap();
    assert_eq!(table.function("start"), Some(&Type::function([], Type::Void)));
}
