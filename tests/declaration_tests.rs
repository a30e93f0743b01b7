// Integration tests for declarations, typing and visibility

use scriptcore::interpreter::{ExecResult, ExitCause, Interpreter, Outcome, RuntimeError};
use scriptcore::memory::value::Value;
use scriptcore::syntax::ast::{BinOp, Stmt, TypeName, Visibility};
use scriptcore::syntax::build::*;

fn run(program: Vec<Stmt>) -> (Interpreter, Outcome) {
    let mut interp = Interpreter::default();
    let outcome = interp.run(&program).expect("program should not hit a structural error");
    (interp, outcome)
}

fn uncaught(outcome: &Outcome) -> (&str, &str) {
    assert_eq!(outcome.cause, ExitCause::Faulted);
    match &outcome.result {
        ExecResult::Exception(e) => (&e.class_name, &e.message),
        other => panic!("expected an exception result, got {:?}", other),
    }
}

#[test]
fn test_multiple_declarators_in_order() {
    // int a, b = 2, c = b + 1;
    let (interp, _) = run(vec![var_decl_many(
        TypeName::Int,
        vec![
            ("a", None),
            ("b", Some(int(2))),
            ("c", Some(binary(BinOp::Add, ident("b"), int(1)))),
        ],
    )]);
    assert_eq!(interp.variable("a"), Some(&Value::Int(0)));
    assert_eq!(interp.variable("b"), Some(&Value::Int(2)));
    assert_eq!(interp.variable("c"), Some(&Value::Int(3)));
}

#[test]
fn test_default_values_per_type() {
    let (interp, _) = run(vec![
        var_decl(TypeName::Bool, "b", None),
        var_decl(TypeName::Char, "c", None),
        var_decl(TypeName::String, "s", None),
        var_decl(TypeName::named("System.Exception"), "e", None),
        var_decl(TypeName::Var, "v", None),
    ]);
    assert_eq!(interp.variable("b"), Some(&Value::Bool(false)));
    assert_eq!(interp.variable("c"), Some(&Value::Char('\0')));
    assert_eq!(interp.variable("s"), Some(&Value::Str(String::new())));
    assert_eq!(interp.variable("e"), Some(&Value::Null));
    assert_eq!(interp.variable("v"), Some(&Value::Null));
}

#[test]
fn test_char_promotes_to_int_but_not_back() {
    let (interp, _) = run(vec![var_decl(TypeName::Int, "code", Some(chr('A')))]);
    assert_eq!(interp.variable("code"), Some(&Value::Int(65)));

    let (_, outcome) = run(vec![var_decl(TypeName::Char, "c", Some(int(65)))]);
    assert_eq!(uncaught(&outcome).0, "System.TypeIncompatibleException");
}

#[test]
fn test_var_accepts_any_value() {
    let (interp, _) = run(vec![
        var_decl(TypeName::Var, "v", Some(int(1))),
        expr_stmt(set("v", string("now a string"))),
    ]);
    assert_eq!(interp.variable("v"), Some(&Value::Str("now a string".to_string())));
}

#[test]
fn test_redeclaration_in_nested_scope_conflicts() {
    let (_, outcome) = run(vec![
        var_decl(TypeName::Int, "x", Some(int(1))),
        block(vec![var_decl(TypeName::Int, "x", Some(int(2)))]),
    ]);
    assert_eq!(uncaught(&outcome).0, "System.Lang.NamespaceConflictException");
}

#[test]
fn test_sibling_blocks_may_reuse_a_name() {
    let (interp, outcome) = run(vec![
        block(vec![var_decl(TypeName::Int, "tmp", Some(int(1)))]),
        block(vec![var_decl(TypeName::Int, "tmp", Some(int(2)))]),
    ]);
    assert_eq!(outcome.cause, ExitCause::Through);
    assert!(interp.variable("tmp").is_none());
}

#[test]
fn test_capitalized_variable_conflicts_with_type() {
    let (_, outcome) = run(vec![
        class_decl("Point", None),
        var_decl(TypeName::Int, "Point", Some(int(1))),
    ]);
    let (class, message) = uncaught(&outcome);
    assert_eq!(class, "System.Lang.NamespaceConflictException");
    assert!(message.contains("Point"));
}

#[test]
fn test_local_variable_conflicts_with_function_name() {
    let helper = function("helper", None, vec![], vec![]);
    let user = function(
        "user",
        None,
        vec![],
        vec![var_decl(TypeName::Int, "helper", Some(int(1)))],
    );
    let (mut interp, _) = run(vec![helper, user]);
    match interp.call_function("user", vec![]) {
        Err(RuntimeError::Exception(e)) => {
            assert_eq!(e.class_name, "System.Lang.NamespaceConflictException")
        }
        other => panic!("expected a namespace conflict, got {:?}", other),
    }
}

#[test]
fn test_function_redeclaration_conflicts() {
    let (_, outcome) = run(vec![
        function("twice", None, vec![], vec![]),
        function("twice", None, vec![], vec![]),
    ]);
    assert_eq!(uncaught(&outcome).0, "System.Lang.NamespaceConflictException");
}

#[test]
fn test_void_variable_is_structural() {
    let mut interp = Interpreter::default();
    let err = interp
        .run(&[var_decl(TypeName::Void, "nothing", None)])
        .unwrap_err();
    assert!(matches!(err, RuntimeError::VoidVariable { ref name, .. } if name == "nothing"));
}

#[test]
fn test_void_parameter_is_structural() {
    let mut interp = Interpreter::default();
    let err = interp
        .run(&[function("f", None, vec![(TypeName::Void, "p")], vec![])])
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::VoidParameter { ref function, ref name, .. } if function == "f" && name == "p"
    ));
}

#[test]
fn test_void_initializer_raises_runtime_check() {
    let (_, outcome) = run(vec![
        function("nothing", Some(TypeName::Void), vec![], vec![]),
        var_decl(TypeName::Var, "v", Some(call("nothing", vec![]))),
    ]);
    assert_eq!(uncaught(&outcome).0, "System.RuntimeCheckException");
}

#[test]
fn test_unknown_type_raises_undefined_symbol() {
    let (_, outcome) = run(vec![var_decl(TypeName::named("Missing"), "m", None)]);
    assert_eq!(uncaught(&outcome).0, "System.UndefinedSymbolException");
}

#[test]
fn test_internal_class_hidden_from_other_modules() {
    let mut interp = Interpreter::default();
    interp
        .register_class("Secret", None, "vault", Visibility::Internal)
        .unwrap();

    let outcome = interp
        .run(&[var_decl(TypeName::named("Secret"), "s", None)])
        .unwrap();
    assert_eq!(uncaught(&outcome).0, "System.IllegalAccessException");

    interp.set_module("vault");
    let outcome = interp
        .run(&[var_decl(TypeName::named("Secret"), "s", None)])
        .unwrap();
    assert_eq!(outcome.cause, ExitCause::Through);
}

#[test]
fn test_class_definition_not_allowed_in_function() {
    let mut interp = Interpreter::default();
    interp
        .run(&[function("f", None, vec![], vec![class_decl("Inner", None)])])
        .unwrap();
    let err = interp.call_function("f", vec![]).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::IllegalContext { ref construct, .. } if construct == "class definition"
    ));
}

#[test]
fn test_host_registered_enum_is_usable() {
    let mut interp = Interpreter::default();
    interp.register_enum("Level", &["LOW", "HIGH"]).unwrap();
    interp
        .run(&[var_decl(
            TypeName::named("Level"),
            "lvl",
            Some(enum_const("Level", "HIGH")),
        )])
        .unwrap();
    match interp.variable("lvl") {
        Some(Value::Enum(e)) => assert_eq!((e.ordinal, e.literal.as_str()), (1, "HIGH")),
        other => panic!("expected enum value, got {:?}", other),
    }
}

#[test]
fn test_globals_visible_inside_functions() {
    let bump = function(
        "bump",
        None,
        vec![],
        vec![expr_stmt(add_assign("total", int(5)))],
    );
    let (interp, _) = run(vec![
        var_decl(TypeName::Int, "total", Some(int(1))),
        bump,
        expr_stmt(call("bump", vec![])),
        expr_stmt(call("bump", vec![])),
    ]);
    assert_eq!(interp.variable("total"), Some(&Value::Int(11)));
}

#[test]
fn test_integer_overflow_raises_arithmetic() {
    let (_, outcome) = run(vec![var_decl(
        TypeName::Int,
        "big",
        Some(binary(BinOp::Add, int(i32::MAX), int(1))),
    )]);
    assert_eq!(uncaught(&outcome).0, "System.ArithmeticException");
}
