// Integration tests for for-each iteration and sync blocks

use scriptcore::interpreter::{ExecResult, ExitCause, Interpreter, Outcome};
use scriptcore::memory::value::{ObjRef, Value};
use scriptcore::syntax::ast::{BinOp, Stmt, TypeName};
use scriptcore::syntax::build::*;

const LIST: &str = "System.Collection.List";
const LOCK: &str = "System.Concurrency.Lock";

fn run(program: Vec<Stmt>) -> (Interpreter, Outcome) {
    let mut interp = Interpreter::default();
    let outcome = interp.run(&program).expect("program should not hit a structural error");
    (interp, outcome)
}

fn object(interp: &Interpreter, name: &str) -> ObjRef {
    match interp.variable(name) {
        Some(Value::Object(obj)) => *obj,
        other => panic!("expected object in '{}', got {:?}", name, other),
    }
}

fn uncaught_class(outcome: &Outcome) -> &str {
    assert_eq!(outcome.cause, ExitCause::Faulted);
    match &outcome.result {
        ExecResult::Exception(e) => &e.class_name,
        other => panic!("expected an exception result, got {:?}", other),
    }
}

/// `System.Collection.List list = new System.Collection.List(); list.add(1); ...`
fn list_of(values: &[i32]) -> Vec<Stmt> {
    let mut program = vec![var_decl(
        TypeName::named(LIST),
        "list",
        Some(new_object(TypeName::named(LIST), vec![])),
    )];
    for v in values {
        program.push(expr_stmt(method(ident("list"), "add", vec![int(*v)])));
    }
    program
}

#[test]
fn test_for_each_over_array() {
    let (interp, _) = run(vec![
        var_decl(
            TypeName::array_of(TypeName::Int),
            "arr",
            Some(array(TypeName::Int, vec![int(1), int(2), int(3)])),
        ),
        var_decl(TypeName::Int, "sum", Some(int(0))),
        for_each(
            TypeName::Int,
            "v",
            ident("arr"),
            vec![expr_stmt(add_assign("sum", ident("v")))],
        ),
    ]);
    assert_eq!(interp.variable("sum"), Some(&Value::Int(6)));
    assert!(interp.variable("v").is_none());
}

#[test]
fn test_for_each_over_string_yields_chars() {
    let (interp, _) = run(vec![
        var_decl(TypeName::String, "out", Some(string(""))),
        for_each(
            TypeName::Char,
            "c",
            string("abc"),
            vec![expr_stmt(set("out", binary(BinOp::Add, ident("c"), ident("out"))))],
        ),
    ]);
    assert_eq!(interp.variable("out"), Some(&Value::Str("cba".to_string())));
}

#[test]
fn test_for_each_break_and_continue() {
    let mut program = list_of(&[1, 2, 3, 4, 5]);
    program.push(var_decl(TypeName::Int, "sum", Some(int(0))));
    program.push(for_each(
        TypeName::Int,
        "v",
        ident("list"),
        vec![
            if_single(binary(BinOp::Eq, ident("v"), int(2)), continue_stmt()),
            if_single(binary(BinOp::Eq, ident("v"), int(4)), break_stmt()),
            expr_stmt(add_assign("sum", ident("v"))),
        ],
    ));
    let (interp, outcome) = run(program);

    assert_eq!(outcome.cause, ExitCause::Through);
    assert_eq!(interp.variable("sum"), Some(&Value::Int(4)));
    let list = interp.heap().list(object(&interp, "list")).unwrap();
    assert_eq!(list.active_views, 0);
    assert_eq!(list.views_opened, 1);
    assert_eq!(list.views_closed, 1);
}

#[test]
fn test_view_disposed_once_when_body_throws() {
    let mut program = list_of(&[1, 2, 3]);
    program.push(var_decl(TypeName::Int, "seen", Some(int(0))));
    program.push(try_stmt(
        vec![for_each(
            TypeName::Int,
            "v",
            ident("list"),
            vec![
                expr_stmt(post_inc("seen")),
                if_single(
                    binary(BinOp::Eq, ident("v"), int(2)),
                    throw_new("System.Exception", "stop"),
                ),
            ],
        )],
        vec![catch("System.Exception", "e", vec![])],
        None,
    ));
    let (interp, outcome) = run(program);

    assert_eq!(outcome.cause, ExitCause::Through);
    assert_eq!(interp.variable("seen"), Some(&Value::Int(2)));
    let list = interp.heap().list(object(&interp, "list")).unwrap();
    assert_eq!(list.views_opened, 1);
    assert_eq!(list.views_closed, 1);
    assert_eq!(list.active_views, 0);
}

#[test]
fn test_list_rejects_modification_while_iterated() {
    let mut program = list_of(&[1, 2]);
    program.push(var_decl(TypeName::Bool, "rejected", Some(boolean(false))));
    program.push(try_stmt(
        vec![for_each(
            TypeName::Int,
            "v",
            ident("list"),
            vec![expr_stmt(method(ident("list"), "add", vec![int(99)]))],
        )],
        vec![catch(
            "System.Collection.ConcurrentModificationException",
            "e",
            vec![expr_stmt(set("rejected", boolean(true)))],
        )],
        None,
    ));
    // Once the loop is over the list accepts changes again
    program.push(expr_stmt(method(ident("list"), "add", vec![int(3)])));
    let (interp, _) = run(program);

    assert_eq!(interp.variable("rejected"), Some(&Value::Bool(true)));
    let list = interp.heap().list(object(&interp, "list")).unwrap();
    assert_eq!(list.items, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_for_each_over_null_raises_null_reference() {
    let (_, outcome) = run(vec![
        var_decl(TypeName::named(LIST), "list", Some(null())),
        for_each(TypeName::Int, "v", ident("list"), vec![]),
    ]);
    assert_eq!(uncaught_class(&outcome), "System.NullReferenceException");
}

#[test]
fn test_for_each_over_int_is_not_iterable() {
    let (interp, outcome) = run(vec![for_each(TypeName::Int, "v", int(5), vec![])]);
    assert_eq!(uncaught_class(&outcome), "System.RuntimeCheckException");
    assert_eq!(interp.scope_depth(), 1);
}

#[test]
fn test_sync_locks_and_unlocks_around_body() {
    let (interp, outcome) = run(vec![
        var_decl(
            TypeName::named(LOCK),
            "l",
            Some(new_object(TypeName::named(LOCK), vec![])),
        ),
        var_decl(TypeName::Int, "n", Some(int(0))),
        sync(ident("l"), vec![expr_stmt(post_inc("n"))]),
    ]);
    assert_eq!(outcome.cause, ExitCause::Through);
    assert_eq!(interp.variable("n"), Some(&Value::Int(1)));
    let lock = interp.heap().lock(object(&interp, "l")).unwrap();
    assert_eq!((lock.acquisitions, lock.releases, lock.depth), (1, 1, 0));
}

#[test]
fn test_sync_unlocks_when_body_throws() {
    let (interp, _) = run(vec![
        var_decl(
            TypeName::named(LOCK),
            "l",
            Some(new_object(TypeName::named(LOCK), vec![])),
        ),
        try_stmt(
            vec![sync(ident("l"), vec![throw_new("System.Exception", "inside")])],
            vec![catch("System.Exception", "e", vec![])],
            None,
        ),
    ]);
    let lock = interp.heap().lock(object(&interp, "l")).unwrap();
    assert_eq!((lock.acquisitions, lock.releases, lock.depth), (1, 1, 0));
}

#[test]
fn test_sync_unlocks_on_return_and_is_reentrant() {
    // int f(System.Concurrency.Lock l) { sync (l) { sync (l) { return 5; } } }
    let f = function(
        "f",
        Some(TypeName::Int),
        vec![(TypeName::named(LOCK), "l")],
        vec![sync(
            ident("l"),
            vec![sync(ident("l"), vec![return_stmt(Some(int(5)))])],
        )],
    );
    let (interp, _) = run(vec![
        f,
        var_decl(
            TypeName::named(LOCK),
            "shared",
            Some(new_object(TypeName::named(LOCK), vec![])),
        ),
        var_decl(TypeName::Int, "r", Some(call("f", vec![ident("shared")]))),
    ]);
    assert_eq!(interp.variable("r"), Some(&Value::Int(5)));
    let lock = interp.heap().lock(object(&interp, "shared")).unwrap();
    assert_eq!((lock.acquisitions, lock.releases, lock.depth), (2, 2, 0));
}

#[test]
fn test_sync_on_null_raises_null_reference() {
    let (_, outcome) = run(vec![
        var_decl(TypeName::named(LOCK), "l", Some(null())),
        sync(ident("l"), vec![]),
    ]);
    assert_eq!(uncaught_class(&outcome), "System.NullReferenceException");
}

#[test]
fn test_sync_on_non_lock_raises_runtime_check() {
    let (_, outcome) = run(vec![sync(string("not a lock"), vec![])]);
    assert_eq!(uncaught_class(&outcome), "System.RuntimeCheckException");
}

#[test]
fn test_unlock_failure_inside_sync_takes_precedence() {
    // sync (l) { l.unlock(); throw ... }: the sync's own unlock finds the lock free
    let (interp, outcome) = run(vec![
        var_decl(
            TypeName::named(LOCK),
            "l",
            Some(new_object(TypeName::named(LOCK), vec![])),
        ),
        sync(
            ident("l"),
            vec![
                expr_stmt(method(ident("l"), "unlock", vec![])),
                throw_new("System.Exception", "body"),
            ],
        ),
    ]);
    assert_eq!(uncaught_class(&outcome), "System.Concurrency.LockStateException");
    let lock = interp.heap().lock(object(&interp, "l")).unwrap();
    assert_eq!(lock.depth, 0);
}
