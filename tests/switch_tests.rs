// Integration tests for switch statements

use scriptcore::interpreter::{ExitCause, Interpreter, Outcome};
use scriptcore::memory::value::Value;
use scriptcore::syntax::ast::{BinOp, CaseLabel, Expr, Stmt, TypeName};
use scriptcore::syntax::build::*;

fn run(program: Vec<Stmt>) -> (Interpreter, Outcome) {
    let mut interp = Interpreter::default();
    let outcome = interp.run(&program).expect("program should not hit a structural error");
    (interp, outcome)
}

fn assign_a(value: i32) -> Stmt {
    expr_stmt(set("a", int(value)))
}

/// switch (selector) { case 1: a=1; case 2: a=2; case 3: a=3; break; default: a=9; }
fn numbered_switch(selector: Expr) -> Vec<Stmt> {
    vec![
        var_decl(TypeName::Int, "a", Some(int(0))),
        switch(
            selector,
            vec![
                case(CaseLabel::Int(1), vec![assign_a(1)]),
                case(CaseLabel::Int(2), vec![assign_a(2)]),
                case(CaseLabel::Int(3), vec![assign_a(3), break_stmt()]),
            ],
            Some(vec![assign_a(9)]),
        ),
    ]
}

#[test]
fn test_fallthrough_stops_at_break() {
    let (interp, outcome) = run(numbered_switch(int(2)));
    assert_eq!(outcome.cause, ExitCause::Through);
    assert_eq!(interp.variable("a"), Some(&Value::Int(3)));
}

#[test]
fn test_default_runs_when_nothing_matches() {
    let (interp, _) = run(numbered_switch(int(42)));
    assert_eq!(interp.variable("a"), Some(&Value::Int(9)));
}

#[test]
fn test_default_runs_after_falling_off_the_end() {
    // switch (1) { case 1: a += 1; default: a += 10; }
    let (interp, _) = run(vec![
        var_decl(TypeName::Int, "a", Some(int(0))),
        switch(
            int(1),
            vec![case(CaseLabel::Int(1), vec![expr_stmt(add_assign("a", int(1)))])],
            Some(vec![expr_stmt(add_assign("a", int(10)))]),
        ),
    ]);
    assert_eq!(interp.variable("a"), Some(&Value::Int(11)));
}

#[test]
fn test_label_must_match_selector_type() {
    // A char label never matches an int selector, even with the same code point
    let (interp, _) = run(vec![
        var_decl(TypeName::Int, "a", Some(int(0))),
        switch(
            int(65),
            vec![case(CaseLabel::Char('A'), vec![assign_a(1), break_stmt()])],
            Some(vec![assign_a(2)]),
        ),
    ]);
    assert_eq!(interp.variable("a"), Some(&Value::Int(2)));
}

#[test]
fn test_string_selector() {
    let (interp, _) = run(vec![
        var_decl(TypeName::Int, "a", Some(int(0))),
        switch(
            string("beta"),
            vec![
                case(CaseLabel::Str("alpha".to_string()), vec![assign_a(1), break_stmt()]),
                case(CaseLabel::Str("beta".to_string()), vec![assign_a(2), break_stmt()]),
            ],
            None,
        ),
    ]);
    assert_eq!(interp.variable("a"), Some(&Value::Int(2)));
}

#[test]
fn test_enum_selector_matches_literal_name() {
    let (interp, _) = run(vec![
        enum_decl("Color", &["RED", "GREEN", "BLUE"]),
        var_decl(TypeName::named("Color"), "c", Some(enum_const("Color", "GREEN"))),
        var_decl(TypeName::Int, "a", Some(int(0))),
        switch(
            ident("c"),
            vec![
                case(CaseLabel::Ident("RED".to_string()), vec![assign_a(1), break_stmt()]),
                case(CaseLabel::Ident("GREEN".to_string()), vec![assign_a(2), break_stmt()]),
                case(CaseLabel::Ident("BLUE".to_string()), vec![assign_a(3), break_stmt()]),
            ],
            None,
        ),
    ]);
    assert_eq!(interp.variable("a"), Some(&Value::Int(2)));
}

#[test]
fn test_enum_selector_matches_string_label() {
    let (interp, _) = run(vec![
        enum_decl("Color", &["RED", "GREEN", "BLUE"]),
        var_decl(TypeName::named("Color"), "c", Some(enum_const("Color", "BLUE"))),
        var_decl(TypeName::Int, "a", Some(int(0))),
        switch(
            ident("c"),
            vec![
                case(CaseLabel::Str("RED".to_string()), vec![assign_a(1), break_stmt()]),
                case(CaseLabel::Str("BLUE".to_string()), vec![assign_a(3), break_stmt()]),
            ],
            Some(vec![assign_a(9)]),
        ),
    ]);
    assert_eq!(interp.variable("a"), Some(&Value::Int(3)));
}

#[test]
fn test_typeof_label() {
    let (interp, _) = run(vec![
        var_decl(TypeName::Int, "a", Some(int(0))),
        switch(
            type_of(TypeName::named("System.Exception")),
            vec![
                case(CaseLabel::TypeOf(TypeName::Int), vec![assign_a(1), break_stmt()]),
                case(
                    CaseLabel::TypeOf(TypeName::named("System.Exception")),
                    vec![assign_a(2), break_stmt()],
                ),
            ],
            None,
        ),
    ]);
    assert_eq!(interp.variable("a"), Some(&Value::Int(2)));
}

#[test]
fn test_continue_in_switch_reaches_enclosing_loop() {
    // for (int i = 0; i < 4; i++) { switch (i) { case 1: continue; default: sum += i; } }
    let (interp, outcome) = run(vec![
        var_decl(TypeName::Int, "sum", Some(int(0))),
        counting_loop(
            "i",
            0,
            4,
            vec![switch(
                ident("i"),
                vec![case(CaseLabel::Int(1), vec![continue_stmt()])],
                Some(vec![expr_stmt(add_assign("sum", ident("i")))]),
            )],
        ),
    ]);
    assert_eq!(outcome.cause, ExitCause::Through);
    assert_eq!(interp.variable("sum"), Some(&Value::Int(5)));
}

#[test]
fn test_return_in_switch_leaves_function() {
    let classify = function(
        "classify",
        Some(TypeName::String),
        vec![(TypeName::Int, "n")],
        vec![
            switch(
                binary(BinOp::Mod, ident("n"), int(2)),
                vec![case(CaseLabel::Int(0), vec![return_stmt(Some(string("even")))])],
                Some(vec![return_stmt(Some(string("odd")))]),
            ),
            return_stmt(Some(string("unreachable"))),
        ],
    );
    let (mut interp, _) = run(vec![classify]);
    assert_eq!(
        interp.call_function("classify", vec![Value::Int(4)]).unwrap(),
        Value::Str("even".to_string())
    );
    assert_eq!(
        interp.call_function("classify", vec![Value::Int(7)]).unwrap(),
        Value::Str("odd".to_string())
    );
}

#[test]
fn test_switch_body_scope_is_released() {
    let mut interp = Interpreter::default();
    let depth = interp.scope_depth();
    interp
        .run(&[switch(
            int(1),
            vec![case(
                CaseLabel::Int(1),
                vec![var_decl(TypeName::Int, "local", Some(int(5))), break_stmt()],
            )],
            None,
        )])
        .unwrap();
    assert_eq!(interp.scope_depth(), depth);
    assert!(interp.variable("local").is_none());
}

#[test]
fn test_case_local_not_visible_after_switch() {
    // switch (1) { case 1: int local = 5; } int local = 7; int copy = local;
    let (interp, outcome) = run(vec![
        switch(
            int(1),
            vec![case(
                CaseLabel::Int(1),
                vec![var_decl(TypeName::Int, "local", Some(int(5)))],
            )],
            None,
        ),
        var_decl(TypeName::Int, "local", Some(int(7))),
        var_decl(TypeName::Int, "copy", Some(ident("local"))),
    ]);
    assert_eq!(outcome.cause, ExitCause::Through);
    assert_eq!(interp.variable("copy"), Some(&Value::Int(7)));
}

#[test]
fn test_default_shares_case_scope() {
    // switch (1) { case 1: int shared = 1; default: seen = shared + 3; }
    // The case falls off its end, so default runs in the same scope and sees `shared`
    let (interp, outcome) = run(vec![
        var_decl(TypeName::Int, "seen", Some(int(0))),
        switch(
            int(1),
            vec![case(
                CaseLabel::Int(1),
                vec![var_decl(TypeName::Int, "shared", Some(int(1)))],
            )],
            Some(vec![expr_stmt(set("seen", binary(BinOp::Add, ident("shared"), int(3))))]),
        ),
    ]);
    assert_eq!(outcome.cause, ExitCause::Through);
    assert_eq!(interp.variable("seen"), Some(&Value::Int(4)));
    assert!(interp.variable("shared").is_none());
}
