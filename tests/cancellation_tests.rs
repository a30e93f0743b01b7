// Integration tests for cooperative cancellation

use scriptcore::config::{CancellationConfig, EngineConfig};
use scriptcore::interpreter::{CancellationHandle, ExitCause, Interpreter, RuntimeError};
use scriptcore::memory::value::Value;
use scriptcore::syntax::ast::TypeName;
use scriptcore::syntax::build::*;
use std::thread;
use std::time::Duration;

/// Check the flag on every expression statement
fn eager_config() -> EngineConfig {
    EngineConfig {
        cancellation: CancellationConfig {
            expression_batch: 1,
            empty_statement_batch: 1,
            check_interval_ms: 0,
            expression_ceiling: 1,
        },
        ..Default::default()
    }
}

#[test]
fn test_cancel_from_another_thread_aborts_infinite_loop() {
    let mut interp = Interpreter::new(eager_config()).with_thread_name("worker");
    let handle = interp.cancellation_handle();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        handle.cancel();
    });

    let err = interp
        .run(&[while_loop(boolean(true), vec![])])
        .unwrap_err();
    canceller.join().unwrap();

    assert!(matches!(err, RuntimeError::Aborted { ref thread } if thread == "worker"));
    assert!(!err.is_structural());
    assert_eq!(interp.scope_depth(), 1);
}

#[test]
fn test_abort_skips_catch_and_finally() {
    let mut interp = Interpreter::new(eager_config());
    interp
        .run(&[var_decl(TypeName::Int, "runs", Some(int(0)))])
        .unwrap();

    interp.cancellation_handle().cancel();
    let err = interp
        .run(&[try_stmt(
            vec![while_loop(boolean(true), vec![expr_stmt(post_inc("runs"))])],
            vec![catch("System.Exception", "e", vec![expr_stmt(post_inc("runs"))])],
            Some(vec![expr_stmt(post_inc("runs"))]),
        )])
        .unwrap_err();

    assert!(matches!(err, RuntimeError::Aborted { .. }));
    assert_eq!(interp.variable("runs"), Some(&Value::Int(0)));
}

#[test]
fn test_abort_unwinds_function_frames() {
    let mut interp = Interpreter::new(eager_config());
    interp
        .run(&[function(
            "spin",
            None,
            vec![],
            vec![while_loop(boolean(true), vec![])],
        )])
        .unwrap();

    interp.cancellation_handle().cancel();
    let err = interp.call_function("spin", vec![]).unwrap_err();
    assert!(matches!(err, RuntimeError::Aborted { .. }));
    assert_eq!(interp.call_depth(), 0);
}

#[test]
fn test_empty_statements_reach_checkpoint() {
    // Expression checks effectively disabled: only `;` can notice the flag
    let config = EngineConfig {
        cancellation: CancellationConfig {
            expression_batch: u32::MAX,
            empty_statement_batch: 2,
            check_interval_ms: u64::MAX / 2,
            expression_ceiling: u64::MAX,
        },
        ..Default::default()
    };
    let mut interp = Interpreter::new(config);
    interp.cancellation_handle().cancel();

    let err = interp
        .run(&[while_loop(boolean(true), vec![empty()])])
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Aborted { .. }));
}

#[test]
fn test_batched_checks_let_short_scripts_finish() {
    // With the default budget a handful of statements never reach a checkpoint
    let mut interp = Interpreter::default();
    interp.cancellation_handle().cancel();
    let outcome = interp
        .run(&[
            var_decl(TypeName::Int, "x", Some(int(1))),
            expr_stmt(post_inc("x")),
        ])
        .unwrap();
    assert_eq!(outcome.cause, ExitCause::Through);
    assert_eq!(interp.variable("x"), Some(&Value::Int(2)));
}

#[test]
fn test_reset_allows_running_again() {
    let mut interp = Interpreter::new(eager_config());
    let handle = interp.cancellation_handle();
    handle.cancel();
    assert!(interp.run(&[expr_stmt(int(1))]).is_err());

    handle.reset();
    let outcome = interp.run(&[expr_stmt(int(1))]).unwrap();
    assert_eq!(outcome.cause, ExitCause::Through);
}

#[test]
fn test_shared_handle_stops_every_interpreter() {
    let shared = CancellationHandle::new();
    let mut first = Interpreter::new(eager_config()).with_cancellation(shared.clone());
    let mut second = Interpreter::new(eager_config()).with_cancellation(shared.clone());
    shared.cancel();

    for interp in [&mut first, &mut second] {
        let err = interp.run(&[while_loop(boolean(true), vec![])]).unwrap_err();
        assert!(matches!(err, RuntimeError::Aborted { ref thread } if thread == "main"));
    }
}
