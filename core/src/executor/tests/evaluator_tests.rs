//! Tests for whole-program evaluation

use tempfile::TempDir;

use super::helpers::{cond, inst, names_in, run_program, touch};
use crate::executor::errors::{ExecutionError, MemoryError, StatementError};
use crate::executor::types::ast::{Action, Program, Stmt};
use crate::executor::{EvalState, Evaluator, InstructionRunner, Memory, StatementOutcome};
use crate::interpreter::{Interpreter, InterpreterError};

fn exec(name: &str) -> Stmt {
    Stmt::ExecuteInstruction {
        instruction: name.to_string(),
        span: Default::default(),
    }
}

#[test]
fn test_create_then_group_program() {
    let dir = TempDir::new().unwrap();
    let source = r#"
        BEGIN
        INST make -> :create_file
        --> name = "fruit_${ITERATOR}.txt"
        --> path = "inbox"
        --> count = "3";
        INST sort -> :group
        --> group_target = "make"
        --> path = "sorted"
        --> mode = "move";
        COND only_first -> :condition
        --> contains = "fruit_0";
        EXEC_INST make;
        EXEC_COND_MAP sort WITH_COND only_first;
        END
    "#;

    let (report, memory) = run_program(source, dir.path());

    assert!(!report.has_failures());
    assert_eq!(report.completed(), 2);
    assert_eq!(report.statements[0].index, 3);
    assert_eq!(report.statements[1].label, "EXEC_COND_MAP sort WITH_COND only_first");
    assert_eq!(names_in(&dir.path().join("sorted")), vec!["fruit_0.txt"]);
    assert_eq!(
        names_in(&dir.path().join("inbox")),
        vec!["fruit_1.txt", "fruit_2.txt"]
    );
    assert_eq!(memory.result("sort").unwrap().entries.len(), 1);
}

#[test]
fn test_failing_statement_does_not_stop_later_ones() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "not_a_dir.txt");
    let source = r#"
        BEGIN
        INST broken -> :group
        --> group_target = "not_a_dir.txt"
        --> path = "out"
        --> mode = "copy";
        INST later -> :create_folder
        --> name = "after"
        --> path = "made";
        EXEC_INST broken;
        EXEC_INST later;
        END
    "#;

    let (report, _memory) = run_program(source, dir.path());

    assert!(report.has_failures());
    assert_eq!(report.completed(), 1);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].label, "EXEC_INST broken");
    assert_eq!(
        failures[0].outcome.to_string(),
        "failed: Error encountered running instruction: broken. Group target must be a directory."
    );
    assert!(dir.path().join("made/after").is_dir());
}

#[test]
fn test_aliases_resolved_when_parameters_are_read() {
    let dir = TempDir::new().unwrap();
    let source = r#"
        BEGIN
        VAR FILE = "first.txt";
        VAR ALIAS = "${FILE}";
        VAR FILE = "second.txt";
        INST make -> :create_file
        --> name = "${ALIAS}"
        --> path = "out";
        EXEC_INST make;
        VAR ALIAS = "third.txt";
        EXEC_INST make;
        END
    "#;

    let (report, memory) = run_program(source, dir.path());

    assert_eq!(report.completed(), 2);
    assert_eq!(names_in(&dir.path().join("out")), vec!["second.txt", "third.txt"]);
    assert_eq!(memory.get("FILE").unwrap(), "third.txt");
    assert!(memory.env().are_aliases("FILE", "ALIAS"));
}

#[test]
fn test_unknown_variable_fails_statement_only() {
    let dir = TempDir::new().unwrap();
    let source = r#"
        BEGIN
        INST make -> :create_folder
        --> name = "${MISSING}"
        --> path = "out";
        EXEC_INST make;
        END
    "#;

    let (report, _memory) = run_program(source, dir.path());

    let failure = report.failures().next().expect("one failure");
    assert!(matches!(
        &failure.outcome,
        StatementOutcome::Failed(StatementError::Execution(ExecutionError::Memory(
            MemoryError::UnknownVariable(name)
        ))) if name == "MISSING"
    ));
}

#[test]
fn test_variable_failure_aborts_run() {
    let dir = TempDir::new().unwrap();
    let interpreter = Interpreter::new(dir.path());
    let source = r#"
        BEGIN
        INST first -> :create_file
        --> name = "a.txt"
        --> path = "out";
        INST make -> :create_folder
        --> name = "never"
        --> path = "out";
        EXEC_INST first;
        VAR ITERATOR = "5";
        EXEC_INST make;
        END
    "#;

    let err = interpreter.run_source(source).unwrap_err();

    match err {
        InterpreterError::Aborted(aborted) => {
            assert_eq!(aborted.statement, 3);
            assert_eq!(aborted.source, MemoryError::ReservedName);
            assert_eq!(aborted.report.completed(), 1);
            assert_eq!(aborted.report.statements[0].label, "EXEC_INST first");
        }
        other => panic!("Expected aborted run, got {:?}", other),
    }
    assert!(dir.path().join("out/a.txt").is_file());
    assert!(!dir.path().join("out/never").exists());
}

#[test]
fn test_static_check_blocks_execution() {
    let dir = TempDir::new().unwrap();
    let interpreter = Interpreter::new(dir.path());
    let source = r#"
        BEGIN
        INST make -> :create_folder
        --> name = "made"
        --> path = "out";
        EXEC_INST make;
        EXEC_INST missing;
        END
    "#;

    let err = interpreter.run_source(source).unwrap_err();

    match err {
        InterpreterError::Validation(finding) => {
            assert_eq!(finding.message, "Instruction not found: missing")
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_unsupported_action_is_skipped() {
    let dir = TempDir::new().unwrap();
    let program = Program::new(vec![
        Stmt::Instruction(inst("zip_it", Action::Unsupported("zip".into()), &[])),
        Stmt::Instruction(inst(
            "make",
            Action::CreateFolder,
            &[("name", "made"), ("path", "out")],
        )),
        exec("zip_it"),
        exec("make"),
    ]);

    let mut evaluator = Evaluator::new(InstructionRunner::new(dir.path()));
    let mut memory = Memory::new();
    let report = evaluator.run(&program, &mut memory).unwrap();

    assert_eq!(evaluator.state(), EvalState::Done);
    assert!(!report.has_failures());
    assert_eq!(report.completed(), 1);
    assert_eq!(
        report.statements[0].outcome.to_string(),
        "skipped: unsupported action :zip"
    );
    assert!(dir.path().join("out/made").is_dir());
}

#[test]
fn test_undefined_names_recorded_as_failures() {
    let dir = TempDir::new().unwrap();
    let program = Program::new(vec![
        Stmt::Instruction(inst("make", Action::CreateFolder, &[("name", "m")])),
        exec("ghost"),
        Stmt::ExecuteCondMap {
            instruction: "make".into(),
            condition: "nothing".into(),
            span: Default::default(),
        },
    ]);

    let mut evaluator = Evaluator::new(InstructionRunner::new(dir.path()));
    let report = evaluator.run(&program, &mut Memory::new()).unwrap();

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 2);
    assert!(matches!(
        &failures[0].outcome,
        StatementOutcome::Failed(StatementError::UndefinedInstruction(name)) if name == "ghost"
    ));
    assert!(matches!(
        &failures[1].outcome,
        StatementOutcome::Failed(StatementError::UndefinedCondition(name)) if name == "nothing"
    ));
    assert!(!dir.path().join("m").exists());
}

#[test]
fn test_later_declaration_replaces_earlier_at_run_time() {
    let dir = TempDir::new().unwrap();
    let program = Program::new(vec![
        Stmt::Instruction(inst("make", Action::CreateFolder, &[("name", "one")])),
        exec("make"),
        Stmt::Condition(cond("c", &[("contains", "x")])),
        Stmt::Instruction(inst("make", Action::CreateFolder, &[("name", "two")])),
        exec("make"),
    ]);

    let mut evaluator = Evaluator::new(InstructionRunner::new(dir.path()));
    let report = evaluator.run(&program, &mut Memory::new()).unwrap();

    assert_eq!(report.completed(), 2);
    assert_eq!(names_in(dir.path()), vec!["one", "two"]);
}
