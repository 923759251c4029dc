//! Test helpers for executor tests
//!
//! Builders for AST nodes and small filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use crate::executor::types::ast::{Action, Condition, Instruction, Parameter};
use crate::executor::{Memory, RunReport};
use crate::interpreter::Interpreter;

/// Build an instruction from `(key, value)` pairs.
pub fn inst(name: &str, action: Action, params: &[(&str, &str)]) -> Instruction {
    Instruction::new(name, action, to_params(params))
}

/// Build a condition from `(key, value)` pairs.
pub fn cond(name: &str, params: &[(&str, &str)]) -> Condition {
    Condition::new(name, to_params(params))
}

fn to_params(params: &[(&str, &str)]) -> Vec<Parameter> {
    params.iter().map(|(k, v)| Parameter::new(*k, *v)).collect()
}

/// Create an empty file (and its parents) below `dir`.
pub fn touch(dir: &Path, relative: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(&path, "").expect("create file");
    path
}

/// Sorted entry names directly inside `dir`.
pub fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read directory")
        .map(|entry| {
            entry
                .expect("directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Parse, check and run `source` with `working_dir` as the base directory.
///
/// Panics if the program does not parse or check.
pub fn run_program(source: &str, working_dir: &Path) -> (RunReport, Memory) {
    let interpreter = Interpreter::new(working_dir);
    let program = interpreter.parse(source).expect("Parse program failed");
    let mut memory = Memory::new();
    let report = interpreter
        .run_with_memory(&program, &mut memory)
        .expect("Program run failed");
    (report, memory)
}
