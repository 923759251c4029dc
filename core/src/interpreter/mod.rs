//! Interpreter facade: parse, check, then evaluate.
//!
//! ```no_run
//! use simplefiles_core::interpreter::Interpreter;
//!
//! let source = std::fs::read_to_string("organize.sf")?;
//! let report = Interpreter::new("/data").run_source(&source)?;
//! for statement in &report.statements {
//!     println!("{}: {}", statement.label, statement.outcome);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::executor::{Evaluator, InstructionRunner, Memory, Program, RunAborted, RunReport};
use crate::parser::semantic_validator::{ValidationError, Validator};
use crate::parser::{parse_program, ParseError};

/// Why a program could not be run to completion.
#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error("Syntax error: {0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A variable assignment failed part way; carries what ran before it.
    #[error("{0}")]
    Aborted(#[from] RunAborted),
}

pub struct Interpreter {
    validator: Validator,
    working_dir: PathBuf,
}

impl Interpreter {
    /// Interpreter with the default rules, resolving paths against `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            validator: Validator::new(),
            working_dir: working_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            validator: Validator::with_strict(config.strict_parameter_keys),
            working_dir: config.working_dir.clone(),
        }
    }

    /// Also enforce the parameter key allow-list.
    pub fn strict(mut self, strict: bool) -> Self {
        self.validator = Validator::with_strict(strict);
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn parse(&self, source: &str) -> Result<Program, InterpreterError> {
        Ok(parse_program(source)?)
    }

    /// Every finding, in document order.
    pub fn findings(&self, program: &Program) -> Vec<ValidationError> {
        self.validator.validate(program)
    }

    /// Fail on the first error; warnings are returned.
    pub fn check(&self, program: &Program) -> Result<Vec<ValidationError>, InterpreterError> {
        let findings = self.findings(program);
        if let Some(err) = findings.iter().find(|f| f.is_error()) {
            return Err(err.clone().into());
        }
        for warning in &findings {
            warn!(statement = warning.statement, rule = warning.rule_id, "{}", warning.message);
        }
        Ok(findings)
    }

    /// Parse, check and run `source` with fresh memory.
    pub fn run_source(&self, source: &str) -> Result<RunReport, InterpreterError> {
        let program = self.parse(source)?;
        self.run_program(&program)
    }

    /// Check and run an already-built program with fresh memory.
    pub fn run_program(&self, program: &Program) -> Result<RunReport, InterpreterError> {
        let mut memory = Memory::new();
        self.run_with_memory(program, &mut memory)
    }

    /// Check and run `program` against caller-owned memory.
    pub fn run_with_memory(
        &self,
        program: &Program,
        memory: &mut Memory,
    ) -> Result<RunReport, InterpreterError> {
        self.check(program)?;
        debug!(
            statements = program.statements.len(),
            working_dir = %self.working_dir.display(),
            "program checked, executing"
        );
        let mut evaluator = Evaluator::new(InstructionRunner::new(self.working_dir.clone()));
        Ok(evaluator.run(program, memory)?)
    }
}
