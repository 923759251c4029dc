//! Statement evaluator.
//!
//! Walks a program once, in order. Declarations go into a symbol table,
//! `VAR` statements go to [`Memory`], and execute-statements are dispatched
//! to the [`InstructionRunner`]. Each execute-statement's result is recorded
//! in a [`RunReport`]; a failing statement never stops the ones after it.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::{error, info, warn};

use super::errors::{MemoryError, StatementError};
use super::memory::Memory;
use super::runner::InstructionRunner;
use super::types::ast::{Action, Condition, Instruction, Program, Stmt};

/// Where the evaluator is in its walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalState {
    /// Registering a declaration or assigning a variable.
    Collecting,
    /// Running an execute-statement.
    Executing,
    Done,
}

/// What happened to one execute-statement.
#[derive(Debug)]
pub enum StatementOutcome {
    Completed,
    Skipped(String),
    Failed(StatementError),
}

impl StatementOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StatementOutcome::Failed(_))
    }
}

impl fmt::Display for StatementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementOutcome::Completed => write!(f, "ok"),
            StatementOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
            StatementOutcome::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

#[derive(Debug)]
pub struct StatementReport {
    /// Position of the statement in the program.
    pub index: usize,
    pub label: String,
    pub outcome: StatementOutcome,
}

/// Per-statement results of one run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub statements: Vec<StatementReport>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.statements.iter().any(|s| s.outcome.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = &StatementReport> {
        self.statements.iter().filter(|s| s.outcome.is_failure())
    }

    pub fn completed(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| matches!(s.outcome, StatementOutcome::Completed))
            .count()
    }
}

/// A variable assignment failed and the walk stopped early. `report` holds
/// the execute-statements that ran before it.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct RunAborted {
    pub statement: usize,
    #[source]
    pub source: MemoryError,
    pub report: RunReport,
}

pub struct Evaluator {
    runner: InstructionRunner,
    instructions: HashMap<String, Instruction>,
    conditions: HashMap<String, Condition>,
    state: EvalState,
}

impl Evaluator {
    pub fn new(runner: InstructionRunner) -> Self {
        Self {
            runner,
            instructions: HashMap::new(),
            conditions: HashMap::new(),
            state: EvalState::Collecting,
        }
    }

    pub fn state(&self) -> EvalState {
        self.state
    }

    pub fn runner(&self) -> &InstructionRunner {
        &self.runner
    }

    /// Evaluate `program` against `memory`.
    ///
    /// Only a failing variable assignment ends the walk early; runner errors
    /// are recorded in the report.
    pub fn run(&mut self, program: &Program, memory: &mut Memory) -> Result<RunReport, RunAborted> {
        let mut report = RunReport::default();
        self.state = EvalState::Collecting;

        for (index, stmt) in program.statements.iter().enumerate() {
            match stmt {
                Stmt::Instruction(inst) => {
                    self.state = EvalState::Collecting;
                    self.instructions.insert(inst.name.clone(), inst.clone());
                }
                Stmt::Condition(cond) => {
                    self.state = EvalState::Collecting;
                    self.conditions.insert(cond.name.clone(), cond.clone());
                }
                Stmt::Variable { key, value, .. } => {
                    self.state = EvalState::Collecting;
                    if let Err(err) = memory.assign(key, value) {
                        error!(statement = index, variable = %key, error = %err, "variable assignment failed");
                        self.state = EvalState::Done;
                        return Err(RunAborted {
                            statement: index,
                            source: err,
                            report,
                        });
                    }
                }
                Stmt::ExecuteInstruction { instruction, .. } => {
                    self.state = EvalState::Executing;
                    let outcome = self.execute(memory, instruction, None);
                    report.statements.push(self.record(index, stmt, outcome));
                }
                Stmt::ExecuteCondMap {
                    instruction,
                    condition,
                    ..
                } => {
                    self.state = EvalState::Executing;
                    let outcome = self.execute(memory, instruction, Some(condition.as_str()));
                    report.statements.push(self.record(index, stmt, outcome));
                }
            }
        }

        self.state = EvalState::Done;
        Ok(report)
    }

    fn execute(
        &self,
        memory: &mut Memory,
        instruction: &str,
        condition: Option<&str>,
    ) -> StatementOutcome {
        let Some(inst) = self.instructions.get(instruction) else {
            return StatementOutcome::Failed(StatementError::UndefinedInstruction(
                instruction.to_string(),
            ));
        };

        let cond = match condition {
            Some(name) => match self.conditions.get(name) {
                Some(cond) => Some(cond),
                None => {
                    return StatementOutcome::Failed(StatementError::UndefinedCondition(
                        name.to_string(),
                    ))
                }
            },
            None => None,
        };

        if let Action::Unsupported(keyword) = &inst.action {
            return StatementOutcome::Skipped(format!("unsupported action :{}", keyword));
        }

        match self.runner.run(memory, inst, cond) {
            Ok(()) => StatementOutcome::Completed,
            Err(err) => StatementOutcome::Failed(err.into()),
        }
    }

    fn record(&self, index: usize, stmt: &Stmt, outcome: StatementOutcome) -> StatementReport {
        let label = stmt.describe();
        match &outcome {
            StatementOutcome::Completed => info!(statement = index, %label, "statement completed"),
            StatementOutcome::Skipped(reason) => {
                warn!(statement = index, %label, %reason, "statement skipped")
            }
            StatementOutcome::Failed(err) => {
                error!(statement = index, %label, error = %err, "statement failed")
            }
        }
        StatementReport {
            index,
            label,
            outcome,
        }
    }
}
