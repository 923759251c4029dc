//! Program execution: memory model, instruction runner and evaluator.

pub mod errors;
pub mod evaluator;
pub mod memory;
pub mod runner;
pub mod types;

#[cfg(test)]
mod tests;

pub use errors::{ExecutionError, FilterError, MemoryError, NameError, StatementError};
pub use evaluator::{
    EvalState, Evaluator, RunAborted, RunReport, StatementOutcome, StatementReport,
};
pub use memory::{Environment, Memory, ResultSet, RESERVED_ITERATOR};
pub use runner::{CreationKind, InstructionRunner};
pub use types::*;
