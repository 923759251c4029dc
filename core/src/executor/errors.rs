//! Error kinds raised while a program runs.
//!
//! Syntax and static-check errors live with the parser; everything here is
//! produced after checking has passed, at the point a variable is resolved
//! or an instruction touches the filesystem.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the variable environment and result registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Cannot assign a variable to another that does not exist: {0}")]
    UndefinedAlias(String),

    #[error("Cannot assign a variable to reference itself: {0}")]
    CircularAssignment(String),

    #[error("Variable name ITERATOR is a reserved name. Choose a different variable name!")]
    ReservedName,

    #[error("The referenced variable cannot be empty string.")]
    EmptyReference,

    #[error("File grouping for instruction {0} not found")]
    UnknownResult(String),
}

/// Failures while expanding a `${ITERATOR...}` name template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Count is more than 1. Missing dynamic construct for name")]
    CountWithoutConstruct,

    #[error("Error resolving dynamic construct")]
    InvalidConstruct,
}

/// Malformed filter arguments. These abort the whole operation rather than
/// skipping the entry being tested.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Cannot properly parse parameter arguments for modified_date")]
    DateArity,

    #[error("Unknown range comparator: {0}")]
    UnknownRange(String),

    #[error("Error encountered when trying to parse the given date: {0}")]
    InvalidDate(String),

    #[error("Range comparator 'between' requires two dates")]
    MissingUpperDate,

    #[error("Size comparison missing comparator parameter.")]
    MissingComparator,

    #[error("Size comparison missing size parameter.")]
    MissingSize,

    #[error("Specified size must be parsable integer.")]
    InvalidSize,

    #[error("Unknown size comparator: {0}")]
    UnknownComparator(String),

    #[error("Invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("IOException occurred when trying to access file: {}.", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An error raised by the instruction runner for one executed statement.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Error encountered running instruction: {instruction}. {message}")]
    Instruction { instruction: String, message: String },

    #[error("Error encountered running instruction: {instruction}. {source}")]
    Naming {
        instruction: String,
        #[source]
        source: NameError,
    },

    #[error("Error encountered running instruction: {instruction}. {source}")]
    Filter {
        instruction: String,
        #[source]
        source: FilterError,
    },

    #[error("Error encountered running instruction: {instruction}. {context}: {source}")]
    Io {
        instruction: String,
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to rename file: {}", .path.display())]
    RenameFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

impl ExecutionError {
    pub fn instruction(instruction: &str, message: impl Into<String>) -> Self {
        ExecutionError::Instruction {
            instruction: instruction.to_string(),
            message: message.into(),
        }
    }

    pub fn io(instruction: &str, context: impl Into<String>, source: io::Error) -> Self {
        ExecutionError::Io {
            instruction: instruction.to_string(),
            context: context.into(),
            source,
        }
    }

    pub fn filter(instruction: &str, source: FilterError) -> Self {
        ExecutionError::Filter {
            instruction: instruction.to_string(),
            source,
        }
    }
}

/// Why an execute-statement did not complete. Collected by the evaluator,
/// never propagated past the statement that raised it.
#[derive(Debug, Error)]
pub enum StatementError {
    #[error("Instruction not found: {0}")]
    UndefinedInstruction(String),

    #[error("Condition not found: {0}")]
    UndefinedCondition(String),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
