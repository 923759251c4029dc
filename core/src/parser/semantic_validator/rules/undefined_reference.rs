//! Rule: Undefined Reference
//!
//! `EXEC_INST` and `EXEC_COND_MAP` may only name instructions and conditions
//! declared earlier in the program.
//!
//! ```text
//! EXEC_INST later;          // error: not declared yet
//! INST later -> :rename ...;
//! ```

use std::collections::HashSet;

use crate::executor::types::ast::{Program, Stmt};

use super::super::{ValidationError, ValidationRule};

pub struct UndefinedReferenceRule;

impl ValidationRule for UndefinedReferenceRule {
    fn id(&self) -> &'static str {
        "undefined-reference"
    }

    fn description(&self) -> &'static str {
        "Executed instructions and conditions must be declared first"
    }

    fn validate(&self, program: &Program) -> Vec<ValidationError> {
        let mut instructions: HashSet<&str> = HashSet::new();
        let mut conditions: HashSet<&str> = HashSet::new();
        let mut errors = Vec::new();

        for (index, stmt) in program.statements.iter().enumerate() {
            match stmt {
                Stmt::Instruction(inst) => {
                    instructions.insert(&inst.name);
                }
                Stmt::Condition(cond) => {
                    conditions.insert(&cond.name);
                }
                Stmt::ExecuteInstruction { instruction, span } => {
                    if !instructions.contains(instruction.as_str()) {
                        errors.push(ValidationError::error(
                            index,
                            *span,
                            format!("Instruction not found: {}", instruction),
                            self.id(),
                        ));
                    }
                }
                Stmt::ExecuteCondMap {
                    instruction,
                    condition,
                    span,
                } => {
                    if !instructions.contains(instruction.as_str()) {
                        errors.push(ValidationError::error(
                            index,
                            *span,
                            format!(
                                "Static check failed: Invalid or undefined instruction name '{}'.",
                                instruction
                            ),
                            self.id(),
                        ));
                    }
                    if !conditions.contains(condition.as_str()) {
                        errors.push(ValidationError::error(
                            index,
                            *span,
                            format!(
                                "Static check failed: Invalid or undefined condition name '{}'.",
                                condition
                            ),
                            self.id(),
                        ));
                    }
                }
                Stmt::Variable { .. } => {}
            }
        }

        errors
    }
}
